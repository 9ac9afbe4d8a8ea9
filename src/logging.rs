use crate::config::LoggingConfig;
use crate::err;
use crate::result::VireoResult;

pub fn init_logging(config: &LoggingConfig) -> VireoResult<()> {
    tracing_subscriber::fmt()
        .with_thread_names(true)
        .with_max_level(config.level()?)
        .try_init()
        .map_err(|error| err!("Failed to initialize logging: {}", error))?;
    Ok(())
}

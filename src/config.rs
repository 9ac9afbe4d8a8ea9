//! Runtime configuration, loaded from YAML.
//!
//! Every field has a default, so an empty document yields the default
//! configuration:
//!
//! ```yaml
//! reactivity:
//!   trigger_policy: skip_if_unchanged
//! logging:
//!   level: debug
//! ```

use crate::bail;
use crate::context;
use crate::result::{VireoError, VireoResult};
use log::info;
use serde::Deserialize;
use std::path::Path;
use tracing::Level;

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct VireoConfig {
    pub reactivity: ReactivityConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ReactivityConfig {
    pub trigger_policy: TriggerPolicy,
}

/// Decides whether a write replays the computations depending on it
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TriggerPolicy {
    /// Every successful write replays all dependents
    #[default]
    Always,
    /// Writes that leave the value equal to the previous one replay nothing
    SkipIfUnchanged,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl LoggingConfig {
    pub fn level(&self) -> VireoResult<Level> {
        Ok(match self.level.to_ascii_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            other => bail!(Config: "Unknown log level '{}'", other),
        })
    }
}

impl VireoConfig {
    pub fn from_yaml_str(source: &str) -> VireoResult<Self> {
        if source.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: VireoConfig = serde_yml::from_str(source)?;
        config.logging.level()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> VireoResult<Self> {
        let path = path.as_ref();
        info!("Loading configuration: '{}'", path.display());
        context!("load configuration from '{}'", path.display() => {
            std::fs::read_to_string(path)
                .map_err(VireoError::from)
                .and_then(|source| Self::from_yaml_str(&source))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::VireoErrorKind;

    #[test]
    fn test_empty_document_is_default() {
        let config = VireoConfig::from_yaml_str("").unwrap();
        assert_eq!(VireoConfig::default(), config);
        assert_eq!(TriggerPolicy::Always, config.reactivity.trigger_policy);
        assert_eq!(Level::INFO, config.logging.level().unwrap());
    }

    #[test]
    fn test_full_document() {
        let config = VireoConfig::from_yaml_str(
            "reactivity:\n  trigger_policy: skip_if_unchanged\nlogging:\n  level: DEBUG\n",
        )
        .unwrap();
        assert_eq!(
            TriggerPolicy::SkipIfUnchanged,
            config.reactivity.trigger_policy
        );
        assert_eq!(Level::DEBUG, config.logging.level().unwrap());
    }

    #[test]
    fn test_partial_document() {
        let config = VireoConfig::from_yaml_str("logging:\n  level: warn\n").unwrap();
        assert_eq!(TriggerPolicy::Always, config.reactivity.trigger_policy);
        assert_eq!(Level::WARN, config.logging.level().unwrap());
    }

    #[test]
    fn test_unknown_level() {
        let error = VireoConfig::from_yaml_str("logging:\n  level: loud\n").unwrap_err();
        assert_eq!(
            &VireoErrorKind::Config("Unknown log level 'loud'".to_string()),
            error.kind()
        );
    }

    #[test]
    fn test_unknown_policy() {
        let error =
            VireoConfig::from_yaml_str("reactivity:\n  trigger_policy: sometimes\n").unwrap_err();
        assert!(matches!(error.kind(), VireoErrorKind::Config(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let error = VireoConfig::load("does/not/exist.yaml").unwrap_err();
        assert_eq!(
            &VireoErrorKind::General(
                "Failed to load configuration from 'does/not/exist.yaml'".to_string()
            ),
            error.kind()
        );
    }

    #[test]
    fn test_load_keeps_config_kind() {
        let path = std::env::temp_dir().join(format!("vireo-config-{}.yaml", std::process::id()));
        std::fs::write(&path, "logging:\n  level: loud\n").unwrap();
        let error = VireoConfig::load(&path).unwrap_err();
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(error.kind(), VireoErrorKind::Config(_)));
        assert!(format!("{:?}", error).contains("Unknown log level 'loud'"));
    }
}

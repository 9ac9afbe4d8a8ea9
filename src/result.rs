use error_stack::Report;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum VireoErrorKind {
    #[error("General Error: {0}")]
    General(String),
    #[error("Tracking Error: {0}")]
    Tracking(String),
    #[error("Build Error: {0}")]
    Build(String),
    #[error("Render Error: {0}")]
    Render(String),
    #[error("Config Error: {0}")]
    Config(String),
}

#[derive(Debug)]
pub struct VireoError(pub Report<VireoErrorKind>);

impl Display for VireoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl VireoError {
    #[track_caller]
    pub fn new(error: VireoErrorKind) -> VireoError {
        VireoError(Report::new(error))
    }

    /// Wrap in a new context of the same kind
    #[track_caller]
    pub fn change_context<S: Into<String>>(self, message: S) -> Self {
        let kind = match self.kind() {
            VireoErrorKind::Tracking(_) => VireoErrorKind::Tracking(message.into()),
            VireoErrorKind::Build(_) => VireoErrorKind::Build(message.into()),
            VireoErrorKind::Render(_) => VireoErrorKind::Render(message.into()),
            VireoErrorKind::Config(_) => VireoErrorKind::Config(message.into()),
            VireoErrorKind::General(_) => VireoErrorKind::General(message.into()),
        };
        self.change_kind(kind)
    }

    /// Wrap in a new context, possibly of a different kind
    #[track_caller]
    pub fn change_kind(self, kind: VireoErrorKind) -> Self {
        Self(self.0.change_context(kind))
    }

    /// The outermost error kind of this report
    pub fn kind(&self) -> &VireoErrorKind {
        self.0.current_context()
    }
}

pub type VireoResult<T> = Result<T, VireoError>;

impl<T> From<T> for VireoError
where
    for<'a> &'a T: Into<VireoErrorKind>,
    T: Error + Send + Sync + 'static,
{
    #[track_caller]
    fn from(error: T) -> Self {
        let kind: VireoErrorKind = (&error).into();
        let report = Report::new(error);
        let report = report.change_context(kind);
        Self(report)
    }
}

impl From<&std::io::Error> for VireoErrorKind {
    #[track_caller]
    fn from(error: &std::io::Error) -> Self {
        Self::General(error.to_string())
    }
}

impl From<&serde_yml::Error> for VireoErrorKind {
    #[track_caller]
    fn from(error: &serde_yml::Error) -> Self {
        Self::Config(error.to_string())
    }
}

impl From<&str> for VireoError {
    #[track_caller]
    fn from(error: &str) -> Self {
        Self(Report::new(VireoErrorKind::General(error.to_string())))
    }
}

#[macro_export]
macro_rules! bail {
    ($kind:ident: $($args:tt)+) => {
        return Err($crate::result::VireoError::new($crate::result::VireoErrorKind::$kind(format!($($args)+).into())))
    };
    ($($args:tt)+) => {
        return Err($crate::result::VireoError::new($crate::result::VireoErrorKind::General(format!($($args)+).into())))
    };
}

#[macro_export]
macro_rules! err {
    ($kind:ident: $($args:tt)+) => {
        $crate::result::VireoError::new($crate::result::VireoErrorKind::$kind(format!($($args)+).into()))
    };
    ($($args:tt)+) => {
        $crate::result::VireoError::new($crate::result::VireoErrorKind::General(format!($($args)+).into()))
    };
}

#[macro_export]
macro_rules! context {
    ($fmt:expr $(, $($args:expr),+)? => $block:block) => {
        {
            $block
        }.map_err(|e: $crate::result::VireoError| e.change_context(format!(concat!("Failed to ",$fmt) $(, $($args)+)?)))
    };
}
pub use context;

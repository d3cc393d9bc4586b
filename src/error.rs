/*
 * Error type shared by every layer of the plugin. The variants double as the
 * user-facing diagnostics: `Display` renders the message that ends up in the
 * host log when a configuration or command fails.
 */
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PluginError {
    #[error("invalid measure handle: {0}")]
    InvalidHandle(String),
    #[error("\"{0}\" is not a valid Type")]
    TypeNotFound(String),
    #[error("{0} needs a parent.")]
    MissingParent(String),
    #[error("{0} requires a TabName to be in a TabControl")]
    MissingTabName(String),
    #[error("{0} cannot be placed inside itself or one of its own children")]
    CircularParent(String),
    #[error("The property \"{0}\" was not found")]
    PropertyNotFound(String),
    #[error("invocation of {callable} failed: {reason}")]
    Invocation { callable: String, reason: String },
    #[error("widget has been disposed: {0}")]
    Disposed(String),
    #[error("operation failed: {0}")]
    OperationFailed(String),
}

pub type Result<T> = std::result::Result<T, PluginError>;

impl PluginError {
    pub(crate) fn invocation(callable: impl Into<String>, reason: impl Into<String>) -> Self {
        PluginError::Invocation {
            callable: callable.into(),
            reason: reason.into(),
        }
    }

    /*
     * Configuration errors invalidate the measure until the next successful
     * reload. Handle errors never reach a measure in the first place.
     */
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            PluginError::TypeNotFound(_)
                | PluginError::MissingParent(_)
                | PluginError::MissingTabName(_)
                | PluginError::CircularParent(_)
        )
    }
}

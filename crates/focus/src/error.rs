//! Error types for focus operations.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FocusError {
    /// The application could not be brought to the foreground.
    #[error("failed to activate {app}")]
    ActivationFailed { app: String },

    /// The application is no longer running.
    #[error("application with pid {pid} is not running")]
    NotRunning { pid: i32 },

    /// The OS notification observer could not be installed.
    #[error("failed to observe focus changes: {0}")]
    ObserverFailed(String),
}

pub type Result<T> = std::result::Result<T, FocusError>;

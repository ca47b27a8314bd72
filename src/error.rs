use thiserror::Error;

/// Precondition violations that invalidate the rest of the run.
///
/// These are the only three conditions allowed to abort a collection;
/// everything else degrades to a recorded warning.
#[derive(Debug, Error)]
pub enum FatalError {
    #[error("this collector must be run as root")]
    NotRoot,

    #[error("unsupported operating system: {0}")]
    UnsupportedOs(String),

    #[error("the docker daemon is not running")]
    DaemonNotRunning,
}

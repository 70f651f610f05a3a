use thiserror::Error;

/// Failures the interpreter loop recognizes and reports itself.
///
/// Anything else travels as a plain [`anyhow::Error`].
#[derive(Debug, Error)]
pub enum ShellError {
    /// The name matched neither a builtin nor an executable on the search path,
    /// or the program could not be started.
    #[error("{0}: command not found")]
    CommandNotFound(String),

    /// `cd ~` was requested but HOME is not set.
    #[error("cd: HOME not set")]
    HomeNotSet,
}

use std::{io, path::PathBuf};

/// Shared error type for the recycle bin, the search engine and the console.
#[derive(thiserror::Error, Debug)]
pub enum CoreError {
    /// A referenced file or staged entry does not exist.
    #[error("not found: {0}")]
    NotFound(PathBuf),

    /// File system I/O failure.
    #[error("I/O error while accessing {0}")]
    Io(PathBuf, #[source] io::Error),

    /// The search root is missing or is not a directory.
    #[error("directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    /// The search pattern failed to compile.
    #[error("invalid search pattern `{pattern}`")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// An operation was rejected due to configuration/argument issues.
    #[error("invalid command input: {0}")]
    InvalidInput(String),

    /// The destination is occupied and the collision policy forbids replacing it.
    #[error("destination already exists: {0}")]
    Conflict(PathBuf),
}

impl CoreError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound(path.into())
    }

    pub fn io(path: impl Into<PathBuf>, error: io::Error) -> Self {
        Self::Io(path.into(), error)
    }

    /// Renders the error followed by its chain of causes, for user-facing output.
    pub fn report(&self) -> String {
        let mut message = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = std::error::Error::source(cause);
        }
        message
    }

    /// Returns the underlying I/O error for `Io` failures.
    pub fn io_source(&self) -> Option<&io::Error> {
        match self {
            Self::Io(_, err) => Some(err),
            _ => None,
        }
    }
}

/// Shared result alias for the core crate.
pub type Result<T> = std::result::Result<T, CoreError>;

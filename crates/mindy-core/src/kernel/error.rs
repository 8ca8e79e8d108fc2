//! # Mindy Kernel Errors
//!
//! Defines the error type shared by the bootstrap, the console runner and the
//! HTTP front controller.
//!
//! [`Error::InstanceNotCreated`] is the only error this crate raises on its
//! own initiative. Everything a [`Kernel`](crate::kernel::Kernel) returns is
//! passed back to the caller untouched.
use std::error::Error as StdError;
use std::path::PathBuf;
use std::result::Result as StdResult;

use thiserror::Error as ThisError;

/// Errors produced while bootstrapping or running an application.
#[derive(Debug, ThisError)]
pub enum Error {
    /// The singleton was requested before `create_instance` ran.
    #[error("Please run create_instance and create the application before requesting the application instance")]
    InstanceNotCreated,

    /// Failure reported by a kernel implementation.
    #[error("Kernel error: {0}")]
    Kernel(#[source] Box<dyn StdError + Send + Sync>),

    /// Lookup of a component id that the container does not know.
    #[error("Component '{id}' is not registered in the container")]
    ComponentNotFound { id: String },

    /// The component exists but is not of the requested concrete type.
    #[error("Component '{id}' is not of the expected type {expected}")]
    ComponentTypeMismatch { id: String, expected: &'static str },

    /// The ambient request could not be turned into an HTTP request.
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] http::Error),

    #[error("I/O error during '{operation}': {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error in '{}': {message}", path.display())]
    Config { path: PathBuf, message: String },

    /// Generic error with message
    #[error("Error: {0}")]
    Other(String),
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;

impl Error {
    /// Wraps an arbitrary kernel-side failure.
    pub fn kernel<E>(source: E) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        Error::Kernel(source.into())
    }

    pub fn io(source: std::io::Error, operation: impl Into<String>) -> Self {
        Error::Io {
            operation: operation.into(),
            source,
        }
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}

impl From<std::io::Error> for Error {
    fn from(io_err: std::io::Error) -> Self {
        Error::io(io_err, "unknown")
    }
}

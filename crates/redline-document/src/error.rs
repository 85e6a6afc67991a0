//! Error types for document persistence and equation conversion.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading, parsing or persisting a document.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The document does not exist at the resolved path.
    #[error("Document {path} does not exist")]
    Missing {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// The document bytes or metadata could not be read.
    #[error("failed to read document {path}: {message}")]
    Read {
        /// Path to the document.
        path: PathBuf,
        /// Description of the I/O error.
        message: String,
    },

    /// The document bytes are not a valid document.
    #[error("failed to parse document {path}: {message}")]
    Parse {
        /// Path to the document.
        path: PathBuf,
        /// Description of the decoding error.
        message: String,
    },

    /// The in-memory document could not be encoded.
    #[error("failed to encode document: {message}")]
    Encode {
        /// Description of the encoding error.
        message: String,
    },

    /// The document could not be written back.
    #[error("failed to write document {path}: {message}")]
    Write {
        /// Path to the document.
        path: PathBuf,
        /// Description of the I/O error.
        message: String,
    },
}

impl DocumentError {
    /// Creates a read error from an I/O failure.
    #[must_use]
    pub fn read(path: PathBuf, error: &std::io::Error) -> Self {
        if error.kind() == std::io::ErrorKind::NotFound {
            return Self::Missing { path };
        }
        Self::Read {
            path,
            message: error.to_string(),
        }
    }

    /// Creates a write error from an I/O failure.
    #[must_use]
    pub fn write(path: PathBuf, error: &std::io::Error) -> Self {
        Self::Write {
            path,
            message: error.to_string(),
        }
    }
}

/// Errors raised by an [`crate::EquationConverter`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// The converter program could not be started or fed.
    #[error("failed to run equation converter '{program}': {message}")]
    Spawn {
        /// Program that was invoked.
        program: String,
        /// Description of the I/O error.
        message: String,
    },

    /// The converter exited unsuccessfully.
    #[error("equation converter '{program}' failed: {message}")]
    Failed {
        /// Program that was invoked.
        program: String,
        /// Exit status and captured standard error.
        message: String,
    },

    /// The converter ran past its deadline and was killed.
    #[error("equation converter '{program}' timed out after {timeout_ms} ms")]
    TimedOut {
        /// Program that was invoked.
        program: String,
        /// Deadline that passed, in milliseconds.
        timeout_ms: u64,
    },

    /// The converter produced no structured output.
    #[error("equation converter '{program}' produced no output")]
    EmptyOutput {
        /// Program that was invoked.
        program: String,
    },

    /// The markup was rejected without invoking an external program.
    #[error("equation conversion failed: {message}")]
    Rejected {
        /// Reason given by the converter.
        message: String,
    },
}

use thiserror::Error;

/// Errors returned by the compressor.
///
/// Malformed source text is not an error; see [`crate::Diagnostic`].
#[derive(Error, Debug)]
pub enum Error {
    /// A configuration key outside the recognized set.
    #[error("unrecognized option: {name}")]
    UnrecognizedOption { name: String },

    /// A recognized key with a value of the wrong shape.
    #[error("invalid value for option {name}: {reason}")]
    InvalidOption { name: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("input is not valid UTF-8")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

impl Error {
    #[must_use]
    pub fn unrecognized(name: impl Into<String>) -> Self {
        Self::UnrecognizedOption { name: name.into() }
    }

    #[must_use]
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidOption {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

//! Error types.

use core::fmt;

/// Result type with `dn42-registry`'s [`Error`] as the error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Error type.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// Key algorithm embedded in the key blob differs from the `auth:` tag.
    AlgorithmMismatch {
        /// Algorithm tag given on the `auth:` line.
        tag: String,

        /// Algorithm found inside the decoded key blob.
        found: key::Algorithm,
    },

    /// Key algorithm tag is not one of `ssh-ed25519` or `ssh-rsa`.
    AlgorithmUnsupported {
        /// Algorithm tag given on the `auth:` line.
        tag: String,
    },

    /// Key payload is not valid Base64.
    Base64(base64ct::Error),

    /// Invalid configuration value.
    Config {
        /// Name of the offending configuration field.
        field: &'static str,

        /// Human readable reason.
        reason: String,
    },

    /// Key material was decoded but does not form a usable public key
    /// (invalid curve point, RSA modulus too small, ...).
    Crypto,

    /// SSH key encoding errors.
    Key(key::Error),
}

impl Error {
    /// Create a configuration error for the given field.
    pub(crate) fn config(field: &'static str, reason: impl Into<String>) -> Self {
        Error::Config {
            field,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::AlgorithmMismatch { tag, found } => {
                write!(f, "key algorithm mismatch: tagged {tag}, key is {found}")
            }
            Error::AlgorithmUnsupported { tag } => write!(f, "unsupported algorithm: {tag}"),
            Error::Base64(err) => write!(f, "Base64 encoding error: {err}"),
            Error::Config { field, reason } => {
                write!(f, "invalid configuration for `{field}`: {reason}")
            }
            Error::Crypto => write!(f, "cryptographic error"),
            Error::Key(err) => write!(f, "SSH key error: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Key(err) => Some(err),
            _ => None,
        }
    }
}

impl From<base64ct::Error> for Error {
    fn from(err: base64ct::Error) -> Error {
        Error::Base64(err)
    }
}

impl From<key::Error> for Error {
    fn from(err: key::Error) -> Error {
        Error::Key(err)
    }
}

//! # Parameter Errors
//!
//! Error taxonomy for typed parameter resolution.
//!
//! Every variant that concerns a single parameter carries the
//! fully-qualified key (namespace segments joined with `.`), so the message
//! points at the line a user has to fix in their parameter file.
//!
//! - Uses `thiserror` for structured error definitions
//! - Named fields everywhere; no positional formatting

use std::num::{ParseFloatError, ParseIntError};
use std::path::PathBuf;
use thiserror::Error;

/// Failure raised by any parameter accessor.
#[derive(Debug, Error)]
pub enum ParameterError {
    #[error("Missing required parameter: {key}")]
    MissingRequiredParameter { key: String },

    #[error("For parameter {key}, could not convert value '{value}' to {expectation}: {source}")]
    Conversion {
        key: String,
        value: String,
        expectation: String,
        #[source]
        source: ConversionError
    },

    #[error("For parameter {key}, value '{value}' failed validation: {reason}")]
    Validation {
        key: String,
        value: String,
        reason: String
    },

    #[error("For parameter {key}, value '{value}' is not one of the allowed values: {}", .allowed.join(", "))]
    InvalidEnumeratedProperty {
        key: String,
        value: String,
        allowed: Vec<String>
    },

    /// Constraint spanning more than one parameter.
    #[error("{message}")]
    Constraint { message: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    /// Broken internal invariant; never caused by parameter content.
    #[error("Internal invariant violated: {message}")]
    Internal { message: String },

    #[error(transparent)]
    Load(#[from] LoadError)
}

impl ParameterError {
    pub fn missing(key: impl Into<String>) -> Self {
        Self::MissingRequiredParameter { key: key.into() }
    }

    pub fn conversion(
        key: impl Into<String>,
        value: impl Into<String>,
        expectation: impl Into<String>,
        source: ConversionError,
    ) -> Self {
        Self::Conversion {
            key: key.into(),
            value: value.into(),
            expectation: expectation.into(),
            source
        }
    }

    pub fn validation(
        key: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Validation {
            key: key.into(),
            value: value.into(),
            reason: reason.into()
        }
    }

    pub fn invalid_enumerated<I, S>(key: impl Into<String>, value: impl Into<String>, allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::InvalidEnumeratedProperty {
            key: key.into(),
            value: value.into(),
            allowed: allowed.into_iter().map(Into::into).collect()
        }
    }

    pub fn constraint(message: impl Into<String>) -> Self {
        Self::Constraint {
            message: message.into()
        }
    }

    /// Fully-qualified key of the offending parameter, when the error has one.
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::MissingRequiredParameter { key }
            | Self::Conversion { key, .. }
            | Self::Validation { key, .. }
            | Self::InvalidEnumeratedProperty { key, .. } => Some(key),
            Self::Constraint { .. }
            | Self::InvalidConfiguration { .. }
            | Self::Internal { .. }
            | Self::Load(_) => None
        }
    }
}

/// Decode failure raised by a string converter.
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("invalid integer: {source}")]
    InvalidInteger {
        #[from]
        source: ParseIntError
    },

    #[error("invalid floating point number: {source}")]
    InvalidFloat {
        #[from]
        source: ParseFloatError
    },

    #[error("expected exactly 'true' or 'false' but got '{value}'")]
    InvalidBoolean { value: String },

    #[error("'{value}' is not one of: {}", .allowed.join(", "))]
    UnknownSymbol { value: String, allowed: Vec<String> },

    #[error("no registered type is named '{identifier}'")]
    UnknownType { identifier: String },

    #[error("no provided path is an existing {kind}")]
    NoExistingCandidate { kind: String },

    #[error("{message}")]
    Other { message: String }
}

impl ConversionError {
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into()
        }
    }
}

/// Rejection raised by a validator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct ValidationError {
    pub reason: String
}

impl ValidationError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into()
        }
    }
}

/// Parameter file loading error.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("File not found: {}", .path.display())]
    FileNotFound { path: PathBuf },

    #[error("IO error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error
    },

    #[error("Malformed parameter line {line} in {origin}: {reason}")]
    MalformedLine {
        origin: String,
        line: usize,
        reason: String
    },

    #[error("Failed to parse TOML: {reason}")]
    TomlParse { reason: String },

    #[error("Failed to parse YAML: {reason}")]
    YamlParse { reason: String },

    #[error("Unsupported document shape: {reason}")]
    InvalidDocument { reason: String },

    #[error("Parameter file has no extension: {}", .path.display())]
    NoExtension { path: PathBuf }
}

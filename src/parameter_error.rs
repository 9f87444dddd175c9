//! Error handling for scan parameters

use std::io;

/// Unified error to report failures while loading and validating the projection parameters.
/// Any of these is fatal at startup: the node must not serve input with a bad configuration.
#[derive(Debug)]
pub enum ParameterError {
    IoError(io::Error),
    ParseError(String),
    UnknownParameter(String),
    WrongType { name: String, expected: &'static str },
    InvalidConfig(String),
}

impl std::fmt::Display for ParameterError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            ParameterError::IoError(ref err) =>
                write!(f, "IO Error: {}", err),
            ParameterError::ParseError(ref msg) =>
                write!(f, "Parse Error: {}", msg),
            ParameterError::UnknownParameter(ref name) =>
                write!(f, "Unknown Parameter: {}", name),
            ParameterError::WrongType { ref name, expected } =>
                write!(f, "Wrong Type: parameter '{}' must be {}", name, expected),
            ParameterError::InvalidConfig(ref msg) =>
                write!(f, "Invalid Config: {}", msg),
        }
    }
}

impl std::error::Error for ParameterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParameterError::IoError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for ParameterError {
    fn from(err: io::Error) -> Self {
        ParameterError::IoError(err)
    }
}

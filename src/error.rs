//! Defines the errors of the plugin backend.

use std::{error, fmt, io};

use crate::config::ConfigError;
use crate::tpp;


//------------ Error ---------------------------------------------------------

#[derive(Debug)]
pub enum Error {
    /// A required input was not provided.
    MissingInput(&'static str),

    /// A required input was provided but empty.
    EmptyInput(&'static str),

    /// The CA certificate could not be written to a temporary file.
    CaCertFile(io::Error),

    /// Talking to TPP failed.
    Tpp(tpp::Error),

    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::MissingInput(id) => write!(f, "Missing required input '{}'", id),
            Error::EmptyInput(id) => write!(f, "Required input '{}' is empty", id),
            Error::CaCertFile(e) => write!(f, "Cannot write CA certificate to temporary file: {}", e),
            Error::Tpp(e) => fmt::Display::fmt(e, f),
            Error::Config(e) => write!(f, "Configuration error: {}", e),
        }
    }
}

impl error::Error for Error {}

impl From<tpp::Error> for Error {
    fn from(e: tpp::Error) -> Self {
        Error::Tpp(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}


//------------ Tests ---------------------------------------------------------

//! Client side of the Venafi Trust Protection Platform.
//!
//! The [`Connector`] and [`SigningConnection`] traits describe what the
//! issuer needs from TPP: open a connection, trade credentials for a token,
//! submit an SSH certificate request and pick up the result. The
//! [`TppConnector`] implements them on top of the TPP REST API.

pub mod api;

mod auth;
mod connection;
mod request;

pub use self::auth::{AccessToken, Authentication, TokenInfo};
pub use self::connection::{normalize_base_url, ConnectorSettings, TppConnection, TppConnector};
pub use self::request::{SshCertRequest, SshRetrieveResponse};

use std::{error, fmt, path::Path};

use async_trait::async_trait;

use crate::httpclient;


//------------ ConnectTarget -------------------------------------------------

/// Where and as whom to connect.
#[derive(Clone, Copy, Debug)]
pub struct ConnectTarget<'a> {
    pub url: &'a str,
    pub username: &'a str,

    /// A PEM file with the CA certificate of the TPP web server.
    pub ca_cert: &'a Path,
}


//------------ Connector -----------------------------------------------------

/// Opens connections to a signing service.
pub trait Connector: Send + Sync {
    type Connection: SigningConnection;

    fn connect(&self, target: ConnectTarget<'_>) -> Result<Self::Connection, Error>;
}


//------------ SigningConnection ---------------------------------------------

/// A connection to a signing service.
#[async_trait]
pub trait SigningConnection: Send + Sync {
    /// Exchanges the credentials for an access token kept by the connection.
    async fn get_access_token(&mut self, auth: &Authentication<'_>) -> Result<TokenInfo, Error>;

    /// Submits the request.
    ///
    /// Returns whether the service accepted it. On success the request
    /// remembers where the service filed it.
    async fn request_ssh_cert(&self, request: &mut SshCertRequest) -> Result<bool, Error>;

    /// Fetches the outcome of a submitted request.
    async fn retrieve_ssh_cert(&self, request: &SshCertRequest) -> Result<SshRetrieveResponse, Error>;
}


//------------ Error ---------------------------------------------------------

#[derive(Debug)]
pub enum Error {
    Http(httpclient::Error),
    InvalidUrl(String, String),
    NotAuthenticated,
    NotSubmitted,
    Service(api::ResponseStatus),
}

impl Error {
    pub fn invalid_url(url: &str, msg: impl fmt::Display) -> Self {
        Error::InvalidUrl(url.to_string(), msg.to_string())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Http(e) => write!(f, "TPP request failed: {}", e),
            Error::InvalidUrl(url, msg) => write!(f, "Invalid TPP server URL '{}': {}", url, msg),
            Error::NotAuthenticated => f.write_str("No access token, authenticate first"),
            Error::NotSubmitted => f.write_str("SSH certificate request was not submitted"),
            Error::Service(status) => write!(f, "TPP reported an error: {}", status),
        }
    }
}

impl error::Error for Error {}

impl From<httpclient::Error> for Error {
    fn from(e: httpclient::Error) -> Self {
        Error::Http(e)
    }
}

//! Some helper functions for HTTP calls
use std::{error, fmt, fs, path::Path, time::Duration};

use log::{trace, warn};
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT},
    Response, StatusCode,
};
use serde::{de, de::DeserializeOwned, Deserialize, Deserializer, Serialize};

use crate::{constants::VENAFI_SSH_VERSION, tpp::api::ErrorResponse};

const JSON_CONTENT: &str = "application/json";


//------------ TlsVerification -----------------------------------------------

/// Whether the server certificate of TPP is verified.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum TlsVerification {
    /// Verify against the configured CA certificates and the system roots.
    #[default]
    Verify,

    /// Accept any server certificate.
    Insecure,
}

impl TlsVerification {
    pub fn is_insecure(self) -> bool {
        matches!(self, TlsVerification::Insecure)
    }
}

impl<'de> Deserialize<'de> for TlsVerification {
    fn deserialize<D>(d: D) -> Result<TlsVerification, D::Error>
    where
        D: Deserializer<'de>,
    {
        let string = String::deserialize(d)?;
        match string.as_str() {
            "verify" => Ok(TlsVerification::Verify),
            "insecure" => Ok(TlsVerification::Insecure),
            _ => Err(de::Error::custom(format!("expected \"verify\" or \"insecure\", found: \"{}\"", string))),
        }
    }
}


//------------ HttpSettings --------------------------------------------------

/// The knobs for the HTTP client talking to TPP.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct HttpSettings {
    pub timeout: Duration,
    pub tls_verification: TlsVerification,
}


//------------ Client --------------------------------------------------------

/// Loads all certificates of a PEM bundle, such as an intermediate and its root.
fn load_root_certs(path: &Path) -> Result<Vec<reqwest::Certificate>, Error> {
    let path_str = path.to_string_lossy();
    let pem = fs::read(path).map_err(|e| Error::request_build_https_cert(&path_str, e))?;
    let certs =
        reqwest::Certificate::from_pem_bundle(&pem).map_err(|e| Error::request_build_https_cert(&path_str, e))?;
    if certs.is_empty() {
        return Err(Error::request_build_https_cert(&path_str, "no certificate found"));
    }
    Ok(certs)
}

/// Creates a client that trusts the CA certificates in the given file in
/// addition to the system roots.
pub fn client(uri: &str, settings: HttpSettings, ca_cert: &Path) -> Result<reqwest::Client, Error> {
    let certs = load_root_certs(ca_cert)?;
    trace!("Trusting {} CA certificate(s) from {}", certs.len(), ca_cert.display());

    let mut builder = reqwest::ClientBuilder::new().timeout(settings.timeout);
    for cert in certs {
        builder = builder.add_root_certificate(cert);
    }

    if settings.tls_verification.is_insecure() {
        warn!("TLS certificate verification is disabled for {}", uri);
        builder = builder.danger_accept_invalid_certs(true);
    }
    builder.build().map_err(|e| Error::request_build(uri, e))
}

fn headers(uri: &str, content_type: Option<&str>, token: Option<&str>) -> Result<HeaderMap, Error> {
    let mut headers = HeaderMap::new();
    let ua_string = format!("venafi-ssh/{}", VENAFI_SSH_VERSION);
    headers.insert(
        USER_AGENT,
        HeaderValue::from_str(&ua_string).map_err(|e| Error::request_build(uri, e))?,
    );
    headers.insert(ACCEPT, HeaderValue::from_static(JSON_CONTENT));

    if let Some(content_type) = content_type {
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_str(content_type).map_err(|e| Error::request_build(uri, e))?,
        );
    }
    if let Some(token) = token {
        let mut value =
            HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|e| Error::request_build(uri, e))?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }
    Ok(headers)
}

/// Performs a POST of data that can be serialized into json, and expects
/// a json response that can be deserialized into the an owned value of the
/// expected type.
///
/// The request body is never logged as it may contain credentials.
pub async fn post_json_with_response<T: DeserializeOwned>(
    client: &reqwest::Client,
    uri: &str,
    data: impl Serialize,
    token: Option<&str>,
) -> Result<T, Error> {
    let body = serde_json::to_string(&data).map_err(|e| Error::request_build_json(uri, e))?;
    let headers = headers(uri, Some(JSON_CONTENT), token)?;

    trace!("POST {}", uri);
    let res = client
        .post(uri)
        .headers(headers)
        .body(body)
        .send()
        .await
        .map_err(|e| Error::execute(uri, e))?;

    process_json_response(uri, res).await
}

async fn process_json_response<T: DeserializeOwned>(uri: &str, res: Response) -> Result<T, Error> {
    match opt_text_response(uri, res).await? {
        None => Err(Error::response(uri, "got empty response body")),
        Some(s) => serde_json::from_str(&s)
            .map_err(|e| Error::response(uri, format!("could not parse JSON response: {}", e))),
    }
}

async fn opt_text_response(uri: &str, res: Response) -> Result<Option<String>, Error> {
    let status = res.status();
    if status.is_success() {
        match res.text().await.ok() {
            None => Ok(None),
            Some(s) => {
                if s.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(s))
                }
            }
        }
    } else if status == StatusCode::FORBIDDEN {
        Err(Error::Forbidden(uri.to_string()))
    } else {
        Err(Error::from_res(uri, res).await)
    }
}


//------------ Error ---------------------------------------------------------

type ErrorUri = String;
type RootCertPath = String;
type ErrorMessage = String;

#[derive(Debug)]
pub enum Error {
    RequestBuild(ErrorUri, ErrorMessage),
    RequestBuildHttpsCert(RootCertPath, ErrorMessage),

    RequestExecute(ErrorUri, ErrorMessage),

    Response(ErrorUri, ErrorMessage),
    Forbidden(ErrorUri),
    ErrorResponseWithBody(ErrorUri, StatusCode, String),
    ErrorResponseWithJson(ErrorUri, StatusCode, ErrorResponse),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::RequestBuild(uri, msg) => write!(f, "Issue creating request for URI: {}, error: {}", uri, msg),
            Error::RequestBuildHttpsCert(path, msg) => write!(f, "Cannot use CA certificate '{}': {}", path, msg),

            Error::RequestExecute(uri, msg) => write!(f, "Issue accessing URI: {}, error: {}", uri, msg),

            Error::Response(uri, msg) => write!(f, "Issue processing response from URI: {}, error: {}", uri, msg),
            Error::Forbidden(uri) => write!(f, "Got 'Forbidden' response for URI: {}", uri),
            Error::ErrorResponseWithBody(uri, code, e) => {
                write!(f, "Error response from URI: {}, Status: {}, Error: {}", uri, code, e)
            }
            Error::ErrorResponseWithJson(uri, code, res) => {
                write!(f, "Error response from URI: {}, Status: {}, ErrorResponse: {}", uri, code, res)
            }
        }
    }
}

impl error::Error for Error {}

impl Error {
    pub fn request_build(uri: &str, msg: impl fmt::Display) -> Self {
        Error::RequestBuild(uri.to_string(), msg.to_string())
    }

    pub fn request_build_json(uri: &str, e: impl fmt::Display) -> Self {
        Error::RequestBuild(uri.to_string(), format!("could not serialize type to JSON: {}", e))
    }

    pub fn request_build_https_cert(path: &str, msg: impl fmt::Display) -> Self {
        Error::RequestBuildHttpsCert(path.to_string(), msg.to_string())
    }

    pub fn execute(uri: &str, msg: impl fmt::Display) -> Self {
        Error::RequestExecute(uri.to_string(), msg.to_string())
    }

    pub fn response(uri: &str, msg: impl fmt::Display) -> Self {
        Error::Response(uri.to_string(), msg.to_string())
    }

    pub fn response_unexpected_status(uri: &str, status: StatusCode) -> Self {
        Error::Response(uri.to_string(), format!("unexpected status code {}", status))
    }

    /// Returns the HTTP status of an error response, if there was one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Forbidden(_) => Some(StatusCode::FORBIDDEN),
            Error::ErrorResponseWithBody(_, status, _) | Error::ErrorResponseWithJson(_, status, _) => Some(*status),
            _ => None,
        }
    }

    async fn from_res(uri: &str, res: Response) -> Error {
        let status = res.status();
        match res.text().await {
            Ok(body) => Self::from_status_and_body(uri, status, body),
            _ => Self::response_unexpected_status(uri, status),
        }
    }

    fn from_status_and_body(uri: &str, status: StatusCode, body: String) -> Error {
        if body.is_empty() {
            Self::response_unexpected_status(uri, status)
        } else {
            match serde_json::from_str::<ErrorResponse>(&body) {
                Ok(res) if res.is_meaningful() => Error::ErrorResponseWithJson(uri.to_string(), status, res),
                _ => Error::ErrorResponseWithBody(uri.to_string(), status, body),
            }
        }
    }
}


//------------ Tests ---------------------------------------------------------

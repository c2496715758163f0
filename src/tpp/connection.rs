//! The REST connection to TPP.

use std::{future::Future, time::Duration};

use async_trait::async_trait;
use log::{debug, info, warn};
use tokio::time::{sleep, Instant};
use url::Url;

use crate::constants::{TPP_URL_AUTHORIZE_TOKEN, TPP_URL_SSH_CERTIFICATE_REQUEST, TPP_URL_SSH_CERTIFICATE_RETRIEVE};
use crate::httpclient::{self, HttpSettings};

use super::{
    api, AccessToken, Authentication, ConnectTarget, Connector, Error, SigningConnection, SshCertRequest,
    SshRetrieveResponse, TokenInfo,
};


//------------ ConnectorSettings ---------------------------------------------

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ConnectorSettings {
    pub http: HttpSettings,

    /// How long to wait for a submitted request to be issued.
    pub retrieve_timeout: Duration,

    /// The pause between two retrieval attempts.
    pub retrieve_poll_interval: Duration,
}


//------------ TppConnector --------------------------------------------------

/// Opens REST connections to TPP.
#[derive(Clone, Debug)]
pub struct TppConnector {
    settings: ConnectorSettings,
}

impl TppConnector {
    pub fn new(settings: ConnectorSettings) -> Self {
        TppConnector { settings }
    }

    pub fn settings(&self) -> &ConnectorSettings {
        &self.settings
    }
}

impl Connector for TppConnector {
    type Connection = TppConnection;

    fn connect(&self, target: ConnectTarget<'_>) -> Result<TppConnection, Error> {
        let base = normalize_base_url(target.url)?;
        info!("Connecting to TPP at {} as '{}'", base, target.username);

        let client = httpclient::client(base.as_str(), self.settings.http, target.ca_cert)?;
        Ok(TppConnection::new(base, client, self.settings))
    }
}


//------------ TppConnection -------------------------------------------------

pub struct TppConnection {
    base: Url,
    client: reqwest::Client,
    token: Option<AccessToken>,
    settings: ConnectorSettings,
}

impl TppConnection {
    /// Creates an unauthenticated connection to the given base URL.
    ///
    /// The URL is used as is, it is not normalized.
    pub(crate) fn new(base: Url, client: reqwest::Client, settings: ConnectorSettings) -> Self {
        TppConnection { base, client, token: None, settings }
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<String, Error> {
        self.base.join(path).map(String::from).map_err(|e| Error::invalid_url(self.base.as_str(), e))
    }

    fn bearer(&self) -> Result<&str, Error> {
        self.token.as_ref().map(AccessToken::bearer).ok_or(Error::NotAuthenticated)
    }
}

#[async_trait]
impl SigningConnection for TppConnection {
    async fn get_access_token(&mut self, auth: &Authentication<'_>) -> Result<TokenInfo, Error> {
        let uri = self.endpoint(TPP_URL_AUTHORIZE_TOKEN)?;
        debug!(
            "Requesting token for '{}' with client id '{}' and scope '{}'",
            auth.user(),
            auth.client_id(),
            auth.scope()
        );

        let res: api::AuthorizeResponse =
            httpclient::post_json_with_response(&self.client, &uri, auth.to_api(), None).await?;

        let token = AccessToken::from(res);
        let info = token.info().clone();
        self.token = Some(token);
        Ok(info)
    }

    async fn request_ssh_cert(&self, request: &mut SshCertRequest) -> Result<bool, Error> {
        let token = self.bearer()?;
        let uri = self.endpoint(TPP_URL_SSH_CERTIFICATE_REQUEST)?;
        debug!("Submitting SSH certificate request for key id '{}' to CA '{}'", request.key_id(), request.cadn());

        let res: api::SshCertResponse =
            httpclient::post_json_with_response(&self.client, &uri, request.to_api(), Some(token)).await?;

        if !res.response.success {
            warn!("TPP rejected SSH certificate request for key id '{}': {}", request.key_id(), res.response);
            return Ok(false);
        }

        debug!(
            "SSH certificate request filed as '{}'",
            res.dn.as_deref().or(res.guid.as_deref()).unwrap_or("<unknown>")
        );
        request.set_submitted(res.dn, res.guid);
        Ok(true)
    }

    async fn retrieve_ssh_cert(&self, request: &SshCertRequest) -> Result<SshRetrieveResponse, Error> {
        let token = self.bearer()?;
        let body = request.to_retrieve_api().ok_or(Error::NotSubmitted)?;
        let uri = self.endpoint(TPP_URL_SSH_CERTIFICATE_RETRIEVE)?;

        let client = &self.client;
        let uri = uri.as_str();
        let body = &body;

        poll_until_issued(self.settings.retrieve_poll_interval, self.settings.retrieve_timeout, move || async move {
            httpclient::post_json_with_response(client, uri, body, Some(token)).await.map_err(Error::from)
        })
        .await
    }
}


//------------ Polling -------------------------------------------------------

/// Fetches until a certificate shows up or the timeout passes.
///
/// Returns the last response in the latter case, without certificate data.
/// A response that is not successful ends polling with an error. A timeout
/// too large to be added to the current time never passes.
async fn poll_until_issued<F, Fut>(
    interval: Duration,
    timeout: Duration,
    mut fetch: F,
) -> Result<SshRetrieveResponse, Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<api::SshRetrieveResponse, Error>>,
{
    let deadline = Instant::now().checked_add(timeout);
    loop {
        let res = fetch().await?;
        if !res.response.success {
            return Err(Error::Service(res.response));
        }

        let res = SshRetrieveResponse::from(res);
        if res.has_certificate() {
            return Ok(res);
        }

        let status = res.status.as_deref().unwrap_or("unknown");
        let out_of_time = match (Instant::now().checked_add(interval), deadline) {
            (Some(next), Some(deadline)) => next > deadline,
            (Some(_), None) => false,
            (None, _) => true,
        };
        if out_of_time {
            warn!("No SSH certificate after {}s, last status: {}", timeout.as_secs(), status);
            return Ok(res);
        }

        debug!("SSH certificate not issued yet, status: {}", status);
        sleep(interval).await;
    }
}


//------------ Base URL ------------------------------------------------------

/// Turns user input into the base URL of a TPP server.
///
/// Plain HTTP is upgraded to HTTPS, a missing scheme becomes HTTPS and a
/// trailing `vedsdk` path is dropped. What remains must be a server
/// address without a path.
pub fn normalize_base_url(raw: &str) -> Result<Url, Error> {
    let trimmed = raw.trim();
    let mut s = if let Some(rest) = trimmed.strip_prefix("http://") {
        format!("https://{}", rest)
    } else if trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    if !s.ends_with('/') {
        s.push('/');
    }
    if let Some(stripped) = s.strip_suffix("vedsdk/") {
        s = stripped.to_string();
    }

    let url = Url::parse(&s).map_err(|e| Error::invalid_url(raw, e))?;
    if url.host_str().is_none() {
        return Err(Error::invalid_url(raw, "no host"));
    }
    if url.path() != "/" || url.query().is_some() || url.fragment().is_some() {
        return Err(Error::invalid_url(raw, "expected a server address without a path"));
    }
    Ok(url)
}


//------------ Tests ---------------------------------------------------------

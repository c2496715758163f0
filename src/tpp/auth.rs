//! Token authentication against TPP.

use secrecy::{ExposeSecret, SecretString};

use crate::constants::DEFAULT_CLIENT_ID;

use super::api;


//------------ Authentication ------------------------------------------------

/// The credentials exchanged for an access token.
#[derive(Debug)]
pub struct Authentication<'a> {
    user: &'a str,
    password: &'a SecretString,
    scope: &'a str,
    client_id: &'a str,
}

impl<'a> Authentication<'a> {
    /// Creates an authentication for the default client id.
    pub fn new(user: &'a str, password: &'a SecretString, scope: &'a str) -> Self {
        Authentication { user, password, scope, client_id: DEFAULT_CLIENT_ID }
    }

    pub fn with_client_id(mut self, client_id: &'a str) -> Self {
        self.client_id = client_id;
        self
    }

    pub fn user(&self) -> &str {
        self.user
    }

    pub fn scope(&self) -> &str {
        self.scope
    }

    pub fn client_id(&self) -> &str {
        self.client_id
    }

    pub(super) fn to_api(&self) -> api::AuthorizeRequest<'_> {
        api::AuthorizeRequest {
            client_id: self.client_id,
            username: self.user,
            password: self.password.expose_secret(),
            scope: self.scope,
        }
    }
}


//------------ AccessToken ---------------------------------------------------

/// A bearer token handed out by TPP.
#[derive(Debug)]
pub struct AccessToken {
    token: SecretString,
    info: TokenInfo,
}

impl AccessToken {
    pub fn new(token: String, info: TokenInfo) -> Self {
        AccessToken { token: SecretString::from(token), info }
    }

    pub fn bearer(&self) -> &str {
        self.token.expose_secret()
    }

    pub fn info(&self) -> &TokenInfo {
        &self.info
    }
}

impl From<api::AuthorizeResponse> for AccessToken {
    fn from(res: api::AuthorizeResponse) -> Self {
        let info = TokenInfo {
            expires: res.expires,
            token_type: res.token_type,
            scope: res.scope,
            identity: res.identity,
            refreshable: res.refresh_token.is_some(),
        };
        AccessToken::new(res.access_token, info)
    }
}


//------------ TokenInfo -----------------------------------------------------

/// The non-secret parts of a token response.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TokenInfo {
    /// Expiry as seconds since the Unix epoch.
    pub expires: Option<i64>,
    pub token_type: Option<String>,
    pub scope: Option<String>,
    pub identity: Option<String>,
    pub refreshable: bool,
}


//------------ Tests ---------------------------------------------------------

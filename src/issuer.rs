//! Issuing SSH certificates.
//!
//! The [`SshCertificateIssuer`] is the backend of the plugin. For every
//! call it writes the CA certificate to a temporary file, connects to TPP,
//! authenticates, submits a signing request for the public key and picks
//! up the signed certificate.

use std::{collections::HashMap, fmt};

use log::{debug, info, warn};
use secrecy::SecretString;
use serde::Deserialize;

use crate::certfile::ScopedCaCertFile;
use crate::constants::{DEFAULT_CA_DN, DEFAULT_CLIENT_ID, DEFAULT_POLICY_DN, DEFAULT_VALIDITY_PERIOD, TPP_SCOPE_SSH};
use crate::error::Error;
use crate::tpp::{Authentication, ConnectTarget, Connector, SigningConnection, SshCertRequest};


//------------ Inputs --------------------------------------------------------

/// The merged field and metadata values handed over by the host.
pub type Inputs = HashMap<String, String>;


//------------ IssuerDefaults ------------------------------------------------

/// The values used for optional inputs that were left out.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub struct IssuerDefaults {
    pub client_id: String,
    pub ca_dn: String,
    pub policy_dn: String,
    pub validity_period: String,
}

impl Default for IssuerDefaults {
    fn default() -> Self {
        IssuerDefaults {
            client_id: DEFAULT_CLIENT_ID.to_string(),
            ca_dn: DEFAULT_CA_DN.to_string(),
            policy_dn: DEFAULT_POLICY_DN.to_string(),
            validity_period: DEFAULT_VALIDITY_PERIOD.to_string(),
        }
    }
}


//------------ IssuanceRequest -----------------------------------------------

/// The parameters of a single issuance.
///
/// Optional values that are `None` are taken from the issuer's
/// [`IssuerDefaults`].
#[derive(Debug)]
pub struct IssuanceRequest {
    pub url: String,
    pub username: String,
    pub password: SecretString,
    pub cacert: String,
    pub key_id: String,
    pub valid_principals: String,
    pub public_key: String,

    pub client_id: Option<String>,
    pub ca_dn: Option<String>,
    pub policy_dn: Option<String>,
    pub validity_period: Option<String>,
}

impl IssuanceRequest {
    /// The ids of the inputs that must be present and not empty.
    pub const REQUIRED: [&'static str; 7] =
        ["url", "username", "password", "cacert", "key_id", "valid_principals", "public_key"];

    /// Builds a request from the host's key/value mapping.
    ///
    /// Fails on the first required key that is missing or empty, in the
    /// order of [`Self::REQUIRED`]. Optional values that are empty count as
    /// left out. Unknown keys are ignored.
    pub fn from_inputs(inputs: &Inputs) -> Result<Self, Error> {
        for id in Self::REQUIRED {
            match inputs.get(id) {
                None => return Err(Error::MissingInput(id)),
                Some(value) if value.trim().is_empty() => return Err(Error::EmptyInput(id)),
                Some(_) => {}
            }
        }

        let required = |id: &str| inputs.get(id).cloned().unwrap_or_default();
        let optional = |id: &str| inputs.get(id).filter(|value| !value.trim().is_empty()).cloned();

        Ok(IssuanceRequest {
            url: required("url"),
            username: required("username"),
            password: SecretString::from(required("password")),
            cacert: required("cacert"),
            key_id: required("key_id"),
            valid_principals: required("valid_principals"),
            public_key: required("public_key"),
            client_id: optional("client_id"),
            ca_dn: optional("ca_dn"),
            policy_dn: optional("policy_dn"),
            validity_period: optional("validity_period"),
        })
    }
}


//------------ IssuedCertificate ---------------------------------------------

/// A signed SSH certificate as returned by TPP.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IssuedCertificate(String);

impl IssuedCertificate {
    pub fn new(data: impl Into<String>) -> Self {
        IssuedCertificate(data.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for IssuedCertificate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}


//------------ SshCertificateIssuer ------------------------------------------

/// Has a signing service issue SSH certificates.
#[derive(Clone, Debug)]
pub struct SshCertificateIssuer<C> {
    connector: C,
    defaults: IssuerDefaults,
}

impl<C> SshCertificateIssuer<C> {
    pub fn new(connector: C, defaults: IssuerDefaults) -> Self {
        SshCertificateIssuer { connector, defaults }
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    pub fn defaults(&self) -> &IssuerDefaults {
        &self.defaults
    }
}

impl<C: Connector> SshCertificateIssuer<C> {
    /// Validates the host's inputs and issues a certificate.
    pub async fn issue_from_inputs(&self, inputs: &Inputs) -> Result<Option<IssuedCertificate>, Error> {
        let params = IssuanceRequest::from_inputs(inputs)?;
        self.issue(&params).await
    }

    /// Issues a certificate.
    ///
    /// Returns `Ok(None)` if TPP declined the signing request or did not
    /// produce a certificate in time. Every other problem is an error.
    pub async fn issue(&self, params: &IssuanceRequest) -> Result<Option<IssuedCertificate>, Error> {
        let client_id = params.client_id.as_deref().unwrap_or(&self.defaults.client_id);
        let ca_dn = params.ca_dn.as_deref().unwrap_or(&self.defaults.ca_dn);
        let policy_dn = params.policy_dn.as_deref().unwrap_or(&self.defaults.policy_dn);
        let validity_period = params.validity_period.as_deref().unwrap_or(&self.defaults.validity_period);

        info!("Requesting SSH certificate for key id '{}' from {}", params.key_id, params.url);

        let ca_cert = ScopedCaCertFile::create(&params.cacert).map_err(Error::CaCertFile)?;

        let mut connection = self.connector.connect(ConnectTarget {
            url: &params.url,
            username: &params.username,
            ca_cert: ca_cert.path(),
        })?;

        // The connection has loaded the certificate.
        if let Err(err) = ca_cert.close() {
            warn!("Cannot remove temporary CA certificate file: {}", err);
        }

        let auth = Authentication::new(&params.username, &params.password, TPP_SCOPE_SSH).with_client_id(client_id);
        let token = connection.get_access_token(&auth).await?;
        debug!(
            "Authenticated as '{}', token expires at {:?}",
            token.identity.as_deref().unwrap_or(&params.username),
            token.expires
        );

        let mut request = SshCertRequest::new(ca_dn, &params.key_id, policy_dn);
        request.set_validity_period(validity_period);
        request.set_public_key_data(&params.public_key);
        request.set_principals(vec![params.valid_principals.clone()]);

        if !connection.request_ssh_cert(&mut request).await? {
            warn!("No SSH certificate for key id '{}': request was declined", params.key_id);
            return Ok(None);
        }

        let response = connection.retrieve_ssh_cert(&request).await?;
        match response.certificate_data {
            Some(data) => {
                info!("Issued SSH certificate for key id '{}'", params.key_id);
                Ok(Some(IssuedCertificate::new(data)))
            }
            None => {
                warn!("No SSH certificate for key id '{}': none was issued", params.key_id);
                Ok(None)
            }
        }
    }
}


//------------ Tests ---------------------------------------------------------

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;
    use crate::schema::CredentialSchema;

    fn inputs() -> Inputs {
        [
            ("url", "someurl"),
            ("username", "user1"),
            ("password", "password1"),
            ("cacert", "somecert"),
            ("key_id", "somekeyid"),
            ("valid_principals", "aprinciple"),
            ("public_key", "somekey"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn should_build_request_from_inputs() {
        let req = IssuanceRequest::from_inputs(&inputs()).unwrap();
        assert_eq!(req.url, "someurl");
        assert_eq!(req.password.expose_secret(), "password1");
        assert_eq!(req.valid_principals, "aprinciple");
        assert_eq!(req.client_id, None);
        assert_eq!(req.validity_period, None);
    }

    #[test]
    fn should_fail_fast_on_missing_input() {
        let mut inputs = inputs();
        inputs.remove("public_key");
        assert!(matches!(IssuanceRequest::from_inputs(&inputs), Err(Error::MissingInput("public_key"))));
    }

    #[test]
    fn should_reject_empty_required_input() {
        let mut inputs = inputs();
        inputs.insert("key_id".into(), "  ".into());
        assert!(matches!(IssuanceRequest::from_inputs(&inputs), Err(Error::EmptyInput("key_id"))));
    }

    #[test]
    fn should_treat_empty_optional_input_as_absent() {
        let mut inputs = inputs();
        inputs.insert("client_id".into(), "".into());
        inputs.insert("ca_dn".into(), "\\VED\\Policy\\Other CA".into());
        let req = IssuanceRequest::from_inputs(&inputs).unwrap();
        assert_eq!(req.client_id, None);
        assert_eq!(req.ca_dn.as_deref(), Some("\\VED\\Policy\\Other CA"));
    }

    #[test]
    fn should_not_show_password_in_debug() {
        let req = IssuanceRequest::from_inputs(&inputs()).unwrap();
        assert!(!format!("{:?}", req).contains("password1"));
    }

    #[test]
    fn required_inputs_match_schema() {
        let schema = CredentialSchema::venafi_ssh();
        let mut required = schema.required.clone();
        required.sort_unstable();
        let mut own = IssuanceRequest::REQUIRED.to_vec();
        own.sort_unstable();
        assert_eq!(required, own);
    }

    #[test]
    fn default_values_are_fixed_literals() {
        let defaults = IssuerDefaults::default();
        assert_eq!(defaults.client_id, "SSH_IAAS");
        assert_eq!(defaults.ca_dn, "\\VED\\Policy\\Administration\\CAs\\MSCA - Web Server (1 Year)");
        assert_eq!(defaults.policy_dn, "\\VED\\Policy\\SSH\\SSH Certificates\\Application 1");
        assert_eq!(defaults.validity_period, "15m");
    }
}

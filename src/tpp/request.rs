//! SSH certificate signing requests.

use super::api;


//------------ SshCertRequest ------------------------------------------------

/// A request to have TPP sign an SSH public key.
///
/// Submitting the request records where TPP filed it. The same value is
/// then used to retrieve the issued certificate.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SshCertRequest {
    cadn: String,
    key_id: String,
    policy_dn: String,
    validity_period: String,
    public_key_data: Option<String>,
    principals: Vec<String>,

    pickup_id: Option<String>,
    guid: Option<String>,
}

impl SshCertRequest {
    pub fn new(cadn: impl Into<String>, key_id: impl Into<String>, policy_dn: impl Into<String>) -> Self {
        SshCertRequest {
            cadn: cadn.into(),
            key_id: key_id.into(),
            policy_dn: policy_dn.into(),
            validity_period: String::new(),
            public_key_data: None,
            principals: Vec::new(),
            pickup_id: None,
            guid: None,
        }
    }

    pub fn cadn(&self) -> &str {
        &self.cadn
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    pub fn policy_dn(&self) -> &str {
        &self.policy_dn
    }

    pub fn validity_period(&self) -> &str {
        &self.validity_period
    }

    pub fn set_validity_period(&mut self, period: impl Into<String>) {
        self.validity_period = period.into();
    }

    pub fn public_key_data(&self) -> Option<&str> {
        self.public_key_data.as_deref()
    }

    /// Sets the OpenSSH public key to be signed, as is.
    pub fn set_public_key_data(&mut self, key: impl Into<String>) {
        self.public_key_data = Some(key.into());
    }

    pub fn principals(&self) -> &[String] {
        &self.principals
    }

    pub fn set_principals(&mut self, principals: Vec<String>) {
        self.principals = principals;
    }

    /// The DN under which TPP filed the request, once submitted.
    pub fn pickup_id(&self) -> Option<&str> {
        self.pickup_id.as_deref()
    }

    pub fn guid(&self) -> Option<&str> {
        self.guid.as_deref()
    }

    pub fn is_submitted(&self) -> bool {
        self.pickup_id.is_some() || self.guid.is_some()
    }

    pub fn set_submitted(&mut self, pickup_id: Option<String>, guid: Option<String>) {
        self.pickup_id = pickup_id;
        self.guid = guid;
    }

    pub(super) fn to_api(&self) -> api::SshCertRequestBody<'_> {
        api::SshCertRequestBody {
            cadn: &self.cadn,
            policy_dn: &self.policy_dn,
            key_id: &self.key_id,
            principals: &self.principals,
            validity_period: &self.validity_period,
            public_key_data: self.public_key_data.as_deref(),
        }
    }

    /// Returns the retrieval body, or `None` if not yet submitted.
    ///
    /// The DN is preferred over the GUID when both are known.
    pub(super) fn to_retrieve_api(&self) -> Option<api::SshRetrieveRequestBody<'_>> {
        if !self.is_submitted() {
            return None;
        }
        let dn = self.pickup_id.as_deref();
        Some(api::SshRetrieveRequestBody {
            dn,
            guid: if dn.is_none() { self.guid.as_deref() } else { None },
            include_certificate_details: true,
        })
    }
}


//------------ SshRetrieveResponse -------------------------------------------

/// What TPP returned for a submitted request.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SshRetrieveResponse {
    /// The signed certificate, absent if not (yet) issued.
    pub certificate_data: Option<String>,
    pub public_key_data: Option<String>,
    pub certificate_details: Option<serde_json::Value>,
    pub status: Option<String>,
}

impl SshRetrieveResponse {
    pub fn with_certificate(data: impl Into<String>) -> Self {
        SshRetrieveResponse { certificate_data: Some(data.into()), ..Default::default() }
    }

    pub fn has_certificate(&self) -> bool {
        self.certificate_data.is_some()
    }
}

impl From<api::SshRetrieveResponse> for SshRetrieveResponse {
    fn from(res: api::SshRetrieveResponse) -> Self {
        SshRetrieveResponse {
            certificate_data: res.certificate_data.filter(|data| !data.trim().is_empty()),
            public_key_data: res.public_key_data,
            certificate_details: res.certificate_details,
            status: res.processing_details.and_then(|details| details.status),
        }
    }
}


//------------ Tests ---------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> SshCertRequest {
        let mut req = SshCertRequest::new("\\VED\\CA", "job-42", "\\VED\\Policy\\SSH");
        req.set_validity_period("1h");
        req.set_public_key_data("ssh-rsa AAAAB3Nza user@host\n");
        req.set_principals(vec!["root".to_string()]);
        req
    }

    #[test]
    fn should_pass_public_key_unchanged() {
        let req = request();
        assert_eq!(req.to_api().public_key_data, Some("ssh-rsa AAAAB3Nza user@host\n"));
        assert_eq!(req.to_api().principals, ["root".to_string()]);
    }

    #[test]
    fn should_not_retrieve_before_submission() {
        assert!(request().to_retrieve_api().is_none());
    }

    #[test]
    fn should_prefer_dn_for_retrieval() {
        let mut req = request();
        req.set_submitted(Some("\\VED\\Policy\\SSH\\job-42".into()), Some("{g}".into()));
        let body = req.to_retrieve_api().unwrap();
        assert_eq!(body.dn, Some("\\VED\\Policy\\SSH\\job-42"));
        assert_eq!(body.guid, None);

        req.set_submitted(None, Some("{g}".into()));
        let body = req.to_retrieve_api().unwrap();
        assert_eq!(body.dn, None);
        assert_eq!(body.guid, Some("{g}"));
    }

    #[test]
    fn should_treat_blank_certificate_data_as_missing() {
        let json = r#"{
            "CertificateData": "",
            "ProcessingDetails": {"Status": "Pending Issue"},
            "Response": {"Success": true}
        }"#;
        let res: api::SshRetrieveResponse = serde_json::from_str(json).unwrap();
        let res = SshRetrieveResponse::from(res);
        assert!(!res.has_certificate());
        assert_eq!(res.status.as_deref(), Some("Pending Issue"));
    }
}

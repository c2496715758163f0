//! JSON bodies exchanged with the TPP REST API.
//!
//! The `vedsdk` endpoints use PascalCase member names, the OAuth endpoint
//! under `vedauth` uses snake_case.

use std::fmt;

use serde::{Deserialize, Serialize};


//------------ AuthorizeRequest ----------------------------------------------

#[derive(Clone, Debug, Serialize)]
pub struct AuthorizeRequest<'a> {
    pub client_id: &'a str,
    pub username: &'a str,
    pub password: &'a str,
    pub scope: &'a str,
}


//------------ AuthorizeResponse ---------------------------------------------

#[derive(Clone, Debug, Deserialize)]
pub struct AuthorizeResponse {
    pub access_token: String,

    #[serde(default)]
    pub refresh_token: Option<String>,

    #[serde(default)]
    pub expires: Option<i64>,

    #[serde(default)]
    pub token_type: Option<String>,

    #[serde(default)]
    pub scope: Option<String>,

    #[serde(default)]
    pub identity: Option<String>,
}


//------------ ResponseStatus ------------------------------------------------

/// The `Response` member of the SSH certificate endpoints.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ResponseStatus {
    #[serde(default)]
    pub success: bool,

    #[serde(default)]
    pub error_code: Option<i64>,

    #[serde(default)]
    pub error_message: Option<String>,
}

impl fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (&self.error_message, self.error_code) {
            (Some(msg), Some(code)) => write!(f, "{} (code {})", msg, code),
            (Some(msg), None) => f.write_str(msg),
            (None, Some(code)) => write!(f, "error code {}", code),
            (None, None) => f.write_str("no error details"),
        }
    }
}


//------------ ProcessingDetails ---------------------------------------------

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ProcessingDetails {
    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub status_description: Option<String>,
}


//------------ SshCertRequestBody --------------------------------------------

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SshCertRequestBody<'a> {
    #[serde(rename = "CADN")]
    pub cadn: &'a str,

    #[serde(rename = "PolicyDN")]
    pub policy_dn: &'a str,

    pub key_id: &'a str,

    pub principals: &'a [String],

    pub validity_period: &'a str,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key_data: Option<&'a str>,
}


//------------ SshCertResponse -----------------------------------------------

#[derive(Clone, Debug, Deserialize)]
pub struct SshCertResponse {
    #[serde(rename = "DN", default)]
    pub dn: Option<String>,

    #[serde(rename = "Guid", default)]
    pub guid: Option<String>,

    #[serde(rename = "ProcessingDetails", default)]
    pub processing_details: Option<ProcessingDetails>,

    #[serde(rename = "Response", default)]
    pub response: ResponseStatus,
}


//------------ SshRetrieveRequestBody ----------------------------------------

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SshRetrieveRequestBody<'a> {
    #[serde(rename = "DN", skip_serializing_if = "Option::is_none")]
    pub dn: Option<&'a str>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub guid: Option<&'a str>,

    pub include_certificate_details: bool,
}


//------------ SshRetrieveResponse -------------------------------------------

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SshRetrieveResponse {
    #[serde(default)]
    pub certificate_data: Option<String>,

    #[serde(default)]
    pub certificate_details: Option<serde_json::Value>,

    #[serde(default)]
    pub public_key_data: Option<String>,

    #[serde(default)]
    pub processing_details: Option<ProcessingDetails>,

    #[serde(default)]
    pub response: ResponseStatus,
}


//------------ ErrorResponse -------------------------------------------------

/// The body of a TPP error response.
///
/// The OAuth endpoint answers with `error` and `error_description`, the
/// SDK endpoints with a single `Error`.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
pub struct ErrorResponse {
    #[serde(default, alias = "Error")]
    pub error: Option<String>,

    #[serde(default)]
    pub error_description: Option<String>,
}

impl ErrorResponse {
    pub fn is_meaningful(&self) -> bool {
        self.error.is_some() || self.error_description.is_some()
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (&self.error, &self.error_description) {
            (Some(error), Some(desc)) => write!(f, "{}: {}", error, desc),
            (Some(error), None) => f.write_str(error),
            (None, Some(desc)) => f.write_str(desc),
            (None, None) => f.write_str("unknown error"),
        }
    }
}


//------------ Tests ---------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_uses_tpp_member_names() {
        let principals = vec!["deploy".to_string()];
        let body = SshCertRequestBody {
            cadn: "\\VED\\Certificate Authority\\SSH\\Templates\\Tpl",
            policy_dn: "\\VED\\Policy\\SSH",
            key_id: "job-42",
            principals: &principals,
            validity_period: "15m",
            public_key_data: Some("ssh-ed25519 AAAAC3Nza test"),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["CADN"], "\\VED\\Certificate Authority\\SSH\\Templates\\Tpl");
        assert_eq!(json["PolicyDN"], "\\VED\\Policy\\SSH");
        assert_eq!(json["KeyId"], "job-42");
        assert_eq!(json["Principals"], serde_json::json!(["deploy"]));
        assert_eq!(json["ValidityPeriod"], "15m");
        assert_eq!(json["PublicKeyData"], "ssh-ed25519 AAAAC3Nza test");
    }

    #[test]
    fn retrieve_body_omits_missing_locator() {
        let body = SshRetrieveRequestBody {
            dn: Some("\\VED\\Policy\\SSH\\job-42"),
            guid: None,
            include_certificate_details: true,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["DN"], "\\VED\\Policy\\SSH\\job-42");
        assert!(json.get("Guid").is_none());
        assert_eq!(json["IncludeCertificateDetails"], true);
    }

    #[test]
    fn should_parse_request_response() {
        let json = r#"{
            "DN": "\\VED\\Policy\\SSH\\job-42",
            "Guid": "{2cc2b8a5-a8b3-4ef0-a4a5-37e1b1ca5f75}",
            "ProcessingDetails": {},
            "Response": { "Success": true }
        }"#;
        let res: SshCertResponse = serde_json::from_str(json).unwrap();
        assert!(res.response.success);
        assert_eq!(res.dn.as_deref(), Some("\\VED\\Policy\\SSH\\job-42"));
        assert_eq!(res.processing_details, Some(ProcessingDetails::default()));
    }

    #[test]
    fn should_parse_rejected_request_response() {
        let json = r#"{
            "Response": {
                "Success": false,
                "ErrorCode": 8193,
                "ErrorMessage": "Policy does not allow principal"
            }
        }"#;
        let res: SshCertResponse = serde_json::from_str(json).unwrap();
        assert!(!res.response.success);
        assert_eq!(res.response.to_string(), "Policy does not allow principal (code 8193)");
    }

    #[test]
    fn should_parse_retrieve_response() {
        let json = r#"{
            "CertificateData": "ssh-ed25519-cert-v01@openssh.com AAAA",
            "CertificateDetails": { "KeyID": "job-42" },
            "PrivateKeyData": null,
            "PublicKeyData": "ssh-ed25519 AAAAC3Nza",
            "ProcessingDetails": { "Status": "Issued" },
            "Response": { "Success": true }
        }"#;
        let res: SshRetrieveResponse = serde_json::from_str(json).unwrap();
        assert_eq!(res.certificate_data.as_deref(), Some("ssh-ed25519-cert-v01@openssh.com AAAA"));
        assert_eq!(res.processing_details.unwrap().status.as_deref(), Some("Issued"));
    }

    #[test]
    fn should_parse_both_error_shapes() {
        let oauth: ErrorResponse =
            serde_json::from_str(r#"{"error":"invalid_client","error_description":"Client not registered"}"#).unwrap();
        assert_eq!(oauth.to_string(), "invalid_client: Client not registered");

        let sdk: ErrorResponse = serde_json::from_str(r#"{"Error":"Not authorized"}"#).unwrap();
        assert_eq!(sdk.to_string(), "Not authorized");

        let other: ErrorResponse = serde_json::from_str(r#"{"Message":"x"}"#).unwrap();
        assert!(!other.is_meaningful());
    }
}

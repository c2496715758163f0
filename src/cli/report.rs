//! Formatting the outcome of a command for the user.

use std::{error, fmt, fmt::Write, str::FromStr};

use serde::Serialize;

use crate::issuer::IssuedCertificate;
use crate::plugin::PluginDescription;
use crate::schema::{CredentialSchema, FieldDescriptor};


//------------ Report --------------------------------------------------------

/// The result of a command.
#[derive(Clone, Debug)]
pub enum Report {
    Schema { name: &'static str, inputs: CredentialSchema },
    Certificate(IssuedCertificate),
    NoCertificate,
}

impl Report {
    pub fn schema(description: PluginDescription<'_>) -> Self {
        Report::Schema { name: description.name, inputs: description.inputs.clone() }
    }

    /// Returns the output for the given format.
    ///
    /// Returns `None` if there is nothing to print on stdout.
    pub fn report(&self, format: ReportFormat) -> Result<Option<String>, ReportError> {
        match format {
            ReportFormat::Json => self.json().map(Some),
            ReportFormat::Text => Ok(self.text()),
        }
    }

    /// The process exit status for this outcome.
    pub fn exit_code(&self) -> i32 {
        match self {
            Report::NoCertificate => 2,
            _ => 0,
        }
    }

    fn json(&self) -> Result<String, ReportError> {
        let res = match self {
            Report::Schema { name, inputs } => serde_json::to_string_pretty(&PluginDescription { name: *name, inputs }),
            Report::Certificate(cert) => {
                serde_json::to_string_pretty(&CertificateJson { certificate: Some(cert.as_str()) })
            }
            Report::NoCertificate => serde_json::to_string_pretty(&CertificateJson { certificate: None }),
        };
        res.map_err(ReportError::Json)
    }

    fn text(&self) -> Option<String> {
        match self {
            Report::Schema { name, inputs } => {
                let mut res = String::new();
                let _ = writeln!(res, "{}", name);
                Self::text_section(&mut res, "Fields", &inputs.fields, inputs);
                Self::text_section(&mut res, "Metadata", &inputs.metadata, inputs);
                Some(res)
            }
            Report::Certificate(cert) => Some(cert.to_string()),
            Report::NoCertificate => None,
        }
    }

    fn text_section(res: &mut String, title: &str, section: &[FieldDescriptor], inputs: &CredentialSchema) {
        let _ = writeln!(res, "\n{}:", title);
        for field in section {
            let _ = write!(res, "  {:<18} {}", field.id, field.label);
            if inputs.is_required(field.id) {
                res.push_str(" (required)");
            }
            if field.is_secret() {
                res.push_str(" (secret)");
            }
            res.push('\n');
        }
    }
}

#[derive(Serialize)]
struct CertificateJson<'a> {
    certificate: Option<&'a str>,
}


//------------ ReportFormat --------------------------------------------------

/// The format to use when printing a report.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReportFormat {
    Json,
    Text,
}

impl FromStr for ReportFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, ReportError> {
        match s {
            "json" => Ok(ReportFormat::Json),
            "text" => Ok(ReportFormat::Text),
            _ => Err(ReportError::UnrecognisedFormat(s.to_string())),
        }
    }
}


//------------ ReportError ---------------------------------------------------

#[derive(Debug)]
pub enum ReportError {
    UnrecognisedFormat(String),
    Json(serde_json::Error),
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ReportError::UnrecognisedFormat(s) => write!(f, "This report format is not recognised: {}", s),
            ReportError::Json(e) => write!(f, "Cannot format as JSON: {}", e),
        }
    }
}

impl error::Error for ReportError {}


//------------ Tests ---------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_parse_formats() {
        assert_eq!(ReportFormat::from_str("json").unwrap(), ReportFormat::Json);
        assert_eq!(ReportFormat::from_str("text").unwrap(), ReportFormat::Text);
        assert!(matches!(ReportFormat::from_str("xml"), Err(ReportError::UnrecognisedFormat(_))));
    }

    #[test]
    fn should_print_certificate_as_is() {
        let report = Report::Certificate(IssuedCertificate::new("CERT123"));
        assert_eq!(report.report(ReportFormat::Text).unwrap().as_deref(), Some("CERT123"));
        let output = report.report(ReportFormat::Json).unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(json["certificate"], "CERT123");
        assert_eq!(report.exit_code(), 0);
    }

    #[test]
    fn should_report_missing_certificate() {
        let report = Report::NoCertificate;
        assert_eq!(report.report(ReportFormat::Text).unwrap(), None);
        let output = report.report(ReportFormat::Json).unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert!(json["certificate"].is_null());
        assert_eq!(report.exit_code(), 2);
    }

    #[test]
    fn should_list_schema_as_text() {
        let report = Report::Schema { name: "Venafi Signed SSH", inputs: CredentialSchema::venafi_ssh() };
        let text = report.report(ReportFormat::Text).unwrap().unwrap();
        assert!(text.starts_with("Venafi Signed SSH\n"));
        assert!(text.contains("password"));
        assert!(text.contains("(secret)"));
        assert!(text.contains("\nMetadata:\n"));
    }
}

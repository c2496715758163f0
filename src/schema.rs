//! The input schema the plugin declares to its host.
//!
//! The host platform renders the schema as a form. Values of the `fields`
//! are entered once, when a credential of this type is created. They are
//! the connection details for TPP. Values of the `metadata` are entered
//! every time another credential is linked to this one and describe the
//! certificate that should be signed.

use std::{collections::HashSet, error, fmt};

use serde::Serialize;


//------------ FieldType -----------------------------------------------------

/// The value type of a field.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
}


//------------ FieldFormat ---------------------------------------------------

/// A rendering hint for string fields.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldFormat {
    Url,
}


//------------ FieldDescriptor -----------------------------------------------

/// A single entry of a credential schema.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct FieldDescriptor {
    pub id: &'static str,
    pub label: &'static str,

    #[serde(rename = "type")]
    pub field_type: FieldType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<FieldFormat>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiline: Option<bool>,

    pub help_text: &'static str,
}

impl FieldDescriptor {
    /// Creates a plain string field.
    pub const fn string(id: &'static str, label: &'static str, help_text: &'static str) -> Self {
        FieldDescriptor {
            id,
            label,
            field_type: FieldType::String,
            format: None,
            secret: None,
            multiline: None,
            help_text,
        }
    }

    pub const fn with_format(mut self, format: FieldFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub const fn with_secret(mut self, secret: bool) -> Self {
        self.secret = Some(secret);
        self
    }

    pub const fn with_multiline(mut self, multiline: bool) -> Self {
        self.multiline = Some(multiline);
        self
    }

    pub fn is_secret(&self) -> bool {
        self.secret.unwrap_or(false)
    }
}


//------------ CredentialSchema ----------------------------------------------

/// The complete input declaration of a credential plugin.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct CredentialSchema {
    pub fields: Vec<FieldDescriptor>,
    pub metadata: Vec<FieldDescriptor>,
    pub required: Vec<&'static str>,
}

impl CredentialSchema {
    /// Returns the schema of the Venafi SSH certificate plugin.
    pub fn venafi_ssh() -> Self {
        CredentialSchema {
            fields: vec![
                FieldDescriptor::string("url", "Server URL", "The URL of the Venafi Server.")
                    .with_format(FieldFormat::Url),
                FieldDescriptor::string("username", "API username", "The API username for the Venafi Server.")
                    .with_multiline(false),
                FieldDescriptor::string("password", "API password", "The API password of the Venafi Server.")
                    .with_secret(true)
                    .with_multiline(false),
                FieldDescriptor::string(
                    "cacert",
                    "CA Certificate",
                    "The CA certificate used to verify the API web certificate of the Venafi server.",
                )
                .with_multiline(true),
            ],
            metadata: vec![
                FieldDescriptor::string(
                    "key_id",
                    "SSH Certificate ID",
                    "Is a \"key identifier\" that is logged by the server when the certificate is used for \
                     authentication.",
                )
                .with_multiline(false),
                FieldDescriptor::string(
                    "valid_principals",
                    "Valid Principals",
                    "Valid principals (either usernames or hostnames) that the certificate should be signed for.",
                )
                .with_multiline(false),
                FieldDescriptor::string(
                    "public_key",
                    "Unsigned Public Key",
                    "Unsigned Public Key of the private key used for authentication to the client.",
                )
                .with_multiline(true),
                FieldDescriptor::string(
                    "client_id",
                    "Venafi Client ID",
                    "Change the default client id for a custom one. Make sure this id has been registered on the \
                     TPP instance beforehand",
                ),
                FieldDescriptor::string("ca_dn", "CA DN", "Certificate Authority DN").with_multiline(false),
                FieldDescriptor::string("policy_dn", "Policy DN", "Policy DN").with_multiline(false),
                FieldDescriptor::string(
                    "validity_period",
                    "Validity Period",
                    "Time period the certificate is valid for. Default is 15m.",
                )
                .with_multiline(false),
            ],
            required: vec!["url", "username", "password", "cacert", "key_id", "valid_principals", "public_key"],
        }
    }

    /// Looks up a descriptor by id in either sequence.
    pub fn field(&self, id: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().chain(self.metadata.iter()).find(|field| field.id == id)
    }

    pub fn is_required(&self, id: &str) -> bool {
        self.required.iter().any(|required| *required == id)
    }

    /// Checks that ids are unique per sequence and that every required id
    /// refers to a declared field.
    pub fn verify(&self) -> Result<(), SchemaError> {
        Self::verify_unique("fields", &self.fields)?;
        Self::verify_unique("metadata", &self.metadata)?;

        for id in &self.required {
            if self.field(id).is_none() {
                return Err(SchemaError::UnknownRequired(id.to_string()));
            }
        }
        Ok(())
    }

    fn verify_unique(section: &'static str, fields: &[FieldDescriptor]) -> Result<(), SchemaError> {
        let mut seen = HashSet::new();
        for field in fields {
            if !seen.insert(field.id) {
                return Err(SchemaError::DuplicateId(section, field.id.to_string()));
            }
        }
        Ok(())
    }
}


//------------ SchemaError ---------------------------------------------------

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SchemaError {
    DuplicateId(&'static str, String),
    UnknownRequired(String),
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SchemaError::DuplicateId(section, id) => write!(f, "Duplicate id '{}' in schema {}", id, section),
            SchemaError::UnknownRequired(id) => write!(f, "Required id '{}' is not declared in schema", id),
        }
    }
}

impl error::Error for SchemaError {}


//------------ Tests ---------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn venafi_schema_is_consistent() {
        CredentialSchema::venafi_ssh().verify().unwrap();
    }

    #[test]
    fn password_is_the_only_secret() {
        let schema = CredentialSchema::venafi_ssh();
        let secrets: Vec<_> =
            schema.fields.iter().chain(schema.metadata.iter()).filter(|f| f.is_secret()).map(|f| f.id).collect();
        assert_eq!(secrets, vec!["password"]);
    }

    #[test]
    fn optional_metadata_is_not_required() {
        let schema = CredentialSchema::venafi_ssh();
        for id in ["client_id", "ca_dn", "policy_dn", "validity_period"] {
            assert!(schema.field(id).is_some());
            assert!(!schema.is_required(id));
        }
        assert!(schema.is_required("public_key"));
    }

    #[test]
    fn should_reject_duplicate_ids() {
        let mut schema = CredentialSchema::venafi_ssh();
        schema.metadata.push(FieldDescriptor::string("key_id", "Again", ""));
        assert_eq!(schema.verify(), Err(SchemaError::DuplicateId("metadata", "key_id".to_string())));
    }

    #[test]
    fn should_reject_unknown_required_id() {
        let mut schema = CredentialSchema::venafi_ssh();
        schema.required.push("token");
        assert_eq!(schema.verify(), Err(SchemaError::UnknownRequired("token".to_string())));
    }

    #[test]
    fn should_serialize_in_host_layout() {
        let json = serde_json::to_value(CredentialSchema::venafi_ssh()).unwrap();

        let url = &json["fields"][0];
        assert_eq!(url["id"], "url");
        assert_eq!(url["type"], "string");
        assert_eq!(url["format"], "url");
        assert!(url.get("secret").is_none());
        assert!(url.get("multiline").is_none());

        let password = &json["fields"][2];
        assert_eq!(password["secret"], true);
        assert_eq!(password["multiline"], false);

        assert_eq!(json["metadata"].as_array().unwrap().len(), 7);
        assert_eq!(json["required"][6], "public_key");
    }
}

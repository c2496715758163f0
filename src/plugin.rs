//! The registration record of the plugin.

use serde::Serialize;

use crate::config::Config;
use crate::constants::PLUGIN_NAME;
use crate::error::Error;
use crate::issuer::{Inputs, IssuedCertificate, IssuerDefaults, SshCertificateIssuer};
use crate::schema::CredentialSchema;
use crate::tpp::{Connector, TppConnector};


//------------ CredentialPlugin ----------------------------------------------

/// What the host needs to offer and run a credential type.
#[derive(Clone, Debug)]
pub struct CredentialPlugin<C> {
    /// The name shown to users.
    pub name: &'static str,

    /// The inputs the host collects.
    pub inputs: CredentialSchema,

    /// The callable that produces the secret.
    pub backend: SshCertificateIssuer<C>,
}

impl CredentialPlugin<TppConnector> {
    /// Creates the plugin talking to TPP as configured.
    pub fn venafi_ssh(config: &Config) -> Self {
        Self::new(TppConnector::new(config.connector_settings()), config.defaults.clone())
    }
}

impl<C> CredentialPlugin<C> {
    pub fn new(connector: C, defaults: IssuerDefaults) -> Self {
        CredentialPlugin {
            name: PLUGIN_NAME,
            inputs: CredentialSchema::venafi_ssh(),
            backend: SshCertificateIssuer::new(connector, defaults),
        }
    }

    /// Returns the registration record as the host sees it.
    pub fn describe(&self) -> PluginDescription<'_> {
        PluginDescription { name: self.name, inputs: &self.inputs }
    }
}

impl<C: Connector> CredentialPlugin<C> {
    /// Invokes the backend with the host's merged inputs.
    pub async fn run(&self, inputs: &Inputs) -> Result<Option<IssuedCertificate>, Error> {
        self.backend.issue_from_inputs(inputs).await
    }
}


//------------ PluginDescription ---------------------------------------------

#[derive(Clone, Copy, Debug, Serialize)]
pub struct PluginDescription<'a> {
    pub name: &'static str,
    pub inputs: &'a CredentialSchema,
}


//------------ Tests ---------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_register_venafi_ssh() {
        let plugin = CredentialPlugin::venafi_ssh(&Config::default());
        assert_eq!(plugin.name, "Venafi Signed SSH");
        assert!(plugin.inputs.verify().is_ok());
        assert_eq!(plugin.backend.defaults(), &IssuerDefaults::default());
    }

    #[test]
    fn should_describe_name_and_inputs() {
        let plugin = CredentialPlugin::venafi_ssh(&Config::default());
        let json = serde_json::to_value(plugin.describe()).unwrap();
        assert_eq!(json["name"], "Venafi Signed SSH");
        assert_eq!(json["inputs"]["fields"][0]["id"], "url");
        assert_eq!(json["inputs"]["required"].as_array().unwrap().len(), 7);
    }
}

//! A credential plugin that issues SSH certificates through the Venafi
//! Trust Protection Platform.
//!
//! The plugin declares its inputs through a [`schema::CredentialSchema`]
//! and hands them to a [`issuer::SshCertificateIssuer`] which asks TPP to
//! sign the given public key. See [`plugin::CredentialPlugin`] for the
//! record a host registers.

pub mod certfile;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod httpclient;
pub mod issuer;
pub mod plugin;
pub mod schema;
pub mod tpp;

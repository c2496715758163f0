//! Various crate-wide constants.


//------------ Names and Versions -------------------------------------------

/// The friendly name of the `venafi-ssh` binary.
pub const VENAFI_SSH_APP: &str = "Venafi SSH Credential Plugin";

/// The display name the host platform shows for the plugin.
pub const PLUGIN_NAME: &str = "Venafi Signed SSH";

/// The version of this crate.
pub const VENAFI_SSH_VERSION: &str = env!("CARGO_PKG_VERSION");


//------------ Config Files Paths -------------------------------------------

/// The default path to the config file.
pub const VENAFI_SSH_DEFAULT_CONFIG_FILE: &str = "/etc/venafi-ssh.conf";


//------------ Environment Variables ----------------------------------------

/// The environment variable with the path to the config file.
pub const VENAFI_SSH_ENV_CONFIG: &str = "VENAFI_SSH_CONFIG";

/// The environment variable with the log level.
///
/// The variable should contain the name of a [`log::LevelFilter`]. It will
/// be overwritten by the config file. The default is “warn.”
pub const VENAFI_SSH_ENV_LOG_LEVEL: &str = "VENAFI_SSH_LOG_LEVEL";

/// The environment variable with the CLI report format.
pub const VENAFI_SSH_ENV_FORMAT: &str = "VENAFI_SSH_FORMAT";


//------------ Issuance Defaults --------------------------------------------

/// The client id used for token authentication unless overridden.
///
/// The id must be registered as an API integration on the TPP instance.
pub const DEFAULT_CLIENT_ID: &str = "SSH_IAAS";

/// The DN of the SSH certificate authority unless overridden.
pub const DEFAULT_CA_DN: &str = "\\VED\\Policy\\Administration\\CAs\\MSCA - Web Server (1 Year)";

/// The DN of the policy folder for issued certificates unless overridden.
pub const DEFAULT_POLICY_DN: &str = "\\VED\\Policy\\SSH\\SSH Certificates\\Application 1";

/// How long an issued certificate is valid unless overridden.
pub const DEFAULT_VALIDITY_PERIOD: &str = "15m";


//------------ TPP Endpoints ------------------------------------------------

/// The scope requested for SSH certificate tokens.
pub const TPP_SCOPE_SSH: &str = "ssh:manage";

/// Path of the OAuth token endpoint, relative to the base URL.
pub const TPP_URL_AUTHORIZE_TOKEN: &str = "vedauth/authorize/oauth";

/// Path of the SSH certificate request endpoint.
pub const TPP_URL_SSH_CERTIFICATE_REQUEST: &str = "vedsdk/SSHCertificates/request";

/// Path of the SSH certificate retrieval endpoint.
pub const TPP_URL_SSH_CERTIFICATE_RETRIEVE: &str = "vedsdk/SSHCertificates/retrieve";


//------------ Timeouts -----------------------------------------------------

/// Timeout for a single HTTP request to TPP.
pub const HTTP_CLIENT_TIMEOUT_SECS: u64 = 120;

/// How long to keep polling for an issued certificate.
pub const RETRIEVE_TIMEOUT_SECS: u64 = 180;

/// How long to wait between two retrieval attempts.
pub const RETRIEVE_POLL_INTERVAL_SECS: u64 = 2;

/// The largest value accepted for any of the timeouts above.
pub const MAX_TIMEOUT_SECS: u64 = 86_400;


//------------ Temporary Files ----------------------------------------------

/// Prefix of the temporary file holding the CA certificate.
pub const CA_CERT_FILE_PREFIX: &str = "venafi-ssh-ca-";

/// Suffix of the temporary file holding the CA certificate.
pub const CA_CERT_FILE_SUFFIX: &str = ".pem";

//! Configuration of the plugin and of logging.

use std::{
    env, fmt, fs, io,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use log::{error, info, LevelFilter};
use serde::{de, Deserialize, Deserializer};

use crate::constants::{
    HTTP_CLIENT_TIMEOUT_SECS, MAX_TIMEOUT_SECS, RETRIEVE_POLL_INTERVAL_SECS, RETRIEVE_TIMEOUT_SECS, VENAFI_SSH_APP,
    VENAFI_SSH_DEFAULT_CONFIG_FILE, VENAFI_SSH_ENV_LOG_LEVEL,
};
use crate::httpclient::{HttpSettings, TlsVerification};
use crate::issuer::IssuerDefaults;
use crate::tpp::ConnectorSettings;


//------------ ConfigDefaults ------------------------------------------------

pub struct ConfigDefaults;

impl ConfigDefaults {
    fn log_level() -> LevelFilter {
        match env::var(VENAFI_SSH_ENV_LOG_LEVEL) {
            Ok(level) => match LevelFilter::from_str(&level) {
                Ok(level) => level,
                Err(_) => {
                    eprintln!("Unrecognized value for log level in env var {}", VENAFI_SSH_ENV_LOG_LEVEL);
                    LevelFilter::Warn
                }
            },
            _ => LevelFilter::Warn,
        }
    }

    fn log_type() -> LogType {
        LogType::Stderr
    }

    fn log_file() -> PathBuf {
        PathBuf::from("./venafi-ssh.log")
    }

    fn http_timeout_secs() -> u64 {
        HTTP_CLIENT_TIMEOUT_SECS
    }

    fn retrieve_timeout_secs() -> u64 {
        RETRIEVE_TIMEOUT_SECS
    }

    fn retrieve_poll_interval_secs() -> u64 {
        RETRIEVE_POLL_INTERVAL_SECS
    }
}


//------------ Config --------------------------------------------------------

/// Global configuration of the plugin.
#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    #[serde(default = "ConfigDefaults::log_level", deserialize_with = "de_level_filter")]
    pub log_level: LevelFilter,

    #[serde(default = "ConfigDefaults::log_type")]
    pub log_type: LogType,

    #[serde(default = "ConfigDefaults::log_file")]
    pub log_file: PathBuf,

    #[serde(default)]
    pub tls_verification: TlsVerification,

    #[serde(default = "ConfigDefaults::http_timeout_secs")]
    pub http_timeout_secs: u64,

    #[serde(default = "ConfigDefaults::retrieve_timeout_secs")]
    pub retrieve_timeout_secs: u64,

    #[serde(default = "ConfigDefaults::retrieve_poll_interval_secs")]
    pub retrieve_poll_interval_secs: u64,

    /// Values for optional inputs the host leaves out.
    #[serde(default)]
    pub defaults: IssuerDefaults,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            log_level: ConfigDefaults::log_level(),
            log_type: ConfigDefaults::log_type(),
            log_file: ConfigDefaults::log_file(),
            tls_verification: TlsVerification::default(),
            http_timeout_secs: ConfigDefaults::http_timeout_secs(),
            retrieve_timeout_secs: ConfigDefaults::retrieve_timeout_secs(),
            retrieve_poll_interval_secs: ConfigDefaults::retrieve_poll_interval_secs(),
            defaults: IssuerDefaults::default(),
        }
    }
}

impl Config {
    /// Loads and checks the config.
    ///
    /// A file given explicitly must exist. Without one the default file is
    /// used if it is there and the built-in defaults otherwise.
    pub fn create(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let parse = |path: &Path| {
            Self::read_config(path)
                .map_err(|e| ConfigError::Other(format!("Error parsing config file: {}, error: {}", path.display(), e)))
        };
        let config = match config_file {
            Some(path) => parse(path)?,
            None => {
                let path = Path::new(VENAFI_SSH_DEFAULT_CONFIG_FILE);
                if path.exists() { parse(path)? } else { Config::default() }
            }
        };
        config.verify()?;
        Ok(config)
    }

    pub fn verify(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("http_timeout_secs", self.http_timeout_secs),
            ("retrieve_timeout_secs", self.retrieve_timeout_secs),
            ("retrieve_poll_interval_secs", self.retrieve_poll_interval_secs),
        ] {
            if value == 0 {
                return Err(ConfigError::Other(format!("{} must be at least 1", name)));
            }
            if value > MAX_TIMEOUT_SECS {
                return Err(ConfigError::Other(format!("{} must not exceed {}", name, MAX_TIMEOUT_SECS)));
            }
        }
        if self.retrieve_timeout_secs < self.retrieve_poll_interval_secs {
            return Err(ConfigError::other(
                "retrieve_timeout_secs must not be smaller than retrieve_poll_interval_secs",
            ));
        }
        for (name, value) in [
            ("defaults.client_id", &self.defaults.client_id),
            ("defaults.ca_dn", &self.defaults.ca_dn),
            ("defaults.policy_dn", &self.defaults.policy_dn),
            ("defaults.validity_period", &self.defaults.validity_period),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Other(format!("{} must not be empty", name)));
            }
        }
        Ok(())
    }

    pub fn read_config(file: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(file)?;
        let c: Config = toml::from_str(&content)?;
        Ok(c)
    }

    pub fn connector_settings(&self) -> ConnectorSettings {
        ConnectorSettings {
            http: HttpSettings {
                timeout: Duration::from_secs(self.http_timeout_secs),
                tls_verification: self.tls_verification,
            },
            retrieve_timeout: Duration::from_secs(self.retrieve_timeout_secs),
            retrieve_poll_interval: Duration::from_secs(self.retrieve_poll_interval_secs),
        }
    }

    pub fn init_logging(&self) -> Result<(), ConfigError> {
        match self.log_type {
            LogType::File => self.file_logger(&self.log_file),
            LogType::Stderr => self.stderr_logger(),
        }?;
        info!("{} logging at level {}", VENAFI_SSH_APP, self.log_level);
        Ok(())
    }

    /// Creates a stderr logger.
    fn stderr_logger(&self) -> Result<(), ConfigError> {
        self.fern_logger()
            .chain(io::stderr())
            .apply()
            .map_err(|e| ConfigError::Other(format!("Failed to init stderr logging: {}", e)))
    }

    /// Creates a file logger using the file provided by `path`.
    fn file_logger(&self, path: &Path) -> Result<(), ConfigError> {
        let file = match fern::log_file(path) {
            Ok(file) => file,
            Err(err) => {
                let error_string = format!("Failed to open log file '{}': {}", path.display(), err);
                error!("{}", error_string.as_str());
                return Err(ConfigError::Other(error_string));
            }
        };
        self.fern_logger()
            .chain(file)
            .apply()
            .map_err(|e| ConfigError::Other(format!("Failed to init file logging: {}", e)))
    }

    /// Creates and returns a fern logger with log level tweaks
    fn fern_logger(&self) -> fern::Dispatch {
        // suppress overly noisy logging
        let framework_level = self.log_level.min(LevelFilter::Warn);

        let show_target = self.log_level == LevelFilter::Trace || self.log_level == LevelFilter::Debug;
        fern::Dispatch::new()
            .format(move |out, message, record| {
                if show_target {
                    out.finish(format_args!(
                        "{} [{}] [{}] {}",
                        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                        record.level(),
                        record.target(),
                        message
                    ))
                } else {
                    out.finish(format_args!(
                        "{} [{}] {}",
                        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                        record.level(),
                        message
                    ))
                }
            })
            .level(self.log_level)
            .level_for("rustls", framework_level)
            .level_for("hyper", framework_level)
            .level_for("hyper_util", framework_level)
            .level_for("mio", framework_level)
            .level_for("reqwest", framework_level)
            .level_for("want", framework_level)
            .level_for("h2", framework_level)
    }
}


//------------ ConfigError ---------------------------------------------------

#[derive(Debug)]
pub enum ConfigError {
    IoError(io::Error),
    TomlError(toml::de::Error),
    Other(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::IoError(e) => fmt::Display::fmt(e, f),
            ConfigError::TomlError(e) => fmt::Display::fmt(e, f),
            ConfigError::Other(s) => f.write_str(s),
        }
    }
}

impl std::error::Error for ConfigError {}

impl ConfigError {
    pub fn other(s: &str) -> ConfigError {
        ConfigError::Other(s.to_string())
    }
}

impl From<io::Error> for ConfigError {
    fn from(e: io::Error) -> Self {
        ConfigError::IoError(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::TomlError(e)
    }
}


//------------ LogType -------------------------------------------------------

/// The target to log to.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum LogType {
    Stderr,
    File,
}

impl<'de> Deserialize<'de> for LogType {
    fn deserialize<D>(d: D) -> Result<LogType, D::Error>
    where
        D: Deserializer<'de>,
    {
        let string = String::deserialize(d)?;
        match string.as_str() {
            "stderr" => Ok(LogType::Stderr),
            "file" => Ok(LogType::File),
            _ => Err(de::Error::custom(format!("expected \"stderr\" or \"file\", found : \"{}\"", string))),
        }
    }
}


//------------ Level Filter --------------------------------------------------

fn de_level_filter<'de, D>(d: D) -> Result<LevelFilter, D::Error>
where
    D: Deserializer<'de>,
{
    let string = String::deserialize(d)?;
    LevelFilter::from_str(&string).map_err(de::Error::custom)
}


//------------ Tests ---------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn should_parse_full_config() {
        let c: Config = toml::from_str(
            r#"
            log_level = "debug"
            log_type = "file"
            log_file = "/var/log/venafi-ssh.log"
            tls_verification = "insecure"
            http_timeout_secs = 30
            retrieve_timeout_secs = 60
            retrieve_poll_interval_secs = 5

            [defaults]
            client_id = "AWX"
            validity_period = "1h"
            "#,
        )
        .unwrap();

        assert_eq!(c.log_level, LevelFilter::Debug);
        assert_eq!(c.log_type, LogType::File);
        assert_eq!(c.log_file, PathBuf::from("/var/log/venafi-ssh.log"));
        assert!(c.tls_verification.is_insecure());
        assert_eq!(c.defaults.client_id, "AWX");
        assert_eq!(c.defaults.validity_period, "1h");
        assert_eq!(c.defaults.ca_dn, IssuerDefaults::default().ca_dn);

        let settings = c.connector_settings();
        assert_eq!(settings.http.timeout, Duration::from_secs(30));
        assert_eq!(settings.retrieve_timeout, Duration::from_secs(60));
        assert_eq!(settings.retrieve_poll_interval, Duration::from_secs(5));
        c.verify().unwrap();
    }

    #[test]
    fn should_use_defaults_for_empty_config() {
        let c: Config = toml::from_str("").unwrap();
        assert_eq!(c.log_type, LogType::Stderr);
        assert_eq!(c.tls_verification, TlsVerification::Verify);
        assert_eq!(c.http_timeout_secs, 120);
        assert_eq!(c.retrieve_timeout_secs, 180);
        assert_eq!(c.retrieve_poll_interval_secs, 2);
        assert_eq!(c.defaults, IssuerDefaults::default());
        c.verify().unwrap();
    }

    #[test]
    fn should_parse_sample_config() {
        let c: Config = toml::from_str(include_str!("../defaults/venafi-ssh.conf")).unwrap();
        assert_eq!(c.defaults, IssuerDefaults::default());
        assert_eq!(c.tls_verification, TlsVerification::Verify);
        c.verify().unwrap();
    }

    #[test]
    fn should_reject_unknown_log_type() {
        let res = toml::from_str::<Config>(r#"log_type = "syslog""#);
        assert!(res.is_err());
    }

    #[test]
    fn should_reject_bad_timing() {
        let c = Config { retrieve_timeout_secs: 1, retrieve_poll_interval_secs: 2, ..Default::default() };
        assert!(c.verify().is_err());

        let c = Config { http_timeout_secs: 0, ..Default::default() };
        assert!(c.verify().is_err());
    }

    #[test]
    fn should_reject_timeouts_beyond_a_day() {
        let c = Config { retrieve_timeout_secs: u64::MAX, ..Default::default() };
        assert!(matches!(c.verify(), Err(ConfigError::Other(ref msg)) if msg.contains("retrieve_timeout_secs")));

        let c = Config { http_timeout_secs: MAX_TIMEOUT_SECS + 1, ..Default::default() };
        assert!(c.verify().is_err());

        let c = Config {
            retrieve_timeout_secs: MAX_TIMEOUT_SECS,
            http_timeout_secs: MAX_TIMEOUT_SECS,
            ..Default::default()
        };
        c.verify().unwrap();
    }

    #[test]
    fn should_reject_empty_defaults() {
        let mut c = Config::default();
        c.defaults.policy_dn = String::new();
        assert!(matches!(c.verify(), Err(ConfigError::Other(_))));
    }

    #[test]
    fn should_read_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "http_timeout_secs = 10").unwrap();
        let c = Config::create(Some(file.path())).unwrap();
        assert_eq!(c.http_timeout_secs, 10);
    }

    #[test]
    fn should_fail_on_missing_explicit_file() {
        let res = Config::create(Some(Path::new("/nonexistent/venafi-ssh.conf")));
        assert!(matches!(res, Err(ConfigError::Other(_))));
    }
}

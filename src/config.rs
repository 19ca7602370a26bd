use anyhow::Context;
use camino::{
    Utf8Path,
    Utf8PathBuf,
};
use directories_next::ProjectDirs;
use insta::Browser;
use serde::Deserialize;
use std::{
    borrow::Cow,
    collections::HashMap,
    path::PathBuf,
    time::Duration,
};
use tracing_subscriber::filter::LevelFilter;

/// The name of the config file in the config dir
pub const CONFIG_FILE_NAME: &str = "config.toml";

fn default_request_timeout() -> u64 {
    insta::DEFAULT_TIMEOUT.as_secs()
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// The account whose session is used
    #[serde(default)]
    pub account: Option<String>,

    /// Where session files are kept
    #[serde(default)]
    pub session_dir: Option<Utf8PathBuf>,

    /// The profile looked up to check a session
    #[serde(default)]
    pub probe_account: Option<String>,

    /// Per-request timeout, in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Browsers to import sessions from, in order
    #[serde(default)]
    pub browsers: Option<Vec<Browser>>,

    #[serde(default)]
    pub log: LogConfig,

    #[serde(flatten)]
    pub extra: HashMap<String, toml::Value>,
}

#[derive(Deserialize, Debug)]
pub struct LogConfig {
    /// The default log level, overridden by `RUST_LOG`
    #[serde(default = "default_log_level")]
    pub level: String,

    /// If set, logs are also written to daily files here
    #[serde(default)]
    pub directory: Option<Utf8PathBuf>,

    #[serde(flatten)]
    pub extra: HashMap<String, toml::Value>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: None,
            extra: HashMap::new(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            account: None,
            session_dir: None,
            probe_account: None,
            request_timeout: default_request_timeout(),
            browsers: None,
            log: LogConfig::default(),
            extra: HashMap::new(),
        }
    }
}

impl Config {
    /// Get the default config path for this platform, if there is one.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "insta-analyzer")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// The account to use, if any
    pub fn account(&self) -> Option<&str> {
        self.account.as_deref()
    }

    /// The account probed when validating a session.
    ///
    /// Falls back to the session account.
    pub fn probe_account(&self) -> Option<&str> {
        self.probe_account.as_deref().or(self.account())
    }

    /// The per-request timeout
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    /// The browsers to import sessions from
    pub fn browsers(&self) -> &[Browser] {
        self.browsers
            .as_deref()
            .unwrap_or(Browser::DEFAULT_ORDER.as_slice())
    }

    /// The default log level
    pub fn log_level(&self) -> anyhow::Result<LevelFilter> {
        self.log
            .level
            .parse()
            .with_context(|| format!("invalid log level `{}`", self.log.level))
    }

    /// Load a config from a path
    pub fn load_from_path(path: &Utf8Path) -> anyhow::Result<Self> {
        std::fs::read(path)
            .with_context(|| format!("failed to read config from `{path}`"))
            .and_then(|b| Self::load_from_bytes(&b))
    }

    /// Load a config from bytes
    pub fn load_from_bytes(bytes: &[u8]) -> anyhow::Result<Self> {
        let config_str = std::str::from_utf8(bytes).context("config is not utf8")?;
        toml::from_str(config_str).context("failed to parse config")
    }

    /// Validate a config
    pub fn validate(&mut self) -> Vec<ValidationMessage> {
        let mut errors = Vec::new();

        if self.request_timeout == 0 {
            errors.push(ValidationMessage {
                severity: Severity::Error,
                error: ValidationError::ZeroRequestTimeout,
            });
        }

        if let Some(account) = self.account.as_deref() {
            if account.is_empty() {
                errors.push(ValidationMessage {
                    severity: Severity::Error,
                    error: ValidationError::EmptyAccount,
                });
            }
        }

        if self.browsers.as_ref().map_or(false, Vec::is_empty) {
            errors.push(ValidationMessage {
                severity: Severity::Warn,
                error: ValidationError::NoBrowsers,
            });
        }

        if self.log_level().is_err() {
            errors.push(ValidationMessage {
                severity: Severity::Error,
                error: ValidationError::InvalidLogLevel,
            });
        }

        let unknown_keys = self
            .extra
            .keys()
            .map(|key| Cow::Borrowed(key.as_str()))
            .chain(
                self.log
                    .extra
                    .keys()
                    .map(|key| Cow::Owned(format!("log.{key}"))),
            );
        for key in unknown_keys {
            errors.push(ValidationMessage {
                severity: Severity::Warn,
                error: ValidationError::UnknownKey(key.into_owned()),
            });
        }

        errors
    }
}

#[derive(Debug)]
pub struct ValidationMessage {
    severity: Severity,
    error: ValidationError,
}

impl ValidationMessage {
    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn error(&self) -> &ValidationError {
        &self.error
    }
}

#[derive(Debug)]
pub enum ValidationError {
    ZeroRequestTimeout,
    EmptyAccount,
    NoBrowsers,
    InvalidLogLevel,
    UnknownKey(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::ZeroRequestTimeout => write!(f, "request-timeout must be positive"),
            ValidationError::EmptyAccount => write!(f, "account must not be empty"),
            ValidationError::NoBrowsers => {
                write!(f, "browsers is empty, session imports will always fail")
            }
            ValidationError::InvalidLogLevel => write!(f, "invalid log level"),
            ValidationError::UnknownKey(key) => write!(f, "unknown key `{key}`"),
        }
    }
}

impl std::error::Error for ValidationError {}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Severity {
    Warn,
    Error,
}

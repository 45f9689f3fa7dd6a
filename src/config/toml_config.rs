use crate::core::digest::DEFAULT_SUBJECT;
use crate::core::watcher::{FetchFailurePolicy, WatchSettings};
use crate::utils::error::{Result, WatchError};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

pub const DEFAULT_SELECTOR: &str = "div.thesistitle";
pub const PASSWORD_ENV_VAR: &str = "THESIS_WATCH_SMTP_PASSWORD";

static ENV_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("placeholder pattern is valid"));

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    pub source: SourceConfig,
    pub snapshot: SnapshotConfig,
    pub smtp: SmtpConfig,
    pub error_handling: Option<ErrorHandlingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub url: String,
    pub selector: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotConfig {
    pub path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmtpSecurity {
    /// Plain connection upgraded with STARTTLS, usually port 587.
    #[default]
    Starttls,
    /// TLS from the first byte, usually port 465.
    Tls,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub security: SmtpSecurity,
    pub from: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub to: String,
    pub subject: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorHandlingConfig {
    pub on_fetch_failure: Option<FetchFailurePolicy>,
}

impl WatchConfig {
    /// Loads configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| WatchError::ConfigError {
            message: format!("cannot read {}: {}", path.as_ref().display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses configuration from a TOML string. `${NAME}` placeholders are
    /// expanded inside string values after parsing, so environment values are
    /// taken verbatim.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut table: toml::Table =
            toml::from_str(content).map_err(|e| Self::parse_error(content, &e))?;
        table.iter_mut().for_each(|(_, v)| Self::substitute_env_vars(v));

        toml::Value::Table(table)
            .try_into()
            .map_err(|e: toml::de::Error| Self::parse_error(content, &e))
    }

    /// Line and message only; the offending line may hold a credential.
    fn parse_error(content: &str, e: &toml::de::Error) -> WatchError {
        let location = e
            .span()
            .and_then(|span| content.get(..span.start))
            .map(|before| format!(" at line {}", before.matches('\n').count() + 1))
            .unwrap_or_default();

        WatchError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error{}: {}", location, e.message()),
        }
    }

    /// Replaces `${NAME}` with the environment variable; unknown names stay verbatim.
    fn substitute_env_vars(value: &mut toml::Value) {
        match value {
            toml::Value::String(text) => {
                if text.contains("${") {
                    let replaced = ENV_PLACEHOLDER
                        .replace_all(text, |caps: &regex::Captures| {
                            let var_name = &caps[1];
                            std::env::var(var_name)
                                .unwrap_or_else(|_| format!("${{{}}}", var_name))
                        })
                        .into_owned();
                    *text = replaced;
                }
            }
            toml::Value::Array(items) => items.iter_mut().for_each(Self::substitute_env_vars),
            toml::Value::Table(table) => table.iter_mut().for_each(|(_, v)| Self::substitute_env_vars(v)),
            _ => {}
        }
    }

    pub fn selector(&self) -> &str {
        self.source.selector.as_deref().unwrap_or(DEFAULT_SELECTOR)
    }

    pub fn subject(&self) -> &str {
        self.smtp.subject.as_deref().unwrap_or(DEFAULT_SUBJECT)
    }

    /// SMTP password from the file, falling back to `THESIS_WATCH_SMTP_PASSWORD`.
    pub fn smtp_password(&self) -> Result<String> {
        match &self.smtp.password {
            Some(password) => Ok(password.clone()),
            None => std::env::var(PASSWORD_ENV_VAR).map_err(|_| WatchError::MissingConfigError {
                field: format!("smtp.password (or {})", PASSWORD_ENV_VAR),
            }),
        }
    }

    pub fn smtp_username(&self) -> &str {
        self.smtp.username.as_deref().unwrap_or(&self.smtp.from)
    }

    pub fn fetch_failure_policy(&self) -> FetchFailurePolicy {
        self.error_handling
            .as_ref()
            .and_then(|e| e.on_fetch_failure)
            .unwrap_or_default()
    }

    pub fn watch_settings(&self) -> WatchSettings {
        WatchSettings {
            subject: self.subject().to_string(),
            on_fetch_failure: self.fetch_failure_policy(),
        }
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("source.url", &self.source.url)?;

        crate::adapters::page_source::parse_selector(self.selector())?;

        validation::validate_path("snapshot.path", &self.snapshot.path)?;

        validation::validate_non_empty_string("smtp.host", &self.smtp.host)?;
        validation::validate_range("smtp.port", self.smtp.port, 1, u16::MAX)?;
        validation::validate_mailbox("smtp.from", &self.smtp.from)?;
        validation::validate_mailbox("smtp.to", &self.smtp.to)?;
        validation::validate_secret("smtp.username", self.smtp_username())?;
        validation::validate_secret("smtp.password", &self.smtp_password()?)?;

        Ok(())
    }
}

impl Validate for WatchConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

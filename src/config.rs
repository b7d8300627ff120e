use config::{Config as ConfigBuilder, ConfigError, Environment, File, Map, Source, Value};
use serde::Deserialize;
use std::env;
use strum::{AsRefStr, Display};
use validator::ValidateEmail;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub mail: MailConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

/// Delivery strategy for the send endpoint.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq, Display, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Provider {
    /// Authenticated relay account, e.g. a Gmail app password.
    #[default]
    Smtp,
    /// Transactional email HTTP API.
    Resend,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MailConfig {
    #[serde(default)]
    pub provider: Provider,
    #[serde(default = "default_owner_address")]
    pub owner_address: String,
    #[serde(default = "default_from_name")]
    pub from_name: String,
    #[serde(default = "default_signature_name")]
    pub signature_name: String,
    #[serde(default = "default_acknowledge")]
    pub acknowledge: bool,
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    #[serde(default)]
    pub smtp_username: String,
    #[serde(default)]
    pub smtp_password: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_api_from")]
    pub api_from: String,
    #[serde(default = "default_portfolio_url")]
    pub portfolio_url: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            owner_address: default_owner_address(),
            from_name: default_from_name(),
            signature_name: default_signature_name(),
            acknowledge: default_acknowledge(),
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            smtp_username: String::new(),
            smtp_password: String::new(),
            api_key: String::new(),
            api_url: default_api_url(),
            api_from: default_api_from(),
            portfolio_url: default_portfolio_url(),
        }
    }
}

impl MailConfig {
    /// Settings the selected provider needs that are currently empty.
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        let required = match self.provider {
            Provider::Smtp => vec![
                ("mail.smtp_username", self.smtp_username.as_str()),
                ("mail.smtp_password", self.smtp_password.as_str()),
            ],
            Provider::Resend => vec![("mail.api_key", self.api_key.as_str())],
        };

        required
            .into_iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(key, _)| key)
            .collect()
    }

    pub fn has_credentials(&self) -> bool {
        self.missing_credentials().is_empty()
    }
}

fn default_owner_address() -> String {
    "owner@example.com".to_string()
}

fn default_from_name() -> String {
    "Portfolio Contact".to_string()
}

fn default_signature_name() -> String {
    "Portfolio Owner".to_string()
}

fn default_acknowledge() -> bool {
    true
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_api_url() -> String {
    "https://api.resend.com".to_string()
}

fn default_api_from() -> String {
    "onboarding@resend.dev".to_string()
}

fn default_portfolio_url() -> String {
    "http://localhost:3000".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Variable names kept from earlier deployments, and the key each one sets.
const LEGACY_VARIABLES: [(&str, &str); 3] = [
    ("GMAIL_USER", "mail.smtp_username"),
    ("GMAIL_APP_PASSWORD", "mail.smtp_password"),
    ("RESEND_API_KEY", "mail.api_key"),
];

#[derive(Debug, Clone)]
struct LegacyEnvironment {
    source: Option<Map<String, String>>,
}

impl Source for LegacyEnvironment {
    fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
        Box::new(self.clone())
    }

    fn collect(&self) -> Result<Map<String, Value>, ConfigError> {
        let origin = "legacy environment".to_string();
        let mut values = Map::new();

        for (variable, key) in LEGACY_VARIABLES {
            let value = match &self.source {
                Some(source) => source.get(variable).cloned(),
                None => env::var(variable).ok(),
            };
            if let Some(value) = value {
                values.insert(key.to_string(), Value::new(Some(&origin), value));
            }
        }

        Ok(values)
    }
}

impl Config {
    /// Load configuration from file and environment variables
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (FOLIO__MAIL__PROVIDER, etc.)
    /// 2. Legacy variables (GMAIL_USER, GMAIL_APP_PASSWORD, RESEND_API_KEY)
    /// 3. Config file specified by path
    /// 4. Hardcoded defaults
    pub fn load(config_path: Option<String>) -> Result<Self, ConfigError> {
        Self::load_with_env(config_path, None)
    }

    /// Same as [`Config::load`], reading variables from `vars` instead of the
    /// process environment when given.
    fn load_with_env(
        config_path: Option<String>,
        vars: Option<Map<String, String>>,
    ) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        let config_file_path = config_path
            .or_else(|| env::var("CONFIG_PATH").ok())
            .unwrap_or_else(|| "config/default.toml".to_string());

        // Optional - ignore if not found
        if std::path::Path::new(&config_file_path).exists() {
            builder = builder.add_source(File::with_name(&config_file_path));
        }

        builder = builder
            .add_source(LegacyEnvironment {
                source: vars.clone(),
            })
            .add_source(
                Environment::with_prefix("FOLIO")
                    .separator("__")
                    .try_parsing(true)
                    .source(vars),
            );

        builder.build()?.try_deserialize()
    }

    /// Validate configuration
    ///
    /// Missing mail credentials are not an error here, they are reported per
    /// request and by the readiness probe.
    pub fn validate(&self) -> Result<(), String> {
        if self.server.port == 0 {
            return Err("Server port must be greater than 0".to_string());
        }
        if !self.mail.owner_address.validate_email() {
            return Err(format!(
                "mail.owner_address is not a valid email address: {}",
                self.mail.owner_address
            ));
        }
        Ok(())
    }
}

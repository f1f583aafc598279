use anyhow::{Context, Result};
use config::builder::{ConfigBuilder, DefaultState};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::form::FormSchema;
use crate::theme::Theme;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub endpoint: EndpointConfig,
    pub contact: ContactConfig,
    #[serde(default)]
    pub form: FormConfig,
    pub ui: UiConfig,
    pub paths: PathsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where submissions are posted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Scheme, host and port of the site receiving the form
    pub origin: String,
    #[serde(default = "default_endpoint_path")]
    pub path: String,
}

fn default_endpoint_path() -> String {
    "/".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactConfig {
    /// Address offered in the failure alert
    pub fallback: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FormConfig {
    /// Path to a TOML form definition; the built-in client brief when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    pub tick_rate_ms: u64,
    /// Used when neither a stored preference nor the terminal reports one
    #[serde(default)]
    pub default_theme: Theme,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    pub state: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to log to file in TUI mode (false = stderr for debugging)
    #[serde(default = "default_log_to_file")]
    pub to_file: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_to_file() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            to_file: default_log_to_file(),
        }
    }
}

impl Config {
    /// Project-local config file, checked relative to the working directory
    pub fn local_config_path() -> PathBuf {
        PathBuf::from("client-brief.toml")
    }

    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder = Self::defaults_builder()?;

        let local_config = Self::local_config_path();
        if local_config.exists() {
            builder = builder.add_source(config::File::from(local_config));
        }

        // User config in ~/.config/client-brief/ (optional global overrides)
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("client-brief").join("config.toml");
            if user_config.exists() {
                builder = builder.add_source(config::File::from(user_config));
            }
        }

        // Explicit config file (CLI override)
        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path));
        }

        Self::build(builder.add_source(Self::env_source()))
    }

    /// Builder seeded with the embedded defaults so the tool works without any config file
    fn defaults_builder() -> Result<ConfigBuilder<DefaultState>> {
        let defaults_json = serde_json::to_string(&Config::default())
            .context("Failed to serialize default config")?;
        Ok(config::Config::builder().add_source(config::File::from_str(
            &defaults_json,
            config::FileFormat::Json,
        )))
    }

    /// Environment variables, e.g. BRIEF__ENDPOINT__ORIGIN
    fn env_source() -> config::Environment {
        config::Environment::with_prefix("BRIEF")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
    }

    fn build(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        let config = builder.build().context("Failed to load configuration")?;
        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Get absolute path to state directory
    pub fn state_path(&self) -> PathBuf {
        let path = PathBuf::from(&self.paths.state);
        if path.is_absolute() {
            path
        } else {
            std::env::current_dir().unwrap_or_default().join(path)
        }
    }

    /// Get absolute path to logs directory
    pub fn logs_path(&self) -> PathBuf {
        self.state_path().join("logs")
    }

    /// The configured form definition, or the built-in client brief
    pub fn form_schema(&self) -> Result<FormSchema> {
        match &self.form.schema {
            Some(path) => FormSchema::load(std::path::Path::new(path)),
            None => Ok(FormSchema::client_brief()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: EndpointConfig {
                origin: "http://localhost:8080".to_string(),
                path: default_endpoint_path(),
            },
            contact: ContactConfig {
                fallback: "your@email.com".to_string(),
            },
            form: FormConfig::default(),
            ui: UiConfig {
                tick_rate_ms: 100,
                default_theme: Theme::Light,
            },
            paths: PathsConfig {
                state: ".client-brief".to_string(), // Relative to cwd
            },
            logging: LoggingConfig::default(),
        }
    }
}

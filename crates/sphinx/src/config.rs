//! Configuration management for Sphinx.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use sphinx_common::constants::{
    self, DEFAULT_INDEX_URL, DEFAULT_LISTEN_ADDR, DEFAULT_REDIRECT_URL,
};

/// Command-line overrides applied on top of the file and environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub listen: Option<String>,
    pub index_url: Option<String>,
    pub redirect_url: Option<String>,
}

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// HTTP listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Entry URL every rejection redirects to
    #[serde(default = "default_index_url")]
    pub index_url: String,

    /// Destination after the final riddle
    #[serde(default = "default_redirect_url")]
    pub redirect_url: String,

    /// Lockout after a wrong or multi-word guess, in seconds
    #[serde(default = "default_cooldown")]
    pub cooldown_secs: u64,

    /// Final token validity in seconds
    #[serde(default = "default_final_token_ttl")]
    pub final_token_ttl_secs: u64,

    /// Interval between sweeps of expired entries, in seconds
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Answer hashes
    #[serde(default)]
    pub answers: AnswerConfig,

    /// Riddle markup for each page
    #[serde(default)]
    pub riddles: RiddleConfig,
}

/// bcrypt hashes of the three answers
#[derive(Debug, Clone, Deserialize)]
pub struct AnswerConfig {
    #[serde(default = "default_first_hash")]
    pub first: String,

    #[serde(default = "default_second_hash")]
    pub second: String,

    #[serde(rename = "final", default = "default_final_hash")]
    pub last: String,
}

impl Default for AnswerConfig {
    fn default() -> Self {
        Self {
            first: default_first_hash(),
            second: default_second_hash(),
            last: default_final_hash(),
        }
    }
}

/// Per-page riddle markup. Rendered unescaped, so only operators set it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RiddleConfig {
    #[serde(default)]
    pub first: Option<String>,

    #[serde(default)]
    pub second: Option<String>,

    #[serde(rename = "final", default)]
    pub last: Option<String>,
}

// Default value functions
fn default_listen_addr() -> String { DEFAULT_LISTEN_ADDR.to_string() }
fn default_index_url() -> String { DEFAULT_INDEX_URL.to_string() }
fn default_redirect_url() -> String { DEFAULT_REDIRECT_URL.to_string() }
fn default_cooldown() -> u64 { constants::COOLDOWN_SECS } // 5 minutes
fn default_final_token_ttl() -> u64 { constants::FINAL_TOKEN_TTL_SECS } // 2 minutes
fn default_sweep_interval() -> u64 { constants::SWEEP_INTERVAL_SECS }
fn default_request_timeout() -> u64 { constants::REQUEST_TIMEOUT_SECS }
fn default_first_hash() -> String { constants::answers::FIRST.to_string() }
fn default_second_hash() -> String { constants::answers::SECOND.to_string() }
fn default_final_hash() -> String { constants::answers::FINAL.to_string() }

impl AppConfig {
    /// Load configuration from file and `SPHINX__*` environment, with CLI overrides
    pub fn load(config_path: &str, overrides: &Overrides) -> Result<Self> {
        let mut builder = config::Config::builder();

        if Path::new(config_path).exists() {
            builder = builder.add_source(config::File::with_name(config_path));
        } else {
            tracing::warn!(path = %config_path, "Config file not found, using defaults");
        }

        let settings = builder
            .add_source(config::Environment::with_prefix("SPHINX").separator("__"))
            .build()
            .context("Failed to load configuration")?;

        let mut config: Self = settings
            .try_deserialize()
            .context("Failed to parse config")?;

        // Apply CLI overrides
        if let Some(ref listen) = overrides.listen {
            config.listen_addr = listen.clone();
        }
        if let Some(ref index_url) = overrides.index_url {
            config.index_url = index_url.clone();
        }
        if let Some(ref redirect_url) = overrides.redirect_url {
            config.redirect_url = redirect_url.clone();
        }

        if config.redirect_url == DEFAULT_REDIRECT_URL {
            tracing::warn!("redirect_url not configured, solvers will land back on /");
        }

        Ok(config)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }

    pub fn final_token_ttl(&self) -> Duration {
        Duration::from_secs(self.final_token_ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            index_url: default_index_url(),
            redirect_url: default_redirect_url(),
            cooldown_secs: default_cooldown(),
            final_token_ttl_secs: default_final_token_ttl(),
            sweep_interval_secs: default_sweep_interval(),
            request_timeout_secs: default_request_timeout(),
            answers: AnswerConfig::default(),
            riddles: RiddleConfig::default(),
        }
    }
}

//! Runtime settings.
//!
//! Settings are layered with figment: built-in defaults, then an optional
//! TOML file, then `VAYUWATCH_` environment variables. Nested keys use a
//! double underscore, e.g. `VAYUWATCH_AUTH__OTP_TTL_SECS=120`.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const CONFIG_FILE_NAME: &str = "config.toml";

const DATA_DIR_NAME: &str = "vayuwatch";

const DATABASE_FILE_NAME: &str = "accounts.db";

/// All settings, grouped by section.
///
/// Environment variables override `~/.config/vayuwatch/config.toml`, which
/// overrides the defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// `[storage]` section.
    pub storage: StorageConfig,
    /// `[auth]` section.
    pub auth: AuthConfig,
    /// `[dataset]` section.
    pub dataset: DatasetConfig,
}

/// Where account data lives.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the account database.
    /// Defaults to `~/.local/share/vayuwatch/accounts.db`
    pub database_path: Option<PathBuf>,
}

/// Account and OTP configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Simulated latency of a password login, in milliseconds.
    pub login_delay_ms: u64,
    /// Simulated latency of a signup, in milliseconds.
    pub signup_delay_ms: u64,
    /// Simulated latency of an OTP login, in milliseconds.
    pub otp_login_delay_ms: u64,
    /// How long an issued OTP stays valid, in seconds.
    pub otp_ttl_secs: u64,
    /// Issue the fixed `demo_otp` instead of random codes, and accept it for
    /// any phone without a matching request.
    pub demo_mode: bool,
    /// The fixed demo code.
    pub demo_otp: String,
}

/// Which reference dataset to serve.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// JSON dataset to use instead of the builtin India dataset.
    pub path: Option<PathBuf>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            login_delay_ms: 600,
            signup_delay_ms: 800,
            otp_login_delay_ms: 600,
            otp_ttl_secs: 60,
            demo_mode: true,
            demo_otp: "123456".to_string(),
        }
    }
}

impl AuthConfig {
    /// Configuration with no simulated latency, for tests and scripting.
    #[must_use]
    pub fn without_delays() -> Self {
        Self {
            login_delay_ms: 0,
            signup_delay_ms: 0,
            otp_login_delay_ms: 0,
            ..Self::default()
        }
    }

    /// Login latency as a Duration.
    #[must_use]
    pub fn login_delay(&self) -> Duration {
        Duration::from_millis(self.login_delay_ms)
    }

    /// Signup latency as a Duration.
    #[must_use]
    pub fn signup_delay(&self) -> Duration {
        Duration::from_millis(self.signup_delay_ms)
    }

    /// OTP login latency as a Duration.
    #[must_use]
    pub fn otp_login_delay(&self) -> Duration {
        Duration::from_millis(self.otp_login_delay_ms)
    }

    /// The demo code, when demo mode is on.
    #[must_use]
    pub fn demo_code(&self) -> Option<&str> {
        self.demo_mode.then_some(self.demo_otp.as_str())
    }

    /// OTP validity window as a Duration.
    #[must_use]
    pub fn otp_ttl(&self) -> Duration {
        Duration::from_secs(self.otp_ttl_secs)
    }
}

impl Config {
    /// Load from the default config file location.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be parsed or the result is invalid.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load using `config_path` instead of the default file when given.
    /// A missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be parsed or the result is invalid.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("VAYUWATCH_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// `<config dir>/vayuwatch/config.toml`.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// `<local data dir>/vayuwatch`.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Reject a zero OTP lifetime and a demo code that is not six digits.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigValidation`] naming the offending key.
    pub fn validate(&self) -> Result<()> {
        if self.auth.otp_ttl_secs == 0 {
            return Err(Error::ConfigValidation {
                message: "otp_ttl_secs must be greater than 0".to_string(),
            });
        }

        if let Some(code) = self.auth.demo_code() {
            if code.len() != 6 || !code.bytes().all(|b| b.is_ascii_digit()) {
                return Err(Error::ConfigValidation {
                    message: format!("demo_otp must be exactly six digits, got {code:?}"),
                });
            }
        }

        Ok(())
    }

    /// The configured database path, or `accounts.db` in the data directory.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }
}

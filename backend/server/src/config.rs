use std::{
    env,
    fmt::{self, Debug, Display},
    fs::read_to_string,
    path::Path,
    str::FromStr,
    time::Duration,
};

use acquirer::FixConfig;
use thiserror::Error;
use tracing::{info, warn};

pub const SENDGRID_API_URL: &str = "https://api.sendgrid.com/v3/mail/send";
pub const SECRETS_DIR: &str = "/run/secrets";

const DEFAULT_ACCESS_TOKENS: &str = "ABC123";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing env var: {0}")]
    Missing(&'static str),

    #[error("Invalid {key} value: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub access_tokens: Vec<String>,
    pub delivery: DeliveryConfig,
    pub fix: FixConfig,
}

#[derive(Clone)]
pub struct DeliveryConfig {
    pub api_key: String,
    pub api_url: String,
    pub from_email: String,
    pub from_name: Option<String>,
    pub reply_to: Option<String>,
    pub to_email: String,
}

impl Debug for DeliveryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeliveryConfig")
            .field("api_key", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("from_email", &self.from_email)
            .field("from_name", &self.from_name)
            .field("reply_to", &self.reply_to)
            .field("to_email", &self.to_email)
            .finish()
    }
}

type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(&|key: &str| env::var(key).ok(), Path::new(SECRETS_DIR))
    }

    pub fn from_lookup(lookup: Lookup, secrets_dir: &Path) -> Result<Self, ConfigError> {
        let access_tokens: Vec<String> =
            try_load::<String>(lookup, "ACCESS_TOKENS", DEFAULT_ACCESS_TOKENS)?
                .split(',')
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .map(str::to_string)
                .collect();

        if access_tokens.is_empty() {
            return Err(ConfigError::Invalid {
                key: "ACCESS_TOKENS",
                reason: "no tokens listed".to_string(),
            });
        }

        let min_accuracy_meters: f64 = try_load(lookup, "FIX_MIN_ACCURACY_M", "30")?;
        if !(min_accuracy_meters.is_finite() && min_accuracy_meters >= 0.0) {
            return Err(ConfigError::Invalid {
                key: "FIX_MIN_ACCURACY_M",
                reason: format!("{min_accuracy_meters} is not a non-negative distance"),
            });
        }

        let fix = FixConfig {
            max_wait: Duration::from_millis(try_load(lookup, "FIX_MAX_WAIT_MS", "20000")?),
            min_accuracy_meters,
            ..FixConfig::default()
        };

        Ok(Self {
            port: try_load(lookup, "PORT", "3000")?,
            access_tokens,
            delivery: DeliveryConfig::from_lookup(lookup, secrets_dir)?,
            fix,
        })
    }
}

impl DeliveryConfig {
    fn from_lookup(lookup: Lookup, secrets_dir: &Path) -> Result<Self, ConfigError> {
        let api_key = var(lookup, "SENDGRID_API_KEY")
            .or_else(|| read_secret(secrets_dir, "SENDGRID_API_KEY"))
            .ok_or(ConfigError::Missing("SENDGRID_API_KEY"))?;

        // Falls back to the provider account's own verified sender.
        let from_email = match var(lookup, "FROM_EMAIL") {
            Some(email) => email,
            None => {
                let account = var(lookup, "ACCOUNT_EMAIL").ok_or(ConfigError::Missing("FROM_EMAIL"))?;
                info!("FROM_EMAIL not set, sending as ACCOUNT_EMAIL {account}");
                account
            }
        };

        Ok(Self {
            api_key,
            api_url: try_load(lookup, "SENDGRID_API_URL", SENDGRID_API_URL)?,
            from_email,
            from_name: var(lookup, "FROM_NAME"),
            reply_to: var(lookup, "REPLY_TO"),
            to_email: require(lookup, "TO_EMAIL")?,
        })
    }
}

fn var(lookup: Lookup, key: &str) -> Option<String> {
    lookup(key).filter(|value| !value.trim().is_empty())
}

fn require(lookup: Lookup, key: &'static str) -> Result<String, ConfigError> {
    var(lookup, key).ok_or(ConfigError::Missing(key))
}

fn try_load<T: FromStr>(lookup: Lookup, key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    var(lookup, key)
        .unwrap_or_else(|| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .trim()
        .parse()
        .map_err(|e: T::Err| {
            warn!("Invalid {key} value: {e}");
            ConfigError::Invalid {
                key,
                reason: e.to_string(),
            }
        })
}

fn read_secret(secrets_dir: &Path, secret_name: &str) -> Option<String> {
    let path = secrets_dir.join(secret_name);

    read_to_string(&path)
        .map(|s| s.trim().to_string())
        .map_err(|e| {
            warn!("Failed to read {secret_name} from {}: {e}", path.display());
        })
        .ok()
        .filter(|s| !s.is_empty())
}

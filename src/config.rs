use std::path::Path;
use std::str::FromStr;

use secrecy::SecretString;
use serde::Deserialize;

use crate::error::AdvisorError;

const MAX_CONFIG_FILE_SIZE: u64 = 64 * 1024; // 64 KiB

/// Environment variable holding the completion service credential.
pub const API_KEY_ENV: &str = "GROQ_API_KEY";

pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

// --- TOML deserialization struct (private, maps 1:1 to the file) ---

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    base_url: Option<String>,
}

/// Where to send completion requests.
///
/// Only the endpoint is configurable. Model, sampling temperature and response
/// format are fixed for every request (see [`crate::providers::groq`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
        }
    }
}

impl FromStr for Config {
    type Err = AdvisorError;

    /// Parse a config from a TOML string. Missing keys fall back to defaults.
    fn from_str(content: &str) -> Result<Self, AdvisorError> {
        let file: ConfigFile =
            toml::from_str(content).map_err(|e| AdvisorError::ConfigLoad(e.to_string()))?;

        Ok(Self {
            base_url: file
                .base_url
                .map(|url| url.trim_end_matches('/').to_owned())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()),
        })
    }
}

impl Config {
    /// Load a config from a TOML file. Checks file size before reading.
    pub fn load(path: &Path) -> Result<Self, AdvisorError> {
        let metadata = std::fs::metadata(path).map_err(|e| {
            AdvisorError::ConfigLoad(format!("cannot read {}: {e}", path.display()))
        })?;

        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(AdvisorError::ConfigLoad(format!(
                "config file exceeds {MAX_CONFIG_FILE_SIZE} byte limit"
            )));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            AdvisorError::ConfigLoad(format!("cannot read {}: {e}", path.display()))
        })?;

        content.parse()
    }
}

/// Read the service credential from [`API_KEY_ENV`].
///
/// An unset variable is not an error here: it yields an empty secret and the
/// service rejects the call later, which the generator turns into a fallback.
pub fn api_key_from_env() -> SecretString {
    secret_from_var(API_KEY_ENV)
}

fn secret_from_var(name: &str) -> SecretString {
    SecretString::from(std::env::var(name).unwrap_or_default())
}

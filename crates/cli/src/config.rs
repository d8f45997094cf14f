use serde::{Deserialize, Serialize};
use url::Url;

/// Operator settings for a vendo directory, stored as `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Operators allowed to run mutating commands
    #[serde(default)]
    pub admins: Vec<String>,
    /// Users allowed to receive tokens (unset = everyone may receive)
    #[serde(default)]
    pub recipients: Option<Vec<String>>,
    /// Override for the voucher submission endpoint
    #[serde(default)]
    pub submit_url: Option<Url>,
    /// Log filter applied when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            admins: Vec::new(),
            recipients: None,
            submit_url: None,
            log_level: default_log_level(),
        }
    }
}

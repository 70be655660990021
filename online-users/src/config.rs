use serde::Deserialize;
use std::fs;

pub const STORE_URL_ENV: &str = "SUPABASE_URL";
/// Older deployments expose the project URL under its public name.
pub const STORE_URL_FALLBACK_ENV: &str = "NEXT_PUBLIC_SUPABASE_URL";
pub const STORE_SECRET_KEY_ENV: &str = "SUPABASE_SECRET_KEY";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct StoreSettings {
    pub url: Option<String>,
    pub secret_key: Option<String>,
}

/// HTTP status used when the store hands back an envelope carrying an error.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ErrorStatus {
    /// Always answer 200 and let callers inspect `error` in the body.
    #[default]
    Passthrough,
    /// Answer 502 when the envelope carries an error.
    Mapped,
}

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    pub listen: Option<String>,
    #[serde(default)]
    pub store: StoreSettings,
    // Defaults to `passthrough`.
    pub error_status: Option<ErrorStatus>,
    // Upper bound on a whole store query. Unset means a slow store shows up
    // directly as request latency.
    pub timeout_secs: Option<u64>,
    // Upper bound on opening a connection to the store. Unset leaves it to
    // the OS connect timeout.
    pub connect_timeout_secs: Option<u64>,
    // Idle pooled connections kept per store host. Unset keeps every idle one.
    pub pool_max_idle_per_host: Option<usize>,
    // Keepalive probe interval on store connections. Unset leaves keepalive off.
    pub tcp_keepalive_secs: Option<u64>,
}

impl Config {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let cfg_str = fs::read_to_string(path)?;
        Ok(toml::from_str(&cfg_str)?)
    }

    /// Loads the file when it exists, otherwise starts from defaults so the
    /// service can run from environment alone.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        if std::path::Path::new(path).exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Store URL and key from the environment win over the file.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(STORE_URL_ENV).or_else(|| lookup(STORE_URL_FALLBACK_ENV)) {
            self.store.url = Some(url);
        }
        if let Some(key) = lookup(STORE_SECRET_KEY_ENV) {
            self.store.secret_key = Some(key);
        }
        self
    }
}

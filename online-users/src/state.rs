use crate::config::{Config, ErrorStatus};
use crate::store::{RecordStore, RestStore};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub error_status: ErrorStatus,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>, error_status: ErrorStatus) -> Self {
        AppState {
            store,
            error_status,
        }
    }

    pub fn from_config(cfg: &Config) -> anyhow::Result<Self> {
        let url = cfg
            .store
            .url
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("Store URL is not configured"))?;
        let secret_key = cfg
            .store
            .secret_key
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("Store secret key is not configured"))?;

        let mut builder = Client::builder();
        if let Some(secs) = cfg.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
            debug!("Store request timeout: {}s", secs);
        }
        if let Some(secs) = cfg.connect_timeout_secs {
            builder = builder.connect_timeout(Duration::from_secs(secs));
            debug!("Store connect timeout: {}s", secs);
        }
        if let Some(max) = cfg.pool_max_idle_per_host {
            builder = builder.pool_max_idle_per_host(max);
        }
        if let Some(secs) = cfg.tcp_keepalive_secs {
            builder = builder.tcp_keepalive(Duration::from_secs(secs));
        }
        let client = builder.build()?;

        let store = RestStore::new(client, url, secret_key)?;
        info!("Registered record store: url='{}'", url);

        let error_status = cfg.error_status.unwrap_or_default();
        debug!("Error status policy: {:?}", error_status);

        Ok(AppState::new(Arc::new(store), error_status))
    }
}

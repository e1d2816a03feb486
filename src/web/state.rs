use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::Client;
use tracing::info;

use crate::{config::AppConfig, web::LoadingGate};

#[derive(Clone)]
pub struct AppState {
    config: Arc<AppConfig>,
    http: Client,
    loading: LoadingGate,
}

impl AppState {
    pub async fn new(config: AppConfig) -> Result<Self> {
        let http = Client::builder()
            .build()
            .context("failed to build HTTP client")?;

        tokio::fs::create_dir_all(&config.upload_dir)
            .await
            .with_context(|| {
                format!(
                    "failed to ensure upload directory at {}",
                    config.upload_dir.display()
                )
            })?;
        info!(upload_dir = %config.upload_dir.display(), backend = %config.backend_url, "state ready");

        Ok(Self {
            config: Arc::new(config),
            http,
            loading: LoadingGate::default(),
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn http(&self) -> &Client {
        &self.http
    }

    pub fn loading(&self) -> &LoadingGate {
        &self.loading
    }
}

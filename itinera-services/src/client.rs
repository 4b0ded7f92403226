use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::config::ServiceConfig;

/// JSON-over-HTTP client for the generation service routes.
#[derive(Debug, Clone)]
pub struct HttpServices {
    client: reqwest::Client,
    config: ServiceConfig,
}

impl HttpServices {
    pub fn new(config: ServiceConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("build http client")?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// POST `body` to `path` and return the decoded JSON response.
    pub async fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value> {
        let url = self.config.endpoint(path);
        debug!(%url, "service request");

        let resp = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .with_context(|| format!("POST {url}"))?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            bail!("{path} returned {status}: {txt}");
        }
        resp.json().await.with_context(|| format!("parse {path} response"))
    }
}

use crate::error::NodeError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{header, Client};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

pub const TMDB_BASE: &str = "https://api.themoviedb.org/3";

/// The one capability the node needs from TMDB: authenticated JSON GETs.
#[async_trait]
pub trait TmdbApi: Send + Sync {
    /// GET `{base}{path_and_query}` and return the decoded body.
    async fn get_json(&self, path_and_query: &str) -> Result<Value, NodeError>;
    /// Checks the token against `/configuration`.
    async fn test_credentials(&self) -> Result<(), NodeError>;
}

#[derive(Debug, Clone)]
pub struct TmdbClient {
    client: Client,
    base: String,
    token: String,
}

impl TmdbClient {
    pub fn new(token: impl Into<String>, base: impl Into<String>) -> Result<Self> {
        let user_agent = format!("tmdb-node/{}", env!("CARGO_PKG_VERSION"));
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(30))
            .user_agent(user_agent)
            .build()
            .context("Failed to build TMDB HTTP client")?;
        Ok(Self {
            client,
            base: base.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    pub fn base(&self) -> &str {
        &self.base
    }
}

#[async_trait]
impl TmdbApi for TmdbClient {
    async fn get_json(&self, path_and_query: &str) -> Result<Value, NodeError> {
        let url = format!("{}{}", self.base, path_and_query);
        debug!(url = %url, "TMDB request");
        let res = self
            .client
            .get(&url)
            .header(header::ACCEPT, "application/json")
            .bearer_auth(&self.token)
            .send()
            .await?;
        let status = res.status();
        let text = res.text().await?;
        if !status.is_success() {
            return Err(NodeError::Upstream {
                status: status.as_u16(),
                body: text,
            });
        }
        Ok(serde_json::from_str(&text)?)
    }

    async fn test_credentials(&self) -> Result<(), NodeError> {
        self.get_json("/configuration").await.map(|_| ())
    }
}

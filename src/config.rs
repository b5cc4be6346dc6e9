use crate::runner::DEFAULT_CONCURRENCY;
use crate::tmdb::TMDB_BASE;
use anyhow::{anyhow, bail, Context, Result};
use std::env;
use std::net::SocketAddr;

const DEFAULT_ADDR: &str = "0.0.0.0:3146";

#[derive(Debug, Clone)]
pub struct Settings {
    pub api_token: String,
    pub api_base: String,
    pub addr: SocketAddr,
    pub concurrency: usize,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds settings from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_token = get("TMDB_API_TOKEN")
            .ok_or_else(|| anyhow!("Missing required environment variable: TMDB_API_TOKEN"))?;
        let api_base = get("TMDB_API_BASE").unwrap_or_else(|| TMDB_BASE.to_string());
        if !api_base.starts_with("http://") && !api_base.starts_with("https://") {
            bail!("TMDB_API_BASE must be an http(s) URL, got '{}'", api_base);
        }
        let addr = get("TMDB_NODE_ADDR")
            .unwrap_or_else(|| DEFAULT_ADDR.to_string())
            .parse::<SocketAddr>()
            .context("TMDB_NODE_ADDR is not a valid socket address")?;
        let concurrency = match get("TMDB_NODE_CONCURRENCY") {
            Some(raw) => raw
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| {
                    anyhow!("TMDB_NODE_CONCURRENCY must be a positive integer, got '{}'", raw)
                })?,
            None => DEFAULT_CONCURRENCY,
        };

        Ok(Self {
            api_token,
            api_base,
            addr,
            concurrency,
        })
    }
}

use thiserror::Error;

/// Why a single item failed.
#[derive(Debug, Error)]
pub enum NodeError {
    #[error("invalid parameters: {0}")]
    Config(String),
    #[error("TMDB returned {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("request to TMDB failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("TMDB response was not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

impl NodeError {
    pub fn config(msg: impl Into<String>) -> Self {
        NodeError::Config(msg.into())
    }

    pub fn is_config(&self) -> bool {
        matches!(self, NodeError::Config(_))
    }
}

/// A failure that aborted a batch, tagged with the offending item.
#[derive(Debug, Error)]
#[error("item {item_index}: {source}")]
pub struct RunError {
    pub item_index: usize,
    #[source]
    pub source: NodeError,
}

// src/feed/types.rs
use async_trait::async_trait;
use serde_json::Value;

/// One page of raw dynamics items, feed order (newest first).
pub type RawFeedPage = Vec<Value>;

/// How a feed fetch can fail. The pipeline treats every variant as "no data
/// this run" and aborts cleanly; the variants exist so the log can say why.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("timed out fetching the dynamics feed")]
    Timeout,
    #[error("dynamics API rejected the request with code {code}")]
    Api { code: i64 },
    #[error("dynamics response carried no items")]
    Empty,
    #[error("http error fetching dynamics: {0}")]
    Http(#[from] reqwest::Error),
}

#[async_trait]
pub trait DynamicsSource: Send + Sync {
    /// Fetch the first page of the target user's dynamics. Pagination is
    /// deliberately absent; one page covers the daily cadence.
    async fn fetch_first_page(&self) -> Result<RawFeedPage, FeedError>;

    fn name(&self) -> &'static str;
}

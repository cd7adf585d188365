// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod archive;
pub mod classify;
pub mod config;
pub mod extract;
pub mod feed;
pub mod images;
pub mod latest;
pub mod notify;
pub mod pipeline;
pub mod sanitize;

// ---- Re-exports for the common entry points ----
pub use crate::classify::Question;
pub use crate::config::Config;
pub use crate::extract::ExtractedContent;
pub use crate::feed::types::{DynamicsSource, FeedError};
pub use crate::images::ImageFetcher;

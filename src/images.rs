// src/images.rs
//! Image download collaborator: URL normalization, local naming, and an
//! HTTP fetcher behind a trait so pipelines can run against a mock.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::classify::Question;
use crate::sanitize::{sanitize_filename, split_extension};

// The CDN rejects bare clients; these mirror a desktop browser.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
const REFERER: &str = "https://www.bilibili.com/";
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Complete protocol-relative and schemeless URLs before handing them to the
/// HTTP client.
pub fn normalize_url(url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else if let Some(rest) = url.strip_prefix("//") {
        format!("https://{rest}")
    } else {
        format!("https://{url}")
    }
}

/// Extension from the URL path, query string stripped. Only the final path
/// segment counts, so dots in the hostname never masquerade as an
/// extension. Missing or implausibly long (over 6 chars with the dot)
/// falls back to `.jpg`.
pub fn url_extension(url: &str) -> String {
    let path = url.split('?').next().unwrap_or(url);
    let last_segment = path.rsplit('/').next().unwrap_or(path);
    let (_, ext) = split_extension(last_segment);
    if ext.is_empty() || ext.chars().count() > 6 {
        ".jpg".to_string()
    } else {
        ext.to_string()
    }
}

/// Deterministic local name: `{ordinal}_{YYYY_MM_DD}{ext}`, sanitized.
pub fn image_filename(question: &Question) -> String {
    let ext = url_extension(&question.image_url);
    sanitize_filename(&format!(
        "{}_{}{}",
        question.number,
        question.date_token(),
        ext
    ))
}

#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Download `url` into `folder/filename`, returning the written path.
    async fn download(&self, url: &str, folder: &Path, filename: &str) -> Result<PathBuf>;
}

pub struct HttpImageFetcher {
    client: reqwest::Client,
}

impl HttpImageFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(DOWNLOAD_TIMEOUT)
            .build()
            .context("building the image download client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn download(&self, url: &str, folder: &Path, filename: &str) -> Result<PathBuf> {
        let url = normalize_url(url);
        let filepath = folder.join(filename);
        tracing::info!(url = %url, path = %filepath.display(), "downloading image");

        let resp = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header(reqwest::header::REFERER, REFERER)
            .send()
            .await
            .with_context(|| format!("requesting image {url}"))?
            .error_for_status()
            .with_context(|| format!("image server rejected {url}"))?;

        let bytes = resp
            .bytes()
            .await
            .with_context(|| format!("reading image body from {url}"))?;

        tokio::fs::create_dir_all(folder)
            .await
            .with_context(|| format!("creating image dir {}", folder.display()))?;
        tokio::fs::write(&filepath, &bytes)
            .await
            .with_context(|| format!("writing image to {}", filepath.display()))?;

        Ok(filepath)
    }
}

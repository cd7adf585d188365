// src/feed/client.rs
//! HTTP client for the Bilibili dynamics API.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::Credentials;
use crate::feed::types::{DynamicsSource, FeedError, RawFeedPage};

const FEED_URL: &str = "https://api.bilibili.com/x/polymer/web-dynamic/v1/feed/space";
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

pub struct BiliClient {
    client: reqwest::Client,
    uid: u64,
    credential: Option<Credentials>,
}

impl BiliClient {
    pub fn new(uid: u64, credential: Option<Credentials>) -> Self {
        // No client-level timeout: the outer tokio timeout is the single
        // 30 s bound, so an overrun always surfaces as FeedError::Timeout.
        let client = reqwest::Client::new();
        Self {
            client,
            uid,
            credential,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.credential.is_some()
    }

    fn cookie_header(&self) -> Option<String> {
        let c = self.credential.as_ref()?;
        let mut cookie = format!(
            "SESSDATA={}; bili_jct={}; buvid3={}",
            c.sessdata, c.bili_jct, c.buvid3
        );
        if let Some(dedeuserid) = c.dedeuserid.as_deref().filter(|s| !s.trim().is_empty()) {
            cookie.push_str(&format!("; DedeUserID={dedeuserid}"));
        }
        Some(cookie)
    }

    /// The first page of items lives under `data.items` on the polymer API;
    /// the pre-polymer space feed used `data.cards`. Accept either.
    fn page_items(body: &Value) -> Option<RawFeedPage> {
        let data = body.get("data")?;
        let items = data
            .get("items")
            .or_else(|| data.get("cards"))?
            .as_array()?;
        if items.is_empty() {
            return None;
        }
        Some(items.clone())
    }
}

/// Advisory log hints for the well-known rejection codes, mirroring what an
/// operator would otherwise have to look up.
fn log_api_code_hint(code: i64, authenticated: bool) {
    match code {
        -101 if authenticated => {
            tracing::warn!("code -101: the session cookie has likely expired")
        }
        -101 => tracing::warn!("code -101: this feed may require a logged-in session"),
        -412 => tracing::warn!("code -412: request intercepted, likely rate limited"),
        -352 => tracing::warn!("code -352: verification failed, check buvid3/csrf values"),
        62002 => tracing::warn!("code 62002: the target user's feed is private"),
        _ => {}
    }
}

#[async_trait]
impl DynamicsSource for BiliClient {
    async fn fetch_first_page(&self) -> Result<RawFeedPage, FeedError> {
        let mode = if self.is_authenticated() {
            "authenticated"
        } else {
            "anonymous"
        };
        tracing::info!(uid = self.uid, mode, "fetching first page of dynamics");

        let mut req = self
            .client
            .get(FEED_URL)
            .query(&[("host_mid", self.uid.to_string()), ("offset", String::new())])
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header(reqwest::header::REFERER, "https://space.bilibili.com/");
        if let Some(cookie) = self.cookie_header() {
            req = req.header(reqwest::header::COOKIE, cookie);
        }

        let resp = tokio::time::timeout(FETCH_TIMEOUT, req.send())
            .await
            .map_err(|_| FeedError::Timeout)??;
        let body: Value = tokio::time::timeout(FETCH_TIMEOUT, resp.json())
            .await
            .map_err(|_| FeedError::Timeout)??;

        let code = body.get("code").and_then(Value::as_i64).unwrap_or(0);
        if code != 0 {
            log_api_code_hint(code, self.is_authenticated());
            return Err(FeedError::Api { code });
        }

        match Self::page_items(&body) {
            Some(items) => {
                tracing::info!(uid = self.uid, count = items.len(), "fetched dynamics page");
                Ok(items)
            }
            None => Err(FeedError::Empty),
        }
    }

    fn name(&self) -> &'static str {
        "bilibili"
    }
}

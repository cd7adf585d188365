// src/classify.rs
//! The "第N题" caption filter. This is the one content gate the whole tool
//! hinges on, so it stays deliberately strict: no pattern, no question.

use chrono::{Local, TimeZone};
use once_cell::sync::OnceCell;
use regex::Regex;

use crate::extract::ExtractedContent;

pub const UNKNOWN_TIME: &str = "未知时间";
pub const NO_DATE_TOKEN: &str = "nodate";

/// A feed item confirmed to be a daily-question post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub number: u32,
    pub title: String,
    pub body: String,
    pub published_at: Option<i64>,
    pub id: String,
    /// First image of the post, normalized URL. Downloaded later.
    pub image_url: String,
}

fn question_re() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    // Case-insensitive flag kept from the original; a no-op for the Han
    // characters but it preserves behavior on mixed-script captions.
    RE.get_or_init(|| Regex::new(r"(?i)第\s*(\d+)\s*题").unwrap())
}

/// Pull the question ordinal out of a caption, or reject it.
pub fn question_number(caption: &str) -> Option<u32> {
    question_re()
        .captures(caption.trim())?
        .get(1)?
        .as_str()
        .parse()
        .ok()
}

/// Confirm an extracted item is a daily-question post. Rejection is the
/// normal outcome for a feed full of unrelated posts.
pub fn classify(content: &ExtractedContent) -> Option<Question> {
    let body = content.caption.trim();
    if body.is_empty() {
        return None;
    }
    let number = question_number(body)?;
    let image_url = content.image_urls.first()?.clone();

    Some(Question {
        number,
        title: format!("每日一题 | 第 {number} 题"),
        body: body.to_string(),
        published_at: content.published_at,
        id: content.id.clone(),
        image_url,
    })
}

impl Question {
    /// Human-readable publish time in local time, or a fixed placeholder.
    pub fn display_time(&self) -> String {
        self.format_time("%Y-%m-%d %H:%M", UNKNOWN_TIME)
    }

    /// Compact `YYYY_MM_DD` token for filenames, or a fixed placeholder.
    pub fn date_token(&self) -> String {
        self.format_time("%Y_%m_%d", NO_DATE_TOKEN)
    }

    fn format_time(&self, fmt: &str, fallback: &str) -> String {
        self.published_at
            .and_then(|ts| Local.timestamp_opt(ts, 0).single())
            .map(|dt| dt.format(fmt).to_string())
            .unwrap_or_else(|| fallback.to_string())
    }
}

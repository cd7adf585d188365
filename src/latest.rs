// src/latest.rs
//! Email mode picks exactly one post: the newest item that extracts,
//! classifies and downloads. No memory across runs — whatever qualifies
//! today gets sent today, even if it was sent yesterday too.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::classify::{classify, Question};
use crate::extract::extract;
use crate::images::{image_filename, ImageFetcher};

/// The selected question together with its downloaded image.
#[derive(Debug, Clone)]
pub struct LatestQuestion {
    pub question: Question,
    pub image_path: PathBuf,
}

/// Walk the page in feed order (newest first) and return the first item
/// that fully succeeds. A download failure discards that item and the
/// search continues with the next-older one.
pub async fn find_latest_question(
    items: &[Value],
    image_dir: &Path,
    fetcher: &dyn ImageFetcher,
) -> Option<LatestQuestion> {
    for item in items {
        let Some(content) = extract(item) else {
            continue;
        };
        let Some(question) = classify(&content) else {
            continue;
        };

        let filename = image_filename(&question);
        match fetcher
            .download(&question.image_url, image_dir, &filename)
            .await
        {
            Ok(image_path) => {
                tracing::info!(
                    id = %question.id,
                    number = question.number,
                    "selected latest daily question"
                );
                return Some(LatestQuestion {
                    question,
                    image_path,
                });
            }
            Err(e) => {
                tracing::warn!(id = %question.id, error = %e, "image download failed, trying an older item");
                continue;
            }
        }
    }
    None
}

// src/pipeline.rs
//! Glue for the two consumption modes. Each run is one sequential unit of
//! work: fetch page, walk items, persist or send. A fetch failure means
//! "no data this run" and surfaces as an error for the caller to log.

use anyhow::{Context, Result};

use crate::archive::{self, ArchiveOutcome};
use crate::config::Config;
use crate::feed::client::BiliClient;
use crate::feed::types::DynamicsSource;
use crate::images::HttpImageFetcher;
use crate::latest::find_latest_question;
use crate::notify::EmailSender;

fn feed_client(cfg: &Config, use_login: bool) -> BiliClient {
    BiliClient::new(cfg.target_uid, cfg.login_credentials(use_login))
}

/// Document mode: archive every new daily question into the Markdown file.
pub async fn run_archive(cfg: &Config, use_login: bool) -> Result<ArchiveOutcome> {
    let client = feed_client(cfg, use_login);
    let items = client
        .fetch_first_page()
        .await
        .context("fetching dynamics feed")?;

    let fetcher = HttpImageFetcher::new()?;
    archive::run(
        &items,
        cfg.output_md_file.as_ref(),
        cfg.image_dir.as_ref(),
        &fetcher,
    )
    .await
}

/// Email mode: send the single most-recent daily question, if any.
/// Returns whether an email went out.
pub async fn run_email(cfg: &Config, use_login: bool) -> Result<bool> {
    // Validate the mail account before touching the network at all.
    let sender = EmailSender::from_config(cfg.email_config()?)?;

    let client = feed_client(cfg, use_login);
    let items = client
        .fetch_first_page()
        .await
        .context("fetching dynamics feed")?;

    let fetcher = HttpImageFetcher::new()?;
    match find_latest_question(&items, cfg.image_dir.as_ref(), &fetcher).await {
        Some(latest) => {
            sender.send_question(&latest).await?;
            Ok(true)
        }
        None => {
            tracing::info!("no qualifying daily question on the first page");
            Ok(false)
        }
    }
}

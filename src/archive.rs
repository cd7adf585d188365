// src/archive.rs
//! Document mode: append-nothing, prepend-new. The Markdown file doubles as
//! the dedup store — every entry carries an `<!-- ID: … -->` marker and the
//! set of already-archived ids is rebuilt by scanning the file on each run.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use regex::Regex;
use serde_json::Value;

use crate::classify::{classify, Question};
use crate::extract::{extract, extract_id};
use crate::images::{image_filename, ImageFetcher};

/// Identifier markers come in two textual forms so hand-edited documents
/// stay compatible: the comment marker this tool writes, and a loose
/// `dynamic_id: N` field style. The scan takes the union.
pub fn scan_processed_ids(document: &str) -> HashSet<String> {
    static RE_FIELD: OnceCell<Regex> = OnceCell::new();
    static RE_COMMENT: OnceCell<Regex> = OnceCell::new();
    let re_field =
        RE_FIELD.get_or_init(|| Regex::new(r"(?i)dynamic_id(?:_str)?:\s*(\d+)").unwrap());
    let re_comment = RE_COMMENT.get_or_init(|| Regex::new(r"<!--\s*ID:\s*(\d+)\s*-->").unwrap());

    let mut ids: HashSet<String> = HashSet::new();
    for caps in re_field.captures_iter(document) {
        ids.insert(caps[1].to_string());
    }
    for caps in re_comment.captures_iter(document) {
        ids.insert(caps[1].to_string());
    }
    ids
}

/// One Markdown fragment per question, marker first so the next run can
/// find it again.
pub fn render_entry(question: &Question, image_rel_path: &str) -> String {
    let image_rel_path = image_rel_path.replace('\\', "/");
    format!(
        "<!-- ID: {id} -->\n## {title} ({time})\n\n**文本:**\n\n{body}\n\n**图片:**\n\n![{title}]({image_rel_path})\n\n---\n",
        id = question.id,
        title = question.title,
        time = question.display_time(),
        body = question.body,
    )
}

#[derive(Debug, Default)]
pub struct ArchiveOutcome {
    pub new_entries: usize,
    pub skipped_known: usize,
}

/// Run the document-mode pass over one feed page. Items arrive newest
/// first; new fragments keep that order and land before all prior content.
/// The file is only rewritten when at least one new entry was produced, and
/// only after the whole pass has finished, so a mid-run failure leaves the
/// document untouched.
pub async fn run(
    items: &[Value],
    doc_path: &Path,
    image_dir: &Path,
    fetcher: &dyn ImageFetcher,
) -> Result<ArchiveOutcome> {
    let existing = match std::fs::read_to_string(doc_path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => {
            tracing::warn!(path = %doc_path.display(), error = %e, "could not read existing document, starting fresh");
            String::new()
        }
    };
    let mut processed = scan_processed_ids(&existing);
    tracing::info!(known = processed.len(), "scanned document for archived ids");

    let mut outcome = ArchiveOutcome::default();
    let mut fragments: Vec<String> = Vec::new();

    for item in items {
        let Some(id) = extract_id(item) else {
            continue;
        };
        if processed.contains(&id) {
            outcome.skipped_known += 1;
            continue;
        }
        let Some(content) = extract(item) else {
            continue;
        };
        let Some(question) = classify(&content) else {
            continue;
        };
        tracing::info!(id = %id, number = question.number, "matched daily question");

        let filename = image_filename(&question);
        if let Err(e) = fetcher
            .download(&question.image_url, image_dir, &filename)
            .await
        {
            tracing::warn!(id = %id, error = %e, "image download failed, skipping item");
            continue;
        }

        let rel_path = image_dir.join(&filename).display().to_string();
        fragments.push(render_entry(&question, &rel_path));
        processed.insert(id);
        outcome.new_entries += 1;
    }

    if !fragments.is_empty() {
        let final_content = format!("{}\n{}", fragments.join("\n"), existing);
        std::fs::write(doc_path, final_content)
            .with_context(|| format!("writing document {}", doc_path.display()))?;
        tracing::info!(
            new = outcome.new_entries,
            path = %doc_path.display(),
            "archived new daily questions"
        );
    } else {
        tracing::info!("no new daily questions this run, document untouched");
    }

    Ok(outcome)
}

// tests/archive_pipeline.rs
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde_json::{json, Value};

use biliq::archive;
use biliq::images::ImageFetcher;

/// Fetcher that records download calls and fails for URLs containing "bad".
#[derive(Default)]
struct MockFetcher {
    calls: Mutex<Vec<String>>,
}

#[async_trait]
impl ImageFetcher for MockFetcher {
    async fn download(&self, url: &str, folder: &Path, filename: &str) -> Result<PathBuf> {
        self.calls.lock().unwrap().push(url.to_string());
        if url.contains("bad") {
            bail!("simulated download failure for {url}");
        }
        Ok(folder.join(filename))
    }
}

fn question_item(id: &str, number: u32, url: &str) -> Value {
    json!({
        "desc": { "dynamic_id_str": id, "timestamp": 1_709_294_400 },
        "card": {
            "modules": {
                "module_dynamic": {
                    "major": {
                        "type": "MAJOR_TYPE_DRAW",
                        "draw": { "items": [ { "src": url } ] }
                    },
                    "desc": { "text": format!("每日一题 第{number}题") }
                }
            }
        }
    })
}

fn chatter_item(id: &str) -> Value {
    json!({
        "desc": { "dynamic_id_str": id },
        "card": {
            "modules": {
                "module_dynamic": {
                    "major": {
                        "type": "MAJOR_TYPE_DRAW",
                        "draw": { "items": [ { "src": "//cdn/x.png" } ] }
                    },
                    "desc": { "text": "随便发个图" }
                }
            }
        }
    })
}

#[tokio::test]
async fn new_entries_are_prepended_newest_first() {
    let dir = tempfile::tempdir().unwrap();
    let doc = dir.path().join("archive.md");
    std::fs::write(&doc, "# 旧内容\n").unwrap();

    let items = vec![
        question_item("900", 9, "//cdn/9.png"),
        question_item("800", 8, "//cdn/8.png"),
        question_item("700", 7, "//cdn/7.png"),
    ];
    let fetcher = MockFetcher::default();
    let out = archive::run(&items, &doc, dir.path().join("imgs").as_path(), &fetcher)
        .await
        .unwrap();
    assert_eq!(out.new_entries, 3);

    let content = std::fs::read_to_string(&doc).unwrap();
    let p9 = content.find("第 9 题").unwrap();
    let p8 = content.find("第 8 题").unwrap();
    let p7 = content.find("第 7 题").unwrap();
    let old = content.find("# 旧内容").unwrap();
    assert!(p9 < p8 && p8 < p7 && p7 < old, "feed order must be preserved ahead of prior content");
}

#[tokio::test]
async fn second_run_over_unchanged_feed_changes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let doc = dir.path().join("archive.md");

    let items = vec![
        question_item("101", 1, "//cdn/1.png"),
        chatter_item("102"),
        question_item("103", 2, "//cdn/2.png"),
    ];
    let fetcher = MockFetcher::default();
    let imgs = dir.path().join("imgs");

    let first = archive::run(&items, &doc, &imgs, &fetcher).await.unwrap();
    assert_eq!(first.new_entries, 2);
    let after_first = std::fs::read_to_string(&doc).unwrap();

    let second = archive::run(&items, &doc, &imgs, &fetcher).await.unwrap();
    assert_eq!(second.new_entries, 0);
    assert_eq!(second.skipped_known, 2);
    let after_second = std::fs::read_to_string(&doc).unwrap();
    assert_eq!(after_first, after_second);
}

#[tokio::test]
async fn failed_download_skips_only_that_item() {
    let dir = tempfile::tempdir().unwrap();
    let doc = dir.path().join("archive.md");

    let items = vec![
        question_item("201", 1, "//cdn/bad.png"),
        question_item("202", 2, "//cdn/good.png"),
    ];
    let fetcher = MockFetcher::default();
    let out = archive::run(&items, &doc, dir.path(), &fetcher).await.unwrap();
    assert_eq!(out.new_entries, 1);

    let content = std::fs::read_to_string(&doc).unwrap();
    assert!(content.contains("<!-- ID: 202 -->"));
    assert!(!content.contains("<!-- ID: 201 -->"));

    // The failed item stays unrecorded, so a later run retries it.
    let retry = archive::run(&items, &doc, dir.path(), &fetcher).await.unwrap();
    assert_eq!(retry.skipped_known, 1);
}

#[tokio::test]
async fn no_qualifying_items_leaves_the_document_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let doc = dir.path().join("archive.md");
    std::fs::write(&doc, "hand-written\n").unwrap();

    let items = vec![chatter_item("301")];
    let fetcher = MockFetcher::default();
    let out = archive::run(&items, &doc, dir.path(), &fetcher).await.unwrap();
    assert_eq!(out.new_entries, 0);
    assert_eq!(std::fs::read_to_string(&doc).unwrap(), "hand-written\n");
    assert!(fetcher.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn hand_edited_field_markers_also_deduplicate() {
    let dir = tempfile::tempdir().unwrap();
    let doc = dir.path().join("archive.md");
    std::fs::write(&doc, "dynamic_id_str: 401\n").unwrap();

    let items = vec![question_item("401", 4, "//cdn/4.png")];
    let fetcher = MockFetcher::default();
    let out = archive::run(&items, &doc, dir.path(), &fetcher).await.unwrap();
    assert_eq!(out.new_entries, 0);
    assert_eq!(out.skipped_known, 1);
}

// src/extract.rs
//! Pulls a (caption, images, timestamp) triple out of one raw dynamics item.
//!
//! The dynamics API has grown several shapes for what is semantically the
//! same image post. Each shape gets its own small matcher over the decoded
//! card; matchers run in fixed priority order and the first hit wins, so no
//! single function has to understand every generation of the payload.

use serde_json::Value;

/// Content recovered from one feed item, shape-independent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedContent {
    pub id: String,
    pub caption: String,
    pub image_urls: Vec<String>,
    pub published_at: Option<i64>,
}

/// The dynamic id lives in different places depending on the item kind.
/// First non-empty source wins; an item with none is unidentifiable and
/// gets skipped before any extraction work.
pub fn extract_id(item: &Value) -> Option<String> {
    let candidates = [
        item.pointer("/desc/dynamic_id_str"),
        item.pointer("/display/origin/dynamic_id_str"),
        item.pointer("/desc/rid_str"),
        item.pointer("/basic/comment_id_str"),
    ];
    candidates
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// The `card` field is either an object or a JSON string that needs a second
/// decode. Decode failure is its own outcome, distinct from "no shape
/// matched", so callers can log it separately.
fn decode_card(card: &Value) -> Result<Option<Value>, serde_json::Error> {
    match card {
        Value::String(s) => serde_json::from_str::<Value>(s).map(Some),
        Value::Object(_) => Ok(Some(card.clone())),
        _ => Ok(None),
    }
}

/// Shape 1: `modules.module_dynamic.major` tagged MAJOR_TYPE_DRAW, with a
/// sibling desc block. The current polymer feed shape.
fn match_modules(card: &Value) -> Option<(String, Vec<String>)> {
    let module_dynamic = card.pointer("/modules/module_dynamic")?;
    let major = module_dynamic.get("major")?;
    if major.get("type")?.as_str()? != "MAJOR_TYPE_DRAW" {
        return None;
    }
    let items = major.pointer("/draw/items")?.as_array()?;
    let caption = module_dynamic.pointer("/desc/text")?.as_str()?;
    let urls: Vec<String> = items
        .iter()
        .filter_map(|it| it.get("src").and_then(Value::as_str))
        .map(str::to_string)
        .collect();
    Some((caption.to_string(), urls))
}

/// Shape 2: legacy `item.pictures[].img_src` plus `item.description`.
fn match_legacy_item(card: &Value) -> Option<(String, Vec<String>)> {
    let item = card.get("item")?;
    let pictures = item.get("pictures")?.as_array()?;
    let caption = item.get("description")?.as_str()?;
    if caption.is_empty() {
        return None;
    }
    let urls: Vec<String> = pictures
        .iter()
        .filter_map(|pic| pic.get("img_src").and_then(Value::as_str))
        .map(str::to_string)
        .collect();
    Some((caption.to_string(), urls))
}

/// Shape 3: a repost carries the real post under `origin`, possibly
/// string-encoded a second time. Unwrap and retry the content shapes
/// against the origin card, keeping the origin's own caption and pictures.
fn match_origin(card: &Value) -> Option<(String, Vec<String>)> {
    let origin = card.get("origin")?;
    let origin_card = match origin {
        Value::String(s) => serde_json::from_str::<Value>(s).ok()?,
        Value::Object(_) => origin.clone(),
        _ => return None,
    };
    match_legacy_item(&origin_card).or_else(|| match_modules(&origin_card))
}

fn publish_timestamp(item: &Value, card: &Value) -> Option<i64> {
    item.pointer("/desc/timestamp")
        .and_then(Value::as_i64)
        .or_else(|| card.pointer("/item/upload_time").and_then(Value::as_i64))
}

/// Try the shape matchers against one feed item. `None` is the expected
/// outcome for most items, not an error.
pub fn extract(item: &Value) -> Option<ExtractedContent> {
    let id = extract_id(item)?;

    let card_value = item.get("card")?;
    let card = match decode_card(card_value) {
        Ok(Some(card)) => card,
        Ok(None) => {
            tracing::warn!(id = %id, "card payload has unexpected type, skipping");
            return None;
        }
        Err(e) => {
            tracing::warn!(id = %id, error = %e, "card payload failed to decode, skipping");
            return None;
        }
    };

    let matched = match_modules(&card)
        .or_else(|| match_legacy_item(&card))
        .or_else(|| match_origin(&card));
    let (caption, image_urls) = matched?;

    if caption.trim().is_empty() || image_urls.is_empty() {
        return None;
    }

    Some(ExtractedContent {
        published_at: publish_timestamp(item, &card),
        id,
        caption,
        image_urls,
    })
}

//! Persistence payload for an inventory.
//!
//! Writing is plain serde. Reading goes through `serde_json::Value` so one bad
//! record does not throw away the rest of the inventory.

use serde::Serialize;
use serde_json::Value;

use crate::error::{Result, TrackerError};
use crate::model::{normalize_category, Item, ItemRecord};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub next_id: u64,
    /// Most recent first.
    pub items: Vec<Item>,
    /// Recency queue contents, oldest first.
    pub recent: Vec<Item>,
}

impl Snapshot {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// A snapshot as read back from storage, before it is applied to a store.
#[derive(Debug, Default)]
pub struct RawSnapshot {
    pub next_id: Option<u64>,
    pub items: Vec<ItemRecord>,
    pub recent: Vec<ItemRecord>,
    pub skipped: usize,
}

/// Decode a stored payload. Fails only when the payload as a whole is
/// unusable; malformed records are counted in `skipped`.
pub fn decode(text: &str) -> Result<RawSnapshot> {
    let root: Value = serde_json::from_str(text)?;
    let obj = root
        .as_object()
        .ok_or_else(|| TrackerError::InvalidInput("snapshot payload is not an object".into()))?;

    let next_id = obj.get("nextId").and_then(positive_integer);
    let (items, skipped) = obj.get("items").map(parse_records).unwrap_or_default();
    let (recent, _) = obj.get("recent").map(parse_records).unwrap_or_default();

    Ok(RawSnapshot {
        next_id,
        items,
        recent,
        skipped,
    })
}

/// Parse an array of item records, returning the good ones and how many were
/// dropped. Anything that is not an array yields nothing.
pub fn parse_records(value: &Value) -> (Vec<ItemRecord>, usize) {
    let Some(entries) = value.as_array() else {
        return (Vec::new(), 0);
    };
    let mut records = Vec::with_capacity(entries.len());
    let mut skipped = 0;
    for entry in entries {
        match parse_record(entry) {
            Some(record) => records.push(record),
            None => skipped += 1,
        }
    }
    (records, skipped)
}

/// Requires a non-empty name and two numeric prices. The id is optional here;
/// snapshot restore rejects records without one.
pub fn parse_record(value: &Value) -> Option<ItemRecord> {
    let obj = value.as_object()?;

    let name = obj.get("name")?.as_str()?.trim();
    if name.is_empty() {
        return None;
    }
    let buying_price = number(obj.get("buyingPrice")?)?;
    let market_price = number(obj.get("marketPrice")?)?;

    let category = obj
        .get("category")
        .and_then(Value::as_str)
        .map(normalize_category)
        .unwrap_or_else(|| normalize_category(""));

    Some(ItemRecord {
        id: obj.get("id").and_then(positive_integer),
        name: name.to_string(),
        category,
        buying_price,
        market_price,
        image_url: obj
            .get("imageUrl")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        created_at: obj.get("createdAt").and_then(number).map(|ms| ms as i64),
    })
}

fn number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Largest id accepted from a payload: the largest integer a JSON number
/// holds exactly. Keeps `id + 1` in range everywhere.
pub const MAX_ID: u64 = (1 << 53) - 1;

pub fn valid_id(id: u64) -> bool {
    (1..=MAX_ID).contains(&id)
}

fn positive_integer(value: &Value) -> Option<u64> {
    if let Some(n) = value.as_u64() {
        return valid_id(n).then_some(n);
    }
    let f = value.as_f64()?;
    (f >= 1.0 && f.fract() == 0.0 && f <= MAX_ID as f64).then_some(f as u64)
}

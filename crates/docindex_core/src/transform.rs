use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::record::{CandidateRecord, VersionSpec};

/// Raised when a candidate record cannot be normalized. A missing weight is a
/// contract violation on the extractor side, never recovered from.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MalformedRecordError {
    #[error("record for {url} is missing the required weight object")]
    MissingWeight { url: String },
    #[error("record for {url} is missing weight.{field}")]
    MissingWeightField { url: String, field: &'static str },
}

/// Flattened, priority-scored record ready for bulk import.
///
/// Serializes transparently as a flat JSON object; absent fields are never
/// present as nulls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedDocument(Map<String, Value>);

impl NormalizedDocument {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// The computed ranking priority. Present on every document produced by
    /// [`transform`].
    pub fn item_priority(&self) -> Option<i64> {
        self.0.get("item_priority").and_then(Value::as_i64)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Computes the ranking priority for a weight triple.
///
/// Higher ranks first: page rank dominates, then breadcrumb level, then
/// intra-page position. The factors keep the three components in disjoint
/// digit ranges of an i64.
pub fn item_priority(page_rank: i64, level: i64, position_descending: i64) -> i64 {
    page_rank * 1_000_000_000 + level * 1_000 + position_descending
}

/// Normalizes one candidate record into a flat document.
///
/// Pure and total for well-formed records: drops absent fields, flattens the
/// breadcrumbs into dotted top-level keys, coerces `version` to a list, and
/// attaches the computed `item_priority`.
pub fn transform(record: &CandidateRecord) -> Result<NormalizedDocument, MalformedRecordError> {
    let weight = record
        .weight
        .as_ref()
        .ok_or_else(|| MalformedRecordError::MissingWeight {
            url: record.url.clone(),
        })?;
    let missing = |field: &'static str| MalformedRecordError::MissingWeightField {
        url: record.url.clone(),
        field,
    };
    let page_rank = weight.page_rank.ok_or_else(|| missing("page_rank"))?;
    let level = weight.level.ok_or_else(|| missing("level"))?;
    let position = weight
        .position_descending
        .ok_or_else(|| missing("position_descending"))?;

    let mut doc = Map::new();
    insert_opt_str(&mut doc, "anchor", record.anchor.as_deref());
    insert_opt_str(&mut doc, "content", record.content.as_deref());
    doc.insert("url".into(), Value::String(record.url.clone()));
    insert_opt_str(
        &mut doc,
        "url_without_anchor",
        record.url_without_anchor.as_deref(),
    );

    // A single comma-separated string is split; a list passes through.
    match &record.version {
        Some(VersionSpec::One(joined)) => {
            let versions = joined
                .split(',')
                .map(|v| Value::String(v.to_string()))
                .collect();
            doc.insert("version".into(), Value::Array(versions));
        }
        Some(VersionSpec::Many(versions)) => {
            let versions = versions
                .iter()
                .map(|v| Value::String(v.clone()))
                .collect();
            doc.insert("version".into(), Value::Array(versions));
        }
        None => {}
    }

    for (n, value) in record.hierarchy.present_levels() {
        doc.insert(format!("hierarchy.lvl{n}"), Value::String(value.to_string()));
    }
    for (n, value) in record.hierarchy_radio.present_levels() {
        doc.insert(
            format!("hierarchy_radio.lvl{n}"),
            Value::String(value.to_string()),
        );
    }

    insert_opt_str(&mut doc, "type", record.record_type.as_deref());
    if let Some(tags) = &record.tags {
        let tags = tags.iter().map(|t| Value::String(t.clone())).collect();
        doc.insert("tags".into(), Value::Array(tags));
    }
    insert_opt_str(&mut doc, "language", record.language.as_deref());

    // Facet passthrough; null-valued entries are dropped like any other
    // absent field.
    for (key, value) in &record.extra {
        if !value.is_null() {
            doc.insert(key.clone(), value.clone());
        }
    }

    doc.insert(
        "item_priority".into(),
        Value::from(item_priority(page_rank, level, position)),
    );

    Ok(NormalizedDocument(doc))
}

fn insert_opt_str(doc: &mut Map<String, Value>, key: &str, value: Option<&str>) {
    if let Some(value) = value {
        doc.insert(key.to_string(), Value::String(value.to_string()));
    }
}

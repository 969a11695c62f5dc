use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Number of breadcrumb levels carried by every record (`lvl0..lvl6`).
pub const HIERARCHY_LEVELS: usize = 7;

/// Fixed seven-level breadcrumb. Level 0 is the page title, level 6 the
/// deepest heading. Absent levels stay `None` and are never emitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hierarchy {
    #[serde(default)]
    pub lvl0: Option<String>,
    #[serde(default)]
    pub lvl1: Option<String>,
    #[serde(default)]
    pub lvl2: Option<String>,
    #[serde(default)]
    pub lvl3: Option<String>,
    #[serde(default)]
    pub lvl4: Option<String>,
    #[serde(default)]
    pub lvl5: Option<String>,
    #[serde(default)]
    pub lvl6: Option<String>,
}

impl Hierarchy {
    /// Returns the value at breadcrumb level `n`, if present.
    pub fn level(&self, n: usize) -> Option<&str> {
        match n {
            0 => self.lvl0.as_deref(),
            1 => self.lvl1.as_deref(),
            2 => self.lvl2.as_deref(),
            3 => self.lvl3.as_deref(),
            4 => self.lvl4.as_deref(),
            5 => self.lvl5.as_deref(),
            6 => self.lvl6.as_deref(),
            _ => None,
        }
    }

    /// Iterates over the present levels as `(index, value)` pairs.
    pub fn present_levels(&self) -> impl Iterator<Item = (usize, &str)> {
        (0..HIERARCHY_LEVELS).filter_map(|n| self.level(n).map(|value| (n, value)))
    }
}

/// Ranking inputs attached to every candidate record.
///
/// The fields are optional on the wire; the transformer rejects records where
/// any of them is missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weight {
    #[serde(default)]
    pub page_rank: Option<i64>,
    #[serde(default)]
    pub level: Option<i64>,
    #[serde(default)]
    pub position_descending: Option<i64>,
}

impl Weight {
    pub fn new(page_rank: i64, level: i64, position_descending: i64) -> Self {
        Self {
            page_rank: Some(page_rank),
            level: Some(level),
            position_descending: Some(position_descending),
        }
    }
}

/// Version marker on a record: either a comma-separated string or an
/// already-split list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VersionSpec {
    One(String),
    Many(Vec<String>),
}

/// Raw extracted unit as produced by a content extractor, before
/// normalization. Unknown facet-style fields (`*_tag`) are captured in
/// `extra` and passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_without_anchor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<VersionSpec>,
    #[serde(default)]
    pub hierarchy: Hierarchy,
    #[serde(default)]
    pub hierarchy_radio: Hierarchy,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub record_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<Weight>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

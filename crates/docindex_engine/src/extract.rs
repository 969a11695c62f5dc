use docindex_core::{CandidateRecord, Hierarchy, Weight};
use scraper::{ElementRef, Html, Selector};

/// Turns one rendered content blob into candidate records.
///
/// Extraction heuristics are an external capability behind this seam; the
/// orchestrator only depends on the contract. `wiki` distinguishes wiki-style
/// sources (synthetic page shell) from generic web pages.
pub trait RecordExtractor: Send + Sync {
    fn extract(&self, body: &str, url: &str, wiki: bool) -> Vec<CandidateRecord>;
}

/// Minimal heading-based extractor:
/// - the page `<title>` (or first `<h1>`) becomes `lvl0`
/// - `<h2>`/`<h3>` headings open `lvl1`/`lvl2` sections
/// - paragraph text becomes content records under the current section
///
/// For wiki pages only the main-content container is scanned.
#[derive(Debug, Clone)]
pub struct HeadingExtractor {
    page_rank: i64,
}

impl HeadingExtractor {
    pub fn new(page_rank: i64) -> Self {
        Self { page_rank }
    }
}

impl Default for HeadingExtractor {
    fn default() -> Self {
        Self::new(0)
    }
}

impl RecordExtractor for HeadingExtractor {
    fn extract(&self, body: &str, url: &str, wiki: bool) -> Vec<CandidateRecord> {
        let doc = Html::parse_document(body);
        let title = page_title(&doc);

        let selector = if wiki {
            Selector::parse("#main-content h2, #main-content h3, #main-content p")
        } else {
            Selector::parse("h2, h3, p")
        };
        let Ok(selector) = selector else {
            return Vec::new();
        };

        let mut records = Vec::new();
        let mut hierarchy = Hierarchy {
            lvl0: title.clone(),
            ..Hierarchy::default()
        };

        if title.is_some() {
            records.push(section_record(url, &hierarchy, None, "lvl0", 0));
        }

        for element in doc.select(&selector) {
            let text = element_text(&element);
            if text.is_empty() {
                continue;
            }
            let anchor = element.value().attr("id").map(str::to_string);
            match element.value().name() {
                "h2" => {
                    hierarchy.lvl1 = Some(text);
                    hierarchy.lvl2 = None;
                    records.push(section_record(url, &hierarchy, anchor, "lvl1", 1));
                }
                "h3" => {
                    hierarchy.lvl2 = Some(text);
                    records.push(section_record(url, &hierarchy, anchor, "lvl2", 2));
                }
                _ => {
                    let level = deepest_level(&hierarchy);
                    let mut record = section_record(url, &hierarchy, anchor, "content", level);
                    record.content = Some(text);
                    records.push(record);
                }
            }
        }

        // Intra-page rank decreases top to bottom.
        let count = records.len() as i64;
        for (position, record) in records.iter_mut().enumerate() {
            if let Some(weight) = record.weight.as_mut() {
                weight.page_rank = Some(self.page_rank);
                weight.position_descending = Some(count - position as i64);
            }
        }

        records
    }
}

fn section_record(
    url: &str,
    hierarchy: &Hierarchy,
    anchor: Option<String>,
    record_type: &str,
    level: i64,
) -> CandidateRecord {
    let full_url = match &anchor {
        Some(anchor) => format!("{url}#{anchor}"),
        None => url.to_string(),
    };
    CandidateRecord {
        anchor,
        url: full_url,
        url_without_anchor: Some(url.to_string()),
        hierarchy: hierarchy.clone(),
        hierarchy_radio: Hierarchy::default(),
        record_type: Some(record_type.to_string()),
        weight: Some(Weight::new(0, level, 0)),
        ..CandidateRecord::default()
    }
}

fn page_title(doc: &Html) -> Option<String> {
    for selector in ["title", "h1"] {
        let Ok(selector) = Selector::parse(selector) else {
            continue;
        };
        if let Some(element) = doc.select(&selector).next() {
            let text = element.text().collect::<String>().trim().to_string();
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

fn element_text(element: &ElementRef) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn deepest_level(hierarchy: &Hierarchy) -> i64 {
    if hierarchy.lvl2.is_some() {
        2
    } else if hierarchy.lvl1.is_some() {
        1
    } else {
        0
    }
}

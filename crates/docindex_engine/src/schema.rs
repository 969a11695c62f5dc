use serde::{Deserialize, Serialize};

use docindex_core::HIERARCHY_LEVELS;

/// Field used as the store's default ordering when no explicit sort is
/// requested. Custom settings may replace the field list, never this.
pub const PRIORITY_FIELD: &str = "item_priority";

/// One field declaration in a collection schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub facet: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
}

impl FieldSchema {
    fn plain(name: &str, field_type: &str) -> Self {
        Self {
            name: name.to_string(),
            field_type: field_type.to_string(),
            facet: false,
            optional: false,
            locale: None,
        }
    }

    fn facet(mut self) -> Self {
        self.facet = true;
        self
    }

    fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    fn locale(mut self, locale: &str) -> Self {
        self.locale = Some(locale.to_string());
        self
    }
}

/// Persisted layout of an index collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSchema {
    pub name: String,
    pub fields: Vec<FieldSchema>,
    pub default_sorting_field: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub token_separators: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub symbols_to_index: Vec<String>,
}

/// Operator-provided schema tweaks loaded from configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_separators: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbols_to_index: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_definitions: Option<Vec<FieldSchema>>,
}

/// The default searchable-document layout: flat record fields, flattened
/// breadcrumbs, a wildcard facet for `*_tag` passthrough fields, and the
/// required numeric priority used as the default sort.
pub fn default_schema(name: &str, locale: &str) -> CollectionSchema {
    let mut fields = vec![
        FieldSchema::plain("anchor", "string").optional(),
        FieldSchema::plain("content", "string").optional().locale(locale),
        FieldSchema::plain("url", "string").facet(),
        FieldSchema::plain("url_without_anchor", "string").facet().optional(),
        FieldSchema::plain("version", "string[]").facet().optional(),
    ];
    for n in 0..HIERARCHY_LEVELS {
        fields.push(
            FieldSchema::plain(&format!("hierarchy.lvl{n}"), "string")
                .facet()
                .optional()
                .locale(locale),
        );
    }
    for n in 0..HIERARCHY_LEVELS {
        fields.push(
            FieldSchema::plain(&format!("hierarchy_radio.lvl{n}"), "string")
                .facet()
                .optional()
                .locale(locale),
        );
    }
    fields.extend([
        FieldSchema::plain("type", "string").facet().optional().locale(locale),
        FieldSchema::plain(".*_tag", "string").facet().optional().locale(locale),
        FieldSchema::plain("language", "string").facet().optional(),
        FieldSchema::plain("tags", "string[]").facet().optional().locale(locale),
        FieldSchema::plain(PRIORITY_FIELD, "int64"),
    ]);

    CollectionSchema {
        name: name.to_string(),
        fields,
        default_sorting_field: PRIORITY_FIELD.to_string(),
        token_separators: vec!["_".to_string(), "-".to_string()],
        symbols_to_index: Vec::new(),
    }
}

impl CollectionSchema {
    /// Applies operator overrides. The priority field stays the default sort
    /// even when the field list is replaced wholesale.
    pub fn with_custom_settings(mut self, custom: &CustomSettings) -> Self {
        if let Some(separators) = &custom.token_separators {
            self.token_separators = separators.clone();
        }
        if let Some(symbols) = &custom.symbols_to_index {
            self.symbols_to_index = symbols.clone();
        }
        if let Some(fields) = &custom.field_definitions {
            self.fields = fields.clone();
        }
        self.default_sorting_field = PRIORITY_FIELD.to_string();
        self
    }
}

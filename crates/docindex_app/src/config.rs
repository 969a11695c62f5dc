use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use docindex_engine::CustomSettings;

fn default_locale() -> String {
    "en".to_string()
}

fn default_page_limit() -> u64 {
    100
}

/// One pipeline run, loaded from a JSON config file.
#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    /// Alias readers query.
    pub index_name: String,
    /// Staging collection name; defaults to `<index_name>_tmp`.
    #[serde(default)]
    pub staging_name: Option<String>,
    #[serde(default = "default_locale")]
    pub locale: String,
    pub sources: Vec<SourceConfig>,
    /// Optional schema overrides (token separators, symbols, field list).
    #[serde(default)]
    pub custom_settings: Option<CustomSettings>,
    /// Page rank applied to every record of this site.
    #[serde(default)]
    pub page_rank: i64,
    /// Milliseconds to pause after each page import; defaults to the
    /// engine's throttle.
    #[serde(default)]
    pub import_throttle_ms: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    Confluence {
        base_url: String,
        space_key: String,
        #[serde(default = "default_page_limit")]
        page_limit: u64,
        /// Name of the environment variable holding the bearer token.
        #[serde(default)]
        token_env: Option<String>,
    },
}

impl RunConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("parsing config {}", path.display()))?;
        anyhow::ensure!(
            !config.sources.is_empty(),
            "config {} declares no sources",
            path.display()
        );
        Ok(config)
    }

    pub fn staging_collection(&self) -> String {
        self.staging_name
            .clone()
            .unwrap_or_else(|| format!("{}_tmp", self.index_name))
    }
}

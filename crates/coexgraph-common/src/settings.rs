//! Settings for the coexpression graph client.
//!
//! Read from `coexgraph.toml` (or the path in `COEXGRAPH_CONFIG`); YAML and
//! JSON files are accepted as well. Every field has a default so a partial
//! file is enough.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::error::{CoexError, Result};

pub const CONFIG_ENV_VAR: &str = "COEXGRAPH_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "coexgraph.toml";

/// Complete client configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoexSettings {
    #[serde(default)]
    pub graph: GraphLimits,

    #[serde(default)]
    pub style: StyleConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub store: StoreConfig,
}

// ── Graph limits ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphLimits {
    /// Cap on query genes sent in one visualization search
    #[serde(default = "default_max_gene_ids")]
    pub max_gene_ids_per_query: usize,

    /// Lowest stringency the server will search at
    #[serde(default = "default_min_stringency")]
    pub min_stringency: u32,

    /// Official names longer than this are cut for tooltips
    #[serde(default = "default_tooltip_max_len")]
    pub tooltip_max_len: usize,

    /// Minimum characters before a symbol search matches anything
    #[serde(default = "default_min_match_len")]
    pub min_text_match_len: usize,
}

fn default_max_gene_ids() -> usize { 200 }
fn default_min_stringency() -> u32 { 2 }
fn default_tooltip_max_len() -> usize { 60 }
fn default_min_match_len() -> usize { 2 }

impl Default for GraphLimits {
    fn default() -> Self {
        Self {
            max_gene_ids_per_query: default_max_gene_ids(),
            min_stringency: default_min_stringency(),
            tooltip_max_len: default_tooltip_max_len(),
            min_text_match_len: default_min_match_len(),
        }
    }
}

// ── Style ─────────────────────────────────────────────────────────────────────

/// Node-degree thresholds. A degree at or below `dark` is the most specific.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DegreeThresholds {
    pub lightest: f64,
    pub light: f64,
    pub moderate: f64,
    pub dark: f64,
}

impl Default for DegreeThresholds {
    fn default() -> Self {
        Self { lightest: 0.7, light: 0.6, moderate: 0.35, dark: 0.2 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DegreeColors {
    pub lowest: String,
    pub low: String,
    pub moderate: String,
    pub high: String,
    pub highest: String,
}

impl Default for DegreeColors {
    fn default() -> Self {
        Self {
            lowest: "#DEDEDE".to_string(),
            low: "#C9C9C9".to_string(),
            moderate: "#737373".to_string(),
            high: "#404040".to_string(),
            highest: "#000000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleConfig {
    #[serde(default)]
    pub degree_thresholds: DegreeThresholds,

    #[serde(default)]
    pub degree_colors: DegreeColors,

    /// Fill used when node-degree emphasis is off
    #[serde(default = "default_node_color")]
    pub node_color: String,

    #[serde(default = "default_support_both")]
    pub support_color_both: String,

    #[serde(default = "default_support_positive")]
    pub support_color_positive: String,

    #[serde(default = "default_support_negative")]
    pub support_color_negative: String,

    #[serde(default = "default_query_border")]
    pub query_border_color: String,

    #[serde(default = "default_other_border")]
    pub other_border_color: String,

    #[serde(default = "default_overlay_color")]
    pub overlay_color: String,
}

fn default_node_color() -> String { "#969696".to_string() }
fn default_support_both() -> String { "#CCCCCC".to_string() }
fn default_support_positive() -> String { "#E66101".to_string() }
fn default_support_negative() -> String { "#5E3C99".to_string() }
fn default_query_border() -> String { "#E41A1C".to_string() }
fn default_other_border() -> String { "#6BAED6".to_string() }
fn default_overlay_color() -> String { "#FFFF00".to_string() }

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            degree_thresholds: DegreeThresholds::default(),
            degree_colors: DegreeColors::default(),
            node_color: default_node_color(),
            support_color_both: default_support_both(),
            support_color_positive: default_support_positive(),
            support_color_negative: default_support_negative(),
            query_border_color: default_query_border(),
            other_border_color: default_other_border(),
            overlay_color: default_overlay_color(),
        }
    }
}

// ── Search client ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String { "http://localhost:8080".to_string() }
fn default_timeout_secs() -> u64 { 30 }

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

// ── Saved gene sets ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_path")]
    pub path: String,
}

fn default_store_path() -> String { "./coexgraph-sets.json".to_string() }

impl Default for StoreConfig {
    fn default() -> Self {
        Self { path: default_store_path() }
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

impl CoexSettings {
    /// Load from the path in `COEXGRAPH_CONFIG`, falling back to
    /// `coexgraph.toml` in the current directory.
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_ENV_VAR)
            .unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::from_path(&path)
    }

    /// Load from a file, picking the format by extension.
    pub fn from_path(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            return Err(CoexError::Config(format!("Config file not found: {path}")));
        }
        debug!(path, "Loading settings");
        let content = std::fs::read_to_string(path)?;
        let settings: Self = match Path::new(path).extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)
                .map_err(|e| CoexError::Config(e.to_string()))?,
            Some("json") => serde_json::from_str(&content)?,
            _ => toml::from_str(&content).map_err(|e| CoexError::Config(e.to_string()))?,
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.graph.min_stringency < 2 {
            return Err(CoexError::Config(format!(
                "graph.min_stringency must be at least 2, got {}",
                self.graph.min_stringency
            )));
        }
        if self.graph.max_gene_ids_per_query == 0 {
            return Err(CoexError::Config("graph.max_gene_ids_per_query must be positive".into()));
        }
        let t = &self.style.degree_thresholds;
        if !(t.dark <= t.moderate && t.moderate <= t.light && t.light <= t.lightest) {
            return Err(CoexError::Config("style.degree_thresholds must be ascending from dark to lightest".into()));
        }
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| CoexError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let s = CoexSettings::default();
        assert_eq!(s.graph.max_gene_ids_per_query, 200);
        assert_eq!(s.graph.min_stringency, 2);
        assert_eq!(s.graph.tooltip_max_len, 60);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let s: CoexSettings = toml::from_str("[graph]\nmax_gene_ids_per_query = 50\n").unwrap();
        assert_eq!(s.graph.max_gene_ids_per_query, 50);
        assert_eq!(s.graph.min_stringency, 2);
        assert_eq!(s.search.timeout_secs, 30);
    }

    #[test]
    fn test_rejects_low_min_stringency() {
        let mut s = CoexSettings::default();
        s.graph.min_stringency = 1;
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_load_yaml_file() {
        let mut f = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(f, "search:\n  base_url: http://example.org\n").unwrap();
        let s = CoexSettings::from_path(f.path().to_str().unwrap()).unwrap();
        assert_eq!(s.search.base_url, "http://example.org");
    }

    #[test]
    fn test_toml_roundtrip() {
        let s = CoexSettings::default();
        let text = s.to_toml().unwrap();
        let parsed: CoexSettings = toml::from_str(&text).unwrap();
        assert_eq!(parsed.style.support_color_both, s.style.support_color_both);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = CoexSettings::from_path("/nonexistent/coexgraph.toml").unwrap_err();
        assert!(matches!(err, CoexError::Config(_)));
    }
}

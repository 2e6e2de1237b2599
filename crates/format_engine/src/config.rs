//! Formatting configuration
//!
//! Tag vocabulary the formatting core needs to know about the host document:
//! which element is the caret marker, what counts as a line break, which
//! elements are table cells or structural containers, and which elements
//! must survive empty-node pruning.

use crate::Result;
use doc_model::ZERO_WIDTH_SPACE;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FormatConfig {
    /// Tag of the transient element inserted at a collapsed caret
    pub marker_tag: String,
    /// Filler text kept inside a marker so it has somewhere to put the caret
    pub marker_filler: char,
    /// Forced line break element
    pub line_break_tag: String,
    /// Table cell elements; each is an independent formatting root
    pub cell_tags: Vec<String>,
    /// Line roots that hold other blocks rather than text
    /// (tables, lists); block and style formats descend into them
    pub container_tags: Vec<String>,
    /// Elements that are never removed for being empty
    pub preserved_tags: Vec<String>,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            marker_tag: "caret-marker".to_string(),
            marker_filler: ZERO_WIDTH_SPACE,
            line_break_tag: "br".to_string(),
            cell_tags: vec!["td".to_string(), "th".to_string()],
            container_tags: ["table", "thead", "tbody", "tfoot", "tr", "ul", "ol"]
                .iter()
                .map(|t| t.to_string())
                .collect(),
            preserved_tags: ["td", "th", "tr", "br", "hr", "img"]
                .iter()
                .map(|t| t.to_string())
                .collect(),
        }
    }
}

impl FormatConfig {
    /// Parse a configuration from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a configuration file, falling back to defaults when the file is
    /// missing or cannot be parsed
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "format config not found, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        match Self::from_json(&content) {
            Ok(config) => Ok(config),
            Err(e) => {
                tracing::warn!("Failed to parse format config, using defaults: {}", e);
                Ok(Self::default())
            }
        }
    }

    pub fn is_cell_tag(&self, tag: &str) -> bool {
        self.cell_tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    pub fn is_container_tag(&self, tag: &str) -> bool {
        self.container_tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    pub fn is_preserved_tag(&self, tag: &str) -> bool {
        self.preserved_tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    pub fn is_line_break_tag(&self, tag: &str) -> bool {
        self.line_break_tag.eq_ignore_ascii_case(tag)
    }

    pub fn is_marker_tag(&self, tag: &str) -> bool {
        self.marker_tag.eq_ignore_ascii_case(tag)
    }
}

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Tunables for statement preparation and re-sequencing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Statements at or under this many words may be classed procedural.
    pub procedural_word_limit: usize,
    pub attribution_max_chars: usize,
    pub slug_max_chars: usize,
    /// Added to the similarity of two statements with the same timestamp.
    pub timing_bonus: f64,
    /// Taken off a candidate that has already been matched once.
    pub reuse_penalty: f64,
    pub easy_match_warning: f64,
    pub best_match_warning: f64,
    /// French is dropped when missing paragraph ids exceed this share of the
    /// identified ones.
    pub missing_paragraph_ratio: f64,
    /// Share of `ParaText` elements that must carry ids for a sitting to count
    /// as having paragraph ids.
    pub paragraph_id_coverage: f64,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            procedural_word_limit: 300,
            attribution_max_chars: 300,
            slug_max_chars: 50,
            timing_bonus: 0.8,
            reuse_penalty: 0.01,
            easy_match_warning: 0.9,
            best_match_warning: 0.75,
            missing_paragraph_ratio: 1.0,
            paragraph_id_coverage: 0.95,
        }
    }
}

impl ImportConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let content =
            fs::read_to_string(path).map_err(|e| format!("Failed to read import.json: {e}"))?;
        let config: ImportConfig = serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse import.json: {e}"))?;
        Ok(config)
    }

    /// Reads `$CONFIGS_PATH/import.json` when the variable is set.
    pub fn load_default() -> Result<Self, String> {
        match std::env::var("CONFIGS_PATH") {
            Ok(dir) => Self::load_from_file(Path::new(&dir).join("import.json")),
            Err(_) => Ok(Self::default()),
        }
    }
}

//! Canonical job-title resolution.
//!
//! The synonym map file (canonical title -> list of raw variants) is built
//! offline by the title-map builder and inverted here into a read-only
//! synonym -> canonical lookup at process start. Ingestion never mutates
//! the map; rebuilding produces a new file, never an in-place edit.

pub mod builder;
pub mod prompts;

use std::collections::HashMap;
use std::path::Path;

use tracing::{info, warn};

/// Inverted synonym lookup: raw title -> canonical title.
#[derive(Debug, Default, Clone)]
pub struct SynonymMap {
    by_synonym: HashMap<String, String>,
}

impl SynonymMap {
    /// Builds the inverted lookup from the canonical-to-synonyms mapping.
    /// Synonym keys are trimmed; later duplicates of the same synonym win,
    /// keeping the invariant of at most one canonical per raw title.
    pub fn from_mappings(mappings: &HashMap<String, Vec<String>>) -> Self {
        let mut by_synonym = HashMap::new();
        for (canonical, synonyms) in mappings {
            for synonym in synonyms {
                by_synonym.insert(synonym.trim().to_string(), canonical.clone());
            }
        }
        Self { by_synonym }
    }

    /// Loads the mapping file, degrading to an empty map on any failure.
    /// A missing map means titles pass through unchanged — never a startup
    /// error.
    pub fn load(path: &Path) -> Self {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Title mapping file {} not readable: {e}", path.display());
                return Self::default();
            }
        };
        match serde_json::from_str::<HashMap<String, Vec<String>>>(&raw) {
            Ok(mappings) => {
                let map = Self::from_mappings(&mappings);
                info!(
                    "Loaded {} title synonyms from {}",
                    map.len(),
                    path.display()
                );
                map
            }
            Err(e) => {
                warn!("Title mapping file {} is malformed: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Maps a raw title to its canonical form. Unknown titles pass through
    /// unchanged — resolution never fails and never blocks ingestion.
    pub fn resolve<'a>(&'a self, raw: &'a str) -> &'a str {
        self.by_synonym
            .get(raw.trim())
            .map(String::as_str)
            .unwrap_or(raw)
    }

    pub fn len(&self) -> usize {
        self.by_synonym.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_synonym.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample_map() -> SynonymMap {
        let mut mappings = HashMap::new();
        mappings.insert(
            "Frontend Developer".to_string(),
            vec![
                "Frontend Developer".to_string(),
                "Frontend-разработчик".to_string(),
                " Front-end Developer ".to_string(),
            ],
        );
        SynonymMap::from_mappings(&mappings)
    }

    #[test]
    fn test_resolve_known_synonym() {
        let map = sample_map();
        assert_eq!(map.resolve("Frontend-разработчик"), "Frontend Developer");
    }

    #[test]
    fn test_resolve_trims_lookup_key() {
        let map = sample_map();
        assert_eq!(map.resolve("  Frontend-разработчик  "), "Frontend Developer");
        // Synonyms are trimmed at build time too.
        assert_eq!(map.resolve("Front-end Developer"), "Frontend Developer");
    }

    #[test]
    fn test_unknown_title_passes_through_unchanged() {
        let map = sample_map();
        assert_eq!(map.resolve("Экскаваторщик"), "Экскаваторщик");
        // Passthrough returns the input exactly, untrimmed.
        assert_eq!(map.resolve(" Экскаваторщик "), " Экскаваторщик ");
    }

    #[test]
    fn test_load_missing_file_degrades_to_empty() {
        let map = SynonymMap::load(Path::new("/nonexistent/mappings.json"));
        assert!(map.is_empty());
        assert_eq!(map.resolve("Водитель"), "Водитель");
    }

    #[test]
    fn test_load_malformed_file_degrades_to_empty() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{not json").unwrap();
        let map = SynonymMap::load(file.path());
        assert!(map.is_empty());
    }

    #[test]
    fn test_load_round_trip() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            r#"{"Courier": ["Курьер", "Водитель-курьер"], "Cashier": ["Кассир"]}"#.as_bytes(),
        )
        .unwrap();
        let map = SynonymMap::load(file.path());
        assert_eq!(map.len(), 3);
        assert_eq!(map.resolve("Курьер"), "Courier");
        assert_eq!(map.resolve("Кассир"), "Cashier");
    }
}

use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;

use log::{info, warn};

use crate::services::catalog::{Catalog, CatalogError, KeywordSet};
use crate::utils::normalize_word;

/// Load a keyword catalog from a JSON file (an array of keyword sets).
pub fn load_catalog(file_path: &str) -> Result<Catalog, CatalogError> {
    let file = File::open(file_path)?;
    let reader = BufReader::new(file);

    let entries: Vec<KeywordSet> = serde_json::from_reader(reader)?;
    let entries = entries
        .into_iter()
        .map(|mut entry| {
            entry.target_word = entry.target_word.trim().to_string();
            let mut seen = HashSet::new();
            entry.keywords = entry
                .keywords
                .iter()
                .map(|k| normalize_word(k))
                .filter(|k| !k.is_empty() && seen.insert(k.clone()))
                .collect();
            entry
        })
        .collect();

    Catalog::from_entries(entries)
}

/// Load the catalog at `file_path` if given, falling back to the built-in set.
pub fn load_catalog_or_builtin(file_path: Option<&str>) -> Catalog {
    let catalog = match file_path {
        Some(path) => load_catalog(path).unwrap_or_else(|e| {
            warn!("Failed to load keyword catalog at {}: {}. Using built-in catalog.", path, e);
            Catalog::builtin()
        }),
        None => Catalog::builtin(),
    };

    info!("Keyword catalog ready with {} target words.", catalog.len());
    catalog
}

use std::collections::HashSet;

use log::info;

use crate::services::catalog::{Catalog, KeywordSet};
use crate::utils::RandomSource;

/// Entries whose target word the user has not seen yet.
pub fn available<'a>(catalog: &'a Catalog, used_words: &HashSet<String>) -> Vec<&'a KeywordSet> {
    catalog
        .all_entries()
        .iter()
        .filter(|set| !used_words.contains(&set.target_word.to_lowercase()))
        .collect()
}

/// Pick the next keyword set for a user.
///
/// `used_words` holds lowercase target words. When every entry has been used
/// the pick falls back to the whole catalog; clearing the user's registry is
/// left to the caller.
pub fn select_next<'a>(
    catalog: &'a Catalog,
    used_words: &HashSet<String>,
    rng: &mut dyn RandomSource,
) -> &'a KeywordSet {
    let candidates = available(catalog, used_words);

    if candidates.is_empty() {
        info!("All keyword sets have been used, picking from the full catalog.");
        let entries = catalog.all_entries();
        return &entries[rng.next_index(entries.len())];
    }

    candidates[rng.next_index(candidates.len())]
}

//! Query engine: whitespace-separated, case-insensitive substring tokens, ANDed, matched
//! against the entry name only.

use rayon::prelude::*;

use crate::EntryRecord;

/// Below this many entries a sequential filter beats rayon's fork/join overhead.
const PARALLEL_THRESHOLD: usize = 50_000;

/// Lowercased, non-empty tokens of `query`. Empty result means "no filter".
pub fn tokenize(query: &str) -> Vec<String> {
    query
        .split_whitespace()
        .map(|t| t.to_lowercase())
        .collect()
}

/// True when every token is a substring of the entry's name, ignoring case.
pub fn matches_all(entry: &EntryRecord, tokens: &[String]) -> bool {
    let name = entry.name().to_lowercase();
    tokens.iter().all(|t| name.contains(t.as_str()))
}

/// Filter `entries` by `query`, preserving order. An empty or whitespace-only query returns
/// every entry. There is no result cap.
pub fn search_entries(entries: &[EntryRecord], query: &str) -> Vec<EntryRecord> {
    let tokens = tokenize(query);
    if tokens.is_empty() {
        return entries.to_vec();
    }
    if entries.len() >= PARALLEL_THRESHOLD {
        entries
            .par_iter()
            .filter(|e| matches_all(e, &tokens))
            .cloned()
            .collect()
    } else {
        entries
            .iter()
            .filter(|e| matches_all(e, &tokens))
            .cloned()
            .collect()
    }
}

//! Normalization of the persisted criteria shape
//!
//! A blank value means "do not constrain on this field", so blank fields are
//! dropped instead of being matched against the empty string. Every side map
//! is restricted to the currently selected fields.

use std::collections::{BTreeMap, HashSet};

/// Fields (deduplicated, order kept) that carry a non-blank value, and their values.
pub fn normalize_fields_and_values<S: AsRef<str>>(
    fields: &[S],
    values: &BTreeMap<String, String>,
) -> (Vec<String>, BTreeMap<String, String>) {
    let mut seen = HashSet::new();
    let mut kept_fields = Vec::new();
    let mut kept_values = BTreeMap::new();

    for field in fields.iter().map(AsRef::as_ref) {
        if !seen.insert(field) {
            continue;
        }
        match values.get(field) {
            Some(value) if !value.trim().is_empty() => {
                kept_fields.push(field.to_string());
                kept_values.insert(field.to_string(), value.clone());
            }
            _ => {}
        }
    }
    (kept_fields, kept_values)
}

/// Word lists restricted to selected fields; entries trimmed and deduplicated.
pub fn normalize_includes<S: AsRef<str>>(
    includes: &BTreeMap<String, Vec<String>>,
    selected: &[S],
) -> BTreeMap<String, Vec<String>> {
    normalize_word_map(includes, selected)
}

/// Same rules as [`normalize_includes`].
pub fn normalize_excludes<S: AsRef<str>>(
    excludes: &BTreeMap<String, Vec<String>>,
    selected: &[S],
) -> BTreeMap<String, Vec<String>> {
    normalize_word_map(excludes, selected)
}

/// Regex lists follow the word-list rules.
pub fn normalize_regex_map<S: AsRef<str>>(
    patterns: &BTreeMap<String, Vec<String>>,
    selected: &[S],
) -> BTreeMap<String, Vec<String>> {
    normalize_word_map(patterns, selected)
}

/// Any per-field map restricted to selected fields.
pub fn normalize_match_modes<V: Clone, S: AsRef<str>>(
    modes: &BTreeMap<String, V>,
    selected: &[S],
) -> BTreeMap<String, V> {
    let selected: HashSet<&str> = selected.iter().map(AsRef::as_ref).collect();
    modes
        .iter()
        .filter(|(field, _)| selected.contains(field.as_str()))
        .map(|(field, mode)| (field.clone(), mode.clone()))
        .collect()
}

fn normalize_word_map<S: AsRef<str>>(
    map: &BTreeMap<String, Vec<String>>,
    selected: &[S],
) -> BTreeMap<String, Vec<String>> {
    let selected: HashSet<&str> = selected.iter().map(AsRef::as_ref).collect();
    let mut out = BTreeMap::new();
    for (field, words) in map {
        if !selected.contains(field.as_str()) {
            continue;
        }
        let mut seen = HashSet::new();
        let cleaned: Vec<String> = words
            .iter()
            .map(|word| word.trim())
            .filter(|word| !word.is_empty() && seen.insert(*word))
            .map(str::to_string)
            .collect();
        if !cleaned.is_empty() {
            out.insert(field.clone(), cleaned);
        }
    }
    out
}

//! Participant name normalization and alias substitution.
//!
//! People appear in three places (expense payer, split list, payment
//! contributor) with whatever spelling was typed at the time. Aggregation
//! joins them by **canonical name**: whitespace collapsed, title-cased, and
//! optionally rewritten through a configured alias map ("Fra" → "Francesca").

use std::collections::HashMap;

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

/// Normalizes a raw participant name: trim, collapse internal whitespace,
/// title-case each word.
///
/// ```rust
/// use engine::names::normalize_name;
///
/// assert_eq!(normalize_name("  anna   maria "), "Anna Maria");
/// assert_eq!(normalize_name("BOB"), "Bob");
/// ```
#[must_use]
pub fn normalize_name(raw: &str) -> String {
    let mut out = String::new();
    for word in raw.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            for ch in chars.flat_map(char::to_lowercase) {
                out.push(ch);
            }
        }
    }
    out
}

/// Splits a comma-separated participant list into normalized names,
/// de-duplicated preserving first-seen order.
#[must_use]
pub fn split_participants(csv: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for part in csv.split(',') {
        let name = normalize_name(part);
        if name.is_empty() || seen.contains(&name) {
            continue;
        }
        seen.push(name);
    }
    seen
}

/// Alias map from spelling variants to canonical display names.
///
/// Keys are matched on a folded form (lowercase, diacritics dropped), so
/// `franzi`, `Franzi` and `Fránzi` all hit the same alias.
#[derive(Clone, Debug, Default)]
pub struct NameAliases {
    by_key: HashMap<String, String>,
}

impl NameAliases {
    /// Builds the map from `(variant, canonical)` pairs. Canonical names are
    /// normalized; empty variants are ignored.
    #[must_use]
    pub fn new(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut by_key = HashMap::new();
        for (variant, canonical) in pairs {
            let key = fold_key(&variant);
            let canonical = normalize_name(&canonical);
            if key.is_empty() || canonical.is_empty() {
                continue;
            }
            by_key.insert(key, canonical);
        }
        Self { by_key }
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    /// Normalizes a raw name and applies the alias map.
    #[must_use]
    pub fn canonicalize(&self, raw: &str) -> String {
        let name = normalize_name(raw);
        match self.by_key.get(&fold_key(&name)) {
            Some(canonical) => canonical.clone(),
            None => name,
        }
    }
}

/// Folded lookup key: NFKD, combining marks dropped, lowercase alphanumeric
/// words joined by single spaces.
fn fold_key(input: &str) -> String {
    let mut out = String::new();
    let mut prev_space = false;
    for ch in input.trim().nfkd() {
        if is_combining_mark(ch) {
            continue;
        }
        if ch.is_alphanumeric() {
            out.extend(ch.to_lowercase());
            prev_space = false;
        } else if !out.is_empty() && !prev_space {
            out.push(' ');
            prev_space = true;
        }
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_and_title_cases() {
        assert_eq!(normalize_name(" alice "), "Alice");
        assert_eq!(normalize_name("anna   maria"), "Anna Maria");
        assert_eq!(normalize_name("BOB rossi"), "Bob Rossi");
        assert_eq!(normalize_name(""), "");
    }

    #[test]
    fn split_drops_empties_and_duplicates() {
        assert_eq!(
            split_participants("alice, Bob , ,alice,"),
            vec!["Alice".to_string(), "Bob".to_string()]
        );
        assert!(split_participants("").is_empty());
        assert!(split_participants(" , ,").is_empty());
    }

    #[test]
    fn aliases_match_case_and_diacritic_insensitively() {
        let aliases = NameAliases::new([
            ("fra".to_string(), "Francesca".to_string()),
            ("franzi".to_string(), "francesca".to_string()),
        ]);
        assert_eq!(aliases.canonicalize("FRA"), "Francesca");
        assert_eq!(aliases.canonicalize("Fránzi"), "Francesca");
        assert_eq!(aliases.canonicalize("bob"), "Bob");
    }

    #[test]
    fn empty_alias_map_only_normalizes() {
        let aliases = NameAliases::default();
        assert_eq!(aliases.canonicalize("  anna  maria"), "Anna Maria");
    }
}

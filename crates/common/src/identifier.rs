//! Case-insensitive account identifier sets
//!
//! Account logins compare case-insensitively everywhere (creation, diffing,
//! removal exclusion). `IdentifierSet` keeps the normalized key explicit:
//! membership is decided on `normalize_identifier`, while the given
//! spelling and first-seen order are preserved for requests and reports.

use std::collections::HashSet;

/// Normalized comparison key for an account identifier
pub fn normalize_identifier(id: &str) -> String {
    id.trim().to_lowercase()
}

/// Insertion-ordered set of identifiers with case-insensitive membership
#[derive(Debug, Clone, Default)]
pub struct IdentifierSet {
    entries: Vec<String>,
    keys: HashSet<String>,
}

impl IdentifierSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an identifier, returning false when it (or a case variant) is
    /// already present or the identifier is blank.
    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        let id = id.trim();
        if id.is_empty() {
            return false;
        }
        if !self.keys.insert(normalize_identifier(id)) {
            return false;
        }
        self.entries.push(id.to_string());
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.keys.contains(&normalize_identifier(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Identifiers of `self` absent from every set in `excluded`, in order
    pub fn missing_from(&self, excluded: &[&IdentifierSet]) -> Vec<String> {
        self.entries
            .iter()
            .filter(|id| !excluded.iter().any(|set| set.contains(id)))
            .cloned()
            .collect()
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.entries.clone()
    }
}

impl PartialEq for IdentifierSet {
    fn eq(&self, other: &Self) -> bool {
        self.keys == other.keys
    }
}

impl Eq for IdentifierSet {}

impl<S: Into<String>> FromIterator<S> for IdentifierSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<S: Into<String>> Extend<S> for IdentifierSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for id in iter {
            self.insert(id);
        }
    }
}

impl<'a> IntoIterator for &'a IdentifierSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

//! Area selection for a run

use areapod_common::normalize_identifier;

use crate::AreaEntry;

/// Which roster entries a run applies to.
///
/// `lead` compares case-insensitively with the entry lead. `include` and
/// `exclude` are case-insensitive substring matches against the area label;
/// an empty `include` selects every area and exclusion always wins.
#[derive(Debug, Clone, Default)]
pub struct AreaFilter {
    pub lead: Option<String>,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl AreaFilter {
    pub fn matches(&self, entry: &AreaEntry) -> bool {
        if let Some(lead) = &self.lead {
            if normalize_identifier(lead) != normalize_identifier(&entry.lead) {
                return false;
            }
        }

        let label = entry.area_label.to_lowercase();
        let contains = |pattern: &String| label.contains(&pattern.to_lowercase());

        if !self.include.is_empty() && !self.include.iter().any(contains) {
            return false;
        }

        !self.exclude.iter().any(contains)
    }

    /// Keep matching entries in roster order
    pub fn apply(&self, entries: Vec<AreaEntry>) -> Vec<AreaEntry> {
        entries.into_iter().filter(|e| self.matches(e)).collect()
    }
}

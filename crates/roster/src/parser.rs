//! Area-owners table parsing
//!
//! The roster is a markdown table. Each data row splits on `|` into exactly
//! six parts (leading and trailing pipes produce the empty first and last
//! parts): area label, lead, whitespace-separated owners, notes.

use serde::{Deserialize, Serialize};

/// Label prefix that marks an area row
pub const AREA_PREFIX: &str = "area-";

const COLUMN_COUNT: usize = 6;

/// One roster row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaEntry {
    pub area_label: String,
    pub lead: String,
    pub owners: Vec<String>,
}

/// Accept `label` when it starts with the area prefix (case-insensitive)
pub fn try_parse_area_label(label: &str) -> Option<&str> {
    let prefix_len = AREA_PREFIX.len();
    match label.get(..prefix_len) {
        Some(head) if head.eq_ignore_ascii_case(AREA_PREFIX) => Some(label),
        _ => None,
    }
}

fn untagged_user_name(user_name: &str) -> &str {
    user_name.strip_prefix('@').unwrap_or(user_name)
}

/// Parse every recognizable area row; malformed rows are skipped
pub fn parse_area_owners(contents: &str) -> Vec<AreaEntry> {
    contents
        .lines()
        .filter_map(|line| {
            let parts: Vec<&str> = line.split('|').collect();
            if parts.len() != COLUMN_COUNT {
                return None;
            }

            let area_label = try_parse_area_label(parts[1].trim())?;
            let lead = untagged_user_name(parts[2].trim());
            let owners = parts[3]
                .split_whitespace()
                .map(|owner| untagged_user_name(owner).to_string())
                .filter(|owner| !owner.is_empty())
                .collect();

            Some(AreaEntry {
                area_label: area_label.to_string(),
                lead: lead.to_string(),
                owners,
            })
        })
        .collect()
}

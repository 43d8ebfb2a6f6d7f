//! Licensing document checklist, persisted as JSON beside the database.

use crate::error::Result;
use crate::io;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const ITEMS: [&str; 13] = [
    "Articles of Incorporation / Operating Agreement",
    "Owner Affidavits (each owner)",
    "Ownership structure summary (names, %, roles)",
    "Oklahoma residency proof for applicable owners",
    "Land ownership / Lease for grow site",
    "Site plan (map/diagram)",
    "Certificate of Occupancy for buildings in use",
    "Security plan (cameras, fencing, access, alarms)",
    "Inventory tracking plan (seed→sale)",
    "Waste disposal plan",
    "OMMA grower license (proof or application)",
    "OBNDD registration (proof or in-process)",
    "Photo IDs of owners/managers attending interview",
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistState {
    #[serde(default)]
    pub checked: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChecklistItem {
    pub label: &'static str,
    pub checked: bool,
}

impl ChecklistState {
    /// Every known item with its checked flag, in display order.
    pub fn items(&self) -> Vec<ChecklistItem> {
        ITEMS
            .iter()
            .map(|&label| ChecklistItem {
                label,
                checked: self.checked.iter().any(|c| c == label),
            })
            .collect()
    }

    pub fn done(&self) -> usize {
        self.items().iter().filter(|i| i.checked).count()
    }
}

/// Missing or unreadable state loads as an empty checklist.
pub fn load(path: &Path) -> ChecklistState {
    let data = match std::fs::read_to_string(path) {
        Ok(d) => d,
        Err(_) => return ChecklistState::default(),
    };
    serde_json::from_str(&data).unwrap_or_else(|e| {
        tracing::warn!(path = %path.display(), "ignoring corrupt checklist: {e}");
        ChecklistState::default()
    })
}

/// Persist `checked`, dropping unknown labels and duplicates.
pub fn save(path: &Path, checked: &[String]) -> Result<ChecklistState> {
    let state = ChecklistState {
        checked: ITEMS
            .iter()
            .filter(|item| checked.iter().any(|c| c.trim() == **item))
            .map(|item| item.to_string())
            .collect(),
    };
    let data = serde_json::to_string_pretty(&state)?;
    io::atomic_write(path, data.as_bytes())?;
    tracing::info!(checked = state.checked.len(), "checklist updated");
    Ok(state)
}

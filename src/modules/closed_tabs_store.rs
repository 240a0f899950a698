use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::modules::closed_tabs::ClosedTabs;
use crate::settings::write_json_atomic;

impl ClosedTabs {
    /// Loads the closed-tabs stack, falling back to an empty one on any read/parse error.
    pub fn load(path: &Path) -> Self {
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(json) => match serde_json::from_str(&json) {
                    Ok(store) => return store,
                    Err(e) => log::warn!("[ClosedTabs] Failed to parse {}: {}", path.display(), e),
                },
                Err(e) => log::warn!("[ClosedTabs] Failed to read {}: {}", path.display(), e),
            }
        }
        Self::new()
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        write_json_atomic(path, &serde_json::to_string_pretty(self)?)
    }
}

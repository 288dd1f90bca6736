//! Sync settings: the master-check toggle, the heuristic rule set, and the
//! operator exception table.
//!
//! Settings are plain JSON so hosts can ship and edit them without
//! recompiling:
//!
//! ```json
//! {
//!     "check_masters": true,
//!     "heuristics": "extended",
//!     "exceptions": [
//!         { "pattern": "survival", "order": ["base", "patch"] }
//!     ]
//! }
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::SyncError;
use crate::order::PluginOrdering;

/// Which built-in heuristic pattern list applies within a mod.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HeuristicSet {
    Classic,
    #[default]
    Extended,
}

/// One operator override: when `pattern` matches a plugin name, that mod's
/// plugins are ordered by the first `order` substring they contain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExceptionRule {
    pub pattern: String,
    pub order: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    /// Disable plugins whose declared masters are missing from the final
    /// load order.
    pub check_masters: bool,
    pub heuristics: HeuristicSet,
    pub exceptions: Vec<ExceptionRule>,
}

impl Default for SyncSettings {
    fn default() -> Self {
        SyncSettings {
            check_masters: true,
            heuristics: HeuristicSet::default(),
            exceptions: Vec::new(),
        }
    }
}

impl SyncSettings {
    /// Reads settings from a JSON file and validates the exception table.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .context(format!("Failed to read settings file: {:?}", path))?;
        let settings: SyncSettings = serde_json::from_str(&raw)
            .context(format!("Failed to parse settings file: {:?}", path))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Compiles every exception pattern so a broken table is rejected here
    /// instead of failing in the middle of a sort.
    pub fn validate(&self) -> Result<(), SyncError> {
        PluginOrdering::new(self.heuristics, &self.exceptions).map(|_| ())
    }
}

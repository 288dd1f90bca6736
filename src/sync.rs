//! The synchronization pass: sort, hoist masters, push the merged order,
//! then gate each plugin on the presence of its declared masters.

use std::collections::HashSet;

use anyhow::{Context, Result};
use log::{info, warn};

use crate::config::SyncSettings;
use crate::error::SyncError;
use crate::order::{OrderKey, PluginOrdering};
use crate::plugin::PluginState;
use crate::registry::PluginRegistry;

/// Outcome of one sync pass.
#[derive(Debug, Clone)]
pub struct SyncReport {
    /// Final load order, masters first.
    pub load_order: Vec<String>,
    /// Resulting state per plugin, in load order.
    pub states: Vec<(String, PluginState)>,
    /// One line per disabled plugin naming the master that was missing.
    pub warnings: Vec<String>,
}

impl SyncReport {
    pub fn disabled_count(&self) -> usize {
        self.states
            .iter()
            .filter(|(_, state)| !state.is_active())
            .count()
    }
}

/// Drives a full synchronization pass against a [`PluginRegistry`].
///
/// The engine is immutable after construction and a pass retains no state,
/// so one engine can serve any number of passes.
pub struct SyncEngine {
    ordering: PluginOrdering,
    check_masters: bool,
}

impl SyncEngine {
    /// Builds an engine from settings. Fails if the exception table does
    /// not compile.
    pub fn new(settings: &SyncSettings) -> Result<Self, SyncError> {
        let ordering = PluginOrdering::new(settings.heuristics, &settings.exceptions)?;
        Ok(SyncEngine {
            ordering,
            check_masters: settings.check_masters,
        })
    }

    /// Runs the full pass: sort every known plugin by mod priority, hoist
    /// master files to the front, push the merged order to the registry,
    /// then enable each plugin whose declared masters are all present and
    /// disable the rest.
    ///
    /// Missing masters never abort the pass; registry failures do, with no
    /// rollback of writes already applied.
    pub fn run(&self, registry: &mut dyn PluginRegistry) -> Result<SyncReport> {
        info!("Sync started...");

        let names = registry
            .plugin_names()
            .context("Failed to enumerate plugins")?;

        let mut keys = Vec::with_capacity(names.len());
        for name in names {
            let priority = registry
                .origin_priority(&name)
                .context(format!("Failed to resolve priority of {}", name))?;
            keys.push(OrderKey::new(priority, name));
        }
        keys.sort_by(|a, b| self.ordering.compare(a, b));

        // Masters load before everything that could reference them,
        // whatever their mod's priority says.
        let mut masters = Vec::new();
        let mut others = Vec::new();
        for key in keys {
            let is_master = registry
                .is_master(&key.name)
                .context(format!("Failed to query master flag of {}", key.name))?;
            if is_master {
                masters.push(key.name);
            } else {
                others.push(key.name);
            }
        }
        let mut load_order = masters;
        load_order.append(&mut others);

        let present: HashSet<String> = if self.check_masters {
            load_order.iter().map(|name| name.to_lowercase()).collect()
        } else {
            HashSet::new()
        };

        registry
            .set_load_order(&load_order)
            .context("Failed to set load order")?;

        let mut states = Vec::with_capacity(load_order.len());
        let mut warnings = Vec::new();
        for plugin in &load_order {
            let mut state = PluginState::Active;
            if self.check_masters {
                let declared = registry
                    .masters(plugin)
                    .context(format!("Failed to list masters of {}", plugin))?;
                for master in declared {
                    if !present.contains(&master.to_lowercase()) {
                        let line = format!("{} not present, disabling {}", master, plugin);
                        warn!("{}", line);
                        warnings.push(line);
                        state = PluginState::Inactive;
                        break;
                    }
                }
            }
            registry
                .set_state(plugin, state)
                .context(format!("Failed to set state of {}", plugin))?;
            states.push((plugin.clone(), state));
        }

        registry
            .commit()
            .context("Failed to commit synced plugin list")?;

        info!("Sync complete");
        Ok(SyncReport {
            load_order,
            states,
            warnings,
        })
    }
}

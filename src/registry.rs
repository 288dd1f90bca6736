//! Plugin registry access for load-order synchronization.
//!
//! The sync engine never talks to a host directly; it drives a
//! [`PluginRegistry`], and a host-facing layer (FFI, CLI) supplies the
//! implementation.
//!
//! # Built-in implementation
//!
//! [`ManifestRegistry`] is backed by a JSON snapshot of the host's mod and
//! plugin lists. It records the mutations the engine makes in memory and can
//! persist the results as the plain-text list files hosts consume:
//!
//! - `loadorder.txt` - every plugin in final order
//! - `plugins.txt` - enablement, in the dialect the host's version expects

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use semver::Version;
use serde::{Deserialize, Serialize};

use crate::host::{self, ListDialect};
use crate::plugin::{PluginInfo, PluginState};

/// Host collaborator surface the sync pass drives.
///
/// Read methods describe the installed plugins; write methods apply the
/// computed order and states. The pass takes the registry `&mut` for its
/// whole duration, so an implementation never sees interleaved passes.
pub trait PluginRegistry {
    /// Every known plugin, unfiltered.
    fn plugin_names(&self) -> Result<Vec<String>>;

    /// Priority of the mod that provides `plugin`. Smaller loads earlier.
    fn origin_priority(&self, plugin: &str) -> Result<i32>;

    fn is_master(&self, plugin: &str) -> Result<bool>;

    /// Masters `plugin` declares as dependencies.
    fn masters(&self, plugin: &str) -> Result<Vec<String>>;

    fn set_load_order(&mut self, order: &[String]) -> Result<()>;

    fn set_state(&mut self, plugin: &str, state: PluginState) -> Result<()>;

    /// Persist whatever the implementation persists and ask the host to
    /// refresh its view.
    fn commit(&mut self) -> Result<()>;
}

/// Snapshot of the host's mod and plugin lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// Host API version the snapshot came from.
    #[serde(default)]
    pub host_version: Option<String>,
    /// Mods in user-defined order; a plugin's priority is its mod's index.
    pub mod_order: Vec<String>,
    pub plugins: Vec<PluginInfo>,
}

impl Manifest {
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).context("Failed to parse plugin manifest")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .context(format!("Failed to read manifest file: {:?}", path))?;
        Self::from_json(&raw)
    }
}

/// In-memory registry over a [`Manifest`], with optional plain-text
/// persistence of the results.
pub struct ManifestRegistry {
    plugins: Vec<PluginInfo>,
    priorities: HashMap<String, i32>,
    by_name: HashMap<String, usize>,
    load_order: Vec<String>,
    states: HashMap<String, PluginState>,
    dialect: ListDialect,
    out_dir: Option<PathBuf>,
}

impl ManifestRegistry {
    /// Builds a registry from a snapshot. Refuses snapshots taken from a
    /// host older than the minimum supported API version.
    pub fn new(manifest: Manifest) -> Result<Self> {
        let host_version = match &manifest.host_version {
            Some(raw) => Version::parse(raw.trim())
                .context(format!("Invalid host version in manifest: {}", raw))?,
            None => host::default_host_version(),
        };
        host::require_host(&host_version)?;

        let priorities = manifest
            .mod_order
            .iter()
            .enumerate()
            .map(|(index, name)| (name.to_lowercase(), index as i32))
            .collect();
        let by_name = manifest
            .plugins
            .iter()
            .enumerate()
            .map(|(index, plugin)| (plugin.name.to_lowercase(), index))
            .collect();

        Ok(ManifestRegistry {
            plugins: manifest.plugins,
            priorities,
            by_name,
            load_order: Vec::new(),
            states: HashMap::new(),
            dialect: host::plugin_list_dialect(&host_version),
            out_dir: None,
        })
    }

    /// Write `loadorder.txt` and `plugins.txt` into `dir` on commit.
    pub fn persist_to(mut self, dir: impl Into<PathBuf>) -> Self {
        self.out_dir = Some(dir.into());
        self
    }

    pub fn load_order(&self) -> &[String] {
        &self.load_order
    }

    pub fn state(&self, plugin: &str) -> Option<PluginState> {
        self.states.get(&plugin.to_lowercase()).copied()
    }

    fn get(&self, plugin: &str) -> Result<&PluginInfo> {
        self.by_name
            .get(&plugin.to_lowercase())
            .map(|&index| &self.plugins[index])
            .context(format!("Unknown plugin: {}", plugin))
    }

    fn render_plugin_list(&self, header: &str) -> String {
        let mut out = String::from(header);
        for name in &self.load_order {
            let active = self.state(name).map_or(false, PluginState::is_active);
            match self.dialect {
                ListDialect::Starred => {
                    if active {
                        out.push('*');
                    }
                    out.push_str(name);
                    out.push('\n');
                }
                ListDialect::ActiveOnly => {
                    if active {
                        out.push_str(name);
                        out.push('\n');
                    }
                }
            }
        }
        out
    }
}

impl PluginRegistry for ManifestRegistry {
    fn plugin_names(&self) -> Result<Vec<String>> {
        Ok(self.plugins.iter().map(|p| p.name.clone()).collect())
    }

    fn origin_priority(&self, plugin: &str) -> Result<i32> {
        let info = self.get(plugin)?;
        self.priorities
            .get(&info.origin.to_lowercase())
            .copied()
            .context(format!(
                "Plugin {} comes from unknown mod: {}",
                plugin, info.origin
            ))
    }

    fn is_master(&self, plugin: &str) -> Result<bool> {
        Ok(self.get(plugin)?.master)
    }

    fn masters(&self, plugin: &str) -> Result<Vec<String>> {
        Ok(self.get(plugin)?.masters.clone())
    }

    fn set_load_order(&mut self, order: &[String]) -> Result<()> {
        self.load_order = order.to_vec();
        Ok(())
    }

    fn set_state(&mut self, plugin: &str, state: PluginState) -> Result<()> {
        self.get(plugin)?;
        self.states.insert(plugin.to_lowercase(), state);
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        let dir = match &self.out_dir {
            Some(dir) => dir.clone(),
            None => return Ok(()),
        };
        fs::create_dir_all(&dir)
            .context(format!("Failed to create output directory: {:?}", dir))?;

        let stamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        let header = format!("# Generated by loadsync on {}\n", stamp);

        let mut load_order = header.clone();
        for name in &self.load_order {
            load_order.push_str(name);
            load_order.push('\n');
        }
        let path = dir.join("loadorder.txt");
        fs::write(&path, load_order)
            .context(format!("Failed to write load order file: {:?}", path))?;

        let path = dir.join("plugins.txt");
        fs::write(&path, self.render_plugin_list(&header))
            .context(format!("Failed to write plugin list file: {:?}", path))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest(host_version: Option<&str>) -> Manifest {
        Manifest {
            host_version: host_version.map(String::from),
            mod_order: vec!["Core Mod".into(), "Extra Mod".into()],
            plugins: vec![
                PluginInfo {
                    name: "Core.esm".into(),
                    origin: "Core Mod".into(),
                    master: true,
                    masters: vec![],
                },
                PluginInfo {
                    name: "Extra.esp".into(),
                    origin: "Extra Mod".into(),
                    master: false,
                    masters: vec!["Core.esm".into()],
                },
            ],
        }
    }

    #[test]
    fn parses_manifest_with_field_defaults() {
        let manifest = Manifest::from_json(
            r#"{
                "mod_order": ["A"],
                "plugins": [ { "name": "a.esp", "origin": "A" } ]
            }"#,
        )
        .expect("parses");
        assert!(manifest.host_version.is_none());
        assert!(!manifest.plugins[0].master);
        assert!(manifest.plugins[0].masters.is_empty());
    }

    #[test]
    fn resolves_priorities_and_flags_case_insensitively() {
        let registry = ManifestRegistry::new(manifest(None)).expect("registry");
        assert_eq!(registry.origin_priority("CORE.ESM").expect("priority"), 0);
        assert_eq!(registry.origin_priority("extra.esp").expect("priority"), 1);
        assert!(registry.is_master("core.esm").expect("flag"));
        assert_eq!(
            registry.masters("Extra.esp").expect("masters"),
            vec!["Core.esm".to_string()]
        );
    }

    #[test]
    fn unknown_plugin_and_unknown_origin_are_structural_errors() {
        let mut bad = manifest(None);
        bad.plugins.push(PluginInfo {
            name: "Stray.esp".into(),
            origin: "Not Installed".into(),
            master: false,
            masters: vec![],
        });
        let registry = ManifestRegistry::new(bad).expect("registry");
        assert!(registry.is_master("missing.esp").is_err());
        assert!(registry.origin_priority("Stray.esp").is_err());
    }

    #[test]
    fn refuses_snapshots_from_unsupported_hosts() {
        assert!(ManifestRegistry::new(manifest(Some("2.3.9"))).is_err());
        assert!(ManifestRegistry::new(manifest(Some("not a version"))).is_err());
        assert!(ManifestRegistry::new(manifest(Some("2.4.0"))).is_ok());
    }

    #[test]
    fn commit_writes_starred_lists() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut registry = ManifestRegistry::new(manifest(Some("2.5.2")))
            .expect("registry")
            .persist_to(dir.path());

        let order = vec!["Core.esm".to_string(), "Extra.esp".to_string()];
        registry.set_load_order(&order).expect("order");
        registry
            .set_state("Core.esm", PluginState::Active)
            .expect("state");
        registry
            .set_state("Extra.esp", PluginState::Inactive)
            .expect("state");
        registry.commit().expect("commit");

        let load_order =
            fs::read_to_string(dir.path().join("loadorder.txt")).expect("loadorder.txt");
        let lines: Vec<&str> = load_order.lines().collect();
        assert!(lines[0].starts_with('#'));
        assert_eq!(&lines[1..], ["Core.esm", "Extra.esp"]);

        let plugins = fs::read_to_string(dir.path().join("plugins.txt")).expect("plugins.txt");
        let lines: Vec<&str> = plugins.lines().collect();
        assert_eq!(&lines[1..], ["*Core.esm", "Extra.esp"]);
    }

    #[test]
    fn commit_writes_active_only_list_for_older_hosts() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut registry = ManifestRegistry::new(manifest(Some("2.4.4")))
            .expect("registry")
            .persist_to(dir.path());

        let order = vec!["Core.esm".to_string(), "Extra.esp".to_string()];
        registry.set_load_order(&order).expect("order");
        registry
            .set_state("Core.esm", PluginState::Active)
            .expect("state");
        registry
            .set_state("Extra.esp", PluginState::Inactive)
            .expect("state");
        registry.commit().expect("commit");

        let plugins = fs::read_to_string(dir.path().join("plugins.txt")).expect("plugins.txt");
        let lines: Vec<&str> = plugins.lines().collect();
        assert_eq!(&lines[1..], ["Core.esm"]);
    }
}

//! End-to-end passes over a manifest-backed registry, including the
//! plain-text persistence the CLI exercises.

use std::fs;

use loadsync_core::config::{ExceptionRule, SyncSettings};
use loadsync_core::registry::{Manifest, ManifestRegistry};
use loadsync_core::sync::SyncEngine;

const SNAPSHOT: &str = r#"{
    "host_version": "2.5.2",
    "mod_order": ["Base Game", "Big Overhaul", "Small Tweaks"],
    "plugins": [
        { "name": "Tweaks.esp", "origin": "Small Tweaks", "masters": ["Game.esm"] },
        { "name": "Overhaul Patch.esp", "origin": "Big Overhaul", "masters": ["Overhaul.esp"] },
        { "name": "Overhaul.esp", "origin": "Big Overhaul", "masters": ["Game.esm"] },
        { "name": "Game.esm", "origin": "Base Game", "master": true },
        { "name": "Orphan.esp", "origin": "Small Tweaks", "masters": ["Removed.esm"] }
    ]
}"#;

fn run(manifest: Manifest, settings: &SyncSettings) -> (ManifestRegistry, Vec<String>) {
    let mut registry = ManifestRegistry::new(manifest).expect("registry");
    let engine = SyncEngine::new(settings).expect("engine");
    let report = engine.run(&mut registry).expect("sync");
    (registry, report.load_order)
}

#[test]
fn full_pass_orders_and_gates_plugins() {
    let manifest = Manifest::from_json(SNAPSHOT).expect("manifest");
    let (registry, load_order) = run(manifest, &SyncSettings::default());

    // Master first, then mod order, with the same-mod patch after its base
    // and the name fallback breaking the tie between the last two.
    assert_eq!(
        load_order,
        [
            "Game.esm",
            "Overhaul.esp",
            "Overhaul Patch.esp",
            "Orphan.esp",
            "Tweaks.esp"
        ]
    );
    assert!(registry.state("Tweaks.esp").expect("state").is_active());
    assert!(!registry.state("Orphan.esp").expect("state").is_active());
}

#[test]
fn persists_list_files_for_modern_hosts() {
    let dir = tempfile::tempdir().expect("tempdir");
    let manifest = Manifest::from_json(SNAPSHOT).expect("manifest");
    let mut registry = ManifestRegistry::new(manifest)
        .expect("registry")
        .persist_to(dir.path());
    SyncEngine::new(&SyncSettings::default())
        .expect("engine")
        .run(&mut registry)
        .expect("sync");

    let load_order = fs::read_to_string(dir.path().join("loadorder.txt")).expect("loadorder.txt");
    let names: Vec<&str> = load_order.lines().skip(1).collect();
    assert_eq!(names.first(), Some(&"Game.esm"));
    assert_eq!(names.len(), 5);

    let plugins = fs::read_to_string(dir.path().join("plugins.txt")).expect("plugins.txt");
    let lines: Vec<&str> = plugins.lines().skip(1).collect();
    assert!(lines.contains(&"*Game.esm"));
    assert!(lines.contains(&"Orphan.esp"));
    assert!(!lines.contains(&"*Orphan.esp"));
}

#[test]
fn persists_active_only_list_for_legacy_hosts() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut manifest = Manifest::from_json(SNAPSHOT).expect("manifest");
    manifest.host_version = Some("2.4.2".into());
    let mut registry = ManifestRegistry::new(manifest)
        .expect("registry")
        .persist_to(dir.path());
    SyncEngine::new(&SyncSettings::default())
        .expect("engine")
        .run(&mut registry)
        .expect("sync");

    let plugins = fs::read_to_string(dir.path().join("plugins.txt")).expect("plugins.txt");
    let lines: Vec<&str> = plugins.lines().skip(1).collect();
    assert_eq!(lines.len(), 4);
    assert!(lines.iter().all(|line| !line.starts_with('*')));
    assert!(!lines.contains(&"Orphan.esp"));
}

#[test]
fn exception_table_reorders_within_a_mod() {
    let manifest = Manifest::from_json(
        r#"{
            "mod_order": ["ModName"],
            "plugins": [
                { "name": "ModName - Patch.esp", "origin": "ModName" },
                { "name": "ModName - Main.esp", "origin": "ModName" }
            ]
        }"#,
    )
    .expect("manifest");

    let settings = SyncSettings {
        exceptions: vec![ExceptionRule {
            pattern: "modname".into(),
            order: vec!["main".into(), "patch".into()],
        }],
        ..SyncSettings::default()
    };
    let (_, load_order) = run(manifest, &settings);
    assert_eq!(load_order, ["ModName - Main.esp", "ModName - Patch.esp"]);
}

#[test]
fn snapshot_from_unsupported_host_is_refused() {
    let mut manifest = Manifest::from_json(SNAPSHOT).expect("manifest");
    manifest.host_version = Some("2.3.0".into());
    assert!(ManifestRegistry::new(manifest).is_err());
}

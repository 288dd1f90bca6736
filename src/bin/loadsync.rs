use std::env;
use std::path::Path;

use anyhow::{bail, Context, Result};
use loadsync_core::config::SyncSettings;
use loadsync_core::registry::{Manifest, ManifestRegistry};
use loadsync_core::sync::SyncEngine;

fn main() -> Result<()> {
    let _logger = flexi_logger::Logger::try_with_env_or_str("info")
        .context("Failed to configure logging")?
        .start()
        .context("Failed to start logger")?;

    let mut args = env::args().skip(1);
    let manifest_path = match args.next() {
        Some(path) => path,
        None => bail!("Usage: loadsync <manifest.json> [settings.json] [output-dir]"),
    };
    let settings = match args.next() {
        Some(path) => SyncSettings::load(Path::new(&path))?,
        None => SyncSettings::default(),
    };

    let manifest = Manifest::load(Path::new(&manifest_path))?;
    let mut registry = ManifestRegistry::new(manifest)?;
    if let Some(dir) = args.next() {
        registry = registry.persist_to(dir);
    }

    let engine = SyncEngine::new(&settings)?;
    let report = engine.run(&mut registry)?;

    println!("Synced plugins: {}", report.load_order.len());
    if report.disabled_count() > 0 {
        println!("Disabled (missing masters): {}", report.disabled_count());
    }

    Ok(())
}

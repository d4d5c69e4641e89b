//! Implementation of the `matpak list` command.

use anyhow::{Context, Result};
use matpak_core::{InstalledIndex, InstalledPackage, PackageStore};
use std::path::Path;

/// List all installed packages, with versions when the index has them.
pub fn list_packages(root: &Path) -> Result<()> {
    let store = PackageStore::new(root);
    let installed = store
        .list_installed()
        .context("Failed to read local package state")?;

    if installed.is_empty() {
        println!("No packages installed yet");
        return Ok(());
    }

    // The index is display metadata only; an unreadable one degrades to
    // bare names
    let index = match store.load_index() {
        Ok(index) => index,
        Err(e) => {
            eprintln!("Warning: ignoring unreadable installed index: {e}");
            InstalledIndex::new()
        }
    };

    println!("Installed packages:");
    for name in &installed {
        println!("{}", format_line(name, index.get(name)));
    }
    Ok(())
}

fn format_line(name: &str, entry: Option<&InstalledPackage>) -> String {
    match entry {
        Some(entry) => format!("  - {name} v{}", entry.version),
        None => format!("  - {name}"),
    }
}

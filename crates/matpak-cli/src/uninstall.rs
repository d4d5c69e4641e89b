//! Implementation of the `matpak uninstall` command.

use anyhow::{Context, Result};
use matpak_core::{plan_uninstall, PackageStore};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

/// Options for uninstalling a package.
#[derive(Debug)]
pub struct UninstallOptions {
    /// Package name to uninstall.
    pub package: String,
    /// Skip the confirmation prompt.
    pub yes: bool,
    /// Matpak root directory.
    pub root: PathBuf,
}

/// Uninstall a package after interactive confirmation.
pub fn uninstall_package(options: &UninstallOptions) -> Result<()> {
    let store = PackageStore::new(&options.root);
    let installed = store
        .list_installed()
        .context("Failed to read local package state")?;

    // Planning is pure; the confirmation gate below is the only
    // user-interaction point
    let Some(action) = plan_uninstall(&options.package, &installed) else {
        println!("Package '{}' is not installed", options.package);
        return Ok(());
    };

    if !options.yes && !confirm(&action.package)? {
        println!("Uninstallation cancelled");
        return Ok(());
    }

    store
        .remove(&action.package)
        .with_context(|| format!("Failed to uninstall package '{}'", action.package))?;

    let mut index = store.load_index().unwrap_or_default();
    if index.remove(&action.package).is_some() {
        store
            .save_index(&index)
            .context("Failed to update installed index")?;
    }

    if let Err(e) = matpak_core::sync_integration(store.root()) {
        eprintln!("Warning: failed to update MATLAB integration: {e}");
    }

    println!("Successfully uninstalled '{}'", action.package);
    Ok(())
}

/// Ask the user to confirm the uninstall on stdin.
fn confirm(package: &str) -> Result<bool> {
    print!("Are you sure you want to uninstall '{package}'? (y/n): ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(is_affirmative(&line))
}

fn is_affirmative(line: &str) -> bool {
    matches!(line.trim().to_lowercase().as_str(), "y" | "yes")
}

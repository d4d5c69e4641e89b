//! Implementation of the `matpak install` command.

use anyhow::{Context, Result};
use matpak_core::{
    artifact_checksum, artifact_for, detect_platform_tag, plan, resolve, InstallPlan,
    InstalledPackage, Manifest, PackageStore, RegistryClient, RegistryConfig,
};
use std::path::PathBuf;

/// Options for installing a package.
#[derive(Debug)]
pub struct InstallOptions {
    /// Package name to install.
    pub package: String,
    /// Resolve and print the plan without installing.
    pub dry_run: bool,
    /// Registry base URL override.
    pub registry: Option<String>,
    /// Matpak root directory.
    pub root: PathBuf,
}

/// Install a package and its dependencies, dependencies first.
pub fn install_package(options: &InstallOptions) -> Result<()> {
    let store = PackageStore::new(&options.root);

    let mut config = RegistryConfig::default();
    if let Some(ref base_url) = options.registry {
        config.base_url = base_url.clone();
    }
    let registry =
        RegistryClient::with_config(config).context("Failed to create registry client")?;

    println!("Fetching package manifest...");
    let manifest = registry
        .fetch_manifest()
        .context("Failed to fetch package manifest")?;

    println!("Resolving dependencies for '{}'...", options.package);
    let order = resolve(&options.package, &manifest)?;

    // Local state is read once, before planning, and not re-checked between
    // the sequential installs below
    let installed = store
        .list_installed()
        .context("Failed to read local package state")?;
    let install_plan = plan(&order, &installed);

    for name in &install_plan.skipped {
        println!("Package '{name}' is already installed");
    }

    if install_plan.is_empty() {
        println!("All packages already installed");
        return Ok(());
    }

    if install_plan.len() > 1 || options.dry_run {
        println!("\nInstallation plan:");
        for line in plan_lines(&manifest, &install_plan) {
            println!("{line}");
        }
        println!();
    }

    if options.dry_run {
        println!("Dry run, nothing installed");
        return Ok(());
    }

    let host_tag = detect_platform_tag();
    let mut index = store.load_index().context("Failed to load installed index")?;

    for name in &install_plan.to_install {
        let entry = manifest
            .get(name)
            .with_context(|| format!("Package '{name}' missing from manifest"))?;
        let variant = artifact_for(entry, &host_tag)?;

        println!("Downloading {name} v{}...", entry.version);
        let archive = registry
            .download_artifact(&variant.filename)
            .with_context(|| format!("Failed to download package '{name}'"))?;

        println!("Extracting {name}...");
        store
            .materialize(name, &archive)
            .with_context(|| format!("Failed to install package '{name}'"))?;

        index.insert(InstalledPackage::new(
            name,
            &entry.version,
            &variant.platform_tag,
            &artifact_checksum(&archive),
        ));
        store
            .save_index(&index)
            .context("Failed to update installed index")?;

        println!("Successfully installed '{name}'");
    }

    // Keep the MATLAB integration current; never fail an install over it
    if let Err(e) = matpak_core::sync_integration(&options.root) {
        eprintln!("Warning: failed to update MATLAB integration: {e}");
    }

    println!("\nSuccessfully installed {} package(s)", install_plan.len());
    Ok(())
}

/// One display line per package in the plan.
fn plan_lines(manifest: &Manifest, install_plan: &InstallPlan) -> Vec<String> {
    install_plan
        .to_install
        .iter()
        .map(|name| match manifest.get(name) {
            Some(entry) => format!("  - {name} v{}", entry.version),
            None => format!("  - {name}"),
        })
        .collect()
}

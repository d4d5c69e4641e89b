//! Implementation of the `matpak setup` command.

use anyhow::{Context, Result};
use matpak_core::sync_integration;
use std::path::Path;

/// Write the MATLAB integration files and print path instructions.
pub fn setup_matlab(root: &Path) -> Result<()> {
    let matlab_dir =
        sync_integration(root).context("Failed to write the MATLAB integration files")?;

    println!("MATLAB integration updated at: {}", matlab_dir.display());
    println!();
    println!("Make sure '{}' is on your MATLAB path.", matlab_dir.display());
    println!("You can do this by running in MATLAB:");
    println!("  addpath('{}')", matlab_dir.display());
    println!("  savepath");
    Ok(())
}

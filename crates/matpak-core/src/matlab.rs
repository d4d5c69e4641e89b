//! MATLAB path integration.
//!
//! Writes the bundled `+matpak` MATLAB package under `<root>/matlab/` so
//! installed packages can be loaded from MATLAB with `matpak.import(...)`.
//! Install and uninstall refresh this best-effort; only `matpak setup`
//! treats a failure as fatal.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Directory under the matpak root holding the MATLAB integration package.
pub const MATLAB_DIR: &str = "matlab";

const IMPORT_FN: &str = include_str!("../assets/matlab/import.m");

/// Errors that can occur while writing the integration files.
#[derive(Error, Debug)]
pub enum IntegrationError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Write (or refresh) the MATLAB integration package under `root`.
///
/// Returns the directory users must add to their MATLAB path.
///
/// # Errors
///
/// Returns an error if the files cannot be written.
pub fn sync_integration(root: &Path) -> Result<PathBuf, IntegrationError> {
    let matlab_dir = root.join(MATLAB_DIR);
    let package_dir = matlab_dir.join("+matpak");
    fs::create_dir_all(&package_dir)?;
    fs::write(package_dir.join("import.m"), IMPORT_FN)?;
    Ok(matlab_dir)
}

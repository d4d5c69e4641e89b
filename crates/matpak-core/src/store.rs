//! On-disk package store.
//!
//! Installed packages live under `<root>/packages/<name>/`; directory
//! presence is the source of truth for the local install state. The
//! `installed.toml` index next to it records version and checksum metadata
//! for display only and never feeds back into planning.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Directory under the matpak root holding one subdirectory per package.
pub const PACKAGES_DIR: &str = "packages";

/// Installed-package index filename, relative to the matpak root.
pub const INDEX_FILE: &str = "installed.toml";

/// Errors that can occur in the package store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt package archive for '{name}': {reason}")]
    CorruptArchive { name: String, reason: String },

    #[error("invalid installed index: {0}")]
    Index(String),
}

/// Metadata for one installed package, kept in the index for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstalledPackage {
    /// Package name.
    pub name: String,
    /// Installed version.
    pub version: String,
    /// Platform tag of the installed artifact.
    pub platform_tag: String,
    /// SHA256 checksum of the downloaded archive.
    pub checksum: String,
    /// Installation timestamp, RFC 3339.
    pub installed_at: String,
}

impl InstalledPackage {
    /// Build an index entry stamped with the current time.
    #[must_use]
    pub fn new(name: &str, version: &str, platform_tag: &str, checksum: &str) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            platform_tag: platform_tag.to_string(),
            checksum: checksum.to_string(),
            installed_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// The index file tracking installed-package metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstalledIndex {
    /// Version of the index format.
    #[serde(default)]
    pub version: u32,
    /// Map of package name to entry.
    #[serde(default)]
    pub packages: BTreeMap<String, InstalledPackage>,
}

impl InstalledIndex {
    /// Current index format version.
    pub const CURRENT_VERSION: u32 = 1;

    /// Create a new empty index.
    #[must_use]
    pub fn new() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            packages: BTreeMap::new(),
        }
    }

    /// Load the index from a file. A missing file is an empty index.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| StoreError::Index(e.to_string()))
    }

    /// Save the index to a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let content = toml::to_string_pretty(self).map_err(|e| StoreError::Index(e.to_string()))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }

    /// Get a package entry by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&InstalledPackage> {
        self.packages.get(name)
    }

    /// Add or update a package entry.
    pub fn insert(&mut self, entry: InstalledPackage) {
        self.packages.insert(entry.name.clone(), entry);
    }

    /// Remove a package entry.
    pub fn remove(&mut self, name: &str) -> Option<InstalledPackage> {
        self.packages.remove(name)
    }
}

/// The local package store, rooted at an explicit directory.
///
/// The root is always passed in by the caller; the store never consults
/// hidden global state.
#[derive(Debug, Clone)]
pub struct PackageStore {
    root: PathBuf,
}

impl PackageStore {
    /// Create a store rooted at `root`. No directories are created until a
    /// package is materialized.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The store root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the installed package directories.
    #[must_use]
    pub fn packages_dir(&self) -> PathBuf {
        self.root.join(PACKAGES_DIR)
    }

    /// Directory a named package is (or would be) installed into.
    #[must_use]
    pub fn package_dir(&self, name: &str) -> PathBuf {
        self.packages_dir().join(name)
    }

    /// Path of the installed-package index file.
    #[must_use]
    pub fn index_path(&self) -> PathBuf {
        self.root.join(INDEX_FILE)
    }

    /// Whether a package is currently installed.
    #[must_use]
    pub fn is_installed(&self, name: &str) -> bool {
        self.package_dir(name).exists()
    }

    /// Names of all installed packages.
    ///
    /// A store whose packages directory does not exist yet is empty, not an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns an error if the packages directory cannot be read.
    pub fn list_installed(&self) -> Result<BTreeSet<String>, StoreError> {
        let dir = self.packages_dir();
        if !dir.exists() {
            return Ok(BTreeSet::new());
        }

        let mut installed = BTreeSet::new();
        for dir_entry in fs::read_dir(dir)? {
            let dir_entry = dir_entry?;
            if dir_entry.path().is_dir() {
                installed.insert(dir_entry.file_name().to_string_lossy().into_owned());
            }
        }
        Ok(installed)
    }

    /// Extract a downloaded zip archive into the package's directory.
    ///
    /// Any existing directory for the package is replaced wholesale.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::CorruptArchive`] when the bytes are not a valid
    /// zip container, or an IO error when extraction cannot write.
    pub fn materialize(&self, name: &str, archive: &[u8]) -> Result<(), StoreError> {
        // Parse before touching the filesystem so a corrupt archive leaves
        // no trace of the package
        let mut zip =
            zip::ZipArchive::new(Cursor::new(archive)).map_err(|e| StoreError::CorruptArchive {
                name: name.to_string(),
                reason: e.to_string(),
            })?;

        let dest = self.package_dir(name);
        if dest.exists() {
            fs::remove_dir_all(&dest)?;
        }
        fs::create_dir_all(&dest)?;

        tracing::debug!(package = name, dest = %dest.display(), "extracting archive");
        zip.extract(&dest).map_err(|e| StoreError::CorruptArchive {
            name: name.to_string(),
            reason: e.to_string(),
        })?;

        Ok(())
    }

    /// Remove a package's directory. Removing a package that is not
    /// installed is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be deleted.
    pub fn remove(&self, name: &str) -> Result<(), StoreError> {
        let dir = self.package_dir(name);
        if dir.exists() {
            fs::remove_dir_all(dir)?;
        }
        Ok(())
    }

    /// Load the installed-package index.
    ///
    /// # Errors
    ///
    /// Returns an error if the index exists but cannot be read.
    pub fn load_index(&self) -> Result<InstalledIndex, StoreError> {
        InstalledIndex::load(&self.index_path())
    }

    /// Save the installed-package index.
    ///
    /// # Errors
    ///
    /// Returns an error if the index cannot be written.
    pub fn save_index(&self, index: &InstalledIndex) -> Result<(), StoreError> {
        index.save(&self.index_path())
    }
}

/// Default matpak root: `$MATPAK_HOME`, or `.matpak` under the home
/// directory.
#[must_use]
pub fn default_root() -> PathBuf {
    if let Ok(home) = std::env::var("MATPAK_HOME") {
        return PathBuf::from(home);
    }
    if let Some(home) = std::env::var("HOME")
        .ok()
        .or_else(|| std::env::var("USERPROFILE").ok())
    {
        return PathBuf::from(home).join(".matpak");
    }
    // Ultimate fallback: relative to the working directory
    PathBuf::from(".matpak")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn sample_archive(files: &[(&str, &str)]) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut cursor);
            let options = zip::write::SimpleFileOptions::default()
                .compression_method(zip::CompressionMethod::Stored);
            for (name, contents) in files {
                writer.start_file(*name, options).unwrap();
                writer.write_all(contents.as_bytes()).unwrap();
            }
            writer.finish().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn materialize_extracts_archive() {
        let dir = TempDir::new().unwrap();
        let store = PackageStore::new(dir.path());
        let archive = sample_archive(&[("plotting.m", "function plotting()\nend\n")]);

        store.materialize("plotting", &archive).unwrap();

        assert!(store.is_installed("plotting"));
        let contents = fs::read_to_string(store.package_dir("plotting").join("plotting.m")).unwrap();
        assert!(contents.starts_with("function plotting()"));
    }

    #[test]
    fn materialize_preserves_nested_paths() {
        let dir = TempDir::new().unwrap();
        let store = PackageStore::new(dir.path());
        let archive = sample_archive(&[("private/helper.m", "x = 1;\n")]);

        store.materialize("signal-tools", &archive).unwrap();

        assert!(store
            .package_dir("signal-tools")
            .join("private/helper.m")
            .exists());
    }

    #[test]
    fn materialize_replaces_existing_directory() {
        let dir = TempDir::new().unwrap();
        let store = PackageStore::new(dir.path());

        store
            .materialize("plotting", &sample_archive(&[("old.m", "old\n")]))
            .unwrap();
        store
            .materialize("plotting", &sample_archive(&[("new.m", "new\n")]))
            .unwrap();

        assert!(store.package_dir("plotting").join("new.m").exists());
        assert!(!store.package_dir("plotting").join("old.m").exists());
    }

    #[test]
    fn materialize_rejects_corrupt_archive() {
        let dir = TempDir::new().unwrap();
        let store = PackageStore::new(dir.path());

        let err = store.materialize("plotting", b"definitely not a zip").unwrap_err();
        assert!(matches!(err, StoreError::CorruptArchive { name, .. } if name == "plotting"));
        // Nothing was materialized
        assert!(!store.is_installed("plotting"));
    }

    #[test]
    fn list_installed_on_fresh_root_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = PackageStore::new(dir.path());
        assert!(store.list_installed().unwrap().is_empty());
        assert!(!store.is_installed("anything"));
    }

    #[test]
    fn list_installed_returns_sorted_names() {
        let dir = TempDir::new().unwrap();
        let store = PackageStore::new(dir.path());
        let archive = sample_archive(&[("main.m", "x = 1;\n")]);

        store.materialize("zeta", &archive).unwrap();
        store.materialize("alpha", &archive).unwrap();

        let installed: Vec<String> = store.list_installed().unwrap().into_iter().collect();
        assert_eq!(installed, vec!["alpha", "zeta"]);
    }

    #[test]
    fn remove_deletes_package_directory() {
        let dir = TempDir::new().unwrap();
        let store = PackageStore::new(dir.path());
        store
            .materialize("plotting", &sample_archive(&[("main.m", "x = 1;\n")]))
            .unwrap();

        store.remove("plotting").unwrap();
        assert!(!store.is_installed("plotting"));
    }

    #[test]
    fn remove_missing_package_is_noop() {
        let dir = TempDir::new().unwrap();
        let store = PackageStore::new(dir.path());
        store.remove("ghost").unwrap();
    }

    #[test]
    fn index_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = PackageStore::new(dir.path());

        let mut index = store.load_index().unwrap();
        assert!(index.packages.is_empty());

        index.insert(InstalledPackage::new(
            "plotting",
            "0.4.1",
            "any",
            "abc123",
        ));
        store.save_index(&index).unwrap();

        let reloaded = store.load_index().unwrap();
        let entry = reloaded.get("plotting").unwrap();
        assert_eq!(entry.version, "0.4.1");
        assert_eq!(entry.platform_tag, "any");
        assert_eq!(entry.checksum, "abc123");
        assert!(!entry.installed_at.is_empty());
    }

    #[test]
    fn index_remove_entry() {
        let mut index = InstalledIndex::new();
        index.insert(InstalledPackage::new("plotting", "0.4.1", "any", "abc"));
        assert!(index.remove("plotting").is_some());
        assert!(index.get("plotting").is_none());
        assert!(index.remove("plotting").is_none());
    }

    #[test]
    fn stale_index_does_not_affect_install_state() {
        let dir = TempDir::new().unwrap();
        let store = PackageStore::new(dir.path());

        let mut index = InstalledIndex::new();
        index.insert(InstalledPackage::new("plotting", "0.4.1", "any", "abc"));
        store.save_index(&index).unwrap();

        // Index mentions the package, but no directory exists
        assert!(!store.is_installed("plotting"));
        assert!(store.list_installed().unwrap().is_empty());
    }
}

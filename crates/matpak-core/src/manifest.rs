//! Registry manifest (`packages.json`) parsing and validation.
//!
//! The manifest is the full catalog of publishable packages. It is fetched
//! fresh per operation and treated as immutable for the duration of a
//! resolution.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur when working with manifests.
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("failed to read manifest file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse manifest: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid package name '{0}': {1}")]
    InvalidName(String, &'static str),

    #[error("duplicate package name '{0}' in manifest")]
    DuplicateName(String),

    #[error("package '{0}' has neither a filename nor variants")]
    NoArtifact(String),
}

/// The complete registry manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// All publishable packages, in registry order.
    #[serde(default)]
    pub packages: Vec<PackageEntry>,
}

/// One package record in the manifest.
///
/// The simplest producers emit a single artifact per entry (`filename`, with
/// an optional `platform_tag` defaulting to `any`). Multi-variant producers
/// emit a `variants` list instead. [`PackageEntry::variant_list`] normalizes
/// both shapes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageEntry {
    /// Package name, unique within the manifest.
    pub name: String,

    /// Package version string.
    pub version: String,

    /// Names of packages this one depends on. May reference names that are
    /// absent from the manifest; the resolver reports those.
    #[serde(default)]
    pub dependencies: Vec<String>,

    /// Single-artifact filename.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    /// Platform tag for the single-artifact shape.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_tag: Option<String>,

    /// Platform-specific build variants, in preference order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variants: Vec<Variant>,
}

/// One platform-specific build artifact of a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    /// Platform tag (`any`, `linux_x86_64`, `macosx_10_9_universal2`, ...).
    pub platform_tag: String,

    /// Downloadable archive filename.
    pub filename: String,
}

impl PackageEntry {
    /// All downloadable variants of this entry, in manifest order.
    ///
    /// Single-artifact entries are normalized to a one-element list tagged
    /// `any` unless the entry carries an explicit `platform_tag`.
    #[must_use]
    pub fn variant_list(&self) -> Vec<Variant> {
        if !self.variants.is_empty() {
            return self.variants.clone();
        }
        match &self.filename {
            Some(filename) => vec![Variant {
                platform_tag: self
                    .platform_tag
                    .clone()
                    .unwrap_or_else(|| String::from("any")),
                filename: filename.clone(),
            }],
            None => Vec::new(),
        }
    }
}

impl Manifest {
    /// Load a manifest from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse a manifest from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is invalid or validation fails.
    pub fn parse(content: &str) -> Result<Self, ManifestError> {
        let manifest: Self = serde_json::from_str(content)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Parse a manifest from raw bytes, as returned by the registry.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are invalid JSON or validation fails.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ManifestError> {
        let manifest: Self = serde_json::from_slice(bytes)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Look up a package entry by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PackageEntry> {
        self.packages.iter().find(|pkg| pkg.name == name)
    }

    /// Returns true if the manifest contains no packages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Returns the number of packages in the manifest.
    #[must_use]
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    /// Validate the manifest.
    fn validate(&self) -> Result<(), ManifestError> {
        let mut seen = BTreeSet::new();
        for pkg in &self.packages {
            validate_name(&pkg.name)?;
            if !seen.insert(pkg.name.as_str()) {
                return Err(ManifestError::DuplicateName(pkg.name.clone()));
            }
            if pkg.filename.is_none() && pkg.variants.is_empty() {
                return Err(ManifestError::NoArtifact(pkg.name.clone()));
            }
        }
        Ok(())
    }
}

/// Validate a package name.
fn validate_name(name: &str) -> Result<(), ManifestError> {
    if name.is_empty() {
        return Err(ManifestError::InvalidName(
            name.to_string(),
            "name cannot be empty",
        ));
    }

    if name.len() > 64 {
        return Err(ManifestError::InvalidName(
            name.to_string(),
            "name cannot exceed 64 characters",
        ));
    }

    // Must start with a letter
    if !name.chars().next().is_some_and(|c| c.is_ascii_alphabetic()) {
        return Err(ManifestError::InvalidName(
            name.to_string(),
            "name must start with a letter",
        ));
    }

    // Only alphanumeric, hyphens, and underscores
    for c in name.chars() {
        if !c.is_ascii_alphanumeric() && c != '-' && c != '_' {
            return Err(ManifestError::InvalidName(
                name.to_string(),
                "name can only contain letters, numbers, hyphens, and underscores",
            ));
        }
    }

    Ok(())
}

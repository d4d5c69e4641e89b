//! Dependency resolution for matpak packages.
//!
//! Resolution is a depth-first walk of the manifest's dependency graph
//! producing a linear install order in which every dependency precedes its
//! dependents and every reachable package appears exactly once.

use crate::manifest::Manifest;
use std::collections::BTreeSet;
use thiserror::Error;

/// Errors that can occur during dependency resolution.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// Circular dependency detected.
    #[error("circular dependency detected: {}", .cycle.join(" -> "))]
    CircularDependency { cycle: Vec<String> },

    /// Requested or referenced package absent from the manifest.
    #[error("package '{name}' not found in the registry manifest")]
    PackageNotFound { name: String },
}

/// Resolve a package to a dependencies-first install order.
///
/// The order is deterministic: for each package, the subtree of its first
/// listed dependency is fully emitted before the second dependency's subtree
/// begins, and the package itself comes last.
///
/// # Errors
///
/// Returns [`ResolveError::CircularDependency`] with the full chain when the
/// graph reachable from `requested` contains a cycle, or
/// [`ResolveError::PackageNotFound`] when a referenced name has no manifest
/// entry. No partial order is ever returned.
pub fn resolve(requested: &str, manifest: &Manifest) -> Result<Vec<String>, ResolveError> {
    let mut visited = BTreeSet::new();
    walk(requested, manifest, &mut visited, &[])
}

fn walk(
    name: &str,
    manifest: &Manifest,
    visited: &mut BTreeSet<String>,
    path: &[String],
) -> Result<Vec<String>, ResolveError> {
    // Cycle check runs against the current ancestry chain only
    if path.iter().any(|ancestor| ancestor == name) {
        let mut cycle = path.to_vec();
        cycle.push(name.to_string());
        return Err(ResolveError::CircularDependency { cycle });
    }

    // Already fully emitted by an earlier branch of this call
    if visited.contains(name) {
        return Ok(Vec::new());
    }

    let entry = manifest.get(name).ok_or_else(|| ResolveError::PackageNotFound {
        name: name.to_string(),
    })?;

    visited.insert(name.to_string());

    // Each recursive call receives its own copy of the ancestor path, so
    // sibling subtrees never see each other's abandoned chains
    let mut branch = Vec::with_capacity(path.len() + 1);
    branch.extend_from_slice(path);
    branch.push(name.to_string());

    let mut order = Vec::new();
    for dep in &entry.dependencies {
        order.extend(walk(dep, manifest, visited, &branch)?);
    }
    order.push(name.to_string());

    Ok(order)
}

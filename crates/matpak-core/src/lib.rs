//! Core library for the matpak MATLAB package manager.
//!
//! This crate provides:
//! - Parsing and validation of `packages.json` registry manifests
//! - Host platform detection and artifact variant selection
//! - Dependency resolution to a dependencies-first install order
//! - Install planning against the local package store
//! - A blocking registry client and the on-disk package store

mod manifest;
mod matlab;
mod plan;
mod platform;
mod registry;
mod resolve;
mod store;

pub use manifest::{Manifest, ManifestError, PackageEntry, Variant};
pub use matlab::{sync_integration, IntegrationError, MATLAB_DIR};
pub use plan::{artifact_for, plan, plan_uninstall, InstallPlan, PlanError, UninstallAction};
pub use platform::{compose_platform_tag, detect_platform_tag, is_compatible, select_best_variant};
pub use registry::{
    artifact_checksum, RegistryClient, RegistryConfig, RegistryError, DEFAULT_REGISTRY_URL,
};
pub use resolve::{resolve, ResolveError};
pub use store::{
    default_root, InstalledIndex, InstalledPackage, PackageStore, StoreError, INDEX_FILE,
    PACKAGES_DIR,
};

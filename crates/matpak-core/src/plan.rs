//! Install planning against the local package store state.
//!
//! Planning is a pure filter over a resolved install order: it never mutates
//! local state and never performs I/O. Variant selection for each planned
//! package happens per package in the sequential install loop, so a missing
//! platform build aborts the remaining plan without rolling back packages
//! installed earlier in the run.

use crate::manifest::{PackageEntry, Variant};
use crate::platform::select_best_variant;
use std::collections::BTreeSet;
use thiserror::Error;

/// Errors that can occur while planning an installation.
#[derive(Error, Debug)]
pub enum PlanError {
    /// No build of the package matches the host platform.
    #[error("no compatible build of '{package}' for platform '{host_tag}'")]
    NoCompatibleVariant { package: String, host_tag: String },
}

/// An ordered install plan computed against the local install state.
///
/// Dependencies strictly precede dependents in `to_install`; no name appears
/// twice. An empty plan is a valid outcome, not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallPlan {
    /// Names to install, dependencies first.
    pub to_install: Vec<String>,

    /// Names skipped because they are already present locally.
    pub skipped: Vec<String>,
}

impl InstallPlan {
    /// Returns true when there is nothing to install.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_install.is_empty()
    }

    /// Number of packages to install.
    #[must_use]
    pub fn len(&self) -> usize {
        self.to_install.len()
    }
}

/// The intended effect of an uninstall, computed before any confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UninstallAction {
    /// Name of the package whose directory would be removed.
    pub package: String,
}

/// Filter a resolved install order against the local install state.
///
/// Keeps only names not already installed, preserving relative order, and
/// reports the skipped names for user feedback. Local state is queried once,
/// here; it is never re-checked between sequential installs in the same run.
#[must_use]
pub fn plan(order: &[String], installed: &BTreeSet<String>) -> InstallPlan {
    let mut result = InstallPlan::default();
    for name in order {
        if installed.contains(name) {
            result.skipped.push(name.clone());
        } else {
            result.to_install.push(name.clone());
        }
    }
    result
}

/// Select the concrete artifact of a planned package for the host platform.
///
/// # Errors
///
/// Returns [`PlanError::NoCompatibleVariant`] when the entry has no build
/// compatible with `host_tag`. The caller treats this as fatal for the
/// remainder of the plan.
pub fn artifact_for(entry: &PackageEntry, host_tag: &str) -> Result<Variant, PlanError> {
    let variants = entry.variant_list();
    select_best_variant(&variants, host_tag)
        .cloned()
        .ok_or_else(|| PlanError::NoCompatibleVariant {
            package: entry.name.clone(),
            host_tag: host_tag.to_string(),
        })
}

/// Plan an uninstall without touching local state.
///
/// Returns `None` when the package is not installed. The interactive
/// confirmation gate belongs to the caller, never to the planner.
#[must_use]
pub fn plan_uninstall(name: &str, installed: &BTreeSet<String>) -> Option<UninstallAction> {
    installed.contains(name).then(|| UninstallAction {
        package: name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    fn installed(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    fn entry_with_variants(name: &str, tags: &[&str]) -> PackageEntry {
        PackageEntry {
            name: name.to_string(),
            version: String::from("1.0.0"),
            dependencies: Vec::new(),
            filename: None,
            platform_tag: None,
            variants: tags
                .iter()
                .map(|tag| Variant {
                    platform_tag: (*tag).to_string(),
                    filename: format!("{name}-1.0.0-{tag}.mlp"),
                })
                .collect(),
        }
    }

    #[test]
    fn plan_with_empty_state_keeps_everything() {
        let order = names(&["delta", "beta", "gamma", "alpha"]);
        let result = plan(&order, &BTreeSet::new());
        assert_eq!(result.to_install, order);
        assert!(result.skipped.is_empty());
    }

    #[test]
    fn plan_filters_installed_preserving_order() {
        let order = names(&["delta", "beta", "gamma", "alpha"]);
        let result = plan(&order, &installed(&["beta", "alpha"]));
        assert_eq!(result.to_install, names(&["delta", "gamma"]));
        assert_eq!(result.skipped, names(&["beta", "alpha"]));
    }

    #[test]
    fn plan_everything_installed_is_empty_not_error() {
        let order = names(&["alpha"]);
        let result = plan(&order, &installed(&["alpha"]));
        assert!(result.is_empty());
        assert_eq!(result.skipped, names(&["alpha"]));
    }

    #[test]
    fn plan_is_idempotent() {
        let order = names(&["delta", "beta", "gamma", "alpha"]);
        let state = installed(&["gamma"]);
        let once = plan(&order, &state);
        let twice = plan(&once.to_install, &state);
        assert_eq!(twice.to_install, once.to_install);
        assert!(twice.skipped.is_empty());
    }

    #[test]
    fn artifact_for_selects_host_build() {
        let entry = entry_with_variants("native-fft", &["any", "linux_x86_64"]);
        let variant = artifact_for(&entry, "linux_x86_64").unwrap();
        assert_eq!(variant.platform_tag, "linux_x86_64");
    }

    #[test]
    fn artifact_for_missing_build_is_fatal() {
        let entry = entry_with_variants("native-fft", &["win_amd64"]);
        let err = artifact_for(&entry, "linux_x86_64").unwrap_err();
        match err {
            PlanError::NoCompatibleVariant { package, host_tag } => {
                assert_eq!(package, "native-fft");
                assert_eq!(host_tag, "linux_x86_64");
            }
        }
    }

    #[test]
    fn artifact_for_single_artifact_entry() {
        let entry = PackageEntry {
            name: String::from("plotting"),
            version: String::from("0.4.1"),
            dependencies: Vec::new(),
            filename: Some(String::from("plotting-0.4.1.mlp")),
            platform_tag: None,
            variants: Vec::new(),
        };
        let variant = artifact_for(&entry, "linux_x86_64").unwrap();
        assert_eq!(variant.filename, "plotting-0.4.1.mlp");
    }

    #[test]
    fn plan_uninstall_installed_package() {
        let action = plan_uninstall("alpha", &installed(&["alpha", "beta"]));
        assert_eq!(
            action,
            Some(UninstallAction {
                package: String::from("alpha")
            })
        );
    }

    #[test]
    fn plan_uninstall_missing_package() {
        assert!(plan_uninstall("ghost", &installed(&["alpha"])).is_none());
    }
}

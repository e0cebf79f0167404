//! # Device Resolution
//!
//! Top-level orchestration: from a product identifier to a registered, synced
//! device tree with all of its dependencies.
//!
//! ## Modes
//!
//! - **Full resolution** looks the device up in the remote catalog, confirms
//!   its branch, registers the device tree in the device's overlay, syncs it,
//!   and walks its dependencies.
//! - **Dependencies only** assumes the device tree is already registered in
//!   the device's overlay and only walks its dependencies.
//!
//! ## Codename matching
//!
//! The catalog is searched for the first entry whose codename *starts with*
//! the derived codename: `foo` selects a `foo` entry, but also `foopro` if that
//! comes first in the catalog.

use log::info;
use regex::Regex;

use crate::branch::BranchResolver;
use crate::catalog::{DeviceDescriptor, RemoteCatalog, SupportedDevice};
use crate::config::Config;
use crate::dependencies::{DependencyWalker, WalkReport};
use crate::error::{Error, Result};
use crate::overlay::{LocalOverlayWriter, Registration};
use crate::sync::Synchronizer;

/// Terminal result of a resolution that did not fail.
#[derive(Debug)]
pub enum Outcome {
    /// The device tree was found in the catalog and processed.
    Resolved {
        device: DeviceDescriptor,
        registration: Registration,
        report: WalkReport,
    },
    /// Dependencies of an already registered device tree were processed.
    DependenciesResolved {
        codename: String,
        path: String,
        report: WalkReport,
    },
    /// Dependencies-only mode found no registered device tree.
    NothingToDo { codename: String },
    /// No catalog entry matches the codename.
    DeviceNotFound { codename: String },
}

impl Outcome {
    /// The dependency walk report, when a walk took place.
    pub fn report(&self) -> Option<&WalkReport> {
        match self {
            Outcome::Resolved { report, .. } | Outcome::DependenciesResolved { report, .. } => {
                Some(report)
            }
            Outcome::NothingToDo { .. } | Outcome::DeviceNotFound { .. } => None,
        }
    }
}

/// Derives the device codename from a product identifier.
///
/// A lunch-style suffix (`-userdebug`, `-ap2a-eng`, ...) is dropped first,
/// then everything up to and including the first `_`:
/// `lineage_foo-userdebug` gives `foo`. An identifier without `_` is the
/// codename itself.
pub fn device_codename(product: &str) -> &str {
    let product = product.split('-').next().unwrap_or(product);
    match product.split_once('_') {
        Some((_, codename)) => codename,
        None => product,
    }
}

/// Prefix pattern over catalog codenames.
#[derive(Debug, Clone)]
pub struct DevicePattern {
    regex: Regex,
}

impl DevicePattern {
    pub fn new(codename: &str) -> Result<Self> {
        Ok(Self {
            regex: Regex::new(&format!("^{}", regex::escape(codename)))?,
        })
    }

    pub fn matches(&self, codename: &str) -> bool {
        self.regex.is_match(codename)
    }

    /// First catalog entry whose codename matches.
    pub fn first_match<'d>(&self, devices: &'d [SupportedDevice]) -> Option<&'d SupportedDevice> {
        devices.iter().find(|device| self.matches(&device.codename))
    }
}

/// Resolves product identifiers against a catalog.
pub struct DeviceResolver<'a> {
    config: &'a Config,
    catalog: &'a dyn RemoteCatalog,
    sync: &'a dyn Synchronizer,
}

impl<'a> DeviceResolver<'a> {
    pub fn new(
        config: &'a Config,
        catalog: &'a dyn RemoteCatalog,
        sync: &'a dyn Synchronizer,
    ) -> Self {
        Self {
            config,
            catalog,
            sync,
        }
    }

    /// Resolves `product`. Remote, registration and device sync failures are
    /// returned as errors; dependency subtree failures are in the report.
    /// A product that yields an empty codename is rejected before anything
    /// is fetched or written.
    pub fn resolve(&self, product: &str, dependencies_only: bool) -> Result<Outcome> {
        let codename = device_codename(product);
        if codename.is_empty() {
            return Err(Error::Config {
                message: format!("cannot derive a device codename from product {:?}", product),
            });
        }
        let overlay = LocalOverlayWriter::for_device(self.config, codename);
        let branches = BranchResolver::new(self.catalog)
            .with_fallbacks(self.config.fallback_branches.clone());

        if dependencies_only {
            return self.resolve_dependencies_only(codename, &overlay, &branches);
        }

        info!("Device {} not found. Attempting to retrieve device repository.", codename);
        let devices = self.catalog.fetch_supported_devices()?;
        let pattern = DevicePattern::new(codename)?;
        let Some(entry) = pattern.first_match(&devices) else {
            return Ok(Outcome::DeviceNotFound {
                codename: codename.to_string(),
            });
        };
        info!("Found repository: {}", entry.codename);
        info!("Device manufacturer: {}", entry.manufacturer);

        let device = self
            .catalog
            .fetch_device_metadata(&entry.manufacturer, &entry.codename)?;
        let revision = branches.resolve(&device.repository, &device.revision)?;
        let registration =
            overlay.register(&device.repository, &device.checkout_path, &revision)?;

        info!("Syncing repository to retrieve project.");
        self.sync.sync(std::slice::from_ref(&device.checkout_path))?;
        info!("Repository synced!");

        let report = self
            .walker(&overlay, &branches)
            .walk(&device.checkout_path);

        Ok(Outcome::Resolved {
            device,
            registration,
            report,
        })
    }

    fn resolve_dependencies_only(
        &self,
        codename: &str,
        overlay: &LocalOverlayWriter,
        branches: &BranchResolver<'_>,
    ) -> Result<Outcome> {
        let Some(path) = find_device_tree(overlay, codename)? else {
            return Ok(Outcome::NothingToDo {
                codename: codename.to_string(),
            });
        };

        let report = self.walker(overlay, branches).walk(&path);
        Ok(Outcome::DependenciesResolved {
            codename: codename.to_string(),
            path,
            report,
        })
    }

    fn walker<'w>(
        &'w self,
        overlay: &'w LocalOverlayWriter,
        branches: &'w BranchResolver<'w>,
    ) -> DependencyWalker<'w> {
        DependencyWalker::new(
            self.config.layout(),
            &self.config.dependency_file,
            &self.config.default_revision,
            overlay,
            branches,
            self.sync,
        )
    }
}

/// Checkout path of the `android_device_<manufacturer>_<codename>` project
/// registered in the device's overlay, if any.
pub fn find_device_tree(overlay: &LocalOverlayWriter, codename: &str) -> Result<Option<String>> {
    let name = Regex::new(&format!("android_device_.*_{}$", regex::escape(codename)))?;
    Ok(overlay
        .load()
        .projects()
        .find(|project| name.is_match(&project.name))
        .map(|project| project.path))
}

//! # Local Overlay Writer
//!
//! Owns the per-device overlay `.repo/local_manifests/roomservice_<device>.xml`
//! and is the only code in the crate that writes a manifest.
//!
//! Registration is a full read-modify-write: load the overlay (or start from an
//! empty `<manifest/>`), append one project if the path is not claimed by any
//! trusted manifest, then commit the whole document. Re-registering a satisfied
//! path changes nothing on disk.

use std::path::{Path, PathBuf};

use log::info;

use crate::config::Config;
use crate::error::Result;
use crate::manifest::{ManifestDocument, ProjectEntry};
use crate::registry::PathRegistry;

/// What a call to [`LocalOverlayWriter::register`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    /// A new project was written to the overlay.
    Added(ProjectEntry),
    /// Some trusted manifest already checks a project out at this path.
    AlreadySatisfied,
}

/// Appends projects to one device's local overlay.
#[derive(Debug, Clone)]
pub struct LocalOverlayWriter {
    path: PathBuf,
    registry: PathRegistry,
    organization: String,
    remote_alias: String,
}

impl LocalOverlayWriter {
    pub fn new(
        path: PathBuf,
        registry: PathRegistry,
        organization: impl Into<String>,
        remote_alias: impl Into<String>,
    ) -> Self {
        Self {
            path,
            registry,
            organization: organization.into(),
            remote_alias: remote_alias.into(),
        }
    }

    /// Builds the writer for `device` from a configuration.
    pub fn for_device(config: &Config, device: &str) -> Self {
        let layout = config.layout();
        Self::new(
            layout.overlay(device),
            PathRegistry::new(layout),
            &config.organization,
            &config.remote_alias,
        )
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn registry(&self) -> &PathRegistry {
        &self.registry
    }

    /// Loads the overlay, treating a missing or malformed file as empty.
    pub fn load(&self) -> ManifestDocument {
        ManifestDocument::load_or_empty(&self.path)
    }

    /// Registers `repository` at `target_path` on `revision` unless the path is
    /// already claimed. Write failures are returned to the caller.
    pub fn register(
        &self,
        repository: &str,
        target_path: &str,
        revision: &str,
    ) -> Result<Registration> {
        let mut document = self.load();

        info!("Checking if {} is fetched from {}", target_path, repository);
        if self.registry.is_claimed(target_path) {
            info!(
                "{}/{} already fetched to {}",
                self.organization, repository, target_path
            );
            return Ok(Registration::AlreadySatisfied);
        }

        let entry = ProjectEntry::new(
            target_path,
            &self.remote_alias,
            format!("{}/{}", self.organization, repository),
            revision,
        );
        info!("Adding dependency: {} -> {}", entry.name, target_path);
        if !document.append(entry.clone())? {
            return Ok(Registration::AlreadySatisfied);
        }
        document.commit(&self.path)?;

        Ok(Registration::Added(entry))
    }
}

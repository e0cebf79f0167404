//! # Runtime Configuration
//!
//! `Config` gathers every knob the resolver needs: where the source tree
//! lives, where the remote catalog is, how projects are named, and which
//! fallback branches are acceptable. Values start from [`crate::defaults`] and
//! are overridden by CLI flags or their environment variables.
//!
//! `TreeLayout` derives every on-disk location from the tree root:
//!
//! ```text
//! <root>/.repo/manifest.xml                      root manifest (or include stub)
//! <root>/.repo/manifests/<include name>          included root manifest
//! <root>/.repo/manifests/los-additional.xml      supplementary snippet
//! <root>/.repo/local_manifests/*.xml             local overlays
//! <root>/.repo/local_manifests/roomservice_<device>.xml
//! ```

use std::path::{Path, PathBuf};

use crate::defaults;
use crate::error::{Error, Result};

/// Resolver configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Root of the source tree (the directory containing `.repo`).
    pub tree_root: PathBuf,
    pub supported_devices_url: String,
    pub device_manifest_base_url: String,
    pub branches_api_base_url: String,
    pub organization: String,
    pub remote_alias: String,
    pub default_revision: String,
    /// Branches accepted, in order, when `default_revision` is missing.
    /// Empty means no fallback is ever taken.
    pub fallback_branches: Vec<String>,
    pub dependency_file: String,
    pub supplementary_manifest: String,
    pub overlay_prefix: String,
    pub sync_program: String,
    pub sync_jobs: usize,
    /// Token forwarded to the catalog's HTTP requests.
    pub github_token: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tree_root: PathBuf::from("."),
            supported_devices_url: defaults::SUPPORTED_DEVICES_URL.to_string(),
            device_manifest_base_url: defaults::DEVICE_MANIFEST_BASE_URL.to_string(),
            branches_api_base_url: defaults::BRANCHES_API_BASE_URL.to_string(),
            organization: defaults::ORGANIZATION.to_string(),
            remote_alias: defaults::REMOTE_ALIAS.to_string(),
            default_revision: defaults::DEFAULT_REVISION.to_string(),
            fallback_branches: Vec::new(),
            dependency_file: defaults::DEPENDENCY_FILE.to_string(),
            supplementary_manifest: defaults::SUPPLEMENTARY_MANIFEST.to_string(),
            overlay_prefix: defaults::OVERLAY_PREFIX.to_string(),
            sync_program: defaults::SYNC_PROGRAM.to_string(),
            sync_jobs: defaults::default_sync_jobs(),
            github_token: None,
        }
    }
}

impl Config {
    /// Checks the configuration before anything is read or written.
    pub fn validate(&self) -> Result<()> {
        if !self.tree_root.is_dir() {
            return Err(Error::Config {
                message: format!("tree root {} is not a directory", self.tree_root.display()),
            });
        }

        let required = [
            ("default revision", &self.default_revision),
            ("organization", &self.organization),
            ("remote alias", &self.remote_alias),
            ("dependency file", &self.dependency_file),
            ("sync program", &self.sync_program),
        ];
        if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(Error::Config {
                message: format!("{} must not be empty", field),
            });
        }

        Ok(())
    }

    /// Returns the on-disk layout for this configuration.
    pub fn layout(&self) -> TreeLayout {
        TreeLayout {
            root: self.tree_root.clone(),
            supplementary_manifest: self.supplementary_manifest.clone(),
            overlay_prefix: self.overlay_prefix.clone(),
        }
    }
}

/// Parses a whitespace separated branch list such as the value of
/// `ROOMSERVICE_BRANCHES`. Empty items are ignored.
pub fn parse_branch_list(value: &str) -> Vec<String> {
    value.split_whitespace().map(str::to_string).collect()
}

/// Paths inside a source tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeLayout {
    root: PathBuf,
    supplementary_manifest: String,
    overlay_prefix: String,
}

impl TreeLayout {
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute location of a checkout path as written in a manifest.
    pub fn checkout(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }

    pub fn repo_dir(&self) -> PathBuf {
        self.root.join(".repo")
    }

    pub fn manifests_dir(&self) -> PathBuf {
        self.repo_dir().join("manifests")
    }

    pub fn local_manifests_dir(&self) -> PathBuf {
        self.repo_dir().join("local_manifests")
    }

    /// Glob pattern matching every local overlay.
    pub fn local_manifests_pattern(&self) -> String {
        self.local_manifests_dir()
            .join("*.xml")
            .to_string_lossy()
            .into_owned()
    }

    pub fn root_manifest(&self) -> PathBuf {
        self.repo_dir().join("manifest.xml")
    }

    pub fn included_manifest(&self, name: &str) -> PathBuf {
        self.manifests_dir().join(name)
    }

    pub fn supplementary_manifest(&self) -> PathBuf {
        self.manifests_dir().join(&self.supplementary_manifest)
    }

    /// The overlay owned by this tool for `device`.
    pub fn overlay(&self, device: &str) -> PathBuf {
        self.local_manifests_dir()
            .join(format!("{}{}.xml", self.overlay_prefix, device))
    }
}

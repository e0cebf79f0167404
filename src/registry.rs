//! # Path Registry
//!
//! Answers one question: is a checkout path already claimed by a manifest the
//! tree trusts? Three sources are consulted, in order:
//!
//! 1. every local overlay in `.repo/local_manifests/*.xml`,
//! 2. the active root manifest, which is either `.repo/manifest.xml` itself
//!    (when it declares a top-level `<default>`) or the file its `<include>`
//!    points to under `.repo/manifests/`,
//! 3. the supplementary snippet under `.repo/manifests/`.
//!
//! Each source is read fresh on every lookup so entries written earlier in the
//! same run are seen. A source that is missing or malformed contributes no
//! projects.

use std::path::PathBuf;

use log::{debug, warn};

use crate::config::TreeLayout;
use crate::manifest::ManifestDocument;

/// Duplicate-path detection over the trusted manifests of a tree.
#[derive(Debug, Clone)]
pub struct PathRegistry {
    layout: TreeLayout,
}

impl PathRegistry {
    pub fn new(layout: TreeLayout) -> Self {
        Self { layout }
    }

    /// Returns true as soon as one trusted manifest has a project at `path`.
    pub fn is_claimed(&self, path: &str) -> bool {
        if let Some(source) = self.local_overlays().into_iter().find(|overlay| {
            ManifestDocument::load_or_empty(overlay).contains_path(path)
        }) {
            debug!("{} is claimed by {}", path, source.display());
            return true;
        }

        if let Some(root) = self.active_root_manifest() {
            if ManifestDocument::load_or_empty(&root).contains_path(path) {
                debug!("{} is claimed by {}", path, root.display());
                return true;
            }
        }

        let snippet = self.layout.supplementary_manifest();
        if ManifestDocument::load_or_empty(&snippet).contains_path(path) {
            debug!("{} is claimed by {}", path, snippet.display());
            return true;
        }

        false
    }

    /// Local overlay files, sorted by name.
    fn local_overlays(&self) -> Vec<PathBuf> {
        let pattern = self.layout.local_manifests_pattern();
        match glob::glob(&pattern) {
            Ok(paths) => {
                let mut overlays: Vec<PathBuf> = paths.filter_map(|entry| entry.ok()).collect();
                overlays.sort();
                overlays
            }
            Err(err) => {
                warn!("Ignoring local manifests, bad pattern {}: {}", pattern, err);
                Vec::new()
            }
        }
    }

    /// Follows the `.repo/manifest.xml` indirection. Returns `None` when the
    /// root manifest cannot be read or names no include.
    pub fn active_root_manifest(&self) -> Option<PathBuf> {
        let stub = self.layout.root_manifest();
        let document = match ManifestDocument::load(&stub) {
            Ok(document) => document,
            Err(err) => {
                debug!("No usable root manifest at {}: {}", stub.display(), err);
                return None;
            }
        };

        if document.has_default() {
            return Some(stub);
        }
        document
            .include_name()
            .map(|name| self.layout.included_manifest(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn registry(root: &Path) -> PathRegistry {
        let config = Config {
            tree_root: root.to_path_buf(),
            ..Config::default()
        };
        PathRegistry::new(config.layout())
    }

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_empty_tree_claims_nothing() {
        let temp = TempDir::new().unwrap();
        assert!(!registry(temp.path()).is_claimed("device/xiaomi/foo"));
    }

    #[test]
    fn test_claimed_by_any_local_overlay() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            ".repo/local_manifests/other.xml",
            r#"<manifest><project path="vendor/xiaomi" name="TheMuppets/vendor_xiaomi" /></manifest>"#,
        );
        let registry = registry(temp.path());
        assert!(registry.is_claimed("vendor/xiaomi"));
        assert!(!registry.is_claimed("vendor/xiaomi/foo"));
    }

    #[test]
    fn test_claimed_by_direct_root_manifest() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            ".repo/manifest.xml",
            r#"<manifest><default revision="main" remote="aosp" /><project path="build/make" name="platform/build" /></manifest>"#,
        );
        let registry = registry(temp.path());
        assert_eq!(
            registry.active_root_manifest(),
            Some(temp.path().join(".repo/manifest.xml"))
        );
        assert!(registry.is_claimed("build/make"));
    }

    #[test]
    fn test_claimed_by_included_root_manifest() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            ".repo/manifest.xml",
            r#"<manifest><include name="default.xml" /></manifest>"#,
        );
        write(
            temp.path(),
            ".repo/manifests/default.xml",
            r#"<manifest><default revision="main" /><project path="hardware/qcom" name="hw_qcom" /></manifest>"#,
        );
        let registry = registry(temp.path());
        assert_eq!(
            registry.active_root_manifest(),
            Some(temp.path().join(".repo/manifests/default.xml"))
        );
        assert!(registry.is_claimed("hardware/qcom"));
    }

    #[test]
    fn test_claimed_by_supplementary_snippet() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            ".repo/manifests/los-additional.xml",
            r#"<manifest><project path="packages/apps/Updater" name="lineage_updater" /></manifest>"#,
        );
        assert!(registry(temp.path()).is_claimed("packages/apps/Updater"));
    }

    #[test]
    fn test_malformed_sources_are_treated_as_empty() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), ".repo/local_manifests/broken.xml", "<manifest><project");
        write(temp.path(), ".repo/manifest.xml", "not xml at all");
        write(temp.path(), ".repo/manifests/los-additional.xml", "<manifest>");
        write(
            temp.path(),
            ".repo/local_manifests/good.xml",
            r#"<manifest><project path="kernel/x" name="kernel_x" /></manifest>"#,
        );
        let registry = registry(temp.path());
        assert_eq!(registry.active_root_manifest(), None);
        assert!(registry.is_claimed("kernel/x"));
        assert!(!registry.is_claimed("kernel/y"));
    }

    #[test]
    fn test_missing_include_is_treated_as_empty() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), ".repo/manifest.xml", "<manifest />");
        let registry = registry(temp.path());
        assert_eq!(registry.active_root_manifest(), None);
        assert!(!registry.is_claimed("anything"));
    }
}

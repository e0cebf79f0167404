//! # Dependency Declarations and Traversal
//!
//! A checkout may carry a dependency declaration (`xid.dependencies` by
//! default): a JSON array of
//!
//! ```json
//! [{ "repository": "android_kernel_xiaomi_foo", "target_path": "kernel/xiaomi/foo", "branch": "thirteen" }]
//! ```
//!
//! where `branch` is optional. `DependencyWalker` reads these declarations,
//! registers whatever is not yet claimed, syncs the new and the missing
//! checkouts in one batch, and then descends into every declared dependency.
//!
//! ## Traversal rules
//!
//! - Dependencies are handled in declaration order.
//! - A dependency already claimed by a trusted manifest is not registered
//!   again, but it is still descended into.
//! - The sync for a batch happens before descending into any of its members,
//!   so a dependency's own declaration is read after its checkout exists.
//! - Each checkout path is walked at most once per walker, which keeps cyclic
//!   declarations from looping.
//! - A failure aborts only the subtree it happened in. It is recorded in the
//!   `WalkReport` and sibling subtrees carry on; registrations that already
//!   happened are kept.

use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use log::{debug, error, info, warn};
use serde::Deserialize;

use crate::branch::BranchResolver;
use crate::config::TreeLayout;
use crate::error::{Error, Result};
use crate::manifest::ProjectEntry;
use crate::overlay::{LocalOverlayWriter, Registration};
use crate::sync::Synchronizer;

/// One entry of a dependency declaration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DependencyDeclaration {
    /// Repository name under the organization.
    pub repository: String,
    /// Checkout path relative to the tree root.
    pub target_path: String,
    /// Pinned branch; resolved against the remote when absent.
    #[serde(default)]
    pub branch: Option<String>,
}

/// Parses declaration content. `origin` is only used for error messages.
pub fn parse_declarations(content: &str, origin: &Path) -> Result<Vec<DependencyDeclaration>> {
    serde_json::from_str(content).map_err(|err| Error::DeclarationMalformed {
        path: origin.to_path_buf(),
        message: err.to_string(),
    })
}

/// Reads the declaration at `path`. A missing or unreadable file yields
/// `None`; content that does not parse is an error.
pub fn read_declarations(path: &Path) -> Result<Option<Vec<DependencyDeclaration>>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            warn!("Ignoring unreadable {}: {}", path.display(), err);
            return Ok(None);
        }
    };
    parse_declarations(&content, path).map(Some)
}

/// A subtree whose processing was aborted.
#[derive(Debug)]
pub struct SubtreeFailure {
    /// Checkout path whose declaration was being processed.
    pub path: String,
    pub error: Error,
}

/// Everything a walk did.
#[derive(Debug, Default)]
pub struct WalkReport {
    /// Projects newly written to the overlay, in order.
    pub registered: Vec<ProjectEntry>,
    /// Paths handed to the synchronizer, in order.
    pub synced: Vec<String>,
    /// Checkout paths whose declarations were looked up, in order.
    pub walked: Vec<String>,
    pub failures: Vec<SubtreeFailure>,
}

impl WalkReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Recursive resolver for dependency declarations.
pub struct DependencyWalker<'a> {
    layout: TreeLayout,
    dependency_file: String,
    default_revision: String,
    overlay: &'a LocalOverlayWriter,
    branches: &'a BranchResolver<'a>,
    sync: &'a dyn Synchronizer,
    visited: HashSet<String>,
}

impl<'a> DependencyWalker<'a> {
    pub fn new(
        layout: TreeLayout,
        dependency_file: impl Into<String>,
        default_revision: impl Into<String>,
        overlay: &'a LocalOverlayWriter,
        branches: &'a BranchResolver<'a>,
        sync: &'a dyn Synchronizer,
    ) -> Self {
        Self {
            layout,
            dependency_file: dependency_file.into(),
            default_revision: default_revision.into(),
            overlay,
            branches,
            sync,
            visited: HashSet::new(),
        }
    }

    /// Walks the dependency tree rooted at `repository_path`.
    pub fn walk(&mut self, repository_path: &str) -> WalkReport {
        let mut report = WalkReport::default();
        self.walk_into(repository_path, &mut report);
        report
    }

    fn walk_into(&mut self, path: &str, report: &mut WalkReport) {
        if !self.visited.insert(path.to_string()) {
            debug!("{} was already walked", path);
            return;
        }
        report.walked.push(path.to_string());

        match self.process(path, report) {
            Ok(children) => {
                for child in children {
                    self.walk_into(&child, report);
                }
            }
            Err(error) => {
                error!("Aborting dependencies of {}: {}", path, error);
                report.failures.push(SubtreeFailure {
                    path: path.to_string(),
                    error,
                });
            }
        }
    }

    /// Handles the declaration inside `path` and returns the dependencies to
    /// descend into.
    fn process(&mut self, path: &str, report: &mut WalkReport) -> Result<Vec<String>> {
        info!("Looking for dependencies in {}", path);
        let declaration = self.layout.checkout(path).join(&self.dependency_file);
        let Some(dependencies) = read_declarations(&declaration)? else {
            info!("{} has no additional dependencies.", path);
            return Ok(Vec::new());
        };

        let mut to_sync: Vec<String> = Vec::new();
        let mut to_walk = Vec::with_capacity(dependencies.len());

        for dependency in dependencies {
            let target = dependency.target_path;

            if !self.overlay.registry().is_claimed(&target) {
                let revision = match dependency.branch {
                    Some(branch) => branch,
                    None => self
                        .branches
                        .resolve(&dependency.repository, &self.default_revision)?,
                };
                if let Registration::Added(entry) =
                    self.overlay
                        .register(&dependency.repository, &target, &revision)?
                {
                    report.registered.push(entry);
                }
                push_unique(&mut to_sync, &target);
            }

            if !self.layout.checkout(&target).is_dir() {
                push_unique(&mut to_sync, &target);
            }

            to_walk.push(target);
        }

        if !to_sync.is_empty() {
            info!("Syncing dependencies of {}", path);
            self.sync.sync(&to_sync)?;
            report.synced.extend(to_sync);
        }

        Ok(to_walk)
    }
}

fn push_unique(paths: &mut Vec<String>, path: &str) {
    if !paths.iter().any(|existing| existing == path) {
        paths.push(path.to_string());
    }
}

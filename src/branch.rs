//! # Branch Resolution
//!
//! Confirms that the revision a repository is about to be registered on exists
//! on the remote. The branch list is fetched on every call; remote state may
//! change between invocations, so nothing is cached.
//!
//! When the preferred revision is missing, the only branches that may be used
//! instead are those in the explicit fallback allow-list, tried in order. With
//! an empty list the resolver refuses and reports every branch it saw.

use log::{info, warn};

use crate::catalog::RemoteCatalog;
use crate::error::{Error, Result};

/// Checks revisions against a remote catalog.
pub struct BranchResolver<'a> {
    catalog: &'a dyn RemoteCatalog,
    fallbacks: Vec<String>,
}

impl<'a> BranchResolver<'a> {
    /// A resolver that never substitutes a branch.
    pub fn new(catalog: &'a dyn RemoteCatalog) -> Self {
        Self {
            catalog,
            fallbacks: Vec::new(),
        }
    }

    /// Allows `fallbacks`, in order, when the preferred revision is missing.
    pub fn with_fallbacks(mut self, fallbacks: Vec<String>) -> Self {
        self.fallbacks = fallbacks;
        self
    }

    /// Returns `preferred` if the remote has it, otherwise the first allowed
    /// fallback the remote has, otherwise `Error::RevisionNotFound`.
    pub fn resolve(&self, repository: &str, preferred: &str) -> Result<String> {
        info!("Checking branch info for {} (wanted: {})", repository, preferred);
        let branches = self.catalog.fetch_branches(repository)?;

        if branches.contains(preferred) {
            return Ok(preferred.to_string());
        }

        if let Some(fallback) = self
            .fallbacks
            .iter()
            .find(|fallback| branches.contains(fallback))
        {
            warn!(
                "Revision {} not found in {}, using fallback branch {}",
                preferred, repository, fallback
            );
            return Ok(fallback.clone());
        }

        Err(Error::RevisionNotFound {
            repository: repository.to_string(),
            revision: preferred.to_string(),
            branches: branches.names().to_vec(),
        })
    }
}

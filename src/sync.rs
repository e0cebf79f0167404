//! # Checkout Synchronization
//!
//! Materializing checkouts is delegated to the repo tool. The resolver only
//! sees the `Synchronizer` trait: hand it a batch of checkout paths, get back
//! success or failure. `RepoSync` is the implementation that shells out to
//! `repo sync`; tests substitute a recording fake.

use std::path::PathBuf;
use std::process::Command;

use log::info;

use crate::config::Config;
use crate::error::{Error, Result};

/// Trait for checkout synchronization - allows faking in tests
pub trait Synchronizer {
    /// Synchronizes every path in `paths` in one invocation.
    fn sync(&self, paths: &[String]) -> Result<()>;
}

/// Runs `repo sync --force-sync -j<jobs> <paths...>` in the tree root.
///
/// This uses the system `repo` command, so credentials and mirrors configured
/// for the tree apply unchanged.
#[derive(Debug, Clone)]
pub struct RepoSync {
    program: String,
    tree_root: PathBuf,
    jobs: usize,
}

impl RepoSync {
    pub fn new(program: impl Into<String>, tree_root: PathBuf, jobs: usize) -> Self {
        Self {
            program: program.into(),
            tree_root,
            jobs: jobs.max(1),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.sync_program, config.tree_root.clone(), config.sync_jobs)
    }

    /// Arguments passed to the sync program for `paths`.
    pub fn args(&self, paths: &[String]) -> Vec<String> {
        let mut args = vec![
            "sync".to_string(),
            "--force-sync".to_string(),
            format!("-j{}", self.jobs),
        ];
        args.extend(paths.iter().cloned());
        args
    }
}

impl Synchronizer for RepoSync {
    fn sync(&self, paths: &[String]) -> Result<()> {
        if paths.is_empty() {
            return Ok(());
        }

        info!("Syncing {}", paths.join(" "));
        let status = Command::new(&self.program)
            .args(self.args(paths))
            .current_dir(&self.tree_root)
            .status()
            .map_err(|e| Error::SyncFailed {
                paths: paths.to_vec(),
                message: format!("could not run {}: {}", self.program, e),
            })?;

        if !status.success() {
            return Err(Error::SyncFailed {
                paths: paths.to_vec(),
                message: format!("{} exited with {}", self.program, status),
            });
        }

        Ok(())
    }
}

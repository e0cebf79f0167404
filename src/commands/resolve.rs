//! Resolve command implementation
//!
//! Resolves a product identifier into a registered device tree plus its
//! dependencies:
//! 1. Look the device up in the remote catalog (skipped in dependencies-only mode)
//! 2. Confirm its branch and register it in the device overlay
//! 3. Sync the device tree
//! 4. Walk, register and sync its declared dependencies

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;

use roomservice::catalog::HttpCatalog;
use roomservice::config::{parse_branch_list, Config};
use roomservice::dependencies::WalkReport;
use roomservice::device::{DeviceResolver, Outcome};
use roomservice::output::{emoji, OutputConfig};
use roomservice::overlay::Registration;
use roomservice::sync::RepoSync;

/// Arguments for the resolve command
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Product to resolve, e.g. `lineage_foo` or `lineage_foo-userdebug`
    #[arg(value_name = "PRODUCT")]
    pub product: String,

    /// Any value selects dependencies-only mode for an existing device tree
    #[arg(value_name = "DEPSONLY")]
    pub depsonly: Option<String>,

    /// Root of the source tree (the directory containing .repo)
    #[arg(long, value_name = "PATH", env = "ROOMSERVICE_TREE_ROOT", default_value = ".")]
    pub tree_root: PathBuf,

    /// Branch expected on every repository
    #[arg(long, value_name = "BRANCH", env = "ROOMSERVICE_DEFAULT_REVISION")]
    pub default_revision: Option<String>,

    /// Space separated fallback branches, tried in order when the default is missing
    #[arg(long, value_name = "BRANCHES", env = "ROOMSERVICE_BRANCHES")]
    pub branches: Option<String>,

    /// Parallel jobs passed to the sync command
    #[arg(short, long, value_name = "N", env = "ROOMSERVICE_JOBS")]
    pub jobs: Option<usize>,

    /// Token sent with catalog requests
    #[arg(long, value_name = "TOKEN", env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Program used to sync checkouts
    #[arg(long, value_name = "PROGRAM", env = "ROOMSERVICE_SYNC_PROGRAM", hide = true)]
    pub sync_program: Option<String>,
}

impl ResolveArgs {
    /// Builds the library configuration from defaults and these arguments.
    pub fn to_config(&self) -> Config {
        let mut config = Config {
            tree_root: self.tree_root.clone(),
            github_token: self.github_token.clone().filter(|t| !t.is_empty()),
            ..Config::default()
        };
        if let Some(revision) = &self.default_revision {
            config.default_revision = revision.clone();
        }
        if let Some(branches) = &self.branches {
            config.fallback_branches = parse_branch_list(branches);
        }
        if let Some(jobs) = self.jobs {
            config.sync_jobs = jobs;
        }
        if let Some(program) = &self.sync_program {
            config.sync_program = program.clone();
        }
        config
    }
}

/// Execute the resolve command
pub fn execute(args: ResolveArgs, output: &OutputConfig) -> Result<()> {
    let config = args.to_config();
    config.validate()?;
    let layout = config.layout();
    fs::create_dir_all(layout.local_manifests_dir())?;

    let catalog = HttpCatalog::from_config(&config)?;
    let sync = RepoSync::from_config(&config);
    let resolver = DeviceResolver::new(&config, &catalog, &sync);

    let outcome = match resolver.resolve(&args.product, args.depsonly.is_some()) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("{} Resolution failed", emoji(output, "❌", "[FAIL]"));
            return Err(e.into());
        }
    };

    match &outcome {
        Outcome::Resolved {
            device,
            registration,
            ..
        } => {
            let verb = match registration {
                Registration::Added(_) => "Added",
                Registration::AlreadySatisfied => "Already present",
            };
            println!(
                "{} {}: {}/{} -> {}",
                emoji(output, "📦", "[DEVICE]"),
                verb,
                config.organization,
                device.repository,
                device.checkout_path
            );
        }
        Outcome::DependenciesResolved { path, .. } => {
            println!(
                "{} Resolving dependencies of {}",
                emoji(output, "🔍", "[DEPS]"),
                path
            );
        }
        Outcome::NothingToDo { codename } => {
            println!(
                "{}",
                output.warning(&format!(
                    "Trying dependencies-only mode on a non-existing device tree? No device tree for {} in {}",
                    codename,
                    layout.overlay(codename).display()
                ))
            );
            return Ok(());
        }
        Outcome::DeviceNotFound { codename } => {
            println!(
                "{}",
                output.warning(&format!(
                    "Repository for {} not found in the repository list. If this is in error, you may need to manually add it to {}.",
                    codename,
                    layout.overlay(codename).display()
                ))
            );
            return Ok(());
        }
    }

    match outcome.report() {
        Some(report) => summarize(report, output),
        None => Ok(()),
    }
}

fn summarize(report: &WalkReport, output: &OutputConfig) -> Result<()> {
    for entry in &report.registered {
        println!(
            "   {} {} -> {}",
            emoji(output, "➕", "+"),
            entry.name,
            entry.path
        );
    }
    if !report.synced.is_empty() {
        println!("   {} paths synced", report.synced.len());
    }

    if report.is_success() {
        println!("{}", output.success(&format!("{} Done", emoji(output, "✅", "[OK]"))));
        return Ok(());
    }

    for failure in &report.failures {
        eprintln!(
            "{}",
            output.failure(&format!(
                "{} Dependencies of {} were not resolved: {}",
                emoji(output, "❌", "[FAIL]"),
                failure.path,
                failure.error
            ))
        );
    }
    bail!(
        "{} dependency subtree(s) could not be resolved",
        report.failures.len()
    )
}

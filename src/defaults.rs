//! Default values for roomservice configuration.
//!
//! This module provides centralized default values used by [`crate::config`]
//! and the CLI, ensuring consistency and avoiding duplication.

/// Remote document listing every supported device.
pub const SUPPORTED_DEVICES_URL: &str =
    "https://raw.githubusercontent.com/X-ID-Rom/devices/main/supported.xml";

/// Base for per-device documents, `<base><manufacturer>/<codename>.xml`.
pub const DEVICE_MANIFEST_BASE_URL: &str =
    "https://raw.githubusercontent.com/X-ID-Rom/devices/main/devices/";

/// Base for the branch listing API, `<base><organization>/<repository>/branches`.
pub const BRANCHES_API_BASE_URL: &str = "https://api.github.com/repos/";

/// Organization every registered repository is namespaced under.
pub const ORGANIZATION: &str = "X-ID-Rom";

/// Remote alias written into every registered project.
pub const REMOTE_ALIAS: &str = "github";

/// Branch expected on every repository unless a declaration pins one.
pub const DEFAULT_REVISION: &str = "thirteen";

/// Dependency declaration file looked up inside each checkout.
pub const DEPENDENCY_FILE: &str = "xid.dependencies";

/// Supplementary manifest snippet under `.repo/manifests/`.
pub const SUPPLEMENTARY_MANIFEST: &str = "los-additional.xml";

/// Prefix of the per-device overlay file name.
pub const OVERLAY_PREFIX: &str = "roomservice_";

/// Program invoked to materialize checkouts.
pub const SYNC_PROGRAM: &str = "repo";

/// Returns the default number of parallel sync jobs.
///
/// Uses the available parallelism of the host, falling back to a single job
/// when it cannot be determined.
pub fn default_sync_jobs() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

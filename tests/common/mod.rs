//! Shared test utilities for E2E tests.
//!
//! ## Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let tree = TreeFixture::new().with_device_tree("foo", "device/xiaomi/foo");
//!     // ... test code
//! }
//! ```

use assert_fs::prelude::*;
use assert_fs::TempDir;
use std::path::Path;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    pub use predicates::prelude::*;

    pub use super::TreeFixture;
}

/// A source tree in a temporary directory.
pub struct TreeFixture {
    pub temp: TempDir,
}

#[allow(dead_code)]
impl TreeFixture {
    pub fn new() -> Self {
        Self {
            temp: TempDir::new().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    /// Registers `android_device_xiaomi_<codename>` at `path` in the device's
    /// overlay and creates the checkout directory.
    pub fn with_device_tree(self, codename: &str, path: &str) -> Self {
        self.temp
            .child(format!(".repo/local_manifests/roomservice_{}.xml", codename))
            .write_str(&format!(
                "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<manifest>\n  <project path=\"{}\" remote=\"github\" name=\"X-ID-Rom/android_device_xiaomi_{}\" revision=\"thirteen\"/>\n</manifest>\n",
                path, codename
            ))
            .unwrap();
        self.temp.child(path).create_dir_all().unwrap();
        self
    }

    /// Writes a dependency declaration into the checkout at `path`.
    pub fn with_declaration(self, path: &str, content: &str) -> Self {
        self.temp
            .child(path)
            .child("xid.dependencies")
            .write_str(content)
            .unwrap();
        self
    }

    pub fn overlay(&self, codename: &str) -> String {
        std::fs::read_to_string(
            self.path()
                .join(format!(".repo/local_manifests/roomservice_{}.xml", codename)),
        )
        .unwrap()
    }
}

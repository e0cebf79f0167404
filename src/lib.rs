//! # roomservice
//!
//! Resolves device repositories and their dependencies into a local manifest
//! overlay of a repo-managed source tree, then has the repo tool check them
//! out.
//!
//! ## Quick Example
//!
//! ```
//! use roomservice::manifest::{ManifestDocument, ProjectEntry};
//!
//! let mut overlay = ManifestDocument::new();
//! overlay.append(ProjectEntry::new(
//!     "device/xiaomi/foo",
//!     "github",
//!     "X-ID-Rom/android_device_xiaomi_foo",
//!     "thirteen",
//! ))?;
//!
//! // The same path is never added twice.
//! assert!(!overlay.append(ProjectEntry::new("device/xiaomi/foo", "github", "other", "main"))?);
//! assert!(overlay.to_xml_string()?.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<manifest>"));
//! # Ok::<(), roomservice::error::Error>(())
//! ```
//!
//! ## Core Concepts
//!
//! - **Manifests (`manifest`)**: manifest documents that are loaded,
//!   appended to in memory, and committed as a whole.
//! - **Duplicate detection (`registry`)**: whether a checkout path is already
//!   claimed by a local overlay, the root manifest, or the supplementary
//!   snippet.
//! - **Registration (`overlay`)**: idempotent appends to the per-device
//!   overlay.
//! - **Remote data (`catalog`, `xml`, `branch`)**: device catalog lookups and branch
//!   existence checks, with an explicit fallback allow-list.
//! - **Checkout (`sync`)**: the repo tool, behind the `Synchronizer` trait.
//! - **Traversal (`dependencies`, `device`)**: recursive dependency walking
//!   and the top-level device resolution.
//!
//! ## Execution Flow
//!
//! 1.  Derive the device codename from the product identifier.
//! 2.  Find the device in the remote catalog and fetch its metadata.
//! 3.  Confirm its branch, register it, and sync it.
//! 4.  Walk its dependency declaration: register unclaimed dependencies, sync
//!     the batch, then descend into every dependency.

pub mod branch;
pub mod catalog;
pub mod config;
pub mod defaults;
pub mod dependencies;
pub mod device;
pub mod error;
pub mod manifest;
pub mod output;
pub mod overlay;
pub mod registry;
pub mod sync;
pub mod xml;

#[cfg(test)]
mod manifest_proptest;
#[cfg(test)]
mod testing;

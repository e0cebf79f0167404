//! # Error Handling
//!
//! This module defines the centralized error type for `roomservice`. It uses
//! the `thiserror` library to create an `Error` enum covering every failure
//! mode of manifest resolution, each carrying enough context (URL, repository,
//! path) for an operator to act on the message.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum for all failures within the library.
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! Two conditions that look like failures are deliberately *not* errors:
//! an unmatched device is reported as `device::Outcome::DeviceNotFound`, and a
//! path that is already registered is reported as
//! `overlay::Registration::AlreadySatisfied`.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for roomservice operations
#[derive(Error, Debug)]
pub enum Error {
    /// The remote catalog could not be reached, or answered with an error status.
    #[error("Failed to fetch {url}: {message}")]
    RemoteUnavailable { url: String, message: String },

    /// The remote catalog answered, but the document could not be understood.
    #[error("Failed to parse data returned by {url}: {message}")]
    RemoteDataMalformed { url: String, message: String },

    /// The preferred revision does not exist on the remote and no allowed
    /// fallback was found either.
    #[error(
        "Revision {revision} not found in {repository}. Branches found: [{}]\n  hint: set ROOMSERVICE_BRANCHES to a space separated list of fallback branches",
        branches.join(", ")
    )]
    RevisionNotFound {
        repository: String,
        revision: String,
        branches: Vec<String>,
    },

    /// A dependency declaration exists but is not a valid list of dependencies.
    #[error("Malformed dependency declaration {}: {message}", path.display())]
    DeclarationMalformed { path: PathBuf, message: String },

    /// A manifest could not be parsed as XML.
    #[error("Manifest parsing error in {}: {message}", path.display())]
    ManifestParse { path: PathBuf, message: String },

    /// The external synchronization command failed.
    #[error("Sync failed for {}: {message}", paths.join(" "))]
    SyncFailed { paths: Vec<String>, message: String },

    /// Invalid runtime configuration.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A manifest tree could not be edited or written, wrapped from `xot::Error`.
    #[error("XML error: {0}")]
    Xml(#[from] xot::Error),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// A URL parsing error, wrapped from `url::ParseError`.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

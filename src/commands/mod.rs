//! # CLI Command Implementations
//!
//! Each command module contains:
//! - An `Args` struct that defines the command's arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args`, calls into the
//!   `roomservice` library, and reports the outcome to the user.

pub mod resolve;

//! vinstall library
//!
//! Downloads versioned artifacts from templated URLs, caches them by version
//! and hands them to an install step. Used by the `vinstall` CLI.

pub mod commands;
pub mod core;
pub mod error;
pub mod utils;

pub use crate::core::installer::{create, InstallStep, Installer, InstallerOptions};
pub use crate::error::{InstallerError, Result};

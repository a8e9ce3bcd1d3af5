//! # Configuration Module
//!
//! This module provides configuration structures for all depsweep commands.
//! Each command has its own config module with a builder for easy
//! construction.
//!
//! ## Command Configurations
//!
//! - **CheckConfig**: Configuration for the `check` command that classifies
//!   project dependencies
//! - **SuggestConfig**: Configuration for the `suggest` command that prints
//!   entries for used transitive dependencies
//! - **RefsConfig**: Configuration for the `refs` command that lists the
//!   references of compiled classes
//!
//! ## Example
//!
//! ```
//! use depsweep::cli::{OutputFormat, RefsFormat};
//! use depsweep::common::ConfigBuilder;
//! use depsweep::config::{CheckConfig, RefsConfig};
//!
//! let check = CheckConfig::builder()
//!     .with_paths(vec![".".into()])
//!     .with_format(OutputFormat::Human)
//!     .with_fail_if_unused(true)
//!     .with_fail_if_used_transitive(true)
//!     .build()
//!     .unwrap();
//! assert!(check.policy().fail_if_unused);
//!
//! let refs = RefsConfig::builder()
//!     .with_path("target/classes".into())
//!     .with_format(RefsFormat::Json)
//!     .build()
//!     .unwrap();
//! assert!(!refs.kinds);
//! ```

pub mod check;
pub mod refs;
pub mod suggest;

pub use check::CheckConfig;
pub use refs::RefsConfig;
pub use suggest::SuggestConfig;

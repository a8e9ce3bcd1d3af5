//! # Dependency Analysis Module
//!
//! This module turns compiled project output and dependency archives into a
//! classification of the project's dependencies.
//!
//! ## Key Components
//!
//! - **scan_directory**: Scans a directory of compiled classes and returns
//!   the classes it declares and the external classes it references
//! - **ArchiveIndexer**: Lists the classes a dependency artifact declares,
//!   reading sibling modules from their output directory
//! - **DependencyClassifier**: Finds unused direct dependencies and classes
//!   used only through transitive dependencies
//! - **ProjectAnalyzer**: Resolves dependencies and runs the classifier for
//!   one or many projects, then summarizes the run
//!
//! ## Example
//!
//! ```
//! use depsweep::analyzer::{ProjectAnalyzer, Reactor, ViolationPolicy};
//! use depsweep::core::{ArtifactType, Project, ProjectId};
//! use depsweep::resolver::LocalRepositoryResolver;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let project = Project::new(
//!     ProjectId {
//!         group: "com.acme".to_string(),
//!         name: "app".to_string(),
//!         version: "1.0.0".to_string(),
//!         packaging: ArtifactType::Jar,
//!     },
//!     "does/not/exist/yet",
//! );
//!
//! let analyzer = ProjectAnalyzer::new(LocalRepositoryResolver::new("repo"), Reactor::new());
//! let summary = analyzer.run(&[project], ViolationPolicy::default(), None);
//!
//! // Nothing compiled yet: a warning, not a failure
//! assert!(summary.failures().is_empty());
//! assert!(summary.violations().is_empty());
//! # Ok(())
//! # }
//! ```

mod archive_indexer;
mod dependency_classifier;
mod directory_scanner;

pub use archive_indexer::{
    ArchiveIndexer, ArtifactIndex, ClassSource, Reactor, declared_in_archive,
};
pub use dependency_classifier::{ClassifyOptions, DependencyClassifier};
pub use directory_scanner::{DirectoryScan, scan_directory};
pub(crate) use directory_scanner::find_class_files;

mod analyzer_impl;
pub use analyzer_impl::*;

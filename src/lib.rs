//! # depsweep - Find Unused and Undeclared Dependencies of JVM Projects
//!
//! depsweep reads compiled class files and dependency archives to decide
//! which declared dependencies a project actually uses. It reports direct
//! dependencies that none of the project's classes refer to, and classes
//! that the project uses but that are only available through a transitive
//! dependency.
//!
//! ## Main Components
//!
//! - **Classfile**: Decodes class files and recovers every class they name,
//!   including names inside generic signatures and annotation values
//! - **Analyzer**: Scans output directories, indexes dependency archives and
//!   classifies dependencies
//! - **Resolver**: Locates dependency archives in a local repository
//! - **Reports**: Generates human-readable and machine-readable reports
//!
//! ## Usage
//!
//! ### Example: Classifying the dependencies of one project
//!
//! ```no_run
//! use depsweep::analyzer::{ProjectAnalyzer, Reactor, ViolationPolicy};
//! use depsweep::core::{Artifact, ArtifactType, Project, ProjectId};
//! use depsweep::reports::{HumanReportGenerator, ReportGenerator};
//! use depsweep::resolver::LocalRepositoryResolver;
//! use miette::IntoDiagnostic;
//!
//! # fn main() -> miette::Result<()> {
//! let commons = Artifact::builder()
//!     .with_group("org.apache.commons")
//!     .with_name("commons-lang3")
//!     .with_version("3.12.0")
//!     .build()
//!     .into_diagnostic()?;
//!
//! let project = Project::new(
//!     ProjectId {
//!         group: "com.acme".to_string(),
//!         name: "app".to_string(),
//!         version: "1.0.0".to_string(),
//!         packaging: ArtifactType::Jar,
//!     },
//!     "app/target/classes",
//! )
//! .with_direct_dependencies(vec![commons]);
//!
//! let analyzer = ProjectAnalyzer::new(LocalRepositoryResolver::user_default().into_diagnostic()?, Reactor::new());
//! let summary = analyzer.run(&[project], ViolationPolicy::default(), None);
//!
//! let report = HumanReportGenerator::new(None).generate_report(&summary).into_diagnostic()?;
//! println!("{report}");
//! # Ok(())
//! # }
//! ```
//!
//! ### Example: Listing what one class refers to
//!
//! ```no_run
//! use depsweep::classfile;
//! use miette::IntoDiagnostic;
//!
//! # fn main() -> miette::Result<()> {
//! let references = classfile::scan_file("target/classes/com/acme/App.class".as_ref()).into_diagnostic()?;
//!
//! for reference in references.references().filter_map(Result::ok) {
//!     println!("{} ({})", reference.class_name, reference.kind);
//! }
//! # Ok(())
//! # }
//! ```

// Private modules
mod constants;
mod progress;
mod project_discovery;
mod utils;

// Public modules
pub mod analyzer;
pub mod classfile;
pub mod cli;
pub mod commands;
pub mod common;
pub mod config;
pub mod core;
pub mod error;
pub mod executors;
pub mod manifest;
pub mod reports;
pub mod resolver;

// Main entry point for the library
pub fn run() -> miette::Result<()> {
    use clap::Parser;

    use crate::cli::Cli;
    use crate::commands::execute_command;

    let cli = Cli::parse();
    execute_command(cli.command)
}

//! Report generation modules for different output formats
//!
//! This module contains report generators for various output formats:
//! - human: Human-readable console output
//! - json: JSON format for programmatic use
//! - junit: JUnit XML format for CI/CD integration
//! - github: GitHub Actions workflow annotations
//!
//! `suggestions` renders the `[[dependencies]]` entries the `suggest`
//! command prints.

pub mod github;
pub mod human;
pub mod json;
pub mod junit;
pub mod suggestions;

use crate::analyzer::RunSummary;
use crate::error::DepsweepError;

/// Common trait for all report generators
pub trait ReportGenerator {
    /// Generate a report from the results of an analysis run
    fn generate_report(&self, summary: &RunSummary) -> Result<String, DepsweepError>;
}

// Re-export for convenience
pub use github::GitHubReportGenerator;
pub use human::HumanReportGenerator;
pub use json::JsonReportGenerator;
pub use junit::JunitReportGenerator;
pub use suggestions::SuggestionReportGenerator;

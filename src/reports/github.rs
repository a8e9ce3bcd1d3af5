//! GitHub Actions format report generation

use std::fmt::Write;

use super::ReportGenerator;
use crate::analyzer::{RunSummary, Violation};
use crate::error::DepsweepError;
use crate::utils::string::counted;

pub struct GitHubReportGenerator;

impl Default for GitHubReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl GitHubReportGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl ReportGenerator for GitHubReportGenerator {
    fn generate_report(&self, summary: &RunSummary) -> Result<String, DepsweepError> {
        let mut output = String::new();
        let violations = summary.violations();

        if violations.is_empty() && summary.failures().is_empty() {
            writeln!(
                output,
                "::notice title=Dependency Check::No dependency problems found! ✅"
            )?;
            return Ok(output);
        }

        let policy = summary.policy();
        for violation in &violations {
            // Findings the policy does not fail on are only warnings
            let (level, title) = match violation {
                Violation::UnusedDirectDependency { .. } => (
                    if policy.fail_if_unused { "error" } else { "warning" },
                    "Unused Dependency",
                ),
                Violation::UsedTransitiveDependency { .. } => (
                    if policy.fail_if_used_transitive {
                        "error"
                    } else {
                        "warning"
                    },
                    "Used Transitive Dependency",
                ),
            };
            writeln!(
                output,
                "::{level} title={title}::{}: {}",
                violation.project(),
                escape_data(&violation.to_string())
            )?;
        }

        for failure in summary.failures() {
            writeln!(
                output,
                "::error title=Analysis Failed::{}: {}",
                failure.project,
                escape_data(&failure.error.to_string())
            )?;
        }

        if !violations.is_empty() {
            writeln!(
                output,
                "::notice title=Summary::Found {}",
                counted(violations.len(), "dependency problem")
            )?;
        }

        Ok(output)
    }
}

/// Workflow commands end at a newline and treat `%` as an escape
fn escape_data(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

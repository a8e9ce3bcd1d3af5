//! Human-readable console report generation

use std::fmt::Write;

use console::style;

use super::ReportGenerator;
use crate::analyzer::RunSummary;
use crate::error::DepsweepError;
use crate::utils::string::{counted, pluralize};

pub struct HumanReportGenerator {
    max_classes: Option<usize>,
}

impl HumanReportGenerator {
    /// `max_classes` limits how many used classes are listed per transitive
    /// dependency
    pub fn new(max_classes: Option<usize>) -> Self {
        Self { max_classes }
    }
}

impl ReportGenerator for HumanReportGenerator {
    fn generate_report(&self, summary: &RunSummary) -> Result<String, DepsweepError> {
        let mut output = String::new();

        let with_findings: Vec<_> = summary
            .results()
            .iter()
            .filter(|r| r.has_unused_direct_dependencies() || r.has_used_transitive_dependencies())
            .collect();

        if with_findings.is_empty() && summary.failures().is_empty() {
            write!(
                output,
                "\n{} No dependency problems found in {}.\n",
                style("✅").green().bold(),
                counted(summary.results().len(), "project")
            )?;
            return Ok(output);
        }

        for result in with_findings {
            let marker = if summary.policy().is_violated_by(result) {
                style("❌").red().bold()
            } else {
                style("⚠️").yellow().bold()
            };
            writeln!(output, "\n{} {}", marker, style(result.project()).bold())?;

            if result.has_unused_direct_dependencies() {
                let unused = result.unused_direct_dependencies();
                writeln!(
                    output,
                    "  {} Unused direct {}:",
                    style("📦").blue(),
                    pluralize("dependency", unused.len())
                )?;
                for artifact in unused {
                    writeln!(output, "    {} {}", style("•").dim(), style(artifact).yellow())?;
                }
            }

            if result.has_used_transitive_dependencies() {
                let used = result.used_classes_of_transitive_dependencies();
                writeln!(
                    output,
                    "  {} Used transitive {}:",
                    style("🔗").cyan(),
                    pluralize("dependency", used.len())
                )?;
                for (artifact, classes) in used {
                    writeln!(output, "    {} {}", style("•").dim(), style(artifact).yellow())?;

                    let limit = self.max_classes.unwrap_or(usize::MAX);
                    for class_name in classes.iter().take(limit) {
                        writeln!(output, "      {} {}", style("→").dim(), class_name)?;
                    }
                    if classes.len() > limit {
                        let hidden = classes.len() - limit;
                        writeln!(
                            output,
                            "      {} and {} more {}",
                            style("…").dim(),
                            hidden,
                            pluralize("class", hidden)
                        )?;
                    }
                }
            }
        }

        if !summary.failures().is_empty() {
            writeln!(
                output,
                "\n{} {} could not be analyzed:",
                style("❌").red().bold(),
                counted(summary.failures().len(), "project")
            )?;
            for failure in summary.failures() {
                writeln!(output, "    {} {}", style("•").dim(), style(&failure.project).bold())?;
            }
        }

        if summary.stopped_early() {
            writeln!(
                output,
                "\n{} Stopped after the first failing project (--fail-fast).",
                style("ℹ️").blue()
            )?;
        }

        if summary.has_used_transitive_dependencies() {
            writeln!(
                output,
                "\n{} Declare used transitive dependencies directly; `depsweep suggest` prints \
                 the entries to add.",
                style("💡").yellow()
            )?;
        }
        if summary.has_unused_direct_dependencies() {
            writeln!(
                output,
                "{} Unused dependencies may still be needed at runtime (reflection, service \
                 loading); consider scope \"runtime\" before removing them.",
                style("💡").yellow()
            )?;
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use console::strip_ansi_codes;
    use predicates::prelude::*;

    use super::*;
    use crate::analyzer::ViolationPolicy;
    use crate::reports::fixtures;

    #[test]
    fn test_clean_report() {
        let report = HumanReportGenerator::new(None)
            .generate_report(&fixtures::clean_summary())
            .unwrap();
        let report = strip_ansi_codes(&report);

        assert!(predicate::str::contains("No dependency problems found in 1 project").eval(&report));
    }

    #[test]
    fn test_report_lists_findings() {
        let summary = fixtures::summary_with_findings(ViolationPolicy::default());
        let report = HumanReportGenerator::new(None).generate_report(&summary).unwrap();
        let report = strip_ansi_codes(&report);

        assert!(report.contains("com.acme:app:jar:1.0"));
        assert!(!report.contains("com.acme:lib:jar:1.0"));
        assert!(report.contains("Unused direct dependency:"));
        assert!(report.contains("org.example:commons-io:jar:2.1:compile"));
        assert!(report.contains("Used transitive dependency:"));
        assert!(report.contains("→ org.slf4j.Logger"));
        assert!(report.contains("→ org.slf4j.LoggerFactory"));
        assert!(report.contains("depsweep suggest"));
    }

    #[test]
    fn test_max_classes_truncates_listing() {
        let summary = fixtures::summary_with_findings(ViolationPolicy::default());
        let report = HumanReportGenerator::new(Some(1))
            .generate_report(&summary)
            .unwrap();
        let report = strip_ansi_codes(&report);

        assert!(report.contains("→ org.slf4j.Logger\n"));
        assert!(!report.contains("LoggerFactory"));
        assert!(report.contains("… and 1 more class\n"));
    }

    #[test]
    fn test_failures_are_listed() {
        let report = HumanReportGenerator::new(None)
            .generate_report(&fixtures::summary_with_failure())
            .unwrap();
        let report = strip_ansi_codes(&report);

        assert!(report.contains("1 project could not be analyzed"));
        assert!(report.contains("com.acme:broken:jar:1.0"));
    }
}

//! JUnit XML format report generation

use std::fmt::Write;

use super::ReportGenerator;
use crate::analyzer::RunSummary;
use crate::error::DepsweepError;

pub struct JunitReportGenerator;

impl Default for JunitReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl JunitReportGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl ReportGenerator for JunitReportGenerator {
    /// One test case per project. Policy violations are failures; projects
    /// that could not be analysed are errors.
    fn generate_report(&self, summary: &RunSummary) -> Result<String, DepsweepError> {
        let mut output = String::new();
        let policy = summary.policy();

        let tests = summary.results().len() + summary.failures().len();
        let failures = summary
            .results()
            .iter()
            .filter(|r| policy.is_violated_by(r))
            .count();
        let errors = summary.failures().len();

        writeln!(output, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
        writeln!(
            output,
            r#"<testsuites name="depsweep" tests="{tests}" failures="{failures}" errors="{errors}">"#
        )?;
        writeln!(
            output,
            r#"  <testsuite name="dependency-usage" tests="{tests}" failures="{failures}" errors="{errors}">"#
        )?;

        for result in summary.results() {
            let name = escape_xml(&result.project().to_string());
            if !policy.is_violated_by(result) {
                writeln!(
                    output,
                    r#"    <testcase name="{name}" classname="depsweep" />"#
                )?;
                continue;
            }

            writeln!(output, r#"    <testcase name="{name}" classname="depsweep">"#)?;
            writeln!(
                output,
                r#"      <failure message="Dependency problems detected">"#
            )?;
            for artifact in result.unused_direct_dependencies() {
                writeln!(
                    output,
                    "unused direct dependency: {}",
                    escape_xml(&artifact.to_string())
                )?;
            }
            for (artifact, classes) in result.used_classes_of_transitive_dependencies() {
                writeln!(
                    output,
                    "used transitive dependency: {}",
                    escape_xml(&artifact.to_string())
                )?;
                for class_name in classes {
                    writeln!(output, "  {class_name}")?;
                }
            }
            writeln!(output, r#"      </failure>"#)?;
            writeln!(output, r#"    </testcase>"#)?;
        }

        for failure in summary.failures() {
            let name = escape_xml(&failure.project.to_string());
            writeln!(output, r#"    <testcase name="{name}" classname="depsweep">"#)?;
            writeln!(
                output,
                r#"      <error message="{}" />"#,
                escape_xml(&failure.error.to_string())
            )?;
            writeln!(output, r#"    </testcase>"#)?;
        }

        writeln!(output, r#"  </testsuite>"#)?;
        writeln!(output, r#"</testsuites>"#)?;

        Ok(output)
    }
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::ViolationPolicy;
    use crate::reports::fixtures;

    #[test]
    fn test_clean_run() {
        let report = JunitReportGenerator::new()
            .generate_report(&fixtures::clean_summary())
            .unwrap();

        assert!(report.contains(r#"tests="1" failures="0" errors="0""#));
        assert!(report.contains(r#"<testcase name="com.acme:app:jar:1.0" classname="depsweep" />"#));
    }

    #[test]
    fn test_only_policy_violations_fail() {
        let summary = fixtures::summary_with_findings(ViolationPolicy {
            fail_if_unused: true,
            ..ViolationPolicy::default()
        });
        let report = JunitReportGenerator::new().generate_report(&summary).unwrap();

        assert!(report.contains(r#"tests="2" failures="1" errors="0""#));
        assert!(report.contains("unused direct dependency: org.example:commons-io:jar:2.1:compile"));
        assert!(report.contains(r#"<testcase name="com.acme:lib:jar:1.0" classname="depsweep" />"#));
    }

    #[test]
    fn test_failures_are_escaped_errors() {
        let report = JunitReportGenerator::new()
            .generate_report(&fixtures::summary_with_failure())
            .unwrap();

        assert!(report.contains(r#"errors="1""#));
        assert!(report.contains(r#"<error message="archive &lt;lib.jar&gt; is corrupt" />"#));
    }
}

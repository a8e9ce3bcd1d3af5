//! JSON format report generation

use serde_json::json;

use super::ReportGenerator;
use crate::analyzer::RunSummary;
use crate::error::DepsweepError;

pub struct JsonReportGenerator;

impl Default for JsonReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonReportGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl ReportGenerator for JsonReportGenerator {
    fn generate_report(&self, summary: &RunSummary) -> Result<String, DepsweepError> {
        let projects: Vec<_> = summary
            .results()
            .iter()
            .map(|result| {
                let unused: Vec<_> = result
                    .unused_direct_dependencies()
                    .iter()
                    .map(|artifact| artifact.to_string())
                    .collect();

                let used_transitive: Vec<_> = result
                    .used_classes_of_transitive_dependencies()
                    .iter()
                    .map(|(artifact, classes)| {
                        json!({
                            "artifact": artifact.to_string(),
                            "classes": classes,
                        })
                    })
                    .collect();

                json!({
                    "project": result.project().to_string(),
                    "violates_policy": summary.policy().is_violated_by(result),
                    "unused_direct_dependencies": unused,
                    "used_transitive_dependencies": used_transitive,
                })
            })
            .collect();

        let failures: Vec<_> = summary
            .failures()
            .iter()
            .map(|failure| {
                json!({
                    "project": failure.project.to_string(),
                    "error": failure.error.to_string(),
                })
            })
            .collect();

        let violations: Vec<_> = summary
            .violations()
            .iter()
            .map(|violation| {
                json!({
                    "project": violation.project().to_string(),
                    "message": violation.to_string(),
                })
            })
            .collect();

        let report = json!({
            "should_fail": summary.should_fail(),
            "stopped_early": summary.stopped_early(),
            "project_count": summary.results().len(),
            "has_unused_direct_dependencies": summary.has_unused_direct_dependencies(),
            "has_used_transitive_dependencies": summary.has_used_transitive_dependencies(),
            "projects": projects,
            "violations": violations,
            "failures": failures,
        });

        serde_json::to_string_pretty(&report).map_err(DepsweepError::Json)
    }
}

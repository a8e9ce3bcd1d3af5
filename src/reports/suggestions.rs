//! `[[dependencies]]` entries for used transitive dependencies

use std::fmt::Write;

use serde::Serialize;

use super::ReportGenerator;
use crate::analyzer::RunSummary;
use crate::core::{Artifact, ArtifactType, Scope};
use crate::error::DepsweepError;
use crate::manifest::DependencySpec;

#[derive(Serialize)]
struct Suggestions {
    dependencies: Vec<DependencySpec>,
}

/// Prints, per project, the descriptor entries that would declare every
/// used transitive dependency directly. Never touches the descriptors.
pub struct SuggestionReportGenerator;

impl Default for SuggestionReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl SuggestionReportGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl ReportGenerator for SuggestionReportGenerator {
    fn generate_report(&self, summary: &RunSummary) -> Result<String, DepsweepError> {
        let mut output = String::new();

        for result in summary.results() {
            if !result.has_used_transitive_dependencies() {
                continue;
            }

            let dependencies = result
                .used_transitive_dependencies()
                .map(suggested_dependency)
                .collect();
            let rendered = toml::to_string(&Suggestions { dependencies })?;

            if !output.is_empty() {
                writeln!(output)?;
            }
            writeln!(output, "# {}", result.project())?;
            output.push_str(&rendered);
        }

        if output.is_empty() {
            writeln!(output, "# No used transitive dependencies to declare")?;
        }

        Ok(output)
    }
}

/// Bean archives are supplied by the container at runtime
pub fn suggested_dependency(artifact: &Artifact) -> DependencySpec {
    let mut spec = DependencySpec::from_artifact(artifact);
    if artifact.artifact_type() == &ArtifactType::Ejb {
        spec.scope = Scope::Provided;
    }
    spec
}

use std::path::{Path, PathBuf};

use miette::{IntoDiagnostic, NamedSource, Result, SourceSpan};
use serde::{Deserialize, Serialize};

use crate::constants::manifest::DEFAULT_OUTPUT_DIR;
use crate::core::{Artifact, ArtifactType, Project, ProjectId, Scope};
use crate::error::DepsweepError;

/// Contents of a `depsweep.toml` project descriptor
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectManifest {
    pub project: Option<ProjectSection>,
    #[serde(default)]
    pub modules: Vec<String>,
    #[serde(default)]
    pub dependencies: Vec<DependencySpec>,
    #[serde(default)]
    pub transitive: Vec<DependencySpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ProjectSection {
    pub group: String,
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub packaging: ArtifactType,
    pub output_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DependencySpec {
    pub group: String,
    pub name: String,
    pub version: String,
    #[serde(rename = "type", default)]
    pub artifact_type: ArtifactType,
    #[serde(default)]
    pub scope: Scope,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl ProjectManifest {
    pub fn parse_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DepsweepError::FileReadError {
                path: path.to_path_buf(),
                source: e,
            })
            .into_diagnostic()?;

        Self::parse_str(&content, path).into_diagnostic()
    }

    /// Parses descriptor text; `path` names the file in diagnostics
    pub fn parse_str(content: &str, path: &Path) -> Result<Self, DepsweepError> {
        toml::from_str(content).map_err(|e| {
            let span = e
                .span()
                .map(|span| SourceSpan::new(span.start.into(), span.end - span.start));

            DepsweepError::TomlParseError(Box::new(crate::error::TomlParseError {
                file: path.display().to_string(),
                source_code: NamedSource::new(path.display().to_string(), content.to_string()),
                span,
                source: e,
            }))
        })
    }

    pub fn is_multi_module_root(&self) -> bool {
        !self.modules.is_empty()
    }

    /// Builds the project this descriptor describes, if it has a
    /// `[project]` table. Relative paths are taken relative to the
    /// descriptor's directory.
    pub fn to_project(&self, manifest_path: &Path) -> Result<Option<Project>, DepsweepError> {
        let Some(section) = &self.project else {
            return Ok(None);
        };
        let base = manifest_path.parent().unwrap_or(Path::new("."));

        for (field, value) in [
            ("group", &section.group),
            ("name", &section.name),
            ("version", &section.version),
        ] {
            if value.trim().is_empty() {
                return Err(DepsweepError::ManifestError {
                    path: manifest_path.to_path_buf(),
                    message: format!("project {field} must not be empty"),
                });
            }
        }

        let id = ProjectId {
            group: section.group.clone(),
            name: section.name.clone(),
            version: section.version.clone(),
            packaging: section.packaging.clone(),
        };
        let output_dir = base.join(
            section
                .output_dir
                .as_deref()
                .unwrap_or(Path::new(DEFAULT_OUTPUT_DIR)),
        );

        let direct = self.artifacts(&self.dependencies, base, manifest_path)?;
        let transitive = self.artifacts(&self.transitive, base, manifest_path)?;

        Ok(Some(
            Project::new(id, output_dir)
                .with_direct_dependencies(direct)
                .with_transitive_dependencies(transitive)
                .with_descriptor(manifest_path),
        ))
    }

    fn artifacts(
        &self,
        specs: &[DependencySpec],
        base: &Path,
        manifest_path: &Path,
    ) -> Result<Vec<Artifact>, DepsweepError> {
        specs
            .iter()
            .map(|spec| {
                spec.to_artifact(base)
                    .map_err(|message| DepsweepError::ManifestError {
                        path: manifest_path.to_path_buf(),
                        message,
                    })
            })
            .collect()
    }
}

impl DependencySpec {
    pub fn from_artifact(artifact: &Artifact) -> Self {
        Self {
            group: artifact.group().to_string(),
            name: artifact.name().to_string(),
            version: artifact.version().to_string(),
            artifact_type: artifact.artifact_type().clone(),
            scope: artifact.scope(),
            classifier: artifact.classifier().map(str::to_string),
            path: None,
        }
    }

    fn to_artifact(&self, base: &Path) -> Result<Artifact, String> {
        if self.group.trim().is_empty() || self.name.trim().is_empty() {
            return Err(format!(
                "dependency '{}:{}' needs a group and a name",
                self.group, self.name
            ));
        }
        if self.version.trim().is_empty() {
            return Err(format!(
                "dependency '{}:{}' needs a version",
                self.group, self.name
            ));
        }

        let mut builder = Artifact::builder()
            .with_group(&self.group)
            .with_name(&self.name)
            .with_version(&self.version)
            .with_type(self.artifact_type.clone())
            .with_scope(self.scope);
        if let Some(classifier) = &self.classifier {
            builder = builder.with_classifier(classifier);
        }
        if let Some(path) = &self.path {
            builder = builder.with_location(base.join(path));
        }
        builder.build().map_err(|e| e.to_string())
    }
}

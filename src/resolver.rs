//! Artifact resolution against a local repository
//!
//! Resolution only computes where an artifact's archive lives. Whether the
//! file is actually there is the indexer's concern: a missing archive
//! contributes no classes.

use std::path::{Path, PathBuf};

use crate::constants::repository::DEFAULT_RELATIVE_PATH;
use crate::core::{Artifact, ArtifactType};
use crate::error::DepsweepError;

/// Produces a readable location for an artifact
pub trait ArtifactResolver: Sync {
    /// Returns a copy of `artifact` with its location set. Resolving an
    /// artifact that already has a location returns it unchanged.
    fn resolve(&self, artifact: &Artifact) -> Result<Artifact, DepsweepError>;
}

/// Resolves artifacts in a Maven-layout repository:
/// `group/as/path/name/version/name-version[-classifier].ext`
#[derive(Debug, Clone)]
pub struct LocalRepositoryResolver {
    root: PathBuf,
}

impl LocalRepositoryResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Uses `~/.m2/repository`
    pub fn user_default() -> Result<Self, DepsweepError> {
        let home = dirs::home_dir().ok_or_else(|| DepsweepError::ConfigurationError {
            message: "Cannot determine the home directory; pass --repository explicitly"
                .to_string(),
        })?;
        Ok(Self::new(home.join(DEFAULT_RELATIVE_PATH)))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn artifact_path(&self, artifact: &Artifact) -> PathBuf {
        let mut path = self.root.clone();
        path.extend(artifact.group().split('.'));
        path.push(artifact.name());
        path.push(artifact.version());

        let mut file_name = format!("{}-{}", artifact.name(), artifact.version());
        if let Some(classifier) = artifact.classifier() {
            file_name.push('-');
            file_name.push_str(classifier);
        }
        file_name.push('.');
        file_name.push_str(extension(artifact.artifact_type()));
        path.push(file_name);
        path
    }
}

impl ArtifactResolver for LocalRepositoryResolver {
    fn resolve(&self, artifact: &Artifact) -> Result<Artifact, DepsweepError> {
        if artifact.is_resolved() {
            return Ok(artifact.clone());
        }
        if artifact.group().is_empty() || artifact.name().is_empty() {
            return Err(DepsweepError::ArtifactResolution {
                artifact: artifact.to_string(),
                message: "group and name must not be empty".to_string(),
            });
        }
        Ok(artifact.clone().with_location(self.artifact_path(artifact)))
    }
}

/// File extension used for a packaging type
fn extension(artifact_type: &ArtifactType) -> &str {
    match artifact_type {
        ArtifactType::Jar | ArtifactType::Ejb => "jar",
        ArtifactType::Other(other) if other == "test-jar" || other == "ejb-client" => "jar",
        ArtifactType::Other(other) if other == "maven-plugin" || other == "java-source" => "jar",
        other => other.as_str(),
    }
}

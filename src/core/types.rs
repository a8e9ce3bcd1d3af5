//! Core type definitions
//!
//! This module contains the basic data structures used throughout the
//! application, with minimal logic - focusing on data representation.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A fully-qualified, dotted class name such as `com.acme.Foo.Inner`.
///
/// Never contains `/`, `\` or `$`; array and primitive forms are decomposed
/// before a `ClassName` is created.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassName(String);

impl ClassName {
    /// Normalizes an internal name (`com/acme/Foo$Inner`) into dotted form
    pub fn from_internal(internal: &str) -> Self {
        Self(internal.replace(['/', '\\', '$'], "."))
    }

    /// Normalizes an archive entry path (`com/acme/Foo$1.class`)
    pub fn from_entry_path(entry: &str) -> Option<Self> {
        entry
            .strip_suffix(crate::constants::classfile::CLASS_FILE_SUFFIX)
            .filter(|stem| !stem.is_empty())
            .map(Self::from_internal)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_anonymous_inner_class(&self) -> bool {
        is_anonymous_inner_class(Some(&self.0))
    }
}

impl fmt::Display for ClassName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ClassName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ClassName {
    fn from(value: &str) -> Self {
        Self::from_internal(value)
    }
}

/// Compiler-generated anonymous classes end in a purely numeric segment
/// (`Foo.1`, `Foo.2`). This follows javac's naming scheme and is a
/// best-effort filter, not a property of the class-file format.
pub fn is_anonymous_inner_class(class_name: Option<&str>) -> bool {
    let Some((_, last_segment)) = class_name.and_then(|name| name.rsplit_once('.')) else {
        return false;
    };
    !last_segment.is_empty() && last_segment.bytes().all(|b| b.is_ascii_digit())
}

/// Packaging type of an artifact or project
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum ArtifactType {
    #[default]
    Jar,
    War,
    Ejb,
    Ear,
    Pom,
    Other(String),
}

impl ArtifactType {
    /// Whether archives of this type contain compiled classes worth indexing
    pub fn carries_classes(&self) -> bool {
        matches!(self, ArtifactType::Jar | ArtifactType::War | ArtifactType::Ejb)
    }

    pub fn as_str(&self) -> &str {
        match self {
            ArtifactType::Jar => "jar",
            ArtifactType::War => "war",
            ArtifactType::Ejb => "ejb",
            ArtifactType::Ear => "ear",
            ArtifactType::Pom => "pom",
            ArtifactType::Other(other) => other,
        }
    }
}

impl FromStr for ArtifactType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "jar" => ArtifactType::Jar,
            "war" => ArtifactType::War,
            "ejb" => ArtifactType::Ejb,
            "ear" => ArtifactType::Ear,
            "pom" => ArtifactType::Pom,
            other => ArtifactType::Other(other.to_string()),
        })
    }
}

impl fmt::Display for ArtifactType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ArtifactType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ArtifactType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(raw.parse().unwrap_or_default())
    }
}

/// Dependency scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    #[default]
    Compile,
    Provided,
    Runtime,
    Test,
    System,
    Import,
}

impl Scope {
    /// Runtime-only and test-only dependencies are not subject to
    /// compile-time usage checks
    pub fn is_compile_visible(&self) -> bool {
        !matches!(self, Scope::Runtime | Scope::Test)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Scope::Compile => "compile",
            Scope::Provided => "provided",
            Scope::Runtime => "runtime",
            Scope::Test => "test",
            Scope::System => "system",
            Scope::Import => "import",
        };
        f.write_str(s)
    }
}

/// An external dependency. Identity is the coordinate tuple
/// (group, name, version, type, classifier); scope and location are
/// attributes of one particular use of the artifact.
#[derive(Debug, Clone, Serialize)]
pub struct Artifact {
    group: String,
    name: String,
    version: String,
    #[serde(rename = "type")]
    artifact_type: ArtifactType,
    #[serde(skip_serializing_if = "Option::is_none")]
    classifier: Option<String>,
    scope: Scope,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<PathBuf>,
}

impl Artifact {
    pub fn builder() -> ArtifactBuilder {
        ArtifactBuilder::default()
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn artifact_type(&self) -> &ArtifactType {
        &self.artifact_type
    }

    pub fn classifier(&self) -> Option<&str> {
        self.classifier.as_deref()
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// The archive file or class directory backing this artifact, if resolved
    pub fn location(&self) -> Option<&Path> {
        self.location.as_deref()
    }

    pub fn is_resolved(&self) -> bool {
        self.location.is_some()
    }

    pub fn with_location(mut self, location: impl Into<PathBuf>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Whether this artifact is produced by the given project
    pub fn is_produced_by(&self, project: &ProjectId) -> bool {
        self.group == project.group && self.name == project.name && self.version == project.version
    }

    fn key(&self) -> (&str, &str, &str, &ArtifactType, Option<&str>) {
        (
            &self.group,
            &self.name,
            &self.version,
            &self.artifact_type,
            self.classifier.as_deref(),
        )
    }
}

impl PartialEq for Artifact {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Artifact {}

impl Hash for Artifact {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl PartialOrd for Artifact {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Artifact {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.name, self.artifact_type)?;
        if let Some(classifier) = &self.classifier {
            write!(f, ":{classifier}")?;
        }
        write!(f, ":{}:{}", self.version, self.scope)
    }
}

#[derive(Error, Debug, Diagnostic)]
pub enum ArtifactBuilderError {
    #[error("Artifact group is required")]
    #[diagnostic(
        code(depsweep::types::missing_artifact_group),
        help("Provide a group for the artifact using with_group()")
    )]
    MissingGroup,

    #[error("Artifact name is required")]
    #[diagnostic(
        code(depsweep::types::missing_artifact_name),
        help("Provide a name for the artifact using with_name()")
    )]
    MissingName,

    #[error("Artifact version is required")]
    #[diagnostic(
        code(depsweep::types::missing_artifact_version),
        help("Provide a version for the artifact using with_version()")
    )]
    MissingVersion,
}

#[derive(Default)]
pub struct ArtifactBuilder {
    group: Option<String>,
    name: Option<String>,
    version: Option<String>,
    artifact_type: Option<ArtifactType>,
    classifier: Option<String>,
    scope: Option<Scope>,
    location: Option<PathBuf>,
}

impl ArtifactBuilder {
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_type(mut self, artifact_type: ArtifactType) -> Self {
        self.artifact_type = Some(artifact_type);
        self
    }

    pub fn with_classifier(mut self, classifier: impl Into<String>) -> Self {
        self.classifier = Some(classifier.into());
        self
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn with_location(mut self, location: impl Into<PathBuf>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn build(self) -> Result<Artifact, ArtifactBuilderError> {
        Ok(Artifact {
            group: self.group.ok_or(ArtifactBuilderError::MissingGroup)?,
            name: self.name.ok_or(ArtifactBuilderError::MissingName)?,
            version: self.version.ok_or(ArtifactBuilderError::MissingVersion)?,
            artifact_type: self.artifact_type.unwrap_or_default(),
            classifier: self.classifier.filter(|c| !c.is_empty()),
            scope: self.scope.unwrap_or_default(),
            location: self.location,
        })
    }
}

/// Coordinates of an analysed project
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ProjectId {
    pub group: String,
    pub name: String,
    pub version: String,
    pub packaging: ArtifactType,
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.group, self.name, self.packaging, self.version
        )
    }
}

/// A project to analyse, as supplied by the project description
#[derive(Debug, Clone)]
pub struct Project {
    pub id: ProjectId,
    /// Directory holding the project's compiled classes
    pub output_dir: PathBuf,
    /// Descriptor the project was loaded from, if any
    pub descriptor: Option<PathBuf>,
    pub direct_dependencies: Vec<Artifact>,
    pub transitive_dependencies: Vec<Artifact>,
}

impl Project {
    pub fn new(id: ProjectId, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            id,
            output_dir: output_dir.into(),
            descriptor: None,
            direct_dependencies: Vec::new(),
            transitive_dependencies: Vec::new(),
        }
    }

    pub fn with_direct_dependencies(mut self, deps: Vec<Artifact>) -> Self {
        self.direct_dependencies = deps;
        self
    }

    /// Sets the resolved transitive set; artifacts that are also direct
    /// dependencies are dropped from it
    pub fn with_transitive_dependencies(mut self, deps: Vec<Artifact>) -> Self {
        self.transitive_dependencies = deps
            .into_iter()
            .filter(|dep| !self.direct_dependencies.contains(dep))
            .collect();
        self
    }

    pub fn with_descriptor(mut self, descriptor: impl Into<PathBuf>) -> Self {
        self.descriptor = Some(descriptor.into());
        self
    }
}

/// Outcome of analysing one project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    project: ProjectId,
    unused_direct_dependencies: BTreeSet<Artifact>,
    used_classes_of_transitive_dependencies: BTreeMap<Artifact, BTreeSet<ClassName>>,
}

impl ScanResult {
    pub fn new(project: ProjectId) -> Self {
        Self {
            project,
            unused_direct_dependencies: BTreeSet::new(),
            used_classes_of_transitive_dependencies: BTreeMap::new(),
        }
    }

    pub fn project(&self) -> &ProjectId {
        &self.project
    }

    pub fn unused_direct_dependencies(&self) -> &BTreeSet<Artifact> {
        &self.unused_direct_dependencies
    }

    pub fn used_classes_of_transitive_dependencies(
        &self,
    ) -> &BTreeMap<Artifact, BTreeSet<ClassName>> {
        &self.used_classes_of_transitive_dependencies
    }

    pub fn used_transitive_dependencies(&self) -> impl Iterator<Item = &Artifact> {
        self.used_classes_of_transitive_dependencies.keys()
    }

    pub fn has_unused_direct_dependencies(&self) -> bool {
        !self.unused_direct_dependencies.is_empty()
    }

    pub fn has_used_transitive_dependencies(&self) -> bool {
        !self.used_classes_of_transitive_dependencies.is_empty()
    }

    pub(crate) fn mark_unused(&mut self, artifact: Artifact) {
        self.unused_direct_dependencies.insert(artifact);
    }

    pub(crate) fn record_transitive_use(&mut self, artifact: Artifact, class_name: ClassName) {
        self.used_classes_of_transitive_dependencies
            .entry(artifact)
            .or_default()
            .insert(class_name);
    }
}

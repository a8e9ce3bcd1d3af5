use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use zip::ZipArchive;

use super::directory_scanner::scan_directory;
use crate::core::{Artifact, ClassName, Project};
use crate::error::DepsweepError;

type Coordinates = (String, String, String);

/// Projects analysed in the same run, keyed by coordinates. A dependency
/// on one of them is read from its output directory instead of an archive.
#[derive(Debug, Clone, Default)]
pub struct Reactor {
    modules: HashMap<Coordinates, PathBuf>,
}

impl Reactor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_projects<'a>(projects: impl IntoIterator<Item = &'a Project>) -> Self {
        let modules = projects
            .into_iter()
            .map(|p| {
                (
                    (p.id.group.clone(), p.id.name.clone(), p.id.version.clone()),
                    p.output_dir.clone(),
                )
            })
            .collect();
        Self { modules }
    }

    pub fn output_dir_for(&self, artifact: &Artifact) -> Option<&Path> {
        self.modules
            .get(&(
                artifact.group().to_string(),
                artifact.name().to_string(),
                artifact.version().to_string(),
            ))
            .map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

/// Where an artifact's declared classes were read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassSource {
    Archive(PathBuf),
    Directory(PathBuf),
    /// Sibling module output directory
    Reactor(PathBuf),
    /// Packaging type without classes
    Ignored,
    /// No location, or the location does not exist
    Missing,
}

/// Declared classes of one artifact
#[derive(Debug, Clone)]
pub struct ArtifactIndex {
    pub artifact: Artifact,
    pub source: ClassSource,
    pub classes: BTreeSet<ClassName>,
}

/// Lists the classes dependency artifacts declare
#[derive(Debug, Clone, Default)]
pub struct ArchiveIndexer {
    reactor: Reactor,
}

impl ArchiveIndexer {
    pub fn new(reactor: Reactor) -> Self {
        Self { reactor }
    }

    pub fn reactor(&self) -> &Reactor {
        &self.reactor
    }

    /// Indexes one artifact. Packaging types that cannot hold classes and
    /// artifacts without bytes yield an empty set; an archive that exists
    /// but cannot be read is an error.
    pub fn index(&self, artifact: &Artifact) -> Result<ArtifactIndex, DepsweepError> {
        let (source, classes) = if !artifact.artifact_type().carries_classes() {
            (ClassSource::Ignored, BTreeSet::new())
        } else if let Some(dir) = self.reactor.output_dir_for(artifact) {
            (ClassSource::Reactor(dir.to_path_buf()), declared_in_directory(dir)?)
        } else {
            match artifact.location() {
                Some(path) if path.is_dir() => {
                    (ClassSource::Directory(path.to_path_buf()), declared_in_directory(path)?)
                }
                Some(path) if path.is_file() => {
                    (ClassSource::Archive(path.to_path_buf()), declared_in_archive(path)?)
                }
                _ => (ClassSource::Missing, BTreeSet::new()),
            }
        };

        Ok(ArtifactIndex {
            artifact: artifact.clone(),
            source,
            classes,
        })
    }

    /// Indexes artifacts in parallel, preserving their order
    pub fn index_all(&self, artifacts: &[Artifact]) -> Result<Vec<ArtifactIndex>, DepsweepError> {
        artifacts.par_iter().map(|a| self.index(a)).collect()
    }
}

/// Class entries of a jar-like archive, excluding anonymous classes
pub fn declared_in_archive(path: &Path) -> Result<BTreeSet<ClassName>, DepsweepError> {
    let archive_error = |source| DepsweepError::ArchiveRead {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(|source| DepsweepError::FileReadError {
        path: path.to_path_buf(),
        source,
    })?;
    let mut archive = ZipArchive::new(BufReader::new(file)).map_err(archive_error)?;

    let mut classes = BTreeSet::new();
    for i in 0..archive.len() {
        let entry = archive.by_index(i).map_err(archive_error)?;
        if entry.is_dir() {
            continue;
        }
        if let Some(class_name) = ClassName::from_entry_path(entry.name())
            && !class_name.is_anonymous_inner_class()
        {
            classes.insert(class_name);
        }
    }
    Ok(classes)
}

/// Classes compiled into a directory, named by what each class file says it
/// declares rather than by where it sits
fn declared_in_directory(dir: &Path) -> Result<BTreeSet<ClassName>, DepsweepError> {
    if !dir.is_dir() {
        return Ok(BTreeSet::new());
    }
    let mut declared = scan_directory(dir)?.declared;
    declared.retain(|class_name| !class_name.is_anonymous_inner_class());
    Ok(declared)
}

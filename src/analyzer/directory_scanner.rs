use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use walkdir::WalkDir;

use crate::classfile;
use crate::constants::classfile::CLASS_FILE_EXTENSION;
use crate::core::ClassName;
use crate::error::DepsweepError;

/// Classes a directory of compiled classes declares and the external
/// classes they reference
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryScan {
    pub declared: BTreeSet<ClassName>,
    /// Never contains a declared class or an anonymous class
    pub referenced: BTreeSet<ClassName>,
    /// Signatures that failed to parse and were skipped
    pub skipped_signatures: usize,
    /// Set when the directory did not exist
    pub warning: Option<String>,
}

impl DirectoryScan {
    fn missing(path: &Path) -> Self {
        Self {
            warning: Some(format!(
                "Directory '{}' does not exist, nothing to scan",
                path.display()
            )),
            ..Self::default()
        }
    }

    fn from_class(references: &classfile::ClassReferences) -> Self {
        let folded = references.referenced_classes();
        Self {
            declared: BTreeSet::from([references.class_name.clone()]),
            referenced: folded.classes,
            skipped_signatures: folded.skipped_signatures.len(),
            warning: None,
        }
    }

    fn merge(mut self, other: Self) -> Self {
        self.declared.extend(other.declared);
        self.referenced.extend(other.referenced);
        self.skipped_signatures += other.skipped_signatures;
        self
    }
}

/// Scans every class file under `path`.
///
/// A missing directory is not an error: it yields empty sets and a warning.
/// Any class file that cannot be read or decoded fails the whole scan,
/// since the sets would otherwise be silently incomplete.
pub fn scan_directory(path: &Path) -> Result<DirectoryScan, DepsweepError> {
    if !path.is_dir() {
        return Ok(DirectoryScan::missing(path));
    }

    let class_files = find_class_files(path)?;

    let mut scan = class_files
        .par_iter()
        .map(|file| classfile::scan_file(file).map(|refs| DirectoryScan::from_class(&refs)))
        .try_reduce(DirectoryScan::default, |a, b| Ok(a.merge(b)))?;

    let declared = &scan.declared;
    scan.referenced.retain(|class| !declared.contains(class));

    Ok(scan)
}

pub(crate) fn find_class_files(path: &Path) -> Result<Vec<PathBuf>, DepsweepError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(path).follow_links(true) {
        let entry = entry.map_err(|e| DepsweepError::Io(e.into()))?;
        if entry.file_type().is_file()
            && entry.path().extension().is_some_and(|ext| ext == CLASS_FILE_EXTENSION)
        {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

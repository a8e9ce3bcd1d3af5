use std::collections::HashSet;
use std::path::{Path, PathBuf};

use console::style;
use miette::{Result, WrapErr};
use rayon::prelude::*;
use walkdir::WalkDir;

use crate::constants::manifest::{FILE_NAME, SKIPPED_DIRS};
use crate::core::Project;
use crate::manifest::ProjectManifest;
use crate::progress::ProgressReporter;

/// Finds `depsweep.toml` descriptors under a set of paths and loads the
/// projects they describe
pub struct ProjectDiscovery {
    seen_descriptors: HashSet<PathBuf>,
}

impl Default for ProjectDiscovery {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectDiscovery {
    pub fn new() -> Self {
        Self {
            seen_descriptors: HashSet::new(),
        }
    }

    /// Discover all projects in the given paths. A path may be a directory
    /// or a descriptor file. Projects are sorted by descriptor path.
    pub fn discover_all(
        &mut self,
        paths: &[PathBuf],
        progress: Option<&ProgressReporter>,
    ) -> Result<Vec<Project>> {
        let mut projects = Vec::new();

        for path in paths {
            if !path.exists() {
                eprintln!(
                    "{} Path '{}' does not exist",
                    style("⚠").yellow(),
                    path.display()
                );
                continue;
            }

            let descriptors = if path.is_file() {
                vec![path.clone()]
            } else {
                find_descriptors(path)
            };

            self.load_descriptors(descriptors, &mut projects, progress)
                .wrap_err_with(|| format!("Failed to discover projects in '{}'", path.display()))?;
        }

        projects.sort_by(|a, b| a.descriptor.cmp(&b.descriptor));
        Ok(projects)
    }

    fn load_descriptors(
        &mut self,
        descriptors: Vec<PathBuf>,
        projects: &mut Vec<Project>,
        progress: Option<&ProgressReporter>,
    ) -> Result<()> {
        let mut pending = descriptors;

        // Multi-module roots may point at modules the walk skipped, so keep
        // going until no new descriptor turns up
        while !pending.is_empty() {
            let fresh: Vec<PathBuf> = pending
                .into_iter()
                .filter(|path| self.seen_descriptors.insert(canonical(path)))
                .collect();

            let loaded: Vec<(Option<Project>, Vec<PathBuf>)> = fresh
                .into_par_iter()
                .filter_map(|path| {
                    if let Some(p) = progress {
                        p.checking_descriptor(&path);
                    }
                    load_descriptor(&path)
                })
                .collect();

            pending = Vec::new();
            for (project, modules) in loaded {
                projects.extend(project);
                pending.extend(modules);
            }
        }

        Ok(())
    }
}

/// All descriptor files below `root`, skipping build output and VCS
/// directories
pub fn find_descriptors(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| {
            e.depth() == 0
                || !e.file_type().is_dir()
                || !SKIPPED_DIRS.iter().any(|skipped| e.file_name() == *skipped)
        })
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && e.file_name() == FILE_NAME)
        .map(|e| e.into_path())
        .collect()
}

/// Loads one descriptor. Returns the project it describes (if any) and the
/// descriptors of the modules it lists. Problems are reported as warnings.
fn load_descriptor(path: &Path) -> Option<(Option<Project>, Vec<PathBuf>)> {
    let manifest = match ProjectManifest::parse_file(path) {
        Ok(manifest) => manifest,
        Err(e) => {
            eprintln!(
                "{} Failed to parse {}: {:?}",
                style("⚠").yellow(),
                path.display(),
                e
            );
            return None;
        }
    };

    let project = match manifest.to_project(path) {
        Ok(project) => project,
        Err(e) => {
            eprintln!("{} {}", style("⚠").yellow(), e);
            None
        }
    };

    let modules = if manifest.is_multi_module_root() {
        let root = path.parent().unwrap_or(Path::new("."));
        expand_modules(root, &manifest.modules)
    } else {
        Vec::new()
    };

    Some((project, modules))
}

/// Resolves `modules` entries (plain directories or glob patterns) to
/// module descriptor paths
fn expand_modules(root: &Path, patterns: &[String]) -> Vec<PathBuf> {
    patterns
        .iter()
        .flat_map(|pattern| {
            if pattern.contains(['*', '?', '[']) {
                let glob_pattern = root.join(pattern);
                let glob_str = glob_pattern.to_string_lossy();

                match glob::glob(&glob_str) {
                    Ok(paths) => paths
                        .flatten()
                        .filter(|path| path.is_dir())
                        .filter_map(|dir| module_descriptor(&dir))
                        .collect(),
                    Err(e) => {
                        eprintln!(
                            "{} Invalid module pattern '{}': {}",
                            style("⚠").yellow(),
                            pattern,
                            e
                        );
                        vec![]
                    }
                }
            } else {
                let dir = root.join(pattern);
                match module_descriptor(&dir) {
                    Some(descriptor) => vec![descriptor],
                    None => {
                        eprintln!(
                            "{} Module '{}' has no {}",
                            style("⚠").yellow(),
                            dir.display(),
                            FILE_NAME
                        );
                        vec![]
                    }
                }
            }
        })
        .collect()
}

fn module_descriptor(dir: &Path) -> Option<PathBuf> {
    let descriptor = dir.join(FILE_NAME);
    descriptor.is_file().then_some(descriptor)
}

fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

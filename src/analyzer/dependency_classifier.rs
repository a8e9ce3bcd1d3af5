//! Dependency classification
//!
//! Decides, for one project, which direct dependencies contribute no
//! referenced class and which referenced classes are only available
//! through transitive dependencies.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;

use console::style;

use super::archive_indexer::{ArchiveIndexer, ArtifactIndex, ClassSource};
use super::directory_scanner::scan_directory;
use crate::core::{Artifact, ClassName, Project, ScanResult};
use crate::error::DepsweepError;
use crate::utils::string::counted;

/// Which checks a classification performs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifyOptions {
    pub check_unused: bool,
    pub check_transitive: bool,
}

impl Default for ClassifyOptions {
    fn default() -> Self {
        Self {
            check_unused: true,
            check_transitive: true,
        }
    }
}

pub struct DependencyClassifier<'i> {
    indexer: &'i ArchiveIndexer,
    verbose: bool,
}

impl<'i> DependencyClassifier<'i> {
    pub fn new(indexer: &'i ArchiveIndexer) -> Self {
        Self {
            indexer,
            verbose: false,
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Classifies the dependencies of `project`.
    ///
    /// Usage is existential: one referenced class is enough for an artifact
    /// to count as used. Every direct dependency is checked against the
    /// full referenced set, so the outcome does not depend on the order of
    /// `direct` or `transitive`.
    pub fn classify(
        &self,
        project: &Project,
        direct: &[Artifact],
        transitive: &[Artifact],
        options: ClassifyOptions,
    ) -> Result<ScanResult, DepsweepError> {
        let mut result = ScanResult::new(project.id.clone());

        if !project.id.packaging.carries_classes() {
            self.detail(format_args!(
                "Skipping {}: '{}' packaging has no classes",
                project.id, project.id.packaging
            ));
            return Ok(result);
        }

        self.detail(format_args!(
            "Analyzing classes found in {}",
            project.output_dir.display()
        ));
        let scan = scan_directory(&project.output_dir)?;
        if let Some(warning) = &scan.warning {
            eprintln!("{} {}", style("⚠").yellow(), warning);
        }
        if scan.skipped_signatures > 0 {
            self.detail(format_args!(
                "Skipped {} in {}",
                counted(scan.skipped_signatures, "malformed signature"),
                project.output_dir.display()
            ));
        }
        let mut referenced = scan.referenced;
        self.summary(
            project,
            format_args!(
                "References to {} found",
                counted(referenced.len(), "external class")
            ),
        );

        // Direct dependencies
        let direct_indexes = self.indexer.index_all(&self.relevant(project, direct, "direct"))?;
        let mut satisfied = BTreeSet::new();
        let mut direct_class_count = 0;
        for index in &direct_indexes {
            self.log_index(index, "direct");
            direct_class_count += index.classes.len();

            let used: Vec<&ClassName> = index.classes.intersection(&referenced).collect();
            for class in &used {
                self.detail(format_args!(" - referenced class found: {class}"));
            }
            if used.is_empty() {
                if options.check_unused {
                    result.mark_unused(index.artifact.clone());
                }
            } else {
                satisfied.extend(used.into_iter().cloned());
            }
        }
        referenced.retain(|class| !satisfied.contains(class));

        self.summary(
            project,
            format_args!(
                "Found {} with {}",
                counted(direct_indexes.len(), "direct dependency"),
                counted(direct_class_count, "class")
            ),
        );
        if options.check_unused && result.has_unused_direct_dependencies() {
            self.summary(
                project,
                format_args!(
                    "{} found",
                    counted(
                        result.unused_direct_dependencies().len(),
                        "potentially unused dependency"
                    )
                ),
            );
        }

        if referenced.is_empty() || !options.check_transitive {
            return Ok(result);
        }

        // Transitive dependencies
        let mut transitive_indexes = self
            .indexer
            .index_all(&self.relevant(project, transitive, "transitive"))?;
        // A class declared by several artifacts belongs to the first in coordinate order
        transitive_indexes.sort_by(|a, b| a.artifact.cmp(&b.artifact));
        let mut owners: BTreeMap<&ClassName, &Artifact> = BTreeMap::new();
        for index in &transitive_indexes {
            self.log_index(index, "transitive");
            for class in &index.classes {
                owners.entry(class).or_insert(&index.artifact);
            }
        }

        for class in referenced {
            match owners.get(&class) {
                Some(&artifact) => {
                    self.detail(format_args!(
                        " - class {class} is provided by transitive dependency {artifact}"
                    ));
                    result.record_transitive_use(artifact.clone(), class);
                }
                None => self.detail(format_args!(
                    "No transitive dependency declares referenced class: {class}"
                )),
            }
        }

        if result.has_used_transitive_dependencies() {
            let class_count: usize = result
                .used_classes_of_transitive_dependencies()
                .values()
                .map(BTreeSet::len)
                .sum();
            self.summary(
                project,
                format_args!(
                    "References to {} of {} found",
                    counted(class_count, "class"),
                    counted(
                        result.used_classes_of_transitive_dependencies().len(),
                        "transitive dependency"
                    )
                ),
            );
        }

        Ok(result)
    }

    /// Drops runtime- and test-scoped artifacts and the project itself
    fn relevant(&self, project: &Project, artifacts: &[Artifact], role: &str) -> Vec<Artifact> {
        artifacts
            .iter()
            .filter(|artifact| {
                if !artifact.scope().is_compile_visible() {
                    self.detail(format_args!(
                        "Ignoring {role} dependency {artifact}: not on the compile classpath"
                    ));
                    false
                } else if artifact.is_produced_by(&project.id) {
                    self.detail(format_args!("Ignoring self reference {artifact}"));
                    false
                } else {
                    true
                }
            })
            .cloned()
            .collect()
    }

    fn log_index(&self, index: &ArtifactIndex, role: &str) {
        let artifact = &index.artifact;
        match &index.source {
            ClassSource::Ignored => self.detail(format_args!(
                "Ignoring {role} dependency {artifact}: packaging has no classes"
            )),
            ClassSource::Missing => self.detail(format_args!(
                "No classes available for {role} dependency {artifact}"
            )),
            ClassSource::Archive(path) | ClassSource::Directory(path) => {
                self.detail(format_args!(
                    "Found {} in {role} dependency {artifact} ({})",
                    counted(index.classes.len(), "class"),
                    path.display()
                ))
            }
            ClassSource::Reactor(path) => self.detail(format_args!(
                "Found {} in sibling module {artifact} ({})",
                counted(index.classes.len(), "class"),
                path.display()
            )),
        }
    }

    /// Phase summaries are printed whether or not verbose is set
    fn summary(&self, project: &Project, message: impl Display) {
        eprintln!(
            "{} {} {}",
            style("→").dim(),
            style(format!("{}:", project.id.name)).dim(),
            message
        );
    }

    fn detail(&self, message: impl Display) {
        if self.verbose {
            eprintln!("  {} {}", style("ℹ").blue(), message);
        }
    }
}

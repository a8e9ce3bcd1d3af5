use std::fmt;

use console::style;
use miette::{Result, WrapErr};
use rayon::prelude::*;

use super::archive_indexer::{ArchiveIndexer, Reactor};
use super::dependency_classifier::{ClassifyOptions, DependencyClassifier};
use crate::core::{Artifact, ClassName, Project, ProjectId, ScanResult};
use crate::progress::ProgressReporter;
use crate::resolver::ArtifactResolver;

/// When a finished run counts as failed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViolationPolicy {
    pub fail_if_unused: bool,
    pub fail_if_used_transitive: bool,
    /// Stop after the first project that violates the policy
    pub fail_fast: bool,
}

impl ViolationPolicy {
    pub fn is_violated_by(&self, result: &ScanResult) -> bool {
        (self.fail_if_unused && result.has_unused_direct_dependencies())
            || (self.fail_if_used_transitive && result.has_used_transitive_dependencies())
    }
}

/// A project that could not be analysed
#[derive(Debug)]
pub struct ProjectFailure {
    pub project: ProjectId,
    pub error: miette::Report,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    UnusedDirectDependency {
        project: ProjectId,
        artifact: Artifact,
    },
    UsedTransitiveDependency {
        project: ProjectId,
        artifact: Artifact,
        example: ClassName,
    },
}

impl Violation {
    pub fn project(&self) -> &ProjectId {
        match self {
            Violation::UnusedDirectDependency { project, .. }
            | Violation::UsedTransitiveDependency { project, .. } => project,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::UnusedDirectDependency { artifact, .. } => {
                write!(f, "unused direct dependency: {artifact}")
            }
            Violation::UsedTransitiveDependency {
                artifact, example, ..
            } => write!(f, "used transitive dependency: {artifact} (using e.g. {example})"),
        }
    }
}

/// Outcome of a whole run, produced once after every project is analysed
#[derive(Debug)]
pub struct RunSummary {
    results: Vec<ScanResult>,
    failures: Vec<ProjectFailure>,
    policy: ViolationPolicy,
    /// Set when analysis stopped early under `fail_fast`
    stopped_early: bool,
}

impl RunSummary {
    pub fn results(&self) -> &[ScanResult] {
        &self.results
    }

    pub fn failures(&self) -> &[ProjectFailure] {
        &self.failures
    }

    pub fn policy(&self) -> ViolationPolicy {
        self.policy
    }

    pub fn stopped_early(&self) -> bool {
        self.stopped_early
    }

    fn with_stopped_early(mut self, stopped_early: bool) -> Self {
        self.stopped_early = stopped_early;
        self
    }

    pub fn has_unused_direct_dependencies(&self) -> bool {
        self.results
            .iter()
            .any(ScanResult::has_unused_direct_dependencies)
    }

    pub fn has_used_transitive_dependencies(&self) -> bool {
        self.results
            .iter()
            .any(ScanResult::has_used_transitive_dependencies)
    }

    /// Every finding across all projects, in project order
    pub fn violations(&self) -> Vec<Violation> {
        let mut violations = Vec::new();
        for result in &self.results {
            for artifact in result.unused_direct_dependencies() {
                violations.push(Violation::UnusedDirectDependency {
                    project: result.project().clone(),
                    artifact: artifact.clone(),
                });
            }
            for (artifact, classes) in result.used_classes_of_transitive_dependencies() {
                if let Some(example) = classes.first() {
                    violations.push(Violation::UsedTransitiveDependency {
                        project: result.project().clone(),
                        artifact: artifact.clone(),
                        example: example.clone(),
                    });
                }
            }
        }
        violations
    }

    /// Whether the caller should report failure
    pub fn should_fail(&self) -> bool {
        !self.failures.is_empty() || self.results.iter().any(|r| self.policy.is_violated_by(r))
    }
}

/// Runs the two-phase analysis: [`ProjectAnalyzer::analyze_project`] once per
/// project, then [`finalize_run`] once over all results.
pub struct ProjectAnalyzer<R> {
    resolver: R,
    indexer: ArchiveIndexer,
    options: ClassifyOptions,
    verbose: bool,
}

impl<R: ArtifactResolver> ProjectAnalyzer<R> {
    pub fn new(resolver: R, reactor: Reactor) -> Self {
        Self {
            resolver,
            indexer: ArchiveIndexer::new(reactor),
            options: ClassifyOptions::default(),
            verbose: false,
        }
    }

    pub fn with_options(mut self, options: ClassifyOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn options(&self) -> ClassifyOptions {
        self.options
    }

    /// Resolves the project's dependencies and classifies them
    pub fn analyze_project(&self, project: &Project) -> Result<ScanResult> {
        let direct = self.resolve_all(&project.direct_dependencies);
        let transitive = self.resolve_all(&project.transitive_dependencies);

        DependencyClassifier::new(&self.indexer)
            .with_verbose(self.verbose)
            .classify(project, &direct, &transitive, self.options)
            .wrap_err_with(|| format!("Failed to analyze project '{}'", project.id))
    }

    /// Analyses projects in parallel. A failing project does not stop its
    /// siblings; failures are returned next to the successful results, in
    /// input order.
    pub fn analyze_projects(
        &self,
        projects: &[Project],
        progress: Option<&ProgressReporter>,
    ) -> (Vec<ScanResult>, Vec<ProjectFailure>) {
        projects
            .par_iter()
            .map(|project| {
                let outcome = self.analyze_project(project);
                if let Some(p) = progress {
                    p.project_analyzed(&project.id.name);
                }
                outcome.map_err(|error| ProjectFailure {
                    project: project.id.clone(),
                    error,
                })
            })
            .partition_map(|outcome| match outcome {
                Ok(result) => rayon::iter::Either::Left(result),
                Err(failure) => rayon::iter::Either::Right(failure),
            })
    }

    /// Analyses projects one at a time and stops at the first one that
    /// fails or violates `policy`
    pub fn analyze_projects_fail_fast(
        &self,
        projects: &[Project],
        policy: ViolationPolicy,
        progress: Option<&ProgressReporter>,
    ) -> (Vec<ScanResult>, Vec<ProjectFailure>, bool) {
        let mut results = Vec::new();
        let mut failures = Vec::new();

        for project in projects {
            let outcome = self.analyze_project(project);
            if let Some(p) = progress {
                p.project_analyzed(&project.id.name);
            }
            match outcome {
                Ok(result) => {
                    let violated = policy.is_violated_by(&result);
                    results.push(result);
                    if violated {
                        return (results, failures, true);
                    }
                }
                Err(error) => {
                    failures.push(ProjectFailure {
                        project: project.id.clone(),
                        error,
                    });
                    return (results, failures, true);
                }
            }
        }
        (results, failures, false)
    }

    /// Runs the whole analysis and produces the summary
    pub fn run(
        &self,
        projects: &[Project],
        policy: ViolationPolicy,
        progress: Option<&ProgressReporter>,
    ) -> RunSummary {
        let (results, failures, stopped_early) = if policy.fail_fast {
            self.analyze_projects_fail_fast(projects, policy, progress)
        } else {
            let (results, failures) = self.analyze_projects(projects, progress);
            (results, failures, false)
        };
        finalize_run(results, failures, policy).with_stopped_early(stopped_early)
    }

    fn resolve_all(&self, artifacts: &[Artifact]) -> Vec<Artifact> {
        artifacts
            .iter()
            .map(|artifact| {
                if !artifact.artifact_type().carries_classes()
                    || self.indexer.reactor().output_dir_for(artifact).is_some()
                {
                    return artifact.clone();
                }
                match self.resolver.resolve(artifact) {
                    Ok(resolved) => resolved,
                    Err(e) => {
                        eprintln!("{} {}", style("⚠").yellow(), e);
                        artifact.clone()
                    }
                }
            })
            .collect()
    }
}

/// Combines per-project outcomes once the last project is done
pub fn finalize_run(
    results: Vec<ScanResult>,
    failures: Vec<ProjectFailure>,
    policy: ViolationPolicy,
) -> RunSummary {
    for failure in &failures {
        eprintln!(
            "{} Failed to analyze project '{}': {:?}",
            style("⚠").yellow(),
            failure.project,
            failure.error
        );
    }

    RunSummary {
        results,
        failures,
        policy,
        stopped_early: false,
    }
}

//! Command executors that handle the actual logic for each command

pub mod check;
pub mod refs;
pub mod suggest;

use std::path::{Path, PathBuf};

use console::style;
use miette::{IntoDiagnostic, Result, WrapErr};

use crate::analyzer::{ClassifyOptions, ProjectAnalyzer, Reactor, RunSummary, ViolationPolicy};
use crate::core::Project;
use crate::progress::ProgressReporter;
use crate::project_discovery::ProjectDiscovery;
use crate::resolver::LocalRepositoryResolver;

/// Trait for command executors
pub trait CommandExecutor {
    type Config;

    /// Execute the command with the given configuration
    fn execute(config: Self::Config) -> Result<()>;
}

/// Settings shared by the commands that analyse projects
pub(crate) struct AnalysisRun<'a> {
    pub paths: &'a [PathBuf],
    pub repository: Option<&'a Path>,
    pub verbose: bool,
    pub options: ClassifyOptions,
    pub policy: ViolationPolicy,
}

impl AnalysisRun<'_> {
    /// Discovers the projects under `paths` and analyses all of them.
    /// Returns `None` when there was nothing to analyse.
    pub fn execute(&self) -> Result<Option<RunSummary>> {
        // Create progress reporter if we're in an interactive terminal
        let mut progress = if console::Term::stderr().is_term() {
            Some(ProgressReporter::new())
        } else {
            None
        };

        if let Some(p) = progress.as_mut() {
            p.start_discovery();
        }
        let projects = ProjectDiscovery::new()
            .discover_all(self.paths, progress.as_ref())
            .wrap_err("Failed to discover projects")?;
        if let Some(p) = progress.as_mut() {
            p.finish_discovery(projects.len());
        }

        if projects.is_empty() {
            eprintln!("{} No projects found to analyze", style("ℹ").blue());
            return Ok(None);
        }

        let resolver = match self.repository {
            Some(root) => LocalRepositoryResolver::new(root),
            None => LocalRepositoryResolver::user_default().into_diagnostic()?,
        };
        if self.verbose {
            log_projects(&projects, &resolver);
        }

        let analyzer = ProjectAnalyzer::new(resolver, Reactor::from_projects(&projects))
            .with_options(self.options)
            .with_verbose(self.verbose);

        if let Some(p) = progress.as_mut() {
            p.start_analysis(projects.len());
        }
        let summary = analyzer.run(&projects, self.policy, progress.as_ref());
        if let Some(p) = progress.as_mut() {
            p.finish_analysis();
            p.report_outcome(summary.violations().len());
        }

        Ok(Some(summary))
    }
}

fn log_projects(projects: &[Project], resolver: &LocalRepositoryResolver) {
    eprintln!(
        "  {} Resolving dependencies from {}",
        style("→").dim(),
        resolver.root().display()
    );
    for project in projects {
        eprintln!(
            "  {} {} ({})",
            style("→").dim(),
            style(&project.id).bold(),
            project.output_dir.display()
        );
    }
}

pub(crate) fn skip_requested() {
    eprintln!("{} Skipping execution as requested", style("ℹ").blue());
}

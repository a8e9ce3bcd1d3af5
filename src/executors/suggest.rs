//! Suggest command executor

use console::style;
use miette::{IntoDiagnostic, Result, WrapErr};

use super::{AnalysisRun, skip_requested};
use crate::analyzer::{ClassifyOptions, ViolationPolicy};
use crate::config::SuggestConfig;
use crate::executors::CommandExecutor;
use crate::reports::{ReportGenerator, SuggestionReportGenerator};

pub struct SuggestExecutor;

impl CommandExecutor for SuggestExecutor {
    type Config = SuggestConfig;

    fn execute(config: Self::Config) -> Result<()> {
        if config.skip {
            skip_requested();
            return Ok(());
        }

        eprintln!(
            "{} Looking for used transitive dependencies...\n",
            style("🧹").cyan()
        );

        let run = AnalysisRun {
            paths: &config.paths,
            repository: config.repository.as_deref(),
            verbose: config.verbose,
            options: ClassifyOptions {
                check_unused: false,
                check_transitive: true,
            },
            policy: ViolationPolicy::default(),
        };
        let Some(summary) = run.execute()? else {
            return Ok(());
        };

        let report = SuggestionReportGenerator::new()
            .generate_report(&summary)
            .into_diagnostic()
            .wrap_err("Failed to render suggestions")?;
        print!("{report}");

        if !summary.failures().is_empty() {
            std::process::exit(1);
        }

        Ok(())
    }
}

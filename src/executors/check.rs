//! Check command executor

use console::style;
use miette::{IntoDiagnostic, Result, WrapErr};

use super::{AnalysisRun, skip_requested};
use crate::cli::OutputFormat;
use crate::config::CheckConfig;
use crate::executors::CommandExecutor;
use crate::reports::{
    GitHubReportGenerator, HumanReportGenerator, JsonReportGenerator, JunitReportGenerator,
    ReportGenerator,
};

pub struct CheckExecutor;

impl CommandExecutor for CheckExecutor {
    type Config = CheckConfig;

    fn execute(config: Self::Config) -> Result<()> {
        if config.skip {
            skip_requested();
            return Ok(());
        }

        eprintln!("{} Checking project dependencies...\n", style("🧹").cyan());
        eprintln!(
            "  {} Unused direct dependencies: {}",
            style("→").dim(),
            if config.check_unused {
                style("checked").green()
            } else {
                style("ignored").red()
            }
        );
        eprintln!(
            "  {} Used transitive dependencies: {}",
            style("→").dim(),
            if config.check_transitive {
                style("checked").green()
            } else {
                style("ignored").red()
            }
        );

        let run = AnalysisRun {
            paths: &config.paths,
            repository: config.repository.as_deref(),
            verbose: config.verbose,
            options: config.classify_options(),
            policy: config.policy(),
        };
        let Some(summary) = run.execute()? else {
            return Ok(());
        };

        // Generate report based on format
        let report_result = match config.format {
            OutputFormat::Human => {
                let generator = HumanReportGenerator::new(config.max_classes);
                generator.generate_report(&summary)
            }
            OutputFormat::Json => {
                let generator = JsonReportGenerator::new();
                generator.generate_report(&summary)
            }
            OutputFormat::Junit => {
                let generator = JunitReportGenerator::new();
                generator.generate_report(&summary)
            }
            OutputFormat::GitHub => {
                let generator = GitHubReportGenerator::new();
                generator.generate_report(&summary)
            }
        };

        match report_result {
            Ok(report) => print!("{report}"),
            Err(e) => {
                return Err(e)
                    .into_diagnostic()
                    .wrap_err("Failed to generate report");
            }
        }

        // Exit with error code if the policy was violated or a project failed
        if summary.should_fail() {
            std::process::exit(1);
        }

        Ok(())
    }
}

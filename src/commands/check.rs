//! Check command implementation

use miette::{Result, WrapErr};

use crate::cli::Commands;
use crate::common::{ConfigBuilder, FromCommand};
use crate::config::CheckConfig;
use crate::error::DepsweepError;

impl FromCommand for CheckConfig {
    fn from_command(command: Commands) -> Result<Self, DepsweepError> {
        match command {
            Commands::Check {
                common,
                format,
                fail_if_unused,
                fail_if_used_transitive,
                fail_fast,
                ignore_unused,
                ignore_transitive,
                max_classes,
            } => CheckConfig::builder()
                .with_paths(common.get_paths())
                .with_format(format.format)
                .with_verbose(common.verbose)
                .with_repository(common.repository)
                .with_skip(common.skip)
                .with_fail_if_unused(fail_if_unused)
                .with_fail_if_used_transitive(fail_if_used_transitive)
                .with_fail_fast(fail_fast)
                .with_check_unused(!ignore_unused)
                .with_check_transitive(!ignore_transitive)
                .with_max_classes(max_classes)
                .build(),
            _ => Err(DepsweepError::ConfigurationError {
                message: "Invalid command type for CheckConfig".to_string(),
            }),
        }
    }
}

crate::impl_try_from_command!(CheckConfig);

/// Execute the check command for classifying project dependencies
pub fn execute_check_command(command: Commands) -> Result<()> {
    let config = CheckConfig::from_command(command)
        .wrap_err("Failed to parse check command configuration")?;

    use crate::executors::CommandExecutor;
    use crate::executors::check::CheckExecutor;
    CheckExecutor::execute(config)
}

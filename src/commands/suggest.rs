//! Suggest command implementation

use miette::{Result, WrapErr};

use crate::cli::Commands;
use crate::common::{ConfigBuilder, FromCommand};
use crate::config::SuggestConfig;
use crate::error::DepsweepError;

impl FromCommand for SuggestConfig {
    fn from_command(command: Commands) -> Result<Self, DepsweepError> {
        match command {
            Commands::Suggest { common } => SuggestConfig::builder()
                .with_paths(common.get_paths())
                .with_verbose(common.verbose)
                .with_repository(common.repository)
                .with_skip(common.skip)
                .build(),
            _ => Err(DepsweepError::ConfigurationError {
                message: "Invalid command type for SuggestConfig".to_string(),
            }),
        }
    }
}

crate::impl_try_from_command!(SuggestConfig);

/// Execute the suggest command
pub fn execute_suggest_command(command: Commands) -> Result<()> {
    let config = SuggestConfig::from_command(command)
        .wrap_err("Failed to parse suggest command configuration")?;

    use crate::executors::CommandExecutor;
    use crate::executors::suggest::SuggestExecutor;
    SuggestExecutor::execute(config)
}

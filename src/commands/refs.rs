//! Refs command implementation

use miette::{Result, WrapErr};

use crate::cli::Commands;
use crate::common::{ConfigBuilder, FromCommand};
use crate::config::RefsConfig;
use crate::error::DepsweepError;

impl FromCommand for RefsConfig {
    fn from_command(command: Commands) -> Result<Self, DepsweepError> {
        match command {
            Commands::Refs {
                path,
                kinds,
                format,
            } => RefsConfig::builder()
                .with_path(path)
                .with_kinds(kinds)
                .with_format(format)
                .build(),
            _ => Err(DepsweepError::ConfigurationError {
                message: "Invalid command type for RefsConfig".to_string(),
            }),
        }
    }
}

crate::impl_try_from_command!(RefsConfig);

/// Execute the refs command
pub fn execute_refs_command(command: Commands) -> Result<()> {
    let config = RefsConfig::from_command(command)
        .wrap_err("Failed to parse refs command configuration")?;

    use crate::executors::CommandExecutor;
    use crate::executors::refs::RefsExecutor;
    RefsExecutor::execute(config)
}

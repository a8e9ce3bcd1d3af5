//! Common functionality shared across commands

use std::path::PathBuf;

use clap::Args;

/// Common arguments shared by the project-analysing commands
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Paths to analyze: directories or depsweep.toml files (defaults to
    /// current directory)
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Log every step of the analysis
    #[arg(short, long, env = "DEPSWEEP_VERBOSE")]
    pub verbose: bool,

    /// Local repository that dependencies without a path are resolved from
    /// (defaults to ~/.m2/repository)
    #[arg(long, value_name = "DIR", env = crate::constants::repository::ENV_VAR)]
    pub repository: Option<PathBuf>,

    /// Do nothing and succeed
    #[arg(long, env = "DEPSWEEP_SKIP")]
    pub skip: bool,
}

/// Common output format arguments
#[derive(Args, Debug, Clone)]
pub struct FormatArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = crate::constants::output::DEFAULT_FORMAT, env = "DEPSWEEP_FORMAT")]
    pub format: crate::cli::OutputFormat,
}

impl CommonArgs {
    /// Get paths, using current directory if none provided
    pub fn get_paths(&self) -> Vec<PathBuf> {
        if self.paths.is_empty() {
            vec![std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))]
        } else {
            self.paths.clone()
        }
    }
}

/// Generic builder trait for configuration objects
pub trait ConfigBuilder: Sized {
    type Config;

    /// Build the configuration, returning an error if validation fails
    fn build(self) -> Result<Self::Config, crate::error::DepsweepError>;
}

/// Trait for configurations that can be created from CLI commands
/// This trait simplifies command-to-config conversions
pub trait FromCommand: Sized {
    /// The command variant that this config can be created from
    fn from_command(command: crate::cli::Commands) -> Result<Self, crate::error::DepsweepError>;
}

/// Macro to implement `TryFrom<Commands>` using [`FromCommand`] trait
#[macro_export]
macro_rules! impl_try_from_command {
    ($config:ty) => {
        impl std::convert::TryFrom<$crate::cli::Commands> for $config {
            type Error = $crate::error::DepsweepError;

            fn try_from(command: $crate::cli::Commands) -> Result<Self, Self::Error> {
                <$config as $crate::common::FromCommand>::from_command(command)
            }
        }
    };
}

/// Missing-field error used by the config builders
pub(crate) fn missing_field(field: &str) -> crate::error::DepsweepError {
    crate::error::DepsweepError::ConfigurationError {
        message: format!("Missing required field: {field}"),
    }
}

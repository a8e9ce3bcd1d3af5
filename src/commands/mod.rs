//! Command implementations for the depsweep CLI
//!
//! This module contains the implementations for each CLI command:
//! - check: Classify the dependencies of discovered projects
//! - suggest: Print entries for used transitive dependencies
//! - refs: List the classes compiled classes refer to

pub mod check;
pub mod refs;
pub mod suggest;

use miette::Result;

use crate::cli::Commands;

/// Execute a command based on CLI input
pub fn execute_command(command: Commands) -> Result<()> {
    match &command {
        Commands::Check { .. } => check::execute_check_command(command),
        Commands::Suggest { .. } => suggest::execute_suggest_command(command),
        Commands::Refs { .. } => refs::execute_refs_command(command),
    }
}

//! Configuration constants for depsweep
//!
//! This module contains the fixed values used throughout the application:
//! file names, class-file format bounds and terminal presentation.

use std::time::Duration;

/// Progress bar configuration
pub mod progress {
    use super::*;

    /// Duration between progress bar updates
    pub const TICK_INTERVAL: Duration = Duration::from_millis(100);

    /// Spinner frames for the broom animation
    pub const SPINNER_FRAMES: &[&str] = &["🧹 ", "🧹·", "🧹∙", "🧹•", "🧹●", "🧹•", "🧹∙", "🧹·"];
}

/// Output formatting configuration
pub mod output {
    /// Default output format when not specified
    pub const DEFAULT_FORMAT: &str = "human";
}

/// Project descriptor files
pub mod manifest {
    /// File name of a project descriptor
    pub const FILE_NAME: &str = "depsweep.toml";

    /// Output directory used when a descriptor does not name one
    pub const DEFAULT_OUTPUT_DIR: &str = "target/classes";

    /// Directories never descended into during discovery
    pub const SKIPPED_DIRS: &[&str] = &["target", "build", ".git", "node_modules", ".gradle"];
}

/// Class-file format
pub mod classfile {
    pub const MAGIC: u32 = 0xCAFE_BABE;

    /// Java 1.1
    pub const MIN_MAJOR_VERSION: u16 = 45;

    /// Java 26
    pub const MAX_MAJOR_VERSION: u16 = 70;

    pub const CLASS_FILE_SUFFIX: &str = ".class";

    pub const CLASS_FILE_EXTENSION: &str = "class";
}

/// Local artifact repository
pub mod repository {
    /// Repository location relative to the user's home directory
    pub const DEFAULT_RELATIVE_PATH: &str = ".m2/repository";

    /// Environment variable overriding the repository location
    pub const ENV_VAR: &str = "DEPSWEEP_REPOSITORY";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_constants() {
        assert_eq!(progress::TICK_INTERVAL, Duration::from_millis(100));
        assert_eq!(progress::SPINNER_FRAMES.len(), 8);
    }

    #[test]
    fn test_output_constants() {
        assert_eq!(output::DEFAULT_FORMAT, "human");
    }

    #[test]
    fn test_classfile_constants() {
        assert_eq!(classfile::MAGIC.to_be_bytes(), [0xCA, 0xFE, 0xBA, 0xBE]);
        assert!(classfile::MIN_MAJOR_VERSION < classfile::MAX_MAJOR_VERSION);
        assert_eq!(
            classfile::CLASS_FILE_SUFFIX,
            format!(".{}", classfile::CLASS_FILE_EXTENSION)
        );
    }

    #[test]
    fn test_manifest_constants() {
        assert_eq!(manifest::FILE_NAME, "depsweep.toml");
        assert!(manifest::SKIPPED_DIRS.contains(&"target"));
    }
}

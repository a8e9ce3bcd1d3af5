//! Check command configuration

use std::path::PathBuf;

use crate::analyzer::{ClassifyOptions, ViolationPolicy};
use crate::cli::OutputFormat;
use crate::common::missing_field;

/// Configuration for the check command
///
/// This struct contains all options for classifying and reporting the
/// dependencies of discovered projects.
#[derive(Debug, Clone)]
pub struct CheckConfig {
    /// Directories or descriptor files to search for projects
    pub paths: Vec<PathBuf>,
    /// Output format for the report
    pub format: OutputFormat,
    /// Log every analysis step
    pub verbose: bool,
    /// Local repository root; the user default when `None`
    pub repository: Option<PathBuf>,
    /// Skip execution entirely
    pub skip: bool,
    /// Exit with error code if unused direct dependencies are found
    pub fail_if_unused: bool,
    /// Exit with error code if transitive dependencies are used
    pub fail_if_used_transitive: bool,
    /// Stop at the first project that violates the policy
    pub fail_fast: bool,
    /// Look for unused direct dependencies
    pub check_unused: bool,
    /// Look for used transitive dependencies
    pub check_transitive: bool,
    /// Maximum number of classes listed per transitive dependency (None = all)
    pub max_classes: Option<usize>,
}

impl CheckConfig {
    pub fn builder() -> CheckConfigBuilder {
        CheckConfigBuilder::new()
    }

    pub fn policy(&self) -> ViolationPolicy {
        ViolationPolicy {
            fail_if_unused: self.fail_if_unused,
            fail_if_used_transitive: self.fail_if_used_transitive,
            fail_fast: self.fail_fast,
        }
    }

    pub fn classify_options(&self) -> ClassifyOptions {
        ClassifyOptions {
            check_unused: self.check_unused,
            check_transitive: self.check_transitive,
        }
    }
}

#[derive(Default)]
pub struct CheckConfigBuilder {
    paths: Option<Vec<PathBuf>>,
    format: Option<OutputFormat>,
    verbose: Option<bool>,
    repository: Option<Option<PathBuf>>,
    skip: Option<bool>,
    fail_if_unused: Option<bool>,
    fail_if_used_transitive: Option<bool>,
    fail_fast: Option<bool>,
    check_unused: Option<bool>,
    check_transitive: Option<bool>,
    max_classes: Option<Option<usize>>,
}

impl CheckConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.paths = Some(paths);
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = Some(verbose);
        self
    }

    pub fn with_repository(mut self, repository: Option<PathBuf>) -> Self {
        self.repository = Some(repository);
        self
    }

    pub fn with_skip(mut self, skip: bool) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn with_fail_if_unused(mut self, fail_if_unused: bool) -> Self {
        self.fail_if_unused = Some(fail_if_unused);
        self
    }

    pub fn with_fail_if_used_transitive(mut self, fail_if_used_transitive: bool) -> Self {
        self.fail_if_used_transitive = Some(fail_if_used_transitive);
        self
    }

    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = Some(fail_fast);
        self
    }

    pub fn with_check_unused(mut self, check_unused: bool) -> Self {
        self.check_unused = Some(check_unused);
        self
    }

    pub fn with_check_transitive(mut self, check_transitive: bool) -> Self {
        self.check_transitive = Some(check_transitive);
        self
    }

    pub fn with_max_classes(mut self, max_classes: Option<usize>) -> Self {
        self.max_classes = Some(max_classes);
        self
    }
}

impl crate::common::ConfigBuilder for CheckConfigBuilder {
    type Config = CheckConfig;

    fn build(self) -> Result<Self::Config, crate::error::DepsweepError> {
        Ok(CheckConfig {
            paths: self.paths.ok_or_else(|| missing_field("paths"))?,
            format: self.format.ok_or_else(|| missing_field("format"))?,
            verbose: self.verbose.unwrap_or(false),
            repository: self.repository.unwrap_or(None),
            skip: self.skip.unwrap_or(false),
            fail_if_unused: self
                .fail_if_unused
                .ok_or_else(|| missing_field("fail_if_unused"))?,
            fail_if_used_transitive: self
                .fail_if_used_transitive
                .ok_or_else(|| missing_field("fail_if_used_transitive"))?,
            fail_fast: self.fail_fast.unwrap_or(false),
            check_unused: self.check_unused.unwrap_or(true),
            check_transitive: self.check_transitive.unwrap_or(true),
            max_classes: self.max_classes.unwrap_or(None),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ConfigBuilder;

    #[test]
    fn test_builder_defaults() {
        let config = CheckConfig::builder()
            .with_paths(vec![".".into()])
            .with_format(OutputFormat::Human)
            .with_fail_if_unused(true)
            .with_fail_if_used_transitive(false)
            .build()
            .unwrap();

        assert!(config.check_unused);
        assert!(config.check_transitive);
        assert!(!config.skip);
        assert_eq!(
            config.policy(),
            ViolationPolicy {
                fail_if_unused: true,
                fail_if_used_transitive: false,
                fail_fast: false,
            }
        );
    }

    #[test]
    fn test_builder_requires_paths() {
        let err = CheckConfig::builder()
            .with_format(OutputFormat::Json)
            .with_fail_if_unused(false)
            .with_fail_if_used_transitive(false)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("Missing required field: paths"));
    }
}

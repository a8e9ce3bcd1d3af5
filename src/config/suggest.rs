//! Suggest command configuration

use std::path::PathBuf;

use crate::common::missing_field;

/// Configuration for the suggest command
#[derive(Debug, Clone)]
pub struct SuggestConfig {
    pub paths: Vec<PathBuf>,
    pub verbose: bool,
    pub repository: Option<PathBuf>,
    pub skip: bool,
}

impl SuggestConfig {
    pub fn builder() -> SuggestConfigBuilder {
        SuggestConfigBuilder::default()
    }
}

#[derive(Default)]
pub struct SuggestConfigBuilder {
    paths: Option<Vec<PathBuf>>,
    verbose: bool,
    repository: Option<PathBuf>,
    skip: bool,
}

impl SuggestConfigBuilder {
    pub fn with_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.paths = Some(paths);
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_repository(mut self, repository: Option<PathBuf>) -> Self {
        self.repository = repository;
        self
    }

    pub fn with_skip(mut self, skip: bool) -> Self {
        self.skip = skip;
        self
    }
}

impl crate::common::ConfigBuilder for SuggestConfigBuilder {
    type Config = SuggestConfig;

    fn build(self) -> Result<Self::Config, crate::error::DepsweepError> {
        Ok(SuggestConfig {
            paths: self.paths.ok_or_else(|| missing_field("paths"))?,
            verbose: self.verbose,
            repository: self.repository,
            skip: self.skip,
        })
    }
}

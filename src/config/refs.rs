//! Refs command configuration

use std::path::PathBuf;

use crate::cli::RefsFormat;
use crate::common::missing_field;

/// Configuration for the refs command
#[derive(Debug, Clone)]
pub struct RefsConfig {
    /// Class file, class directory or jar
    pub path: PathBuf,
    /// Annotate each reference with its kind
    pub kinds: bool,
    pub format: RefsFormat,
}

impl RefsConfig {
    pub fn builder() -> RefsConfigBuilder {
        RefsConfigBuilder::default()
    }
}

#[derive(Default)]
pub struct RefsConfigBuilder {
    path: Option<PathBuf>,
    kinds: bool,
    format: Option<RefsFormat>,
}

impl RefsConfigBuilder {
    pub fn with_path(mut self, path: PathBuf) -> Self {
        self.path = Some(path);
        self
    }

    pub fn with_kinds(mut self, kinds: bool) -> Self {
        self.kinds = kinds;
        self
    }

    pub fn with_format(mut self, format: RefsFormat) -> Self {
        self.format = Some(format);
        self
    }
}

impl crate::common::ConfigBuilder for RefsConfigBuilder {
    type Config = RefsConfig;

    fn build(self) -> Result<Self::Config, crate::error::DepsweepError> {
        Ok(RefsConfig {
            path: self.path.ok_or_else(|| missing_field("path"))?,
            kinds: self.kinds,
            format: self.format.ok_or_else(|| missing_field("format"))?,
        })
    }
}

use std::path::PathBuf;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
#[error("Invalid TOML syntax in '{file}'")]
#[diagnostic(
    code(depsweep::toml_parse_error),
    help("Check the TOML syntax near the highlighted position")
)]
pub struct TomlParseError {
    pub file: String,
    #[source_code]
    pub source_code: NamedSource<String>,
    #[label("syntax error here")]
    pub span: Option<SourceSpan>,
    #[source]
    pub source: toml::de::Error,
}

/// Why a class file could not be decoded
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClassFileErrorKind {
    #[error("bad magic number {0:#010x}")]
    BadMagic(u32),

    #[error("unsupported class file version {major}.{minor}")]
    UnsupportedVersion { major: u16, minor: u16 },

    #[error("unexpected end of data, {needed} more byte(s) needed")]
    Truncated { needed: usize },

    #[error("invalid constant pool index {0}")]
    BadConstantIndex(u16),

    #[error("constant pool entry {index} is not a {expected}")]
    UnexpectedConstant { index: u16, expected: &'static str },

    #[error("unknown constant pool tag {0}")]
    UnknownConstantTag(u8),

    #[error("invalid modified UTF-8 data")]
    BadUtf8,

    #[error("invalid opcode {0:#04x}")]
    BadOpcode(u8),

    #[error("invalid switch bounds")]
    BadSwitch,

    #[error("unknown annotation element tag {0:#04x}")]
    BadElementTag(u8),

    #[error("unknown type annotation target {0:#04x}")]
    BadTargetType(u8),
}

#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
#[error("Malformed class file at byte {offset}: {kind}")]
#[diagnostic(
    code(depsweep::malformed_class_file),
    help("The file is not a valid compiled class; rebuild the project or check for corrupted output")
)]
pub struct ClassFileError {
    pub offset: usize,
    pub kind: ClassFileErrorKind,
}

#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
#[error("Malformed signature '{signature}' at position {position}: {reason}")]
#[diagnostic(
    code(depsweep::malformed_signature),
    help("References from this signature are skipped; the rest of the class is still scanned")
)]
pub struct SignatureError {
    pub signature: String,
    pub position: usize,
    pub reason: &'static str,
}

#[derive(Error, Debug, Diagnostic)]
pub enum DepsweepError {
    #[error("Failed to scan class file '{path}'")]
    #[diagnostic(
        code(depsweep::class_file_error),
        help("Recompile the project; the class output appears to be corrupted")
    )]
    ClassFile {
        path: PathBuf,
        #[source]
        source: ClassFileError,
    },

    #[error("Failed to read archive '{path}'")]
    #[diagnostic(
        code(depsweep::archive_error),
        help("The dependency archive exists but could not be opened; delete it from the local repository and resolve it again")
    )]
    ArchiveRead {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Failed to read file '{path}'")]
    #[diagnostic(
        code(depsweep::io_error),
        help("Check if the file exists and you have read permissions")
    )]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    TomlParseError(Box<TomlParseError>),

    #[error("Invalid project descriptor '{path}': {message}")]
    #[diagnostic(
        code(depsweep::manifest_error),
        help("See the README for the depsweep.toml format")
    )]
    ManifestError { path: PathBuf, message: String },

    #[error("Failed to resolve artifact '{artifact}': {message}")]
    #[diagnostic(
        code(depsweep::resolution_error),
        help("Set an explicit 'path' for the dependency or point --repository at the right local repository")
    )]
    ArtifactResolution { artifact: String, message: String },

    #[error("JSON serialization error")]
    #[diagnostic(
        code(depsweep::json_error),
        help("This is likely an internal error - please report it")
    )]
    Json(#[from] serde_json::Error),

    #[error("TOML serialization error")]
    #[diagnostic(
        code(depsweep::toml_error),
        help("This is likely an internal error - please report it")
    )]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("String formatting error")]
    #[diagnostic(
        code(depsweep::fmt_error),
        help("This is likely an internal error - please report it")
    )]
    Fmt(#[from] std::fmt::Error),

    #[error("IO error")]
    #[diagnostic(
        code(depsweep::io_error),
        help("Check file permissions and disk space")
    )]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    #[diagnostic(
        code(depsweep::config_error),
        help("Check your command arguments and configuration")
    )]
    ConfigurationError { message: String },
}

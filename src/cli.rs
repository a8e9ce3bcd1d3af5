use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::common::{CommonArgs, FormatArgs};

#[derive(Parser)]
#[command(
    name = "depsweep",
    about = "🧹 Find unused and undeclared dependencies of compiled JVM projects",
    long_about = "depsweep reads the compiled classes of your projects and the archives of their \
                  dependencies, then reports direct dependencies no class refers to and classes \
                  that are only reachable through transitive dependencies.",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check projects for unused and used-only-transitively dependencies
    ///
    /// Discovers depsweep.toml descriptors, scans each project's compiled
    /// classes and classifies its declared dependencies.
    #[command(
        long_about = "Analyze the dependencies of every project found under the given paths. \
                      Each project's class output is scanned for referenced classes; direct \
                      dependencies that declare none of them are reported as unused, and \
                      referenced classes that only a transitive dependency declares are reported \
                      with the dependency that provides them. Use --fail-if-unused and \
                      --fail-if-used-transitive to make the command fail in CI."
    )]
    Check {
        #[command(flatten)]
        common: CommonArgs,

        #[command(flatten)]
        format: FormatArgs,

        /// Exit with error code if unused direct dependencies are found
        #[arg(long, env = "DEPSWEEP_FAIL_IF_UNUSED")]
        fail_if_unused: bool,

        /// Exit with error code if classes of transitive dependencies are
        /// used
        #[arg(long, env = "DEPSWEEP_FAIL_IF_USED_TRANSITIVE")]
        fail_if_used_transitive: bool,

        /// Stop at the first project that violates the failure policy
        #[arg(long, env = "DEPSWEEP_FAIL_FAST")]
        fail_fast: bool,

        /// Do not look for unused direct dependencies
        #[arg(long, env = "DEPSWEEP_IGNORE_UNUSED")]
        ignore_unused: bool,

        /// Do not look for used transitive dependencies
        #[arg(long, env = "DEPSWEEP_IGNORE_TRANSITIVE")]
        ignore_transitive: bool,

        /// Maximum number of used classes listed per transitive dependency
        /// (shows all by default)
        #[arg(long, env = "DEPSWEEP_MAX_CLASSES")]
        max_classes: Option<usize>,
    },

    /// Print descriptor entries for used transitive dependencies
    ///
    /// Runs the transitive half of the check and prints the
    /// [[dependencies]] entries that would declare each used transitive
    /// dependency directly. Descriptors are never modified.
    #[command(
        long_about = "Print [[dependencies]] entries for every transitive dependency whose classes \
                      a project uses. Copy them into the project's depsweep.toml to declare the \
                      dependency directly. Enterprise-bean archives are suggested with scope \
                      \"provided\". Files are never rewritten."
    )]
    Suggest {
        #[command(flatten)]
        common: CommonArgs,
    },

    /// List the classes a compiled class refers to
    ///
    /// Scans a single class file, a directory of classes or a jar and
    /// prints every class it references.
    #[command(
        long_about = "Run the class-file reference scanner on a single .class file, on every class \
                      below a directory, or on every class entry of a jar, and print each class's \
                      own name followed by the classes it references. With --kinds each reference \
                      is annotated with where it was found (superclass, field type, method owner, \
                      ...). Useful to understand a surprising classification."
    )]
    Refs {
        /// Class file, directory or jar to scan
        #[arg(value_name = "PATH", env = "DEPSWEEP_REFS_PATH")]
        path: PathBuf,

        /// Show where each reference was found
        #[arg(long, env = "DEPSWEEP_KINDS")]
        kinds: bool,

        /// Output format
        #[arg(
            short,
            long,
            value_enum,
            default_value = "human",
            env = "DEPSWEEP_REFS_FORMAT"
        )]
        format: RefsFormat,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, clap::ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    Junit,
    #[value(name = "github")]
    GitHub,
}

#[derive(Clone, Copy, Debug, PartialEq, clap::ValueEnum)]
pub enum RefsFormat {
    Human,
    Json,
}

//! Refs command executor

use std::collections::BTreeSet;
use std::fmt::Write;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use console::style;
use miette::{IntoDiagnostic, Result, WrapErr};
use rayon::prelude::*;
use serde_json::json;
use zip::ZipArchive;

use crate::analyzer::find_class_files;
use crate::classfile::{self, ClassReferences, Reference};
use crate::cli::RefsFormat;
use crate::config::RefsConfig;
use crate::constants::classfile::{CLASS_FILE_EXTENSION, CLASS_FILE_SUFFIX};
use crate::error::DepsweepError;
use crate::executors::CommandExecutor;
use crate::utils::string::counted;

pub struct RefsExecutor;

impl CommandExecutor for RefsExecutor {
    type Config = RefsConfig;

    fn execute(config: Self::Config) -> Result<()> {
        let classes = scan_path(&config.path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to scan '{}'", config.path.display()))?;

        let skipped: usize = classes
            .iter()
            .map(|c| c.referenced_classes().skipped_signatures.len())
            .sum();
        if skipped > 0 {
            eprintln!(
                "{} Skipped {} while scanning",
                style("⚠").yellow(),
                counted(skipped, "malformed signature")
            );
        }

        let report = match config.format {
            RefsFormat::Human => render_human(&classes, config.kinds),
            RefsFormat::Json => render_json(&classes, config.kinds),
        }
        .into_diagnostic()
        .wrap_err("Failed to generate report")?;
        print!("{report}");

        Ok(())
    }
}

/// Scans a class file, every class under a directory, or every class entry
/// of an archive. Results are sorted by class name.
pub fn scan_path(path: &Path) -> Result<Vec<ClassReferences>, DepsweepError> {
    let mut classes = if path.is_dir() {
        find_class_files(path)?
            .par_iter()
            .map(|file| classfile::scan_file(file))
            .collect::<Result<Vec<_>, _>>()?
    } else if path
        .extension()
        .is_some_and(|ext| ext == CLASS_FILE_EXTENSION)
    {
        vec![classfile::scan_file(path)?]
    } else {
        scan_archive(path)?
    };

    classes.sort_by(|a, b| a.class_name.cmp(&b.class_name));
    Ok(classes)
}

fn scan_archive(path: &Path) -> Result<Vec<ClassReferences>, DepsweepError> {
    let archive_error = |source| DepsweepError::ArchiveRead {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(|source| DepsweepError::FileReadError {
        path: path.to_path_buf(),
        source,
    })?;
    let mut archive = ZipArchive::new(BufReader::new(file)).map_err(archive_error)?;

    let mut classes = Vec::new();
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(archive_error)?;
        if entry.is_dir() || !entry.name().ends_with(CLASS_FILE_SUFFIX) {
            continue;
        }

        let entry_path = PathBuf::from(format!("{}!/{}", path.display(), entry.name()));
        let mut bytes = Vec::with_capacity(entry.size() as usize);
        entry
            .read_to_end(&mut bytes)
            .map_err(|source| DepsweepError::FileReadError {
                path: entry_path.clone(),
                source,
            })?;

        let references = classfile::scan(&bytes).map_err(|source| DepsweepError::ClassFile {
            path: entry_path,
            source,
        })?;
        classes.push(references);
    }
    Ok(classes)
}

/// Distinct (class, kind) pairs, skipping self references
fn kinded_references(class: &ClassReferences) -> BTreeSet<Reference> {
    class
        .references()
        .filter_map(Result::ok)
        .filter(|r| r.class_name != class.class_name)
        .collect()
}

fn render_human(classes: &[ClassReferences], kinds: bool) -> Result<String, DepsweepError> {
    let mut output = String::new();

    for class in classes {
        writeln!(output, "{}", style(&class.class_name).bold())?;

        if kinds {
            for reference in kinded_references(class) {
                writeln!(
                    output,
                    "  {} {} {}",
                    style("→").dim(),
                    reference.class_name,
                    style(format!("({})", reference.kind)).dim()
                )?;
            }
        } else {
            for class_name in class.referenced_classes().classes {
                writeln!(output, "  {} {}", style("→").dim(), class_name)?;
            }
        }
    }

    Ok(output)
}

fn render_json(classes: &[ClassReferences], kinds: bool) -> Result<String, DepsweepError> {
    let entries: Vec<_> = classes
        .iter()
        .map(|class| {
            if kinds {
                json!({
                    "class": class.class_name,
                    "references": kinded_references(class),
                })
            } else {
                json!({
                    "class": class.class_name,
                    "references": class.referenced_classes().classes,
                })
            }
        })
        .collect();

    let mut rendered = serde_json::to_string_pretty(&entries)?;
    rendered.push('\n');
    Ok(rendered)
}

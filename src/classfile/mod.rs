//! Class-file reference extraction
//!
//! Recovers every class a compiled JVM class depends on: header types,
//! field and method types (generic signatures preferred over erased
//! descriptors), thrown and caught exceptions, the operands of field,
//! method, allocation and type-test instructions, loaded class constants,
//! local variable types and every annotation with its class-valued members.
//!
//! ```no_run
//! use depsweep::classfile;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let bytes = std::fs::read("target/classes/com/acme/App.class")?;
//! let references = classfile::scan(&bytes)?;
//! for class in references.referenced_classes().classes {
//!     println!("{} uses {class}", references.class_name);
//! }
//! # Ok(())
//! # }
//! ```

mod constant_pool;
mod reader;
mod references;
mod scanner;
mod signature;

use std::path::Path;

pub use references::{
    ClassReferences, RawType, Reference, ReferenceKind, ReferencedClasses, TypeUse,
};
pub use scanner::scan;
pub use signature::{class_types, parse_signature};

use crate::error::DepsweepError;

/// Reads and scans a class file from disk
pub fn scan_file(path: &Path) -> Result<ClassReferences, DepsweepError> {
    let bytes = std::fs::read(path).map_err(|source| DepsweepError::FileReadError {
        path: path.to_path_buf(),
        source,
    })?;
    scan(&bytes).map_err(|source| DepsweepError::ClassFile {
        path: path.to_path_buf(),
        source,
    })
}

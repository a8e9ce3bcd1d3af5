//! On-disk projects, jars and repositories for end-to-end tests

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use depsweep::core::{Artifact, ArtifactType, ProjectId};
use zip::ZipWriter;
use zip::write::FileOptions;

use super::class_builder::{ClassBuilder, Code, Insn, Method};

pub fn project_id(name: &str) -> ProjectId {
    ProjectId {
        group: "com.acme".to_string(),
        name: name.to_string(),
        version: "1.0.0".to_string(),
        packaging: ArtifactType::Jar,
    }
}

pub fn artifact(group: &str, name: &str, version: &str) -> Artifact {
    Artifact::builder()
        .with_group(group)
        .with_name(name)
        .with_version(version)
        .build()
        .expect("Failed to build artifact")
}

/// A class whose only method instantiates each of `uses`
pub fn class_using(internal_name: &str, uses: &[&str]) -> ClassBuilder {
    let mut instructions: Vec<Insn> = uses
        .iter()
        .map(|class| Insn::New(class.to_string()))
        .collect();
    instructions.push(Insn::Op(0xb1));
    ClassBuilder::new(internal_name).method(Method::new("run", "()V").code(Code::new(instructions)))
}

/// Writes a class below `output_dir` at the path its name implies
pub fn write_class(output_dir: &Path, internal_name: &str, builder: &ClassBuilder) -> PathBuf {
    let path = output_dir.join(format!("{internal_name}.class"));
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, builder.build()).unwrap();
    path
}

/// Writes a jar declaring the given classes; `META-INF` entries are added
/// so the archive looks like a real one
pub fn write_jar(path: &Path, internal_names: &[&str]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut zip = ZipWriter::new(File::create(path).unwrap());

    zip.add_directory("META-INF/", FileOptions::default()).unwrap();
    zip.start_file("META-INF/MANIFEST.MF", FileOptions::default())
        .unwrap();
    zip.write_all(b"Manifest-Version: 1.0\n").unwrap();

    for name in internal_names {
        zip.start_file(format!("{name}.class"), FileOptions::default())
            .unwrap();
        zip.write_all(&ClassBuilder::new(name).build()).unwrap();
    }
    zip.finish().unwrap();
}

/// Path of an artifact inside a Maven-layout repository
pub fn repository_path(repository: &Path, group: &str, name: &str, version: &str) -> PathBuf {
    let mut path = repository.to_path_buf();
    path.extend(group.split('.'));
    path.push(name);
    path.push(version);
    path.push(format!("{name}-{version}.jar"));
    path
}

/// Writes a `depsweep.toml` into `dir`
pub fn write_descriptor(dir: &Path, content: &str) -> PathBuf {
    fs::create_dir_all(dir).unwrap();
    let path = dir.join("depsweep.toml");
    fs::write(&path, content).unwrap();
    path
}

use std::fs;
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::ir::{KindTag, SchemaObject};
use crate::schema::Schema;

/// Deserializes one element file into a `SchemaObject` of the declared kind.
/// The only shipped implementation is `ddlsync-yaml`; kept as a trait so a
/// project could plug in another file type without touching core.
pub trait ObjectReader: Send + Sync {
    fn parse(&self, kind: KindTag, bytes: &[u8]) -> Result<SchemaObject>;
}

/// Serializes one element to bytes for `<plural>/<name>.<extension>`.
pub trait ObjectWriter: Send + Sync {
    fn serialize(&self, object: &SchemaObject) -> Result<Vec<u8>>;
    fn extension(&self) -> &'static str;
}

/// `./<project-name>`.
#[must_use]
pub fn project_root(project_name: &str) -> PathBuf {
    PathBuf::from(project_name)
}

/// `./<project-name>/<plural>`.
#[must_use]
pub fn element_dir(project_name: &str, kind: KindTag) -> PathBuf {
    project_root(project_name).join(kind.plural())
}

/// `./<project-name>/<plural>/<name>.<ext>`. Filenames use the element's
/// `name()` trimmed of outer whitespace (SPEC_FULL.md §4.F).
#[must_use]
pub fn element_path(project_name: &str, kind: KindTag, name: &str, writer: &dyn ObjectWriter) -> PathBuf {
    element_dir(project_name, kind).join(format!("{}.{}", name.trim(), writer.extension()))
}

/// Enumerates files under `./<project>/<plural>` for each of `kinds` and
/// deserializes each into a fresh element, assembling a `Schema`.
pub fn load_project_schema(project_name: &str, kinds: &[KindTag], reader: &dyn ObjectReader) -> Result<Schema> {
    let root = project_root(project_name);
    if !root.is_dir() {
        return Err(Error::ProjectFolderMissing {
            path: root.display().to_string(),
        });
    }
    let mut schema = Schema::new();
    for &kind in kinds {
        let dir = element_dir(project_name, kind);
        if !dir.is_dir() {
            continue;
        }
        let entries = fs::read_dir(&dir).map_err(|source| Error::IoError {
            path: dir.display().to_string(),
            source,
        })?;
        for entry in entries {
            let entry = entry.map_err(|source| Error::IoError {
                path: dir.display().to_string(),
                source,
            })?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let bytes = fs::read(&path).map_err(|source| Error::IoError {
                path: path.display().to_string(),
                source,
            })?;
            schema.add(reader.parse(kind, &bytes)?);
        }
    }
    Ok(schema)
}

/// Writes (or overwrites) one element's file.
pub fn save_element(project_name: &str, object: &SchemaObject, writer: &dyn ObjectWriter) -> Result<()> {
    let dir = element_dir(project_name, object.kind());
    fs::create_dir_all(&dir).map_err(|source| Error::IoError {
        path: dir.display().to_string(),
        source,
    })?;
    let path = element_path(project_name, object.kind(), object.name(), writer);
    let bytes = writer.serialize(object)?;
    fs::write(&path, bytes).map_err(|source| Error::IoError {
        path: path.display().to_string(),
        source,
    })
}

/// Removes one element's file, if present. A `Drop` change against a file
/// target deletes rather than rewrites.
pub fn delete_element(project_name: &str, kind: KindTag, name: &str, writer: &dyn ObjectWriter) -> Result<()> {
    let path = element_path(project_name, kind, name, writer);
    if path.exists() {
        fs::remove_file(&path).map_err(|source| Error::IoError {
            path: path.display().to_string(),
            source,
        })?;
    }
    Ok(())
}

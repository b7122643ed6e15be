//! Reading a document corpus from a directory and writing it back out.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use kdiff_core::model::Document;
use kdiff_core::yaml;
use minijinja::Environment;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::IoError;

/// Extension of files that hold documents. Anything else is skipped.
pub const DOCUMENT_EXTENSION: &str = "yaml";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadState {
    /// Documents in path order, then stream order within a file.
    pub documents: Vec<Document>,
    /// Files that were not read because of their extension.
    pub skipped: Vec<PathBuf>,
}

/// Read every `*.yaml` file below `root`, recursively and in sorted order.
///
/// Each file may hold several documents; empty documents are dropped. A
/// document's source is the path it was read from.
pub fn read_state_from_path(root: &Path) -> Result<ReadState, IoError> {
    let mut state = ReadState::default();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|source| IoError::Walk {
            path: root.to_path_buf(),
            source,
        })?;
        if entry.file_type().is_dir() {
            continue;
        }

        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some(DOCUMENT_EXTENSION) {
            warn!(path = %path.display(), "skipping non-yaml file");
            state.skipped.push(path.to_path_buf());
            continue;
        }

        let text = std::fs::read_to_string(path).map_err(|source| IoError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let objects = yaml::decode_stream(&text).map_err(|source| IoError::Decode {
            path: path.to_path_buf(),
            source,
        })?;

        debug!(path = %path.display(), documents = objects.len(), "read file");
        let source = path.display().to_string();
        state
            .documents
            .extend(objects.into_iter().map(|object| Document::new(source.clone(), object)));
    }

    info!(
        root = %root.display(),
        documents = state.documents.len(),
        skipped = state.skipped.len(),
        "read state"
    );
    Ok(state)
}

/// Replace `dir` with one file per output name.
///
/// The file name is the base name of the document's source, or the result of
/// rendering `output_template` (minijinja syntax) against the document tree.
/// Documents that end up with the same name share one multi-document file,
/// in input order.
pub fn write_state_to_directory(
    documents: &[Document],
    dir: &Path,
    output_template: Option<&str>,
) -> Result<(), IoError> {
    let env = Environment::new();
    let template = output_template
        .map(|t| env.template_from_str(t))
        .transpose()?;

    let mut files: IndexMap<String, Vec<&Document>> = IndexMap::new();
    for doc in documents {
        let name = match &template {
            Some(template) => template.render(&doc.object)?,
            None => base_name(&doc.source),
        };
        let name = name.trim().to_string();
        if !is_plain_file_name(&name) {
            return Err(IoError::FileName {
                name,
                resource: doc.resource_key(),
            });
        }
        files.entry(name).or_default().push(doc);
    }

    match std::fs::remove_dir_all(dir) {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => {
            return Err(IoError::Write {
                path: dir.to_path_buf(),
                source: e,
            });
        }
        _ => {}
    }
    std::fs::create_dir_all(dir).map_err(|source| IoError::Write {
        path: dir.to_path_buf(),
        source,
    })?;

    for (name, docs) in &files {
        let path = dir.join(name);
        let text = yaml::encode_stream(docs.iter().map(|d| &d.object)).map_err(|source| {
            IoError::Encode {
                path: path.clone(),
                source,
            }
        })?;
        std::fs::write(&path, text).map_err(|source| IoError::Write {
            path: path.clone(),
            source,
        })?;
    }

    info!(dir = %dir.display(), files = files.len(), documents = documents.len(), "wrote state");
    Ok(())
}

fn base_name(source: &str) -> String {
    Path::new(source)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}

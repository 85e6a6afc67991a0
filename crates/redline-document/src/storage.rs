//! Reading and atomically writing documents.
//!
//! Writes go to a temporary file in the target's directory which is then
//! renamed over the target, so readers observe either the old bytes or the
//! new bytes and never a partial file.

use std::fs;
use std::io::Write as IoWrite;
use std::path::Path;

use tracing::debug;

use crate::error::DocumentError;
use crate::model::Document;

/// Size of the file at `path` in bytes, read from metadata only.
///
/// # Errors
///
/// Returns [`DocumentError::Missing`] when nothing exists at `path` and
/// [`DocumentError::Read`] for other metadata failures.
pub fn file_size(path: &Path) -> Result<u64, DocumentError> {
    fs::metadata(path)
        .map(|metadata| metadata.len())
        .map_err(|error| DocumentError::read(path.to_path_buf(), &error))
}

/// Reads the raw bytes of the file at `path`.
///
/// # Errors
///
/// Returns [`DocumentError::Missing`] or [`DocumentError::Read`].
pub fn read_bytes(path: &Path) -> Result<Vec<u8>, DocumentError> {
    fs::read(path).map_err(|error| DocumentError::read(path.to_path_buf(), &error))
}

/// Parses document bytes previously read from `path`.
///
/// # Errors
///
/// Returns [`DocumentError::Parse`] when the bytes are not a document.
pub fn decode(path: &Path, bytes: &[u8]) -> Result<Document, DocumentError> {
    serde_json::from_slice(bytes).map_err(|error| DocumentError::Parse {
        path: path.to_path_buf(),
        message: error.to_string(),
    })
}

/// Encodes a document as pretty-printed JSON.
///
/// # Errors
///
/// Returns [`DocumentError::Encode`] when serialisation fails.
pub fn encode(document: &Document) -> Result<Vec<u8>, DocumentError> {
    let mut bytes = serde_json::to_vec_pretty(document).map_err(|error| DocumentError::Encode {
        message: error.to_string(),
    })?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Reads and parses the document at `path`.
///
/// # Errors
///
/// Propagates read and parse failures.
pub fn load(path: &Path) -> Result<Document, DocumentError> {
    let bytes = read_bytes(path)?;
    decode(path, &bytes)
}

/// Encodes `document` and atomically replaces the file at `path`.
///
/// # Errors
///
/// Propagates encoding and write failures.
pub fn save(path: &Path, document: &Document) -> Result<(), DocumentError> {
    let bytes = encode(document)?;
    write_atomic(path, &bytes)
}

/// Atomically replaces the file at `path` with `bytes`.
///
/// # Errors
///
/// Returns [`DocumentError::Write`] when the temporary file cannot be
/// created, written or renamed into place.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), DocumentError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp_file = tempfile::NamedTempFile::new_in(parent)
        .map_err(|error| DocumentError::write(path.to_path_buf(), &error))?;
    temp_file
        .write_all(bytes)
        .map_err(|error| DocumentError::write(path.to_path_buf(), &error))?;
    temp_file
        .as_file()
        .sync_all()
        .map_err(|error| DocumentError::write(path.to_path_buf(), &error))?;
    temp_file
        .persist(path)
        .map_err(|error| DocumentError::write(path.to_path_buf(), &error.error))?;

    debug!(
        target: "redline_document",
        path = %path.display(),
        bytes = bytes.len(),
        "document written"
    );
    Ok(())
}

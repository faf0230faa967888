//! Destinations for finished documents.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::info;
use tempfile::NamedTempFile;
use thiserror::Error;

/// Default file name of a saved invoice.
pub const DEFAULT_FILE_NAME: &str = "invoice.pdf";

/// Errors raised while saving a document.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The requested file name is empty or contains a path separator.
    #[error("invalid document file name `{0}`")]
    InvalidFileName(String),
    /// Writing or persisting the file failed.
    #[error("failed to write {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Where a document ended up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SavedDocument {
    /// Filesystem path for file sinks, the bare file name otherwise.
    pub location: PathBuf,
    pub size: usize,
}

/// Receives finished documents.
pub trait DocumentSink {
    /// Stores `bytes` under `file_name`. Either the whole document is saved or nothing is.
    fn save(&mut self, file_name: &str, bytes: &[u8]) -> Result<SavedDocument, SinkError>;
}

/// Checks that `file_name` names a file and not a path.
pub fn validate_file_name(file_name: &str) -> Result<(), SinkError> {
    let trimmed = file_name.trim();
    if trimmed.is_empty()
        || trimmed.contains(['/', '\\'])
        || trimmed == "."
        || trimmed == ".."
    {
        return Err(SinkError::InvalidFileName(file_name.to_owned()));
    }
    Ok(())
}

/// Writes documents into a directory.
///
/// Bytes go to a temporary file in the target directory first and are renamed
/// into place once complete, so readers never observe a truncated invoice.
#[derive(Clone, Debug)]
pub struct FileSink {
    directory: PathBuf,
}

impl FileSink {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

impl DocumentSink for FileSink {
    fn save(&mut self, file_name: &str, bytes: &[u8]) -> Result<SavedDocument, SinkError> {
        validate_file_name(file_name)?;
        let target = self.directory.join(file_name);
        let io_err = |source| SinkError::Io {
            path: target.clone(),
            source,
        };

        let mut staging = NamedTempFile::new_in(&self.directory).map_err(io_err)?;
        staging.write_all(bytes).map_err(io_err)?;
        staging.as_file().sync_all().map_err(io_err)?;
        staging.persist(&target).map_err(|err| io_err(err.error))?;

        info!("saved {} ({} bytes)", target.display(), bytes.len());
        Ok(SavedDocument {
            location: target,
            size: bytes.len(),
        })
    }
}

/// Keeps saved documents in memory.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    documents: Vec<(String, Vec<u8>)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Saved documents in save order.
    pub fn documents(&self) -> &[(String, Vec<u8>)] {
        &self.documents
    }

    /// Bytes of the most recently saved document named `file_name`.
    pub fn get(&self, file_name: &str) -> Option<&[u8]> {
        self.documents
            .iter()
            .rev()
            .find(|(name, _)| name == file_name)
            .map(|(_, bytes)| bytes.as_slice())
    }
}

impl DocumentSink for MemorySink {
    fn save(&mut self, file_name: &str, bytes: &[u8]) -> Result<SavedDocument, SinkError> {
        validate_file_name(file_name)?;
        self.documents.push((file_name.to_owned(), bytes.to_vec()));
        Ok(SavedDocument {
            location: PathBuf::from(file_name),
            size: bytes.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_paths_as_file_names() {
        for name in ["", "  ", "../invoice.pdf", "a/b.pdf", "a\\b.pdf", ".."] {
            assert!(
                matches!(validate_file_name(name), Err(SinkError::InvalidFileName(_))),
                "{name:?} should be rejected"
            );
        }
        assert!(validate_file_name(DEFAULT_FILE_NAME).is_ok());
    }

    #[test]
    fn file_sink_writes_complete_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut sink = FileSink::new(dir.path());
        let saved = sink.save(DEFAULT_FILE_NAME, b"%PDF-1.3 test").expect("save");
        assert_eq!(saved.location, dir.path().join(DEFAULT_FILE_NAME));
        assert_eq!(saved.size, 13);
        assert_eq!(std::fs::read(&saved.location).expect("read back"), b"%PDF-1.3 test");

        let leftovers = std::fs::read_dir(dir.path()).expect("list").count();
        assert_eq!(leftovers, 1, "staging file must not remain");
    }

    #[test]
    fn file_sink_overwrites_previous_invoice() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut sink = FileSink::new(dir.path());
        sink.save(DEFAULT_FILE_NAME, b"first").expect("save");
        sink.save(DEFAULT_FILE_NAME, b"second").expect("save");
        let bytes = std::fs::read(dir.path().join(DEFAULT_FILE_NAME)).expect("read back");
        assert_eq!(bytes, b"second");
    }

    #[test]
    fn missing_directory_leaves_nothing_behind() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut sink = FileSink::new(dir.path().join("missing"));
        let err = sink.save(DEFAULT_FILE_NAME, b"data").unwrap_err();
        assert!(matches!(err, SinkError::Io { .. }));
        assert!(!dir.path().join("missing").join(DEFAULT_FILE_NAME).exists());
    }

    #[test]
    fn memory_sink_returns_latest_copy() {
        let mut sink = MemorySink::new();
        sink.save("a.pdf", b"one").expect("save");
        sink.save("a.pdf", b"two").expect("save");
        assert_eq!(sink.get("a.pdf"), Some(&b"two"[..]));
        assert_eq!(sink.documents().len(), 2);
    }
}

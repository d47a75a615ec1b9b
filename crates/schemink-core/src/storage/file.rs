//! Sheet documents stored as JSON files.

use super::{BoxFuture, Storage, StorageError, StorageResult, StoredSheet};
use crate::document::Document;
use log::{debug, warn};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// One `<id>.json` file per sheet in a directory.
pub struct FileStorage {
    root: PathBuf,
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> StorageError + '_ {
    move |source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl FileStorage {
    /// Open a storage directory, creating it when missing.
    pub fn new(root: PathBuf) -> StorageResult<Self> {
        fs::create_dir_all(&root).map_err(io_error(&root))?;
        Ok(Self { root })
    }

    /// Storage under the user's local data directory, e.g.
    /// `~/.local/share/schemink/sheets/`.
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::NotFound("local data directory".to_string()))?;
        Self::new(base.join("schemink").join("sheets"))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, id: &str) -> PathBuf {
        let file_stem: String = id
            .chars()
            .map(|c| match c {
                c if c.is_alphanumeric() => c,
                '-' | '_' => c,
                _ => '_',
            })
            .collect();
        self.root.join(file_stem).with_extension("json")
    }

    fn read(path: &Path) -> StorageResult<Document> {
        let json = fs::read_to_string(path).map_err(io_error(path))?;
        Ok(Document::from_json(&json)?)
    }
}

impl Storage for FileStorage {
    fn save(&self, document: &Document) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.path_for(&document.id);
        let json = document.to_json();
        Box::pin(async move {
            fs::write(&path, json?).map_err(io_error(&path))?;
            debug!("Saved sheet to {}", path.display());
            Ok(())
        })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<Document>> {
        let path = self.path_for(id);
        let id = id.to_string();
        Box::pin(async move {
            match Self::read(&path) {
                Err(StorageError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => {
                    Err(StorageError::NotFound(id))
                }
                result => result,
            }
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let path = self.path_for(id);
        Box::pin(async move {
            match fs::remove_file(&path) {
                Ok(()) => Ok(true),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
                Err(e) => Err(io_error(&path)(e)),
            }
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<StoredSheet>>> {
        Box::pin(async move {
            let entries = fs::read_dir(&self.root).map_err(io_error(&self.root))?;
            let mut sheets = Vec::new();
            for path in entries.flatten().map(|entry| entry.path()) {
                if !path.extension().is_some_and(|ext| ext == "json") {
                    continue;
                }
                match Self::read(&path) {
                    Ok(document) => sheets.push(StoredSheet::from(&document)),
                    Err(e) => warn!("Skipping {}: {}", path.display(), e),
                }
            }
            sheets.sort_by(|a, b| a.id.cmp(&b.id));
            Ok(sheets)
        })
    }
}

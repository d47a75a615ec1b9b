//! Persistence of sheet documents.
//!
//! Backends are keyed by [`Document::id`]. Operations return boxed futures
//! so a host can drive them from whatever executor it runs.

mod memory;

#[cfg(not(target_arch = "wasm32"))]
mod file;

pub use memory::MemoryStorage;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;

use crate::document::Document;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("No stored sheet with id {0}")]
    NotFound(String),
    #[error("Malformed sheet document: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Storage lock poisoned")]
    Poisoned,
}

pub type StorageResult<T> = Result<T, StorageError>;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Listing entry for a stored sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSheet {
    pub id: String,
    pub name: String,
    pub sheet: u32,
}

impl From<&Document> for StoredSheet {
    fn from(document: &Document) -> Self {
        Self {
            id: document.id.clone(),
            name: document.name.clone(),
            sheet: document.sheet,
        }
    }
}

/// A place sheet documents are kept.
pub trait Storage: Send + Sync {
    /// Store a document under its id, replacing any earlier version.
    fn save(&self, document: &Document) -> BoxFuture<'_, StorageResult<()>>;

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<Document>>;

    /// Remove a document. Resolves to false if there was nothing to remove.
    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>>;

    /// Every readable stored sheet, ordered by id.
    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<StoredSheet>>>;
}

/// Poll a storage future to completion on the current thread.
#[cfg(test)]
pub(crate) fn block_on<F: Future>(future: F) -> F::Output {
    use std::sync::Arc;
    use std::task::{Context, Poll, Wake, Waker};

    struct Noop;
    impl Wake for Noop {
        fn wake(self: Arc<Self>) {}
    }

    let waker = Waker::from(Arc::new(Noop));
    let mut cx = Context::from_waker(&waker);
    let mut future = std::pin::pin!(future);
    loop {
        if let Poll::Ready(output) = future.as_mut().poll(&mut cx) {
            return output;
        }
    }
}

//! Sheets kept as JSON text in process memory.

use super::{BoxFuture, Storage, StorageError, StorageResult, StoredSheet};
use crate::document::Document;
use std::collections::BTreeMap;
use std::sync::RwLock;

/// Holds the serialized form of each sheet, so a load always hands back a
/// fresh copy and goes through the same decoding as a file.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    sheets: RwLock<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sheets.read().map_or(0, |sheets| sheets.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Storage for MemoryStorage {
    fn save(&self, document: &Document) -> BoxFuture<'_, StorageResult<()>> {
        let encoded = document.to_json().map(|json| (document.id.clone(), json));
        Box::pin(async move {
            let (id, json) = encoded?;
            let mut sheets = self.sheets.write().map_err(|_| StorageError::Poisoned)?;
            sheets.insert(id, json);
            Ok(())
        })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<Document>> {
        let id = id.to_string();
        Box::pin(async move {
            let sheets = self.sheets.read().map_err(|_| StorageError::Poisoned)?;
            let json = sheets.get(&id).ok_or(StorageError::NotFound(id))?;
            Ok(Document::from_json(json)?)
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let id = id.to_string();
        Box::pin(async move {
            let mut sheets = self.sheets.write().map_err(|_| StorageError::Poisoned)?;
            Ok(sheets.remove(&id).is_some())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<StoredSheet>>> {
        Box::pin(async move {
            let sheets = self.sheets.read().map_err(|_| StorageError::Poisoned)?;
            sheets
                .values()
                .map(|json| -> StorageResult<StoredSheet> {
                    Ok(StoredSheet::from(&Document::from_json(json)?))
                })
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::block_on;

    fn sheet(name: &str, number: u32) -> Document {
        Document {
            name: name.to_string(),
            sheet: number,
            ..Document::new()
        }
    }

    #[test]
    fn test_save_replaces_earlier_version() {
        let storage = MemoryStorage::new();
        let mut doc = sheet("Feeder", 1);
        block_on(storage.save(&doc)).unwrap();
        doc.name = "Feeder rev B".to_string();
        block_on(storage.save(&doc)).unwrap();

        assert_eq!(storage.len(), 1);
        assert_eq!(block_on(storage.load(&doc.id)).unwrap(), doc);
    }

    #[test]
    fn test_load_missing_sheet() {
        let storage = MemoryStorage::new();
        let result = block_on(storage.load("nope"));
        assert!(matches!(result, Err(StorageError::NotFound(id)) if id == "nope"));
    }

    #[test]
    fn test_delete_reports_whether_removed() {
        let storage = MemoryStorage::new();
        let doc = sheet("Lighting", 2);
        block_on(storage.save(&doc)).unwrap();
        assert!(block_on(storage.delete(&doc.id)).unwrap());
        assert!(!block_on(storage.delete(&doc.id)).unwrap());
        assert!(storage.is_empty());
    }

    #[test]
    fn test_list_summarizes_sheets() {
        let storage = MemoryStorage::new();
        let a = sheet("Mains", 1);
        let b = sheet("Controls", 2);
        block_on(storage.save(&a)).unwrap();
        block_on(storage.save(&b)).unwrap();

        let mut expected = vec![StoredSheet::from(&a), StoredSheet::from(&b)];
        expected.sort_by(|x, y| x.id.cmp(&y.id));
        assert_eq!(block_on(storage.list()).unwrap(), expected);
    }
}

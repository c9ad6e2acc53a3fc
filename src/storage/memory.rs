use std::{cell::RefCell, collections::HashMap};

use crate::storage::{Storage, StorageError};

/// Blob store living only as long as the process.
#[derive(Default, Debug)]
pub struct MemoryStorage {
    blobs: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn len(&self) -> usize {
        self.blobs.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.borrow().is_empty()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.blobs.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, blob: &str) -> Result<(), StorageError> {
        self.blobs
            .borrow_mut()
            .insert(key.to_string(), blob.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_overwrites() {
        let storage = MemoryStorage::default();
        assert!(storage.is_empty());
        storage.set("labels", "[]").unwrap();
        storage.set("labels", r#"["Work"]"#).unwrap();
        assert_eq!(storage.len(), 1);
        assert_eq!(storage.get("labels").unwrap().as_deref(), Some(r#"["Work"]"#));
        assert_eq!(storage.get("tasks-v2").unwrap(), None);
    }
}

use std::{
    fs::{self, OpenOptions, rename, write},
    path::{Path, PathBuf},
};

use fs2::FileExt;
use tracing::warn;
use uuid::Uuid;

use crate::storage::{Storage, StorageError};

/// Number of backups kept per key.
const MAX_BACKUPS: usize = 5;

/// Blob store keeping one `<key>.json` file per key in a directory.
pub struct JsonFileStorage {
    dir: PathBuf,
}

impl JsonFileStorage {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn get_blob_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn create_backup_dir(&self) -> Result<(), StorageError> {
        let backups_dir = self.get_backup_dir();
        fs::create_dir_all(&backups_dir).map_err(|e| StorageError::BackupFailed {
            path: backups_dir,
            source: e,
        })?;
        Ok(())
    }

    fn create_backup(&self, key: &str) -> Result<u64, StorageError> {
        let blob_path = self.get_blob_path(key);
        let file_exists = fs::exists(&blob_path).map_err(|e| StorageError::BackupFailed {
            path: blob_path.clone(),
            source: e,
        })?;
        if !file_exists {
            return Ok(0);
        }

        let backup_path = self.get_backup_path(key);
        let copy_result = fs::copy(&blob_path, &backup_path);
        match copy_result {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                self.create_backup_dir()?;
                fs::copy(&blob_path, &backup_path).map_err(|e| StorageError::BackupFailed {
                    path: backup_path,
                    source: e,
                })
            }
            Err(e) => Err(StorageError::BackupFailed {
                path: backup_path,
                source: e,
            }),
            Ok(bytes) => Ok(bytes),
        }
    }

    fn cleanup_old_backups(&self, key: &str) -> Result<(), StorageError> {
        let backup_dir = self.get_backup_dir();
        let backup_dir_exists =
            fs::exists(&backup_dir).map_err(|e| StorageError::CleanupFailed {
                dir: backup_dir.clone(),
                source: e,
            })?;
        if !backup_dir_exists {
            return Ok(());
        }

        let prefix = format!("{key}-");
        let mut file_entries = fs::read_dir(&backup_dir)
            .map_err(|e| StorageError::CleanupFailed {
                dir: backup_dir.clone(),
                source: e,
            })?
            .flatten()
            .filter(|entry| entry.metadata().map(|m| m.is_file()).unwrap_or(false))
            .filter(|entry| entry.file_name().to_string_lossy().starts_with(&prefix))
            .map(|entry| entry.path())
            .collect::<Vec<_>>();

        file_entries.sort();

        let number_of_files_to_delete = file_entries.len().saturating_sub(MAX_BACKUPS);
        if number_of_files_to_delete == 0 {
            return Ok(());
        }

        for file_path in &file_entries[0..number_of_files_to_delete] {
            fs::remove_file(file_path).map_err(|e| StorageError::CleanupFailed {
                dir: backup_dir.clone(),
                source: e,
            })?;
        }

        Ok(())
    }

    /// Moves `temp_path` over the blob of `key` under the key's lock,
    /// backing up the previous blob first.
    fn replace_with(&self, key: &str, temp_path: &Path) -> Result<(), StorageError> {
        let blob_path = self.get_blob_path(key);

        let lock_file_path = self.dir.join(format!("{key}.lock"));
        let lock_file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_file_path)
            .map_err(|e| StorageError::SaveFailed {
                path: lock_file_path.clone(),
                source: e,
            })?;
        lock_file
            .lock_exclusive()
            .map_err(|e| StorageError::SaveFailed {
                path: lock_file_path,
                source: e,
            })?;

        self.create_backup(key)?;
        self.cleanup_old_backups(key)?;

        rename(temp_path, &blob_path).map_err(|e| StorageError::SaveFailed {
            path: blob_path.clone(),
            source: e,
        })?;

        lock_file.unlock().map_err(|e| StorageError::SaveFailed {
            path: blob_path,
            source: e,
        })?;

        Ok(())
    }

    fn get_backup_dir(&self) -> PathBuf {
        self.dir.join("backups")
    }

    /// Zero-padded nanosecond stamps so names sort chronologically.
    fn get_backup_path(&self, key: &str) -> PathBuf {
        let stamp = jiff::Timestamp::now().as_nanosecond();
        self.get_backup_dir().join(format!("{key}-{stamp:020}.json"))
    }
}

impl Storage for JsonFileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let blob_path = self.get_blob_path(key);
        match fs::read_to_string(&blob_path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::LoadFailed {
                path: blob_path,
                source: e,
            }),
        }
    }

    fn set(&self, key: &str, blob: &str) -> Result<(), StorageError> {
        let temp_path = self.dir.join(format!("{key}.json.tmp.{}", Uuid::new_v4()));
        write(&temp_path, blob).map_err(|e| StorageError::SaveFailed {
            path: temp_path.clone(),
            source: e,
        })?;

        let result = self.replace_with(key, &temp_path);
        if result.is_err()
            && let Err(e) = fs::remove_file(&temp_path)
        {
            warn!(path = %temp_path.display(), error = %e, "failed to remove temp file");
        }
        result
    }
}

use std::path::PathBuf;

use jiff::civil::Date;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::models::{
    store::{Store, ViewState},
    task::Task,
};

pub mod json;
pub mod memory;
pub mod sanitize;

/// Key of the tasks blob.
pub const TASKS_KEY: &str = "tasks-v2";
/// Key of the labels blob.
pub const LABELS_KEY: &str = "labels";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to read blob from '{path}': {source}")]
    LoadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write blob to '{path}': {source}")]
    SaveFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize '{key}' to JSON: {source}")]
    SerializeFailed {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to create backup at '{path}': {source}")]
    BackupFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to cleanup old backups in '{dir}': {source}")]
    CleanupFailed {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Synchronous key-value blob store.
pub trait Storage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, blob: &str) -> Result<(), StorageError>;
}

/// Builds the in-memory store from both blobs.
///
/// Never fails: unreadable or malformed blobs are logged and replaced by
/// an empty task list or the default labels.
pub fn load_store(storage: &impl Storage, today: Date) -> Store {
    let tasks = match storage.get(TASKS_KEY) {
        Ok(Some(content)) => sanitize::decode_tasks(&content),
        Ok(None) => vec![],
        Err(e) => {
            error!(key = TASKS_KEY, error = %e, "failed to read tasks, starting empty");
            vec![]
        }
    };

    let mut labels = match storage.get(LABELS_KEY) {
        Ok(content) => sanitize::decode_labels(content.as_deref()),
        Err(e) => {
            error!(key = LABELS_KEY, error = %e, "failed to read labels, using defaults");
            sanitize::decode_labels(None)
        }
    };

    let added = sanitize::reconcile_labels(&tasks, &mut labels);
    if added > 0 {
        info!(added, "registered labels referenced by tasks but missing from the registry");
    }

    let mut store = Store {
        tasks,
        labels,
        view: ViewState {
            selected_date: today,
            filter: None,
        },
    };
    store.renumber();
    debug!(tasks = store.tasks.len(), labels = store.labels.len(), "store loaded");
    store
}

fn encode<T: serde::Serialize + ?Sized>(key: &str, value: &T) -> Result<String, StorageError> {
    serde_json::to_string_pretty(value).map_err(|e| StorageError::SerializeFailed {
        key: key.to_string(),
        source: e,
    })
}

fn write_blob<T: serde::Serialize + ?Sized>(storage: &impl Storage, key: &str, value: &T) {
    let result = encode(key, value).and_then(|json| storage.set(key, &json));
    if let Err(e) = result {
        error!(key, error = %e, "failed to persist blob");
    }
}

/// Persists the tasks blob. Failures are logged, not returned.
pub fn save_tasks(storage: &impl Storage, tasks: &[Task]) {
    write_blob(storage, TASKS_KEY, tasks);
}

/// Persists the labels blob. Failures are logged, not returned.
pub fn save_labels(storage: &impl Storage, labels: &[String]) {
    write_blob(storage, LABELS_KEY, labels);
}

use thiserror::Error;
use tracing::debug;

use crate::{
    models::store::{Filter, Store},
    storage::{Storage, save_labels, save_tasks},
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LabelError {
    #[error("Label name is blank")]
    BlankName,

    #[error("Label '{0}' already exists")]
    AlreadyExists(String),

    #[error("Label '{0}' not found")]
    NotFound(String),
}

/// Registers a new label and returns the stored (trimmed) name.
pub fn create_label(
    store: &mut Store,
    storage: &impl Storage,
    name: &str,
) -> Result<String, LabelError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(LabelError::BlankName);
    }
    if !store.register_label(name) {
        return Err(LabelError::AlreadyExists(name.to_string()));
    }
    save_labels(storage, &store.labels);
    Ok(name.to_string())
}

#[derive(Debug, PartialEq, Eq)]
pub struct RenameLabelResult {
    pub old_name: String,
    pub new_name: String,
    pub cascaded_tasks_count: usize,
    pub filter_updated: bool,
}

/// Renames a label everywhere it is referenced: registry, tasks and the
/// active filter. Renaming a label to its own name changes nothing.
pub fn rename_label(
    store: &mut Store,
    storage: &impl Storage,
    old_name: &str,
    new_name: &str,
) -> Result<RenameLabelResult, LabelError> {
    let new_name = new_name.trim();
    if new_name.is_empty() {
        return Err(LabelError::BlankName);
    }
    if !store.has_label(old_name) {
        return Err(LabelError::NotFound(old_name.to_string()));
    }
    if new_name == old_name {
        return Ok(RenameLabelResult {
            old_name: old_name.to_string(),
            new_name: new_name.to_string(),
            cascaded_tasks_count: 0,
            filter_updated: false,
        });
    }
    if store.has_label(new_name) {
        return Err(LabelError::AlreadyExists(new_name.to_string()));
    }

    for label in store.labels.iter_mut().filter(|l| *l == old_name) {
        *label = new_name.to_string();
    }

    let mut cascaded_tasks_count = 0;
    for task in store.tasks.iter_mut().filter(|t| t.has_label(old_name)) {
        for label in task.labels.iter_mut().filter(|l| *l == old_name) {
            *label = new_name.to_string();
        }
        cascaded_tasks_count += 1;
    }

    let filter_updated = match &mut store.view.filter {
        Some(Filter::Label(active)) if active == old_name => {
            *active = new_name.to_string();
            true
        }
        _ => false,
    };

    debug!(from = old_name, to = new_name, cascaded_tasks_count, "renamed label");
    save_labels(storage, &store.labels);
    if cascaded_tasks_count > 0 {
        save_tasks(storage, &store.tasks);
    }

    Ok(RenameLabelResult {
        old_name: old_name.to_string(),
        new_name: new_name.to_string(),
        cascaded_tasks_count,
        filter_updated,
    })
}

#[derive(Debug, PartialEq, Eq)]
pub struct DeleteLabelResult {
    pub name: String,
    pub cascaded_tasks_count: usize,
    pub filter_cleared: bool,
}

/// Removes a label from the registry and from every task carrying it.
/// An active filter on this label is cleared.
pub fn delete_label(
    store: &mut Store,
    storage: &impl Storage,
    name: &str,
) -> Result<DeleteLabelResult, LabelError> {
    if !store.has_label(name) {
        return Err(LabelError::NotFound(name.to_string()));
    }

    store.labels.retain(|l| l != name);

    let mut cascaded_tasks_count = 0;
    for task in store.tasks.iter_mut().filter(|t| t.has_label(name)) {
        task.labels.retain(|l| l != name);
        cascaded_tasks_count += 1;
    }

    let filter_cleared =
        matches!(&store.view.filter, Some(Filter::Label(active)) if active == name);
    if filter_cleared {
        store.view.filter = None;
    }

    debug!(label = name, cascaded_tasks_count, filter_cleared, "deleted label");
    save_labels(storage, &store.labels);
    if cascaded_tasks_count > 0 {
        save_tasks(storage, &store.tasks);
    }

    Ok(DeleteLabelResult {
        name: name.to_string(),
        cascaded_tasks_count,
        filter_cleared,
    })
}

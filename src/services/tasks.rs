use jiff::civil::Date;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::{
    models::{
        recurrence::next_occurrence,
        store::Store,
        task::{Priority, RecurringRule, Task},
    },
    storage::{Storage, save_labels, save_tasks},
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddTaskError {
    #[error("Task title is blank")]
    BlankTitle,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaskError {
    #[error("Task '{0}' not found")]
    TaskNotFound(Uuid),

    #[error("Label name is blank")]
    BlankLabel,
}

pub struct AddTaskParameters {
    pub title: String,
    pub date: Date,
    pub recurring_rule: Option<RecurringRule>,
    pub labels: Vec<String>,
    pub priority: Priority,
}

impl AddTaskParameters {
    pub fn new(title: impl Into<String>, date: Date) -> Self {
        Self {
            title: title.into(),
            date,
            recurring_rule: None,
            labels: vec![],
            priority: Priority::default(),
        }
    }
}

pub fn add_task(
    store: &mut Store,
    storage: &impl Storage,
    parameters: AddTaskParameters,
) -> Result<Task, AddTaskError> {
    let title = parameters.title.trim();
    if title.is_empty() {
        return Err(AddTaskError::BlankTitle);
    }

    // 1. Normalize labels and register the ones the registry lacks
    let mut labels: Vec<String> = Vec::with_capacity(parameters.labels.len());
    for label in parameters.labels.iter().map(|l| l.trim()) {
        if !label.is_empty() && !labels.iter().any(|l| l == label) {
            labels.push(label.to_string());
        }
    }
    let mut labels_changed = false;
    for label in &labels {
        labels_changed |= store.register_label(label);
    }

    // 2. Create the task, appended at the end of the manual order
    let task = Task {
        id: Uuid::new_v4(),
        title: title.to_string(),
        description: None,
        completed: false,
        date: parameters.date,
        created_at: jiff::Timestamp::now().as_millisecond(),
        order: store.tasks.len(),
        is_recurring: parameters.recurring_rule.is_some(),
        recurring_rule: parameters.recurring_rule,
        parent_id: None,
        labels,
        is_favorite: false,
        priority: parameters.priority,
    };
    store.tasks.push(task.clone());

    // 3. Persist
    save_tasks(storage, &store.tasks);
    if labels_changed {
        save_labels(storage, &store.labels);
    }

    Ok(task)
}

/// What a toggle did to the store.
#[derive(Debug, Clone, PartialEq)]
pub enum ToggleOutcome {
    Completed(Task),
    Reopened(Task),
    /// A live template was completed: `history` is the completed snapshot
    /// left on the original date, `live` is the template moved forward.
    RolledOver { live: Task, history: Task },
}

pub fn toggle_task(
    store: &mut Store,
    storage: &impl Storage,
    id: Uuid,
) -> Result<ToggleOutcome, TaskError> {
    let position = store.position_of(id).ok_or(TaskError::TaskNotFound(id))?;
    let task = &mut store.tasks[position];

    let next_date = match &task.recurring_rule {
        Some(rule) if task.is_recurring && !task.completed => {
            Some(next_occurrence(task.date, rule))
        }
        _ => None,
    };

    let outcome = if let Some(next_date) = next_date {
        let history = Task {
            id: Uuid::new_v4(),
            completed: true,
            is_recurring: false,
            recurring_rule: None,
            parent_id: Some(task.id),
            ..task.clone()
        };
        task.date = next_date;
        task.completed = false;

        store.tasks.insert(position + 1, history);
        store.renumber();
        debug!(task = %id, next = %next_date, "rolled over recurring task");

        ToggleOutcome::RolledOver {
            live: store.tasks[position].clone(),
            history: store.tasks[position + 1].clone(),
        }
    } else {
        task.completed = !task.completed;
        if task.completed {
            ToggleOutcome::Completed(task.clone())
        } else {
            ToggleOutcome::Reopened(task.clone())
        }
    };

    save_tasks(storage, &store.tasks);
    Ok(outcome)
}

pub fn delete_task(store: &mut Store, storage: &impl Storage, id: Uuid) -> Result<Task, TaskError> {
    let position = store.position_of(id).ok_or(TaskError::TaskNotFound(id))?;
    let task = store.tasks.remove(position);
    save_tasks(storage, &store.tasks);
    Ok(task)
}

/// Moves `active_id` to the position currently held by `over_id`.
///
/// Returns `Ok(false)` when both ids point at the same task.
pub fn reorder_tasks(
    store: &mut Store,
    storage: &impl Storage,
    active_id: Uuid,
    over_id: Uuid,
) -> Result<bool, TaskError> {
    let from = store
        .position_of(active_id)
        .ok_or(TaskError::TaskNotFound(active_id))?;
    let to = store
        .position_of(over_id)
        .ok_or(TaskError::TaskNotFound(over_id))?;
    if from == to {
        return Ok(false);
    }

    let moved = store.tasks.remove(from);
    store.tasks.insert(to, moved);
    store.renumber();

    save_tasks(storage, &store.tasks);
    Ok(true)
}

/// Flips the favorite flag and returns its new value.
pub fn toggle_favorite(
    store: &mut Store,
    storage: &impl Storage,
    id: Uuid,
) -> Result<bool, TaskError> {
    let task = store.get_task_mut(id).ok_or(TaskError::TaskNotFound(id))?;
    task.is_favorite = !task.is_favorite;
    let is_favorite = task.is_favorite;
    save_tasks(storage, &store.tasks);
    Ok(is_favorite)
}

/// Attaches `label` to a task, registering the label first if needed.
///
/// Returns `Ok(false)` when the task already carried the label.
pub fn add_label_to_task(
    store: &mut Store,
    storage: &impl Storage,
    id: Uuid,
    label: &str,
) -> Result<bool, TaskError> {
    let label = label.trim();
    if label.is_empty() {
        return Err(TaskError::BlankLabel);
    }
    let position = store.position_of(id).ok_or(TaskError::TaskNotFound(id))?;

    if store.register_label(label) {
        save_labels(storage, &store.labels);
    }

    let task = &mut store.tasks[position];
    if task.has_label(label) {
        return Ok(false);
    }
    task.labels.push(label.to_string());
    save_tasks(storage, &store.tasks);
    Ok(true)
}

/// Detaches `label` from a task. Returns `Ok(false)` when it was not attached.
pub fn remove_label_from_task(
    store: &mut Store,
    storage: &impl Storage,
    id: Uuid,
    label: &str,
) -> Result<bool, TaskError> {
    let task = store.get_task_mut(id).ok_or(TaskError::TaskNotFound(id))?;
    let before = task.labels.len();
    task.labels.retain(|l| l != label);
    if task.labels.len() == before {
        return Ok(false);
    }
    save_tasks(storage, &store.tasks);
    Ok(true)
}

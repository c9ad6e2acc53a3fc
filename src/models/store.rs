use jiff::civil::Date;
use thiserror::Error;
use uuid::Uuid;

use crate::models::task::Task;

/// Labels a fresh (or reset) store starts with.
pub const DEFAULT_LABELS: [&str; 2] = ["Work", "Personal"];

/// In-memory application state.
///
/// Tasks are kept in manual order: the position in `tasks` is the
/// authoritative manual sort key and `Task::order` is renumbered to match
/// whenever positions change.
#[derive(Debug, Clone)]
pub struct Store {
    pub tasks: Vec<Task>,
    pub labels: Vec<String>,
    pub view: ViewState,
}

/// What the user is currently looking at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub selected_date: Date,
    pub filter: Option<Filter>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    Favorites,
    Label(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaskLookupError {
    #[error("Task '{0}' not found")]
    NotFound(String),

    #[error("Task id is ambiguous. Multiple tasks found: {}", .0.join(", "))]
    Ambiguous(Vec<String>),
}

pub fn default_labels() -> Vec<String> {
    DEFAULT_LABELS.iter().map(|l| l.to_string()).collect()
}

impl Store {
    pub fn new(today: Date) -> Self {
        Self {
            tasks: vec![],
            labels: default_labels(),
            view: ViewState {
                selected_date: today,
                filter: None,
            },
        }
    }

    pub fn get_task(&self, id: Uuid) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn get_task_mut(&mut self, id: Uuid) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    pub fn position_of(&self, id: Uuid) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }

    /// Tasks scheduled on `date`, in store order. No sorting is applied.
    pub fn tasks_for_date(&self, date: Date) -> impl Iterator<Item = &Task> + '_ {
        self.tasks.iter().filter(move |t| t.date == date)
    }

    pub fn has_label(&self, name: &str) -> bool {
        self.labels.iter().any(|l| l == name)
    }

    /// Appends `name` to the registry unless present. Returns whether it was added.
    pub fn register_label(&mut self, name: &str) -> bool {
        if self.has_label(name) {
            return false;
        }
        self.labels.push(name.to_string());
        true
    }

    pub fn renumber(&mut self) {
        for (index, task) in self.tasks.iter_mut().enumerate() {
            task.order = index;
        }
    }

    /// Resolves a full UUID or an unambiguous prefix of one.
    pub fn resolve_task_id(&self, input: &str) -> Result<Uuid, TaskLookupError> {
        let needle = input.trim().to_lowercase();
        if let Ok(id) = Uuid::parse_str(&needle) {
            return self
                .get_task(id)
                .map(|t| t.id)
                .ok_or_else(|| TaskLookupError::NotFound(input.to_string()));
        }
        if needle.is_empty() {
            return Err(TaskLookupError::NotFound(input.to_string()));
        }

        let matching: Vec<_> = self
            .tasks
            .iter()
            .filter(|t| t.id.to_string().starts_with(&needle))
            .collect();

        match matching.len() {
            0 => Err(TaskLookupError::NotFound(input.to_string())),
            1 => Ok(matching[0].id),
            _ => Err(TaskLookupError::Ambiguous(
                matching
                    .iter()
                    .map(|t| format!("{} ({})", t.title, t.id))
                    .collect(),
            )),
        }
    }
}

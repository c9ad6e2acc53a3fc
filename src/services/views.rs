use std::{cmp::Ordering, str::FromStr};

use jiff::{Span, civil::Date};
use thiserror::Error;

use crate::{
    models::{
        store::{Filter, Store},
        task::Task,
    },
    services::labels::LabelError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    /// Store position, as arranged by reorders
    #[default]
    Manual,
    Priority,
    Alphabetical,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown sort mode '{0}', expected one of: manual, priority, alpha")]
pub struct UnknownSortMode(String);

impl FromStr for SortMode {
    type Err = UnknownSortMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "manual" => Ok(SortMode::Manual),
            "priority" => Ok(SortMode::Priority),
            "alpha" | "alphabetical" | "name" => Ok(SortMode::Alphabetical),
            _ => Err(UnknownSortMode(s.to_string())),
        }
    }
}

/// Presentation options layered on top of a raw day query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewOptions {
    pub label: Option<String>,
    pub show_completed: bool,
    pub sort: SortMode,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            label: None,
            show_completed: true,
            sort: SortMode::Manual,
        }
    }
}

pub fn sort_tasks(tasks: &mut [&Task], mode: SortMode) {
    match mode {
        SortMode::Manual => {}
        SortMode::Priority => tasks.sort_by_key(|t| t.priority),
        SortMode::Alphabetical => tasks.sort_by(|a, b| compare_titles(&a.title, &b.title)),
    }
}

fn compare_titles(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Tasks of one day after label/completion filtering and sorting.
pub fn day_view<'a>(store: &'a Store, date: Date, options: &ViewOptions) -> Vec<&'a Task> {
    let mut tasks: Vec<&Task> = store
        .tasks_for_date(date)
        .filter(|t| options.label.as_deref().is_none_or(|l| t.has_label(l)))
        .filter(|t| options.show_completed || !t.completed)
        .collect();
    sort_tasks(&mut tasks, options.sort);
    tasks
}

#[derive(Debug)]
pub struct DayColumn<'a> {
    pub date: Date,
    pub tasks: Vec<&'a Task>,
}

/// Seven consecutive day views starting at `start`.
pub fn week_board<'a>(store: &'a Store, start: Date, options: &ViewOptions) -> Vec<DayColumn<'a>> {
    (0..7)
        .map(|offset| {
            let date = start.saturating_add(Span::new().days(offset));
            DayColumn {
                date,
                tasks: day_view(store, date, options),
            }
        })
        .collect()
}

/// Activates a filter. Label filters must name a registered label.
pub fn set_filter(store: &mut Store, filter: Option<Filter>) -> Result<(), LabelError> {
    if let Some(Filter::Label(name)) = &filter
        && !store.has_label(name)
    {
        return Err(LabelError::NotFound(name.clone()));
    }
    store.view.filter = filter;
    Ok(())
}

/// Tasks matching the active filter across all dates, open tasks first.
/// Empty when no filter is active.
pub fn filtered_view(store: &Store) -> Vec<&Task> {
    let mut tasks: Vec<&Task> = match &store.view.filter {
        Some(Filter::Favorites) => store.tasks.iter().filter(|t| t.is_favorite).collect(),
        Some(Filter::Label(name)) => store.tasks.iter().filter(|t| t.has_label(name)).collect(),
        None => vec![],
    };
    tasks.sort_by_key(|t| t.completed);
    tasks
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSummary {
    pub name: String,
    pub open_tasks: usize,
}

/// Registered labels in registry order with their count of open tasks.
pub fn label_summaries(store: &Store) -> Vec<LabelSummary> {
    store
        .labels
        .iter()
        .map(|name| LabelSummary {
            name: name.clone(),
            open_tasks: store
                .tasks
                .iter()
                .filter(|t| !t.completed && t.has_label(name))
                .count(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::task::Priority,
        services::tasks::{AddTaskParameters, add_task, toggle_favorite, toggle_task},
        storage::memory::MemoryStorage,
    };
    use jiff::civil::date;

    fn seeded() -> (Store, MemoryStorage) {
        let mut store = Store::new(date(2024, 3, 1));
        let storage = MemoryStorage::default();
        let day = date(2024, 3, 1);
        for (title, priority, labels) in [
            ("banana", Priority::P3, vec!["Personal"]),
            ("Apple", Priority::P1, vec![]),
            ("cherry", Priority::P4, vec!["Work"]),
            ("apple", Priority::P1, vec!["Personal"]),
        ] {
            let parameters = AddTaskParameters {
                priority,
                labels: labels.into_iter().map(String::from).collect(),
                ..AddTaskParameters::new(title, day)
            };
            add_task(&mut store, &storage, parameters).unwrap();
        }
        add_task(
            &mut store,
            &storage,
            AddTaskParameters::new("tomorrow", date(2024, 3, 2)),
        )
        .unwrap();
        (store, storage)
    }

    fn titles(tasks: &[&Task]) -> Vec<String> {
        tasks.iter().map(|t| t.title.clone()).collect()
    }

    #[test]
    fn test_sort_mode_parsing() {
        assert_eq!("manual".parse::<SortMode>(), Ok(SortMode::Manual));
        assert_eq!("Priority".parse::<SortMode>(), Ok(SortMode::Priority));
        assert_eq!("alpha".parse::<SortMode>(), Ok(SortMode::Alphabetical));
        assert!("random".parse::<SortMode>().is_err());
    }

    #[test]
    fn test_day_view_sort_modes() {
        let (store, _) = seeded();
        let day = date(2024, 3, 1);

        let manual = day_view(&store, day, &ViewOptions::default());
        assert_eq!(titles(&manual), vec!["banana", "Apple", "cherry", "apple"]);

        let options = ViewOptions {
            sort: SortMode::Priority,
            ..ViewOptions::default()
        };
        let by_priority = day_view(&store, day, &options);
        assert_eq!(titles(&by_priority), vec!["Apple", "apple", "banana", "cherry"]);

        let options = ViewOptions {
            sort: SortMode::Alphabetical,
            ..ViewOptions::default()
        };
        let by_name = day_view(&store, day, &options);
        assert_eq!(titles(&by_name), vec!["Apple", "apple", "banana", "cherry"]);
    }

    #[test]
    fn test_day_view_filters() {
        let (mut store, storage) = seeded();
        let day = date(2024, 3, 1);
        let banana = store.tasks[0].id;
        toggle_task(&mut store, &storage, banana).unwrap();

        let options = ViewOptions {
            label: Some("Personal".to_string()),
            ..ViewOptions::default()
        };
        assert_eq!(titles(&day_view(&store, day, &options)), vec!["banana", "apple"]);

        let options = ViewOptions {
            label: Some("Personal".to_string()),
            show_completed: false,
            ..ViewOptions::default()
        };
        assert_eq!(titles(&day_view(&store, day, &options)), vec!["apple"]);
    }

    #[test]
    fn test_week_board_has_seven_columns() {
        let (store, _) = seeded();
        let board = week_board(&store, date(2024, 2, 29), &ViewOptions::default());
        assert_eq!(board.len(), 7);
        assert_eq!(board[0].date, date(2024, 2, 29));
        assert_eq!(board[1].tasks.len(), 4);
        assert_eq!(titles(&board[2].tasks), vec!["tomorrow"]);
        assert_eq!(board[6].date, date(2024, 3, 6));
    }

    #[test]
    fn test_filtered_view_puts_completed_last() {
        let (mut store, storage) = seeded();
        let banana = store.tasks[0].id;
        let apple = store.tasks[3].id;
        toggle_task(&mut store, &storage, banana).unwrap();
        assert!(filtered_view(&store).is_empty());

        set_filter(&mut store, Some(Filter::Label("Personal".to_string()))).unwrap();
        assert_eq!(titles(&filtered_view(&store)), vec!["apple", "banana"]);

        toggle_favorite(&mut store, &storage, apple).unwrap();
        set_filter(&mut store, Some(Filter::Favorites)).unwrap();
        assert_eq!(titles(&filtered_view(&store)), vec!["apple"]);

        assert_eq!(
            set_filter(&mut store, Some(Filter::Label("Nope".to_string()))),
            Err(LabelError::NotFound("Nope".to_string()))
        );
        assert_eq!(store.view.filter, Some(Filter::Favorites));
    }

    #[test]
    fn test_label_summaries_count_open_tasks() {
        let (mut store, storage) = seeded();
        let banana = store.tasks[0].id;
        toggle_task(&mut store, &storage, banana).unwrap();

        let summaries = label_summaries(&store);
        assert_eq!(
            summaries,
            vec![
                LabelSummary {
                    name: "Work".to_string(),
                    open_tasks: 1
                },
                LabelSummary {
                    name: "Personal".to_string(),
                    open_tasks: 1
                },
            ]
        );
    }
}

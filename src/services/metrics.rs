use std::collections::HashSet;

use jiff::{Span, civil::Date};
use serde::Serialize;
use tracing::info;

use crate::{
    models::store::{Filter, Store, default_labels},
    storage::{Storage, save_labels, save_tasks},
};

/// How far back the streak walk looks.
const STREAK_WINDOW_DAYS: i64 = 365;

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayStats {
    pub date: Date,
    pub day_name: String,
    pub total: usize,
    pub completed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthStats {
    pub name: &'static str,
    pub completed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub today_progress: u8,
    pub streak: u32,
    pub total_completed: usize,
    pub weekly: Vec<DayStats>,
    pub monthly: Vec<MonthStats>,
}

fn days_before(today: Date, days: i64) -> Date {
    today.saturating_sub(Span::new().days(days))
}

/// Percentage of the tasks on `date` that are completed, rounded half up.
/// A day without tasks reports 0.
pub fn daily_progress(store: &Store, date: Date) -> u8 {
    let (total, completed) = store
        .tasks_for_date(date)
        .fold((0usize, 0usize), |(total, completed), t| {
            (total + 1, completed + usize::from(t.completed))
        });
    if total == 0 {
        return 0;
    }
    let percent = (200 * completed + total) / (2 * total);
    u8::try_from(percent).unwrap_or(100)
}

/// Totals for the seven days ending on `today`, oldest first.
pub fn weekly_stats(store: &Store, today: Date) -> Vec<DayStats> {
    (0..7)
        .rev()
        .map(|offset| {
            let date = days_before(today, offset);
            let (total, completed) = store
                .tasks_for_date(date)
                .fold((0, 0), |(total, completed), t| {
                    (total + 1, completed + usize::from(t.completed))
                });
            DayStats {
                date,
                day_name: date.strftime("%a").to_string(),
                total,
                completed,
            }
        })
        .collect()
}

/// Completed tasks per month of `today`'s year. Other years are ignored.
pub fn monthly_stats(store: &Store, today: Date) -> Vec<MonthStats> {
    let mut counts = [0usize; 12];
    for task in store
        .tasks
        .iter()
        .filter(|t| t.completed && t.date.year() == today.year())
    {
        if let Ok(month) = usize::try_from(task.date.month() - 1) {
            counts[month] += 1;
        }
    }
    MONTH_NAMES
        .into_iter()
        .zip(counts)
        .map(|(name, completed)| MonthStats { name, completed })
        .collect()
}

/// Consecutive days with at least one completed task, walking back from
/// `today`. An empty today does not break a streak alive through
/// yesterday; any earlier day without a completion ends it.
pub fn streak(store: &Store, today: Date) -> u32 {
    let completed_days: HashSet<Date> = store
        .tasks
        .iter()
        .filter(|t| t.completed)
        .map(|t| t.date)
        .collect();

    let mut count = 0;
    for offset in 0..STREAK_WINDOW_DAYS {
        if completed_days.contains(&days_before(today, offset)) {
            count += 1;
        } else if offset > 0 {
            break;
        }
    }
    count
}

pub fn total_completed(store: &Store) -> usize {
    store.tasks.iter().filter(|t| t.completed).count()
}

pub fn dashboard(store: &Store, today: Date) -> Dashboard {
    Dashboard {
        today_progress: daily_progress(store, today),
        streak: streak(store, today),
        total_completed: total_completed(store),
        weekly: weekly_stats(store, today),
        monthly: monthly_stats(store, today),
    }
}

/// Deletes every task, restores the starter labels and selects `today`.
///
/// Irreversible; callers are expected to have confirmed with the user.
pub fn reset_metrics(store: &mut Store, storage: &impl Storage, today: Date) {
    let removed = store.tasks.len();
    store.tasks.clear();
    store.labels = default_labels();
    store.view.selected_date = today;
    if matches!(&store.view.filter, Some(Filter::Label(active)) if !store.labels.contains(active))
    {
        store.view.filter = None;
    }

    info!(removed, "reset all tasks and labels");
    save_tasks(storage, &store.tasks);
    save_labels(storage, &store.labels);
}

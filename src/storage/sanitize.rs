use std::collections::HashSet;

use serde_json::{Map, Value};
use tracing::{error, warn};
use uuid::Uuid;

use crate::models::{store::default_labels, task::Task};

/// Decodes the tasks blob, repairing what can be repaired.
///
/// A blob that is not a JSON array yields no tasks. Individual records that
/// still fail to decode after repair, or repeat an id already seen, are
/// dropped.
pub fn decode_tasks(content: &str) -> Vec<Task> {
    let records = match serde_json::from_str::<Value>(content) {
        Ok(Value::Array(records)) => records,
        Ok(_) => {
            error!("tasks blob is not an array, starting empty");
            return vec![];
        }
        Err(e) => {
            error!(error = %e, "failed to parse tasks blob, starting empty");
            return vec![];
        }
    };

    let mut seen: HashSet<Uuid> = HashSet::new();
    let mut tasks = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        let record = sanitize_task_record(record, index);
        match serde_json::from_value::<Task>(record) {
            Ok(task) if !seen.insert(task.id) => {
                warn!(index, task = %task.id, "dropping task record with duplicate id");
            }
            Ok(task) => tasks.push(task),
            Err(e) => warn!(index, error = %e, "dropping malformed task record"),
        }
    }
    tasks
}

/// Fills defaults for fields older blobs may lack and normalizes values
/// the typed model would otherwise reject.
fn sanitize_task_record(mut record: Value, index: usize) -> Value {
    let Some(obj) = record.as_object_mut() else {
        return record;
    };

    let labels = match obj.get("labels") {
        Some(Value::Array(items)) => dedup_strings(items),
        _ => vec![],
    };
    obj.insert("labels".to_string(), Value::from(labels));

    default_bool(obj, "isFavorite");
    default_bool(obj, "isRecurring");
    default_bool(obj, "completed");

    let priority = obj
        .get("priority")
        .and_then(Value::as_u64)
        .filter(|p| (1..=4).contains(p))
        .unwrap_or(4);
    obj.insert("priority".to_string(), Value::from(priority));

    if !obj.get("order").is_some_and(Value::is_u64) {
        obj.insert("order".to_string(), Value::from(index));
    }
    if !obj.get("createdAt").is_some_and(Value::is_i64) {
        obj.insert("createdAt".to_string(), Value::from(0));
    }

    // Drop nulls so optional fields fall back to their serde defaults.
    obj.retain(|_, v| !v.is_null());

    // History instances are always completed, static snapshots.
    if obj.contains_key("parentId") && obj.get("isRecurring") == Some(&Value::Bool(true)) {
        warn!(index, "repairing history instance marked as recurring");
        obj.insert("isRecurring".to_string(), Value::Bool(false));
        obj.insert("completed".to_string(), Value::Bool(true));
    }

    record
}

fn default_bool(obj: &mut Map<String, Value>, key: &str) {
    if !obj.get(key).is_some_and(Value::is_boolean) {
        obj.insert(key.to_string(), Value::Bool(false));
    }
}

/// Trimmed, non-blank names in first-seen order.
fn dedup_strings(items: &[Value]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in items.iter().filter_map(Value::as_str).map(str::trim) {
        if !item.is_empty() && !out.iter().any(|existing| existing == item) {
            out.push(item.to_string());
        }
    }
    out
}

/// Decodes the labels blob. A missing blob means first run.
pub fn decode_labels(content: Option<&str>) -> Vec<String> {
    let Some(content) = content else {
        return default_labels();
    };

    match serde_json::from_str::<Vec<Value>>(content) {
        Ok(items) => {
            let mut labels: Vec<String> = Vec::with_capacity(items.len());
            for name in items.iter().filter_map(Value::as_str).map(str::trim) {
                if name.is_empty() || labels.iter().any(|l| l == name) {
                    warn!(label = name, "dropping blank or duplicate label");
                    continue;
                }
                labels.push(name.to_string());
            }
            labels
        }
        Err(e) => {
            error!(error = %e, "failed to parse labels blob, using defaults");
            default_labels()
        }
    }
}

/// Appends to `labels` every name a task references but the registry lacks.
/// Returns how many names were added.
pub fn reconcile_labels(tasks: &[Task], labels: &mut Vec<String>) -> usize {
    let mut added = 0;
    for name in tasks.iter().flat_map(|t| t.labels.iter()) {
        if !labels.iter().any(|l| l == name) {
            labels.push(name.clone());
            added += 1;
        }
    }
    added
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::Priority;

    #[test]
    fn test_missing_fields_get_defaults() {
        let json = r#"[{
            "id": "00000000-0000-4000-8000-000000000001",
            "title": "Legacy",
            "completed": true,
            "date": "2023-12-31",
            "createdAt": 1700000000000,
            "order": 3
        }]"#;
        let tasks = decode_tasks(json);
        assert_eq!(tasks.len(), 1);
        let task = &tasks[0];
        assert!(task.labels.is_empty());
        assert!(!task.is_favorite);
        assert_eq!(task.priority, Priority::P4);
        assert_eq!(task.order, 3);
    }

    #[test]
    fn test_out_of_range_priority_and_duplicate_labels() {
        let json = r#"[{
            "id": "00000000-0000-4000-8000-000000000001",
            "title": "Messy",
            "completed": false,
            "date": "2024-01-01",
            "createdAt": 0,
            "order": 0,
            "priority": 0,
            "labels": ["Work", "Work", 7, "Home"],
            "isFavorite": null
        }]"#;
        let tasks = decode_tasks(json);
        assert_eq!(tasks[0].priority, Priority::P4);
        assert_eq!(tasks[0].labels, vec!["Work", "Home"]);
        assert!(!tasks[0].is_favorite);
    }

    #[test]
    fn test_bad_records_are_dropped_individually() {
        let json = r#"[
            {"id": "00000000-0000-4000-8000-000000000001", "title": "Good", "date": "2024-01-01"},
            {"id": "not-a-uuid", "title": "Bad id", "date": "2024-01-01"},
            {"id": "00000000-0000-4000-8000-000000000002", "title": "Bad date", "date": "2024-13-45"},
            {"id": "00000000-0000-4000-8000-000000000001", "title": "Duplicate", "date": "2024-01-01"},
            "garbage"
        ]"#;
        let tasks = decode_tasks(json);
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "Good");
        assert!(!tasks[0].completed);
    }

    #[test]
    fn test_task_labels_are_trimmed_before_reconcile() {
        let tasks = decode_tasks(
            r#"[{
                "id": "00000000-0000-4000-8000-000000000001",
                "title": "Water plants",
                "date": "2024-01-01",
                "labels": [" Home ", "", "Home", "   "]
            }]"#,
        );
        assert_eq!(tasks[0].labels, vec!["Home"]);

        let mut labels = decode_labels(Some(r#"[" Home "]"#));
        assert_eq!(reconcile_labels(&tasks, &mut labels), 0);
        assert_eq!(labels, vec!["Home"]);
    }

    #[test]
    fn test_non_array_blob_is_empty() {
        assert!(decode_tasks(r#"{"tasks": []}"#).is_empty());
        assert!(decode_tasks("not json").is_empty());
    }

    #[test]
    fn test_history_flagged_recurring_is_repaired() {
        let json = r#"[{
            "id": "00000000-0000-4000-8000-000000000002",
            "title": "Run",
            "completed": false,
            "date": "2024-01-01",
            "isRecurring": true,
            "recurringRule": {"frequency": "daily"},
            "parentId": "00000000-0000-4000-8000-000000000001"
        }]"#;
        let tasks = decode_tasks(json);
        assert!(tasks[0].is_history());
        assert!(!tasks[0].is_recurring);
        assert!(tasks[0].completed);
    }

    #[test]
    fn test_labels_blob_defaults_and_cleanup() {
        assert_eq!(decode_labels(None), vec!["Work", "Personal"]);
        assert_eq!(decode_labels(Some("{oops")), vec!["Work", "Personal"]);
        assert_eq!(
            decode_labels(Some(r#"["Home", " Home ", "", "Gym"]"#)),
            vec!["Home", "Gym"]
        );
        assert!(decode_labels(Some("[]")).is_empty());
    }

    #[test]
    fn test_reconcile_registers_dangling_labels_once() {
        let tasks = decode_tasks(
            r#"[
                {"id": "00000000-0000-4000-8000-000000000001", "title": "a", "date": "2024-01-01", "labels": ["Gym", "Work"]},
                {"id": "00000000-0000-4000-8000-000000000002", "title": "b", "date": "2024-01-01", "labels": ["Gym"]}
            ]"#,
        );
        let mut labels = vec!["Work".to_string()];
        assert_eq!(reconcile_labels(&tasks, &mut labels), 1);
        assert_eq!(labels, vec!["Work", "Gym"]);
    }
}

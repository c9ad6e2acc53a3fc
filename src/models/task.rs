use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// UUID to identify the task
    pub id: Uuid,
    /// Title of the task, never blank
    pub title: String,
    /// Notes of the task
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the task is done
    pub completed: bool,
    /// The calendar day the task is scheduled on
    pub date: Date,
    /// Creation time in milliseconds since the Unix epoch
    pub created_at: i64,
    /// Manual sort key, kept equal to the task's position after reorders
    pub order: usize,
    /// Live recurring template flag
    #[serde(default)]
    pub is_recurring: bool,
    /// Rule used to advance a live template
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring_rule: Option<RecurringRule>,
    /// Template this history instance was spawned from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Uuid>,
    /// Label names attached to the task
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub priority: Priority,
}

impl Task {
    /// A recurring template that still advances on completion.
    pub fn is_live_template(&self) -> bool {
        self.is_recurring && self.recurring_rule.is_some()
    }

    /// A completed snapshot spawned by a rollover.
    pub fn is_history(&self) -> bool {
        self.parent_id.is_some()
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }
}

/// Task priority, 1 being the most urgent and 4 meaning "no priority".
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[serde(try_from = "u8", into = "u8")]
pub enum Priority {
    P1,
    P2,
    P3,
    #[default]
    P4,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid priority {0}, expected a value between 1 and 4")]
pub struct InvalidPriority(pub u8);

impl Priority {
    pub fn is_set(self) -> bool {
        self != Priority::P4
    }
}

impl TryFrom<u8> for Priority {
    type Error = InvalidPriority;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Priority::P1),
            2 => Ok(Priority::P2),
            3 => Ok(Priority::P3),
            4 => Ok(Priority::P4),
            other => Err(InvalidPriority(other)),
        }
    }
}

impl From<Priority> for u8 {
    fn from(priority: Priority) -> Self {
        match priority {
            Priority::P1 => 1,
            Priority::P2 => 2,
            Priority::P3 => 3,
            Priority::P4 => 4,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RecurringRule {
    pub frequency: Frequency,
    /// Every N days for daily rules. Missing or zero means 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<u32>,
    /// 0-6 (Sun-Sat). Stored but not used when advancing weekly rules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_of_week: Option<Vec<u8>>,
}

impl RecurringRule {
    pub fn daily() -> Self {
        Self::every_days(1)
    }

    pub fn every_days(interval: u32) -> Self {
        Self {
            frequency: Frequency::Daily,
            interval: Some(interval),
            days_of_week: None,
        }
    }

    pub fn weekly() -> Self {
        Self {
            frequency: Frequency::Weekly,
            interval: None,
            days_of_week: None,
        }
    }
}

/// Recurrence frequency as stored in the tasks blob.
///
/// Unknown tokens are kept verbatim so a record written by a newer
/// version survives a load/save cycle unchanged.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub enum Frequency {
    Daily,
    Weekly,
    Custom,
    Unrecognized(String),
}

impl From<String> for Frequency {
    fn from(value: String) -> Self {
        match value.as_str() {
            "daily" => Frequency::Daily,
            "weekly" => Frequency::Weekly,
            "custom" => Frequency::Custom,
            _ => Frequency::Unrecognized(value),
        }
    }
}

impl From<Frequency> for String {
    fn from(frequency: Frequency) -> Self {
        match frequency {
            Frequency::Daily => "daily".to_string(),
            Frequency::Weekly => "weekly".to_string(),
            Frequency::Custom => "custom".to_string(),
            Frequency::Unrecognized(other) => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_serializes_as_integer() {
        let json = serde_json::to_string(&Priority::P2).unwrap();
        assert_eq!(json, "2");
        let parsed: Priority = serde_json::from_str("1").unwrap();
        assert_eq!(parsed, Priority::P1);
        assert!(serde_json::from_str::<Priority>("0").is_err());
    }

    #[test]
    fn test_priority_orders_most_urgent_first() {
        assert!(Priority::P1 < Priority::P3);
        assert!(!Priority::default().is_set());
    }

    #[test]
    fn test_unknown_frequency_is_preserved() {
        let rule: RecurringRule =
            serde_json::from_str(r#"{"frequency": "monthly", "interval": 2}"#).unwrap();
        assert_eq!(rule.frequency, Frequency::Unrecognized("monthly".to_string()));
        let json = serde_json::to_value(&rule).unwrap();
        assert_eq!(json["frequency"], "monthly");
    }

    #[test]
    fn test_task_uses_camel_case_fields() {
        let task = Task {
            id: Uuid::new_v4(),
            title: String::from("Stretch"),
            description: None,
            completed: false,
            date: jiff::civil::date(2024, 1, 1),
            created_at: 0,
            order: 0,
            is_recurring: true,
            recurring_rule: Some(RecurringRule::daily()),
            parent_id: None,
            labels: vec![],
            is_favorite: true,
            priority: Priority::P4,
        };
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["date"], "2024-01-01");
        assert_eq!(json["isRecurring"], true);
        assert_eq!(json["isFavorite"], true);
        assert_eq!(json["recurringRule"]["frequency"], "daily");
        assert!(json.get("parentId").is_none());
        assert!(task.is_live_template());
        assert!(!task.is_history());
    }
}

// common/src/models/task.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Persisted todo item, owned by one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub index: String,
    pub description: String,
    #[serde(rename = "remind_noti")]
    pub reminder: bool,
    pub checked: bool,
    pub user_id: String,
    pub updated_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Task {
    pub fn new(input: TaskInput, owner: String, now: DateTime<Utc>) -> Self {
        Self {
            index: input.index,
            description: input.description,
            reminder: input.reminder,
            checked: input.checked,
            user_id: input.user_id.unwrap_or(owner),
            updated_at: now,
            created_at: now,
        }
    }

    /// Replace the editable fields. The owner only changes when the input names one.
    pub fn apply(&mut self, input: TaskInput, now: DateTime<Utc>) {
        self.index = input.index;
        self.description = input.description;
        self.reminder = input.reminder;
        self.checked = input.checked;
        if let Some(user_id) = input.user_id {
            self.user_id = user_id;
        }
        self.updated_at = now;
    }
}

/// Body of task creation and updates
#[derive(Debug, Clone, Deserialize)]
pub struct TaskInput {
    pub index: String,
    pub description: String,
    #[serde(default, rename = "remind_noti")]
    pub reminder: bool,
    #[serde(default)]
    pub checked: bool,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_defaults_to_caller() {
        let input: TaskInput =
            serde_json::from_str(r#"{"index":"1","description":"buy milk"}"#).unwrap();
        let task = Task::new(input, "owner-1".to_string(), Utc::now());

        assert_eq!(task.user_id, "owner-1");
        assert!(!task.reminder);
        assert!(!task.checked);
    }

    #[test]
    fn wire_names_follow_client_contract() {
        let input: TaskInput = serde_json::from_str(
            r#"{"index":"2","description":"call","remind_noti":true,"checked":true,"user_id":"u9"}"#,
        )
        .unwrap();
        let task = Task::new(input, "caller".to_string(), Utc::now());
        let json = serde_json::to_value(&task).unwrap();

        assert_eq!(json["remind_noti"], true);
        assert_eq!(json["checked"], true);
        assert_eq!(json["user_id"], "u9");
    }

    #[test]
    fn apply_keeps_owner_when_unset() {
        let created = Utc::now();
        let mut task = Task::new(
            TaskInput {
                index: "1".into(),
                description: "a".into(),
                reminder: false,
                checked: false,
                user_id: None,
            },
            "owner".to_string(),
            created,
        );

        task.apply(
            TaskInput {
                index: "1".into(),
                description: "b".into(),
                reminder: true,
                checked: true,
                user_id: None,
            },
            Utc::now(),
        );

        assert_eq!(task.user_id, "owner");
        assert_eq!(task.description, "b");
        assert!(task.checked);
        assert_eq!(task.created_at, created);
    }
}

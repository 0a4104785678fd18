pub mod notify;
pub mod store;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

pub const MIN_PRIORITY: u8 = 1;
pub const MAX_PRIORITY: u8 = 5;
/// Middle of the 1 (highest) .. 5 (lowest) range.
pub const DEFAULT_PRIORITY: u8 = 3;

// ─── Entity ──────────────────────────────────────────────────────────────────

/// One task or subtask. Ids are unique within a client's collection only.
///
/// `parent_id` marks this task as a subtask. The reference is not enforced:
/// a dangling parent is tolerated by every query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: u8,
    pub tags: Vec<String>,
    pub parent_id: Option<Uuid>,
}

impl Task {
    /// Construct a fresh task from a draft. `parent_id` is passed separately
    /// so the subtask route can force it regardless of the payload.
    fn from_draft(draft: TaskDraft, parent_id: Option<Uuid>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: draft.title,
            description: draft.description,
            completed: false,
            created_at: now,
            updated_at: now,
            due_date: draft.due_date,
            priority: draft.priority.unwrap_or(DEFAULT_PRIORITY),
            tags: draft.tags.unwrap_or_default(),
            parent_id,
        }
    }
}

// ─── Payloads ────────────────────────────────────────────────────────────────

/// Create / full-update payload.
///
/// On PUT, `title`, `description`, `due_date`, and `parent_id` overwrite the
/// stored task unconditionally (absent means null means cleared), while
/// `priority` and `tags` fall back to the stored values when not supplied.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskDraft {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub priority: Option<u8>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub parent_id: Option<Uuid>,
}

impl TaskDraft {
    /// Field-level checks done at the boundary; the store never re-validates.
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.title.trim().is_empty() {
            return Err(ApiError::validation("title must not be empty"));
        }
        validate_priority(self.priority)?;
        Ok(())
    }
}

/// Partial-update payload. Only fields present in the JSON are applied.
///
/// For the nullable fields (`description`, `due_date`, `parent_id`) an
/// explicit `null` clears the stored value, while absence leaves it alone —
/// hence the double `Option`. `title`, `completed`, `priority`, and `tags`
/// cannot be nulled, so `null` is treated the same as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    pub due_date: Option<Option<DateTime<Utc>>>,
    #[serde(default)]
    pub priority: Option<u8>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub parent_id: Option<Option<Uuid>>,
}

impl TaskPatch {
    pub fn validate(&self) -> Result<(), ApiError> {
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err(ApiError::validation("title must not be empty"));
            }
        }
        validate_priority(self.priority)?;
        Ok(())
    }

    /// Apply the present fields to a stored task and refresh `updated_at`.
    fn apply(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(tags) = self.tags {
            task.tags = tags;
        }
        if let Some(parent_id) = self.parent_id {
            task.parent_id = parent_id;
        }
        task.updated_at = Utc::now();
    }
}

pub fn validate_priority(priority: Option<u8>) -> Result<(), ApiError> {
    match priority {
        Some(p) if !(MIN_PRIORITY..=MAX_PRIORITY).contains(&p) => {
            Err(ApiError::validation("priority must be between 1 and 5"))
        }
        _ => Ok(()),
    }
}

/// Wraps a deserialized value in an extra `Some` so that "present but null"
/// (`Some(None)`) is distinguishable from "absent" (`None` via serde default).
fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

// ─── Query filter ────────────────────────────────────────────────────────────

pub const DEFAULT_PAGE_LIMIT: usize = 10;

/// Conjunctive list filters plus offset/limit slicing.
#[derive(Debug, Clone)]
pub struct TaskFilter {
    pub completed: Option<bool>,
    /// Exact tag membership. An empty string filters nothing.
    pub tag: Option<String>,
    pub priority: Option<u8>,
    /// Keep only root tasks (no `parent_id`).
    pub parent_only: bool,
    pub skip: usize,
    pub limit: usize,
}

impl Default for TaskFilter {
    fn default() -> Self {
        Self {
            completed: None,
            tag: None,
            priority: None,
            parent_only: false,
            skip: 0,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl TaskFilter {
    fn matches(&self, task: &Task) -> bool {
        if let Some(completed) = self.completed {
            if task.completed != completed {
                return false;
            }
        }
        if let Some(tag) = self.tag.as_deref().filter(|t| !t.is_empty()) {
            if !task.tags.iter().any(|t| t == tag) {
                return false;
            }
        }
        if let Some(priority) = self.priority {
            if task.priority != priority {
                return false;
            }
        }
        if self.parent_only && task.parent_id.is_some() {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(title: &str) -> TaskDraft {
        TaskDraft {
            title: title.to_string(),
            description: None,
            due_date: None,
            priority: None,
            tags: None,
            parent_id: None,
        }
    }

    #[test]
    fn draft_defaults_apply() {
        let task = Task::from_draft(draft("buy milk"), None);
        assert_eq!(task.priority, DEFAULT_PRIORITY);
        assert!(task.tags.is_empty());
        assert!(!task.completed);
        assert_eq!(task.created_at, task.updated_at);
    }

    #[test]
    fn draft_rejects_empty_title_and_bad_priority() {
        assert!(draft("  ").validate().is_err());
        let mut d = draft("ok");
        d.priority = Some(6);
        assert!(d.validate().is_err());
        d.priority = Some(5);
        assert!(d.validate().is_ok());
    }

    #[test]
    fn patch_null_clears_nullable_fields_only() {
        let patch: TaskPatch =
            serde_json::from_str(r#"{"description": null, "due_date": null}"#).unwrap();
        assert_eq!(patch.description, Some(None));
        assert_eq!(patch.due_date, Some(None));
        // absent fields stay unset
        assert!(patch.title.is_none());
        assert!(patch.parent_id.is_none());
    }

    #[test]
    fn patch_absent_is_distinct_from_null() {
        let patch: TaskPatch = serde_json::from_str(r#"{"completed": true}"#).unwrap();
        assert!(patch.description.is_none());
        assert_eq!(patch.completed, Some(true));
    }

    #[test]
    fn filter_empty_tag_matches_everything() {
        let task = Task::from_draft(draft("untagged"), None);
        let filter = TaskFilter {
            tag: Some(String::new()),
            ..TaskFilter::default()
        };
        assert!(filter.matches(&task));
    }
}

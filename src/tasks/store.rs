use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use super::notify::{self, TaskStats};
use super::{Task, TaskDraft, TaskFilter, TaskPatch};
use crate::error::ApiError;

/// One client's tasks, kept in insertion order.
#[derive(Default)]
struct ClientCollection {
    tasks: Vec<Task>,
}

impl ClientCollection {
    fn contains(&self, id: Uuid) -> bool {
        self.tasks.iter().any(|t| t.id == id)
    }

    fn find(&self, id: Uuid) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    fn find_mut(&mut self, id: Uuid) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }
}

/// Process-wide task storage: client address → that client's collection.
///
/// Collections are created lazily on first mutation and live for the process
/// lifetime; nothing is persisted or evicted. A single RwLock guards the
/// whole map. There is no transaction boundary beyond one method call.
pub struct TaskStore {
    clients: RwLock<HashMap<String, ClientCollection>>,
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskStore {
    pub fn new() -> Self {
        Self {
            clients: RwLock::new(HashMap::new()),
        }
    }

    // ─── Mutations ───────────────────────────────────────────────────────────

    /// Insert a fresh task into the client's collection. The draft's
    /// `parent_id` is taken as-is — no check that it exists.
    pub async fn create(&self, client: &str, draft: TaskDraft) -> Task {
        let parent_id = draft.parent_id;
        let task = Task::from_draft(draft, parent_id);
        let mut clients = self.clients.write().await;
        clients
            .entry(client.to_string())
            .or_default()
            .tasks
            .push(task.clone());
        info!(client = %client, id = %task.id, "task created");
        task
    }

    /// Create a subtask under an existing parent. Unlike `create`, the
    /// parent must exist; the payload's own `parent_id` is ignored.
    pub async fn create_subtask(
        &self,
        client: &str,
        parent_id: Uuid,
        draft: TaskDraft,
    ) -> Result<Task, ApiError> {
        let mut clients = self.clients.write().await;
        let collection = clients.entry(client.to_string()).or_default();
        if !collection.contains(parent_id) {
            return Err(ApiError::NotFound(parent_id));
        }
        let task = Task::from_draft(draft, Some(parent_id));
        collection.tasks.push(task.clone());
        info!(client = %client, id = %task.id, parent = %parent_id, "subtask created");
        Ok(task)
    }

    /// Full replace: `title`, `description`, `due_date`, `parent_id` are
    /// overwritten unconditionally; `priority` and `tags` keep their stored
    /// values when the draft omits them; `id`, `created_at`, `completed`
    /// are never touched.
    pub async fn replace(&self, client: &str, id: Uuid, draft: TaskDraft) -> Result<Task, ApiError> {
        let mut clients = self.clients.write().await;
        let task = clients
            .get_mut(client)
            .and_then(|c| c.find_mut(id))
            .ok_or(ApiError::NotFound(id))?;
        task.title = draft.title;
        task.description = draft.description;
        task.due_date = draft.due_date;
        if let Some(priority) = draft.priority {
            task.priority = priority;
        }
        if let Some(tags) = draft.tags {
            task.tags = tags;
        }
        task.parent_id = draft.parent_id;
        task.updated_at = Utc::now();
        info!(client = %client, id = %id, "task updated");
        Ok(task.clone())
    }

    /// Apply only the fields present in the patch; everything else is
    /// untouched. `updated_at` is always refreshed.
    pub async fn patch(&self, client: &str, id: Uuid, patch: TaskPatch) -> Result<Task, ApiError> {
        let mut clients = self.clients.write().await;
        let task = clients
            .get_mut(client)
            .and_then(|c| c.find_mut(id))
            .ok_or(ApiError::NotFound(id))?;
        patch.apply(task);
        info!(client = %client, id = %id, "task partially updated");
        Ok(task.clone())
    }

    /// Delete a task and its direct subtasks. The cascade is one level only:
    /// grandchildren of a removed subtask stay in the collection (dangling
    /// parents are tolerated everywhere). Returns how many subtasks went.
    pub async fn delete(&self, client: &str, id: Uuid) -> Result<usize, ApiError> {
        let mut clients = self.clients.write().await;
        let collection = clients.get_mut(client).ok_or(ApiError::NotFound(id))?;
        if !collection.contains(id) {
            return Err(ApiError::NotFound(id));
        }
        let before = collection.tasks.len();
        collection.tasks.retain(|t| t.parent_id != Some(id));
        let removed_subtasks = before - collection.tasks.len();
        collection.tasks.retain(|t| t.id != id);
        info!(client = %client, id = %id, removed_subtasks, "task deleted");
        Ok(removed_subtasks)
    }

    // ─── Queries ─────────────────────────────────────────────────────────────

    pub async fn get(&self, client: &str, id: Uuid) -> Result<Task, ApiError> {
        self.clients
            .read()
            .await
            .get(client)
            .and_then(|c| c.find(id))
            .cloned()
            .ok_or(ApiError::NotFound(id))
    }

    /// Filtered, sliced view of the collection in insertion order. A client
    /// with no collection yet simply lists empty.
    pub async fn list(&self, client: &str, filter: &TaskFilter) -> Vec<Task> {
        let clients = self.clients.read().await;
        let Some(collection) = clients.get(client) else {
            return Vec::new();
        };
        collection
            .tasks
            .iter()
            .filter(|t| filter.matches(t))
            .skip(filter.skip)
            .take(filter.limit)
            .cloned()
            .collect()
    }

    /// All direct subtasks of `parent_id`, in collection order. The parent
    /// itself must exist.
    pub async fn subtasks(&self, client: &str, parent_id: Uuid) -> Result<Vec<Task>, ApiError> {
        let clients = self.clients.read().await;
        let collection = clients.get(client).ok_or(ApiError::NotFound(parent_id))?;
        if !collection.contains(parent_id) {
            return Err(ApiError::NotFound(parent_id));
        }
        Ok(collection
            .tasks
            .iter()
            .filter(|t| t.parent_id == Some(parent_id))
            .cloned()
            .collect())
    }

    /// Aggregate counters over the current snapshot. Recomputed every call.
    pub async fn stats(&self, client: &str) -> TaskStats {
        let clients = self.clients.read().await;
        let tasks = clients.get(client).map(|c| c.tasks.as_slice()).unwrap_or(&[]);
        notify::stats(tasks)
    }

    /// Due-soon / overdue message strings for the current snapshot. Nothing
    /// is stored or delivered.
    pub async fn notifications(&self, client: &str) -> Vec<String> {
        let clients = self.clients.read().await;
        let tasks = clients.get(client).map(|c| c.tasks.as_slice()).unwrap_or(&[]);
        notify::due_notifications(tasks)
    }
}

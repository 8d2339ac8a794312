use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::sync::Arc;
use tokio::sync::RwLock;

pub mod api;

/// Lifecycle status of a task.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Completed,
}

#[derive(Debug, PartialEq, Clone, Eq)]
pub struct Task {
    id: u32,
    title: String,
    description: String,
    status: TaskStatus,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    priority: i32,
}

impl Task {
    /// Returns the ID of the task.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Returns the title of the task.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description of the task.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the status of the task.
    pub fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the creation time of the task.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the completion time of the task, if it has one.
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Returns the priority of the task.
    pub fn priority(&self) -> i32 {
        self.priority
    }
}

/// Caller-suppliable task fields, used by both create and update.
///
/// `id`, `created_at`, and `completed_at` are deliberately absent: the
/// repository owns identifier assignment and lifecycle timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: i32,
}

/// Error type for TaskRepository operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TaskRepositoryError {
    /// Represents a task not found error.
    #[error("Task with ID {0} not found")]
    TaskNotFound(u32),
    /// Represents a draft rejected for having a blank title.
    #[error("Task title must not be blank")]
    BlankTitle,
    /// Represents a draft priority outside the configured range.
    #[error("Task priority {0} is outside the allowed range {1}..={2}")]
    PriorityOutOfRange(i32, i32, i32),
}

/// Validation applied to caller-supplied drafts on create and update.
///
/// Rules are configured explicitly at repository construction. The default
/// requires a non-blank title and a priority within 1..=5; `permissive()`
/// disables every check and accepts arbitrary drafts.
#[derive(Debug, Clone)]
pub struct ValidationRules {
    require_title: bool,
    priority_range: Option<RangeInclusive<i32>>,
}

impl ValidationRules {
    pub fn new(require_title: bool, priority_range: Option<RangeInclusive<i32>>) -> Self {
        Self {
            require_title,
            priority_range,
        }
    }

    /// Rules that accept any draft.
    pub fn permissive() -> Self {
        Self::new(false, None)
    }

    fn check(&self, draft: &TaskDraft) -> Result<(), TaskRepositoryError> {
        if self.require_title && draft.title.trim().is_empty() {
            return Err(TaskRepositoryError::BlankTitle);
        }
        if let Some(range) = &self.priority_range {
            if !range.contains(&draft.priority) {
                return Err(TaskRepositoryError::PriorityOutOfRange(
                    draft.priority,
                    *range.start(),
                    *range.end(),
                ));
            }
        }
        Ok(())
    }
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self::new(true, Some(1..=5))
    }
}

/// In-memory store of task records.
///
/// Owns the task collection and the identifier counter. Identifiers start at
/// 1, grow monotonically, and are never reused after deletion. All operations
/// are synchronous linear scans; callers exposing the repository to a
/// concurrent runtime must serialize access (see [`TaskState`]).
pub struct TaskRepository {
    tasks: Vec<Task>,
    next_id: u32,
    rules: ValidationRules,
}

impl TaskRepository {
    /// Creates an empty repository with the given validation rules.
    pub fn new(rules: ValidationRules) -> Self {
        Self {
            tasks: Vec::new(),
            next_id: 1,
            rules,
        }
    }

    /// Creates a repository seeded with three sample tasks, one per status.
    pub fn with_sample_tasks(rules: ValidationRules) -> Self {
        let mut repository = Self::new(rules);
        let now = Utc::now();

        repository.seed(
            "Setup project",
            "Initialize the task manager API",
            TaskStatus::Completed,
            1,
            Some(now - chrono::Duration::days(2)),
        );
        repository.seed(
            "Create API endpoints",
            "Build CRUD endpoints for tasks",
            TaskStatus::InProgress,
            2,
            None,
        );
        repository.seed(
            "Add authentication",
            "Implement user authentication",
            TaskStatus::Todo,
            1,
            None,
        );
        repository
    }

    fn seed(
        &mut self,
        title: &str,
        description: &str,
        status: TaskStatus,
        priority: i32,
        completed_at: Option<DateTime<Utc>>,
    ) {
        let task = Task {
            id: self.next_id,
            title: title.to_string(),
            description: description.to_string(),
            status,
            created_at: Utc::now(),
            completed_at,
            priority,
        };
        self.next_id += 1;
        self.tasks.push(task);
    }

    /// Retrieves all tasks in insertion order.
    ///
    /// # Returns
    ///
    /// A snapshot `Vec` of every task currently stored.
    #[tracing::instrument(skip(self))]
    pub fn list_all(&self) -> Vec<Task> {
        self.tasks.clone()
    }

    /// Retrieves a task by its ID.
    ///
    /// # Arguments
    ///
    /// * `id` - The ID of the task to retrieve.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Task` if present, or `TaskNotFound` otherwise.
    #[tracing::instrument(skip(self))]
    pub fn get_by_id(&self, id: u32) -> Result<Task, TaskRepositoryError> {
        self.tasks
            .iter()
            .find(|task| task.id == id)
            .cloned()
            .ok_or(TaskRepositoryError::TaskNotFound(id))
    }

    /// Creates a new task from a draft.
    ///
    /// Assigns the next sequential ID and stamps `created_at`; a draft that
    /// is already `Completed` gets `completed_at` stamped as well.
    ///
    /// # Arguments
    ///
    /// * `draft` - The caller-supplied task fields.
    ///
    /// # Returns
    ///
    /// A `Result` containing the stored `Task` if the draft passes the
    /// configured validation rules, or an error otherwise.
    #[tracing::instrument(skip(self))]
    pub fn create(&mut self, draft: TaskDraft) -> Result<Task, TaskRepositoryError> {
        self.rules.check(&draft)?;

        let now = Utc::now();
        let task = Task {
            id: self.next_id,
            title: draft.title,
            description: draft.description,
            status: draft.status,
            created_at: now,
            completed_at: (draft.status == TaskStatus::Completed).then_some(now),
            priority: draft.priority,
        };
        self.next_id += 1;
        self.tasks.push(task.clone());
        Ok(task)
    }

    /// Updates a task by its ID, overwriting every draft field.
    ///
    /// `created_at` is left untouched. `completed_at` is stamped when the
    /// update transitions the task into `Completed`, preserved when the task
    /// stays `Completed`, and cleared when the task leaves `Completed`.
    ///
    /// # Arguments
    ///
    /// * `id` - The ID of the task to update.
    /// * `draft` - The replacement task fields.
    ///
    /// # Returns
    ///
    /// A `Result` containing the updated `Task` if successful, or an error
    /// otherwise.
    #[tracing::instrument(skip(self))]
    pub fn update(&mut self, id: u32, draft: TaskDraft) -> Result<Task, TaskRepositoryError> {
        let task = self
            .tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or(TaskRepositoryError::TaskNotFound(id))?;
        self.rules.check(&draft)?;

        if draft.status == TaskStatus::Completed {
            if task.status != TaskStatus::Completed {
                task.completed_at = Some(Utc::now());
            }
        } else {
            task.completed_at = None;
        }

        task.title = draft.title;
        task.description = draft.description;
        task.status = draft.status;
        task.priority = draft.priority;

        Ok(task.clone())
    }

    /// Deletes a task by its ID.
    ///
    /// # Arguments
    ///
    /// * `id` - The ID of the task to delete.
    ///
    /// # Returns
    ///
    /// A `Result` containing the removed `Task` if successful, or
    /// `TaskNotFound` otherwise. Deleted IDs are never reassigned.
    #[tracing::instrument(skip(self))]
    pub fn delete(&mut self, id: u32) -> Result<Task, TaskRepositoryError> {
        let index = self
            .tasks
            .iter()
            .position(|task| task.id == id)
            .ok_or(TaskRepositoryError::TaskNotFound(id))?;
        Ok(self.tasks.remove(index))
    }
}

/// Shared state handed to task API handlers.
///
/// The repository itself is not concurrent-safe, so the state wraps it in an
/// `RwLock`: reads (list, get) share the lock, mutations (create, update,
/// delete) take it exclusively, which keeps the identifier counter and the
/// collection consistent across concurrent requests.
#[derive(Clone)]
pub struct TaskState {
    pub repository: Arc<RwLock<TaskRepository>>,
}

impl TaskState {
    pub fn new(repository: TaskRepository) -> Self {
        Self {
            repository: Arc::new(RwLock::new(repository)),
        }
    }
}

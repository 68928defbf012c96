//! Task business logic - Work items tracked alongside the inventory.
//!
//! Tasks are independent of month records: locking a period never affects them.

use crate::{
    core::{
        actor::Actor,
        validation::{double_option, min_chars},
    },
    entities::{Task, TaskStatus, task},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Deserialize;
use tracing::info;

const TITLE_MESSAGE: &str = "Task title must be at least 3 characters";

/// Payload for creating a task.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewTask {
    /// Short title, at least 3 characters
    pub title: String,
    /// Optional longer description
    #[serde(default)]
    pub description: Option<String>,
    /// Defaults to started
    #[serde(default)]
    pub status: Option<TaskStatus>,
    /// Optional deadline
    #[serde(default)]
    pub due_date: Option<DateTimeUtc>,
    /// Optional assignee
    #[serde(default)]
    pub assigned_to: Option<i64>,
}

/// Partial update of a task. `Some(None)` clears an optional field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskPatch {
    /// New title
    #[serde(default)]
    pub title: Option<String>,
    /// New description
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    /// New status
    #[serde(default)]
    pub status: Option<TaskStatus>,
    /// New deadline
    #[serde(default, deserialize_with = "double_option")]
    pub due_date: Option<Option<DateTimeUtc>>,
    /// New assignee
    #[serde(default, deserialize_with = "double_option")]
    pub assigned_to: Option<Option<i64>>,
}

/// Retrieves a task by id.
///
/// # Errors
/// Returns [`Error::TaskNotFound`] if no task has this id.
pub async fn get_task(db: &DatabaseConnection, id: i64) -> Result<task::Model> {
    Task::find_by_id(id)
        .one(db)
        .await?
        .ok_or(Error::TaskNotFound { id })
}

/// Creates a task on behalf of `actor`.
///
/// # Errors
/// Returns an error if the title is too short or the database insert fails.
pub async fn create_task(db: &DatabaseConnection, actor: &Actor, new: NewTask) -> Result<task::Model> {
    let title = min_chars(&new.title, 3, TITLE_MESSAGE)?;

    let task = task::ActiveModel {
        title: Set(title),
        description: Set(new.description),
        status: Set(new.status.unwrap_or_default()),
        due_date: Set(new.due_date),
        assigned_to: Set(new.assigned_to),
        created_by: Set(actor.user_id),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    let task = task.insert(db).await?;

    info!(task_id = task.id, "Task created");
    Ok(task)
}

/// Applies a partial update to a task.
///
/// # Errors
/// Returns an error if the task does not exist, a new title is too short, or the
/// database update fails.
pub async fn update_task(db: &DatabaseConnection, id: i64, patch: TaskPatch) -> Result<task::Model> {
    let title = patch
        .title
        .as_deref()
        .map(|title| min_chars(title, 3, TITLE_MESSAGE))
        .transpose()?;

    let existing = get_task(db, id).await?;
    let mut active: task::ActiveModel = existing.clone().into();
    let mut changed = false;

    if let Some(title) = title {
        active.title = Set(title);
        changed = true;
    }
    if let Some(description) = patch.description {
        active.description = Set(description);
        changed = true;
    }
    if let Some(status) = patch.status {
        active.status = Set(status);
        changed = true;
    }
    if let Some(due_date) = patch.due_date {
        active.due_date = Set(due_date);
        changed = true;
    }
    if let Some(assigned_to) = patch.assigned_to {
        active.assigned_to = Set(assigned_to);
        changed = true;
    }

    if !changed {
        return Ok(existing);
    }
    active.update(db).await.map_err(Into::into)
}

/// Deletes a task.
///
/// # Returns
/// `Ok(false)` if no task had this id.
///
/// # Errors
/// Returns an error if the database delete fails.
pub async fn delete_task(db: &DatabaseConnection, id: i64) -> Result<bool> {
    let result = Task::delete_by_id(id).exec(db).await?;
    Ok(result.rows_affected > 0)
}

/// All tasks in insertion order.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_all_tasks(db: &DatabaseConnection) -> Result<Vec<task::Model>> {
    Task::find()
        .order_by_asc(task::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Tasks with one status, in insertion order.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_tasks_by_status(
    db: &DatabaseConnection,
    status: TaskStatus,
) -> Result<Vec<task::Model>> {
    Task::find()
        .filter(task::Column::Status.eq(status))
        .order_by_asc(task::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Tasks assigned to one user, in insertion order.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_tasks_by_assignee(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<task::Model>> {
    Task::find()
        .filter(task::Column::AssignedTo.eq(user_id))
        .order_by_asc(task::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Task service
///
/// The author of a task is always the caller: it is stamped on create and
/// again on every update, and it is never read from the request body. Only
/// the author may update or delete a task.
///
/// Referenced IDs (`taskStatusId`, `executorId`, `labelIds`) are resolved
/// inside the same transaction as the write. An ID that doesn't resolve is a
/// 422 naming the field.

use crate::error::{ApiError, ApiResult};
use crate::services::{acting_user, not_blank};
use serde::Deserialize;
use sqlx::{PgConnection, PgPool};
use std::collections::BTreeSet;
use taskboard_shared::{
    auth::{authorization::require_ownership, middleware::AuthContext},
    filter::TaskFilter,
    models::{
        label::Label,
        task::{CreateTask, Task, TaskDetails, UpdateTask},
        task_status::TaskStatus,
        user::User,
    },
};
use tracing::debug;
use validator::Validate;

/// Request body for creating or replacing a task
///
/// There is no author field; any `authorId` in the body is ignored.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TaskRequest {
    #[validate(
        custom(function = "not_blank", message = "Name must not be blank"),
        length(min = 3, max = 1000, message = "Name must be 3 to 1000 characters")
    )]
    pub name: String,

    pub description: Option<String>,

    #[serde(alias = "statusId")]
    pub task_status_id: i64,

    pub executor_id: Option<i64>,

    /// `None` keeps the current labels on update; `Some(vec![])` clears them
    pub label_ids: Option<Vec<i64>>,
}

/// Checks that every ID the request references exists
async fn resolve_references(conn: &mut PgConnection, req: &TaskRequest) -> ApiResult<()> {
    if TaskStatus::find_by_id(&mut *conn, req.task_status_id)
        .await?
        .is_none()
    {
        return Err(ApiError::unknown_reference("taskStatusId", req.task_status_id));
    }

    if let Some(executor_id) = req.executor_id {
        if User::find_by_id(&mut *conn, executor_id).await?.is_none() {
            return Err(ApiError::unknown_reference("executorId", executor_id));
        }
    }

    if let Some(label_ids) = &req.label_ids {
        let requested: BTreeSet<i64> = label_ids.iter().copied().collect();
        let ids: Vec<i64> = requested.iter().copied().collect();
        let found: BTreeSet<i64> = Label::find_by_ids(&mut *conn, &ids)
            .await?
            .into_iter()
            .map(|label| label.id)
            .collect();

        let missing: Vec<String> = requested
            .difference(&found)
            .map(|id| id.to_string())
            .collect();

        if !missing.is_empty() {
            return Err(ApiError::unknown_reference("labelIds", missing.join(", ")));
        }
    }

    Ok(())
}

/// Loads a task and its author, or 404
async fn load_with_author(conn: &mut PgConnection, id: i64) -> ApiResult<(Task, User)> {
    let task = Task::find_by_id(&mut *conn, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Task {id} not found")))?;

    let author = User::find_by_id(&mut *conn, task.author_id)
        .await?
        .ok_or(sqlx::Error::RowNotFound)?;

    Ok((task, author))
}

pub async fn get_task(pool: &PgPool, id: i64) -> ApiResult<TaskDetails> {
    let mut conn = pool.acquire().await?;

    let task = Task::find_by_id(&mut *conn, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Task {id} not found")))?;

    Ok(Task::hydrate_one(&mut conn, task).await?)
}

/// Lists tasks matching `filter`
///
/// The caller's user row is only looked up when `isMyTasks` is set.
pub async fn list_tasks(
    pool: &PgPool,
    auth: &AuthContext,
    filter: &TaskFilter,
) -> ApiResult<Vec<TaskDetails>> {
    let mut tx = pool.begin().await?;

    let acting_user_id = if filter.my_tasks {
        Some(acting_user(&mut tx, auth).await?.id)
    } else {
        None
    };

    let clauses = filter.clauses(acting_user_id)?;
    debug!(clauses = clauses.len(), unfiltered = filter.is_empty(), "Listing tasks");

    let tasks = Task::list_filtered(&mut *tx, &clauses).await?;
    let details = Task::hydrate(&mut tx, tasks).await?;

    tx.commit().await?;
    Ok(details)
}

pub async fn create_task(
    pool: &PgPool,
    auth: &AuthContext,
    req: TaskRequest,
) -> ApiResult<TaskDetails> {
    let mut tx = pool.begin().await?;

    let author = acting_user(&mut tx, auth).await?;
    resolve_references(&mut tx, &req).await?;

    let task = Task::create(
        &mut *tx,
        CreateTask {
            name: req.name,
            description: req.description,
            task_status_id: req.task_status_id,
            author_id: author.id,
            executor_id: req.executor_id,
        },
    )
    .await?;

    if let Some(label_ids) = &req.label_ids {
        Task::set_labels(&mut tx, task.id, label_ids).await?;
    }

    let details = Task::hydrate_one(&mut tx, task).await?;
    tx.commit().await?;

    debug!(task_id = details.id, author = %auth.email, "Task created");
    Ok(details)
}

/// Replaces a task's fields and re-stamps its author
///
/// Checks run in order: task exists (404), caller is the author (403),
/// references resolve (422).
pub async fn update_task(
    pool: &PgPool,
    auth: &AuthContext,
    id: i64,
    req: TaskRequest,
) -> ApiResult<TaskDetails> {
    let mut tx = pool.begin().await?;

    let (_, current_author) = load_with_author(&mut tx, id).await?;
    require_ownership(auth, &current_author.email)?;

    let author = acting_user(&mut tx, auth).await?;
    resolve_references(&mut tx, &req).await?;

    let task = Task::update(
        &mut *tx,
        id,
        UpdateTask {
            name: req.name,
            description: req.description,
            task_status_id: req.task_status_id,
            author_id: author.id,
            executor_id: req.executor_id,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("Task {id} not found")))?;

    if let Some(label_ids) = &req.label_ids {
        Task::set_labels(&mut tx, id, label_ids).await?;
    }

    let details = Task::hydrate_one(&mut tx, task).await?;
    tx.commit().await?;

    debug!(task_id = id, author = %auth.email, "Task updated");
    Ok(details)
}

pub async fn delete_task(pool: &PgPool, auth: &AuthContext, id: i64) -> ApiResult<()> {
    let mut tx = pool.begin().await?;

    let (_, author) = load_with_author(&mut tx, id).await?;
    require_ownership(auth, &author.email)?;

    Task::delete(&mut *tx, id).await?;
    tx.commit().await?;

    debug!(task_id = id, "Task deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: serde_json::Value) -> TaskRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_request_uses_camel_case() {
        let req = parse(serde_json::json!({
            "name": "T1",
            "description": "first",
            "taskStatusId": 2,
            "executorId": 3,
            "labelIds": [4, 5]
        }));

        assert_eq!(req.task_status_id, 2);
        assert_eq!(req.executor_id, Some(3));
        assert_eq!(req.label_ids, Some(vec![4, 5]));
    }

    #[test]
    fn test_status_id_alias() {
        let req = parse(serde_json::json!({ "name": "T1", "statusId": 7 }));

        assert_eq!(req.task_status_id, 7);
        assert_eq!(req.executor_id, None);
        assert_eq!(req.label_ids, None);
    }

    #[test]
    fn test_author_in_body_is_ignored() {
        let req = parse(serde_json::json!({ "name": "T1", "taskStatusId": 1, "authorId": 99 }));
        assert!(!format!("{req:?}").contains("99"));
    }

    #[test]
    fn test_empty_label_list_is_kept_distinct_from_absent() {
        let req = parse(serde_json::json!({ "name": "T1", "taskStatusId": 1, "labelIds": [] }));
        assert_eq!(req.label_ids, Some(Vec::new()));
    }

    #[test]
    fn test_missing_status_fails_to_parse() {
        let result = serde_json::from_value::<TaskRequest>(serde_json::json!({ "name": "T1" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_name_rules() {
        let ok = parse(serde_json::json!({ "name": "Fix login", "taskStatusId": 1 }));
        assert!(ok.validate().is_ok());

        for name in ["", "ab", "     "] {
            let req = parse(serde_json::json!({ "name": name, "taskStatusId": 1 }));
            assert!(req.validate().is_err(), "{name:?} should be rejected");
        }
    }
}

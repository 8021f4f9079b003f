/// Task listing filters
///
/// `GET /tasks` accepts a handful of optional query parameters. Each one that
/// is present narrows the listing, and all of them must hold at once:
///
/// | parameter    | matches tasks whose...                          |
/// |--------------|-------------------------------------------------|
/// | `taskStatus` | status ID equals the value                      |
/// | `executorId` | executor ID equals the value                    |
/// | `authorId`   | author ID equals the value                      |
/// | `labels`     | labels include any of the IDs (`5` or `[5, 7]`) |
/// | `isMyTasks`  | author is the caller (only when `true`)         |
///
/// Unknown parameters are ignored. A malformed value rejects the whole
/// request instead of being dropped.
///
/// Filtering happens in three pure steps so each can be tested without a
/// database:
///
/// 1. [`TaskFilter::from_params`] parses the raw query map
/// 2. [`TaskFilter::clauses`] turns the filter into [`TaskClause`]s, given
///    the caller's user ID when `isMyTasks` asks for it
/// 3. [`build_task_query`] renders the clauses into a bound SQL query
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
/// use taskboard_shared::filter::{build_task_query, TaskClause, TaskFilter};
///
/// let params = HashMap::from([
///     ("taskStatus".to_string(), "3".to_string()),
///     ("labels".to_string(), "[1, 2]".to_string()),
/// ]);
///
/// let filter = TaskFilter::from_params(&params).unwrap();
/// let clauses = filter.clauses(None).unwrap();
/// assert_eq!(
///     clauses,
///     vec![TaskClause::StatusIs(3), TaskClause::HasAnyLabel(vec![1, 2])]
/// );
///
/// let query = build_task_query(&clauses);
/// assert!(query.sql().contains("WHERE t.task_status_id = $1 AND EXISTS"));
/// ```

use serde::Deserialize;
use sqlx::{Postgres, QueryBuilder};
use std::collections::HashMap;

pub const TASK_STATUS_PARAM: &str = "taskStatus";
pub const EXECUTOR_ID_PARAM: &str = "executorId";
pub const AUTHOR_ID_PARAM: &str = "authorId";
pub const LABELS_PARAM: &str = "labels";
pub const MY_TASKS_PARAM: &str = "isMyTasks";

/// Columns selected for a task row, shared with `models::task`
pub(crate) const TASK_COLUMNS: &str =
    "t.id, t.name, t.description, t.task_status_id, t.author_id, t.executor_id, t.created_at";

/// Error type for filter parsing
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
    /// An ID parameter is not an integer
    #[error("Invalid value for '{param}': expected an integer id, got '{value}'")]
    InvalidId { param: &'static str, value: String },

    /// `labels` is neither an ID nor a JSON array of IDs
    #[error("Invalid value for 'labels': expected an id or an array of ids, got '{0}'")]
    InvalidLabels(String),

    /// `isMyTasks=true` was requested without a caller identity
    #[error("'isMyTasks' requires an authenticated user")]
    IdentityRequired,
}

/// Parsed task filters, one field per recognized parameter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub task_status: Option<i64>,
    pub executor_id: Option<i64>,
    pub author_id: Option<i64>,

    /// Sorted, deduplicated label IDs
    pub labels: Option<Vec<i64>>,

    /// Restrict to tasks authored by the caller
    pub my_tasks: bool,
}

/// One condition of the listing query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskClause {
    StatusIs(i64),
    ExecutorIs(i64),
    AuthorIs(i64),
    HasAnyLabel(Vec<i64>),
}

/// `labels` accepts a bare ID as well as an array
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(i64),
    Many(Vec<i64>),
}

impl TaskFilter {
    /// Parses the raw query parameters of a listing request
    ///
    /// # Errors
    ///
    /// Returns the first malformed parameter in the order of the table above.
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, FilterError> {
        let labels = params
            .get(LABELS_PARAM)
            .map(|value| parse_label_ids(value))
            .transpose()?;

        Ok(Self {
            task_status: parse_id(params, TASK_STATUS_PARAM)?,
            executor_id: parse_id(params, EXECUTOR_ID_PARAM)?,
            author_id: parse_id(params, AUTHOR_ID_PARAM)?,
            labels,
            my_tasks: params.get(MY_TASKS_PARAM).map(String::as_str) == Some("true"),
        })
    }

    /// True if no parameter narrows the listing
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Builds the clause list
    ///
    /// `acting_user_id` is only consulted when `my_tasks` is set.
    ///
    /// # Errors
    ///
    /// `FilterError::IdentityRequired` if `my_tasks` is set and no user ID is given.
    pub fn clauses(&self, acting_user_id: Option<i64>) -> Result<Vec<TaskClause>, FilterError> {
        let mut clauses = Vec::new();

        if let Some(id) = self.task_status {
            clauses.push(TaskClause::StatusIs(id));
        }
        if let Some(id) = self.executor_id {
            clauses.push(TaskClause::ExecutorIs(id));
        }
        if let Some(id) = self.author_id {
            clauses.push(TaskClause::AuthorIs(id));
        }
        if let Some(ids) = &self.labels {
            clauses.push(TaskClause::HasAnyLabel(ids.clone()));
        }
        if self.my_tasks {
            let user_id = acting_user_id.ok_or(FilterError::IdentityRequired)?;
            clauses.push(TaskClause::AuthorIs(user_id));
        }

        Ok(clauses)
    }
}

fn parse_id(
    params: &HashMap<String, String>,
    param: &'static str,
) -> Result<Option<i64>, FilterError> {
    params
        .get(param)
        .map(|value| {
            value.trim().parse::<i64>().map_err(|_| FilterError::InvalidId {
                param,
                value: value.clone(),
            })
        })
        .transpose()
}

fn parse_label_ids(value: &str) -> Result<Vec<i64>, FilterError> {
    let mut ids = match serde_json::from_str::<OneOrMany>(value.trim()) {
        Ok(OneOrMany::One(id)) => vec![id],
        Ok(OneOrMany::Many(ids)) => ids,
        Err(_) => return Err(FilterError::InvalidLabels(value.to_string())),
    };

    ids.sort_unstable();
    ids.dedup();
    Ok(ids)
}

/// Renders clauses into a task listing query
///
/// Clauses are joined with `AND`. With no clauses the query has no `WHERE`
/// and returns every task. Rows come back in ID order.
pub fn build_task_query(clauses: &[TaskClause]) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new(format!("SELECT {TASK_COLUMNS} FROM tasks t"));

    for (index, clause) in clauses.iter().enumerate() {
        query.push(if index == 0 { " WHERE " } else { " AND " });

        match clause {
            TaskClause::StatusIs(id) => {
                query.push("t.task_status_id = ").push_bind(*id);
            }
            TaskClause::ExecutorIs(id) => {
                query.push("t.executor_id = ").push_bind(*id);
            }
            TaskClause::AuthorIs(id) => {
                query.push("t.author_id = ").push_bind(*id);
            }
            TaskClause::HasAnyLabel(ids) => {
                query
                    .push("EXISTS (SELECT 1 FROM task_labels tl WHERE tl.task_id = t.id AND tl.label_id = ANY(")
                    .push_bind(ids.clone())
                    .push("))");
            }
        }
    }

    query.push(" ORDER BY t.id");
    query
}

/// Task model and database operations
///
/// Tasks reference their status, author, executor, and labels by ID. The
/// `Task` row is what gets stored and filtered; [`TaskDetails`] is the
/// response view with every reference loaded, built by [`Task::hydrate`].
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id BIGSERIAL PRIMARY KEY,
///     name VARCHAR(1000) NOT NULL UNIQUE,
///     description TEXT,
///     task_status_id BIGINT NOT NULL REFERENCES task_statuses (id) ON DELETE RESTRICT,
///     author_id BIGINT NOT NULL REFERENCES users (id) ON DELETE RESTRICT,
///     executor_id BIGINT REFERENCES users (id) ON DELETE RESTRICT,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE TABLE task_labels (
///     task_id BIGINT NOT NULL REFERENCES tasks (id) ON DELETE CASCADE,
///     label_id BIGINT NOT NULL REFERENCES labels (id) ON DELETE RESTRICT,
///     PRIMARY KEY (task_id, label_id)
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::filter::TaskClause;
/// use taskboard_shared::models::task::{CreateTask, Task};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let mut tx = pool.begin().await?;
///
/// let task = Task::create(&mut *tx, CreateTask {
///     name: "Write release notes".to_string(),
///     description: None,
///     task_status_id: 1,
///     author_id: 1,
///     executor_id: None,
/// }).await?;
/// Task::set_labels(&mut tx, task.id, &[2, 3]).await?;
///
/// let open = Task::list_filtered(&mut *tx, &[TaskClause::StatusIs(1)]).await?;
/// let details = Task::hydrate(&mut tx, open).await?;
/// tx.commit().await?;
/// # Ok(())
/// # }
/// ```

use crate::filter::{build_task_query, TaskClause, TASK_COLUMNS};
use crate::models::label::Label;
use crate::models::task_status::TaskStatus;
use crate::models::user::User;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{PgConnection, PgExecutor, Postgres, QueryBuilder};
use std::collections::{BTreeSet, HashMap};

/// Stored task row
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Task {
    pub id: i64,

    /// Unique task name
    pub name: String,

    pub description: Option<String>,

    pub task_status_id: i64,

    /// The user who last created or updated the task
    pub author_id: i64,

    /// Assigned user, if any
    pub executor_id: Option<i64>,

    pub created_at: DateTime<Utc>,
}

/// Input for creating a task
///
/// All IDs must already be resolved by the caller.
#[derive(Debug, Clone)]
pub struct CreateTask {
    pub name: String,
    pub description: Option<String>,
    pub task_status_id: i64,
    pub author_id: i64,
    pub executor_id: Option<i64>,
}

/// Input for overwriting a task's scalar fields
///
/// Labels are replaced separately with [`Task::set_labels`].
#[derive(Debug, Clone)]
pub struct UpdateTask {
    pub name: String,
    pub description: Option<String>,
    pub task_status_id: i64,
    pub author_id: i64,
    pub executor_id: Option<i64>,
}

/// Task with its references loaded, as returned by the API
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDetails {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub task_status: TaskStatus,
    pub author: User,
    pub executor: Option<User>,

    /// Attached labels in ID order
    pub labels: Vec<Label>,

    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Inserts a task
    ///
    /// # Errors
    ///
    /// A duplicate name fails with the `tasks_name_key` unique violation; an
    /// unknown reference fails with a foreign key violation.
    pub async fn create<'e, E>(executor: E, data: CreateTask) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (name, description, task_status_id, author_id, executor_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, description, task_status_id, author_id, executor_id, created_at
            "#,
        )
        .bind(data.name)
        .bind(data.description)
        .bind(data.task_status_id)
        .bind(data.author_id)
        .bind(data.executor_id)
        .fetch_one(executor)
        .await
    }

    pub async fn find_by_id<'e, E>(executor: E, id: i64) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Task>(&format!("SELECT {TASK_COLUMNS} FROM tasks t WHERE t.id = $1"))
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Looks a task up by its unique name
    ///
    /// Not used by the API, which addresses tasks by ID; tests use it to
    /// check that a rejected request left nothing behind.
    pub async fn find_by_name<'e, E>(executor: E, name: &str) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks t WHERE t.name = $1"
        ))
        .bind(name)
        .fetch_optional(executor)
        .await
    }

    /// Lists tasks matching every clause, in ID order
    ///
    /// An empty clause list returns all tasks.
    pub async fn list_filtered<'e, E>(
        executor: E,
        clauses: &[TaskClause],
    ) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let mut query = build_task_query(clauses);
        query.build_query_as::<Task>().fetch_all(executor).await
    }

    /// Overwrites a task's scalar fields
    ///
    /// Returns `None` if the task does not exist.
    pub async fn update<'e, E>(
        executor: E,
        id: i64,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET name = $2, description = $3, task_status_id = $4, author_id = $5, executor_id = $6
            WHERE id = $1
            RETURNING id, name, description, task_status_id, author_id, executor_id, created_at
            "#,
        )
        .bind(id)
        .bind(data.name)
        .bind(data.description)
        .bind(data.task_status_id)
        .bind(data.author_id)
        .bind(data.executor_id)
        .fetch_optional(executor)
        .await
    }

    /// Deletes a task and its label links
    pub async fn delete<'e, E>(executor: E, id: i64) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts tasks with this name
    pub async fn count_by_name<'e, E>(executor: E, name: &str) -> Result<i64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks WHERE name = $1")
            .bind(name)
            .fetch_one(executor)
            .await?;

        Ok(count)
    }

    /// Replaces the label set of a task
    ///
    /// An empty slice clears every label. Takes a connection rather than an
    /// executor because it issues two statements.
    pub async fn set_labels(
        conn: &mut PgConnection,
        task_id: i64,
        label_ids: &[i64],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM task_labels WHERE task_id = $1")
            .bind(task_id)
            .execute(&mut *conn)
            .await?;

        let unique: BTreeSet<i64> = label_ids.iter().copied().collect();
        if unique.is_empty() {
            return Ok(());
        }

        let mut insert: QueryBuilder<Postgres> =
            QueryBuilder::new("INSERT INTO task_labels (task_id, label_id) ");
        insert.push_values(unique, |mut row, label_id| {
            row.push_bind(task_id).push_bind(label_id);
        });
        insert.build().execute(&mut *conn).await?;

        Ok(())
    }

    /// IDs of the labels attached to a task, ascending
    pub async fn label_ids<'e, E>(executor: E, task_id: i64) -> Result<Vec<i64>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let rows: Vec<(i64,)> = sqlx::query_as(
            "SELECT label_id FROM task_labels WHERE task_id = $1 ORDER BY label_id",
        )
        .bind(task_id)
        .fetch_all(executor)
        .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// True if any task has this status
    pub async fn is_status_in_use<'e, E>(executor: E, status_id: i64) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let (in_use,): (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM tasks WHERE task_status_id = $1)")
                .bind(status_id)
                .fetch_one(executor)
                .await?;

        Ok(in_use)
    }

    /// True if any task carries this label
    pub async fn is_label_in_use<'e, E>(executor: E, label_id: i64) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let (in_use,): (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM task_labels WHERE label_id = $1)")
                .bind(label_id)
                .fetch_one(executor)
                .await?;

        Ok(in_use)
    }

    /// True if the user authors or executes any task
    pub async fn is_user_in_use<'e, E>(executor: E, user_id: i64) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let (in_use,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM tasks WHERE author_id = $1 OR executor_id = $1)",
        )
        .bind(user_id)
        .fetch_one(executor)
        .await?;

        Ok(in_use)
    }

    /// Loads the references of each task and builds the response view
    ///
    /// Runs one query per referenced table no matter how many tasks are
    /// passed. Order of `tasks` is preserved.
    ///
    /// # Errors
    ///
    /// `sqlx::Error::RowNotFound` if a referenced row vanished, which the
    /// foreign keys rule out inside a transaction.
    pub async fn hydrate(
        conn: &mut PgConnection,
        tasks: Vec<Task>,
    ) -> Result<Vec<TaskDetails>, sqlx::Error> {
        if tasks.is_empty() {
            return Ok(Vec::new());
        }

        let task_ids: Vec<i64> = tasks.iter().map(|t| t.id).collect();
        let status_ids = distinct(tasks.iter().map(|t| t.task_status_id));
        let user_ids = distinct(
            tasks
                .iter()
                .flat_map(|t| std::iter::once(t.author_id).chain(t.executor_id)),
        );

        let statuses: HashMap<i64, TaskStatus> = TaskStatus::find_by_ids(&mut *conn, &status_ids)
            .await?
            .into_iter()
            .map(|s| (s.id, s))
            .collect();

        let users: HashMap<i64, User> = User::find_by_ids(&mut *conn, &user_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        let label_rows: Vec<(i64, i64, String, DateTime<Utc>)> = sqlx::query_as(
            r#"
            SELECT tl.task_id, l.id, l.name, l.created_at
            FROM task_labels tl
            JOIN labels l ON l.id = tl.label_id
            WHERE tl.task_id = ANY($1)
            ORDER BY tl.task_id, l.id
            "#,
        )
        .bind(&task_ids)
        .fetch_all(&mut *conn)
        .await?;

        let mut labels: HashMap<i64, Vec<Label>> = HashMap::new();
        for (task_id, id, name, created_at) in label_rows {
            labels
                .entry(task_id)
                .or_default()
                .push(Label { id, name, created_at });
        }

        tasks
            .into_iter()
            .map(|task| -> Result<TaskDetails, sqlx::Error> {
                let task_status = statuses
                    .get(&task.task_status_id)
                    .cloned()
                    .ok_or(sqlx::Error::RowNotFound)?;
                let author = users
                    .get(&task.author_id)
                    .cloned()
                    .ok_or(sqlx::Error::RowNotFound)?;
                let executor = match task.executor_id {
                    Some(id) => Some(users.get(&id).cloned().ok_or(sqlx::Error::RowNotFound)?),
                    None => None,
                };

                Ok(TaskDetails {
                    id: task.id,
                    labels: labels.remove(&task.id).unwrap_or_default(),
                    name: task.name,
                    description: task.description,
                    task_status,
                    author,
                    executor,
                    created_at: task.created_at,
                })
            })
            .collect()
    }

    /// Hydrates a single task
    pub async fn hydrate_one(conn: &mut PgConnection, task: Task) -> Result<TaskDetails, sqlx::Error> {
        Self::hydrate(conn, vec![task])
            .await?
            .pop()
            .ok_or(sqlx::Error::RowNotFound)
    }
}

fn distinct(ids: impl Iterator<Item = i64>) -> Vec<i64> {
    ids.collect::<BTreeSet<_>>().into_iter().collect()
}

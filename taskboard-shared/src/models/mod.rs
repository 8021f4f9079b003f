/// Database models for Taskboard
///
/// Each model owns the queries for its table. Query functions take any
/// `PgExecutor`, so the same call works against the pool or inside a
/// transaction.
///
/// # Models
///
/// - `user`: User accounts and credentials
/// - `task_status`: Workflow statuses a task can be in
/// - `label`: Free-form tags attached to tasks
/// - `task`: Tasks, their labels, and the hydrated response view
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::models::task_status::TaskStatus;
/// use taskboard_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let mut tx = pool.begin().await?;
/// let status = TaskStatus::create(&mut *tx, "In review").await?;
/// tx.commit().await?;
///
/// println!("Created status {}", status.id);
/// # Ok(())
/// # }
/// ```

pub mod label;
pub mod task;
pub mod task_status;
pub mod user;

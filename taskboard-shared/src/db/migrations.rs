/// Schema migrations
///
/// The SQL files under `migrations/` at the workspace root are embedded at
/// compile time and applied in timestamp order. Applied versions are tracked
/// by sqlx in `_sqlx_migrations`, so running this on every start is safe.

use sqlx::postgres::PgPool;
use tracing::{info, warn};

/// Applies every migration that has not run yet
///
/// # Errors
///
/// Returns the first failing migration; sqlx rolls that migration back.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Applying database migrations");

    match sqlx::migrate!("../migrations").run(pool).await {
        Ok(()) => {
            info!("Database schema is up to date");
            Ok(())
        }
        Err(e) => {
            warn!(error = %e, "Migration failed");
            Err(e)
        }
    }
}

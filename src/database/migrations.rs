use error_stack::ResultExt;
use sqlx::migrate::Migrator;
use tokio::time::Instant;
use tracing::info;

use super::{Connection, MigrationError};

/// Migrations embedded from the `migrations/` directory at the
/// crate root.
pub static MIGRATOR: Migrator = sqlx::migrate!();

#[tracing::instrument(skip_all, name = "migrations.run_pending")]
pub async fn run_pending(conn: &mut Connection) -> error_stack::Result<(), MigrationError> {
  let now = Instant::now();
  info!("performing database migrations... (this may take a while)");

  MIGRATOR
    .run(&mut *conn)
    .await
    .change_context(MigrationError)?;

  let elapsed = now.elapsed();
  info!("successfully performed database migrations! took {elapsed:.2?}");

  Ok(())
}

use chrono::NaiveDate;
use sqlx::FromRow;

use crate::{
  database::{Connection, ErrorExt, Result},
  types::id::{
    marker::{CycleMarker, UserMarker},
    Id,
  },
};

/// A single day logged in a user's cycle history.
#[derive(Debug, FromRow, PartialEq, Eq)]
pub struct Cycle {
  pub id: Id<CycleMarker>,
  pub user_id: Id<UserMarker>,
  pub date: NaiveDate,
  pub is_menstruation: bool,
}

impl Cycle {
  #[tracing::instrument(skip_all, name = "db.cycles.list_by_user")]
  pub async fn list_by_user(conn: &mut Connection, user_id: Id<UserMarker>) -> Result<Vec<Self>> {
    sqlx::query_as::<_, Self>(r#"SELECT * FROM "cycles" WHERE user_id = $1 ORDER BY date DESC"#)
      .bind(user_id)
      .fetch_all(conn)
      .await
      .into_db_error()
  }

  /// First statement of the user removal sequence; runs strictly
  /// before the parent row in `users` is touched.
  #[tracing::instrument(skip_all, name = "db.cycles.delete_by_user")]
  pub(crate) async fn delete_by_user(
    conn: &mut Connection,
    user_id: Id<UserMarker>,
  ) -> Result<u64> {
    sqlx::query(r#"DELETE FROM "cycles" WHERE user_id = $1"#)
      .bind(user_id)
      .execute(conn)
      .await
      .map(|done| done.rows_affected())
      .into_db_error()
  }
}

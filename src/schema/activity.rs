use chrono::NaiveDate;
use sqlx::FromRow;

use crate::{
  database::{Connection, ErrorExt, Result},
  types::id::{
    marker::{ActivityMarker, UserMarker},
    Id,
  },
};

/// A logged sexual activity entry.
#[derive(Debug, FromRow, PartialEq, Eq)]
pub struct SexualActivity {
  pub id: Id<ActivityMarker>,
  pub user_id: Id<UserMarker>,
  pub date: NaiveDate,
}

impl SexualActivity {
  #[tracing::instrument(skip_all, name = "db.sexual_activities.list_by_user")]
  pub async fn list_by_user(conn: &mut Connection, user_id: Id<UserMarker>) -> Result<Vec<Self>> {
    sqlx::query_as::<_, Self>(
      r#"SELECT * FROM "sexual_activities" WHERE user_id = $1 ORDER BY date DESC"#,
    )
    .bind(user_id)
    .fetch_all(conn)
    .await
    .into_db_error()
  }

  /// Second statement of the user removal sequence; like the cycle
  /// cleanup it runs before the parent row in `users` is touched.
  #[tracing::instrument(skip_all, name = "db.sexual_activities.delete_by_user")]
  pub(crate) async fn delete_by_user(
    conn: &mut Connection,
    user_id: Id<UserMarker>,
  ) -> Result<u64> {
    sqlx::query(r#"DELETE FROM "sexual_activities" WHERE user_id = $1"#)
      .bind(user_id)
      .execute(conn)
      .await
      .map(|done| done.rows_affected())
      .into_db_error()
  }
}

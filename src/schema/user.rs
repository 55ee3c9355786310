use chrono::NaiveDateTime;
use sqlx::FromRow;

use crate::{
  database::{Connection, ErrorExt, Result},
  types::id::{marker::UserMarker, Id},
};

/// A registered user of the tracking bot, as the admin surface
/// sees it. Absent usernames and registration dates stay `None`;
/// rendering them is the display surface's problem.
#[derive(Debug, FromRow, PartialEq, Eq)]
pub struct User {
  pub id: Id<UserMarker>,
  pub chat_id: i64,
  pub username: Option<String>,
  pub menstruation_active: bool,
  pub registration_date: Option<NaiveDateTime>,
}

impl User {
  /// Lists every user, most recently registered first.
  ///
  /// Users without a registration date sort after all dated ones,
  /// and ties fall back to `id` descending, so the listing order is
  /// deterministic.
  #[tracing::instrument(skip_all, name = "db.users.list")]
  pub async fn list(conn: &mut Connection) -> Result<Vec<Self>> {
    sqlx::query_as::<_, Self>(
      r#"SELECT * FROM "users" ORDER BY registration_date DESC NULLS LAST, id DESC"#,
    )
    .fetch_all(conn)
    .await
    .into_db_error()
  }

  #[tracing::instrument(skip_all, name = "db.users.by_id")]
  pub async fn by_id(conn: &mut Connection, id: Id<UserMarker>) -> Result<Option<Self>> {
    sqlx::query_as::<_, Self>(r#"SELECT * FROM "users" WHERE id = $1"#)
      .bind(id)
      .fetch_optional(conn)
      .await
      .into_db_error()
  }

  #[tracing::instrument(skip_all, name = "db.users.by_chat_id")]
  pub async fn by_chat_id(conn: &mut Connection, chat_id: i64) -> Result<Option<Self>> {
    sqlx::query_as::<_, Self>(r#"SELECT * FROM "users" WHERE chat_id = $1"#)
      .bind(chat_id)
      .fetch_optional(conn)
      .await
      .into_db_error()
  }

  /// Removes the user row itself and nothing else. Dependent rows
  /// must already be gone when this runs;
  /// [`DeleteUser`](crate::services::users::DeleteUser) drives the
  /// full ordered sequence.
  #[tracing::instrument(skip_all, name = "db.users.delete")]
  pub(crate) async fn delete(conn: &mut Connection, id: Id<UserMarker>) -> Result<u64> {
    sqlx::query(r#"DELETE FROM "users" WHERE id = $1"#)
      .bind(id)
      .execute(conn)
      .await
      .map(|done| done.rows_affected())
      .into_db_error()
  }
}

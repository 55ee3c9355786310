use error_stack::Report;
use thiserror::Error;

/// Database related errors
#[derive(Debug, Error)]
pub enum Error {
  /// An error caused by an invalid Postgres connection url.
  #[error("invalid connection url")]
  InvalidUrl,
  /// The store cannot be reached or authenticated to right now.
  /// Fatal to the current operation, not to the process; the
  /// operator retries by re-invoking it.
  #[error("database is unavailable")]
  Unavailable,
  /// An error caused by an [`sqlx`] error.
  #[error("received a database error: {0}")]
  Internal(sqlx::Error),
}

/// Converts from a generic [sqlx] result into a [database compatible error](Error).
pub trait ErrorExt<T> {
  fn into_db_error(self) -> Result<T>;
}

// invalid_password / invalid_authorization_specification
const AUTH_FAILURE_CODES: &[&str] = &["28P01", "28000"];

impl<T> ErrorExt<T> for std::result::Result<T, sqlx::Error> {
  fn into_db_error(self) -> Result<T> {
    self.map_err(|e| match &e {
      sqlx::Error::PoolTimedOut
      | sqlx::Error::PoolClosed
      | sqlx::Error::Io(..)
      | sqlx::Error::Tls(..) => Report::new(e).change_context(Error::Unavailable),
      sqlx::Error::Database(err)
        if err
          .code()
          .is_some_and(|code| AUTH_FAILURE_CODES.contains(&code.as_ref())) =>
      {
        Report::new(e).change_context(Error::Unavailable)
      }
      _ => Report::new(Error::Internal(e)),
    })
  }
}

/// Lazily typed [`std::result::Result`] but the error generic
/// is filled up with [a database error](Error).
pub type Result<T> = error_stack::Result<T, Error>;

/// This trait deals with `error_stack::Report<Error>` because it is
/// annoying to dig through reports whenever callers only want to know
/// whether the store itself was reachable.
pub trait ErrorExt2 {
  fn is_unavailable(&self) -> bool;
}

impl ErrorExt2 for error_stack::Report<Error> {
  fn is_unavailable(&self) -> bool {
    self
      .downcast_ref::<Error>()
      .map(|v| matches!(v, Error::Unavailable))
      .unwrap_or_default()
  }
}

/// Failed to apply the pending database migrations.
#[derive(Debug, Error)]
#[error("failed to run database migrations")]
pub struct MigrationError;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn pool_exhaustion_is_unavailable() {
    let report = Err::<(), _>(sqlx::Error::PoolTimedOut)
      .into_db_error()
      .unwrap_err();

    assert!(report.is_unavailable());
  }

  #[test]
  fn query_failures_are_internal() {
    let report = Err::<(), _>(sqlx::Error::RowNotFound)
      .into_db_error()
      .unwrap_err();

    assert!(!report.is_unavailable());
    assert!(matches!(
      report.downcast_ref::<Error>(),
      Some(Error::Internal(..))
    ));
  }
}

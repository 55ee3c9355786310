use error_stack::{Result, ResultExt};
use thiserror::Error;
use tracing::error;

use crate::database::{self, ErrorExt};
use crate::schema::{Cycle, SexualActivity, User};
use crate::types::id::{marker::UserMarker, Id};
use crate::App;

/// Produces the admin snapshot: every user, most recently
/// registered first.
///
/// The snapshot is a point-in-time read; mutations committed after
/// it was produced are not reflected until the caller asks again.
#[derive(Debug)]
pub struct ListUsers;

#[derive(Debug, Error)]
#[error("Could not list users")]
pub struct ListUsersError;

impl ListUsers {
    #[tracing::instrument(skip_all, name = "services.users.list")]
    pub async fn perform(self, app: &App) -> Result<Vec<User>, ListUsersError> {
        let mut conn = app.db_read().await.change_context(ListUsersError)?;
        User::list(&mut conn).await.change_context(ListUsersError)
    }
}

/// Permanently removes a user together with every dependent row in
/// `cycles` and `sexual_activities`, as one atomic unit.
///
/// There is no soft delete and no undo; callers are expected to
/// have confirmed the operation with the operator already.
#[derive(Debug)]
pub struct DeleteUser {
    pub id: Id<UserMarker>,
}

#[derive(Debug, Error)]
#[error("Could not delete user")]
pub struct DeleteUserError;

/// What a completed [`DeleteUser`] actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteUserOutcome {
    /// The user existed and was removed, along with the counted
    /// dependent rows.
    Deleted { cycles: u64, activities: u64 },
    /// No user row matched the id. Nothing was removed; retrying an
    /// already finished deletion lands here instead of failing.
    NotFound,
}

impl DeleteUser {
    #[tracing::instrument(skip_all, fields(id = %self.id), name = "services.users.delete")]
    pub async fn perform(self, app: &App) -> Result<DeleteUserOutcome, DeleteUserError> {
        let mut txn = app.db.begin().await.change_context(DeleteUserError)?;

        match Self::run(&mut txn, self.id).await {
            Ok(outcome) => {
                txn.commit()
                    .await
                    .into_db_error()
                    .change_context(DeleteUserError)?;

                Ok(outcome)
            }
            Err(error) => {
                // The rollback has to land before the failure reaches the
                // caller, and a rollback failure must not mask the error
                // that caused it.
                if let Err(rollback_error) = txn.rollback().await {
                    error!(%rollback_error, "failed to rollback user deletion");
                }

                Err(error.change_context(DeleteUserError))
            }
        }
    }

    async fn run(
        txn: &mut database::Transaction<'_>,
        id: Id<UserMarker>,
    ) -> database::Result<DeleteUserOutcome> {
        // Children strictly before the parent. Reversing this order
        // breaks the referential invariant inside the transaction and
        // fails eagerly on stores that enforce it.
        let cycles = Cycle::delete_by_user(&mut *txn, id).await?;
        let activities = SexualActivity::delete_by_user(&mut *txn, id).await?;
        let users = User::delete(&mut *txn, id).await?;

        if users == 0 {
            return Ok(DeleteUserOutcome::NotFound);
        }

        Ok(DeleteUserOutcome::Deleted { cycles, activities })
    }
}

//! [`Command`] for completing a [`Showing`].

use common::{
    operations::{By, Select, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{case, user, Showing},
    infra::{database, Database},
    read, Service,
};
#[cfg(doc)]
use crate::domain::{Case, User};

use super::Command;

/// [`Command`] for marking the [`Showing`] of a [`Case`] as having taken
/// place.
///
/// The transition is one-way: a completed [`Showing`] cannot be uncompleted.
#[derive(Clone, Copy, Debug)]
pub struct CompleteShowing {
    /// ID of the [`Case`] whose [`Showing`] to complete.
    pub case_id: case::Id,

    /// ID of the [`User`] completing the [`Showing`].
    pub seller_id: user::Id,
}

impl<Db> Command<CompleteShowing> for Service<Db>
where
    Db: Database<
            Select<By<Option<read::case::Snapshot>, case::Id>>,
            Ok = Option<read::case::Snapshot>,
            Err = Traced<database::Error>,
        > + Database<Update<Showing>, Err = Traced<database::Error>>,
{
    type Ok = Showing;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CompleteShowing,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CompleteShowing { case_id, seller_id } = cmd;

        let snapshot = self
            .database()
            .execute(Select(By::<Option<read::case::Snapshot>, _>::new(
                case_id,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::CaseNotExists(case_id))
            .map_err(tracerr::wrap!())?;
        if snapshot.case.seller_id != seller_id {
            return Err(tracerr::new!(E::NotCaseOwner(seller_id)));
        }

        let status = snapshot.status();
        if status.is_terminal() {
            return Err(tracerr::new!(E::InvalidCaseState(status)));
        }

        let mut showing = snapshot
            .showing
            .filter(|s| s.scheduled_at.is_some())
            .ok_or(E::ShowingNotScheduled(case_id))
            .map_err(tracerr::wrap!())?;
        if showing.completed_at.is_some() {
            return Err(tracerr::new!(E::ShowingAlreadyCompleted(case_id)));
        }

        showing.completed_at = Some(DateTime::now().coerce());
        self.database()
            .execute(Update(showing.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(showing)
    }
}

/// Error of [`CompleteShowing`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Case`] with the provided ID does not exist.
    #[display("`Case(id: {_0})` does not exist")]
    CaseNotExists(#[error(not(source))] case::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// The [`Showing`] cannot be completed in the current [`Case`] status.
    #[display("the `Showing` cannot be completed in `{_0}` status")]
    InvalidCaseState(#[error(not(source))] case::Status),

    /// [`User`] is not the owner of the [`Case`].
    #[display("`User(id: {_0})` is not the owner of the `Case`")]
    NotCaseOwner(#[error(not(source))] user::Id),

    /// The [`Showing`] has already been completed.
    #[display("the `Showing` of `Case(id: {_0})` is already completed")]
    ShowingAlreadyCompleted(#[error(not(source))] case::Id),

    /// No [`Showing`] has been scheduled for the [`Case`].
    #[display("no `Showing` is scheduled for `Case(id: {_0})`")]
    ShowingNotScheduled(#[error(not(source))] case::Id),
}

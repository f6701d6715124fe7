//! [`Command`] for scheduling a [`Showing`].

use common::operations::{By, Select, Update};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{case, showing, user, Showing},
    infra::{database, Database},
    read, Service,
};
#[cfg(doc)]
use crate::domain::{Case, User};

use super::Command;

/// [`Command`] for scheduling the [`Showing`] of a [`Case`].
///
/// Rescheduling is allowed while the showing has not taken place yet.
#[derive(Clone, Copy, Debug)]
pub struct ScheduleShowing {
    /// ID of the [`Case`] to schedule the [`Showing`] of.
    pub case_id: case::Id,

    /// ID of the [`User`] scheduling the [`Showing`].
    pub seller_id: user::Id,

    /// [`DateTime`] to schedule the [`Showing`] for.
    ///
    /// [`DateTime`]: common::DateTime
    pub at: showing::ScheduledDateTime,
}

impl<Db> Command<ScheduleShowing> for Service<Db>
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
        cmd: ScheduleShowing,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ScheduleShowing {
            case_id,
            seller_id,
            at,
        } = cmd;

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

        // Draft `Case`s have no audience yet, and once the showing took
        // place the date is history.
        let status = snapshot.status();
        if !status.accepts_registrations() {
            return Err(tracerr::new!(E::InvalidCaseState(status)));
        }

        let mut showing = snapshot
            .showing
            .unwrap_or_else(|| Showing::new(case_id));
        showing.scheduled_at = Some(at);
        self.database()
            .execute(Update(showing.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(showing)
    }
}

/// Error of [`ScheduleShowing`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Case`] with the provided ID does not exist.
    #[display("`Case(id: {_0})` does not exist")]
    CaseNotExists(#[error(not(source))] case::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// A [`Showing`] cannot be scheduled in the current [`Case`] status.
    #[display("a `Showing` cannot be scheduled in `{_0}` status")]
    InvalidCaseState(#[error(not(source))] case::Status),

    /// [`User`] is not the owner of the [`Case`].
    #[display("`User(id: {_0})` is not the owner of the `Case`")]
    NotCaseOwner(#[error(not(source))] user::Id),
}

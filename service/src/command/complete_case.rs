//! [`Command`] for completing a [`Case`].

use common::{
    operations::{By, Select, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        case,
        user::{self, session},
        Case,
    },
    infra::{database, Database},
    read, Service,
};
#[cfg(doc)]
use crate::domain::{Selection, User};

use super::Command;

/// [`Command`] for completing the broker-selection process of a [`Case`].
///
/// Requires a recorded [`Selection`]: completion is the final step after the
/// winning broker has been chosen.
#[derive(Clone, Copy, Debug)]
pub struct CompleteCase {
    /// ID of the [`Case`] to complete.
    pub case_id: case::Id,

    /// [`Actor`] completing the [`Case`].
    ///
    /// [`Actor`]: session::Actor
    pub actor: session::Actor,
}

impl<Db> Command<CompleteCase> for Service<Db>
where
    Db: Database<
            Select<By<Option<read::case::Snapshot>, case::Id>>,
            Ok = Option<read::case::Snapshot>,
            Err = Traced<database::Error>,
        > + Database<Update<Case>, Err = Traced<database::Error>>,
{
    type Ok = Case;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CompleteCase) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CompleteCase { case_id, actor } = cmd;

        let snapshot = self
            .database()
            .execute(Select(By::<Option<read::case::Snapshot>, _>::new(
                case_id,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::CaseNotExists(case_id))
            .map_err(tracerr::wrap!())?;
        if snapshot.case.seller_id != actor.user_id {
            return Err(tracerr::new!(E::NotCaseOwner(actor.user_id)));
        }

        let status = snapshot.status();
        if status == case::Status::Completed {
            return Err(tracerr::new!(E::CaseAlreadyCompleted(case_id)));
        }
        if status != case::Status::BrokerSelected {
            return Err(tracerr::new!(E::InvalidCaseState(status)));
        }

        let mut case = snapshot.case;
        case.completed_at = Some(DateTime::now().coerce());
        self.database()
            .execute(Update(case.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(case)
    }
}

/// Error of [`CompleteCase`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Case`] has already been completed.
    #[display("`Case(id: {_0})` is already completed")]
    CaseAlreadyCompleted(#[error(not(source))] case::Id),

    /// [`Case`] with the provided ID does not exist.
    #[display("`Case(id: {_0})` does not exist")]
    CaseNotExists(#[error(not(source))] case::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Case`] cannot be completed in its current status.
    #[display("`Case` cannot be completed in `{_0}` status")]
    InvalidCaseState(#[error(not(source))] case::Status),

    /// [`User`] is not the owner of the [`Case`].
    #[display("`User(id: {_0})` is not the owner of the `Case`")]
    NotCaseOwner(#[error(not(source))] user::Id),
}

//! [`Command`] for submitting a [`Case`] to agents.

use common::{
    operations::{By, Select, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{case, user, Case, User},
    infra::{database, notify, Database},
    read, Service,
};

use super::Command;

/// [`Command`] for submitting a draft [`Case`] to agents.
///
/// Activation fans out an [`notify::Kind::AgentNewCase`] notification to
/// every agent covering the [`Case`]'s municipality.
#[derive(Clone, Copy, Debug)]
pub struct SubmitCase {
    /// ID of the [`Case`] to submit.
    pub case_id: case::Id,

    /// ID of the [`User`] submitting the [`Case`].
    pub seller_id: user::Id,
}

impl<Db> Command<SubmitCase> for Service<Db>
where
    Db: Database<
            Select<By<Option<read::case::Snapshot>, case::Id>>,
            Ok = Option<read::case::Snapshot>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<User>, user::Role>>,
            Ok = Vec<User>,
            Err = Traced<database::Error>,
        > + Database<Update<Case>, Err = Traced<database::Error>>,
{
    type Ok = Case;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: SubmitCase) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let SubmitCase { case_id, seller_id } = cmd;

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
        if status != case::Status::Draft {
            return Err(tracerr::new!(E::InvalidCaseState(status)));
        }

        let mut case = snapshot.case;
        case.submitted_at = Some(DateTime::now().coerce());
        self.database()
            .execute(Update(case.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        // The transition is committed: the fan-out below is fire-and-forget.
        let agents = self
            .database()
            .execute(Select(By::<Vec<User>, _>::new(user::Role::Agent)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        for agent in agents.iter().filter(|a| a.covers(&case.municipality)) {
            self.notify(notify::Notification {
                kind: notify::Kind::AgentNewCase,
                recipient: agent.id,
                payload: notify::Payload::NewCase {
                    case_id: case.id,
                    municipality: case.municipality.clone(),
                    expected_price: case.expected_price,
                },
            });
        }

        Ok(case)
    }
}

/// Error of [`SubmitCase`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Case`] with the provided ID does not exist.
    #[display("`Case(id: {_0})` does not exist")]
    CaseNotExists(#[error(not(source))] case::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Case`] cannot be submitted in its current status.
    #[display("`Case` cannot be submitted in `{_0}` status")]
    InvalidCaseState(#[error(not(source))] case::Status),

    /// [`User`] is not the owner of the [`Case`].
    #[display("`User(id: {_0})` is not the owner of the `Case`")]
    NotCaseOwner(#[error(not(source))] user::Id),
}

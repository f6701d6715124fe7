//! [`Command`] for withdrawing a [`Case`].

use common::operations::{By, Select, Update};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{case, user, Case},
    infra::{database, notify, Database},
    read, Service,
};
#[cfg(doc)]
use crate::domain::User;

use super::Command;

/// [`Command`] for withdrawing a [`Case`] from the marketplace.
///
/// Legal from any pre-terminal status. The terminal override is stored on
/// the [`Case`] record itself, so status resolution observes it before any
/// child collection.
#[derive(Clone, Copy, Debug)]
pub struct WithdrawCase {
    /// ID of the [`Case`] to withdraw.
    pub case_id: case::Id,

    /// ID of the [`User`] withdrawing the [`Case`].
    pub seller_id: user::Id,
}

impl<Db> Command<WithdrawCase> for Service<Db>
where
    Db: Database<
            Select<By<Option<read::case::Snapshot>, case::Id>>,
            Ok = Option<read::case::Snapshot>,
            Err = Traced<database::Error>,
        > + Database<Update<Case>, Err = Traced<database::Error>>,
{
    type Ok = Case;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: WithdrawCase) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let WithdrawCase { case_id, seller_id } = cmd;

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
            return Err(tracerr::new!(E::CaseAlreadyClosed(status)));
        }

        let mut case = snapshot.case.clone();
        case.manual_status = Some(case::ManualStatus::Withdrawn);
        self.database()
            .execute(Update(case.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        self.notify(notify::Notification {
            kind: notify::Kind::SellerCaseWithdrawn,
            recipient: case.seller_id,
            payload: notify::Payload::CaseWithdrawn { case_id: case.id },
        });
        for agent_id in snapshot.engaged_agents() {
            self.notify(notify::Notification {
                kind: notify::Kind::AgentCaseClosed,
                recipient: agent_id,
                payload: notify::Payload::CaseClosed {
                    case_id: case.id,
                    won: false,
                },
            });
        }

        Ok(case)
    }
}

/// Error of [`WithdrawCase`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Case`] has already reached a terminal status.
    #[display("`Case` is already closed with `{_0}` status")]
    CaseAlreadyClosed(#[error(not(source))] case::Status),

    /// [`Case`] with the provided ID does not exist.
    #[display("`Case(id: {_0})` does not exist")]
    CaseNotExists(#[error(not(source))] case::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`User`] is not the owner of the [`Case`].
    #[display("`User(id: {_0})` is not the owner of the `Case`")]
    NotCaseOwner(#[error(not(source))] user::Id),
}

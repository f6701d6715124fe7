//! [`Command`] for forcing a terminal [`Case`] status.

use common::operations::{By, Select, Update};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{case, user, Case, User},
    infra::{database, notify, Database},
    read, Service,
};

use super::Command;

/// [`Command`] for forcing a terminal status onto a [`Case`].
///
/// Bypasses ownership, but writes through the ordinary [`Case`] update path:
/// the override lands in the same stored field status resolution consults
/// first, so no divergent state can arise. Only terminal overrides are
/// expressible, by construction of [`case::ManualStatus`].
#[derive(Clone, Copy, Debug)]
pub struct ForceCaseStatus {
    /// ID of the [`Case`] to force the status of.
    pub case_id: case::Id,

    /// Terminal status to force.
    pub status: case::ManualStatus,

    /// ID of the administrator forcing the status.
    pub admin_id: user::Id,
}

impl<Db> Command<ForceCaseStatus> for Service<Db>
where
    Db: Database<
            Select<By<Option<read::case::Snapshot>, case::Id>>,
            Ok = Option<read::case::Snapshot>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Update<Case>, Err = Traced<database::Error>>,
{
    type Ok = Case;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: ForceCaseStatus,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ForceCaseStatus {
            case_id,
            status,
            admin_id,
        } = cmd;

        let admin = self
            .database()
            .execute(Select(By::<Option<User>, _>::new(admin_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(admin_id))
            .map_err(tracerr::wrap!())?;
        if admin.role != user::Role::Admin {
            return Err(tracerr::new!(E::UserNotAdmin(admin_id)));
        }

        let snapshot = self
            .database()
            .execute(Select(By::<Option<read::case::Snapshot>, _>::new(
                case_id,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::CaseNotExists(case_id))
            .map_err(tracerr::wrap!())?;
        let was_terminal = snapshot.status().is_terminal();

        // A later terminal override replaces an earlier one.
        let mut case = snapshot.case.clone();
        case.manual_status = Some(status);
        self.database()
            .execute(Update(case.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        if !was_terminal {
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
        }

        Ok(case)
    }
}

/// Error of [`ForceCaseStatus`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Case`] with the provided ID does not exist.
    #[display("`Case(id: {_0})` does not exist")]
    CaseNotExists(#[error(not(source))] case::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`User`] is not an administrator.
    #[display("`User(id: {_0})` is not an administrator")]
    UserNotAdmin(#[error(not(source))] user::Id),

    /// [`User`] with the provided ID does not exist.
    #[display("`User(id: {_0})` does not exist")]
    UserNotExists(#[error(not(source))] user::Id),
}

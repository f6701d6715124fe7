//! [`Command`] for registering an agent for a [`Showing`].

use common::{
    operations::{By, Select, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{case, showing, user, Showing, User},
    infra::{database, Database},
    read, Service,
};
#[cfg(doc)]
use crate::domain::Case;

use super::Command;

/// [`Command`] for registering an agent's decision about a [`Showing`].
///
/// Upserts the roster row keyed by the agent: a changed decision overwrites
/// the previous one, never duplicates it. The [`Showing`] record is created
/// lazily if it does not exist yet.
#[derive(Clone, Copy, Debug)]
pub struct RegisterAgent {
    /// ID of the [`Case`] whose [`Showing`] to register for.
    pub case_id: case::Id,

    /// ID of the [`User`] registering.
    pub agent_id: user::Id,

    /// [`Decision`] the agent made.
    ///
    /// [`Decision`]: showing::Decision
    pub decision: showing::Decision,
}

impl<Db> Command<RegisterAgent> for Service<Db>
where
    Db: Database<
            Select<By<Option<read::case::Snapshot>, case::Id>>,
            Ok = Option<read::case::Snapshot>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Update<Showing>, Err = Traced<database::Error>>,
{
    type Ok = Showing;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: RegisterAgent) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RegisterAgent {
            case_id,
            agent_id,
            decision,
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

        let agent = self
            .database()
            .execute(Select(By::<Option<User>, _>::new(agent_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(agent_id))
            .map_err(tracerr::wrap!())?;
        if agent.role != user::Role::Agent {
            return Err(tracerr::new!(E::UserNotAgent(agent_id)));
        }

        let status = snapshot.status();
        if !status.accepts_registrations() {
            return Err(tracerr::new!(E::InvalidCaseState(status)));
        }

        let mut showing = snapshot
            .showing
            .unwrap_or_else(|| Showing::new(case_id));
        showing.register(showing::Registration {
            agent_id: agent.id,
            agent_name: agent.name.clone(),
            agency: agent.agency.clone(),
            decision,
            registered_at: DateTime::now().coerce(),
        });
        self.database()
            .execute(Update(showing.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(showing)
    }
}

/// Error of [`RegisterAgent`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Case`] with the provided ID does not exist.
    #[display("`Case(id: {_0})` does not exist")]
    CaseNotExists(#[error(not(source))] case::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Agents cannot register in the current [`Case`] status.
    #[display("agents cannot register in `{_0}` status")]
    InvalidCaseState(#[error(not(source))] case::Status),

    /// [`User`] is not an agent.
    #[display("`User(id: {_0})` is not an agent")]
    UserNotAgent(#[error(not(source))] user::Id),

    /// [`User`] with the provided ID does not exist.
    #[display("`User(id: {_0})` does not exist")]
    UserNotExists(#[error(not(source))] user::Id),
}

//! [`Command`] for creating a new [`User`].

use std::collections::BTreeSet;

use common::{
    operations::{By, Insert, Select},
    DateTime,
};
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret, SecretBox};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::{Agency, Email, Login, Name, Password, Role};
use crate::{
    domain::{case, user, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`User`].
#[derive(Clone, Debug)]
pub struct CreateUser {
    /// [`Name`] of a new [`User`].
    pub name: user::Name,

    /// [`Login`] of a new [`User`].
    pub login: user::Login,

    /// [`Password`] of a new [`User`].
    pub password: SecretBox<user::Password>,

    /// [`Email`] of a new [`User`].
    pub email: user::Email,

    /// [`Role`] of a new [`User`].
    pub role: user::Role,

    /// [`Agency`] of a new [`User`], required for agents.
    pub agency: Option<user::Agency>,

    /// Municipalities a new agent [`User`] covers.
    ///
    /// An empty set means all municipalities.
    pub municipalities: BTreeSet<case::Municipality>,
}

impl<Db> Command<CreateUser> for Service<Db>
where
    Db: for<'l> Database<
            Select<By<Option<User>, &'l user::Login>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Insert<User>, Err = Traced<database::Error>>,
{
    type Ok = User;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateUser) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateUser {
            name,
            login,
            password,
            email,
            role,
            agency,
            municipalities,
        } = cmd;

        if role == user::Role::Agent && agency.is_none() {
            return Err(tracerr::new!(E::NoAgency));
        }

        let u = self
            .database()
            .execute(Select(By::new(&login)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if u.is_some() {
            return Err(tracerr::new!(E::LoginOccupied(login)));
        }

        let user = User {
            id: user::Id::new(),
            name,
            login,
            password_hash: user::PasswordHash::new(password.expose_secret()),
            email,
            role,
            agency,
            municipalities,
            created_at: DateTime::now().coerce(),
            deleted_at: None,
        };
        self.database()
            .execute(Insert(user.clone()))
            .await
            .map_err(|e| {
                // Backstop for a concurrent registration with the same login.
                if e.as_ref().is_unique_violation(Some("user_login_key")) {
                    tracerr::new!(E::LoginOccupied(user.login.clone()))
                } else {
                    tracerr::map_from_and_wrap!(=> E)(e)
                }
            })
            .map(drop)?;

        Ok(user)
    }
}

/// Error of [`CreateUser`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`user::Login`] is already occupied.
    #[display("`{_0}` login is occupied")]
    LoginOccupied(#[error(not(source))] user::Login),

    /// No [`Agency`] provided for an agent.
    #[display("an agent must belong to an agency")]
    NoAgency,
}

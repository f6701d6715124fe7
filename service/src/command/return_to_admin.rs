//! [`Command`] for returning from an impersonated [`Session`].

use std::time::Duration;

use common::{
    operations::{By, Select},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        user::{self, session, Session},
        User,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for exchanging an impersonated [`Session`] back for an
/// administrator one.
///
/// Only a [`Session`] carrying the impersonation back-reference can be
/// exchanged: the administrator identity is never re-derived from the
/// impersonated [`User`] alone.
#[derive(Clone, Copy, Debug)]
pub struct ReturnToAdmin {
    /// Impersonated [`Session`] to exchange.
    pub session: Session,
}

impl ReturnToAdmin {
    /// [`Duration`] of the restored administrator [`Session`] expiration.
    const EXPIRATION_DURATION: Duration = Duration::from_secs(30 * 60);
}

/// Output of [`ReturnToAdmin`] [`Command`].
#[derive(Clone, Debug)]
pub struct Output {
    /// [`Token`] of the restored administrator [`Session`].
    ///
    /// [`Token`]: session::Token
    pub token: session::Token,

    /// Restored administrator [`Session`].
    pub session: Session,

    /// Administrator [`User`] the [`Session`] was restored for.
    pub user: User,
}

impl<Db> Command<ReturnToAdmin> for Service<Db>
where
    Db: Database<
        Select<By<Option<User>, user::Id>>,
        Ok = Option<User>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: ReturnToAdmin) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ReturnToAdmin { session } = cmd;

        let admin_id = session
            .impersonator_id
            .ok_or(E::NotImpersonating)
            .map_err(tracerr::wrap!())?;

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

        let session = Session {
            user_id: admin.id,
            impersonator_id: None,
            expires_at: (DateTime::now()
                + ReturnToAdmin::EXPIRATION_DURATION)
                .coerce(),
        };
        let token = jsonwebtoken::encode::<Session>(
            &jsonwebtoken::Header::default(),
            &session,
            &self.config().jwt_encoding_key,
        )
        .map_err(tracerr::from_and_wrap!(=> E))?;

        // SAFETY: `jsonwebtoken::encode` always returns a valid
        //         `session::Token`.
        #[expect(unsafe_code, reason = "invariants are preserved")]
        let token = unsafe { session::Token::new_unchecked(token) };

        Ok(Output {
            token,
            session,
            user: admin,
        })
    }
}

/// Error of [`ReturnToAdmin`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`jsonwebtoken`] encoding error.
    #[display("Failed to encode a JSON Web Token: {_0}")]
    JsonWebTokenEncodeError(jsonwebtoken::errors::Error),

    /// The [`Session`] does not carry an impersonation back-reference.
    #[display("the `Session` is not an impersonated one")]
    NotImpersonating,

    /// [`User`] is not an administrator.
    #[display("`User(id: {_0})` is not an administrator")]
    #[from(ignore)]
    UserNotAdmin(#[error(not(source))] user::Id),

    /// [`User`] with the provided ID does not exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),
}

//! [`Command`] for impersonating a [`User`].

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

/// [`Command`] for impersonating a [`User`] as an administrator.
///
/// The produced [`Session`] acts as the target [`User`], but carries a
/// back-reference to the administrator: that back-reference is the only
/// capability allowing [`ReturnToAdmin`] later.
///
/// [`ReturnToAdmin`]: super::ReturnToAdmin
#[derive(Clone, Copy, Debug)]
pub struct ImpersonateUser {
    /// ID of the administrator impersonating.
    pub admin_id: user::Id,

    /// ID of the [`User`] to impersonate.
    pub target_id: user::Id,
}

impl ImpersonateUser {
    /// [`Duration`] of an impersonated [`Session`] expiration.
    const EXPIRATION_DURATION: Duration = Duration::from_secs(15 * 60);
}

/// Output of [`ImpersonateUser`] [`Command`].
#[derive(Clone, Debug)]
pub struct Output {
    /// [`Token`] of the impersonated [`Session`].
    ///
    /// [`Token`]: session::Token
    pub token: session::Token,

    /// Impersonated [`Session`].
    pub session: Session,

    /// [`User`] being impersonated.
    pub user: User,
}

impl<Db> Command<ImpersonateUser> for Service<Db>
where
    Db: Database<
        Select<By<Option<User>, user::Id>>,
        Ok = Option<User>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: ImpersonateUser,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ImpersonateUser {
            admin_id,
            target_id,
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

        let target = self
            .database()
            .execute(Select(By::<Option<User>, _>::new(target_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(target_id))
            .map_err(tracerr::wrap!())?;

        let session = Session {
            user_id: target.id,
            impersonator_id: Some(admin.id),
            expires_at: (DateTime::now()
                + ImpersonateUser::EXPIRATION_DURATION)
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
            user: target,
        })
    }
}

/// Error of [`ImpersonateUser`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`jsonwebtoken`] encoding error.
    #[display("Failed to encode a JSON Web Token: {_0}")]
    JsonWebTokenEncodeError(jsonwebtoken::errors::Error),

    /// [`User`] is not an administrator.
    #[display("`User(id: {_0})` is not an administrator")]
    #[from(ignore)]
    UserNotAdmin(#[error(not(source))] user::Id),

    /// [`User`] with the provided ID does not exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),
}

//! [`Session`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, FromStr};
use serde::{Deserialize, Serialize};

#[cfg(doc)]
use crate::domain::User;
use crate::domain::user;

/// User session.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct Session {
    /// ID of the [`User`] this [`Session`] acts as.
    pub user_id: user::Id,

    /// ID of the administrator this [`Session`] was impersonated by.
    ///
    /// This back-reference is the only capability allowing the [`Session`]
    /// to be exchanged back for an administrator one: the administrator
    /// identity is never re-derived from the impersonated [`User`].
    #[serde(
        default,
        rename = "imp",
        skip_serializing_if = "Option::is_none"
    )]
    pub impersonator_id: Option<user::Id>,

    /// [`DateTime`] when this [`Session`] expires.
    #[serde(rename = "exp", with = "common::datetime::serde::unix_timestamp")]
    pub expires_at: ExpirationDateTime,
}

/// Acting identity derived from a [`Session`].
///
/// Every privileged operation takes an [`Actor`] explicitly instead of
/// reading ambient session state, keeping the core testable in isolation.
#[derive(Clone, Copy, Debug)]
pub struct Actor {
    /// ID of the [`User`] acting.
    pub user_id: user::Id,

    /// ID of the administrator impersonating the acting [`User`], if any.
    pub impersonator_id: Option<user::Id>,
}

impl From<Session> for Actor {
    fn from(session: Session) -> Self {
        Self {
            user_id: session.user_id,
            impersonator_id: session.impersonator_id,
        }
    }
}

impl From<user::Id> for Actor {
    fn from(user_id: user::Id) -> Self {
        Self {
            user_id,
            impersonator_id: None,
        }
    }
}

/// Access token of a [`Session`].
#[derive(AsRef, Clone, Debug, Display, FromStr)]
pub struct Token(String);

impl Token {
    /// Creates a new [`Token`] without checking its contents.
    ///
    /// # Safety
    ///
    /// The provided `token` must be a valid [`Token`] representation.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub const unsafe fn new_unchecked(token: String) -> Self {
        Self(token)
    }
}

/// [`DateTime`] of a [`Session`] expiration.
pub type ExpirationDateTime = DateTimeOf<(Session, unit::Expiration)>;

//! [`User`] definitions.

pub mod session;

use std::{collections::BTreeSet, sync::LazyLock};

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
use regex::Regex;
use secrecy::{zeroize::Zeroize, CloneableSecret};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::case;

pub use self::session::Session;

/// Platform user.
#[derive(Clone, Debug, From)]
pub struct User {
    /// ID of this [`User`]
    pub id: Id,

    /// [`Name`] of this [`User`].
    pub name: Name,

    /// [`Login`] of this [`User`].
    pub login: Login,

    /// [`PasswordHash`] of this [`User`].
    pub password_hash: PasswordHash,

    /// [`Email`] of this [`User`].
    pub email: Email,

    /// [`Role`] of this [`User`].
    pub role: Role,

    /// [`Agency`] this [`User`] works for.
    ///
    /// Only meaningful for [`Role::Agent`] users.
    pub agency: Option<Agency>,

    /// Municipalities a [`Role::Agent`] [`User`] covers.
    ///
    /// An empty set means the agent covers all municipalities.
    pub municipalities: BTreeSet<case::Municipality>,

    /// [`DateTime`] when this [`User`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`User`] was deleted.
    pub deleted_at: Option<DeletionDateTime>,
}

impl User {
    /// Returns whether this [`User`] covers the given [`Municipality`].
    ///
    /// [`Municipality`]: case::Municipality
    #[must_use]
    pub fn covers(&self, municipality: &case::Municipality) -> bool {
        self.municipalities.is_empty()
            || self.municipalities.contains(municipality)
    }
}

/// ID of a [`User`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

define_kind! {
    #[doc = "Role of a [`User`] on the platform."]
    enum Role {
        #[doc = "A property seller."]
        Seller = 1,

        #[doc = "A real-estate agent bidding for listings."]
        Agent = 2,

        #[doc = "An administrator overseeing the platform."]
        Admin = 3,
    }
}

/// Name of a [`User`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct Name(String);

impl Name {
    /// Creates a new [`Name`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `name` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Creates a new [`Name`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`Name`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.len() <= 512
    }
}

impl FromStr for Name {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Name`")
    }
}

/// Agency a [`Role::Agent`] [`User`] works for.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct Agency(String);

impl Agency {
    /// Creates a new [`Agency`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `name` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Creates a new [`Agency`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`Agency`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.len() <= 512
    }
}

impl FromStr for Agency {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Agency`")
    }
}

/// Login of a [`User`].
#[derive(Clone, Debug, Display, Eq, PartialEq)]
pub struct Login(String);

impl Login {
    /// Creates a new [`Login`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `login` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(login: impl Into<String>) -> Self {
        Self(login.into())
    }

    /// Creates a new [`Login`] if the given `login` is valid.
    #[must_use]
    pub fn new(login: impl Into<String>) -> Option<Self> {
        let login = login.into();
        Self::check(&login).then_some(Self(login))
    }

    /// Checks whether the given `login` is a valid [`Login`].
    fn check(login: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Login`] invariants:
        /// - Must not be empty;
        /// - Must not start/end with whitespace;
        /// - Must not contain control characters;
        /// - Must not contain special characters;
        /// - Must be between 2 and 100 characters long.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^\S[\p{L}\p{N}]{0,98}\S$").expect("valid regex")
        });

        REGEX.is_match(login.as_ref())
    }
}

impl FromStr for Login {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Login`")
    }
}

/// Password of a [`User`].
#[derive(Clone, Debug, Display, Eq, From, PartialEq)]
#[from(&str, String)]
pub struct Password(String);

impl Password {
    /// Creates a new [`Password`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `password` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(password: impl Into<String>) -> Self {
        Self(password.into())
    }

    /// Creates a new [`Password`] if the given `password` is valid.
    #[must_use]
    pub fn new(password: impl Into<String>) -> Option<Self> {
        let password = password.into();
        Self::check(&password).then_some(Self(password))
    }

    /// Checks whether the given `password` is a valid [`Password`].
    fn check(password: impl AsRef<str>) -> bool {
        let password = password.as_ref();
        password.len() > 1 && password.len() <= 128
    }
}

impl FromStr for Password {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Password`")
    }
}

impl CloneableSecret for Password {}
impl Zeroize for Password {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

/// Password hash of a [`User`].
#[derive(Clone, Debug, Display, Eq, PartialEq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Creates a new [`PasswordHash`] from the given [`Password`].
    #[must_use]
    pub fn new(password: &Password) -> Self {
        // TODO: Use `argon2` or any other secure hashing algorithm.
        Self(password.to_string())
    }
}

/// Email address of a [`User`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct Email(String);

impl Email {
    /// Creates a new [`Email`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `address` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// Creates a new [`Email`] if the given `address` is valid.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Option<Self> {
        let address = address.into();
        Self::check(&address).then_some(Self(address))
    }

    /// Checks whether the given `address` is a valid [`Email`].
    fn check(address: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Email`] format.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid regex")
        });

        REGEX.is_match(address.as_ref())
    }
}

impl FromStr for Email {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Email`")
    }
}

/// [`DateTime`] when a [`User`] was created.
pub type CreationDateTime = DateTimeOf<(User, unit::Creation)>;

/// [`DateTime`] when a [`User`] was deleted.
pub type DeletionDateTime = DateTimeOf<(User, unit::Deletion)>;

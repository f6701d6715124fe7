//! [`Offer`] definitions.

pub mod score;

use std::collections::BTreeSet;

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf, Money, Percent};
use derive_more::{AsRef, Display, From, FromStr, Into};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{case, user};
#[cfg(doc)]
use crate::domain::{Case, User};

pub use self::score::Score;

/// Bid of an agent on a [`Case`].
///
/// An agent holds at most one [`Offer`] per [`Case`]: re-submission replaces
/// the stored values in place, keeping the original [`Id`] and
/// [`first_submitted_at`] for tie-breaking while refreshing
/// [`submitted_at`].
///
/// [`first_submitted_at`]: Offer::first_submitted_at
/// [`submitted_at`]: Offer::submitted_at
#[derive(Clone, Debug)]
pub struct Offer {
    /// ID of this [`Offer`].
    pub id: Id,

    /// ID of the [`Case`] this [`Offer`] is submitted to.
    pub case_id: case::Id,

    /// ID of the [`User`] who submitted this [`Offer`].
    pub agent_id: user::Id,

    /// Price the agent expects to sell the property for.
    pub price: Money,

    /// Commission of the agent, as an absolute amount.
    ///
    /// Stored as a canonical numeric value, never as display text, so
    /// downstream computation never re-parses a formatted string.
    pub commission: Money,

    /// Number of months the listing agreement binds the seller for.
    pub binding_period: BindingMonths,

    /// [`Marketing`] package of this [`Offer`].
    pub marketing: Marketing,

    /// [`DateTime`] when this [`Offer`] was first submitted.
    ///
    /// Survives re-submission and breaks score ties: the earlier bidder
    /// ranks first.
    pub first_submitted_at: SubmissionDateTime,

    /// [`DateTime`] when this [`Offer`] was (last) submitted.
    pub submitted_at: SubmissionDateTime,

    /// [`DateTime`] when the seller viewed this [`Offer`], if they did.
    pub seller_viewed_at: Option<ViewedDateTime>,
}

impl Offer {
    /// Returns the signed [`Deviation`] of this [`Offer`]'s price from the
    /// provided expected price.
    #[must_use]
    pub fn deviation(&self, expected_price: Money) -> Deviation {
        if expected_price.amount.is_zero() {
            return Deviation(Decimal::ZERO);
        }

        Deviation(
            (self.price.amount - expected_price.amount)
                / expected_price.amount
                * Decimal::ONE_HUNDRED,
        )
    }

    /// Returns the commission of this [`Offer`] as a [`Percent`] share of its
    /// price.
    ///
    /// [`None`] is returned if the share cannot be expressed as a
    /// [`Percent`].
    #[must_use]
    pub fn commission_share(&self) -> Option<Percent> {
        if self.price.amount.is_zero() {
            return None;
        }

        Percent::new(
            self.commission.amount / self.price.amount * Decimal::ONE_HUNDRED,
        )
    }
}

/// ID of an [`Offer`].
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
    PartialEq,
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

/// Number of months a listing agreement binds a seller for.
pub type BindingMonths = u8;

/// Marketing package of an [`Offer`].
#[derive(Clone, Debug, Default)]
pub struct Marketing {
    /// Marketing [`Channel`]s the agent commits to.
    pub channels: BTreeSet<Channel>,

    /// Free-text [`Strategy`] accompanying the selected [`Channel`]s.
    pub strategy: Option<Strategy>,
}

define_kind! {
    #[doc = "Marketing channel of an [`Offer`]'s [`Marketing`] package."]
    enum Channel {
        #[doc = "Listing on the national property portals."]
        Portal = 1,

        #[doc = "Printed newspaper advertising."]
        Newspaper = 2,

        #[doc = "Social media campaigns."]
        SocialMedia = 3,

        #[doc = "The agency's buyer newsletter."]
        Newsletter = 4,

        #[doc = "Open-house events."]
        OpenHouse = 5,

        #[doc = "Physical signage at the property."]
        Signage = 6,
    }
}

/// Free-text marketing strategy of an [`Offer`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(forward)]
pub struct Strategy(String);

impl Strategy {
    /// Creates a new [`Strategy`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `strategy` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(strategy: impl Into<String>) -> Self {
        Self(strategy.into())
    }

    /// Creates a new [`Strategy`] if the given `strategy` is valid.
    #[must_use]
    pub fn new(strategy: impl Into<String>) -> Option<Self> {
        let strategy = strategy.into();
        Self::check(&strategy).then_some(Self(strategy))
    }

    /// Checks whether the given `strategy` is a valid [`Strategy`].
    fn check(strategy: impl AsRef<str>) -> bool {
        let strategy = strategy.as_ref();
        !strategy.is_empty() && strategy.len() <= 2048
    }
}

impl FromStr for Strategy {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Strategy`")
    }
}

/// Signed deviation of an [`Offer`]'s price from the expected price of its
/// [`Case`], in percent.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, Into, Ord, PartialEq, PartialOrd,
)]
#[display("{_0}%")]
pub struct Deviation(Decimal);

/// [`DateTime`] when an [`Offer`] was submitted.
pub type SubmissionDateTime = DateTimeOf<(Offer, unit::Submission)>;

/// [`DateTime`] when an [`Offer`] was viewed by the seller.
pub type ViewedDateTime = DateTimeOf<(Offer, unit::Viewing)>;

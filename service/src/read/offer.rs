//! [`Offer`] read model definition.

use common::{Money, Percent};
use itertools::Itertools as _;

use crate::domain::{offer, Offer};
#[cfg(doc)]
use crate::domain::Case;

/// [`Offer`] enriched with its derived ranking attributes.
#[derive(Clone, Debug)]
pub struct Ranked {
    /// The [`Offer`] itself.
    pub offer: Offer,

    /// Computed [`Score`] of the [`Offer`].
    ///
    /// [`Score`]: offer::Score
    pub score: offer::Score,

    /// Signed [`Deviation`] of the [`Offer`]'s price from the [`Case`]'s
    /// expected price.
    ///
    /// [`Deviation`]: offer::Deviation
    pub deviation: offer::Deviation,

    /// Commission of the [`Offer`] as a [`Percent`] share of its price.
    pub commission_share: Option<Percent>,
}

/// Ranks the provided [`Offer`]s against the expected price of their
/// [`Case`].
///
/// Orders by descending [`Score`]; offers scoring equal rank by earlier
/// first submission.
///
/// [`Score`]: offer::Score
#[must_use]
pub fn rank(
    offers: impl IntoIterator<Item = Offer>,
    expected_price: Money,
    config: &offer::score::Config,
) -> Vec<Ranked> {
    offers
        .into_iter()
        .map(|offer| Ranked {
            score: offer.score(expected_price, config),
            deviation: offer.deviation(expected_price),
            commission_share: offer.commission_share(),
            offer,
        })
        .sorted_by(|a, b| {
            b.score.cmp(&a.score).then_with(|| {
                a.offer.first_submitted_at.cmp(&b.offer.first_submitted_at)
            })
        })
        .collect()
}

//! [`Offer`] scoring.

use common::Money;
use derive_more::{Display, Into};
use rust_decimal::Decimal;
use smart_default::SmartDefault;

#[cfg(doc)]
use crate::domain::Case;

use super::{BindingMonths, Marketing, Offer};

/// Configuration of [`Offer`] scoring.
///
/// Weights and shape constants are configuration, never hardcoded per
/// [`Offer`]. The weights sum to `1`, so a [`Score`] composed of components
/// in `[0, 100]` stays in `[0, 100]`.
#[derive(Clone, Copy, Debug, SmartDefault)]
pub struct Config {
    /// Weight of the price competitiveness component.
    #[default(Decimal::new(40, 2))]
    pub price_weight: Decimal,

    /// Weight of the commission competitiveness component.
    #[default(Decimal::new(30, 2))]
    pub commission_weight: Decimal,

    /// Weight of the marketing breadth component.
    #[default(Decimal::new(15, 2))]
    pub marketing_weight: Decimal,

    /// Weight of the listing-time competitiveness component.
    #[default(Decimal::new(15, 2))]
    pub listing_weight: Decimal,

    /// Commission share of the [`Offer`]'s price (in percent) at which the
    /// commission component bottoms out at zero points.
    #[default(Decimal::new(5, 0))]
    pub commission_ceiling: Decimal,

    /// Number of marketing [`Channel`]s considered full breadth.
    ///
    /// [`Channel`]: super::Channel
    #[default(6)]
    pub full_marketing_breadth: u8,

    /// Binding period (in months) at and below which the listing-time
    /// component no longer improves.
    #[default(3)]
    pub binding_floor_months: u8,

    /// Points deducted per month of binding period above the floor.
    #[default(Decimal::TEN)]
    pub binding_penalty: Decimal,
}

/// Computed competitiveness score of an [`Offer`], in `[0, 100]`.
///
/// Identical inputs always produce the identical [`Score`]: the computation
/// involves no randomness and no clock.
#[derive(
    Clone, Copy, Debug, Display, Eq, Into, Ord, PartialEq, PartialOrd,
)]
pub struct Score(Decimal);

impl Score {
    /// Lowest possible [`Score`].
    pub const MIN: Self = Self(Decimal::ZERO);

    /// Highest possible [`Score`].
    pub const MAX: Self = Self(Decimal::ONE_HUNDRED);

    /// Creates a new [`Score`], clamping the provided value into `[0, 100]`.
    fn new(value: Decimal) -> Self {
        Self(value.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED))
    }
}

impl Offer {
    /// Computes the [`Score`] of this [`Offer`] against the expected price of
    /// its [`Case`].
    ///
    /// Recomputed on every read, never cached.
    #[must_use]
    pub fn score(&self, expected_price: Money, config: &Config) -> Score {
        Score::new(
            config.price_weight * price_points(self, expected_price)
                + config.commission_weight * commission_points(self, config)
                + config.marketing_weight
                    * marketing_points(&self.marketing, config)
                + config.listing_weight
                    * listing_points(self.binding_period, config),
        )
    }
}

/// Points granted at exactly the expected price.
fn par() -> Decimal {
    Decimal::from(90_u8)
}

/// Computes the price competitiveness component.
///
/// A percent above the expected price gains a third of what a percent below
/// it loses, saturating ten percent above.
fn price_points(offer: &Offer, expected_price: Money) -> Decimal {
    if expected_price.amount <= Decimal::ZERO {
        // No comparison available.
        return par();
    }

    let ratio = offer.price.amount / expected_price.amount;
    if ratio >= Decimal::ONE {
        let bonus =
            ((ratio - Decimal::ONE) * Decimal::ONE_HUNDRED).min(Decimal::TEN);
        par() + bonus
    } else {
        let shortfall = (Decimal::ONE - ratio) * Decimal::from(300_u16);
        (par() - shortfall).max(Decimal::ZERO)
    }
}

/// Computes the commission competitiveness component.
///
/// A zero commission earns full points, declining linearly until the
/// commission reaches [`Config::commission_ceiling`] percent of the price.
fn commission_points(offer: &Offer, config: &Config) -> Decimal {
    if offer.price.amount <= Decimal::ZERO
        || config.commission_ceiling <= Decimal::ZERO
    {
        return Decimal::ZERO;
    }

    let share = offer.commission.amount / offer.price.amount
        * Decimal::ONE_HUNDRED;
    (Decimal::ONE_HUNDRED
        * (Decimal::ONE - share / config.commission_ceiling))
        .clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
}

/// Computes the marketing breadth component.
fn marketing_points(marketing: &Marketing, config: &Config) -> Decimal {
    let full = usize::from(config.full_marketing_breadth.max(1));
    let breadth = marketing.channels.len().min(full);
    Decimal::from(breadth) / Decimal::from(full) * Decimal::ONE_HUNDRED
}

/// Computes the listing-time competitiveness component.
///
/// Shorter binding periods score higher, to a floor below which no further
/// points are gained.
fn listing_points(binding_period: BindingMonths, config: &Config) -> Decimal {
    let over = binding_period.saturating_sub(config.binding_floor_months);
    (Decimal::ONE_HUNDRED - Decimal::from(over) * config.binding_penalty)
        .clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
}

#[cfg(test)]
mod spec {
    use std::collections::BTreeSet;

    use common::{money::Currency, DateTime, Money};
    use rust_decimal::Decimal;

    use crate::domain::{case, offer, user};

    use super::{Config, Offer, Score};

    fn dkk(amount: i64) -> Money {
        Money {
            amount: Decimal::from(amount),
            currency: Currency::Dkk,
        }
    }

    fn offer(price: i64, commission: i64) -> Offer {
        Offer {
            id: offer::Id::new(),
            case_id: case::Id::new(),
            agent_id: user::Id::new(),
            price: dkk(price),
            commission: dkk(commission),
            binding_period: 6,
            marketing: offer::Marketing::default(),
            first_submitted_at: DateTime::now().coerce(),
            submitted_at: DateTime::now().coerce(),
            seller_viewed_at: None,
        }
    }

    #[test]
    fn stays_within_bounds() {
        let config = Config::default();
        let expected = dkk(3_000_000);

        for (price, commission, months) in [
            (1, 0, 0),
            (3_000_000, 28_000, 6),
            (9_000_000, 1_000_000, u8::MAX),
        ] {
            let mut of = offer(price, commission);
            of.binding_period = months;
            let score = of.score(expected, &config);
            assert!(score >= Score::MIN);
            assert!(score <= Score::MAX);
        }
    }

    #[test]
    fn is_deterministic() {
        let config = Config::default();
        let of = offer(3_050_000, 28_000);

        assert_eq!(
            of.score(dkk(3_000_000), &config),
            of.score(dkk(3_000_000), &config),
        );
    }

    #[test]
    fn higher_price_never_scores_lower() {
        let config = Config::default();
        let expected = dkk(3_000_000);

        let below = offer(2_850_000, 28_000).score(expected, &config);
        let at = offer(3_000_000, 28_000).score(expected, &config);
        let above = offer(3_150_000, 28_000).score(expected, &config);

        assert!(below <= at);
        assert!(at <= above);
    }

    #[test]
    fn higher_commission_never_scores_higher() {
        let config = Config::default();
        let expected = dkk(3_000_000);

        let cheap = offer(3_000_000, 20_000).score(expected, &config);
        let pricey = offer(3_000_000, 60_000).score(expected, &config);

        assert!(pricey <= cheap);
    }

    #[test]
    fn broader_marketing_scores_higher() {
        let config = Config::default();
        let expected = dkk(3_000_000);

        let narrow = offer(3_000_000, 28_000);
        let mut broad = narrow.clone();
        broad.marketing.channels = BTreeSet::from([
            offer::Channel::Portal,
            offer::Channel::SocialMedia,
            offer::Channel::OpenHouse,
        ]);

        assert!(
            narrow.score(expected, &config) < broad.score(expected, &config),
        );
    }

    #[test]
    fn binding_period_gains_nothing_below_floor() {
        let config = Config::default();
        let expected = dkk(3_000_000);

        let mut at_floor = offer(3_000_000, 28_000);
        at_floor.binding_period = config.binding_floor_months;
        let mut below_floor = at_floor.clone();
        below_floor.binding_period = 1;
        let mut above_floor = at_floor.clone();
        above_floor.binding_period = config.binding_floor_months + 4;

        assert_eq!(
            at_floor.score(expected, &config),
            below_floor.score(expected, &config),
        );
        assert!(
            above_floor.score(expected, &config)
                < at_floor.score(expected, &config),
        );
    }
}

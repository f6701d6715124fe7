//! Property tests for [`Offer`] scoring.
//!
//! [`Offer`]: service::domain::Offer

use std::collections::BTreeSet;

use common::{money::Currency, DateTime, Money};
use proptest::prelude::*;
use rust_decimal::Decimal;
use service::domain::{case, offer, user, Offer};

fn dkk(amount: i64) -> Money {
    Money {
        amount: Decimal::from(amount),
        currency: Currency::Dkk,
    }
}

fn offer(
    price: i64,
    commission: i64,
    binding_period: u8,
    num_channels: usize,
) -> Offer {
    let channels = [
        offer::Channel::Portal,
        offer::Channel::Newspaper,
        offer::Channel::SocialMedia,
        offer::Channel::Newsletter,
        offer::Channel::OpenHouse,
        offer::Channel::Signage,
    ]
    .into_iter()
    .take(num_channels)
    .collect::<BTreeSet<_>>();

    Offer {
        id: offer::Id::new(),
        case_id: case::Id::new(),
        agent_id: user::Id::new(),
        price: dkk(price),
        commission: dkk(commission),
        binding_period,
        marketing: offer::Marketing {
            channels,
            strategy: None,
        },
        first_submitted_at: DateTime::now().coerce(),
        submitted_at: DateTime::now().coerce(),
        seller_viewed_at: None,
    }
}

proptest! {
    /// A score never leaves `[0, 100]`, whatever the offer looks like.
    #[test]
    fn score_stays_within_bounds(
        price in 1i64..20_000_000,
        commission in 0i64..2_000_000,
        binding_period in 0u8..=36,
        num_channels in 0usize..=6,
    ) {
        let config = offer::score::Config::default();
        let score = offer(price, commission, binding_period, num_channels)
            .score(dkk(3_000_000), &config);

        prop_assert!(score >= offer::Score::MIN);
        prop_assert!(score <= offer::Score::MAX);
    }

    /// Identical inputs always produce the identical score.
    #[test]
    fn score_is_deterministic(
        price in 1i64..20_000_000,
        commission in 0i64..2_000_000,
        binding_period in 0u8..=36,
        num_channels in 0usize..=6,
    ) {
        let config = offer::score::Config::default();
        let of = offer(price, commission, binding_period, num_channels);

        prop_assert_eq!(
            of.score(dkk(3_000_000), &config),
            of.score(dkk(3_000_000), &config),
        );
    }

    /// Raising the price, all else equal, never lowers the score.
    #[test]
    fn score_is_monotone_in_price(
        price in 1i64..10_000_000,
        bump in 1i64..5_000_000,
        commission in 0i64..200_000,
    ) {
        let config = offer::score::Config::default();
        let expected = dkk(3_000_000);

        let lower = offer(price, commission, 6, 2).score(expected, &config);
        let higher =
            offer(price + bump, commission, 6, 2).score(expected, &config);

        prop_assert!(lower <= higher);
    }

    /// Raising the commission, all else equal, never raises the score.
    #[test]
    fn score_is_antitone_in_commission(
        commission in 0i64..500_000,
        bump in 1i64..500_000,
    ) {
        let config = offer::score::Config::default();
        let expected = dkk(3_000_000);

        let cheap =
            offer(3_000_000, commission, 6, 2).score(expected, &config);
        let pricey = offer(3_000_000, commission + bump, 6, 2)
            .score(expected, &config);

        prop_assert!(pricey <= cheap);
    }

    /// Shortening the binding period, all else equal, never lowers the
    /// score.
    #[test]
    fn score_is_antitone_in_binding_period(
        binding_period in 0u8..36,
        bump in 1u8..12,
    ) {
        let config = offer::score::Config::default();
        let expected = dkk(3_000_000);

        let shorter =
            offer(3_000_000, 30_000, binding_period, 2).score(expected, &config);
        let longer = offer(3_000_000, 30_000, binding_period + bump, 2)
            .score(expected, &config);

        prop_assert!(longer <= shorter);
    }
}

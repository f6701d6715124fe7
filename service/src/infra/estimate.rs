//! Property valuation estimation.

use async_trait::async_trait;
use common::Money;

use crate::domain::case;

/// External property valuation estimator.
///
/// A missing valuation is "no comparison available", never an error:
/// transient estimator failures must be represented as [`None`].
#[async_trait]
pub trait Estimate: Send + Sync {
    /// Estimates the market value of the property at the provided address.
    async fn estimate(
        &self,
        address: &case::Address,
        postal_code: &case::PostalCode,
    ) -> Option<Money>;
}

/// [`Estimate`] implementation always returning no valuation.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoValuation;

#[async_trait]
impl Estimate for NoValuation {
    async fn estimate(
        &self,
        _: &case::Address,
        _: &case::PostalCode,
    ) -> Option<Money> {
        None
    }
}

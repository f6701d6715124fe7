//! [`Command`] for submitting an [`Offer`].

use common::{
    operations::{By, Insert, Select, Update},
    DateTime, Money,
};
use derive_more::{Display, Error, From};
use rust_decimal::Decimal;
use smart_default::SmartDefault;
use tracerr::Traced;

use crate::{
    domain::{case, offer, user, Offer, User},
    infra::{database, notify, Database},
    read, Service,
};
#[cfg(doc)]
use crate::domain::Case;

use super::Command;

/// [`Command`] for submitting an [`Offer`] to a [`Case`].
///
/// Idempotent by agent: a second submission for the same ([`Case`], agent)
/// pair replaces the previous [`Offer`] in place, keeping its ID and first
/// submission time while refreshing the values and submission timestamp.
#[derive(Clone, Debug)]
pub struct SubmitOffer {
    /// ID of the [`Case`] to submit the [`Offer`] to.
    pub case_id: case::Id,

    /// ID of the [`User`] submitting the [`Offer`].
    pub agent_id: user::Id,

    /// Price the agent expects to sell the property for.
    pub price: Money,

    /// Commission of the agent, as an absolute amount.
    pub commission: Money,

    /// Number of months the listing agreement binds the seller for.
    pub binding_period: offer::BindingMonths,

    /// [`Marketing`] package of the [`Offer`].
    ///
    /// [`Marketing`]: offer::Marketing
    pub marketing: offer::Marketing,
}

/// Configuration of [`SubmitOffer`] execution.
#[derive(Clone, Copy, Debug, SmartDefault)]
pub struct Config {
    /// Commission amount below which a [`Warning`] is emitted, guarding
    /// against percentage-style entry of what must be an absolute amount.
    #[default(Decimal::from(1_000))]
    pub commission_floor: Decimal,
}

/// Output of [`SubmitOffer`] [`Command`].
#[derive(Clone, Debug)]
pub struct Output {
    /// Submitted [`Offer`].
    pub offer: Offer,

    /// Non-fatal [`Warning`]s to surface to the agent.
    pub warnings: Vec<Warning>,
}

/// Non-fatal warning of [`SubmitOffer`] execution.
#[derive(Clone, Copy, Debug, Display)]
pub enum Warning {
    /// Commission is suspiciously small for an absolute amount.
    #[display(
        "commission of {commission} looks like a percentage, but must be an \
         absolute amount"
    )]
    CommissionLooksLikePercentage {
        /// Submitted commission.
        commission: Money,
    },
}

impl<Db> Command<SubmitOffer> for Service<Db>
where
    Db: Database<
            Select<By<Option<read::case::Snapshot>, case::Id>>,
            Ok = Option<read::case::Snapshot>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Insert<Offer>, Err = Traced<database::Error>>
        + Database<Update<Offer>, Err = Traced<database::Error>>,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: SubmitOffer) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let SubmitOffer {
            case_id,
            agent_id,
            price,
            commission,
            binding_period,
            marketing,
        } = cmd;

        let snapshot = self
            .database()
            .execute(Select(By::<Option<read::case::Snapshot>, _>::new(
                case_id,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::CaseNotExists(case_id))
            .map_err(tracerr::wrap!())?;

        let agent = self
            .database()
            .execute(Select(By::<Option<User>, _>::new(agent_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(agent_id))
            .map_err(tracerr::wrap!())?;
        if agent.role != user::Role::Agent {
            return Err(tracerr::new!(E::UserNotAgent(agent_id)));
        }

        let status = snapshot.status();
        if !status.accepts_offers() {
            return Err(tracerr::new!(E::CaseNotOpenForOffers(status)));
        }

        let expected_currency = snapshot.case.expected_price.currency;
        if price.currency != expected_currency
            || commission.currency != expected_currency
        {
            return Err(tracerr::new!(E::CurrencyMismatch(expected_currency)));
        }

        let mut warnings = Vec::new();
        if commission.amount < self.config().plausibility.commission_floor {
            warnings
                .push(Warning::CommissionLooksLikePercentage { commission });
        }

        let now = DateTime::now().coerce();
        let previous = snapshot.agent_offer(agent_id);
        let offer = Offer {
            id: previous.map_or_else(offer::Id::new, |p| p.id),
            case_id,
            agent_id: agent.id,
            price,
            commission,
            binding_period,
            marketing,
            first_submitted_at: previous
                .map_or(now, |p| p.first_submitted_at),
            submitted_at: now,
            // Replaced values have not been seen by the seller yet.
            seller_viewed_at: None,
        };
        if previous.is_some() {
            self.database()
                .execute(Update(offer.clone()))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
        } else {
            self.database()
                .execute(Insert(offer.clone()))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
        }

        let num_offers = if previous.is_some() {
            snapshot.offers.len()
        } else {
            snapshot.offers.len() + 1
        };
        self.notify(notify::Notification {
            kind: notify::Kind::SellerOffersReceived,
            recipient: snapshot.case.seller_id,
            payload: notify::Payload::OffersReceived {
                case_id,
                num_offers,
            },
        });

        Ok(Output { offer, warnings })
    }
}

/// Error of [`SubmitOffer`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Case`] with the provided ID does not exist.
    #[display("`Case(id: {_0})` does not exist")]
    CaseNotExists(#[error(not(source))] case::Id),

    /// [`Case`] is not open for [`Offer`]s in its current status.
    #[display("`Case` is not open for offers in `{_0}` status")]
    CaseNotOpenForOffers(#[error(not(source))] case::Status),

    /// [`Offer`] amounts are not in the [`Case`]'s currency.
    #[display("offer amounts must be in `{_0}`")]
    CurrencyMismatch(#[error(not(source))] common::money::Currency),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`User`] is not an agent.
    #[display("`User(id: {_0})` is not an agent")]
    UserNotAgent(#[error(not(source))] user::Id),

    /// [`User`] with the provided ID does not exist.
    #[display("`User(id: {_0})` does not exist")]
    UserNotExists(#[error(not(source))] user::Id),
}

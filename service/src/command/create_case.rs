//! [`Command`] for creating a new [`Case`].

use common::{
    operations::{Allocate, By, Insert, Select},
    DateTime, Money,
};
use derive_more::{Display, Error, From};
use rust_decimal::Decimal;
use smart_default::SmartDefault;
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::case::{
    Address, EnergyLabel, Kind, Municipality, Notes, PostalCode,
};
use crate::{
    domain::{case, user, Case, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new draft [`Case`].
#[derive(Clone, Debug)]
pub struct CreateCase {
    /// ID of the [`User`] selling the property.
    pub seller_id: user::Id,

    /// [`Address`] of the property.
    pub address: case::Address,

    /// [`PostalCode`] of the property.
    pub postal_code: case::PostalCode,

    /// [`Municipality`] the property is located in.
    pub municipality: case::Municipality,

    /// [`Kind`] of the property.
    pub kind: case::Kind,

    /// Living area of the property in square meters.
    pub size_sqm: case::SizeSqm,

    /// Number of rooms in the property.
    pub num_rooms: case::NumRooms,

    /// Year the property was constructed.
    pub construction_year: case::ConstructionYear,

    /// [`EnergyLabel`] of the property.
    pub energy_label: case::EnergyLabel,

    /// Price the seller expects for the property.
    pub expected_price: Money,

    /// Free-text [`Notes`] with the seller's priorities.
    pub notes: Option<case::Notes>,
}

/// Configuration of [`CreateCase`] execution.
#[derive(Clone, Copy, Debug, SmartDefault)]
pub struct Config {
    /// Absolute percentage deviation of the expected price from the
    /// reference valuation beyond which a [`Warning`] is emitted.
    #[default(Decimal::from(15))]
    pub deviation_warning: Decimal,
}

/// Output of [`CreateCase`] [`Command`].
#[derive(Clone, Debug)]
pub struct Output {
    /// Created [`Case`].
    pub case: Case,

    /// Non-fatal [`Warning`]s to surface to the seller.
    pub warnings: Vec<Warning>,
}

/// Non-fatal warning of [`CreateCase`] execution.
#[derive(Clone, Copy, Debug, Display)]
pub enum Warning {
    /// Expected price deviates from the reference valuation beyond the
    /// configured threshold.
    #[display(
        "expected price deviates from the reference valuation of \
         {reference_value}"
    )]
    DeviatesFromValuation {
        /// Reference valuation of the property.
        reference_value: Money,
    },
}

impl<Db> Command<CreateCase> for Service<Db>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Case>, case::Hash>>,
            Ok = Vec<Case>,
            Err = Traced<database::Error>,
        > + Database<
            Allocate<case::Number>,
            Ok = case::Number,
            Err = Traced<database::Error>,
        > + Database<Insert<Case>, Err = Traced<database::Error>>,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateCase) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateCase {
            seller_id,
            address,
            postal_code,
            municipality,
            kind,
            size_sqm,
            num_rooms,
            construction_year,
            energy_label,
            expected_price,
            notes,
        } = cmd;

        let seller = self
            .database()
            .execute(Select(By::<Option<User>, _>::new(seller_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(seller_id))
            .map_err(tracerr::wrap!())?;
        if seller.role != user::Role::Seller {
            return Err(tracerr::new!(E::UserNotSeller(seller_id)));
        }

        let hash = case::Hash::new(&address, &postal_code);
        let duplicates = self
            .database()
            .execute(Select(By::<Vec<Case>, _>::new(hash)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if duplicates.iter().any(|c| !c.is_closed()) {
            return Err(tracerr::new!(E::PropertyAlreadyListed(hash)));
        }

        // A missing valuation is "no comparison available", never an error.
        let reference_value =
            self.estimator().estimate(&address, &postal_code).await;

        let mut warnings = Vec::new();
        if let Some(reference_value) = reference_value {
            if !reference_value.amount.is_zero() {
                let deviation = ((expected_price.amount
                    - reference_value.amount)
                    / reference_value.amount
                    * Decimal::ONE_HUNDRED)
                    .abs();
                if deviation > self.config().valuation.deviation_warning {
                    warnings
                        .push(Warning::DeviatesFromValuation { reference_value });
                }
            }
        }

        let number = self
            .database()
            .execute(Allocate::<case::Number>::new())
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let case = Case {
            id: case::Id::new(),
            number,
            hash,
            seller_id: seller.id,
            address,
            postal_code,
            municipality,
            kind,
            size_sqm,
            num_rooms,
            construction_year,
            energy_label,
            expected_price,
            reference_value,
            notes,
            manual_status: None,
            created_at: DateTime::now().coerce(),
            submitted_at: None,
            completed_at: None,
        };
        self.database()
            .execute(Insert(case.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(Output { case, warnings })
    }
}

/// Error of [`CreateCase`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// An open [`Case`] for the same property already exists.
    #[display("an open `Case` for the property `{_0}` already exists")]
    PropertyAlreadyListed(#[error(not(source))] case::Hash),

    /// [`User`] with the provided ID does not exist.
    #[display("`User(id: {_0})` does not exist")]
    UserNotExists(#[error(not(source))] user::Id),

    /// [`User`] is not a seller.
    #[display("`User(id: {_0})` is not a seller")]
    UserNotSeller(#[error(not(source))] user::Id),
}

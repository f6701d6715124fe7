//! [`Command`] for marking an [`Offer`] as viewed.

use common::{
    operations::{By, Select, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{case, offer, user, Offer},
    infra::{database, Database},
    read, Service,
};
#[cfg(doc)]
use crate::domain::{Case, User};

use super::Command;

/// [`Command`] for marking an [`Offer`] as viewed by the seller.
///
/// Idempotent: the first view timestamp is kept on repeated calls.
#[derive(Clone, Copy, Debug)]
pub struct MarkOfferViewed {
    /// ID of the [`Case`] the [`Offer`] belongs to.
    pub case_id: case::Id,

    /// ID of the [`Offer`] to mark as viewed.
    pub offer_id: offer::Id,

    /// ID of the [`User`] viewing the [`Offer`].
    pub seller_id: user::Id,
}

impl<Db> Command<MarkOfferViewed> for Service<Db>
where
    Db: Database<
            Select<By<Option<read::case::Snapshot>, case::Id>>,
            Ok = Option<read::case::Snapshot>,
            Err = Traced<database::Error>,
        > + Database<Update<Offer>, Err = Traced<database::Error>>,
{
    type Ok = Offer;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: MarkOfferViewed,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let MarkOfferViewed {
            case_id,
            offer_id,
            seller_id,
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
        if snapshot.case.seller_id != seller_id {
            return Err(tracerr::new!(E::NotCaseOwner(seller_id)));
        }

        let mut offer = snapshot
            .offer(offer_id)
            .ok_or(E::OfferNotExists(offer_id))
            .map_err(tracerr::wrap!())?
            .clone();
        if offer.seller_viewed_at.is_none() {
            offer.seller_viewed_at = Some(DateTime::now().coerce());
            self.database()
                .execute(Update(offer.clone()))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
        }

        Ok(offer)
    }
}

/// Error of [`MarkOfferViewed`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Case`] with the provided ID does not exist.
    #[display("`Case(id: {_0})` does not exist")]
    CaseNotExists(#[error(not(source))] case::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`User`] is not the owner of the [`Case`].
    #[display("`User(id: {_0})` is not the owner of the `Case`")]
    NotCaseOwner(#[error(not(source))] user::Id),

    /// [`Offer`] with the provided ID does not exist on the [`Case`].
    #[display("`Offer(id: {_0})` does not exist on the `Case`")]
    OfferNotExists(#[error(not(source))] offer::Id),
}

//! [`Offer`]-related [`Database`] operations.

use common::operations::{Insert, Update};
use tracerr::Traced;

use crate::{
    domain::Offer,
    infra::database::{self, mem::Mem, Database},
};

impl Database<Insert<Offer>> for Mem {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(offer): Insert<Offer>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut store = self.0.write().await;
        store.offers.entry(offer.case_id).or_default().push(offer);
        Ok(())
    }
}

impl Database<Update<Offer>> for Mem {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(offer): Update<Offer>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut store = self.0.write().await;
        let offers = store.offers.entry(offer.case_id).or_default();
        if let Some(existing) = offers.iter_mut().find(|o| o.id == offer.id) {
            *existing = offer;
        } else {
            offers.push(offer);
        }
        Ok(())
    }
}

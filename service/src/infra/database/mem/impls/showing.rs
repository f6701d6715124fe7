//! [`Showing`]-related [`Database`] operations.

use common::operations::Update;
use tracerr::Traced;

use crate::{
    domain::Showing,
    infra::database::{self, mem::Mem, Database},
};

impl Database<Update<Showing>> for Mem {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(showing): Update<Showing>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut store = self.0.write().await;
        _ = store.showings.insert(showing.case_id, showing);
        Ok(())
    }
}

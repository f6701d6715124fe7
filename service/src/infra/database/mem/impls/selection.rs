//! [`Selection`]-related [`Database`] operations.

use common::operations::Insert;
use tracerr::Traced;

use crate::{
    domain::Selection,
    infra::database::{self, mem::Mem, Database},
};

impl Database<Insert<Selection>> for Mem {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(selection): Insert<Selection>,
    ) -> Result<Self::Ok, Self::Err> {
        use std::collections::hash_map::Entry;

        let mut store = self.0.write().await;
        match store.selections.entry(selection.case_id) {
            // A `Selection` is write-once: the first successful insert wins
            // and is never overwritten.
            Entry::Occupied(_) => Err(tracerr::new!(database::Error::from(
                database::mem::Error::UniqueViolation("selection_case_id_key"),
            ))),
            Entry::Vacant(vacant) => {
                _ = vacant.insert(selection);
                Ok(())
            }
        }
    }
}

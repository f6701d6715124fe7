//! [`Case`]-related [`Database`] operations.

use common::{
    operations::{Allocate, By, Insert, Select, Update},
    pagination::Arguments,
};
use tracerr::Traced;

use crate::{
    domain::{case, Case},
    infra::database::{self, mem::Mem, Database},
    read,
};

impl Database<Insert<Case>> for Mem {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(case): Insert<Case>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut store = self.0.write().await;
        _ = store.cases.insert(case.id, case);
        Ok(())
    }
}

impl Database<Update<Case>> for Mem {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(case): Update<Case>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut store = self.0.write().await;
        _ = store.cases.insert(case.id, case);
        Ok(())
    }
}

impl Database<Allocate<case::Number>> for Mem {
    type Ok = case::Number;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Allocate<case::Number>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut store = self.0.write().await;
        store.next_case_number += 1;
        Ok(case::Number::from(store.next_case_number))
    }
}

impl Database<Select<By<Option<Case>, case::Id>>> for Mem {
    type Ok = Option<Case>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Case>, case::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let store = self.0.read().await;
        Ok(store.cases.get(&by.into_inner()).cloned())
    }
}

impl Database<Select<By<Vec<Case>, case::Hash>>> for Mem {
    type Ok = Vec<Case>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Case>, case::Hash>>,
    ) -> Result<Self::Ok, Self::Err> {
        let hash = by.into_inner();
        let store = self.0.read().await;
        Ok(store
            .cases
            .values()
            .filter(|c| c.hash == hash)
            .cloned()
            .collect())
    }
}

impl Database<Select<By<Option<read::case::Snapshot>, case::Id>>> for Mem {
    type Ok = Option<read::case::Snapshot>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<read::case::Snapshot>, case::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let store = self.0.read().await;
        Ok(store
            .cases
            .get(&by.into_inner())
            .cloned()
            .map(|case| super::snapshot(&store, case)))
    }
}

impl
    Database<
        Select<
            By<read::case::list::Connection, read::case::list::Selector>,
        >,
    > for Mem
{
    type Ok = read::case::list::Connection;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::case::list::Connection, read::case::list::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::case::list::Selector { arguments, filter } = by.into_inner();

        let store = self.0.read().await;
        let mut snapshots = store
            .cases
            .values()
            .filter(|c| {
                filter.seller_id.map_or(true, |id| c.seller_id == id)
            })
            .filter(|c| {
                filter
                    .municipality
                    .as_ref()
                    .map_or(true, |m| &c.municipality == m)
            })
            .map(|c| super::snapshot(&store, c.clone()))
            .filter(|s| filter.status.map_or(true, |st| s.status() == st))
            .collect::<Vec<_>>();
        snapshots.sort_by_key(|s| s.case.number);

        let position = |id: case::Id| {
            snapshots.iter().position(|s| s.case.id == id)
        };
        let (page, has_more) = match arguments {
            Arguments::Forward {
                first,
                after,
                including,
            } => {
                let from = match after {
                    None => 0,
                    Some(id) => position(id).map_or(snapshots.len(), |i| {
                        if including {
                            i
                        } else {
                            i + 1
                        }
                    }),
                };
                let rest = &snapshots[from.min(snapshots.len())..];
                let limit = first.min(rest.len());
                (rest[..limit].to_vec(), rest.len() > limit)
            }
            Arguments::Backward {
                last,
                before,
                including,
            } => {
                let to = match before {
                    None => snapshots.len(),
                    Some(id) => position(id).map_or(0, |i| {
                        if including {
                            i + 1
                        } else {
                            i
                        }
                    }),
                };
                let head = &snapshots[..to];
                let from = head.len().saturating_sub(last);
                (head[from..].to_vec(), from > 0)
            }
        };

        Ok(read::case::list::Connection::new(
            &arguments,
            page.into_iter().map(|s| (s.case.id, s)),
            has_more,
        ))
    }
}

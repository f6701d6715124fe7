//! [`Database`] operations of the [`Mem`] client.
//!
//! [`Database`]: crate::infra::Database
//! [`Mem`]: super::Mem

mod case;
mod offer;
mod selection;
mod showing;
mod user;

use super::Keyspace;

use crate::{domain::Case, read};

/// Assembles the [`read::case::Snapshot`] of the provided [`Case`] from the
/// keyspace.
fn snapshot(store: &Keyspace, case: Case) -> read::case::Snapshot {
    read::case::Snapshot {
        showing: store.showings.get(&case.id).cloned(),
        offers: store.offers.get(&case.id).cloned().unwrap_or_default(),
        selection: store.selections.get(&case.id).copied(),
        case,
    }
}

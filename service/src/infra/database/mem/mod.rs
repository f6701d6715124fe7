//! In-memory [`Database`] implementation.

mod impls;

use std::{collections::HashMap, sync::Arc};

use derive_more::{Display, Error as StdError};
use tokio::sync::RwLock;

use crate::domain::{case, user, Case, Offer, Selection, Showing, User};
#[cfg(doc)]
use crate::infra::Database;

/// In-memory [`Database`] client.
///
/// Holds the whole keyspace behind a single [`RwLock`], one map per key
/// family. The maps are maintained incrementally on every write, so no read
/// ever scans the whole store.
#[derive(Clone, Debug, Default)]
pub struct Mem(Arc<RwLock<Keyspace>>);

impl Mem {
    /// Creates a new empty [`Mem`] client.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Logical keyspace held by a [`Mem`] client.
#[derive(Debug, Default)]
struct Keyspace {
    /// `case:{id}` records.
    cases: HashMap<case::Id, Case>,

    /// `showing:{caseId}` records.
    showings: HashMap<case::Id, Showing>,

    /// `offers:{caseId}` records.
    offers: HashMap<case::Id, Vec<Offer>>,

    /// `selection:{caseId}` records.
    selections: HashMap<case::Id, Selection>,

    /// `user:{id}` records.
    users: HashMap<user::Id, User>,

    /// Monotonic [`case::Number`] allocator.
    next_case_number: u32,
}

/// In-memory database [`Error`].
#[derive(Clone, Copy, Debug, Display, StdError)]
pub enum Error {
    /// Unique constraint violation.
    #[display("unique constraint `{_0}` violated")]
    UniqueViolation(#[error(not(source))] &'static str),
}

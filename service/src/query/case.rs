//! [`Query`] collection related to a single [`Case`].

use common::operations::By;

use crate::{domain::case, read};
#[cfg(doc)]
use crate::{domain::Case, Query};

use super::DatabaseQuery;

/// Queries the [`read::case::Snapshot`] of a [`Case`] by its [`case::Id`].
///
/// The snapshot is the only sanctioned way to observe a [`Case`]: its
/// lifecycle status is re-derived from the child collections on every read.
pub type ById =
    DatabaseQuery<By<Option<read::case::Snapshot>, case::Id>>;

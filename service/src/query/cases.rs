//! [`Query`] collection related to multiple [`Case`]s.

use common::operations::By;

use crate::read::case::list;
#[cfg(doc)]
use crate::{domain::Case, Query};

use super::DatabaseQuery;

/// Queries a [`list::Connection`] of [`Case`]s matching a
/// [`list::Selector`].
///
/// Sellers list their own [`Case`]s; agents browse open ones filtered by
/// status and municipality.
pub type List = DatabaseQuery<By<list::Connection, list::Selector>>;

//! [`Selection`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};

use crate::domain::{case, offer, user};
#[cfg(doc)]
use crate::domain::{Case, Offer, User};

/// Final, irreversible choice of a winning [`Offer`] on a [`Case`].
///
/// At most one [`Selection`] ever exists per [`Case`]: the store rejects a
/// second insert instead of overwriting the first one.
#[derive(Clone, Copy, Debug)]
pub struct Selection {
    /// ID of the [`Case`] this [`Selection`] belongs to.
    pub case_id: case::Id,

    /// ID of the chosen [`Offer`].
    pub offer_id: offer::Id,

    /// ID of the [`User`] who made this [`Selection`].
    pub selected_by: user::Id,

    /// [`DateTime`] when this [`Selection`] was made.
    pub selected_at: SelectionDateTime,
}

/// [`DateTime`] when a [`Selection`] was made.
pub type SelectionDateTime = DateTimeOf<(Selection, unit::Creation)>;

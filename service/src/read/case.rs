//! [`Case`] read model definition.

use std::collections::BTreeSet;

use crate::domain::{case, offer, user, Case, Offer, Selection, Showing};

/// Full view of a [`Case`] together with its child collections.
///
/// This is the unit the lifecycle status is derived from: no read path
/// consults the stored [`Case`] record alone.
#[derive(Clone, Debug)]
pub struct Snapshot {
    /// The [`Case`] record itself.
    pub case: Case,

    /// [`Showing`] of the [`Case`], if one exists.
    pub showing: Option<Showing>,

    /// [`Offer`]s submitted to the [`Case`].
    pub offers: Vec<Offer>,

    /// [`Selection`] made on the [`Case`], if any.
    pub selection: Option<Selection>,
}

impl Snapshot {
    /// Resolves the current [`case::Status`] of the [`Case`].
    #[must_use]
    pub fn status(&self) -> case::Status {
        self.case.status(
            self.showing.as_ref(),
            &self.offers,
            self.selection.as_ref(),
        )
    }

    /// Returns the [`Offer`] with the provided ID, if present.
    #[must_use]
    pub fn offer(&self, id: offer::Id) -> Option<&Offer> {
        self.offers.iter().find(|o| o.id == id)
    }

    /// Returns the [`Offer`] submitted by the provided agent, if any.
    #[must_use]
    pub fn agent_offer(&self, agent_id: user::Id) -> Option<&Offer> {
        self.offers.iter().find(|o| o.agent_id == agent_id)
    }

    /// Returns IDs of all agents engaged with the [`Case`]: registered for
    /// its showing or holding an [`Offer`].
    #[must_use]
    pub fn engaged_agents(&self) -> BTreeSet<user::Id> {
        self.showing
            .iter()
            .flat_map(Showing::registered_agents)
            .chain(self.offers.iter().map(|o| o.agent_id))
            .collect()
    }
}

pub mod list {
    //! [`Case`]s list definitions.

    use common::define_pagination;

    use crate::domain::{case, user};
    #[cfg(doc)]
    use crate::domain::{Case, User};

    define_pagination!(Cursor, Node, Filter);

    /// Node in a [`Connection`].
    pub type Node = super::Snapshot;

    /// Cursor pointing to a specific [`Case`] in a list.
    pub type Cursor = case::Id;

    /// Filter for [`Selector`].
    #[derive(Clone, Debug, Default)]
    pub struct Filter {
        /// ID of the [`User`] owning the [`Case`]s to select.
        pub seller_id: Option<user::Id>,

        /// Resolved [`case::Status`] the selected [`Case`]s must have.
        pub status: Option<case::Status>,

        /// [`Municipality`] the selected [`Case`]s must be located in.
        ///
        /// [`Municipality`]: case::Municipality
        pub municipality: Option<case::Municipality>,
    }
}

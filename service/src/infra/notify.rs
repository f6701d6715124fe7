//! Notification dispatching boundary.

use async_trait::async_trait;
use common::{define_kind, Money};

use crate::domain::{case, user};
#[cfg(doc)]
use crate::domain::{Case, User};

/// Notification emitted by the core on a lifecycle transition.
#[derive(Clone, Debug)]
pub struct Notification {
    /// [`Kind`] of this [`Notification`].
    pub kind: Kind,

    /// ID of the [`User`] to deliver this [`Notification`] to.
    pub recipient: user::Id,

    /// [`Payload`] of this [`Notification`].
    pub payload: Payload,
}

define_kind! {
    #[doc = "Kind of a [`Notification`]."]
    enum Kind {
        #[doc = "A new case matching the agent's coverage became active."]
        AgentNewCase = 1,

        #[doc = "A case the agent engaged with was closed."]
        AgentCaseClosed = 2,

        #[doc = "The number of offers on the seller's case changed."]
        SellerOffersReceived = 3,

        #[doc = "The seller's case was withdrawn or archived."]
        SellerCaseWithdrawn = 4,
    }
}

/// Payload of a [`Notification`].
#[derive(Clone, Debug)]
pub enum Payload {
    /// A new [`Case`] became visible to agents.
    NewCase {
        /// ID of the [`Case`].
        case_id: case::Id,

        /// [`Municipality`] of the property.
        ///
        /// [`Municipality`]: case::Municipality
        municipality: case::Municipality,

        /// Price the seller expects for the property.
        expected_price: Money,
    },

    /// A [`Case`] was closed for the receiving agent.
    CaseClosed {
        /// ID of the [`Case`].
        case_id: case::Id,

        /// Whether the receiving agent's offer won.
        won: bool,
    },

    /// The offer count of a [`Case`] changed.
    OffersReceived {
        /// ID of the [`Case`].
        case_id: case::Id,

        /// Number of offers currently present on the [`Case`].
        num_offers: usize,
    },

    /// A [`Case`] was withdrawn.
    CaseWithdrawn {
        /// ID of the [`Case`].
        case_id: case::Id,
    },
}

/// External sink [`Notification`]s are delivered to.
///
/// The returned flag is advisory only: the core never rolls back a committed
/// transition over a failed delivery.
#[async_trait]
pub trait Sink: Send + Sync {
    /// Delivers the provided [`Notification`].
    async fn send(&self, notification: Notification) -> bool;
}

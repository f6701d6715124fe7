//! [`Showing`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf};

use crate::domain::{case, user};
#[cfg(doc)]
use crate::domain::{Case, User};

/// Open-house showing of a [`Case`]'s property.
///
/// At most one [`Showing`] exists per [`Case`]. It is created lazily, either
/// when the showing is scheduled or when the first agent registers.
#[derive(Clone, Debug)]
pub struct Showing {
    /// ID of the [`Case`] this [`Showing`] belongs to.
    pub case_id: case::Id,

    /// [`DateTime`] the showing is scheduled for.
    pub scheduled_at: Option<ScheduledDateTime>,

    /// [`DateTime`] when the showing took place.
    ///
    /// Setting this is one-way: a completed [`Showing`] never becomes
    /// incomplete again.
    pub completed_at: Option<CompletionDateTime>,

    /// Roster of [`Registration`]s of agents for this [`Showing`].
    pub roster: Vec<Registration>,
}

impl Showing {
    /// Creates a new empty [`Showing`] for the given [`Case`].
    #[must_use]
    pub fn new(case_id: case::Id) -> Self {
        Self {
            case_id,
            scheduled_at: None,
            completed_at: None,
            roster: Vec::new(),
        }
    }

    /// Returns the [`Registration`] of the given agent, if any.
    #[must_use]
    pub fn registration(&self, agent_id: user::Id) -> Option<&Registration> {
        self.roster.iter().find(|r| r.agent_id == agent_id)
    }

    /// Upserts the provided [`Registration`] into the roster.
    ///
    /// An agent appears at most once: re-registering replaces the previous
    /// roster row instead of duplicating it.
    pub fn register(&mut self, registration: Registration) {
        if let Some(existing) = self
            .roster
            .iter_mut()
            .find(|r| r.agent_id == registration.agent_id)
        {
            *existing = registration;
        } else {
            self.roster.push(registration);
        }
    }

    /// Returns IDs of all agents registered for this [`Showing`].
    pub fn registered_agents(&self) -> impl Iterator<Item = user::Id> + '_ {
        self.roster
            .iter()
            .filter(|r| r.decision == Decision::Registered)
            .map(|r| r.agent_id)
    }
}

/// Roster row of a single agent for a [`Showing`].
#[derive(Clone, Debug)]
pub struct Registration {
    /// ID of the registered agent.
    pub agent_id: user::Id,

    /// Display name of the registered agent.
    ///
    /// Denormalized from the [`User`] record at registration time.
    pub agent_name: user::Name,

    /// [`Agency`] the registered agent works for.
    ///
    /// [`Agency`]: user::Agency
    pub agency: Option<user::Agency>,

    /// [`Decision`] the agent made about this [`Showing`].
    pub decision: Decision,

    /// [`DateTime`] when the agent (last) registered.
    pub registered_at: RegistrationDateTime,
}

define_kind! {
    #[doc = "Decision of an agent about a [`Showing`]."]
    enum Decision {
        #[doc = "The agent will attend the showing."]
        Registered = 1,

        #[doc = "The agent declined the showing."]
        Declined = 2,
    }
}

/// [`DateTime`] a [`Showing`] is scheduled for.
pub type ScheduledDateTime = DateTimeOf<(Showing, unit::Scheduling)>;

/// [`DateTime`] when a [`Showing`] took place.
pub type CompletionDateTime = DateTimeOf<(Showing, unit::Completion)>;

/// [`DateTime`] when a [`Registration`] was (last) made.
pub type RegistrationDateTime = DateTimeOf<(Registration, unit::Creation)>;

#[cfg(test)]
mod spec {
    use common::DateTime;

    use crate::domain::{case, user};

    use super::{Decision, Registration, Showing};

    fn registration(agent_id: user::Id, decision: Decision) -> Registration {
        Registration {
            agent_id,
            agent_name: user::Name::new("Bo Vestergaard").unwrap(),
            agency: user::Agency::new("Vestergaard Bolig"),
            decision,
            registered_at: DateTime::now().coerce(),
        }
    }

    #[test]
    fn registering_twice_keeps_one_roster_row() {
        let agent_id = user::Id::new();
        let mut showing = Showing::new(case::Id::new());

        showing.register(registration(agent_id, Decision::Registered));
        showing.register(registration(agent_id, Decision::Declined));

        assert_eq!(showing.roster.len(), 1);
        assert_eq!(
            showing.registration(agent_id).unwrap().decision,
            Decision::Declined,
        );
    }

    #[test]
    fn registered_agents_excludes_declined() {
        let attending = user::Id::new();
        let declined = user::Id::new();
        let mut showing = Showing::new(case::Id::new());

        showing.register(registration(attending, Decision::Registered));
        showing.register(registration(declined, Decision::Declined));

        let agents: Vec<_> = showing.registered_agents().collect();
        assert_eq!(agents, vec![attending]);
    }
}

//! [`Command`] for selecting a winning [`Offer`].

use common::{
    operations::{By, Insert, Select},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        case, offer,
        user::{self, session},
        Selection,
    },
    infra::{database, notify, Database},
    read, Service,
};
#[cfg(doc)]
use crate::domain::{Case, Offer, User};

use super::Command;

/// [`Command`] for selecting the winning [`Offer`] on a [`Case`].
///
/// A one-shot, irreversible action: the first successful call wins and every
/// later one is rejected, checked at write time against the durable
/// [`Selection`] record rather than an in-memory flag.
#[derive(Clone, Copy, Debug)]
pub struct SelectOffer {
    /// ID of the [`Case`] to select the [`Offer`] on.
    pub case_id: case::Id,

    /// ID of the [`Offer`] to select.
    pub offer_id: offer::Id,

    /// [`Actor`] making the [`Selection`].
    ///
    /// An administrator reaches this only through an impersonated session
    /// acting as the seller.
    ///
    /// [`Actor`]: session::Actor
    pub actor: session::Actor,
}

impl<Db> Command<SelectOffer> for Service<Db>
where
    Db: Database<
            Select<By<Option<read::case::Snapshot>, case::Id>>,
            Ok = Option<read::case::Snapshot>,
            Err = Traced<database::Error>,
        > + Database<Insert<Selection>, Err = Traced<database::Error>>,
{
    type Ok = Selection;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: SelectOffer) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let SelectOffer {
            case_id,
            offer_id,
            actor,
        } = cmd;

        let snapshot = self
            .database()
            .execute(Select(By::<Option<read::case::Snapshot>, _>::new(
                case_id,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::CaseNotExists(case_id))
            .map_err(tracerr::wrap!())?;
        if snapshot.case.seller_id != actor.user_id {
            return Err(tracerr::new!(E::NotCaseOwner(actor.user_id)));
        }

        let status = snapshot.status();
        if status.is_terminal() {
            return Err(tracerr::new!(E::InvalidCaseState(status)));
        }
        if snapshot.selection.is_some() {
            return Err(tracerr::new!(E::AlreadySelected(case_id)));
        }

        let offer = snapshot
            .offer(offer_id)
            .ok_or(E::OfferNotExists(offer_id))
            .map_err(tracerr::wrap!())?;

        let selection = Selection {
            case_id,
            offer_id: offer.id,
            selected_by: actor.user_id,
            selected_at: DateTime::now().coerce(),
        };
        self.database()
            .execute(Insert(selection))
            .await
            .map_err(|e| {
                // The durable record is the race guard: a concurrent
                // selection that landed first turns this write into a unique
                // violation.
                if e.as_ref()
                    .is_unique_violation(Some("selection_case_id_key"))
                {
                    tracerr::new!(E::AlreadySelected(case_id))
                } else {
                    tracerr::map_from_and_wrap!(=> E)(e)
                }
            })
            .map(drop)?;

        let winner = offer.agent_id;
        self.notify(notify::Notification {
            kind: notify::Kind::AgentCaseClosed,
            recipient: winner,
            payload: notify::Payload::CaseClosed {
                case_id,
                won: true,
            },
        });
        for loser in snapshot
            .offers
            .iter()
            .map(|o| o.agent_id)
            .filter(|id| *id != winner)
        {
            self.notify(notify::Notification {
                kind: notify::Kind::AgentCaseClosed,
                recipient: loser,
                payload: notify::Payload::CaseClosed {
                    case_id,
                    won: false,
                },
            });
        }

        Ok(selection)
    }
}

/// Error of [`SelectOffer`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// A [`Selection`] already exists on the [`Case`].
    #[display("an `Offer` has already been selected on `Case(id: {_0})`")]
    AlreadySelected(#[error(not(source))] case::Id),

    /// [`Case`] with the provided ID does not exist.
    #[display("`Case(id: {_0})` does not exist")]
    CaseNotExists(#[error(not(source))] case::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// An [`Offer`] cannot be selected in the current [`Case`] status.
    #[display("an `Offer` cannot be selected in `{_0}` status")]
    InvalidCaseState(#[error(not(source))] case::Status),

    /// [`User`] is not the owner of the [`Case`].
    #[display("`User(id: {_0})` is not the owner of the `Case`")]
    NotCaseOwner(#[error(not(source))] user::Id),

    /// [`Offer`] with the provided ID does not exist on the [`Case`].
    #[display("`Offer(id: {_0})` does not exist on the `Case`")]
    OfferNotExists(#[error(not(source))] offer::Id),
}

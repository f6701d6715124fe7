//! [`Query`] collection related to [`Offer`]s.

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::case,
    infra::{database, Database},
    read, Service,
};
#[cfg(doc)]
use crate::domain::{Case, Offer};

use super::Query;

/// [`Query`] for the ranked board of [`Offer`]s on a [`Case`].
///
/// This is the view the seller compares bids on: every [`Offer`] carries its
/// freshly computed score and price deviation, ordered best-first with ties
/// broken by earlier first submission.
#[derive(Clone, Copy, Debug)]
pub struct Ranked {
    /// ID of the [`Case`] to rank the [`Offer`]s of.
    pub case_id: case::Id,
}

impl<Db> Query<Ranked> for Service<Db>
where
    Db: Database<
        Select<By<Option<read::case::Snapshot>, case::Id>>,
        Ok = Option<read::case::Snapshot>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vec<read::offer::Ranked>;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, query: Ranked) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let Ranked { case_id } = query;

        let snapshot = self
            .database()
            .execute(Select(By::<Option<read::case::Snapshot>, _>::new(
                case_id,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::CaseNotExists(case_id))
            .map_err(tracerr::wrap!())?;

        Ok(read::offer::rank(
            snapshot.offers,
            snapshot.case.expected_price,
            &self.config().scoring,
        ))
    }
}

/// Error of [`Ranked`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Case`] with the provided ID does not exist.
    #[display("`Case(id: {_0})` does not exist")]
    CaseNotExists(#[error(not(source))] case::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),
}

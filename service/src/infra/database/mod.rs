//! [`Database`]-related implementations.

#[cfg(feature = "mem")]
pub mod mem;

use derive_more::{Display, Error as StdError, From};

#[cfg(feature = "mem")]
pub use self::mem::Mem;

/// Database operation.
pub use common::Handler as Database;

/// [`Database`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    #[cfg(feature = "mem")]
    /// [`Mem`] error.
    Mem(mem::Error),
}

impl Error {
    /// Checks if the error is a unique violation of the specified constraint.
    #[must_use]
    pub fn is_unique_violation(&self, constraint: Option<&str>) -> bool {
        match self {
            #[cfg(feature = "mem")]
            Self::Mem(mem::Error::UniqueViolation(c)) => {
                constraint.map_or(true, |w| w == *c)
            }
        }
    }
}

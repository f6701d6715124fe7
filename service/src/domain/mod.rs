//! Domain definitions.

pub mod case;
pub mod offer;
pub mod selection;
pub mod showing;
pub mod user;

pub use self::{
    case::Case, offer::Offer, selection::Selection, showing::Showing,
    user::User,
};

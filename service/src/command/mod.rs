//! [`Command`] definition.

pub mod authorize_user_session;
pub mod complete_case;
pub mod complete_showing;
pub mod create_case;
pub mod create_user;
pub mod create_user_session;
pub mod force_case_status;
pub mod impersonate_user;
pub mod mark_offer_viewed;
pub mod register_agent;
pub mod return_to_admin;
pub mod schedule_showing;
pub mod select_offer;
pub mod submit_case;
pub mod submit_offer;
pub mod withdraw_case;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    authorize_user_session::AuthorizeUserSession, complete_case::CompleteCase,
    complete_showing::CompleteShowing, create_case::CreateCase,
    create_user::CreateUser, create_user_session::CreateUserSession,
    force_case_status::ForceCaseStatus, impersonate_user::ImpersonateUser,
    mark_offer_viewed::MarkOfferViewed, register_agent::RegisterAgent,
    return_to_admin::ReturnToAdmin, schedule_showing::ScheduleShowing,
    select_offer::SelectOffer, submit_case::SubmitCase,
    submit_offer::SubmitOffer, withdraw_case::WithdrawCase,
};

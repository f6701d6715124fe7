//! Background [`Task`]s definitions.

mod background;
pub mod deliver_notifications;

pub use common::Handler as Task;

pub use self::{
    background::Background, deliver_notifications::DeliverNotifications,
};

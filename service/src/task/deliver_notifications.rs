//! [`DeliverNotifications`] [`Task`].

use std::{convert::Infallible, sync::Arc};

use common::operations::Perform;
use derive_more::Debug;
use tokio::sync::{mpsc, Mutex};
use tracing as log;

use crate::infra::notify::{Notification, Sink};

use super::Task;

/// [`Task`] delivering queued [`Notification`]s to a [`Sink`].
///
/// The core transition emitting a [`Notification`] commits before the queue
/// is touched and is never rolled back: failed deliveries are logged and
/// swallowed, so a stalled sink cannot block a sale.
#[derive(Debug)]
pub struct DeliverNotifications {
    /// Queue of [`Notification`]s to deliver.
    #[debug(skip)]
    queue: Mutex<mpsc::UnboundedReceiver<Notification>>,

    /// [`Sink`] to deliver the [`Notification`]s to.
    #[debug(skip)]
    sink: Arc<dyn Sink>,
}

impl DeliverNotifications {
    /// Creates a new [`DeliverNotifications`] [`Task`].
    #[must_use]
    pub fn new(
        queue: mpsc::UnboundedReceiver<Notification>,
        sink: Arc<dyn Sink>,
    ) -> Self {
        Self {
            queue: Mutex::new(queue),
            sink,
        }
    }
}

impl Task<Perform<()>> for DeliverNotifications {
    type Ok = ();
    type Err = Infallible;

    async fn execute(&self, _: Perform<()>) -> Result<Self::Ok, Self::Err> {
        let mut queue = self.queue.lock().await;
        while let Some(notification) = queue.recv().await {
            let kind = notification.kind;
            let recipient = notification.recipient;
            if !self.sink.send(notification).await {
                log::warn!(
                    "failed to deliver `{kind}` notification to \
                     `User(id: {recipient})`",
                );
            }
        }
        Ok(())
    }
}

//! Service contains the business logic of the broker-selection marketplace.
//!
//! List of available Cargo features:
#![doc = document_features::document_features!()]
#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod command;
pub mod domain;
pub mod infra;
pub mod query;
pub mod read;
pub mod task;

use std::sync::Arc;

use common::operations::Perform;
use derive_more::Debug;
use tokio::sync::mpsc;
use tracing as log;

use crate::infra::{
    estimate::Estimate,
    notify::{self, Notification},
};

pub use self::{command::Command, query::Query, task::Task};

/// [`Service`] configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// [JWT] encoding key.
    ///
    /// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
    #[debug(skip)]
    pub jwt_encoding_key: jsonwebtoken::EncodingKey,

    /// [JWT] decoding key.
    ///
    /// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
    #[debug(skip)]
    pub jwt_decoding_key: jsonwebtoken::DecodingKey,

    /// [`Offer`] scoring configuration.
    ///
    /// [`Offer`]: domain::Offer
    pub scoring: domain::offer::score::Config,

    /// [`command::CreateCase`] configuration.
    pub valuation: command::create_case::Config,

    /// [`command::SubmitOffer`] configuration.
    pub plausibility: command::submit_offer::Config,
}

/// Domain service.
#[derive(Clone, Debug)]
pub struct Service<Db> {
    /// Configuration of this [`Service`].
    config: Config,

    /// [`Database`] of this [`Service`].
    ///
    /// [`Database`]: infra::Database
    database: Db,

    /// [`Estimate`] collaborator of this [`Service`].
    #[debug(skip)]
    estimator: Arc<dyn Estimate>,

    /// Queue of outgoing [`Notification`]s.
    #[debug(skip)]
    notifications: mpsc::UnboundedSender<Notification>,
}

impl<Db> Service<Db> {
    /// Creates a new [`Service`] with the provided parameters, along with the
    /// [`task::Background`] environment delivering its [`Notification`]s to
    /// the provided [`notify::Sink`].
    pub fn new(
        config: Config,
        database: Db,
        estimator: Arc<dyn Estimate>,
        sink: Arc<dyn notify::Sink>,
    ) -> (Self, task::Background) {
        let (tx, rx) = mpsc::unbounded_channel();
        let this = Self {
            config,
            database,
            estimator,
            notifications: tx,
        };

        let mut bg = task::Background::default();
        let deliver = task::DeliverNotifications::new(rx, sink);
        bg.spawn(async move { deliver.execute(Perform(())).await });

        (this, bg)
    }

    /// Returns [`Config`] of this [`Service`].
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns [`Database`] of this [`Service`].
    ///
    /// [`Database`]: infra::Database
    #[must_use]
    pub fn database(&self) -> &Db {
        &self.database
    }

    /// Returns the [`Estimate`] collaborator of this [`Service`].
    pub(crate) fn estimator(&self) -> &dyn Estimate {
        &*self.estimator
    }

    /// Enqueues the provided [`Notification`] for delivery.
    ///
    /// Fire-and-forget: the emitting transition has already committed, so a
    /// closed queue is logged and swallowed rather than surfaced.
    pub(crate) fn notify(&self, notification: Notification) {
        if self.notifications.send(notification).is_err() {
            log::warn!("notification queue is closed, notification dropped");
        }
    }
}

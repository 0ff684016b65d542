//! Discovery-client traits and the watch callback surface.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;

use crate::channel::ChannelArgs;
use crate::lifecycle::ShutdownFlag;
use crate::model::RouteTable;

/// Errors surfaced by a discovery client.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DiscoveryError {
    /// The client could not be created or could not reach the control
    /// plane.
    #[error("failed to connect to control plane: {0}")]
    Connect(String),

    /// Transport-level failure on an established stream.
    #[error("transport error: {0}")]
    Transport(String),

    /// The control plane sent something the client could not interpret.
    #[error("protocol error: {0}")]
    Protocol(String),
}

/// One watch notification, as queued into the resolver's mailbox.
#[derive(Debug)]
pub enum WatchEvent {
    /// New listener/route-table data.
    Update(RouteTable),
    /// Transport or protocol failure; the watch stays active.
    Error(DiscoveryError),
    /// The watched resource does not exist on the control plane.
    ResourceDoesNotExist,
}

/// Callback surface handed to the discovery client for one watch.
///
/// Each callback enqueues an event into the owning resolver's serializer
/// mailbox; nothing runs on the client's execution context. Sends are
/// dropped once the resolver has shut down.
#[derive(Clone)]
pub struct WatchSink {
    tx: mpsc::UnboundedSender<WatchEvent>,
    shutdown: Arc<ShutdownFlag>,
}

impl WatchSink {
    pub(crate) fn new(tx: mpsc::UnboundedSender<WatchEvent>, shutdown: Arc<ShutdownFlag>) -> Self {
        Self { tx, shutdown }
    }

    /// Deliver updated listener/route-table data.
    pub fn on_update(&self, table: RouteTable) {
        self.send(WatchEvent::Update(table));
    }

    /// Deliver a transport/protocol error.
    pub fn on_error(&self, error: DiscoveryError) {
        self.send(WatchEvent::Error(error));
    }

    /// Report that the watched resource does not exist.
    pub fn on_resource_does_not_exist(&self) {
        self.send(WatchEvent::ResourceDoesNotExist);
    }

    fn send(&self, event: WatchEvent) {
        if !self.shutdown.is_live() {
            return;
        }
        if self.tx.send(event).is_err() {
            tracing::debug!("watch event dropped, resolver mailbox closed");
        }
    }
}

/// Active watch registration. Dropping the handle stops the watch.
pub trait WatchHandle: Send {}

/// A control-plane discovery client, as seen by the resolver.
pub trait DiscoveryClient: Send + Sync {
    /// Start watching listener/route data for one named resource. Updates,
    /// errors, and not-found notifications flow through `sink` until the
    /// returned handle is dropped.
    fn watch_listener(&self, resource_name: &str, sink: WatchSink) -> Box<dyn WatchHandle>;

    /// The client's own channel-argument contribution, merged into every
    /// result the resolver delivers.
    fn channel_args(&self) -> ChannelArgs;
}

/// Creates the discovery client for a resolver instance.
///
/// Invoked once, at resolver start, with the resource name derived from
/// the target. Failure is fatal to that resolver instance.
pub type DiscoveryClientFactory =
    Arc<dyn Fn(&str) -> Result<Arc<dyn DiscoveryClient>, DiscoveryError> + Send + Sync>;

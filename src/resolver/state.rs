//! Resolver handle and serializer task.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};

use crate::channel::ChannelArgs;
use crate::compiler::{compile, RoutingConfig};
use crate::discovery::{
    DiscoveryClient, DiscoveryClientFactory, DiscoveryError, WatchEvent, WatchHandle, WatchSink,
};
use crate::lifecycle::ShutdownFlag;
use crate::model::RouteTable;
use crate::naming::ActionNamer;

use super::result::{ConfigSink, ResolverResult};
use super::target::{resource_name_from_target, TargetError};

/// Everything needed to start one resolver instance.
pub struct ResolverOptions {
    /// Target string, e.g. `xds:///server.example.com`.
    pub target: String,

    /// Base passthrough args included in every delivered result.
    pub args: ChannelArgs,

    /// Creates the discovery client for the derived resource name.
    pub discovery: DiscoveryClientFactory,

    /// Receives every delivered result.
    pub sink: Arc<dyn ConfigSink>,
}

/// Handle to a running resolver.
///
/// Dropping the handle shuts the resolver down. Must be started from
/// within a tokio runtime.
#[derive(Debug)]
pub struct XdsResolver {
    shutdown: Arc<ShutdownFlag>,
}

impl XdsResolver {
    /// Parse the target, create the discovery client, register the watch,
    /// and spawn the serializer task.
    ///
    /// A malformed target is rejected here. A discovery-client creation
    /// failure is delivered to the sink as an error result instead; the
    /// returned resolver is then inert.
    pub fn start(options: ResolverOptions) -> Result<Self, TargetError> {
        let resource_name = resource_name_from_target(&options.target)?;
        let shutdown = Arc::new(ShutdownFlag::new());

        let client = match (options.discovery)(&resource_name) {
            Ok(client) => client,
            Err(error) => {
                tracing::error!(
                    resource = %resource_name,
                    error = %error,
                    "failed to create discovery client, resolver will remain inert"
                );
                options
                    .sink
                    .deliver(ResolverResult::error(error.into(), options.args.clone()));
                shutdown.trigger();
                return Ok(Self { shutdown });
            }
        };

        tracing::info!(resource = %resource_name, "xds resolver started");
        let (tx, rx) = mpsc::unbounded_channel();
        let watch = client.watch_listener(&resource_name, WatchSink::new(tx, shutdown.clone()));
        let stop = shutdown.subscribe();
        let state = ResolverState {
            resource_name,
            base_args: options.args,
            sink: options.sink,
            client,
            namer: ActionNamer::new(),
            _watch: watch,
        };
        tokio::spawn(run(state, rx, shutdown.clone(), stop));
        Ok(Self { shutdown })
    }

    /// Shut the resolver down. Queued watch events are discarded and the
    /// discovery watch is cancelled. Idempotent.
    pub fn shutdown(&self) {
        self.shutdown.trigger();
    }
}

impl Drop for XdsResolver {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// State owned exclusively by the serializer task.
struct ResolverState {
    resource_name: String,
    base_args: ChannelArgs,
    sink: Arc<dyn ConfigSink>,
    client: Arc<dyn DiscoveryClient>,
    namer: ActionNamer,
    // Dropping the handle when the task ends cancels the watch.
    _watch: Box<dyn WatchHandle>,
}

async fn run(
    mut state: ResolverState,
    mut events: mpsc::UnboundedReceiver<WatchEvent>,
    shutdown: Arc<ShutdownFlag>,
    mut stop: broadcast::Receiver<()>,
) {
    loop {
        tokio::select! {
            _ = stop.recv() => break,
            event = events.recv() => match event {
                Some(event) => {
                    // Liveness check: an event queued before shutdown is
                    // discarded, not processed.
                    if !shutdown.is_live() {
                        break;
                    }
                    state.handle(event);
                }
                None => break,
            },
        }
    }
    tracing::info!(resource = %state.resource_name, "xds resolver shut down");
}

impl ResolverState {
    fn handle(&mut self, event: WatchEvent) {
        match event {
            WatchEvent::Update(table) => self.on_update(table),
            WatchEvent::Error(error) => self.on_error(error),
            WatchEvent::ResourceDoesNotExist => self.on_resource_does_not_exist(),
        }
    }

    fn on_update(&mut self, table: RouteTable) {
        tracing::debug!(
            resource = %self.resource_name,
            routes = table.routes.len(),
            "received listener update"
        );
        let plan = self.namer.plan(&table);
        match compile(&table, &plan).and_then(RoutingConfig::new) {
            Ok(config) => {
                // The naming table becomes visible to later updates only
                // once the whole document built.
                self.namer.commit(plan);
                tracing::debug!(
                    resource = %self.resource_name,
                    config = %config.json(),
                    "generated routing config"
                );
                self.sink
                    .deliver(ResolverResult::config(config, self.result_args()));
            }
            Err(error) => {
                tracing::error!(
                    resource = %self.resource_name,
                    error = %error,
                    "failed to compile routing config"
                );
                self.sink
                    .deliver(ResolverResult::error(error.into(), self.result_args()));
            }
        }
    }

    fn on_error(&mut self, error: DiscoveryError) {
        tracing::error!(
            resource = %self.resource_name,
            error = %error,
            "discovery error"
        );
        self.sink
            .deliver(ResolverResult::error(error.into(), self.result_args()));
    }

    fn on_resource_does_not_exist(&mut self) {
        tracing::error!(
            resource = %self.resource_name,
            "resource does not exist, returning empty routing config"
        );
        self.sink.deliver(ResolverResult::config(
            RoutingConfig::empty(),
            self.result_args(),
        ));
    }

    fn result_args(&self) -> ChannelArgs {
        self.base_args.merged(&self.client.channel_args())
    }
}

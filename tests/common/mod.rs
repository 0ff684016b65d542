//! Shared fakes for resolver integration tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;

use xds_resolver::{
    ChannelArgs, ClusterWeight, ConfigSink, DiscoveryClient, DiscoveryClientFactory,
    DiscoveryError, PathMatcher, ResolverResult, Route, RouteTable, WatchHandle, WatchSink,
};

/// Opt-in log output while debugging: `RUST_LOG=debug cargo test`.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Watch handle that records when it is dropped.
pub struct FakeWatch {
    active: Arc<AtomicBool>,
}

impl WatchHandle for FakeWatch {}

impl Drop for FakeWatch {
    fn drop(&mut self) {
        self.active.store(false, Ordering::SeqCst);
    }
}

/// In-process discovery client: tests push events through stored sinks.
#[derive(Default)]
pub struct FakeDiscoveryClient {
    sinks: Mutex<Vec<WatchSink>>,
    watch_count: AtomicUsize,
    watch_active: Arc<AtomicBool>,
    args: ChannelArgs,
}

impl FakeDiscoveryClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            args: ChannelArgs::new().with("discovery.client", "fake"),
            ..Self::default()
        })
    }

    /// Factory that hands out this client instance.
    pub fn factory(self: &Arc<Self>) -> DiscoveryClientFactory {
        let client = self.clone();
        Arc::new(move |_resource| Ok(client.clone() as Arc<dyn DiscoveryClient>))
    }

    /// Factory that fails to create any client.
    pub fn failing_factory(reason: &str) -> DiscoveryClientFactory {
        let reason = reason.to_string();
        Arc::new(move |_resource| Err(DiscoveryError::Connect(reason.clone())))
    }

    pub fn watch_count(&self) -> usize {
        self.watch_count.load(Ordering::SeqCst)
    }

    pub fn watch_active(&self) -> bool {
        self.watch_active.load(Ordering::SeqCst)
    }

    pub fn push_update(&self, table: RouteTable) {
        for sink in self.sinks.lock().unwrap().iter() {
            sink.on_update(table.clone());
        }
    }

    pub fn push_error(&self, error: DiscoveryError) {
        for sink in self.sinks.lock().unwrap().iter() {
            sink.on_error(error.clone());
        }
    }

    pub fn push_resource_does_not_exist(&self) {
        for sink in self.sinks.lock().unwrap().iter() {
            sink.on_resource_does_not_exist();
        }
    }
}

impl DiscoveryClient for FakeDiscoveryClient {
    fn watch_listener(&self, _resource_name: &str, sink: WatchSink) -> Box<dyn WatchHandle> {
        self.sinks.lock().unwrap().push(sink);
        self.watch_count.fetch_add(1, Ordering::SeqCst);
        self.watch_active.store(true, Ordering::SeqCst);
        Box::new(FakeWatch {
            active: self.watch_active.clone(),
        })
    }

    fn channel_args(&self) -> ChannelArgs {
        self.args.clone()
    }
}

/// Sink that forwards every delivery into an mpsc channel.
pub struct RecordingSink {
    tx: mpsc::UnboundedSender<ResolverResult>,
}

impl RecordingSink {
    pub fn pair() -> (Arc<Self>, mpsc::UnboundedReceiver<ResolverResult>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { tx }), rx)
    }
}

impl ConfigSink for RecordingSink {
    fn deliver(&self, result: ResolverResult) {
        let _ = self.tx.send(result);
    }
}

/// Await the next delivery, failing the test if none arrives in time.
pub async fn next_result(rx: &mut mpsc::UnboundedReceiver<ResolverResult>) -> ResolverResult {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for resolver result")
        .expect("result channel closed")
}

/// Assert that nothing is delivered within the given window.
pub async fn assert_no_result(rx: &mut mpsc::UnboundedReceiver<ResolverResult>, window: Duration) {
    // Ok(None) means the resolver task exited and closed the channel
    // without delivering, which is fine here.
    if let Ok(Some(result)) = tokio::time::timeout(window, rx.recv()).await {
        panic!("unexpected resolver delivery: {:?}", result);
    }
}

pub fn prefix_route(prefix: &str, cluster: &str) -> Route {
    Route::to_cluster(PathMatcher::Prefix(prefix.into()), cluster)
}

pub fn weighted_route(prefix: &str, clusters: &[(&str, u32)]) -> Route {
    Route::to_weighted(
        PathMatcher::Prefix(prefix.into()),
        clusters
            .iter()
            .map(|(name, weight)| ClusterWeight::new(*name, *weight))
            .collect(),
    )
}

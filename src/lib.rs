//! Dynamic xDS routing-configuration resolver for RPC clients.
//!
//! Subscribes to a control-plane feed of listener/route-table updates,
//! compiles each update into a routing-policy document, and delivers it to
//! the RPC channel so load balancing can be reconfigured without a restart.
//!
//! # Data Flow
//! ```text
//! discovery client (watch callbacks)
//!     → resolver serializer task (one event at a time, in order)
//!     → naming (stable action names for weighted clusters)
//!     → compiler (route table → routing-policy document)
//!     → config sink (the RPC channel)
//! ```

pub mod channel;
pub mod compiler;
pub mod discovery;
pub mod lifecycle;
pub mod model;
pub mod naming;
pub mod resolver;

pub use channel::{ArgValue, ChannelArgs};
pub use compiler::{CompileError, RoutingConfig, RoutingPolicy};
pub use discovery::{DiscoveryClient, DiscoveryClientFactory, DiscoveryError, WatchHandle, WatchSink};
pub use model::{ClusterWeight, HeaderMatchKind, HeaderMatcher, PathMatcher, Route, RouteAction, RouteTable};
pub use naming::{ActionNamer, NamingPlan};
pub use resolver::{ConfigSink, ResolverError, ResolverOptions, ResolverResult, TargetError, XdsResolver};

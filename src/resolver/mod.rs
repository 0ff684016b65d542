//! Resolver state machine.
//!
//! # Data Flow
//! ```text
//! XdsResolver::start(target, args, factory, sink)
//!     → target.rs (resource name from the target string)
//!     → discovery factory (create client, register watch)
//!     → state.rs serializer task, one event at a time, in order:
//!         Update            → plan → compile → commit → deliver config
//!         Error             → deliver error result
//!         ResourceNotFound  → deliver explicit empty config
//!     → ConfigSink (the RPC channel)
//! ```
//!
//! # Design Decisions
//! - All mutable state lives inside one spawned task; callbacks are
//!   mailbox messages, so no locks and no reordering
//! - The naming table is committed only after a successful compile, so a
//!   failed update cannot leave it partially mutated
//! - Shutdown trips a liveness flag and drops the watch handle; queued
//!   events are discarded, not processed

pub mod result;
pub mod state;
pub mod target;

pub use result::{ConfigSink, ResolverError, ResolverResult};
pub use state::{ResolverOptions, XdsResolver};
pub use target::{resource_name_from_target, TargetError, XDS_SCHEME};

//! Discovery-client interface.
//!
//! # Data Flow
//! ```text
//! control plane (outside this crate)
//!     → DiscoveryClient impl (wire protocol, stream management, retries)
//!     → WatchSink (marshals each callback into the resolver's mailbox)
//!     → resolver serializer task
//! ```
//!
//! # Design Decisions
//! - The wire protocol is an external collaborator, specified only through
//!   these traits; this crate never touches the network
//! - Callbacks never run resolver code on the client's execution context;
//!   they enqueue events and return
//! - The sink holds a non-owning sender plus a liveness check, so a watch
//!   outliving its resolver is harmless

pub mod client;

pub use client::{
    DiscoveryClient, DiscoveryClientFactory, DiscoveryError, WatchEvent, WatchHandle, WatchSink,
};

//! Routing-policy compilation.
//!
//! # Data Flow
//! ```text
//! RouteTable + NamingPlan
//!     → compile.rs (action definitions + ordered route entries)
//!     → policy.rs (typed document tree)
//!     → RoutingConfig (tree serialized once to canonical JSON)
//! ```
//!
//! # Design Decisions
//! - Typed nodes instead of string concatenation: names are escaped by the
//!   serializer and construction failure is a real, testable branch
//! - Action keys are prefixed `cds:` / `weighted:` so a literal cluster
//!   name can never collide with an allocator-assigned name
//! - A matcher the document format cannot express is a hard compile error,
//!   never a silently dropped field

pub mod compile;
pub mod policy;

pub use compile::{compile, CompileError};
pub use policy::{ActionSpec, OrderedMap, RoutingConfig, RoutingPolicy};

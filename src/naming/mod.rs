//! Stable action naming for weighted-cluster routes.
//!
//! # Data Flow
//! ```text
//! RouteTable (one update)
//!     → derive (names_key, weights_key) per weighted-cluster route
//!     → allocator.rs (two-pass slot assignment against the cached table)
//!     → NamingPlan: weights_key → "<names_key>_<index>"
//!
//! After a successful compile:
//!     NamingPlan committed → fresh table replaces the cache,
//!     unreferenced buckets and slots are dropped
//! ```
//!
//! # Design Decisions
//! - Reusing a name lets the downstream load-balancing layer keep its
//!   existing sub-policy instead of recreating it
//! - Sorted (BTreeMap) iteration everywhere: output depends only on the
//!   update content, never on insertion order
//! - plan() is pure; the table only changes on commit(), so a failed
//!   compile leaves the cache untouched

pub mod allocator;

pub use allocator::{weighted_cluster_keys, ActionNamer, NamingPlan, WeightedClusterKeys};

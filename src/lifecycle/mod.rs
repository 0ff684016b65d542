//! Resolver lifecycle coordination.
//!
//! # Design Decisions
//! - Shutdown is soft: callbacks already in flight check liveness and
//!   discard themselves instead of being forcibly cancelled
//! - One flag per resolver instance, shared by the handle, the serializer
//!   task, and every watch sink

pub mod shutdown;

pub use shutdown::ShutdownFlag;

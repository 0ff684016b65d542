//! Resolution results and the sink that receives them.

use std::sync::Arc;

use thiserror::Error;

use crate::channel::ChannelArgs;
use crate::compiler::{CompileError, RoutingConfig};
use crate::discovery::DiscoveryError;

/// Errors a resolver reports to its sink.
#[derive(Debug, Error)]
pub enum ResolverError {
    /// The discovery client could not be created; this resolver instance
    /// stays inert.
    #[error("failed to create discovery client: {0}")]
    Discovery(#[from] DiscoveryError),

    /// The update could not be compiled into a routing document.
    #[error("failed to compile routing config: {0}")]
    Compile(#[from] CompileError),
}

/// One resolution outcome delivered to the sink.
///
/// A successful update carries a config and no error; a degraded delivery
/// carries an error and no config; resource-not-found carries an explicit
/// empty config. Args always ride along so downstream layers can locate
/// the discovery client.
#[derive(Debug)]
pub struct ResolverResult {
    /// Compiled routing configuration, absent on error deliveries.
    pub config: Option<Arc<RoutingConfig>>,

    /// Passthrough args merged with the discovery client's contribution.
    pub args: ChannelArgs,

    /// What went wrong, absent on successful deliveries.
    pub error: Option<ResolverError>,
}

impl ResolverResult {
    pub(crate) fn config(config: RoutingConfig, args: ChannelArgs) -> Self {
        Self {
            config: Some(Arc::new(config)),
            args,
            error: None,
        }
    }

    pub(crate) fn error(error: ResolverError, args: ChannelArgs) -> Self {
        Self {
            config: None,
            args,
            error: Some(error),
        }
    }
}

/// Receives every result the resolver produces, in update order.
///
/// Implemented by the RPC channel. Fire-and-forget: the resolver never
/// consumes a return value.
pub trait ConfigSink: Send + Sync {
    fn deliver(&self, result: ResolverResult);
}

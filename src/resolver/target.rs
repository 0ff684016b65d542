//! Target-string parsing.

use thiserror::Error;
use url::Url;

/// URI scheme this resolver serves.
pub const XDS_SCHEME: &str = "xds";

/// Errors rejecting a target string at resolver construction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TargetError {
    #[error("failed to parse target '{target}': {reason}")]
    Parse { target: String, reason: String },

    #[error("target '{target}' has scheme '{scheme}', expected '{XDS_SCHEME}'")]
    UnexpectedScheme { target: String, scheme: String },

    /// The target carries an authority component, which this resolver does
    /// not support.
    #[error("target '{target}': authority not supported")]
    AuthorityNotSupported { target: String },

    #[error("target '{target}' names no resource")]
    EmptyResourceName { target: String },
}

/// Resource name to watch, derived from the target string.
///
/// The resource name is the target's path component with a single leading
/// `/` stripped, e.g. `xds:///server.example.com` → `server.example.com`.
pub fn resource_name_from_target(target: &str) -> Result<String, TargetError> {
    let uri = Url::parse(target).map_err(|e| TargetError::Parse {
        target: target.to_string(),
        reason: e.to_string(),
    })?;
    if uri.scheme() != XDS_SCHEME {
        return Err(TargetError::UnexpectedScheme {
            target: target.to_string(),
            scheme: uri.scheme().to_string(),
        });
    }
    if let Some(host) = uri.host_str() {
        if !host.is_empty() {
            return Err(TargetError::AuthorityNotSupported {
                target: target.to_string(),
            });
        }
    }
    let path = uri.path();
    let resource = path.strip_prefix('/').unwrap_or(path);
    if resource.is_empty() {
        return Err(TargetError::EmptyResourceName {
            target: target.to_string(),
        });
    }
    Ok(resource.to_string())
}

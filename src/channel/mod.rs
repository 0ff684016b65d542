//! Channel-argument plumbing.
//!
//! # Responsibilities
//! - Carry opaque key/value arguments through the resolver unchanged
//! - Merge the discovery client's contribution into every delivered result
//!
//! # Design Decisions
//! - The resolver never interprets argument values; downstream layers use
//!   them to locate collaborators such as the discovery client
//! - Merging is last-wins, mirroring append-overrides argument semantics

use std::collections::BTreeMap;

/// One opaque argument value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    Str(String),
    Int(i64),
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        ArgValue::Str(value.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(value: String) -> Self {
        ArgValue::Str(value)
    }
}

impl From<i64> for ArgValue {
    fn from(value: i64) -> Self {
        ArgValue::Int(value)
    }
}

/// Opaque channel-argument carrier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelArgs {
    entries: BTreeMap<String, ArgValue>,
}

impl ChannelArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one argument, replacing any existing value for the key.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<ArgValue>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Builder-style variant of [`set`](Self::set).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ArgValue>) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&ArgValue> {
        self.entries.get(key)
    }

    /// A copy of `self` with `other`'s entries layered on top; on key
    /// collision, `other` wins.
    pub fn merged(&self, other: &ChannelArgs) -> ChannelArgs {
        let mut entries = self.entries.clone();
        for (key, value) in &other.entries {
            entries.insert(key.clone(), value.clone());
        }
        ChannelArgs { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

//! Typed routing-policy document tree and its JSON form.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use super::compile::CompileError;

/// A JSON object whose key order is significant.
///
/// `serde_json`'s map type sorts keys, which would scramble the
/// first-reference ordering of actions and targets, so object-valued nodes
/// keep an insertion-ordered entry list and serialize it as a map.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMap<V>(Vec<(String, V)>);

// Manual impl: the derive would demand V: Default, which the value types
// have no reason to carry.
impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<V> OrderedMap<V> {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn insert(&mut self, key: String, value: V) {
        self.0.push((key, value));
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.iter().any(|(k, _)| k == key)
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<V: Serialize> Serialize for OrderedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Leaf policy picking a single cluster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterPick {
    pub cluster: String,
}

/// One child load-balancing policy inside an action definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LbPolicy {
    #[serde(rename = "cds_experimental")]
    Cds(ClusterPick),
    #[serde(rename = "weighted_target_experimental")]
    WeightedTarget(WeightedTargetPolicy),
}

/// Weighted split across targets, each wrapping its own cluster pick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightedTargetPolicy {
    pub targets: OrderedMap<WeightedTarget>,
}

/// One target of a weighted split.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightedTarget {
    pub weight: u32,
    #[serde(rename = "childPolicy")]
    pub child_policy: Vec<LbPolicy>,
}

/// One named action definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionSpec {
    #[serde(rename = "childPolicy")]
    pub child_policy: Vec<LbPolicy>,
}

impl ActionSpec {
    /// "Pick this one cluster" definition.
    pub fn cluster_pick(cluster: &str) -> Self {
        Self {
            child_policy: vec![LbPolicy::Cds(ClusterPick {
                cluster: cluster.to_string(),
            })],
        }
    }

    /// "Weighted target" definition over `(cluster, weight)` pairs, each
    /// wrapped in its own single-cluster pick.
    pub fn weighted_target(targets: OrderedMap<WeightedTarget>) -> Self {
        Self {
            child_policy: vec![LbPolicy::WeightedTarget(WeightedTargetPolicy { targets })],
        }
    }
}

/// Path matching condition as emitted in the document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PathSpec {
    #[serde(rename = "prefix")]
    Prefix(String),
    #[serde(rename = "path")]
    Path(String),
    #[serde(rename = "regex")]
    Regex(String),
}

/// Header matching condition as emitted in the document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum HeaderKindSpec {
    #[serde(rename = "exact_match")]
    Exact(String),
    #[serde(rename = "regex_match")]
    Regex(String),
    #[serde(rename = "range_match")]
    Range { start: i64, end: i64 },
    #[serde(rename = "present_match")]
    Present(bool),
    #[serde(rename = "prefix_match")]
    Prefix(String),
    #[serde(rename = "suffix_match")]
    Suffix(String),
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// One header matcher entry of a route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeaderSpec {
    pub name: String,
    #[serde(flatten)]
    pub kind: HeaderKindSpec,
    #[serde(rename = "invert_match", skip_serializing_if = "is_false")]
    pub invert: bool,
}

/// One route entry, referencing its action by composed key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteSpec {
    #[serde(flatten)]
    pub path: PathSpec,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<HeaderSpec>,
    #[serde(rename = "match_fraction", skip_serializing_if = "Option::is_none")]
    pub fraction_per_million: Option<u32>,
    pub action: String,
}

/// The compiled routing-policy document.
///
/// Actions appear in first-reference order, routes in input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RoutingPolicy {
    pub actions: OrderedMap<ActionSpec>,
    pub routes: Vec<RouteSpec>,
}

/// A routing policy paired with its canonical JSON text.
///
/// The tree is serialized exactly once, here; a serialization failure is
/// surfaced as a compile error rather than a partially built document.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutingConfig {
    policy: RoutingPolicy,
    json: String,
}

impl RoutingConfig {
    pub fn new(policy: RoutingPolicy) -> Result<Self, CompileError> {
        let json = serde_json::to_string(&policy)?;
        Ok(Self { policy, json })
    }

    /// The explicit "no routes" policy delivered when the watched resource
    /// does not exist.
    pub fn empty() -> Self {
        Self {
            policy: RoutingPolicy::default(),
            json: r#"{"actions":{},"routes":[]}"#.to_string(),
        }
    }

    pub fn policy(&self) -> &RoutingPolicy {
        &self.policy
    }

    pub fn json(&self) -> &str {
        &self.json
    }

    pub fn is_empty(&self) -> bool {
        self.policy.actions.is_empty() && self.policy.routes.is_empty()
    }
}

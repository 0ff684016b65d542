//! Route-table data model.
//!
//! # Responsibilities
//! - Describe one routing rule: path matcher, header matchers, traffic
//!   fraction, destination
//! - Describe a full route table as delivered by the discovery client
//!
//! # Design Decisions
//! - Plain data, no behavior: produced by the discovery client, consumed
//!   read-only by the compiler
//! - No validation here; structural problems surface as compiler errors
//! - Route order is match-priority order and is preserved end to end

/// One destination cluster with its load-balancing weight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterWeight {
    /// Upstream cluster name.
    pub name: String,

    /// Relative weight. Must be positive; the compiler rejects zero.
    pub weight: u32,
}

impl ClusterWeight {
    pub fn new(name: impl Into<String>, weight: u32) -> Self {
        Self {
            name: name.into(),
            weight,
        }
    }
}

/// Path matching condition for a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathMatcher {
    /// Match paths starting with the given prefix.
    Prefix(String),
    /// Match the exact path.
    Exact(String),
    /// Match paths against a regex pattern.
    Regex(String),
}

/// Header value matching condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderMatchKind {
    /// Exact value match.
    Exact(String),
    /// Regex pattern match.
    Regex(String),
    /// Numeric range match over [start, end).
    Range { start: i64, end: i64 },
    /// Presence (or absence) of the header.
    Present(bool),
    /// Value prefix match.
    Prefix(String),
    /// Value suffix match.
    Suffix(String),
    /// Substring match. Delivered by newer control planes but not
    /// expressible in the routing document; compiling it is an error.
    Contains(String),
}

/// One header matching condition on a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderMatcher {
    /// Header name.
    pub name: String,

    /// How the header value is matched.
    pub kind: HeaderMatchKind,

    /// Invert the match result.
    pub invert: bool,
}

impl HeaderMatcher {
    pub fn new(name: impl Into<String>, kind: HeaderMatchKind) -> Self {
        Self {
            name: name.into(),
            kind,
            invert: false,
        }
    }
}

/// Destination of a route: a single cluster or a weighted split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteAction {
    /// Send all matched traffic to one cluster.
    Cluster(String),
    /// Split matched traffic across clusters by weight.
    WeightedClusters(Vec<ClusterWeight>),
}

/// One routing rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// Path matching condition.
    pub path: PathMatcher,

    /// Header matching conditions, evaluated in order.
    pub headers: Vec<HeaderMatcher>,

    /// Traffic-fraction gate, in parts per million.
    pub fraction_per_million: Option<u32>,

    /// Where matched traffic goes.
    pub action: RouteAction,
}

impl Route {
    /// A route sending all matched traffic to a single cluster.
    pub fn to_cluster(path: PathMatcher, cluster: impl Into<String>) -> Self {
        Self {
            path,
            headers: Vec::new(),
            fraction_per_million: None,
            action: RouteAction::Cluster(cluster.into()),
        }
    }

    /// A route splitting matched traffic across weighted clusters.
    pub fn to_weighted(path: PathMatcher, clusters: Vec<ClusterWeight>) -> Self {
        Self {
            path,
            headers: Vec::new(),
            fraction_per_million: None,
            action: RouteAction::WeightedClusters(clusters),
        }
    }
}

/// An ordered route table, as delivered in one listener update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteTable {
    /// Routes in match-priority order.
    pub routes: Vec<Route>,
}

impl RouteTable {
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

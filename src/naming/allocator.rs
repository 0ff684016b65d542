//! Two-level slot table assigning stable indices to weighted-cluster actions.

use std::collections::{BTreeMap, BTreeSet};

use crate::model::{ClusterWeight, RouteAction, RouteTable};

/// Cache keys derived from one weighted-cluster set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightedClusterKeys {
    /// Sorted-unique cluster names joined by `_`, e.g. `a_b_c`.
    pub names_key: String,

    /// Sorted-unique `name_weight` pairs joined by `_`, e.g. `a_10_b_90`.
    pub weights_key: String,
}

/// Derive the cache keys for a weighted-cluster set.
pub fn weighted_cluster_keys(clusters: &[ClusterWeight]) -> WeightedClusterKeys {
    let mut names = BTreeSet::new();
    let mut weights = BTreeSet::new();
    for cw in clusters {
        names.insert(cw.name.as_str());
        weights.insert(format!("{}_{}", cw.name, cw.weight));
    }
    WeightedClusterKeys {
        names_key: names.into_iter().collect::<Vec<_>>().join("_"),
        weights_key: weights.into_iter().collect::<Vec<_>>().join("_"),
    }
}

/// Slots assigned within one cluster-name-set bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct ClusterSetSlots {
    /// Next fresh index. Only ever increases while the bucket lives.
    next_index: u64,

    /// Live assignments: weights_key → index.
    slots: BTreeMap<String, u64>,
}

/// Name assignment computed for one update, not yet committed.
///
/// Holds the freshly built slot table alongside the
/// `weights_key → action name` mapping the compiler consumes. Committing
/// swaps the table into the [`ActionNamer`]; dropping the plan leaves the
/// cache exactly as it was.
#[derive(Debug)]
pub struct NamingPlan {
    table: BTreeMap<String, ClusterSetSlots>,
    names: BTreeMap<String, String>,
}

impl NamingPlan {
    /// Action name assigned to the given weighted-cluster set, if that set
    /// appeared in the update this plan was computed from.
    pub fn action_name(&self, clusters: &[ClusterWeight]) -> Option<&str> {
        let keys = weighted_cluster_keys(clusters);
        self.names.get(&keys.weights_key).map(String::as_str)
    }
}

/// Allocator of stable `<names_key>_<index>` action names.
///
/// The cache maps every cluster-name set seen in the current configuration
/// to its index assignments. It is rebuilt from scratch on every update so
/// entries no longer in use are dropped, while indices still in use (or
/// freed and re-claimable) carry over.
#[derive(Debug, Default)]
pub struct ActionNamer {
    table: BTreeMap<String, ClusterSetSlots>,
}

impl ActionNamer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute name assignments for one update against the current table.
    ///
    /// Pure with respect to `self`: the freshly built table lives inside
    /// the returned plan until [`commit`](Self::commit).
    pub fn plan(&self, table: &RouteTable) -> NamingPlan {
        // Deduplicate the update's weighted-cluster routes into the set of
        // requested actions: weights_key → names_key. BTreeMap keeps the
        // passes below in sorted weights_key order.
        let mut requested: BTreeMap<String, String> = BTreeMap::new();
        for route in &table.routes {
            if let RouteAction::WeightedClusters(clusters) = &route.action {
                let keys = weighted_cluster_keys(clusters);
                requested.entry(keys.weights_key).or_insert(keys.names_key);
            }
        }

        let mut old = self.table.clone();
        let mut next: BTreeMap<String, ClusterSetSlots> = BTreeMap::new();
        let mut unsettled: Vec<(String, String)> = Vec::new();

        // Exact-match pass: an action whose weights_key already holds a
        // slot keeps it verbatim. Carrying a bucket over also preserves its
        // next_index even when no exact match is found.
        for (weights_key, names_key) in requested {
            if let Some(old_bucket) = old.get_mut(&names_key) {
                let bucket = next.entry(names_key.clone()).or_default();
                bucket.next_index = old_bucket.next_index;
                if let Some(index) = old_bucket.slots.remove(&weights_key) {
                    bucket.slots.insert(weights_key, index);
                    continue;
                }
            }
            unsettled.push((weights_key, names_key));
        }

        // Reuse pass: a still-unsettled action takes the index of the
        // lexicographically smallest weights_key left unclaimed in its
        // bucket, or a fresh index if the bucket has none to give.
        for (weights_key, names_key) in unsettled {
            let old_bucket = old.entry(names_key.clone()).or_default();
            let bucket = next.entry(names_key).or_default();
            let index = match old_bucket.slots.pop_first() {
                Some((_, freed)) => freed,
                None => {
                    let fresh = bucket.next_index;
                    bucket.next_index += 1;
                    fresh
                }
            };
            bucket.slots.insert(weights_key, index);
        }

        let names = next
            .iter()
            .flat_map(|(names_key, bucket)| {
                bucket
                    .slots
                    .iter()
                    .map(move |(weights_key, index)| {
                        (weights_key.clone(), format!("{}_{}", names_key, index))
                    })
            })
            .collect();

        NamingPlan { table: next, names }
    }

    /// Swap in the plan's table, dropping everything it did not carry over.
    pub fn commit(&mut self, plan: NamingPlan) {
        self.table = plan.table;
    }
}

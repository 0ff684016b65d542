//! Route table + naming plan → routing-policy document.

use thiserror::Error;

use crate::model::{HeaderMatchKind, HeaderMatcher, PathMatcher, Route, RouteAction, RouteTable};
use crate::naming::NamingPlan;

use super::policy::{
    ActionSpec, ClusterPick, HeaderKindSpec, HeaderSpec, LbPolicy, OrderedMap, PathSpec,
    RouteSpec, RoutingPolicy, WeightedTarget,
};

/// Structural errors while building the routing-policy document.
#[derive(Debug, Error)]
pub enum CompileError {
    /// Header matcher kind the document format cannot express.
    #[error("header '{header}' uses a {kind} matcher, which the routing document cannot express")]
    UnsupportedHeaderMatch { header: String, kind: &'static str },

    /// Weighted route with no clusters to split across.
    #[error("weighted-cluster route has an empty cluster list")]
    EmptyWeightedAction,

    /// Cluster weight of zero in a weighted split.
    #[error("cluster '{cluster}' has weight 0 in a weighted split")]
    InvalidClusterWeight { cluster: String },

    /// Weighted route with no name in the naming plan. Indicates the plan
    /// was computed from a different route table.
    #[error("no action name assigned for weighted clusters [{clusters}]")]
    UnnamedAction { clusters: String },

    /// Final document serialization was rejected.
    #[error("failed to serialize routing document: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Compile a route table into a routing-policy document, using the action
/// names assigned by `names`.
///
/// Emits one action definition per distinct referenced action, in
/// first-reference order, and one route entry per input route, in input
/// order. The naming plan must have been computed from the same table.
pub fn compile(table: &RouteTable, names: &NamingPlan) -> Result<RoutingPolicy, CompileError> {
    let mut actions: OrderedMap<ActionSpec> = OrderedMap::new();
    let mut routes = Vec::with_capacity(table.routes.len());

    for route in &table.routes {
        let action_key = match &route.action {
            RouteAction::Cluster(cluster) => {
                let key = format!("cds:{}", cluster);
                if !actions.contains_key(&key) {
                    actions.insert(key.clone(), ActionSpec::cluster_pick(cluster));
                }
                key
            }
            RouteAction::WeightedClusters(clusters) => {
                if clusters.is_empty() {
                    return Err(CompileError::EmptyWeightedAction);
                }
                let name = names.action_name(clusters).ok_or_else(|| {
                    CompileError::UnnamedAction {
                        clusters: clusters
                            .iter()
                            .map(|cw| cw.name.clone())
                            .collect::<Vec<_>>()
                            .join(", "),
                    }
                })?;
                let key = format!("weighted:{}", name);
                if !actions.contains_key(&key) {
                    let mut targets = OrderedMap::new();
                    for cw in clusters {
                        if cw.weight == 0 {
                            return Err(CompileError::InvalidClusterWeight {
                                cluster: cw.name.clone(),
                            });
                        }
                        targets.insert(
                            cw.name.clone(),
                            WeightedTarget {
                                weight: cw.weight,
                                child_policy: vec![LbPolicy::Cds(ClusterPick {
                                    cluster: cw.name.clone(),
                                })],
                            },
                        );
                    }
                    actions.insert(key.clone(), ActionSpec::weighted_target(targets));
                }
                key
            }
        };
        routes.push(route_spec(route, action_key)?);
    }

    Ok(RoutingPolicy { actions, routes })
}

fn route_spec(route: &Route, action: String) -> Result<RouteSpec, CompileError> {
    let headers = route
        .headers
        .iter()
        .map(header_spec)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(RouteSpec {
        path: path_spec(&route.path),
        headers,
        fraction_per_million: route.fraction_per_million,
        action,
    })
}

fn path_spec(matcher: &PathMatcher) -> PathSpec {
    match matcher {
        PathMatcher::Prefix(prefix) => PathSpec::Prefix(prefix.clone()),
        PathMatcher::Exact(path) => PathSpec::Path(path.clone()),
        PathMatcher::Regex(pattern) => PathSpec::Regex(pattern.clone()),
    }
}

fn header_spec(matcher: &HeaderMatcher) -> Result<HeaderSpec, CompileError> {
    let kind = match &matcher.kind {
        HeaderMatchKind::Exact(value) => HeaderKindSpec::Exact(value.clone()),
        HeaderMatchKind::Regex(pattern) => HeaderKindSpec::Regex(pattern.clone()),
        HeaderMatchKind::Range { start, end } => HeaderKindSpec::Range {
            start: *start,
            end: *end,
        },
        HeaderMatchKind::Present(present) => HeaderKindSpec::Present(*present),
        HeaderMatchKind::Prefix(prefix) => HeaderKindSpec::Prefix(prefix.clone()),
        HeaderMatchKind::Suffix(suffix) => HeaderKindSpec::Suffix(suffix.clone()),
        HeaderMatchKind::Contains(_) => {
            return Err(CompileError::UnsupportedHeaderMatch {
                header: matcher.name.clone(),
                kind: "contains",
            })
        }
    };
    Ok(HeaderSpec {
        name: matcher.name.clone(),
        kind,
        invert: matcher.invert,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ClusterWeight, Route};
    use crate::naming::ActionNamer;

    fn compile_fresh(table: &RouteTable) -> Result<RoutingPolicy, CompileError> {
        let plan = ActionNamer::new().plan(table);
        compile(table, &plan)
    }

    #[test]
    fn test_end_to_end_example() {
        let table = RouteTable::new(vec![
            Route::to_cluster(PathMatcher::Prefix("/a".into()), "c1"),
            Route::to_weighted(
                PathMatcher::Prefix("/b".into()),
                vec![ClusterWeight::new("c1", 50), ClusterWeight::new("c2", 50)],
            ),
        ]);
        let policy = compile_fresh(&table).unwrap();

        assert_eq!(
            policy.actions.keys().collect::<Vec<_>>(),
            vec!["cds:c1", "weighted:c1_c2_0"]
        );
        assert_eq!(policy.routes.len(), 2);
        assert_eq!(policy.routes[0].action, "cds:c1");
        assert_eq!(policy.routes[1].action, "weighted:c1_c2_0");

        let json = serde_json::to_value(&policy).unwrap();
        assert_eq!(
            json["actions"]["weighted:c1_c2_0"],
            serde_json::json!({"childPolicy":[{"weighted_target_experimental":{"targets":{
                "c1":{"weight":50,"childPolicy":[{"cds_experimental":{"cluster":"c1"}}]},
                "c2":{"weight":50,"childPolicy":[{"cds_experimental":{"cluster":"c2"}}]}
            }}}]})
        );
    }

    #[test]
    fn test_route_order_preserved() {
        // Ten routes with distinct matchers, in deliberately shuffled
        // path order; the compiled route list must keep input order.
        let order = [7usize, 2, 9, 0, 5, 3, 8, 1, 6, 4];
        let table = RouteTable::new(
            order
                .iter()
                .map(|i| Route::to_cluster(PathMatcher::Prefix(format!("/r{}", i)), format!("c{}", i)))
                .collect(),
        );
        let policy = compile_fresh(&table).unwrap();
        let compiled: Vec<String> = policy.routes.iter().map(|r| r.action.clone()).collect();
        let expected: Vec<String> = order.iter().map(|i| format!("cds:c{}", i)).collect();
        assert_eq!(compiled, expected);
    }

    #[test]
    fn test_duplicate_actions_emitted_once() {
        let table = RouteTable::new(vec![
            Route::to_cluster(PathMatcher::Prefix("/a".into()), "c1"),
            Route::to_cluster(PathMatcher::Prefix("/b".into()), "c1"),
        ]);
        let policy = compile_fresh(&table).unwrap();
        assert_eq!(policy.actions.len(), 1);
        assert_eq!(policy.routes.len(), 2);
    }

    #[test]
    fn test_same_weights_share_one_action() {
        let split = vec![ClusterWeight::new("c1", 50), ClusterWeight::new("c2", 50)];
        let table = RouteTable::new(vec![
            Route::to_weighted(PathMatcher::Prefix("/a".into()), split.clone()),
            Route::to_weighted(PathMatcher::Prefix("/b".into()), split),
        ]);
        let policy = compile_fresh(&table).unwrap();
        assert_eq!(policy.actions.len(), 1);
        assert_eq!(policy.routes[0].action, policy.routes[1].action);
    }

    #[test]
    fn test_cluster_name_cannot_collide_with_weighted_name() {
        // A cluster literally named like an allocator-assigned name still
        // gets its own action entry thanks to the kind prefix.
        let table = RouteTable::new(vec![
            Route::to_cluster(PathMatcher::Prefix("/a".into()), "c1_c2_0"),
            Route::to_weighted(
                PathMatcher::Prefix("/b".into()),
                vec![ClusterWeight::new("c1", 50), ClusterWeight::new("c2", 50)],
            ),
        ]);
        let policy = compile_fresh(&table).unwrap();
        assert!(policy.actions.contains_key("cds:c1_c2_0"));
        assert!(policy.actions.contains_key("weighted:c1_c2_0"));
    }

    #[test]
    fn test_header_matchers_serialized_in_order() {
        let mut route = Route::to_cluster(PathMatcher::Prefix("/a".into()), "c1");
        route.headers = vec![
            HeaderMatcher::new("x-user", HeaderMatchKind::Exact("alice".into())),
            HeaderMatcher {
                name: "x-env".into(),
                kind: HeaderMatchKind::Suffix("-prod".into()),
                invert: true,
            },
        ];
        route.fraction_per_million = Some(500_000);
        let policy = compile_fresh(&RouteTable::new(vec![route])).unwrap();

        let json = serde_json::to_value(&policy.routes[0]).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "prefix": "/a",
                "headers": [
                    {"name":"x-user","exact_match":"alice"},
                    {"name":"x-env","suffix_match":"-prod","invert_match":true}
                ],
                "match_fraction": 500_000,
                "action": "cds:c1"
            })
        );
    }

    #[test]
    fn test_unsupported_header_matcher_is_an_error() {
        let mut route = Route::to_cluster(PathMatcher::Prefix("/a".into()), "c1");
        route.headers = vec![HeaderMatcher::new(
            "x-tag",
            HeaderMatchKind::Contains("beta".into()),
        )];
        let err = compile_fresh(&RouteTable::new(vec![route])).unwrap_err();
        assert!(matches!(err, CompileError::UnsupportedHeaderMatch { .. }));
    }

    #[test]
    fn test_empty_weighted_action_is_an_error() {
        let table = RouteTable::new(vec![Route::to_weighted(
            PathMatcher::Prefix("/a".into()),
            Vec::new(),
        )]);
        let err = compile_fresh(&table).unwrap_err();
        assert!(matches!(err, CompileError::EmptyWeightedAction));
    }

    #[test]
    fn test_zero_weight_is_an_error() {
        let table = RouteTable::new(vec![Route::to_weighted(
            PathMatcher::Prefix("/a".into()),
            vec![ClusterWeight::new("c1", 0), ClusterWeight::new("c2", 100)],
        )]);
        let err = compile_fresh(&table).unwrap_err();
        assert!(matches!(err, CompileError::InvalidClusterWeight { .. }));
    }

    #[test]
    fn test_mismatched_plan_is_an_error() {
        let empty_plan = ActionNamer::new().plan(&RouteTable::default());
        let table = RouteTable::new(vec![Route::to_weighted(
            PathMatcher::Prefix("/a".into()),
            vec![ClusterWeight::new("c1", 50), ClusterWeight::new("c2", 50)],
        )]);
        let err = compile(&table, &empty_plan).unwrap_err();
        assert!(matches!(err, CompileError::UnnamedAction { .. }));
    }
}

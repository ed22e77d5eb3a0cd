//! Cluster connector: joins the clusters left over by the primary pass.
//!
//! Phase A repeatedly takes the globally closest pair of systems in
//! different clusters and, if within the largest search tier, links them
//! with the same tiered rule as the primary pass.
//!
//! Phase B handles what is still separate. Cluster pairs are tried in order
//! of closest approach; a pair within red range gets one direct RED link,
//! otherwise the best route over the red-range graph is laid down as a
//! chain of RED hops with every relay turned into a bridge. After each
//! success the cluster set is rebuilt and the scan starts over.

use std::collections::{HashMap, HashSet};

use log::{debug, trace};

use crate::connection::LinkKind;
use crate::geometry::sq_within;
use crate::network::Network;
use crate::pathfinding::{JumpGraph, Route};

/// Tally of Phase A.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub merges: usize,
    /// Closest pairs whose tiered rule produced no link.
    pub rejected: usize,
}

/// Tally of Phase B.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtendStats {
    pub direct: usize,
    pub chains: usize,
    pub chain_hops: usize,
    /// Cluster pairs with no route under the red range.
    pub unreachable: usize,
}

pub(crate) fn merge_clusters(net: &mut Network) -> MergeStats {
    let range = net.rules.max_search_radius();
    let mut rejected: HashSet<(usize, usize)> = HashSet::new();
    let mut stats = MergeStats::default();

    loop {
        let members = net.networked();
        let mut best: Option<(f64, usize, usize)> = None;
        for (i, &a) in members.iter().enumerate() {
            for &b in &members[i + 1..] {
                if rejected.contains(&(a, b)) || net.links.connected(a, b) {
                    continue;
                }
                let d2 = net.dist_sq(a, b);
                if !sq_within(d2, range) {
                    continue;
                }
                if best.map_or(true, |(bd, _, _)| d2.total_cmp(&bd).is_lt()) {
                    best = Some((d2, a, b));
                }
            }
        }
        let Some((_, a, b)) = best else {
            break;
        };

        // Lower rank initiates, unless it is a bridge.
        let (mut s, mut t) = if net.outranks(b, a) { (a, b) } else { (b, a) };
        if net.systems[s].is_bridge {
            std::mem::swap(&mut s, &mut t);
        }
        if net.systems[s].is_bridge {
            trace!(
                "phase A: {} and {} are both bridges",
                net.systems[a].id,
                net.systems[b].id
            );
            rejected.insert((a, b));
            stats.rejected += 1;
            continue;
        }

        if net.tiered_link(s, t).linked() {
            stats.merges += 1;
        } else {
            trace!(
                "phase A: no link between {} and {}",
                net.systems[s].id,
                net.systems[t].id
            );
            rejected.insert((a, b));
            stats.rejected += 1;
        }
    }

    debug!(
        "phase A: {} merges, {} rejected pairs",
        stats.merges, stats.rejected
    );
    stats
}

/// Closest approach between two clusters.
struct ClusterPair {
    dist_sq: f64,
    left: usize,
    right: usize,
    a: usize,
    b: usize,
}

/// Closest system pair for every pair of groups, in scan order.
fn closest_pairs(net: &Network, groups: &[Vec<usize>]) -> Vec<ClusterPair> {
    let mut group_of: HashMap<usize, usize> = HashMap::new();
    for (g, members) in groups.iter().enumerate() {
        for &m in members {
            group_of.insert(m, g);
        }
    }
    let mut all: Vec<usize> = group_of.keys().copied().collect();
    all.sort_unstable();

    let mut best: HashMap<(usize, usize), ClusterPair> = HashMap::new();
    for (i, &a) in all.iter().enumerate() {
        for &b in &all[i + 1..] {
            let (ga, gb) = (group_of[&a], group_of[&b]);
            if ga == gb {
                continue;
            }
            let key = (ga.min(gb), ga.max(gb));
            let d2 = net.dist_sq(a, b);
            let entry = best.entry(key).or_insert(ClusterPair {
                dist_sq: f64::INFINITY,
                left: key.0,
                right: key.1,
                a,
                b,
            });
            if d2.total_cmp(&entry.dist_sq).is_lt() {
                entry.dist_sq = d2;
                entry.a = a;
                entry.b = b;
            }
        }
    }

    let mut pairs: Vec<ClusterPair> = best.into_values().collect();
    pairs.sort_by(|x, y| {
        x.dist_sq
            .total_cmp(&y.dist_sq)
            .then_with(|| x.left.cmp(&y.left))
            .then_with(|| x.right.cmp(&y.right))
    });
    pairs
}

/// Lay a route down as RED hops, initiated from the lower-ranked end.
fn lay_chain(net: &mut Network, route: &Route) {
    let mut nodes = route.nodes.clone();
    let (first, last) = (nodes[0], nodes[nodes.len() - 1]);
    if net.outranks(first, last) {
        nodes.reverse();
    }
    for hop in nodes.windows(2) {
        net.link(hop[0], hop[1], LinkKind::Red);
    }
    for &relay in route.intermediates() {
        net.mark_bridge(relay, (nodes[0], nodes[nodes.len() - 1]));
    }
}

pub(crate) fn extend_clusters(net: &mut Network, graph: &JumpGraph) -> ExtendStats {
    let red_range = net.rules.red_range;
    // (first member, size) of each side; clusters only grow, so a key that
    // still matches names the same two clusters.
    let mut unreachable: HashSet<((usize, usize), (usize, usize))> = HashSet::new();
    let mut stats = ExtendStats::default();

    loop {
        let members = net.networked();
        let groups = net.links.groups(&members);
        if groups.len() < 2 {
            break;
        }

        let mut progressed = false;
        for pair in closest_pairs(net, &groups) {
            let left = &groups[pair.left];
            let right = &groups[pair.right];
            let key = ((left[0], left.len()), (right[0], right.len()));
            if unreachable.contains(&key) {
                continue;
            }

            if sq_within(pair.dist_sq, red_range) {
                let (s, t) = if net.outranks(pair.b, pair.a) {
                    (pair.a, pair.b)
                } else {
                    (pair.b, pair.a)
                };
                trace!(
                    "phase B: direct red {} → {}",
                    net.systems[s].id,
                    net.systems[t].id
                );
                net.link(s, t, LinkKind::Red);
                stats.direct += 1;
                progressed = true;
                break;
            }

            let mut in_right = vec![false; net.len()];
            for &m in right {
                in_right[m] = true;
            }
            let route = {
                let systems = &net.systems;
                graph.find_route(left, |n| in_right[n], |n| systems[n].population.is_none())
            };
            match route {
                Some(route) => {
                    trace!(
                        "phase B: {}-hop chain from {} to {}",
                        route.hops(),
                        net.systems[route.nodes[0]].id,
                        net.systems[route.nodes[route.nodes.len() - 1]].id
                    );
                    stats.chains += 1;
                    stats.chain_hops += route.hops();
                    lay_chain(net, &route);
                    progressed = true;
                    break;
                }
                None => {
                    unreachable.insert(key);
                    stats.unreachable += 1;
                }
            }
        }

        if !progressed {
            break;
        }
    }

    debug!(
        "phase B: {} direct red links, {} chains ({} hops), {} unreachable cluster pairs",
        stats.direct, stats.chains, stats.chain_hops, stats.unreachable
    );
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vec3;
    use crate::primary::connect_primary;
    use crate::region::{Region, RegionBounds, StarSystem};
    use crate::rules::GateRules;

    fn region(systems: Vec<StarSystem>) -> Region {
        Region::new(RegionBounds::sector("Test"), systems).unwrap()
    }

    fn links<'a>(net: &'a Network<'_>) -> Vec<(&'a str, &'a str, LinkKind)> {
        net.connections
            .iter()
            .map(|c| (c.source.as_str(), c.destination.as_str(), c.kind))
            .collect()
    }

    #[test]
    fn test_phase_a_idle_when_primary_links_everything() {
        let region = region(vec![
            StarSystem::new("a1", Vec3::new(0.0, 0.0, 0.0), Some(100)),
            StarSystem::new("a2", Vec3::new(-3.0, 0.0, 0.0), Some(50)),
            StarSystem::new("b1", Vec3::new(6.0, 0.0, 0.0), Some(100)),
        ]);
        let rules = GateRules::default();
        let mut net = Network::from_region(&region, &rules);
        connect_primary(&mut net);
        // a2 → a1 green; a1 → b1 (b1 outranks a1 on id) orange at 6 pc.
        assert_eq!(
            links(&net),
            vec![("a2", "a1", LinkKind::Green), ("a1", "b1", LinkKind::Orange)]
        );
        let stats = merge_clusters(&mut net);
        assert_eq!(stats, MergeStats::default());
    }

    #[test]
    fn test_phase_a_uses_closest_pair_across_clusters() {
        // Primary leaves "hi" and "east" (8.5 pc, no bridge) apart; phase A
        // rejects the same pair and phase B links it directly.
        let region = region(vec![
            StarSystem::new("hi", Vec3::new(0.0, 0.0, 0.0), Some(100_000)),
            StarSystem::new("east", Vec3::new(8.5, 0.0, 0.0), Some(10_000)),
            StarSystem::new("gap", Vec3::new(4.25, 3.0, 0.0), None),
        ]);
        let rules = GateRules::default();
        let mut net = Network::from_region(&region, &rules);
        connect_primary(&mut net);
        // gap is 5.2 pc from both, so no bridge and no link in the primary pass.
        assert!(net.connections.is_empty());

        let stats = merge_clusters(&mut net);
        assert_eq!(stats.merges, 0);
        assert_eq!(stats.rejected, 1);

        let graph = JumpGraph::build(
            &net.systems.iter().map(|s| s.position).collect::<Vec<_>>(),
            rules.red_range,
        );
        let ext = extend_clusters(&mut net, &graph);
        assert_eq!(ext.direct, 1);
        assert_eq!(links(&net), vec![("east", "hi", LinkKind::Red)]);
    }

    #[test]
    fn test_phase_a_bridges_between_clusters() {
        // a_top has nothing above it within 9 pc; b_low links up to b_top.
        // Phase A then joins a_top and b_low through the gap system.
        let region = region(vec![
            StarSystem::new("a_top", Vec3::new(0.0, 0.0, 0.0), Some(50_000)),
            StarSystem::new("b_low", Vec3::new(8.0, 0.0, 0.0), Some(20_000)),
            StarSystem::new("b_top", Vec3::new(14.0, 0.0, 0.0), Some(90_000)),
            StarSystem::new("gap", Vec3::new(4.0, 0.0, 0.0), None),
        ]);
        let rules = GateRules::default();
        let mut net = Network::from_region(&region, &rules);
        connect_primary(&mut net);
        assert_eq!(links(&net), vec![("b_low", "b_top", LinkKind::Orange)]);

        let stats = merge_clusters(&mut net);
        assert_eq!(stats.merges, 1);
        assert_eq!(
            links(&net)[1..],
            [
                ("b_low", "gap", LinkKind::Yellow),
                ("gap", "a_top", LinkKind::Yellow),
            ]
        );
        let gap = &net.systems[net.index_of(&"gap".into()).unwrap()];
        assert_eq!(gap.false_population, Some(40_000));
    }

    #[test]
    fn test_phase_b_chain_turns_relays_into_bridges() {
        // Two clusters 20 pc apart, relays at 7 and 14 pc.
        let region = region(vec![
            StarSystem::new("w1", Vec3::new(0.0, 0.0, 0.0), Some(20_000)),
            StarSystem::new("w2", Vec3::new(-4.0, 0.0, 0.0), Some(5_000)),
            StarSystem::new("e1", Vec3::new(21.0, 0.0, 0.0), Some(60_000)),
            StarSystem::new("r1", Vec3::new(7.0, 0.0, 0.0), None),
            StarSystem::new("r2", Vec3::new(14.0, 0.0, 0.0), None),
        ]);
        let rules = GateRules::default();
        let mut net = Network::from_region(&region, &rules);
        connect_primary(&mut net);
        merge_clusters(&mut net);
        assert_eq!(links(&net), vec![("w2", "w1", LinkKind::Green)]);

        let graph = JumpGraph::build(
            &net.systems.iter().map(|s| s.position).collect::<Vec<_>>(),
            rules.red_range,
        );
        let stats = extend_clusters(&mut net, &graph);
        assert_eq!(stats.chains, 1);
        assert_eq!(stats.chain_hops, 3);
        assert_eq!(
            links(&net)[1..],
            [
                ("w1", "r1", LinkKind::Red),
                ("r1", "r2", LinkKind::Red),
                ("r2", "e1", LinkKind::Red),
            ]
        );
        for relay in ["r1", "r2"] {
            let sys = &net.systems[net.index_of(&relay.into()).unwrap()];
            assert!(sys.is_bridge);
            assert_eq!(sys.false_population, Some(50_000));
        }
    }

    fn red_graph(net: &Network) -> JumpGraph {
        let positions: Vec<_> = net.systems.iter().map(|s| s.position).collect();
        JumpGraph::build(&positions, net.rules.red_range)
    }

    #[test]
    fn test_phase_a_rejects_pair_of_bridges() {
        // b1 and b2 are the only systems within 9 pc of each other.
        let region = region(vec![
            StarSystem::new("p1", Vec3::new(0.0, 0.0, 0.0), Some(1_000)),
            StarSystem::new("b1", Vec3::new(20.0, 0.0, 0.0), None),
            StarSystem::new("b2", Vec3::new(26.0, 0.0, 0.0), None),
            StarSystem::new("p2", Vec3::new(46.0, 0.0, 0.0), Some(2_000)),
        ]);
        let rules = GateRules::default();
        let mut net = Network::from_region(&region, &rules);
        let (b1, b2) = (0, 1);
        let (p1, p2) = (2, 3);
        net.mark_bridge(b1, (p1, p2));
        net.mark_bridge(b2, (p1, p2));

        let stats = merge_clusters(&mut net);
        assert_eq!(stats, MergeStats { merges: 0, rejected: 1 });
        assert!(net.connections.is_empty());
        assert_eq!(net.systems[b1].false_population, Some(-8_000));
    }

    #[test]
    fn test_chain_through_existing_bridge_keeps_first_false_population() {
        let region = region(vec![
            StarSystem::new("w", Vec3::new(0.0, 0.0, 0.0), Some(20_000)),
            StarSystem::new("r", Vec3::new(9.0, 0.0, 0.0), None),
            StarSystem::new("e", Vec3::new(18.0, 0.0, 0.0), Some(60_000)),
            StarSystem::new("x", Vec3::new(9.0, 30.0, 0.0), Some(200_000)),
        ]);
        let rules = GateRules::default();
        let mut net = Network::from_region(&region, &rules);
        let (e, r, w, x) = (0, 1, 2, 3);
        net.mark_bridge(r, (w, x));
        assert_eq!(net.systems[r].false_population, Some(190_000));

        let route = Route {
            nodes: vec![e, r, w],
            total_distance: 18.0,
        };
        lay_chain(&mut net, &route);
        assert_eq!(
            links(&net),
            vec![("w", "r", LinkKind::Red), ("r", "e", LinkKind::Red)]
        );
        let relay = &net.systems[r];
        assert_eq!(relay.false_population, Some(190_000));
        assert_eq!(relay.bridge_between, Some(("w".into(), "x".into())));
    }

    #[test]
    fn test_phase_b_retries_pair_after_a_side_grows() {
        // l and r are 11 pc apart with no relay path between them. m reaches
        // l through a1/a2 and r through b1/b2, so once m joins either side
        // the l–r pair becomes reachable.
        let region = region(vec![
            StarSystem::new("l", Vec3::new(0.0, 0.0, 0.0), Some(1_000)),
            StarSystem::new("r", Vec3::new(11.0, 0.0, 0.0), Some(2_000)),
            StarSystem::new("m", Vec3::new(5.5, 21.0, 0.0), Some(3_000)),
            StarSystem::new("a1", Vec3::new(-1.0, 9.0, 0.0), None),
            StarSystem::new("a2", Vec3::new(-2.0, 18.0, 0.0), None),
            StarSystem::new("b1", Vec3::new(12.0, 9.0, 0.0), None),
            StarSystem::new("b2", Vec3::new(13.0, 18.0, 0.0), None),
        ]);
        let rules = GateRules::default();
        let mut net = Network::from_region(&region, &rules);
        connect_primary(&mut net);
        merge_clusters(&mut net);
        assert!(net.connections.is_empty());

        let graph = red_graph(&net);
        let stats = extend_clusters(&mut net, &graph);
        assert_eq!(
            stats,
            ExtendStats {
                direct: 0,
                chains: 2,
                chain_hops: 6,
                unreachable: 1,
            }
        );
        assert_eq!(
            links(&net),
            vec![
                ("l", "a1", LinkKind::Red),
                ("a1", "a2", LinkKind::Red),
                ("a2", "m", LinkKind::Red),
                ("r", "b1", LinkKind::Red),
                ("b1", "b2", LinkKind::Red),
                ("b2", "m", LinkKind::Red),
            ]
        );
        let members = net.networked();
        assert_eq!(net.links.groups(&members).len(), 1);
        for relay in ["a1", "a2", "b1", "b2"] {
            let sys = &net.systems[net.index_of(&relay.into()).unwrap()];
            assert_eq!(sys.false_population, Some(-7_000));
        }
    }

    #[test]
    fn test_phase_b_unreachable_pair_left_apart() {
        let region = region(vec![
            StarSystem::new("a", Vec3::new(0.0, 0.0, 0.0), Some(20_000)),
            StarSystem::new("b", Vec3::new(30.0, 0.0, 0.0), Some(60_000)),
            StarSystem::new("r", Vec3::new(10.0, 0.0, 0.0), None),
        ]);
        let rules = GateRules::default();
        let mut net = Network::from_region(&region, &rules);
        connect_primary(&mut net);
        merge_clusters(&mut net);
        let graph = JumpGraph::build(
            &net.systems.iter().map(|s| s.position).collect::<Vec<_>>(),
            rules.red_range,
        );
        let stats = extend_clusters(&mut net, &graph);
        assert_eq!(stats.unreachable, 1);
        assert!(net.connections.is_empty());
        assert!(!net.systems.iter().any(|s| s.is_bridge));
    }
}

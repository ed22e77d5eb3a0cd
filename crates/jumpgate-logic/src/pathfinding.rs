//! Route search over the extended-range jump graph.
//!
//! `JumpGraph` holds a pre-built adjacency list with an edge between every
//! pair of systems within range, and finds the route with the fewest hops
//! (ties: shortest total distance, then lowest node index) from any of a
//! set of sources to any accepted target.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use crate::geometry::{distance_sq, sq_within, Vec3};

/// Hop count first, then accumulated distance.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Cost {
    hops: u32,
    distance: f64,
}

impl Eq for Cost {}

impl Ord for Cost {
    fn cmp(&self, other: &Self) -> Ordering {
        self.hops
            .cmp(&other.hops)
            .then_with(|| self.distance.total_cmp(&other.distance))
    }
}

impl PartialOrd for Cost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A route through the graph, endpoints included.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub nodes: Vec<usize>,
    pub total_distance: f64,
}

impl Route {
    pub fn hops(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    /// Nodes strictly between the two endpoints.
    pub fn intermediates(&self) -> &[usize] {
        if self.nodes.len() <= 2 {
            &[]
        } else {
            &self.nodes[1..self.nodes.len() - 1]
        }
    }
}

/// Graph over all systems with an edge for every pair within `range`.
pub struct JumpGraph {
    /// node → list of (neighbor, distance), neighbors ascending.
    adj: Vec<Vec<(usize, f64)>>,
}

impl JumpGraph {
    /// Build the graph from node positions. O(n²) in the node count.
    pub fn build(positions: &[Vec3], range: f64) -> Self {
        let mut adj: Vec<Vec<(usize, f64)>> = vec![Vec::new(); positions.len()];
        for i in 0..positions.len() {
            for j in (i + 1)..positions.len() {
                let d2 = distance_sq(positions[i], positions[j]);
                if sq_within(d2, range) {
                    let d = d2.sqrt();
                    adj[i].push((j, d));
                    adj[j].push((i, d));
                }
            }
        }
        for list in &mut adj {
            list.sort_by_key(|&(n, _)| n);
        }
        Self { adj }
    }

    pub fn neighbors(&self, node: usize) -> &[(usize, f64)] {
        self.adj.get(node).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn edge_count(&self) -> usize {
        self.adj.iter().map(|v| v.len()).sum::<usize>() / 2
    }

    /// Find the best route from any node in `sources` to any node accepted by
    /// `is_target`. Only nodes accepted by `can_relay` may appear between the
    /// endpoints. Returns `None` if no target is reachable.
    pub fn find_route<T, R>(&self, sources: &[usize], is_target: T, can_relay: R) -> Option<Route>
    where
        T: Fn(usize) -> bool,
        R: Fn(usize) -> bool,
    {
        let n = self.adj.len();
        let mut best: Vec<Option<Cost>> = vec![None; n];
        let mut prev: Vec<Option<usize>> = vec![None; n];
        let mut settled = vec![false; n];
        let source_set: HashSet<usize> = sources.iter().copied().filter(|&s| s < n).collect();
        let mut heap = BinaryHeap::new();

        for &s in &source_set {
            let start = Cost {
                hops: 0,
                distance: 0.0,
            };
            best[s] = Some(start);
            heap.push(std::cmp::Reverse((start, s)));
        }

        while let Some(std::cmp::Reverse((cost, node))) = heap.pop() {
            if settled[node] {
                continue;
            }
            settled[node] = true;

            if !source_set.contains(&node) {
                if is_target(node) {
                    return Some(Self::unwind(&prev, node, cost.distance));
                }
                if !can_relay(node) {
                    continue;
                }
            }

            for &(next, d) in self.neighbors(node) {
                if settled[next] || source_set.contains(&next) {
                    continue;
                }
                if !is_target(next) && !can_relay(next) {
                    continue;
                }
                let candidate = Cost {
                    hops: cost.hops + 1,
                    distance: cost.distance + d,
                };
                if best[next].map_or(true, |b| candidate < b) {
                    best[next] = Some(candidate);
                    prev[next] = Some(node);
                    heap.push(std::cmp::Reverse((candidate, next)));
                }
            }
        }

        None
    }

    fn unwind(prev: &[Option<usize>], end: usize, total_distance: f64) -> Route {
        let mut nodes = vec![end];
        let mut cur = end;
        while let Some(p) = prev[cur] {
            nodes.push(p);
            cur = p;
        }
        nodes.reverse();
        Route {
            nodes,
            total_distance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(xs: &[f64]) -> Vec<Vec3> {
        xs.iter().map(|&x| Vec3::new(x, 0.0, 0.0)).collect()
    }

    #[test]
    fn test_edges_respect_range() {
        let graph = JumpGraph::build(&line(&[0.0, 10.0, 20.5]), 10.0);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.neighbors(0), &[(1, 10.0)]);
        assert!(graph.neighbors(2).is_empty());
        assert!(graph.neighbors(99).is_empty());
    }

    #[test]
    fn test_multi_hop() {
        // 0 --8-- 1 --8-- 2 --8-- 3
        let graph = JumpGraph::build(&line(&[0.0, 8.0, 16.0, 24.0]), 10.0);
        let route = graph.find_route(&[0], |n| n == 3, |_| true).unwrap();
        assert_eq!(route.nodes, vec![0, 1, 2, 3]);
        assert_eq!(route.hops(), 3);
        assert_eq!(route.intermediates(), &[1, 2]);
        assert_eq!(route.total_distance, 24.0);
    }

    #[test]
    fn test_unreachable() {
        let graph = JumpGraph::build(&line(&[0.0, 8.0, 30.0]), 10.0);
        assert_eq!(graph.find_route(&[0], |n| n == 2, |_| true), None);
    }

    #[test]
    fn test_relay_filter_blocks_path() {
        let graph = JumpGraph::build(&line(&[0.0, 8.0, 16.0]), 10.0);
        assert_eq!(graph.find_route(&[0], |n| n == 2, |n| n != 1), None);
    }

    #[test]
    fn test_fewest_hops_beats_shorter_distance() {
        // Direct 0→3 is one 9.9 pc hop; 0→1→2→3 is three short hops.
        let positions = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(3.0, 0.5, 0.0),
            Vec3::new(6.0, 0.5, 0.0),
            Vec3::new(9.9, 0.0, 0.0),
        ];
        let graph = JumpGraph::build(&positions, 10.0);
        let route = graph.find_route(&[0], |n| n == 3, |_| true).unwrap();
        assert_eq!(route.nodes, vec![0, 3]);
    }

    #[test]
    fn test_equal_hops_prefers_shorter_total() {
        //        1 (detour)
        //  0           3
        //        2 (straight)
        let positions = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(6.0, 5.0, 0.0),
            Vec3::new(6.0, 0.5, 0.0),
            Vec3::new(12.0, 0.0, 0.0),
        ];
        let graph = JumpGraph::build(&positions, 10.0);
        let route = graph.find_route(&[0], |n| n == 3, |_| true).unwrap();
        assert_eq!(route.nodes, vec![0, 2, 3]);
    }

    #[test]
    fn test_multiple_sources_and_targets() {
        // Sources {0, 1}, targets {4, 5}; 1 is closest to the relay 2 → 4.
        let graph = JumpGraph::build(&line(&[-20.0, 0.0, 9.0, 40.0, 18.0, 60.0]), 10.0);
        let route = graph
            .find_route(&[0, 1], |n| n == 4 || n == 5, |n| n == 2)
            .unwrap();
        assert_eq!(route.nodes, vec![1, 2, 4]);
    }

    #[test]
    fn test_source_is_never_target() {
        let graph = JumpGraph::build(&line(&[0.0, 5.0]), 10.0);
        let route = graph.find_route(&[0, 1], |n| n == 1, |_| true);
        assert_eq!(route, None);
    }
}

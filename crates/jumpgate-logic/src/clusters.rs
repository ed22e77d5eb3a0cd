//! Cluster identification: connected components over the link set.
//!
//! The calculator keeps a [`UnionFind`] over its working table and unions
//! endpoints as links are emitted. [`identify_clusters`] recomputes the
//! partition from scratch for a finished map.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::connection::Connection;
use crate::network::SystemState;
use crate::region::SystemId;

/// Disjoint-set forest over `0..n` with path halving and union by size.
#[derive(Debug, Clone)]
pub struct UnionFind {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl UnionFind {
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            size: vec![1; n],
        }
    }

    pub fn find(&mut self, mut i: usize) -> usize {
        while self.parent[i] != i {
            self.parent[i] = self.parent[self.parent[i]];
            i = self.parent[i];
        }
        i
    }

    /// Merge the sets holding `a` and `b`. Returns false if already merged.
    pub fn union(&mut self, a: usize, b: usize) -> bool {
        let mut ra = self.find(a);
        let mut rb = self.find(b);
        if ra == rb {
            return false;
        }
        if self.size[ra] < self.size[rb] || (self.size[ra] == self.size[rb] && rb < ra) {
            std::mem::swap(&mut ra, &mut rb);
        }
        self.parent[rb] = ra;
        self.size[ra] += self.size[rb];
        true
    }

    pub fn connected(&mut self, a: usize, b: usize) -> bool {
        self.find(a) == self.find(b)
    }

    /// Partition `members` by root. Groups keep the order of `members` and
    /// are ordered by their first member.
    pub fn groups(&mut self, members: &[usize]) -> Vec<Vec<usize>> {
        let mut slot: HashMap<usize, usize> = HashMap::new();
        let mut groups: Vec<Vec<usize>> = Vec::new();
        for &m in members {
            let root = self.find(m);
            let idx = *slot.entry(root).or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
            groups[idx].push(m);
        }
        groups
    }
}

/// A maximal set of systems transitively linked by connections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    /// Member ids, ascending.
    pub members: Vec<SystemId>,
}

impl Cluster {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, id: &SystemId) -> bool {
        self.members.binary_search(id).is_ok()
    }
}

/// Connected components over `connections`.
///
/// Every networked system (populated or bridge) belongs to exactly one
/// cluster, a singleton if it has no links. Unpopulated systems that were
/// never used as a bridge only appear if some connection touches them.
/// Clusters are ordered by their lowest member id. Connections naming
/// unknown systems are ignored.
pub fn identify_clusters(systems: &[SystemState], connections: &[Connection]) -> Vec<Cluster> {
    let mut order: Vec<usize> = (0..systems.len()).collect();
    order.sort_by(|&a, &b| systems[a].id.cmp(&systems[b].id));

    let index: HashMap<&SystemId, usize> = systems
        .iter()
        .enumerate()
        .map(|(i, s)| (&s.id, i))
        .collect();

    let mut uf = UnionFind::new(systems.len());
    let mut linked = vec![false; systems.len()];
    for c in connections {
        if let (Some(&a), Some(&b)) = (index.get(&c.source), index.get(&c.destination)) {
            uf.union(a, b);
            linked[a] = true;
            linked[b] = true;
        }
    }

    let members: Vec<usize> = order
        .into_iter()
        .filter(|&i| systems[i].is_networked() || linked[i])
        .collect();

    uf.groups(&members)
        .into_iter()
        .map(|group| Cluster {
            members: group.into_iter().map(|i| systems[i].id.clone()).collect(),
        })
        .collect()
}

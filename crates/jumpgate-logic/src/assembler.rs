//! Result assembly and orphan detection.
//!
//! `JumpMap` is the immutable output of one compute run: every link in
//! generation order, the orphan set, and the final system table with
//! bridge state.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::clusters::{identify_clusters, Cluster};
use crate::connection::{Connection, LinkKind};
use crate::network::{Network, SystemState};
use crate::region::{RegionBounds, SystemId};

/// The computed jump-gate network for one region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JumpMap {
    pub bounds: RegionBounds,
    /// Links in the order they were generated.
    pub connections: Vec<Connection>,
    /// Systems with no links at all.
    pub orphans: BTreeSet<SystemId>,
    /// Final system table, ordered by id.
    pub systems: Vec<SystemState>,
}

/// Counts for logging and display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapSummary {
    pub systems: usize,
    pub green: usize,
    pub yellow: usize,
    pub orange: usize,
    pub red: usize,
    pub bridges: usize,
    pub orphans: usize,
    pub clusters: usize,
}

impl MapSummary {
    pub fn connections(&self) -> usize {
        self.green + self.yellow + self.orange + self.red
    }
}

impl JumpMap {
    pub fn system(&self, id: &SystemId) -> Option<&SystemState> {
        self.systems
            .binary_search_by(|s| s.id.cmp(id))
            .ok()
            .map(|i| &self.systems[i])
    }

    /// Number of links touching `id`, in either direction.
    pub fn degree(&self, id: &SystemId) -> usize {
        self.connections.iter().filter(|c| c.touches(id)).count()
    }

    pub fn connections_of<'a>(&'a self, id: &'a SystemId) -> impl Iterator<Item = &'a Connection> {
        self.connections.iter().filter(move |c| c.touches(id))
    }

    pub fn bridges(&self) -> impl Iterator<Item = &SystemState> {
        self.systems.iter().filter(|s| s.is_bridge)
    }

    /// Connected components of the final link set.
    pub fn clusters(&self) -> Vec<Cluster> {
        identify_clusters(&self.systems, &self.connections)
    }

    pub fn count(&self, kind: LinkKind) -> usize {
        self.connections.iter().filter(|c| c.kind == kind).count()
    }

    pub fn summary(&self) -> MapSummary {
        MapSummary {
            systems: self.systems.len(),
            green: self.count(LinkKind::Green),
            yellow: self.count(LinkKind::Yellow),
            orange: self.count(LinkKind::Orange),
            red: self.count(LinkKind::Red),
            bridges: self.bridges().count(),
            orphans: self.orphans.len(),
            clusters: self.clusters().len(),
        }
    }
}

/// Ids of systems that no connection touches.
pub fn find_orphans(systems: &[SystemState], connections: &[Connection]) -> BTreeSet<SystemId> {
    let mut degree: HashMap<&SystemId, usize> = systems.iter().map(|s| (&s.id, 0)).collect();
    for c in connections {
        for end in [&c.source, &c.destination] {
            if let Some(d) = degree.get_mut(end) {
                *d += 1;
            }
        }
    }
    degree
        .into_iter()
        .filter(|&(_, d)| d == 0)
        .map(|(id, _)| id.clone())
        .collect()
}

pub(crate) fn assemble(net: Network, bounds: RegionBounds) -> JumpMap {
    let orphans = find_orphans(&net.systems, &net.connections);
    JumpMap {
        bounds,
        connections: net.connections,
        orphans,
        systems: net.systems,
    }
}

//! The calculator's working copy of the system table.
//!
//! A `Network` is owned by a single compute run. It carries the bridge
//! state of every system, the links emitted so far (in generation order)
//! and a union-find over the systems those links join. The shared link
//! rule used by both the primary pass and Phase A merging lives here.

use log::trace;
use serde::{Deserialize, Serialize};

use crate::clusters::UnionFind;
use crate::connection::{Connection, LinkKind};
use crate::geometry::{distance, distance_sq, indices_within, sq_within, Vec3};
use crate::region::{Region, SystemId};
use crate::rules::GateRules;

/// A system as it stands after (or during) a compute run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemState {
    pub id: SystemId,
    pub position: Vec3,
    /// Real population; `None` if unpopulated.
    pub population: Option<u64>,
    pub is_bridge: bool,
    /// Synthetic population assigned when the system became a bridge.
    pub false_population: Option<i64>,
    /// Real population, or the false population for a bridge.
    pub effective_population: Option<i64>,
    /// The two systems this bridge was created to serve.
    pub bridge_between: Option<(SystemId, SystemId)>,
}

impl SystemState {
    pub fn new(id: impl Into<SystemId>, position: Vec3, population: Option<u64>) -> Self {
        Self {
            id: id.into(),
            position,
            population,
            is_bridge: false,
            false_population: None,
            effective_population: population.map(|p| i64::try_from(p).unwrap_or(i64::MAX)),
            bridge_between: None,
        }
    }

    /// Turn this system into a bridge serving `ends`.
    pub fn set_bridge(&mut self, false_population: i64, ends: (SystemId, SystemId)) {
        self.is_bridge = true;
        self.false_population = Some(false_population);
        self.effective_population = Some(false_population);
        self.bridge_between = Some(ends);
    }

    /// Populated systems and bridges take part in the gate network.
    pub fn is_networked(&self) -> bool {
        self.effective_population.is_some()
    }

    /// Unpopulated and not yet pressed into service.
    pub fn is_bridge_candidate(&self) -> bool {
        self.population.is_none() && !self.is_bridge
    }
}

/// What the tiered link rule did for one source/target pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LinkOutcome {
    Green,
    Bridged { bridge: usize },
    Orange,
    Unlinked,
}

impl LinkOutcome {
    pub(crate) fn linked(self) -> bool {
        !matches!(self, LinkOutcome::Unlinked)
    }
}

pub(crate) struct Network<'r> {
    pub rules: &'r GateRules,
    /// Sorted by id, so lower index means lower id.
    pub systems: Vec<SystemState>,
    pub connections: Vec<Connection>,
    pub links: UnionFind,
}

impl<'r> Network<'r> {
    pub fn from_region(region: &Region, rules: &'r GateRules) -> Self {
        let mut systems: Vec<SystemState> = region
            .systems()
            .iter()
            .map(|s| SystemState::new(s.id.clone(), s.position, s.population))
            .collect();
        systems.sort_by(|a, b| a.id.cmp(&b.id));
        Self {
            rules,
            links: UnionFind::new(systems.len()),
            systems,
            connections: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    #[cfg(test)]
    pub fn index_of(&self, id: &SystemId) -> Option<usize> {
        self.systems.binary_search_by(|s| s.id.cmp(id)).ok()
    }

    pub fn dist_sq(&self, a: usize, b: usize) -> f64 {
        distance_sq(self.systems[a].position, self.systems[b].position)
    }

    pub fn dist(&self, a: usize, b: usize) -> f64 {
        distance(self.systems[a].position, self.systems[b].position)
    }

    /// Ordering key for networked systems: effective population, then id.
    pub fn rank(&self, i: usize) -> Option<(i64, usize)> {
        self.systems[i].effective_population.map(|p| (p, i))
    }

    pub fn outranks(&self, a: usize, b: usize) -> bool {
        match (self.rank(a), self.rank(b)) {
            (Some(ra), Some(rb)) => ra > rb,
            (Some(_), None) => true,
            _ => false,
        }
    }

    /// Indices within `radius` of system `i` (excluding `i`) that satisfy `pred`.
    pub fn within<P>(&self, i: usize, radius: f64, pred: P) -> Vec<usize>
    where
        P: Fn(usize, &SystemState) -> bool,
    {
        let origin = self.systems[i].position;
        indices_within(self.systems.iter().map(|s| s.position), origin, radius)
            .filter(|&j| j != i && pred(j, &self.systems[j]))
            .collect()
    }

    pub fn networked(&self) -> Vec<usize> {
        (0..self.systems.len())
            .filter(|&i| self.systems[i].is_networked())
            .collect()
    }

    /// Unpopulated non-bridge system within a bridge leg of both `s` and `t`,
    /// minimising the summed legs (ties: lowest id).
    pub fn find_bridge(&self, s: usize, t: usize) -> Option<usize> {
        let leg = self.rules.bridge_leg;
        let mut best: Option<(f64, usize)> = None;
        for b in self.within(s, leg, |b, sys| b != t && sys.is_bridge_candidate()) {
            if !sq_within(self.dist_sq(t, b), leg) {
                continue;
            }
            let total = self.dist(s, b) + self.dist(t, b);
            let better = match best {
                None => true,
                Some((bt, _)) => total.total_cmp(&bt).is_lt(),
            };
            if better {
                best = Some((total, b));
            }
        }
        best.map(|(_, b)| b)
    }

    /// Turn `b` into a bridge serving systems `a` and `c`; its false
    /// population follows the higher of the two. A system that is already a
    /// bridge keeps its first value.
    pub fn mark_bridge(&mut self, b: usize, (a, c): (usize, usize)) {
        if self.systems[b].is_bridge {
            return;
        }
        let higher = self.systems[a]
            .effective_population
            .max(self.systems[c].effective_population)
            .unwrap_or(0);
        let false_population = self.rules.false_population(higher);
        let ends = (self.systems[a].id.clone(), self.systems[c].id.clone());
        let sys = &mut self.systems[b];
        sys.set_bridge(false_population, ends);
        trace!(
            "{} becomes a bridge with false population {:?}",
            sys.id,
            sys.false_population
        );
    }

    pub fn link(&mut self, source: usize, destination: usize, kind: LinkKind) {
        self.connections.push(Connection::new(
            self.systems[source].id.clone(),
            self.systems[destination].id.clone(),
            kind,
        ));
        self.links.union(source, destination);
    }

    /// The distance-tiered link rule between a source and its chosen target:
    /// GREEN if close enough, else a YELLOW pair through a bridge, else
    /// ORANGE if within orange range, else nothing.
    pub fn tiered_link(&mut self, s: usize, t: usize) -> LinkOutcome {
        let d2 = self.dist_sq(s, t);
        let rules = self.rules;

        if sq_within(d2, rules.green_range) {
            self.link(s, t, LinkKind::Green);
            return LinkOutcome::Green;
        }
        if !sq_within(d2, rules.max_search_radius()) {
            return LinkOutcome::Unlinked;
        }

        if let Some(b) = self.find_bridge(s, t) {
            self.link(s, b, LinkKind::Yellow);
            self.link(b, t, LinkKind::Yellow);
            self.mark_bridge(b, (s, t));
            return LinkOutcome::Bridged { bridge: b };
        }

        if sq_within(d2, rules.orange_range) {
            self.link(s, t, LinkKind::Orange);
            return LinkOutcome::Orange;
        }

        LinkOutcome::Unlinked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::{RegionBounds, StarSystem};

    fn region(systems: Vec<StarSystem>) -> Region {
        Region::new(RegionBounds::sector("Test"), systems).unwrap()
    }

    #[test]
    fn test_working_copy_sorted_by_id() {
        let region = region(vec![
            StarSystem::new("c", Vec3::default(), Some(1)),
            StarSystem::new("a", Vec3::new(1.0, 0.0, 0.0), None),
            StarSystem::new("b", Vec3::new(2.0, 0.0, 0.0), Some(2)),
        ]);
        let rules = GateRules::default();
        let net = Network::from_region(&region, &rules);
        let ids: Vec<_> = net.systems.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(net.index_of(&"c".into()), Some(2));
        assert!(net.systems.iter().all(|s| !s.is_bridge));
    }

    #[test]
    fn test_effective_population() {
        let mut sys = SystemState::new("x", Vec3::default(), None);
        assert_eq!(sys.effective_population, None);
        assert!(sys.is_bridge_candidate());
        sys.set_bridge(-500, ("a".into(), "b".into()));
        assert_eq!(sys.effective_population, Some(-500));
        assert_eq!(sys.bridge_between, Some(("a".into(), "b".into())));
        assert!(sys.is_networked());
        assert!(!sys.is_bridge_candidate());

        let huge = SystemState::new("y", Vec3::default(), Some(u64::MAX));
        assert_eq!(huge.effective_population, Some(i64::MAX));
    }

    #[test]
    fn test_state_json_carries_effective_population() {
        let mut sys = SystemState::new("void", Vec3::new(4.0, 0.0, 0.0), None);
        sys.set_bridge(90_000, ("lo".into(), "hi".into()));
        let json = serde_json::to_value(&sys).unwrap();
        assert_eq!(json["effective_population"], 90_000);
        assert_eq!(json["is_bridge"], true);
        assert_eq!(json["bridge_between"], serde_json::json!(["lo", "hi"]));
        assert_eq!(json["position"]["x"], 4.0);

        let plain = serde_json::to_value(SystemState::new("a", Vec3::default(), Some(7))).unwrap();
        assert_eq!(plain["effective_population"], 7);
        assert!(plain["bridge_between"].is_null());
    }

    #[test]
    fn test_rank_breaks_ties_by_id() {
        let region = region(vec![
            StarSystem::new("a", Vec3::default(), Some(50)),
            StarSystem::new("b", Vec3::default(), Some(50)),
            StarSystem::new("c", Vec3::default(), None),
        ]);
        let rules = GateRules::default();
        let net = Network::from_region(&region, &rules);
        assert!(net.outranks(1, 0));
        assert!(!net.outranks(0, 1));
        assert!(net.outranks(0, 2));
        assert!(!net.outranks(2, 0));
    }

    #[test]
    fn test_bridge_prefers_smallest_leg_sum_then_id() {
        // s at 0, t at 8; "m1" and "m2" both sit on the axis midpoint
        // mirrored off-axis, "far" is valid but longer.
        let region = region(vec![
            StarSystem::new("s", Vec3::new(0.0, 0.0, 0.0), Some(10)),
            StarSystem::new("t", Vec3::new(8.0, 0.0, 0.0), Some(100)),
            StarSystem::new("m2", Vec3::new(4.0, 1.0, 0.0), None),
            StarSystem::new("m1", Vec3::new(4.0, -1.0, 0.0), None),
            StarSystem::new("far", Vec3::new(4.0, 2.9, 0.0), None),
        ]);
        let rules = GateRules::default();
        let net = Network::from_region(&region, &rules);
        let s = net.index_of(&"s".into()).unwrap();
        let t = net.index_of(&"t".into()).unwrap();
        let b = net.find_bridge(s, t).unwrap();
        assert_eq!(net.systems[b].id.as_str(), "m1");
    }

    #[test]
    fn test_mark_bridge_keeps_first_value() {
        let region = region(vec![
            StarSystem::new("a", Vec3::default(), Some(50_000)),
            StarSystem::new("b", Vec3::new(8.0, 0.0, 0.0), Some(20_000)),
            StarSystem::new("c", Vec3::new(0.0, 8.0, 0.0), Some(90_000)),
            StarSystem::new("void", Vec3::new(4.0, 0.0, 0.0), None),
        ]);
        let rules = GateRules::default();
        let mut net = Network::from_region(&region, &rules);
        net.mark_bridge(3, (1, 0));
        net.mark_bridge(3, (0, 2));
        let void = &net.systems[3];
        assert_eq!(void.false_population, Some(40_000));
        assert_eq!(void.effective_population, Some(40_000));
        assert_eq!(void.bridge_between, Some(("b".into(), "a".into())));
    }
}

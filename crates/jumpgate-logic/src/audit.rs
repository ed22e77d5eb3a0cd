//! Invariant checks over a computed map.
//!
//! Pure functions that take a region, its map and the rules it was computed
//! with, and return every violation found. An empty list means the map
//! honours the distance bounds, bridge rules, orphan definition and
//! cluster termination condition.

use std::collections::{HashMap, HashSet};

use crate::assembler::{find_orphans, JumpMap};
use crate::connection::LinkKind;
use crate::geometry::{distance, distance_sq, sq_within};
use crate::network::SystemState;
use crate::region::{Region, SystemId};
use crate::rules::GateRules;

/// A single invariant violation.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditIssue {
    pub category: &'static str,
    pub message: String,
}

impl AuditIssue {
    fn new(category: &'static str, message: String) -> Self {
        Self { category, message }
    }
}

/// Run every check, returning all issues found.
pub fn audit_map(region: &Region, map: &JumpMap, rules: &GateRules) -> Vec<AuditIssue> {
    let mut issues = check_membership(region, map);
    issues.extend(check_distance_bounds(map, rules));
    issues.extend(check_bridges(map, rules));
    issues.extend(check_orphans(map));
    issues.extend(check_cluster_separation(map, rules));
    issues
}

fn lookup(map: &JumpMap) -> HashMap<&SystemId, &SystemState> {
    map.systems.iter().map(|s| (&s.id, s)).collect()
}

// ── A. Membership ───────────────────────────────────────────────────────

/// The map covers exactly the region's systems and every link names two of them.
pub fn check_membership(region: &Region, map: &JumpMap) -> Vec<AuditIssue> {
    let mut issues = Vec::new();
    let region_ids: HashSet<&SystemId> = region.systems().iter().map(|s| &s.id).collect();
    let map_ids: HashSet<&SystemId> = map.systems.iter().map(|s| &s.id).collect();

    if region_ids != map_ids {
        issues.push(AuditIssue::new(
            "membership",
            format!(
                "map has {} systems, region has {}",
                map_ids.len(),
                region_ids.len()
            ),
        ));
    }
    for c in &map.connections {
        for end in [&c.source, &c.destination] {
            if !map_ids.contains(end) {
                issues.push(AuditIssue::new(
                    "membership",
                    format!("{} link references unknown system {}", c.kind, end),
                ));
            }
        }
        if c.source == c.destination {
            issues.push(AuditIssue::new(
                "membership",
                format!("{} link from {} to itself", c.kind, c.source),
            ));
        }
    }
    issues
}

// ── B. Distance bounds ──────────────────────────────────────────────────

/// Every link is within the range its colour allows.
pub fn check_distance_bounds(map: &JumpMap, rules: &GateRules) -> Vec<AuditIssue> {
    let mut issues = Vec::new();
    let by_id = lookup(map);

    for c in &map.connections {
        let (Some(src), Some(dst)) = (by_id.get(&c.source), by_id.get(&c.destination)) else {
            continue;
        };
        let d2 = distance_sq(src.position, dst.position);
        let ok = match c.kind {
            LinkKind::Green => sq_within(d2, rules.green_range),
            LinkKind::Orange => {
                !sq_within(d2, rules.green_range) && sq_within(d2, rules.orange_range)
            }
            LinkKind::Yellow => {
                sq_within(d2, rules.bridge_leg) && (src.is_bridge || dst.is_bridge)
            }
            LinkKind::Red => sq_within(d2, rules.red_range),
        };
        if !ok {
            issues.push(AuditIssue::new(
                "distance_bound",
                format!(
                    "{} link {} → {} spans {:.3} pc",
                    c.kind,
                    c.source,
                    c.destination,
                    distance(src.position, dst.position)
                ),
            ));
        }
    }
    issues
}

// ── C. Bridges ──────────────────────────────────────────────────────────

/// Bridges were unpopulated, carry a false population derived from the
/// higher of the two systems they serve, sit on a YELLOW pair or RED chain
/// between those systems, and never initiate a GREEN or ORANGE link.
pub fn check_bridges(map: &JumpMap, rules: &GateRules) -> Vec<AuditIssue> {
    let mut issues = Vec::new();
    let by_id = lookup(map);

    for bridge in map.bridges() {
        if bridge.population.is_some() {
            issues.push(AuditIssue::new(
                "bridge",
                format!("populated system {} marked as bridge", bridge.id),
            ));
        }
        if bridge.effective_population != bridge.false_population {
            issues.push(AuditIssue::new(
                "bridge",
                format!(
                    "bridge {} reports effective population {:?} but false population {:?}",
                    bridge.id, bridge.effective_population, bridge.false_population
                ),
            ));
        }

        let Some((a, b)) = &bridge.bridge_between else {
            issues.push(AuditIssue::new(
                "bridge",
                format!("bridge {} does not record the systems it serves", bridge.id),
            ));
            continue;
        };
        let (Some(sa), Some(sb)) = (by_id.get(a), by_id.get(b)) else {
            issues.push(AuditIssue::new(
                "bridge",
                format!("bridge {} serves unknown systems {} and {}", bridge.id, a, b),
            ));
            continue;
        };

        let expected = sa
            .effective_population
            .max(sb.effective_population)
            .map(|higher| rules.false_population(higher));
        if expected.is_none() || bridge.false_population != expected {
            issues.push(AuditIssue::new(
                "bridge",
                format!(
                    "bridge {} false population {:?}, expected {:?} from the higher of {} and {}",
                    bridge.id, bridge.false_population, expected, a, b
                ),
            ));
        }
        if !on_yellow_pair(map, &bridge.id, a, b) && !on_red_chain(map, &by_id, &bridge.id, a, b) {
            issues.push(AuditIssue::new(
                "bridge",
                format!("bridge {} is not linked between {} and {}", bridge.id, a, b),
            ));
        }
    }

    for c in &map.connections {
        if !matches!(c.kind, LinkKind::Green | LinkKind::Orange) {
            continue;
        }
        if by_id.get(&c.source).is_some_and(|s| s.is_bridge) {
            issues.push(AuditIssue::new(
                "bridge",
                format!(
                    "bridge {} initiated a {} link to {}",
                    c.source, c.kind, c.destination
                ),
            ));
        }
    }
    issues
}

/// `a → bridge → b` as a YELLOW pair.
fn on_yellow_pair(map: &JumpMap, bridge: &SystemId, a: &SystemId, b: &SystemId) -> bool {
    let yellow = |src: &SystemId, dst: &SystemId| {
        map.connections
            .iter()
            .any(|c| c.kind == LinkKind::Yellow && &c.source == src && &c.destination == dst)
    };
    yellow(a, bridge) && yellow(bridge, b)
}

/// Both `a` and `b` are reachable from `bridge` over RED links whose
/// interior systems are all bridges.
fn on_red_chain<'a>(
    map: &'a JumpMap,
    by_id: &HashMap<&SystemId, &SystemState>,
    bridge: &'a SystemId,
    a: &SystemId,
    b: &SystemId,
) -> bool {
    let mut seen: HashSet<&SystemId> = HashSet::from([bridge]);
    let mut stack = vec![bridge];
    while let Some(current) = stack.pop() {
        for c in map.connections.iter().filter(|c| c.kind == LinkKind::Red) {
            let Some(next) = c.other_end(current) else {
                continue;
            };
            if seen.insert(next) && by_id.get(next).is_some_and(|s| s.is_bridge) {
                stack.push(next);
            }
        }
    }
    seen.contains(a) && seen.contains(b)
}

// ── D. Orphans ──────────────────────────────────────────────────────────

/// The orphan set is exactly the zero-degree set.
pub fn check_orphans(map: &JumpMap) -> Vec<AuditIssue> {
    let expected = find_orphans(&map.systems, &map.connections);
    let mut issues = Vec::new();
    for id in expected.difference(&map.orphans) {
        issues.push(AuditIssue::new(
            "orphan",
            format!("{} has no links but is not an orphan", id),
        ));
    }
    for id in map.orphans.difference(&expected) {
        issues.push(AuditIssue::new(
            "orphan",
            format!("{} is listed as orphan but has links", id),
        ));
    }
    issues
}

// ── E. Cluster separation ───────────────────────────────────────────────

/// No two final clusters have networked members within red range of each
/// other; otherwise the connector stopped early.
pub fn check_cluster_separation(map: &JumpMap, rules: &GateRules) -> Vec<AuditIssue> {
    let mut issues = Vec::new();
    let by_id = lookup(map);
    let clusters = map.clusters();

    let mut cluster_of: Vec<(usize, &SystemState)> = Vec::new();
    for (ci, cluster) in clusters.iter().enumerate() {
        for id in &cluster.members {
            if let Some(sys) = by_id.get(id) {
                if sys.is_networked() {
                    cluster_of.push((ci, *sys));
                }
            }
        }
    }

    for (i, &(ca, a)) in cluster_of.iter().enumerate() {
        for &(cb, b) in &cluster_of[i + 1..] {
            if ca != cb && sq_within(distance_sq(a.position, b.position), rules.red_range) {
                issues.push(AuditIssue::new(
                    "clustering",
                    format!(
                        "{} and {} are within red range but in separate clusters",
                        a.id, b.id
                    ),
                ));
            }
        }
    }
    issues
}

//! The calculator entry point.
//!
//! ```
//! use jumpgate_logic::calculator::compute;
//! use jumpgate_logic::connection::LinkKind;
//! use jumpgate_logic::geometry::Vec3;
//! use jumpgate_logic::region::{Region, RegionBounds, StarSystem};
//!
//! let region = Region::new(
//!     RegionBounds::subsector("Spinward Marches", 'C'),
//!     vec![
//!         StarSystem::new("regina", Vec3::new(0.0, 0.0, 0.0), Some(100_000)),
//!         StarSystem::new("efate", Vec3::new(4.0, 0.0, 0.0), Some(10_000)),
//!     ],
//! )
//! .unwrap();
//! let map = compute(&region).unwrap();
//! assert_eq!(map.connections.len(), 1);
//! assert_eq!(map.connections[0].kind, LinkKind::Green);
//! assert!(map.orphans.is_empty());
//! ```

use log::{debug, info};

use crate::assembler::{assemble, JumpMap};
use crate::cluster_connector::{extend_clusters, merge_clusters};
use crate::error::CalcError;
use crate::network::Network;
use crate::pathfinding::JumpGraph;
use crate::primary::connect_primary;
use crate::region::Region;
use crate::rules::{validate_rules, GateRules};

/// Compute the jump-gate network for `region` with the standard rules.
pub fn compute(region: &Region) -> Result<JumpMap, CalcError> {
    compute_with(region, &GateRules::default())
}

/// Compute the jump-gate network for `region` under `rules`.
///
/// Fails only on malformed input; every algorithmic outcome (missing
/// candidates, unreachable clusters) is represented in the returned map.
pub fn compute_with(region: &Region, rules: &GateRules) -> Result<JumpMap, CalcError> {
    let rule_errors = validate_rules(rules);
    if !rule_errors.is_empty() {
        return Err(CalcError::InvalidRules(rule_errors));
    }
    region.validate()?;

    let mut net = Network::from_region(region, rules);
    if net.len() > 1 {
        connect_primary(&mut net);
        merge_clusters(&mut net);

        let positions: Vec<_> = net.systems.iter().map(|s| s.position).collect();
        let graph = JumpGraph::build(&positions, rules.red_range);
        debug!("red-range graph: {} edges", graph.edge_count());
        extend_clusters(&mut net, &graph);
    }

    let map = assemble(net, region.bounds.clone());
    let summary = map.summary();
    info!(
        "{}: {} systems, {} links ({} green, {} yellow, {} orange, {} red), {} bridges, {} orphans, {} clusters",
        map.bounds,
        summary.systems,
        summary.connections(),
        summary.green,
        summary.yellow,
        summary.orange,
        summary.red,
        summary.bridges,
        summary.orphans,
        summary.clusters
    );
    Ok(map)
}

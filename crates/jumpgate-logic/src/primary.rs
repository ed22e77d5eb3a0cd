//! Primary connector: one outbound link per populated system.
//!
//! Sources are processed in ascending rank (effective population, then id).
//! Each looks for a higher-ranked networked system in widening tiers and
//! takes the most populous candidate in the first tier that has any
//! (ties: nearest, then lowest id), then applies the tiered link rule.

use log::{debug, trace};

use crate::network::{LinkOutcome, Network};

/// Tally of one primary pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrimaryStats {
    pub sources: usize,
    pub green: usize,
    pub bridged: usize,
    pub orange: usize,
    /// Candidate found but beyond orange range with no bridge.
    pub unlinked: usize,
    /// Nothing higher-ranked within the largest tier.
    pub no_candidate: usize,
}

/// Best higher-ranked target for `s`, searching the tiers smallest first.
pub(crate) fn find_target(net: &Network, s: usize) -> Option<usize> {
    for &radius in &net.rules.search_radii {
        let candidates = net.within(s, radius, |j, sys| sys.is_networked() && net.outranks(j, s));
        let best = candidates.into_iter().min_by(|&a, &b| {
            let pa = net.systems[a].effective_population;
            let pb = net.systems[b].effective_population;
            pb.cmp(&pa)
                .then_with(|| net.dist_sq(s, a).total_cmp(&net.dist_sq(s, b)))
                .then_with(|| a.cmp(&b))
        });
        if let Some(t) = best {
            trace!(
                "{} → {} in the {} pc tier",
                net.systems[s].id,
                net.systems[t].id,
                radius
            );
            return Some(t);
        }
    }
    None
}

pub(crate) fn connect_primary(net: &mut Network) -> PrimaryStats {
    let mut order: Vec<usize> = (0..net.len())
        .filter(|&i| net.systems[i].population.is_some())
        .collect();
    order.sort_by_key(|&i| net.rank(i));

    let mut stats = PrimaryStats::default();
    for s in order {
        stats.sources += 1;

        let Some(t) = find_target(net, s) else {
            stats.no_candidate += 1;
            continue;
        };

        match net.tiered_link(s, t) {
            LinkOutcome::Green => stats.green += 1,
            LinkOutcome::Bridged { .. } => stats.bridged += 1,
            LinkOutcome::Orange => stats.orange += 1,
            LinkOutcome::Unlinked => stats.unlinked += 1,
        }
    }

    debug!(
        "primary pass: {} sources, {} green, {} bridged, {} orange, {} unlinked, {} without candidate",
        stats.sources, stats.green, stats.bridged, stats.orange, stats.unlinked, stats.no_candidate
    );
    stats
}

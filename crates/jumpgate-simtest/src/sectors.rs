//! Synthetic regions for the harness: fixed scenarios and seeded random sectors.

use jumpgate_logic::geometry::Vec3;
use jumpgate_logic::region::{Region, RegionBounds, StarSystem};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Sector footprint in parsecs (x, y); depth is kept shallow.
const SECTOR_WIDTH: f64 = 32.0;
const SECTOR_HEIGHT: f64 = 40.0;
const SECTOR_DEPTH: f64 = 3.0;

/// Fraction of systems with no population.
const UNPOPULATED_CHANCE: f64 = 0.3;

fn sys(id: &str, x: f64, y: f64, population: Option<u64>) -> StarSystem {
    StarSystem::new(id, Vec3::new(x, y, 0.0), population)
}

fn raw(name: &str, systems: Vec<StarSystem>) -> Region {
    Region {
        bounds: RegionBounds::subsector(name, 'A'),
        systems,
    }
}

/// A random sector; populations are log-uniform between 100 and ~10 billion.
pub fn random_sector(seed: u64, count: usize) -> Region {
    let mut rng = StdRng::seed_from_u64(seed);
    let systems = (0..count)
        .map(|i| {
            let position = Vec3::new(
                rng.gen_range(0.0..SECTOR_WIDTH),
                rng.gen_range(0.0..SECTOR_HEIGHT),
                rng.gen_range(0.0..SECTOR_DEPTH),
            );
            let population = if rng.gen_bool(UNPOPULATED_CHANCE) {
                None
            } else {
                Some(10u64.pow(rng.gen_range(2..10)) * rng.gen_range(1..10))
            };
            StarSystem::new(format!("{:02}{:02}", i / 40 + 1, i % 40 + 1), position, population)
        })
        .collect();
    Region {
        bounds: RegionBounds::sector(format!("Random-{}", seed)),
        systems,
    }
}

pub fn scenario_green() -> Region {
    raw(
        "Scenario A",
        vec![sys("hi", 0.0, 0.0, Some(100_000)), sys("lo", 4.0, 0.0, Some(10_000))],
    )
}

pub fn scenario_yellow() -> Region {
    raw(
        "Scenario B",
        vec![
            sys("hi", 0.0, 0.0, Some(100_000)),
            sys("lo", 8.0, 0.0, Some(10_000)),
            sys("void", 4.0, 0.0, None),
        ],
    )
}

pub fn scenario_orange() -> Region {
    raw(
        "Scenario C",
        vec![sys("hi", 0.0, 0.0, Some(100_000)), sys("lo", 6.5, 0.0, Some(10_000))],
    )
}

pub fn scenario_beyond_orange() -> Region {
    raw(
        "Scenario D",
        vec![sys("hi", 0.0, 0.0, Some(100_000)), sys("lo", 8.5, 0.0, Some(10_000))],
    )
}

pub fn scenario_chain() -> Region {
    raw(
        "Scenario E",
        vec![
            sys("a1", 0.0, 0.0, Some(50_000)),
            sys("a2", -4.0, 0.0, Some(20_000)),
            sys("b1", 16.0, 0.0, Some(80_000)),
            sys("b2", 20.0, 0.0, Some(30_000)),
            sys("relay", 8.0, 0.0, None),
        ],
    )
}

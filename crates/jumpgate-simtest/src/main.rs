//! Jump-Gate Headless Harness
//!
//! Validates the calculator against fixed scenarios and seeded random
//! sectors, or computes the network for one region read from JSON.
//! Runs entirely in-process.
//!
//! Usage:
//!   cargo run -p jumpgate-simtest
//!   cargo run -p jumpgate-simtest -- --verbose --sweep 200 --seed 7
//!   cargo run -p jumpgate-simtest -- --region marches.json --save marches.bin

mod sectors;

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use jumpgate_logic::audit::audit_map;
use jumpgate_logic::calculator::compute_with;
use jumpgate_logic::connection::LinkKind;
use jumpgate_logic::error::CalcError;
use jumpgate_logic::geometry::Vec3;
use jumpgate_logic::persistence::{load_map, save_map};
use jumpgate_logic::region::{Region, RegionBounds, StarSystem};
use jumpgate_logic::rules::GateRules;
use jumpgate_logic::JumpMap;
use log::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "jumpgate-simtest", about = "Headless harness for the jump-gate calculator")]
struct Args {
    /// Print passing checks too and log at debug level.
    #[arg(long)]
    verbose: bool,

    /// Number of random sectors in the sweep.
    #[arg(long, default_value_t = 50)]
    sweep: u64,

    /// Seed of the first random sector.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Compute this region (JSON) instead of running the checks.
    #[arg(long)]
    region: Option<PathBuf>,

    /// Gate rules (JSON); missing fields take the standard values.
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Write a binary snapshot of the computed map here.
    #[arg(long)]
    save: Option<PathBuf>,
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

impl TestResult {
    fn new(name: impl Into<String>, passed: bool, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed,
            detail: detail.into(),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let default_level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let rules = match &args.rules {
        Some(path) => read_json::<GateRules>(path)?,
        None => GateRules::default(),
    };

    if let Some(path) = &args.region {
        return run_region(path, &rules, args.save.as_deref());
    }

    println!("=== Jump-Gate Calculator Harness ===\n");
    let mut results = Vec::new();

    // 1. Fixed scenarios
    results.extend(validate_scenarios(&rules));

    // 2. Input errors and trivial regions
    results.extend(validate_input_handling(&rules));

    // 3. Random sector sweep
    results.extend(validate_random_sweep(&rules, args.seed, args.sweep));

    // 4. Snapshot round trip
    results.extend(validate_persistence(&rules, args.seed));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || args.verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing {}", path.display()))
}

fn run_region(path: &Path, rules: &GateRules, save: Option<&Path>) -> anyhow::Result<()> {
    let region: Region = read_json(path)?;
    let map = compute_with(&region, rules)
        .with_context(|| format!("computing {}", region.bounds))?;

    for issue in audit_map(&region, &map, rules) {
        warn!("[{}] {}", issue.category, issue.message);
    }

    println!("{}", serde_json::to_string_pretty(&map)?);

    if let Some(out) = save {
        let file = File::create(out).with_context(|| format!("creating {}", out.display()))?;
        let mut writer = BufWriter::new(file);
        save_map(&mut writer, &map)
            .with_context(|| format!("writing snapshot {}", out.display()))?;
        writer.flush()?;
        info!("snapshot written to {}", out.display());
    }
    Ok(())
}

fn kinds(map: &JumpMap) -> Vec<LinkKind> {
    map.connections.iter().map(|c| c.kind).collect()
}

fn audit_result(name: &str, region: &Region, map: &JumpMap, rules: &GateRules) -> TestResult {
    let issues = audit_map(region, map, rules);
    TestResult::new(
        name,
        issues.is_empty(),
        if issues.is_empty() {
            "all invariants hold".to_string()
        } else {
            issues
                .iter()
                .map(|i| format!("[{}] {}", i.category, i.message))
                .collect::<Vec<_>>()
                .join("; ")
        },
    )
}

// ── 1. Scenarios ────────────────────────────────────────────────────────

fn validate_scenarios(rules: &GateRules) -> Vec<TestResult> {
    println!("--- Scenarios ---");
    let mut results = Vec::new();

    let cases: [(&str, Region, Vec<LinkKind>); 5] = [
        ("scenario_a_green", sectors::scenario_green(), vec![LinkKind::Green]),
        (
            "scenario_b_yellow",
            sectors::scenario_yellow(),
            vec![LinkKind::Yellow, LinkKind::Yellow],
        ),
        ("scenario_c_orange", sectors::scenario_orange(), vec![LinkKind::Orange]),
        ("scenario_d_red_fallback", sectors::scenario_beyond_orange(), vec![LinkKind::Red]),
        (
            "scenario_e_chain",
            sectors::scenario_chain(),
            vec![LinkKind::Green, LinkKind::Green, LinkKind::Red, LinkKind::Red],
        ),
    ];

    for (name, region, expected) in cases {
        match compute_with(&region, rules) {
            Ok(map) => {
                let got = kinds(&map);
                results.push(TestResult::new(
                    name,
                    got == expected,
                    format!(
                        "{} links {:?}, {} orphans",
                        got.len(),
                        got,
                        map.orphans.len()
                    ),
                ));
                results.push(audit_result(&format!("{}_audit", name), &region, &map, rules));
            }
            Err(e) => results.push(TestResult::new(name, false, e.to_string())),
        }
    }

    if let Ok(map) = compute_with(&sectors::scenario_yellow(), rules) {
        let fp = map
            .system(&"void".into())
            .and_then(|s| s.false_population);
        let expected = rules.false_population(100_000);
        results.push(TestResult::new(
            "scenario_b_false_population",
            fp == Some(expected),
            format!("bridge carries {:?}, expected {}", fp, expected),
        ));
    }

    results
}

// ── 2. Input handling ───────────────────────────────────────────────────

fn validate_input_handling(rules: &GateRules) -> Vec<TestResult> {
    println!("--- Input Handling ---");
    let mut results = Vec::new();

    let empty = Region {
        bounds: RegionBounds::sector("Empty"),
        systems: vec![],
    };
    let map = compute_with(&empty, rules);
    results.push(TestResult::new(
        "empty_region",
        matches!(&map, Ok(m) if m.connections.is_empty() && m.orphans.is_empty()),
        "empty region yields an empty map",
    ));

    let single = Region {
        bounds: RegionBounds::sector("Single"),
        systems: vec![StarSystem::new("solo", Vec3::default(), Some(1_000))],
    };
    let map = compute_with(&single, rules);
    results.push(TestResult::new(
        "single_system_orphan",
        matches!(&map, Ok(m) if m.orphans.len() == 1),
        "lone system is an orphan",
    ));

    let duplicate = Region {
        bounds: RegionBounds::sector("Duplicate"),
        systems: vec![
            StarSystem::new("x", Vec3::default(), Some(1)),
            StarSystem::new("x", Vec3::new(1.0, 0.0, 0.0), None),
        ],
    };
    let err = compute_with(&duplicate, rules);
    results.push(TestResult::new(
        "duplicate_id_rejected",
        matches!(err, Err(CalcError::DuplicateSystemId(_))),
        format!("{:?}", err.err()),
    ));

    let nan = Region {
        bounds: RegionBounds::sector("NaN"),
        systems: vec![StarSystem::new("x", Vec3::new(f64::NAN, 0.0, 0.0), Some(1))],
    };
    let err = compute_with(&nan, rules);
    results.push(TestResult::new(
        "nan_position_rejected",
        matches!(err, Err(CalcError::InvalidPosition { .. })),
        format!("{:?}", err.err()),
    ));

    results
}

// ── 3. Random sweep ─────────────────────────────────────────────────────

fn validate_random_sweep(rules: &GateRules, seed: u64, count: u64) -> Vec<TestResult> {
    println!("--- Random Sweep ({} sectors from seed {}) ---", count, seed);
    let mut results = Vec::new();
    let mut nondeterministic = Vec::new();
    let mut failures = Vec::new();
    let mut totals = [0usize; 4];
    let mut orphans = 0usize;
    let mut bridges = 0usize;

    for s in seed..seed + count {
        let size = 20 + (s % 9) as usize * 30;
        let region = sectors::random_sector(s, size);
        let (first, second) = match (compute_with(&region, rules), compute_with(&region, rules)) {
            (Ok(a), Ok(b)) => (a, b),
            (Err(e), _) | (_, Err(e)) => {
                failures.push(format!("seed {}: {}", s, e));
                continue;
            }
        };
        if first != second {
            nondeterministic.push(s);
        }
        let issues = audit_map(&region, &first, rules);
        if !issues.is_empty() {
            failures.push(format!("seed {}: {} issues ({})", s, issues.len(), issues[0].message));
        }

        let summary = first.summary();
        for (slot, kind) in LinkKind::ALL.iter().enumerate() {
            totals[slot] += first.count(*kind);
        }
        orphans += summary.orphans;
        bridges += summary.bridges;
    }

    results.push(TestResult::new(
        "sweep_deterministic",
        nondeterministic.is_empty(),
        if nondeterministic.is_empty() {
            format!("{} sectors computed twice with identical maps", count)
        } else {
            format!("differing seeds: {:?}", nondeterministic)
        },
    ));
    results.push(TestResult::new(
        "sweep_audit",
        failures.is_empty(),
        if failures.is_empty() {
            format!(
                "green {}, yellow {}, orange {}, red {}, {} bridges, {} orphans",
                totals[0], totals[1], totals[2], totals[3], bridges, orphans
            )
        } else {
            failures.join("; ")
        },
    ));

    results
}

// ── 4. Persistence ──────────────────────────────────────────────────────

fn validate_persistence(rules: &GateRules, seed: u64) -> Vec<TestResult> {
    println!("--- Persistence ---");
    let region = sectors::random_sector(seed, 120);
    let map = match compute_with(&region, rules) {
        Ok(map) => map,
        Err(e) => return vec![TestResult::new("snapshot_roundtrip", false, e.to_string())],
    };

    let mut buffer = Vec::new();
    let outcome = save_map(&mut buffer, &map).and_then(|_| load_map(&buffer[..]));
    vec![match outcome {
        Ok(loaded) => TestResult::new(
            "snapshot_roundtrip",
            loaded == map,
            format!("{} bytes, {} links", buffer.len(), loaded.connections.len()),
        ),
        Err(e) => TestResult::new("snapshot_roundtrip", false, e.to_string()),
    }]
}

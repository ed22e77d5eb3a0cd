//! Pure jump-gate network logic.
//!
//! This crate computes the jump-gate connectivity graph for a region of
//! star systems (a subsector up to a full sector), driven entirely by each
//! system's population. Functions take plain data and return results; a
//! run is a single deterministic call to [`calculator::compute`].
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`assembler`] | `JumpMap` result, orphan detection, summaries |
//! | [`audit`] | Invariant checks over a computed map |
//! | [`calculator`] | `compute` / `compute_with` entry points |
//! | [`cluster_connector`] | Phase A closest-pair merging, Phase B red links and chains |
//! | [`clusters`] | Union-find and connected components over links |
//! | [`connection`] | Links and their colours |
//! | [`error`] | Input errors |
//! | [`geometry`] | 3D positions and squared-distance range checks |
//! | [`network`] | Working system table with bridge state, tiered link rule |
//! | [`pathfinding`] | Fewest-hop routes over the red-range graph |
//! | [`persistence`] | Versioned binary snapshots of a map |
//! | [`primary`] | Per-system tiered search toward higher population |
//! | [`region`] | Input region and system catalog |
//! | [`rules`] | Thresholds and bridge offset |

pub mod assembler;
pub mod audit;
pub mod calculator;
pub mod cluster_connector;
pub mod clusters;
pub mod connection;
pub mod error;
pub mod geometry;
pub mod network;
pub mod pathfinding;
pub mod persistence;
pub mod primary;
pub mod region;
pub mod rules;

pub use assembler::{JumpMap, MapSummary};
pub use calculator::{compute, compute_with};
pub use connection::{Connection, LinkKind};
pub use error::CalcError;
pub use region::{Region, RegionBounds, StarSystem, SystemId};
pub use rules::GateRules;

//! Region and system catalog.
//!
//! A `Region` is the input to the calculator: the scope the user picked
//! (one subsector up to a whole sector) plus the star systems inside it.
//! The catalog is read-only; bridge state lives on the calculator's own
//! working copy (see [`crate::network`]).

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CalcError;
use crate::geometry::{indices_within, Vec3};

/// Unique identifier of a star system within a region.
///
/// Ids compare lexicographically; "lowest id" is the tie-break everywhere
/// the calculator has to choose between otherwise equal options.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SystemId(pub String);

impl SystemId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SystemId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for SystemId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// One star system as supplied by the population provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StarSystem {
    pub id: SystemId,
    pub position: Vec3,
    /// `None` means unpopulated.
    pub population: Option<u64>,
}

impl StarSystem {
    pub fn new(id: impl Into<SystemId>, position: Vec3, population: Option<u64>) -> Self {
        Self {
            id: id.into(),
            position,
            population,
        }
    }

    pub fn is_populated(&self) -> bool {
        self.population.is_some()
    }
}

/// The spatial scope a region was cut from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionBounds {
    /// A single subsector, lettered A–P within its sector.
    Subsector { sector: String, subsector: char },
    /// A whole sector.
    Sector { sector: String },
}

impl RegionBounds {
    pub fn sector(name: impl Into<String>) -> Self {
        Self::Sector {
            sector: name.into(),
        }
    }

    pub fn subsector(sector: impl Into<String>, subsector: char) -> Self {
        Self::Subsector {
            sector: sector.into(),
            subsector,
        }
    }
}

impl fmt::Display for RegionBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegionBounds::Subsector { sector, subsector } => {
                write!(f, "{} subsector {}", sector, subsector)
            }
            RegionBounds::Sector { sector } => write!(f, "{} sector", sector),
        }
    }
}

/// Bounds plus the systems inside them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub bounds: RegionBounds,
    pub systems: Vec<StarSystem>,
}

impl Region {
    /// Build a region, rejecting duplicate ids and non-finite positions.
    pub fn new(bounds: RegionBounds, systems: Vec<StarSystem>) -> Result<Self, CalcError> {
        let region = Self { bounds, systems };
        region.validate()?;
        Ok(region)
    }

    /// Check the region invariants. Regions built through [`Region::new`]
    /// always pass; deserialized ones are checked again by the calculator.
    pub fn validate(&self) -> Result<(), CalcError> {
        let mut seen = HashSet::with_capacity(self.systems.len());
        for sys in &self.systems {
            if !seen.insert(&sys.id) {
                return Err(CalcError::DuplicateSystemId(sys.id.clone()));
            }
            if !sys.position.is_finite() {
                return Err(CalcError::InvalidPosition {
                    id: sys.id.clone(),
                    x: sys.position.x,
                    y: sys.position.y,
                    z: sys.position.z,
                });
            }
        }
        Ok(())
    }

    /// Systems in input order.
    pub fn systems(&self) -> &[StarSystem] {
        &self.systems
    }

    pub fn by_id(&self, id: &SystemId) -> Result<&StarSystem, CalcError> {
        self.systems
            .iter()
            .find(|s| &s.id == id)
            .ok_or_else(|| CalcError::NotFound(id.clone()))
    }

    /// Systems within `radius` of `point` that satisfy `predicate`, in input order.
    pub fn within<P>(&self, point: Vec3, radius: f64, predicate: P) -> Vec<&StarSystem>
    where
        P: Fn(&StarSystem) -> bool,
    {
        indices_within(self.systems.iter().map(|s| s.position), point, radius)
            .map(|i| &self.systems[i])
            .filter(|s| predicate(s))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }
}

//! Jump-gate connections.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::region::SystemId;

/// Link colour, which doubles as the rule that produced the link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    /// Direct link within the green range.
    Green,
    /// One of the two legs through a bridge.
    Yellow,
    /// Direct link beyond green range where no bridge was available.
    Orange,
    /// Extended link between otherwise isolated clusters, direct or one hop of a chain.
    Red,
}

impl LinkKind {
    pub const ALL: [LinkKind; 4] = [
        LinkKind::Green,
        LinkKind::Yellow,
        LinkKind::Orange,
        LinkKind::Red,
    ];

    pub fn name(self) -> &'static str {
        match self {
            LinkKind::Green => "green",
            LinkKind::Yellow => "yellow",
            LinkKind::Orange => "orange",
            LinkKind::Red => "red",
        }
    }
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single link. `source` is the side that initiated the search; for
/// graph purposes the link is undirected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connection {
    pub source: SystemId,
    pub destination: SystemId,
    pub kind: LinkKind,
}

impl Connection {
    pub fn new(source: SystemId, destination: SystemId, kind: LinkKind) -> Self {
        Self {
            source,
            destination,
            kind,
        }
    }

    pub fn touches(&self, id: &SystemId) -> bool {
        &self.source == id || &self.destination == id
    }

    /// The endpoint opposite `id`, if `id` is an endpoint.
    pub fn other_end(&self, id: &SystemId) -> Option<&SystemId> {
        if &self.source == id {
            Some(&self.destination)
        } else if &self.destination == id {
            Some(&self.source)
        } else {
            None
        }
    }
}

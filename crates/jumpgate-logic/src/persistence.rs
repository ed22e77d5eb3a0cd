//! Save/load for computed maps.
//!
//! Uses bincode for a compact binary snapshot. The connection list, orphan
//! set and mutated system table are written verbatim, so a loaded map is
//! identical to the one that was saved.

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::assembler::JumpMap;

/// Version number for the snapshot format (increment when it changes)
const SAVE_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct MapSnapshot {
    version: u32,
    map: JumpMap,
}

/// Errors that can occur during save/load
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Bincode(#[from] Box<bincode::ErrorKind>),

    #[error("Save version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
}

/// Write a snapshot of `map` to `writer`.
pub fn save_map<W: Write>(writer: W, map: &JumpMap) -> Result<(), SaveError> {
    let snapshot = MapSnapshot {
        version: SAVE_VERSION,
        map: map.clone(),
    };
    bincode::serialize_into(writer, &snapshot)?;
    Ok(())
}

/// Read a snapshot written by [`save_map`].
pub fn load_map<R: Read>(reader: R) -> Result<JumpMap, SaveError> {
    let snapshot: MapSnapshot = bincode::deserialize_from(reader)?;
    if snapshot.version != SAVE_VERSION {
        return Err(SaveError::VersionMismatch {
            expected: SAVE_VERSION,
            found: snapshot.version,
        });
    }
    Ok(snapshot.map)
}

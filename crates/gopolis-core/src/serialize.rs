//! Binary snapshots of a [`Simulation`] via `bitcode`, with a versioned
//! header.
//!
//! A snapshot holds the economy, the generator state and the day order, so a
//! restored simulation continues exactly where the original left off. The
//! dispatcher and session are never part of a snapshot: handlers are
//! closures and must be re-registered.

use serde::{Deserialize, Serialize};

use crate::driver::Simulation;
use crate::economy::Economy;
use crate::id::AgentId;
use crate::rng::SimRng;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic number identifying a city snapshot.
pub const SNAPSHOT_MAGIC: u32 = 0x60F3_0001;

/// Current format version. Increment when breaking the wire format.
pub const FORMAT_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    #[error("bitcode encoding failed: {0}")]
    Encode(String),
}

#[derive(Debug, thiserror::Error)]
pub enum DeserializeError {
    #[error("invalid magic number: expected 0x{:08X}, got 0x{:08X}", SNAPSHOT_MAGIC, .0)]
    InvalidMagic(u32),
    #[error("unsupported format version: expected {}, got {}", FORMAT_VERSION, .0)]
    UnsupportedVersion(u32),
    #[error("snapshot from future version {0} (this build supports up to {FORMAT_VERSION})")]
    FutureVersion(u32),
    #[error("bitcode decoding failed: {0}")]
    Decode(String),
}

// ---------------------------------------------------------------------------
// Snapshot header
// ---------------------------------------------------------------------------

/// Prepended to every snapshot for format detection and version checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotHeader {
    pub magic: u32,
    pub version: u32,
    /// Days completed when the snapshot was taken.
    pub day: u64,
}

impl SnapshotHeader {
    pub fn new(day: u64) -> Self {
        Self {
            magic: SNAPSHOT_MAGIC,
            version: FORMAT_VERSION,
            day,
        }
    }

    pub fn validate(&self) -> Result<(), DeserializeError> {
        if self.magic != SNAPSHOT_MAGIC {
            return Err(DeserializeError::InvalidMagic(self.magic));
        }
        if self.version > FORMAT_VERSION {
            return Err(DeserializeError::FutureVersion(self.version));
        }
        if self.version < FORMAT_VERSION {
            return Err(DeserializeError::UnsupportedVersion(self.version));
        }
        Ok(())
    }
}

/// Read the header of a snapshot without validating it.
///
/// bitcode has no partial decoding, so this decodes the whole payload.
pub fn read_snapshot_header(data: &[u8]) -> Result<SnapshotHeader, DeserializeError> {
    let snapshot: SimulationSnapshot =
        bitcode::deserialize(data).map_err(|e| DeserializeError::Decode(e.to_string()))?;
    Ok(snapshot.header)
}

#[derive(Debug, Serialize, Deserialize)]
struct SimulationSnapshot {
    header: SnapshotHeader,
    economy: Economy,
    rng: SimRng,
    day_order: Vec<AgentId>,
    last_state_hash: u64,
}

// ---------------------------------------------------------------------------
// Simulation serialization methods
// ---------------------------------------------------------------------------

impl Simulation {
    pub fn serialize(&self) -> Result<Vec<u8>, SerializeError> {
        let snapshot = SimulationSnapshot {
            header: SnapshotHeader::new(self.day),
            economy: self.economy.clone(),
            rng: self.rng.clone(),
            day_order: self.day_order.clone(),
            last_state_hash: self.last_state_hash,
        };
        bitcode::serialize(&snapshot).map_err(|e| SerializeError::Encode(e.to_string()))
    }

    /// Restore a simulation. The header is validated before anything else is
    /// used; a mismatch is an error, never a panic.
    pub fn deserialize(data: &[u8]) -> Result<Self, DeserializeError> {
        let snapshot: SimulationSnapshot =
            bitcode::deserialize(data).map_err(|e| DeserializeError::Decode(e.to_string()))?;
        snapshot.header.validate()?;

        Ok(Simulation {
            economy: snapshot.economy,
            rng: snapshot.rng,
            day_order: snapshot.day_order,
            day: snapshot.header.day,
            last_state_hash: snapshot.last_state_hash,
        })
    }
}

//! Snapshot encodings: JSON text and a compact binary form.
//!
//! The binary form is `bitcode` with a versioned header, so a file from an
//! incompatible build is rejected before the payload is interpreted.

use crate::schema::GraphSnapshot;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic number identifying a binary graph snapshot.
pub const SNAPSHOT_MAGIC: u32 = 0x4D57_0001;

/// Current binary format version. Increment when breaking the layout.
pub const FORMAT_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("bitcode encoding failed: {0}")]
    Encode(String),
    #[error("bitcode decoding failed: {0}")]
    Decode(String),
    #[error("invalid magic number: expected 0x{:08X}, got 0x{:08X}", SNAPSHOT_MAGIC, .0)]
    InvalidMagic(u32),
    #[error("unsupported format version: expected {}, got {}", FORMAT_VERSION, .0)]
    UnsupportedVersion(u32),
    #[error("snapshot from future version {0} (this build supports up to {FORMAT_VERSION})")]
    FutureVersion(u32),
}

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotHeader {
    pub magic: u32,
    pub version: u32,
}

impl SnapshotHeader {
    pub fn new() -> Self {
        Self {
            magic: SNAPSHOT_MAGIC,
            version: FORMAT_VERSION,
        }
    }

    pub fn validate(&self) -> Result<(), CodecError> {
        if self.magic != SNAPSHOT_MAGIC {
            return Err(CodecError::InvalidMagic(self.magic));
        }
        if self.version > FORMAT_VERSION {
            return Err(CodecError::FutureVersion(self.version));
        }
        if self.version < FORMAT_VERSION {
            return Err(CodecError::UnsupportedVersion(self.version));
        }
        Ok(())
    }
}

impl Default for SnapshotHeader {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize, Deserialize)]
struct Envelope {
    header: SnapshotHeader,
    snapshot: GraphSnapshot,
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

pub fn to_json(snapshot: &GraphSnapshot) -> Result<String, CodecError> {
    Ok(serde_json::to_string(snapshot)?)
}

pub fn to_json_pretty(snapshot: &GraphSnapshot) -> Result<String, CodecError> {
    Ok(serde_json::to_string_pretty(snapshot)?)
}

pub fn from_json(text: &str) -> Result<GraphSnapshot, CodecError> {
    Ok(serde_json::from_str(text)?)
}

// ---------------------------------------------------------------------------
// Binary
// ---------------------------------------------------------------------------

pub fn to_bytes(snapshot: &GraphSnapshot) -> Result<Vec<u8>, CodecError> {
    let envelope = Envelope {
        header: SnapshotHeader::new(),
        snapshot: snapshot.clone(),
    };
    bitcode::serialize(&envelope).map_err(|e| CodecError::Encode(e.to_string()))
}

pub fn from_bytes(data: &[u8]) -> Result<GraphSnapshot, CodecError> {
    let envelope: Envelope =
        bitcode::deserialize(data).map_err(|e| CodecError::Decode(e.to_string()))?;
    envelope.header.validate()?;
    Ok(envelope.snapshot)
}

/// Decode only far enough to report the header.
pub fn read_header(data: &[u8]) -> Result<SnapshotHeader, CodecError> {
    let envelope: Envelope =
        bitcode::deserialize(data).map_err(|e| CodecError::Decode(e.to_string()))?;
    Ok(envelope.header)
}

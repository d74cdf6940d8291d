//! Serialization utilities for simulation state.

use crate::session::SessionSummary;
use crate::terrain::TerrainSnapshot;
use crate::world::Snapshot;

/// Serialize a snapshot to a JSON string.
pub fn snapshot_to_json_string(snapshot: &Snapshot) -> Result<String, serde_json::Error> {
    serde_json::to_string(snapshot)
}

pub fn terrain_to_json_string(terrain: &TerrainSnapshot) -> Result<String, serde_json::Error> {
    serde_json::to_string(terrain)
}

/// Session-end request body.
pub fn summary_to_json_string(summary: &SessionSummary) -> Result<String, serde_json::Error> {
    serde_json::to_string(summary)
}

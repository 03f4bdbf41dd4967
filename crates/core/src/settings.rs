use serde::{Deserialize, Serialize};

/// Tolerances used by face picking and edge-based plane resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickSettings {
    /// Two faces whose |dot(normal, view)| differ by at most this are both picked.
    pub face_tie_epsilon: f32,
    /// Squared-distance margin for preferring a new closest edge.
    pub edge_dist_epsilon: f32,
    /// Squared length below which a clipped edge counts as a point.
    pub edge_length_epsilon: f32,
    /// Extents under this are inflated before direct ray picking.
    pub flat_extent_threshold: f32,
    pub flat_extent_inflate: f32,
    pub plane_epsilon: f32,
}

impl Default for PickSettings {
    fn default() -> Self {
        Self {
            face_tie_epsilon: 0.03,
            edge_dist_epsilon: 0.01,
            edge_length_epsilon: 1.0e-3,
            flat_extent_threshold: 1.0,
            flat_extent_inflate: 4.0,
            plane_epsilon: 1.0e-4,
        }
    }
}

//! Events emitted by the simulation for audio and debug feedback.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Fire-and-forget audio cue for the host's sound system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AudioCue {
    /// Weapon discharge.
    Fire {
        position: Vec3,
        velocity: Vec3,
        volume: f32,
    },
    /// Target destroyed, played at its last known position.
    Explosion {
        position: Vec3,
        velocity: Vec3,
        volume: f32,
    },
}

impl AudioCue {
    pub fn volume(&self) -> f32 {
        match self {
            AudioCue::Fire { volume, .. } | AudioCue::Explosion { volume, .. } => *volume,
        }
    }
}

/// Debug visualisation emitted for a single frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DebugPrimitive {
    /// Cylinder from `start` to `end` (laser weapons).
    Beam {
        start: Vec3,
        end: Vec3,
        radius: f32,
        color: [f32; 4],
    },
}

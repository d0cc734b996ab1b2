//! Input commands delivered to the session by the host.
//!
//! Commands are queued and processed at the next frame boundary, before
//! the simulation step.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::types::CFrame;

/// All possible player and debug-pane actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum InputCommand {
    // --- Weapon ---
    /// Pull the trigger once.
    Fire,
    /// Switch between hitscan and ballistic fire.
    SetHitscan { enabled: bool },

    // --- Targets ---
    SpawnTarget { position: Vec3, scale: f32 },
    DestroyTarget { index: usize },

    // --- Camera ---
    /// Move the camera to a new pose.
    MoveCamera { frame: CFrame },

    // --- Debug pane ---
    /// Set the display lag in frames (clamped to 0..=60).
    SetDisplayLag { frames: i32 },
    SetReticle { index: i32 },
    SetBrightness { value: f32 },
    /// Request a new frame rate in Hz.
    SetFrameRate { hz: f32 },
}

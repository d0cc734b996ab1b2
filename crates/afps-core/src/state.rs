//! Session snapshot: the visible state handed to the host after each frame.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::enums::{CompositorState, ProjectileMotion};
use crate::events::AudioCue;
use crate::types::SimTime;

/// Complete session state after a frame.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub time: SimTime,
    pub targets: Vec<TargetView>,
    pub projectiles: Vec<ProjectileView>,
    pub display: DisplayView,
    pub reticle_index: usize,
    pub scene_brightness: f32,
    pub hit_scan: bool,
    pub audio_cues: Vec<AudioCue>,
    pub score: ScoreView,
}

/// A live target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetView {
    pub id: u32,
    pub name: String,
    /// Spawn anchor of the target's orbit track.
    pub position: Vec3,
    pub scale_bucket: usize,
}

/// An in-flight projectile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectileView {
    pub name: String,
    pub position: Vec3,
    pub remaining_secs: f32,
    pub motion: ProjectileMotion,
}

/// Display-lag compositor status.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisplayView {
    pub state: CompositorState,
    pub lag_frames: usize,
    /// Allocated delay buffers (never shrinks).
    pub buffer_len: usize,
    pub current_index: usize,
    /// Seconds per frame currently requested from the host.
    pub frame_duration_secs: f64,
}

/// Running counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreView {
    pub shots_fired: u32,
    pub hits: u32,
    pub targets_spawned: u32,
    pub targets_destroyed: u32,
    pub projectiles_expired: u32,
    pub waves_spawned: u32,
}

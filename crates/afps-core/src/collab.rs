//! Capabilities the host engine must provide.
//!
//! The simulation never owns entity memory or GPU resources; it talks to
//! the host through these traits and holds only opaque handles.

use crate::enums::ImageFormat;
use crate::events::AudioCue;
use crate::types::{CFrame, EntityId, HitInfo, ModelId, Ray, RenderTargetId, Track};

/// Scene graph, entity factory and intersection queries.
pub trait Scene {
    /// Create a visible entity. It is not part of the scene until `insert`.
    fn create_entity(&mut self, name: &str, model: ModelId, frame: CFrame) -> EntityId;

    /// Make a created entity visible and intersectable.
    fn insert(&mut self, entity: EntityId);

    /// Remove an entity by name. Returns false if no such entity exists.
    fn remove_entity(&mut self, name: &str) -> bool;

    fn set_should_be_saved(&mut self, entity: EntityId, value: bool);
    fn set_can_cause_collisions(&mut self, entity: EntityId, value: bool);
    fn set_casts_shadows(&mut self, entity: EntityId, value: bool);

    /// Attach a motion behaviour the scene drives on its own clock.
    fn set_track(&mut self, entity: EntityId, track: Track);

    fn frame(&self, entity: EntityId) -> Option<CFrame>;
    fn set_frame(&mut self, entity: EntityId, frame: CFrame);

    /// Closest hit among inserted, collidable entities not in `exclude`,
    /// no farther than `max_distance`.
    fn intersect(&self, ray: &Ray, max_distance: f32, exclude: &[EntityId]) -> Option<HitInfo>;

    /// Test one entity's bounds. On a hit no farther than `*distance`,
    /// shrinks `*distance` to the hit distance and returns true.
    fn intersect_entity(&self, entity: EntityId, ray: &Ray, distance: &mut f32) -> bool;

    /// Advance the scene's own clock (motion tracks, animation).
    fn advance(&mut self, _dt: f32) {}
}

/// Render-target allocation and output redirection.
pub trait RenderDevice {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    fn create_empty(
        &mut self,
        label: &str,
        width: u32,
        height: u32,
        format: ImageFormat,
    ) -> RenderTargetId;

    /// Redirect subsequent rendering into `target`.
    fn push_target(&mut self, target: RenderTargetId);

    /// Restore the previous rendering destination.
    fn pop_target(&mut self);

    /// Draw `target` full-screen to the current destination.
    fn present(&mut self, target: RenderTargetId);

    /// The host's 3D pass for frame `frame_index`, drawn into the current destination.
    fn render_scene(&mut self, frame_index: u64);
}

/// Sound output.
pub trait AudioSink {
    fn play(&mut self, cue: AudioCue);
}

/// Buffering sink: cues are collected and handed to the host later.
impl AudioSink for Vec<AudioCue> {
    fn play(&mut self, cue: AudioCue) {
        self.push(cue);
    }
}

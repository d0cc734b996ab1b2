//! Target registry: spawns and destroys destructible targets.
//!
//! A target is either in the active collection and in the scene, or in
//! neither. Removal uses swap-remove, so indices of later targets may
//! change after a destroy.

use glam::Vec3;
use log::{info, warn};

use afps_core::collab::{AudioSink, Scene};
use afps_core::constants::*;
use afps_core::events::AudioCue;
use afps_core::state::TargetView;
use afps_core::types::{CFrame, EntityId, ModelId, Track};

/// A live target.
#[derive(Debug, Clone)]
pub struct Target {
    /// Unique, monotonically increasing id (also encoded in `name`).
    pub id: u32,
    pub name: String,
    pub entity: EntityId,
    /// Anchor of the target's orbit track.
    pub position: Vec3,
    pub scale: f32,
    pub scale_bucket: usize,
}

impl Target {
    pub fn view(&self) -> TargetView {
        TargetView {
            id: self.id,
            name: self.name.clone(),
            position: self.position,
            scale_bucket: self.scale_bucket,
        }
    }
}

/// Model bucket for a scale factor:
/// `clamp(round(ln(scale) / ln(1 + step) + offset), 0, bucket_count - 1)`.
/// Non-positive scales land in bucket 0.
pub fn scale_bucket(scale: f32, bucket_count: usize) -> usize {
    if bucket_count == 0 {
        return 0;
    }
    let max_bucket = (bucket_count - 1) as f32;
    let raw = (scale.ln() / (1.0 + TARGET_MODEL_ARRAY_SCALING).ln() + TARGET_MODEL_ARRAY_OFFSET)
        .round();
    if raw.is_nan() {
        return 0;
    }
    raw.clamp(0.0, max_bucket) as usize
}

/// Scale factor the model in bucket `index` is built at.
pub fn bucket_scale(index: usize) -> f32 {
    (1.0 + TARGET_MODEL_ARRAY_SCALING).powf(index as f32 - TARGET_MODEL_ARRAY_OFFSET)
}

/// Active target collection plus the pre-built model array.
#[derive(Debug, Clone)]
pub struct TargetRegistry {
    targets: Vec<Target>,
    models: Vec<ModelId>,
    last_unique_id: u32,
}

impl TargetRegistry {
    /// `models[i]` must be the target model built at `bucket_scale(i)`.
    pub fn new(models: Vec<ModelId>) -> Self {
        Self {
            targets: Vec::new(),
            models,
            last_unique_id: 0,
        }
    }

    /// Spawn a target orbiting `position`. The new target is in the scene and
    /// intersectable when this returns. Returns `None` only when no models
    /// were supplied.
    pub fn spawn<S: Scene + ?Sized>(
        &mut self,
        scene: &mut S,
        position: Vec3,
        scale: f32,
    ) -> Option<&Target> {
        if self.models.is_empty() {
            warn!("cannot spawn target: no target models registered");
            return None;
        }

        let bucket = scale_bucket(scale, self.models.len());
        self.last_unique_id += 1;
        let id = self.last_unique_id;
        let name = format!("target{id:03}");

        let entity = scene.create_entity(&name, self.models[bucket], CFrame::IDENTITY);
        scene.set_track(
            entity,
            Track::Orbit {
                radius: TARGET_ORBIT_RADIUS,
                period_secs: TARGET_ORBIT_PERIOD_SECS,
                base: CFrame::from_translation(position),
            },
        );
        scene.set_should_be_saved(entity, false);

        self.targets.push(Target {
            id,
            name,
            entity,
            position,
            scale,
            scale_bucket: bucket,
        });
        scene.insert(entity);

        let target = self.targets.last()?;
        info!(
            "spawned {} at ({:.2}, {:.2}, {:.2}), bucket {}",
            target.name, position.x, position.y, position.z, bucket
        );
        Some(target)
    }

    /// Remove the target at `index` from the collection and the scene.
    /// Out-of-range indices are a logged no-op.
    pub fn destroy<S: Scene + ?Sized>(
        &mut self,
        scene: &mut S,
        audio: Option<&mut dyn AudioSink>,
        index: usize,
    ) -> Option<Target> {
        if index >= self.targets.len() {
            warn!(
                "destroy_target({index}) ignored: only {} targets",
                self.targets.len()
            );
            return None;
        }

        // Collection first, then the scene.
        let target = self.targets.swap_remove(index);
        let position = scene
            .frame(target.entity)
            .map(|f| f.translation)
            .unwrap_or(target.position);
        scene.remove_entity(&target.name);

        if let Some(audio) = audio {
            audio.play(AudioCue::Explosion {
                position,
                velocity: Vec3::ZERO,
                volume: EXPLOSION_VOLUME,
            });
        }

        info!("destroyed {}", target.name);
        Some(target)
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn get(&self, index: usize) -> Option<&Target> {
        self.targets.get(index)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Current index of the target backed by `entity`.
    pub fn index_of(&self, entity: EntityId) -> Option<usize> {
        self.targets.iter().position(|t| t.entity == entity)
    }

    pub fn model_count(&self) -> usize {
        self.models.len()
    }
}

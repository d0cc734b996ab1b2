//! Weapon: view-model pose, firing and projectile ownership.

use glam::Vec3;
use log::{debug, warn};

use afps_core::collab::{AudioSink, Scene};
use afps_core::config::WeaponConfig;
use afps_core::constants::*;
use afps_core::enums::ShotVisual;
use afps_core::events::{AudioCue, DebugPrimitive};
use afps_core::types::{CFrame, Camera, EntityId, HitInfo, ModelId};

use crate::projectile::{self, Projectile, ProjectileHit};
use crate::targets::Target;

/// Pose of the first-person weapon model for this frame and the last one
/// (for motion blur).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewModelPose {
    pub frame: CFrame,
    pub previous_frame: CFrame,
}

/// A target struck by a hitscan shot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetHit {
    /// Index into the target slice passed to `fire`.
    pub index: usize,
    pub entity: EntityId,
    pub distance: f32,
}

/// Everything a single trigger pull produced.
#[derive(Debug, Clone, PartialEq)]
pub struct FireOutcome {
    pub hit: Option<TargetHit>,
    /// Closest registered hit distance (world geometry or target), +inf if none.
    pub closest: f32,
    /// Closest non-target scene hit.
    pub world_hit: Option<HitInfo>,
    /// Projectile entity spawned by this shot.
    pub projectile: Option<EntityId>,
    pub beam: Option<DebugPrimitive>,
}

impl FireOutcome {
    fn miss() -> Self {
        Self {
            hit: None,
            closest: f32::INFINITY,
            world_hit: None,
            projectile: None,
            beam: None,
        }
    }
}

/// Weapon offset from the camera, lowered and pulled in as the player looks up.
pub fn view_model_offset(look_y: f32) -> CFrame {
    let y_scale = VIEW_MODEL_Y_SCALE;
    let z_scale = -y_scale * 0.5;
    CFrame::from_xyz_ypr_degrees(
        VIEW_MODEL_OFFSET[0],
        VIEW_MODEL_OFFSET[1] + look_y * y_scale,
        VIEW_MODEL_OFFSET[2] + look_y * z_scale,
        VIEW_MODEL_YAW_DEGREES,
        VIEW_MODEL_PITCH_DEGREES,
        0.0,
    )
}

pub struct Weapon {
    config: WeaponConfig,
    bullet_model: ModelId,
    /// World frame of the weapon, refreshed by `pose`.
    frame: CFrame,
    projectiles: Vec<Projectile>,
    last_bullet_id: u32,
}

impl Weapon {
    /// A non-positive or non-finite bullet speed falls back to the default.
    pub fn new(mut config: WeaponConfig, bullet_model: ModelId) -> Self {
        if !(config.bullet_speed.is_finite() && config.bullet_speed > 0.0) {
            let fallback = WeaponConfig::default().bullet_speed;
            warn!("bullet speed {} is invalid, using {fallback}", config.bullet_speed);
            config.bullet_speed = fallback;
        }
        Self {
            config,
            bullet_model,
            frame: CFrame::IDENTITY,
            projectiles: Vec::new(),
            last_bullet_id: 0,
        }
    }

    pub fn config(&self) -> &WeaponConfig {
        &self.config
    }

    pub fn set_hit_scan(&mut self, enabled: bool) {
        self.config.hit_scan = enabled;
    }

    pub fn frame(&self) -> CFrame {
        self.frame
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    /// Refresh the weapon frame from the camera. Returns the view-model pose
    /// when the model is drawn.
    pub fn pose(&mut self, camera: &Camera) -> Option<ViewModelPose> {
        if !self.config.needs_weapon_frame() {
            return None;
        }
        let look_y = camera.frame.look_vector().y;
        self.frame = camera.frame * view_model_offset(look_y);

        if !self.config.render_model {
            return None;
        }
        let previous_look_y = camera.previous_frame.look_vector().y;
        Some(ViewModelPose {
            frame: self.frame,
            previous_frame: camera.previous_frame * view_model_offset(previous_look_y),
        })
    }

    /// Pull the trigger.
    ///
    /// Hitscan: the camera look ray is tested against the scene with all
    /// targets, live projectiles and `dont_hit` excluded, then against each
    /// target not in `dont_hit`. Every target hit no farther than the
    /// current closest distance becomes the reported hit, so on equal
    /// distances the later target in collection order wins. The target is
    /// not destroyed here.
    ///
    /// Ballistic: a projectile is launched along the aim direction and
    /// collides during simulation; no immediate hit is reported.
    pub fn fire<S: Scene + ?Sized>(
        &mut self,
        scene: &mut S,
        audio: Option<&mut dyn AudioSink>,
        camera: &Camera,
        targets: &[Target],
        dont_hit: &[EntityId],
    ) -> FireOutcome {
        let mut outcome = FireOutcome::miss();

        if self.config.hit_scan {
            let ray = camera.look_ray();

            let mut exclude: Vec<EntityId> = dont_hit.to_vec();
            exclude.extend(targets.iter().map(|t| t.entity));
            exclude.extend(self.projectiles.iter().map(|p| p.entity));

            // Closest scene hit, otherwise the ray hits the skybox.
            let world_hit = scene.intersect(&ray, f32::INFINITY, &exclude);
            let mut closest = world_hit.map(|h| h.distance).unwrap_or(f32::INFINITY);

            if self.config.render_bullets {
                let aim_point = world_hit.map(|h| h.point).unwrap_or_else(|| {
                    camera.frame.translation + camera.frame.look_vector() * AIM_DISTANCE
                });
                let start = self.muzzle_frame(aim_point);

                match self.config.shot_visual() {
                    ShotVisual::Bullet => {
                        let lifetime = closest.min(MAX_BULLET_TRAVEL) / self.config.bullet_speed;
                        let (entity, name) = self.create_bullet(scene, start);
                        self.projectiles.push(Projectile::linear(
                            entity,
                            name,
                            self.config.bullet_speed,
                            lifetime,
                        ));
                        scene.insert(entity);
                        outcome.projectile = Some(entity);
                    }
                    ShotVisual::Laser => {
                        outcome.beam = Some(DebugPrimitive::Beam {
                            start: start.translation,
                            end: aim_point,
                            radius: LASER_BEAM_RADIUS,
                            color: LASER_BEAM_COLOR,
                        });
                    }
                }
            }

            let mut closest_index = None;
            for (t, target) in targets.iter().enumerate() {
                if dont_hit.contains(&target.entity) {
                    continue;
                }
                if scene.intersect_entity(target.entity, &ray, &mut closest) {
                    closest_index = Some(t);
                }
            }

            outcome.closest = closest;
            outcome.world_hit = world_hit;
            outcome.hit = closest_index.map(|index| TargetHit {
                index,
                entity: targets[index].entity,
                distance: closest,
            });
        } else {
            let aim_point = camera.frame.translation + camera.frame.look_vector() * AIM_DISTANCE;
            let start = self.muzzle_frame(aim_point);
            let velocity = start.look_vector() * self.config.bullet_speed;
            let lifetime = MAX_BULLET_TRAVEL / self.config.bullet_speed;
            let (entity, name) = self.create_bullet(scene, start);
            self.projectiles.push(Projectile::ballistic(
                entity,
                name,
                velocity,
                BALLISTIC_GRAVITY,
                lifetime,
            ));
            scene.insert(entity);
            outcome.projectile = Some(entity);
        }

        if self.config.plays_fire_sound() {
            if let Some(audio) = audio {
                audio.play(AudioCue::Fire {
                    position: camera.frame.translation,
                    velocity: camera.frame.look_vector() * FIRE_CUE_VELOCITY_SCALE,
                    volume: self.config.fire_sound_volume,
                });
            }
        }

        debug!(
            "fire: hit={:?} closest={:.3} projectile={:?}",
            outcome.hit.map(|h| h.index),
            outcome.closest,
            outcome.projectile
        );
        outcome
    }

    /// Advance projectiles one tick; see `projectile::simulate`.
    pub fn on_simulation<S: Scene + ?Sized>(
        &mut self,
        scene: &mut S,
        targets: &[Target],
        dt: f32,
        hits: &mut Vec<ProjectileHit>,
    ) -> u32 {
        projectile::simulate(&mut self.projectiles, scene, targets, dt, hits)
    }

    /// Weapon frame moved to the muzzle and turned toward `aim_point`.
    fn muzzle_frame(&self, aim_point: Vec3) -> CFrame {
        let mut frame = self.frame;
        frame.translation += self.config.muzzle_offset;
        frame.look_at(aim_point);
        frame
    }

    fn create_bullet<S: Scene + ?Sized>(&mut self, scene: &mut S, frame: CFrame) -> (EntityId, String) {
        self.last_bullet_id += 1;
        let name = format!("bullet{:03}", self.last_bullet_id);
        let entity = scene.create_entity(&name, self.bullet_model, frame);
        scene.set_should_be_saved(entity, false);
        scene.set_can_cause_collisions(entity, false);
        scene.set_casts_shadows(entity, false);
        (entity, name)
    }
}

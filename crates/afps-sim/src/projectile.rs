//! In-flight projectiles and their per-tick update.

use glam::Vec3;
use log::debug;

use afps_core::collab::Scene;
use afps_core::enums::ProjectileMotion;
use afps_core::state::ProjectileView;
use afps_core::types::{EntityId, Ray};

use crate::targets::Target;

/// One fired shot. The visual entity belongs to the scene; the projectile
/// only holds its handle and name.
#[derive(Debug, Clone)]
pub struct Projectile {
    pub entity: EntityId,
    pub name: String,
    pub motion: ProjectileMotion,
    /// Speed along the look vector (linear motion).
    pub speed: f32,
    /// Current velocity (ballistic motion).
    pub velocity: Vec3,
    /// Downward acceleration (ballistic motion).
    pub gravity: f32,
    remaining_secs: f32,
}

impl Projectile {
    /// A tracer that flies straight ahead at `speed` for `lifetime_secs`.
    pub fn linear(entity: EntityId, name: String, speed: f32, lifetime_secs: f32) -> Self {
        Self {
            entity,
            name,
            motion: ProjectileMotion::Linear,
            speed,
            velocity: Vec3::ZERO,
            gravity: 0.0,
            remaining_secs: lifetime_secs,
        }
    }

    /// A ballistic round launched with `velocity` under `gravity`.
    pub fn ballistic(
        entity: EntityId,
        name: String,
        velocity: Vec3,
        gravity: f32,
        lifetime_secs: f32,
    ) -> Self {
        Self {
            entity,
            name,
            motion: ProjectileMotion::Ballistic,
            speed: velocity.length(),
            velocity,
            gravity,
            remaining_secs: lifetime_secs,
        }
    }

    pub fn remaining_secs(&self) -> f32 {
        self.remaining_secs
    }

    /// Move the visual entity one tick and burn `dt` of lifetime.
    /// Returns the swept segment, or `None` if the entity is gone.
    pub fn on_simulation<S: Scene + ?Sized>(&mut self, scene: &mut S, dt: f32) -> Option<(Vec3, Vec3)> {
        self.remaining_secs -= dt;

        let mut frame = scene.frame(self.entity)?;
        let start = frame.translation;
        match self.motion {
            ProjectileMotion::Linear => {
                frame.translation += frame.look_vector() * self.speed * dt;
            }
            ProjectileMotion::Ballistic => {
                self.velocity += Vec3::NEG_Y * self.gravity * dt;
                frame.translation += self.velocity * dt;
                let ahead = frame.translation + self.velocity;
                frame.look_at(ahead);
            }
        }
        scene.set_frame(self.entity, frame);
        Some((start, frame.translation))
    }

    pub fn view<S: Scene + ?Sized>(&self, scene: &S) -> ProjectileView {
        ProjectileView {
            name: self.name.clone(),
            position: scene
                .frame(self.entity)
                .map(|f| f.translation)
                .unwrap_or(Vec3::ZERO),
            remaining_secs: self.remaining_secs,
            motion: self.motion,
        }
    }
}

/// A ballistic projectile struck a target during simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectileHit {
    pub projectile: String,
    pub target: EntityId,
    /// Target index at the moment of the hit.
    pub target_index: usize,
    pub point: Vec3,
}

/// First target (in collection order) whose bounds the segment crosses.
fn sweep_targets<S: Scene + ?Sized>(
    scene: &S,
    targets: &[Target],
    start: Vec3,
    end: Vec3,
) -> Option<(usize, EntityId, Vec3)> {
    let length = (end - start).length();
    if length <= f32::EPSILON {
        return None;
    }
    let ray = Ray::new(start, end - start);
    targets.iter().enumerate().find_map(|(index, target)| {
        let mut distance = length;
        scene
            .intersect_entity(target.entity, &ray, &mut distance)
            .then(|| (index, target.entity, ray.point_at(distance)))
    })
}

/// Advance every projectile one tick.
///
/// Expired projectiles (remaining time <= 0 after the decrement) and
/// ballistic projectiles that struck a target are removed from the
/// collection and the scene. Removal swaps the last projectile into the
/// freed slot and revisits that slot, so each projectile is updated exactly
/// once. Returns the number that expired.
pub fn simulate<S: Scene + ?Sized>(
    projectiles: &mut Vec<Projectile>,
    scene: &mut S,
    targets: &[Target],
    dt: f32,
    hits: &mut Vec<ProjectileHit>,
) -> u32 {
    let mut expired = 0;
    let mut p = 0;
    while p < projectiles.len() {
        let projectile = &mut projectiles[p];
        let segment = projectile.on_simulation(scene, dt);

        let hit = match (projectile.motion, segment) {
            (ProjectileMotion::Ballistic, Some((start, end))) => {
                sweep_targets(scene, targets, start, end)
            }
            _ => None,
        };
        let timed_out = projectile.remaining_secs <= 0.0;

        if hit.is_none() && !timed_out {
            p += 1;
            continue;
        }

        let removed = projectiles.swap_remove(p);
        scene.remove_entity(&removed.name);
        match hit {
            Some((target_index, target, point)) => {
                debug!("{} hit target at index {target_index}", removed.name);
                hits.push(ProjectileHit {
                    projectile: removed.name,
                    target,
                    target_index,
                    point,
                });
            }
            None => {
                debug!("{} expired", removed.name);
                expired += 1;
            }
        }
    }
    expired
}

//! `hecs`-backed scene graph.
//!
//! Entities are spawned as component bundles; only entities carrying the
//! `InScene` marker are visible to queries. `EntityId` is the hecs entity
//! bit pattern, so handles stay valid until the entity is removed.

use std::f32::consts::TAU;

use glam::{Mat3, Vec3};
use hecs::{Entity, World};
use log::{debug, warn};

use afps_core::collab::Scene;
use afps_core::types::{CFrame, EntityId, HitInfo, ModelId, Ray, Track};

use crate::geometry::Shape;

/// Entity name, unique within the scene.
#[derive(Debug, Clone)]
pub struct Name(pub String);

/// Model used to draw and collide the entity.
#[derive(Debug, Clone, Copy)]
pub struct Visual {
    pub model: ModelId,
}

/// Per-entity render/physics switches.
#[derive(Debug, Clone, Copy)]
pub struct EntityFlags {
    pub should_be_saved: bool,
    pub can_cause_collisions: bool,
    pub casts_shadows: bool,
}

impl Default for EntityFlags {
    fn default() -> Self {
        Self {
            should_be_saved: true,
            can_cause_collisions: true,
            casts_shadows: true,
        }
    }
}

/// Marks an entity as inserted (visible and intersectable).
#[derive(Debug, Clone, Copy)]
pub struct InScene;

/// Motion behaviour driven by `MemoryScene::advance`.
#[derive(Debug, Clone, Copy)]
pub struct Motion(pub Track);

#[derive(Debug, Clone)]
struct ModelEntry {
    name: String,
    shape: Shape,
}

/// Reference scene used by tests and the headless driver.
#[derive(Default)]
pub struct MemoryScene {
    world: World,
    models: Vec<ModelEntry>,
    /// Seconds of scene time, drives motion tracks.
    clock_secs: f32,
}

fn to_id(entity: Entity) -> EntityId {
    EntityId(entity.to_bits().get())
}

fn to_entity(id: EntityId) -> Option<Entity> {
    Entity::from_bits(id.0)
}

/// Pose of a tracked entity at scene time `clock_secs`.
fn track_frame(track: &Track, clock_secs: f32) -> CFrame {
    match *track {
        Track::Orbit {
            radius,
            period_secs,
            base,
        } => {
            let angle = if period_secs > 0.0 {
                TAU * clock_secs / period_secs
            } else {
                0.0
            };
            let offset = Vec3::new(radius * angle.cos(), 0.0, radius * angle.sin());
            CFrame::new(
                base.rotation * Mat3::from_rotation_y(angle),
                base.translation + offset,
            )
        }
    }
}

impl MemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model and its collision shape.
    pub fn register_model(&mut self, name: &str, shape: Shape) -> ModelId {
        self.models.push(ModelEntry {
            name: name.to_string(),
            shape,
        });
        ModelId(self.models.len() as u32 - 1)
    }

    pub fn model_name(&self, model: ModelId) -> Option<&str> {
        self.models.get(model.0 as usize).map(|m| m.name.as_str())
    }

    pub fn model_shape(&self, model: ModelId) -> Option<Shape> {
        self.models.get(model.0 as usize).map(|m| m.shape)
    }

    /// Add a static, collidable box (hallway walls, floors).
    pub fn add_wall(&mut self, name: &str, center: Vec3, half_extents: Vec3) -> EntityId {
        let model = self.register_model(name, Shape::Box { half_extents });
        let id = self.create_entity(name, model, CFrame::from_translation(center));
        self.insert(id);
        id
    }

    pub fn clock_secs(&self) -> f32 {
        self.clock_secs
    }

    /// Find an entity by name (inserted or not).
    pub fn find(&self, name: &str) -> Option<EntityId> {
        let mut query = self.world.query::<&Name>();
        query
            .iter()
            .find(|(_, n)| n.0 == name)
            .map(|(entity, _)| to_id(entity))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    pub fn is_inserted(&self, id: EntityId) -> bool {
        to_entity(id)
            .map(|e| self.world.get::<&InScene>(e).is_ok())
            .unwrap_or(false)
    }

    pub fn name(&self, id: EntityId) -> Option<String> {
        let entity = to_entity(id)?;
        self.world.get::<&Name>(entity).ok().map(|n| n.0.clone())
    }

    pub fn flags(&self, id: EntityId) -> Option<EntityFlags> {
        let entity = to_entity(id)?;
        self.world.get::<&EntityFlags>(entity).ok().map(|f| *f)
    }

    pub fn model(&self, id: EntityId) -> Option<ModelId> {
        let entity = to_entity(id)?;
        self.world.get::<&Visual>(entity).ok().map(|v| v.model)
    }

    /// Number of entities currently inserted.
    pub fn inserted_count(&self) -> usize {
        let mut query = self.world.query::<&InScene>();
        query.iter().count()
    }

    fn shape_of(&self, visual: &Visual) -> Option<Shape> {
        self.model_shape(visual.model)
    }
}

impl Scene for MemoryScene {
    fn create_entity(&mut self, name: &str, model: ModelId, frame: CFrame) -> EntityId {
        if self.model_shape(model).is_none() {
            warn!("entity {name} created with unregistered model {}", model.0);
        }
        let entity = self.world.spawn((
            Name(name.to_string()),
            Visual { model },
            frame,
            EntityFlags::default(),
        ));
        to_id(entity)
    }

    fn insert(&mut self, id: EntityId) {
        match to_entity(id) {
            Some(entity) if self.world.contains(entity) => {
                if let Err(e) = self.world.insert_one(entity, InScene) {
                    warn!("insert of entity {}: {e}", id.0);
                }
            }
            _ => warn!("insert of unknown entity {}", id.0),
        }
    }

    fn remove_entity(&mut self, name: &str) -> bool {
        let Some(id) = self.find(name) else {
            debug!("remove_entity: no entity named {name}");
            return false;
        };
        to_entity(id)
            .map(|entity| self.world.despawn(entity).is_ok())
            .unwrap_or(false)
    }

    fn set_should_be_saved(&mut self, id: EntityId, value: bool) {
        if let Some(mut flags) = to_entity(id).and_then(|e| self.world.get::<&mut EntityFlags>(e).ok()) {
            flags.should_be_saved = value;
        }
    }

    fn set_can_cause_collisions(&mut self, id: EntityId, value: bool) {
        if let Some(mut flags) = to_entity(id).and_then(|e| self.world.get::<&mut EntityFlags>(e).ok()) {
            flags.can_cause_collisions = value;
        }
    }

    fn set_casts_shadows(&mut self, id: EntityId, value: bool) {
        if let Some(mut flags) = to_entity(id).and_then(|e| self.world.get::<&mut EntityFlags>(e).ok()) {
            flags.casts_shadows = value;
        }
    }

    fn set_track(&mut self, id: EntityId, track: Track) {
        let Some(entity) = to_entity(id) else {
            warn!("set_track on unknown entity {}", id.0);
            return;
        };
        // Pose immediately so the entity is intersectable before the next advance.
        let frame = track_frame(&track, self.clock_secs);
        if let Ok(mut current) = self.world.get::<&mut CFrame>(entity) {
            *current = frame;
        }
        if let Err(e) = self.world.insert_one(entity, Motion(track)) {
            warn!("set_track on entity {}: {e}", id.0);
        }
    }

    fn frame(&self, id: EntityId) -> Option<CFrame> {
        let entity = to_entity(id)?;
        self.world.get::<&CFrame>(entity).ok().map(|f| *f)
    }

    fn set_frame(&mut self, id: EntityId, frame: CFrame) {
        if let Some(mut current) = to_entity(id).and_then(|e| self.world.get::<&mut CFrame>(e).ok()) {
            *current = frame;
        }
    }

    fn intersect(&self, ray: &Ray, max_distance: f32, exclude: &[EntityId]) -> Option<HitInfo> {
        let mut best: Option<HitInfo> = None;
        let mut best_distance = max_distance;

        let mut query = self
            .world
            .query::<(&CFrame, &Visual, &EntityFlags)>()
            .with::<&InScene>();
        for (entity, (frame, visual, flags)) in query.iter() {
            if !flags.can_cause_collisions {
                continue;
            }
            let id = to_id(entity);
            if exclude.contains(&id) {
                continue;
            }
            let Some(shape) = self.shape_of(visual) else {
                continue;
            };
            if let Some((t, normal)) = shape.intersect(frame, ray) {
                if t <= best_distance && (best.is_none() || t < best_distance) {
                    best_distance = t;
                    best = Some(HitInfo {
                        point: ray.point_at(t),
                        normal,
                        distance: t,
                        entity: Some(id),
                    });
                }
            }
        }

        best
    }

    fn intersect_entity(&self, id: EntityId, ray: &Ray, distance: &mut f32) -> bool {
        let Some(entity) = to_entity(id) else {
            return false;
        };
        if self.world.get::<&InScene>(entity).is_err() {
            return false;
        }
        let (Ok(frame), Ok(visual)) = (
            self.world.get::<&CFrame>(entity),
            self.world.get::<&Visual>(entity),
        ) else {
            return false;
        };
        let Some(shape) = self.shape_of(&visual) else {
            return false;
        };
        match shape.intersect(&frame, ray) {
            Some((t, _)) if t <= *distance => {
                *distance = t;
                true
            }
            _ => false,
        }
    }

    /// Advance scene time and re-pose every tracked entity.
    fn advance(&mut self, dt: f32) {
        self.clock_secs += dt;
        let clock = self.clock_secs;
        for (_entity, (frame, motion)) in self.world.query_mut::<(&mut CFrame, &Motion)>() {
            *frame = track_frame(&motion.0, clock);
        }
    }
}

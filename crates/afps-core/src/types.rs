//! Fundamental geometric and simulation types.
//!
//! World space is right-handed with +Y up. A `CFrame` looks down its
//! local -Z axis.

use std::ops::Mul;

use glam::{EulerRot, Mat3, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Opaque handle to an entity owned by the scene collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

/// Handle to a visual model registered with the scene collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelId(pub u32);

/// Handle to an offscreen render target owned by the render device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RenderTargetId(pub u32);

/// Rigid coordinate frame: rotation followed by translation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CFrame {
    pub rotation: Mat3,
    pub translation: Vec3,
}

impl Default for CFrame {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl CFrame {
    pub const IDENTITY: CFrame = CFrame {
        rotation: Mat3::IDENTITY,
        translation: Vec3::ZERO,
    };

    pub fn new(rotation: Mat3, translation: Vec3) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            rotation: Mat3::IDENTITY,
            translation,
        }
    }

    /// Build a frame from a position and yaw/pitch/roll in degrees.
    /// Yaw turns about +Y, pitch about +X, roll about +Z (applied in that order, outermost first).
    pub fn from_xyz_ypr_degrees(x: f32, y: f32, z: f32, yaw: f32, pitch: f32, roll: f32) -> Self {
        let rotation = Quat::from_euler(
            EulerRot::YXZ,
            yaw.to_radians(),
            pitch.to_radians(),
            roll.to_radians(),
        );
        Self {
            rotation: Mat3::from_quat(rotation),
            translation: Vec3::new(x, y, z),
        }
    }

    /// Direction the frame faces (local -Z).
    pub fn look_vector(&self) -> Vec3 {
        -self.rotation.z_axis
    }

    pub fn up_vector(&self) -> Vec3 {
        self.rotation.y_axis
    }

    pub fn right_vector(&self) -> Vec3 {
        self.rotation.x_axis
    }

    /// Ray from the frame origin along the look vector.
    pub fn look_ray(&self) -> Ray {
        Ray::new(self.translation, self.look_vector())
    }

    /// Re-orient the frame so it faces `target`, keeping the translation.
    /// A target at the frame origin leaves the rotation untouched.
    pub fn look_at(&mut self, target: Vec3) {
        let forward = (target - self.translation).normalize_or_zero();
        if forward == Vec3::ZERO {
            return;
        }
        // Looking straight up or down: world up is degenerate.
        let up = if forward.cross(Vec3::Y).length_squared() < 1e-6 {
            Vec3::Z
        } else {
            Vec3::Y
        };
        let z = -forward;
        let x = up.cross(z).normalize();
        let y = z.cross(x);
        self.rotation = Mat3::from_cols(x, y, z);
    }

    /// Transform a point from this frame's local space into world space.
    pub fn point_to_world(&self, local: Vec3) -> Vec3 {
        self.rotation * local + self.translation
    }

    /// Transform a direction from local space into world space.
    pub fn vector_to_world(&self, local: Vec3) -> Vec3 {
        self.rotation * local
    }
}

impl Mul for CFrame {
    type Output = CFrame;

    fn mul(self, rhs: CFrame) -> CFrame {
        CFrame {
            rotation: self.rotation * rhs.rotation,
            translation: self.translation + self.rotation * rhs.translation,
        }
    }
}

/// Half-line used for hit detection. `direction` is always unit length
/// (or zero for a degenerate ray).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    pub fn point_at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction * distance
    }
}

/// Result of a successful ray query against the scene.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitInfo {
    pub point: Vec3,
    pub normal: Vec3,
    pub distance: f32,
    /// Entity that was hit, if the geometry belongs to one.
    pub entity: Option<EntityId>,
}

/// Motion behaviour attached to a scene entity and driven by the scene.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Track {
    /// Circle `radius` about +Y once per `period_secs`, offset by `base`.
    Orbit {
        radius: f32,
        period_secs: f32,
        base: CFrame,
    },
}

/// Player camera: current and previous-frame pose.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub frame: CFrame,
    pub previous_frame: CFrame,
    pub horizontal_fov_degrees: f32,
}

impl Camera {
    pub fn new(frame: CFrame, horizontal_fov_degrees: f32) -> Self {
        Self {
            frame,
            previous_frame: frame,
            horizontal_fov_degrees,
        }
    }

    pub fn look_ray(&self) -> Ray {
        self.frame.look_ray()
    }

    /// Move to a new pose; the old one becomes the previous frame.
    pub fn advance(&mut self, frame: CFrame) {
        self.previous_frame = self.frame;
        self.frame = frame;
    }
}

/// Simulation time tracking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SimTime {
    /// Current frame number (increments by 1 each frame).
    pub tick: u64,
    /// Elapsed simulation time in seconds.
    pub elapsed_secs: f64,
}

impl SimTime {
    /// Advance by one frame of `dt` seconds.
    pub fn advance(&mut self, dt: f64) {
        self.tick += 1;
        self.elapsed_secs += dt;
    }
}

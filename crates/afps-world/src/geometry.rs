//! Ray/shape intersection for the reference scene.

use glam::Vec3;

use afps_core::types::{CFrame, Ray};

/// Collision shape of a model, in model space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Sphere { radius: f32 },
    /// Oriented box centred on the entity origin.
    Box { half_extents: Vec3 },
}

impl Shape {
    /// Distance along `ray` and world-space surface normal of the first hit,
    /// for a shape posed at `frame`.
    pub fn intersect(&self, frame: &CFrame, ray: &Ray) -> Option<(f32, Vec3)> {
        match *self {
            Shape::Sphere { radius } => ray_sphere(ray, frame.translation, radius),
            Shape::Box { half_extents } => {
                let inv = frame.rotation.transpose();
                let origin = inv * (ray.origin - frame.translation);
                let direction = inv * ray.direction;
                let (t, normal) = ray_aabb(origin, direction, -half_extents, half_extents)?;
                Some((t, frame.rotation * normal))
            }
        }
    }
}

/// Nearest non-negative hit of a ray with a sphere. A ray starting inside
/// reports the exit point.
pub fn ray_sphere(ray: &Ray, center: Vec3, radius: f32) -> Option<(f32, Vec3)> {
    let oc = ray.origin - center;
    let b = oc.dot(ray.direction);
    let c = oc.length_squared() - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let sqrt_disc = disc.sqrt();
    let mut t = -b - sqrt_disc;
    if t < 0.0 {
        t = -b + sqrt_disc;
    }
    if t < 0.0 {
        return None;
    }
    let normal = (ray.point_at(t) - center).normalize_or_zero();
    Some((t, normal))
}

/// Slab-method ray/AABB intersection. Returns the hit distance and the
/// normal of the face that was entered (or exited, from inside).
pub fn ray_aabb(origin: Vec3, direction: Vec3, min: Vec3, max: Vec3) -> Option<(f32, Vec3)> {
    let mut t_enter = f32::NEG_INFINITY;
    let mut t_exit = f32::INFINITY;
    let mut enter_axis = 0;
    let mut exit_axis = 0;

    for axis in 0..3 {
        let o = origin[axis];
        let d = direction[axis];
        if d.abs() < f32::EPSILON {
            // Parallel to this slab: must already be inside it.
            if o < min[axis] || o > max[axis] {
                return None;
            }
            continue;
        }
        let inv = 1.0 / d;
        let mut t0 = (min[axis] - o) * inv;
        let mut t1 = (max[axis] - o) * inv;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        if t0 > t_enter {
            t_enter = t0;
            enter_axis = axis;
        }
        if t1 < t_exit {
            t_exit = t1;
            exit_axis = axis;
        }
        if t_enter > t_exit {
            return None;
        }
    }

    if t_exit < 0.0 {
        return None;
    }

    let (t, axis) = if t_enter >= 0.0 {
        (t_enter, enter_axis)
    } else {
        (t_exit, exit_axis)
    };
    let mut normal = Vec3::ZERO;
    normal[axis] = if direction[axis] > 0.0 { -1.0 } else { 1.0 };
    if t_enter < 0.0 {
        normal = -normal;
    }
    Some((t, normal))
}

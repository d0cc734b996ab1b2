//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Display-lag compositor state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompositorState {
    /// No lag: the scene renders straight to the final output.
    #[default]
    Disabled,
    /// Lag > 0: the scene renders into a private buffer and a delayed frame is presented.
    Buffering,
}

/// How a projectile moves between ticks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileMotion {
    /// Straight along the look vector at constant speed (visual tracer for a hitscan shot).
    #[default]
    Linear,
    /// Velocity integrated under constant gravity, collides with targets.
    Ballistic,
}

/// What a shot leaves behind visually.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShotVisual {
    /// A bullet entity that flies to the aim point.
    Bullet,
    /// A one-frame debug beam from the muzzle to the aim point.
    Laser,
}

/// Pixel format requested from the render device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageFormat {
    #[default]
    Rgb8,
    Rgba8,
}

impl ImageFormat {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            ImageFormat::Rgb8 => 3,
            ImageFormat::Rgba8 => 4,
        }
    }
}

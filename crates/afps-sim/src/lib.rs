//! Simulation core for the abstract FPS test application.
//!
//! Owns the target/projectile lifecycle and the display-lag compositor,
//! and exposes them through `FpsSession`. Everything the engine provides
//! (scene, rendering, audio) comes in through the traits in
//! `afps_core::collab`, so the session runs headless and deterministic.

pub mod compositor;
pub mod projectile;
pub mod scheduler;
pub mod session;
pub mod targets;
pub mod waves;
pub mod weapon;

pub use afps_core as core;
pub use compositor::DisplayLagCompositor;
pub use scheduler::FrameScheduler;
pub use session::{FpsSession, SessionAssets};

#[cfg(test)]
mod tests;

//! In-memory host collaborators for the abstract FPS core.
//!
//! A `hecs`-backed scene with ray queries and motion tracks, and a
//! software render device with pixel buffers. Both implement the traits
//! in `afps_core::collab` and stand in for a real engine in tests and the
//! headless driver.

pub use afps_core as core;

pub mod device;
pub mod geometry;
pub mod scene;

pub use device::{PixelBuffer, SoftwareDevice};
pub use geometry::Shape;
pub use scene::MemoryScene;

//! Headless driver for the abstract FPS range.
//!
//! Wires the simulation core to the in-memory scene and software render
//! device, and exposes the command line, logger setup and game loop used
//! by the `afps` binary.

pub mod cli;
pub mod game_loop;
pub mod logging;

pub use afps_core as core;

//! Core types and definitions for the abstract FPS test application.
//!
//! This crate defines the vocabulary shared across all other crates:
//! geometry, handles, collaborator traits, configuration, commands,
//! events, snapshot views and constants.
//! It has no dependency on any engine or runtime framework.

pub mod collab;
pub mod commands;
pub mod config;
pub mod constants;
pub mod enums;
pub mod events;
pub mod state;
pub mod types;

//! Core types and definitions for the BULWARK battle-management engine.
//!
//! This crate defines the vocabulary shared across all other crates:
//! kinematic types, the track registry, clusters, transformations,
//! configuration, events, errors, and constants. It has no dependency
//! on any simulation host or runtime framework.

pub mod cluster;
pub mod config;
pub mod constants;
pub mod entity;
pub mod errors;
pub mod events;
pub mod queue;
pub mod transformation;
pub mod types;

pub use errors::{BulwarkError, Result};

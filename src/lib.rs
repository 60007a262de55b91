//! Contact Engine Library
//!
//! Penalty-based contact for partitioned hexahedral finite-element meshes:
//! block skinning, partition deduplication, contact submodel construction,
//! closest-point projection, and per-step penalty force resolution.

pub mod config;
pub mod contact;
pub mod error;
pub mod mesh;
pub mod partition;

pub use error::{ContactEngineError, Result};

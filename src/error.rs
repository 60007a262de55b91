//! Error types for the contact engine
//!
//! This module defines all error types that can occur during skinning,
//! partition deduplication, submodel construction, and contact force
//! resolution.

use thiserror::Error;

/// Error types for contact engine operations
///
/// Configuration errors are reported before any computation takes place.
/// Topology errors indicate a corrupt input mesh; callers should treat them
/// as fatal for the run.
#[derive(Error, Debug)]
pub enum ContactEngineError {
    /// Mesh topology is invalid or corrupted
    ///
    /// This error occurs when the mesh data violates expected constraints,
    /// such as a face shared by more than two elements, a skin face with
    /// other than 4 nodes, or out-of-bounds node connectivity.
    #[error("Invalid mesh topology: {0}")]
    InvalidMeshTopology(String),

    /// Requested element block not found in mesh
    ///
    /// This occurs when a contact configuration references a block name
    /// that doesn't exist in the mesh.
    #[error("Element block not found: {0}")]
    BlockNotFound(String),

    /// Configuration error
    ///
    /// Non-positive penalty parameter, malformed contact command text,
    /// empty block lists, or an unreadable config file.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Partition exchange error
    ///
    /// A received face-key buffer has a length that is not a whole number
    /// of canonical face keys.
    #[error("Partition exchange error: {0}")]
    PartitionError(String),

    /// Geometric computation error
    ///
    /// Degenerate geometry in the projection kernel, such as a triangle
    /// with a zero-length normal.
    #[error("Geometry error: {0}")]
    GeometryError(String),

    /// File I/O error
    ///
    /// Wraps standard I/O errors from config file operations.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Convenience type alias for Results with [`ContactEngineError`]
///
/// This type alias is used throughout the codebase for cleaner error handling.
///
/// # Example
/// ```
/// use contact_engine::Result;
///
/// fn my_function() -> Result<()> {
///     Ok(())
/// }
/// ```
pub type Result<T> = std::result::Result<T, ContactEngineError>;

//! Mesh data structures and skinning

pub mod geometry;
pub mod skin;
pub mod types;

pub use geometry::*;
pub use skin::*;
pub use types::*;

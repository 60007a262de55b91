//! Contact entities, geometry kernels, and the per-step pipeline

pub mod entity;
pub mod force;
pub mod manager;
pub mod projection;
pub mod search;
pub mod submodel;

pub use entity::{Aabb, ContactEntityRef, EntityId, NodeEntity, TriangleEntity};
pub use force::{penalty_force, resolve_candidates};
pub use manager::ContactManager;
pub use projection::{
    closest_point_on_facet, project_node_onto_facet, FacetProjection, ProjectionType,
    PROJECTION_TOL,
};
pub use search::{AllPairsSearch, BroadPhase, KdTreeSearch};
pub use submodel::ContactSubmodel;

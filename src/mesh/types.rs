//! Core mesh data structures
//!
//! The engine never owns a full finite-element mesh. [`Mesh`] is the
//! read-only reference the caller provides: per-block hexahedral
//! connectivity, per-node global identifiers, and model coordinates.

use nalgebra::{Point3, Vector3};

use crate::error::{ContactEngineError, Result};

/// 3D point type
pub type Point = Point3<f64>;

/// 3D vector type
pub type Vec3 = Vector3<f64>;

/// Local node ordinals for the 6 faces of an 8-node hexahedron
///
/// Face ordinals and node ordering follow the Exodus II convention. The
/// face ordinal is part of the packed entity-id contract, so this table
/// must never be reordered.
pub const HEX_FACE_NODES: [[usize; 4]; 6] = [
    [0, 1, 5, 4], // face 0 (y-)
    [1, 2, 6, 5], // face 1 (x+)
    [2, 3, 7, 6], // face 2 (y+)
    [0, 4, 7, 3], // face 3 (x-)
    [0, 3, 2, 1], // face 4 (z-)
    [4, 5, 6, 7], // face 5 (z+)
];

/// Hexahedral element with 8 nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HexElement {
    /// Mesh-local node IDs in canonical Exodus II ordering:
    ///   Bottom face (z-): 0,1,2,3 (counter-clockwise)
    ///   Top face (z+):    4,5,6,7 (counter-clockwise)
    pub node_ids: [usize; 8],
}

impl HexElement {
    /// Create a new hex element
    pub fn new(node_ids: [usize; 8]) -> Self {
        Self { node_ids }
    }

    /// Get one of the 6 quad faces, with node order outward counter-clockwise
    pub fn face(&self, face_ordinal: usize) -> [usize; 4] {
        let f = HEX_FACE_NODES[face_ordinal];
        [
            self.node_ids[f[0]],
            self.node_ids[f[1]],
            self.node_ids[f[2]],
            self.node_ids[f[3]],
        ]
    }
}

/// One element block: a named group of hexahedral elements
#[derive(Debug, Clone)]
pub struct Block {
    /// Block id (unique within the mesh)
    pub id: i32,

    /// Block name, as it appears in contact configuration
    pub name: String,

    /// Elements in this block
    pub elements: Vec<HexElement>,

    /// Global element id (0-based, consistent across partitions) per element
    pub element_global_ids: Vec<u64>,
}

/// Read-only mesh reference for one partition
///
/// Node ids used by element connectivity are mesh-local; `node_global_ids`
/// maps them to the globally consistent numbering shared across partitions.
#[derive(Debug, Clone)]
pub struct Mesh {
    /// Element blocks
    pub blocks: Vec<Block>,

    /// Global node id (0-based) per mesh-local node
    pub node_global_ids: Vec<u64>,

    /// Model (undeformed) coordinates per mesh-local node
    pub coordinates: Vec<Point>,
}

impl Mesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self {
            blocks: Vec::new(),
            node_global_ids: Vec::new(),
            coordinates: Vec::new(),
        }
    }

    /// Get total number of nodes on this partition
    pub fn num_nodes(&self) -> usize {
        self.coordinates.len()
    }

    /// Get total number of elements on this partition
    pub fn num_elements(&self) -> usize {
        self.blocks.iter().map(|b| b.elements.len()).sum()
    }

    /// Get a block by id
    pub fn block(&self, block_id: i32) -> Result<&Block> {
        self.blocks
            .iter()
            .find(|b| b.id == block_id)
            .ok_or_else(|| ContactEngineError::BlockNotFound(format!("block id {}", block_id)))
    }

    /// Resolve block names to block ids
    pub fn block_ids_for_names(&self, names: &[String]) -> Result<Vec<i32>> {
        names
            .iter()
            .map(|name| {
                self.blocks
                    .iter()
                    .find(|b| &b.name == name)
                    .map(|b| b.id)
                    .ok_or_else(|| ContactEngineError::BlockNotFound(name.clone()))
            })
            .collect()
    }

    /// Largest global node id on this partition
    ///
    /// Used as the entity-id offset so that node- and face-derived entity
    /// ids never collide. In a distributed run the caller must supply the
    /// maximum over all partitions instead.
    pub fn max_node_global_id(&self) -> u64 {
        self.node_global_ids.iter().copied().max().unwrap_or(0)
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

//! Geometric operations on quadrilateral skin faces

use crate::error::{ContactEngineError, Result};
use crate::mesh::types::Point;

/// Compute the barycenter of a quad face
///
/// The barycenter becomes the fictitious third vertex when the quad is
/// subdivided into triangles.
pub fn face_barycenter(node_ids: &[usize; 4], coords: &[Point]) -> Result<Point> {
    let mut sum = nalgebra::Vector3::zeros();
    for &id in node_ids {
        sum += get_node(coords, id)?.coords;
    }
    Ok(Point::from(sum / 4.0))
}

/// Maximum edge length of a quad face, walking edges cyclically
///
/// Used as the characteristic length of the face and of the nodes it
/// touches.
pub fn max_edge_length(node_ids: &[usize; 4], coords: &[Point]) -> Result<f64> {
    let mut max_sq = f64::MIN;
    for i in 0..4 {
        let a = get_node(coords, node_ids[i])?;
        let b = get_node(coords, node_ids[(i + 1) % 4])?;
        let edge_sq = (b - a).norm_squared();
        if edge_sq > max_sq {
            max_sq = edge_sq;
        }
    }
    Ok(max_sq.sqrt())
}

/// Helper to safely get a node from the coordinate array
fn get_node(coords: &[Point], index: usize) -> Result<&Point> {
    coords.get(index).ok_or_else(|| {
        ContactEngineError::InvalidMeshTopology(format!("Node index {} out of bounds", index))
    })
}

//! Broad-phase candidate search
//!
//! The broad phase only has to produce a superset-free list of node/triangle
//! pairs whose inflated bounding boxes overlap; the projection kernel does
//! the exact work. Any hierarchical index can be plugged in through
//! [`BroadPhase`]; [`AllPairsSearch`] is the always-correct reference.

use kiddo::{ImmutableKdTree, SquaredEuclidean};

use crate::contact::entity::{NodeEntity, TriangleEntity};

/// Pluggable broad-phase acceleration structure
pub trait BroadPhase {
    /// Candidate `(node index, triangle index)` pairs to narrow-phase test
    fn candidate_pairs(
        &self,
        nodes: &[NodeEntity],
        triangles: &[TriangleEntity],
    ) -> Vec<(usize, usize)>;
}

/// O(n·m) bounding-box intersection search
#[derive(Debug, Clone, Copy, Default)]
pub struct AllPairsSearch;

impl BroadPhase for AllPairsSearch {
    fn candidate_pairs(
        &self,
        nodes: &[NodeEntity],
        triangles: &[TriangleEntity],
    ) -> Vec<(usize, usize)> {
        let triangle_boxes: Vec<_> = triangles.iter().map(|t| t.bounding_box()).collect();

        let mut pairs = Vec::new();
        for (i_node, node) in nodes.iter().enumerate() {
            let node_box = node.bounding_box();
            for (i_tri, tri_box) in triangle_boxes.iter().enumerate() {
                if node_box.overlaps(tri_box) {
                    pairs.push((i_node, i_tri));
                }
            }
        }
        pairs
    }
}

/// k-d tree broad phase over triangle centroids
///
/// Queries a conservative radius around each contact node, then applies the
/// same box-overlap filter as [`AllPairsSearch`] so both backends yield
/// identical candidate sets.
#[derive(Debug, Clone, Copy, Default)]
pub struct KdTreeSearch;

impl BroadPhase for KdTreeSearch {
    fn candidate_pairs(
        &self,
        nodes: &[NodeEntity],
        triangles: &[TriangleEntity],
    ) -> Vec<(usize, usize)> {
        if triangles.is_empty() || nodes.is_empty() {
            return Vec::new();
        }

        let centroids: Vec<[f64; 3]> = triangles
            .iter()
            .map(|t| {
                let c = t.centroid();
                [c.x, c.y, c.z]
            })
            .collect();
        let tree: ImmutableKdTree<f64, 3> = ImmutableKdTree::new_from_slice(&centroids);

        let max_tri_char_len = triangles
            .iter()
            .map(|t| t.characteristic_length())
            .fold(0.0, f64::max);
        let triangle_boxes: Vec<_> = triangles.iter().map(|t| t.bounding_box()).collect();

        let mut pairs = Vec::new();
        for (i_node, node) in nodes.iter().enumerate() {
            let node_box = node.bounding_box();
            let p = node.coordinates();

            // Radius large enough that every box-overlapping triangle's
            // centroid falls inside the query ball.
            let radius = node.characteristic_length() + 2.0 * max_tri_char_len;
            let neighbors = tree.within::<SquaredEuclidean>(&[p.x, p.y, p.z], radius * radius);

            let mut node_pairs: Vec<(usize, usize)> = neighbors
                .iter()
                .map(|n| n.item as usize)
                .filter(|&i_tri| node_box.overlaps(&triangle_boxes[i_tri]))
                .map(|i_tri| (i_node, i_tri))
                .collect();
            node_pairs.sort_unstable();
            pairs.extend(node_pairs);
        }
        pairs
    }
}

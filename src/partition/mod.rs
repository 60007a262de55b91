//! Distributed-partition collaborators
//!
//! The engine talks to the outside world at exactly two points: skin-face
//! deduplication during setup and force reduction after each step. Both are
//! expressed as injected capabilities so the same code runs under a real
//! message-passing transport or in a single process.

use std::collections::HashMap;

use crate::error::{ContactEngineError, Result};
use crate::mesh::skin::Skin;
use crate::mesh::types::Vec3;

/// Canonical face key: the face's four global node ids, sorted ascending
///
/// Global ids make keys comparable across partitions regardless of each
/// partition's local numbering.
pub type FaceKey = [u64; 4];

/// Number of ids in one wire-format face key
pub const KEY_WIDTH: usize = 4;

/// One peer's canonical-key buffer received during the ring exchange
#[derive(Debug, Clone)]
pub struct PeerKeys {
    /// Rank of the peer that sent the buffer
    pub partition: usize,
    /// Concatenated face keys, `KEY_WIDTH` ids per face
    pub buffer: Vec<u64>,
}

/// Ring-exchange capability for skin-face deduplication
///
/// A real implementation performs `P-1` point-to-point rounds over a
/// reliable ordered transport; zero-length buffers are valid no-ops.
pub trait FaceKeyExchange {
    /// This partition's rank
    fn partition_id(&self) -> usize;

    /// Total number of partitions
    fn num_partitions(&self) -> usize;

    /// Send this partition's key buffer to every peer and collect theirs
    fn broadcast_and_collect(&self, local_keys: &[FaceKey]) -> Result<Vec<PeerKeys>>;
}

/// Per-step sum-reduction of shared-node force contributions
pub trait ForceReduction {
    /// Combine partially-known per-node vectors across partitions
    fn reduce(&self, field: &mut [Vec3]) -> Result<()>;
}

/// Identity implementation for single-partition runs and tests
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleProcess;

impl FaceKeyExchange for SingleProcess {
    fn partition_id(&self) -> usize {
        0
    }

    fn num_partitions(&self) -> usize {
        1
    }

    fn broadcast_and_collect(&self, _local_keys: &[FaceKey]) -> Result<Vec<PeerKeys>> {
        Ok(Vec::new())
    }
}

impl ForceReduction for SingleProcess {
    fn reduce(&self, _field: &mut [Vec3]) -> Result<()> {
        Ok(())
    }
}

/// Partition-boundary node ownership, supplied by the runtime
#[derive(Debug, Clone, Default)]
pub struct PartitionTopology {
    /// Mesh-local ids of nodes shared with at least one other partition
    pub boundary_node_local_ids: Vec<usize>,
    /// Minimum rank among all ranks sharing each boundary node
    pub min_rank_containing_node: Vec<usize>,
}

impl PartitionTopology {
    /// Nodes present on this partition but owned by a lower rank
    pub fn ghosted_node_local_ids(&self, my_rank: usize) -> Vec<usize> {
        self.boundary_node_local_ids
            .iter()
            .zip(self.min_rank_containing_node.iter())
            .filter(|(_, &min_rank)| min_rank != my_rank)
            .map(|(&node_id, _)| node_id)
            .collect()
    }
}

/// Canonical key of a skin face under the global node numbering
pub fn canonical_face_key(face_nodes: &[usize; 4], node_global_ids: &[u64]) -> FaceKey {
    let mut key = [0u64; 4];
    for (slot, &local_id) in key.iter_mut().zip(face_nodes) {
        *slot = node_global_ids[local_id];
    }
    key.sort_unstable();
    key
}

/// Remove skin faces that are interior to the global mesh because their
/// twin element lives on a neighboring partition
///
/// Survivor order is preserved. Returns the number of faces removed. A key
/// matching buffers from two different peers indicates a malformed
/// partitioning; the first match wins and the conflict is logged for
/// verification.
pub fn remove_internal_skin_faces(
    skin: &mut Skin,
    node_global_ids: &[u64],
    exchange: &dyn FaceKeyExchange,
) -> Result<usize> {
    if exchange.num_partitions() <= 1 {
        return Ok(0);
    }

    let local_keys: Vec<FaceKey> = skin
        .faces
        .iter()
        .map(|face| canonical_face_key(&face.nodes, node_global_ids))
        .collect();

    let key_to_face: HashMap<FaceKey, usize> = local_keys
        .iter()
        .enumerate()
        .map(|(i, &key)| (key, i))
        .collect();

    let mut matched_by: Vec<Option<usize>> = vec![None; skin.faces.len()];
    let mut num_removals = 0usize;

    for peer in exchange.broadcast_and_collect(&local_keys)? {
        if peer.buffer.len() % KEY_WIDTH != 0 {
            return Err(ContactEngineError::PartitionError(format!(
                "received buffer of {} ids from partition {}; not a whole number of face keys",
                peer.buffer.len(),
                peer.partition
            )));
        }

        for chunk in peer.buffer.chunks_exact(KEY_WIDTH) {
            let key: FaceKey = [chunk[0], chunk[1], chunk[2], chunk[3]];
            if let Some(&face_index) = key_to_face.get(&key) {
                match matched_by[face_index] {
                    None => {
                        matched_by[face_index] = Some(peer.partition);
                        num_removals += 1;
                    }
                    Some(first_partition) => log::warn!(
                        "face key {:?} matched on partitions {} and {}; keeping first match",
                        key,
                        first_partition,
                        peer.partition
                    ),
                }
            }
        }
    }

    if num_removals > 0 {
        let mut index = 0;
        skin.faces.retain(|_| {
            let keep = matched_by[index].is_none();
            index += 1;
            keep
        });
    }

    log::info!(
        "Partition {}: removed {} internal skin face(s)",
        exchange.partition_id(),
        num_removals
    );

    Ok(num_removals)
}

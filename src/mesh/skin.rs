//! Boundary-face extraction ("skinning") for a set of element blocks

use std::collections::HashMap;

use crate::contact::entity::EntityId;
use crate::error::{ContactEngineError, Result};
use crate::mesh::types::Mesh;

/// One boundary quad face of a block set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkinFace {
    /// Mesh-local node ids, outward counter-clockwise
    ///
    /// Submodel construction later remaps these to contact-local ids.
    pub nodes: [usize; 4],

    /// Packed entity id of `(element_global_id, face_ordinal)`
    pub entity_id: EntityId,
}

/// The free boundary of a block set
#[derive(Debug, Clone, Default)]
pub struct Skin {
    pub faces: Vec<SkinFace>,
}

impl Skin {
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }
}

/// Occurrence record for one canonical face key
struct FaceRecord {
    count: u32,
    nodes: [usize; 4],
    element_global_id: u64,
    face_ordinal: u8,
}

/// Extract the skin of a block set
///
/// Every element face is canonicalized by sorting its node ids; a face seen
/// exactly once is on the boundary, a face seen exactly twice is interior.
/// Any other count means the mesh topology is corrupt. `entity_id_offset`
/// is the maximum global node id over all partitions, so face entity ids
/// never collide with node entity ids.
pub fn skin_blocks(mesh: &Mesh, block_ids: &[i32], entity_id_offset: u64) -> Result<Skin> {
    let mut faces: HashMap<[usize; 4], FaceRecord> = HashMap::new();

    for &block_id in block_ids {
        let block = mesh.block(block_id)?;

        for (element, &element_global_id) in
            block.elements.iter().zip(block.element_global_ids.iter())
        {
            for face_ordinal in 0..6u8 {
                let nodes = element.face(face_ordinal as usize);
                let mut key = nodes;
                key.sort_unstable();

                faces
                    .entry(key)
                    .and_modify(|record| record.count += 1)
                    .or_insert(FaceRecord {
                        count: 1,
                        nodes,
                        element_global_id,
                        face_ordinal,
                    });
            }
        }
    }

    let mut skin_faces = Vec::new();
    for record in faces.values() {
        match record.count {
            1 => skin_faces.push(SkinFace {
                nodes: record.nodes,
                entity_id: EntityId::for_face(
                    record.element_global_id,
                    entity_id_offset,
                    record.face_ordinal,
                ),
            }),
            2 => {} // interior face
            n => {
                return Err(ContactEngineError::InvalidMeshTopology(format!(
                    "face of element {} found {} times; a face can touch at most two elements",
                    record.element_global_id, n
                )));
            }
        }
    }

    // Map iteration order is not reproducible; sort so one run is deterministic.
    skin_faces.sort_unstable_by_key(|face| face.entity_id);

    log::info!(
        "Skinned {} block(s): {} boundary faces",
        block_ids.len(),
        skin_faces.len()
    );

    Ok(Skin { faces: skin_faces })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::types::{Block, HexElement, Point};

    fn single_hex_mesh() -> Mesh {
        let coordinates = vec![
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 0.0, 0.0),
            Point::new(1.0, 1.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
            Point::new(0.0, 0.0, 1.0),
            Point::new(1.0, 0.0, 1.0),
            Point::new(1.0, 1.0, 1.0),
            Point::new(0.0, 1.0, 1.0),
        ];

        Mesh {
            blocks: vec![Block {
                id: 1,
                name: "block_1".to_string(),
                elements: vec![HexElement::new([0, 1, 2, 3, 4, 5, 6, 7])],
                element_global_ids: vec![0],
            }],
            node_global_ids: (0..8).collect(),
            coordinates,
        }
    }

    fn two_hex_mesh() -> Mesh {
        let mut coordinates = single_hex_mesh().coordinates;
        coordinates.extend([
            Point::new(0.0, 0.0, 2.0),
            Point::new(1.0, 0.0, 2.0),
            Point::new(1.0, 1.0, 2.0),
            Point::new(0.0, 1.0, 2.0),
        ]);

        Mesh {
            blocks: vec![Block {
                id: 1,
                name: "block_1".to_string(),
                elements: vec![
                    HexElement::new([0, 1, 2, 3, 4, 5, 6, 7]),
                    HexElement::new([4, 5, 6, 7, 8, 9, 10, 11]),
                ],
                element_global_ids: vec![0, 1],
            }],
            node_global_ids: (0..12).collect(),
            coordinates,
        }
    }

    #[test]
    fn test_single_hex_skin() {
        let mesh = single_hex_mesh();
        let skin = skin_blocks(&mesh, &[1], mesh.max_node_global_id()).unwrap();

        assert_eq!(skin.num_faces(), 6);

        // One face per ordinal, all from element 0
        let mut ordinals: Vec<u8> = skin.faces.iter().map(|f| f.entity_id.face_ordinal()).collect();
        ordinals.sort_unstable();
        assert_eq!(ordinals, vec![0, 1, 2, 3, 4, 5]);
        for face in &skin.faces {
            assert_eq!(face.entity_id.element_id(mesh.max_node_global_id()), 1);
            assert_eq!(face.entity_id.triangle_ordinal(), 0);
        }
    }

    #[test]
    fn test_shared_face_is_interior() {
        let mesh = two_hex_mesh();
        let skin = skin_blocks(&mesh, &[1], mesh.max_node_global_id()).unwrap();

        // 12 faces total, the shared face drops from both elements
        assert_eq!(skin.num_faces(), 10);
        for face in &skin.faces {
            let mut sorted = face.nodes;
            sorted.sort_unstable();
            assert_ne!(sorted, [4, 5, 6, 7]);
        }
    }

    #[test]
    fn test_triple_shared_face_is_fatal() {
        let mut mesh = two_hex_mesh();
        // Third element reusing the already-shared face 4,5,6,7
        mesh.blocks[0]
            .elements
            .push(HexElement::new([4, 5, 6, 7, 8, 9, 10, 11]));
        mesh.blocks[0].element_global_ids.push(2);

        let result = skin_blocks(&mesh, &[1], mesh.max_node_global_id());
        assert!(matches!(
            result,
            Err(crate::error::ContactEngineError::InvalidMeshTopology(_))
        ));
    }

    #[test]
    fn test_missing_block_id() {
        let mesh = single_hex_mesh();
        assert!(skin_blocks(&mesh, &[2], 8).is_err());
    }
}

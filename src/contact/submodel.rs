//! Contact submodel construction and per-step state
//!
//! The submodel is the compact subset of the mesh that participates in
//! contact: a dense contact-local id space over every node referenced by
//! either skin, plus the node and triangle entity arrays built from the
//! deduplicated skins. It is built once and immutable afterwards except
//! for per-step coordinate and force updates.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::contact::entity::{Aabb, ContactEntityRef, EntityId, NodeEntity, TriangleEntity};
use crate::error::Result;
use crate::mesh::geometry::{face_barycenter, max_edge_length};
use crate::mesh::skin::Skin;
use crate::mesh::types::{Mesh, Point, Vec3};

/// The static contact submodel plus its per-step coordinate/force state
#[derive(Debug, Clone)]
pub struct ContactSubmodel {
    /// Mesh-local node id per contact-local id, in ascending order
    node_ids: Vec<usize>,

    /// Mesh-local id -> contact-local id (bijection onto `[0, N)`)
    submodel_ids: HashMap<usize, usize>,

    /// Model (undeformed) coordinates, contact-local indexing
    model_coord: Vec<Point>,

    /// Current coordinates, contact-local indexing
    coord: Vec<Point>,

    /// Accumulated contact force, contact-local indexing
    force: Vec<Vec3>,

    /// Secondary contact node entities
    nodes: Vec<NodeEntity>,

    /// Primary contact triangle entities (4 per primary skin face)
    triangles: Vec<TriangleEntity>,
}

impl ContactSubmodel {
    /// Build the submodel from the deduplicated primary and secondary skins
    ///
    /// `ghosted_node_local_ids` lists mesh-local nodes owned by another
    /// partition; ghosted secondary nodes never become contact node
    /// entities but still appear as triangle vertices. Ghost ids that touch
    /// no skin face are silently ignored.
    pub fn build(
        mesh: &Mesh,
        primary_skin: &Skin,
        secondary_skin: &Skin,
        ghosted_node_local_ids: &[usize],
    ) -> Result<Self> {
        // Union of all mesh nodes referenced by either skin; ascending order
        // makes the contact-local id assignment deterministic.
        let mut node_ids_set = BTreeSet::new();
        for face in primary_skin.faces.iter().chain(secondary_skin.faces.iter()) {
            node_ids_set.extend(face.nodes);
        }
        let node_ids: Vec<usize> = node_ids_set.into_iter().collect();

        let submodel_ids: HashMap<usize, usize> = node_ids
            .iter()
            .enumerate()
            .map(|(contact_id, &mesh_id)| (mesh_id, contact_id))
            .collect();

        // Remap skin faces from mesh-local to contact-local node ids
        let remap = |skin: &Skin| -> Vec<([usize; 4], EntityId)> {
            skin.faces
                .iter()
                .map(|face| {
                    let mut nodes = [0usize; 4];
                    for (slot, mesh_id) in nodes.iter_mut().zip(face.nodes) {
                        *slot = submodel_ids[&mesh_id];
                    }
                    (nodes, face.entity_id)
                })
                .collect()
        };
        let primary_faces = remap(primary_skin);
        let secondary_faces = remap(secondary_skin);

        // Ghost nodes restricted to the contact-local id space; absence of a
        // ghost id from the mapping is expected and skipped.
        let ghosted_contact_ids: HashSet<usize> = ghosted_node_local_ids
            .iter()
            .filter_map(|mesh_id| submodel_ids.get(mesh_id).copied())
            .collect();

        let model_coord: Vec<Point> = node_ids.iter().map(|&id| mesh.coordinates[id]).collect();
        let coord = model_coord.clone();
        let force = vec![Vec3::zeros(); node_ids.len()];

        // Secondary contact nodes: one entity per non-ghost node, with the
        // characteristic length raised to the max over all touching faces.
        let mut secondary_node_order: Vec<usize> = Vec::new();
        let mut secondary_char_lens: HashMap<usize, f64> = HashMap::new();
        for (face_nodes, _) in &secondary_faces {
            let char_len = max_edge_length(face_nodes, &coord)?;
            for &node_id in face_nodes {
                if ghosted_contact_ids.contains(&node_id) {
                    continue;
                }
                secondary_char_lens
                    .entry(node_id)
                    .and_modify(|len| *len = len.max(char_len))
                    .or_insert_with(|| {
                        secondary_node_order.push(node_id);
                        char_len
                    });
            }
        }

        let nodes: Vec<NodeEntity> = secondary_node_order
            .iter()
            .map(|&node_id| {
                let global_id = mesh.node_global_ids[node_ids[node_id]];
                NodeEntity::new(
                    EntityId::for_node(global_id),
                    node_id,
                    coord[node_id],
                    secondary_char_lens[&node_id],
                )
            })
            .collect();

        // Primary faces subdivide into 4 triangles around the barycenter.
        let mut triangles = Vec::with_capacity(4 * primary_faces.len());
        for (face_nodes, face_entity_id) in &primary_faces {
            let char_len = max_edge_length(face_nodes, &coord)?;
            let barycenter = face_barycenter(face_nodes, &coord)?;

            for triangle_ordinal in 0..4u8 {
                let node_id_1 = face_nodes[triangle_ordinal as usize];
                let node_id_2 = face_nodes[(triangle_ordinal as usize + 1) % 4];
                triangles.push(TriangleEntity::new(
                    face_entity_id.with_triangle_ordinal(triangle_ordinal),
                    [coord[node_id_1], coord[node_id_2], barycenter],
                    char_len,
                    node_id_1,
                    node_id_2,
                    *face_nodes,
                ));
            }
        }

        log::info!(
            "Contact submodel: {} nodes in id space, {} contact nodes, {} triangular facets",
            node_ids.len(),
            nodes.len(),
            triangles.len()
        );

        Ok(Self {
            node_ids,
            submodel_ids,
            model_coord,
            coord,
            force,
            nodes,
            triangles,
        })
    }

    /// Number of nodes in the contact-local id space
    pub fn num_nodes(&self) -> usize {
        self.node_ids.len()
    }

    /// Contact-local id for a mesh-local node id, if the node participates
    pub fn contact_local_id(&self, mesh_node_id: usize) -> Option<usize> {
        self.submodel_ids.get(&mesh_node_id).copied()
    }

    pub fn contact_nodes(&self) -> &[NodeEntity] {
        &self.nodes
    }

    pub fn contact_triangles(&self) -> &[TriangleEntity] {
        &self.triangles
    }

    /// Mutable access to both entity arrays for force accumulation
    pub fn entities_mut(&mut self) -> (&mut [NodeEntity], &mut [TriangleEntity]) {
        (&mut self.nodes, &mut self.triangles)
    }

    /// Iterate all entities polymorphically (broad phase, visualization)
    pub fn entities(&self) -> impl Iterator<Item = ContactEntityRef<'_>> {
        self.triangles
            .iter()
            .map(ContactEntityRef::Triangle)
            .chain(self.nodes.iter().map(ContactEntityRef::Node))
    }

    /// Move the submodel with the caller's current displacement field
    ///
    /// `displacement` is indexed by mesh-local node id and must cover every
    /// node of the partition.
    pub fn apply_displacements(&mut self, displacement: &[Vec3]) {
        for (i, &node_id) in self.node_ids.iter().enumerate() {
            self.coord[i] = self.model_coord[i] + displacement[node_id];
        }
        for node in &mut self.nodes {
            node.set_coordinates(&self.coord);
        }
        for triangle in &mut self.triangles {
            triangle.set_coordinates(&self.coord);
        }
    }

    /// Reset per-step force state on the id space and on every entity
    pub fn zero_forces(&mut self) {
        for f in &mut self.force {
            *f = Vec3::zeros();
        }
        for node in &mut self.nodes {
            node.zero_force();
        }
        for triangle in &mut self.triangles {
            triangle.zero_force();
        }
    }

    /// Scatter accumulated entity forces into the contact-local force array
    ///
    /// Node entities map 1-to-1; triangle vertices 1 and 2 map to their real
    /// nodes and the fictitious vertex splits into equal quarter-shares over
    /// the parent quad's corners. Sums are additive: a mesh node may receive
    /// contributions through several entities.
    pub fn scatter_entity_forces(&mut self) {
        for node in &self.nodes {
            self.force[node.node_id()] += node.force();
        }
        for triangle in &self.triangles {
            let forces = triangle.vertex_forces();
            self.force[triangle.node_id_1()] += forces[0];
            self.force[triangle.node_id_2()] += forces[1];
            let quarter_share = forces[2] / 4.0;
            for &node_id in triangle.fictitious_node_ids() {
                self.force[node_id] += quarter_share;
            }
        }
    }

    /// Add contact-local forces into the caller's global force vector
    ///
    /// Only entries backing submodel nodes are touched, additively.
    pub fn add_forces_to_global(&self, contact_force: &mut [Vec3]) {
        for (i, &node_id) in self.node_ids.iter().enumerate() {
            contact_force[node_id] += self.force[i];
        }
    }

    /// Bounding box of the submodel in the current configuration
    pub fn bounding_box(&self) -> Aabb {
        Aabb::from_points(&self.coord, 0.0)
    }

    /// Mean extent of the bounding box, a search-radius scale for callers
    pub fn average_characteristic_length(&self) -> f64 {
        let b = self.bounding_box();
        ((b.max.x - b.min.x) + (b.max.y - b.min.y) + (b.max.z - b.min.z)) / 3.0
    }

    /// Count of entities flagged in-contact during the last step
    pub fn num_active_contacts(&self) -> usize {
        self.nodes.iter().filter(|n| n.in_contact()).count()
    }
}

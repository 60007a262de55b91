//! Orchestration of the full contact pipeline
//!
//! Setup (once): skin the primary and secondary block sets, strip
//! partition-internal faces, derive ghost nodes, build the submodel.
//! Per step: move the submodel, broad phase, narrow phase, scatter forces
//! back to the caller's global force vector.

use crate::config::ContactConfig;
use crate::contact::entity::Aabb;
use crate::contact::force::resolve_candidates;
use crate::contact::search::{BroadPhase, KdTreeSearch};
use crate::contact::submodel::ContactSubmodel;
use crate::error::{ContactEngineError, Result};
use crate::mesh::skin::skin_blocks;
use crate::mesh::types::{Mesh, Vec3};
use crate::partition::{
    remove_internal_skin_faces, FaceKeyExchange, ForceReduction, PartitionTopology,
};

/// Penalty-contact manager for one partition
///
/// Owns the contact submodel and the broad-phase backend; the caller keeps
/// owning the mesh, displacement field, and force vector.
pub struct ContactManager {
    penalty_parameter: f64,
    submodel: ContactSubmodel,
    search: Box<dyn BroadPhase + Send + Sync>,
}

impl ContactManager {
    /// Build the manager from a validated configuration
    ///
    /// Entity ids are derived from `max_node_global_id`, which in a
    /// distributed run must be the maximum over all partitions, not just
    /// this one. Uses the k-d tree broad phase; see
    /// [`ContactManager::with_search`] to substitute another backend.
    pub fn new(
        mesh: &Mesh,
        config: &ContactConfig,
        max_node_global_id: u64,
        exchange: &dyn FaceKeyExchange,
        topology: &PartitionTopology,
    ) -> Result<Self> {
        Self::with_search(
            mesh,
            config,
            max_node_global_id,
            exchange,
            topology,
            Box::new(KdTreeSearch),
        )
    }

    /// Build the manager with an explicit broad-phase backend
    pub fn with_search(
        mesh: &Mesh,
        config: &ContactConfig,
        max_node_global_id: u64,
        exchange: &dyn FaceKeyExchange,
        topology: &PartitionTopology,
        search: Box<dyn BroadPhase + Send + Sync>,
    ) -> Result<Self> {
        config.validate()?;

        let primary_ids = mesh.block_ids_for_names(&config.primary_blocks)?;
        let secondary_ids = mesh.block_ids_for_names(&config.secondary_blocks)?;

        let mut primary_skin = skin_blocks(mesh, &primary_ids, max_node_global_id)?;
        let mut secondary_skin = skin_blocks(mesh, &secondary_ids, max_node_global_id)?;

        remove_internal_skin_faces(&mut primary_skin, &mesh.node_global_ids, exchange)?;
        remove_internal_skin_faces(&mut secondary_skin, &mesh.node_global_ids, exchange)?;

        let ghosted = topology.ghosted_node_local_ids(exchange.partition_id());
        let submodel = ContactSubmodel::build(mesh, &primary_skin, &secondary_skin, &ghosted)?;

        log::info!(
            "Contact manager ready: {} primary faces, {} secondary faces, penalty {}",
            primary_skin.num_faces(),
            secondary_skin.num_faces(),
            config.penalty_parameter
        );

        Ok(Self {
            penalty_parameter: config.penalty_parameter,
            submodel,
            search,
        })
    }

    /// Compute contact forces for the current displacement field
    ///
    /// `displacement` is indexed by mesh-local node id and must cover the
    /// whole partition; contact contributions are ADDED into
    /// `contact_force` (same indexing). Returns the number of contact nodes
    /// in contact this step.
    pub fn compute_contact_force(
        &mut self,
        displacement: &[Vec3],
        contact_force: &mut [Vec3],
        reduction: &dyn ForceReduction,
    ) -> Result<usize> {
        if self.penalty_parameter <= 0.0 || self.penalty_parameter.is_nan() {
            return Err(ContactEngineError::ConfigError(format!(
                "penalty parameter must be positive, got {}",
                self.penalty_parameter
            )));
        }

        self.submodel.apply_displacements(displacement);
        self.submodel.zero_forces();

        let candidates = {
            let nodes = self.submodel.contact_nodes();
            let triangles = self.submodel.contact_triangles();
            self.search.candidate_pairs(nodes, triangles)
        };

        let (nodes, triangles) = self.submodel.entities_mut();
        resolve_candidates(nodes, triangles, &candidates, self.penalty_parameter)?;

        self.submodel.scatter_entity_forces();
        self.submodel.add_forces_to_global(contact_force);
        reduction.reduce(contact_force)?;

        let num_active = self.submodel.num_active_contacts();
        log::debug!(
            "Contact step: {} candidate pairs, {} nodes in contact",
            candidates.len(),
            num_active
        );
        Ok(num_active)
    }

    /// The contact submodel (entity inspection, visualization)
    pub fn submodel(&self) -> &ContactSubmodel {
        &self.submodel
    }

    /// Bounding box of the submodel in the current configuration
    pub fn bounding_box(&self) -> Aabb {
        self.submodel.bounding_box()
    }

    pub fn penalty_parameter(&self) -> f64 {
        self.penalty_parameter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contact::search::AllPairsSearch;
    use crate::mesh::types::{Block, HexElement, Point};
    use crate::partition::SingleProcess;
    use approx::assert_relative_eq;

    fn two_cube_mesh(dx: f64, dy: f64, penetration: f64) -> Mesh {
        let z0 = 1.0 - penetration;
        let corners = [
            (0.0, 0.0, 0.0),
            (1.0, 0.0, 0.0),
            (1.0, 1.0, 0.0),
            (0.0, 1.0, 0.0),
            (0.0, 0.0, 1.0),
            (1.0, 0.0, 1.0),
            (1.0, 1.0, 1.0),
            (0.0, 1.0, 1.0),
        ];
        let mut coordinates: Vec<Point> =
            corners.iter().map(|&(x, y, z)| Point::new(x, y, z)).collect();
        coordinates.extend(
            corners
                .iter()
                .map(|&(x, y, z)| Point::new(x + dx, y + dy, z + z0)),
        );

        Mesh {
            blocks: vec![
                Block {
                    id: 1,
                    name: "lower".to_string(),
                    elements: vec![HexElement::new([0, 1, 2, 3, 4, 5, 6, 7])],
                    element_global_ids: vec![0],
                },
                Block {
                    id: 2,
                    name: "upper".to_string(),
                    elements: vec![HexElement::new([8, 9, 10, 11, 12, 13, 14, 15])],
                    element_global_ids: vec![1],
                },
            ],
            node_global_ids: (0..16).collect(),
            coordinates,
        }
    }

    fn config(penalty: f64) -> ContactConfig {
        ContactConfig {
            primary_blocks: vec!["lower".to_string()],
            secondary_blocks: vec!["upper".to_string()],
            penalty_parameter: penalty,
        }
    }

    fn manager_for(mesh: &Mesh, penalty: f64) -> ContactManager {
        ContactManager::with_search(
            mesh,
            &config(penalty),
            mesh.max_node_global_id(),
            &SingleProcess,
            &PartitionTopology::default(),
            Box::new(AllPairsSearch),
        )
        .unwrap()
    }

    #[test]
    fn test_setup_counts() {
        let mesh = two_cube_mesh(0.45, 0.35, 0.01);
        let manager = manager_for(&mesh, 1000.0);

        assert_eq!(manager.submodel().contact_triangles().len(), 24);
        assert_eq!(manager.submodel().contact_nodes().len(), 8);
        assert_eq!(manager.penalty_parameter(), 1000.0);
    }

    #[test]
    fn test_penetrating_cubes_produce_opposing_forces() {
        let mesh = two_cube_mesh(0.45, 0.35, 0.01);
        let mut manager = manager_for(&mesh, 1000.0);

        let displacement = vec![Vec3::zeros(); 16];
        let mut contact_force = vec![Vec3::zeros(); 16];
        let active = manager
            .compute_contact_force(&displacement, &mut contact_force, &SingleProcess)
            .unwrap();

        assert_eq!(active, 1);

        // penetrating corner of the upper cube (mesh node 8) pushed up
        assert_relative_eq!(contact_force[8].z, 10.0, epsilon = 1e-10);

        // reaction goes entirely to the lower cube's top face
        let reaction: f64 = (4..8).map(|i| contact_force[i].z).sum();
        assert_relative_eq!(reaction, -10.0, epsilon = 1e-10);

        let total = contact_force
            .iter()
            .fold(Vec3::zeros(), |acc, f| acc + f);
        assert_relative_eq!(total.norm(), 0.0, epsilon = 1e-10);
    }

    #[test]
    fn test_separated_cubes_produce_no_force() {
        let mesh = two_cube_mesh(0.45, 0.35, -0.5);
        let mut manager = manager_for(&mesh, 1000.0);

        let displacement = vec![Vec3::zeros(); 16];
        let mut contact_force = vec![Vec3::zeros(); 16];
        let active = manager
            .compute_contact_force(&displacement, &mut contact_force, &SingleProcess)
            .unwrap();

        assert_eq!(active, 0);
        assert!(contact_force.iter().all(|f| f.norm() == 0.0));
    }

    #[test]
    fn test_forces_accumulate_additively() {
        let mesh = two_cube_mesh(0.45, 0.35, 0.01);
        let mut manager = manager_for(&mesh, 1000.0);

        let displacement = vec![Vec3::zeros(); 16];
        let mut contact_force = vec![Vec3::new(1.0, 0.0, 0.0); 16];
        manager
            .compute_contact_force(&displacement, &mut contact_force, &SingleProcess)
            .unwrap();

        // pre-existing entries survive; contact adds on top
        assert_relative_eq!(contact_force[8].x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(contact_force[8].z, 10.0, epsilon = 1e-10);
    }

    #[test]
    fn test_displacement_driven_contact() {
        // start separated, then push the upper cube down into contact
        let mesh = two_cube_mesh(0.45, 0.35, -0.09);
        let mut manager = manager_for(&mesh, 1000.0);

        let mut displacement = vec![Vec3::zeros(); 16];
        let mut contact_force = vec![Vec3::zeros(); 16];
        let active = manager
            .compute_contact_force(&displacement, &mut contact_force, &SingleProcess)
            .unwrap();
        assert_eq!(active, 0);

        for d in displacement.iter_mut().skip(8) {
            *d = Vec3::new(0.0, 0.0, -0.1);
        }
        let active = manager
            .compute_contact_force(&displacement, &mut contact_force, &SingleProcess)
            .unwrap();
        assert_eq!(active, 1);
        assert_relative_eq!(contact_force[8].z, 10.0, epsilon = 1e-10);
    }

    #[test]
    fn test_invalid_penalty_rejected_at_setup() {
        let mesh = two_cube_mesh(0.45, 0.35, 0.01);
        let result = ContactManager::new(
            &mesh,
            &config(0.0),
            mesh.max_node_global_id(),
            &SingleProcess,
            &PartitionTopology::default(),
        );
        assert!(matches!(result, Err(ContactEngineError::ConfigError(_))));
    }

    #[test]
    fn test_unknown_block_rejected() {
        let mesh = two_cube_mesh(0.45, 0.35, 0.01);
        let bad_config = ContactConfig {
            primary_blocks: vec!["missing".to_string()],
            secondary_blocks: vec!["upper".to_string()],
            penalty_parameter: 1000.0,
        };
        let result = ContactManager::new(
            &mesh,
            &bad_config,
            mesh.max_node_global_id(),
            &SingleProcess,
            &PartitionTopology::default(),
        );
        assert!(matches!(result, Err(ContactEngineError::BlockNotFound(_))));
    }
}

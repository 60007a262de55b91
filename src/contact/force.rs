//! Penalty force resolution for candidate node/facet pairs

use crate::contact::entity::{NodeEntity, TriangleEntity};
use crate::contact::projection::{project_node_onto_facet, FacetProjection, ProjectionType, PROJECTION_TOL};
use crate::error::Result;
use crate::mesh::types::Vec3;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Below this many candidates the parallel dispatch overhead isn't worth it
#[cfg(feature = "parallel")]
const PARALLEL_THRESHOLD: usize = 1000;

/// One narrow-phase hit: a node penetrating a facet face-on
struct PairContact {
    node: usize,
    triangle: usize,
    projection: FacetProjection,
}

/// Penalty contact force on the penetrating node
///
/// Magnitude `penalty_parameter * |gap|`, directed along the outward facet
/// normal. The facet receives the opposite force.
pub fn penalty_force(penalty_parameter: f64, gap: f64, normal: &Vec3) -> Vec3 {
    -penalty_parameter * gap * normal
}

/// Narrow-phase test for one candidate pair
///
/// Only a face-on projection with `gap` inside `(-characteristic_length, 0)`
/// counts as contact; deeper penetrations are outside the penalty law's
/// validity range and non-penetrating pairs carry no force.
fn classify_pair(
    node: &NodeEntity,
    triangle: &TriangleEntity,
) -> Result<Option<FacetProjection>> {
    match project_node_onto_facet(node, triangle, PROJECTION_TOL)? {
        (ProjectionType::Face, Some(projection))
            if projection.gap < 0.0 && projection.gap > -triangle.characteristic_length() =>
        {
            Ok(Some(projection))
        }
        _ => Ok(None),
    }
}

/// Resolve all candidate pairs into entity force contributions
///
/// The projection phase is pure per pair and runs data-parallel; the
/// accumulation phase is sequential (the sums are commutative, so no
/// ordering is required, but a serial pass needs no atomics). Returns the
/// number of in-contact pairs.
pub fn resolve_candidates(
    nodes: &mut [NodeEntity],
    triangles: &mut [TriangleEntity],
    candidates: &[(usize, usize)],
    penalty_parameter: f64,
) -> Result<usize> {
    let classify = |&(i_node, i_tri): &(usize, usize)| -> Result<Option<PairContact>> {
        Ok(classify_pair(&nodes[i_node], &triangles[i_tri])?.map(|projection| PairContact {
            node: i_node,
            triangle: i_tri,
            projection,
        }))
    };

    #[cfg(feature = "parallel")]
    let contacts: Result<Vec<_>> = if candidates.len() >= PARALLEL_THRESHOLD {
        candidates.par_iter().map(classify).collect()
    } else {
        candidates.iter().map(classify).collect()
    };

    #[cfg(not(feature = "parallel"))]
    let contacts: Result<Vec<_>> = candidates.iter().map(classify).collect();

    let mut num_active = 0;
    for contact in contacts?.into_iter().flatten() {
        let force = penalty_force(
            penalty_parameter,
            contact.projection.gap,
            &contact.projection.normal,
        );
        nodes[contact.node].apply_contact_force(&force);
        triangles[contact.triangle]
            .apply_contact_force(&contact.projection.barycentric, &(-force));
        num_active += 1;
    }

    log::debug!(
        "Narrow phase: {} candidates, {} in contact",
        candidates.len(),
        num_active
    );

    Ok(num_active)
}

//! Closest-point projection of contact nodes onto triangular facets
//!
//! Barycentric projection onto the facet plane, closed form, following
//! W. Heidrich, "Computing the Barycentric Coordinates of a Projected
//! Point", Journal of Graphics Tools 10(3), 2005.

use crate::contact::entity::{NodeEntity, TriangleEntity};
use crate::error::{ContactEngineError, Result};
use crate::mesh::types::{Point, Vec3};

/// Relative tolerance for the barycentric inside-triangle test
pub const PROJECTION_TOL: f64 = 1.0e-16;

/// Classification of a node-onto-triangle projection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionType {
    /// Projection falls strictly inside the facet
    Face,
    /// Closest point is a facet vertex or lies on a facet edge
    NodeOrEdge,
    /// Projection falls outside the facet; no gap or normal is defined
    Unknown,
}

/// Result of the gap/normal projection used by the force path
#[derive(Debug, Clone, Copy)]
pub struct FacetProjection {
    /// Projected point on the facet plane
    pub closest_point: Point,
    /// Signed distance along the outward normal; negative means penetrating
    pub gap: f64,
    /// Outward unit normal of the facet
    pub normal: Vec3,
    /// Barycentric weights of the projected point
    pub barycentric: [f64; 3],
}

/// Barycentric weights of `point` projected onto the plane of `(p1,p2,p3)`,
/// together with the non-unit normal and its squared length
fn barycentric_weights(
    point: &Point,
    p1: &Point,
    p2: &Point,
    p3: &Point,
) -> Result<([f64; 3], Vec3, f64)> {
    let u = p2 - p1;
    let v = p3 - p1;
    let w = point - p1;

    let n = u.cross(&v);
    let n_squared = n.norm_squared();
    if n_squared == 0.0 {
        return Err(ContactEngineError::GeometryError(
            "degenerate contact facet (zero normal)".to_string(),
        ));
    }

    let alpha3 = u.cross(&w).dot(&n) / n_squared;
    let alpha2 = w.cross(&v).dot(&n) / n_squared;
    let alpha1 = 1.0 - alpha2 - alpha3;

    Ok(([alpha1, alpha2, alpha3], n, n_squared))
}

/// Gap/normal projection of a contact node onto a triangular facet
///
/// Returns `Unknown` (as `Err`-free `None`-like result in the projection
/// type) when the projection falls outside the facet: only face-on contact
/// produces a defined gap and normal. This is the variant the force
/// resolver consumes.
pub fn project_node_onto_facet(
    node: &NodeEntity,
    tri: &TriangleEntity,
    tol: f64,
) -> Result<(ProjectionType, Option<FacetProjection>)> {
    let p = node.coordinates();
    let [p1, p2, p3] = tri.coordinates();

    let (alphas, n, n_squared) = barycentric_weights(&p, p1, p2, p3)?;

    let upper = 1.0 + tol;
    let inside = alphas.iter().all(|&a| a > -tol && a < upper);
    if !inside {
        return Ok((ProjectionType::Unknown, None));
    }

    let closest_point = Point::from(
        alphas[0] * p1.coords + alphas[1] * p2.coords + alphas[2] * p3.coords,
    );
    let normal = n / n_squared.sqrt();
    let gap = (p - closest_point).dot(&normal);

    Ok((
        ProjectionType::Face,
        Some(FacetProjection {
            closest_point,
            gap,
            normal,
            barycentric: alphas,
        }),
    ))
}

/// Full closest-point projection with vertex/edge fallback
///
/// When the planar projection falls outside the facet, the closest point is
/// the minimum over the three vertices and the three edges (an edge
/// candidate only counts if its clamped parameter lies strictly in (0,1)).
pub fn closest_point_on_facet(
    point: &Point,
    tri: &TriangleEntity,
    tol: f64,
) -> Result<(ProjectionType, Point)> {
    let [p1, p2, p3] = tri.coordinates();

    let (alphas, _, _) = barycentric_weights(point, p1, p2, p3)?;

    let upper = 1.0 + tol;
    let in_range = alphas.iter().all(|&a| a > -tol && a < upper);
    if in_range {
        let closest = Point::from(
            alphas[0] * p1.coords + alphas[1] * p2.coords + alphas[2] * p3.coords,
        );
        let on_boundary = alphas.iter().any(|&a| a > -tol && a < tol);
        let kind = if on_boundary {
            ProjectionType::NodeOrEdge
        } else {
            ProjectionType::Face
        };
        return Ok((kind, closest));
    }

    // Outside the facet: best of 3 vertices and 3 edges
    let mut best = *p1;
    let mut best_distance_squared = (p1 - point).norm_squared();
    for vertex in [p2, p3] {
        let distance_squared = (vertex - point).norm_squared();
        if distance_squared < best_distance_squared {
            best_distance_squared = distance_squared;
            best = *vertex;
        }
    }

    for (a, b) in [(p1, p2), (p2, p3), (p3, p1)] {
        let t = edge_parameter(a, b, point);
        if t > 0.0 && t < 1.0 {
            let candidate = Point::from(a.coords + t * (b - a));
            let distance_squared = (candidate - point).norm_squared();
            if distance_squared < best_distance_squared {
                best_distance_squared = distance_squared;
                best = candidate;
            }
        }
    }

    Ok((ProjectionType::NodeOrEdge, best))
}

/// Parameter of the orthogonal projection of `point` onto segment `a`-`b`
fn edge_parameter(a: &Point, b: &Point, point: &Point) -> f64 {
    let ab = b - a;
    let denominator = ab.norm_squared();
    if denominator == 0.0 {
        return 0.0;
    }
    (point - a).dot(&ab) / denominator
}

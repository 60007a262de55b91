//! Contact entities and their packed identifiers

use crate::mesh::types::{Point, Vec3};

/// Entity bounding boxes are inflated by this fraction of the entity's
/// characteristic length before overlap testing.
pub const BOX_INFLATION_FACTOR: f64 = 0.15;

/// Globally unique, bit-packed contact entity identifier
///
/// Packing contract (bit-exact, relied on by visualization consumers):
///
/// ```text
/// face entity: ((element_global_id_1based + offset) << 5)
///              | (face_ordinal << 2)
///              | triangle_ordinal
/// node entity: node_global_id + 1
/// ```
///
/// `offset` is the maximum global node id over all partitions, so node and
/// face ids can never collide. Bits 0-1 hold the triangle ordinal (0-3),
/// bits 2-4 the face ordinal (0-5), and the remaining high bits the offset
/// element id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u64);

impl EntityId {
    /// Entity id for a skin face of an element
    ///
    /// `element_global_id` is the 0-based global element id; the packed id
    /// stores it 1-based so ids remain valid in 1-based output formats.
    /// The triangle ordinal bits are zero until the face is subdivided.
    pub fn for_face(element_global_id: u64, offset: u64, face_ordinal: u8) -> Self {
        debug_assert!(face_ordinal < 6);
        Self((element_global_id + 1 + offset) << 5 | u64::from(face_ordinal) << 2)
    }

    /// Entity id for a contact node: its 1-based global node id
    pub fn for_node(node_global_id: u64) -> Self {
        Self(node_global_id + 1)
    }

    /// Face entity id with the triangle ordinal bits filled in
    pub fn with_triangle_ordinal(self, triangle_ordinal: u8) -> Self {
        debug_assert!(triangle_ordinal < 4);
        Self(self.0 | u64::from(triangle_ordinal))
    }

    /// The 1-based global element id of a face entity
    pub fn element_id(&self, offset: u64) -> u64 {
        (self.0 >> 5) - offset
    }

    /// Face ordinal (0-5) of a face entity
    pub fn face_ordinal(&self) -> u8 {
        ((self.0 >> 2) & 0x7) as u8
    }

    /// Triangle ordinal (0-3) of a face entity
    pub fn triangle_ordinal(&self) -> u8 {
        (self.0 & 0x3) as u8
    }

    /// Raw packed value
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Axis-aligned bounding box used by the broad phase
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Point,
    pub max: Point,
}

impl Aabb {
    /// Smallest box containing all `points`, grown by `inflation` per side
    pub fn from_points(points: &[Point], inflation: f64) -> Self {
        let mut min = Point::new(f64::MAX, f64::MAX, f64::MAX);
        let mut max = Point::new(f64::MIN, f64::MIN, f64::MIN);
        for p in points {
            for i in 0..3 {
                min[i] = min[i].min(p[i] - inflation);
                max[i] = max[i].max(p[i] + inflation);
            }
        }
        Self { min, max }
    }

    pub fn overlaps(&self, other: &Aabb) -> bool {
        (0..3).all(|i| self.min[i] <= other.max[i] && self.max[i] >= other.min[i])
    }
}

/// A secondary contact node entity
///
/// Carries the current position of one real mesh node plus the force
/// accumulated on it during the current step.
#[derive(Debug, Clone)]
pub struct NodeEntity {
    entity_id: EntityId,
    /// Contact-local id of the backing mesh node
    node_id: usize,
    coord: Point,
    force: Vec3,
    char_len: f64,
    contact_status: bool,
}

impl NodeEntity {
    pub fn new(entity_id: EntityId, node_id: usize, coord: Point, char_len: f64) -> Self {
        Self {
            entity_id,
            node_id,
            coord,
            force: Vec3::zeros(),
            char_len,
            contact_status: false,
        }
    }

    pub fn entity_id(&self) -> EntityId {
        self.entity_id
    }

    pub fn node_id(&self) -> usize {
        self.node_id
    }

    pub fn coordinates(&self) -> Point {
        self.coord
    }

    /// Pull the current position from the contact-local coordinate array
    pub fn set_coordinates(&mut self, coord: &[Point]) {
        self.coord = coord[self.node_id];
    }

    pub fn characteristic_length(&self) -> f64 {
        self.char_len
    }

    pub fn bounding_box(&self) -> Aabb {
        Aabb::from_points(
            std::slice::from_ref(&self.coord),
            BOX_INFLATION_FACTOR * self.char_len,
        )
    }

    pub fn apply_contact_force(&mut self, force: &Vec3) {
        self.force += force;
        self.contact_status = true;
    }

    pub fn force(&self) -> Vec3 {
        self.force
    }

    pub fn zero_force(&mut self) {
        self.force = Vec3::zeros();
        self.contact_status = false;
    }

    pub fn in_contact(&self) -> bool {
        self.contact_status
    }
}

/// A primary contact triangle entity
///
/// Two vertices are real mesh nodes; the third is the fictitious barycenter
/// of the parent quad. Forces accumulate per vertex; the fictitious vertex
/// redistributes its share equally to all four parent-quad corners during
/// the scatter step.
#[derive(Debug, Clone)]
pub struct TriangleEntity {
    entity_id: EntityId,
    coords: [Point; 3],
    force: [Vec3; 3],
    char_len: f64,
    /// Contact-local id backing vertex 1
    node_id_1: usize,
    /// Contact-local id backing vertex 2
    node_id_2: usize,
    /// Contact-local ids of the parent quad's corners (fictitious vertex)
    fictitious_node_ids: [usize; 4],
    contact_status: bool,
}

impl TriangleEntity {
    pub fn new(
        entity_id: EntityId,
        coords: [Point; 3],
        char_len: f64,
        node_id_1: usize,
        node_id_2: usize,
        fictitious_node_ids: [usize; 4],
    ) -> Self {
        Self {
            entity_id,
            coords,
            force: [Vec3::zeros(); 3],
            char_len,
            node_id_1,
            node_id_2,
            fictitious_node_ids,
            contact_status: false,
        }
    }

    pub fn entity_id(&self) -> EntityId {
        self.entity_id
    }

    pub fn coordinates(&self) -> &[Point; 3] {
        &self.coords
    }

    /// Pull current vertex positions from the contact-local coordinate array
    ///
    /// The fictitious vertex is recomputed as the barycenter of the parent
    /// quad's four corners.
    pub fn set_coordinates(&mut self, coord: &[Point]) {
        self.coords[0] = coord[self.node_id_1];
        self.coords[1] = coord[self.node_id_2];
        let mut barycenter = Vec3::zeros();
        for &id in &self.fictitious_node_ids {
            barycenter += coord[id].coords;
        }
        self.coords[2] = Point::from(barycenter / 4.0);
    }

    pub fn characteristic_length(&self) -> f64 {
        self.char_len
    }

    pub fn bounding_box(&self) -> Aabb {
        Aabb::from_points(&self.coords, BOX_INFLATION_FACTOR * self.char_len)
    }

    pub fn centroid(&self) -> Point {
        Point::from((self.coords[0].coords + self.coords[1].coords + self.coords[2].coords) / 3.0)
    }

    /// Accumulate a force split across the vertices by barycentric weight
    pub fn apply_contact_force(&mut self, barycentric: &[f64; 3], force: &Vec3) {
        for i in 0..3 {
            self.force[i] += barycentric[i] * force;
        }
        self.contact_status = true;
    }

    pub fn vertex_forces(&self) -> &[Vec3; 3] {
        &self.force
    }

    pub fn node_id_1(&self) -> usize {
        self.node_id_1
    }

    pub fn node_id_2(&self) -> usize {
        self.node_id_2
    }

    pub fn fictitious_node_ids(&self) -> &[usize; 4] {
        &self.fictitious_node_ids
    }

    pub fn zero_force(&mut self) {
        self.force = [Vec3::zeros(); 3];
        self.contact_status = false;
    }

    pub fn in_contact(&self) -> bool {
        self.contact_status
    }
}

/// Borrowed view over either contact entity variant
///
/// The broad phase and any visualization consumer see entities through this
/// sum type; the force path works on the concrete variants.
#[derive(Debug, Clone, Copy)]
pub enum ContactEntityRef<'a> {
    Node(&'a NodeEntity),
    Triangle(&'a TriangleEntity),
}

impl ContactEntityRef<'_> {
    pub fn entity_id(&self) -> EntityId {
        match self {
            Self::Node(n) => n.entity_id(),
            Self::Triangle(t) => t.entity_id(),
        }
    }

    pub fn characteristic_length(&self) -> f64 {
        match self {
            Self::Node(n) => n.characteristic_length(),
            Self::Triangle(t) => t.characteristic_length(),
        }
    }

    pub fn vertices(&self) -> &[Point] {
        match self {
            Self::Node(n) => std::slice::from_ref(&n.coord),
            Self::Triangle(t) => &t.coords,
        }
    }

    pub fn bounding_box(&self) -> Aabb {
        match self {
            Self::Node(n) => n.bounding_box(),
            Self::Triangle(t) => t.bounding_box(),
        }
    }

    pub fn in_contact(&self) -> bool {
        match self {
            Self::Node(n) => n.in_contact(),
            Self::Triangle(t) => t.in_contact(),
        }
    }
}

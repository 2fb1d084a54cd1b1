use std::sync::Arc;

use nalgebra::Point3;

/// A node position in the plane of the plate. `z` is always zero.
pub type Node = Point3<f64>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Element {
    /// Corner node indices: bottom-left, bottom-right, top-right, top-left
    pub nodes: [usize; 4],
}

/// Parameters that fully determine a plate mesh
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshParams {
    pub length: f64,
    pub breadth: f64,
    pub nx: usize,
    pub ny: usize,
}

/// A generated plate mesh.
///
/// The coordinate and element tables are shared (`Arc`) so that cached
/// results can be handed to many callers without copying. They are never
/// mutated once built.
#[derive(Debug, Clone)]
pub struct MeshResult {
    pub coordinates: Arc<[Node]>,
    pub elements: Arc<[Element]>,
    pub nel: usize,
    pub nnode: usize,
}

impl MeshResult {
    /// Node count of an `nx` by `ny` plate, `None` if it overflows
    pub fn expected_nnode(nx: usize, ny: usize) -> Option<usize> {
        nx.checked_add(1)?.checked_mul(ny.checked_add(1)?)
    }

    /// Element count of an `nx` by `ny` plate, `None` if it overflows
    pub fn expected_nel(nx: usize, ny: usize) -> Option<usize> {
        nx.checked_mul(ny)
    }
}

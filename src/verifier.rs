use std::fmt::Display;

use log::warn;

use crate::datatypes::MeshResult;

/// Absolute tolerance for coordinate comparison
pub const COORDINATE_TOLERANCE: f64 = 1e-10;

/// The first point at which two meshes diverge
#[derive(Debug, Clone, PartialEq)]
pub enum Mismatch {
    ElementCount { a: usize, b: usize },
    NodeCount { a: usize, b: usize },
    CoordinateLength { a: usize, b: usize },
    Coordinate { node: usize, axis: char, a: f64, b: f64 },
    ElementLength { a: usize, b: usize },
    Element { element: usize, corner: usize, a: usize, b: usize },
}

impl Mismatch {
    /// Index of the node or element that diverged, if the mismatch is not a
    /// count or length difference
    pub fn index(&self) -> Option<usize> {
        match self {
            Mismatch::Coordinate { node, .. } => Some(*node),
            Mismatch::Element { element, .. } => Some(*element),
            _ => None,
        }
    }
}

impl Display for Mismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mismatch::ElementCount { a, b } => write!(f, "nel differs: {} vs {}", a, b),
            Mismatch::NodeCount { a, b } => write!(f, "nnode differs: {} vs {}", a, b),
            Mismatch::CoordinateLength { a, b } => {
                write!(f, "coordinate table length differs: {} vs {}", a, b)
            }
            Mismatch::Coordinate { node, axis, a, b } => write!(
                f,
                "node {} differs in {}: {} vs {} (tolerance {:e})",
                node, axis, a, b, COORDINATE_TOLERANCE
            ),
            Mismatch::ElementLength { a, b } => {
                write!(f, "element table length differs: {} vs {}", a, b)
            }
            Mismatch::Element {
                element,
                corner,
                a,
                b,
            } => write!(
                f,
                "element {} differs at corner {}: node {} vs node {}",
                element, corner, a, b
            ),
        }
    }
}

/// Finds the first divergence between two meshes.
///
/// Counts are compared first, then coordinates within
/// [`COORDINATE_TOLERANCE`], then element corners exactly.
///
/// # Arguments
/// * `a` - The first mesh
/// * `b` - The second mesh
///
/// # Returns
/// `None` if the meshes are equivalent
pub fn find_mismatch(a: &MeshResult, b: &MeshResult) -> Option<Mismatch> {
    if a.nel != b.nel {
        return Some(Mismatch::ElementCount { a: a.nel, b: b.nel });
    }
    if a.nnode != b.nnode {
        return Some(Mismatch::NodeCount {
            a: a.nnode,
            b: b.nnode,
        });
    }

    if a.coordinates.len() != b.coordinates.len() {
        return Some(Mismatch::CoordinateLength {
            a: a.coordinates.len(),
            b: b.coordinates.len(),
        });
    }
    for (node, (pa, pb)) in std::iter::zip(a.coordinates.iter(), b.coordinates.iter()).enumerate()
    {
        for (axis, va, vb) in [('x', pa.x, pb.x), ('y', pa.y, pb.y), ('z', pa.z, pb.z)] {
            // written so that NaN never passes
            if !((va - vb).abs() <= COORDINATE_TOLERANCE) {
                return Some(Mismatch::Coordinate {
                    node,
                    axis,
                    a: va,
                    b: vb,
                });
            }
        }
    }

    if a.elements.len() != b.elements.len() {
        return Some(Mismatch::ElementLength {
            a: a.elements.len(),
            b: b.elements.len(),
        });
    }
    for (element, (ea, eb)) in std::iter::zip(a.elements.iter(), b.elements.iter()).enumerate() {
        for corner in 0..4 {
            if ea.nodes[corner] != eb.nodes[corner] {
                return Some(Mismatch::Element {
                    element,
                    corner,
                    a: ea.nodes[corner],
                    b: eb.nodes[corner],
                });
            }
        }
    }

    None
}

/// Checks two meshes for equivalence. Never fails; the first mismatch, if
/// any, is logged.
pub fn verify_mesh_equivalence(a: &MeshResult, b: &MeshResult) -> bool {
    match find_mismatch(a, b) {
        Some(mismatch) => {
            warn!("meshes are not equivalent: {}", mismatch);
            false
        }
        None => true,
    }
}

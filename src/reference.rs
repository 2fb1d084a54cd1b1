//! Reference plate mesher.
//!
//! Builds the same mesh as [`crate::mesher`] through a different route: axis
//! samples, dense meshgrids and an explicit node numbering grid. It is slower
//! and allocates more, and exists so the optimized path has an independent
//! oracle to be checked against. Nothing here calls into the mesher.

use nalgebra::{DMatrix, DVector};

use crate::{
    datatypes::{Element, MeshResult, Node},
    error::PlateMeshError,
};

/// `count` evenly spaced samples from `start` to `end`.
///
/// Each sample scales the span before dividing, which rounds the same way as
/// `i * length / n` instead of accumulating the error of a rounded step.
fn linspace(start: f64, end: f64, count: usize) -> DVector<f64> {
    let intervals = (count - 1) as f64;
    DVector::from_fn(count, |i, _| start + (end - start) * i as f64 / intervals)
}

/// `ij`-indexed meshgrid: entry `(i, j)` holds `xs[i]` in the first matrix
/// and `ys[j]` in the second
fn meshgrid(xs: &DVector<f64>, ys: &DVector<f64>) -> (DMatrix<f64>, DMatrix<f64>) {
    let grid_x = DMatrix::from_fn(xs.len(), ys.len(), |i, _| xs[i]);
    let grid_y = DMatrix::from_fn(xs.len(), ys.len(), |_, j| ys[j]);
    (grid_x, grid_y)
}

fn check_inputs(length: f64, breadth: f64, nx: usize, ny: usize) -> Result<(), PlateMeshError> {
    for (param, value) in [("nx", nx), ("ny", ny)] {
        if value < 1 || value.checked_add(1).is_none() {
            return Err(PlateMeshError::InvalidSubdivision {
                param,
                value: value as f64,
            });
        }
    }
    if (nx + 1).checked_mul(ny + 1).is_none() {
        let (param, value) = if nx >= ny { ("nx", nx) } else { ("ny", ny) };
        return Err(PlateMeshError::InvalidSubdivision {
            param,
            value: value as f64,
        });
    }
    for (param, value, count) in [("length", length, nx), ("breadth", breadth, ny)] {
        let span = value * count as f64;
        if value.is_nan() || value.is_infinite() || span.is_nan() || span.is_infinite() {
            return Err(PlateMeshError::InvalidDimension { param, value });
        }
    }
    Ok(())
}

/// Generates a plate mesh with the meshgrid construction.
///
/// # Arguments
/// * `length` - Plate length along x
/// * `breadth` - Plate breadth along y
/// * `nx` - Subdivisions along the length
/// * `ny` - Subdivisions along the breadth
///
/// # Returns
/// A freshly built, uncached MeshResult
pub fn generate_mesh_reference(
    length: f64,
    breadth: f64,
    nx: usize,
    ny: usize,
) -> Result<MeshResult, PlateMeshError> {
    check_inputs(length, breadth, nx, ny)?;

    let xs = linspace(0.0, length, nx + 1);
    let ys = linspace(0.0, breadth, ny + 1);
    let (grid_x, grid_y) = meshgrid(&xs, &ys);

    // Number grid points row by row of the ij grid, flattening the
    // coordinates in the same pass
    let mut numbering: DMatrix<usize> = DMatrix::zeros(grid_x.nrows(), grid_x.ncols());
    let mut coordinates: Vec<Node> = Vec::new();
    let mut next_number: usize = 0;
    for i in 0..grid_x.nrows() {
        for j in 0..grid_x.ncols() {
            numbering[(i, j)] = next_number;
            coordinates.push(Node::new(grid_x[(i, j)], grid_y[(i, j)], 0.0));
            next_number += 1;
        }
    }

    let mut elements: Vec<Element> = Vec::new();
    for i in 0..numbering.nrows() - 1 {
        for j in 0..numbering.ncols() - 1 {
            elements.push(Element {
                nodes: [
                    numbering[(i, j)],
                    numbering[(i + 1, j)],
                    numbering[(i + 1, j + 1)],
                    numbering[(i, j + 1)],
                ],
            });
        }
    }

    let nnode = coordinates.len();
    let nel = elements.len();
    for (element_idx, element) in elements.iter().enumerate() {
        for &index in &element.nodes {
            if index >= nnode {
                return Err(PlateMeshError::IndexOutOfRange {
                    element: element_idx,
                    index,
                    nnode,
                });
            }
        }
    }

    Ok(MeshResult {
        coordinates: coordinates.into(),
        elements: elements.into(),
        nel,
        nnode,
    })
}

use std::sync::Arc;

use log::info;

use crate::{
    datatypes::{Element, MeshParams, MeshResult, Node},
    error::PlateMeshError,
};

/// Checks that a parameter set can be meshed without producing non-finite
/// coordinates or overflowing the node count.
///
/// # Arguments
/// * `params` - The plate dimensions and subdivision counts
///
/// # Returns
/// The node count of the mesh
pub fn validate_params(params: &MeshParams) -> Result<usize, PlateMeshError> {
    validate_subdivision("nx", params.nx)?;
    validate_subdivision("ny", params.ny)?;
    let nnode = node_count(params.nx, params.ny)?;
    validate_dimension("length", params.length, params.nx)?;
    validate_dimension("breadth", params.breadth, params.ny)?;
    Ok(nnode)
}

/// The largest intermediate value is `subdivisions * value`, so that product
/// has to stay finite as well as the value itself
fn validate_dimension(
    param: &'static str,
    value: f64,
    subdivisions: usize,
) -> Result<(), PlateMeshError> {
    if !value.is_finite() || !(value * subdivisions as f64).is_finite() {
        return Err(PlateMeshError::InvalidDimension { param, value });
    }
    Ok(())
}

fn validate_subdivision(param: &'static str, value: usize) -> Result<(), PlateMeshError> {
    if value == 0 {
        return Err(PlateMeshError::InvalidSubdivision {
            param,
            value: 0.0,
        });
    }
    Ok(())
}

fn node_count(nx: usize, ny: usize) -> Result<usize, PlateMeshError> {
    MeshResult::expected_nnode(nx, ny).ok_or_else(|| {
        let (param, value) = if nx >= ny { ("nx", nx) } else { ("ny", ny) };
        PlateMeshError::InvalidSubdivision {
            param,
            value: value as f64,
        }
    })
}

/// Converts a subdivision count read as a float (json input) into a count.
///
/// # Arguments
/// * `param` - Parameter name used in the error message
/// * `value` - The raw value
///
/// # Returns
/// The count, if `value` is a positive whole number
pub fn subdivision_from_f64(param: &'static str, value: f64) -> Result<usize, PlateMeshError> {
    if !value.is_finite() || value.fract() != 0.0 || value < 1.0 || value >= usize::MAX as f64 {
        return Err(PlateMeshError::InvalidSubdivision { param, value });
    }
    Ok(value as usize)
}

/// Generates the node coordinates of the plate.
///
/// Nodes are enumerated column by column: the x index `i` is the outer loop
/// and the y index `j` the inner one, so node `i * (ny + 1) + j` sits at
/// `(i * length / nx, j * breadth / ny, 0)`.
///
/// # Arguments
/// * `params` - The plate dimensions and subdivision counts
///
/// # Returns
/// A vector of `(nx + 1) * (ny + 1)` nodes
pub fn generate_coordinates(params: &MeshParams) -> Result<Vec<Node>, PlateMeshError> {
    let nnode = validate_params(params)?;

    let MeshParams {
        length,
        breadth,
        nx,
        ny,
    } = *params;

    let mut coordinates: Vec<Node> = Vec::with_capacity(nnode);
    for i in 0..=nx {
        let x = i as f64 * length / nx as f64;
        for j in 0..=ny {
            let y = j as f64 * breadth / ny as f64;
            coordinates.push(Node::new(x, y, 0.0));
        }
    }

    Ok(coordinates)
}

/// Generates the quadrilateral elements of an `nx` by `ny` plate.
///
/// With `n1` the bottom-left node of a cell, the corners are listed
/// counter-clockwise: `n1`, the same row in the next column, the diagonal,
/// then the next row in the same column. Cells are emitted in the same
/// column-major order as the nodes.
///
/// # Arguments
/// * `nx` - Subdivisions along the length
/// * `ny` - Subdivisions along the breadth
///
/// # Returns
/// A vector of `nx * ny` elements
pub fn generate_connectivity(nx: usize, ny: usize) -> Result<Vec<Element>, PlateMeshError> {
    validate_subdivision("nx", nx)?;
    validate_subdivision("ny", ny)?;
    // every index below is less than the node count
    node_count(nx, ny)?;

    let column_stride = ny + 1;

    let mut elements: Vec<Element> = Vec::with_capacity(nx * ny);
    for i in 0..nx {
        for j in 0..ny {
            let n1 = i * column_stride + j;
            elements.push(Element {
                nodes: [n1, n1 + column_stride, n1 + column_stride + 1, n1 + 1],
            });
        }
    }

    Ok(elements)
}

/// Makes sure every element corner refers to an existing node
///
/// # Arguments
/// * `elements` - The elements to check
/// * `nnode` - Number of nodes in the mesh
pub fn check_element_indices(elements: &[Element], nnode: usize) -> Result<(), PlateMeshError> {
    for (element_idx, element) in elements.iter().enumerate() {
        if let Some(&index) = element.nodes.iter().find(|&&n| n >= nnode) {
            return Err(PlateMeshError::IndexOutOfRange {
                element: element_idx,
                index,
                nnode,
            });
        }
    }
    Ok(())
}

/// Combines coordinate and element tables into a mesh result, refusing any
/// table whose element indices point past the last node.
///
/// # Arguments
/// * `coordinates` - The node table
/// * `elements` - The element table
///
/// # Returns
/// A MeshResult with `nel` and `nnode` filled in
pub fn assemble_mesh(
    coordinates: Arc<[Node]>,
    elements: Arc<[Element]>,
) -> Result<MeshResult, PlateMeshError> {
    let nnode = coordinates.len();
    let nel = elements.len();

    check_element_indices(&elements, nnode)?;

    Ok(MeshResult {
        coordinates,
        elements,
        nel,
        nnode,
    })
}

/// Generates a plate mesh without any caching
///
/// # Arguments
/// * `params` - The plate dimensions and subdivision counts
pub fn run(params: &MeshParams) -> Result<MeshResult, PlateMeshError> {
    let coordinates = generate_coordinates(params)?;
    let elements = generate_connectivity(params.nx, params.ny)?;

    let mesh = assemble_mesh(coordinates.into(), elements.into())?;

    info!(
        "generated {} nodes and {} elements for a {}x{} plate",
        mesh.nnode, mesh.nel, params.nx, params.ny
    );

    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(length: f64, breadth: f64, nx: usize, ny: usize) -> MeshParams {
        MeshParams {
            length,
            breadth,
            nx,
            ny,
        }
    }

    #[test]
    fn single_cell_has_corner_nodes() {
        let coordinates = generate_coordinates(&params(3.0, 2.0, 1, 1)).unwrap();
        assert_eq!(
            coordinates,
            vec![
                Node::new(0.0, 0.0, 0.0),
                Node::new(0.0, 2.0, 0.0),
                Node::new(3.0, 0.0, 0.0),
                Node::new(3.0, 2.0, 0.0),
            ]
        );

        let elements = generate_connectivity(1, 1).unwrap();
        assert_eq!(elements, vec![Element { nodes: [0, 2, 3, 1] }]);
    }

    #[test]
    fn nodes_vary_fastest_along_y() {
        let coordinates = generate_coordinates(&params(1.0, 1.0, 2, 2)).unwrap();
        assert_eq!(coordinates.len(), 9);
        assert_eq!(coordinates[0], Node::new(0.0, 0.0, 0.0));
        assert_eq!(coordinates[1], Node::new(0.0, 0.5, 0.0));
        assert_eq!(coordinates[3], Node::new(0.5, 0.0, 0.0));
        assert_eq!(coordinates[8], Node::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn connectivity_is_column_major() {
        let elements = generate_connectivity(2, 2).unwrap();
        let nodes: Vec<[usize; 4]> = elements.iter().map(|e| e.nodes).collect();
        assert_eq!(
            nodes,
            vec![[0, 3, 4, 1], [1, 4, 5, 2], [3, 6, 7, 4], [4, 7, 8, 5]]
        );
    }

    #[test]
    fn elements_are_counter_clockwise() {
        let p = params(4.0, 3.0, 3, 5);
        let coordinates = generate_coordinates(&p).unwrap();
        for element in generate_connectivity(p.nx, p.ny).unwrap() {
            // shoelace formula, positive for counter-clockwise traversal
            let mut twice_area = 0.0;
            for k in 0..4 {
                let a = coordinates[element.nodes[k]];
                let b = coordinates[element.nodes[(k + 1) % 4]];
                twice_area += a.x * b.y - b.x * a.y;
            }
            assert!(twice_area > 0.0, "{:?} is not counter-clockwise", element);
        }
    }

    #[test]
    fn rejects_zero_subdivisions() {
        assert!(matches!(
            generate_coordinates(&params(1.0, 1.0, 0, 3)),
            Err(PlateMeshError::InvalidSubdivision { param: "nx", .. })
        ));
        assert!(matches!(
            generate_connectivity(3, 0),
            Err(PlateMeshError::InvalidSubdivision { param: "ny", .. })
        ));
    }

    #[test]
    fn rejects_non_finite_dimensions() {
        assert!(matches!(
            run(&params(f64::NAN, 1.0, 2, 2)),
            Err(PlateMeshError::InvalidDimension {
                param: "length",
                ..
            })
        ));
        assert!(matches!(
            run(&params(1.0, f64::INFINITY, 2, 2)),
            Err(PlateMeshError::InvalidDimension {
                param: "breadth",
                ..
            })
        ));
    }

    #[test]
    fn rejects_dimensions_that_overflow_when_scaled() {
        assert!(matches!(
            generate_coordinates(&params(f64::MAX, 1.0, 2, 1)),
            Err(PlateMeshError::InvalidDimension {
                param: "length",
                ..
            })
        ));
        assert!(matches!(
            generate_coordinates(&params(1.0, -f64::MAX / 2.0, 1, 3)),
            Err(PlateMeshError::InvalidDimension {
                param: "breadth",
                ..
            })
        ));

        // a single subdivision never scales the dimension
        let coordinates = generate_coordinates(&params(f64::MAX, 1.0, 1, 1)).unwrap();
        assert!(coordinates.iter().all(|n| n.x.is_finite()));
    }

    #[test]
    fn rejects_counts_that_overflow_the_node_count() {
        assert!(matches!(
            generate_connectivity(usize::MAX, 1),
            Err(PlateMeshError::InvalidSubdivision { param: "nx", .. })
        ));
        assert!(matches!(
            generate_coordinates(&params(1.0, 1.0, 2, usize::MAX / 2)),
            Err(PlateMeshError::InvalidSubdivision { param: "ny", .. })
        ));
    }

    #[test]
    fn subdivision_must_be_whole_and_positive() {
        assert_eq!(subdivision_from_f64("nx", 4.0), Ok(4));
        assert!(subdivision_from_f64("nx", 2.5).is_err());
        assert!(subdivision_from_f64("nx", 0.0).is_err());
        assert!(subdivision_from_f64("nx", -3.0).is_err());
        assert!(subdivision_from_f64("nx", f64::NAN).is_err());
        // usize::MAX rounds up to 2^64 as a float
        assert!(subdivision_from_f64("nx", 18446744073709551616.0).is_err());
        assert!(subdivision_from_f64("nx", usize::MAX as f64).is_err());
    }

    #[test]
    fn assemble_rejects_dangling_indices() {
        let coordinates = generate_coordinates(&params(1.0, 1.0, 1, 1)).unwrap();
        let elements = vec![Element { nodes: [0, 2, 4, 1] }];

        let err = assemble_mesh(coordinates.into(), elements.into()).unwrap_err();
        assert_eq!(
            err,
            PlateMeshError::IndexOutOfRange {
                element: 0,
                index: 4,
                nnode: 4,
            }
        );
    }
}

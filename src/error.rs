use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlateMeshError {
    /// Subdivision count is zero, negative or not a whole number
    #[error("Invalid subdivision: {param} = {value} (must be a positive integer)")]
    InvalidSubdivision { param: &'static str, value: f64 },

    /// Plate dimension is NaN, infinite, or too large for its subdivision
    /// count to give finite coordinates
    #[error("Invalid dimension: {param} = {value} (coordinates must be finite)")]
    InvalidDimension { param: &'static str, value: f64 },

    /// A generated element refers to a node that does not exist
    #[error("Element {element} refers to node {index}, but the mesh has {nnode} nodes")]
    IndexOutOfRange {
        element: usize,
        index: usize,
        nnode: usize,
    },

    #[error("Input error: {0}")]
    Input(String),

    #[error("Post processor error: {0}")]
    PostProcessor(String),
}

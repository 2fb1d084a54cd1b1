//! Structured quadrilateral meshes of rectangular plates.
//!
//! [`generate_mesh`] is the memoized production path, [`generate_mesh_reference`]
//! an independent construction of the same mesh, and
//! [`verify_mesh_equivalence`] compares the two.

use std::sync::Arc;

pub mod cache;
pub mod datatypes;
pub mod error;
pub mod input;
pub mod mesher;
pub mod post_processor;
pub mod reference;
pub mod verifier;

pub use cache::{CacheStats, MeshCache};
pub use datatypes::{Element, MeshParams, MeshResult, Node};
pub use error::PlateMeshError;
pub use reference::generate_mesh_reference;
pub use verifier::{find_mismatch, verify_mesh_equivalence, Mismatch};

/// Generates a plate mesh through the process-wide cache
pub fn generate_mesh(
    length: f64,
    breadth: f64,
    nx: usize,
    ny: usize,
) -> Result<Arc<MeshResult>, PlateMeshError> {
    MeshCache::global().generate_mesh(length, breadth, nx, ny)
}

/// Empties the process-wide cache
pub fn clear_cache() {
    MeshCache::global().clear()
}

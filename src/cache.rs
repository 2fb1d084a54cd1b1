use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex, MutexGuard, OnceLock,
    },
};

use log::debug;

use crate::{
    datatypes::{Element, MeshParams, MeshResult, Node},
    error::PlateMeshError,
    mesher,
};

/// Exact cache key of a parameter set. Dimensions are compared by their bit
/// patterns, so two keys only collide for bit-identical inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct ParamsKey {
    length_bits: u64,
    breadth_bits: u64,
    nx: usize,
    ny: usize,
}

impl From<&MeshParams> for ParamsKey {
    fn from(params: &MeshParams) -> Self {
        ParamsKey {
            length_bits: params.length.to_bits(),
            breadth_bits: params.breadth.to_bits(),
            nx: params.nx,
            ny: params.ny,
        }
    }
}

/// Connectivity only depends on the subdivision counts
type ConnectivityKey = (usize, usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub meshes: usize,
    pub coordinate_tables: usize,
    pub connectivity_tables: usize,
}

/// Memoizing front end to the mesher.
///
/// Each table is guarded by its own mutex and the lookup, computation and
/// insertion for a key all happen while that mutex is held, so concurrent
/// callers asking for the same key share a single computation and receive
/// the same `Arc`. Locks are always taken in the order meshes, coordinates,
/// connectivity.
#[derive(Debug, Default)]
pub struct MeshCache {
    meshes: Mutex<HashMap<ParamsKey, Arc<MeshResult>>>,
    coordinates: Mutex<HashMap<ParamsKey, Arc<[Node]>>>,
    connectivity: Mutex<HashMap<ConnectivityKey, Arc<[Element]>>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // entries are inserted only after they are fully built, so a poisoned
    // table still holds nothing partial
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MeshCache {
    pub fn new() -> MeshCache {
        MeshCache::default()
    }

    /// The process-wide cache used by [`crate::generate_mesh`]
    pub fn global() -> &'static MeshCache {
        static GLOBAL: OnceLock<MeshCache> = OnceLock::new();
        GLOBAL.get_or_init(MeshCache::new)
    }

    /// Generates a plate mesh, reusing a previous result for bit-identical
    /// parameters.
    ///
    /// # Arguments
    /// * `length` - Plate length along x
    /// * `breadth` - Plate breadth along y
    /// * `nx` - Subdivisions along the length
    /// * `ny` - Subdivisions along the breadth
    ///
    /// # Returns
    /// A shared handle to the mesh. Repeated calls return the same `Arc`.
    pub fn generate_mesh(
        &self,
        length: f64,
        breadth: f64,
        nx: usize,
        ny: usize,
    ) -> Result<Arc<MeshResult>, PlateMeshError> {
        let params = MeshParams {
            length,
            breadth,
            nx,
            ny,
        };
        mesher::validate_params(&params)?;

        let key = ParamsKey::from(&params);
        let mut meshes = lock(&self.meshes);

        if let Some(mesh) = meshes.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!("mesh cache hit for {:?}", params);
            return Ok(Arc::clone(mesh));
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!("mesh cache miss for {:?}", params);

        let coordinates = self.coordinates(&params)?;
        let elements = self.connectivity(nx, ny)?;
        let mesh = Arc::new(mesher::assemble_mesh(coordinates, elements)?);

        meshes.insert(key, Arc::clone(&mesh));
        Ok(mesh)
    }

    /// Memoized node coordinates for a parameter set
    pub fn coordinates(&self, params: &MeshParams) -> Result<Arc<[Node]>, PlateMeshError> {
        let key = ParamsKey::from(params);
        let mut tables = lock(&self.coordinates);

        if let Some(coordinates) = tables.get(&key) {
            return Ok(Arc::clone(coordinates));
        }

        let coordinates: Arc<[Node]> = mesher::generate_coordinates(params)?.into();
        tables.insert(key, Arc::clone(&coordinates));
        Ok(coordinates)
    }

    /// Memoized element connectivity for a subdivision pair. Plates of
    /// different size but equal subdivisions share one table.
    pub fn connectivity(&self, nx: usize, ny: usize) -> Result<Arc<[Element]>, PlateMeshError> {
        let mut tables = lock(&self.connectivity);

        if let Some(elements) = tables.get(&(nx, ny)) {
            return Ok(Arc::clone(elements));
        }

        let elements: Arc<[Element]> = mesher::generate_connectivity(nx, ny)?.into();
        tables.insert((nx, ny), Arc::clone(&elements));
        Ok(elements)
    }

    /// Drops every cached table and resets the counters
    pub fn clear(&self) {
        let mut meshes = lock(&self.meshes);
        let mut coordinates = lock(&self.coordinates);
        let mut connectivity = lock(&self.connectivity);

        debug!(
            "clearing mesh cache ({} meshes, {} coordinate tables, {} connectivity tables)",
            meshes.len(),
            coordinates.len(),
            connectivity.len()
        );

        meshes.clear();
        coordinates.clear();
        connectivity.clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            meshes: lock(&self.meshes).len(),
            coordinate_tables: lock(&self.coordinates).len(),
            connectivity_tables: lock(&self.connectivity).len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn repeated_calls_share_one_result() {
        let cache = MeshCache::new();

        let first = cache.generate_mesh(2.0, 1.0, 4, 3).unwrap();
        let second = cache.generate_mesh(2.0, 1.0, 4, 3).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.nel, 12);
        assert_eq!(first.nnode, 20);

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.meshes, 1);
    }

    #[test]
    fn connectivity_is_shared_across_dimensions() {
        let cache = MeshCache::new();

        let small = cache.generate_mesh(1.0, 1.0, 3, 3).unwrap();
        let large = cache.generate_mesh(10.0, 5.0, 3, 3).unwrap();

        assert!(!Arc::ptr_eq(&small, &large));
        assert!(Arc::ptr_eq(&small.elements, &large.elements));
        assert!(!Arc::ptr_eq(&small.coordinates, &large.coordinates));

        let stats = cache.stats();
        assert_eq!(stats.meshes, 2);
        assert_eq!(stats.coordinate_tables, 2);
        assert_eq!(stats.connectivity_tables, 1);
    }

    #[test]
    fn keys_are_exact() {
        let cache = MeshCache::new();

        let a = cache.generate_mesh(0.3, 1.0, 2, 2).unwrap();
        let b = cache.generate_mesh(0.1 + 0.2, 1.0, 2, 2).unwrap();

        // 0.1 + 0.2 != 0.3 in binary floating point
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(cache.stats().meshes, 2);
    }

    #[test]
    fn failed_generation_is_not_cached() {
        let cache = MeshCache::new();

        let err = cache.generate_mesh(1.0, 1.0, 0, 4).unwrap_err();
        assert!(matches!(err, PlateMeshError::InvalidSubdivision { .. }));

        let err = cache.generate_mesh(f64::NAN, 1.0, 2, 4).unwrap_err();
        assert!(matches!(err, PlateMeshError::InvalidDimension { .. }));

        assert_eq!(cache.stats(), CacheStats::default());
    }

    #[test]
    fn clear_forces_recomputation() {
        let cache = MeshCache::new();

        let before = cache.generate_mesh(1.0, 2.0, 2, 5).unwrap();
        cache.clear();
        assert_eq!(cache.stats(), CacheStats::default());

        let after = cache.generate_mesh(1.0, 2.0, 2, 5).unwrap();
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(before.coordinates, after.coordinates);
        assert_eq!(before.elements, after.elements);
    }

    #[test]
    fn concurrent_callers_receive_the_same_object() {
        let cache = MeshCache::new();

        let meshes: Vec<Arc<MeshResult>> = thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| s.spawn(|| cache.generate_mesh(3.0, 2.0, 16, 16).unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        for mesh in &meshes[1..] {
            assert!(Arc::ptr_eq(&meshes[0], mesh));
        }
        assert_eq!(cache.stats().misses, 1);
        assert_eq!(cache.stats().hits, 7);
    }
}

use crate::bounds::BoundingBox;
use crate::config::GatherConfig;
use crate::error::KdTreeError;
use crate::kdtree::{KdTree, Neighbor};
use crate::photon::{Photon, PhotonMap};
use rand::prelude::*;
use rand::rngs::StdRng;
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen_rayon::init_thread_pool;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn init_threads(n: usize) -> js_sys::Promise {
    init_thread_pool(n)
}

// --- Bounding Box ---

/// Represents an axis-aligned bounding box in 3D space.
#[wasm_bindgen]
#[derive(Clone, Copy, Debug)]
pub struct BoundingBox3D {
    pub min_x: f64,
    pub min_y: f64,
    pub min_z: f64,
    pub max_x: f64,
    pub max_y: f64,
    pub max_z: f64,
}

#[wasm_bindgen]
impl BoundingBox3D {
    #[wasm_bindgen(constructor)]
    pub fn new(
        min_x: f64,
        min_y: f64,
        min_z: f64,
        max_x: f64,
        max_y: f64,
        max_z: f64,
    ) -> BoundingBox3D {
        BoundingBox3D {
            min_x,
            min_y,
            min_z,
            max_x,
            max_y,
            max_z,
        }
    }
}

impl From<BoundingBox3D> for BoundingBox<3> {
    fn from(b: BoundingBox3D) -> Self {
        Self {
            min: [b.min_x, b.min_y, b.min_z],
            max: [b.max_x, b.max_y, b.max_z],
        }
    }
}

fn to_js(e: KdTreeError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn flatten_neighbors<'a>(neighbors: impl IntoIterator<Item = Neighbor<'a, [f64; 3]>>) -> Vec<f64> {
    neighbors
        .into_iter()
        .flat_map(|n| [n.point[0], n.point[1], n.point[2], n.distance])
        .collect()
}

fn chunks3(values: &[f64]) -> Result<Vec<[f64; 3]>, KdTreeError> {
    if values.len() % 3 != 0 {
        return Err(KdTreeError::FlatLength { len: values.len(), dim: 3 });
    }
    Ok(values.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect())
}

// --- Point index ---

/// A static 3D point index.
///
/// Query results are flat arrays: `nearest` and `kNearest` return
/// `[x, y, z, distance, ...]` quadruples, `range` returns `[x, y, z, ...]` triples.
#[wasm_bindgen]
pub struct PointIndex3D {
    inner: KdTree<[f64; 3], 3>,
}

#[wasm_bindgen]
impl PointIndex3D {
    /// Builds the index from a flat array `[x, y, z, x, y, z, ...]`.
    #[wasm_bindgen(constructor)]
    pub fn new(points: &[f64], bounds: BoundingBox3D) -> Result<PointIndex3D, JsValue> {
        let region: BoundingBox<3> = bounds.into();
        let region = BoundingBox::try_new(region.min, region.max).map_err(to_js)?;
        let inner = KdTree::from_flat(points, region).map_err(to_js)?;
        Ok(PointIndex3D { inner })
    }

    /// Builds the index over `count` points sampled uniformly inside `bounds`.
    pub fn random(bounds: BoundingBox3D, count: usize) -> PointIndex3D {
        let region: BoundingBox<3> = bounds.into();
        let mut rng = StdRng::seed_from_u64(get_seed());
        PointIndex3D {
            inner: KdTree::build(region.random_points(count, &mut rng), region),
        }
    }

    #[wasm_bindgen(getter)]
    pub fn count_points(&self) -> usize {
        self.inner.len()
    }

    #[wasm_bindgen(getter)]
    pub fn depth(&self) -> usize {
        self.inner.depth()
    }

    /// All points in in-order sequence.
    #[wasm_bindgen(getter)]
    pub fn points(&self) -> Vec<f64> {
        self.inner.in_order().into_iter().flatten().copied().collect()
    }

    pub fn nearest(&self, x: f64, y: f64, z: f64) -> Vec<f64> {
        flatten_neighbors(self.inner.nearest(&[x, y, z]))
    }

    #[wasm_bindgen(js_name = kNearest)]
    pub fn k_nearest(&self, x: f64, y: f64, z: f64, k: usize) -> Vec<f64> {
        flatten_neighbors(self.inner.k_nearest(&[x, y, z], k))
    }

    pub fn range(&self, bounds: BoundingBox3D) -> Vec<f64> {
        self.inner.range(&bounds.into()).into_iter().flatten().copied().collect()
    }
}

// --- Photon map ---

/// A photon map built from parallel flat arrays of positions, directions and powers.
#[wasm_bindgen]
pub struct PhotonMap3D {
    inner: PhotonMap,
}

#[wasm_bindgen]
impl PhotonMap3D {
    #[wasm_bindgen(constructor)]
    pub fn new(positions: &[f64], directions: &[f64], powers: &[f64], gather_count: usize) -> Result<PhotonMap3D, JsValue> {
        let photons = photons_from_flat(positions, directions, powers).map_err(to_js)?;
        Ok(PhotonMap3D {
            inner: PhotonMap::new(photons, GatherConfig::new(gather_count)),
        })
    }

    #[wasm_bindgen(getter)]
    pub fn count_photons(&self) -> usize {
        self.inner.len()
    }

    /// Returns `[r, g, b]` at the surface point `p` with normal `n`.
    #[wasm_bindgen(js_name = radianceEstimate)]
    pub fn radiance_estimate(&self, px: f64, py: f64, pz: f64, nx: f64, ny: f64, nz: f64) -> Vec<f64> {
        self.inner.radiance_estimate(&[px, py, pz], &[nx, ny, nz]).to_vec()
    }
}

fn photons_from_flat(positions: &[f64], directions: &[f64], powers: &[f64]) -> Result<Vec<Photon>, KdTreeError> {
    for values in [directions, powers] {
        if values.len() != positions.len() {
            return Err(KdTreeError::LengthMismatch { expected: positions.len(), found: values.len() });
        }
    }
    let positions = chunks3(positions)?;
    let directions = chunks3(directions)?;
    let powers = chunks3(powers)?;
    Ok(positions
        .into_iter()
        .zip(directions)
        .zip(powers)
        .map(|((position, direction), power)| Photon::new(position, direction, power))
        .collect())
}

fn get_seed() -> u64 {
    #[cfg(target_arch = "wasm32")]
    {
        (js_sys::Math::random() * 4294967296.0) as u64
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        123456789 // Fixed seed for tests
    }
}

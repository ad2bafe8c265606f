//! # photonkd
//!
//! `photonkd` is a Rust library for static kd-trees over photon maps, designed to be used in Rust
//! as well as compiled to WebAssembly (WASM). A tree is built once over the photons a renderer
//! has emitted and then queried many times, from many threads, while shading.
//!
//! ## Features
//!
//! - **Balanced build**: recursive median partition with the split axis cycling through the
//!   dimensions, giving logarithmic depth.
//! - **Branch-and-bound queries**: nearest neighbor, bounded k-nearest neighbors and closed
//!   axis-aligned range searches.
//! - **Generic payloads**: any type implementing [`Point`] can be stored; the median ordering
//!   policy is pluggable through [`AxisOrder`].
//! - **Photon maps**: [`PhotonMap`] wraps the tree with power normalisation and the radiance
//!   estimate over the nearest photons.
//! - **Parallel batches**: batch queries run on `rayon`.
//!
//! ## Main Interface
//!
//! The primary entry point is the [`KdTree`] struct.

mod bounds;
mod config;
mod error;
mod kdtree;
mod photon;
mod point;
mod wasm;

pub use bounds::BoundingBox;
pub use config::GatherConfig;
pub use error::KdTreeError;
pub use kdtree::KdTree;
pub use kdtree::Neighbor;
pub use photon::Photon;
pub use photon::PhotonMap;
pub use point::AxisOrder;
pub use point::ByCoordinate;
pub use point::Point;
pub use wasm::BoundingBox3D;
pub use wasm::PhotonMap3D;
pub use wasm::PointIndex3D;

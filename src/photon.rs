use crate::config::GatherConfig;
use crate::kdtree::{KdTree, Neighbor};
use crate::point::Point;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

/// A stored light-transport sample: where a photon landed, the direction it was
/// travelling in, and the power it carries per color channel.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Photon {
    pub position: [f64; 3],
    pub direction: [f64; 3],
    pub power: [f64; 3],
}

impl Photon {
    pub fn new(position: [f64; 3], direction: [f64; 3], power: [f64; 3]) -> Self {
        Self { position, direction, power }
    }
}

impl Point<3> for Photon {
    #[inline]
    fn coordinate(&self, axis: usize) -> f64 {
        self.position[axis]
    }
}

impl fmt::Display for Photon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [x, y, z] = self.position;
        let [r, g, b] = self.power;
        write!(f, "{:.2} {:.2} {:.2} {:.2} {:.2} {:.2}", x, y, z, r, g, b)
    }
}

/// A photon map: the kd-tree over a finished photon set plus the density
/// estimate used to reconstruct indirect illumination at a shading point.
#[derive(Clone)]
pub struct PhotonMap {
    tree: KdTree<Photon, 3>,
    config: GatherConfig,
}

impl PhotonMap {
    /// Builds the map. Each photon's power is divided by the number of stored
    /// photons so the total flux is independent of the emission budget.
    pub fn new(mut photons: Vec<Photon>, config: GatherConfig) -> Self {
        let count = photons.len();
        if count > 0 {
            let scale = 1.0 / count as f64;
            for photon in &mut photons {
                for c in &mut photon.power {
                    *c *= scale;
                }
            }
            log::debug!("scaled power of {} photons by {:e}", count, scale);
        }

        Self {
            tree: KdTree::from_points(photons),
            config,
        }
    }

    pub fn tree(&self) -> &KdTree<Photon, 3> {
        &self.tree
    }

    pub fn config(&self) -> &GatherConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// The photons that contribute to an estimate at `position`, nearest first.
    pub fn gather(&self, position: &[f64; 3]) -> Vec<Neighbor<'_, Photon>> {
        let mut photons = self.tree.k_nearest(position, self.config.gather_count);
        if let Some(max_radius) = self.config.max_radius {
            photons.retain(|n| n.distance <= max_radius);
        }
        photons
    }

    /// Estimates the reflected flux density at a surface point with normal `normal`.
    ///
    /// Sums the power of the gathered photons arriving from the front side of the
    /// surface and divides by the area of the disc that encloses them. Returns
    /// black when nothing is gathered or all photons sit exactly on `position`.
    pub fn radiance_estimate(&self, position: &[f64; 3], normal: &[f64; 3]) -> [f64; 3] {
        let photons = self.gather(position);
        let Some(farthest) = photons.last() else {
            return [0.0; 3];
        };
        let r = farthest.distance;
        if r <= 0.0 {
            return [0.0; 3];
        }

        let mut flux = [0.0; 3];
        for n in &photons {
            let incoming = n.point.direction;
            let facing = -(incoming[0] * normal[0] + incoming[1] * normal[1] + incoming[2] * normal[2]);
            if facing > 0.0 {
                for (f, p) in flux.iter_mut().zip(n.point.power) {
                    *f += p;
                }
            }
        }

        let area = PI * r * r;
        flux.map(|f| f / area)
    }

    /// Runs [`PhotonMap::radiance_estimate`] for many `(position, normal)` pairs in parallel.
    pub fn radiance_estimate_batch(&self, samples: &[([f64; 3], [f64; 3])]) -> Vec<[f64; 3]> {
        samples
            .par_iter()
            .map(|(position, normal)| self.radiance_estimate(position, normal))
            .collect()
    }
}

impl fmt::Display for PhotonMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.tree, f)
    }
}

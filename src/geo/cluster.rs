//! K-means clustering of accident positions.
//!
//! Lloyd iterations seeded with k-means++. Runs are deterministic for a
//! given seed so that charts are reproducible.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::model::{AccidentError, Result};

pub const DEFAULT_CLUSTERS: usize = 15;

#[derive(Debug, Clone)]
pub struct KMeans {
    pub clusters: usize,
    pub max_iter: usize,
    /// Stop once no centre moves further than this (same unit as the points).
    pub tolerance: f64,
    pub seed: u64,
}

impl Default for KMeans {
    fn default() -> Self {
        Self {
            clusters: DEFAULT_CLUSTERS,
            max_iter: 300,
            tolerance: 1e-4,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    pub center: (f64, f64),
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Clustering {
    /// Cluster index of every input point.
    pub labels: Vec<usize>,
    pub clusters: Vec<Cluster>,
    pub iterations: usize,
}

fn dist2(a: (f64, f64), b: (f64, f64)) -> f64 {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    dx * dx + dy * dy
}

fn nearest(point: (f64, f64), centers: &[(f64, f64)]) -> (usize, f64) {
    centers
        .iter()
        .enumerate()
        .map(|(i, &c)| (i, dist2(point, c)))
        .fold((0, f64::INFINITY), |best, cur| if cur.1 < best.1 { cur } else { best })
}

impl KMeans {
    pub fn new(clusters: usize) -> Self {
        Self {
            clusters,
            ..Self::default()
        }
    }

    fn seed_centers(&self, points: &[(f64, f64)], k: usize, rng: &mut StdRng) -> Vec<(f64, f64)> {
        let mut centers = Vec::with_capacity(k);
        centers.push(points[rng.gen_range(0..points.len())]);

        let mut weights: Vec<f64> = points.iter().map(|&p| dist2(p, centers[0])).collect();
        while centers.len() < k {
            let total: f64 = weights.iter().sum();
            let next = if total > 0.0 {
                let mut target = rng.gen_range(0.0..total);
                weights
                    .iter()
                    .position(|&w| {
                        target -= w;
                        target < 0.0
                    })
                    .unwrap_or(points.len() - 1)
            } else {
                // all remaining points coincide with a centre
                rng.gen_range(0..points.len())
            };
            let center = points[next];
            centers.push(center);
            for (w, &p) in weights.iter_mut().zip(points) {
                *w = w.min(dist2(p, center));
            }
        }
        centers
    }

    /// Clusters the points. `clusters` is clamped to the number of points.
    pub fn fit(&self, points: &[(f64, f64)]) -> Result<Clustering> {
        if points.is_empty() {
            return Err(AccidentError::EmptyDataset);
        }
        let k = self.clusters.clamp(1, points.len());
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut centers = self.seed_centers(points, k, &mut rng);
        let mut labels = vec![0usize; points.len()];
        let mut iterations = 0;

        for _ in 0..self.max_iter {
            iterations += 1;
            for (label, &p) in labels.iter_mut().zip(points) {
                *label = nearest(p, &centers).0;
            }

            let mut sums = vec![(0.0, 0.0, 0usize); k];
            for (&label, &p) in labels.iter().zip(points) {
                let s = &mut sums[label];
                s.0 += p.0;
                s.1 += p.1;
                s.2 += 1;
            }

            let mut shift: f64 = 0.0;
            for (center, &(sx, sy, n)) in centers.iter_mut().zip(&sums) {
                // an empty cluster keeps its previous centre
                if n > 0 {
                    let moved = (sx / n as f64, sy / n as f64);
                    shift = shift.max(dist2(*center, moved).sqrt());
                    *center = moved;
                }
            }
            if shift <= self.tolerance {
                break;
            }
        }

        for (label, &p) in labels.iter_mut().zip(points) {
            *label = nearest(p, &centers).0;
        }
        let mut counts = vec![0usize; k];
        for &label in &labels {
            counts[label] += 1;
        }

        Ok(Clustering {
            labels,
            clusters: centers
                .into_iter()
                .zip(counts)
                .map(|(center, count)| Cluster { center, count })
                .collect(),
            iterations,
        })
    }
}

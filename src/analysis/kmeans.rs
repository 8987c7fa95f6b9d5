use ndarray::{Array2, ArrayView1, Axis};
use rand::{SeedableRng, rngs::StdRng, seq::index};

use crate::error::ClusterError;

/// Lloyd's k-means with random initialization and several restarts.
///
/// Each restart seeds its centroids with `k` distinct rows drawn from a
/// generator seeded once with `seed`; the restart with the lowest inertia
/// wins. Identical input and seed give identical labels and centroids.
#[derive(Debug, Clone)]
pub struct KMeans {
    pub k: usize,
    pub n_init: usize,
    pub max_iter: usize,
    pub tol: f64,
    pub seed: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KMeansFit {
    pub labels: Vec<usize>,
    /// One row per cluster.
    pub centroids: Array2<f64>,
    pub inertia: f64,
    pub iterations: usize,
}

impl KMeans {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            n_init: 10,
            max_iter: 300,
            tol: 1e-4,
            seed: 0,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_restarts(mut self, n_init: usize) -> Self {
        self.n_init = n_init.max(1);
        self
    }

    pub fn fit(&self, data: &Array2<f64>) -> Result<KMeansFit, ClusterError> {
        let n = data.nrows();
        if self.k == 0 {
            return Err(ClusterError::Config("k must be at least 1".to_string()));
        }
        if n < self.k {
            return Err(ClusterError::TooFewRows {
                needed: self.k,
                got: n,
            });
        }

        let tolerance = self.tol * mean_variance(data);
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut best: Option<KMeansFit> = None;

        for _ in 0..self.n_init {
            let seeds = index::sample(&mut rng, n, self.k).into_vec();
            let fit = self.lloyd(data, seeds, tolerance);
            if best.as_ref().is_none_or(|b| fit.inertia < b.inertia) {
                best = Some(fit);
            }
        }

        best.ok_or_else(|| ClusterError::Config("no k-means run completed".to_string()))
    }

    fn lloyd(&self, data: &Array2<f64>, seeds: Vec<usize>, tolerance: f64) -> KMeansFit {
        let mut centroids = data.select(Axis(0), &seeds);
        let mut labels = vec![0; data.nrows()];
        let mut iterations = 0;

        for iter in 0..self.max_iter {
            iterations = iter + 1;
            assign(data, &centroids, &mut labels);
            let updated = recompute(data, &centroids, &labels, self.k);

            let shift: f64 = (&updated - &centroids).mapv(|v| v * v).sum();
            centroids = updated;
            if shift <= tolerance {
                break;
            }
        }

        // labels must match the final centroids
        let inertia = assign(data, &centroids, &mut labels);

        KMeansFit {
            labels,
            centroids,
            inertia,
            iterations,
        }
    }
}

fn squared_distance(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Assigns every row to its nearest centroid, lowest index on ties.
/// Returns the resulting inertia.
fn assign(data: &Array2<f64>, centroids: &Array2<f64>, labels: &mut [usize]) -> f64 {
    let mut inertia = 0.0;
    for (row, label) in data.outer_iter().zip(labels.iter_mut()) {
        let mut nearest = 0;
        let mut nearest_dist = f64::INFINITY;
        for (c, centroid) in centroids.outer_iter().enumerate() {
            let dist = squared_distance(row, centroid);
            if dist < nearest_dist {
                nearest = c;
                nearest_dist = dist;
            }
        }
        *label = nearest;
        inertia += nearest_dist;
    }
    inertia
}

/// Cluster means. An empty cluster is moved onto the point farthest from its
/// current centroid.
fn recompute(data: &Array2<f64>, centroids: &Array2<f64>, labels: &[usize], k: usize) -> Array2<f64> {
    let mut sums = Array2::<f64>::zeros((k, data.ncols()));
    let mut counts = vec![0usize; k];

    for (row, &label) in data.outer_iter().zip(labels) {
        let mut target = sums.row_mut(label);
        target += &row;
        counts[label] += 1;
    }

    let mut taken: Vec<usize> = Vec::new();
    for c in 0..k {
        if counts[c] > 0 {
            let count = counts[c] as f64;
            sums.row_mut(c).mapv_inplace(|v| v / count);
            continue;
        }

        let farthest = data
            .outer_iter()
            .enumerate()
            .filter(|(i, _)| !taken.contains(i))
            .map(|(i, row)| (i, squared_distance(row, centroids.row(labels[i]))))
            .fold(None, |acc: Option<(usize, f64)>, (i, d)| match acc {
                Some((_, best)) if best >= d => acc,
                _ => Some((i, d)),
            });

        if let Some((i, _)) = farthest {
            taken.push(i);
            sums.row_mut(c).assign(&data.row(i));
        }
    }

    sums
}

fn mean_variance(data: &Array2<f64>) -> f64 {
    let n = data.nrows().max(1) as f64;
    let mean = data.sum_axis(Axis(0)) / n;
    let variance = (data - &mean).mapv(|v| v * v).sum_axis(Axis(0)) / n;
    variance.mean().unwrap_or(0.0)
}

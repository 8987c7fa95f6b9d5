use indicatif::ProgressBar;
use ndarray::Array2;
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::error::ClusterError;

const PERPLEXITY_TOLERANCE: f64 = 1e-5;
const PERPLEXITY_STEPS: usize = 100;
const MIN_PROBABILITY: f64 = 1e-12;
const MIN_GAIN: f64 = 0.01;
const INITIAL_SCALE: f64 = 1e-4;

/// Exact t-distributed stochastic neighbor embedding into two dimensions.
///
/// All randomness comes from a generator seeded with `seed`, so a given
/// input always embeds to the same coordinates.
#[derive(Debug, Clone)]
pub struct Tsne {
    pub perplexity: f64,
    pub n_iter: usize,
    pub early_exaggeration: f64,
    pub exaggeration_iter: usize,
    /// `None` picks `max(n / early_exaggeration / 4, 50)`.
    pub learning_rate: Option<f64>,
    pub seed: u64,
}

impl Default for Tsne {
    fn default() -> Self {
        Self {
            perplexity: 30.0,
            n_iter: 1000,
            early_exaggeration: 12.0,
            exaggeration_iter: 250,
            learning_rate: None,
            seed: 0,
        }
    }
}

impl Tsne {
    /// Perplexity actually used for `n` points. It must stay below the
    /// number of neighbors, so small inputs get a smaller one.
    pub fn effective_perplexity(&self, n: usize) -> f64 {
        let limit = n.saturating_sub(1) as f64 / 3.0;
        if self.perplexity > limit {
            limit.max(1.0)
        } else {
            self.perplexity
        }
    }

    pub fn fit_transform(
        &self,
        data: &Array2<f64>,
        pb: &ProgressBar,
    ) -> Result<Array2<f64>, ClusterError> {
        let n = data.nrows();
        if n < 2 {
            return Err(ClusterError::TooFewRows { needed: 2, got: n });
        }
        if self.perplexity <= 0.0 || self.n_iter == 0 {
            return Err(ClusterError::Config(
                "t-SNE needs a positive perplexity and at least one iteration".to_string(),
            ));
        }

        let distances = squared_distances(data);
        let p = joint_probabilities(&distances, self.effective_perplexity(n));

        let learning_rate = self
            .learning_rate
            .unwrap_or_else(|| (n as f64 / self.early_exaggeration / 4.0).max(50.0));

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut y = Array2::from_shape_simple_fn((n, 2), || INITIAL_SCALE * standard_normal(&mut rng));
        let mut update = Array2::<f64>::zeros((n, 2));
        let mut gains = Array2::<f64>::ones((n, 2));
        let mut num = Array2::<f64>::zeros((n, n));
        let mut grad = Array2::<f64>::zeros((n, 2));

        pb.set_length(self.n_iter as u64);
        for iter in 0..self.n_iter {
            let (exaggeration, momentum) = if iter < self.exaggeration_iter {
                (self.early_exaggeration, 0.5)
            } else {
                (1.0, 0.8)
            };

            // Student-t affinities in the embedding
            let mut sum_num = 0.0;
            for i in 0..n {
                for j in (i + 1)..n {
                    let dx = y[[i, 0]] - y[[j, 0]];
                    let dy = y[[i, 1]] - y[[j, 1]];
                    let value = 1.0 / (1.0 + dx * dx + dy * dy);
                    num[[i, j]] = value;
                    num[[j, i]] = value;
                    sum_num += 2.0 * value;
                }
            }

            grad.fill(0.0);
            for i in 0..n {
                for j in 0..n {
                    if i == j {
                        continue;
                    }
                    let q = (num[[i, j]] / sum_num).max(MIN_PROBABILITY);
                    let mult = (exaggeration * p[[i, j]] - q) * num[[i, j]];
                    grad[[i, 0]] += 4.0 * mult * (y[[i, 0]] - y[[j, 0]]);
                    grad[[i, 1]] += 4.0 * mult * (y[[i, 1]] - y[[j, 1]]);
                }
            }

            for ((g, u), gain) in grad.iter().zip(update.iter_mut()).zip(gains.iter_mut()) {
                *gain = if *g * *u < 0.0 {
                    *gain + 0.2
                } else {
                    (*gain * 0.8).max(MIN_GAIN)
                };
                *u = momentum * *u - learning_rate * *gain * *g;
            }
            y += &update;

            let mean_x = y.column(0).sum() / n as f64;
            let mean_y = y.column(1).sum() / n as f64;
            y.column_mut(0).mapv_inplace(|v| v - mean_x);
            y.column_mut(1).mapv_inplace(|v| v - mean_y);

            pb.inc(1);
        }

        Ok(y)
    }
}

fn squared_distances(data: &Array2<f64>) -> Array2<f64> {
    let n = data.nrows();
    let mut distances = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        for j in (i + 1)..n {
            let d: f64 = data
                .row(i)
                .iter()
                .zip(data.row(j).iter())
                .map(|(a, b)| (a - b) * (a - b))
                .sum();
            distances[[i, j]] = d;
            distances[[j, i]] = d;
        }
    }
    distances
}

/// Symmetric input affinities: per-point Gaussian bandwidths found by
/// bisection so that each conditional distribution has the target
/// perplexity, then symmetrized and normalized.
fn joint_probabilities(distances: &Array2<f64>, perplexity: f64) -> Array2<f64> {
    let n = distances.nrows();
    let target_entropy = perplexity.ln();
    let mut conditional = Array2::<f64>::zeros((n, n));

    for i in 0..n {
        let mut beta = 1.0;
        let mut beta_min = f64::NEG_INFINITY;
        let mut beta_max = f64::INFINITY;

        for _ in 0..PERPLEXITY_STEPS {
            let mut sum = 0.0;
            for j in 0..n {
                let value = if i == j {
                    0.0
                } else {
                    (-distances[[i, j]] * beta).exp()
                };
                conditional[[i, j]] = value;
                sum += value;
            }
            if sum == 0.0 {
                sum = f64::EPSILON;
            }

            let mut weighted = 0.0;
            for j in 0..n {
                conditional[[i, j]] /= sum;
                weighted += distances[[i, j]] * conditional[[i, j]];
            }
            let entropy = sum.ln() + beta * weighted;
            let diff = entropy - target_entropy;
            if diff.abs() <= PERPLEXITY_TOLERANCE {
                break;
            }

            if diff > 0.0 {
                beta_min = beta;
                beta = if beta_max.is_infinite() {
                    beta * 2.0
                } else {
                    (beta + beta_max) / 2.0
                };
            } else {
                beta_max = beta;
                beta = if beta_min.is_infinite() {
                    beta / 2.0
                } else {
                    (beta + beta_min) / 2.0
                };
            }
        }
    }

    let total = 2.0 * n as f64;
    let mut joint = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        for j in 0..n {
            if i != j {
                joint[[i, j]] =
                    ((conditional[[i, j]] + conditional[[j, i]]) / total).max(MIN_PROBABILITY);
            }
        }
    }
    joint
}

/// Box-Muller draw from N(0, 1).
fn standard_normal(rng: &mut StdRng) -> f64 {
    let u1: f64 = rng.random::<f64>().max(f64::MIN_POSITIVE);
    let u2: f64 = rng.random::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

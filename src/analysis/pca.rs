use ndarray::{Array1, Array2, Axis, s};

const MAX_SWEEPS: usize = 100;
const OFF_DIAGONAL_TOLERANCE: f64 = 1e-22;

/// Principal component analysis by eigen-decomposition of the covariance
/// matrix.
#[derive(Debug, Clone)]
pub struct Pca {
    /// Principal axes, one per column (features x components).
    pub components: Array2<f64>,
    pub explained_variance_ratio: Vec<f64>,
    mean: Array1<f64>,
}

impl Pca {
    pub fn fit(data: &Array2<f64>, n_components: usize) -> Self {
        let n = data.nrows();
        let d = data.ncols();
        let k = n_components.min(d);

        let mean = data.sum_axis(Axis(0)) / n.max(1) as f64;
        let centered = data - &mean;
        let covariance = centered.t().dot(&centered) / n.saturating_sub(1).max(1) as f64;

        let (eigenvalues, eigenvectors) = symmetric_eigen(covariance);

        let mut order: Vec<usize> = (0..d).collect();
        order.sort_by(|&a, &b| eigenvalues[b].total_cmp(&eigenvalues[a]));

        let total: f64 = eigenvalues.iter().map(|v| v.max(0.0)).sum();
        let mut components = Array2::zeros((d, k));
        let mut explained_variance_ratio = Vec::with_capacity(k);

        for (col, &idx) in order.iter().take(k).enumerate() {
            let mut axis = eigenvectors.column(idx).to_owned();
            // largest loading positive, so the orientation is reproducible
            let pivot = axis
                .iter()
                .copied()
                .fold(0.0_f64, |acc, v| if v.abs() > acc.abs() { v } else { acc });
            if pivot < 0.0 {
                axis.mapv_inplace(|v| -v);
            }
            components.slice_mut(s![.., col]).assign(&axis);

            let ratio = if total > 0.0 {
                eigenvalues[idx].max(0.0) / total
            } else {
                0.0
            };
            explained_variance_ratio.push(ratio);
        }

        Self {
            components,
            explained_variance_ratio,
            mean,
        }
    }

    pub fn transform(&self, data: &Array2<f64>) -> Array2<f64> {
        (data - &self.mean).dot(&self.components)
    }

    pub fn fit_transform(data: &Array2<f64>, n_components: usize) -> (Self, Array2<f64>) {
        let pca = Self::fit(data, n_components);
        let projected = pca.transform(data);
        (pca, projected)
    }
}

/// Cyclic Jacobi eigen-decomposition of a symmetric matrix.
///
/// Returns the eigenvalues and the matching eigenvectors as columns.
pub fn symmetric_eigen(mut a: Array2<f64>) -> (Array1<f64>, Array2<f64>) {
    let n = a.nrows();
    let mut v = Array2::<f64>::eye(n);

    for _ in 0..MAX_SWEEPS {
        let mut off = 0.0;
        for p in 0..n {
            for q in (p + 1)..n {
                off += a[[p, q]] * a[[p, q]];
            }
        }
        if off < OFF_DIAGONAL_TOLERANCE {
            break;
        }

        for p in 0..n {
            for q in (p + 1)..n {
                let apq = a[[p, q]];
                if apq == 0.0 {
                    continue;
                }

                let theta = (a[[q, q]] - a[[p, p]]) / (2.0 * apq);
                let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;

                for k in 0..n {
                    let akp = a[[k, p]];
                    let akq = a[[k, q]];
                    a[[k, p]] = c * akp - s * akq;
                    a[[k, q]] = s * akp + c * akq;
                }
                for k in 0..n {
                    let apk = a[[p, k]];
                    let aqk = a[[q, k]];
                    a[[p, k]] = c * apk - s * aqk;
                    a[[q, k]] = s * apk + c * aqk;
                }
                for k in 0..n {
                    let vkp = v[[k, p]];
                    let vkq = v[[k, q]];
                    v[[k, p]] = c * vkp - s * vkq;
                    v[[k, q]] = s * vkp + c * vkq;
                }
            }
        }
    }

    (a.diag().to_owned(), v)
}

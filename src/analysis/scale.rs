use ndarray::{Array1, Array2, Axis};

/// Z-scores every column over the rows of `data`.
///
/// Uses the population standard deviation. Columns with (numerically) zero
/// variance are only centered.
pub fn standardize(data: &Array2<f64>) -> Array2<f64> {
    let n = data.nrows().max(1) as f64;
    let mean = data.sum_axis(Axis(0)) / n;
    let centered = data - &mean;
    let variance = centered.mapv(|v| v * v).sum_axis(Axis(0)) / n;

    let scale: Array1<f64> = variance
        .iter()
        .zip(mean.iter())
        .map(|(&var, &mu)| {
            let std = var.sqrt();
            if std <= 10.0 * f64::EPSILON * mu.abs().max(1.0) {
                1.0
            } else {
                std
            }
        })
        .collect();

    centered / &scale
}

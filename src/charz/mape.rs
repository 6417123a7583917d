use crate::config::ArrayConfig;
use super::{CharzError, InputVector, Stimulus, WeightMatrix};

/// Guards the percentage against a zero ideal product
pub const EPSILON: f64 = 1e-18;

/// Compares the analog readout against the ideal digital dot product
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorEvaluator {
    pub vi_min: f64,
    pub vi_max: f64,
    pub volt_vdd: f64,
    pub irbl_unit: f64,
}

impl From<&ArrayConfig> for ErrorEvaluator {
    fn from(config: &ArrayConfig) -> Self {
        Self {
            vi_min: config.vi_min,
            vi_max: config.vi_max,
            volt_vdd: config.volt_vdd,
            irbl_unit: config.irbl_unit,
        }
    }
}

impl ErrorEvaluator {
    /// Map inputs from `[vi_min, vi_max]` onto `[0, 1]`
    pub fn normalize_inputs(&self, inputs: &InputVector) -> Vec<f64> {
        inputs.iter().map(|&v| (v - self.vi_min) / (self.vi_max - self.vi_min)).collect()
    }

    /// Map weights from `[0, volt_vdd]` onto `[0, 1]`
    pub fn normalize_weights(&self, weights: &WeightMatrix) -> WeightMatrix {
        weights.map(|v| v / self.volt_vdd)
    }

    /// Readout currents in units of `irbl_unit`
    pub fn normalize_readout(&self, readout: &[f64]) -> Vec<f64> {
        readout.iter().map(|&i| i / self.irbl_unit).collect()
    }

    /// Mape of one trial
    pub fn evaluate(&self, stimulus: &Stimulus, readout: &[f64]) -> Result<f64, CharzError> {
        let inputs = self.normalize_inputs(&stimulus.inputs);
        let weights = self.normalize_weights(&stimulus.weights);
        let ideal = ideal_dot_product(&weights, &inputs)?;
        let measured = self.normalize_readout(readout);
        mape(&measured, &ideal)
    }
}

/// `ideal[row] = Σ_col weight[row, col] * input[col]`
pub fn ideal_dot_product(weights: &WeightMatrix, inputs: &[f64]) -> Result<Vec<f64>, CharzError> {
    if weights.num_col() != inputs.len() {
        return Err(CharzError::InputSizeUnmatch(weights.num_col(), inputs.len()));
    }
    Ok((0..weights.num_row())
        .map(|r| weights.row(r).iter().zip(inputs).map(|(w, x)| w * x).sum::<f64>())
        .collect())
}

/// `mean(|measured - ideal| / (ideal + EPSILON))`
pub fn mape(measured: &[f64], ideal: &[f64]) -> Result<f64, CharzError> {
    if measured.len() != ideal.len() {
        return Err(CharzError::ReadoutSizeUnmatch(measured.len(), ideal.len()));
    }
    if ideal.is_empty() {
        return Err(CharzError::ReadoutSizeUnmatch(0, 0));
    }

    let total: f64 = measured
        .iter()
        .zip(ideal)
        .map(|(m, i)| (m - i).abs() / (i + EPSILON))
        .sum();
    Ok(total / ideal.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn evaluator() -> ErrorEvaluator {
        ErrorEvaluator { vi_min: 0.0, vi_max: 0.15, volt_vdd: 0.65, irbl_unit: 12.6757e-6 }
    }

    #[test]
    fn test_identity_dot_product() {
        let weights = WeightMatrix::from_rows(vec![vec![0.65, 0.0], vec![0.0, 0.65]]);
        let inputs = InputVector::new(vec![0.075, 0.15]);

        let eval = evaluator();
        let x = eval.normalize_inputs(&inputs);
        let w = eval.normalize_weights(&weights);
        assert_abs_diff_eq!(x[0], 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(x[1], 1.0, epsilon = 1e-12);

        let ideal = ideal_dot_product(&w, &x).unwrap();
        assert_abs_diff_eq!(ideal[0], 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(ideal[1], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_row_major_product() {
        let weights = WeightMatrix::from_rows(vec![vec![1.0, 1.0], vec![0.0, 1.0]]);
        let ideal = ideal_dot_product(&weights, &[0.25, 0.5]).unwrap();
        assert_abs_diff_eq!(ideal[0], 0.75, epsilon = 1e-12);
        assert_abs_diff_eq!(ideal[1], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_mape() {
        let value = mape(&[1.1, 2.0], &[1.0, 2.0]).unwrap();
        assert_abs_diff_eq!(value, 0.05, epsilon = 1e-12);
    }

    #[test]
    fn test_mape_zero_ideal_is_finite() {
        let value = mape(&[0.0], &[0.0]).unwrap();
        assert_eq!(value, 0.0);
        assert!(mape(&[1e-3], &[0.0]).unwrap().is_finite());
    }

    #[test]
    fn test_perfect_worst_case() {
        let eval = evaluator();
        let stimulus = Stimulus {
            inputs: InputVector::new(vec![0.15; 2]),
            weights: WeightMatrix::filled(2, 2, 0.65),
        };
        let readout = [2.0 * 12.6757e-6, 2.0 * 12.6757e-6];
        assert_abs_diff_eq!(eval.evaluate(&stimulus, &readout).unwrap(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_size_mismatch() {
        assert!(matches!(mape(&[1.0], &[1.0, 2.0]), Err(CharzError::ReadoutSizeUnmatch(1, 2))));
        let weights = WeightMatrix::filled(2, 2, 1.0);
        assert!(matches!(ideal_dot_product(&weights, &[1.0]), Err(CharzError::InputSizeUnmatch(2, 1))));
    }
}

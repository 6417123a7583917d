use rand::Rng;
use tracing::debug;
use crate::config::{ArrayConfig, Distribution};

/// Input voltage per column
#[derive(Debug, Clone, PartialEq)]
pub struct InputVector(Vec<f64>);

/// Weight voltage per cell, row-major
#[derive(Debug, Clone, PartialEq)]
pub struct WeightMatrix {
    num_row: usize,
    num_col: usize,
    data: Vec<f64>,
}

/// Voltages applied to the array in one Monte-Carlo trial
#[derive(Debug, Clone, PartialEq)]
pub struct Stimulus {
    pub inputs: InputVector,
    pub weights: WeightMatrix,
}

impl InputVector {
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

impl WeightMatrix {
    pub fn filled(num_row: usize, num_col: usize, value: f64) -> Self {
        Self { num_row, num_col, data: vec![value; num_row * num_col] }
    }

    /// Panics if the rows have different lengths
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Self {
        let num_row = rows.len();
        let num_col = rows.first().map(Vec::len).unwrap_or(0);
        assert!(rows.iter().all(|r| r.len() == num_col), "ragged weight rows");
        Self { num_row, num_col, data: rows.into_iter().flatten().collect() }
    }

    pub fn num_row(&self) -> usize {
        self.num_row
    }

    pub fn num_col(&self) -> usize {
        self.num_col
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.num_col + col]
    }

    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row * self.num_col..(row + 1) * self.num_col]
    }

    pub fn values(&self) -> &[f64] {
        &self.data
    }

    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self { num_row: self.num_row, num_col: self.num_col, data: self.data.iter().map(|&v| f(v)).collect() }
    }
}

impl Distribution {
    /// `worst` pins every input at `vi_max`, `uniform` draws each one in `[vi_min, vi_max]`
    pub fn draw_inputs(&self, size: usize, vi_min: f64, vi_max: f64, rng: &mut impl Rng) -> InputVector {
        let values = match self {
            Self::Worst => vec![vi_max; size],
            Self::Uniform => (0..size).map(|_| rng.random_range(vi_min..=vi_max)).collect(),
        };
        InputVector(values)
    }

    /// `worst` stores VDD in every cell, `uniform` flips a fair coin between 0 and VDD
    pub fn draw_weights(&self, num_row: usize, num_col: usize, volt_vdd: f64, rng: &mut impl Rng) -> WeightMatrix {
        match self {
            Self::Worst => WeightMatrix::filled(num_row, num_col, volt_vdd),
            Self::Uniform => WeightMatrix {
                num_row,
                num_col,
                data: (0..num_row * num_col)
                    .map(|_| if rng.random_bool(0.5) { volt_vdd } else { 0.0 })
                    .collect(),
            },
        }
    }
}

impl Stimulus {
    pub fn generate(config: &ArrayConfig, rng: &mut impl Rng) -> Self {
        debug!("draw inputs with {} and weights with {} distribution", config.vi_dist, config.vw_dist);
        let inputs = config.vi_dist.draw_inputs(config.num_col, config.vi_min, config.vi_max, rng);
        let weights = config.vw_dist.draw_weights(config.num_row, config.num_col, config.volt_vdd, rng);
        Self { inputs, weights }
    }
}

mod error;
mod mape;
mod stimulus;

pub use error::*;
pub use mape::*;
pub use stimulus::*;

use std::fmt::Display;
use std::path::Path;
use itertools::Itertools;
use rand::{rngs::StdRng, SeedableRng};
use tracing::{debug, info};
use crate::config::ArrayConfig;
use crate::netlist::{AnalysisMode, NetlistBuilder};
use crate::report::{read_report, ReportRow};
use crate::simulate::{CircuitSimulator, ExecuteCommand};
use crate::{ErrorContext, PimResult};

/// Mape of every Monte-Carlo trial
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorReport {
    pub trials: Vec<f64>,
}

impl ErrorReport {
    pub fn push(&mut self, mape: f64) {
        self.trials.push(mape);
    }

    pub fn mean(&self) -> Result<f64, CharzError> {
        if self.trials.is_empty() {
            return Err(CharzError::NoTrial);
        }
        Ok(self.trials.iter().sum::<f64>() / self.trials.len() as f64)
    }

    pub fn write<P: AsRef<Path>>(&self, path: P) -> PimResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_string())
            .with_context(|| format!("write error report '{}'", path.display()))?;
        info!("write error report to {:?}", path);
        Ok(())
    }
}

impl Display for ErrorReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, mape) in self.trials.iter().enumerate() {
            writeln!(f, "Trial {} mape val = {}", i, mape)?;
        }
        match self.mean() {
            Ok(mean) => writeln!(f, "Average mape val = {}", mean),
            Err(_) => Ok(()),
        }
    }
}

/// Readout of the `Vin_0` calibration sweep, one row per swept voltage
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalibrationTable {
    pub num_col: usize,
    pub rows: Vec<ReportRow>,
}

impl Display for CalibrationTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let header = (0..self.num_col).map(|c| format!("I(Rf_{c})")).join(" ");
        writeln!(f, "Vin_0 {}", header)?;
        for row in self.rows.iter() {
            writeln!(f, "{} {}", row.label, row.values.iter().join(" "))?;
        }
        Ok(())
    }
}

/// Drives netlist generation, simulation and evaluation trial by trial
pub struct MonteCarlo<E> {
    pub config: ArrayConfig,
    pub simulator: CircuitSimulator<E>,
    rng: StdRng,
}

impl<E: ExecuteCommand> MonteCarlo<E> {
    pub fn new(config: ArrayConfig, command: E) -> PimResult<Self> {
        let simulator = CircuitSimulator::create(&config.run_dir, command)?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Ok(Self { config, simulator, rng })
    }

    /// Run `mc_iter` trials
    pub fn run(&mut self) -> PimResult<ErrorReport> {
        let mut report = ErrorReport::default();
        for index in 0..self.config.mc_iter {
            let mape = self.trial().with_context(|| format!("monte-carlo trial {}", index))?;
            info!("trial {}/{} mape val = {}", index + 1, self.config.mc_iter, mape);
            report.push(mape);
        }

        info!("average mape val = {}", report.mean()?);
        if let Some(path) = self.config.report_file() {
            report.write(path)?;
        }
        Ok(report)
    }

    /// Draw voltages, simulate once and return the mape
    pub fn trial(&mut self) -> PimResult<f64> {
        let stimulus = Stimulus::generate(&self.config, &mut self.rng);
        let netlist = NetlistBuilder::new(&self.config)
            .build(&stimulus.inputs, &stimulus.weights, AnalysisMode::OperatingPoint)?;

        let report_path = self.simulator.simulate(&netlist)?;
        let readout = read_report(&report_path)?.readout(self.config.num_col)?;
        debug!("readout currents {:?}", readout);

        let mape = ErrorEvaluator::from(&self.config).evaluate(&stimulus, &readout)?;
        Ok(mape)
    }

    /// Sweep the first input across its range and collect the readout table
    pub fn calibrate(&mut self) -> PimResult<CalibrationTable> {
        info!("calibration sweep of Vin_0 in [{}, {}]", self.config.vi_min, self.config.vi_max);
        let stimulus = Stimulus::generate(&self.config, &mut self.rng);
        let netlist = NetlistBuilder::new(&self.config)
            .build(&stimulus.inputs, &stimulus.weights, AnalysisMode::Calibration)?;

        let report_path = self.simulator.simulate(&netlist)?;
        let report = read_report(&report_path)?;
        let points = report.check_shape(self.config.num_col)?;
        debug!("calibration sweep returned {} points", points);

        Ok(CalibrationTable {
            num_col: self.config.num_col,
            rows: report.rows().cloned().collect(),
        })
    }
}

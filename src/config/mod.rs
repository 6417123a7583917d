mod error;
pub use error::*;

use std::{fmt::Display, path::{Path, PathBuf}, str::FromStr};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};
use crate::{ErrorContext, PimResult};

pub const DEFAULT_TECH_FILE: &str = "tech/45nm_HP.pm";
pub const DEFAULT_SIMULATOR: &str = "hspice";

/// Computing style of the 8T cell read port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CellType {
    /// Word line tied to VDD, input on the source line
    A,
    /// Input on the word line, source line tied to Vbias
    B,
}

/// How input and weight voltages are drawn for a trial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Distribution {
    Worst,
    Uniform,
}

impl FromStr for CellType {
    type Err = ConfigError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => Ok(Self::A),
            "B" => Ok(Self::B),
            _ => Err(ConfigError::UnsupportedCellType(s.to_string())),
        }
    }
}

impl FromStr for Distribution {
    type Err = ConfigError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "worst" => Ok(Self::Worst),
            "uniform" => Ok(Self::Uniform),
            _ => Err(ConfigError::UnsupportedDistribution(s.to_string())),
        }
    }
}

impl Display for CellType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::A => write!(f, "A"),
            Self::B => write!(f, "B"),
        }
    }
}

impl Display for Distribution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Worst => write!(f, "worst"),
            Self::Uniform => write!(f, "uniform"),
        }
    }
}

impl TryFrom<String> for CellType {
    type Error = ConfigError;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl TryFrom<String> for Distribution {
    type Error = ConfigError;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CellType> for String {
    fn from(value: CellType) -> Self {
        value.to_string()
    }
}

impl From<Distribution> for String {
    fn from(value: Distribution) -> Self {
        value.to_string()
    }
}

/// Command line surface of one characterization run.
///
/// Every key may be overridden by the JSON object named by `extra_args`.
#[derive(Debug, Clone, clap::Args, Serialize, Deserialize)]
#[command(rename_all = "snake_case")]
#[serde(deny_unknown_fields)]
pub struct ArrayArgs {
    /// Run directory for netlist and simulator report
    #[arg(long, default_value = "./run")]
    pub run_dir: PathBuf,

    /// Monte-Carlo iteration count
    #[arg(long, default_value_t = 1)]
    pub mc_iter: usize,

    /// Sweep the first input voltage instead of evaluating mape
    #[arg(long)]
    #[serde(default)]
    pub debug: bool,

    /// Readout current of one unit product
    #[arg(long, default_value_t = 12.6757e-6)]
    pub irbl_unit: f64,

    /// Technology file (random parameters such as vth live here)
    #[arg(long, default_value = DEFAULT_TECH_FILE)]
    pub tech_file: PathBuf,

    /// Cell type, `A` or `B`
    #[arg(long, default_value = "A")]
    pub cell_type: String,

    #[arg(long, default_value_t = 1)]
    pub num_row: usize,

    #[arg(long, default_value_t = 1)]
    pub num_col: usize,

    /// Resistance on SL between cells
    #[arg(long, default_value_t = 0.0)]
    pub res_sl: f64,

    /// Resistance on BL between cells
    #[arg(long, default_value_t = 0.0)]
    pub res_bl: f64,

    /// Readout resistance
    #[arg(long, default_value_t = 50.0)]
    pub res_f: f64,

    #[arg(long, default_value_t = 0.65)]
    pub volt_vdd: f64,

    #[arg(long, default_value_t = 0.65)]
    pub volt_bias: f64,

    /// Lower end of the input voltage range (deemed as linear region)
    #[arg(long, default_value_t = 0.0)]
    pub vi_min: f64,

    /// Upper end of the input voltage range
    #[arg(long, default_value_t = 0.65)]
    pub vi_max: f64,

    /// Input voltage distribution, `worst` or `uniform`
    #[arg(long, default_value = "worst")]
    pub vi_dist: String,

    /// Weight voltage distribution, `worst` or `uniform`
    #[arg(long, default_value = "worst")]
    pub vw_dist: String,

    /// Simulator command
    #[arg(long, default_value = DEFAULT_SIMULATOR)]
    pub simulator: String,

    /// Seed for the stimulus generator
    #[arg(long)]
    #[serde(default)]
    pub seed: Option<u64>,

    /// Write the error report to this file
    #[arg(long)]
    #[serde(default)]
    pub report: Option<PathBuf>,

    /// Json file whose keys override any of the above
    #[arg(long)]
    #[serde(default)]
    pub extra_args: Option<PathBuf>,
}

impl ArrayArgs {
    /// Apply `extra_args` on top of the command line values
    pub fn overlay(self) -> PimResult<Self> {
        let Some(path) = self.extra_args.clone() else {
            return Ok(self);
        };

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("read extra args '{}'", path.display()))?;
        let overrides: Value = serde_json::from_str(&content)
            .with_context(|| format!("parse extra args '{}'", path.display()))?;
        let Value::Object(overrides) = overrides else {
            return Err(ConfigError::ExtraArgsNotObject(path))?;
        };

        let mut merged = serde_json::to_value(&self)?;
        if let Value::Object(fields) = &mut merged {
            for (key, value) in overrides {
                debug!("override '{}' = {}", key, value);
                fields.insert(key, value);
            }
        }

        let args: Self = serde_json::from_value(merged)
            .with_context(|| format!("apply extra args '{}'", path.display()))?;
        Ok(args)
    }
}

/// Immutable configuration of one PIM array characterization
#[derive(Debug, Clone, Serialize)]
pub struct ArrayConfig {
    pub run_dir: PathBuf,
    pub mc_iter: usize,
    pub debug: bool,
    pub irbl_unit: f64,
    pub tech_file: PathBuf,
    pub cell_type: CellType,
    pub num_row: usize,
    pub num_col: usize,
    pub res_sl: f64,
    pub res_bl: f64,
    pub res_f: f64,
    pub volt_vdd: f64,
    pub volt_bias: f64,
    pub vi_min: f64,
    pub vi_max: f64,
    pub vi_dist: Distribution,
    pub vw_dist: Distribution,
    pub simulator: String,
    pub seed: Option<u64>,
    pub report: Option<PathBuf>,
}

impl TryFrom<ArrayArgs> for ArrayConfig {
    type Error = ConfigError;

    fn try_from(args: ArrayArgs) -> Result<Self, Self::Error> {
        let config = Self {
            cell_type: args.cell_type.parse()?,
            vi_dist: args.vi_dist.parse()?,
            vw_dist: args.vw_dist.parse()?,
            run_dir: args.run_dir,
            mc_iter: args.mc_iter,
            debug: args.debug,
            irbl_unit: args.irbl_unit,
            tech_file: args.tech_file,
            num_row: args.num_row,
            num_col: args.num_col,
            res_sl: args.res_sl,
            res_bl: args.res_bl,
            res_f: args.res_f,
            volt_vdd: args.volt_vdd,
            volt_bias: args.volt_bias,
            vi_min: args.vi_min,
            vi_max: args.vi_max,
            simulator: args.simulator,
            seed: args.seed,
            report: args.report,
        };
        config.validate()?;
        Ok(config)
    }
}

impl ArrayConfig {
    /// Overlay `extra_args` and build the typed config
    pub fn load(args: ArrayArgs) -> PimResult<Self> {
        let config: Self = args.overlay()?.try_into()?;
        info!(
            "array {}x{} cell type {}, input {} in [{}, {}], weight {}",
            config.num_row, config.num_col, config.cell_type,
            config.vi_dist, config.vi_min, config.vi_max, config.vw_dist,
        );
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.num_row == 0 || self.num_col == 0 {
            return Err(ConfigError::invalid("array must have at least one row and one column"));
        }
        // Inputs are drawn per column but drive per-row source lines
        if self.num_row != self.num_col {
            return Err(ConfigError::invalid(format!(
                "array must be square, got {} rows and {} columns", self.num_row, self.num_col
            )));
        }
        if !(self.vi_max > self.vi_min) {
            return Err(ConfigError::invalid(format!(
                "vi_max '{}' must be greater than vi_min '{}'", self.vi_max, self.vi_min
            )));
        }
        if !(self.volt_vdd > 0.0) {
            return Err(ConfigError::invalid(format!("volt_vdd '{}' must be positive", self.volt_vdd)));
        }
        if !(self.irbl_unit > 0.0) {
            return Err(ConfigError::invalid(format!("irbl_unit '{}' must be positive", self.irbl_unit)));
        }
        if self.mc_iter == 0 {
            return Err(ConfigError::invalid("mc_iter must be at least 1"));
        }
        Ok(())
    }

    pub fn netlist_path(&self) -> PathBuf {
        self.run_dir.join("pim.sp")
    }

    pub fn report_path(&self) -> PathBuf {
        self.run_dir.join("pim.lis")
    }

    pub fn report_file(&self) -> Option<&Path> {
        self.report.as_deref()
    }
}

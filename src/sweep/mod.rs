use std::path::{Path, PathBuf};
use derive_builder::Builder;
use itertools::iproduct;
use serde::Serialize;
use tracing::{debug, info};
use crate::config::{CellType, Distribution};
use crate::{ErrorContext, PimResult};

pub const SZ_LIST: [usize; 4] = [4, 8, 16, 32];
pub const CT_LIST: [CellType; 2] = [CellType::A, CellType::B];
pub const DIST_LIST: [Distribution; 1] = [Distribution::Worst];

#[derive(Debug, thiserror::Error)]
pub enum SweepError {
    #[error("unknown sweep variant '{0}'")]
    UnknownVariant(String),

    #[error(transparent)]
    Build(#[from] SweepBuilderError),
}

/// Flavours of a sweep point, used as the config name suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// Ideal wires
    Base,
    /// Parasitic resistance on SL and BL
    Res,
    /// `Res` with a Monte-Carlo technology file
    Pvt,
}

impl Variant {
    pub const RES_SL: f64 = 1.25;
    pub const RES_BL: f64 = 2.5;

    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::Res => "res",
            Self::Pvt => "pvt",
        }
    }
}

impl std::str::FromStr for Variant {
    type Err = SweepError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "base" => Ok(Self::Base),
            "res" => Ok(Self::Res),
            "pvt" => Ok(Self::Pvt),
            _ => Err(SweepError::UnknownVariant(s.to_string())),
        }
    }
}

/// Input range and calibration constant of a cell type
pub fn cell_type_params(cell_type: CellType) -> (f64, f64, f64) {
    match cell_type {
        CellType::A => (0.0, 0.15, 12.6757e-6),
        CellType::B => (0.45, 0.65, 18.7875e-6),
    }
}

/// One generated configuration, serialized flat as the `extra_args` json
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepConfig {
    #[serde(skip)]
    pub name: String,

    pub run_dir: PathBuf,
    pub extra_args: PathBuf,
    pub report: PathBuf,
    pub cell_type: CellType,
    pub num_row: usize,
    pub num_col: usize,
    pub vi_min: f64,
    pub vi_max: f64,
    pub vi_dist: Distribution,
    pub vw_dist: Distribution,
    pub irbl_unit: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub res_sl: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub res_bl: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tech_file: Option<PathBuf>,
}

/// Cross product of array size, cell type and distribution for each variant
#[derive(Debug, Clone, Builder)]
#[builder(pattern = "owned", setter(into))]
pub struct Sweep {
    #[builder(default = "PathBuf::from(\"config\")")]
    pub config_dir: PathBuf,

    #[builder(default = "PathBuf::from(\"run\")")]
    pub run_root: PathBuf,

    #[builder(default = "PathBuf::from(\"report\")")]
    pub report_root: PathBuf,

    #[builder(default = "SZ_LIST.to_vec()")]
    pub sizes: Vec<usize>,

    #[builder(default = "CT_LIST.to_vec()")]
    pub cell_types: Vec<CellType>,

    #[builder(default = "DIST_LIST.to_vec()")]
    pub dists: Vec<Distribution>,

    #[builder(default = "vec![Variant::Base, Variant::Res, Variant::Pvt]")]
    pub variants: Vec<Variant>,

    #[builder(default = "PathBuf::from(\"tech/45nm_HP_mc.pm\")")]
    pub mc_tech_file: PathBuf,
}

impl Sweep {
    pub fn configs(&self) -> Vec<SweepConfig> {
        let mut configs = vec![];
        for &variant in self.variants.iter() {
            for (&sz, &ct, &dist) in iproduct!(self.sizes.iter(), self.cell_types.iter(), self.dists.iter()) {
                configs.push(self.config(variant, sz, ct, dist));
            }
        }
        configs
    }

    fn config(&self, variant: Variant, sz: usize, ct: CellType, dist: Distribution) -> SweepConfig {
        let (vi_min, vi_max, irbl_unit) = cell_type_params(ct);
        let name = format!("sz_{sz}-ct_{ct}-dist_{dist}-{}", variant.suffix());
        let (res_sl, res_bl) = match variant {
            Variant::Base => (None, None),
            Variant::Res | Variant::Pvt => (Some(Variant::RES_SL), Some(Variant::RES_BL)),
        };
        let tech_file = match variant {
            Variant::Pvt => Some(self.mc_tech_file.clone()),
            _ => None,
        };

        SweepConfig {
            run_dir: self.run_root.join(&name),
            extra_args: self.config_dir.join(format!("{name}.json")),
            report: self.report_root.join(format!("{name}.rpt")),
            cell_type: ct,
            num_row: sz,
            num_col: sz,
            vi_min,
            vi_max,
            vi_dist: dist,
            vw_dist: dist,
            irbl_unit,
            res_sl,
            res_bl,
            tech_file,
            name,
        }
    }

    /// Write every config as `<config_dir>/<name>.json`
    pub fn generate(&self) -> PimResult<Vec<SweepConfig>> {
        let configs = self.configs();
        create_dir(&self.config_dir)?;

        for config in configs.iter() {
            debug!("write config {}", config.name);
            let content = serde_json::to_string_pretty(config)?;
            std::fs::write(&config.extra_args, content)
                .with_context(|| format!("write config '{}'", config.extra_args.display()))?;
        }

        info!("generated {} configs in {:?}", configs.len(), self.config_dir);
        Ok(configs)
    }
}

/// Command line surface of `sweep`, names are parsed before anything is written
#[derive(Debug, Clone, clap::Args)]
#[command(rename_all = "snake_case")]
pub struct SweepArgs {
    #[arg(long, default_value = "config")]
    pub config_dir: PathBuf,

    #[arg(long, default_value = "run")]
    pub run_root: PathBuf,

    #[arg(long, default_value = "report")]
    pub report_root: PathBuf,

    #[arg(long, value_delimiter = ',', default_values_t = SZ_LIST)]
    pub sizes: Vec<usize>,

    #[arg(long, value_delimiter = ',', default_values = ["A", "B"])]
    pub cell_types: Vec<CellType>,

    #[arg(long, value_delimiter = ',', default_values = ["worst"])]
    pub dists: Vec<Distribution>,

    #[arg(long, value_delimiter = ',', default_values = ["base", "res", "pvt"])]
    pub variants: Vec<Variant>,

    #[arg(long, default_value = "tech/45nm_HP_mc.pm")]
    pub mc_tech_file: PathBuf,
}

impl TryFrom<SweepArgs> for Sweep {
    type Error = SweepError;

    fn try_from(args: SweepArgs) -> Result<Self, Self::Error> {
        let sweep = SweepBuilder::default()
            .config_dir(args.config_dir)
            .run_root(args.run_root)
            .report_root(args.report_root)
            .sizes(args.sizes)
            .cell_types(args.cell_types)
            .dists(args.dists)
            .variants(args.variants)
            .mc_tech_file(args.mc_tech_file)
            .build()?;
        Ok(sweep)
    }
}

fn create_dir(path: &Path) -> PimResult<()> {
    if !path.exists() {
        std::fs::create_dir_all(path).with_context(|| format!("create directory '{}'", path.display()))?;
    }
    Ok(())
}

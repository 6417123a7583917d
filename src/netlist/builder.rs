use itertools::iproduct;
use tracing::debug;
use crate::charz::{InputVector, WeightMatrix};
use crate::config::{ArrayConfig, CellType};
use super::{Netlist, NetlistError, ParamValue, SectionKind, Statement};

/// Which `.DC` directive closes the netlist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisMode {
    /// Single fixed-supply point, one readout per column
    OperatingPoint,
    /// Sweep `Vin_0` across the input range
    Calibration,
}

/// Render the 8T SRAM PIM array around one set of input and weight voltages.
///
/// Node names follow `<NET>_<row>_<col>`: `SL` runs along a row, `BL` down a
/// column, `Q` is the storage node and `N` the read-stack midpoint.
pub struct NetlistBuilder<'a> {
    config: &'a ArrayConfig,
}

impl<'a> NetlistBuilder<'a> {
    pub const NMOS_MODEL: &'static str = "NMOS";
    pub const MOS_LENGTH: &'static str = "45nm";
    pub const MOS_WIDTH: &'static str = "90nm";
    pub const VDD_PARAM: &'static str = "VDD";
    pub const VBIAS_PARAM: &'static str = "Vbias";
    pub const OPERATING_POINT_STEP: f64 = 0.01;
    pub const CALIBRATION_STEP: f64 = 0.01;

    pub fn new(config: &'a ArrayConfig) -> Self {
        Self { config }
    }

    pub fn build(&self, inputs: &InputVector, weights: &WeightMatrix, mode: AnalysisMode) -> Result<Netlist, NetlistError> {
        self.check_stimulus(inputs, weights)?;
        debug!("build {}x{} netlist in {:?} mode", self.config.num_row, self.config.num_col, mode);

        let mut netlist = Netlist::new();
        self.write_header(&mut netlist);
        self.write_stimulus(&mut netlist, inputs, weights);
        self.write_array(&mut netlist);
        self.write_readout(&mut netlist);
        self.write_analysis(&mut netlist, mode);
        Ok(netlist)
    }

    fn check_stimulus(&self, inputs: &InputVector, weights: &WeightMatrix) -> Result<(), NetlistError> {
        let (rows, cols) = (self.config.num_row, self.config.num_col);
        if inputs.len() != cols {
            return Err(NetlistError::InputSizeUnmatch(cols, inputs.len()));
        }
        if weights.num_row() != rows || weights.num_col() != cols {
            return Err(NetlistError::WeightSizeUnmatch(rows, cols, weights.num_row(), weights.num_col()));
        }
        Ok(())
    }

    fn write_header(&self, netlist: &mut Netlist) {
        netlist.begin(SectionKind::Header);
        netlist.push(Statement::Comment("SRAM PIM array - static I-V simulation for read port".into()));
        netlist.push(Statement::Options("list node post".into()));
        netlist.push(Statement::ProtectedInclude(self.config.tech_file.clone()));
        netlist.push(Statement::Options("post=2 list".into()));
    }

    fn write_stimulus(&self, netlist: &mut Netlist, inputs: &InputVector, weights: &WeightMatrix) {
        netlist.begin(SectionKind::Stimulus);
        netlist.push(param(Self::VDD_PARAM, ParamValue::Literal(self.config.volt_vdd)));
        netlist.push(param(Self::VBIAS_PARAM, ParamValue::Literal(self.config.volt_bias)));

        for (c, &vin) in inputs.iter().enumerate() {
            netlist.push(param(input_param(c), ParamValue::Literal(vin)));
        }
        for (r, c) in iproduct!(0..self.config.num_row, 0..self.config.num_col) {
            netlist.push(param(weight_param(r, c), ParamValue::Literal(weights.get(r, c))));
        }

        for r in 0..self.config.num_row {
            let (wl, sl) = match self.config.cell_type {
                CellType::A => (Self::VDD_PARAM.to_string(), input_param(r)),
                CellType::B => (input_param(r), Self::VBIAS_PARAM.to_string()),
            };
            netlist.push(Statement::DcVoltage { name: format!("VWL_{r}"), net: format!("WL_{r}"), value: ParamValue::Param(wl) });
            netlist.push(Statement::DcVoltage { name: format!("VSL_{r}"), net: net("SL", r, 0), value: ParamValue::Param(sl) });
        }
        for (r, c) in iproduct!(0..self.config.num_row, 0..self.config.num_col) {
            netlist.push(Statement::DcVoltage {
                name: format!("VQ_{r}_{c}"),
                net: net("Q", r, c),
                value: ParamValue::Param(weight_param(r, c)),
            });
        }
    }

    fn write_array(&self, netlist: &mut Netlist) {
        netlist.begin(SectionKind::Array);
        for (r, c) in iproduct!(0..self.config.num_row, 0..self.config.num_col) {
            netlist.push(Statement::Comment(format!("SRAM cell {r}x{c}")));
            netlist.push(self.nmos(format!("M1_{r}_{c}"), net("SL", r, c), net("Q", r, c), net("N", r, c)));
            netlist.push(self.nmos(format!("M2_{r}_{c}"), net("N", r, c), format!("WL_{r}"), net("BL", r, c)));
            netlist.push(Statement::Resistor {
                name: format!("RBL_{r}_{c}"),
                n1: net("BL", r, c),
                n2: net("BL", r + 1, c),
                value: self.config.res_bl,
            });
            netlist.push(Statement::Resistor {
                name: format!("RSL_{r}_{c}"),
                n1: net("SL", r, c),
                n2: net("SL", r, c + 1),
                value: self.config.res_sl,
            });
        }
    }

    fn write_readout(&self, netlist: &mut Netlist) {
        netlist.begin(SectionKind::Readout);
        for c in 0..self.config.num_col {
            netlist.push(Statement::Comment(format!("Readout BL {c}")));
            netlist.push(Statement::Resistor {
                name: readout_resistor(c),
                n1: net("BL", self.config.num_row, c),
                n2: "0".into(),
                value: self.config.res_f,
            });
        }
    }

    fn write_analysis(&self, netlist: &mut Netlist, mode: AnalysisMode) {
        netlist.begin(SectionKind::Analysis);
        netlist.push(Statement::Comment("Simulation".into()));
        let dc = match mode {
            AnalysisMode::Calibration => Statement::Dc {
                source: input_param(0),
                start: self.config.vi_min,
                stop: self.config.vi_max,
                step: Self::CALIBRATION_STEP,
            },
            AnalysisMode::OperatingPoint => Statement::Dc {
                source: Self::VDD_PARAM.into(),
                start: self.config.volt_vdd,
                stop: self.config.volt_vdd,
                step: Self::OPERATING_POINT_STEP,
            },
        };
        netlist.push(dc);

        let readout: Vec<_> = (0..self.config.num_col)
            .map(|c| format!("I({})", readout_resistor(c)))
            .collect();
        netlist.push(Statement::Print(readout.clone()));
        netlist.push(Statement::Probe(readout));
        netlist.push(Statement::End);
    }

    fn nmos(&self, name: String, drain: String, gate: String, source: String) -> Statement {
        Statement::Mosfet {
            name,
            drain,
            gate,
            source,
            bulk: "0".into(),
            model: Self::NMOS_MODEL.into(),
            length: Self::MOS_LENGTH.into(),
            width: Self::MOS_WIDTH.into(),
        }
    }
}

#[inline]
fn param(name: impl Into<String>, value: ParamValue) -> Statement {
    Statement::Param { name: name.into(), value }
}

#[inline]
fn net(prefix: &str, row: usize, col: usize) -> String {
    format!("{prefix}_{row}_{col}")
}

#[inline]
fn input_param(index: usize) -> String {
    format!("Vin_{index}")
}

#[inline]
fn weight_param(row: usize, col: usize) -> String {
    format!("VQ_{row}_{col}")
}

#[inline]
pub fn readout_resistor(col: usize) -> String {
    format!("Rf_{col}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Distribution;

    fn config(cell_type: CellType, size: usize) -> ArrayConfig {
        ArrayConfig {
            run_dir: "./run".into(),
            mc_iter: 1,
            debug: false,
            irbl_unit: 12.6757e-6,
            tech_file: "tech/45nm_HP.pm".into(),
            cell_type,
            num_row: size,
            num_col: size,
            res_sl: 1.25,
            res_bl: 2.5,
            res_f: 50.0,
            volt_vdd: 0.65,
            volt_bias: 0.65,
            vi_min: 0.0,
            vi_max: 0.15,
            vi_dist: Distribution::Worst,
            vw_dist: Distribution::Worst,
            simulator: "hspice".into(),
            seed: None,
            report: None,
        }
    }

    fn worst(config: &ArrayConfig) -> (InputVector, WeightMatrix) {
        (
            InputVector::new(vec![config.vi_max; config.num_col]),
            WeightMatrix::filled(config.num_row, config.num_col, config.volt_vdd),
        )
    }

    fn count(netlist: &Netlist, pred: impl Fn(&Statement) -> bool) -> usize {
        netlist.statements().filter(|s| pred(s)).count()
    }

    fn name_starts(statement: &Statement, prefix: &str) -> bool {
        match statement {
            Statement::Mosfet { name, .. } | Statement::Resistor { name, .. } => name.starts_with(prefix),
            _ => false,
        }
    }

    #[test]
    fn test_cell_type_a_4x4_structure() {
        let config = config(CellType::A, 4);
        let (inputs, weights) = worst(&config);
        let netlist = NetlistBuilder::new(&config).build(&inputs, &weights, AnalysisMode::OperatingPoint).unwrap();

        assert_eq!(count(&netlist, |s| name_starts(s, "M1_")), 16);
        assert_eq!(count(&netlist, |s| name_starts(s, "M2_")), 16);
        assert_eq!(count(&netlist, |s| name_starts(s, "RBL_")), 16);
        assert_eq!(count(&netlist, |s| name_starts(s, "RSL_")), 16);
        assert_eq!(count(&netlist, |s| name_starts(s, "Rf_")), 4);

        let array = netlist.section(SectionKind::Array).unwrap();
        assert_eq!(array.statements.iter().filter(|s| matches!(s, Statement::Resistor { .. })).count(), 32);
        let readout = netlist.section(SectionKind::Readout).unwrap();
        assert_eq!(readout.statements.iter().filter(|s| matches!(s, Statement::Resistor { .. })).count(), 4);
    }

    #[test]
    fn test_cell_type_a_text() {
        let config = config(CellType::A, 2);
        let (inputs, weights) = worst(&config);
        let spice = NetlistBuilder::new(&config).build(&inputs, &weights, AnalysisMode::OperatingPoint).unwrap().to_spice();

        assert!(spice.contains(".protect\n.INCLUDE 'tech/45nm_HP.pm'\n.unprotect"));
        assert!(spice.contains(".PARAM VDD=0.65"));
        assert!(spice.contains(".PARAM Vin_1=0.15"));
        assert!(spice.contains(".PARAM VQ_1_0=0.65"));
        assert!(spice.contains("VWL_1 WL_1 0 DC VDD"));
        assert!(spice.contains("VSL_1 SL_1_0 0 DC Vin_1"));
        assert!(spice.contains("VQ_0_1 Q_0_1 0 DC VQ_0_1"));
        assert!(spice.contains("M1_1_1 SL_1_1 Q_1_1 N_1_1 0 NMOS L=45nm W=90nm"));
        assert!(spice.contains("M2_1_1 N_1_1 WL_1 BL_1_1 0 NMOS L=45nm W=90nm"));
        assert!(spice.contains("RBL_1_0 BL_1_0 BL_2_0 2.5"));
        assert!(spice.contains("RSL_0_1 SL_0_1 SL_0_2 1.25"));
        assert!(spice.contains("Rf_1 BL_2_1 0 50"));
        assert!(spice.contains(".DC VDD 0.65 0.65 0.01"));
        assert!(spice.contains(".PRINT I(Rf_0) I(Rf_1)"));
        assert!(spice.contains(".PROBE I(Rf_0) I(Rf_1)"));
        assert!(spice.trim_end().ends_with(".END"));
    }

    #[test]
    fn test_cell_type_b_drives_word_line() {
        let config = config(CellType::B, 2);
        let (inputs, weights) = worst(&config);
        let spice = NetlistBuilder::new(&config).build(&inputs, &weights, AnalysisMode::OperatingPoint).unwrap().to_spice();

        assert!(spice.contains("VWL_0 WL_0 0 DC Vin_0"));
        assert!(spice.contains("VSL_0 SL_0_0 0 DC Vbias"));
        assert!(!spice.contains("DC VDD\n"));
    }

    #[test]
    fn test_calibration_sweep() {
        let config = config(CellType::A, 2);
        let (inputs, weights) = worst(&config);
        let netlist = NetlistBuilder::new(&config).build(&inputs, &weights, AnalysisMode::Calibration).unwrap();
        let analysis = netlist.section(SectionKind::Analysis).unwrap();

        assert!(analysis.statements.contains(&Statement::Dc {
            source: "Vin_0".into(), start: 0.0, stop: 0.15, step: NetlistBuilder::CALIBRATION_STEP
        }));
    }

    #[test]
    fn test_stimulus_shape_checked() {
        let config = config(CellType::A, 2);
        let inputs = InputVector::new(vec![0.1; 3]);
        let weights = WeightMatrix::filled(2, 2, 0.65);
        let result = NetlistBuilder::new(&config).build(&inputs, &weights, AnalysisMode::OperatingPoint);
        assert!(matches!(result, Err(NetlistError::InputSizeUnmatch(2, 3))));

        let inputs = InputVector::new(vec![0.1; 2]);
        let weights = WeightMatrix::filled(3, 2, 0.65);
        let result = NetlistBuilder::new(&config).build(&inputs, &weights, AnalysisMode::OperatingPoint);
        assert!(matches!(result, Err(NetlistError::WeightSizeUnmatch(2, 2, 3, 2))));
    }
}

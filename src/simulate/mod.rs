mod execute;
mod error;
pub use error::*;
pub use execute::*;

use std::path::{Path, PathBuf};
use tracing::info;
use crate::{netlist::Netlist, ErrorContext, PimResult};

/// Writes a netlist into the run directory and hands it to the simulator.
///
/// The simulator is a blocking subprocess, there is no retry and no timeout.
pub struct CircuitSimulator<E> {
    pub run_dir: PathBuf,
    pub netlist_path: PathBuf,
    pub command: E,
}

impl<E: ExecuteCommand> CircuitSimulator<E> {
    pub const NETLIST_NAME: &'static str = "pim.sp";

    pub fn create<P: AsRef<Path>>(run_dir: P, command: E) -> PimResult<Self> {
        let run_dir = run_dir.as_ref();
        if !run_dir.exists() {
            std::fs::create_dir_all(run_dir)
                .with_context(|| format!("create run directory '{}'", run_dir.display()))?;
            info!("created run directory: {:?}", run_dir);
        }

        Ok(Self {
            run_dir: run_dir.to_path_buf(),
            netlist_path: run_dir.join(Self::NETLIST_NAME),
            command,
        })
    }

    /// Write `netlist`, run the simulator and return the report path
    pub fn simulate(&self, netlist: &Netlist) -> PimResult<PathBuf> {
        netlist.write(&self.netlist_path)
            .with_context(|| format!("write netlist '{}'", self.netlist_path.display()))?;
        self.command.execute(&self.netlist_path).context("Execute simulate")
    }
}

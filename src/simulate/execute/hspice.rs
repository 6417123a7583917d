use std::path::Path;
use crate::PimResult;
use super::ExecuteCommand;

#[derive(Clone)]
pub struct HSpice;

impl ExecuteCommand for HSpice {
    fn simulate_command(&self, netlist_path: &Path, report_path: &Path) -> PimResult<String> {
        Ok(format!(
            "hspice -i {} -o {} > /dev/null 2>&1",
            netlist_path.display(),
            report_path.display(),
        ))
    }
}

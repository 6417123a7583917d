mod hspice;
pub use hspice::*;

use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;
use crate::PimResult;
use super::error::SimulateError;

pub trait ExecuteCommand {
    /// Return the simulate command to execute
    fn simulate_command(&self, netlist_path: &Path, report_path: &Path) -> PimResult<String>;

    /// Return the report filepath after simulate
    fn report_filepath(&self, netlist_path: &Path) -> PimResult<PathBuf> {
        if netlist_path.file_name().is_none() {
            return Err(SimulateError::InvalidPath(netlist_path.to_path_buf()))?;
        }
        Ok(netlist_path.with_extension("lis"))
    }

    /// Run the simulator to completion and return the report path
    fn execute(&self, netlist_path: &Path) -> PimResult<PathBuf> {
        let report_path = self.report_filepath(netlist_path)?;

        // a report left by an earlier trial must not pass for this one
        if report_path.exists() {
            std::fs::remove_file(&report_path)?;
        }

        let command = self.simulate_command(netlist_path, &report_path)?;
        debug!("execute '{}'", command);
        let status = Command::new("sh")
            .arg("-c")
            .arg(&command)
            .status()
            .map_err(|e| SimulateError::ExecuteError(command.clone(), e.to_string()))?;

        match status.code() {
            Some(0) => {}
            Some(code) => Err(SimulateError::ExecuteError(command.clone(), format!("Command returns '{}'", code)))?,
            None => Err(SimulateError::ExecuteError(command.clone(), "Command quit unnormal".into()))?,
        }

        if !report_path.is_file() {
            return Err(SimulateError::ReportNotFound(report_path))?;
        }

        Ok(report_path)
    }
}

impl ExecuteCommand for Box<dyn ExecuteCommand> {
    fn simulate_command(&self, netlist_path: &Path, report_path: &Path) -> PimResult<String> {
        self.as_ref().simulate_command(netlist_path, report_path)
    }

    fn report_filepath(&self, netlist_path: &Path) -> PimResult<PathBuf> {
        self.as_ref().report_filepath(netlist_path)
    }
}

/// Look up a simulator by the name used in configs
pub fn command_by_name(name: &str) -> PimResult<Box<dyn ExecuteCommand>> {
    match name {
        "hspice" => Ok(Box::new(HSpice)),
        _ => Err(SimulateError::UnsupportExecute(name.to_string()))?,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PimError;

    /// Runs an arbitrary shell snippet, `{report}` is replaced by the report path
    struct Script(&'static str);

    impl ExecuteCommand for Script {
        fn simulate_command(&self, _netlist_path: &Path, report_path: &Path) -> PimResult<String> {
            Ok(self.0.replace("{report}", &report_path.display().to_string()))
        }
    }

    fn netlist_in(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("pim.sp");
        std::fs::write(&path, ".END\n").unwrap();
        path
    }

    #[test]
    fn test_report_path_beside_netlist() {
        let path = HSpice.report_filepath(Path::new("run/pim.sp")).unwrap();
        assert_eq!(path, PathBuf::from("run/pim.lis"));
    }

    #[test]
    fn test_success() {
        let dir = tempfile::tempdir().unwrap();
        let netlist = netlist_in(&dir);
        let report = Script("echo x > {report}").execute(&netlist).unwrap();
        assert_eq!(report, dir.path().join("pim.lis"));
        assert!(report.is_file());
    }

    #[test]
    fn test_non_zero_exit() {
        let dir = tempfile::tempdir().unwrap();
        let netlist = netlist_in(&dir);
        let err = Script("exit 3").execute(&netlist).unwrap_err();
        assert!(matches!(err, PimError::Simulate(SimulateError::ExecuteError(_, reason)) if reason.contains('3')));
    }

    #[test]
    fn test_missing_report() {
        let dir = tempfile::tempdir().unwrap();
        let netlist = netlist_in(&dir);
        let err = Script("true").execute(&netlist).unwrap_err();
        assert!(matches!(err, PimError::Simulate(SimulateError::ReportNotFound(_))));
    }

    #[test]
    fn test_stale_report_removed() {
        let dir = tempfile::tempdir().unwrap();
        let netlist = netlist_in(&dir);
        std::fs::write(dir.path().join("pim.lis"), "old").unwrap();
        let err = Script("true").execute(&netlist).unwrap_err();
        assert!(matches!(err, PimError::Simulate(SimulateError::ReportNotFound(_))));
    }

    #[test]
    fn test_unknown_simulator() {
        assert!(command_by_name("hspice").is_ok());
        assert!(matches!(command_by_name("eldo"), Err(PimError::Simulate(SimulateError::UnsupportExecute(_)))));
    }
}

use std::path::PathBuf;
use crate::unit::UnitError;
use super::ParseState;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("no result block (a line with only 'x') found in report")]
    MissingBlock,

    #[error("report ended at line {line} while {state}")]
    TruncatedBlock { state: ParseState, line: usize },

    #[error("line {line}: {source}")]
    ParseValue { line: usize, source: UnitError },

    #[error("{values} values can't be reshaped into {columns} columns")]
    Shape { values: usize, columns: usize },

    #[error("expect {expect} readout vectors but got {got}")]
    TrialCount { expect: usize, got: usize },

    #[error("report name '{0}' is not 'key_value-...-suffix'")]
    MalformedReportName(PathBuf),
}

use std::fmt::Display;
use std::path::Path;
use tracing::{debug, warn};
use crate::unit::parse_magnitude;
use crate::{ErrorContext, PimResult};
use super::ReportError;

/// Where the parser stands inside the simulator listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    /// Looking for a line with only `x`
    Seeking,
    /// Inside a block, this many sub-header lines still to skip
    SkippingHeader(usize),
    /// Reading data rows until a line with only `y`
    ReadingRows,
    Done,
}

impl Display for ParseState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Seeking => write!(f, "seeking a result block"),
            Self::SkippingHeader(n) => write!(f, "skipping block header ({} lines left)", n),
            Self::ReadingRows => write!(f, "reading block rows"),
            Self::Done => write!(f, "done"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    /// First token of the row, the swept value
    pub label: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultBlock {
    pub rows: Vec<ReportRow>,
}

/// Every `x` ... `y` block of a report, in file order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    pub blocks: Vec<ResultBlock>,
}

/// Readout current per column in amperes
pub type ReadoutVector = Vec<f64>;

impl Report {
    pub fn rows(&self) -> impl Iterator<Item = &ReportRow> {
        self.blocks.iter().flat_map(|b| b.rows.iter())
    }

    /// All values, rows concatenated in file order
    pub fn values(&self) -> Vec<f64> {
        self.rows().flat_map(|r| r.values.iter().copied()).collect()
    }

    /// Number of `num_col` readout vectors the values split into
    pub fn check_shape(&self, num_col: usize) -> Result<usize, ReportError> {
        let values: usize = self.rows().map(|r| r.values.len()).sum();
        if num_col == 0 || values == 0 || values % num_col != 0 {
            return Err(ReportError::Shape { values, columns: num_col });
        }
        Ok(values / num_col)
    }

    /// Reshape the flat values into vectors of `num_col` readouts
    pub fn readouts(&self, num_col: usize) -> Result<Vec<ReadoutVector>, ReportError> {
        self.check_shape(num_col)?;
        Ok(self.values().chunks(num_col).map(|c| c.to_vec()).collect())
    }

    /// The readout of a single trial
    pub fn readout(&self, num_col: usize) -> Result<ReadoutVector, ReportError> {
        let mut readouts = self.readouts(num_col)?;
        if readouts.len() != 1 {
            return Err(ReportError::TrialCount { expect: 1, got: readouts.len() });
        }
        Ok(readouts.remove(0))
    }
}

/// Line driven state machine over the simulator's printed result blocks
#[derive(Debug)]
pub struct ReportParser {
    state: ParseState,
    blocks: Vec<ResultBlock>,
    current: ResultBlock,
    line: usize,
}

impl Default for ReportParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportParser {
    pub const BLOCK_BEGIN: &'static str = "x";
    pub const BLOCK_END: &'static str = "y";
    pub const HEADER_LINES: usize = 3;

    pub fn new() -> Self {
        Self {
            state: ParseState::Seeking,
            blocks: vec![],
            current: ResultBlock::default(),
            line: 0,
        }
    }

    pub fn state(&self) -> ParseState {
        self.state
    }

    pub fn feed(&mut self, line: &str) -> Result<(), ReportError> {
        self.line += 1;
        let trimmed = line.trim();

        self.state = match self.state {
            ParseState::Seeking | ParseState::Done => {
                if trimmed == Self::BLOCK_BEGIN {
                    debug!("result block begins at line {}", self.line);
                    ParseState::SkippingHeader(Self::HEADER_LINES)
                } else {
                    ParseState::Seeking
                }
            }
            ParseState::SkippingHeader(left) => {
                if left > 1 {
                    ParseState::SkippingHeader(left - 1)
                } else {
                    ParseState::ReadingRows
                }
            }
            ParseState::ReadingRows => {
                if trimmed == Self::BLOCK_END {
                    let block = std::mem::take(&mut self.current);
                    debug!("result block ends at line {} with {} rows", self.line, block.rows.len());
                    self.blocks.push(block);
                    ParseState::Seeking
                } else {
                    if !trimmed.is_empty() {
                        let row = self.parse_row(trimmed)?;
                        self.current.rows.push(row);
                    }
                    ParseState::ReadingRows
                }
            }
        };

        Ok(())
    }

    pub fn finish(mut self) -> Result<Report, ReportError> {
        match self.state {
            ParseState::SkippingHeader(_) | ParseState::ReadingRows => {
                return Err(ReportError::TruncatedBlock { state: self.state, line: self.line });
            }
            ParseState::Seeking | ParseState::Done => {}
        }

        if self.blocks.is_empty() {
            return Err(ReportError::MissingBlock);
        }
        self.state = ParseState::Done;
        Ok(Report { blocks: self.blocks })
    }

    fn parse_row(&self, line: &str) -> Result<ReportRow, ReportError> {
        let mut tokens = line.split_whitespace();
        // non-empty line always has a first token
        let label = tokens.next().unwrap_or_default().to_string();
        let values = tokens
            .map(parse_magnitude)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| ReportError::ParseValue { line: self.line, source })?;

        if values.is_empty() {
            warn!("row at line {} carries no values", self.line);
        }
        Ok(ReportRow { label, values })
    }
}

pub fn parse_report(content: &str) -> Result<Report, ReportError> {
    let mut parser = ReportParser::new();
    for line in content.lines() {
        parser.feed(line)?;
    }
    parser.finish()
}

pub fn read_report<P: AsRef<Path>>(path: P) -> PimResult<Report> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("read report file '{}'", path.display()))?;
    let report = parse_report(&content)
        .with_context(|| format!("parse report file '{}'", path.display()))?;
    Ok(report)
}

pub mod charz;
pub mod config;
pub mod netlist;
pub mod report;
pub mod simulate;
pub mod sweep;
pub mod unit;
pub mod error;
pub use error::*;

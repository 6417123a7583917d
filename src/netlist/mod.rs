mod builder;
mod error;
pub use builder::*;
pub use error::*;

use std::fmt::Display;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use itertools::Itertools;
use tracing::{debug, info};
use crate::PimResult;

/// A netlist kept as typed statements until it is written out
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Netlist {
    sections: Vec<Section>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Header,
    Stimulus,
    Array,
    Readout,
    Analysis,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub kind: SectionKind,
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Comment(String),
    Options(String),
    /// Include wrapped by `.protect`/`.unprotect`, model text stays out of the listing
    ProtectedInclude(PathBuf),
    Param { name: String, value: ParamValue },
    Mosfet {
        name: String,
        drain: String,
        gate: String,
        source: String,
        bulk: String,
        model: String,
        length: String,
        width: String,
    },
    Resistor { name: String, n1: String, n2: String, value: f64 },
    DcVoltage { name: String, net: String, value: ParamValue },
    Dc { source: String, start: f64, stop: f64, step: f64 },
    Print(Vec<String>),
    Probe(Vec<String>),
    End,
}

/// Either a literal voltage or a reference to a `.PARAM`
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Literal(f64),
    Param(String),
}

impl Netlist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section(&self, kind: SectionKind) -> Option<&Section> {
        self.sections.iter().find(|s| s.kind == kind)
    }

    /// Start a new section, later `push`es land in it
    pub fn begin(&mut self, kind: SectionKind) {
        self.sections.push(Section { kind, statements: vec![] });
    }

    pub fn push(&mut self, statement: Statement) {
        match self.sections.last_mut() {
            Some(section) => section.statements.push(statement),
            None => self.sections.push(Section { kind: SectionKind::Header, statements: vec![statement] }),
        }
    }

    pub fn statements(&self) -> impl Iterator<Item = &Statement> {
        self.sections.iter().flat_map(|s| s.statements.iter())
    }

    pub fn to_spice(&self) -> String {
        self.to_string()
    }

    pub fn write<P: AsRef<Path>>(&self, path: P) -> PimResult<()> {
        let path = path.as_ref();
        info!("write netlist to {:?}", path);
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        for section in self.sections.iter() {
            debug!("write {:?} section with {} statements", section.kind, section.statements.len());
            write!(writer, "{}", section)?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl Display for Netlist {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for section in self.sections.iter() {
            write!(f, "{}", section)?;
        }
        Ok(())
    }
}

impl Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for statement in self.statements.iter() {
            writeln!(f, "{}", statement)?;
        }
        writeln!(f)
    }
}

impl Display for ParamValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Literal(v) => write!(f, "{}", v),
            Self::Param(name) => write!(f, "{}", name),
        }
    }
}

impl Display for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Comment(comment) => write!(f, "* {}", comment),
            Self::Options(options) => write!(f, ".options {}", options),
            Self::ProtectedInclude(path) => write!(f, ".protect\n.INCLUDE '{}'\n.unprotect", path.display()),
            Self::Param { name, value } => write!(f, ".PARAM {}={}", name, value),
            Self::Mosfet { name, drain, gate, source, bulk, model, length, width } =>
                write!(f, "{} {} {} {} {} {} L={} W={}", name, drain, gate, source, bulk, model, length, width),
            Self::Resistor { name, n1, n2, value } => write!(f, "{} {} {} {}", name, n1, n2, value),
            Self::DcVoltage { name, net, value } => write!(f, "{} {} 0 DC {}", name, net, value),
            Self::Dc { source, start, stop, step } => write!(f, ".DC {} {} {} {}", source, start, stop, step),
            Self::Print(outputs) => write!(f, ".PRINT {}", outputs.iter().join(" ")),
            Self::Probe(outputs) => write!(f, ".PROBE {}", outputs.iter().join(" ")),
            Self::End => write!(f, ".END"),
        }
    }
}

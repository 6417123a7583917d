use crate::{
    charz::CharzError, config::ConfigError, netlist::NetlistError, report::ReportError,
    simulate::SimulateError, sweep::SweepError, unit::UnitError,
};

#[derive(Debug, thiserror::Error)]
pub enum PimError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Fmt(#[from] std::fmt::Error),

    #[error(transparent)]
    JsonError(#[from] serde_json::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Netlist(#[from] NetlistError),

    #[error(transparent)]
    Simulate(#[from] SimulateError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error(transparent)]
    Unit(#[from] UnitError),

    #[error(transparent)]
    Charz(#[from] CharzError),

    #[error(transparent)]
    Sweep(#[from] SweepError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),

    #[error("{0}")]
    Message(String),

    #[error("{msg} >> {err}")]
    Context { msg: String, err: Box<dyn std::error::Error> }
}

pub type PimResult<T> = Result<T, PimError>;

pub trait ErrorContext<T> {
    fn context<S: Into<String>>(self, msg: S) -> PimResult<T>;
    fn with_context<S: Into<String>>(self, f: impl Fn() -> S) -> PimResult<T>;
}

impl<T, E: std::error::Error + 'static> ErrorContext<T> for Result<T, E> {
    fn context<S: Into<String>>(self, msg: S) -> PimResult<T> {
        self.map_err(|e| PimError::Context { msg: msg.into(), err: Box::new(e) })
    }

    fn with_context<S: Into<String>>(self, f: impl Fn() -> S) -> PimResult<T> {
        let msg = f();
        self.context(msg)
    }
}

impl PimError {
    pub fn msg<S: Into<String>>(msg: S) -> Self {
        Self::Message(msg.into())
    }

    /// Look through `Context` wrappers for a module error of type `E`
    pub fn find<E: std::error::Error + 'static>(&self) -> Option<&E> {
        let err: &(dyn std::error::Error + 'static) = match self {
            Self::Context { err, .. } => {
                if let Some(inner) = err.downcast_ref::<PimError>() {
                    return inner.find();
                }
                err.as_ref()
            }
            Self::Io(e) => e,
            Self::Config(e) => e,
            Self::Netlist(e) => e,
            Self::Simulate(e) => e,
            Self::Report(e) => e,
            Self::Unit(e) => e,
            Self::Charz(e) => e,
            Self::Sweep(e) => e,
            _ => return None,
        };
        err.downcast_ref::<E>()
    }
}

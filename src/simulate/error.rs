use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum SimulateError {
    #[error("unsupport spice execute '{0}'")]
    UnsupportExecute(String),

    #[error("execute command '{0}' failed for '{1}'")]
    ExecuteError(String, String),

    #[error("simulator finished but report '{0}' not found")]
    ReportNotFound(PathBuf),

    #[error("invalid path '{0}'")]
    InvalidPath(PathBuf),
}

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unsupport cell type '{0}'")]
    UnsupportedCellType(String),

    #[error("voltage distribution '{0}' not implemented")]
    UnsupportedDistribution(String),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("extra args '{0}' is not a json object")]
    ExtraArgsNotObject(PathBuf),
}

impl ConfigError {
    pub fn invalid<S: Into<String>>(msg: S) -> Self {
        Self::Invalid(msg.into())
    }
}

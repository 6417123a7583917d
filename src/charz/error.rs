#[derive(Debug, thiserror::Error)]
pub enum CharzError {
    #[error("got {0} readouts for {1} ideal products")]
    ReadoutSizeUnmatch(usize, usize),

    #[error("expect {0} inputs for a {0}-column weight matrix but got {1}")]
    InputSizeUnmatch(usize, usize),

    #[error("no trial has been run")]
    NoTrial,
}

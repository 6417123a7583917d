#[derive(Debug, thiserror::Error)]
pub enum NetlistError {
    #[error("expect {0} input voltages but got {1}")]
    InputSizeUnmatch(usize, usize),

    #[error("expect {0}x{1} weight voltages but got {2}x{3}")]
    WeightSizeUnmatch(usize, usize, usize, usize),
}

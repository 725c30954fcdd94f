use thiserror::Error;

#[derive(Debug, Error)]
pub enum RankspecError {
    #[error("invalid shape: {0}")]
    InvalidShape(String),

    #[error("index out of range: {0}")]
    IndexOutOfRange(String),

    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("undefined operation: {0}")]
    UndefinedOperation(String),

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("no Johnson graph cached for n={n}, size={size}")]
    MissingOperator { n: usize, size: usize },
}

pub type RankspecResult<T> = Result<T, RankspecError>;

use thiserror::Error;

// Unified error type for mckrylov

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("zero pivot at row {0} during incomplete factorization")]
    ZeroPivot(usize),
    #[error("matrix market parse error: {0}")]
    Parse(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

use thiserror::Error;

pub type Result<T, E = TransportError> = core::result::Result<T, E>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("operation not supported on this backend: {0}")]
    Unsupported(&'static str),
    #[error("I/O error: {0}")]
    Io(String),
    #[error("timeout")]
    Timeout,
    #[error("slave {slave} answered with exception code {code:#04x}")]
    Exception { slave: u8, code: u8 },
    #[error("invalid response: {0}")]
    InvalidResponse(&'static str),
}

use crate::codes::CodeRegister;
use register_transport::TransportError;
use thiserror::Error;

pub type Result<T, E = VfdError> = core::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum VfdError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("frequency set-point {0}% outside 0.00..=100.00")]
    OutOfRange(f32),
    #[error("modbus failure: {0}")]
    ModbusFailure(#[from] TransportError),
    #[error("{register} register holds {raw}, which is not a known code")]
    DecodeError { register: CodeRegister, raw: u16 },
}

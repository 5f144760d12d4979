use thiserror::Error;

use crate::dtype::DType;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KernelError {
    #[error("index {index} out of bounds for buffer of length {len}")]
    OutOfBounds { index: isize, len: usize },
    #[error("physical offset overflows isize")]
    OffsetOverflow,
    #[error("dtype mismatch: expected {expected}, got {got}")]
    DTypeMismatch { expected: DType, got: DType },
    #[error("unsupported operand pairing for {op}: {left} x {right}")]
    UnsupportedPairing {
        op: &'static str,
        left: DType,
        right: DType,
    },
    #[error("output length {got} does not match {rows}x{cols}")]
    LengthMismatch { rows: usize, cols: usize, got: usize },
}

pub type Result<T> = std::result::Result<T, KernelError>;

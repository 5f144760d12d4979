use half::f16;

use crate::dtype::DType;
use crate::element::Element;
use crate::error::{KernelError, Result};

/// A borrowed flat buffer whose element type is only known at runtime.
///
/// The caller owns the storage; kernels only read through this view.
#[derive(Debug, Clone, Copy)]
pub enum BufferRef<'a> {
    I32(&'a [i32]),
    I64(&'a [i64]),
    F16(&'a [f16]),
    F32(&'a [f32]),
    F64(&'a [f64]),
}

impl BufferRef<'_> {
    /// Number of elements in the buffer.
    pub fn len(&self) -> usize {
        match self {
            BufferRef::I32(v) => v.len(),
            BufferRef::I64(v) => v.len(),
            BufferRef::F16(v) => v.len(),
            BufferRef::F32(v) => v.len(),
            BufferRef::F64(v) => v.len(),
        }
    }

    /// Returns true if the buffer contains no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the element type of this buffer.
    pub fn dtype(&self) -> DType {
        match self {
            BufferRef::I32(_) => DType::I32,
            BufferRef::I64(_) => DType::I64,
            BufferRef::F16(_) => DType::F16,
            BufferRef::F32(_) => DType::F32,
            BufferRef::F64(_) => DType::F64,
        }
    }
}

impl<'a> From<&'a [i32]> for BufferRef<'a> {
    fn from(v: &'a [i32]) -> Self {
        BufferRef::I32(v)
    }
}

impl<'a> From<&'a [i64]> for BufferRef<'a> {
    fn from(v: &'a [i64]) -> Self {
        BufferRef::I64(v)
    }
}

impl<'a> From<&'a [f16]> for BufferRef<'a> {
    fn from(v: &'a [f16]) -> Self {
        BufferRef::F16(v)
    }
}

impl<'a> From<&'a [f32]> for BufferRef<'a> {
    fn from(v: &'a [f32]) -> Self {
        BufferRef::F32(v)
    }
}

impl<'a> From<&'a [f64]> for BufferRef<'a> {
    fn from(v: &'a [f64]) -> Self {
        BufferRef::F64(v)
    }
}

/// Scalar produced by an inner product.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    I32(i32),
    I64(i64),
    F16(f16),
    F32(f32),
    F64(f64),
}

impl Scalar {
    /// Returns the element type of this scalar.
    pub fn dtype(&self) -> DType {
        match self {
            Scalar::I32(_) => DType::I32,
            Scalar::I64(_) => DType::I64,
            Scalar::F16(_) => DType::F16,
            Scalar::F32(_) => DType::F32,
            Scalar::F64(_) => DType::F64,
        }
    }

    /// Returns the value as `T`.
    ///
    /// # Errors
    /// Returns an error if the scalar does not hold a `T`.
    pub fn get<T: Element>(self) -> Result<T> {
        T::from_scalar(self).ok_or(KernelError::DTypeMismatch {
            expected: T::DTYPE,
            got: self.dtype(),
        })
    }
}

/// Owned, row-major output of a matrix multiply.
///
/// Allocated fresh for every call; the kernel keeps no reference to it.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultBuffer {
    I32(Vec<i32>),
    I64(Vec<i64>),
    F16(Vec<f16>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

impl ResultBuffer {
    /// Number of elements in the buffer.
    pub fn len(&self) -> usize {
        match self {
            ResultBuffer::I32(v) => v.len(),
            ResultBuffer::I64(v) => v.len(),
            ResultBuffer::F16(v) => v.len(),
            ResultBuffer::F32(v) => v.len(),
            ResultBuffer::F64(v) => v.len(),
        }
    }

    /// Returns true if the buffer contains no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the element type of this buffer.
    pub fn dtype(&self) -> DType {
        match self {
            ResultBuffer::I32(_) => DType::I32,
            ResultBuffer::I64(_) => DType::I64,
            ResultBuffer::F16(_) => DType::F16,
            ResultBuffer::F32(_) => DType::F32,
            ResultBuffer::F64(_) => DType::F64,
        }
    }

    /// Returns the data as a `T` slice.
    ///
    /// # Errors
    /// Returns an error if the buffer does not hold `T` elements.
    pub fn as_slice<T: Element>(&self) -> Result<&[T]> {
        T::result_slice(self).ok_or(KernelError::DTypeMismatch {
            expected: T::DTYPE,
            got: self.dtype(),
        })
    }
}

//! Element types that may back a flat buffer.
//!
//! Integers carry the wide type their products are summed in; floats carry
//! the type they accumulate in. Both know how to wrap themselves into the
//! runtime-typed [`Scalar`] and [`ResultBuffer`] used by the dispatcher.

use std::fmt::Debug;

use half::f16;
use num_traits::{AsPrimitive, Float, PrimInt, WrappingAdd, WrappingMul};

use crate::dtype::DType;
use crate::storage::{ResultBuffer, Scalar};

/// A numeric element of a flat buffer.
pub trait Element: Copy + Send + Sync + Debug + 'static {
    const DTYPE: DType;

    /// Wraps a value into the runtime-typed scalar.
    fn into_scalar(self) -> Scalar;

    /// Wraps an owned result into the runtime-typed buffer.
    fn into_result(data: Vec<Self>) -> ResultBuffer;

    /// Borrows the typed contents of `buf` if it holds this element type.
    fn result_slice(buf: &ResultBuffer) -> Option<&[Self]>;

    /// Extracts the value from `scalar` if it holds this element type.
    fn from_scalar(scalar: Scalar) -> Option<Self>;
}

/// Integer elements. Products and running sums live in `Wide` and are
/// narrowed back with truncation once the walk is done.
pub trait IntElement: Element + PrimInt {
    type Wide: PrimInt + WrappingAdd + WrappingMul + AsPrimitive<Self> + Debug;

    fn widen(self) -> Self::Wide;

    fn narrow(wide: Self::Wide) -> Self {
        wide.as_()
    }
}

/// Floating elements. `Acc` is the type products are formed and summed in.
pub trait FloatElement: Element {
    type Acc: Float + Send + Sync + Debug + 'static;

    fn to_acc(self) -> Self::Acc;

    fn from_acc(acc: Self::Acc) -> Self;
}

impl Element for i32 {
    const DTYPE: DType = DType::I32;

    fn into_scalar(self) -> Scalar {
        Scalar::I32(self)
    }

    fn into_result(data: Vec<Self>) -> ResultBuffer {
        ResultBuffer::I32(data)
    }

    fn result_slice(buf: &ResultBuffer) -> Option<&[Self]> {
        match buf {
            ResultBuffer::I32(v) => Some(v),
            _ => None,
        }
    }

    fn from_scalar(scalar: Scalar) -> Option<Self> {
        match scalar {
            Scalar::I32(v) => Some(v),
            _ => None,
        }
    }
}

impl Element for i64 {
    const DTYPE: DType = DType::I64;

    fn into_scalar(self) -> Scalar {
        Scalar::I64(self)
    }

    fn into_result(data: Vec<Self>) -> ResultBuffer {
        ResultBuffer::I64(data)
    }

    fn result_slice(buf: &ResultBuffer) -> Option<&[Self]> {
        match buf {
            ResultBuffer::I64(v) => Some(v),
            _ => None,
        }
    }

    fn from_scalar(scalar: Scalar) -> Option<Self> {
        match scalar {
            Scalar::I64(v) => Some(v),
            _ => None,
        }
    }
}

impl Element for f16 {
    const DTYPE: DType = DType::F16;

    fn into_scalar(self) -> Scalar {
        Scalar::F16(self)
    }

    fn into_result(data: Vec<Self>) -> ResultBuffer {
        ResultBuffer::F16(data)
    }

    fn result_slice(buf: &ResultBuffer) -> Option<&[Self]> {
        match buf {
            ResultBuffer::F16(v) => Some(v),
            _ => None,
        }
    }

    fn from_scalar(scalar: Scalar) -> Option<Self> {
        match scalar {
            Scalar::F16(v) => Some(v),
            _ => None,
        }
    }
}

impl Element for f32 {
    const DTYPE: DType = DType::F32;

    fn into_scalar(self) -> Scalar {
        Scalar::F32(self)
    }

    fn into_result(data: Vec<Self>) -> ResultBuffer {
        ResultBuffer::F32(data)
    }

    fn result_slice(buf: &ResultBuffer) -> Option<&[Self]> {
        match buf {
            ResultBuffer::F32(v) => Some(v),
            _ => None,
        }
    }

    fn from_scalar(scalar: Scalar) -> Option<Self> {
        match scalar {
            Scalar::F32(v) => Some(v),
            _ => None,
        }
    }
}

impl Element for f64 {
    const DTYPE: DType = DType::F64;

    fn into_scalar(self) -> Scalar {
        Scalar::F64(self)
    }

    fn into_result(data: Vec<Self>) -> ResultBuffer {
        ResultBuffer::F64(data)
    }

    fn result_slice(buf: &ResultBuffer) -> Option<&[Self]> {
        match buf {
            ResultBuffer::F64(v) => Some(v),
            _ => None,
        }
    }

    fn from_scalar(scalar: Scalar) -> Option<Self> {
        match scalar {
            Scalar::F64(v) => Some(v),
            _ => None,
        }
    }
}

impl IntElement for i32 {
    type Wide = i64;

    fn widen(self) -> i64 {
        self as i64
    }
}

impl IntElement for i64 {
    type Wide = i128;

    fn widen(self) -> i128 {
        self as i128
    }
}

impl FloatElement for f16 {
    type Acc = f32;

    fn to_acc(self) -> f32 {
        self.to_f32()
    }

    fn from_acc(acc: f32) -> Self {
        f16::from_f32(acc)
    }
}

impl FloatElement for f32 {
    type Acc = f32;

    fn to_acc(self) -> f32 {
        self
    }

    fn from_acc(acc: f32) -> Self {
        acc
    }
}

impl FloatElement for f64 {
    type Acc = f64;

    fn to_acc(self) -> f64 {
        self
    }

    fn from_acc(acc: f64) -> Self {
        acc
    }
}

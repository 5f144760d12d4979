use std::os::raw::c_void;

use sk_core::{Bounds, DType, InnerProductParams, MatMulParams, Scalar};

/// Status codes returned by all FFI functions.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SKStatus {
    Ok = 0,
    ErrorInvalidArgument = 1,
    ErrorOutOfBounds = 2,
    ErrorUnsupported = 3,
    ErrorInternal = 4,
}

/// Element type tag of a buffer crossing the boundary.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SKDType {
    I32 = 0,
    I64 = 1,
    F16 = 2,
    F32 = 3,
    F64 = 4,
}

impl From<SKDType> for DType {
    fn from(d: SKDType) -> Self {
        match d {
            SKDType::I32 => DType::I32,
            SKDType::I64 => DType::I64,
            SKDType::F16 => DType::F16,
            SKDType::F32 => DType::F32,
            SKDType::F64 => DType::F64,
        }
    }
}

impl From<DType> for SKDType {
    fn from(d: DType) -> Self {
        match d {
            DType::I32 => SKDType::I32,
            DType::I64 => SKDType::I64,
            DType::F16 => SKDType::F16,
            DType::F32 => SKDType::F32,
            DType::F64 => SKDType::F64,
        }
    }
}

/// Parameters of a bound-driven inner product.
///
/// Both walks start at their index and advance by their stride until the left
/// index reaches or passes `left_last_index`.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct SKInnerProductParams {
    pub left_stride: isize,
    pub left_last_index: isize,
    pub left_index: isize,
    pub right_stride: isize,
    pub right_index: isize,
    /// Validate both walks against the buffer lengths before reading.
    pub check_bounds: bool,
}

impl Default for SKInnerProductParams {
    fn default() -> Self {
        Self {
            left_stride: 1,
            left_last_index: 0,
            left_index: 0,
            right_stride: 1,
            right_index: 0,
            check_bounds: false,
        }
    }
}

impl SKInnerProductParams {
    pub fn kernel_params(&self) -> InnerProductParams {
        InnerProductParams {
            left_stride: self.left_stride,
            left_last_index: self.left_last_index,
            left_index: self.left_index,
            right_stride: self.right_stride,
            right_index: self.right_index,
        }
    }

    pub fn bounds(&self) -> Bounds {
        if self.check_bounds {
            Bounds::Validated
        } else {
            Bounds::Trusted
        }
    }
}

/// Shapes, offsets and strides of a matrix multiply `C = A · B`.
///
/// `A` is `n_rows x inner_count`, `B` is `inner_count x n_cols`; the result is
/// row-major `n_rows x n_cols`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct SKMatMulParams {
    pub n_rows: usize,
    pub n_cols: usize,
    pub inner_count: usize,
    pub a_offset: isize,
    pub a_row_stride: isize,
    pub a_col_stride: isize,
    pub b_offset: isize,
    pub b_row_stride: isize,
    pub b_col_stride: isize,
    /// Validate both operand views against the buffer lengths before reading.
    pub check_bounds: bool,
}

impl SKMatMulParams {
    pub fn kernel_params(&self) -> MatMulParams {
        MatMulParams {
            n_rows: self.n_rows,
            n_cols: self.n_cols,
            inner_count: self.inner_count,
            a_offset: self.a_offset,
            a_row_stride: self.a_row_stride,
            a_col_stride: self.a_col_stride,
            b_offset: self.b_offset,
            b_row_stride: self.b_row_stride,
            b_col_stride: self.b_col_stride,
        }
    }

    pub fn bounds(&self) -> Bounds {
        if self.check_bounds {
            Bounds::Validated
        } else {
            Bounds::Trusted
        }
    }
}

/// Called once when the core is done reading a borrowed buffer.
pub type SKReleaseCallback = Option<extern "C" fn(user_data: *mut c_void)>;

/// A caller-owned flat buffer lent to the core for the duration of one call.
///
/// `data` must point to `len` elements of `dtype`. If `release` is set it is
/// invoked with `user_data` exactly once before the call returns, on success
/// and failure alike.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct SKBuffer {
    pub data: *const c_void,
    pub len: usize,
    pub dtype: SKDType,
    pub release: SKReleaseCallback,
    pub user_data: *mut c_void,
}

/// Scalar result of an inner product.
///
/// Integer results are stored sign-extended in `as_i64`, floating results
/// widened to `as_f64`; the unused field is zero.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SKScalar {
    pub dtype: SKDType,
    pub as_i64: i64,
    pub as_f64: f64,
}

impl From<Scalar> for SKScalar {
    fn from(s: Scalar) -> Self {
        let dtype = s.dtype().into();
        let (as_i64, as_f64) = match s {
            Scalar::I32(v) => (v as i64, 0.0),
            Scalar::I64(v) => (v, 0.0),
            Scalar::F16(v) => (0, v.to_f64()),
            Scalar::F32(v) => (0, v as f64),
            Scalar::F64(v) => (0, v),
        };
        Self {
            dtype,
            as_i64,
            as_f64,
        }
    }
}

/// Row-major matrix-multiply result allocated by the core.
///
/// Ownership passes to the caller, who must hand it back to
/// `sk_result_buffer_free` exactly once.
#[repr(C)]
#[derive(Debug)]
pub struct SKResultBuffer {
    pub data: *mut c_void,
    pub len: usize,
    pub dtype: SKDType,
}

//! Runtime selection of a promotion policy.
//!
//! Buffers arriving from the managed side only carry a [`DType`] tag. The
//! pairing of the two tags is inspected once per call and mapped onto the
//! matching generic kernel instantiation.

use half::f16;

use crate::checked;
use crate::dtype::DType;
use crate::element::Element;
use crate::error::{KernelError, Result};
use crate::inner::{self, InnerProductParams};
use crate::matmul::{self, MatMulParams};
use crate::promote::{FloatXFloat, FloatXInt, IntXFloat, IntXInt, MatMulPromotion, Promotion};
use crate::storage::{BufferRef, ResultBuffer, Scalar};

/// Whether a kernel validates its views before reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Bounds {
    /// The caller guarantees every index is in range.
    #[default]
    Trusted,
    /// Views are checked against buffer lengths first.
    Validated,
}

/// Runs a bound-driven inner product for one statically known pairing.
pub fn run_inner_product<P: Promotion>(
    params: InnerProductParams,
    left: &[P::Left],
    right: &[P::Right],
    bounds: Bounds,
) -> Result<P::Output> {
    let (left_dtype, right_dtype) = (<P::Left as Element>::DTYPE, <P::Right as Element>::DTYPE);
    tracing::debug!(
        kind = ?P::KIND,
        left = %left_dtype,
        right = %right_dtype,
        ?bounds,
        "inner product"
    );
    match bounds {
        Bounds::Trusted => Ok(inner::inner_product_bounded::<P>(params, left, right)),
        Bounds::Validated => checked::inner_product_bounded::<P>(params, left, right),
    }
}

/// Runs a matrix multiply for one statically known pairing.
pub fn run_matmul<P: MatMulPromotion>(
    params: &MatMulParams,
    a: &[P::Left],
    b: &[P::Right],
    bounds: Bounds,
) -> Result<Vec<P::Output>> {
    let dtype = <P::Output as Element>::DTYPE;
    tracing::debug!(
        kind = ?P::KIND,
        %dtype,
        ?bounds,
        "matmul"
    );
    match bounds {
        Bounds::Trusted => Ok(matmul::matmul::<P>(params, a, b)),
        Bounds::Validated => checked::matmul::<P>(params, a, b),
    }
}

fn typed_inner<P: Promotion>(
    params: InnerProductParams,
    left: &[P::Left],
    right: &[P::Right],
    bounds: Bounds,
) -> Result<Scalar> {
    run_inner_product::<P>(params, left, right, bounds).map(Element::into_scalar)
}

fn typed_matmul<P: MatMulPromotion>(
    params: &MatMulParams,
    a: &[P::Left],
    b: &[P::Right],
    bounds: Bounds,
) -> Result<ResultBuffer> {
    run_matmul::<P>(params, a, b, bounds).map(<P::Output as Element>::into_result)
}

/// Mismatch error for two tags of the same kind but different widths.
fn width_mismatch(left: DType, right: DType) -> KernelError {
    KernelError::DTypeMismatch {
        expected: left,
        got: right,
    }
}

/// Inner product of two runtime-typed buffers.
///
/// Integer pairs must share a width and produce that integer type; any pair
/// involving a float produces the float operand's type; two floats must share
/// a width.
///
/// # Errors
/// `DTypeMismatch` for same-kind operands of different widths, and the
/// validation errors of [`checked`] when `bounds` is [`Bounds::Validated`].
pub fn inner_product(
    params: InnerProductParams,
    left: BufferRef<'_>,
    right: BufferRef<'_>,
    bounds: Bounds,
) -> Result<Scalar> {
    use crate::storage::BufferRef as B;
    match (left, right) {
        (B::I32(l), B::I32(r)) => typed_inner::<IntXInt<i32>>(params, l, r, bounds),
        (B::I64(l), B::I64(r)) => typed_inner::<IntXInt<i64>>(params, l, r, bounds),

        (B::I32(l), B::F16(r)) => typed_inner::<IntXFloat<i32, f16>>(params, l, r, bounds),
        (B::I32(l), B::F32(r)) => typed_inner::<IntXFloat<i32, f32>>(params, l, r, bounds),
        (B::I32(l), B::F64(r)) => typed_inner::<IntXFloat<i32, f64>>(params, l, r, bounds),
        (B::I64(l), B::F16(r)) => typed_inner::<IntXFloat<i64, f16>>(params, l, r, bounds),
        (B::I64(l), B::F32(r)) => typed_inner::<IntXFloat<i64, f32>>(params, l, r, bounds),
        (B::I64(l), B::F64(r)) => typed_inner::<IntXFloat<i64, f64>>(params, l, r, bounds),

        (B::F16(l), B::I32(r)) => typed_inner::<FloatXInt<f16, i32>>(params, l, r, bounds),
        (B::F32(l), B::I32(r)) => typed_inner::<FloatXInt<f32, i32>>(params, l, r, bounds),
        (B::F64(l), B::I32(r)) => typed_inner::<FloatXInt<f64, i32>>(params, l, r, bounds),
        (B::F16(l), B::I64(r)) => typed_inner::<FloatXInt<f16, i64>>(params, l, r, bounds),
        (B::F32(l), B::I64(r)) => typed_inner::<FloatXInt<f32, i64>>(params, l, r, bounds),
        (B::F64(l), B::I64(r)) => typed_inner::<FloatXInt<f64, i64>>(params, l, r, bounds),

        (B::F16(l), B::F16(r)) => typed_inner::<FloatXFloat<f16>>(params, l, r, bounds),
        (B::F32(l), B::F32(r)) => typed_inner::<FloatXFloat<f32>>(params, l, r, bounds),
        (B::F64(l), B::F64(r)) => typed_inner::<FloatXFloat<f64>>(params, l, r, bounds),

        (l, r) => Err(width_mismatch(l.dtype(), r.dtype())),
    }
}

/// Matrix multiply of two runtime-typed buffers into a fresh row-major
/// result of the operands' element type.
///
/// # Errors
/// `UnsupportedPairing` when one operand is integer and the other floating,
/// `DTypeMismatch` for same-kind operands of different widths, and the
/// validation errors of [`checked`] when `bounds` is [`Bounds::Validated`].
pub fn matmul(
    params: &MatMulParams,
    a: BufferRef<'_>,
    b: BufferRef<'_>,
    bounds: Bounds,
) -> Result<ResultBuffer> {
    use crate::storage::BufferRef as B;
    match (a, b) {
        (B::I32(a), B::I32(b)) => typed_matmul::<IntXInt<i32>>(params, a, b, bounds),
        (B::I64(a), B::I64(b)) => typed_matmul::<IntXInt<i64>>(params, a, b, bounds),
        (B::F16(a), B::F16(b)) => typed_matmul::<FloatXFloat<f16>>(params, a, b, bounds),
        (B::F32(a), B::F32(b)) => typed_matmul::<FloatXFloat<f32>>(params, a, b, bounds),
        (B::F64(a), B::F64(b)) => typed_matmul::<FloatXFloat<f64>>(params, a, b, bounds),
        (a, b) if a.dtype().is_integer() != b.dtype().is_integer() => {
            Err(KernelError::UnsupportedPairing {
                op: "matmul",
                left: a.dtype(),
                right: b.dtype(),
            })
        }
        (a, b) => Err(width_mismatch(a.dtype(), b.dtype())),
    }
}

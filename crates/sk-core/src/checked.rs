//! Bounds-validated entry points.
//!
//! The plain kernels trust the caller to keep every index inside its buffer.
//! These wrappers check each operand's extreme indices first and report an
//! error instead of touching the data when a view reaches outside it.

use crate::error::Result;
use crate::inner::{self, InnerProductParams};
use crate::matmul::{self, MatMulParams};
use crate::promote::{MatMulPromotion, Promotion};
use crate::view::StridedView;

/// [`inner::inner_product`] after validating both views.
///
/// # Errors
/// `OutOfBounds` or `OffsetOverflow` if either walk leaves its buffer.
pub fn inner_product<P: Promotion>(
    left_view: StridedView,
    right_view: StridedView,
    left: &[P::Left],
    right: &[P::Right],
) -> Result<P::Output> {
    left_view.validate(left.len())?;
    right_view.with_extent(left_view.extent).validate(right.len())?;
    Ok(inner::inner_product::<P>(left_view, right_view, left, right))
}

/// [`inner::inner_product_bounded`] after validating both walks.
pub fn inner_product_bounded<P: Promotion>(
    params: InnerProductParams,
    left: &[P::Left],
    right: &[P::Right],
) -> Result<P::Output> {
    let (left_view, right_view) = params.views();
    left_view.validate(left.len())?;
    right_view.validate(right.len())?;
    Ok(inner::inner_product_bounded::<P>(params, left, right))
}

/// [`matmul::matmul`] after validating both operands.
///
/// # Errors
/// `OutOfBounds` or `OffsetOverflow` if either operand view leaves its buffer.
pub fn matmul<P: MatMulPromotion>(
    params: &MatMulParams,
    a: &[P::Left],
    b: &[P::Right],
) -> Result<Vec<P::Output>> {
    params.lhs().validate(a.len())?;
    params.rhs().validate(b.len())?;
    Ok(matmul::matmul::<P>(params, a, b))
}

//! Strided inner product.

use crate::promote::Promotion;
use crate::view::StridedView;

/// Parameters of a bound-driven inner product.
///
/// The walk starts at `left_index` / `right_index` and advances both sides by
/// their strides until the left index reaches or passes `left_last_index`.
/// The right side has no bound of its own; its stride must keep it in
/// lockstep with the left side for the same number of elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct InnerProductParams {
    pub left_stride: isize,
    pub left_last_index: isize,
    pub left_index: isize,
    pub right_stride: isize,
    pub right_index: isize,
}

impl InnerProductParams {
    /// Parameters for unit-stride walks over the first `len` elements of both
    /// buffers.
    pub fn contiguous(len: usize) -> Self {
        InnerProductParams {
            left_stride: 1,
            left_last_index: len as isize,
            left_index: 0,
            right_stride: 1,
            right_index: 0,
        }
    }

    /// The equivalent pair of views, both walking the left side's extent.
    pub fn views(&self) -> (StridedView, StridedView) {
        let left = StridedView::from_bound(self.left_index, self.left_stride, self.left_last_index);
        let right = StridedView::new(self.right_index, self.right_stride, left.extent);
        (left, right)
    }

    /// True when the bound can never be reached: the left side starts below
    /// it but does not move towards it.
    pub fn is_degenerate(&self) -> bool {
        self.left_stride <= 0 && self.left_index < self.left_last_index
    }
}

/// Sum of `left[l] * right[r]` over the paired indices of two views.
///
/// Walks `left_view.extent` elements; `right_view` contributes only its
/// offset and stride. Indices outside either buffer panic.
pub fn inner_product<P: Promotion>(
    left_view: StridedView,
    right_view: StridedView,
    left: &[P::Left],
    right: &[P::Right],
) -> P::Output {
    tracing::trace!(
        kind = ?P::KIND,
        left_offset = left_view.offset,
        left_stride = left_view.stride,
        right_offset = right_view.offset,
        right_stride = right_view.stride,
        extent = left_view.extent,
        "inner product"
    );
    accumulate::<P>(left_view, right_view, left, right)
}

/// Bound-driven inner product with the parameter layout of the managed
/// caller.
///
/// A left stride that can never reach the bound is treated as an empty walk.
pub fn inner_product_bounded<P: Promotion>(
    params: InnerProductParams,
    left: &[P::Left],
    right: &[P::Right],
) -> P::Output {
    if params.is_degenerate() {
        tracing::warn!(
            left_index = params.left_index,
            left_stride = params.left_stride,
            left_last_index = params.left_last_index,
            "left stride never reaches the bound, walking zero elements"
        );
    }
    let (left_view, right_view) = params.views();
    inner_product::<P>(left_view, right_view, left, right)
}

/// The accumulation loop shared by both kernels.
pub(crate) fn accumulate<P: Promotion>(
    left_view: StridedView,
    right_view: StridedView,
    left: &[P::Left],
    right: &[P::Right],
) -> P::Output {
    let acc = left_view
        .indices()
        .zip(right_view.with_extent(left_view.extent).indices())
        .fold(P::zero(), |acc, (l, r)| P::mul_add(acc, left[l], right[r]));
    P::finish(acc)
}

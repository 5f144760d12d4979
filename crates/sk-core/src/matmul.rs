//! Strided dense matrix multiply.
//!
//! `C = A · B` where `A` is `n_rows x inner_count` and `B` is
//! `inner_count x n_cols`, each addressed through its own offset and
//! row/column strides. Every output cell is the inner product of one row of
//! `A` with one column of `B`, so row-major, column-major and transposed
//! operands are all handled by the choice of strides without copying.

use crate::error::{KernelError, Result};
use crate::inner::accumulate;
use crate::promote::MatMulPromotion;
use crate::view::MatrixView;

/// Shapes, offsets and strides of both matrix-multiply operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MatMulParams {
    pub n_rows: usize,
    pub n_cols: usize,
    pub inner_count: usize,
    pub a_offset: isize,
    pub a_row_stride: isize,
    pub a_col_stride: isize,
    pub b_offset: isize,
    pub b_row_stride: isize,
    pub b_col_stride: isize,
}

impl MatMulParams {
    /// Dense row-major `n_rows x inner_count` times `inner_count x n_cols`.
    pub fn row_major(n_rows: usize, inner_count: usize, n_cols: usize) -> Self {
        MatMulParams::from_views(
            MatrixView::row_major(n_rows, inner_count),
            MatrixView::row_major(inner_count, n_cols),
        )
    }

    /// Parameters for `a · b`. `a.cols` is taken as the inner count; `b.rows`
    /// must agree with it.
    pub fn from_views(a: MatrixView, b: MatrixView) -> Self {
        debug_assert_eq!(a.cols, b.rows, "inner dimensions differ");
        MatMulParams {
            n_rows: a.rows,
            n_cols: b.cols,
            inner_count: a.cols,
            a_offset: a.offset,
            a_row_stride: a.row_stride,
            a_col_stride: a.col_stride,
            b_offset: b.offset,
            b_row_stride: b.row_stride,
            b_col_stride: b.col_stride,
        }
    }

    /// The left operand as an `n_rows x inner_count` view.
    pub fn lhs(&self) -> MatrixView {
        MatrixView::new(
            self.a_offset,
            self.a_row_stride,
            self.a_col_stride,
            self.n_rows,
            self.inner_count,
        )
    }

    /// The right operand as an `inner_count x n_cols` view.
    pub fn rhs(&self) -> MatrixView {
        MatrixView::new(
            self.b_offset,
            self.b_row_stride,
            self.b_col_stride,
            self.inner_count,
            self.n_cols,
        )
    }

    /// Number of elements in the row-major result.
    pub fn output_len(&self) -> usize {
        self.n_rows * self.n_cols
    }
}

/// Computes every output cell in row-major order, handing each to `emit`.
fn for_each_cell<P: MatMulPromotion>(
    params: &MatMulParams,
    a: &[P::Left],
    b: &[P::Right],
    mut emit: impl FnMut(P::Output),
) {
    let lhs = params.lhs();
    let rhs = params.rhs();
    for i in 0..lhs.rows {
        let row = lhs.row(i);
        for j in 0..rhs.cols {
            emit(accumulate::<P>(row, rhs.col(j), a, b));
        }
    }
}

/// Multiplies two strided matrices into a freshly allocated row-major buffer
/// of `n_rows * n_cols` elements.
///
/// An empty shape yields an empty buffer; `inner_count == 0` yields zeros.
/// Indices outside either buffer panic.
pub fn matmul<P: MatMulPromotion>(
    params: &MatMulParams,
    a: &[P::Left],
    b: &[P::Right],
) -> Vec<P::Output> {
    tracing::trace!(
        kind = ?P::KIND,
        n_rows = params.n_rows,
        n_cols = params.n_cols,
        inner_count = params.inner_count,
        "matmul"
    );
    let mut out = Vec::with_capacity(params.output_len());
    for_each_cell::<P>(params, a, b, |cell| out.push(cell));
    out
}

/// Same as [`matmul`], writing into a caller-provided row-major buffer.
///
/// # Errors
/// Returns `LengthMismatch` if `out.len() != n_rows * n_cols`.
pub fn matmul_into<P: MatMulPromotion>(
    params: &MatMulParams,
    a: &[P::Left],
    b: &[P::Right],
    out: &mut [P::Output],
) -> Result<()> {
    if out.len() != params.output_len() {
        return Err(KernelError::LengthMismatch {
            rows: params.n_rows,
            cols: params.n_cols,
            got: out.len(),
        });
    }
    tracing::trace!(
        kind = ?P::KIND,
        n_rows = params.n_rows,
        n_cols = params.n_cols,
        inner_count = params.inner_count,
        "matmul into caller buffer"
    );
    // cell (i, j) lands at i * n_cols + j
    let mut next = 0;
    for_each_cell::<P>(params, a, b, |cell| {
        out[next] = cell;
        next += 1;
    });
    Ok(())
}

//! Addressing descriptors over flat buffers.
//!
//! A view never owns storage. It maps logical positions to physical indices
//! of a buffer the caller hands to a kernel alongside it, so transposes and
//! slices are just different offsets and strides over the same data.

use crate::error::{KernelError, Result};

/// Check that every physical index touched by a walk stays within `[0, len)`.
///
/// `dims` pairs each extent with its stride.
fn validate_bounds(len: usize, offset: isize, dims: &[(usize, isize)]) -> Result<()> {
    if dims.iter().any(|&(extent, _)| extent == 0) {
        return Ok(());
    }
    let mut min_index = offset;
    let mut max_index = offset;
    for &(extent, stride) in dims {
        if extent > 1 {
            let span = isize::try_from(extent - 1)
                .ok()
                .and_then(|steps| stride.checked_mul(steps))
                .ok_or(KernelError::OffsetOverflow)?;
            if span >= 0 {
                max_index = max_index
                    .checked_add(span)
                    .ok_or(KernelError::OffsetOverflow)?;
            } else {
                min_index = min_index
                    .checked_add(span)
                    .ok_or(KernelError::OffsetOverflow)?;
            }
        }
    }
    if min_index < 0 {
        return Err(KernelError::OutOfBounds {
            index: min_index,
            len,
        });
    }
    if max_index as usize >= len {
        return Err(KernelError::OutOfBounds {
            index: max_index,
            len,
        });
    }
    Ok(())
}

/// A 1-D walk over a flat buffer: logical element `i` is at physical index
/// `offset + i * stride`.
///
/// A zero stride revisits the same element; a negative stride walks
/// backwards from `offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StridedView {
    pub offset: isize,
    pub stride: isize,
    pub extent: usize,
}

impl StridedView {
    pub fn new(offset: isize, stride: isize, extent: usize) -> Self {
        StridedView {
            offset,
            stride,
            extent,
        }
    }

    /// Unit-stride view over the first `len` elements.
    pub fn contiguous(len: usize) -> Self {
        StridedView::new(0, 1, len)
    }

    /// Builds the view walked by a bound-driven loop: start at `index`, step by
    /// `stride`, stop once the index reaches or passes `last_index`.
    ///
    /// Only a positive stride can reach the bound; any other stride yields an
    /// empty view.
    pub fn from_bound(index: isize, stride: isize, last_index: isize) -> Self {
        let extent = if stride > 0 && index < last_index {
            let span = last_index.abs_diff(index);
            span.div_ceil(stride as usize)
        } else {
            0
        };
        StridedView::new(index, stride, extent)
    }

    /// Same start and stride, walking `extent` elements.
    pub fn with_extent(self, extent: usize) -> Self {
        StridedView { extent, ..self }
    }

    /// The same elements in the opposite order.
    pub fn reversed(self) -> Self {
        if self.extent == 0 {
            return self;
        }
        StridedView::new(self.index(self.extent - 1), -self.stride, self.extent)
    }

    pub fn is_empty(&self) -> bool {
        self.extent == 0
    }

    /// Physical index of logical element `i`.
    pub fn index(&self, i: usize) -> isize {
        self.offset + i as isize * self.stride
    }

    /// Iterator over the physical indices of the walk, in logical order.
    pub fn indices(&self) -> Indices {
        Indices {
            next: self.offset,
            stride: self.stride,
            remaining: self.extent,
        }
    }

    /// Checks that every index of the walk falls inside a buffer of `len`
    /// elements.
    ///
    /// # Errors
    /// `OutOfBounds` for the first offending extreme index, `OffsetOverflow`
    /// if the extreme index does not fit in `isize`.
    pub fn validate(&self, len: usize) -> Result<()> {
        validate_bounds(len, self.offset, &[(self.extent, self.stride)])
    }
}

/// Physical indices of a [`StridedView`].
///
/// Indices are handed out as `usize`; a walk that goes negative wraps to a
/// huge value and fails the slice bounds check at the use site.
#[derive(Debug, Clone)]
pub struct Indices {
    next: isize,
    stride: isize,
    remaining: usize,
}

impl Iterator for Indices {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        let current = self.next;
        self.next = self.next.wrapping_add(self.stride);
        self.remaining -= 1;
        Some(current as usize)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Indices {}

/// A 2-D walk: element `(i, j)` is at `offset + i * row_stride + j * col_stride`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MatrixView {
    pub offset: isize,
    pub row_stride: isize,
    pub col_stride: isize,
    pub rows: usize,
    pub cols: usize,
}

impl MatrixView {
    pub fn new(offset: isize, row_stride: isize, col_stride: isize, rows: usize, cols: usize) -> Self {
        MatrixView {
            offset,
            row_stride,
            col_stride,
            rows,
            cols,
        }
    }

    /// Dense row-major layout: consecutive elements of a row are adjacent.
    pub fn row_major(rows: usize, cols: usize) -> Self {
        MatrixView::new(0, cols as isize, 1, rows, cols)
    }

    /// Dense column-major layout: consecutive elements of a column are adjacent.
    pub fn col_major(rows: usize, cols: usize) -> Self {
        MatrixView::new(0, 1, rows as isize, rows, cols)
    }

    /// Transpose over the same buffer: extents and strides swap.
    pub fn transpose(self) -> Self {
        MatrixView::new(self.offset, self.col_stride, self.row_stride, self.cols, self.rows)
    }

    /// The `rows x cols` block whose top-left element is `(row, col)`.
    pub fn sub_view(self, row: usize, col: usize, rows: usize, cols: usize) -> Self {
        MatrixView::new(self.index(row, col), self.row_stride, self.col_stride, rows, cols)
    }

    /// Row `i` as a 1-D walk along the columns.
    pub fn row(&self, i: usize) -> StridedView {
        StridedView::new(
            self.offset + i as isize * self.row_stride,
            self.col_stride,
            self.cols,
        )
    }

    /// Column `j` as a 1-D walk down the rows.
    pub fn col(&self, j: usize) -> StridedView {
        StridedView::new(
            self.offset + j as isize * self.col_stride,
            self.row_stride,
            self.rows,
        )
    }

    /// Physical index of element `(i, j)`.
    pub fn index(&self, i: usize, j: usize) -> isize {
        self.offset + i as isize * self.row_stride + j as isize * self.col_stride
    }

    /// Number of logical elements.
    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Checks that every element of the view falls inside a buffer of `len`
    /// elements.
    pub fn validate(&self, len: usize) -> Result<()> {
        validate_bounds(
            len,
            self.offset,
            &[(self.rows, self.row_stride), (self.cols, self.col_stride)],
        )
    }
}

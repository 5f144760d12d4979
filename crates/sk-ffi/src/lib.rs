mod buffer;
mod error;
mod types;

pub use buffer::*;
pub use error::*;
pub use types::*;

use std::ffi::CString;
use std::os::raw::c_char;

use sk_core::dispatch;
use sk_core::{Element, FloatXFloat, IntXFloat, IntXInt, MatMulPromotion, Promotion};

/// Execute a closure that returns an `SKStatus`, catching any panics
/// and converting them into `SKStatus::ErrorInternal`.
///
/// Unchecked kernels panic when a view indexes outside its buffer; that
/// surfaces here rather than unwinding into the caller.
fn catch_panic<F: FnOnce() -> SKStatus + std::panic::UnwindSafe>(f: F) -> SKStatus {
    match std::panic::catch_unwind(f) {
        Ok(status) => status,
        Err(_) => {
            set_last_error("internal panic".to_string());
            SKStatus::ErrorInternal
        }
    }
}

/// Bound-driven inner product over two typed pointer/length pairs.
unsafe fn typed_inner_product<P: Promotion>(
    params: SKInnerProductParams,
    left: *const P::Left,
    left_len: usize,
    right: *const P::Right,
    right_len: usize,
    out: *mut P::Output,
) -> SKStatus {
    if out.is_null() {
        set_last_error("out is null".to_string());
        return SKStatus::ErrorInvalidArgument;
    }
    let (Some(left), Some(right)) = (borrow_slice(left, left_len), borrow_slice(right, right_len))
    else {
        set_last_error("null buffer with non-zero length".to_string());
        return SKStatus::ErrorInvalidArgument;
    };
    match dispatch::run_inner_product::<P>(params.kernel_params(), left, right, params.bounds()) {
        Ok(v) => {
            *out = v;
            SKStatus::Ok
        }
        Err(e) => report(e),
    }
}

/// Matrix multiply over two typed pointer/length pairs.
unsafe fn typed_matmul<P: MatMulPromotion>(
    params: SKMatMulParams,
    a: *const P::Left,
    a_len: usize,
    b: *const P::Right,
    b_len: usize,
    out: *mut SKResultBuffer,
) -> SKStatus {
    if out.is_null() {
        set_last_error("out is null".to_string());
        return SKStatus::ErrorInvalidArgument;
    }
    let (Some(a), Some(b)) = (borrow_slice(a, a_len), borrow_slice(b, b_len)) else {
        set_last_error("null buffer with non-zero length".to_string());
        return SKStatus::ErrorInvalidArgument;
    };
    match dispatch::run_matmul::<P>(&params.kernel_params(), a, b, params.bounds()) {
        Ok(v) => {
            *out = <P::Output as Element>::into_result(v).into();
            SKStatus::Ok
        }
        Err(e) => report(e),
    }
}

/// Integer × integer inner product.
///
/// Products and the running sum are formed in 64 bits; the result is
/// truncated to 32 bits.
#[no_mangle]
pub unsafe extern "C" fn sk_inner_product_i32(
    params: SKInnerProductParams,
    left: *const i32,
    left_len: usize,
    right: *const i32,
    right_len: usize,
    out: *mut i32,
) -> SKStatus {
    catch_panic(|| unsafe {
        typed_inner_product::<IntXInt<i32>>(params, left, left_len, right, right_len, out)
    })
}

/// Integer × floating inner product. Each integer is converted to `float`
/// before it is multiplied.
#[no_mangle]
pub unsafe extern "C" fn sk_inner_product_i32_f32(
    params: SKInnerProductParams,
    left: *const i32,
    left_len: usize,
    right: *const f32,
    right_len: usize,
    out: *mut f32,
) -> SKStatus {
    catch_panic(|| unsafe {
        typed_inner_product::<IntXFloat<i32, f32>>(params, left, left_len, right, right_len, out)
    })
}

/// Floating × floating inner product.
#[no_mangle]
pub unsafe extern "C" fn sk_inner_product_f32(
    params: SKInnerProductParams,
    left: *const f32,
    left_len: usize,
    right: *const f32,
    right_len: usize,
    out: *mut f32,
) -> SKStatus {
    catch_panic(|| unsafe {
        typed_inner_product::<FloatXFloat<f32>>(params, left, left_len, right, right_len, out)
    })
}

/// Integer matrix multiply.
///
/// On success, writes a newly allocated row-major `n_rows * n_cols` buffer
/// into `*out`. The caller must later call `sk_result_buffer_free` on it.
#[no_mangle]
pub unsafe extern "C" fn sk_matmul_i32(
    params: SKMatMulParams,
    a: *const i32,
    a_len: usize,
    b: *const i32,
    b_len: usize,
    out: *mut SKResultBuffer,
) -> SKStatus {
    catch_panic(|| unsafe { typed_matmul::<IntXInt<i32>>(params, a, a_len, b, b_len, out) })
}

/// Floating matrix multiply. Ownership of `*out` passes to the caller as for
/// `sk_matmul_i32`.
#[no_mangle]
pub unsafe extern "C" fn sk_matmul_f32(
    params: SKMatMulParams,
    a: *const f32,
    a_len: usize,
    b: *const f32,
    b_len: usize,
    out: *mut SKResultBuffer,
) -> SKStatus {
    catch_panic(|| unsafe { typed_matmul::<FloatXFloat<f32>>(params, a, a_len, b, b_len, out) })
}

/// Inner product of two tagged buffers of any supported element types.
///
/// Both buffers are released through their callbacks before this returns.
#[no_mangle]
pub unsafe extern "C" fn sk_inner_product(
    params: SKInnerProductParams,
    left: SKBuffer,
    right: SKBuffer,
    out: *mut SKScalar,
) -> SKStatus {
    let left = BorrowedBuffer::acquire(left);
    let right = BorrowedBuffer::acquire(right);
    catch_panic(|| {
        if out.is_null() {
            set_last_error("out is null".to_string());
            return SKStatus::ErrorInvalidArgument;
        }
        let (Some(l), Some(r)) = (unsafe { left.contents() }, unsafe { right.contents() }) else {
            set_last_error("null buffer with non-zero length".to_string());
            return SKStatus::ErrorInvalidArgument;
        };
        match dispatch::inner_product(params.kernel_params(), l, r, params.bounds()) {
            Ok(s) => {
                unsafe { *out = s.into() };
                SKStatus::Ok
            }
            Err(e) => report(e),
        }
    })
}

/// Matrix multiply of two tagged buffers of the same element type.
///
/// Mixed integer/floating operands are rejected with
/// `SKStatus::ErrorUnsupported`. On success, `*out` must later be passed to
/// `sk_result_buffer_free`.
#[no_mangle]
pub unsafe extern "C" fn sk_matmul(
    params: SKMatMulParams,
    a: SKBuffer,
    b: SKBuffer,
    out: *mut SKResultBuffer,
) -> SKStatus {
    let a = BorrowedBuffer::acquire(a);
    let b = BorrowedBuffer::acquire(b);
    catch_panic(|| {
        if out.is_null() {
            set_last_error("out is null".to_string());
            return SKStatus::ErrorInvalidArgument;
        }
        let (Some(a), Some(b)) = (unsafe { a.contents() }, unsafe { b.contents() }) else {
            set_last_error("null buffer with non-zero length".to_string());
            return SKStatus::ErrorInvalidArgument;
        };
        match dispatch::matmul(&params.kernel_params(), a, b, params.bounds()) {
            Ok(buf) => {
                unsafe { *out = buf.into() };
                SKStatus::Ok
            }
            Err(e) => report(e),
        }
    })
}

/// Free a result buffer returned by one of the matmul functions.
///
/// Passing a buffer with null `data` is a no-op.
#[no_mangle]
pub unsafe extern "C" fn sk_result_buffer_free(buf: SKResultBuffer) {
    buf.free();
}

/// Retrieve the last error message.
///
/// Returns a pointer to a C string describing the most recent error on this
/// thread, or null if no error has occurred. The caller must free the
/// returned string with `sk_free_string`.
#[no_mangle]
pub extern "C" fn sk_last_error() -> *const c_char {
    match error::take_last_error() {
        Some(e) => e.into_raw(),
        None => std::ptr::null(),
    }
}

/// Free a string previously returned by `sk_last_error`.
#[no_mangle]
pub unsafe extern "C" fn sk_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::ffi::CStr;
    use std::os::raw::c_void;
    use std::sync::atomic::{AtomicUsize, Ordering};

    extern "C" fn count_release(user_data: *mut c_void) {
        let counter = unsafe { &*(user_data as *const AtomicUsize) };
        counter.fetch_add(1, Ordering::SeqCst);
    }

    fn tagged<T>(data: &[T], dtype: SKDType, counter: &AtomicUsize) -> SKBuffer {
        SKBuffer {
            data: data.as_ptr() as *const c_void,
            len: data.len(),
            dtype,
            release: Some(count_release),
            user_data: counter as *const AtomicUsize as *mut c_void,
        }
    }

    fn last_error() -> String {
        let p = sk_last_error();
        assert!(!p.is_null());
        let msg = unsafe { CStr::from_ptr(p) }.to_string_lossy().into_owned();
        unsafe { sk_free_string(p as *mut c_char) };
        msg
    }

    fn contiguous(len: usize) -> SKInnerProductParams {
        SKInnerProductParams {
            left_last_index: len as isize,
            ..Default::default()
        }
    }

    fn row_major_2x2() -> SKMatMulParams {
        SKMatMulParams {
            n_rows: 2,
            n_cols: 2,
            inner_count: 2,
            a_row_stride: 2,
            a_col_stride: 1,
            b_row_stride: 2,
            b_col_stride: 1,
            ..Default::default()
        }
    }

    #[test]
    fn test_inner_product_i32() {
        let l = [1, 2, 3, 4];
        let r = [4, 3, 2, 1];
        let mut out = 0;
        let status = unsafe {
            sk_inner_product_i32(contiguous(4), l.as_ptr(), 4, r.as_ptr(), 4, &mut out)
        };
        assert_eq!(status, SKStatus::Ok);
        assert_eq!(out, 20);
    }

    #[test]
    fn test_inner_product_i32_f32() {
        let l = [1, 2, 3, 4];
        let r = [4.0f32, 3.0, 2.0, 1.0];
        let mut out = 0.0;
        let status = unsafe {
            sk_inner_product_i32_f32(contiguous(4), l.as_ptr(), 4, r.as_ptr(), 4, &mut out)
        };
        assert_eq!(status, SKStatus::Ok);
        assert_relative_eq!(out, 20.0);
    }

    #[test]
    fn test_inner_product_f32_strided() {
        // left: elements 1 and 3, right walked backwards from 1
        let l = [0.0f32, 1.5, 0.0, 2.5];
        let r = [2.0f32, 4.0];
        let params = SKInnerProductParams {
            left_stride: 2,
            left_last_index: 4,
            left_index: 1,
            right_stride: -1,
            right_index: 1,
            check_bounds: true,
        };
        let mut out = 0.0;
        let status =
            unsafe { sk_inner_product_f32(params, l.as_ptr(), 4, r.as_ptr(), 2, &mut out) };
        assert_eq!(status, SKStatus::Ok);
        assert_relative_eq!(out, 1.5 * 4.0 + 2.5 * 2.0);
    }

    #[test]
    fn test_null_out_rejected() {
        let l = [1];
        let status = unsafe {
            sk_inner_product_i32(contiguous(1), l.as_ptr(), 1, l.as_ptr(), 1, std::ptr::null_mut())
        };
        assert_eq!(status, SKStatus::ErrorInvalidArgument);
        assert_eq!(last_error(), "out is null");
    }

    #[test]
    fn test_checked_bounds_reported() {
        let l = [1, 2, 3, 4];
        let r = [1, 2];
        let params = SKInnerProductParams {
            check_bounds: true,
            ..contiguous(4)
        };
        let mut out = 0;
        let status =
            unsafe { sk_inner_product_i32(params, l.as_ptr(), 4, r.as_ptr(), 2, &mut out) };
        assert_eq!(status, SKStatus::ErrorOutOfBounds);
        assert!(last_error().contains("out of bounds"));
    }

    #[test]
    fn test_unchecked_overrun_is_caught() {
        let l = [1, 2, 3, 4];
        let r = [1, 2];
        let mut out = 0;
        let status =
            unsafe { sk_inner_product_i32(contiguous(4), l.as_ptr(), 4, r.as_ptr(), 2, &mut out) };
        assert_eq!(status, SKStatus::ErrorInternal);
        assert_eq!(last_error(), "internal panic");
    }

    #[test]
    fn test_matmul_i32() {
        let a = [1, 2, 3, 4];
        let b = [5, 6, 7, 8];
        let mut out = SKResultBuffer {
            data: std::ptr::null_mut(),
            len: 0,
            dtype: SKDType::I32,
        };
        let status =
            unsafe { sk_matmul_i32(row_major_2x2(), a.as_ptr(), 4, b.as_ptr(), 4, &mut out) };
        assert_eq!(status, SKStatus::Ok);
        assert_eq!(out.len, 4);
        assert_eq!(out.dtype, SKDType::I32);
        let c = unsafe { std::slice::from_raw_parts(out.data as *const i32, out.len) };
        assert_eq!(c, &[19, 22, 43, 50]);
        unsafe { sk_result_buffer_free(out) };
    }

    #[test]
    fn test_matmul_f32_transposed() {
        // A^T @ B with A = [1,2;3,4] read column-wise
        let a = [1.0f32, 2.0, 3.0, 4.0];
        let b = [5.0f32, 6.0, 7.0, 8.0];
        let params = SKMatMulParams {
            a_row_stride: 1,
            a_col_stride: 2,
            ..row_major_2x2()
        };
        let mut out = SKResultBuffer {
            data: std::ptr::null_mut(),
            len: 0,
            dtype: SKDType::F32,
        };
        let status = unsafe { sk_matmul_f32(params, a.as_ptr(), 4, b.as_ptr(), 4, &mut out) };
        assert_eq!(status, SKStatus::Ok);
        let c = unsafe { std::slice::from_raw_parts(out.data as *const f32, out.len) };
        assert_eq!(c, &[26.0, 30.0, 38.0, 44.0]);
        unsafe { sk_result_buffer_free(out) };
    }

    #[test]
    fn test_dynamic_inner_product_releases_buffers() {
        let counter = AtomicUsize::new(0);
        let l = [1i64, 2, 3, 4];
        let r = [4.0f64, 3.0, 2.0, 1.0];
        let mut out = SKScalar {
            dtype: SKDType::I32,
            as_i64: 0,
            as_f64: 0.0,
        };
        let status = unsafe {
            sk_inner_product(
                contiguous(4),
                tagged(&l, SKDType::I64, &counter),
                tagged(&r, SKDType::F64, &counter),
                &mut out,
            )
        };
        assert_eq!(status, SKStatus::Ok);
        assert_eq!(out.dtype, SKDType::F64);
        assert_eq!(out.as_f64, 20.0);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_dynamic_matmul_rejects_mixed_and_still_releases() {
        let counter = AtomicUsize::new(0);
        let a = [1i32, 2, 3, 4];
        let b = [5.0f32, 6.0, 7.0, 8.0];
        let mut out = SKResultBuffer {
            data: std::ptr::null_mut(),
            len: 0,
            dtype: SKDType::F32,
        };
        let status = unsafe {
            sk_matmul(
                row_major_2x2(),
                tagged(&a, SKDType::I32, &counter),
                tagged(&b, SKDType::F32, &counter),
                &mut out,
            )
        };
        assert_eq!(status, SKStatus::ErrorUnsupported);
        assert!(out.data.is_null());
        assert_eq!(counter.load(Ordering::SeqCst), 2);
        assert!(last_error().contains("unsupported operand pairing"));
    }

    #[test]
    fn test_dynamic_matmul_releases_after_panic() {
        let counter = AtomicUsize::new(0);
        let a = [1.0f64, 2.0, 3.0];
        let b = [5.0f64, 6.0, 7.0, 8.0];
        let mut out = SKResultBuffer {
            data: std::ptr::null_mut(),
            len: 0,
            dtype: SKDType::F64,
        };
        let status = unsafe {
            sk_matmul(
                row_major_2x2(),
                tagged(&a, SKDType::F64, &counter),
                tagged(&b, SKDType::F64, &counter),
                &mut out,
            )
        };
        assert_eq!(status, SKStatus::ErrorInternal);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_dynamic_matmul_f64() {
        let counter = AtomicUsize::new(0);
        let a = [1.0f64, 2.0, 3.0, 4.0];
        let b = [5.0f64, 6.0, 7.0, 8.0];
        let mut out = SKResultBuffer {
            data: std::ptr::null_mut(),
            len: 0,
            dtype: SKDType::F64,
        };
        let params = SKMatMulParams {
            check_bounds: true,
            ..row_major_2x2()
        };
        let status = unsafe {
            sk_matmul(
                params,
                tagged(&a, SKDType::F64, &counter),
                tagged(&b, SKDType::F64, &counter),
                &mut out,
            )
        };
        assert_eq!(status, SKStatus::Ok);
        let c = unsafe { std::slice::from_raw_parts(out.data as *const f64, out.len) };
        assert_eq!(c, &[19.0, 22.0, 43.0, 50.0]);
        unsafe { sk_result_buffer_free(out) };
    }

    #[test]
    fn test_last_error_empty() {
        let _ = error::take_last_error();
        assert!(sk_last_error().is_null());
    }
}

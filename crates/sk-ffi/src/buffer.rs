use std::os::raw::c_void;

use half::f16;
use sk_core::{BufferRef, ResultBuffer};

use crate::types::{SKBuffer, SKDType, SKResultBuffer};

/// Borrow `len` elements starting at `data`.
///
/// Returns `None` for a null pointer with a non-zero length. A zero length
/// yields an empty slice whatever the pointer.
///
/// # Safety
/// A non-null `data` must point to `len` initialized `T`s that stay valid and
/// unmodified for `'a`.
pub unsafe fn borrow_slice<'a, T>(data: *const T, len: usize) -> Option<&'a [T]> {
    if len == 0 {
        return Some(&[]);
    }
    if data.is_null() {
        return None;
    }
    Some(std::slice::from_raw_parts(data, len))
}

/// Scoped borrow of a caller buffer.
///
/// The caller's release callback runs when the guard is dropped, so it fires
/// on every exit path of the entry point that acquired it, unwinding included.
pub struct BorrowedBuffer {
    raw: SKBuffer,
}

impl BorrowedBuffer {
    pub fn acquire(raw: SKBuffer) -> Self {
        Self { raw }
    }

    /// The buffer contents, tagged with their element type.
    ///
    /// # Safety
    /// `raw.data` must satisfy the contract of [`borrow_slice`] for
    /// `raw.len` elements of `raw.dtype` while the guard is alive.
    pub unsafe fn contents(&self) -> Option<BufferRef<'_>> {
        let SKBuffer { data, len, dtype, .. } = self.raw;
        let buf = match dtype {
            SKDType::I32 => BufferRef::I32(borrow_slice(data as *const i32, len)?),
            SKDType::I64 => BufferRef::I64(borrow_slice(data as *const i64, len)?),
            SKDType::F16 => BufferRef::F16(borrow_slice(data as *const f16, len)?),
            SKDType::F32 => BufferRef::F32(borrow_slice(data as *const f32, len)?),
            SKDType::F64 => BufferRef::F64(borrow_slice(data as *const f64, len)?),
        };
        Some(buf)
    }
}

impl Drop for BorrowedBuffer {
    fn drop(&mut self) {
        if let Some(release) = self.raw.release {
            release(self.raw.user_data);
        }
    }
}

fn into_raw_parts<T>(data: Vec<T>) -> (*mut c_void, usize) {
    let boxed = data.into_boxed_slice();
    let len = boxed.len();
    (Box::into_raw(boxed) as *mut T as *mut c_void, len)
}

/// # Safety
/// `data` and `len` must come from [`into_raw_parts`] for the same `T`.
unsafe fn drop_raw_parts<T>(data: *mut c_void, len: usize) {
    drop(Box::from_raw(std::ptr::slice_from_raw_parts_mut(
        data as *mut T,
        len,
    )));
}

impl From<ResultBuffer> for SKResultBuffer {
    fn from(buf: ResultBuffer) -> Self {
        let dtype = buf.dtype().into();
        let (data, len) = match buf {
            ResultBuffer::I32(v) => into_raw_parts(v),
            ResultBuffer::I64(v) => into_raw_parts(v),
            ResultBuffer::F16(v) => into_raw_parts(v),
            ResultBuffer::F32(v) => into_raw_parts(v),
            ResultBuffer::F64(v) => into_raw_parts(v),
        };
        Self { data, len, dtype }
    }
}

impl SKResultBuffer {
    /// Release the allocation. A null `data` is a no-op.
    ///
    /// # Safety
    /// `self` must have been produced by this crate and not freed before.
    pub unsafe fn free(self) {
        if self.data.is_null() {
            return;
        }
        match self.dtype {
            SKDType::I32 => drop_raw_parts::<i32>(self.data, self.len),
            SKDType::I64 => drop_raw_parts::<i64>(self.data, self.len),
            SKDType::F16 => drop_raw_parts::<f16>(self.data, self.len),
            SKDType::F32 => drop_raw_parts::<f32>(self.data, self.len),
            SKDType::F64 => drop_raw_parts::<f64>(self.data, self.len),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    extern "C" fn count_release(user_data: *mut c_void) {
        let counter = unsafe { &*(user_data as *const AtomicUsize) };
        counter.fetch_add(1, Ordering::SeqCst);
    }

    #[test]
    fn test_release_runs_on_drop() {
        let counter = AtomicUsize::new(0);
        let data = [1i32, 2, 3];
        let raw = SKBuffer {
            data: data.as_ptr() as *const c_void,
            len: data.len(),
            dtype: SKDType::I32,
            release: Some(count_release),
            user_data: &counter as *const AtomicUsize as *mut c_void,
        };
        {
            let guard = BorrowedBuffer::acquire(raw);
            let contents = unsafe { guard.contents() }.unwrap();
            assert_eq!(contents.len(), 3);
            assert_eq!(counter.load(Ordering::SeqCst), 0);
        }
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_null_data() {
        let raw = SKBuffer {
            data: std::ptr::null(),
            len: 4,
            dtype: SKDType::F32,
            release: None,
            user_data: std::ptr::null_mut(),
        };
        let guard = BorrowedBuffer::acquire(raw);
        assert!(unsafe { guard.contents() }.is_none());

        let empty = SKBuffer { len: 0, ..raw };
        let guard = BorrowedBuffer::acquire(empty);
        assert!(unsafe { guard.contents() }.unwrap().is_empty());
    }

    #[test]
    fn test_result_buffer_roundtrip() {
        let out = SKResultBuffer::from(ResultBuffer::F64(vec![1.0, 2.0, 3.0]));
        assert_eq!(out.len, 3);
        assert_eq!(out.dtype, SKDType::F64);
        let view = unsafe { std::slice::from_raw_parts(out.data as *const f64, out.len) };
        assert_eq!(view, &[1.0, 2.0, 3.0]);
        unsafe { out.free() };
    }

    #[test]
    fn test_empty_result_buffer_frees() {
        let out = SKResultBuffer::from(ResultBuffer::I32(Vec::new()));
        assert_eq!(out.len, 0);
        unsafe { out.free() };
    }
}

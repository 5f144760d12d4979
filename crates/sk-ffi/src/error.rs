use std::cell::RefCell;
use std::ffi::CString;

use sk_core::KernelError;

use crate::types::SKStatus;

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Store an error message for later retrieval via `sk_last_error`.
pub fn set_last_error(msg: String) {
    tracing::debug!(error = %msg, "ffi call failed");
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Take the last error message, leaving `None` in its place.
pub fn take_last_error() -> Option<CString> {
    LAST_ERROR.with(|e| e.borrow_mut().take())
}

/// Status code reported for a kernel error.
pub fn status_for(err: &KernelError) -> SKStatus {
    match err {
        KernelError::OutOfBounds { .. } | KernelError::OffsetOverflow => SKStatus::ErrorOutOfBounds,
        KernelError::DTypeMismatch { .. } | KernelError::UnsupportedPairing { .. } => {
            SKStatus::ErrorUnsupported
        }
        KernelError::LengthMismatch { .. } => SKStatus::ErrorInvalidArgument,
    }
}

/// Record `err` as the last error and return its status code.
pub fn report(err: KernelError) -> SKStatus {
    let status = status_for(&err);
    set_last_error(err.to_string());
    status
}

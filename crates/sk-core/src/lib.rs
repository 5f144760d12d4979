//! `sk-core` - Strided numeric kernels for a managed array library.
//!
//! This crate provides:
//! - `StridedView` / `MatrixView` addressing descriptors over flat buffers
//! - A strided inner-product kernel and a strided matrix-multiply kernel,
//!   generic over a `Promotion` policy per operand pairing
//! - Runtime dispatch over `DType`-tagged buffers
//! - Opt-in bounds validation for callers that cannot vouch for their views

pub mod checked;
pub mod dispatch;
pub mod dtype;
pub mod element;
pub mod error;
pub mod inner;
pub mod matmul;
pub mod promote;
pub mod storage;
pub mod view;

// Re-export primary types at the crate root for convenience.
pub use dispatch::Bounds;
pub use dtype::DType;
pub use element::{Element, FloatElement, IntElement};
pub use error::{KernelError, Result};
pub use inner::{inner_product, inner_product_bounded, InnerProductParams};
pub use matmul::{matmul, matmul_into, MatMulParams};
pub use promote::{FloatXFloat, FloatXInt, IntXFloat, IntXInt, MatMulPromotion, PairKind, Promotion};
pub use storage::{BufferRef, ResultBuffer, Scalar};
pub use view::{MatrixView, StridedView};

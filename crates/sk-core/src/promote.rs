//! Promotion policies for operand pairings.
//!
//! Each policy fixes the operand element types, the type products are
//! accumulated in, and how the accumulator is turned into the result. The
//! kernels are generic over [`Promotion`], so there is a single accumulation
//! loop for every pairing.

use std::fmt::Debug;
use std::marker::PhantomData;

use num_traits::{AsPrimitive, WrappingAdd, WrappingMul, Zero};

use crate::element::{Element, FloatElement, IntElement};

/// Coarse classification of an operand pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PairKind {
    IntInt,
    IntFloat,
    FloatFloat,
}

/// Rule for multiplying one `Left` by one `Right` and summing the products.
pub trait Promotion {
    type Left: Element;
    type Right: Element;
    type Acc: Copy + Debug;
    type Output: Element;

    const KIND: PairKind;

    fn zero() -> Self::Acc;

    /// Returns `acc + left * right` under this pairing's arithmetic.
    fn mul_add(acc: Self::Acc, left: Self::Left, right: Self::Right) -> Self::Acc;

    fn finish(acc: Self::Acc) -> Self::Output;
}

/// Pairings the matrix-multiply kernel accepts.
///
/// Only same-kind pairings qualify; there is no mixed integer/floating
/// matrix multiply.
pub trait MatMulPromotion: Promotion {}

/// Integer × integer: products and the running sum are formed in the wide
/// type with wrapping arithmetic, then truncated to `T`.
#[derive(Debug)]
pub struct IntXInt<T>(PhantomData<fn() -> T>);

impl<T: IntElement> Promotion for IntXInt<T> {
    type Left = T;
    type Right = T;
    type Acc = T::Wide;
    type Output = T;

    const KIND: PairKind = PairKind::IntInt;

    fn zero() -> T::Wide {
        T::Wide::zero()
    }

    fn mul_add(acc: T::Wide, left: T, right: T) -> T::Wide {
        acc.wrapping_add(&left.widen().wrapping_mul(&right.widen()))
    }

    fn finish(acc: T::Wide) -> T {
        T::narrow(acc)
    }
}

impl<T: IntElement> MatMulPromotion for IntXInt<T> {}

/// Integer × floating: the integer is converted to the floating accumulator
/// before the multiply.
#[derive(Debug)]
pub struct IntXFloat<I, F>(PhantomData<fn() -> (I, F)>);

impl<I, F> Promotion for IntXFloat<I, F>
where
    I: IntElement + AsPrimitive<F::Acc>,
    F: FloatElement,
{
    type Left = I;
    type Right = F;
    type Acc = F::Acc;
    type Output = F;

    const KIND: PairKind = PairKind::IntFloat;

    fn zero() -> F::Acc {
        F::Acc::zero()
    }

    fn mul_add(acc: F::Acc, left: I, right: F) -> F::Acc {
        acc + <I as AsPrimitive<F::Acc>>::as_(left) * right.to_acc()
    }

    fn finish(acc: F::Acc) -> F {
        F::from_acc(acc)
    }
}

/// Floating × integer, the mirror of [`IntXFloat`] with the floating
/// operand on the left.
#[derive(Debug)]
pub struct FloatXInt<F, I>(PhantomData<fn() -> (F, I)>);

impl<F, I> Promotion for FloatXInt<F, I>
where
    F: FloatElement,
    I: IntElement + AsPrimitive<F::Acc>,
{
    type Left = F;
    type Right = I;
    type Acc = F::Acc;
    type Output = F;

    const KIND: PairKind = PairKind::IntFloat;

    fn zero() -> F::Acc {
        F::Acc::zero()
    }

    fn mul_add(acc: F::Acc, left: F, right: I) -> F::Acc {
        acc + left.to_acc() * <I as AsPrimitive<F::Acc>>::as_(right)
    }

    fn finish(acc: F::Acc) -> F {
        F::from_acc(acc)
    }
}

/// Floating × floating: native accumulation in `F::Acc`.
#[derive(Debug)]
pub struct FloatXFloat<F>(PhantomData<fn() -> F>);

impl<F: FloatElement> Promotion for FloatXFloat<F> {
    type Left = F;
    type Right = F;
    type Acc = F::Acc;
    type Output = F;

    const KIND: PairKind = PairKind::FloatFloat;

    fn zero() -> F::Acc {
        F::Acc::zero()
    }

    fn mul_add(acc: F::Acc, left: F, right: F) -> F::Acc {
        acc + left.to_acc() * right.to_acc()
    }

    fn finish(acc: F::Acc) -> F {
        F::from_acc(acc)
    }
}

impl<F: FloatElement> MatMulPromotion for FloatXFloat<F> {}

#[cfg(test)]
mod tests {
    use super::*;
    use half::f16;

    fn sum<P: Promotion>(pairs: &[(P::Left, P::Right)]) -> P::Output {
        P::finish(
            pairs
                .iter()
                .fold(P::zero(), |acc, &(l, r)| P::mul_add(acc, l, r)),
        )
    }

    #[test]
    fn test_int_products_do_not_overflow_before_narrowing() {
        // 65536 * 65536 overflows i32 but the wide sum subtracts it back out.
        let pairs = [(65536i32, 65536i32), (-65536, 65536), (3, 4)];
        assert_eq!(sum::<IntXInt<i32>>(&pairs), 12);
    }

    #[test]
    fn test_int_result_truncates() {
        let pairs = [(i32::MAX, 1i32), (1, 1)];
        assert_eq!(sum::<IntXInt<i32>>(&pairs), i32::MIN);
    }

    #[test]
    fn test_mixed_promotes_integer() {
        let pairs = [(3i32, 0.5f32), (1, 0.25)];
        assert_eq!(sum::<IntXFloat<i32, f32>>(&pairs), 1.75);
        let pairs = [(0.5f64, 3i64), (0.25, 1)];
        assert_eq!(sum::<FloatXInt<f64, i64>>(&pairs), 1.75);
    }

    #[test]
    fn test_f16_sum_narrows_once() {
        let pairs = [(f16::from_f32(1.5), f16::from_f32(2.0)); 4];
        assert_eq!(sum::<FloatXFloat<f16>>(&pairs), f16::from_f32(12.0));
    }

    #[test]
    fn test_kinds() {
        assert_eq!(IntXInt::<i64>::KIND, PairKind::IntInt);
        assert_eq!(IntXFloat::<i32, f64>::KIND, PairKind::IntFloat);
        assert_eq!(FloatXInt::<f32, i32>::KIND, PairKind::IntFloat);
        assert_eq!(FloatXFloat::<f32>::KIND, PairKind::FloatFloat);
    }
}

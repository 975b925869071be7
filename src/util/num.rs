use num_traits::{CheckedRem, Float, PrimInt, WrappingAdd, WrappingSub};

use crate::{error::RuntimeError, interpreter::evaluator::core::EvalResult};

/// Floor remainder of two floats: the result has the sign of `y`.
///
/// For `y > 0` the result lies in `[0, y)`. A zero `y` gives `NaN`, as the
/// underlying IEEE remainder does.
///
/// ## Example
/// ```
/// use luxcore::util::num::famod;
///
/// assert_eq!(famod(-1.0, 3.0), 2.0);
/// assert_eq!(famod(7.5, 2.0), 1.5);
/// assert_eq!(famod(1.0, -3.0), -2.0);
/// ```
#[must_use]
pub fn famod<T: Float>(x: T, y: T) -> T {
    let r = x % y;
    if r != T::zero() && (r < T::zero()) != (y < T::zero()) {
        let shifted = r + y;
        // a tiny negative r rounds up to y itself
        if shifted == y { T::zero() } else { shifted }
    } else {
        r
    }
}

/// Symmetric remainder of two floats, in `(-|y|/2, |y|/2]`.
///
/// ## Example
/// ```
/// use luxcore::util::num::fasmod;
///
/// assert_eq!(fasmod(-1.0, 3.0), -1.0);
/// assert_eq!(fasmod(2.0, 4.0), 2.0);
/// assert_eq!(fasmod(5.0, 4.0), 1.0);
/// ```
#[must_use]
pub fn fasmod<T: Float>(x: T, y: T) -> T {
    let ay = y.abs();
    let r = famod(x, ay);
    if r + r > ay { r - ay } else { r }
}

/// Float quotient rounded toward negative infinity, paired with [`famod`]
/// so that `ffloor_div(x, y) * y + famod(x, y)` reproduces `x`.
///
/// A zero or non-finite operand falls back to `floor(x / y)`.
///
/// ## Example
/// ```
/// use luxcore::util::num::{famod, ffloor_div};
///
/// assert_eq!(ffloor_div(-7.0, 2.0), -4.0);
/// assert_eq!(ffloor_div(1.0, 0.1), 9.0);
/// assert!((ffloor_div(1.0_f64, 0.1) * 0.1 + famod(1.0_f64, 0.1) - 1.0).abs() < 1e-15);
/// ```
#[must_use]
pub fn ffloor_div<T: Float>(x: T, y: T) -> T {
    let r = famod(x, y);
    if r.is_nan() { (x / y).floor() } else { ((x - r) / y).round() }
}

/// Integer quotient rounded toward negative infinity.
///
/// Division by zero gives zero. The one overflowing case (`MIN / -1`) wraps
/// to `MIN`.
///
/// ## Example
/// ```
/// use luxcore::util::num::ifloor_div;
///
/// assert_eq!(ifloor_div(-7_i32, 2), -4);
/// assert_eq!(ifloor_div(7_i32, -2), -4);
/// assert_eq!(ifloor_div(7_i32, 0), 0);
/// ```
#[must_use]
pub fn ifloor_div<T: PrimInt + CheckedRem>(x: T, y: T) -> T {
    if y.is_zero() {
        return T::zero();
    }
    let Some(q) = x.checked_div(&y) else {
        return x;
    };
    let r = x.checked_rem(&y).unwrap_or_else(T::zero);
    if !r.is_zero() && (r < T::zero()) != (y < T::zero()) { q - T::one() } else { q }
}

/// Integer floor remainder: the result has the sign of `y`.
///
/// Modulus by zero gives zero.
///
/// ## Example
/// ```
/// use luxcore::util::num::iamod;
///
/// assert_eq!(iamod(-1_i64, 3), 2);
/// assert_eq!(iamod(1_i64, -3), -2);
/// assert_eq!(iamod(200_u8, 7), 4);
/// assert_eq!(iamod(5_i16, 0), 0);
/// ```
#[must_use]
pub fn iamod<T: PrimInt + CheckedRem + WrappingAdd>(x: T, y: T) -> T {
    if y.is_zero() {
        return T::zero();
    }
    let r = x.checked_rem(&y).unwrap_or_else(T::zero);
    if !r.is_zero() && (r < T::zero()) != (y < T::zero()) { r.wrapping_add(&y) } else { r }
}

/// Integer symmetric remainder, in `(-|y|/2, |y|/2]`.
///
/// Computed without forming `|y|`, so `MIN` divisors do not overflow. For
/// unsigned types a negative result wraps; the engine computes `Byte`
/// operands as `Int16` instead.
///
/// ## Example
/// ```
/// use luxcore::util::num::iasmod;
///
/// assert_eq!(iasmod(-1_i32, 3), -1);
/// assert_eq!(iasmod(-1_i32, -3), -1);
/// assert_eq!(iasmod(2_i32, 4), 2);
/// assert_eq!(iasmod(3_i32, 4), -1);
/// ```
#[must_use]
pub fn iasmod<T: PrimInt + CheckedRem + WrappingAdd + WrappingSub>(x: T, y: T) -> T {
    let r = iamod(x, y);
    if r.is_zero() {
        return r;
    }
    if y > T::zero() {
        if r > y - r { r.wrapping_sub(&y) } else { r }
    } else {
        // r lies in (y, 0); rp is the matching remainder in (0, |y|)
        let rp = r.wrapping_sub(&y);
        if rp.wrapping_add(&r) > T::zero() { r } else { rp }
    }
}

/// Resolves a signed subscript against a dimension of `size` elements.
///
/// ## Errors
/// Returns `SubscriptOutOfRange` unless `0 <= index < size`.
///
/// ## Example
/// ```
/// use luxcore::util::num::checked_index;
///
/// assert_eq!(checked_index(2, 3).unwrap(), 2);
/// assert!(checked_index(3, 3).is_err());
/// assert!(checked_index(-1, 3).is_err());
/// ```
pub fn checked_index(index: i64, size: usize) -> EvalResult<usize> {
    usize::try_from(index).ok()
                          .filter(|&i| i < size)
                          .ok_or(RuntimeError::SubscriptOutOfRange { index, size })
}

/// Converts a count to `i64`, saturating at `i64::MAX`.
#[must_use]
pub fn usize_to_i64(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

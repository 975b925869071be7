use ordered_float::OrderedFloat;

use crate::{
    ast::BinaryOperator,
    interpreter::value::{complex::ComplexNumber, element::Element},
    util::num::{famod, fasmod, ffloor_div, iamod, iasmod, ifloor_div},
};

/// Element-level operator implementations for one element type.
///
/// `arithmetic` covers every operator whose result has the operand type;
/// `comparison` covers the six comparisons. Either returns `None` for an
/// operator the type does not support, which the engine reports as an
/// illegal type combination.
pub trait Arithmetic: Element {
    /// The function computing `a op b`.
    fn arithmetic(op: BinaryOperator) -> Option<fn(Self, Self) -> Self>;

    /// The function computing the truth of `a op b`.
    fn comparison(op: BinaryOperator) -> Option<fn(Self, Self) -> bool>;
}

macro_rules! impl_integer_arithmetic {
    ($($t:ty),*) => {
        $(
            impl Arithmetic for $t {
                fn arithmetic(op: BinaryOperator) -> Option<fn(Self, Self) -> Self> {
                    let f: fn(Self, Self) -> Self = match op {
                        BinaryOperator::Add => |a, b| a.wrapping_add(b),
                        BinaryOperator::Sub => |a, b| a.wrapping_sub(b),
                        BinaryOperator::Mul => |a, b| a.wrapping_mul(b),
                        BinaryOperator::Div => |a, b| if b == 0 { 0 } else { a.wrapping_div(b) },
                        BinaryOperator::IntDivFloor => ifloor_div,
                        BinaryOperator::Mod => iamod,
                        BinaryOperator::SymmetricMod => iasmod,
                        BinaryOperator::Max => |a, b| if a > b { a } else { b },
                        BinaryOperator::Min => |a, b| if a < b { a } else { b },
                        BinaryOperator::Or => |a, b| a | b,
                        BinaryOperator::And => |a, b| a & b,
                        BinaryOperator::Xor => |a, b| a ^ b,
                        _ => return None,
                    };
                    Some(f)
                }

                fn comparison(op: BinaryOperator) -> Option<fn(Self, Self) -> bool> {
                    real_comparison(op)
                }
            }
        )*
    };
}

macro_rules! impl_float_arithmetic {
    ($($t:ty),*) => {
        $(
            impl Arithmetic for $t {
                fn arithmetic(op: BinaryOperator) -> Option<fn(Self, Self) -> Self> {
                    let f: fn(Self, Self) -> Self = match op {
                        BinaryOperator::Add => |a, b| a + b,
                        BinaryOperator::Sub => |a, b| a - b,
                        BinaryOperator::Mul => |a, b| a * b,
                        BinaryOperator::Div => |a, b| a / b,
                        BinaryOperator::IntDivFloor => ffloor_div,
                        BinaryOperator::Mod => famod,
                        BinaryOperator::SymmetricMod => fasmod,
                        BinaryOperator::Max => |a, b| if a > b { a } else { b },
                        BinaryOperator::Min => |a, b| if a < b { a } else { b },
                        BinaryOperator::Pow => <$t>::powf,
                        _ => return None,
                    };
                    Some(f)
                }

                fn comparison(op: BinaryOperator) -> Option<fn(Self, Self) -> bool> {
                    real_comparison(op)
                }
            }
        )*
    };
}

macro_rules! impl_complex_arithmetic {
    ($($t:ty),*) => {
        $(
            impl Arithmetic for ComplexNumber<$t> {
                fn arithmetic(op: BinaryOperator) -> Option<fn(Self, Self) -> Self> {
                    let f: fn(Self, Self) -> Self = match op {
                        BinaryOperator::Add => |a, b| a + b,
                        BinaryOperator::Sub => |a, b| a - b,
                        BinaryOperator::Mul => |a, b| a * b,
                        BinaryOperator::Div => |a, b| a / b,
                        BinaryOperator::IntDivFloor => |a, b| (a / b).floor(),
                        BinaryOperator::Mod | BinaryOperator::SymmetricMod => complex_mod,
                        BinaryOperator::Max => |a, b| {
                            if OrderedFloat(a.norm_sqr()) > OrderedFloat(b.norm_sqr()) { a } else { b }
                        },
                        BinaryOperator::Min => |a, b| {
                            if OrderedFloat(a.norm_sqr()) < OrderedFloat(b.norm_sqr()) { a } else { b }
                        },
                        BinaryOperator::Pow => ComplexNumber::powc,
                        _ => return None,
                    };
                    Some(f)
                }

                fn comparison(op: BinaryOperator) -> Option<fn(Self, Self) -> bool> {
                    let f: fn(Self, Self) -> bool = match op {
                        BinaryOperator::Eq => |a, b| a == b,
                        BinaryOperator::Ne => |a, b| a != b,
                        BinaryOperator::Gt => |a, b| OrderedFloat(a.norm_sqr()) > OrderedFloat(b.norm_sqr()),
                        BinaryOperator::Ge => |a, b| OrderedFloat(a.norm_sqr()) >= OrderedFloat(b.norm_sqr()),
                        BinaryOperator::Lt => |a, b| OrderedFloat(a.norm_sqr()) < OrderedFloat(b.norm_sqr()),
                        BinaryOperator::Le => |a, b| OrderedFloat(a.norm_sqr()) <= OrderedFloat(b.norm_sqr()),
                        _ => return None,
                    };
                    Some(f)
                }
            }
        )*
    };
}

impl_integer_arithmetic!(u8, i16, i32, i64);
impl_float_arithmetic!(f32, f64);
impl_complex_arithmetic!(f32, f64);

/// The comparisons of real element types.
pub(crate) fn real_comparison<T: PartialOrd>(op: BinaryOperator) -> Option<fn(T, T) -> bool> {
    let f: fn(T, T) -> bool = match op {
        BinaryOperator::Eq => |a, b| a == b,
        BinaryOperator::Ne => |a, b| a != b,
        BinaryOperator::Gt => |a, b| a > b,
        BinaryOperator::Ge => |a, b| a >= b,
        BinaryOperator::Lt => |a, b| a < b,
        BinaryOperator::Le => |a, b| a <= b,
        _ => return None,
    };
    Some(f)
}

/// Complex remainder `x - n*y`, where `n` is the Gaussian integer nearest to
/// `x / y`. The quotient is formed from the polar forms of both operands.
///
/// # Example
/// ```
/// use luxcore::interpreter::{evaluator::binary::kernel::complex_mod, value::complex::ComplexNumber};
///
/// let r = complex_mod(ComplexNumber::new(5.0_f64, 0.0), ComplexNumber::new(3.0, 0.0));
/// assert!((r.real + 1.0).abs() < 1e-12);
/// assert!(r.imaginary.abs() < 1e-12);
/// ```
#[must_use]
pub fn complex_mod<T: num_traits::Float>(x: ComplexNumber<T>, y: ComplexNumber<T>) -> ComplexNumber<T> {
    let quotient = ComplexNumber::from_polar(x.abs() / y.abs(), x.arg() - y.arg());
    x - quotient.round() * y
}

/// `out[i] = f(l[i], r[i])` over two slices of equal length.
pub fn array_array<T: Copy, U>(l: &[T], r: &[T], out: &mut [U], f: impl Fn(T, T) -> U) {
    for ((o, &a), &b) in out.iter_mut().zip(l).zip(r) {
        *o = f(a, b);
    }
}

/// `out[i] = f(l[i], b)`.
pub fn array_scalar<T: Copy, U>(l: &[T], b: T, out: &mut [U], f: impl Fn(T, T) -> U) {
    for (o, &a) in out.iter_mut().zip(l) {
        *o = f(a, b);
    }
}

/// `out[i] = f(a, r[i])`.
pub fn scalar_array<T: Copy, U>(a: T, r: &[T], out: &mut [U], f: impl Fn(T, T) -> U) {
    for (o, &b) in out.iter_mut().zip(r) {
        *o = f(a, b);
    }
}

/// `l[i] = f(l[i], r[i])`, reusing the left buffer for the result.
pub fn array_array_in_place<T: Copy>(l: &mut [T], r: &[T], f: impl Fn(T, T) -> T) {
    for (a, &b) in l.iter_mut().zip(r) {
        *a = f(*a, b);
    }
}

/// `r[i] = f(l[i], r[i])`, reusing the right buffer for the result.
pub fn array_array_in_place_right<T: Copy>(l: &[T], r: &mut [T], f: impl Fn(T, T) -> T) {
    for (b, &a) in r.iter_mut().zip(l) {
        *b = f(a, *b);
    }
}

/// `l[i] = f(l[i], b)`, reusing the left buffer for the result.
pub fn array_scalar_in_place<T: Copy>(l: &mut [T], b: T, f: impl Fn(T, T) -> T) {
    for a in l {
        *a = f(*a, b);
    }
}

/// `r[i] = f(a, r[i])`, reusing the right buffer for the result.
pub fn scalar_array_in_place<T: Copy>(a: T, r: &mut [T], f: impl Fn(T, T) -> T) {
    for b in r {
        *b = f(a, *b);
    }
}

/// Turns a truth value into the 32-bit integer the comparisons yield.
#[must_use]
pub const fn truth(value: bool) -> i32 {
    if value { 1 } else { 0 }
}

use std::{borrow::Cow, fmt::Debug};

use num_traits::AsPrimitive;

use crate::interpreter::{
    types::ElementType,
    value::{
        complex::ComplexNumber,
        core::{ArrayData, Scalar},
    },
};

/// A numeric element type that can live in an array buffer.
///
/// Each implementation ties a Rust type to its [`ElementType`] tag and knows
/// how to read any other numeric element as itself. The `from_*`
/// conversions are lossless when moving up the promotion lattice; moving
/// down (which only happens on an explicit cast) follows `as`: floats
/// truncate toward zero and saturate, integers wrap, and imaginary parts are
/// dropped.
pub trait Element: Copy + PartialEq + Debug + Default + 'static {
    /// The tag of this element type.
    const TYPE: ElementType;

    /// Converts an integer element.
    fn from_i64(value: i64) -> Self;

    /// Converts a real float element.
    fn from_f64(value: f64) -> Self;

    /// Converts a complex element.
    fn from_complex(value: ComplexNumber<f64>) -> Self;

    /// Wraps the value as a scalar.
    fn into_scalar(self) -> Scalar;

    /// Borrows the buffer if it already holds elements of this type.
    fn slice(data: &ArrayData) -> Option<&[Self]>;

    /// Mutably borrows the buffer if it already holds elements of this type.
    fn slice_mut(data: &mut ArrayData) -> Option<&mut [Self]>;

    /// Wraps a vector of elements as a typed buffer.
    fn wrap(values: Vec<Self>) -> ArrayData;
}

macro_rules! impl_real_element {
    ($t:ty, $variant:ident) => {
        impl Element for $t {
            const TYPE: ElementType = ElementType::$variant;

            fn from_i64(value: i64) -> Self {
                value.as_()
            }

            fn from_f64(value: f64) -> Self {
                value.as_()
            }

            fn from_complex(value: ComplexNumber<f64>) -> Self {
                value.real.as_()
            }

            fn into_scalar(self) -> Scalar {
                Scalar::$variant(self)
            }

            fn slice(data: &ArrayData) -> Option<&[Self]> {
                match data {
                    ArrayData::$variant(values) => Some(values),
                    _ => None,
                }
            }

            fn slice_mut(data: &mut ArrayData) -> Option<&mut [Self]> {
                match data {
                    ArrayData::$variant(values) => Some(values),
                    _ => None,
                }
            }

            fn wrap(values: Vec<Self>) -> ArrayData {
                ArrayData::$variant(values)
            }
        }
    };
}

macro_rules! impl_complex_element {
    ($t:ty, $variant:ident) => {
        impl Element for ComplexNumber<$t> {
            const TYPE: ElementType = ElementType::$variant;

            fn from_i64(value: i64) -> Self {
                Self::from_real(value.as_())
            }

            fn from_f64(value: f64) -> Self {
                Self::from_real(value.as_())
            }

            fn from_complex(value: ComplexNumber<f64>) -> Self {
                Self::new(value.real.as_(), value.imaginary.as_())
            }

            fn into_scalar(self) -> Scalar {
                Scalar::$variant(self)
            }

            fn slice(data: &ArrayData) -> Option<&[Self]> {
                match data {
                    ArrayData::$variant(values) => Some(values),
                    _ => None,
                }
            }

            fn slice_mut(data: &mut ArrayData) -> Option<&mut [Self]> {
                match data {
                    ArrayData::$variant(values) => Some(values),
                    _ => None,
                }
            }

            fn wrap(values: Vec<Self>) -> ArrayData {
                ArrayData::$variant(values)
            }
        }
    };
}

impl_real_element!(u8, Byte);
impl_real_element!(i16, Int16);
impl_real_element!(i32, Int32);
impl_real_element!(i64, Int64);
impl_real_element!(f32, Float);
impl_real_element!(f64, Double);
impl_complex_element!(f32, CFloat);
impl_complex_element!(f64, CDouble);

/// Reads a numeric buffer as a vector of `T`, converting every element.
///
/// Returns `None` for string buffers.
///
/// # Example
/// ```
/// use luxcore::interpreter::value::{core::ArrayData, element::convert_values};
///
/// let bytes = ArrayData::Byte(vec![1, 2, 255]);
/// assert_eq!(convert_values::<f64>(&bytes), Some(vec![1.0, 2.0, 255.0]));
/// ```
#[must_use]
pub fn convert_values<T: Element>(data: &ArrayData) -> Option<Vec<T>> {
    Some(match data {
             ArrayData::Byte(v) => v.iter().map(|&x| T::from_i64(i64::from(x))).collect(),
             ArrayData::Int16(v) => v.iter().map(|&x| T::from_i64(i64::from(x))).collect(),
             ArrayData::Int32(v) => v.iter().map(|&x| T::from_i64(i64::from(x))).collect(),
             ArrayData::Int64(v) => v.iter().map(|&x| T::from_i64(x)).collect(),
             ArrayData::Float(v) => v.iter().map(|&x| T::from_f64(f64::from(x))).collect(),
             ArrayData::Double(v) => v.iter().map(|&x| T::from_f64(x)).collect(),
             ArrayData::CFloat(v) => v.iter().map(|&x| T::from_complex(x.into())).collect(),
             ArrayData::CDouble(v) => v.iter().map(|&x| T::from_complex(x)).collect(),
             ArrayData::String(_) => return None,
         })
}

/// Reads a numeric buffer as a slice of `T`, borrowing when the buffer
/// already has that element type and converting otherwise.
#[must_use]
pub fn values<T: Element>(data: &ArrayData) -> Option<Cow<'_, [T]>> {
    match T::slice(data) {
        Some(values) => Some(Cow::Borrowed(values)),
        None => convert_values(data).map(Cow::Owned),
    }
}

/// Reads a scalar as a value of element type `T`.
///
/// # Example
/// ```
/// use luxcore::interpreter::value::{core::Scalar, element::scalar_value};
///
/// assert_eq!(scalar_value::<i32>(Scalar::Byte(3)), 3);
/// assert_eq!(scalar_value::<f64>(Scalar::Float(0.5)), 0.5);
/// ```
#[must_use]
pub fn scalar_value<T: Element>(scalar: Scalar) -> T {
    match scalar {
        Scalar::Byte(x) => T::from_i64(i64::from(x)),
        Scalar::Int16(x) => T::from_i64(i64::from(x)),
        Scalar::Int32(x) => T::from_i64(i64::from(x)),
        Scalar::Int64(x) => T::from_i64(x),
        Scalar::Float(x) => T::from_f64(f64::from(x)),
        Scalar::Double(x) => T::from_f64(x),
        Scalar::CFloat(x) => T::from_complex(x.into()),
        Scalar::CDouble(x) => T::from_complex(x),
    }
}

/// Runs `$body` with the type alias `$t` bound to the Rust type of a numeric
/// [`ElementType`].
///
/// `$on_string` is evaluated for `ElementType::String`. This is how one
/// generic routine is instantiated once per element type instead of
/// repeating the routine for every type.
#[macro_export]
macro_rules! dispatch_numeric {
    ($ty:expr, $t:ident => $body:expr, string => $on_string:expr) => {
        match $ty {
            $crate::interpreter::types::ElementType::Byte => {
                type $t = u8;
                $body
            },
            $crate::interpreter::types::ElementType::Int16 => {
                type $t = i16;
                $body
            },
            $crate::interpreter::types::ElementType::Int32 => {
                type $t = i32;
                $body
            },
            $crate::interpreter::types::ElementType::Int64 => {
                type $t = i64;
                $body
            },
            $crate::interpreter::types::ElementType::Float => {
                type $t = f32;
                $body
            },
            $crate::interpreter::types::ElementType::Double => {
                type $t = f64;
                $body
            },
            $crate::interpreter::types::ElementType::CFloat => {
                type $t = $crate::interpreter::value::complex::ComplexNumber<f32>;
                $body
            },
            $crate::interpreter::types::ElementType::CDouble => {
                type $t = $crate::interpreter::value::complex::ComplexNumber<f64>;
                $body
            },
            $crate::interpreter::types::ElementType::String => $on_string,
        }
    };
}

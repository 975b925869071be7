use std::fmt::Display;

use smallvec::SmallVec;

use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::core::EvalResult,
        types::ElementType,
        value::{
            complex::ComplexNumber,
            element::{Element, convert_values, scalar_value},
        },
    },
};

/// The largest number of dimensions an array may have.
pub const MAX_DIMS: usize = 8;

/// The dimensions of an array. The first dimension varies fastest.
pub type Dims = SmallVec<[usize; MAX_DIMS]>;

/// A single numeric value, stored inline in its symbol.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    /// Unsigned 8-bit integer.
    Byte(u8),
    /// Signed 16-bit integer.
    Int16(i16),
    /// Signed 32-bit integer.
    Int32(i32),
    /// Signed 64-bit integer.
    Int64(i64),
    /// 32-bit float.
    Float(f32),
    /// 64-bit float.
    Double(f64),
    /// Complex number with 32-bit parts.
    CFloat(ComplexNumber<f32>),
    /// Complex number with 64-bit parts.
    CDouble(ComplexNumber<f64>),
}

impl Scalar {
    /// Returns the element type tag of the value.
    #[must_use]
    pub const fn element_type(&self) -> ElementType {
        match self {
            Self::Byte(_) => ElementType::Byte,
            Self::Int16(_) => ElementType::Int16,
            Self::Int32(_) => ElementType::Int32,
            Self::Int64(_) => ElementType::Int64,
            Self::Float(_) => ElementType::Float,
            Self::Double(_) => ElementType::Double,
            Self::CFloat(_) => ElementType::CFloat,
            Self::CDouble(_) => ElementType::CDouble,
        }
    }

    /// Reads the value as a real `f64`, or `None` for complex values.
    ///
    /// # Example
    /// ```
    /// use luxcore::interpreter::value::core::Scalar;
    ///
    /// assert_eq!(Scalar::Int16(-4).as_real(), Some(-4.0));
    /// assert_eq!(Scalar::Float(0.25).as_real(), Some(0.25));
    /// ```
    #[must_use]
    pub fn as_real(&self) -> Option<f64> {
        if self.element_type().is_complex() {
            None
        } else {
            Some(scalar_value::<f64>(*self))
        }
    }

    /// Reads the value as an index: integers as they are, real floats
    /// truncated toward zero. Complex values give `None`.
    #[must_use]
    pub fn as_index(&self) -> Option<i64> {
        if self.element_type().is_complex() {
            None
        } else {
            Some(scalar_value::<i64>(*self))
        }
    }

    /// Converts the value to another numeric element type.
    ///
    /// Widening is lossless. Narrowing follows `as`: floats truncate toward
    /// zero and saturate at the bounds of the target, integers wrap, and
    /// imaginary parts are dropped. Returns `None` only when `ty` is
    /// `String`.
    ///
    /// # Example
    /// ```
    /// use luxcore::interpreter::{types::ElementType, value::core::Scalar};
    ///
    /// assert_eq!(Scalar::Double(-2.75).cast(ElementType::Int32), Some(Scalar::Int32(-2)));
    /// assert_eq!(Scalar::Byte(7).cast(ElementType::Double), Some(Scalar::Double(7.0)));
    /// ```
    #[must_use]
    pub fn cast(self, ty: ElementType) -> Option<Self> {
        crate::dispatch_numeric!(ty,
                                 T => Some(scalar_value::<T>(self).into_scalar()),
                                 string => None)
    }
}

impl Display for Scalar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Byte(x) => write!(f, "{x}"),
            Self::Int16(x) => write!(f, "{x}"),
            Self::Int32(x) => write!(f, "{x}"),
            Self::Int64(x) => write!(f, "{x}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Double(x) => write!(f, "{x}"),
            Self::CFloat(x) => write!(f, "{x}"),
            Self::CDouble(x) => write!(f, "{x}"),
        }
    }
}

macro_rules! scalar_from {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$t> for Scalar {
                fn from(value: $t) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

scalar_from! {
    u8 => Byte,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    f32 => Float,
    f64 => Double,
    ComplexNumber<f32> => CFloat,
    ComplexNumber<f64> => CDouble,
}

/// The element buffer of an array, typed by element.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayData {
    /// Unsigned 8-bit integers.
    Byte(Vec<u8>),
    /// Signed 16-bit integers.
    Int16(Vec<i16>),
    /// Signed 32-bit integers.
    Int32(Vec<i32>),
    /// Signed 64-bit integers.
    Int64(Vec<i64>),
    /// 32-bit floats.
    Float(Vec<f32>),
    /// 64-bit floats.
    Double(Vec<f64>),
    /// Complex numbers with 32-bit parts.
    CFloat(Vec<ComplexNumber<f32>>),
    /// Complex numbers with 64-bit parts.
    CDouble(Vec<ComplexNumber<f64>>),
    /// Strings.
    String(Vec<String>),
}

impl Default for ArrayData {
    fn default() -> Self {
        Self::Byte(Vec::new())
    }
}

impl ArrayData {
    /// Returns a buffer of `len` zero elements (empty strings for `String`).
    #[must_use]
    pub fn zeros(ty: ElementType, len: usize) -> Self {
        crate::dispatch_numeric!(ty,
                                 T => T::wrap(vec![T::default(); len]),
                                 string => Self::String(vec![String::new(); len]))
    }

    /// Returns a one-element buffer holding `scalar`.
    #[must_use]
    pub fn from_scalar(scalar: Scalar) -> Self {
        match scalar {
            Scalar::Byte(x) => Self::Byte(vec![x]),
            Scalar::Int16(x) => Self::Int16(vec![x]),
            Scalar::Int32(x) => Self::Int32(vec![x]),
            Scalar::Int64(x) => Self::Int64(vec![x]),
            Scalar::Float(x) => Self::Float(vec![x]),
            Scalar::Double(x) => Self::Double(vec![x]),
            Scalar::CFloat(x) => Self::CFloat(vec![x]),
            Scalar::CDouble(x) => Self::CDouble(vec![x]),
        }
    }

    /// Returns the element type tag of the buffer.
    #[must_use]
    pub const fn element_type(&self) -> ElementType {
        match self {
            Self::Byte(_) => ElementType::Byte,
            Self::Int16(_) => ElementType::Int16,
            Self::Int32(_) => ElementType::Int32,
            Self::Int64(_) => ElementType::Int64,
            Self::Float(_) => ElementType::Float,
            Self::Double(_) => ElementType::Double,
            Self::CFloat(_) => ElementType::CFloat,
            Self::CDouble(_) => ElementType::CDouble,
            Self::String(_) => ElementType::String,
        }
    }

    /// Returns the number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Byte(v) => v.len(),
            Self::Int16(v) => v.len(),
            Self::Int32(v) => v.len(),
            Self::Int64(v) => v.len(),
            Self::Float(v) => v.len(),
            Self::Double(v) => v.len(),
            Self::CFloat(v) => v.len(),
            Self::CDouble(v) => v.len(),
            Self::String(v) => v.len(),
        }
    }

    /// Returns `true` if the buffer holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the size of the buffer in bytes.
    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.len() * self.element_type().size()
    }

    /// Returns element `index` as a scalar, or `None` if it is out of range
    /// or the buffer holds strings.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Scalar> {
        match self {
            Self::Byte(v) => v.get(index).map(|&x| x.into()),
            Self::Int16(v) => v.get(index).map(|&x| x.into()),
            Self::Int32(v) => v.get(index).map(|&x| x.into()),
            Self::Int64(v) => v.get(index).map(|&x| x.into()),
            Self::Float(v) => v.get(index).map(|&x| x.into()),
            Self::Double(v) => v.get(index).map(|&x| x.into()),
            Self::CFloat(v) => v.get(index).map(|&x| x.into()),
            Self::CDouble(v) => v.get(index).map(|&x| x.into()),
            Self::String(_) => None,
        }
    }

    /// Converts every element to `ty`.
    ///
    /// Returns `None` when converting between strings and numbers.
    #[must_use]
    pub fn cast(&self, ty: ElementType) -> Option<Self> {
        if ty == self.element_type() {
            return Some(self.clone());
        }
        crate::dispatch_numeric!(ty,
                                 T => convert_values::<T>(self).map(T::wrap),
                                 string => None)
    }

    /// Gathers the elements at `indices`, in order, into a new buffer.
    ///
    /// Every index must be in range; callers check subscripts before they
    /// gather.
    #[must_use]
    pub fn gather(&self, indices: &[usize]) -> Self {
        fn pick<T: Clone>(values: &[T], indices: &[usize]) -> Vec<T> {
            indices.iter().map(|&i| values[i].clone()).collect()
        }

        match self {
            Self::Byte(v) => Self::Byte(pick(v, indices)),
            Self::Int16(v) => Self::Int16(pick(v, indices)),
            Self::Int32(v) => Self::Int32(pick(v, indices)),
            Self::Int64(v) => Self::Int64(pick(v, indices)),
            Self::Float(v) => Self::Float(pick(v, indices)),
            Self::Double(v) => Self::Double(pick(v, indices)),
            Self::CFloat(v) => Self::CFloat(pick(v, indices)),
            Self::CDouble(v) => Self::CDouble(pick(v, indices)),
            Self::String(v) => Self::String(pick(v, indices)),
        }
    }
}

/// A rectangular array: a typed element buffer plus its dimensions.
///
/// The number of elements always equals the product of the dimensions, and
/// there is always at least one dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct Array {
    dims: Dims,
    data: ArrayData,
}

impl Array {
    /// Builds an array, checking that `dims` matches the buffer.
    ///
    /// # Errors
    /// Returns `InvalidDimensions` if `dims` is empty, has more than
    /// [`MAX_DIMS`] entries, or does not multiply out to the number of
    /// elements in `data`.
    ///
    /// # Example
    /// ```
    /// use luxcore::interpreter::value::core::{Array, ArrayData};
    ///
    /// let a = Array::new(&[2, 3], ArrayData::Int32(vec![0; 6])).unwrap();
    /// assert_eq!(a.dims(), &[2, 3]);
    ///
    /// assert!(Array::new(&[2, 2], ArrayData::Int32(vec![0; 6])).is_err());
    /// ```
    pub fn new(dims: &[usize], data: ArrayData) -> EvalResult<Self> {
        let elements = data.len();
        if dims.is_empty() || dims.len() > MAX_DIMS || dims.iter().product::<usize>() != elements {
            return Err(RuntimeError::InvalidDimensions { dims: dims.to_vec(),
                                                         elements });
        }
        Ok(Self { dims: Dims::from_slice(dims),
                  data })
    }

    /// Builds a one-dimensional array from a vector of elements.
    #[must_use]
    pub fn from_vec<T: Element>(values: Vec<T>) -> Self {
        Self { dims: smallvec::smallvec![values.len()],
               data: T::wrap(values), }
    }

    /// Returns the dimensions.
    #[must_use]
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Returns the element buffer.
    #[must_use]
    pub const fn data(&self) -> &ArrayData {
        &self.data
    }

    /// Returns the element buffer for in-place updates. The number of
    /// elements must not change.
    pub(crate) const fn data_mut(&mut self) -> &mut ArrayData {
        &mut self.data
    }

    /// Splits the array into its dimensions and buffer.
    #[must_use]
    pub fn into_parts(self) -> (Dims, ArrayData) {
        (self.dims, self.data)
    }

    /// Returns the element type.
    #[must_use]
    pub const fn element_type(&self) -> ElementType {
        self.data.element_type()
    }

    /// Returns the number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the array has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

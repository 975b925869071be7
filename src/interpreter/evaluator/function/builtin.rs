use crate::{
    ast::BinaryOperator,
    error::RuntimeError,
    interpreter::{
        evaluator::{
            binary::kernel::Arithmetic,
            core::{EvalResult, Runtime},
            utils::{check_arity, numeric_parts, numeric_payload},
        },
        store::core::{Class, Payload, SymbolId},
        types::{ElementType, promote},
        value::{
            complex::ComplexNumber,
            core::{ArrayData, Scalar},
            element::{Element, convert_values},
        },
    },
    util::num::{checked_index, usize_to_i64},
};

/// Applies a unary float function to every element of a numeric argument.
///
/// The generated functions accept exactly one argument.
/// - Integer and `Float` elements are computed in double precision and
///   stored as `Float`; `Double` stays `Double`.
/// - Complex elements use the complex variant and keep their type.
///
/// Non-numeric arguments produce an `IllegalClass` error.
///
/// # Example
/// ```
/// use luxcore::interpreter::{
///     evaluator::{core::Runtime, function::builtin::sqrt},
///     value::core::Scalar,
/// };
///
/// let mut rt = Runtime::new();
/// let x = rt.scalar(Scalar::Double(9.0)).unwrap();
/// let r = sqrt(&mut rt, &[x]).unwrap();
///
/// assert_eq!(rt.scalar_value(r).unwrap(), Scalar::Double(3.0));
/// ```
macro_rules! real_complex_builtin {
    ($fname:ident, $real_fn:path, $complex_fn:path) => {
        pub fn $fname(rt: &mut Runtime, args: &[SymbolId]) -> EvalResult<SymbolId> {
            map_float(rt, stringify!($fname), args, $real_fn, $complex_fn)
        }
    };
}

real_complex_builtin!(sqrt, f64::sqrt, ComplexNumber::sqrt);
real_complex_builtin!(exp, f64::exp, ComplexNumber::exp);
real_complex_builtin!(ln, f64::ln, ComplexNumber::ln);
real_complex_builtin!(sin, f64::sin, ComplexNumber::sin);
real_complex_builtin!(cos, f64::cos, ComplexNumber::cos);

fn map_float(rt: &mut Runtime,
             name: &str,
             args: &[SymbolId],
             real_fn: fn(f64) -> f64,
             complex_fn: fn(ComplexNumber<f64>) -> ComplexNumber<f64>)
             -> EvalResult<SymbolId> {
    check_arity(name, args, 1)?;
    let (dims, data) = numeric_parts(rt.store.payload(args[0])?, "take a float function of")?;
    let ty = data.element_type();

    let out = if ty.is_complex() {
        let values = convert_values::<ComplexNumber<f64>>(&data).unwrap_or_default();
        ArrayData::CDouble(values.into_iter().map(complex_fn).collect())
    } else {
        let values = convert_values::<f64>(&data).unwrap_or_default();
        ArrayData::Double(values.into_iter().map(real_fn).collect())
    };
    let out = out.cast(promote(ty, ElementType::Float)).unwrap_or(out);
    rt.store.allocate_temp(numeric_payload(dims, out)?)
}

/// Returns the absolute value of every element.
///
/// Integers and reals keep their type; integer minima wrap. Complex elements
/// yield their modulus as a real of the same precision.
///
/// # Example
/// ```
/// use luxcore::interpreter::{
///     evaluator::{core::Runtime, function::builtin::abs},
///     value::{complex::ComplexNumber, core::Scalar},
/// };
///
/// let mut rt = Runtime::new();
/// let z = rt.scalar(Scalar::CDouble(ComplexNumber::new(3.0, -4.0))).unwrap();
/// let r = abs(&mut rt, &[z]).unwrap();
///
/// assert_eq!(rt.scalar_value(r).unwrap(), Scalar::Double(5.0));
/// ```
pub fn abs(rt: &mut Runtime, args: &[SymbolId]) -> EvalResult<SymbolId> {
    check_arity("abs", args, 1)?;
    let (dims, data) = numeric_parts(rt.store.payload(args[0])?, "take the absolute value of")?;

    let out = match data {
        ArrayData::Byte(v) => ArrayData::Byte(v),
        ArrayData::Int16(v) => ArrayData::Int16(v.into_iter().map(i16::wrapping_abs).collect()),
        ArrayData::Int32(v) => ArrayData::Int32(v.into_iter().map(i32::wrapping_abs).collect()),
        ArrayData::Int64(v) => ArrayData::Int64(v.into_iter().map(i64::wrapping_abs).collect()),
        ArrayData::Float(v) => ArrayData::Float(v.into_iter().map(f32::abs).collect()),
        ArrayData::Double(v) => ArrayData::Double(v.into_iter().map(f64::abs).collect()),
        ArrayData::CFloat(v) => ArrayData::Float(v.iter().map(ComplexNumber::abs).collect()),
        ArrayData::CDouble(v) => ArrayData::Double(v.iter().map(ComplexNumber::abs).collect()),
        ArrayData::String(_) => {
            return Err(RuntimeError::IllegalClass { class:     Class::Array,
                                                    operation: "take the absolute value of" });
        },
    };
    rt.store.allocate_temp(numeric_payload(dims, out)?)
}

/// Returns the real part of every element. Real arguments are returned
/// unchanged.
pub fn real(rt: &mut Runtime, args: &[SymbolId]) -> EvalResult<SymbolId> {
    complex_part(rt, "real", args, |c| c.real)
}

/// Returns the imaginary part of every element: zero for real arguments.
pub fn imaginary(rt: &mut Runtime, args: &[SymbolId]) -> EvalResult<SymbolId> {
    complex_part(rt, "imaginary", args, |c| c.imaginary)
}

fn complex_part(rt: &mut Runtime,
                name: &str,
                args: &[SymbolId],
                part: fn(ComplexNumber<f64>) -> f64)
                -> EvalResult<SymbolId> {
    check_arity(name, args, 1)?;
    let (dims, data) = numeric_parts(rt.store.payload(args[0])?, "take a part of")?;

    let ty = data.element_type();
    let out = if ty.is_complex() {
        let values = convert_values::<ComplexNumber<f64>>(&data).unwrap_or_default();
        let parts = ArrayData::Double(values.into_iter().map(part).collect());
        let real_ty = if ty == ElementType::CFloat { ElementType::Float } else { ElementType::Double };
        parts.cast(real_ty).unwrap_or(parts)
    } else if name == "imaginary" {
        ArrayData::zeros(ty, data.len())
    } else {
        data
    };
    rt.store.allocate_temp(numeric_payload(dims, out)?)
}

/// Returns the complex conjugate of every element. Real arguments are
/// returned unchanged.
pub fn conjugate(rt: &mut Runtime, args: &[SymbolId]) -> EvalResult<SymbolId> {
    check_arity("conjugate", args, 1)?;
    let (dims, data) = numeric_parts(rt.store.payload(args[0])?, "conjugate")?;

    let out = match data {
        ArrayData::CFloat(v) => ArrayData::CFloat(v.iter().map(ComplexNumber::conj).collect()),
        ArrayData::CDouble(v) => ArrayData::CDouble(v.iter().map(ComplexNumber::conj).collect()),
        other => other,
    };
    rt.store.allocate_temp(numeric_payload(dims, out)?)
}

/// Returns the sum of all elements as a scalar.
///
/// Integer elements are summed as at least `Int32`, with wrapping; other
/// types keep their own type.
///
/// # Example
/// ```
/// use luxcore::interpreter::{
///     evaluator::{core::Runtime, function::builtin::total},
///     value::core::{ArrayData, Scalar},
/// };
///
/// let mut rt = Runtime::new();
/// let a = rt.array(&[3], ArrayData::Byte(vec![200, 100, 1])).unwrap();
/// let r = total(&mut rt, &[a]).unwrap();
///
/// assert_eq!(rt.scalar_value(r).unwrap(), Scalar::Int32(301));
/// ```
pub fn total(rt: &mut Runtime, args: &[SymbolId]) -> EvalResult<SymbolId> {
    fn sum_all<T: Arithmetic>(data: &ArrayData) -> Scalar {
        let values = convert_values::<T>(data).unwrap_or_default();
        let sum = match T::arithmetic(BinaryOperator::Add) {
            Some(add) => values.into_iter().fold(T::default(), add),
            None => T::default(),
        };
        sum.into_scalar()
    }

    check_arity("total", args, 1)?;
    let (_, data) = numeric_parts(rt.store.payload(args[0])?, "sum")?;
    let ty = promote(data.element_type(), ElementType::Int32);
    let sum = crate::dispatch_numeric!(ty,
                                       T => sum_all::<T>(&data),
                                       string => Scalar::Int32(0));
    rt.store.allocate_temp(Payload::Scalar(sum))
}

/// Returns the number of elements as an Int32 scalar: array elements,
/// string characters, or container members. A scalar has one element.
pub fn num_elem(rt: &mut Runtime, args: &[SymbolId]) -> EvalResult<SymbolId> {
    check_arity("num_elem", args, 1)?;
    let count = match rt.store.payload(args[0])? {
        Payload::Scalar(_) => 1,
        Payload::Array(a) => a.len(),
        Payload::String(s) => s.chars().count(),
        Payload::List(m) => m.len(),
        Payload::CList(m) => m.len(),
        Payload::Struct(m) => m.len(),
        Payload::Enum(m) => m.len(),
        other => {
            return Err(RuntimeError::IllegalClass { class:     other.class(),
                                                    operation: "count the elements of" });
        },
    };
    let count = i32::try_from(count).unwrap_or(i32::MAX);
    rt.store.allocate_temp(Payload::Scalar(Scalar::Int32(count)))
}

/// Returns the dimensions of an array as an Int32 array, or with a second
/// argument the size along that (0-based) axis as an Int32 scalar. A scalar
/// has the single dimension 1.
///
/// # Example
/// ```
/// use luxcore::interpreter::{
///     evaluator::{core::Runtime, function::builtin::dimen},
///     value::core::{ArrayData, Scalar},
/// };
///
/// let mut rt = Runtime::new();
/// let a = rt.array(&[2, 3], ArrayData::Double(vec![0.0; 6])).unwrap();
/// let axis = rt.scalar(Scalar::Int32(1)).unwrap();
/// let r = dimen(&mut rt, &[a, axis]).unwrap();
///
/// assert_eq!(rt.scalar_value(r).unwrap(), Scalar::Int32(3));
/// ```
pub fn dimen(rt: &mut Runtime, args: &[SymbolId]) -> EvalResult<SymbolId> {
    if !(1..=2).contains(&args.len()) {
        return Err(RuntimeError::ArgumentCountMismatch { name:  "dimen".to_string(),
                                                         found: args.len(), });
    }
    let dims: Vec<i32> = match rt.store.payload(args[0])? {
        Payload::Scalar(_) => vec![1],
        Payload::Array(a) => a.dims()
                              .iter()
                              .map(|&d| i32::try_from(d).unwrap_or(i32::MAX))
                              .collect(),
        other => {
            return Err(RuntimeError::IllegalClass { class:     other.class(),
                                                    operation: "take the dimensions of" });
        },
    };

    let payload = match args.get(1) {
        Some(&axis) => {
            let axis = rt.scalar_value(axis)?
                         .as_index()
                         .ok_or(RuntimeError::InvalidSubscript { details: "complex axis".to_string() })?;
            Payload::Scalar(Scalar::Int32(dims[checked_index(axis, dims.len())?]))
        },
        None => numeric_payload(Some(smallvec::smallvec![dims.len()]), ArrayData::Int32(dims))?,
    };
    rt.store.allocate_temp(payload)
}

/// Returns an array shaped and typed like the argument whose elements count
/// up from zero.
///
/// # Example
/// ```
/// use luxcore::interpreter::{
///     evaluator::{core::Runtime, function::builtin::indgen},
///     value::core::ArrayData,
/// };
///
/// let mut rt = Runtime::new();
/// let a = rt.array(&[2, 2], ArrayData::Float(vec![0.0; 4])).unwrap();
/// let r = indgen(&mut rt, &[a]).unwrap();
///
/// assert_eq!(rt.array_value(r).unwrap().data(), &ArrayData::Float(vec![0.0, 1.0, 2.0, 3.0]));
/// ```
pub fn indgen(rt: &mut Runtime, args: &[SymbolId]) -> EvalResult<SymbolId> {
    fn count<T: Element>(len: usize) -> ArrayData {
        T::wrap((0..len).map(|i| T::from_i64(usize_to_i64(i))).collect())
    }

    check_arity("indgen", args, 1)?;
    let (dims, data) = numeric_parts(rt.store.payload(args[0])?, "count through")?;
    let out = crate::dispatch_numeric!(data.element_type(),
                                       T => count::<T>(data.len()),
                                       string => data);
    rt.store.allocate_temp(numeric_payload(dims, out)?)
}

use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::core::EvalResult,
        store::core::Payload,
        value::core::{Array, ArrayData, Dims},
    },
};

/// Checks if the argument list matches the expected count.
/// Returns an error naming the function if the argument count does not
/// match.
///
/// ## Example
/// ```
/// use luxcore::interpreter::evaluator::utils::check_arity;
///
/// let args = [1, 2];
///
/// assert!(check_arity("atan2", &args, 2).is_ok()); // Requires exactly 2 arguments.
/// assert!(check_arity("sqrt", &args, 1).is_err());
/// ```
pub fn check_arity<T>(name: &str, args: &[T], expected: usize) -> EvalResult<()> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(RuntimeError::ArgumentCountMismatch { name:  name.to_string(),
                                                  found: args.len(), })
    }
}

/// Splits a numeric Scalar or Array payload into its dimensions (`None` for
/// a scalar) and a copy of its elements.
///
/// ## Errors
/// Returns `IllegalClass` for any other payload, including string arrays.
pub fn numeric_parts(payload: &Payload, operation: &'static str) -> EvalResult<(Option<Dims>, ArrayData)> {
    match payload {
        Payload::Scalar(s) => Ok((None, ArrayData::from_scalar(*s))),
        Payload::Array(a) if a.element_type().is_numeric() => {
            Ok((Some(Dims::from_slice(a.dims())), a.data().clone()))
        },
        other => Err(RuntimeError::IllegalClass { class: other.class(),
                                                  operation }),
    }
}

/// The inverse of [`numeric_parts`]: a Scalar payload when `dims` is `None`,
/// an Array payload otherwise.
///
/// ## Errors
/// Returns `InvalidDimensions` if `dims` does not fit `data`.
pub fn numeric_payload(dims: Option<Dims>, data: ArrayData) -> EvalResult<Payload> {
    match dims {
        None => data.get(0)
                    .map(Payload::Scalar)
                    .ok_or(RuntimeError::InvalidDimensions { dims:     Vec::new(),
                                                             elements: data.len(), }),
        Some(dims) => Ok(Payload::Array(Array::new(&dims, data)?)),
    }
}

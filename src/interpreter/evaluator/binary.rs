/// Operator entry point.
///
/// Classifies the two operands and routes to the numeric, string or range
/// handlers. Defines the `BinaryOperation` passed down the engine.
pub mod core;

/// Numeric operands.
///
/// Computes the result type, picks the shape path, decides whether an
/// operand buffer can be reused and instantiates the kernels for the
/// computation type.
pub mod array;

/// Element kernels.
///
/// The `Arithmetic` trait with the per-type operator functions, and the
/// loops for the scalar-array, array-scalar and array-array shape paths.
pub mod kernel;

/// Range operands: the operator applied to both endpoints.
pub mod range;

/// String operands: comparison and concatenation.
pub mod string;

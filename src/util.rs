/// Numeric helpers.
///
/// This module provides the floor and symmetric remainders, floor division
/// for integers and floats, and index conversions shared by the evaluator.
/// Integer helpers never panic: division by zero gives zero and overflow
/// wraps.
pub mod num;

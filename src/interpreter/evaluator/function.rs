/// Internal function implementations.
///
/// Element-wise float functions, absolute value, complex parts, sums and
/// shape queries, all taking evaluated argument symbols.
pub mod builtin;

/// Function and routine calls.
///
/// The internal function table with its arity checks, user function and
/// subroutine calls with recursion-safe parameter binding, and lookup of
/// routine variables.
pub mod core;

/// The function-call adapter.
///
/// Lets numeric code outside the interpreter evaluate a named function on
/// argument symbols and read back a real result.
pub mod adapter;

/// Runtime errors.
///
/// Contains every error that can be raised while evaluating symbols: type
/// and class errors, shape errors, symbol-table exhaustion, lookup failures
/// and placeholders for unsupported paths.
pub mod runtime_error;

pub use runtime_error::{OperandDescription, RuntimeError};

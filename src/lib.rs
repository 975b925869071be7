//! # luxcore
//!
//! luxcore is the runtime core of a LUX-style interpreted array language.
//! It provides a symbol store with a temporary arena, a numeric type lattice
//! with complex numbers, the nineteen binary operators with broadcasting,
//! and lazy evaluation of ranges, lists, structures and function calls.
//!
//! There is no parser: a front end builds the symbol graph through the
//! constructors on [`interpreter::evaluator::core::Runtime`] and evaluates
//! it.
//!
//! # Example
//! ```
//! use luxcore::{
//!     ast::BinaryOperator,
//!     interpreter::{evaluator::core::Runtime, value::core::Scalar},
//! };
//!
//! let mut rt = Runtime::new();
//! let a = rt.scalar(Scalar::Int32(3)).unwrap();
//! let b = rt.scalar(Scalar::Float(0.5)).unwrap();
//! let sum = rt.binary_op(BinaryOperator::Add, a, b).unwrap();
//! let result = rt.eval(sum).unwrap();
//! assert_eq!(rt.scalar_value(result).unwrap(), Scalar::Float(3.5));
//! ```

#![warn(
    clippy::redundant_clone,
    clippy::needless_pass_by_value,
    clippy::similar_names,
    clippy::large_enum_variant,
    clippy::string_lit_as_bytes,
    clippy::match_same_arms,
    clippy::cargo,
    clippy::nursery,
    clippy::perf,
    clippy::style,
    clippy::suspicious,
    clippy::correctness,
    clippy::complexity,
    clippy::pedantic,
    //missing_docs,
)]
#![allow(clippy::missing_errors_doc)]

/// Defines the operator and access vocabulary of the symbol graph.
///
/// This module declares the binary operators, the links of an access chain
/// and the routine kinds. These are the syntactic building blocks a front end
/// uses to describe what a node computes.
///
/// # Responsibilities
/// - Defines the nineteen binary operators and their properties.
/// - Defines tag and subscript links for structured access.
pub mod ast;
/// Provides the error type for evaluation.
///
/// This module defines all errors that can be raised while building or
/// evaluating symbols. Every error carries enough detail (operand
/// descriptions, names, dimensions) to report the failure to a user.
///
/// # Responsibilities
/// - Defines one error enum for every failure mode of the runtime.
/// - Integrates with the standard error traits.
pub mod error;
/// Orchestrates the evaluation of symbols.
///
/// This module ties together the symbol store, the value representations,
/// the type lattice and the evaluator.
///
/// # Responsibilities
/// - Coordinates the store, the values and the evaluator.
/// - Provides the entry points for building and evaluating symbols.
pub mod interpreter;
/// General numeric helpers.
///
/// This module provides floor division and remainder helpers and safe
/// index conversions used throughout the evaluator.
pub mod util;

/// Binary operator evaluation logic.
///
/// Handles all nineteen binary operators for numeric, string and range
/// operands, including type promotion and in-place result reuse.
pub mod binary;

/// The broadcast planner.
///
/// Plans the combination of arrays whose dimensions differ in axes of size
/// 1.
pub mod broadcast;

/// Core evaluation logic and runtime management.
///
/// Contains the runtime, its configuration, the evaluation dispatch loop,
/// assignment and conversion.
pub mod core;

/// Structured extraction.
///
/// Resolves access chains into ranges, lists, enums, structs and routines.
pub mod extract;

/// Function evaluation.
///
/// Handles internal and user function calls, argument checking and the
/// adapter used by external numeric code.
pub mod function;

/// Expression graph construction.
///
/// Builds literal, container, operator, access and call nodes.
pub mod graph;

/// Array and string subscripting.
pub mod subscript;

/// Utility functions for evaluation.
///
/// Provides helpers shared by the internal functions.
pub mod utils;

/// The evaluator module evaluates symbols and computes results.
///
/// The evaluator walks the symbol graph, evaluating literals, containers,
/// operator nodes, structured access and function calls. It owns the
/// runtime and is the core execution engine of the crate.
///
/// # Responsibilities
/// - Evaluates every symbol class, performing all supported operations.
/// - Reuses temporary operands in place where this is allowed.
/// - Reports runtime errors such as illegal operand combinations.
pub mod evaluator;
/// The symbol store holds every value the runtime knows about.
///
/// Symbols are addressed by integer identifiers. Named symbols live until
/// they are redefined; temporaries belong to the scope that created them and
/// are swept when it ends.
///
/// # Responsibilities
/// - Allocates named and temporary symbols and looks names up.
/// - Tracks ownership so that container children are deleted with them.
/// - Manages the temporary arena and its scope levels.
pub mod store;
/// The numeric type lattice.
///
/// Declares the element types and the rules by which two element types
/// combine under a binary operator.
pub mod types;
/// The value module defines the runtime data types for evaluation.
///
/// This module declares the scalar and array values held by symbols,
/// including complex numbers and string arrays, together with conversion
/// between element types.
///
/// # Responsibilities
/// - Defines the `Scalar` enum and the typed `ArrayData` storage.
/// - Converts values between element types with wrapping integer semantics.
/// - Provides the element trait used by the generic operator kernels.
pub mod value;

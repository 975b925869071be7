use std::fmt::Display;

use thiserror::Error;

use crate::{
    ast::BinaryOperator,
    interpreter::{
        store::core::{Class, SymbolId},
        types::ElementType,
    },
};

/// Describes one operand of a failed operation: its class and, for classes
/// that carry one, its element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperandDescription {
    /// The class of the operand.
    pub class: Class,
    /// The element type, for Scalar, Array and String operands.
    pub ty:    Option<ElementType>,
}

impl Display for OperandDescription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.ty {
            Some(ty) => write!(f, "{} {ty}", self.class),
            None => write!(f, "{}", self.class),
        }
    }
}

/// Represents all errors that can occur during evaluation.
///
/// Every variant renders as a one-line diagnostic. Division by zero is
/// deliberately absent: it yields IEEE infinities or NaNs for floats and zero
/// for integers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    /// The operator does not accept this combination of operand classes and
    /// types.
    #[error("Illegal combination for operator '{op}': {lhs} and {rhs}.")]
    IllegalTypeCombination {
        /// The operator.
        op:  BinaryOperator,
        /// The left operand.
        lhs: OperandDescription,
        /// The right operand.
        rhs: OperandDescription,
    },
    /// A symbol of this class cannot take part in the operation.
    #[error("Cannot {operation} a {class} symbol.")]
    IllegalClass {
        /// The class of the offending symbol.
        class:     Class,
        /// What was attempted, in words.
        operation: &'static str,
    },
    /// A function that must yield a real number yielded something else.
    #[error("Function '{name}' did not return a real numeric scalar.")]
    NonNumericResult {
        /// The name of the function.
        name: String,
    },
    /// Array dimensions that are neither equal nor 1 were combined.
    #[error("Incompatible dimensions {lhs:?} and {rhs:?}.")]
    IncompatibleDimensions {
        /// Dimensions of the left operand.
        lhs: Vec<usize>,
        /// Dimensions of the right operand.
        rhs: Vec<usize>,
    },
    /// An array was built with dimensions that do not fit its elements.
    #[error("Dimensions {dims:?} do not describe {elements} elements.")]
    InvalidDimensions {
        /// The requested dimensions.
        dims:     Vec<usize>,
        /// The number of elements supplied.
        elements: usize,
    },
    /// The symbol table is full.
    #[error("Out of symbols: all {capacity} slots are in use.")]
    OutOfSymbols {
        /// The configured capacity of the table.
        capacity: usize,
    },
    /// A tag names no member of the target.
    #[error("No member '{name}' in {class} symbol.")]
    NoSuchMember {
        /// The tag that was looked up.
        name:  String,
        /// The class of the target.
        class: Class,
    },
    /// A subscript lies outside the target.
    #[error("Subscript {index} out of range; size is {size}.")]
    SubscriptOutOfRange {
        /// The subscript that was requested.
        index: i64,
        /// The number of elements along the subscripted axis.
        size:  usize,
    },
    /// No variable of this name is defined, or it has no value yet.
    #[error("Undefined symbol '{name}'.")]
    UndefinedSymbol {
        /// The name of the variable.
        name: String,
    },
    /// Called a function that is neither internal nor user-defined.
    #[error("Unknown function '{name}'.")]
    UnknownFunction {
        /// The name of the function.
        name: String,
    },
    /// A symbol was used after it had been deleted.
    #[error("Symbol {id} was used after it was deleted.")]
    DeletedSymbol {
        /// The id of the deleted symbol.
        id: SymbolId,
    },
    /// The wrong number of arguments was supplied to a function.
    #[error("Function '{name}' called with {found} arguments.")]
    ArgumentCountMismatch {
        /// The name of the function.
        name:  String,
        /// The number of arguments supplied.
        found: usize,
    },
    /// A member was subscripted twice in one access chain.
    #[error("Member '{member}' subscripted more than once.")]
    RepeatedSubscript {
        /// The name of the member.
        member: String,
    },
    /// A subscript had the wrong class, type or count.
    #[error("Invalid subscript: {details}.")]
    InvalidSubscript {
        /// Details about why the subscript is invalid.
        details: String,
    },
    /// The operation is known but not supported yet.
    #[error("Not implemented: {feature}.")]
    NotImplemented {
        /// The missing feature.
        feature: &'static str,
    },
}

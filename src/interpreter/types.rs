use std::fmt::Display;

use crate::ast::BinaryOperator;

/// The element type of a scalar, array or string array.
///
/// The declaration order is the promotion lattice: `Byte < Int16 < Int32 <
/// Int64 < Float < Double < CFloat < CDouble < String`. The derived `Ord`
/// implementation is therefore the lattice order, and promotion is just
/// `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ElementType {
    /// Unsigned 8-bit integer.
    Byte,
    /// Signed 16-bit integer.
    Int16,
    /// Signed 32-bit integer. Also the type of every comparison result.
    Int32,
    /// Signed 64-bit integer.
    Int64,
    /// 32-bit IEEE float.
    Float,
    /// 64-bit IEEE float.
    Double,
    /// Complex number with 32-bit float parts.
    CFloat,
    /// Complex number with 64-bit float parts.
    CDouble,
    /// Text. Only string arrays carry this element type; it sits above every
    /// numeric type but never takes part in numeric promotion.
    String,
}

impl ElementType {
    /// Every element type, in lattice order.
    pub const ALL: [Self; 9] = [Self::Byte,
                                Self::Int16,
                                Self::Int32,
                                Self::Int64,
                                Self::Float,
                                Self::Double,
                                Self::CFloat,
                                Self::CDouble,
                                Self::String];

    /// The numeric element types, in lattice order.
    pub const NUMERIC: [Self; 8] = [Self::Byte,
                                    Self::Int16,
                                    Self::Int32,
                                    Self::Int64,
                                    Self::Float,
                                    Self::Double,
                                    Self::CFloat,
                                    Self::CDouble];

    /// Size in bytes of one element of this type.
    ///
    /// Strings are stored as owned text rather than fixed-size cells, so
    /// their element size is that of a `String` handle.
    #[must_use]
    pub const fn size(self) -> usize {
        match self {
            Self::Byte => 1,
            Self::Int16 => 2,
            Self::Int32 | Self::Float => 4,
            Self::Int64 | Self::Double | Self::CFloat => 8,
            Self::CDouble => 16,
            Self::String => std::mem::size_of::<String>(),
        }
    }

    /// Returns `true` for `Byte`, `Int16`, `Int32` and `Int64`.
    #[must_use]
    pub const fn is_integer(self) -> bool {
        matches!(self, Self::Byte | Self::Int16 | Self::Int32 | Self::Int64)
    }

    /// Returns `true` for `Float` and `Double`.
    #[must_use]
    pub const fn is_real_float(self) -> bool {
        matches!(self, Self::Float | Self::Double)
    }

    /// Returns `true` for `CFloat` and `CDouble`.
    #[must_use]
    pub const fn is_complex(self) -> bool {
        matches!(self, Self::CFloat | Self::CDouble)
    }

    /// Returns `true` for every type except `String`.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        !matches!(self, Self::String)
    }

    /// The name used in diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Byte => "BYTE",
            Self::Int16 => "WORD",
            Self::Int32 => "LONG",
            Self::Int64 => "INT64",
            Self::Float => "FLOAT",
            Self::Double => "DOUBLE",
            Self::CFloat => "CFLOAT",
            Self::CDouble => "CDOUBLE",
            Self::String => "STRING",
        }
    }
}

impl Display for ElementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Returns the greater of two types in the promotion lattice.
///
/// # Example
/// ```
/// use luxcore::interpreter::types::{ElementType, promote};
///
/// assert_eq!(promote(ElementType::Byte, ElementType::Int32), ElementType::Int32);
/// assert_eq!(promote(ElementType::CFloat, ElementType::Double), ElementType::CFloat);
/// ```
#[must_use]
pub fn promote(left: ElementType, right: ElementType) -> ElementType {
    left.max(right)
}

/// Returns the type both operands are converted to before `op` runs.
///
/// This is the promoted type, raised to `Float` for exponentiation and to
/// `Int16` for the symmetric remainder (whose result may be negative).
/// `None` means the operator rejects the combination.
///
/// # Example
/// ```
/// use luxcore::{
///     ast::BinaryOperator,
///     interpreter::types::{ElementType, computation_type},
/// };
///
/// assert_eq!(computation_type(BinaryOperator::Pow, ElementType::Int16, ElementType::Byte),
///            Some(ElementType::Float));
/// assert_eq!(computation_type(BinaryOperator::Lt, ElementType::Byte, ElementType::Double),
///            Some(ElementType::Double));
/// assert_eq!(computation_type(BinaryOperator::Or, ElementType::Float, ElementType::Int32),
///            None);
/// assert_eq!(computation_type(BinaryOperator::SymmetricMod, ElementType::Byte, ElementType::Byte),
///            Some(ElementType::Int16));
/// ```
#[must_use]
pub fn computation_type(op: BinaryOperator,
                        left: ElementType,
                        right: ElementType)
                        -> Option<ElementType> {
    if !left.is_numeric() || !right.is_numeric() {
        return None;
    }
    let promoted = promote(left, right);

    match op {
        BinaryOperator::Or | BinaryOperator::And | BinaryOperator::Xor => {
            promoted.is_integer().then_some(promoted)
        },
        BinaryOperator::Pow => Some(promoted.max(ElementType::Float)),
        BinaryOperator::SymmetricMod => Some(promoted.max(ElementType::Int16)),
        _ => Some(promoted),
    }
}

/// Returns the element type of the result of `left op right`.
///
/// Applies the lattice, then the operator-specific rules:
/// - `Or`, `And` and `Xor` accept integer operands only;
/// - `Pow` raises any result below `Float` to `Float`;
/// - `SymmetricMod` raises `Byte` to `Int16`;
/// - comparisons always produce `Int32`.
///
/// Strings are handled outside the lattice (the engine decides on them by
/// class), so any `String` operand yields `None` here. The function is total:
/// every pair of types gives a definite answer.
///
/// # Example
/// ```
/// use luxcore::{
///     ast::BinaryOperator,
///     interpreter::types::{ElementType, combined_type_for_operator},
/// };
///
/// let t = combined_type_for_operator(BinaryOperator::Add, ElementType::Byte, ElementType::Int32);
/// assert_eq!(t, Some(ElementType::Int32));
///
/// let t = combined_type_for_operator(BinaryOperator::Eq, ElementType::CDouble, ElementType::Byte);
/// assert_eq!(t, Some(ElementType::Int32));
/// ```
#[must_use]
pub fn combined_type_for_operator(op: BinaryOperator,
                                  left: ElementType,
                                  right: ElementType)
                                  -> Option<ElementType> {
    let computed = computation_type(op, left, right)?;
    if op.is_comparison() { Some(ElementType::Int32) } else { Some(computed) }
}

use std::fmt::Display;

use crate::interpreter::store::core::SymbolId;

/// The binary operators understood by the runtime.
///
/// The order of the variants follows the operator table of the language:
/// arithmetic first, then the extrema, the comparisons, the bitwise
/// operators and finally exponentiation. [`BinaryOperator::ALL`] lists them
/// in that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    /// `x + y`, also string concatenation.
    Add,
    /// `x - y`.
    Sub,
    /// `x * y`.
    Mul,
    /// `x / y`. No divide-by-zero check is performed.
    Div,
    /// `x \ y`: the quotient rounded toward negative infinity.
    IntDivFloor,
    /// `x mod y`: floor remainder, same sign as the divisor.
    Mod,
    /// `x smod y`: remainder centered on `(-|y|/2, |y|/2]`.
    SymmetricMod,
    /// `x > y ? x : y`; complex values compare by magnitude.
    Max,
    /// `x < y ? x : y`; complex values compare by magnitude.
    Min,
    /// `x eq y`.
    Eq,
    /// `x gt y`.
    Gt,
    /// `x ge y`.
    Ge,
    /// `x lt y`.
    Lt,
    /// `x le y`.
    Le,
    /// `x ne y`.
    Ne,
    /// Bitwise or, integer operands only.
    Or,
    /// Bitwise and, integer operands only.
    And,
    /// Bitwise exclusive or, integer operands only.
    Xor,
    /// `x ^ y`.
    Pow,
}

impl BinaryOperator {
    /// Every operator, in table order.
    pub const ALL: [Self; 19] = [Self::Add,
                                 Self::Sub,
                                 Self::Mul,
                                 Self::Div,
                                 Self::IntDivFloor,
                                 Self::Mod,
                                 Self::SymmetricMod,
                                 Self::Max,
                                 Self::Min,
                                 Self::Eq,
                                 Self::Gt,
                                 Self::Ge,
                                 Self::Lt,
                                 Self::Le,
                                 Self::Ne,
                                 Self::Or,
                                 Self::And,
                                 Self::Xor,
                                 Self::Pow];

    /// Returns `true` if `x op y == y op x` for every pair of operands.
    ///
    /// # Example
    /// ```
    /// use luxcore::ast::BinaryOperator;
    ///
    /// assert!(BinaryOperator::Add.is_commutative());
    /// assert!(!BinaryOperator::Sub.is_commutative());
    /// ```
    #[must_use]
    pub const fn is_commutative(self) -> bool {
        matches!(self,
                 Self::Add
                 | Self::Mul
                 | Self::Max
                 | Self::Min
                 | Self::Eq
                 | Self::Ne
                 | Self::Or
                 | Self::And
                 | Self::Xor)
    }

    /// Returns `true` for the six comparison operators, whose result is
    /// always a 32-bit integer truth value.
    #[must_use]
    pub const fn is_comparison(self) -> bool {
        matches!(self, Self::Eq | Self::Gt | Self::Ge | Self::Lt | Self::Le | Self::Ne)
    }

    /// Returns `true` for the operators that only accept integer operands.
    #[must_use]
    pub const fn is_integer_only(self) -> bool {
        matches!(self, Self::Or | Self::And | Self::Xor)
    }

    /// Returns the operator that gives the same result with the operands
    /// swapped, if there is one.
    ///
    /// Commutative operators are their own mirror; `Gt` and `Lt` (and `Ge`
    /// and `Le`) mirror each other. `Max` and `Min` have none: on ties (equal
    /// complex magnitudes, `NaN`) they pick an operand by position.
    ///
    /// # Example
    /// ```
    /// use luxcore::ast::BinaryOperator;
    ///
    /// assert_eq!(BinaryOperator::Gt.mirrored(), Some(BinaryOperator::Lt));
    /// assert_eq!(BinaryOperator::Mul.mirrored(), Some(BinaryOperator::Mul));
    /// assert_eq!(BinaryOperator::Div.mirrored(), None);
    /// assert_eq!(BinaryOperator::Max.mirrored(), None);
    /// ```
    #[must_use]
    pub const fn mirrored(self) -> Option<Self> {
        match self {
            Self::Max | Self::Min => None,
            Self::Gt => Some(Self::Lt),
            Self::Lt => Some(Self::Gt),
            Self::Ge => Some(Self::Le),
            Self::Le => Some(Self::Ge),
            op if op.is_commutative() => Some(op),
            _ => None,
        }
    }

    /// The operator as it is written in source text.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::IntDivFloor => "\\",
            Self::Mod => "mod",
            Self::SymmetricMod => "smod",
            Self::Max => "max",
            Self::Min => "min",
            Self::Eq => "eq",
            Self::Gt => "gt",
            Self::Ge => "ge",
            Self::Lt => "lt",
            Self::Le => "le",
            Self::Ne => "ne",
            Self::Or => "or",
            Self::And => "and",
            Self::Xor => "xor",
            Self::Pow => "^",
        }
    }
}

impl Display for BinaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// One link of an access chain such as `x.a(2).b`.
///
/// Links are stored unevaluated in an `Extract` symbol and resolved one at a
/// time, left to right, when the chain itself is evaluated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Link {
    /// Member access by name: `target.tag`.
    Tag(String),
    /// Subscripting: `target(args)`. Each argument is an expression symbol
    /// that is evaluated before it is applied.
    Subscript(Vec<SymbolId>),
}

/// Distinguishes the two kinds of user routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutineKind {
    /// Returns a value and may appear inside expressions.
    Function,
    /// Runs for its effects only; calling it inside an expression is an
    /// error.
    Subroutine,
}

impl Display for RoutineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Function => write!(f, "function"),
            Self::Subroutine => write!(f, "subroutine"),
        }
    }
}

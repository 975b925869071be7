use crate::{
    ast::BinaryOperator,
    error::{OperandDescription, RuntimeError},
    interpreter::{
        evaluator::core::{EvalResult, Runtime},
        store::core::{Class, Payload, SymbolId},
        types::ElementType,
    },
};

/// The binary operation being executed: the operator and its two evaluated
/// operands. Passed down through the engine instead of living in shared
/// state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinaryOperation {
    /// The operator.
    pub op:  BinaryOperator,
    /// The left operand.
    pub lhs: SymbolId,
    /// The right operand.
    pub rhs: SymbolId,
}

/// The operand classes the engine distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OperandKind {
    Numeric,
    Text,
    Range,
    Other,
}

impl Runtime {
    /// Applies `op` to two evaluated operands and returns the result symbol.
    ///
    /// Numeric Scalar and Array operands go through the type lattice and the
    /// shape paths (scalar-scalar, scalar-array, array-scalar, equal shapes,
    /// broadcasting). Strings and string arrays support the comparisons and
    /// concatenation with `Add`. A range combined with a scalar applies the
    /// operator to both endpoints.
    ///
    /// The result is a new temporary, or an operand reused in place when it
    /// is an unshared temporary of the result's type and size and piping is
    /// enabled.
    ///
    /// # Parameters
    /// - `op`: The operator.
    /// - `lhs`: Left operand, already evaluated.
    /// - `rhs`: Right operand, already evaluated.
    ///
    /// # Errors
    /// - `IllegalTypeCombination` for unsupported operand classes or types.
    /// - `IncompatibleDimensions` for arrays that cannot be broadcast.
    /// - `OutOfSymbols` if the result cannot be allocated.
    ///
    /// # Example
    /// ```
    /// use luxcore::{
    ///     ast::BinaryOperator,
    ///     interpreter::{evaluator::core::Runtime, value::core::{ArrayData, Scalar}},
    /// };
    ///
    /// let mut rt = Runtime::new();
    /// let a = rt.array(&[2], ArrayData::Float(vec![1.0, 2.0])).unwrap();
    /// let b = rt.scalar(Scalar::Double(2.0)).unwrap();
    ///
    /// let product = rt.binary(BinaryOperator::Mul, a, b).unwrap();
    /// assert_eq!(rt.array_value(product).unwrap().data(), &ArrayData::Double(vec![2.0, 4.0]));
    /// ```
    pub fn binary(&mut self,
                  op: BinaryOperator,
                  lhs: SymbolId,
                  rhs: SymbolId)
                  -> EvalResult<SymbolId> {
        let operation = BinaryOperation { op, lhs, rhs };
        let left = self.operand_kind(lhs)?;
        let right = self.operand_kind(rhs)?;
        tracing::trace!(%op, %lhs, %rhs, ?left, ?right, "binary operation");

        match (left, right) {
            (OperandKind::Numeric, OperandKind::Numeric) => self.eval_numeric(operation),
            (OperandKind::Text, OperandKind::Text) => self.eval_string(operation),
            (OperandKind::Range, OperandKind::Numeric) | (OperandKind::Numeric, OperandKind::Range) => {
                self.eval_range_op(operation)
            },
            _ => Err(self.illegal_combination(operation)),
        }
    }

    /// Sorts an operand into the class groups the engine handles.
    fn operand_kind(&self, id: SymbolId) -> EvalResult<OperandKind> {
        Ok(match self.store.payload(id)? {
               Payload::Scalar(_) => OperandKind::Numeric,
               Payload::Array(a) if a.element_type().is_numeric() => OperandKind::Numeric,
               Payload::Array(_) | Payload::String(_) => OperandKind::Text,
               Payload::Range(_) => OperandKind::Range,
               _ => OperandKind::Other,
           })
    }

    /// Describes an operand for diagnostics.
    pub(crate) fn describe(&self, id: SymbolId) -> OperandDescription {
        self.store
            .payload(id)
            .map_or(OperandDescription { class: Class::Undefined,
                                         ty:    None, },
                    |p| OperandDescription { class: p.class(),
                                             ty:    p.element_type(), })
    }

    /// Builds the `IllegalTypeCombination` error for an operation.
    pub(crate) fn illegal_combination(&self, operation: BinaryOperation) -> RuntimeError {
        RuntimeError::IllegalTypeCombination { op:  operation.op,
                                               lhs: self.describe(operation.lhs),
                                               rhs: self.describe(operation.rhs), }
    }

    /// The element type of a Scalar or Array operand.
    pub(crate) fn operand_type(&self, id: SymbolId) -> EvalResult<ElementType> {
        let payload = self.store.payload(id)?;
        payload.element_type()
               .ok_or(RuntimeError::IllegalClass { class:     payload.class(),
                                                   operation: "compute with" })
    }
}

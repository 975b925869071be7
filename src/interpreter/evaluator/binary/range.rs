use crate::interpreter::{
    evaluator::{
        binary::core::BinaryOperation,
        core::{EvalResult, Runtime},
    },
    store::core::{Payload, Range, RangeBound, SymbolId},
};

impl Runtime {
    /// Applies an operator between a range and a scalar by applying it to
    /// both endpoints.
    ///
    /// The range may be on either side. A from-end endpoint takes part with
    /// its offset and the result keeps the from-end form, so
    /// `(1:*-2) + 5` is `6:*-7`. The `sum` and `redirect` modifiers carry
    /// over unchanged.
    ///
    /// # Errors
    /// Returns `IllegalTypeCombination` unless the other operand is a
    /// Scalar, plus any error of the operator on the endpoints.
    pub(crate) fn eval_range_op(&mut self, operation: BinaryOperation) -> EvalResult<SymbolId> {
        let (range_id, other, range_on_left) = match self.store.payload(operation.lhs)? {
            Payload::Range(_) => (operation.lhs, operation.rhs, true),
            _ => (operation.rhs, operation.lhs, false),
        };
        let (Payload::Range(range), Payload::Scalar(_)) =
            (self.store.payload(range_id)?.clone(), self.store.payload(other)?)
        else {
            return Err(self.illegal_combination(operation));
        };

        let endpoint = |bound: RangeBound| {
            if range_on_left {
                BinaryOperation { op:  operation.op,
                                  lhs: bound.symbol,
                                  rhs: other, }
            } else {
                BinaryOperation { op:  operation.op,
                                  lhs: other,
                                  rhs: bound.symbol, }
            }
        };
        let start = self.endpoint_op(endpoint(range.start), range.start.from_end)?;
        let end = self.endpoint_op(endpoint(range.end), range.end.from_end)?;

        let result = self.store.allocate_temp(Payload::Range(Range { start, end, ..range }))?;
        self.embed_temporaries(result, &[start.symbol, end.symbol])?;
        Ok(result)
    }

    /// Applies the operator to one endpoint and reapplies its encoding.
    fn endpoint_op(&mut self,
                   operation: BinaryOperation,
                   from_end: bool)
                   -> EvalResult<RangeBound> {
        let lhs = self.eval(operation.lhs)?;
        let rhs = self.eval(operation.rhs)?;
        let symbol = self.binary(operation.op, lhs, rhs)?;
        Ok(RangeBound { symbol, from_end })
    }
}

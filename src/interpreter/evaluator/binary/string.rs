use crate::{
    ast::BinaryOperator,
    error::RuntimeError,
    interpreter::{
        evaluator::{
            binary::{
                core::BinaryOperation,
                kernel::{real_comparison, truth},
            },
            core::{EvalResult, Runtime},
        },
        store::core::{Payload, SymbolId},
        value::core::{Array, ArrayData, Dims},
    },
};

/// A text operand: one string or an array of strings.
enum Text<'a> {
    One(&'a str),
    Many(&'a [String], &'a [usize]),
}

impl Text<'_> {
    fn len(&self) -> usize {
        match self {
            Self::One(_) => 1,
            Self::Many(items, _) => items.len(),
        }
    }

    /// The element paired with result position `i`. A single string pairs
    /// with every position.
    fn at(&self, i: usize) -> &str {
        match self {
            Self::One(s) => s,
            Self::Many(items, _) => &items[i],
        }
    }

    fn dims(&self) -> Option<&[usize]> {
        match self {
            Self::One(_) => None,
            Self::Many(_, dims) => Some(dims),
        }
    }
}

impl Runtime {
    /// Applies an operator to text operands: strings and string arrays.
    ///
    /// The six comparisons are lexicographic and yield Int32 truth values.
    /// `Add` concatenates. A string paired with a string array applies to
    /// every element; two string arrays must have the same dimensions.
    ///
    /// # Errors
    /// - `IllegalTypeCombination` for any other operator.
    /// - `IncompatibleDimensions` for string arrays of different shapes.
    pub(crate) fn eval_string(&mut self, operation: BinaryOperation) -> EvalResult<SymbolId> {
        let compare = real_comparison::<&str>(operation.op);
        if compare.is_none() && operation.op != BinaryOperator::Add {
            return Err(self.illegal_combination(operation));
        }

        let lhs = self.text(operation, operation.lhs)?;
        let rhs = self.text(operation, operation.rhs)?;
        let dims = match (lhs.dims(), rhs.dims()) {
            (None, None) => None,
            (Some(d), None) | (None, Some(d)) => Some(Dims::from_slice(d)),
            (Some(a), Some(b)) if a == b => Some(Dims::from_slice(a)),
            (Some(a), Some(b)) => {
                return Err(RuntimeError::IncompatibleDimensions { lhs: a.to_vec(),
                                                                  rhs: b.to_vec(), });
            },
        };
        let len = lhs.len().max(rhs.len());

        match compare {
            Some(f) => {
                let out: Vec<i32> = (0..len).map(|i| truth(f(lhs.at(i), rhs.at(i)))).collect();
                self.store_result(out, dims)
            },
            None => {
                let out: Vec<String> = (0..len).map(|i| format!("{}{}", lhs.at(i), rhs.at(i)))
                                               .collect();
                let payload = match dims {
                    None => Payload::String(out.concat()),
                    Some(dims) => Payload::Array(Array::new(&dims, ArrayData::String(out))?),
                };
                self.store.allocate_temp(payload)
            },
        }
    }

    /// Reads a text operand.
    fn text(&self, operation: BinaryOperation, id: SymbolId) -> EvalResult<Text<'_>> {
        match self.store.payload(id)? {
            Payload::String(s) => Ok(Text::One(s)),
            Payload::Array(a) => match a.data() {
                ArrayData::String(items) => Ok(Text::Many(items, a.dims())),
                _ => Err(self.illegal_combination(operation)),
            },
            _ => Err(self.illegal_combination(operation)),
        }
    }
}

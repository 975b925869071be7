use std::borrow::Cow;

use crate::{
    interpreter::{
        evaluator::{
            binary::{
                core::BinaryOperation,
                kernel::{
                    Arithmetic, array_array, array_array_in_place, array_array_in_place_right,
                    array_scalar, array_scalar_in_place, scalar_array, scalar_array_in_place, truth,
                },
            },
            broadcast::BroadcastPlan,
            core::{EvalResult, Runtime},
        },
        store::core::{Payload, SymbolId},
        types::{ElementType, computation_type},
        value::{
            core::{Array, Dims},
            element::{Element, scalar_value, values},
        },
    },
};

/// How the shapes of the two operands pair up.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ShapePath {
    ScalarScalar,
    ScalarArray,
    ArrayScalar,
    ArrayArray,
    Broadcast(BroadcastPlan),
}

/// Which operand's buffer receives the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reuse {
    Left,
    Right,
}

impl Runtime {
    /// Applies an operator to two numeric Scalar or Array operands.
    ///
    /// Both operands are read as the computation type of the operator. When
    /// the left operand is a scalar and the operator has a mirror image, the
    /// operands are swapped so the array-scalar loop does the work.
    pub(crate) fn eval_numeric(&mut self, operation: BinaryOperation) -> EvalResult<SymbolId> {
        let lhs_type = self.operand_type(operation.lhs)?;
        let rhs_type = self.operand_type(operation.rhs)?;
        let Some(ty) = computation_type(operation.op, lhs_type, rhs_type) else {
            return Err(self.illegal_combination(operation));
        };

        let (mut operation, mut path, dims) =
            match (self.dims_of(operation.lhs)?, self.dims_of(operation.rhs)?) {
                (None, None) => (operation, ShapePath::ScalarScalar, None),
                (None, Some(d)) => (operation, ShapePath::ScalarArray, Some(d)),
                (Some(d), None) => (operation, ShapePath::ArrayScalar, Some(d)),
                (Some(a), Some(b)) if a == b => (operation, ShapePath::ArrayArray, Some(a)),
                (Some(a), Some(b)) => {
                    let plan = BroadcastPlan::new(&a, &b)?;
                    let dims = Dims::from_slice(plan.dims());
                    (operation, ShapePath::Broadcast(plan), Some(dims))
                },
            };

        if path == ShapePath::ScalarArray
           && let Some(mirrored) = operation.op.mirrored()
        {
            operation = BinaryOperation { op:  mirrored,
                                          lhs: operation.rhs,
                                          rhs: operation.lhs, };
            path = ShapePath::ArrayScalar;
        }

        let reuse = self.reuse_candidate(operation, &path, ty);
        crate::dispatch_numeric!(ty,
                                 T => self.compute::<T>(operation, &path, dims, reuse),
                                 string => Err(self.illegal_combination(operation)))
    }

    /// The dimensions of an Array operand, or `None` for a Scalar.
    fn dims_of(&self, id: SymbolId) -> EvalResult<Option<Dims>> {
        Ok(match self.store.payload(id)? {
               Payload::Array(a) => Some(Dims::from_slice(a.dims())),
               _ => None,
           })
    }

    /// Picks an operand whose buffer can hold the result: an unshared
    /// temporary array that already has the result type and size.
    fn reuse_candidate(&self,
                       operation: BinaryOperation,
                       path: &ShapePath,
                       ty: ElementType)
                       -> Option<Reuse> {
        if operation.op.is_comparison() || operation.lhs == operation.rhs {
            return None;
        }
        let fits = |id: SymbolId| {
            self.is_reusable(id)
            && matches!(self.store.payload(id), Ok(Payload::Array(a)) if a.element_type() == ty)
        };

        match path {
            ShapePath::ArrayScalar | ShapePath::ArrayArray if fits(operation.lhs) => Some(Reuse::Left),
            ShapePath::ScalarArray | ShapePath::ArrayArray if fits(operation.rhs) => {
                Some(Reuse::Right)
            },
            _ => None,
        }
    }

    /// Runs the operator with both operands read as `T`.
    fn compute<T: Arithmetic>(&mut self,
                              operation: BinaryOperation,
                              path: &ShapePath,
                              dims: Option<Dims>,
                              reuse: Option<Reuse>)
                              -> EvalResult<SymbolId> {
        let op = operation.op;
        if op.is_comparison() {
            let f = T::comparison(op).ok_or_else(|| self.illegal_combination(operation))?;
            let out = self.combine::<T, i32>(operation, path, |a, b| truth(f(a, b)))?;
            return self.store_result(out, dims);
        }

        let f = T::arithmetic(op).ok_or_else(|| self.illegal_combination(operation))?;
        if let Some(side) = reuse {
            return self.combine_in_place(operation, path, side, f);
        }
        let out = self.combine::<T, T>(operation, path, f)?;
        self.store_result(out, dims)
    }

    /// Reads an operand as a slice of `T`: one element for a Scalar.
    fn operand_values<T: Element>(&self,
                                  operation: BinaryOperation,
                                  id: SymbolId)
                                  -> EvalResult<Cow<'_, [T]>> {
        match self.store.payload(id)? {
            Payload::Scalar(s) => Ok(Cow::Owned(vec![scalar_value(*s)])),
            Payload::Array(a) => values(a.data()).ok_or_else(|| self.illegal_combination(operation)),
            _ => Err(self.illegal_combination(operation)),
        }
    }

    /// Computes the result elements into a new buffer.
    fn combine<T: Element, U: Copy + Default>(&self,
                                              operation: BinaryOperation,
                                              path: &ShapePath,
                                              f: impl Fn(T, T) -> U)
                                              -> EvalResult<Vec<U>> {
        let l = self.operand_values::<T>(operation, operation.lhs)?;
        let r = self.operand_values::<T>(operation, operation.rhs)?;
        let len = match path {
            ShapePath::ScalarScalar => 1,
            ShapePath::ScalarArray => r.len(),
            ShapePath::ArrayScalar | ShapePath::ArrayArray => l.len(),
            ShapePath::Broadcast(plan) => plan.len(),
        };
        let mut out = vec![U::default(); len];

        match path {
            ShapePath::ScalarScalar => out[0] = f(l[0], r[0]),
            ShapePath::ScalarArray => scalar_array(l[0], &r, &mut out, f),
            ShapePath::ArrayScalar => array_scalar(&l, r[0], &mut out, f),
            ShapePath::ArrayArray => array_array(&l, &r, &mut out, f),
            ShapePath::Broadcast(plan) => plan.execute(&l, &r, &mut out, f),
        }
        Ok(out)
    }

    /// Computes the result into the buffer of one operand and returns that
    /// operand.
    fn combine_in_place<T: Arithmetic>(&mut self,
                                       operation: BinaryOperation,
                                       path: &ShapePath,
                                       side: Reuse,
                                       f: fn(T, T) -> T)
                                       -> EvalResult<SymbolId> {
        let (target, other) = match side {
            Reuse::Left => (operation.lhs, operation.rhs),
            Reuse::Right => (operation.rhs, operation.lhs),
        };
        tracing::trace!(%target, ?side, "computing in place");

        let mut payload = self.store.take_payload(target)?;
        let outcome = match &mut payload {
            Payload::Array(array) => match T::slice_mut(array.data_mut()) {
                Some(buffer) => self.operand_values::<T>(operation, other)
                                    .map(|values| match (side, path) {
                                        (Reuse::Left, ShapePath::ArrayScalar) => {
                                            array_scalar_in_place(buffer, values[0], f);
                                        },
                                        (Reuse::Left, _) => array_array_in_place(buffer, &values, f),
                                        (Reuse::Right, ShapePath::ScalarArray) => {
                                            scalar_array_in_place(values[0], buffer, f);
                                        },
                                        (Reuse::Right, _) => {
                                            array_array_in_place_right(&values, buffer, f);
                                        },
                                    }),
                None => Err(self.illegal_combination(operation)),
            },
            _ => Err(self.illegal_combination(operation)),
        };
        self.store.get_mut(target)?.payload = payload;
        outcome.map(|()| target)
    }

    /// Stores result elements as a new temporary: a Scalar when `dims` is
    /// `None`, an Array otherwise.
    pub(crate) fn store_result<U: Element>(&mut self, out: Vec<U>, dims: Option<Dims>) -> EvalResult<SymbolId> {
        let payload = match dims {
            None => Payload::Scalar(out.first().copied().unwrap_or_default().into_scalar()),
            Some(dims) => Payload::Array(Array::new(&dims, U::wrap(out))?),
        };
        self.store.allocate_temp(payload)
    }
}

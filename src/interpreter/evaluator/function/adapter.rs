use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::core::{EvalResult, Runtime},
        store::core::{Owner, Payload, SymbolId},
    },
};

/// What a [`FunctionCall`] invokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Callee {
    Internal,
    User(SymbolId),
}

/// A prepared call of a function returning a real number, for numeric code
/// outside the interpreter (such as a curve fitter) that evaluates the same
/// function many times with different arguments.
///
/// ## Usage
///
/// The call is resolved and its arity checked once with
/// [`FunctionCall::new`]; each [`FunctionCall::call`] then evaluates it on
/// argument symbols and reads the result back as an `f64`.
///
/// # Example
/// ```
/// use luxcore::{
///     ast::{BinaryOperator, RoutineKind},
///     interpreter::{
///         evaluator::{core::Runtime, function::adapter::FunctionCall},
///         value::core::Scalar,
///     },
/// };
///
/// let mut rt = Runtime::new();
/// let square = rt.define_routine(RoutineKind::Function, "square", &["x"], &[]).unwrap();
/// let x = rt.routine_variable(square, "x").unwrap();
/// let body = rt.binary_op(BinaryOperator::Mul, x, x).unwrap();
/// rt.set_routine_body(square, &[body]).unwrap();
///
/// let call = FunctionCall::new(&rt, "square", 1).unwrap();
/// let three = rt.scalar(Scalar::Int32(3)).unwrap();
/// assert_eq!(call.call(&mut rt, &[three]).unwrap(), 9.0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionCall {
    name:   String,
    callee: Callee,
    arity:  usize,
}

impl FunctionCall {
    /// Resolves `name` to a user function or an internal function and
    /// checks that it takes `arity` arguments. User functions take priority.
    ///
    /// # Errors
    /// - `UnknownFunction` if `name` is neither.
    /// - `ArgumentCountMismatch` if the function does not take `arity`
    ///   arguments.
    pub fn new(runtime: &Runtime, name: &str, arity: usize) -> EvalResult<Self> {
        let mismatch = || RuntimeError::ArgumentCountMismatch { name:  name.to_string(),
                                                                found: arity, };
        let user = runtime.store()
                          .lookup(name)
                          .ok()
                          .and_then(|id| match runtime.store().payload(id) {
                              Ok(Payload::Routine(r)) => Some((id, r.params.len())),
                              _ => None,
                          });

        let callee = match (user, Runtime::internal_accepts(name, arity)) {
            (Some((id, params)), _) if arity <= params => Callee::User(id),
            (Some(_), _) | (None, Some(false)) => return Err(mismatch()),
            (None, Some(true)) => Callee::Internal,
            (None, None) => return Err(RuntimeError::UnknownFunction { name: name.to_string() }),
        };
        Ok(Self { name: name.to_string(),
                  callee,
                  arity })
    }

    /// The name of the function.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Evaluates the function on `args` and returns its real result.
    ///
    /// While the call runs, the argument symbols are owned by the call so
    /// that the evaluation neither reuses nor deletes them; their owners are
    /// restored afterwards. Every temporary created by the call is deleted
    /// before it returns.
    ///
    /// # Errors
    /// - `ArgumentCountMismatch` if `args` does not have the prepared arity.
    /// - `IllegalClass` if an argument is not a numeric Scalar or Array.
    /// - `NonNumericResult` if the result is not a real Scalar.
    /// - Any error of the function itself.
    pub fn call(&self, runtime: &mut Runtime, args: &[SymbolId]) -> EvalResult<f64> {
        if args.len() != self.arity {
            return Err(RuntimeError::ArgumentCountMismatch { name:  self.name.clone(),
                                                             found: args.len(), });
        }
        for &arg in args {
            match runtime.store.payload(arg)? {
                Payload::Scalar(_) => {},
                Payload::Array(a) if a.element_type().is_numeric() => {},
                other => {
                    return Err(RuntimeError::IllegalClass { class:     other.class(),
                                                            operation: "pass to a numeric function" });
                },
            }
        }
        runtime.store.enter_scope();
        let outcome = self.call_in_scope(runtime, args);
        runtime.store.leave_scope(None);
        outcome
    }

    fn call_in_scope(&self, runtime: &mut Runtime, args: &[SymbolId]) -> EvalResult<f64> {
        let payload = match self.callee {
            Callee::Internal => Payload::InternalFunctionCall { name: self.name.clone(),
                                                                args: args.to_vec(), },
            Callee::User(routine) => Payload::UserFunctionCall { routine,
                                                                 args: args.to_vec() },
        };
        let call = runtime.store.allocate_temp(payload)?;

        let mut guarded = Vec::with_capacity(args.len());
        for &arg in args {
            let symbol = runtime.store.get_mut(arg)?;
            if symbol.name.is_none() && !guarded.iter().any(|&(a, _)| a == arg) {
                guarded.push((arg, symbol.owner));
                symbol.owner = Owner::Container(call);
            }
        }
        tracing::debug!(function = %self.name, guarded = guarded.len(), "calling through adapter");

        let outcome = runtime.eval(call).and_then(|result| self.read_result(runtime, result));

        for (arg, owner) in guarded {
            if let Ok(symbol) = runtime.store.get_mut(arg) {
                symbol.owner = owner;
            }
        }
        outcome
    }

    fn read_result(&self, runtime: &Runtime, result: SymbolId) -> EvalResult<f64> {
        runtime.scalar_value(result)
               .ok()
               .and_then(|s| s.as_real())
               .ok_or_else(|| RuntimeError::NonNumericResult { name: self.name.clone() })
    }
}

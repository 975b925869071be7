use crate::{
    ast::RoutineKind,
    error::RuntimeError,
    interpreter::{
        evaluator::{
            core::{EvalResult, Runtime},
            function::builtin,
        },
        store::core::{Class, Payload, Routine, SymbolId},
    },
};

/// Type alias for internal function handlers.
///
/// An internal function receives the runtime and its evaluated argument
/// symbols and returns the symbol holding its result.
type BuiltinFn = fn(&mut Runtime, &[SymbolId]) -> EvalResult<SymbolId>;

/// Specifies the allowed number of arguments for an internal function.
///
/// - `Exact(n)` means the function must receive exactly `n` arguments.
/// - `OneOf(slice)` means the function accepts any arity listed in `slice`.
#[derive(Clone, Copy)]
enum Arity {
    Exact(usize),
    OneOf(&'static [usize]),
}

/// Defines internal functions by generating a lookup table and a name list.
///
/// Each entry provides:
/// - a string name,
/// - an arity specification,
/// - a function pointer implementing the function.
///
/// The macro produces:
/// - `BuiltinDef` (internal metadata),
/// - `BUILTIN_TABLE` (static table for lookup),
/// - `INTERNAL_FUNCTIONS` (public list of function names).
macro_rules! builtin_functions {
    (
        $(
            $name:literal => {
                arity: $arity:expr,
                func: $func:expr $(,)?
            }
        ),* $(,)?
    ) => {
        struct BuiltinDef {
            name:  &'static str,
            arity: Arity,
            func:  BuiltinFn,
        }
        static BUILTIN_TABLE: &[BuiltinDef] = &[
            $(
                BuiltinDef { name: $name, arity: $arity, func: $func },
            )*
        ];
        /// The names of all internal functions.
        pub const INTERNAL_FUNCTIONS: &[&str] = &[
            $($name,)*
        ];
    };
}

builtin_functions! {
    "abs"       => { arity: Arity::Exact(1), func: builtin::abs },
    "sqrt"      => { arity: Arity::Exact(1), func: builtin::sqrt },
    "exp"       => { arity: Arity::Exact(1), func: builtin::exp },
    "ln"        => { arity: Arity::Exact(1), func: builtin::ln },
    "sin"       => { arity: Arity::Exact(1), func: builtin::sin },
    "cos"       => { arity: Arity::Exact(1), func: builtin::cos },
    "real"      => { arity: Arity::Exact(1), func: builtin::real },
    "imaginary" => { arity: Arity::Exact(1), func: builtin::imaginary },
    "conjugate" => { arity: Arity::Exact(1), func: builtin::conjugate },
    "total"     => { arity: Arity::Exact(1), func: builtin::total },
    "num_elem"  => { arity: Arity::Exact(1), func: builtin::num_elem },
    "dimen"     => { arity: Arity::OneOf(&[1, 2]), func: builtin::dimen },
    "indgen"    => { arity: Arity::Exact(1), func: builtin::indgen },
}

impl Arity {
    /// Tests whether the given argument count satisfies this arity constraint.
    ///
    /// Returns `true` if the count is permitted, `false` otherwise.
    fn check(&self, n: usize) -> bool {
        match self {
            Self::Exact(m) => n == *m,
            Self::OneOf(arr) => arr.contains(&n),
        }
    }
}

fn find_internal(name: &str) -> Option<&'static BuiltinDef> {
    BUILTIN_TABLE.iter().find(|b| b.name == name)
}

impl Runtime {
    /// Returns `true` if `name` is an internal function.
    ///
    /// # Example
    /// ```
    /// use luxcore::interpreter::evaluator::core::Runtime;
    ///
    /// assert!(Runtime::is_internal_function("sqrt"));
    /// assert!(!Runtime::is_internal_function("fit"));
    /// ```
    #[must_use]
    pub fn is_internal_function(name: &str) -> bool {
        find_internal(name).is_some()
    }

    /// Whether the internal function `name` accepts `count` arguments, or
    /// `None` if there is no such function.
    pub(crate) fn internal_accepts(name: &str, count: usize) -> Option<bool> {
        find_internal(name).map(|b| b.arity.check(count))
    }

    /// Evaluates a call of an internal function.
    ///
    /// The arity is checked before any argument is evaluated. Arguments are
    /// evaluated left to right.
    ///
    /// # Errors
    /// - `UnknownFunction` if there is no internal function `name`.
    /// - `ArgumentCountMismatch` if the arity does not fit.
    pub(crate) fn call_internal(&mut self, name: &str, args: &[SymbolId]) -> EvalResult<SymbolId> {
        let builtin = find_internal(name).ok_or_else(|| RuntimeError::UnknownFunction { name: name.to_string() })?;
        if !builtin.arity.check(args.len()) {
            return Err(RuntimeError::ArgumentCountMismatch { name:  name.to_string(),
                                                             found: args.len(), });
        }
        let values = args.iter()
                         .map(|&a| self.eval(a))
                         .collect::<EvalResult<Vec<_>>>()?;
        tracing::debug!(function = name, args = values.len(), "calling internal function");
        (builtin.func)(self, &values)
    }

    /// Evaluates a call of a user function and returns the value of the
    /// last expression of its body.
    ///
    /// # Errors
    /// - `IllegalClass` if `routine` is not a function. Subroutines have no
    ///   value and must be run with [`Runtime::call_subroutine`].
    /// - `ArgumentCountMismatch` for more arguments than parameters.
    /// - `UndefinedSymbol` if the body is empty.
    pub(crate) fn call_user(&mut self, routine: SymbolId, args: &[SymbolId]) -> EvalResult<SymbolId> {
        let routine = self.routine(routine)?;
        if routine.kind == RoutineKind::Subroutine {
            return Err(RuntimeError::IllegalClass { class:     Class::Routine,
                                                    operation: "take the value of a subroutine" });
        }
        self.run_routine(&routine, args)?
            .ok_or(RuntimeError::UndefinedSymbol { name: routine.name })
    }

    /// Runs a subroutine (or a function, discarding its value). Every
    /// temporary created by the call is deleted before it returns.
    ///
    /// # Errors
    /// As for a function call, except that subroutines are accepted.
    ///
    /// # Example
    /// ```
    /// use luxcore::{ast::RoutineKind, interpreter::{evaluator::core::Runtime, value::core::Scalar}};
    ///
    /// let mut rt = Runtime::new();
    /// let show = rt.define_routine(RoutineKind::Subroutine, "show", &["x"], &[]).unwrap();
    /// let x = rt.routine_variable(show, "x").unwrap();
    /// rt.set_routine_body(show, &[x]).unwrap();
    ///
    /// let arg = rt.scalar(Scalar::Int32(1)).unwrap();
    /// let before = rt.store().live_count();
    /// rt.call_subroutine(show, &[arg]).unwrap();
    /// assert_eq!(rt.store().live_count(), before);
    /// ```
    pub fn call_subroutine(&mut self, routine: SymbolId, args: &[SymbolId]) -> EvalResult<()> {
        let routine = self.routine(routine)?;
        self.store.enter_scope();
        let outcome = self.run_routine(&routine, args);
        self.store.leave_scope(None);
        outcome.map(|_| ())
    }

    /// Looks up a parameter or local variable of a routine by name.
    ///
    /// # Errors
    /// - `IllegalClass` if `routine` is not a routine.
    /// - `NoSuchMember` if the routine has no variable of that name.
    pub fn routine_variable(&self, routine: SymbolId, name: &str) -> EvalResult<SymbolId> {
        let Payload::Routine(r) = self.store.payload(routine)? else {
            return Err(RuntimeError::IllegalClass { class:     self.store.class_of(routine)?,
                                                    operation: "look up a variable of" });
        };
        r.params
         .iter()
         .chain(&r.locals)
         .copied()
         .find(|&v| self.store.get(v).is_ok_and(|s| s.name() == Some(name)))
         .ok_or_else(|| RuntimeError::NoSuchMember { name:  name.to_string(),
                                                     class: Class::Routine, })
    }

    fn routine(&self, id: SymbolId) -> EvalResult<Routine> {
        match self.store.payload(id)? {
            Payload::Routine(r) => Ok(r.clone()),
            other => Err(RuntimeError::IllegalClass { class:     other.class(),
                                                      operation: "call" }),
        }
    }

    /// Binds the arguments to the parameters, runs the body and restores the
    /// parameters, also when the body fails.
    ///
    /// Arguments are evaluated before any parameter is rebound, so a
    /// recursive call sees the caller's bindings. Parameters without an
    /// argument are undefined during the call.
    fn run_routine(&mut self, routine: &Routine, args: &[SymbolId]) -> EvalResult<Option<SymbolId>> {
        if args.len() > routine.params.len() {
            return Err(RuntimeError::ArgumentCountMismatch { name:  routine.name.clone(),
                                                             found: args.len(), });
        }
        let values = args.iter()
                         .map(|&a| self.eval(a))
                         .collect::<EvalResult<Vec<_>>>()?;
        tracing::debug!(routine = %routine.name, args = values.len(), "calling routine");

        let mut saved = Vec::with_capacity(routine.params.len());
        for (i, &param) in routine.params.iter().enumerate() {
            let binding = values.get(i).map_or(Payload::Undefined, |&v| Payload::Transfer(v));
            saved.push(std::mem::replace(&mut self.store.get_mut(param)?.payload, binding));
        }

        let mut outcome = Ok(None);
        for &expr in &routine.body {
            outcome = self.eval(expr).map(Some);
            if outcome.is_err() {
                break;
            }
        }

        for (&param, payload) in routine.params.iter().zip(saved) {
            if let Ok(symbol) = self.store.get_mut(param) {
                symbol.payload = payload;
            }
        }
        outcome
    }
}

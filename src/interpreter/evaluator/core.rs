use crate::{
    error::RuntimeError,
    interpreter::{
        store::core::{
            Class, DEFAULT_SYMBOL_CAPACITY, ListMember, Owner, Payload, Range, SymbolId,
            SymbolStore,
        },
        types::ElementType,
        value::core::{Array, Scalar},
    },
};

/// Result type used by the evaluator.
///
/// All evaluation functions return either a value of type `T` or a
/// `RuntimeError` describing the failure.
pub type EvalResult<T> = Result<T, RuntimeError>;

/// Default for [`RuntimeConfig::piping`].
pub const DEFAULT_PIPING: bool = true;

/// Settings of a [`Runtime`].
///
/// # Example
/// ```
/// use luxcore::interpreter::evaluator::core::RuntimeConfig;
///
/// let config = RuntimeConfig::default().symbol_capacity(128).piping(false);
/// assert_eq!(config.symbol_capacity, 128);
/// assert!(!config.piping);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Maximum number of symbols alive at once.
    pub symbol_capacity: usize,
    /// Whether operators may write their result into the buffer of an
    /// operand that is an unshared temporary of the right type and size.
    pub piping:          bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self { symbol_capacity: DEFAULT_SYMBOL_CAPACITY,
               piping:          DEFAULT_PIPING, }
    }
}

impl RuntimeConfig {
    /// Sets the symbol capacity.
    #[must_use]
    pub const fn symbol_capacity(mut self, capacity: usize) -> Self {
        self.symbol_capacity = capacity;
        self
    }

    /// Turns in-place piping on or off.
    #[must_use]
    pub const fn piping(mut self, enabled: bool) -> Self {
        self.piping = enabled;
        self
    }
}

/// The runtime: the symbol store plus its settings.
///
/// All evaluation goes through [`Runtime::eval`], which evaluates one
/// symbol, recursing into its operands, and reclaims every temporary the
/// evaluation created except the result.
///
/// ## Usage
///
/// A `Runtime` is created once per session. Expression graphs are built with
/// the constructors in the `graph` module, named variables are defined with
/// [`Runtime::define`], and results are read back through
/// [`Runtime::store`].
#[derive(Debug)]
pub struct Runtime {
    pub(crate) store:  SymbolStore,
    pub(crate) config: RuntimeConfig,
}

impl Default for Runtime {
    fn default() -> Self {
        Self::with_config(RuntimeConfig::default())
    }
}

impl Runtime {
    /// Creates a runtime with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a runtime with the given configuration.
    #[must_use]
    pub fn with_config(config: RuntimeConfig) -> Self {
        Self { store: SymbolStore::with_capacity(config.symbol_capacity),
               config }
    }

    /// The symbol store.
    #[must_use]
    pub const fn store(&self) -> &SymbolStore {
        &self.store
    }

    /// The symbol store, for direct manipulation.
    pub const fn store_mut(&mut self) -> &mut SymbolStore {
        &mut self.store
    }

    /// The configuration.
    #[must_use]
    pub const fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Evaluates a symbol and returns the symbol holding its value.
    ///
    /// Values (scalars, arrays, strings, enums, structs, file maps and
    /// routines) evaluate to themselves. Everything else is evaluated inside
    /// a fresh temporary scope: the result, if new, becomes a temporary of
    /// the caller's scope, and every other temporary created along the way is
    /// deleted, also when evaluation fails.
    ///
    /// # Parameters
    /// - `id`: Symbol to evaluate.
    ///
    /// # Returns
    /// The id of the value. It is `id` itself for values, a named symbol for
    /// aliases of named variables, or a new temporary.
    ///
    /// # Example
    /// ```
    /// use luxcore::{
    ///     ast::BinaryOperator,
    ///     interpreter::{evaluator::core::Runtime, value::core::Scalar},
    /// };
    ///
    /// let mut rt = Runtime::new();
    /// let a = rt.scalar(Scalar::Byte(3)).unwrap();
    /// let b = rt.scalar(Scalar::Int32(4)).unwrap();
    /// let sum = rt.binary_op(BinaryOperator::Add, a, b).unwrap();
    ///
    /// let result = rt.eval(sum).unwrap();
    /// assert_eq!(rt.scalar_value(result).unwrap(), Scalar::Int32(7));
    /// ```
    pub fn eval(&mut self, id: SymbolId) -> EvalResult<SymbolId> {
        let class = self.store.class_of(id)?;
        tracing::debug!(%id, %class, level = self.store.level(), "eval");

        match class {
            Class::Scalar
            | Class::Array
            | Class::String
            | Class::Enum
            | Class::Struct
            | Class::FileMap
            | Class::Routine => Ok(id),
            Class::Undefined => Err(self.undefined(id)),
            _ => self.with_temp_scope(|rt| rt.eval_compound(id, class)),
        }
    }

    /// Evaluates a symbol that is not a plain value.
    fn eval_compound(&mut self, id: SymbolId, class: Class) -> EvalResult<SymbolId> {
        match self.store.payload(id)?.clone() {
            Payload::Range(range) => self.eval_range(id, range),
            Payload::List(members) => self.eval_list(id, members),
            Payload::CList(members) => self.eval_clist(id, members),
            Payload::Transfer(target) | Payload::Pointer(target) => self.eval(target),
            Payload::BinaryOp { op, lhs, rhs } => {
                let lhs = self.eval(lhs)?;
                let rhs = self.eval(rhs)?;
                self.binary(op, lhs, rhs)
            },
            Payload::InternalFunctionCall { name, args } => self.call_internal(&name, &args),
            Payload::UserFunctionCall { routine, args } => self.call_user(routine, &args),
            Payload::Extract { target, links } => self.eval_extract(target, &links),
            Payload::StructPtr(cursor) => self.eval_struct_ptr(&cursor),
            _ => Err(RuntimeError::IllegalClass { class,
                                                  operation: "evaluate" }),
        }
    }

    /// Runs `f` in a fresh temporary scope. See
    /// [`SymbolStore::with_temp_scope`].
    pub(crate) fn with_temp_scope<F>(&mut self, f: F) -> EvalResult<SymbolId>
        where F: FnOnce(&mut Self) -> EvalResult<SymbolId>
    {
        self.store.enter_scope();
        let result = f(self);
        self.store.leave_scope(result.as_ref().ok().copied());
        result
    }

    /// Evaluates both endpoints of a range. A new range is built only if an
    /// endpoint changed.
    fn eval_range(&mut self, id: SymbolId, range: Range) -> EvalResult<SymbolId> {
        let start = self.eval(range.start.symbol)?;
        let end = self.eval(range.end.symbol)?;
        if start == range.start.symbol && end == range.end.symbol {
            return Ok(id);
        }

        let mut evaluated = range;
        evaluated.start.symbol = start;
        evaluated.end.symbol = end;
        let new = self.store.allocate_temp(Payload::Range(evaluated))?;
        self.embed_temporaries(new, &[start, end])?;
        Ok(new)
    }

    /// Evaluates every member of a keyed list.
    fn eval_list(&mut self, id: SymbolId, members: Vec<ListMember>) -> EvalResult<SymbolId> {
        let values = members.iter()
                            .map(|m| self.eval(m.value))
                            .collect::<EvalResult<Vec<_>>>()?;
        if members.iter().zip(&values).all(|(m, &v)| m.value == v) {
            return Ok(id);
        }

        let evaluated = members.into_iter()
                               .zip(&values)
                               .map(|(m, &value)| ListMember { key: m.key, value })
                               .collect();
        let new = self.store.allocate_temp(Payload::List(evaluated))?;
        self.embed_temporaries(new, &values)?;
        Ok(new)
    }

    /// Evaluates every member of a positional list.
    fn eval_clist(&mut self, id: SymbolId, members: Vec<SymbolId>) -> EvalResult<SymbolId> {
        let values = members.iter()
                            .map(|&m| self.eval(m))
                            .collect::<EvalResult<Vec<_>>>()?;
        if members == values {
            return Ok(id);
        }

        let new = self.store.allocate_temp(Payload::CList(values.clone()))?;
        self.embed_temporaries(new, &values)?;
        Ok(new)
    }

    /// Embeds the temporaries among `members` into `parent`.
    pub(crate) fn embed_temporaries(&mut self,
                                    parent: SymbolId,
                                    members: &[SymbolId])
                                    -> EvalResult<()> {
        for &member in members {
            if self.store.get(member)?.owner().is_temporary() {
                self.store.embed(member, parent)?;
            }
        }
        Ok(())
    }

    /// Builds the error for evaluating a symbol without a value.
    fn undefined(&self, id: SymbolId) -> RuntimeError {
        let name = self.store
                       .get(id)
                       .ok()
                       .and_then(|s| s.name().map(str::to_string))
                       .unwrap_or_else(|| id.to_string());
        RuntimeError::UndefinedSymbol { name }
    }

    /// Defines or redefines a named variable holding `payload`.
    ///
    /// Members referenced by the payload that are not owned yet become
    /// members of the variable.
    ///
    /// # Errors
    /// Returns `OutOfSymbols` if the table is full.
    pub fn define(&mut self, name: &str, payload: Payload) -> EvalResult<SymbolId> {
        let id = self.store.define_named(name, payload)?;
        self.store.adopt_children(id)?;
        Ok(id)
    }

    /// Evaluates `value` and stores the result in the named variable `name`,
    /// creating the variable if needed.
    ///
    /// A temporary result is moved into the variable; any other result is
    /// copied. The variable keeps its id when it already exists.
    ///
    /// # Errors
    /// Returns any error from evaluating `value`.
    ///
    /// # Example
    /// ```
    /// use luxcore::interpreter::{evaluator::core::Runtime, value::core::Scalar};
    ///
    /// let mut rt = Runtime::new();
    /// let five = rt.scalar(Scalar::Int32(5)).unwrap();
    /// let x = rt.assign("x", five).unwrap();
    ///
    /// assert_eq!(rt.store().lookup("x").unwrap(), x);
    /// assert_eq!(rt.scalar_value(x).unwrap(), Scalar::Int32(5));
    /// ```
    pub fn assign(&mut self, name: &str, value: SymbolId) -> EvalResult<SymbolId> {
        let result = self.eval(value)?;
        let target = match self.store.lookup(name) {
            Ok(id) => id,
            Err(_) => self.store.define_named(name, Payload::Undefined)?,
        };
        if result == target {
            return Ok(target);
        }

        let source = if self.store.get(result)?.owner().is_temporary() {
            result
        } else {
            self.store.duplicate(result)?
        };
        self.store.transplant(source, target)?;
        Ok(target)
    }

    /// Evaluates `id` and converts the value to element type `ty`.
    ///
    /// Narrowing follows `as` semantics: floats truncate toward zero and
    /// saturate at the integer bounds, wider integers wrap, and complex
    /// values lose their imaginary part.
    ///
    /// # Errors
    /// Returns `IllegalClass` for anything but Scalar and Array values, and
    /// for conversions between strings and numbers.
    ///
    /// # Example
    /// ```
    /// use luxcore::interpreter::{evaluator::core::Runtime, types::ElementType, value::core::Scalar};
    ///
    /// let mut rt = Runtime::new();
    /// let x = rt.scalar(Scalar::Double(-3.9)).unwrap();
    /// let y = rt.cast(x, ElementType::Int16).unwrap();
    ///
    /// assert_eq!(rt.scalar_value(y).unwrap(), Scalar::Int16(-3));
    /// ```
    pub fn cast(&mut self, id: SymbolId, ty: ElementType) -> EvalResult<SymbolId> {
        self.with_temp_scope(|rt| {
                let value = rt.eval(id)?;
                let payload = match rt.store.payload(value)? {
                    Payload::Scalar(s) => s.cast(ty).map(Payload::Scalar),
                    Payload::Array(a) => a.data()
                                          .cast(ty)
                                          .map(|data| Array::new(a.dims(), data))
                                          .transpose()?
                                          .map(Payload::Array),
                    _ => None,
                };
                let class = rt.store.class_of(value)?;
                let payload = payload.ok_or(RuntimeError::IllegalClass { class,
                                                                         operation: "convert" })?;
                rt.store.allocate_temp(payload)
            })
    }

    /// Reads a symbol as a scalar, following aliases.
    ///
    /// # Errors
    /// Returns `IllegalClass` if the symbol is not a Scalar.
    pub fn scalar_value(&self, id: SymbolId) -> EvalResult<Scalar> {
        match self.resolve_alias(id)? {
            Payload::Scalar(s) => Ok(*s),
            other => Err(RuntimeError::IllegalClass { class:     other.class(),
                                                      operation: "read a scalar from" }),
        }
    }

    /// Reads a symbol as an array, following aliases.
    ///
    /// # Errors
    /// Returns `IllegalClass` if the symbol is not an Array.
    pub fn array_value(&self, id: SymbolId) -> EvalResult<&Array> {
        match self.resolve_alias(id)? {
            Payload::Array(a) => Ok(a),
            other => Err(RuntimeError::IllegalClass { class:     other.class(),
                                                      operation: "read an array from" }),
        }
    }

    /// Reads a symbol as a string, following aliases.
    ///
    /// # Errors
    /// Returns `IllegalClass` if the symbol is not a String.
    pub fn string_value(&self, id: SymbolId) -> EvalResult<&str> {
        match self.resolve_alias(id)? {
            Payload::String(s) => Ok(s),
            other => Err(RuntimeError::IllegalClass { class:     other.class(),
                                                      operation: "read a string from" }),
        }
    }

    /// Follows Transfer and Pointer aliases to the payload they stand for.
    fn resolve_alias(&self, mut id: SymbolId) -> EvalResult<&Payload> {
        loop {
            match self.store.payload(id)? {
                Payload::Transfer(target) | Payload::Pointer(target) => id = *target,
                payload => return Ok(payload),
            }
        }
    }

    /// Whether `id` is an unshared temporary of the current scope, whose
    /// storage an operation may reuse for its result.
    pub(crate) fn is_reusable(&self, id: SymbolId) -> bool {
        self.config.piping
        && self.store.get(id).is_ok_and(|s| {
                                  s.name().is_none()
                                  && s.owner() == Owner::Temporary(self.store.level())
                                  && s.is_marked()
                              })
    }
}

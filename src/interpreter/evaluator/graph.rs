use crate::{
    ast::{BinaryOperator, Link, RoutineKind},
    error::RuntimeError,
    interpreter::{
        evaluator::core::{EvalResult, Runtime},
        store::core::{
            EnumMember, ListMember, Owner, Payload, Range, RangeBound, Routine, StructMember,
            SymbolId,
        },
        value::core::{Array, ArrayData, Scalar},
    },
};

impl Runtime {
    /// Adds a permanent node to the expression graph and makes the symbols it
    /// refers to its members, unless they are named or already owned.
    ///
    /// # Errors
    /// Returns `OutOfSymbols` if the table is full.
    pub fn node(&mut self, payload: Payload) -> EvalResult<SymbolId> {
        let id = self.store.allocate_permanent(payload)?;
        self.store.adopt_children(id)?;
        Ok(id)
    }

    /// Adds a scalar literal.
    ///
    /// # Errors
    /// Returns `OutOfSymbols` if the table is full.
    pub fn scalar(&mut self, value: Scalar) -> EvalResult<SymbolId> {
        self.node(Payload::Scalar(value))
    }

    /// Adds an array literal.
    ///
    /// # Errors
    /// Returns `InvalidDimensions` if `dims` does not fit `data`, or
    /// `OutOfSymbols`.
    ///
    /// # Example
    /// ```
    /// use luxcore::interpreter::{evaluator::core::Runtime, value::core::ArrayData};
    ///
    /// let mut rt = Runtime::new();
    /// let a = rt.array(&[3, 1], ArrayData::Int32(vec![1, 2, 3])).unwrap();
    /// assert_eq!(rt.array_value(a).unwrap().dims(), &[3, 1]);
    /// ```
    pub fn array(&mut self, dims: &[usize], data: ArrayData) -> EvalResult<SymbolId> {
        let array = Array::new(dims, data)?;
        self.node(Payload::Array(array))
    }

    /// Adds a string literal.
    ///
    /// # Errors
    /// Returns `OutOfSymbols` if the table is full.
    pub fn string(&mut self, text: &str) -> EvalResult<SymbolId> {
        self.node(Payload::String(text.to_string()))
    }

    /// Adds a range `start:end`.
    ///
    /// # Errors
    /// Returns `OutOfSymbols` if the table is full.
    pub fn range(&mut self, start: RangeBound, end: RangeBound) -> EvalResult<SymbolId> {
        self.node(Payload::Range(Range { start,
                                         end,
                                         sum: false,
                                         redirect: None }))
    }

    /// Adds a keyed list. Members without a key are positional only.
    ///
    /// # Errors
    /// Returns `OutOfSymbols` if the table is full.
    pub fn list(&mut self, members: &[(Option<&str>, SymbolId)]) -> EvalResult<SymbolId> {
        let members = members.iter()
                             .map(|&(key, value)| ListMember { key: key.map(str::to_string),
                                                               value })
                             .collect();
        self.node(Payload::List(members))
    }

    /// Adds a positional list.
    ///
    /// # Errors
    /// Returns `OutOfSymbols` if the table is full.
    pub fn clist(&mut self, members: &[SymbolId]) -> EvalResult<SymbolId> {
        self.node(Payload::CList(members.to_vec()))
    }

    /// Adds a struct with the given named members.
    ///
    /// # Errors
    /// Returns `OutOfSymbols` if the table is full.
    pub fn structure(&mut self, members: &[(&str, SymbolId)]) -> EvalResult<SymbolId> {
        let members = members.iter()
                             .map(|&(name, value)| StructMember { name: name.to_string(),
                                                                  value })
                             .collect();
        self.node(Payload::Struct(members))
    }

    /// Adds an enum of named integer constants.
    ///
    /// # Errors
    /// Returns `OutOfSymbols` if the table is full.
    pub fn enumeration(&mut self, members: &[(&str, i32)]) -> EvalResult<SymbolId> {
        let members = members.iter()
                             .map(|&(name, value)| EnumMember { name: name.to_string(),
                                                                value })
                             .collect();
        self.node(Payload::Enum(members))
    }

    /// Adds an operator node `lhs op rhs`.
    ///
    /// # Errors
    /// Returns `OutOfSymbols` if the table is full.
    pub fn binary_op(&mut self,
                     op: BinaryOperator,
                     lhs: SymbolId,
                     rhs: SymbolId)
                     -> EvalResult<SymbolId> {
        self.node(Payload::BinaryOp { op, lhs, rhs })
    }

    /// Adds an access chain applied to `target`.
    ///
    /// # Errors
    /// Returns `OutOfSymbols` if the table is full.
    pub fn extract(&mut self, target: SymbolId, links: Vec<Link>) -> EvalResult<SymbolId> {
        self.node(Payload::Extract { target, links })
    }

    /// Adds a call of an internal function.
    ///
    /// # Errors
    /// Returns `UnknownFunction` if no internal function has this name, or
    /// `OutOfSymbols`.
    pub fn call(&mut self, name: &str, args: &[SymbolId]) -> EvalResult<SymbolId> {
        if !Self::is_internal_function(name) {
            return Err(RuntimeError::UnknownFunction { name: name.to_string() });
        }
        self.node(Payload::InternalFunctionCall { name: name.to_string(),
                                                  args: args.to_vec(), })
    }

    /// Adds a call of a user routine.
    ///
    /// # Errors
    /// Returns `OutOfSymbols` if the table is full.
    pub fn call_routine(&mut self, routine: SymbolId, args: &[SymbolId]) -> EvalResult<SymbolId> {
        self.node(Payload::UserFunctionCall { routine,
                                              args: args.to_vec() })
    }

    /// Adds a pointer to `target`.
    ///
    /// # Errors
    /// Returns `OutOfSymbols` if the table is full.
    pub fn pointer(&mut self, target: SymbolId) -> EvalResult<SymbolId> {
        self.store.allocate_permanent(Payload::Pointer(target))
    }

    /// Defines a named routine with the given parameter and local variable
    /// names and an empty body.
    ///
    /// Parameters and locals are symbols owned by the routine; get them with
    /// [`Runtime::routine_variable`] to build the body, then install it with
    /// [`Runtime::set_routine_body`].
    ///
    /// # Errors
    /// Returns `OutOfSymbols` if the table is full.
    pub fn define_routine(&mut self,
                          kind: RoutineKind,
                          name: &str,
                          params: &[&str],
                          locals: &[&str])
                          -> EvalResult<SymbolId> {
        let routine = self.store.define_named(name, Payload::Undefined)?;
        let mut variables = |names: &[&str]| {
            names.iter()
                 .map(|&n| {
                     self.store
                         .insert(Some(n.to_string()), Owner::Container(routine), Payload::Undefined)
                 })
                 .collect::<EvalResult<Vec<_>>>()
        };
        let params = variables(params)?;
        let locals = variables(locals)?;

        self.store.redefine(routine,
                            Payload::Routine(Routine { kind,
                                                       name: name.to_string(),
                                                       params,
                                                       locals,
                                                       body: Vec::new() }))?;
        Ok(routine)
    }

    /// Installs the body of a routine: expressions evaluated in order on each
    /// call.
    ///
    /// # Errors
    /// Returns `IllegalClass` if `routine` is not a routine.
    pub fn set_routine_body(&mut self, routine: SymbolId, body: &[SymbolId]) -> EvalResult<()> {
        let mut payload = self.store.payload(routine)?.clone();
        let Payload::Routine(r) = &mut payload else {
            return Err(RuntimeError::IllegalClass { class:     payload.class(),
                                                    operation: "set the body of" });
        };
        r.body = body.to_vec();
        self.store.redefine(routine, payload)?;
        self.store.adopt_children(routine)
    }
}

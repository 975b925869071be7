use crate::{
    ast::Link,
    error::RuntimeError,
    interpreter::{
        evaluator::core::{EvalResult, Runtime},
        store::core::{Class, CursorStep, Owner, Payload, RangeBound, StructPtr, SymbolId},
        value::core::Scalar,
    },
    util::num::{checked_index, usize_to_i64},
};

/// A resolved member selector: a position or a key.
enum Selector {
    Position(i64),
    Key(String),
}

impl Runtime {
    /// Resolves an access chain: `target` followed by `links`, applied left
    /// to right.
    ///
    /// Each intermediate value and every subscript argument is evaluated
    /// first. What a link means depends on the class of the value it is
    /// applied to:
    /// - Range: `0` selects the start, `1` the end. A from-end endpoint
    ///   yields its offset.
    /// - List and CList: a position, or (List only) a key.
    /// - Enum: a key yields a new Int32 scalar holding the constant.
    /// - Struct: the rest of the chain walks the members through a cursor.
    /// - Routine: a tag names a parameter or local variable.
    /// - Array and String: subscripts select elements or substrings.
    ///
    /// # Errors
    /// - `NoSuchMember` for an unknown tag or key.
    /// - `SubscriptOutOfRange` for a position outside the target.
    /// - `RepeatedSubscript` when a struct member is subscripted twice.
    /// - `NotImplemented` when a struct itself is subscripted.
    /// - `IllegalClass` when the value takes no links at all.
    ///
    /// # Example
    /// ```
    /// use luxcore::{
    ///     ast::Link,
    ///     interpreter::{evaluator::core::Runtime, value::core::Scalar},
    /// };
    ///
    /// let mut rt = Runtime::new();
    /// let colors = rt.enumeration(&[("red", 1), ("green", 2)]).unwrap();
    /// let green = rt.extract(colors, vec![Link::Tag("green".into())]).unwrap();
    ///
    /// let value = rt.eval(green).unwrap();
    /// assert_eq!(rt.scalar_value(value).unwrap(), Scalar::Int32(2));
    /// ```
    pub(crate) fn eval_extract(&mut self, target: SymbolId, links: &[Link]) -> EvalResult<SymbolId> {
        let mut current = self.eval(target)?;
        let mut rest = links;

        while let Some((link, tail)) = rest.split_first() {
            if matches!(self.store.payload(current)?, Payload::Struct(_)) {
                let (cursor, consumed) = self.struct_cursor(current, rest)?;
                current = self.eval(cursor)?;
                rest = &rest[consumed..];
                continue;
            }

            current = match link {
                Link::Tag(name) => self.extract_member(current, &Selector::Key(name.clone()))?,
                Link::Subscript(args) => {
                    let args = args.iter()
                                   .map(|&a| self.eval(a))
                                   .collect::<EvalResult<Vec<_>>>()?;
                    self.extract_subscript(current, &args)?
                },
            };
            rest = tail;
        }
        self.detach_member(current)?;
        Ok(current)
    }

    /// Frees a selected member from a container that is a temporary of the
    /// current scope, so that it outlives the sweep of that container.
    fn detach_member(&mut self, id: SymbolId) -> EvalResult<()> {
        let level = self.store.level();
        let mut owner = self.store.get(id)?.owner();
        while let Owner::Container(parent) = owner {
            owner = self.store.get(parent)?.owner();
        }
        if owner == Owner::Temporary(level) && !self.store.get(id)?.owner().is_temporary() {
            tracing::trace!(%id, "detaching member of a temporary container");
            self.store.get_mut(id)?.owner = Owner::Temporary(level);
            self.store.mark(id);
        }
        Ok(())
    }

    /// Applies a subscript link to an evaluated value.
    fn extract_subscript(&mut self, target: SymbolId, args: &[SymbolId]) -> EvalResult<SymbolId> {
        match self.store.class_of(target)? {
            Class::Array | Class::String => self.subscript(target, args),
            Class::Range | Class::List | Class::CList | Class::Enum => {
                let [arg] = args else {
                    return Err(RuntimeError::InvalidSubscript { details: format!("expected one subscript, found {}",
                                                                                 args.len()) });
                };
                let selector = match self.store.payload(*arg)? {
                    Payload::String(key) => Selector::Key(key.clone()),
                    Payload::Scalar(s) => Selector::Position(s.as_index().ok_or_else(|| {
                                              RuntimeError::InvalidSubscript {
                                                  details: "complex subscript".to_string(),
                                              }
                                          })?),
                    other => {
                        return Err(RuntimeError::InvalidSubscript { details: format!("{} subscript",
                                                                                     other.class()) });
                    },
                };
                self.extract_member(target, &selector)
            },
            class => Err(RuntimeError::IllegalClass { class,
                                                      operation: "subscript" }),
        }
    }

    /// Selects one member of a Range, List, CList, Enum or Routine.
    fn extract_member(&mut self, target: SymbolId, selector: &Selector) -> EvalResult<SymbolId> {
        let payload = self.store.payload(target)?;
        let class = payload.class();
        let no_such_member = |name: String| RuntimeError::NoSuchMember { name, class };

        match (payload, selector) {
            (Payload::Range(range), _) => {
                let which = match selector {
                    Selector::Position(i) => *i,
                    Selector::Key(key) => key.parse().map_err(|_| no_such_member(key.clone()))?,
                };
                match which {
                    0 => Ok(range.start.symbol),
                    1 => Ok(range.end.symbol),
                    _ => Err(RuntimeError::SubscriptOutOfRange { index: which,
                                                                 size:  2, }),
                }
            },
            (Payload::List(members), Selector::Key(key)) => members.iter()
                                                                    .find(|m| m.key.as_deref() == Some(key))
                                                                    .map(|m| m.value)
                                                                    .ok_or_else(|| no_such_member(key.clone())),
            (Payload::List(members), Selector::Position(i)) => {
                Ok(members[checked_index(*i, members.len())?].value)
            },
            (Payload::CList(members), Selector::Position(i)) => {
                Ok(members[checked_index(*i, members.len())?])
            },
            (Payload::CList(_), Selector::Key(key)) => Err(no_such_member(key.clone())),
            (Payload::Enum(members), Selector::Key(key)) => {
                let value = members.iter()
                                   .find(|m| &m.name == key)
                                   .map(|m| m.value)
                                   .ok_or_else(|| no_such_member(key.clone()))?;
                self.store.allocate_temp(Payload::Scalar(Scalar::Int32(value)))
            },
            (Payload::Enum(members), Selector::Position(i)) => {
                let value = members[checked_index(*i, members.len())?].value;
                self.store.allocate_temp(Payload::Scalar(Scalar::Int32(value)))
            },
            (Payload::Routine(_), Selector::Key(key)) => {
                let key = key.clone();
                self.routine_variable(target, &key)
            },
            _ => Err(RuntimeError::IllegalClass { class,
                                                  operation: "take a member of" }),
        }
    }

    /// Builds a cursor into the struct `target` from the longest prefix of
    /// `links` that walks struct members.
    ///
    /// Every tag selects a member of the struct reached so far; a subscript
    /// applies to the member selected last. The walk stops at the first tag
    /// applied to a member that is not a struct.
    ///
    /// # Returns
    /// The cursor, a temporary, and the number of links it consumed.
    ///
    /// # Errors
    /// - `NotImplemented` if the struct itself is subscripted.
    /// - `RepeatedSubscript` if a member is subscripted twice.
    /// - `NoSuchMember` for a tag that names no member.
    pub fn struct_cursor(&mut self, target: SymbolId, links: &[Link]) -> EvalResult<(SymbolId, usize)> {
        let mut cursor = StructPtr { target,
                                     path: Vec::new() };
        let mut current = target;
        let mut consumed = 0;
        let mut evaluated = Vec::new();

        for link in links {
            match link {
                Link::Tag(name) => {
                    let Payload::Struct(members) = self.store.payload(current)? else {
                        break;
                    };
                    let Some(member) = members.iter().position(|m| &m.name == name) else {
                        return Err(RuntimeError::NoSuchMember { name:  name.clone(),
                                                                class: Class::Struct, });
                    };
                    let value = members[member].value;
                    current = self.eval(value)?;
                    cursor.path.push(CursorStep { member,
                                                  name: name.clone(),
                                                  subscripts: None });
                },
                Link::Subscript(args) => {
                    let Some(step) = cursor.path.last() else {
                        return Err(RuntimeError::NotImplemented { feature: "structure-pointer subscripting" });
                    };
                    if step.subscripts.is_some() {
                        return Err(RuntimeError::RepeatedSubscript { member: step.name.clone() });
                    }
                    let args = args.iter()
                                   .map(|&a| self.eval(a))
                                   .collect::<EvalResult<Vec<_>>>()?;
                    evaluated.extend(&args);
                    if let Some(step) = cursor.path.last_mut() {
                        step.subscripts = Some(args);
                    }
                },
            }
            consumed += 1;
        }

        let id = self.store.allocate_temp(Payload::StructPtr(cursor))?;
        self.embed_temporaries(id, &evaluated)?;
        Ok((id, consumed))
    }

    /// Resolves a struct cursor to the value it points at.
    ///
    /// # Errors
    /// Returns `NoSuchMember` if the struct no longer has a member the cursor
    /// walked through, plus any subscript error.
    pub(crate) fn eval_struct_ptr(&mut self, cursor: &StructPtr) -> EvalResult<SymbolId> {
        let mut current = self.eval(cursor.target)?;
        for step in &cursor.path {
            let member = match self.store.payload(current)? {
                Payload::Struct(members) => members.get(step.member).map(|m| m.value),
                _ => None,
            };
            let member = member.ok_or_else(|| RuntimeError::NoSuchMember { name:  step.name.clone(),
                                                                            class: Class::Struct, })?;
            current = self.eval(member)?;
            if let Some(subscripts) = &step.subscripts {
                current = self.subscript(current, subscripts)?;
            }
        }
        Ok(current)
    }

    /// Stores `value` as endpoint `which` (0 for the start, 1 for the end)
    /// of a range, keeping the endpoint's from-end encoding.
    ///
    /// `value` holds the plain offset, as extraction hands it out.
    ///
    /// # Errors
    /// - `IllegalClass` if `range` is not a range.
    /// - `SubscriptOutOfRange` if `which` is neither 0 nor 1.
    ///
    /// # Example
    /// ```
    /// use luxcore::{
    ///     ast::Link,
    ///     interpreter::{evaluator::core::Runtime, store::core::{Payload, RangeBound}, value::core::Scalar},
    /// };
    ///
    /// let mut rt = Runtime::new();
    /// let one = rt.scalar(Scalar::Int32(1)).unwrap();
    /// let two = rt.scalar(Scalar::Int32(2)).unwrap();
    /// let range = rt.range(RangeBound::at(one), RangeBound::from_end(two)).unwrap();
    ///
    /// let three = rt.scalar(Scalar::Int32(3)).unwrap();
    /// rt.range_endpoint_for_write(range, 1, three).unwrap();
    ///
    /// let Payload::Range(r) = rt.store().payload(range).unwrap() else { unreachable!() };
    /// assert_eq!(r.end, RangeBound::from_end(three));
    /// ```
    pub fn range_endpoint_for_write(&mut self,
                                    range: SymbolId,
                                    which: usize,
                                    value: SymbolId)
                                    -> EvalResult<()> {
        let mut payload = self.store.payload(range)?.clone();
        let Payload::Range(r) = &mut payload else {
            return Err(RuntimeError::IllegalClass { class:     payload.class(),
                                                    operation: "set an endpoint of" });
        };
        let bound = match which {
            0 => &mut r.start,
            1 => &mut r.end,
            _ => {
                return Err(RuntimeError::SubscriptOutOfRange { index: usize_to_i64(which),
                                                               size:  2, });
            },
        };
        *bound = RangeBound { symbol:   value,
                              from_end: bound.from_end, };

        self.store.redefine(range, payload)?;
        self.store.adopt_children(range)
    }
}

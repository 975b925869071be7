use std::{collections::HashMap, fmt::Display};

use crate::{
    ast::{BinaryOperator, Link, RoutineKind},
    error::RuntimeError,
    interpreter::{
        evaluator::core::EvalResult,
        types::ElementType,
        value::core::{Array, Scalar},
    },
};

/// Identifies a symbol in the store. Ids are slot indices and are reused
/// after the symbol in the slot is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SymbolId(u32);

impl SymbolId {
    /// The slot index of the symbol.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl Display for SymbolId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The owner of a symbol, which decides when it is reclaimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner {
    /// A permanent symbol. Lives until it is deleted explicitly.
    Named,
    /// A member of a container. Deleted together with the container.
    Container(SymbolId),
    /// A temporary created at the given evaluation level. Deleted when the
    /// scope at that level closes, unless it is embedded or returned first.
    Temporary(usize),
}

impl Owner {
    /// Returns `true` for temporaries.
    #[must_use]
    pub const fn is_temporary(self) -> bool {
        matches!(self, Self::Temporary(_))
    }
}

/// The structural kind of a symbol, independent of its element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Class {
    /// A variable that has no value yet.
    Undefined,
    /// A single number.
    Scalar,
    /// A numeric or string array.
    Array,
    /// A single string.
    String,
    /// A range `start:end`.
    Range,
    /// A list whose members may carry keys.
    List,
    /// A compact list with positional members only.
    CList,
    /// A record of named members.
    Struct,
    /// A cursor into a struct, produced by member access.
    StructPtr,
    /// A set of named integer constants.
    Enum,
    /// An array stored in a file.
    FileMap,
    /// A call of an internal function.
    InternalFunctionCall,
    /// A call of a user routine.
    UserFunctionCall,
    /// An access chain such as `x.a(2)`.
    Extract,
    /// An alias used to pass arguments.
    Transfer,
    /// An alias held by a named pointer variable.
    Pointer,
    /// An unevaluated binary operation.
    BinaryOp,
    /// A user function or subroutine definition.
    Routine,
}

impl Class {
    /// The name used in diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Undefined => "Undefined",
            Self::Scalar => "Scalar",
            Self::Array => "Array",
            Self::String => "String",
            Self::Range => "Range",
            Self::List => "List",
            Self::CList => "CList",
            Self::Struct => "Struct",
            Self::StructPtr => "StructPtr",
            Self::Enum => "Enum",
            Self::FileMap => "FileMap",
            Self::InternalFunctionCall => "InternalFunctionCall",
            Self::UserFunctionCall => "UserFunctionCall",
            Self::Extract => "Extract",
            Self::Transfer => "Transfer",
            Self::Pointer => "Pointer",
            Self::BinaryOp => "BinaryOp",
            Self::Routine => "Routine",
        }
    }
}

impl Display for Class {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One endpoint of a range.
///
/// `from_end` marks the `*-n` form: the endpoint symbol holds the offset `n`
/// and the position is `n` elements before the last one. A bare `*` is an
/// offset of zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeBound {
    /// The symbol holding the position or the offset.
    pub symbol:   SymbolId,
    /// Whether the position counts back from the end.
    pub from_end: bool,
}

impl RangeBound {
    /// An endpoint counted from the start.
    #[must_use]
    pub const fn at(symbol: SymbolId) -> Self {
        Self { symbol,
               from_end: false }
    }

    /// An endpoint counted back from the end.
    #[must_use]
    pub const fn from_end(symbol: SymbolId) -> Self {
        Self { symbol,
               from_end: true }
    }
}

/// A range `start:end`, with its subscript modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    /// The first position.
    pub start:    RangeBound,
    /// The last position, inclusive.
    pub end:      RangeBound,
    /// As a subscript: sum the selected elements along this axis.
    pub sum:      bool,
    /// As a subscript: move this axis to the given result position.
    pub redirect: Option<usize>,
}

/// A member of a keyed list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListMember {
    /// The key, if the member has one.
    pub key:   Option<String>,
    /// The member value.
    pub value: SymbolId,
}

/// A member of a struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructMember {
    /// The member name.
    pub name:  String,
    /// The member value.
    pub value: SymbolId,
}

/// A named integer constant of an enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumMember {
    /// The constant name.
    pub name:  String,
    /// The constant value.
    pub value: i32,
}

/// One step of a struct cursor: the member index it selects and the
/// subscripts applied to that member, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorStep {
    /// Index of the member in its struct.
    pub member:     usize,
    /// Name of the member, for diagnostics.
    pub name:       String,
    /// Subscripts applied to the member.
    pub subscripts: Option<Vec<SymbolId>>,
}

/// A cursor into a struct: the struct plus the member path walked so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructPtr {
    /// The struct the path starts from.
    pub target: SymbolId,
    /// The steps taken, outermost first.
    pub path:   Vec<CursorStep>,
}

/// A user routine. Parameters and locals are symbols owned by the routine;
/// the body refers to them directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routine {
    /// Function or subroutine.
    pub kind:   RoutineKind,
    /// The routine name.
    pub name:   String,
    /// Parameter symbols, in call order.
    pub params: Vec<SymbolId>,
    /// Local variable symbols.
    pub locals: Vec<SymbolId>,
    /// Expressions evaluated in order on a call. A function returns the value
    /// of the last one.
    pub body:   Vec<SymbolId>,
}

/// An array mapped from a file. The runtime only carries its description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMap {
    /// Path of the backing file.
    pub path: String,
    /// Element type of the stored array.
    pub ty:   ElementType,
    /// Dimensions of the stored array.
    pub dims: Vec<usize>,
}

/// The data of a symbol. The variant decides the symbol's class.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// No value.
    Undefined,
    /// A single number.
    Scalar(Scalar),
    /// A typed buffer with dimensions.
    Array(Array),
    /// A string.
    String(String),
    /// A range.
    Range(Range),
    /// A keyed list.
    List(Vec<ListMember>),
    /// A positional list.
    CList(Vec<SymbolId>),
    /// A record.
    Struct(Vec<StructMember>),
    /// A struct cursor.
    StructPtr(StructPtr),
    /// Named constants.
    Enum(Vec<EnumMember>),
    /// A file-backed array.
    FileMap(FileMap),
    /// A call of the named internal function.
    InternalFunctionCall {
        /// Function name.
        name: String,
        /// Argument expressions.
        args: Vec<SymbolId>,
    },
    /// A call of a user routine.
    UserFunctionCall {
        /// The routine symbol.
        routine: SymbolId,
        /// Argument expressions.
        args:    Vec<SymbolId>,
    },
    /// An access chain.
    Extract {
        /// The expression the chain starts from.
        target: SymbolId,
        /// The links, applied left to right.
        links:  Vec<Link>,
    },
    /// An argument alias.
    Transfer(SymbolId),
    /// A pointer alias.
    Pointer(SymbolId),
    /// An operator node.
    BinaryOp {
        /// The operator.
        op:  BinaryOperator,
        /// Left operand expression.
        lhs: SymbolId,
        /// Right operand expression.
        rhs: SymbolId,
    },
    /// A routine definition.
    Routine(Routine),
}

impl Payload {
    /// The class this payload gives its symbol.
    #[must_use]
    pub const fn class(&self) -> Class {
        match self {
            Self::Undefined => Class::Undefined,
            Self::Scalar(_) => Class::Scalar,
            Self::Array(_) => Class::Array,
            Self::String(_) => Class::String,
            Self::Range(_) => Class::Range,
            Self::List(_) => Class::List,
            Self::CList(_) => Class::CList,
            Self::Struct(_) => Class::Struct,
            Self::StructPtr(_) => Class::StructPtr,
            Self::Enum(_) => Class::Enum,
            Self::FileMap(_) => Class::FileMap,
            Self::InternalFunctionCall { .. } => Class::InternalFunctionCall,
            Self::UserFunctionCall { .. } => Class::UserFunctionCall,
            Self::Extract { .. } => Class::Extract,
            Self::Transfer(_) => Class::Transfer,
            Self::Pointer(_) => Class::Pointer,
            Self::BinaryOp { .. } => Class::BinaryOp,
            Self::Routine(_) => Class::Routine,
        }
    }

    /// The element type, for the classes that have one.
    #[must_use]
    pub const fn element_type(&self) -> Option<ElementType> {
        match self {
            Self::Scalar(s) => Some(s.element_type()),
            Self::Array(a) => Some(a.element_type()),
            Self::String(_) => Some(ElementType::String),
            Self::FileMap(m) => Some(m.ty),
            _ => None,
        }
    }

    /// Every symbol this payload refers to. A referenced symbol is deleted
    /// with its referrer only if the referrer owns it.
    #[must_use]
    pub fn children(&self) -> Vec<SymbolId> {
        match self {
            Self::Range(r) => vec![r.start.symbol, r.end.symbol],
            Self::List(members) => members.iter().map(|m| m.value).collect(),
            Self::CList(ids) => ids.clone(),
            Self::Struct(members) => members.iter().map(|m| m.value).collect(),
            Self::StructPtr(p) => {
                let mut ids = vec![p.target];
                ids.extend(p.path.iter().flat_map(|s| s.subscripts.iter().flatten()));
                ids
            },
            Self::InternalFunctionCall { args, .. } => args.clone(),
            Self::UserFunctionCall { routine, args } => {
                let mut ids = vec![*routine];
                ids.extend(args);
                ids
            },
            Self::Extract { target, links } => {
                let mut ids = vec![*target];
                for link in links {
                    if let Link::Subscript(args) = link {
                        ids.extend(args);
                    }
                }
                ids
            },
            Self::Transfer(target) | Self::Pointer(target) => vec![*target],
            Self::BinaryOp { lhs, rhs, .. } => vec![*lhs, *rhs],
            Self::Routine(r) => r.params
                                 .iter()
                                 .chain(&r.locals)
                                 .chain(&r.body)
                                 .copied()
                                 .collect(),
            Self::Undefined
            | Self::Scalar(_)
            | Self::Array(_)
            | Self::String(_)
            | Self::Enum(_)
            | Self::FileMap(_) => Vec::new(),
        }
    }

    /// Rewrites every reference to `from` into a reference to `to`.
    pub(crate) fn replace_child(&mut self, from: SymbolId, to: SymbolId) {
        let swap = |id: &mut SymbolId| {
            if *id == from {
                *id = to;
            }
        };
        match self {
            Self::Range(r) => {
                swap(&mut r.start.symbol);
                swap(&mut r.end.symbol);
            },
            Self::List(members) => members.iter_mut().for_each(|m| swap(&mut m.value)),
            Self::CList(ids) => ids.iter_mut().for_each(swap),
            Self::Struct(members) => members.iter_mut().for_each(|m| swap(&mut m.value)),
            Self::StructPtr(p) => {
                swap(&mut p.target);
                for step in &mut p.path {
                    step.subscripts.iter_mut().flatten().for_each(swap);
                }
            },
            Self::InternalFunctionCall { args, .. } => args.iter_mut().for_each(swap),
            Self::UserFunctionCall { routine, args } => {
                swap(routine);
                args.iter_mut().for_each(swap);
            },
            Self::Extract { target, links } => {
                swap(target);
                for link in links {
                    if let Link::Subscript(args) = link {
                        args.iter_mut().for_each(swap);
                    }
                }
            },
            Self::Transfer(target) | Self::Pointer(target) => swap(target),
            Self::BinaryOp { lhs, rhs, .. } => {
                swap(lhs);
                swap(rhs);
            },
            Self::Routine(r) => r.params
                                 .iter_mut()
                                 .chain(&mut r.locals)
                                 .chain(&mut r.body)
                                 .for_each(swap),
            Self::Undefined
            | Self::Scalar(_)
            | Self::Array(_)
            | Self::String(_)
            | Self::Enum(_)
            | Self::FileMap(_) => {},
        }
    }
}

impl From<Scalar> for Payload {
    fn from(value: Scalar) -> Self {
        Self::Scalar(value)
    }
}

impl From<Array> for Payload {
    fn from(value: Array) -> Self {
        Self::Array(value)
    }
}

impl From<&str> for Payload {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

/// A slot of the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub(crate) name:    Option<String>,
    pub(crate) owner:   Owner,
    pub(crate) payload: Payload,
    /// The scope whose mark list holds this symbol, if any.
    pub(crate) mark:    Option<usize>,
}

impl Symbol {
    /// The variable name, if the symbol has one.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The owner of the symbol.
    #[must_use]
    pub const fn owner(&self) -> Owner {
        self.owner
    }

    /// The data of the symbol.
    #[must_use]
    pub const fn payload(&self) -> &Payload {
        &self.payload
    }

    /// The class of the symbol.
    #[must_use]
    pub const fn class(&self) -> Class {
        self.payload.class()
    }

    /// Whether the symbol is on a mark list.
    #[must_use]
    pub const fn is_marked(&self) -> bool {
        self.mark.is_some()
    }
}

/// Default number of symbol slots.
pub const DEFAULT_SYMBOL_CAPACITY: usize = 65_536;

/// The table of all live symbols.
///
/// Symbols live in a slab of slots; deleted slots go on a free list and are
/// handed out again. Temporaries are tracked on a stack of mark lists, one
/// per open evaluation scope; the bottom list belongs to the caller of the
/// runtime and is never closed.
#[derive(Debug)]
pub struct SymbolStore {
    pub(crate) slots:    Vec<Option<Symbol>>,
    pub(crate) free:     Vec<SymbolId>,
    pub(crate) names:    HashMap<String, SymbolId>,
    pub(crate) scopes:   Vec<Vec<SymbolId>>,
    pub(crate) capacity: usize,
}

impl Default for SymbolStore {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_SYMBOL_CAPACITY)
    }
}

impl SymbolStore {
    /// Creates an empty store holding at most `capacity` symbols at once.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self { slots: Vec::new(),
               free: Vec::new(),
               names: HashMap::new(),
               scopes: vec![Vec::new()],
               capacity }
    }

    /// The current evaluation level. Temporaries allocated now are tagged
    /// with it.
    #[must_use]
    pub fn level(&self) -> usize {
        self.scopes.len()
    }

    /// Puts `payload` into a free slot with the given owner.
    ///
    /// # Errors
    /// Returns `OutOfSymbols` when every slot up to the capacity is in use.
    pub(crate) fn insert(&mut self,
                         name: Option<String>,
                         owner: Owner,
                         payload: Payload)
                         -> EvalResult<SymbolId> {
        let symbol = Symbol { name,
                              owner,
                              payload,
                              mark: None };
        if let Some(id) = self.free.pop() {
            self.slots[id.index()] = Some(symbol);
            return Ok(id);
        }
        if self.slots.len() >= self.capacity {
            tracing::warn!(capacity = self.capacity, "symbol table exhausted");
            return Err(RuntimeError::OutOfSymbols { capacity: self.capacity });
        }
        let id = u32::try_from(self.slots.len()).map(SymbolId)
                                                .map_err(|_| RuntimeError::OutOfSymbols {
                                                    capacity: self.capacity,
                                                })?;
        self.slots.push(Some(symbol));
        Ok(id)
    }

    /// Allocates a temporary at the current level and marks it.
    ///
    /// # Errors
    /// Returns `OutOfSymbols` when the table is full.
    ///
    /// # Example
    /// ```
    /// use luxcore::interpreter::{store::core::{Owner, SymbolStore}, value::core::Scalar};
    ///
    /// let mut store = SymbolStore::default();
    /// let id = store.allocate_temp(Scalar::Int32(4).into()).unwrap();
    ///
    /// assert_eq!(store.get(id).unwrap().owner(), Owner::Temporary(1));
    /// assert_eq!(store.temporaries_at_current_level(), 1);
    /// ```
    pub fn allocate_temp(&mut self, payload: Payload) -> EvalResult<SymbolId> {
        let id = self.insert(None, Owner::Temporary(self.level()), payload)?;
        self.mark(id);
        tracing::trace!(%id, level = self.level(), "allocated temporary");
        Ok(id)
    }

    /// Allocates a permanent symbol without a name, such as a literal of an
    /// expression graph.
    ///
    /// # Errors
    /// Returns `OutOfSymbols` when the table is full.
    pub fn allocate_permanent(&mut self, payload: Payload) -> EvalResult<SymbolId> {
        self.insert(None, Owner::Named, payload)
    }

    /// Defines a named variable, or redefines it in place if it exists.
    ///
    /// # Errors
    /// Returns `OutOfSymbols` when a new slot is needed and the table is
    /// full.
    pub fn define_named(&mut self, name: &str, payload: Payload) -> EvalResult<SymbolId> {
        if let Some(&id) = self.names.get(name) {
            self.redefine(id, payload)?;
            return Ok(id);
        }
        let id = self.insert(Some(name.to_string()), Owner::Named, payload)?;
        self.names.insert(name.to_string(), id);
        Ok(id)
    }

    /// Looks up a named variable.
    ///
    /// # Errors
    /// Returns `UndefinedSymbol` if no variable has this name.
    pub fn lookup(&self, name: &str) -> EvalResult<SymbolId> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| RuntimeError::UndefinedSymbol { name: name.to_string() })
    }

    /// Borrows a symbol.
    ///
    /// # Errors
    /// Returns `DeletedSymbol` if the slot is empty. Debug builds assert
    /// instead, since reading a deleted symbol is a bug in the caller.
    pub fn get(&self, id: SymbolId) -> EvalResult<&Symbol> {
        let symbol = self.slots.get(id.index()).and_then(Option::as_ref);
        debug_assert!(symbol.is_some(), "symbol {id} used after deletion");
        symbol.ok_or(RuntimeError::DeletedSymbol { id })
    }

    /// Mutably borrows a symbol.
    ///
    /// # Errors
    /// As [`SymbolStore::get`].
    pub fn get_mut(&mut self, id: SymbolId) -> EvalResult<&mut Symbol> {
        let symbol = self.slots.get_mut(id.index()).and_then(Option::as_mut);
        debug_assert!(symbol.is_some(), "symbol {id} used after deletion");
        symbol.ok_or(RuntimeError::DeletedSymbol { id })
    }

    /// Borrows the payload of a symbol.
    ///
    /// # Errors
    /// As [`SymbolStore::get`].
    pub fn payload(&self, id: SymbolId) -> EvalResult<&Payload> {
        self.get(id).map(Symbol::payload)
    }

    /// The class of a symbol.
    ///
    /// # Errors
    /// As [`SymbolStore::get`].
    pub fn class_of(&self, id: SymbolId) -> EvalResult<Class> {
        self.get(id).map(Symbol::class)
    }

    /// Whether the slot holds a live symbol. Never asserts.
    #[must_use]
    pub fn contains(&self, id: SymbolId) -> bool {
        self.slots.get(id.index()).is_some_and(Option::is_some)
    }

    /// The number of live symbols.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// The number of symbols on the mark list of the current scope.
    #[must_use]
    pub fn temporaries_at_current_level(&self) -> usize {
        self.scopes.last().map_or(0, Vec::len)
    }
}

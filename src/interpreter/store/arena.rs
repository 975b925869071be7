use crate::interpreter::{
    evaluator::core::EvalResult,
    store::core::{Owner, Payload, SymbolId, SymbolStore},
};

impl SymbolStore {
    /// Puts a symbol on the mark list of the current scope.
    ///
    /// Marked symbols are deleted by the next [`SymbolStore::sweep_marked`]
    /// unless they are unmarked first. Marking a symbol that is already on a
    /// list does nothing.
    pub fn mark(&mut self, id: SymbolId) {
        let level = self.scopes.len() - 1;
        if let Some(Some(symbol)) = self.slots.get_mut(id.index())
           && symbol.mark.is_none()
        {
            symbol.mark = Some(level);
            self.scopes[level].push(id);
        }
    }

    /// Takes a symbol off whichever mark list holds it.
    pub fn unmark(&mut self, id: SymbolId) {
        let Some(Some(symbol)) = self.slots.get_mut(id.index()) else {
            return;
        };
        let Some(level) = symbol.mark.take() else {
            return;
        };
        if let Some(list) = self.scopes.get_mut(level)
           && let Some(pos) = list.iter().rposition(|&m| m == id)
        {
            list.remove(pos);
        }
    }

    /// Deletes every symbol still on the mark list of the current scope.
    ///
    /// # Example
    /// ```
    /// use luxcore::interpreter::{store::core::SymbolStore, value::core::Scalar};
    ///
    /// let mut store = SymbolStore::default();
    /// let a = store.allocate_temp(Scalar::Int32(1).into()).unwrap();
    /// let b = store.allocate_temp(Scalar::Int32(2).into()).unwrap();
    /// store.unmark(b);
    /// store.sweep_marked();
    ///
    /// assert!(!store.contains(a));
    /// assert!(store.contains(b));
    /// ```
    pub fn sweep_marked(&mut self) {
        let Some(list) = self.scopes.last_mut() else {
            return;
        };
        let marked = std::mem::take(list);
        if !marked.is_empty() {
            tracing::trace!(count = marked.len(), level = self.scopes.len(), "sweeping temporaries");
        }
        for id in marked {
            if let Some(Some(symbol)) = self.slots.get_mut(id.index()) {
                symbol.mark = None;
                self.delete(id);
            }
        }
    }

    /// Makes `child` a member of the container `parent`.
    ///
    /// The child is unmarked, so it survives the sweep of its scope, and is
    /// from now on deleted together with `parent`. Named variables are never
    /// re-parented; the container only refers to them.
    ///
    /// # Errors
    /// Returns `DeletedSymbol` if either symbol is gone.
    pub fn embed(&mut self, child: SymbolId, parent: SymbolId) -> EvalResult<()> {
        self.get(parent)?;
        if self.get(child)?.name.is_some() {
            return Ok(());
        }
        self.unmark(child);
        self.get_mut(child)?.owner = Owner::Container(parent);
        Ok(())
    }

    /// Embeds every referenced symbol of `parent` that no one else owns yet:
    /// temporaries and unnamed permanent symbols.
    ///
    /// # Errors
    /// Returns `DeletedSymbol` if a referenced symbol is gone.
    pub fn adopt_children(&mut self, parent: SymbolId) -> EvalResult<()> {
        for child in self.payload(parent)?.children() {
            let symbol = self.get(child)?;
            let free_standing = symbol.name.is_none() && !matches!(symbol.owner, Owner::Container(_));
            if free_standing && child != parent {
                self.embed(child, parent)?;
            }
        }
        Ok(())
    }

    /// Replaces the payload of a symbol in place.
    ///
    /// The id, name and owner stay the same. Members owned through the old
    /// payload are deleted unless the new payload refers to them too.
    ///
    /// # Errors
    /// Returns `DeletedSymbol` if the symbol is gone.
    pub fn redefine(&mut self, id: SymbolId, payload: Payload) -> EvalResult<()> {
        let kept = payload.children();
        let old = std::mem::replace(&mut self.get_mut(id)?.payload, payload);
        for child in old.children() {
            if !kept.contains(&child) && self.owned_by(child, id) {
                self.delete(child);
            }
        }
        Ok(())
    }

    /// Takes the payload out of a symbol, leaving it `Undefined`. Members
    /// stay owned by the symbol.
    pub(crate) fn take_payload(&mut self, id: SymbolId) -> EvalResult<Payload> {
        Ok(std::mem::replace(&mut self.get_mut(id)?.payload, Payload::Undefined))
    }

    /// Moves the payload of `source` into `target`, with the members it
    /// owns, and deletes `source`. The old payload of `target` is dropped as
    /// in [`SymbolStore::redefine`].
    ///
    /// # Errors
    /// Returns `DeletedSymbol` if either symbol is gone.
    pub fn transplant(&mut self, source: SymbolId, target: SymbolId) -> EvalResult<()> {
        let payload = self.take_payload(source)?;
        for child in payload.children() {
            if self.owned_by(child, source) {
                self.get_mut(child)?.owner = Owner::Container(target);
            }
        }
        self.redefine(target, payload)?;
        self.delete(source);
        Ok(())
    }

    /// Copies a symbol, recursively copying every member it owns. The copy
    /// is a temporary of the current level.
    ///
    /// # Errors
    /// Returns `OutOfSymbols` if the table fills up, or `DeletedSymbol` if
    /// a member is gone.
    pub fn duplicate(&mut self, id: SymbolId) -> EvalResult<SymbolId> {
        let mut payload = self.payload(id)?.clone();
        let mut copies = Vec::new();
        for child in payload.children() {
            if self.owned_by(child, id) {
                let copy = self.duplicate(child)?;
                payload.replace_child(child, copy);
                copies.push(copy);
            }
        }
        let new = self.allocate_temp(payload)?;
        for copy in copies {
            self.embed(copy, new)?;
        }
        Ok(new)
    }

    /// Deletes a symbol and, recursively, every member it owns.
    ///
    /// Deleting an empty slot does nothing.
    pub fn delete(&mut self, id: SymbolId) {
        let mut pending = vec![id];
        while let Some(id) = pending.pop() {
            self.unmark(id);
            let Some(symbol) = self.slots.get_mut(id.index()).and_then(Option::take) else {
                continue;
            };
            if let Some(name) = &symbol.name
               && self.names.get(name) == Some(&id)
            {
                self.names.remove(name);
            }
            for child in symbol.payload.children() {
                if self.owned_by(child, id) {
                    pending.push(child);
                }
            }
            self.free.push(id);
        }
    }

    /// Opens a new evaluation scope, raising the level by one.
    pub(crate) fn enter_scope(&mut self) {
        self.scopes.push(Vec::new());
    }

    /// Closes the current scope.
    ///
    /// A temporary `result` of this scope moves down to the parent scope;
    /// everything else still marked is deleted.
    pub(crate) fn leave_scope(&mut self, result: Option<SymbolId>) {
        let inner = self.scopes.len() - 1;
        if inner == 0 {
            return;
        }
        if let Some(id) = result
           && let Some(Some(symbol)) = self.slots.get(id.index())
           && symbol.mark == Some(inner)
        {
            self.unmark(id);
            if let Some(Some(symbol)) = self.slots.get_mut(id.index()) {
                symbol.owner = Owner::Temporary(inner);
                symbol.mark = Some(inner - 1);
                self.scopes[inner - 1].push(id);
            }
        }
        self.sweep_marked();
        self.scopes.pop();
    }

    /// Runs `f` inside a fresh temporary scope.
    ///
    /// When `f` returns a temporary created in the scope, it survives as a
    /// temporary of the caller's scope. Everything else allocated in the
    /// scope and still marked is deleted, on success and on error alike.
    ///
    /// # Errors
    /// Returns whatever `f` returns.
    ///
    /// # Example
    /// ```
    /// use luxcore::interpreter::{store::core::SymbolStore, value::core::Scalar};
    ///
    /// let mut store = SymbolStore::default();
    /// let result = store.with_temp_scope(|store| {
    ///                       store.allocate_temp(Scalar::Int32(1).into())?;
    ///                       store.allocate_temp(Scalar::Int32(2).into())
    ///                   })
    ///                   .unwrap();
    ///
    /// assert_eq!(store.live_count(), 1);
    /// assert!(store.contains(result));
    /// ```
    pub fn with_temp_scope<F>(&mut self, f: F) -> EvalResult<SymbolId>
        where F: FnOnce(&mut Self) -> EvalResult<SymbolId>
    {
        self.enter_scope();
        let result = f(self);
        self.leave_scope(result.as_ref().ok().copied());
        result
    }

    /// Whether `child` is a live member owned by `parent`.
    pub(crate) fn owned_by(&self, child: SymbolId, parent: SymbolId) -> bool {
        matches!(self.slots.get(child.index()),
                 Some(Some(symbol)) if symbol.owner == Owner::Container(parent))
    }
}

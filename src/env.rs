// ABOUTME: Chained lexical environments: ordered bindings with mutability/source metadata.

use crate::error::RagnarokError;
use crate::value::Value;
use indexmap::IndexMap;
use std::cell::RefCell;
use std::rc::Rc;

/// A single binding record: the value, whether it may be `update`d in
/// place, where (if anywhere) its defining source text came from, and
/// whether it has been initialized yet.
///
/// `initialized` exists only to support `letrec`'s two-pass fill-in: a
/// binding is pre-inserted with `initialized = false` so that mutually
/// recursive closures may reference each other's names before those names
/// have real values; reading such a binding before it is filled in is a
/// *runtime-error*, never a silent nil.
#[derive(Clone)]
pub struct Binding {
    pub value: Value,
    pub source: Option<String>,
    pub mutable: bool,
    pub initialized: bool,
}

pub struct Environment {
    bindings: RefCell<IndexMap<String, Binding>>,
    previous: Option<Rc<Environment>>,
}

impl Environment {
    pub fn new() -> Rc<Environment> {
        Rc::new(Environment {
            bindings: RefCell::new(IndexMap::new()),
            previous: None,
        })
    }

    pub fn extend(previous: &Rc<Environment>) -> Rc<Environment> {
        Rc::new(Environment {
            bindings: RefCell::new(IndexMap::new()),
            previous: Some(Rc::clone(previous)),
        })
    }

    /// Adds a binding to the local frame, overwriting any existing local
    /// binding of the same name. Earlier (outer) frames are shadowed, never
    /// mutated.
    pub fn add(&self, name: &str, value: Value) {
        self.add_full(name, value, None, true);
    }

    pub fn add_immutable(&self, name: &str, value: Value) {
        let mut b = self.add_full(name, value, None, false);
        b.initialized = true;
    }

    pub fn add_with_source(&self, name: &str, value: Value, source: Option<String>, mutable: bool) {
        self.add_full(name, value, source, mutable);
    }

    /// Pre-inserts a binding whose right-hand side has not been evaluated
    /// yet, per `letrec`'s two-pass protocol.
    pub fn add_uninitialized(&self, name: &str) {
        let key = name.to_uppercase();
        self.bindings.borrow_mut().insert(
            key,
            Binding {
                value: Value::Nil,
                source: None,
                mutable: true,
                initialized: false,
            },
        );
    }

    /// Fills in a previously uninitialized local binding. Used only by
    /// `letrec`'s second pass, after every right-hand side has been
    /// evaluated in the new frame.
    pub fn initialize(&self, name: &str, value: Value) {
        let key = name.to_uppercase();
        if let Some(binding) = self.bindings.borrow_mut().get_mut(&key) {
            binding.value = value;
            binding.initialized = true;
        }
    }

    fn add_full(&self, name: &str, value: Value, source: Option<String>, mutable: bool) -> Binding {
        let key = name.to_uppercase();
        let binding = Binding {
            value,
            source,
            mutable,
            initialized: true,
        };
        self.bindings.borrow_mut().insert(key, binding.clone());
        binding
    }

    /// Searches the chain for the nearest existing binding and rebinds it in
    /// place; if none exists anywhere in the chain, adds it locally.
    pub fn update(&self, name: &str, value: Value) {
        let key = name.to_uppercase();
        if self.bindings.borrow().contains_key(&key) {
            if let Some(b) = self.bindings.borrow_mut().get_mut(&key) {
                b.value = value;
                b.initialized = true;
            }
            return;
        }
        if let Some(previous) = &self.previous {
            if previous.has_anywhere(&key) {
                previous.update(name, value);
                return;
            }
        }
        self.add(name, value);
    }

    fn has_anywhere(&self, key: &str) -> bool {
        if self.bindings.borrow().contains_key(key) {
            return true;
        }
        self.previous
            .as_ref()
            .map(|p| p.has_anywhere(key))
            .unwrap_or(false)
    }

    /// Walks the chain looking for a binding record.
    pub fn find(&self, name: &str) -> Option<Binding> {
        let key = name.to_uppercase();
        if let Some(b) = self.bindings.borrow().get(&key) {
            return Some(b.clone());
        }
        self.previous.as_ref().and_then(|p| p.find(name))
    }

    pub fn lookup(&self, name: &str) -> Result<Binding, RagnarokError> {
        self.find(name)
            .ok_or_else(|| RagnarokError::unbound_symbol(name.to_uppercase()))
    }

    /// Flattened view, outer frames first, inner frames overriding.
    pub fn bindings(&self) -> Vec<(String, Binding)> {
        let mut result: Vec<(String, Binding)> = match &self.previous {
            Some(p) => p.bindings(),
            None => Vec::new(),
        };
        for (name, binding) in self.bindings.borrow().iter() {
            if let Some(existing) = result.iter_mut().find(|(n, _)| n == name) {
                existing.1 = binding.clone();
            } else {
                result.push((name.clone(), binding.clone()));
            }
        }
        result
    }

    pub fn names(&self) -> Vec<String> {
        self.bindings().into_iter().map(|(n, _)| n).collect()
    }

    pub fn modules(&self) -> Vec<String> {
        self.bindings()
            .into_iter()
            .filter(|(_, b)| b.value.is_module())
            .map(|(n, _)| n)
            .collect()
    }

    pub fn previous(&self) -> Option<&Rc<Environment>> {
        self.previous.as_ref()
    }
}

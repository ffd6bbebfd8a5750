// ABOUTME: Registry of built-in operations over values, keyed by upper-cased name.

mod arithmetic;
mod comparison;
mod dicts;
mod equality;
mod higher_order;
mod io;
mod lists;
mod logic;
mod refs;
mod strings;
mod types;

use crate::error::RagnarokError;
use crate::value::{Primitive, Value};
use std::collections::HashMap;
use std::rc::Rc;

/// Checks one argument against a named predicate, raising *wrong-arg-type*
/// with the predicate's human-readable expectation on failure. Every
/// primitive below calls this before touching an argument's payload.
pub(crate) fn check_arg_type(
    name: &str,
    v: &Value,
    expected: &str,
    pred: impl Fn(&Value) -> bool,
) -> Result<(), RagnarokError> {
    if pred(v) {
        Ok(())
    } else {
        Err(RagnarokError::wrong_arg_type(name, expected, &v.type_name()))
    }
}

/// A registry mapping upper-cased primitive names to their `Value::Primitive`
/// wrapper. Built once at engine startup and shared (via `Rc`) by every
/// `Context` and every s-expression that needs to resolve a `#prim(NAME)`
/// literal.
pub struct PrimitiveRegistry {
    table: HashMap<String, Value>,
}

impl Default for PrimitiveRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PrimitiveRegistry {
    pub fn new() -> Self {
        PrimitiveRegistry { table: HashMap::new() }
    }

    /// A registry populated with every primitive required by the language.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        arithmetic::install(&mut registry);
        comparison::install(&mut registry);
        logic::install(&mut registry);
        types::install(&mut registry);
        strings::install(&mut registry);
        lists::install(&mut registry);
        higher_order::install(&mut registry);
        equality::install(&mut registry);
        refs::install(&mut registry);
        dicts::install(&mut registry);
        io::install(&mut registry);
        registry
    }

    pub(crate) fn register(
        &mut self,
        name: &str,
        min: usize,
        max: Option<usize>,
        func: crate::value::PrimitiveFn,
    ) {
        let name = name.to_uppercase();
        self.table.insert(
            name.clone(),
            Value::Primitive(Rc::new(Primitive { name, min, max, func })),
        );
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.table.get(&name.to_uppercase()).cloned()
    }

    /// Installs every registered primitive as a binding in `env` (used once,
    /// when the engine builds the root environment).
    pub fn install_into(&self, env: &crate::env::Environment) {
        for value in self.table.values() {
            if let Value::Primitive(p) = value {
                env.add(&p.name, value.clone());
            }
        }
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.table.keys().cloned().collect();
        names.sort();
        names
    }
}

// ABOUTME: Macro table: user-registered expansion functions keyed by name.

use crate::value::Value;
use std::collections::HashMap;

/// Maps an upper-cased macro name to the ordinary `function` `Value` that
/// performs its expansion. `(macro (NAME P...) BODY...)` parses exactly
/// like `(def (NAME P...) BODY...)` and registers the resulting closure
/// here instead of in the definition environment.
#[derive(Default)]
pub struct MacroRegistry {
    macros: HashMap<String, Value>,
}

impl MacroRegistry {
    pub fn new() -> Self {
        MacroRegistry { macros: HashMap::new() }
    }

    pub fn define(&mut self, name: &str, expander: Value) {
        self.macros.insert(name.to_uppercase(), expander);
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.macros.get(&name.to_uppercase()).cloned()
    }

    pub fn is_macro(&self, name: &str) -> bool {
        self.macros.contains_key(&name.to_uppercase())
    }
}

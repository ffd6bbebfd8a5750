//! `NOT` - truth follows the falsy-value list in the glossary (`is_true`).

use super::PrimitiveRegistry;
use crate::error::RagnarokError;
use crate::eval::Context;
use crate::value::Value;

fn not(_ctxt: &Context, args: &[Value]) -> Result<Value, RagnarokError> {
    Ok(Value::Boolean(!args[0].is_true()))
}

pub fn install(registry: &mut PrimitiveRegistry) {
    registry.register("NOT", 1, Some(1), not);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::Environment;
    use crate::primitives::PrimitiveRegistry as Registry;
    use std::rc::Rc;

    #[test]
    fn not_flips_truthiness() {
        let ctxt = Context::new(Environment::new(), Rc::new(Registry::with_builtins()));
        assert!(not(&ctxt, &[Value::Boolean(false)]).unwrap().is_true());
        assert!(not(&ctxt, &[Value::Nil]).unwrap().is_true());
        assert!(!not(&ctxt, &[Value::Boolean(true)]).unwrap().is_true());
    }
}

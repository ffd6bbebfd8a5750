//! Mutable reference cells: `ref`, `ref-get`, `ref-set`.

use super::{check_arg_type, PrimitiveRegistry};
use crate::error::RagnarokError;
use crate::eval::Context;
use crate::value::Value;
use std::cell::RefCell;
use std::rc::Rc;

fn make_ref(_ctxt: &Context, args: &[Value]) -> Result<Value, RagnarokError> {
    Ok(Value::Reference(Rc::new(RefCell::new(args[0].clone()))))
}

fn ref_get(_ctxt: &Context, args: &[Value]) -> Result<Value, RagnarokError> {
    check_arg_type("REF-GET", &args[0], "ref", Value::is_reference)?;
    match &args[0] {
        Value::Reference(cell) => Ok(cell.borrow().clone()),
        _ => unreachable!(),
    }
}

/// Mutates the cell in place; returns `nil`.
fn ref_set(_ctxt: &Context, args: &[Value]) -> Result<Value, RagnarokError> {
    check_arg_type("REF-SET", &args[0], "ref", Value::is_reference)?;
    match &args[0] {
        Value::Reference(cell) => {
            *cell.borrow_mut() = args[1].clone();
            Ok(Value::Nil)
        }
        _ => unreachable!(),
    }
}

pub fn install(registry: &mut PrimitiveRegistry) {
    registry.register("REF", 1, Some(1), make_ref);
    registry.register("REF-GET", 1, Some(1), ref_get);
    registry.register("REF-SET", 2, Some(2), ref_set);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::Environment;
    use crate::primitives::PrimitiveRegistry as Registry;
    use num_bigint::BigInt;
    use std::rc::Rc as StdRc;

    fn ctxt() -> Context {
        Context::new(Environment::new(), StdRc::new(Registry::with_builtins()))
    }

    #[test]
    fn ref_set_mutates_and_returns_nil() {
        let c = ctxt();
        let r = make_ref(&c, &[Value::Number(BigInt::from(1))]).unwrap();
        let result = ref_set(&c, &[r.clone(), Value::Number(BigInt::from(2))]).unwrap();
        assert!(result.is_equal(&Value::Nil));
        assert!(ref_get(&c, &[r]).unwrap().is_equal(&Value::Number(BigInt::from(2))));
    }

    #[test]
    fn shared_reference_is_visible_through_every_clone() {
        let c = ctxt();
        let r = make_ref(&c, &[Value::Number(BigInt::from(1))]).unwrap();
        let shared = r.clone();
        ref_set(&c, &[r, Value::Number(BigInt::from(9))]).unwrap();
        assert!(ref_get(&c, &[shared]).unwrap().is_equal(&Value::Number(BigInt::from(9))));
    }
}

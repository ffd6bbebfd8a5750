//! Type predicates and the generic `TYPE` reflector.

use super::PrimitiveRegistry;
use crate::error::RagnarokError;
use crate::eval::Context;
use crate::value::Value;

fn type_of(_ctxt: &Context, args: &[Value]) -> Result<Value, RagnarokError> {
    Ok(Value::symbol(&args[0].type_name()))
}

macro_rules! predicate {
    ($fn_name:ident, $method:ident) => {
        fn $fn_name(_ctxt: &Context, args: &[Value]) -> Result<Value, RagnarokError> {
            Ok(Value::Boolean(args[0].$method()))
        }
    };
}

predicate!(number_p, is_number);
predicate!(boolean_p, is_boolean);
predicate!(string_p, is_string);
predicate!(symbol_p, is_symbol);
predicate!(nil_p, is_nil);
predicate!(empty_p, is_empty);
predicate!(cons_p, is_cons);
predicate!(list_p, is_list);
predicate!(function_p, is_function);
predicate!(ref_p, is_reference);
predicate!(dict_p, is_dict);

pub fn install(registry: &mut PrimitiveRegistry) {
    registry.register("TYPE", 1, Some(1), type_of);
    registry.register("NUMBER?", 1, Some(1), number_p);
    registry.register("BOOLEAN?", 1, Some(1), boolean_p);
    registry.register("STRING?", 1, Some(1), string_p);
    registry.register("SYMBOL?", 1, Some(1), symbol_p);
    registry.register("NIL?", 1, Some(1), nil_p);
    registry.register("EMPTY?", 1, Some(1), empty_p);
    registry.register("CONS?", 1, Some(1), cons_p);
    registry.register("LIST?", 1, Some(1), list_p);
    registry.register("FUNCTION?", 1, Some(1), function_p);
    registry.register("REF?", 1, Some(1), ref_p);
    registry.register("DICT?", 1, Some(1), dict_p);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::Environment;
    use crate::primitives::PrimitiveRegistry as Registry;
    use num_bigint::BigInt;
    use std::rc::Rc;

    fn ctxt() -> Context {
        Context::new(Environment::new(), Rc::new(Registry::with_builtins()))
    }

    #[test]
    fn type_reflects_the_tag_name() {
        let v = type_of(&ctxt(), &[Value::Number(BigInt::from(1))]).unwrap();
        assert!(v.is_equal(&Value::symbol("number")));
    }

    #[test]
    fn list_p_is_true_for_both_cons_and_empty() {
        assert!(list_p(&ctxt(), &[Value::Empty]).unwrap().is_true());
        let one = Value::cons(Value::Number(BigInt::from(1)), Value::Empty).unwrap();
        assert!(list_p(&ctxt(), &[one]).unwrap().is_true());
        assert!(!list_p(&ctxt(), &[Value::Nil]).unwrap().is_true());
    }
}

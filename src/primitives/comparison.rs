//! Numeric comparisons: `=`, `<`, `<=`, `>`, `>=`. All are binary.

use super::{check_arg_type, PrimitiveRegistry};
use crate::error::RagnarokError;
use crate::eval::Context;
use crate::value::Value;

fn num_predicate(
    name: &str,
    args: &[Value],
    pred: impl Fn(&num_bigint::BigInt, &num_bigint::BigInt) -> bool,
) -> Result<Value, RagnarokError> {
    check_arg_type(name, &args[0], "number", Value::is_number)?;
    check_arg_type(name, &args[1], "number", Value::is_number)?;
    let (Value::Number(a), Value::Number(b)) = (&args[0], &args[1]) else {
        unreachable!()
    };
    Ok(Value::Boolean(pred(a, b)))
}

pub fn install(registry: &mut PrimitiveRegistry) {
    registry.register("=", 2, Some(2), |_: &Context, args: &[Value]| {
        num_predicate("=", args, |a, b| a == b)
    });
    registry.register("<", 2, Some(2), |_: &Context, args: &[Value]| {
        num_predicate("<", args, |a, b| a < b)
    });
    registry.register("<=", 2, Some(2), |_: &Context, args: &[Value]| {
        num_predicate("<=", args, |a, b| a <= b)
    });
    registry.register(">", 2, Some(2), |_: &Context, args: &[Value]| {
        num_predicate(">", args, |a, b| a > b)
    });
    registry.register(">=", 2, Some(2), |_: &Context, args: &[Value]| {
        num_predicate(">=", args, |a, b| a >= b)
    });
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

    fn num(n: i64) -> Value {
        Value::Number(BigInt::from(n))
    }

    #[test]
    fn ordering_primitives() {
        assert!(num_predicate("<", &[num(1), num(2)], |a, b| a < b).unwrap().is_true());
        assert!(!num_predicate("<", &[num(2), num(1)], |a, b| a < b).unwrap().is_true());
    }

    #[test]
    fn equal_requires_both_numbers() {
        let registry = Registry::with_builtins();
        let eq = registry.get("=").unwrap();
        let result = crate::eval::apply_function(&ctxt(), &eq, vec![num(3), Value::string("3")]);
        assert!(result.is_err());
    }
}

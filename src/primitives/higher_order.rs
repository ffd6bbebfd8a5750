//! Higher-order list operations: `apply`, `map`, `filter`, `foldr`, `foldl`.

use super::{check_arg_type, PrimitiveRegistry};
use crate::error::RagnarokError;
use crate::eval::{apply_function, Context};
use crate::value::Value;

fn apply(ctxt: &Context, args: &[Value]) -> Result<Value, RagnarokError> {
    check_arg_type("APPLY", &args[0], "function", Value::is_function)?;
    check_arg_type("APPLY", &args[1], "list", Value::is_list)?;
    apply_function(ctxt, &args[0], args[1].to_vec()?)
}

/// Zips any number of list arguments, calling the function once per
/// position and stopping at the shortest list.
fn map(ctxt: &Context, args: &[Value]) -> Result<Value, RagnarokError> {
    check_arg_type("MAP", &args[0], "function", Value::is_function)?;
    let mut lists = Vec::with_capacity(args.len() - 1);
    for arg in &args[1..] {
        check_arg_type("MAP", arg, "list", Value::is_list)?;
        lists.push(arg.to_vec()?);
    }
    let shortest = lists.iter().map(Vec::len).min().unwrap_or(0);
    let mut results = Vec::with_capacity(shortest);
    for i in 0..shortest {
        let call_args: Vec<Value> = lists.iter().map(|l| l[i].clone()).collect();
        results.push(apply_function(ctxt, &args[0], call_args)?);
    }
    Ok(Value::list(results))
}

fn filter(ctxt: &Context, args: &[Value]) -> Result<Value, RagnarokError> {
    check_arg_type("FILTER", &args[0], "function", Value::is_function)?;
    check_arg_type("FILTER", &args[1], "list", Value::is_list)?;
    let mut results = Vec::new();
    for item in args[1].to_vec()? {
        if apply_function(ctxt, &args[0], vec![item.clone()])?.is_true() {
            results.push(item);
        }
    }
    Ok(Value::list(results))
}

/// Right fold: `(foldr f (list a b c) base) = (f a (f b (f c base)))`.
fn foldr(ctxt: &Context, args: &[Value]) -> Result<Value, RagnarokError> {
    check_arg_type("FOLDR", &args[0], "function", Value::is_function)?;
    check_arg_type("FOLDR", &args[1], "list", Value::is_list)?;
    let mut acc = args[2].clone();
    for item in args[1].to_vec()?.into_iter().rev() {
        acc = apply_function(ctxt, &args[0], vec![item, acc])?;
    }
    Ok(acc)
}

/// Left fold: `(foldl f base (list a b c)) = (f (f (f base a) b) c)`.
fn foldl(ctxt: &Context, args: &[Value]) -> Result<Value, RagnarokError> {
    check_arg_type("FOLDL", &args[0], "function", Value::is_function)?;
    check_arg_type("FOLDL", &args[2], "list", Value::is_list)?;
    let mut acc = args[1].clone();
    for item in args[2].to_vec()? {
        acc = apply_function(ctxt, &args[0], vec![acc, item])?;
    }
    Ok(acc)
}

pub fn install(registry: &mut PrimitiveRegistry) {
    registry.register("APPLY", 2, Some(2), apply);
    registry.register("MAP", 2, None, map);
    registry.register("FILTER", 2, Some(2), filter);
    registry.register("FOLDR", 3, Some(3), foldr);
    registry.register("FOLDL", 3, Some(3), foldl);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::Environment;
    use crate::primitives::PrimitiveRegistry as Registry;
    use num_bigint::BigInt;
    use std::rc::Rc;

    fn ctxt() -> (Context, Rc<Registry>) {
        let registry = Rc::new(Registry::with_builtins());
        (Context::new(Environment::new(), Rc::clone(&registry)), registry)
    }

    fn num(n: i64) -> Value {
        Value::Number(BigInt::from(n))
    }

    #[test]
    fn map_zips_and_stops_at_shortest() {
        let (c, registry) = ctxt();
        let plus = registry.get("+").unwrap();
        let a = Value::list(vec![num(1), num(2), num(3)]);
        let b = Value::list(vec![num(10), num(20)]);
        let result = map(&c, &[plus, a, b]).unwrap();
        assert!(result.is_equal(&Value::list(vec![num(11), num(22)])));
    }

    #[test]
    fn foldl_accumulates_left_to_right() {
        let (c, registry) = ctxt();
        let minus = registry.get("-").unwrap();
        // (foldl - 100 (list 1 2 3)) = ((100 - 1) - 2) - 3 = 94
        let list = Value::list(vec![num(1), num(2), num(3)]);
        let result = foldl(&c, &[minus, num(100), list]).unwrap();
        assert!(result.is_equal(&num(94)));
    }

    #[test]
    fn foldr_accumulates_right_to_left() {
        let (c, registry) = ctxt();
        let cons = registry.get("cons").unwrap();
        let list = Value::list(vec![num(1), num(2), num(3)]);
        let result = foldr(&c, &[cons, list, Value::Empty]).unwrap();
        assert!(result.is_equal(&Value::list(vec![num(1), num(2), num(3)])));
    }

    #[test]
    fn filter_keeps_truthy_results() {
        let (c, registry) = ctxt();
        let not_ = registry.get("not").unwrap();
        // filter with `not` keeps only falsy elements
        let list = Value::list(vec![Value::Boolean(false), Value::Boolean(true), num(0)]);
        let result = filter(&c, &[not_, list]).unwrap();
        assert!(result.is_equal(&Value::list(vec![Value::Boolean(false), num(0)])));
    }
}

//! List construction and traversal: `cons`, `append`, `reverse`, `first`,
//! `rest`, `list`, `length`, `nth`.

use super::{check_arg_type, PrimitiveRegistry};
use crate::error::RagnarokError;
use crate::eval::Context;
use crate::value::Value;
use num_bigint::BigInt;
use num_traits::ToPrimitive;

fn cons(_ctxt: &Context, args: &[Value]) -> Result<Value, RagnarokError> {
    check_arg_type("CONS", &args[1], "list", Value::is_list)?;
    Value::cons(args[0].clone(), args[1].clone())
}

/// Variadic; every argument must be a list. Later arguments are appended
/// onto earlier ones without copying structure beyond what's necessary.
fn append(_ctxt: &Context, args: &[Value]) -> Result<Value, RagnarokError> {
    let mut items = Vec::new();
    for arg in args {
        check_arg_type("APPEND", arg, "list", Value::is_list)?;
        items.extend(arg.to_vec()?);
    }
    Ok(Value::list(items))
}

fn reverse(_ctxt: &Context, args: &[Value]) -> Result<Value, RagnarokError> {
    check_arg_type("REVERSE", &args[0], "list", Value::is_list)?;
    let mut items = args[0].to_vec()?;
    items.reverse();
    Ok(Value::list(items))
}

fn first(_ctxt: &Context, args: &[Value]) -> Result<Value, RagnarokError> {
    check_arg_type("FIRST", &args[0], "cons", Value::is_cons)?;
    match &args[0] {
        Value::Cons(cell) => Ok(cell.car.clone()),
        _ => unreachable!(),
    }
}

fn rest(_ctxt: &Context, args: &[Value]) -> Result<Value, RagnarokError> {
    check_arg_type("REST", &args[0], "cons", Value::is_cons)?;
    match &args[0] {
        Value::Cons(cell) => Ok(cell.cdr.clone()),
        _ => unreachable!(),
    }
}

fn list(_ctxt: &Context, args: &[Value]) -> Result<Value, RagnarokError> {
    Ok(Value::list(args.to_vec()))
}

fn length(_ctxt: &Context, args: &[Value]) -> Result<Value, RagnarokError> {
    check_arg_type("LENGTH", &args[0], "list", Value::is_list)?;
    Ok(Value::Number(BigInt::from(args[0].to_vec()?.len())))
}

fn nth(_ctxt: &Context, args: &[Value]) -> Result<Value, RagnarokError> {
    check_arg_type("NTH", &args[0], "list", Value::is_list)?;
    check_arg_type("NTH", &args[1], "number", Value::is_number)?;
    let idx = match &args[1] {
        Value::Number(n) => n.to_usize(),
        _ => unreachable!(),
    };
    let items = args[0].to_vec()?;
    match idx.and_then(|i| items.get(i).cloned()) {
        Some(v) => Ok(v),
        None => Err(RagnarokError::runtime_error("index out of range of list")),
    }
}

pub fn install(registry: &mut PrimitiveRegistry) {
    registry.register("CONS", 2, Some(2), cons);
    registry.register("APPEND", 0, None, append);
    registry.register("REVERSE", 1, Some(1), reverse);
    registry.register("FIRST", 1, Some(1), first);
    registry.register("REST", 1, Some(1), rest);
    registry.register("LIST", 0, None, list);
    registry.register("LENGTH", 1, Some(1), length);
    registry.register("NTH", 2, Some(2), nth);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::Environment;
    use crate::primitives::PrimitiveRegistry as Registry;
    use std::rc::Rc;

    fn ctxt() -> Context {
        Context::new(Environment::new(), Rc::new(Registry::with_builtins()))
    }

    fn num(n: i64) -> Value {
        Value::Number(BigInt::from(n))
    }

    #[test]
    fn cons_rejects_non_list_cdr() {
        assert!(cons(&ctxt(), &[num(1), num(2)]).is_err());
        assert!(cons(&ctxt(), &[num(1), Value::Empty]).is_ok());
    }

    #[test]
    fn append_flattens_multiple_lists() {
        let a = Value::list(vec![num(1), num(2)]);
        let b = Value::list(vec![num(3)]);
        let v = append(&ctxt(), &[a, b]).unwrap();
        assert!(v.is_equal(&Value::list(vec![num(1), num(2), num(3)])));
    }

    #[test]
    fn nth_out_of_range_is_runtime_error() {
        let l = Value::list(vec![num(1), num(2)]);
        assert!(nth(&ctxt(), &[l, num(5)]).is_err());
    }

    #[test]
    fn first_and_rest_require_cons() {
        assert!(first(&ctxt(), &[Value::Empty]).is_err());
        let l = Value::list(vec![num(1), num(2)]);
        assert!(first(&ctxt(), &[l.clone()]).unwrap().is_equal(&num(1)));
        assert!(rest(&ctxt(), &[l]).unwrap().is_equal(&Value::list(vec![num(2)])));
    }
}

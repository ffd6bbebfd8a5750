//! Variadic arithmetic: `+`, `*`, `-`.
//!
//! `+` and `*` fold over every argument with their respective identities
//! (`0`, `1`); `-` requires at least one argument and negates instead of
//! folding when given exactly one.

use super::{check_arg_type, PrimitiveRegistry};
use crate::error::RagnarokError;
use crate::eval::Context;
use crate::value::Value;
use num_bigint::BigInt;

fn as_number(name: &str, v: &Value) -> Result<BigInt, RagnarokError> {
    check_arg_type(name, v, "number", Value::is_number)?;
    match v {
        Value::Number(n) => Ok(n.clone()),
        _ => unreachable!(),
    }
}

fn plus(_ctxt: &Context, args: &[Value]) -> Result<Value, RagnarokError> {
    let mut total = BigInt::from(0);
    for arg in args {
        total += as_number("+", arg)?;
    }
    Ok(Value::Number(total))
}

fn times(_ctxt: &Context, args: &[Value]) -> Result<Value, RagnarokError> {
    let mut total = BigInt::from(1);
    for arg in args {
        total *= as_number("*", arg)?;
    }
    Ok(Value::Number(total))
}

/// One argument negates; two or more left-fold subtraction starting from
/// the first.
fn minus(_ctxt: &Context, args: &[Value]) -> Result<Value, RagnarokError> {
    let mut total = as_number("-", &args[0])?;
    if args.len() == 1 {
        return Ok(Value::Number(-total));
    }
    for arg in &args[1..] {
        total -= as_number("-", arg)?;
    }
    Ok(Value::Number(total))
}

pub fn install(registry: &mut PrimitiveRegistry) {
    registry.register("+", 0, None, plus);
    registry.register("*", 0, None, times);
    registry.register("-", 1, None, minus);
}

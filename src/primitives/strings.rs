//! String operations: append, length, case conversion, substring.

use super::{check_arg_type, PrimitiveRegistry};
use crate::error::RagnarokError;
use crate::eval::Context;
use crate::value::Value;
use num_bigint::BigInt;
use num_traits::ToPrimitive;

fn as_str<'a>(name: &str, v: &'a Value) -> Result<&'a str, RagnarokError> {
    check_arg_type(name, v, "string", Value::is_string)?;
    match v {
        Value::String(s) => Ok(s),
        _ => unreachable!(),
    }
}

fn string_append(_ctxt: &Context, args: &[Value]) -> Result<Value, RagnarokError> {
    let mut result = String::new();
    for arg in args {
        result.push_str(as_str("STRING-APPEND", arg)?);
    }
    Ok(Value::string(result))
}

fn string_length(_ctxt: &Context, args: &[Value]) -> Result<Value, RagnarokError> {
    let s = as_str("STRING-LENGTH", &args[0])?;
    Ok(Value::Number(BigInt::from(s.chars().count())))
}

fn string_lower(_ctxt: &Context, args: &[Value]) -> Result<Value, RagnarokError> {
    Ok(Value::string(as_str("STRING-LOWER", &args[0])?.to_lowercase()))
}

fn string_upper(_ctxt: &Context, args: &[Value]) -> Result<Value, RagnarokError> {
    Ok(Value::string(as_str("STRING-UPPER", &args[0])?.to_uppercase()))
}

fn index(name: &str, v: &Value) -> Result<usize, RagnarokError> {
    check_arg_type(name, v, "number", Value::is_number)?;
    match v {
        Value::Number(n) => n.to_usize().ok_or_else(|| {
            RagnarokError::runtime_error(format!("{} out of range", n))
        }),
        _ => unreachable!(),
    }
}

/// `(string-substring s [start [end]])`, defaulting `start` to `0` and `end`
/// to the string's length.
fn string_substring(_ctxt: &Context, args: &[Value]) -> Result<Value, RagnarokError> {
    let s = as_str("STRING-SUBSTRING", &args[0])?;
    let chars: Vec<char> = s.chars().collect();
    let start = if args.len() > 1 {
        index("STRING-SUBSTRING", &args[1])?
    } else {
        0
    };
    let end = if args.len() > 2 {
        index("STRING-SUBSTRING", &args[2])?
    } else {
        chars.len()
    };
    if start > chars.len() || end > chars.len() || start > end {
        return Err(RagnarokError::runtime_error(format!(
            "substring range {}..{} out of bounds for a string of length {}",
            start,
            end,
            chars.len()
        )));
    }
    Ok(Value::string(chars[start..end].iter().collect::<String>()))
}

pub fn install(registry: &mut PrimitiveRegistry) {
    registry.register("STRING-APPEND", 0, None, string_append);
    registry.register("STRING-LENGTH", 1, Some(1), string_length);
    registry.register("STRING-LOWER", 1, Some(1), string_lower);
    registry.register("STRING-UPPER", 1, Some(1), string_upper);
    registry.register("STRING-SUBSTRING", 1, Some(3), string_substring);
}

//! `EQ?` (identity, atoms compare by value) and `EQL?` (structural).

use super::PrimitiveRegistry;
use crate::error::RagnarokError;
use crate::eval::Context;
use crate::value::Value;

fn eq(_ctxt: &Context, args: &[Value]) -> Result<Value, RagnarokError> {
    Ok(Value::Boolean(args[0].is_eq(&args[1])))
}

fn eql(_ctxt: &Context, args: &[Value]) -> Result<Value, RagnarokError> {
    Ok(Value::Boolean(args[0].is_equal(&args[1])))
}

pub fn install(registry: &mut PrimitiveRegistry) {
    registry.register("EQ?", 2, Some(2), eq);
    registry.register("EQL?", 2, Some(2), eql);
}

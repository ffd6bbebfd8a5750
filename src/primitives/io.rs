//! `PRINT` - the only I/O primitive in the core; everything else is a
//! host-supplied collaborator reached through `Context`.

use super::PrimitiveRegistry;
use crate::error::RagnarokError;
use crate::eval::Context;
use crate::value::Value;

fn print(ctxt: &Context, args: &[Value]) -> Result<Value, RagnarokError> {
    let joined = args
        .iter()
        .map(Value::display)
        .collect::<Vec<_>>()
        .join(" ");
    ctxt.print_line(&joined);
    Ok(Value::Nil)
}

pub fn install(registry: &mut PrimitiveRegistry) {
    registry.register("PRINT", 0, None, print);
}

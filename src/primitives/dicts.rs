//! Ordered dictionaries: `make-dict`, `dict-get`, `dict-update` (functional),
//! `dict-set!` (mutating).
//!
//! `dict-update` replaces the existing entry in place when the key is
//! already present, or appends a new one otherwise - never both. (A prior
//! implementation of this logic appended unconditionally in addition to any
//! in-place replacement, which would silently accumulate duplicate keys on
//! every update of an existing one.)

use super::{check_arg_type, PrimitiveRegistry};
use crate::error::RagnarokError;
use crate::eval::Context;
use crate::value::Value;
use std::cell::RefCell;
use std::rc::Rc;

fn make_dict(_ctxt: &Context, args: &[Value]) -> Result<Value, RagnarokError> {
    check_arg_type("MAKE-DICT", &args[0], "list", Value::is_list)?;
    let mut entries = Vec::new();
    for pair in args[0].to_vec()? {
        let kv = pair.to_vec()?;
        if kv.len() != 2 {
            return Err(RagnarokError::runtime_error(format!(
                "wrong number of elements in dict entry {}",
                pair
            )));
        }
        entries.push((kv[0].clone(), kv[1].clone()));
    }
    Ok(Value::Dict(Rc::new(RefCell::new(entries))))
}

fn dict_get(_ctxt: &Context, args: &[Value]) -> Result<Value, RagnarokError> {
    check_arg_type("DICT-GET", &args[0], "dict", Value::is_dict)?;
    check_arg_type("DICT-GET", &args[1], "atom", Value::is_atom)?;
    match &args[0] {
        Value::Dict(entries) => entries
            .borrow()
            .iter()
            .find(|(k, _)| k.is_equal(&args[1]))
            .map(|(_, v)| v.clone())
            .ok_or_else(|| {
                RagnarokError::runtime_error(format!("cannot find key {} in dictionary", args[1]))
            }),
        _ => unreachable!(),
    }
}

/// Functional update: produces a new dict, the original is untouched.
fn dict_update(_ctxt: &Context, args: &[Value]) -> Result<Value, RagnarokError> {
    check_arg_type("DICT-UPDATE", &args[0], "dict", Value::is_dict)?;
    check_arg_type("DICT-UPDATE", &args[1], "atom", Value::is_atom)?;
    match &args[0] {
        Value::Dict(entries) => {
            let mut result = Vec::new();
            let mut replaced = false;
            for (k, v) in entries.borrow().iter() {
                if k.is_equal(&args[1]) {
                    result.push((k.clone(), args[2].clone()));
                    replaced = true;
                } else {
                    result.push((k.clone(), v.clone()));
                }
            }
            if !replaced {
                result.push((args[1].clone(), args[2].clone()));
            }
            Ok(Value::Dict(Rc::new(RefCell::new(result))))
        }
        _ => unreachable!(),
    }
}

/// Mutates the dict in place; returns `nil`.
fn dict_set(_ctxt: &Context, args: &[Value]) -> Result<Value, RagnarokError> {
    check_arg_type("DICT-SET!", &args[0], "dict", Value::is_dict)?;
    check_arg_type("DICT-SET!", &args[1], "atom", Value::is_atom)?;
    match &args[0] {
        Value::Dict(entries) => {
            let mut entries = entries.borrow_mut();
            if let Some(slot) = entries.iter_mut().find(|(k, _)| k.is_equal(&args[1])) {
                slot.1 = args[2].clone();
            } else {
                entries.push((args[1].clone(), args[2].clone()));
            }
            Ok(Value::Nil)
        }
        _ => unreachable!(),
    }
}

pub fn install(registry: &mut PrimitiveRegistry) {
    registry.register("MAKE-DICT", 1, Some(1), make_dict);
    registry.register("DICT-GET", 2, Some(2), dict_get);
    registry.register("DICT-UPDATE", 3, Some(3), dict_update);
    registry.register("DICT-SET!", 3, Some(3), dict_set);
}

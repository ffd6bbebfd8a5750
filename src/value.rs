// ABOUTME: Tagged runtime values: the dynamic data this language computes over.

use crate::ast::Expression;
use crate::env::Environment;
use num_bigint::BigInt;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A closure: parameter names, a captured body, and the environment it closed over.
///
/// Parameter names are stored upper-cased and unique, per the data model's
/// invariant on *function* values.
pub struct Function {
    pub params: Vec<String>,
    pub body: Rc<Expression>,
    pub env: Rc<Environment>,
}

/// A native operation with an enforced arity window `[min, max]`.
///
/// `max = None` means unbounded (variadic). Arity is checked by the apply
/// site before `func` ever runs; `func` itself only needs to type-check its
/// arguments.
pub struct Primitive {
    pub name: String,
    pub min: usize,
    pub max: Option<usize>,
    pub func: PrimitiveFn,
}

pub type PrimitiveFn = fn(&crate::eval::Context, &[Value]) -> Result<Value, crate::error::RagnarokError>;

/// A single cons cell. Boxed behind an `Rc` so two clones of the same `Value`
/// share identity for `EQ?` (pointer equality), matching the reference
/// language's default `is_eq` (which falls back to object identity for any
/// value that does not define value-based equality).
pub struct ConsCell {
    pub car: Value,
    pub cdr: Value,
}

/// The tagged union of every runtime value in the language.
///
/// Compound/mutable variants (`String`, `Cons`, `Function`, `Primitive`,
/// `Reference`, `Dict`, `Module`) are `Rc`-boxed so that `Rc::ptr_eq` gives a
/// cheap, correct notion of "same object" for `EQ?`; atoms (`Number`,
/// `Boolean`, `Symbol`, `Nil`, `Empty`) compare by value instead, again
/// matching the reference semantics.
#[derive(Clone)]
pub enum Value {
    Number(BigInt),
    Boolean(bool),
    String(Rc<str>),
    Symbol(Rc<str>),
    Nil,
    Empty,
    Cons(Rc<ConsCell>),
    Primitive(Rc<Primitive>),
    Function(Rc<Function>),
    Reference(Rc<RefCell<Value>>),
    Dict(Rc<RefCell<Vec<(Value, Value)>>>),
    Module(Rc<Environment>),
}

impl Value {
    pub fn symbol(name: &str) -> Value {
        Value::Symbol(Rc::from(name.to_uppercase().as_str()))
    }

    pub fn string(s: impl Into<String>) -> Value {
        Value::String(Rc::from(s.into().as_str()))
    }

    /// Builds a cons cell, enforcing the data model's invariant that the
    /// second field of a cons must itself be a list.
    pub fn cons(car: Value, cdr: Value) -> Result<Value, crate::error::RagnarokError> {
        if !cdr.is_list() {
            return Err(crate::error::RagnarokError::wrong_arg_type(
                "cons",
                "list",
                &cdr.type_name(),
            ));
        }
        Ok(Value::Cons(Rc::new(ConsCell { car, cdr })))
    }

    /// Builds a proper list from a Rust `Vec`, right to left.
    pub fn list(items: Vec<Value>) -> Value {
        let mut result = Value::Empty;
        for item in items.into_iter().rev() {
            result = Value::Cons(Rc::new(ConsCell { car: item, cdr: result }));
        }
        result
    }

    /// Converts a proper list value into a Rust `Vec`, erroring on improper
    /// lists (shouldn't arise given the cons invariant, but callers at the
    /// primitive/macro boundary hand us values of unknown provenance).
    pub fn to_vec(&self) -> Result<Vec<Value>, crate::error::RagnarokError> {
        let mut result = Vec::new();
        let mut curr = self.clone();
        loop {
            match curr {
                Value::Empty => return Ok(result),
                Value::Cons(cell) => {
                    result.push(cell.car.clone());
                    curr = cell.cdr.clone();
                }
                other => {
                    return Err(crate::error::RagnarokError::runtime_error(format!(
                        "Cannot convert to a list of values: {}",
                        other
                    )))
                }
            }
        }
    }

    pub fn type_name(&self) -> String {
        match self {
            Value::Number(_) => "number",
            Value::Boolean(_) => "boolean",
            Value::String(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::Nil => "nil",
            Value::Empty => "empty-list",
            Value::Cons(_) => "cons-list",
            Value::Primitive(_) => "primitive",
            Value::Function(_) => "function",
            Value::Reference(_) => "ref",
            Value::Dict(_) => "dict",
            Value::Module(_) => "module",
        }
        .to_string()
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }
    pub fn is_boolean(&self) -> bool {
        matches!(self, Value::Boolean(_))
    }
    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }
    pub fn is_symbol(&self) -> bool {
        matches!(self, Value::Symbol(_))
    }
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }
    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Empty)
    }
    pub fn is_cons(&self) -> bool {
        matches!(self, Value::Cons(_))
    }
    pub fn is_list(&self) -> bool {
        self.is_empty() || self.is_cons()
    }
    pub fn is_function(&self) -> bool {
        matches!(self, Value::Primitive(_) | Value::Function(_))
    }
    pub fn is_reference(&self) -> bool {
        matches!(self, Value::Reference(_))
    }
    pub fn is_dict(&self) -> bool {
        matches!(self, Value::Dict(_))
    }
    pub fn is_module(&self) -> bool {
        matches!(self, Value::Module(_))
    }
    pub fn is_atom(&self) -> bool {
        matches!(
            self,
            Value::Number(_)
                | Value::Primitive(_)
                | Value::Function(_)
                | Value::Symbol(_)
                | Value::String(_)
                | Value::Boolean(_)
        )
    }

    /// Falsy values are `#f`, nil, the empty list, the integer `0`, and the
    /// empty string; everything else (including every compound value) is
    /// truthy.
    pub fn is_true(&self) -> bool {
        match self {
            Value::Boolean(b) => *b,
            Value::Nil => false,
            Value::Empty => false,
            Value::Number(n) => *n != BigInt::from(0),
            Value::String(s) => !s.is_empty(),
            _ => true,
        }
    }

    /// "Pointer"-style equality: atoms compare by value, compound values
    /// compare by identity (shared `Rc`).
    pub fn is_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::Nil, Value::Nil) => true,
            (Value::Empty, Value::Empty) => true,
            (Value::String(a), Value::String(b)) => Rc::ptr_eq(a, b),
            (Value::Cons(a), Value::Cons(b)) => Rc::ptr_eq(a, b),
            (Value::Primitive(a), Value::Primitive(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Reference(a), Value::Reference(b)) => Rc::ptr_eq(a, b),
            (Value::Dict(a), Value::Dict(b)) => Rc::ptr_eq(a, b),
            (Value::Module(a), Value::Module(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Structural equality. Falls back to `is_eq` for the compound kinds the
    /// reference implementation never gave a structural definition to
    /// (function, primitive, module).
    pub fn is_equal(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Cons(a), Value::Cons(b)) => {
                a.car.is_equal(&b.car) && a.cdr.is_equal(&b.cdr)
            }
            (Value::Reference(a), Value::Reference(b)) => a.borrow().is_equal(&b.borrow()),
            (Value::Dict(a), Value::Dict(b)) => {
                let a = a.borrow();
                let b = b.borrow();
                a.len() == b.len()
                    && a.iter()
                        .zip(b.iter())
                        .all(|((k1, v1), (k2, v2))| k1.is_equal(k2) && v1.is_equal(v2))
            }
            _ => self.is_eq(other),
        }
    }

    /// The human-facing "display" form: unlike `Display`, string escape
    /// sequences (`\"`, `\\`, `\n`, `\t`) are interpreted here rather than at
    /// read time - the reader only ever unescapes `\"`/`\\` eagerly and
    /// leaves the rest for this step.
    pub fn display(&self) -> String {
        match self {
            Value::String(s) => s
                .replace("\\\"", "\"")
                .replace("\\t", "\t")
                .replace("\\n", "\n")
                .replace("\\\\", "\\"),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Boolean(b) => write!(f, "{}", if *b { "#T" } else { "#F" }),
            Value::String(s) => write!(f, "\"{}\"", s),
            Value::Symbol(s) => write!(f, "{}", s),
            Value::Nil => write!(f, "NIL"),
            Value::Empty => write!(f, "()"),
            Value::Cons(cell) => {
                write!(f, "({}", cell.car)?;
                write_cdr(f, &cell.cdr)
            }
            Value::Primitive(p) => write!(f, "#<PRIMITIVE {:p}>", Rc::as_ptr(p)),
            Value::Function(fun) => write!(f, "#<FUNCTION {:p}>", Rc::as_ptr(fun)),
            Value::Reference(r) => write!(f, "#<REF {}>", r.borrow()),
            Value::Dict(d) => {
                write!(f, "#<DICT")?;
                for (k, v) in d.borrow().iter() {
                    write!(f, " ({} {})", k, v)?;
                }
                write!(f, ">")
            }
            Value::Module(env) => write!(f, "#<MODULE {}>", env.names().join(" ")),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

/// Prints the tail of a proper list: `" x y)"` for a cons chain ending in
/// `Empty`. Because `cons` enforces the list-typed-cdr invariant, this never
/// needs a dotted-pair fallback.
fn write_cdr(f: &mut fmt::Formatter<'_>, v: &Value) -> fmt::Result {
    match v {
        Value::Empty => write!(f, ")"),
        Value::Cons(cell) => {
            write!(f, " {}", cell.car)?;
            write_cdr(f, &cell.cdr)
        }
        other => write!(f, " . {})", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_display_is_exact() {
        let n = Value::Number(BigInt::from(3628800u64));
        assert_eq!(format!("{}", n), "3628800");
    }

    #[test]
    fn boolean_display_uses_hash_letters() {
        assert_eq!(format!("{}", Value::Boolean(true)), "#T");
        assert_eq!(format!("{}", Value::Boolean(false)), "#F");
    }

    #[test]
    fn list_display_nests_properly() {
        let list = Value::list(vec![
            Value::Number(BigInt::from(1)),
            Value::list(vec![Value::Number(BigInt::from(2)), Value::Number(BigInt::from(3))]),
            Value::Number(BigInt::from(4)),
        ]);
        assert_eq!(format!("{}", list), "(1 (2 3) 4)");
        assert_eq!(format!("{}", Value::Empty), "()");
    }

    #[test]
    fn nil_displays_as_nil() {
        assert_eq!(format!("{}", Value::Nil), "NIL");
    }

    #[test]
    fn symbol_and_string_display() {
        assert_eq!(format!("{}", Value::symbol("foo")), "FOO");
        assert_eq!(format!("{}", Value::string("hello")), "\"hello\"");
    }

    #[test]
    fn string_display_unescapes_lazily() {
        let s = Value::string("a\\nb\\t\\\"c\\\\d");
        assert_eq!(s.display(), "a\nb\t\"c\\d");
        // the surface Display form keeps the raw escapes, unlike display()
        assert_eq!(format!("{}", s), "\"a\\nb\\t\\\"c\\\\d\"");
    }

    #[test]
    fn falsy_values_per_glossary() {
        assert!(!Value::Boolean(false).is_true());
        assert!(!Value::Nil.is_true());
        assert!(!Value::Empty.is_true());
        assert!(!Value::Number(BigInt::from(0)).is_true());
        assert!(!Value::string("").is_true());
        assert!(Value::Number(BigInt::from(1)).is_true());
        assert!(Value::string("x").is_true());
    }

    #[test]
    fn eq_is_pointer_identity_for_strings_but_value_for_numbers() {
        let a = Value::string("hi");
        let b = Value::string("hi");
        assert!(!a.is_eq(&b), "distinct string objects are not EQ?");
        assert!(a.is_equal(&b), "but they are structurally EQL?");

        let n1 = Value::Number(BigInt::from(5));
        let n2 = Value::Number(BigInt::from(5));
        assert!(n1.is_eq(&n2), "numbers compare by value for EQ?");
    }

    #[test]
    fn cons_requires_list_cdr() {
        let bad = Value::cons(Value::Number(BigInt::from(1)), Value::Number(BigInt::from(2)));
        assert!(bad.is_err());
        let good = Value::cons(Value::Number(BigInt::from(1)), Value::Empty);
        assert!(good.is_ok());
    }

    #[test]
    fn to_vec_round_trips_through_list() {
        let items = vec![
            Value::Number(BigInt::from(1)),
            Value::Number(BigInt::from(2)),
            Value::Number(BigInt::from(3)),
        ];
        let list = Value::list(items.clone());
        let back = list.to_vec().unwrap();
        assert_eq!(back.len(), 3);
        for (a, b) in items.iter().zip(back.iter()) {
            assert!(a.is_equal(b));
        }
    }
}

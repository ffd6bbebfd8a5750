// ABOUTME: Surface-syntax tree: the reader's output and the parser's input.

use crate::ast::Expression;
use crate::error::RagnarokError;
use crate::primitives::PrimitiveRegistry;
use crate::value::Value;
use num_bigint::BigInt;
use std::rc::Rc;

/// A symbolic expression: the structure the reader produces and the parser
/// consumes. Distinct from `Value` (the runtime value taxonomy) and from
/// `Expression` (the evaluable AST) - this is pure surface syntax, one step
/// removed from raw text.
///
/// Atom-shaped leaves carry typed payloads directly (no re-parsing a token
/// string later); only `Cons`/`Empty` represent list structure.
#[derive(Debug, Clone)]
pub enum SExpr {
    Integer(BigInt),
    Boolean(bool),
    /// Raw string content as read - only `\"`/`\\` have been unescaped;
    /// `\n`/`\t` remain literal two-character sequences until `Value::display`.
    String(String),
    /// Case as written; folded to upper case only when converted onward.
    Symbol(String),
    Nil,
    /// `#prim(NAME)` - an opaque reference to a named primitive, resolved
    /// against the engine's primitive registry when converted onward.
    Primitive(String),
    /// `#dict((k v)...)` literal.
    Dict(Vec<(SExpr, SExpr)>),
    Empty,
    Cons(Box<SExpr>, Box<SExpr>),
}

impl SExpr {
    pub fn cons(car: SExpr, cdr: SExpr) -> SExpr {
        SExpr::Cons(Box::new(car), Box::new(cdr))
    }

    pub fn list(items: Vec<SExpr>) -> SExpr {
        let mut result = SExpr::Empty;
        for item in items.into_iter().rev() {
            result = SExpr::cons(item, result);
        }
        result
    }

    /// Lexical-atom test: true for every token-shaped leaf (including
    /// `#dict(...)`/`#prim(...)` literals, which are single tokens even
    /// though their semantic `Value` counterpart is not a `Value::is_atom`).
    pub fn is_atom(&self) -> bool {
        !matches!(self, SExpr::Cons(_, _) | SExpr::Empty)
    }

    pub fn is_cons(&self) -> bool {
        matches!(self, SExpr::Cons(_, _))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, SExpr::Empty)
    }

    /// Decomposes a cons into `(car, cdr)`, for parser combinators that walk
    /// list structure directly.
    pub fn content(&self) -> Option<(&SExpr, &SExpr)> {
        match self {
            SExpr::Cons(car, cdr) => Some((car, cdr)),
            _ => None,
        }
    }

    /// Lifts an s-expr into a `Value`; used to implement `quote` and to
    /// serialize macro arguments before a macro function is applied.
    pub fn as_value(&self, primitives: &PrimitiveRegistry) -> Result<Value, RagnarokError> {
        match self {
            SExpr::Integer(n) => Ok(Value::Number(n.clone())),
            SExpr::Boolean(b) => Ok(Value::Boolean(*b)),
            SExpr::String(s) => Ok(Value::string(s.clone())),
            SExpr::Symbol(s) => Ok(Value::symbol(s)),
            SExpr::Nil => Ok(Value::Nil),
            SExpr::Primitive(name) => primitives.get(name).ok_or_else(|| {
                RagnarokError::runtime_error(format!("No such primitive {}", name))
            }),
            SExpr::Dict(entries) => {
                let mut pairs = Vec::with_capacity(entries.len());
                for (k, v) in entries {
                    pairs.push((k.as_value(primitives)?, v.as_value(primitives)?));
                }
                Ok(Value::Dict(Rc::new(std::cell::RefCell::new(pairs))))
            }
            SExpr::Empty => Ok(Value::Empty),
            SExpr::Cons(car, cdr) => {
                Value::cons(car.as_value(primitives)?, cdr.as_value(primitives)?)
            }
        }
    }

    /// Converts an atomic s-expr into an AST leaf. Only ever called on
    /// `SExpr::is_atom()` positions by the parser; composite forms
    /// (`if`/`fn`/`do`/application/...) are recognized directly off the cons
    /// structure by the parser instead of going through this method.
    pub fn to_expression(&self, primitives: &PrimitiveRegistry) -> Result<Rc<Expression>, RagnarokError> {
        match self {
            SExpr::Integer(n) => Ok(Rc::new(Expression::IntegerLit(n.clone()))),
            SExpr::Boolean(b) => Ok(Rc::new(Expression::BooleanLit(*b))),
            SExpr::String(s) => Ok(Rc::new(Expression::StringLit(s.clone()))),
            SExpr::Symbol(s) => {
                let mut segments: Vec<&str> = s.split(':').collect();
                let name = segments.pop().unwrap_or(s).to_uppercase();
                let qualifiers = segments.into_iter().map(|q| q.to_uppercase()).collect();
                Ok(Rc::new(Expression::Symbol { name, qualifiers }))
            }
            SExpr::Nil | SExpr::Primitive(_) | SExpr::Dict(_) | SExpr::Empty => {
                Ok(Rc::new(Expression::Literal(self.as_value(primitives)?)))
            }
            SExpr::Cons(_, _) => Err(RagnarokError::parse_error(
                "cannot use a list as an atomic expression",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> PrimitiveRegistry {
        PrimitiveRegistry::new()
    }

    #[test]
    fn integer_as_value() {
        let s = SExpr::Integer(BigInt::from(42));
        let v = s.as_value(&registry()).unwrap();
        assert!(v.is_equal(&Value::Number(BigInt::from(42))));
    }

    #[test]
    fn symbol_as_value_is_uppercased() {
        let s = SExpr::Symbol("foo".to_string());
        let v = s.as_value(&registry()).unwrap();
        assert!(v.is_equal(&Value::symbol("foo")));
        assert_eq!(format!("{}", v), "FOO");
    }

    #[test]
    fn qualified_symbol_splits_on_colon() {
        let s = SExpr::Symbol("mod:name".to_string());
        let expr = s.to_expression(&registry()).unwrap();
        match &*expr {
            Expression::Symbol { name, qualifiers } => {
                assert_eq!(name, "NAME");
                assert_eq!(qualifiers, &vec!["MOD".to_string()]);
            }
            _ => panic!("expected Symbol expression"),
        }
    }

    #[test]
    fn cons_and_empty_round_trip_as_list_value() {
        let s = SExpr::list(vec![
            SExpr::Integer(BigInt::from(1)),
            SExpr::Integer(BigInt::from(2)),
        ]);
        let v = s.as_value(&registry()).unwrap();
        let items = v.to_vec().unwrap();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn string_atom_preserves_raw_escapes_until_display() {
        let s = SExpr::String("a\\nb".to_string());
        let v = s.as_value(&registry()).unwrap();
        // raw stored form still has the two-character escape
        assert_eq!(format!("{}", v), "\"a\\nb\"");
        // only interpreted at display time
        assert_eq!(v.display(), "a\nb");
    }
}

// ABOUTME: S-expr to AST parser: declarations, expression forms, and macro expansion.

use crate::ast::Expression;
use crate::error::RagnarokError;
use crate::eval::{apply_function, Context};
use crate::macros::MacroRegistry;
use crate::sexpr::SExpr;
use crate::value::Value;
use num_bigint::BigInt;
use std::rc::Rc;

/// The result of parsing one top-level s-expression: either a declaration
/// that installs a binding somewhere, or a pure expression to evaluate.
pub enum TopLevel {
    Var(String, Rc<Expression>),
    Const(String, Rc<Expression>),
    /// name, and the `Lambda` expression constructing the function value.
    Def(String, Rc<Expression>),
    /// Same shape as `Def`; kept separate so the engine knows to register it
    /// in the macro table instead of `def_env`.
    Macro(String, Rc<Expression>),
    Exp(Rc<Expression>),
}

const IDENT_EXTRA: &str = "-+/*_.?!@$<>=";

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || IDENT_EXTRA.contains(c)
}

fn is_ident_cont(c: char) -> bool {
    c.is_ascii_alphanumeric() || IDENT_EXTRA.contains(c)
}

/// Validates an atom as an identifier (binding/parameter name) and returns
/// its upper-cased form. Qualified (`A:B`) names are split elsewhere, in
/// `SExpr::to_expression` - binding positions never accept a qualifier.
fn parse_identifier(s: &SExpr) -> Option<String> {
    match s {
        SExpr::Symbol(name) => {
            let mut chars = name.chars();
            let first = chars.next()?;
            if !is_ident_start(first) || !chars.all(is_ident_cont) {
                return None;
            }
            Some(name.to_uppercase())
        }
        _ => None,
    }
}

fn parse_keyword(s: &SExpr, kw: &str) -> bool {
    matches!(s, SExpr::Symbol(name) if name.eq_ignore_ascii_case(kw))
}

/// Converts a proper s-expr list (`Cons`-chain terminated by `Empty`) into a
/// Rust `Vec`. The reader never produces dotted pairs, so this never needs
/// an improper-list fallback.
fn list_items(s: &SExpr) -> Option<Vec<SExpr>> {
    let mut items = Vec::new();
    let mut curr = s.clone();
    loop {
        match curr {
            SExpr::Empty => return Some(items),
            SExpr::Cons(car, cdr) => {
                items.push(*car);
                curr = *cdr;
            }
            _ => return None,
        }
    }
}

fn symbol_expr(name: &str) -> Rc<Expression> {
    Rc::new(Expression::Symbol { name: name.to_string(), qualifiers: vec![] })
}

/// `((fn (N...) BODY) E...)`.
fn mk_let(bindings: Vec<(String, Rc<Expression>)>, body: Rc<Expression>) -> Rc<Expression> {
    let params: Vec<String> = bindings.iter().map(|(n, _)| n.clone()).collect();
    let args: Vec<Rc<Expression>> = bindings.into_iter().map(|(_, e)| e).collect();
    Rc::new(Expression::Apply(Rc::new(Expression::Lambda(params, body)), args))
}

/// Right-folds into nested one-binding `let`s.
fn mk_let_star(bindings: Vec<(String, Rc<Expression>)>, body: Rc<Expression>) -> Rc<Expression> {
    let mut result = body;
    for (name, expr) in bindings.into_iter().rev() {
        result = mk_let(vec![(name, expr)], result);
    }
    result
}

fn mk_dict(pairs: Vec<(Rc<Expression>, Rc<Expression>)>) -> Rc<Expression> {
    let entries: Vec<Rc<Expression>> = pairs
        .into_iter()
        .map(|(k, v)| Rc::new(Expression::Apply(symbol_expr("LIST"), vec![k, v])))
        .collect();
    let entries_list = Rc::new(Expression::Apply(symbol_expr("LIST"), entries));
    Rc::new(Expression::Apply(symbol_expr("MAKE-DICT"), vec![entries_list]))
}

/// `((letrec ((NAME (fn (N...) BODY))) NAME) E...)`.
fn mk_loop(name: String, bindings: Vec<(String, Rc<Expression>)>, body: Rc<Expression>) -> Rc<Expression> {
    let params: Vec<String> = bindings.iter().map(|(n, _)| n.clone()).collect();
    let args: Vec<Rc<Expression>> = bindings.into_iter().map(|(_, e)| e).collect();
    let letrec = Rc::new(Expression::LetRec(
        vec![(name.clone(), Rc::new(Expression::Lambda(params, body)))],
        symbol_expr(&name),
    ));
    Rc::new(Expression::Apply(letrec, args))
}

/// `(letrec ((NAME (fn (P...) BODY))) NAME)`.
fn mk_fnrec(name: String, params: Vec<String>, body: Rc<Expression>) -> Rc<Expression> {
    Rc::new(Expression::LetRec(
        vec![(name.clone(), Rc::new(Expression::Lambda(params, body)))],
        symbol_expr(&name),
    ))
}

/// Converts a `Value` produced by a macro expansion back into surface
/// syntax, so the expansion can be re-parsed as an ordinary expression.
/// Function/reference/module values have no surface form and are rejected.
fn value_to_sexpr(v: &Value) -> Result<SExpr, RagnarokError> {
    match v {
        Value::Number(n) => Ok(SExpr::Integer(n.clone())),
        Value::Boolean(b) => Ok(SExpr::Boolean(*b)),
        Value::String(s) => Ok(SExpr::String(s.to_string())),
        Value::Symbol(s) => Ok(SExpr::Symbol(s.to_string())),
        Value::Nil => Ok(SExpr::Nil),
        Value::Empty => Ok(SExpr::Empty),
        Value::Cons(cell) => Ok(SExpr::cons(value_to_sexpr(&cell.car)?, value_to_sexpr(&cell.cdr)?)),
        Value::Primitive(p) => Ok(SExpr::Primitive(p.name.clone())),
        Value::Dict(entries) => {
            let mut out = Vec::new();
            for (k, val) in entries.borrow().iter() {
                out.push((value_to_sexpr(k)?, value_to_sexpr(val)?));
            }
            Ok(SExpr::Dict(out))
        }
        other => Err(RagnarokError::parse_error(format!(
            "a macro cannot expand into a {} value",
            other.type_name()
        ))),
    }
}

/// Owns the macro table and the gensym counter; both are mutated only while
/// reading at the top level, never concurrently (§5).
pub struct Parser {
    macros: MacroRegistry,
    gensym_count: usize,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    pub fn new() -> Self {
        Parser { macros: MacroRegistry::new(), gensym_count: 0 }
    }

    /// Produces an identifier guaranteed not to collide with anything a
    /// reader could ever produce: the leading space is not a legal reader
    /// token character.
    fn gensym(&mut self, prefix: &str) -> String {
        let n = self.gensym_count;
        self.gensym_count += 1;
        format!(" __{}_{}", prefix, n)
    }

    pub fn register_macro(&mut self, name: &str, expander: Value) {
        self.macros.define(name, expander);
    }

    pub fn is_macro(&self, name: &str) -> bool {
        self.macros.is_macro(name)
    }

    /// Top-level dispatch: *var* → *def* → *const* → *macro* → *exp*, first
    /// match wins.
    pub fn parse_sexp(&mut self, ctxt: &Context, s: &SExpr) -> Result<TopLevel, RagnarokError> {
        if let Some(tl) = self.try_var(ctxt, s)? {
            return Ok(tl);
        }
        if let Some(tl) = self.try_def(ctxt, s)? {
            return Ok(tl);
        }
        if let Some(tl) = self.try_const(ctxt, s)? {
            return Ok(tl);
        }
        if let Some(tl) = self.try_macro_decl(ctxt, s)? {
            return Ok(tl);
        }
        Ok(TopLevel::Exp(self.parse_exp(ctxt, s)?))
    }

    fn try_var(&mut self, ctxt: &Context, s: &SExpr) -> Result<Option<TopLevel>, RagnarokError> {
        let Some(items) = list_items(s) else { return Ok(None) };
        if items.len() != 3 || !parse_keyword(&items[0], "var") {
            return Ok(None);
        }
        let Some(name) = parse_identifier(&items[1]) else { return Ok(None) };
        let expr = self.parse_exp(ctxt, &items[2])?;
        Ok(Some(TopLevel::Var(name, expr)))
    }

    fn try_const(&mut self, ctxt: &Context, s: &SExpr) -> Result<Option<TopLevel>, RagnarokError> {
        let Some(items) = list_items(s) else { return Ok(None) };
        if items.len() != 3 || !parse_keyword(&items[0], "const") {
            return Ok(None);
        }
        let Some(name) = parse_identifier(&items[1]) else { return Ok(None) };
        let expr = self.parse_exp(ctxt, &items[2])?;
        Ok(Some(TopLevel::Const(name, expr)))
    }

    /// `(def (NAME P1 ...) BODY...)`, or the single-symbol form
    /// `(def NAME EXPR)` which installs a plain mutable value binding
    /// instead of a function - the reference parser's `parse_define`,
    /// tried before its function-defining `parse_defun`.
    fn try_def(&mut self, ctxt: &Context, s: &SExpr) -> Result<Option<TopLevel>, RagnarokError> {
        if let Some(items) = list_items(s) {
            if items.len() == 3 && parse_keyword(&items[0], "def") {
                if let Some(name) = parse_identifier(&items[1]) {
                    let expr = self.parse_exp(ctxt, &items[2])?;
                    return Ok(Some(TopLevel::Var(name, expr)));
                }
            }
        }
        let Some((name, lambda)) = self.try_def_shape(ctxt, s, "def")? else { return Ok(None) };
        Ok(Some(TopLevel::Def(name, lambda)))
    }

    /// `(macro (NAME P1 ...) BODY...)` - identical shape to `def`.
    fn try_macro_decl(&mut self, ctxt: &Context, s: &SExpr) -> Result<Option<TopLevel>, RagnarokError> {
        let Some((name, lambda)) = self.try_def_shape(ctxt, s, "macro")? else { return Ok(None) };
        Ok(Some(TopLevel::Macro(name, lambda)))
    }

    fn try_def_shape(
        &mut self,
        ctxt: &Context,
        s: &SExpr,
        keyword: &str,
    ) -> Result<Option<(String, Rc<Expression>)>, RagnarokError> {
        let Some(items) = list_items(s) else { return Ok(None) };
        if items.len() < 2 || !parse_keyword(&items[0], keyword) {
            return Ok(None);
        }
        let Some(sig) = list_items(&items[1]) else { return Ok(None) };
        if sig.is_empty() {
            return Ok(None);
        }
        let Some(name) = parse_identifier(&sig[0]) else { return Ok(None) };
        let mut params = Vec::with_capacity(sig.len() - 1);
        for p in &sig[1..] {
            let Some(p) = parse_identifier(p) else { return Ok(None) };
            params.push(p);
        }
        let body = self.parse_body(ctxt, &items[2..])?;
        Ok(Some((name, Rc::new(Expression::Lambda(params, body)))))
    }

    fn parse_body(&mut self, ctxt: &Context, items: &[SExpr]) -> Result<Rc<Expression>, RagnarokError> {
        let mut exprs = Vec::with_capacity(items.len());
        for item in items {
            exprs.push(self.parse_exp(ctxt, item)?);
        }
        Ok(Rc::new(Expression::Do(exprs)))
    }

    /// Parses a pure expression: atoms pass straight through `to_expression`;
    /// everything else is tried, in order, against the special forms, the
    /// built-in desugaring macros, and finally application (which also
    /// handles user-macro expansion).
    pub fn parse_exp(&mut self, ctxt: &Context, s: &SExpr) -> Result<Rc<Expression>, RagnarokError> {
        if s.is_atom() {
            return s.to_expression(&ctxt.primitives);
        }
        let Some(items) = list_items(s) else {
            return Err(RagnarokError::parse_error("improper list cannot be an expression"));
        };
        if items.is_empty() {
            return Err(RagnarokError::parse_error("cannot evaluate the empty list"));
        }

        if let Some(e) = self.try_quote(&items) {
            return Ok(e);
        }
        if let Some(e) = self.try_if(ctxt, &items)? {
            return Ok(e);
        }
        if let Some(e) = self.try_lambda(ctxt, &items)? {
            return Ok(e);
        }
        if let Some(e) = self.try_do(ctxt, &items)? {
            return Ok(e);
        }
        if let Some(e) = self.try_letrec(ctxt, &items)? {
            return Ok(e);
        }
        if let Some(e) = self.try_builtin_macro(ctxt, &items)? {
            return Ok(e);
        }
        self.parse_apply(ctxt, &items)
    }

    fn try_quote(&self, items: &[SExpr]) -> Option<Rc<Expression>> {
        if items.len() == 2 && parse_keyword(&items[0], "quote") {
            Some(Rc::new(Expression::Quote(items[1].clone())))
        } else {
            None
        }
    }

    fn try_if(&mut self, ctxt: &Context, items: &[SExpr]) -> Result<Option<Rc<Expression>>, RagnarokError> {
        if items.len() != 4 || !parse_keyword(&items[0], "if") {
            return Ok(None);
        }
        let cond = self.parse_exp(ctxt, &items[1])?;
        let then_branch = self.parse_exp(ctxt, &items[2])?;
        let else_branch = self.parse_exp(ctxt, &items[3])?;
        Ok(Some(Rc::new(Expression::If(cond, then_branch, else_branch))))
    }

    /// `(fn (P...) BODY...)`.
    fn try_lambda(&mut self, ctxt: &Context, items: &[SExpr]) -> Result<Option<Rc<Expression>>, RagnarokError> {
        if items.len() < 2 || !parse_keyword(&items[0], "fn") {
            return Ok(None);
        }
        let Some(param_items) = list_items(&items[1]) else { return Ok(None) };
        let mut params = Vec::with_capacity(param_items.len());
        for p in &param_items {
            let Some(p) = parse_identifier(p) else { return Ok(None) };
            params.push(p);
        }
        let body = self.parse_body(ctxt, &items[2..])?;
        Ok(Some(Rc::new(Expression::Lambda(params, body))))
    }

    fn try_do(&mut self, ctxt: &Context, items: &[SExpr]) -> Result<Option<Rc<Expression>>, RagnarokError> {
        if items.is_empty() || !parse_keyword(&items[0], "do") {
            return Ok(None);
        }
        Ok(Some(self.parse_body(ctxt, &items[1..])?))
    }

    /// `(letrec ((N E)...) BODY...)`.
    fn try_letrec(&mut self, ctxt: &Context, items: &[SExpr]) -> Result<Option<Rc<Expression>>, RagnarokError> {
        if items.len() < 2 || !parse_keyword(&items[0], "letrec") {
            return Ok(None);
        }
        let Some(bindings) = self.parse_bindings(ctxt, &items[1])? else { return Ok(None) };
        let body = self.parse_body(ctxt, &items[2..])?;
        Ok(Some(Rc::new(Expression::LetRec(bindings, body))))
    }

    fn parse_bindings(
        &mut self,
        ctxt: &Context,
        s: &SExpr,
    ) -> Result<Option<Vec<(String, Rc<Expression>)>>, RagnarokError> {
        let Some(binding_items) = list_items(s) else { return Ok(None) };
        let mut bindings = Vec::with_capacity(binding_items.len());
        for binding in &binding_items {
            let Some(pair) = list_items(binding) else { return Ok(None) };
            if pair.len() != 2 {
                return Ok(None);
            }
            let Some(name) = parse_identifier(&pair[0]) else { return Ok(None) };
            let expr = self.parse_exp(ctxt, &pair[1])?;
            bindings.push((name, expr));
        }
        Ok(Some(bindings))
    }

    fn try_builtin_macro(&mut self, ctxt: &Context, items: &[SExpr]) -> Result<Option<Rc<Expression>>, RagnarokError> {
        if let Some(e) = self.try_let(ctxt, items)? {
            return Ok(Some(e));
        }
        if let Some(e) = self.try_let_star(ctxt, items)? {
            return Ok(Some(e));
        }
        if let Some(e) = self.try_fnrec(ctxt, items)? {
            return Ok(Some(e));
        }
        if let Some(e) = self.try_dict(ctxt, items)? {
            return Ok(Some(e));
        }
        if let Some(e) = self.try_and(ctxt, items)? {
            return Ok(Some(e));
        }
        if let Some(e) = self.try_or(ctxt, items)? {
            return Ok(Some(e));
        }
        Ok(None)
    }

    /// `(let ((N E)...) BODY...)` or, when the second position is a bare
    /// identifier instead of a binding list, the named-let "loop" form
    /// `(let NAME ((N E)...) BODY...)`.
    fn try_let(&mut self, ctxt: &Context, items: &[SExpr]) -> Result<Option<Rc<Expression>>, RagnarokError> {
        if items.len() < 2 || !parse_keyword(&items[0], "let") {
            return Ok(None);
        }
        if let Some(name) = parse_identifier(&items[1]) {
            if items.len() < 3 {
                return Ok(None);
            }
            let Some(bindings) = self.parse_bindings(ctxt, &items[2])? else { return Ok(None) };
            let body = self.parse_body(ctxt, &items[3..])?;
            return Ok(Some(mk_loop(name, bindings, body)));
        }
        let Some(bindings) = self.parse_bindings(ctxt, &items[1])? else { return Ok(None) };
        let body = self.parse_body(ctxt, &items[2..])?;
        Ok(Some(mk_let(bindings, body)))
    }

    fn try_let_star(&mut self, ctxt: &Context, items: &[SExpr]) -> Result<Option<Rc<Expression>>, RagnarokError> {
        if items.len() < 2 || !parse_keyword(&items[0], "let*") {
            return Ok(None);
        }
        let Some(bindings) = self.parse_bindings(ctxt, &items[1])? else { return Ok(None) };
        let body = self.parse_body(ctxt, &items[2..])?;
        Ok(Some(mk_let_star(bindings, body)))
    }

    /// `(fnrec NAME (P...) BODY...)`.
    fn try_fnrec(&mut self, ctxt: &Context, items: &[SExpr]) -> Result<Option<Rc<Expression>>, RagnarokError> {
        if items.len() < 3 || !parse_keyword(&items[0], "fnrec") {
            return Ok(None);
        }
        let Some(name) = parse_identifier(&items[1]) else { return Ok(None) };
        let Some(param_items) = list_items(&items[2]) else { return Ok(None) };
        let mut params = Vec::with_capacity(param_items.len());
        for p in &param_items {
            let Some(p) = parse_identifier(p) else { return Ok(None) };
            params.push(p);
        }
        let body = self.parse_body(ctxt, &items[3..])?;
        Ok(Some(mk_fnrec(name, params, body)))
    }

    /// `(dict (K V)...)`.
    fn try_dict(&mut self, ctxt: &Context, items: &[SExpr]) -> Result<Option<Rc<Expression>>, RagnarokError> {
        if items.is_empty() || !parse_keyword(&items[0], "dict") {
            return Ok(None);
        }
        let mut pairs = Vec::with_capacity(items.len() - 1);
        for entry in &items[1..] {
            let Some(kv) = list_items(entry) else { return Ok(None) };
            if kv.len() != 2 {
                return Ok(None);
            }
            let k = self.parse_exp(ctxt, &kv[0])?;
            let v = self.parse_exp(ctxt, &kv[1])?;
            pairs.push((k, v));
        }
        Ok(Some(mk_dict(pairs)))
    }

    /// Right-folds with gensym'd temporaries to preserve short-circuiting:
    /// `(and)` is `#t`; otherwise the last value, or the first falsy one.
    fn try_and(&mut self, ctxt: &Context, items: &[SExpr]) -> Result<Option<Rc<Expression>>, RagnarokError> {
        if items.is_empty() || !parse_keyword(&items[0], "and") {
            return Ok(None);
        }
        let mut exprs = Vec::with_capacity(items.len() - 1);
        for item in &items[1..] {
            exprs.push(self.parse_exp(ctxt, item)?);
        }
        Ok(Some(self.mk_and(exprs)))
    }

    /// `(or)` is `#f`; otherwise the first truthy value, or the last.
    fn try_or(&mut self, ctxt: &Context, items: &[SExpr]) -> Result<Option<Rc<Expression>>, RagnarokError> {
        if items.is_empty() || !parse_keyword(&items[0], "or") {
            return Ok(None);
        }
        let mut exprs = Vec::with_capacity(items.len() - 1);
        for item in &items[1..] {
            exprs.push(self.parse_exp(ctxt, item)?);
        }
        Ok(Some(self.mk_or(exprs)))
    }

    fn mk_and(&mut self, exprs: Vec<Rc<Expression>>) -> Rc<Expression> {
        let Some((last, rest)) = exprs.split_last().map(|(l, r)| (l.clone(), r.to_vec())) else {
            return Rc::new(Expression::BooleanLit(true));
        };
        let mut result = last;
        for e in rest.into_iter().rev() {
            let n = self.gensym("and");
            result = mk_let(
                vec![(n.clone(), e)],
                Rc::new(Expression::If(symbol_expr(&n), result, symbol_expr(&n))),
            );
        }
        result
    }

    fn mk_or(&mut self, exprs: Vec<Rc<Expression>>) -> Rc<Expression> {
        let Some((last, rest)) = exprs.split_last().map(|(l, r)| (l.clone(), r.to_vec())) else {
            return Rc::new(Expression::BooleanLit(false));
        };
        let mut result = last;
        for e in rest.into_iter().rev() {
            let n = self.gensym("or");
            result = mk_let(
                vec![(n.clone(), e)],
                Rc::new(Expression::If(symbol_expr(&n), symbol_expr(&n), result)),
            );
        }
        result
    }

    /// Application. If the head is an identifier registered in the macro
    /// table, the head is tested *before* the arguments are parsed at all:
    /// the raw tail s-expr is expanded and the result re-parsed from
    /// scratch instead.
    fn parse_apply(&mut self, ctxt: &Context, items: &[SExpr]) -> Result<Rc<Expression>, RagnarokError> {
        if let SExpr::Symbol(name) = &items[0] {
            let upper = name.to_uppercase();
            if self.macros.is_macro(&upper) {
                let expanded = self.expand_macro(ctxt, &upper, &items[1..])?;
                return self.parse_exp(ctxt, &expanded);
            }
        }
        let fun = self.parse_exp(ctxt, &items[0])?;
        let mut args = Vec::with_capacity(items.len() - 1);
        for item in &items[1..] {
            args.push(self.parse_exp(ctxt, item)?);
        }
        Ok(Rc::new(Expression::Apply(fun, args)))
    }

    /// Macro expansion: the unparsed argument tail becomes a `Value` (as if
    /// quoted), the macro's function value is applied to it, and the
    /// resulting `Value` is serialized back to surface syntax and re-parsed.
    /// No hygiene is attempted - callers must `gensym` in their own macros.
    fn expand_macro(&mut self, ctxt: &Context, name: &str, tail: &[SExpr]) -> Result<SExpr, RagnarokError> {
        let expander = self.macros.get(name).ok_or_else(|| {
            RagnarokError::runtime_error(format!("No such macro {}", name))
        })?;
        let tail_value = SExpr::list(tail.to_vec()).as_value(&ctxt.primitives)?;
        let arg_values = tail_value.to_vec()?;
        let result = apply_function(ctxt, &expander, arg_values)?;
        value_to_sexpr(&result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::Environment;
    use crate::primitives::PrimitiveRegistry;
    use crate::reader::read;
    use std::rc::Rc as StdRc;

    fn fresh_ctxt() -> Context {
        Context::new(Environment::new(), StdRc::new(PrimitiveRegistry::with_builtins()))
    }

    fn parse_str(parser: &mut Parser, ctxt: &Context, src: &str) -> TopLevel {
        let (s, _) = read(src).unwrap();
        parser.parse_sexp(ctxt, &s).unwrap()
    }

    fn eval_str(src: &str) -> Value {
        let mut parser = Parser::new();
        let ctxt = fresh_ctxt();
        match parse_str(&mut parser, &ctxt, src) {
            TopLevel::Exp(expr) => crate::eval::eval(&expr, &ctxt, &ctxt.def_env).unwrap(),
            _ => panic!("expected an expression"),
        }
    }

    #[test]
    fn parses_var_and_const_declarations() {
        let mut parser = Parser::new();
        let ctxt = fresh_ctxt();
        match parse_str(&mut parser, &ctxt, "(var x 10)") {
            TopLevel::Var(name, _) => assert_eq!(name, "X"),
            _ => panic!("expected var"),
        }
        match parse_str(&mut parser, &ctxt, "(const y 20)") {
            TopLevel::Const(name, _) => assert_eq!(name, "Y"),
            _ => panic!("expected const"),
        }
    }

    #[test]
    fn single_symbol_def_installs_a_plain_mutable_binding() {
        let mut parser = Parser::new();
        let ctxt = fresh_ctxt();
        match parse_str(&mut parser, &ctxt, "(def x (+ 1 2))") {
            TopLevel::Var(name, expr) => {
                assert_eq!(name, "X");
                let v = crate::eval::eval(&expr, &ctxt, &ctxt.def_env).unwrap();
                assert!(v.is_equal(&Value::Number(BigInt::from(3))));
            }
            _ => panic!("expected the single-symbol def form to parse as a var binding"),
        }
    }

    #[test]
    fn parses_def_as_a_lambda_over_a_do() {
        let mut parser = Parser::new();
        let ctxt = fresh_ctxt();
        match parse_str(&mut parser, &ctxt, "(def (square n) (* n n))") {
            TopLevel::Def(name, expr) => {
                assert_eq!(name, "SQUARE");
                assert!(matches!(&*expr, Expression::Lambda(params, _) if params == &["N".to_string()]));
            }
            _ => panic!("expected def"),
        }
    }

    #[test]
    fn simple_application_evaluates() {
        assert!(eval_str("((fn (a b) a) 42 0)").is_equal(&Value::Number(BigInt::from(42))));
    }

    #[test]
    fn let_star_threads_bindings_sequentially() {
        assert!(eval_str("(let* ((a 1) (b a) (c b)) (+ a b c))").is_equal(&Value::Number(BigInt::from(3))));
    }

    #[test]
    fn and_or_short_circuit_and_identities() {
        assert!(eval_str("(and 1 2 #f 3)").is_equal(&Value::Boolean(false)));
        assert!(eval_str("(or #f #f 7 8)").is_equal(&Value::Number(BigInt::from(7))));
        assert!(eval_str("(and)").is_equal(&Value::Boolean(true)));
        assert!(eval_str("(or)").is_equal(&Value::Boolean(false)));
    }

    #[test]
    fn named_let_loop_accumulates() {
        assert!(eval_str("(let loop ((n 10) (s 0)) (if (= n 0) s (loop (- n 1) (+ s n))))")
            .is_equal(&Value::Number(BigInt::from(55))));
    }

    #[test]
    fn fnrec_builds_a_self_recursive_function() {
        assert!(
            eval_str("((fnrec fact (n) (if (= n 0) 1 (* n (fact (- n 1))))) 5)")
                .is_equal(&Value::Number(BigInt::from(120)))
        );
    }

    #[test]
    fn dict_macro_desugars_to_make_dict_of_pairs() {
        let v = eval_str("(dict-get (dict (\"a\" 1) (\"b\" 2)) \"b\")");
        assert!(v.is_equal(&Value::Number(BigInt::from(2))));
    }

    #[test]
    fn user_macro_expands_before_evaluation() {
        let mut parser = Parser::new();
        let ctxt = fresh_ctxt();
        // (macro (unless c e) (if c 'nil e))
        match parse_str(&mut parser, &ctxt, "(macro (unless c e) (if c (quote nil) e))") {
            TopLevel::Macro(name, lambda) => {
                let f = Value::Function(StdRc::new(crate::value::Function {
                    params: vec!["C".to_string(), "E".to_string()],
                    body: match &*lambda {
                        Expression::Lambda(_, body) => StdRc::clone(body),
                        _ => panic!("expected lambda"),
                    },
                    env: StdRc::clone(&ctxt.def_env),
                }));
                parser.register_macro(&name, f);
            }
            _ => panic!("expected macro declaration"),
        }
        match parse_str(&mut parser, &ctxt, "(unless #f 42)") {
            TopLevel::Exp(expr) => {
                let v = crate::eval::eval(&expr, &ctxt, &ctxt.def_env).unwrap();
                assert!(v.is_equal(&Value::Number(BigInt::from(42))));
            }
            _ => panic!("expected exp"),
        }
        match parse_str(&mut parser, &ctxt, "(unless #t 42)") {
            TopLevel::Exp(expr) => {
                let v = crate::eval::eval(&expr, &ctxt, &ctxt.def_env).unwrap();
                assert!(v.is_equal(&Value::Nil));
            }
            _ => panic!("expected exp"),
        }
    }
}

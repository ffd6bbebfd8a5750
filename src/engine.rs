// ABOUTME: Top-level glue: read -> parse -> eval, and the declaration dispatch in between.

use crate::ast::Expression;
use crate::env::Environment;
use crate::error::RagnarokError;
use crate::eval::Context;
use crate::parser::{Parser, TopLevel};
use crate::primitives::PrimitiveRegistry;
use crate::sexpr::SExpr;
use crate::value::Value;
use std::rc::Rc;

/// What evaluating one top-level form produces: either a bound name (and the
/// `";; NAME"` report a REPL host would print), or a plain value.
pub enum EvalOutcome {
    Definition { name: String, report: String },
    Value(Value),
}

impl EvalOutcome {
    pub fn value(&self) -> Option<&Value> {
        match self {
            EvalOutcome::Value(v) => Some(v),
            EvalOutcome::Definition { .. } => None,
        }
    }
}

/// Owns the primitive registry, the root environment, the parser (macro
/// table + gensym counter), and the ambient `Context` - every piece of
/// mutable state this language's core needs, all explicit fields rather than
/// hidden globals. Two engines never interfere with one another.
pub struct Engine {
    parser: Parser,
    ctxt: Context,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        let (root, primitives) = bootstrap_root();
        Engine { parser: Parser::new(), ctxt: Context::new(root, primitives) }
    }

    pub fn with_print(print: impl FnMut(&str) + 'static) -> Self {
        let (root, primitives) = bootstrap_root();
        Engine { parser: Parser::new(), ctxt: Context::with_print(root, primitives, print) }
    }

    pub fn root(&self) -> &Rc<Environment> {
        &self.ctxt.def_env
    }

    pub fn context(&self) -> &Context {
        &self.ctxt
    }

    /// Strips `;`-to-end-of-line comments, then reads one s-expression. In
    /// strict mode, non-whitespace left over after that one expression is a
    /// *read-error* rather than silently-ignored trailing input.
    pub fn read(&self, text: &str, strict: bool) -> Result<Option<SExpr>, RagnarokError> {
        let stripped = strip_comments(text);
        if stripped.trim().is_empty() {
            return Ok(None);
        }
        let (sexpr, rest) = crate::reader::read(&stripped)?;
        if strict && !rest.trim().is_empty() {
            return Err(RagnarokError::read_error(format!(
                "input past end of expression: {}",
                rest
            )));
        }
        Ok(Some(sexpr))
    }

    /// Classifies an s-expr as a declaration or a plain expression, without
    /// evaluating anything yet.
    pub fn parse_sexp(&mut self, s: &SExpr) -> Result<TopLevel, RagnarokError> {
        self.parser.parse_sexp(&self.ctxt, s)
    }

    /// Installs a declaration's binding, or evaluates a plain expression.
    /// `source` (when given) is recorded alongside a `var`/`const`/`def`
    /// binding for later retrieval by a persistence layer.
    pub fn eval_parsed_sexp(
        &mut self,
        top: TopLevel,
        source: Option<String>,
    ) -> Result<EvalOutcome, RagnarokError> {
        match top {
            TopLevel::Var(name, expr) => {
                let v = crate::eval::eval(&expr, &self.ctxt, &self.ctxt.def_env)?;
                self.ctxt.def_env.add_with_source(&name, v, source, true);
                Ok(EvalOutcome::Definition { report: format!(";; {}", name), name })
            }
            TopLevel::Const(name, expr) => {
                let v = crate::eval::eval(&expr, &self.ctxt, &self.ctxt.def_env)?;
                self.ctxt.def_env.add_with_source(&name, v, source, false);
                Ok(EvalOutcome::Definition { report: format!(";; {}", name), name })
            }
            TopLevel::Def(name, lambda) => {
                let v = self.close_over_def_env(&lambda);
                self.ctxt.def_env.add_with_source(&name, v, source, true);
                Ok(EvalOutcome::Definition { report: format!(";; {}", name), name })
            }
            TopLevel::Macro(name, lambda) => {
                let v = self.close_over_def_env(&lambda);
                self.parser.register_macro(&name, v);
                Ok(EvalOutcome::Definition { report: format!(";; {}", name), name })
            }
            TopLevel::Exp(expr) => {
                let v = crate::eval::eval(&expr, &self.ctxt, &self.ctxt.def_env)?;
                Ok(EvalOutcome::Value(v))
            }
        }
    }

    /// `def`/`macro` both parse to a bare `Lambda`; the function value closes
    /// over the current definition environment rather than being evaluated
    /// (there is nothing to evaluate - a lambda is already its own value).
    fn close_over_def_env(&self, lambda: &Rc<Expression>) -> Value {
        match lambda.as_ref() {
            Expression::Lambda(params, body) => Value::Function(Rc::new(crate::value::Function {
                params: params.clone(),
                body: Rc::clone(body),
                env: Rc::clone(&self.ctxt.def_env),
            })),
            _ => unreachable!("def/macro parsing always yields a Lambda expression"),
        }
    }

    /// Reads then evaluates exactly one top-level form.
    pub fn eval(&mut self, text: &str) -> Result<EvalOutcome, RagnarokError> {
        let sexpr = self
            .read(text, true)?
            .ok_or_else(|| RagnarokError::read_error("no expression to evaluate"))?;
        let top = self.parse_sexp(&sexpr)?;
        self.eval_parsed_sexp(top, None)
    }
}

fn bootstrap_root() -> (Rc<Environment>, Rc<PrimitiveRegistry>) {
    let primitives = Rc::new(PrimitiveRegistry::with_builtins());
    let root = Environment::new();
    primitives.install_into(&root);
    root.add("NIL", Value::Nil);
    root.add("EMPTY", Value::Empty);
    (root, primitives)
}

/// Removes everything from an unquoted `;` to the end of its line. Matches
/// the reference reader's comment handling: it does not special-case `;`
/// appearing inside a string literal, so neither do we.
fn strip_comments(text: &str) -> String {
    text.lines()
        .map(|line| match line.find(';') {
            Some(idx) => &line[..idx],
            None => line,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

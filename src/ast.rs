// ABOUTME: The evaluable AST and its tail-call trampoline contract.

use crate::env::Environment;
use crate::error::RagnarokError;
use crate::eval::Context;
use crate::sexpr::SExpr;
use crate::value::{ConsCell, Function, Value};
use num_bigint::BigInt;
use std::rc::Rc;

/// One step of the trampoline: either a final value, or the next expression
/// to evaluate together with the environment to evaluate it in.
pub enum Step {
    Done(Value),
    Tail(Rc<Expression>, Rc<Environment>),
}

/// An AST node. Every variant is immutable once parsed; structure sharing
/// (e.g. a function body referenced by every call) is safe because nothing
/// here is ever mutated in place.
#[derive(Debug, Clone)]
pub enum Expression {
    Literal(Value),
    /// `qualifiers` is almost always empty (unqualified lookup) or a single
    /// name (`MOD:X`); more than one segment is accepted by the grammar but
    /// rejected with a *module-error* at evaluation time, since this
    /// language supports only one level of module qualification.
    Symbol {
        name: String,
        qualifiers: Vec<String>,
    },
    StringLit(String),
    IntegerLit(BigInt),
    BooleanLit(bool),
    If(Rc<Expression>, Rc<Expression>, Rc<Expression>),
    Apply(Rc<Expression>, Vec<Rc<Expression>>),
    Lambda(Vec<String>, Rc<Expression>),
    Quote(SExpr),
    LetRec(Vec<(String, Rc<Expression>)>, Rc<Expression>),
    Do(Vec<Rc<Expression>>),
}

impl Expression {
    /// One trampoline step. Tail positions (the selected branch of `if`, the
    /// last expression of `do`, the body of `letrec`, the body of a function
    /// invoked via `Apply`) return `Step::Tail` instead of recursing, so
    /// `eval` below can loop instead of growing the host stack.
    pub fn eval_partial(
        self: &Rc<Expression>,
        ctxt: &Context,
        env: &Rc<Environment>,
    ) -> Result<Step, RagnarokError> {
        match self.as_ref() {
            Expression::Literal(v) => Ok(Step::Done(v.clone())),
            Expression::StringLit(s) => Ok(Step::Done(Value::string(s.clone()))),
            Expression::IntegerLit(n) => Ok(Step::Done(Value::Number(n.clone()))),
            Expression::BooleanLit(b) => Ok(Step::Done(Value::Boolean(*b))),

            Expression::Symbol { name, qualifiers } => {
                Ok(Step::Done(eval_symbol(ctxt, env, name, qualifiers)?))
            }

            Expression::If(cond, then_branch, else_branch) => {
                let c = crate::eval::eval(cond, ctxt, env)?;
                if c.is_true() {
                    Ok(Step::Tail(Rc::clone(then_branch), Rc::clone(env)))
                } else {
                    Ok(Step::Tail(Rc::clone(else_branch), Rc::clone(env)))
                }
            }

            Expression::Quote(sexpr) => Ok(Step::Done(sexpr.as_value(&ctxt.primitives)?)),

            Expression::Lambda(params, body) => Ok(Step::Done(Value::Function(Rc::new(Function {
                params: params.clone(),
                body: Rc::clone(body),
                env: Rc::clone(env),
            })))),

            Expression::Apply(fun, args) => {
                let f = crate::eval::eval(fun, ctxt, env)?;
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(crate::eval::eval(arg, ctxt, env)?);
                }
                match &f {
                    Value::Primitive(p) => {
                        check_arity(&p.name, p.min, p.max, values.len())?;
                        Ok(Step::Done((p.func)(ctxt, &values)?))
                    }
                    Value::Function(fun) => {
                        check_arity(
                            "function",
                            fun.params.len(),
                            Some(fun.params.len()),
                            values.len(),
                        )?;
                        let new_env = Environment::extend(&fun.env);
                        for (param, value) in fun.params.iter().zip(values.into_iter()) {
                            new_env.add(param, value);
                        }
                        Ok(Step::Tail(Rc::clone(&fun.body), new_env))
                    }
                    other => Err(RagnarokError::not_callable(other.to_string())),
                }
            }

            Expression::LetRec(bindings, body) => {
                let new_env = Environment::extend(env);
                for (name, _) in bindings {
                    new_env.add_uninitialized(name);
                }
                for (name, expr) in bindings {
                    let v = crate::eval::eval(expr, ctxt, &new_env)?;
                    new_env.initialize(name, v);
                }
                Ok(Step::Tail(Rc::clone(body), new_env))
            }

            Expression::Do(exprs) => {
                if exprs.is_empty() {
                    return Ok(Step::Done(Value::Nil));
                }
                for expr in &exprs[..exprs.len() - 1] {
                    crate::eval::eval(expr, ctxt, env)?;
                }
                Ok(Step::Tail(Rc::clone(&exprs[exprs.len() - 1]), Rc::clone(env)))
            }
        }
    }
}

fn eval_symbol(
    ctxt: &Context,
    env: &Rc<Environment>,
    name: &str,
    qualifiers: &[String],
) -> Result<Value, RagnarokError> {
    if !qualifiers.is_empty() {
        if qualifiers.len() > 1 {
            return Err(RagnarokError::module_error(
                "No support for nested modules yet",
            ));
        }
        let module_name = &qualifiers[0];
        let module_binding = env.lookup(module_name)?;
        let module_env = match module_binding.value {
            Value::Module(env) => env,
            other => {
                return Err(RagnarokError::module_error(format!(
                    "Symbol {} does not represent a module",
                    other
                )))
            }
        };
        let binding = module_env
            .lookup(name)
            .map_err(|_| RagnarokError::unbound_symbol(format!("{}:{}", module_name, name)))?;
        return resolved_or_uninitialized(name, binding);
    }

    if let Some(binding) = env.find(name) {
        return resolved_or_uninitialized(name, binding);
    }

    for module_name in ctxt.modules.borrow().iter() {
        if let Some(module_binding) = env.find(module_name) {
            if let Value::Module(module_env) = &module_binding.value {
                if let Some(binding) = module_env.find(name) {
                    return resolved_or_uninitialized(name, binding);
                }
            }
        }
    }

    Err(RagnarokError::unbound_symbol(name))
}

fn resolved_or_uninitialized(
    name: &str,
    binding: crate::env::Binding,
) -> Result<Value, RagnarokError> {
    if !binding.initialized {
        return Err(RagnarokError::runtime_error(format!(
            "Trying to access a non-initialized binding {} in a LETREC",
            name
        )));
    }
    Ok(binding.value)
}

fn check_arity(
    name: &str,
    min: usize,
    max: Option<usize>,
    actual: usize,
) -> Result<(), RagnarokError> {
    if actual < min || max.map(|m| actual > m).unwrap_or(false) {
        let expected = match max {
            Some(m) if m == min => min.to_string(),
            Some(m) => format!("{}-{}", min, m),
            None => format!("at least {}", min),
        };
        return Err(RagnarokError::wrong_arg_count(name, expected, actual));
    }
    Ok(())
}

/// Builds a value-typed list out of an AST `Do` for desugaring convenience.
pub fn cons_expr(car: Value, cdr: Value) -> Result<Value, RagnarokError> {
    Value::cons(car, cdr)
}

#[allow(dead_code)]
pub fn empty_cons_cell(car: Value) -> Rc<ConsCell> {
    Rc::new(ConsCell {
        car,
        cdr: Value::Empty,
    })
}

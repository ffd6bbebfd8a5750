// ABOUTME: The trampoline driver and the evaluation context threaded through it.

use crate::ast::{Expression, Step};
use crate::env::Environment;
use crate::error::RagnarokError;
use crate::primitives::PrimitiveRegistry;
use crate::value::Value;
use std::cell::RefCell;
use std::rc::Rc;

/// The dictionary threaded through evaluation. Holds the ambient state
/// primitives and the parser's macro-expansion calls both need: a print
/// sink, the destination frame for new top-level definitions, the list of
/// currently open modules, and callbacks for switching modules or reading a
/// file for the `load` primitive.
///
/// The per-call *lexical* environment is deliberately not stored here - it
/// is threaded explicitly through `eval`/`eval_partial` instead, since many
/// lexical environments are live simultaneously during one evaluation (one
/// per active closure frame) while there is only ever one `Context`.
pub struct Context {
    pub print: RefCell<Box<dyn FnMut(&str)>>,
    pub def_env: Rc<Environment>,
    pub modules: RefCell<Vec<String>>,
    pub primitives: Rc<PrimitiveRegistry>,
    #[allow(clippy::type_complexity)]
    pub set_module: RefCell<Option<Box<dyn FnMut(&str) -> Result<(), RagnarokError>>>>,
    #[allow(clippy::type_complexity)]
    pub read_file: RefCell<Option<Box<dyn FnMut(&str) -> Result<String, RagnarokError>>>>,
}

impl Context {
    pub fn new(def_env: Rc<Environment>, primitives: Rc<PrimitiveRegistry>) -> Context {
        Context {
            print: RefCell::new(Box::new(|s: &str| println!("{}", s))),
            def_env,
            modules: RefCell::new(Vec::new()),
            primitives,
            set_module: RefCell::new(None),
            read_file: RefCell::new(None),
        }
    }

    pub fn with_print(
        def_env: Rc<Environment>,
        primitives: Rc<PrimitiveRegistry>,
        print: impl FnMut(&str) + 'static,
    ) -> Context {
        let mut ctxt = Context::new(def_env, primitives);
        ctxt.print = RefCell::new(Box::new(print));
        ctxt
    }

    pub fn print_line(&self, s: &str) {
        (self.print.borrow_mut())(s);
    }
}

/// Drives the trampoline to completion: repeatedly takes one
/// `eval_partial` step until it resolves to a final value, threading the
/// returned `(expr, env)` pair instead of recursing. This is what keeps a
/// self-tail-calling function from growing the host stack.
pub fn eval(
    expr: &Rc<Expression>,
    ctxt: &Context,
    env: &Rc<Environment>,
) -> Result<Value, RagnarokError> {
    let mut curr_expr = Rc::clone(expr);
    let mut curr_env = Rc::clone(env);
    loop {
        match curr_expr.eval_partial(ctxt, &curr_env)? {
            Step::Done(v) => return Ok(v),
            Step::Tail(next_expr, next_env) => {
                curr_expr = next_expr;
                curr_env = next_env;
            }
        }
    }
}

/// Applies a function or primitive value to already-evaluated arguments,
/// driving a user function's body to completion rather than returning a
/// tail step. Used wherever a *value*, not a suspended step, is required
/// right away: higher-order primitives (`APPLY`/`MAP`/`FILTER`/`FOLDL`/
/// `FOLDR`) and the parser's macro expansion.
pub fn apply_function(ctxt: &Context, func: &Value, args: Vec<Value>) -> Result<Value, RagnarokError> {
    match func {
        Value::Primitive(p) => {
            check_arity(&p.name, p.min, p.max, args.len())?;
            (p.func)(ctxt, &args)
        }
        Value::Function(f) => {
            if f.params.len() != args.len() {
                return Err(RagnarokError::wrong_arg_count(
                    "function",
                    f.params.len().to_string(),
                    args.len(),
                ));
            }
            let new_env = Environment::extend(&f.env);
            for (param, value) in f.params.iter().zip(args.into_iter()) {
                new_env.add(param, value);
            }
            eval(&f.body, ctxt, &new_env)
        }
        other => Err(RagnarokError::not_callable(other.to_string())),
    }
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

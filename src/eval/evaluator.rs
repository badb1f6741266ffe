use std::rc::Rc;

use log::debug;

use crate::compiler::ast::{BinOp, Expr, ExprKind};
use crate::compiler::token::Number;
use crate::common::span::Span;
use crate::construct::environment::Environment;
use crate::construct::grid::{GridHandle, Snapshot};
use crate::construct::trace::{ErrorKind, Trace};
use crate::construct::value::{Closure, Value};
use crate::core;

/// Walks an `Expr` tree directly, one `match` arm per `ExprKind` variant —
/// the tree-walking counterpart to passerine's bytecode `vm::vm::VM::step`,
/// which instead dispatches on a compiled opcode. Owns the pieces a running
/// program needs beyond its own environment chain: the pixel grid, the most
/// recent `makeRef` snapshot, and an optional step budget.
pub struct Evaluator {
    root: Environment,
    grid: GridHandle,
    snapshot: Option<Rc<Snapshot>>,
    max_steps: Option<u64>,
    steps: u64,
}

impl Evaluator {
    pub fn new(grid: GridHandle, max_steps: Option<u64>) -> Evaluator {
        let root = Environment::root();
        let width = grid.borrow().width();
        let height = grid.borrow().height();
        core::install(&root, Rc::clone(&grid), width, height);
        Evaluator { root, grid, snapshot: None, max_steps, steps: 0 }
    }

    pub fn run(&mut self, program: &Expr) -> Result<Value, Trace> {
        let root = self.root.clone();
        self.eval(program, &root)
    }

    fn check_step(&mut self, span: &Span) -> Result<(), Trace> {
        if let Some(limit) = self.max_steps {
            self.steps += 1;
            if self.steps > limit {
                return Err(Trace::new(ErrorKind::StepLimit(limit), span.clone()));
            }
        }
        Ok(())
    }

    fn eval(&mut self, expr: &Expr, env: &Environment) -> Result<Value, Trace> {
        match &expr.kind {
            ExprKind::Num(n) => Ok(match n {
                Number::Int(i) => Value::Int(*i),
                Number::Float(f) => Value::Float(*f),
            }),
            ExprKind::Bool(b) => Ok(Value::Bool(*b)),
            ExprKind::Var(name) => env
                .lookup(name)
                .ok_or_else(|| Trace::new(ErrorKind::NameError(name.clone()), expr.span.clone())),
            ExprKind::Assign { target, value } => self.eval_assign(target, value, env, &expr.span),
            ExprKind::Binary { op, left, right } => self.eval_binary(*op, left, right, env),
            ExprKind::If { cond, then_branch, else_branch } => {
                if self.eval(cond, env)?.truthy() {
                    self.eval(then_branch, env)
                } else {
                    match else_branch {
                        Some(e) => self.eval(e, env),
                        None => Ok(Value::Bool(false)),
                    }
                }
            }
            ExprKind::Lambda { params, body } => Ok(Value::Closure(Rc::new(Closure {
                params: params.clone(),
                body: Rc::clone(body),
                env: env.clone(),
            }))),
            ExprKind::Call { callee, args } => self.eval_call(callee, args, env, &expr.span),
            ExprKind::Index { receiver, indices } => self.eval_index(receiver, indices, env, &expr.span),
            ExprKind::For { init, cond, incr, body } => self.eval_for(init, cond, incr, body, env, &expr.span),
            ExprKind::Prog(exprs) => {
                let mut result = Value::Bool(false);
                for e in exprs {
                    self.check_step(&e.span)?;
                    result = self.eval(e, env)?;
                }
                Ok(result)
            }
        }
    }

    fn eval_assign(&mut self, target: &Expr, value: &Expr, env: &Environment, span: &Span) -> Result<Value, Trace> {
        match &target.kind {
            ExprKind::Var(name) => {
                let v = self.eval(value, env)?;
                env.assign(name, v.clone());
                Ok(v)
            }
            ExprKind::Index { receiver, indices } => self.assign_index(receiver, indices, value, env, span),
            _ => Err(Trace::new(
                ErrorKind::AssignTargetError("assignment target must be a variable or a pixel index".to_string()),
                target.span.clone(),
            )),
        }
    }

    /// `pixels[x, y] = rgb(r, g, b)` is the only assignable index form: the
    /// right-hand side must be a call to the `rgb` built-in, so the pixel
    /// grid never ends up holding a value other than a pixel triple.
    fn assign_index(&mut self, receiver: &Expr, indices: &[Expr], value: &Expr, env: &Environment, span: &Span) -> Result<Value, Trace> {
        let is_rgb_call = matches!(
            &value.kind,
            ExprKind::Call { callee, .. } if matches!(&callee.kind, ExprKind::Var(name) if name == "rgb")
        );
        if !is_rgb_call {
            return Err(Trace::new(
                ErrorKind::AssignTargetError("pixel assignment requires an rgb(...) value on the right".to_string()),
                value.span.clone(),
            ));
        }
        if indices.len() != 2 {
            return Err(Trace::new(ErrorKind::TypeError("pixel indexing takes exactly two indices".to_string()), span.clone()));
        }

        let receiver_value = self.eval(receiver, env)?;
        let grid = match receiver_value {
            Value::Grid(g) => g,
            other => return Err(Trace::new(ErrorKind::TypeError(format!("cannot index into a {}", other.type_name())), receiver.span.clone())),
        };
        let x = self.eval_index_component(&indices[0], env)?;
        let y = self.eval_index_component(&indices[1], env)?;
        let pixel_value = self.eval(value, env)?;
        let rgb = match pixel_value {
            Value::Pixel(r, g, b) => (r, g, b),
            _ => unreachable!("rgb(...) always evaluates to Value::Pixel"),
        };

        if grid.borrow_mut().set(x, y, rgb) {
            Ok(pixel_value)
        } else {
            Err(Trace::new(ErrorKind::IndexError { x, y }, span.clone()))
        }
    }

    fn eval_index_component(&mut self, expr: &Expr, env: &Environment) -> Result<i64, Trace> {
        match self.eval(expr, env)? {
            Value::Int(i) => Ok(i),
            other => Err(Trace::new(ErrorKind::TypeError(format!("expected an integer index, got {}", other.type_name())), expr.span.clone())),
        }
    }

    fn eval_index(&mut self, receiver: &Expr, indices: &[Expr], env: &Environment, span: &Span) -> Result<Value, Trace> {
        if indices.len() != 2 {
            return Err(Trace::new(ErrorKind::TypeError("pixel indexing takes exactly two indices".to_string()), span.clone()));
        }
        let receiver_value = self.eval(receiver, env)?;
        let grid = match receiver_value {
            Value::Grid(g) => g,
            other => return Err(Trace::new(ErrorKind::TypeError(format!("cannot index into a {}", other.type_name())), receiver.span.clone())),
        };
        let x = self.eval_index_component(&indices[0], env)?;
        let y = self.eval_index_component(&indices[1], env)?;
        match grid.borrow().get(x, y) {
            Some((r, g, b)) => Ok(Value::Pixel(r, g, b)),
            None => Err(Trace::new(ErrorKind::IndexError { x, y }, span.clone())),
        }
    }

    fn eval_binary(&mut self, op: BinOp, left: &Expr, right: &Expr, env: &Environment) -> Result<Value, Trace> {
        if matches!(op, BinOp::And | BinOp::Or) {
            let l = self.eval(left, env)?;
            let short_circuits = match op {
                BinOp::And => !l.truthy(),
                BinOp::Or => l.truthy(),
                _ => unreachable!(),
            };
            return if short_circuits { Ok(l) } else { self.eval(right, env) };
        }

        let l = self.eval(left, env)?;
        let r = self.eval(right, env)?;
        let span = Span::combine(&left.span, &right.span);

        match op {
            BinOp::Eq => return Ok(Value::Bool(l == r)),
            BinOp::Ne => return Ok(Value::Bool(l != r)),
            _ => {}
        }

        match (&l, &r) {
            (Value::Int(a), Value::Int(b)) => eval_int_binary(op, *a, *b, &span),
            _ => {
                let a = l.as_number().ok_or_else(|| type_error(&l, &span))?;
                let b = r.as_number().ok_or_else(|| type_error(&r, &span))?;
                eval_float_binary(op, a, b, &span)
            }
        }
    }

    fn eval_call(&mut self, callee: &Expr, args: &[Expr], env: &Environment, span: &Span) -> Result<Value, Trace> {
        let callee_value = self.eval(callee, env)?;
        let mut arg_values = Vec::with_capacity(args.len());
        for arg in args {
            arg_values.push(self.eval(arg, env)?);
        }
        self.check_step(span)?;

        match callee_value {
            Value::Closure(closure) => {
                debug!("calling closure with {} of {} parameter(s) bound", arg_values.len(), closure.params.len());
                let call_env = closure.env.child();
                for (i, param) in closure.params.iter().enumerate() {
                    let value = arg_values.get(i).cloned().unwrap_or(Value::Bool(false));
                    call_env.define(param.clone(), value);
                }
                self.eval(&closure.body, &call_env)
            }
            Value::Native(native) => core::call(native, arg_values, span, &self.root, &self.grid, &mut self.snapshot),
            other => Err(Trace::new(ErrorKind::TypeError(format!("{} is not callable", other.type_name())), callee.span.clone())),
        }
    }

    fn eval_for(&mut self, init: &Expr, cond: &Expr, incr: &Expr, body: &Expr, env: &Environment, span: &Span) -> Result<Value, Trace> {
        let loop_env = env.child();
        self.eval(init, &loop_env)?;
        while self.eval(cond, &loop_env)?.truthy() {
            self.check_step(span)?;
            let body_env = loop_env.child();
            self.eval(body, &body_env)?;
            self.eval(incr, &loop_env)?;
        }
        Ok(Value::Bool(false))
    }
}

fn type_error(value: &Value, span: &Span) -> Trace {
    Trace::new(ErrorKind::TypeError(format!("expected a number, got {}", value.type_name())), span.clone())
}

/// Floor division: rounds toward negative infinity, matching
/// `eval_float_binary`'s `(a / b).floor()` rather than Rust's
/// truncate-toward-zero `/`.
fn floor_div(a: i64, b: i64) -> i64 {
    let q = a / b;
    let r = a % b;
    if r != 0 && (r < 0) != (b < 0) {
        q - 1
    } else {
        q
    }
}

/// Floor modulo: the remainder with the same sign as `b`, consistent with
/// `floor_div` (`a == floor_div(a, b) * b + floor_mod(a, b)`).
fn floor_mod(a: i64, b: i64) -> i64 {
    let r = a % b;
    if r != 0 && (r < 0) != (b < 0) {
        r + b
    } else {
        r
    }
}

fn eval_int_binary(op: BinOp, a: i64, b: i64, span: &Span) -> Result<Value, Trace> {
    match op {
        BinOp::Add => Ok(Value::Int(a + b)),
        BinOp::Sub => Ok(Value::Int(a - b)),
        BinOp::Mul => Ok(Value::Int(a * b)),
        BinOp::Div => {
            if b == 0 {
                Err(Trace::new(ErrorKind::DivisionByZero, span.clone()))
            } else {
                Ok(Value::Float(a as f64 / b as f64))
            }
        }
        BinOp::FloorDiv => {
            if b == 0 {
                Err(Trace::new(ErrorKind::DivisionByZero, span.clone()))
            } else {
                Ok(Value::Int(floor_div(a, b)))
            }
        }
        BinOp::Mod => {
            if b == 0 {
                Err(Trace::new(ErrorKind::DivisionByZero, span.clone()))
            } else {
                Ok(Value::Int(floor_mod(a, b)))
            }
        }
        BinOp::Lt => Ok(Value::Bool(a < b)),
        BinOp::Gt => Ok(Value::Bool(a > b)),
        BinOp::Le => Ok(Value::Bool(a <= b)),
        BinOp::Ge => Ok(Value::Bool(a >= b)),
        BinOp::Eq | BinOp::Ne | BinOp::And | BinOp::Or => unreachable!("handled before numeric dispatch"),
    }
}

fn eval_float_binary(op: BinOp, a: f64, b: f64, span: &Span) -> Result<Value, Trace> {
    match op {
        BinOp::Add => Ok(Value::Float(a + b)),
        BinOp::Sub => Ok(Value::Float(a - b)),
        BinOp::Mul => Ok(Value::Float(a * b)),
        BinOp::Div => {
            if b == 0.0 {
                Err(Trace::new(ErrorKind::DivisionByZero, span.clone()))
            } else {
                Ok(Value::Float(a / b))
            }
        }
        BinOp::FloorDiv => {
            if b == 0.0 {
                Err(Trace::new(ErrorKind::DivisionByZero, span.clone()))
            } else {
                Ok(Value::Float((a / b).floor()))
            }
        }
        BinOp::Mod => {
            if b == 0.0 {
                Err(Trace::new(ErrorKind::DivisionByZero, span.clone()))
            } else {
                Ok(Value::Float(a.rem_euclid(b)))
            }
        }
        BinOp::Lt => Ok(Value::Bool(a < b)),
        BinOp::Gt => Ok(Value::Bool(a > b)),
        BinOp::Le => Ok(Value::Bool(a <= b)),
        BinOp::Ge => Ok(Value::Bool(a >= b)),
        BinOp::Eq | BinOp::Ne | BinOp::And | BinOp::Or => unreachable!("handled before numeric dispatch"),
    }
}

// ABOUTME: Tree-walking evaluator with environment frames and structured control flow

use crate::ast::{BinaryOp, Expr, FunDecl, Literal, Stmt, UnaryOp};
use crate::builtins::register_builtins;
use crate::env::Environment;
use crate::error::RuntimeError;
use crate::scanner::Token;
use crate::value::{Callable, Value};
use std::io::Write;
use std::rc::Rc;

/// Non-local control threaded out of statement evaluation. Loops consume
/// `Break` and `Continue`, calls consume `Return`, and errors propagate all
/// the way to the driver.
#[derive(Debug)]
pub enum Interrupt {
    Break,
    Continue,
    Return(Value),
    Error(RuntimeError),
}

impl From<RuntimeError> for Interrupt {
    fn from(error: RuntimeError) -> Self {
        Interrupt::Error(error)
    }
}

/// Walks a parsed program. Program output is written to the injected sink so
/// callers can capture it.
pub struct Interpreter<W: Write> {
    env: Environment,
    out: W,
}

impl<W: Write> Interpreter<W> {
    /// Creates an interpreter whose global frame holds the native builtins.
    pub fn new(out: W) -> Self {
        let mut env = Environment::new();
        register_builtins(&mut env);
        Interpreter { env, out }
    }

    /// Runs a parsed program. The first runtime error aborts evaluation.
    pub fn interpret(&mut self, program: &[Stmt]) -> Result<(), RuntimeError> {
        for stmt in program {
            if let Err(interrupt) = self.eval_stmt(stmt) {
                return Err(Self::into_error(interrupt));
            }
        }
        Ok(())
    }

    fn into_error(interrupt: Interrupt) -> RuntimeError {
        match interrupt {
            Interrupt::Error(error) => error,
            // break/continue/return outside their constructs are parse errors
            Interrupt::Break | Interrupt::Continue | Interrupt::Return(_) => {
                unreachable!("loop or return control escaped to the top level")
            }
        }
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn eval_stmt(&mut self, stmt: &Stmt) -> Result<(), Interrupt> {
        match stmt {
            Stmt::Expression(expr) => {
                self.eval_expr(expr)?;
                Ok(())
            }
            Stmt::Print(expr) => {
                let value = self.eval_expr(expr)?;
                let _ = writeln!(self.out, "{value}");
                Ok(())
            }
            Stmt::Var { name, init, .. } => {
                let value = match init {
                    Some(init) => self.eval_expr(init)?,
                    None => Value::Nil,
                };
                self.env.define(name.clone(), value);
                Ok(())
            }
            Stmt::Fun(decl) => {
                self.env.define(
                    decl.name.clone(),
                    Value::Callable(Callable::Function(Rc::clone(decl))),
                );
                Ok(())
            }
            Stmt::Block(stmts) => self.eval_block(stmts),
            Stmt::If {
                cond,
                then_branch,
                else_branch,
            } => {
                if self.eval_expr(cond)?.is_truthy() {
                    self.eval_stmt(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.eval_stmt(else_branch)
                } else {
                    Ok(())
                }
            }
            Stmt::For {
                init,
                cond,
                incr,
                body,
            } => self.eval_for(init.as_deref(), cond.as_ref(), incr.as_ref(), body),
            Stmt::Break(_) => Err(Interrupt::Break),
            Stmt::Continue(_) => Err(Interrupt::Continue),
            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(value) => self.eval_expr(value)?,
                    None => Value::Nil,
                };
                Err(Interrupt::Return(value))
            }
        }
    }

    /// Evaluates statements inside a fresh frame, popping it on every exit
    /// path.
    fn eval_block(&mut self, stmts: &[Stmt]) -> Result<(), Interrupt> {
        self.env.push_frame();
        let result = stmts.iter().try_for_each(|stmt| self.eval_stmt(stmt));
        self.env.pop_frame();
        result
    }

    fn eval_for(
        &mut self,
        init: Option<&Stmt>,
        cond: Option<&Expr>,
        incr: Option<&Expr>,
        body: &Stmt,
    ) -> Result<(), Interrupt> {
        if let Some(init) = init {
            self.eval_stmt(init)?;
        }
        loop {
            let keep_going = match cond {
                Some(cond) => self.eval_expr(cond)?.is_truthy(),
                None => true,
            };
            if !keep_going {
                break;
            }
            match self.eval_stmt(body) {
                // the increment also runs when an iteration is cut short by continue
                Ok(()) | Err(Interrupt::Continue) => {}
                Err(Interrupt::Break) => break,
                Err(other) => return Err(other),
            }
            if let Some(incr) = incr {
                self.eval_expr(incr)?;
            }
        }
        Ok(())
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn eval_expr(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Literal(literal) => Ok(match literal {
                Literal::Number(n) => Value::Number(*n),
                Literal::Str(s) => Value::Str(s.clone()),
                Literal::Bool(b) => Value::Bool(*b),
                Literal::Nil => Value::Nil,
            }),
            Expr::Grouping(inner) => self.eval_expr(inner),
            Expr::Variable { name, token } => self
                .env
                .get(name)
                .cloned()
                .ok_or_else(|| RuntimeError::undefined_variable(name, *token)),
            Expr::Assign { name, token, value } => {
                // the right side only evaluates when the target is bound
                if !self.env.is_defined(name) {
                    return Err(RuntimeError::undefined_variable(name, *token));
                }
                let value = self.eval_expr(value)?;
                self.env.assign(name, value.clone());
                Ok(value)
            }
            Expr::Unary { op, token, right } => {
                let value = self.eval_expr(right)?;
                match op {
                    UnaryOp::Not => Ok(Value::Bool(!value.is_truthy())),
                    UnaryOp::Neg => match value {
                        Value::Number(n) => Ok(Value::Number(-n)),
                        other => Err(RuntimeError::unary_mismatch(
                            op.symbol(),
                            other.type_name(),
                            *token,
                        )),
                    },
                }
            }
            Expr::Binary {
                left,
                op,
                token,
                right,
            } => self.eval_binary(left, *op, *token, right),
            Expr::Or { left, right } => {
                if self.eval_expr(left)?.is_truthy() {
                    Ok(Value::Bool(true))
                } else {
                    Ok(Value::Bool(self.eval_expr(right)?.is_truthy()))
                }
            }
            Expr::And { left, right } => {
                if !self.eval_expr(left)?.is_truthy() {
                    Ok(Value::Bool(false))
                } else {
                    Ok(Value::Bool(self.eval_expr(right)?.is_truthy()))
                }
            }
            Expr::Call {
                callee,
                paren,
                args,
            } => self.eval_call(callee, *paren, args),
        }
    }

    fn eval_binary(
        &mut self,
        left: &Expr,
        op: BinaryOp,
        token: Token,
        right: &Expr,
    ) -> Result<Value, RuntimeError> {
        let lhs = self.eval_expr(left)?;
        let rhs = self.eval_expr(right)?;
        match op {
            BinaryOp::Add => match (lhs, rhs) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                (Value::Str(a), Value::Str(b)) => Ok(Value::Str(a + &b)),
                (Value::Number(_), other) => Err(RuntimeError::binary_mismatch(
                    "Right",
                    op.symbol(),
                    "number",
                    other.type_name(),
                    token,
                )),
                (Value::Str(_), other) => Err(RuntimeError::binary_mismatch(
                    "Right",
                    op.symbol(),
                    "string",
                    other.type_name(),
                    token,
                )),
                (other, _) => Err(RuntimeError::binary_mismatch(
                    "Left",
                    op.symbol(),
                    "number or a string",
                    other.type_name(),
                    token,
                )),
            },
            BinaryOp::Equal => Ok(Value::Bool(lhs == rhs)),
            BinaryOp::NotEqual => Ok(Value::Bool(lhs != rhs)),
            BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => {
                let (a, b) = numeric_operands(op, token, lhs, rhs)?;
                Ok(Value::Number(match op {
                    BinaryOp::Sub => a - b,
                    BinaryOp::Mul => a * b,
                    _ => a / b,
                }))
            }
            BinaryOp::Less | BinaryOp::LessEqual | BinaryOp::Greater | BinaryOp::GreaterEqual => {
                let (a, b) = numeric_operands(op, token, lhs, rhs)?;
                Ok(Value::Bool(match op {
                    BinaryOp::Less => a < b,
                    BinaryOp::LessEqual => a <= b,
                    BinaryOp::Greater => a > b,
                    _ => a >= b,
                }))
            }
        }
    }

    fn eval_call(
        &mut self,
        callee: &Expr,
        paren: Token,
        args: &[Expr],
    ) -> Result<Value, RuntimeError> {
        match self.eval_expr(callee)? {
            Value::Callable(Callable::Function(decl)) => self.call_function(&decl, args, paren),
            Value::Callable(Callable::Native(native)) => {
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.eval_expr(arg)?);
                }
                // TODO: enforce arity for native functions
                (native.func)(&values).map_err(|kind| RuntimeError::new(kind, paren))
            }
            other => Err(RuntimeError::not_callable(other.type_name(), paren)),
        }
    }

    /// Calls a user function: one fresh frame on top of the caller's stack,
    /// popped on every exit path. Function values do not capture their
    /// defining environment, so recursion resolves through the frame that
    /// holds the function's name.
    fn call_function(
        &mut self,
        decl: &Rc<FunDecl>,
        args: &[Expr],
        paren: Token,
    ) -> Result<Value, RuntimeError> {
        if args.len() != decl.params.len() {
            return Err(RuntimeError::arity(
                &decl.name,
                decl.params.len(),
                args.len(),
                paren,
            ));
        }
        self.env.push_frame();
        let outcome = self.bind_and_run(decl, args);
        self.env.pop_frame();
        match outcome {
            // falling off the end of a function returns nil
            Ok(()) => Ok(Value::Nil),
            Err(Interrupt::Return(value)) => Ok(value),
            Err(Interrupt::Error(error)) => Err(error),
            Err(Interrupt::Break) | Err(Interrupt::Continue) => {
                unreachable!("loop control cannot escape a function body")
            }
        }
    }

    fn bind_and_run(&mut self, decl: &FunDecl, args: &[Expr]) -> Result<(), Interrupt> {
        // arguments evaluate left to right, each binding its parameter before
        // the next argument evaluates
        for (param, arg) in decl.params.iter().zip(args) {
            let value = self.eval_expr(arg)?;
            self.env.define(param.name.clone(), value);
        }
        decl.body.iter().try_for_each(|stmt| self.eval_stmt(stmt))
    }
}

fn numeric_operands(
    op: BinaryOp,
    token: Token,
    lhs: Value,
    rhs: Value,
) -> Result<(f64, f64), RuntimeError> {
    match (lhs, rhs) {
        (Value::Number(a), Value::Number(b)) => Ok((a, b)),
        (Value::Number(_), other) => Err(RuntimeError::binary_mismatch(
            "Right",
            op.symbol(),
            "number",
            other.type_name(),
            token,
        )),
        (other, _) => Err(RuntimeError::binary_mismatch(
            "Left",
            op.symbol(),
            "number",
            other.type_name(),
            token,
        )),
    }
}

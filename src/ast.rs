// ABOUTME: Typed AST produced by the parser, plus a canonical source printer

use crate::scanner::Token;
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::Less => "<",
            BinaryOp::LessEqual => "<=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterEqual => ">=",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Number(f64),
    /// String contents without the surrounding quotes.
    Str(String),
    Bool(bool),
    Nil,
}

/// Identifier names are resolved to strings at parse time; tokens are kept
/// for error locations only.
#[derive(Debug, Clone)]
pub enum Expr {
    Literal(Literal),
    Grouping(Box<Expr>),
    Unary {
        op: UnaryOp,
        token: Token,
        right: Box<Expr>,
    },
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        token: Token,
        right: Box<Expr>,
    },
    Variable {
        name: String,
        token: Token,
    },
    /// The left side is always a variable; the parser rejects anything else.
    Assign {
        name: String,
        token: Token,
        value: Box<Expr>,
    },
    Or {
        left: Box<Expr>,
        right: Box<Expr>,
    },
    And {
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        paren: Token,
        args: Vec<Expr>,
    },
}

#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub token: Token,
}

/// A function declaration. Shared behind `Rc` so callable values can point
/// at their declaration for as long as they live.
#[derive(Debug)]
pub struct FunDecl {
    pub name: String,
    pub token: Token,
    pub params: Vec<Param>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone)]
pub enum Stmt {
    Expression(Expr),
    Print(Expr),
    Block(Vec<Stmt>),
    If {
        cond: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    /// The single loop form. `while` parses to this with no init and no
    /// increment; `for` parses to a block wrapping this node.
    For {
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        incr: Option<Expr>,
        body: Box<Stmt>,
    },
    Break(Token),
    Continue(Token),
    Return {
        token: Token,
        value: Option<Expr>,
    },
    Var {
        name: String,
        token: Token,
        init: Option<Expr>,
    },
    Fun(Rc<FunDecl>),
}

// ============================================================================
// Canonical printing
// ============================================================================
//
// The printed form is valid source: compound expressions are fully
// parenthesized, groupings are transparent, and desugared loops print back
// in their surface form. Re-parsing the printed form yields a structurally
// equivalent AST (see structurally_eq below), which the parser tests assert.
// A block-wrapped loop node must therefore print as a for statement, never
// as while: only for statements parse back into a block-wrapped loop.

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Number(n) => write!(f, "{n}"),
            Literal::Str(s) => write!(f, "\"{s}\""),
            Literal::Bool(b) => write!(f, "{b}"),
            Literal::Nil => write!(f, "nil"),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(literal) => write!(f, "{literal}"),
            Expr::Grouping(inner) => write!(f, "{inner}"),
            Expr::Unary { op, right, .. } => write!(f, "({}{right})", op.symbol()),
            Expr::Binary {
                left, op, right, ..
            } => write!(f, "({left} {} {right})", op.symbol()),
            Expr::Variable { name, .. } => write!(f, "{name}"),
            Expr::Assign { name, value, .. } => write!(f, "({name} = {value})"),
            Expr::Or { left, right } => write!(f, "({left} or {right})"),
            Expr::And { left, right } => write!(f, "({left} and {right})"),
            Expr::Call { callee, args, .. } => {
                write!(f, "{callee}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
        }
    }
}

fn write_block(f: &mut fmt::Formatter<'_>, stmts: &[Stmt]) -> fmt::Result {
    write!(f, "{{")?;
    for stmt in stmts {
        write!(f, " {stmt}")?;
    }
    write!(f, " }}")
}

fn write_for(
    f: &mut fmt::Formatter<'_>,
    init: Option<&Stmt>,
    cond: Option<&Expr>,
    incr: Option<&Expr>,
    body: &Stmt,
) -> fmt::Result {
    match init {
        // the initializer carries its own semicolon
        Some(init) => write!(f, "for ({init} ")?,
        None => write!(f, "for (; ")?,
    }
    if let Some(cond) = cond {
        write!(f, "{cond}")?;
    }
    write!(f, "; ")?;
    if let Some(incr) = incr {
        write!(f, "{incr}")?;
    }
    write!(f, ") {body}")
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::Expression(expr) => write!(f, "{expr};"),
            Stmt::Print(expr) => write!(f, "print {expr};"),
            Stmt::Var { name, init, .. } => match init {
                Some(init) => write!(f, "var {name} = {init};"),
                None => write!(f, "var {name};"),
            },
            // A desugared for loop prints back in its surface form; the for
            // spelling is forced so the block wrapper survives a re-parse
            Stmt::Block(stmts) => match stmts.as_slice() {
                [Stmt::For {
                    init,
                    cond,
                    incr,
                    body,
                }] => write_for(f, init.as_deref(), cond.as_ref(), incr.as_ref(), body),
                _ => write_block(f, stmts),
            },
            Stmt::If {
                cond,
                then_branch,
                else_branch,
            } => {
                write!(f, "if ({cond}) {then_branch}")?;
                if let Some(else_branch) = else_branch {
                    write!(f, " else {else_branch}")?;
                }
                Ok(())
            }
            Stmt::For {
                init,
                cond,
                incr,
                body,
            } => {
                if init.is_none() && incr.is_none() {
                    if let Some(cond) = cond {
                        return write!(f, "while ({cond}) {body}");
                    }
                }
                write_for(f, init.as_deref(), cond.as_ref(), incr.as_ref(), body)
            }
            Stmt::Break(_) => write!(f, "break;"),
            Stmt::Continue(_) => write!(f, "continue;"),
            Stmt::Return { value, .. } => match value {
                Some(value) => write!(f, "return {value};"),
                None => write!(f, "return;"),
            },
            Stmt::Fun(decl) => {
                write!(f, "fun {}(", decl.name)?;
                for (i, param) in decl.params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", param.name)?;
                }
                write!(f, ") ")?;
                write_block(f, &decl.body)
            }
        }
    }
}

// ============================================================================
// Structural equivalence
// ============================================================================
//
// Two trees are equivalent when they differ only in source locations and
// grouping nodes. Separate parses of the same text never share token
// offsets, so derived equality would be useless here.

impl Expr {
    /// Structural equivalence: groupings are transparent and source
    /// locations are ignored.
    pub fn structurally_eq(&self, other: &Expr) -> bool {
        match (self, other) {
            (Expr::Grouping(inner), other) => inner.structurally_eq(other),
            (this, Expr::Grouping(inner)) => this.structurally_eq(inner),
            (Expr::Literal(a), Expr::Literal(b)) => a == b,
            (
                Expr::Unary {
                    op: a, right: ra, ..
                },
                Expr::Unary {
                    op: b, right: rb, ..
                },
            ) => a == b && ra.structurally_eq(rb),
            (
                Expr::Binary {
                    left: la,
                    op: a,
                    right: ra,
                    ..
                },
                Expr::Binary {
                    left: lb,
                    op: b,
                    right: rb,
                    ..
                },
            ) => a == b && la.structurally_eq(lb) && ra.structurally_eq(rb),
            (Expr::Variable { name: a, .. }, Expr::Variable { name: b, .. }) => a == b,
            (
                Expr::Assign {
                    name: a, value: va, ..
                },
                Expr::Assign {
                    name: b, value: vb, ..
                },
            ) => a == b && va.structurally_eq(vb),
            (
                Expr::Or {
                    left: la,
                    right: ra,
                },
                Expr::Or {
                    left: lb,
                    right: rb,
                },
            )
            | (
                Expr::And {
                    left: la,
                    right: ra,
                },
                Expr::And {
                    left: lb,
                    right: rb,
                },
            ) => la.structurally_eq(lb) && ra.structurally_eq(rb),
            (
                Expr::Call {
                    callee: ca,
                    args: aa,
                    ..
                },
                Expr::Call {
                    callee: cb,
                    args: ab,
                    ..
                },
            ) => {
                ca.structurally_eq(cb)
                    && aa.len() == ab.len()
                    && aa.iter().zip(ab).all(|(a, b)| a.structurally_eq(b))
            }
            _ => false,
        }
    }
}

fn option_expr_eq(a: Option<&Expr>, b: Option<&Expr>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a.structurally_eq(b),
        _ => false,
    }
}

/// Structural equivalence over whole programs.
pub fn stmts_structurally_eq(a: &[Stmt], b: &[Stmt]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(a, b)| a.structurally_eq(b))
}

impl Stmt {
    /// Structural equivalence: source locations are ignored and grouping
    /// nodes inside expressions are transparent.
    pub fn structurally_eq(&self, other: &Stmt) -> bool {
        match (self, other) {
            (Stmt::Expression(a), Stmt::Expression(b)) => a.structurally_eq(b),
            (Stmt::Print(a), Stmt::Print(b)) => a.structurally_eq(b),
            (Stmt::Block(a), Stmt::Block(b)) => stmts_structurally_eq(a, b),
            (
                Stmt::If {
                    cond: ca,
                    then_branch: ta,
                    else_branch: ea,
                },
                Stmt::If {
                    cond: cb,
                    then_branch: tb,
                    else_branch: eb,
                },
            ) => {
                ca.structurally_eq(cb)
                    && ta.structurally_eq(tb)
                    && match (ea, eb) {
                        (None, None) => true,
                        (Some(a), Some(b)) => a.structurally_eq(b),
                        _ => false,
                    }
            }
            (
                Stmt::For {
                    init: ia,
                    cond: ca,
                    incr: na,
                    body: ba,
                },
                Stmt::For {
                    init: ib,
                    cond: cb,
                    incr: nb,
                    body: bb,
                },
            ) => {
                let init_eq = match (ia, ib) {
                    (None, None) => true,
                    (Some(a), Some(b)) => a.structurally_eq(b),
                    _ => false,
                };
                init_eq
                    && option_expr_eq(ca.as_ref(), cb.as_ref())
                    && option_expr_eq(na.as_ref(), nb.as_ref())
                    && ba.structurally_eq(bb)
            }
            (Stmt::Break(_), Stmt::Break(_)) => true,
            (Stmt::Continue(_), Stmt::Continue(_)) => true,
            (Stmt::Return { value: a, .. }, Stmt::Return { value: b, .. }) => {
                option_expr_eq(a.as_ref(), b.as_ref())
            }
            (
                Stmt::Var {
                    name: a, init: ia, ..
                },
                Stmt::Var {
                    name: b, init: ib, ..
                },
            ) => a == b && option_expr_eq(ia.as_ref(), ib.as_ref()),
            (Stmt::Fun(a), Stmt::Fun(b)) => {
                a.name == b.name
                    && a.params.len() == b.params.len()
                    && a.params
                        .iter()
                        .zip(&b.params)
                        .all(|(a, b)| a.name == b.name)
                    && stmts_structurally_eq(&a.body, &b.body)
            }
            _ => false,
        }
    }
}

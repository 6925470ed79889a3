// ABOUTME: Recursive-descent parser producing the AST and parse diagnostics

use crate::ast::{BinaryOp, Expr, FunDecl, Literal, Param, Stmt, UnaryOp};
use crate::config::MAX_CALL_ARGS;
use crate::scanner::{Scanner, Token, TokenErrorKind, TokenKind};
use std::rc::Rc;

/// A parse-time diagnostic pointing at the offending token. The file name is
/// only known to the driver, which adds it when rendering.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub token: Token,
    pub message: String,
}

type PResult<T> = Result<T, Diagnostic>;

/// Statement-nesting context threaded through statement parsing. Function
/// bodies reset the loop flag, so loop control cannot escape a function.
#[derive(Debug, Clone, Copy, Default)]
struct Context {
    in_loop: bool,
    in_function: bool,
}

pub struct Parser<'a> {
    scanner: Scanner<'a>,
    source: &'a [u8],
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a [u8]) -> Self {
        Parser {
            scanner: Scanner::new(source),
            source,
            diagnostics: Vec::new(),
        }
    }

    /// Parses the whole program. Parsing stops at the first declaration that
    /// fails; a non-empty diagnostic list means the program must not run.
    pub fn parse(mut self) -> (Vec<Stmt>, Vec<Diagnostic>) {
        let mut program = Vec::new();
        loop {
            match self.peek() {
                Ok(token) if token.kind == TokenKind::Eof => break,
                Ok(_) => match self.declaration(Context::default()) {
                    Ok(stmt) => program.push(stmt),
                    Err(diagnostic) => {
                        self.diagnostics.push(diagnostic);
                        break;
                    }
                },
                Err(diagnostic) => {
                    self.diagnostics.push(diagnostic);
                    break;
                }
            }
        }
        (program, self.diagnostics)
    }

    // ========================================================================
    // Token plumbing
    // ========================================================================

    /// Error tokens from the scanner surface as diagnostics the moment the
    /// parser pulls them.
    fn check_lexical(&self, token: Token) -> PResult<Token> {
        match token.kind {
            TokenKind::Error(kind) => Err(Diagnostic {
                token,
                message: lexical_message(kind).to_string(),
            }),
            _ => Ok(token),
        }
    }

    fn peek(&mut self) -> PResult<Token> {
        let token = self.scanner.peek();
        self.check_lexical(token)
    }

    fn advance(&mut self) -> PResult<Token> {
        let token = self.scanner.advance();
        self.check_lexical(token)
    }

    /// Consumes the next token iff it has the wanted kind.
    fn take(&mut self, kind: TokenKind) -> PResult<Option<Token>> {
        if self.peek()?.kind == kind {
            Ok(Some(self.advance()?))
        } else {
            Ok(None)
        }
    }

    fn consume(&mut self, kind: TokenKind, message: &str) -> PResult<Token> {
        let token = self.peek()?;
        if token.kind == kind {
            self.advance()
        } else {
            Err(self.error(token, message))
        }
    }

    fn error(&self, token: Token, message: impl Into<String>) -> Diagnostic {
        Diagnostic {
            token,
            message: message.into(),
        }
    }

    fn lexeme(&self, token: &Token) -> String {
        token.lexeme(self.source).into_owned()
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    fn declaration(&mut self, ctx: Context) -> PResult<Stmt> {
        match self.peek()?.kind {
            TokenKind::Var => self.var_declaration(),
            TokenKind::Fun => self.fun_declaration(),
            _ => self.statement(ctx),
        }
    }

    fn var_declaration(&mut self) -> PResult<Stmt> {
        self.advance()?;
        let token = self.consume(TokenKind::Identifier, "Expected variable name")?;
        let init = match self.take(TokenKind::Equal)? {
            Some(_) => Some(self.expression()?),
            None => None,
        };
        self.consume(
            TokenKind::Semicolon,
            "Expected ';' after variable declaration",
        )?;
        Ok(Stmt::Var {
            name: self.lexeme(&token),
            token,
            init,
        })
    }

    fn fun_declaration(&mut self) -> PResult<Stmt> {
        self.advance()?;
        let token = self.consume(TokenKind::Identifier, "Expected function name")?;
        self.consume(TokenKind::LeftParen, "Expected '(' after function name")?;

        let mut params: Vec<Param> = Vec::new();
        if self.peek()?.kind != TokenKind::RightParen {
            loop {
                if params.len() >= MAX_CALL_ARGS {
                    let at = self.peek()?;
                    return Err(self.error(
                        at,
                        format!("Cannot declare more than {MAX_CALL_ARGS} parameters"),
                    ));
                }
                let param = self.consume(TokenKind::Identifier, "Expected parameter name")?;
                let name = self.lexeme(&param);
                if params.iter().any(|p| p.name == name) {
                    return Err(
                        self.error(param, format!("Duplicated parameter name \"{name}\""))
                    );
                }
                params.push(Param { name, token: param });
                if self.take(TokenKind::Comma)?.is_none() {
                    break;
                }
            }
        }
        self.consume(TokenKind::RightParen, "Expected ')' after parameters")?;

        self.consume(TokenKind::LeftBrace, "Expected '{' before function body")?;
        let body = self.block_body(Context {
            in_loop: false,
            in_function: true,
        })?;

        Ok(Stmt::Fun(Rc::new(FunDecl {
            name: self.lexeme(&token),
            token,
            params,
            body,
        })))
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn statement(&mut self, ctx: Context) -> PResult<Stmt> {
        let token = self.peek()?;
        match token.kind {
            TokenKind::Print => {
                self.advance()?;
                let expr = self.expression()?;
                self.consume(TokenKind::Semicolon, "Expected ';' after value")?;
                Ok(Stmt::Print(expr))
            }
            TokenKind::LeftBrace => {
                self.advance()?;
                Ok(Stmt::Block(self.block_body(ctx)?))
            }
            TokenKind::If => self.if_statement(ctx),
            TokenKind::While => self.while_statement(ctx),
            TokenKind::For => self.for_statement(ctx),
            TokenKind::Break => {
                self.advance()?;
                if !ctx.in_loop {
                    return Err(self.error(token, "break must be inside a loop"));
                }
                self.consume(TokenKind::Semicolon, "Expected ';' after 'break'")?;
                Ok(Stmt::Break(token))
            }
            TokenKind::Continue => {
                self.advance()?;
                if !ctx.in_loop {
                    return Err(self.error(token, "continue must be inside a loop"));
                }
                self.consume(TokenKind::Semicolon, "Expected ';' after 'continue'")?;
                Ok(Stmt::Continue(token))
            }
            TokenKind::Return => {
                self.advance()?;
                if !ctx.in_function {
                    return Err(self.error(token, "return must be inside a function"));
                }
                let value = if self.peek()?.kind != TokenKind::Semicolon {
                    Some(self.expression()?)
                } else {
                    None
                };
                self.consume(TokenKind::Semicolon, "Expected ';' after return value")?;
                Ok(Stmt::Return { token, value })
            }
            _ => {
                let expr = self.expression()?;
                self.consume(TokenKind::Semicolon, "Expected ';' after expression")?;
                Ok(Stmt::Expression(expr))
            }
        }
    }

    /// Parses declarations up to the closing brace. The opening brace has
    /// already been consumed.
    fn block_body(&mut self, ctx: Context) -> PResult<Vec<Stmt>> {
        let mut stmts = Vec::new();
        while !matches!(self.peek()?.kind, TokenKind::RightBrace | TokenKind::Eof) {
            stmts.push(self.declaration(ctx)?);
        }
        self.consume(TokenKind::RightBrace, "Expected '}' after block")?;
        Ok(stmts)
    }

    /// else binds to the nearest unmatched if.
    fn if_statement(&mut self, ctx: Context) -> PResult<Stmt> {
        self.advance()?;
        self.consume(TokenKind::LeftParen, "Expected '(' after 'if'")?;
        let cond = self.expression()?;
        self.consume(TokenKind::RightParen, "Expected ')' after condition")?;
        let then_branch = Box::new(self.statement(ctx)?);
        let else_branch = match self.take(TokenKind::Else)? {
            Some(_) => Some(Box::new(self.statement(ctx)?)),
            None => None,
        };
        Ok(Stmt::If {
            cond,
            then_branch,
            else_branch,
        })
    }

    /// while is the loop node with no init and no increment.
    fn while_statement(&mut self, ctx: Context) -> PResult<Stmt> {
        self.advance()?;
        self.consume(TokenKind::LeftParen, "Expected '(' after 'while'")?;
        let cond = self.expression()?;
        self.consume(TokenKind::RightParen, "Expected ')' after condition")?;
        let body = Box::new(self.statement(Context {
            in_loop: true,
            ..ctx
        })?);
        Ok(Stmt::For {
            init: None,
            cond: Some(cond),
            incr: None,
            body,
        })
    }

    /// for wraps the loop node in a block so the iteration variable scopes to
    /// the loop. A missing condition means "always true".
    fn for_statement(&mut self, ctx: Context) -> PResult<Stmt> {
        self.advance()?;
        self.consume(TokenKind::LeftParen, "Expected '(' after 'for'")?;

        let init = if self.take(TokenKind::Semicolon)?.is_some() {
            None
        } else if self.peek()?.kind == TokenKind::Var {
            Some(Box::new(self.var_declaration()?))
        } else {
            let expr = self.expression()?;
            self.consume(TokenKind::Semicolon, "Expected ';' after loop initializer")?;
            Some(Box::new(Stmt::Expression(expr)))
        };

        let cond = if self.peek()?.kind != TokenKind::Semicolon {
            Some(self.expression()?)
        } else {
            None
        };
        self.consume(TokenKind::Semicolon, "Expected ';' after loop condition")?;

        let incr = if self.peek()?.kind != TokenKind::RightParen {
            Some(self.expression()?)
        } else {
            None
        };
        self.consume(TokenKind::RightParen, "Expected ')' after for clauses")?;

        let body = Box::new(self.statement(Context {
            in_loop: true,
            ..ctx
        })?);

        Ok(Stmt::Block(vec![Stmt::For {
            init,
            cond,
            incr,
            body,
        }]))
    }

    // ========================================================================
    // Expressions, by ascending precedence
    // ========================================================================

    fn expression(&mut self) -> PResult<Expr> {
        self.assignment()
    }

    fn assignment(&mut self) -> PResult<Expr> {
        let expr = self.or_expr()?;
        if let Some(equals) = self.take(TokenKind::Equal)? {
            let value = Box::new(self.assignment()?);
            return match expr {
                Expr::Variable { name, token } => Ok(Expr::Assign { name, token, value }),
                _ => Err(self.error(
                    equals,
                    "Cannot assign value. Left side must be a variable",
                )),
            };
        }
        Ok(expr)
    }

    fn or_expr(&mut self) -> PResult<Expr> {
        let left = self.and_expr()?;
        if self.take(TokenKind::Or)?.is_some() {
            let right = self.or_expr()?;
            return Ok(Expr::Or {
                left: Box::new(left),
                right: Box::new(right),
            });
        }
        Ok(left)
    }

    fn and_expr(&mut self) -> PResult<Expr> {
        let left = self.equality()?;
        if self.take(TokenKind::And)?.is_some() {
            let right = self.and_expr()?;
            return Ok(Expr::And {
                left: Box::new(left),
                right: Box::new(right),
            });
        }
        Ok(left)
    }

    fn equality(&mut self) -> PResult<Expr> {
        let mut expr = self.comparison()?;
        loop {
            let token = self.peek()?;
            let op = match token.kind {
                TokenKind::BangEqual => BinaryOp::NotEqual,
                TokenKind::EqualEqual => BinaryOp::Equal,
                _ => break,
            };
            self.advance()?;
            let right = self.comparison()?;
            expr = Expr::Binary {
                left: Box::new(expr),
                op,
                token,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn comparison(&mut self) -> PResult<Expr> {
        let mut expr = self.term()?;
        loop {
            let token = self.peek()?;
            let op = match token.kind {
                TokenKind::Greater => BinaryOp::Greater,
                TokenKind::GreaterEqual => BinaryOp::GreaterEqual,
                TokenKind::Less => BinaryOp::Less,
                TokenKind::LessEqual => BinaryOp::LessEqual,
                _ => break,
            };
            self.advance()?;
            let right = self.term()?;
            expr = Expr::Binary {
                left: Box::new(expr),
                op,
                token,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn term(&mut self) -> PResult<Expr> {
        let mut expr = self.factor()?;
        loop {
            let token = self.peek()?;
            let op = match token.kind {
                TokenKind::Minus => BinaryOp::Sub,
                TokenKind::Plus => BinaryOp::Add,
                _ => break,
            };
            self.advance()?;
            let right = self.factor()?;
            expr = Expr::Binary {
                left: Box::new(expr),
                op,
                token,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn factor(&mut self) -> PResult<Expr> {
        let mut expr = self.unary()?;
        loop {
            let token = self.peek()?;
            let op = match token.kind {
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Star => BinaryOp::Mul,
                _ => break,
            };
            self.advance()?;
            let right = self.unary()?;
            expr = Expr::Binary {
                left: Box::new(expr),
                op,
                token,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn unary(&mut self) -> PResult<Expr> {
        let token = self.peek()?;
        let op = match token.kind {
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Minus => Some(UnaryOp::Neg),
            _ => None,
        };
        if let Some(op) = op {
            self.advance()?;
            let right = Box::new(self.unary()?);
            return Ok(Expr::Unary { op, token, right });
        }
        self.call()
    }

    fn call(&mut self) -> PResult<Expr> {
        let expr = self.primary()?;
        if let Some(paren) = self.take(TokenKind::LeftParen)? {
            let mut args = Vec::new();
            if self.peek()?.kind != TokenKind::RightParen {
                loop {
                    if args.len() >= MAX_CALL_ARGS {
                        let at = self.peek()?;
                        return Err(self.error(
                            at,
                            format!("Cannot pass more than {MAX_CALL_ARGS} arguments"),
                        ));
                    }
                    args.push(self.expression()?);
                    if self.take(TokenKind::Comma)?.is_none() {
                        break;
                    }
                }
            }
            self.consume(TokenKind::RightParen, "Expected ')' after arguments")?;
            return Ok(Expr::Call {
                callee: Box::new(expr),
                paren,
                args,
            });
        }
        Ok(expr)
    }

    fn primary(&mut self) -> PResult<Expr> {
        let token = self.advance()?;
        match token.kind {
            TokenKind::Number => {
                let number = self
                    .lexeme(&token)
                    .parse()
                    .expect("scanner only accepts well-formed numbers");
                Ok(Expr::Literal(Literal::Number(number)))
            }
            TokenKind::Str => {
                let quoted = self.lexeme(&token);
                let inner = quoted[1..quoted.len() - 1].to_string();
                Ok(Expr::Literal(Literal::Str(inner)))
            }
            TokenKind::True => Ok(Expr::Literal(Literal::Bool(true))),
            TokenKind::False => Ok(Expr::Literal(Literal::Bool(false))),
            TokenKind::Nil => Ok(Expr::Literal(Literal::Nil)),
            TokenKind::Identifier => Ok(Expr::Variable {
                name: self.lexeme(&token),
                token,
            }),
            TokenKind::LeftParen => {
                let inner = self.expression()?;
                self.consume(TokenKind::RightParen, "Expected ')' after expression")?;
                Ok(Expr::Grouping(Box::new(inner)))
            }
            _ => Err(self.error(token, "Expected expression")),
        }
    }
}

fn lexical_message(kind: TokenErrorKind) -> &'static str {
    match kind {
        TokenErrorKind::InvalidToken => "Invalid token",
        TokenErrorKind::InvalidSingleLineString => {
            "String literal must be terminated on the same line"
        }
        TokenErrorKind::NumberMissingDecimal => "Expected digits after the decimal point",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(source: &str) -> Vec<Stmt> {
        let (program, diagnostics) = Parser::new(source.as_bytes()).parse();
        assert!(
            diagnostics.is_empty(),
            "unexpected diagnostics for {source:?}: {diagnostics:?}"
        );
        program
    }

    fn parse_err(source: &str) -> Diagnostic {
        let (_, mut diagnostics) = Parser::new(source.as_bytes()).parse();
        assert_eq!(diagnostics.len(), 1, "expected one diagnostic for {source:?}");
        diagnostics.remove(0)
    }

    /// Canonical print of the first statement.
    fn canon(source: &str) -> String {
        let program = parse_ok(source);
        assert_eq!(program.len(), 1);
        program[0].to_string()
    }

    #[test]
    fn test_term_operators_are_left_associative() {
        assert_eq!(canon("a - b - c;"), "((a - b) - c);");
        assert_eq!(canon("a / b * c;"), "((a / b) * c);");
    }

    #[test]
    fn test_assignment_is_right_associative() {
        assert_eq!(canon("a = b = c;"), "(a = (b = c));");
    }

    #[test]
    fn test_logical_operators_are_right_associative() {
        assert_eq!(canon("a or b or c;"), "(a or (b or c));");
        assert_eq!(canon("a and b and c;"), "(a and (b and c));");
    }

    #[test]
    fn test_precedence_climbs_from_or_to_unary() {
        assert_eq!(canon("a or b and c;"), "(a or (b and c));");
        assert_eq!(canon("a == b > c + d * !e;"), "(a == (b > (c + (d * (!e)))));");
        assert_eq!(canon("-a * b;"), "((-a) * b);");
        assert_eq!(canon("2 + 3 * 10;"), "(2 + (3 * 10));");
    }

    #[test]
    fn test_call_binds_tighter_than_unary() {
        assert_eq!(canon("-f(x);"), "(-f(x));");
        assert_eq!(canon("f(a, b + c);"), "f(a, (b + c));");
    }

    #[test]
    fn test_else_binds_to_nearest_if() {
        let program = parse_ok("if (a) if (b) c; else d;");
        match &program[0] {
            Stmt::If { else_branch, then_branch, .. } => {
                assert!(else_branch.is_none(), "else must bind to the inner if");
                assert!(matches!(
                    then_branch.as_ref(),
                    Stmt::If {
                        else_branch: Some(_),
                        ..
                    }
                ));
            }
            other => panic!("expected if statement, got {other}"),
        }
    }

    #[test]
    fn test_while_parses_to_the_loop_node() {
        let program = parse_ok("while (x) y;");
        assert!(matches!(
            &program[0],
            Stmt::For {
                init: None,
                cond: Some(_),
                incr: None,
                ..
            }
        ));
    }

    #[test]
    fn test_for_parses_to_a_block_wrapping_the_loop_node() {
        let program = parse_ok("for (var i = 0; i < 3; i = i + 1) print i;");
        match &program[0] {
            Stmt::Block(stmts) => {
                assert_eq!(stmts.len(), 1);
                assert!(matches!(
                    &stmts[0],
                    Stmt::For {
                        init: Some(_),
                        cond: Some(_),
                        incr: Some(_),
                        ..
                    }
                ));
            }
            other => panic!("expected block, got {other}"),
        }
    }

    #[test]
    fn test_for_clauses_may_all_be_absent() {
        let program = parse_ok("for (;;) break;");
        match &program[0] {
            Stmt::Block(stmts) => assert!(matches!(
                &stmts[0],
                Stmt::For {
                    init: None,
                    cond: None,
                    incr: None,
                    ..
                }
            )),
            other => panic!("expected block, got {other}"),
        }
    }

    #[test]
    fn test_break_outside_a_loop_is_rejected() {
        assert_eq!(parse_err("break;").message, "break must be inside a loop");
        assert_eq!(
            parse_err("if (x) break;").message,
            "break must be inside a loop"
        );
    }

    #[test]
    fn test_continue_outside_a_loop_is_rejected() {
        assert_eq!(
            parse_err("continue;").message,
            "continue must be inside a loop"
        );
    }

    #[test]
    fn test_return_outside_a_function_is_rejected() {
        assert_eq!(
            parse_err("return 1;").message,
            "return must be inside a function"
        );
        // A loop body does not re-enable return
        assert_eq!(
            parse_err("while (x) return;").message,
            "return must be inside a function"
        );
    }

    #[test]
    fn test_function_bodies_reset_the_loop_context() {
        let diagnostic = parse_err("for (;;) { fun f() { break; } }");
        assert_eq!(diagnostic.message, "break must be inside a loop");
    }

    #[test]
    fn test_loop_control_and_return_nest_correctly() {
        parse_ok("fun f() { for (;;) { if (x) break; else continue; } return 1; }");
        parse_ok("while (x) { while (y) break; }");
    }

    #[test]
    fn test_duplicate_parameters_are_rejected() {
        let diagnostic = parse_err("fun f(a, a) {}");
        assert_eq!(diagnostic.message, "Duplicated parameter name \"a\"");
    }

    #[test]
    fn test_assignment_target_must_be_a_variable() {
        let diagnostic = parse_err("a + b = c;");
        assert_eq!(
            diagnostic.message,
            "Cannot assign value. Left side must be a variable"
        );
        assert_eq!(
            parse_err("1 = 2;").message,
            "Cannot assign value. Left side must be a variable"
        );
    }

    #[test]
    fn test_too_many_arguments_is_rejected() {
        let args: Vec<String> = (0..256).map(|i| i.to_string()).collect();
        let source = format!("f({});", args.join(", "));
        let diagnostic = parse_err(&source);
        assert_eq!(diagnostic.message, "Cannot pass more than 255 arguments");
    }

    #[test]
    fn test_too_many_parameters_is_rejected() {
        let params: Vec<String> = (0..256).map(|i| format!("p{i}")).collect();
        let source = format!("fun f({}) {{}}", params.join(", "));
        let diagnostic = parse_err(&source);
        assert_eq!(
            diagnostic.message,
            "Cannot declare more than 255 parameters"
        );
    }

    #[test]
    fn test_lexical_errors_surface_as_diagnostics() {
        assert_eq!(
            parse_err("var s = \"abc\n\";").message,
            "String literal must be terminated on the same line"
        );
        assert_eq!(
            parse_err("print 12.;").message,
            "Expected digits after the decimal point"
        );
        assert_eq!(parse_err("print @;").message, "Invalid token");
    }

    #[test]
    fn test_missing_semicolon_is_reported() {
        assert_eq!(
            parse_err("print 1").message,
            "Expected ';' after value"
        );
        assert_eq!(
            parse_err("x").message,
            "Expected ';' after expression"
        );
    }

    #[test]
    fn test_parsing_stops_at_the_first_failure() {
        // Both statements are bad; only the first is reported
        let (_, diagnostics) = Parser::new(b"break; continue;").parse();
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_number_literals_round_trip_through_their_printed_form() {
        for source in ["0;", "42;", "2.5;", "0.125;", "123.456;", "1000000;"] {
            let first = canon(source);
            let second = canon(&first);
            assert_eq!(first, second);
        }
        // The value itself survives format-then-parse
        let program = parse_ok("print 123.456;");
        match &program[0] {
            Stmt::Print(Expr::Literal(Literal::Number(n))) => {
                let reparsed = parse_ok(&format!("print {n};"));
                match &reparsed[0] {
                    Stmt::Print(Expr::Literal(Literal::Number(m))) => assert_eq!(n, m),
                    other => panic!("expected number literal, got {other}"),
                }
            }
            other => panic!("expected number literal, got {other}"),
        }
    }

    #[test]
    fn test_reparsing_the_canonical_print_yields_an_equivalent_ast() {
        use crate::ast::stmts_structurally_eq;

        let sources = [
            "print \"Hello, world!\";",
            "var x = 1; { var x = 2; print x; } print x;",
            "fun f(n) { if (n < 2) return n; return f(n - 1) + f(n - 2); } print f(10);",
            "for (var i = 0; i < 3; i = i + 1) { if (i == 1) continue; print i; }",
            "while (a or b) { x = x + 1; }",
            "for (;;) { break; }",
            "for (; c;) x;",
            "for (var i = 0; ; i = i + 1) { if (i > 2) break; }",
            "{ while (a) x; }",
            "(x);",
            "fun g() { return; } g();",
            "if (a) print 1; else { print 2; }",
            "var s = \"a\"; s = s + \"b\"; print s;",
            "print !(a == nil) and -b < 3;",
        ];
        for source in sources {
            let (program, diagnostics) = Parser::new(source.as_bytes()).parse();
            assert!(diagnostics.is_empty(), "diagnostics for {source:?}");
            let printed: Vec<String> = program.iter().map(|s| s.to_string()).collect();
            let printed = printed.join(" ");

            let (reparsed, diagnostics) = Parser::new(printed.as_bytes()).parse();
            assert!(
                diagnostics.is_empty(),
                "canonical form failed to re-parse: {printed:?} -> {diagnostics:?}"
            );
            assert!(
                stmts_structurally_eq(&program, &reparsed),
                "re-parsing the canonical form changed the tree for {source:?}:\n\
                 printed: {printed}\nfirst:  {program:?}\nsecond: {reparsed:?}"
            );

            // the print itself is stable as well
            let second: Vec<String> = reparsed.iter().map(|s| s.to_string()).collect();
            assert_eq!(printed, second.join(" "), "unstable print for {source:?}");
        }
    }

    #[test]
    fn test_empty_program_parses_to_nothing() {
        let (program, diagnostics) = Parser::new(b"// just a comment\n").parse();
        assert!(program.is_empty());
        assert!(diagnostics.is_empty());
    }
}

use crate::compile_error::{CompileError, ErrorHandler, Recovery};
use crate::frontend::scanner::Scanner;
use crate::frontend::source::Source;
use crate::frontend::token::{Token, TokenKind};
use crate::lang::function::FunctionTree;
use crate::lang::node::{BinaryOperator, Expression, Statement, UnaryOperator};

/// Recursive-descent parser for Cinder.
///
/// Pulls tokens lazily from a [`Scanner`] with exactly one token of
/// lookahead. Statement-level errors are passed to the caller's
/// [`ErrorHandler`]:
/// - `Recovery::Continue`: parsing resumes with the next statement. Any
///   function body left open by the error is skipped up to its closing brace,
///   then the rest of the line. A failing token that itself starts a new line
///   is kept as the start of the next statement.
/// - `Recovery::Abort`: parsing stops and the error is returned.
///
/// An error anywhere inside an expression fails the whole statement; there
/// is no recovery below statement granularity.
pub struct Parser<'s, 'h> {
    scanner: Scanner<'s>,
    handler: &'h mut dyn ErrorHandler,
    lookahead: Option<Token>,
    /// End offset of the most recently consumed token.
    ///
    /// Used on recovery to tell whether a buffered token already starts a
    /// fresh line.
    last_end: usize,
    /// End offset of the token consumed before `last_popped`.
    previous_end: usize,
    last_popped: Option<Token>,
    /// Function bodies whose closing brace has not been consumed yet.
    open_bodies: usize,
    recovered: usize,
}

impl<'s, 'h> Parser<'s, 'h> {
    pub fn new(scanner: Scanner<'s>, handler: &'h mut dyn ErrorHandler) -> Self {
        Parser {
            scanner,
            handler,
            lookahead: None,
            last_end: 0,
            previous_end: 0,
            last_popped: None,
            open_bodies: 0,
            recovered: 0,
        }
    }

    fn source(&self) -> &'s Source<'s> {
        self.scanner.source()
    }

    /// Number of errors the handler chose to recover from.
    pub fn recovered_errors(&self) -> usize {
        self.recovered
    }

    /// Returns the next token without consuming it.
    fn peek(&mut self) -> Token {
        match self.lookahead {
            Some(token) => token,
            None => {
                let token = self.scanner.next_token();
                self.lookahead = Some(token);
                token
            }
        }
    }

    /// Consumes the next token.
    ///
    /// This is the one place where an `Invalid` token turns into an error.
    fn pop(&mut self) -> Result<Token, CompileError> {
        let token = match self.lookahead.take() {
            Some(token) => token,
            None => self.scanner.next_token(),
        };
        self.previous_end = self.last_end;
        self.last_end = token.content.end;
        self.last_popped = Some(token);
        if token.kind == TokenKind::Invalid {
            return Err(CompileError::new("Invalid character", token.content));
        }
        Ok(token)
    }

    fn expect(&mut self, kind: TokenKind, message: &str) -> Result<Token, CompileError> {
        let token = self.pop()?;
        if token.kind != kind {
            return Err(CompileError::new(message, token.content));
        }
        Ok(token)
    }

    /// Consumes the next token if it has the given kind.
    fn try_skip(&mut self, kind: TokenKind) -> Result<bool, CompileError> {
        if self.peek().kind == kind {
            self.pop()?;
            return Ok(true);
        }
        Ok(false)
    }

    fn skip(&mut self, kind: TokenKind, message: &str) -> Result<(), CompileError> {
        if !self.try_skip(kind)? {
            let token = self.peek();
            return Err(CompileError::new(message, token.content));
        }
        Ok(())
    }

    /// Parses a whole compilation unit: statements up to end-of-file.
    ///
    /// The body may be empty and need not end in `return`.
    pub fn parse_unit(&mut self) -> Result<FunctionTree, CompileError> {
        let mut body = Vec::new();

        loop {
            if self.peek().kind == TokenKind::EndOfFile {
                break;
            }

            match self.parse_statement() {
                Ok(statement) => body.push(statement),
                Err(error) => match self.handler.handle_error(&error) {
                    Recovery::Continue => {
                        self.recovered += 1;
                        self.resynchronize(&error);
                    }
                    Recovery::Abort => {
                        log::debug!("parse aborted: {}", error);
                        return Err(error);
                    }
                },
            }
        }

        Ok(FunctionTree::new(Vec::new(), body))
    }

    /// Moves past a failed statement.
    ///
    /// Inside a function literal the whole literal belongs to the failed
    /// statement, so tokens are dropped until every open body is closed.
    /// Otherwise the rest of the line is skipped, unless the offending token
    /// already starts a statement on a new line (the statement before it was
    /// cut short at its line end); that token is kept, buffered or put back.
    fn resynchronize(&mut self, error: &CompileError) {
        let popped_error_token = match self.lookahead {
            Some(_) => None,
            None => self
                .last_popped
                .filter(|token| token.content == error.location),
        };

        if self.open_bodies > 0 {
            if popped_error_token.is_some_and(|token| token.kind == TokenKind::BraceRight) {
                self.open_bodies -= 1;
            }
            self.skip_open_bodies();
            self.skip_rest_of_line();
            return;
        }

        match self.lookahead.take() {
            Some(token)
                if token.content == error.location
                    && self.begins_fresh_statement(token, self.last_end) =>
            {
                log::debug!("recovering at buffered token {}", token.kind);
                self.lookahead = Some(token);
            }
            Some(token) if token.kind == TokenKind::EndOfFile => self.lookahead = Some(token),
            Some(_) => self.scanner.skip_line(),
            None => match popped_error_token {
                Some(token) if self.begins_fresh_statement(token, self.previous_end) => {
                    log::debug!("recovering at consumed token {}", token.kind);
                    self.lookahead = Some(token);
                }
                _ => self.scanner.skip_line(),
            },
        }
    }

    /// Whether `token` can open a statement and is the first token of its line
    /// after offset `after`.
    fn begins_fresh_statement(&self, token: Token, after: usize) -> bool {
        token.kind.starts_statement()
            && self
                .source()
                .has_newline_between(after, token.content.begin)
    }

    /// Drops tokens until the open function bodies are closed or input ends.
    fn skip_open_bodies(&mut self) {
        while self.open_bodies > 0 {
            let token = match self.lookahead.take() {
                Some(token) => token,
                None => self.scanner.next_token(),
            };
            match token.kind {
                TokenKind::BraceLeft => self.open_bodies += 1,
                TokenKind::BraceRight => self.open_bodies -= 1,
                TokenKind::EndOfFile => {
                    self.lookahead = Some(token);
                    self.open_bodies = 0;
                }
                _ => {}
            }
            self.last_end = token.content.end;
        }
        log::debug!("skipped unfinished function body up to offset {}", self.last_end);
    }

    /// Skips what follows the last consumed token on its line.
    fn skip_rest_of_line(&mut self) {
        let next = self.peek();
        if next.kind != TokenKind::EndOfFile
            && !self
                .source()
                .has_newline_between(self.last_end, next.content.begin)
        {
            self.lookahead = None;
            self.scanner.skip_line();
        }
    }

    /// Parses one statement. The caller has checked it is not end-of-file.
    fn parse_statement(&mut self) -> Result<Statement, CompileError> {
        let first = self.peek();
        match first.kind {
            TokenKind::Var => {
                self.pop()?;
                let name_token =
                    self.expect(TokenKind::Identifier, "Name of declared variable expected")?;
                self.expect(TokenKind::Assign, "Assignment operator '=' expected")?;
                let initializer = self.parse_expression()?;
                Ok(Statement::Declaration {
                    name: self.source().slice(name_token.content).to_string(),
                    initializer,
                })
            }

            TokenKind::Return => {
                self.pop()?;
                let value = self.parse_expression()?;
                Ok(Statement::Return { value })
            }

            kind if kind.is_control_flow() => {
                self.pop()?;
                Err(CompileError::new(
                    "Control flow statements are not supported yet",
                    first.content,
                ))
            }

            _ => {
                let value = self.parse_expression()?;
                if self.try_skip(TokenKind::Assign)? {
                    let target = value;
                    let value = self.parse_expression()?;
                    Ok(Statement::Assignment { target, value })
                } else {
                    Ok(Statement::Expression { value })
                }
            }
        }
    }

    pub fn parse_expression(&mut self) -> Result<Expression, CompileError> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let token = self.peek();
            let operator = match token.kind {
                TokenKind::Plus => BinaryOperator::Add,
                TokenKind::Minus => BinaryOperator::Subtract,
                _ => break,
            };
            self.pop()?;
            let right = self.parse_multiplicative()?;
            left = Expression::Binary {
                operator,
                left: Box::new(left),
                right: Box::new(right),
                location: token.content,
            };
        }

        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expression, CompileError> {
        let mut left = self.parse_unary()?;

        loop {
            let token = self.peek();
            let operator = match token.kind {
                TokenKind::Star => BinaryOperator::Multiply,
                TokenKind::Slash => BinaryOperator::Divide,
                _ => break,
            };
            self.pop()?;
            let right = self.parse_unary()?;
            left = Expression::Binary {
                operator,
                left: Box::new(left),
                right: Box::new(right),
                location: token.content,
            };
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expression, CompileError> {
        let token = self.peek();
        let operator = match token.kind {
            TokenKind::Minus => UnaryOperator::Negate,
            TokenKind::ExclamationMark => UnaryOperator::Not,
            TokenKind::Tilde => UnaryOperator::Invert,
            _ => return self.parse_primary(),
        };
        self.pop()?;
        let operand = self.parse_unary()?;
        Ok(Expression::Unary {
            operator,
            operand: Box::new(operand),
            location: token.content,
        })
    }

    fn parse_primary(&mut self) -> Result<Expression, CompileError> {
        let first = self.pop()?;
        match first.kind {
            TokenKind::Identifier => Ok(Expression::Name {
                range: first.content,
            }),

            TokenKind::Integer10 => Ok(Expression::IntegerLiteral {
                digits: first.content,
            }),

            TokenKind::Null => Ok(Expression::Null {
                range: first.content,
            }),

            TokenKind::ParenthesisLeft => {
                let value = self.parse_expression()?;
                self.expect(
                    TokenKind::ParenthesisRight,
                    "Closing parenthesis ')' expected",
                )?;
                Ok(value)
            }

            TokenKind::Call => self.parse_call(),

            TokenKind::Function => self.parse_function(first),

            _ => Err(CompileError::new("Expression expected", first.content)),
        }
    }

    /// Parses the rest of `call <callee> ( [arg {, arg}] )`.
    ///
    /// The leading keyword keeps application distinct from a future
    /// subscript operator; `f(x)` alone is not a call.
    fn parse_call(&mut self) -> Result<Expression, CompileError> {
        let callee = self.parse_expression()?;
        self.expect(
            TokenKind::ParenthesisLeft,
            "Opening parenthesis '(' expected",
        )?;

        let mut arguments = Vec::new();
        if !self.try_skip(TokenKind::ParenthesisRight)? {
            loop {
                arguments.push(self.parse_expression()?);
                if self.try_skip(TokenKind::Comma)? {
                    continue;
                }
                self.skip(
                    TokenKind::ParenthesisRight,
                    "Comma or closing parenthesis expected",
                )?;
                break;
            }
        }

        Ok(Expression::Call {
            callee: Box::new(callee),
            arguments,
        })
    }

    /// Parses the rest of `function ( [name {, name}] ) { statements }`.
    ///
    /// Errors inside the body propagate; the enclosing statement fails.
    fn parse_function(&mut self, keyword: Token) -> Result<Expression, CompileError> {
        self.expect(
            TokenKind::ParenthesisLeft,
            "Opening parenthesis '(' expected",
        )?;

        let mut parameters = Vec::new();
        if !self.try_skip(TokenKind::ParenthesisRight)? {
            loop {
                let name = self.expect(TokenKind::Identifier, "Parameter name expected")?;
                parameters.push(self.source().slice(name.content).to_string());
                if self.try_skip(TokenKind::Comma)? {
                    continue;
                }
                self.skip(
                    TokenKind::ParenthesisRight,
                    "Comma or closing parenthesis expected",
                )?;
                break;
            }
        }

        self.expect(TokenKind::BraceLeft, "Opening brace '{' expected")?;
        self.open_bodies += 1;

        let mut body = Vec::new();
        loop {
            let next = self.peek();
            match next.kind {
                TokenKind::BraceRight => {
                    self.pop()?;
                    self.open_bodies -= 1;
                    break;
                }
                TokenKind::EndOfFile => {
                    return Err(CompileError::new("Closing brace '}' expected", next.content));
                }
                _ => body.push(self.parse_statement()?),
            }
        }

        Ok(Expression::Function {
            function: FunctionTree::new(parameters, body),
            location: keyword.content,
        })
    }
}

use crate::{
    error::{CompileError, Result},
    frontend::{
        SourceFile,
        ast::{
            BinaryOperator, CompareOperator, Expression, ExpressionKind, FunctionDefinition,
            Identifier, Literal, Module, Parameter, Statement, StatementKind, UnaryOperator,
        },
        lexer::{Keyword, Lexer, Span, Token, TokenKind},
    },
};

#[derive(Debug)]
pub struct Parser<'source> {
    source: &'source SourceFile,
    tokens: Vec<Token>,
    position: usize,
}

impl<'source> Parser<'source> {
    pub fn parse_module(source: &'source SourceFile) -> Result<Module> {
        let mut parser = Self {
            source,
            tokens: Lexer::tokenize(source)?,
            position: 0,
        };

        let mut statements = Vec::new();

        loop {
            match parser.peek().kind {
                TokenKind::EndOfFile => break,
                TokenKind::Newline => {
                    parser.next();
                }
                _ => parser.parse_statement(&mut statements)?,
            }
        }

        Ok(Module { statements })
    }

    fn peek(&self) -> &Token {
        self.peek_nth(0)
    }

    fn peek_nth(&self, n: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.position + n).min(last)]
    }

    fn next(&mut self) -> Token {
        let token = self.peek().clone();

        if token.kind != TokenKind::EndOfFile {
            self.position += 1;
        }

        token
    }

    fn eat(&mut self, kind: TokenKind) -> Option<Token> {
        (self.peek().kind == kind).then(|| self.next())
    }

    /// End offset of the most recently consumed token
    fn previous_end(&self) -> usize {
        self.position
            .checked_sub(1)
            .map(|i| self.tokens[i].span.end)
            .unwrap_or(0)
    }

    fn span_from(&self, start: Span) -> Span {
        Span::new(start.start, self.previous_end().max(start.end))
    }

    fn describe(&self, token: &Token) -> String {
        match token.kind {
            TokenKind::Newline => "end of line".to_owned(),
            TokenKind::Indent => "indent".to_owned(),
            TokenKind::Dedent => "dedent".to_owned(),
            TokenKind::EndOfFile => "end of file".to_owned(),
            _ => format!("`{}`", self.source.value_of_span(token.span)),
        }
    }

    fn syntax_error(&self, token: &Token, message: impl Into<String>) -> CompileError {
        CompileError::syntax(self.source, token.span, message)
    }

    fn unsupported(&self, span: Span, construct: impl Into<String>) -> CompileError {
        CompileError::unsupported(self.source, span, construct)
    }

    fn expect_next_to_be(&mut self, kind: TokenKind, expecting: &str) -> Result<Token> {
        let token = self.next();

        if token.kind != kind {
            return Err(self.syntax_error(
                &token,
                format!("expected {expecting} but found {}", self.describe(&token)),
            ));
        }

        Ok(token)
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> Result<Token> {
        let name: &'static str = keyword.into();
        self.expect_next_to_be(TokenKind::Keyword(keyword), &format!("`{name}`"))
    }

    fn parse_identifier(&mut self) -> Result<Identifier> {
        let token = self.expect_next_to_be(TokenKind::Identifier, "a name")?;

        Ok(Identifier {
            span: token.span,
            name: self.source.value_of_span(token.span).to_owned(),
        })
    }

    /* Statements */

    fn parse_statement(&mut self, out: &mut Vec<Statement>) -> Result<()> {
        let peeked = self.peek().clone();

        match peeked.kind {
            TokenKind::Keyword(Keyword::If) => out.push(self.parse_if()?),
            TokenKind::Keyword(Keyword::While) => out.push(self.parse_while()?),
            TokenKind::Keyword(Keyword::Def) => out.push(self.parse_function_definition()?),
            TokenKind::Keyword(keyword) if unsupported_statement(keyword).is_some() => {
                let construct = unsupported_statement(keyword).unwrap_or_default();
                return Err(self.unsupported(peeked.span, construct));
            }
            TokenKind::At => return Err(self.unsupported(peeked.span, "decorator")),
            TokenKind::Indent => return Err(self.syntax_error(&peeked, "unexpected indent")),
            _ => self.parse_simple_statements(out)?,
        }

        Ok(())
    }

    /// simple (';' simple)* [';'] NEWLINE
    fn parse_simple_statements(&mut self, out: &mut Vec<Statement>) -> Result<()> {
        loop {
            out.push(self.parse_simple_statement()?);

            if self.eat(TokenKind::Semicolon).is_none() {
                break;
            }

            if matches!(
                self.peek().kind,
                TokenKind::Newline | TokenKind::EndOfFile
            ) {
                break;
            }
        }

        if self.peek().kind != TokenKind::EndOfFile {
            self.expect_next_to_be(TokenKind::Newline, "end of line")?;
        }

        Ok(())
    }

    fn parse_simple_statement(&mut self) -> Result<Statement> {
        let start = self.peek().clone();

        let kind = match start.kind {
            TokenKind::Keyword(Keyword::Pass) => {
                self.next();
                StatementKind::Pass
            }
            TokenKind::Keyword(Keyword::Return) => {
                self.next();

                let value = match self.peek().kind {
                    TokenKind::Newline | TokenKind::Semicolon | TokenKind::EndOfFile => None,
                    _ => Some(Box::new(self.parse_expression()?)),
                };

                StatementKind::Return(value)
            }
            TokenKind::Identifier if self.peek_nth(1).kind == TokenKind::Equals => {
                let target = self.parse_identifier()?;
                self.next();
                let value = Box::new(self.parse_expression()?);

                if self.peek().kind == TokenKind::Equals {
                    return Err(self.unsupported(self.span_from(start.span), "chained assignment"));
                }

                StatementKind::Assignment { target, value }
            }
            TokenKind::Identifier if self.peek_nth(1).kind == TokenKind::Colon => {
                let target = self.parse_identifier()?;
                self.next();
                let annotation = self.parse_annotation()?;

                let value = match self.eat(TokenKind::Equals) {
                    Some(_) => Some(Box::new(self.parse_expression()?)),
                    None => None,
                };

                StatementKind::AnnotatedAssignment {
                    target,
                    annotation,
                    value,
                }
            }
            TokenKind::Identifier if self.peek_nth(1).kind.is_augmented_assignment() => {
                let target = self.parse_identifier()?;
                let operator_token = self.next();

                let operator = match operator_token.kind {
                    TokenKind::PlusEquals => BinaryOperator::Add,
                    TokenKind::MinusEquals => BinaryOperator::Subtract,
                    TokenKind::AsteriskEquals => BinaryOperator::Multiply,
                    TokenKind::SlashEquals => BinaryOperator::Divide,
                    TokenKind::DoubleSlashEquals => BinaryOperator::FloorDivide,
                    TokenKind::PercentEquals => BinaryOperator::Modulus,
                    _ => {
                        return Err(self.unsupported(
                            operator_token.span,
                            format!(
                                "`{}` augmented assignment",
                                self.source.value_of_span(operator_token.span)
                            ),
                        ));
                    }
                };

                let value = Box::new(self.parse_expression()?);

                StatementKind::AugmentedAssignment {
                    target,
                    operator,
                    value,
                }
            }
            _ => {
                let expression = self.parse_expression()?;

                match self.peek().kind {
                    TokenKind::Comma => {
                        return Err(self.unsupported(self.peek().span, "tuple"));
                    }
                    TokenKind::Equals => {
                        return Err(self.unsupported(
                            expression.span,
                            "assignment to anything other than a plain name",
                        ));
                    }
                    kind if kind.is_augmented_assignment() => {
                        return Err(self.unsupported(
                            expression.span,
                            "assignment to anything other than a plain name",
                        ));
                    }
                    _ => {}
                }

                StatementKind::Expression(Box::new(expression))
            }
        };

        Ok(Statement {
            span: self.span_from(start.span),
            kind,
        })
    }

    /// ':' suite
    fn parse_suite(&mut self) -> Result<Vec<Statement>> {
        self.expect_next_to_be(TokenKind::Colon, "`:`")?;

        let mut statements = Vec::new();

        if self.eat(TokenKind::Newline).is_none() {
            self.parse_simple_statements(&mut statements)?;
            return Ok(statements);
        }

        self.expect_next_to_be(TokenKind::Indent, "an indented block")?;

        while self.eat(TokenKind::Dedent).is_none() {
            if self.peek().kind == TokenKind::EndOfFile {
                break;
            }

            self.parse_statement(&mut statements)?;
        }

        Ok(statements)
    }

    /// if test: suite (elif test: suite)* [else: suite]
    fn parse_if(&mut self) -> Result<Statement> {
        // `elif` re-enters here and becomes a nested `if` in the else suite
        let if_keyword = self.next();

        let condition = Box::new(self.parse_expression()?);
        let body = self.parse_suite()?;

        let orelse = match self.peek().kind {
            TokenKind::Keyword(Keyword::Elif) => vec![self.parse_if()?],
            TokenKind::Keyword(Keyword::Else) => {
                self.next();
                self.parse_suite()?
            }
            _ => Vec::new(),
        };

        Ok(Statement {
            span: self.span_from(if_keyword.span),
            kind: StatementKind::If {
                condition,
                body,
                orelse,
            },
        })
    }

    /// while test: suite
    fn parse_while(&mut self) -> Result<Statement> {
        let while_keyword = self.expect_keyword(Keyword::While)?;

        let condition = Box::new(self.parse_expression()?);
        let body = self.parse_suite()?;

        if let Some(token) = self.eat(TokenKind::Keyword(Keyword::Else)) {
            return Err(self.unsupported(token.span, "`else` clause on a `while` loop"));
        }

        Ok(Statement {
            span: self.span_from(while_keyword.span),
            kind: StatementKind::While { condition, body },
        })
    }

    /// def name(param: ty, ...) -> ty: suite
    fn parse_function_definition(&mut self) -> Result<Statement> {
        let def_keyword = self.expect_keyword(Keyword::Def)?;

        let name = self.parse_identifier()?;
        self.expect_next_to_be(TokenKind::OpenParen, "`(`")?;

        let mut parameters = Vec::new();

        while self.eat(TokenKind::CloseParen).is_none() {
            let peeked = self.peek().clone();

            if matches!(
                peeked.kind,
                TokenKind::Asterisk | TokenKind::DoubleAsterisk | TokenKind::Slash
            ) {
                return Err(self.unsupported(peeked.span, "variadic or positional-only parameters"));
            }

            let parameter_name = self.parse_identifier()?;

            let annotation = match self.eat(TokenKind::Colon) {
                Some(_) => Some(self.parse_annotation()?),
                None => None,
            };

            if let Some(token) = self.eat(TokenKind::Equals) {
                return Err(self.unsupported(token.span, "default parameter value"));
            }

            parameters.push(Parameter {
                name: parameter_name,
                annotation,
            });

            if self.eat(TokenKind::Comma).is_none() {
                self.expect_next_to_be(TokenKind::CloseParen, "`,` or `)`")?;
                break;
            }
        }

        let return_annotation = match self.eat(TokenKind::Arrow) {
            Some(_) => Some(self.parse_annotation()?),
            None => None,
        };

        let body = self.parse_suite()?;

        Ok(Statement {
            span: self.span_from(def_keyword.span),
            kind: StatementKind::FunctionDefinition(Box::new(FunctionDefinition {
                name,
                parameters,
                return_annotation,
                body,
            })),
        })
    }

    /// Annotations are a bare type name (or `None`) and are otherwise ignored
    fn parse_annotation(&mut self) -> Result<Identifier> {
        let token = self.next();

        let annotation = match token.kind {
            TokenKind::Identifier | TokenKind::Keyword(Keyword::None) => Identifier {
                span: token.span,
                name: self.source.value_of_span(token.span).to_owned(),
            },
            _ => {
                return Err(self.syntax_error(
                    &token,
                    format!("expected a type name but found {}", self.describe(&token)),
                ));
            }
        };

        if matches!(
            self.peek().kind,
            TokenKind::OpenBracket | TokenKind::Dot | TokenKind::Pipe
        ) {
            return Err(self.unsupported(self.peek().span, "compound type annotation"));
        }

        Ok(annotation)
    }

    /* Expressions */

    pub fn parse_expression(&mut self) -> Result<Expression> {
        let expression = self.parse_or()?;

        match self.peek().kind {
            TokenKind::Keyword(Keyword::If) => {
                Err(self.unsupported(self.peek().span, "conditional expression"))
            }
            TokenKind::Walrus => Err(self.unsupported(self.peek().span, "assignment expression")),
            _ => Ok(expression),
        }
    }

    fn parse_binary_chain(
        &mut self,
        operator_for: impl Fn(TokenKind) -> Option<BinaryOperator>,
        mut operand: impl FnMut(&mut Self) -> Result<Expression>,
    ) -> Result<Expression> {
        let mut lhs = operand(self)?;

        while let Some(operator) = operator_for(self.peek().kind) {
            self.next();
            let rhs = operand(self)?;

            lhs = Expression {
                span: lhs.span.to(rhs.span),
                kind: ExpressionKind::Binary {
                    lhs: Box::new(lhs),
                    operator,
                    rhs: Box::new(rhs),
                },
            };
        }

        Ok(lhs)
    }

    fn parse_or(&mut self) -> Result<Expression> {
        self.parse_binary_chain(
            |kind| (kind == TokenKind::Keyword(Keyword::Or)).then_some(BinaryOperator::Or),
            Self::parse_and,
        )
    }

    fn parse_and(&mut self) -> Result<Expression> {
        self.parse_binary_chain(
            |kind| (kind == TokenKind::Keyword(Keyword::And)).then_some(BinaryOperator::And),
            Self::parse_not,
        )
    }

    fn parse_not(&mut self) -> Result<Expression> {
        let Some(not_keyword) = self.eat(TokenKind::Keyword(Keyword::Not)) else {
            return self.parse_comparison();
        };

        let operand = self.parse_not()?;

        Ok(Expression {
            span: not_keyword.span.to(operand.span),
            kind: ExpressionKind::Unary {
                operator: UnaryOperator::Not,
                operand: Box::new(operand),
            },
        })
    }

    fn parse_comparison(&mut self) -> Result<Expression> {
        let first = self.parse_arith()?;
        let mut rest = Vec::new();

        loop {
            let peeked = self.peek().clone();

            let operator = match peeked.kind {
                TokenKind::LessThan => CompareOperator::LessThan,
                TokenKind::LessThanOrEqualTo => CompareOperator::LessThanOrEqualTo,
                TokenKind::DoubleEquals => CompareOperator::Equals,
                TokenKind::NotEquals => CompareOperator::NotEquals,
                TokenKind::GreaterThan => CompareOperator::GreaterThan,
                TokenKind::GreaterThanOrEqualTo => CompareOperator::GreaterThanOrEqualTo,
                TokenKind::Keyword(Keyword::In) => {
                    return Err(self.unsupported(peeked.span, "`in` membership test"));
                }
                TokenKind::Keyword(Keyword::Not)
                    if self.peek_nth(1).kind == TokenKind::Keyword(Keyword::In) =>
                {
                    return Err(self.unsupported(peeked.span, "`not in` membership test"));
                }
                TokenKind::Keyword(Keyword::Is) => {
                    return Err(self.unsupported(peeked.span, "`is` identity test"));
                }
                kind if kind.is_bitwise_operator() => {
                    return Err(self.unsupported(
                        peeked.span,
                        format!(
                            "bitwise operator `{}`",
                            self.source.value_of_span(peeked.span)
                        ),
                    ));
                }
                _ => break,
            };

            self.next();
            rest.push((operator, self.parse_arith()?));
        }

        if rest.is_empty() {
            return Ok(first);
        }

        let span = rest
            .last()
            .map(|(_, last)| first.span.to(last.span))
            .unwrap_or(first.span);

        Ok(Expression {
            span,
            kind: ExpressionKind::Comparison {
                first: Box::new(first),
                rest,
            },
        })
    }

    fn parse_arith(&mut self) -> Result<Expression> {
        self.parse_binary_chain(
            |kind| match kind {
                TokenKind::Plus => Some(BinaryOperator::Add),
                TokenKind::Minus => Some(BinaryOperator::Subtract),
                _ => None,
            },
            Self::parse_term,
        )
    }

    fn parse_term(&mut self) -> Result<Expression> {
        self.parse_binary_chain(
            |kind| match kind {
                TokenKind::Asterisk => Some(BinaryOperator::Multiply),
                TokenKind::Slash => Some(BinaryOperator::Divide),
                TokenKind::DoubleSlash => Some(BinaryOperator::FloorDivide),
                TokenKind::Percent => Some(BinaryOperator::Modulus),
                _ => None,
            },
            Self::parse_factor,
        )
    }

    fn parse_factor(&mut self) -> Result<Expression> {
        let peeked = self.peek().clone();

        // Negative literals are range checked with their sign
        if peeked.kind == TokenKind::Minus && self.peek_nth(1).kind == TokenKind::IntegerLiteral {
            self.next();
            let literal = self.next();
            let value = self.parse_integer(&literal, true)?;

            let atom = Expression {
                span: peeked.span.to(literal.span),
                kind: ExpressionKind::Literal(Literal::Integer(value)),
            };

            let negated = self.parse_postfix(atom)?;
            return self.reject_power(negated);
        }

        let operator = match peeked.kind {
            TokenKind::Minus => UnaryOperator::Negate,
            TokenKind::Plus => UnaryOperator::Plus,
            TokenKind::Tilde => return Err(self.unsupported(peeked.span, "bitwise inversion")),
            _ => return self.parse_power(),
        };

        self.next();
        let operand = self.parse_factor()?;

        Ok(Expression {
            span: peeked.span.to(operand.span),
            kind: ExpressionKind::Unary {
                operator,
                operand: Box::new(operand),
            },
        })
    }

    fn parse_power(&mut self) -> Result<Expression> {
        let base = self.parse_primary()?;
        self.reject_power(base)
    }

    fn reject_power(&self, base: Expression) -> Result<Expression> {
        if self.peek().kind == TokenKind::DoubleAsterisk {
            return Err(self.unsupported(self.peek().span, "exponentiation"));
        }

        Ok(base)
    }

    /// atom, optionally followed by a call argument list
    fn parse_primary(&mut self) -> Result<Expression> {
        let atom = self.parse_atom()?;
        self.parse_postfix(atom)
    }

    fn parse_postfix(&mut self, atom: Expression) -> Result<Expression> {
        let expression = if self.peek().kind == TokenKind::OpenParen {
            let ExpressionKind::Name(callee) = atom.kind else {
                return Err(self.unsupported(atom.span, "call of anything other than a plain name"));
            };

            self.next();
            let arguments = self.parse_call_arguments()?;

            Expression {
                span: self.span_from(atom.span),
                kind: ExpressionKind::Call { callee, arguments },
            }
        } else {
            atom
        };

        let peeked = self.peek().clone();

        match peeked.kind {
            TokenKind::Dot => Err(self.unsupported(peeked.span, "attribute access")),
            TokenKind::OpenBracket => Err(self.unsupported(peeked.span, "subscript")),
            TokenKind::OpenParen => Err(self.unsupported(peeked.span, "call of a call result")),
            _ => Ok(expression),
        }
    }

    fn parse_call_arguments(&mut self) -> Result<Vec<Expression>> {
        let mut arguments = Vec::new();

        while self.eat(TokenKind::CloseParen).is_none() {
            let peeked = self.peek().clone();

            if matches!(peeked.kind, TokenKind::Asterisk | TokenKind::DoubleAsterisk) {
                return Err(self.unsupported(peeked.span, "argument unpacking"));
            }

            if peeked.kind == TokenKind::Identifier && self.peek_nth(1).kind == TokenKind::Equals {
                return Err(self.unsupported(peeked.span, "keyword argument"));
            }

            arguments.push(self.parse_expression()?);

            if let Some(token) = self.eat(TokenKind::Keyword(Keyword::For)) {
                return Err(self.unsupported(token.span, "generator expression"));
            }

            if self.eat(TokenKind::Comma).is_none() {
                self.expect_next_to_be(TokenKind::CloseParen, "`,` or `)`")?;
                break;
            }
        }

        Ok(arguments)
    }

    fn parse_atom(&mut self) -> Result<Expression> {
        let token = self.next();

        let kind = match token.kind {
            TokenKind::Identifier => ExpressionKind::Name(Identifier {
                span: token.span,
                name: self.source.value_of_span(token.span).to_owned(),
            }),
            TokenKind::IntegerLiteral => {
                ExpressionKind::Literal(Literal::Integer(self.parse_integer(&token, false)?))
            }
            TokenKind::StringLiteral => {
                let mut value = self.parse_string(&token)?;
                let mut span = token.span;

                // Adjacent literals concatenate
                while let Some(next) = self.eat(TokenKind::StringLiteral) {
                    value.push_str(&self.parse_string(&next)?);
                    span = span.to(next.span);
                }

                return Ok(Expression {
                    span,
                    kind: ExpressionKind::Literal(Literal::String(value)),
                });
            }
            TokenKind::Keyword(Keyword::True) => ExpressionKind::Literal(Literal::Boolean(true)),
            TokenKind::Keyword(Keyword::False) => ExpressionKind::Literal(Literal::Boolean(false)),
            TokenKind::Keyword(Keyword::None) => ExpressionKind::Literal(Literal::None),
            TokenKind::OpenParen => {
                if self.peek().kind == TokenKind::CloseParen {
                    return Err(self.unsupported(token.span, "tuple"));
                }

                let mut inner = self.parse_expression()?;

                if let Some(comma) = self.eat(TokenKind::Comma) {
                    return Err(self.unsupported(comma.span, "tuple"));
                }

                if let Some(token) = self.eat(TokenKind::Keyword(Keyword::For)) {
                    return Err(self.unsupported(token.span, "generator expression"));
                }

                let close = self.expect_next_to_be(TokenKind::CloseParen, "`)`")?;
                inner.span = token.span.to(close.span);

                return Ok(inner);
            }
            TokenKind::FloatLiteral => return Err(self.unsupported(token.span, "floating point literal")),
            TokenKind::OpenBracket => return Err(self.unsupported(token.span, "list literal")),
            TokenKind::OpenBrace => return Err(self.unsupported(token.span, "dict or set literal")),
            TokenKind::Ellipsis => return Err(self.unsupported(token.span, "ellipsis literal")),
            TokenKind::Keyword(Keyword::Lambda) => return Err(self.unsupported(token.span, "lambda")),
            TokenKind::Keyword(Keyword::Await) => {
                return Err(self.unsupported(token.span, "`await` expression"));
            }
            TokenKind::Keyword(Keyword::Yield) => {
                return Err(self.unsupported(token.span, "`yield` expression"));
            }
            _ => {
                return Err(self.syntax_error(
                    &token,
                    format!("expected an expression but found {}", self.describe(&token)),
                ));
            }
        };

        Ok(Expression {
            span: token.span,
            kind,
        })
    }

    fn parse_integer(&self, token: &Token, negative: bool) -> Result<i32> {
        let text = self.source.value_of_span(token.span).replace('_', "");
        let lowered = text.to_ascii_lowercase();

        let parsed = match lowered.get(..2) {
            Some("0x") => i128::from_str_radix(&lowered[2..], 16),
            Some("0o") => i128::from_str_radix(&lowered[2..], 8),
            Some("0b") => i128::from_str_radix(&lowered[2..], 2),
            _ => lowered.parse::<i128>(),
        };

        let value = parsed.map_err(|_| {
            self.syntax_error(token, format!("invalid integer literal `{text}`"))
        })?;

        let value = if negative { -value } else { value };

        i32::try_from(value).map_err(|_| {
            self.unsupported(token.span, "integer literal outside the 32-bit range")
        })
    }

    fn parse_string(&self, token: &Token) -> Result<String> {
        let raw = self.source.value_of_span(token.span);
        let quote_len = if raw.starts_with("\"\"\"") || raw.starts_with("'''") {
            3
        } else {
            1
        };

        let inner = raw
            .get(quote_len..raw.len().saturating_sub(quote_len))
            .ok_or_else(|| self.syntax_error(token, "malformed string literal"))?;

        Ok(unescape(inner))
    }
}

/// Resolves backslash escapes. Unknown escapes are kept verbatim.
fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some('\\') => out.push('\\'),
            Some('\'') => out.push('\''),
            Some('"') => out.push('"'),
            Some('\n') => {}
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }

    out
}

/// Statement keywords outside the supported subset
fn unsupported_statement(keyword: Keyword) -> Option<&'static str> {
    Some(match keyword {
        Keyword::For => "`for` loop",
        Keyword::Class => "class definition",
        Keyword::Try => "`try` statement",
        Keyword::With => "`with` statement",
        Keyword::Import | Keyword::From => "import",
        Keyword::Global => "`global` declaration",
        Keyword::Nonlocal => "`nonlocal` declaration",
        Keyword::Del => "`del` statement",
        Keyword::Assert => "`assert` statement",
        Keyword::Raise => "`raise` statement",
        Keyword::Break => "`break` statement",
        Keyword::Continue => "`continue` statement",
        Keyword::Async => "async function",
        _ => return None,
    })
}

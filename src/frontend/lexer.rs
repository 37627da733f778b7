use std::{
    collections::{BTreeMap, VecDeque},
    str::Chars,
};

use itertools::{PeekNth, peek_nth};
use once_cell::sync::Lazy;
use strum::{EnumString, IntoStaticStr};

use crate::{
    error::{CompileError, Result},
    frontend::SourceFile,
};

#[derive(Debug)]
pub struct Lexer<'source> {
    source: &'source SourceFile,
    position: usize,
    chars: PeekNth<Chars<'source>>,
    /// Widths of the currently open indentation levels, outermost first
    indentation: Vec<usize>,
    /// Open `(`, `[` and `{` suppress newline and indentation tokens
    nesting: usize,
    at_line_start: bool,
    last_kind: Option<TokenKind>,
    finished: bool,
    pending: VecDeque<Token>,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /* Words */
    Keyword(Keyword), // while
    Identifier,       // main

    /* Literals */
    IntegerLiteral, // 1
    FloatLiteral,   // 1.0
    StringLiteral,  // "hello, world"

    /* Layout */
    Newline,
    Indent,
    Dedent,
    EndOfFile,

    /* Delimiters */
    OpenParen,    // (
    CloseParen,   // )
    OpenBracket,  // [
    CloseBracket, // ]
    OpenBrace,    // {
    CloseBrace,   // }
    Semicolon,    // ;
    Comma,        // ,

    /* Other */
    Colon,    // :
    Dot,      // .
    Ellipsis, // ...
    Arrow,    // ->
    At,       // @
    Walrus,   // :=

    /* Unary + Binary Ops */
    Minus, // -
    Plus,  // +
    Tilde, // ~

    /* Binary Ops */
    Asterisk,             // *
    DoubleAsterisk,       // **
    Slash,                // /
    DoubleSlash,          // //
    Percent,              // %
    Ampersand,            // &
    Pipe,                 // |
    Caret,                // ^
    ShiftLeft,            // <<
    ShiftRight,           // >>
    DoubleEquals,         // ==
    NotEquals,            // !=
    LessThan,             // <
    LessThanOrEqualTo,    // <=
    GreaterThan,          // >
    GreaterThanOrEqualTo, // >=

    /* Assignment */
    Equals,               // =
    PlusEquals,           // +=
    MinusEquals,          // -=
    AsteriskEquals,       // *=
    SlashEquals,          // /=
    DoubleSlashEquals,    // //=
    PercentEquals,        // %=
    DoubleAsteriskEquals, // **=
    AmpersandEquals,      // &=
    PipeEquals,           // |=
    CaretEquals,          // ^=
    ShiftLeftEquals,      // <<=
    ShiftRightEquals,     // >>=
}

impl TokenKind {
    pub fn is_comparison_operator(&self) -> bool {
        matches!(
            self,
            Self::NotEquals
                | Self::DoubleEquals
                | Self::LessThan
                | Self::LessThanOrEqualTo
                | Self::GreaterThan
                | Self::GreaterThanOrEqualTo
        )
    }

    pub fn is_term_operator(&self) -> bool {
        matches!(self, Self::Plus | Self::Minus)
    }

    pub fn is_factor_operator(&self) -> bool {
        matches!(
            self,
            Self::Asterisk | Self::Slash | Self::DoubleSlash | Self::Percent
        )
    }

    pub fn is_bitwise_operator(&self) -> bool {
        matches!(
            self,
            Self::Ampersand | Self::Pipe | Self::Caret | Self::ShiftLeft | Self::ShiftRight
        )
    }

    pub fn is_augmented_assignment(&self) -> bool {
        matches!(
            self,
            Self::PlusEquals
                | Self::MinusEquals
                | Self::AsteriskEquals
                | Self::SlashEquals
                | Self::DoubleSlashEquals
                | Self::PercentEquals
                | Self::DoubleAsteriskEquals
                | Self::AmpersandEquals
                | Self::PipeEquals
                | Self::CaretEquals
                | Self::ShiftLeftEquals
                | Self::ShiftRightEquals
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Keyword {
    #[strum(serialize = "False")]
    False,
    #[strum(serialize = "None")]
    None,
    #[strum(serialize = "True")]
    True,
    And,
    As,
    Assert,
    Async,
    Await,
    Break,
    Class,
    Continue,
    Def,
    Del,
    Elif,
    Else,
    Except,
    Finally,
    For,
    From,
    Global,
    If,
    Import,
    In,
    Is,
    Lambda,
    Nonlocal,
    Not,
    Or,
    Pass,
    Raise,
    Return,
    Try,
    While,
    With,
    Yield,
}

/// Table of single char tokens (matched after longer sequences are checked for)
static SINGLE_TOKENS: Lazy<BTreeMap<char, TokenKind>> = Lazy::new(|| {
    BTreeMap::from([
        ('(', TokenKind::OpenParen),
        (')', TokenKind::CloseParen),
        ('[', TokenKind::OpenBracket),
        (']', TokenKind::CloseBracket),
        ('{', TokenKind::OpenBrace),
        ('}', TokenKind::CloseBrace),
        (';', TokenKind::Semicolon),
        (',', TokenKind::Comma),
        (':', TokenKind::Colon),
        ('.', TokenKind::Dot),
        ('@', TokenKind::At),
        ('~', TokenKind::Tilde),
        ('+', TokenKind::Plus),
        ('-', TokenKind::Minus),
        ('*', TokenKind::Asterisk),
        ('/', TokenKind::Slash),
        ('%', TokenKind::Percent),
        ('&', TokenKind::Ampersand),
        ('|', TokenKind::Pipe),
        ('^', TokenKind::Caret),
        ('<', TokenKind::LessThan),
        ('>', TokenKind::GreaterThan),
        ('=', TokenKind::Equals),
    ])
});

/// Two char operators
static DOUBLE_TOKENS: Lazy<BTreeMap<&'static str, TokenKind>> = Lazy::new(|| {
    BTreeMap::from([
        ("->", TokenKind::Arrow),
        (":=", TokenKind::Walrus),
        ("==", TokenKind::DoubleEquals),
        ("!=", TokenKind::NotEquals),
        ("<=", TokenKind::LessThanOrEqualTo),
        (">=", TokenKind::GreaterThanOrEqualTo),
        ("+=", TokenKind::PlusEquals),
        ("-=", TokenKind::MinusEquals),
        ("*=", TokenKind::AsteriskEquals),
        ("/=", TokenKind::SlashEquals),
        ("%=", TokenKind::PercentEquals),
        ("&=", TokenKind::AmpersandEquals),
        ("|=", TokenKind::PipeEquals),
        ("^=", TokenKind::CaretEquals),
        ("**", TokenKind::DoubleAsterisk),
        ("//", TokenKind::DoubleSlash),
        ("<<", TokenKind::ShiftLeft),
        (">>", TokenKind::ShiftRight),
    ])
});

/// Three char operators
static TRIPLE_TOKENS: Lazy<BTreeMap<&'static str, TokenKind>> = Lazy::new(|| {
    BTreeMap::from([
        ("//=", TokenKind::DoubleSlashEquals),
        ("**=", TokenKind::DoubleAsteriskEquals),
        ("<<=", TokenKind::ShiftLeftEquals),
        (">>=", TokenKind::ShiftRightEquals),
        ("...", TokenKind::Ellipsis),
    ])
});

const STRING_PREFIXES: [&str; 8] = ["f", "b", "r", "u", "rb", "br", "fr", "rf"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn to(self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }
}

impl<'source> Lexer<'source> {
    pub fn new(source: &'source SourceFile) -> Self {
        Self {
            source,
            chars: peek_nth(source.contents.chars()),
            position: 0,
            indentation: vec![0],
            nesting: 0,
            at_line_start: true,
            last_kind: None,
            finished: false,
            pending: VecDeque::new(),
        }
    }

    /// Lexes the whole file. The returned stream always ends with
    /// [`TokenKind::EndOfFile`] and every `Indent` is balanced by a `Dedent`.
    pub fn tokenize(source: &'source SourceFile) -> Result<Vec<Token>> {
        let mut lexer = Self::new(source);
        let mut tokens = Vec::new();

        loop {
            let token = lexer.next()?;
            let done = token.kind == TokenKind::EndOfFile;

            tokens.push(token);

            if done {
                return Ok(tokens);
            }
        }
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn peek_char_nth(&mut self, n: usize) -> Option<char> {
        self.chars.peek_nth(n).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.position += c.len_utf8();
        Some(c)
    }

    fn new_span(&self, start: usize) -> Span {
        Span {
            start,
            end: self.position,
        }
    }

    fn token(&self, kind: TokenKind, start: usize) -> Token {
        Token {
            kind,
            span: self.new_span(start),
        }
    }

    fn syntax_error(&self, start: usize, message: impl Into<String>) -> CompileError {
        CompileError::syntax(self.source, self.new_span(start), message)
    }

    fn ignore_line(&mut self) {
        while let Some(c) = self.peek_char() {
            if c == '\n' {
                break;
            }

            self.bump();
        }
    }

    /// Measures the indentation of a fresh logical line and queues the
    /// `Indent`/`Dedent` tokens it implies. Blank and comment-only lines are
    /// consumed entirely.
    fn read_indentation(&mut self) -> Result<()> {
        let start = self.position;
        let mut width = 0;

        while let Some(c) = self.peek_char() {
            match c {
                ' ' => width += 1,
                '\t' => width = (width / 8 + 1) * 8,
                '\x0c' => width = 0,
                _ => break,
            }

            self.bump();
        }

        match self.peek_char() {
            None => return Ok(()),
            Some('#') | Some('\r') | Some('\n') => {
                self.ignore_line();
                if self.bump().is_some() {
                    self.at_line_start = true;
                }
                return Ok(());
            }
            _ => {}
        }

        let current = self.indentation.last().copied().unwrap_or(0);

        if width > current {
            self.indentation.push(width);
            self.pending.push_back(self.token(TokenKind::Indent, start));
        } else if width < current {
            while self.indentation.last().is_some_and(|level| width < *level) {
                self.indentation.pop();
                self.pending.push_back(self.token(TokenKind::Dedent, self.position));
            }

            if self.indentation.last().copied() != Some(width) {
                return Err(self.syntax_error(
                    start,
                    "unindent does not match any outer indentation level",
                ));
            }
        }

        Ok(())
    }

    /// Queues the tokens that close the file: a final `Newline` if the last
    /// line was unterminated, one `Dedent` per open level, then `EndOfFile`.
    fn finish(&mut self) {
        self.finished = true;

        if self
            .last_kind
            .is_some_and(|kind| !matches!(kind, TokenKind::Newline | TokenKind::Dedent))
        {
            self.pending.push_back(self.token(TokenKind::Newline, self.position));
        }

        while self.indentation.len() > 1 {
            self.indentation.pop();
            self.pending.push_back(self.token(TokenKind::Dedent, self.position));
        }

        self.pending
            .push_back(self.token(TokenKind::EndOfFile, self.position));
    }

    fn read_string(&mut self, quote: char) -> Result<Token> {
        let start_position = self.position;
        let triple = self.peek_char_nth(1) == Some(quote) && self.peek_char_nth(2) == Some(quote);
        let quote_len = if triple { 3 } else { 1 };

        for _ in 0..quote_len {
            self.bump();
        }

        loop {
            let Some(c) = self.bump() else {
                return Err(self.syntax_error(start_position, "unterminated string literal"));
            };

            match c {
                '\\' => {
                    self.bump();
                }
                '\n' if !triple => {
                    return Err(self.syntax_error(start_position, "unterminated string literal"));
                }
                c if c == quote && !triple => break,
                c if c == quote
                    && self.peek_char() == Some(quote)
                    && self.peek_char_nth(1) == Some(quote) =>
                {
                    self.bump();
                    self.bump();
                    break;
                }
                _ => {}
            }
        }

        Ok(self.token(TokenKind::StringLiteral, start_position))
    }

    // Keyword or identifier
    fn read_word(&mut self) -> Result<Token> {
        let start_position = self.position;

        while let Some(c) = self.peek_char() {
            if !(c.is_ascii_alphanumeric() || c == '_') {
                break;
            }

            self.bump();
        }

        let span = self.new_span(start_position);
        let value = self.source.value_of_span(span);

        if matches!(self.peek_char(), Some('"' | '\''))
            && STRING_PREFIXES.contains(&value.to_ascii_lowercase().as_str())
        {
            return Err(CompileError::unsupported(
                self.source,
                span,
                format!("`{value}` prefixed string literal"),
            ));
        }

        let kind = match value.parse() {
            Ok(keyword) => TokenKind::Keyword(keyword),
            Err(_) => TokenKind::Identifier,
        };

        Ok(Token { kind, span })
    }

    fn read_number(&mut self) -> Token {
        let start_position = self.position;
        let mut kind = TokenKind::IntegerLiteral;

        while let Some(c) = self.peek_char() {
            match c {
                '.' if kind == TokenKind::IntegerLiteral => kind = TokenKind::FloatLiteral,
                'e' | 'E' if self.source.contents[start_position..self.position]
                    .chars()
                    .all(|c| c.is_ascii_digit() || c == '_' || c == '.') =>
                {
                    kind = TokenKind::FloatLiteral;

                    if matches!(self.peek_char_nth(1), Some('+' | '-')) {
                        self.bump();
                    }
                }
                c if c.is_ascii_alphanumeric() || c == '_' => {}
                _ => break,
            }

            self.bump();
        }

        self.token(kind, start_position)
    }

    fn read_operator(&mut self, len: usize, kind: TokenKind) -> Token {
        let start_position = self.position;

        for _ in 0..len {
            self.bump();
        }

        self.token(kind, start_position)
    }

    fn lookahead(&mut self, len: usize) -> String {
        (0..len).filter_map(|n| self.peek_char_nth(n)).collect()
    }

    pub fn next(&mut self) -> Result<Token> {
        let token = self.next_inner()?;
        self.last_kind = Some(token.kind);
        Ok(token)
    }

    fn next_inner(&mut self) -> Result<Token> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Ok(token);
            }

            if self.finished {
                return Ok(self.token(TokenKind::EndOfFile, self.position));
            }

            if self.at_line_start && self.nesting == 0 {
                self.at_line_start = false;
                self.read_indentation()?;
                continue;
            }

            let Some(c) = self.peek_char() else {
                self.finish();
                continue;
            };

            let start_position = self.position;

            let token = match c {
                '\n' => {
                    self.bump();

                    if self.nesting > 0 {
                        continue;
                    }

                    self.at_line_start = true;
                    self.token(TokenKind::Newline, start_position)
                }
                // Ignore whitespace
                ' ' | '\t' | '\r' | '\x0c' => {
                    self.bump();
                    continue;
                }
                // Ignore comments
                '#' => {
                    self.ignore_line();
                    continue;
                }
                // Explicit line joining
                '\\' if matches!(self.peek_char_nth(1), Some('\n' | '\r')) => {
                    self.bump();
                    if self.bump() == Some('\r') && self.peek_char() == Some('\n') {
                        self.bump();
                    }
                    continue;
                }

                '"' | '\'' => self.read_string(c)?,

                n if n.is_ascii_digit() => self.read_number(),
                '.' if self.peek_char_nth(1).is_some_and(|c| c.is_ascii_digit()) => {
                    self.read_number()
                }

                a if a.is_ascii_alphabetic() || a == '_' => self.read_word()?,

                _ => {
                    let triple = self.lookahead(3);
                    let double = self.lookahead(2);

                    if let Some(kind) = TRIPLE_TOKENS.get(triple.as_str()) {
                        self.read_operator(3, *kind)
                    } else if let Some(kind) = DOUBLE_TOKENS.get(double.as_str()) {
                        self.read_operator(2, *kind)
                    } else if let Some(kind) = SINGLE_TOKENS.get(&c) {
                        self.read_operator(1, *kind)
                    } else {
                        self.bump();
                        return Err(self.syntax_error(
                            start_position,
                            format!("unexpected character `{c}`"),
                        ));
                    }
                }
            };

            match token.kind {
                TokenKind::OpenParen | TokenKind::OpenBracket | TokenKind::OpenBrace => {
                    self.nesting += 1
                }
                TokenKind::CloseParen | TokenKind::CloseBracket | TokenKind::CloseBrace => {
                    self.nesting = self.nesting.saturating_sub(1)
                }
                _ => {}
            }

            return Ok(token);
        }
    }
}

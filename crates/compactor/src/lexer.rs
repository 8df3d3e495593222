//! Lossless lexer for CSS and JavaScript.
//!
//! Unlike a parser's lexer, this one never skips anything: whitespace and
//! comments come out as tokens of their own, so the concatenated token texts
//! always reproduce the input. It is an iterator and produces tokens lazily.
//!
//! Malformed input never fails. Unterminated strings, comments and templates
//! run to the end of input and leave a diagnostic behind.

use crate::config::Dialect;
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::span::Span;
use crate::token::{
    is_ident_part, is_ident_start, is_keyword, is_line_terminator, is_value_keyword, Token,
    TokenKind,
};

/// Multi-character JavaScript punctuators, longest first.
const PUNCTUATORS: &[&str] = &[
    ">>>=", "...", "===", "!==", "**=", "<<=", ">>=", ">>>", "&&=", "||=", "??=", "=>", "==",
    "!=", "<=", ">=", "&&", "||", "??", "?.", "++", "--", "+=", "-=", "*=", "/=", "%=", "&=",
    "|=", "^=", "<<", ">>", "**",
];

/// Single-character CSS punctuators.
const CSS_PUNCTUATORS: &[char] = &['{', '}', ';', ':', ',', '>', '+', '~', '(', ')', '[', ']', '=', '!'];

/// An open bracket, as far as the lexer needs to know.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bracket {
    /// `(`; `control` when it opens an `if`/`while`/`for`/`with` head.
    Paren { control: bool },
    Square,
    Brace,
    /// `${` inside a template literal.
    Substitution,
}

/// The lexer state.
pub struct Lexer<'a> {
    source: &'a str,
    /// Current byte position.
    pos: usize,
    /// Start position of the current token.
    token_start: usize,
    dialect: Dialect,
    /// Whether a `/` at this point starts a regex rather than a division.
    allow_regex: bool,
    /// Whether the previous significant token was `if`/`while`/`for`/`with`.
    after_control_keyword: bool,
    brackets: Vec<Bracket>,
    diagnostics: Vec<Diagnostic>,
    finished: bool,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source code.
    pub fn new(source: &'a str, dialect: Dialect) -> Self {
        Self {
            source,
            pos: 0,
            token_start: 0,
            dialect,
            allow_regex: true, // At start of input, regex is allowed
            after_control_keyword: false,
            brackets: Vec::new(),
            diagnostics: Vec::new(),
            finished: false,
        }
    }

    /// Diagnostics recorded so far.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Consume the lexer, keeping only its diagnostics.
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// Get the next token; `Eof` is produced exactly once.
    pub fn next_token(&mut self) -> Option<Token<'a>> {
        if self.finished {
            return None;
        }
        self.token_start = self.pos;
        if self.is_eof() {
            self.finished = true;
            return Some(self.make_token(TokenKind::Eof));
        }

        let kind = match self.dialect {
            Dialect::Js => self.scan_js(),
            Dialect::Css => self.scan_css(),
        };
        let token = self.make_token(kind);
        if self.dialect == Dialect::Js && !token.is_trivia() {
            self.update_context(&token);
        }
        Some(token)
    }

    // === Helper methods ===

    fn is_eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn current(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.source[self.pos..].chars().nth(n)
    }

    fn at(&self, text: &str) -> bool {
        self.source[self.pos..].starts_with(text)
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.current()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn advance_n(&mut self, n: usize) {
        for _ in 0..n {
            if self.advance().is_none() {
                break;
            }
        }
    }

    fn make_token(&self, kind: TokenKind) -> Token<'a> {
        Token::new(
            kind,
            &self.source[self.token_start..self.pos],
            Span::new(self.token_start as u32, self.pos as u32),
        )
    }

    fn report(&mut self, kind: DiagnosticKind, message: &str) {
        let span = Span::new(self.token_start as u32, self.pos as u32);
        self.diagnostics.push(Diagnostic::new(kind, span, message));
    }

    // === Shared scanners ===

    fn scan_whitespace(&mut self) -> TokenKind {
        while let Some(c) = self.current() {
            if !is_whitespace(c) {
                break;
            }
            self.advance();
        }
        TokenKind::Whitespace
    }

    fn scan_line_comment(&mut self) -> TokenKind {
        while let Some(c) = self.current() {
            if is_line_terminator(c) {
                break;
            }
            self.advance();
        }
        TokenKind::LineComment
    }

    fn scan_block_comment(&mut self) -> TokenKind {
        self.advance_n(2); // Skip /*
        loop {
            if self.is_eof() {
                self.report(DiagnosticKind::UnterminatedComment, "unterminated block comment");
                break;
            }
            if self.at("*/") {
                self.advance_n(2);
                break;
            }
            self.advance();
        }
        TokenKind::BlockComment
    }

    fn scan_string(&mut self, quote: char) -> TokenKind {
        self.advance(); // Skip opening quote
        loop {
            match self.advance() {
                None => {
                    self.report(DiagnosticKind::UnterminatedString, "unterminated string literal");
                    break;
                }
                Some('\\') => {
                    // Line continuations swallow a whole CRLF.
                    if self.at("\r\n") {
                        self.advance_n(2);
                    } else {
                        self.advance();
                    }
                }
                Some(c) if c == quote => break,
                Some(_) => {}
            }
        }
        TokenKind::String
    }

    // === JavaScript ===

    fn scan_js(&mut self) -> TokenKind {
        let Some(ch) = self.current() else {
            return TokenKind::Eof;
        };
        match ch {
            c if is_whitespace(c) => self.scan_whitespace(),
            '/' if self.peek_nth(1) == Some('/') => self.scan_line_comment(),
            '/' if self.peek_nth(1) == Some('*') => self.scan_block_comment(),
            '#' if self.pos == 0 && self.peek_nth(1) == Some('!') => self.scan_line_comment(),
            '\\' if self.peek_nth(1) != Some('u') => {
                self.advance();
                TokenKind::Punctuator
            }
            c if is_ident_start(c) => self.scan_identifier(),
            '0'..='9' => self.scan_number(),
            '.' if self.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) => self.scan_number(),
            '"' | '\'' => self.scan_string(ch),
            '`' => self.scan_template(false),
            '}' if self.closes_substitution() => self.scan_template(true),
            '/' if self.allow_regex => self.scan_regex(),
            _ => self.scan_punctuator(),
        }
    }

    fn scan_identifier(&mut self) -> TokenKind {
        while let Some(c) = self.current() {
            if c == '\\' {
                if self.peek_nth(1) != Some('u') {
                    break;
                }
                self.advance_n(2);
                if self.current() == Some('{') {
                    while let Some(c) = self.advance() {
                        if c == '}' {
                            break;
                        }
                    }
                } else {
                    for _ in 0..4 {
                        match self.current() {
                            Some(c) if c.is_ascii_hexdigit() => {
                                self.advance();
                            }
                            _ => break,
                        }
                    }
                }
            } else if is_ident_part(c) {
                self.advance();
            } else {
                break;
            }
        }

        let word = &self.source[self.token_start..self.pos];
        if is_keyword(word) {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        }
    }

    fn scan_number(&mut self) -> TokenKind {
        // Handle different number formats
        if self.current() == Some('0')
            && matches!(self.peek_nth(1), Some('x' | 'X' | 'o' | 'O' | 'b' | 'B'))
        {
            self.advance_n(2);
            while self.current().is_some_and(|c| c.is_ascii_hexdigit() || c == '_') {
                self.advance();
            }
        } else {
            self.scan_digits();
            if self.current() == Some('.') {
                self.advance();
                self.scan_digits();
            }
            if matches!(self.current(), Some('e' | 'E')) {
                let sign = matches!(self.peek_nth(1), Some('+' | '-'));
                let digit_at = if sign { 2 } else { 1 };
                if self.peek_nth(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                    self.advance_n(digit_at);
                    self.scan_digits();
                }
            }
        }

        // BigInt suffix
        if self.current() == Some('n') {
            self.advance();
        }
        TokenKind::Number
    }

    fn scan_digits(&mut self) {
        while self.current().is_some_and(|c| c.is_ascii_digit() || c == '_') {
            self.advance();
        }
    }

    /// Scan a template chunk starting at `` ` `` (head) or `}` (continuation).
    fn scan_template(&mut self, continuation: bool) -> TokenKind {
        self.advance(); // Skip ` or }
        loop {
            match self.advance() {
                None => {
                    self.report(DiagnosticKind::UnterminatedTemplate, "unterminated template literal");
                    if continuation {
                        self.brackets.pop();
                    }
                    break;
                }
                Some('\\') => {
                    self.advance();
                }
                Some('`') => {
                    if continuation {
                        self.brackets.pop();
                    }
                    break;
                }
                Some('$') if self.current() == Some('{') => {
                    self.advance();
                    if !continuation {
                        self.brackets.push(Bracket::Substitution);
                    }
                    break;
                }
                Some(_) => {}
            }
        }
        TokenKind::Template
    }

    fn closes_substitution(&self) -> bool {
        self.brackets
            .iter()
            .rev()
            .find(|b| matches!(b, Bracket::Brace | Bracket::Substitution))
            .is_some_and(|b| *b == Bracket::Substitution)
    }

    /// Scan a regex literal, falling back to the division operator when the
    /// literal runs into a line terminator or the end of input.
    fn scan_regex(&mut self) -> TokenKind {
        self.advance(); // Skip opening /
        let mut in_class = false;
        loop {
            match self.current() {
                None => break,
                Some(c) if is_line_terminator(c) => break,
                Some('\\') => {
                    self.advance();
                    match self.current() {
                        Some(c) if !is_line_terminator(c) => {
                            self.advance();
                        }
                        _ => break,
                    }
                }
                Some('[') => {
                    in_class = true;
                    self.advance();
                }
                Some(']') => {
                    in_class = false;
                    self.advance();
                }
                Some('/') if !in_class => {
                    self.advance();
                    // Scan flags
                    while self.current().is_some_and(is_ident_part) {
                        self.advance();
                    }
                    return TokenKind::Regex;
                }
                Some(_) => {
                    self.advance();
                }
            }
        }

        // Not a regex after all
        self.pos = self.token_start;
        self.scan_punctuator()
    }

    fn scan_punctuator(&mut self) -> TokenKind {
        let rest = &self.source[self.pos..];
        let matched = PUNCTUATORS.iter().find(|p| rest.starts_with(**p)).filter(|p| {
            // `a?.5:b` is a conditional, not optional chaining
            **p != "?." || !rest[2..].starts_with(|c: char| c.is_ascii_digit())
        });
        match matched {
            Some(p) => self.pos += p.len(),
            None => {
                self.advance();
            }
        }
        TokenKind::Punctuator
    }

    /// Track brackets and the regex/division context after a significant token.
    fn update_context(&mut self, token: &Token<'a>) {
        let mut control = false;
        self.allow_regex = match token.kind {
            TokenKind::Identifier | TokenKind::Number | TokenKind::String | TokenKind::Regex => false,
            TokenKind::Template => token.text.ends_with("${"),
            TokenKind::Keyword => {
                control = matches!(token.text, "if" | "while" | "for" | "with");
                !is_value_keyword(token.text)
            }
            TokenKind::Punctuator => match token.text {
                "(" => {
                    self.brackets.push(Bracket::Paren {
                        control: self.after_control_keyword,
                    });
                    true
                }
                ")" => matches!(self.pop_bracket(|b| matches!(b, Bracket::Paren { .. })),
                    Some(Bracket::Paren { control: true })),
                "[" => {
                    self.brackets.push(Bracket::Square);
                    true
                }
                "]" => {
                    self.pop_bracket(|b| b == Bracket::Square);
                    false
                }
                "{" => {
                    self.brackets.push(Bracket::Brace);
                    true
                }
                "}" => {
                    self.pop_bracket(|b| b == Bracket::Brace);
                    true
                }
                "++" | "--" => false,
                _ => true,
            },
            _ => self.allow_regex,
        };
        self.after_control_keyword = control;
    }

    /// Pop up to and including the nearest bracket accepted by `wanted`.
    /// Leaves the stack alone when there is none.
    fn pop_bracket(&mut self, wanted: impl Fn(Bracket) -> bool) -> Option<Bracket> {
        let idx = self.brackets.iter().rposition(|b| wanted(*b))?;
        let found = self.brackets[idx];
        self.brackets.truncate(idx);
        Some(found)
    }

    // === CSS ===

    fn scan_css(&mut self) -> TokenKind {
        let Some(ch) = self.current() else {
            return TokenKind::Eof;
        };
        match ch {
            c if is_whitespace(c) => self.scan_whitespace(),
            '/' if self.peek_nth(1) == Some('*') => self.scan_block_comment(),
            '"' | '\'' => self.scan_string(ch),
            c if CSS_PUNCTUATORS.contains(&c) => {
                self.advance();
                TokenKind::Punctuator
            }
            _ => self.scan_css_word(),
        }
    }

    fn scan_css_word(&mut self) -> TokenKind {
        while let Some(c) = self.current() {
            if is_whitespace(c) || CSS_PUNCTUATORS.contains(&c) || c == '"' || c == '\'' {
                break;
            }
            if self.at("/*") {
                break;
            }
            self.advance();
            if c == '\\' {
                self.advance();
            }
        }

        let word = &self.source[self.token_start..self.pos];
        if word.eq_ignore_ascii_case("url") && self.current() == Some('(') && !self.quoted_url() {
            // Unquoted url(...) may contain characters that are punctuators elsewhere.
            while let Some(c) = self.advance() {
                match c {
                    '\\' => {
                        self.advance();
                    }
                    ')' => break,
                    _ => {}
                }
            }
            return TokenKind::String;
        }
        TokenKind::Identifier
    }

    /// At `(` after `url`: is the argument a quoted string?
    fn quoted_url(&self) -> bool {
        self.source[self.pos + 1..]
            .trim_start_matches(is_whitespace)
            .starts_with(['"', '\''])
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        self.next_token()
    }
}

/// Tokenize a whole input, `Eof` included.
pub fn tokenize(source: &str, dialect: Dialect) -> Vec<Token<'_>> {
    Lexer::new(source, dialect).collect()
}

fn is_whitespace(c: char) -> bool {
    c.is_whitespace() || c == '\u{feff}'
}

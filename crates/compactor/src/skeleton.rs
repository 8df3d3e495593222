//! Minimal structural pass over JavaScript tokens.
//!
//! The minifier does not build an AST. What both the scope analyzer and the
//! printer need to know is much smaller:
//! - which brackets match,
//! - what each `{` opens (block, function body, object literal, ...),
//! - which parentheses are control-statement heads,
//! - where arrow-function bodies end,
//! - where a line terminator sits between two tokens and whether automatic
//!   semicolon insertion depends on it.
//!
//! Everything here is indexed by *significant* token position (trivia and
//! `Eof` excluded).

use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::token::{is_value_keyword, Token, TokenKind};
use rustc_hash::FxHashMap;

/// What a `{ ... }` pair delimits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BraceKind {
    /// Statement block: `if (a) { ... }`, `{ ... }`, `try { ... }`.
    Block,
    /// Body of a function, method or arrow function.
    FunctionBody,
    /// Object literal (or object destructuring pattern).
    Object,
    /// Body of a class.
    ClassBody,
    /// Body of a `switch`.
    Switch,
}

/// Structural facts about a token stream.
pub struct Skeleton<'a> {
    tokens: Vec<Token<'a>>,
    /// Full-stream index of each significant token.
    significant: Vec<usize>,
    matching: Vec<Option<usize>>,
    /// Innermost open bracket enclosing each token.
    container: Vec<Option<usize>>,
    brace_kinds: Vec<Option<BraceKind>>,
    /// Keyword owning a parenthesized head, for both `(` and `)`.
    heads: Vec<Option<&'a str>>,
    newline_before: Vec<bool>,
    /// `=>` position to the last token of its body.
    arrow_ends: FxHashMap<usize, usize>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Skeleton<'a> {
    /// Analyze a complete token stream as produced by the lexer.
    pub fn new(tokens: Vec<Token<'a>>) -> Self {
        let mut significant = Vec::with_capacity(tokens.len() / 2);
        let mut newline_before = Vec::with_capacity(tokens.len() / 2);
        let mut saw_newline = false;
        for (index, token) in tokens.iter().enumerate() {
            if token.is_trivia() {
                saw_newline |= token.has_newline();
                continue;
            }
            if token.kind == TokenKind::Eof {
                break;
            }
            significant.push(index);
            newline_before.push(saw_newline);
            saw_newline = false;
        }

        let len = significant.len();
        let mut skeleton = Self {
            tokens,
            significant,
            matching: vec![None; len],
            container: vec![None; len],
            brace_kinds: vec![None; len],
            heads: vec![None; len],
            newline_before,
            arrow_ends: FxHashMap::default(),
            diagnostics: Vec::new(),
        };
        skeleton.match_brackets();
        skeleton.find_arrow_ends();
        skeleton
    }

    /// All tokens, trivia included.
    pub fn tokens(&self) -> &[Token<'a>] {
        &self.tokens
    }

    /// Number of significant tokens.
    pub fn len(&self) -> usize {
        self.significant.len()
    }

    /// Structural diagnostics (unbalanced brackets).
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Significant token `i`.
    #[inline]
    pub fn token(&self, i: usize) -> &Token<'a> {
        &self.tokens[self.significant[i]]
    }

    /// Significant token `i`, if it exists.
    #[inline]
    pub fn get(&self, i: usize) -> Option<&Token<'a>> {
        self.significant.get(i).map(|&t| &self.tokens[t])
    }

    /// Text of significant token `i`, or `""` past the end.
    #[inline]
    pub fn text(&self, i: usize) -> &'a str {
        self.get(i).map_or("", |t| t.text)
    }

    #[inline]
    pub fn is_punct(&self, i: usize, text: &str) -> bool {
        self.get(i).is_some_and(|t| t.is_punct(text))
    }

    #[inline]
    pub fn is_keyword(&self, i: usize, text: &str) -> bool {
        self.get(i).is_some_and(|t| t.is_keyword(text))
    }

    #[inline]
    pub fn kind(&self, i: usize) -> Option<TokenKind> {
        self.get(i).map(|t| t.kind)
    }

    /// Matching bracket of significant token `i`.
    #[inline]
    pub fn matching(&self, i: usize) -> Option<usize> {
        self.matching.get(i).copied().flatten()
    }

    /// Innermost open bracket enclosing `i`.
    #[inline]
    pub fn container(&self, i: usize) -> Option<usize> {
        self.container.get(i).copied().flatten()
    }

    /// Kind of the brace pair `i` belongs to (either end).
    #[inline]
    pub fn brace_kind(&self, i: usize) -> Option<BraceKind> {
        self.brace_kinds.get(i).copied().flatten()
    }

    /// Kind of the braces directly enclosing `i`.
    pub fn enclosing_brace(&self, i: usize) -> Option<BraceKind> {
        self.container(i).and_then(|c| self.brace_kind(c))
    }

    /// Keyword owning the parenthesized head `i` belongs to, e.g. `"for"`.
    #[inline]
    pub fn head(&self, i: usize) -> Option<&'a str> {
        self.heads.get(i).copied().flatten()
    }

    /// `)` closing an `if`/`for`/`while`/`with` head: a statement follows.
    pub fn closes_control_head(&self, i: usize) -> bool {
        self.is_punct(i, ")") && matches!(self.head(i), Some("if" | "for" | "while" | "with"))
    }

    /// Whether token `i` sits directly inside a `for (...)` head.
    pub fn in_for_head(&self, i: usize) -> bool {
        self.container(i).is_some_and(|c| self.head(c) == Some("for"))
    }

    /// Whether a line terminator separates `i` from the previous token.
    #[inline]
    pub fn newline_before(&self, i: usize) -> bool {
        self.newline_before.get(i).copied().unwrap_or(false)
    }

    /// Last token of the arrow-function body introduced by `=>` at `i`.
    pub fn arrow_end(&self, i: usize) -> Option<usize> {
        self.arrow_ends.get(&i).copied()
    }

    /// Token `i` ends an expression: a following `/` divides, and a
    /// following statement-starting token on a new line triggers ASI.
    pub fn ends_expression(&self, i: usize) -> bool {
        let Some(token) = self.get(i) else {
            return false;
        };
        match token.kind {
            TokenKind::Identifier | TokenKind::Number | TokenKind::String | TokenKind::Regex => true,
            TokenKind::Template => token.text.ends_with('`'),
            TokenKind::Keyword => is_value_keyword(token.text),
            TokenKind::Punctuator => match token.text {
                ")" | "]" | "++" | "--" => true,
                // A statement block ends its statement already.
                "}" => !matches!(self.brace_kind(i), Some(BraceKind::Block | BraceKind::Switch)),
                _ => false,
            },
            _ => false,
        }
    }

    /// Whether the line terminator before `i` must be kept because automatic
    /// semicolon insertion depends on it.
    pub fn asi_boundary(&self, i: usize) -> bool {
        if i == 0 || !self.newline_before(i) {
            return false;
        }
        let prev = self.token(i - 1);
        let next = self.token(i);

        // Restricted productions: `return\nx` is `return; x`.
        if matches!(prev.text, "return" | "break" | "continue" | "throw")
            && prev.kind == TokenKind::Keyword
            || prev.kind == TokenKind::Identifier && prev.text == "yield"
        {
            return !(next.is_punct(";") || next.is_punct("}"));
        }
        if !self.ends_expression(i - 1) || self.closes_control_head(i - 1) {
            return false;
        }

        let after_brace = prev.is_punct("}");
        match next.kind {
            TokenKind::Identifier | TokenKind::Number | TokenKind::String | TokenKind::Regex => true,
            // A template after an expression is a tagged template.
            TokenKind::Template => false,
            TokenKind::Keyword => match next.text {
                "in" | "instanceof" => false,
                "else" | "while" | "catch" | "finally" => !after_brace,
                _ => true,
            },
            TokenKind::Punctuator => match next.text {
                "++" | "--" | "!" | "~" => true,
                "{" => !after_brace && !prev.is_punct(")"),
                _ => false,
            },
            _ => false,
        }
    }

    /// Whether a statement can begin at `i`.
    pub fn is_statement_start(&self, i: usize) -> bool {
        if i == 0 {
            return true;
        }
        let prev = self.token(i - 1);
        match prev.kind {
            TokenKind::Punctuator => match prev.text {
                ";" | "}" => true,
                "{" => !matches!(self.brace_kind(i - 1), Some(BraceKind::Object)),
                ")" => self.closes_control_head(i - 1) || self.asi_boundary(i),
                ":" => self.is_statement_colon(i - 1),
                _ => self.asi_boundary(i),
            },
            TokenKind::Keyword => matches!(prev.text, "else" | "do"),
            _ => self.asi_boundary(i),
        }
    }

    /// `:` at `i` ends a label or a `case`/`default` clause.
    pub fn is_statement_colon(&self, i: usize) -> bool {
        match self.enclosing_brace(i) {
            Some(BraceKind::Object | BraceKind::ClassBody) => return false,
            None if self.container(i).is_some() => return false, // inside ( or [
            _ => {}
        }
        // Label: `name:` at the start of a statement.
        if i >= 1 && self.kind(i - 1) == Some(TokenKind::Identifier) && self.is_statement_start(i - 1) {
            return true;
        }
        // Walk back over the clause looking for `case`/`default` or a ternary `?`.
        let mut j = i;
        while j > 0 {
            j -= 1;
            let token = self.token(j);
            if token.kind == TokenKind::Punctuator {
                match token.text {
                    ")" | "]" => match self.matching(j) {
                        Some(open) => {
                            j = open;
                            continue;
                        }
                        None => return false,
                    },
                    "}" => match self.matching(j) {
                        Some(open) if self.brace_kind(j) == Some(BraceKind::Object) => {
                            j = open;
                            continue;
                        }
                        _ => return false,
                    },
                    "?" => return false,
                    ";" | "{" => return false,
                    _ => {}
                }
            } else if token.is_keyword("case") || token.is_keyword("default") {
                return true;
            }
        }
        false
    }

    // === Construction passes ===

    fn match_brackets(&mut self) {
        let mut stack: Vec<usize> = Vec::new();
        let mut pending_class: Option<Option<usize>> = None;

        for i in 0..self.len() {
            let token = *self.token(i);
            self.container[i] = stack.last().copied();

            if token.is_keyword("class") && !self.is_punct(i.wrapping_sub(1), ".") {
                pending_class = Some(stack.last().copied());
            }
            if token.kind != TokenKind::Punctuator {
                continue;
            }

            match token.text {
                "(" | "[" | "{" => {
                    if token.text == "(" {
                        let prev = i.checked_sub(1).map(|p| *self.token(p));
                        self.heads[i] = prev
                            .filter(|p| p.kind == TokenKind::Keyword)
                            .map(|p| p.text)
                            .filter(|k| matches!(*k, "if" | "for" | "while" | "with" | "switch" | "catch"));
                    } else if token.text == "{" {
                        let kind = if pending_class == Some(stack.last().copied()) {
                            pending_class = None;
                            BraceKind::ClassBody
                        } else {
                            self.classify_brace(i)
                        };
                        self.brace_kinds[i] = Some(kind);
                    }
                    stack.push(i);
                }
                ")" | "]" | "}" => {
                    let opener = match token.text {
                        ")" => "(",
                        "]" => "[",
                        _ => "{",
                    };
                    let Some(depth) = stack.iter().rposition(|&o| self.token(o).text == opener) else {
                        self.unbalanced(i);
                        continue;
                    };
                    for &unclosed in &stack[depth + 1..] {
                        self.diagnostics.push(Diagnostic::new(
                            DiagnosticKind::UnbalancedBracket,
                            self.token(unclosed).span,
                            format!("unclosed `{}`", self.token(unclosed).text),
                        ));
                    }
                    let open = stack[depth];
                    stack.truncate(depth);
                    self.container[i] = stack.last().copied();
                    self.matching[open] = Some(i);
                    self.matching[i] = Some(open);
                    self.brace_kinds[i] = self.brace_kinds[open];
                    self.heads[i] = self.heads[open];
                }
                _ => {}
            }
        }

        for open in stack {
            self.unbalanced(open);
        }
    }

    fn unbalanced(&mut self, i: usize) {
        let token = self.token(i);
        let diagnostic = Diagnostic::new(
            DiagnosticKind::UnbalancedBracket,
            token.span,
            format!("unbalanced `{}`", token.text),
        );
        self.diagnostics.push(diagnostic);
    }

    fn classify_brace(&self, i: usize) -> BraceKind {
        let Some(p) = i.checked_sub(1) else {
            return BraceKind::Block;
        };
        let prev = self.token(p);
        match prev.kind {
            TokenKind::Punctuator => match prev.text {
                ")" => match self.head(p) {
                    Some("switch") => BraceKind::Switch,
                    Some(_) => BraceKind::Block,
                    None => BraceKind::FunctionBody,
                },
                "=>" => BraceKind::FunctionBody,
                ";" | "}" => BraceKind::Block,
                "{" => match self.brace_kind(p) {
                    Some(BraceKind::Object) => BraceKind::Object,
                    _ => BraceKind::Block,
                },
                ":" if self.is_statement_colon(p) => BraceKind::Block,
                _ => BraceKind::Object,
            },
            TokenKind::Keyword if matches!(prev.text, "else" | "do" | "try" | "catch" | "finally") => BraceKind::Block,
            _ => BraceKind::Object,
        }
    }

    fn find_arrow_ends(&mut self) {
        let last = self.len().saturating_sub(1);
        for i in 0..self.len() {
            if !self.is_punct(i, "=>") {
                continue;
            }
            let end = if self.is_punct(i + 1, "{") {
                self.matching(i + 1).unwrap_or(last)
            } else {
                self.expression_end(i + 1)
            };
            self.arrow_ends.insert(i, end);
        }
    }

    /// Last token of the assignment expression starting at `start`.
    pub fn expression_end(&self, start: usize) -> usize {
        let mut j = start;
        while j < self.len() {
            let token = self.token(j);
            if j > start && self.asi_boundary(j) {
                return j - 1;
            }
            if token.kind == TokenKind::Punctuator {
                match token.text {
                    "(" | "[" | "{" => match self.matching(j) {
                        Some(close) => j = close,
                        None => return self.len() - 1,
                    },
                    ")" | "]" | "}" | "," | ";" => return j.saturating_sub(1).max(start),
                    _ => {}
                }
            }
            j += 1;
        }
        self.len().saturating_sub(1)
    }
}

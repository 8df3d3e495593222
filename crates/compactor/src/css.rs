//! CSS printer.
//!
//! Drops comments (except `/*!` ones) and collapses whitespace down to the
//! single spaces the grammar needs. Selectors and declaration values differ:
//! `a > b` becomes `a>b`, but `calc(1px + 2px)` keeps its spaces.

use crate::config::CompressionConfig;
use crate::token::{Token, TokenKind};

/// What a `{ ... }` block contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    /// Top level, `@media`, `@supports`, keyframes: a list of rules.
    Rules,
    /// A style rule, `@font-face`, `@page`: declarations.
    Declarations,
}

#[derive(Debug)]
struct Block {
    context: Context,
    /// Output offset where the rule's prelude starts.
    start: usize,
    /// Output offset just after `{`.
    body: usize,
}

/// The selector or at-rule text before a `{`.
#[derive(Debug, Default)]
struct Prelude {
    start: Option<usize>,
    at_rule: bool,
    /// The at-rule's block holds rules rather than declarations.
    nested_rules: bool,
}

/// Print CSS tokens with the given settings.
pub fn print(tokens: &[Token<'_>], config: &CompressionConfig) -> String {
    let mut printer = CssPrinter::new(config);
    for token in tokens {
        match token.kind {
            TokenKind::Eof => break,
            _ if token.is_preserved_comment() => printer.emit(token.text),
            _ if token.is_trivia() => printer.needs_space = true,
            _ => printer.print_token(token),
        }
    }
    printer.output
}

struct CssPrinter<'c> {
    config: &'c CompressionConfig,
    output: String,
    column: usize,
    needs_space: bool,
    needs_newline: bool,
    stack: Vec<Block>,
    prelude: Prelude,
    parens: usize,
}

impl<'c> CssPrinter<'c> {
    fn new(config: &'c CompressionConfig) -> Self {
        Self {
            config,
            output: String::new(),
            column: 0,
            needs_space: false,
            needs_newline: false,
            stack: Vec::new(),
            prelude: Prelude::default(),
            parens: 0,
        }
    }

    fn context(&self) -> Context {
        self.stack.last().map_or(Context::Rules, |b| b.context)
    }

    /// Inside a selector, where combinators lose their spaces.
    fn in_selector(&self) -> bool {
        self.context() == Context::Rules && self.prelude.start.is_some() && !self.prelude.at_rule
    }

    fn write(&mut self, s: &str) {
        match s.rfind('\n') {
            Some(pos) => self.column = s[pos + 1..].chars().count(),
            None => self.column += s.chars().count(),
        }
        self.output.push_str(s);
    }

    fn emit(&mut self, text: &str) {
        if self.needs_newline {
            if !self.output.is_empty() {
                self.write("\n");
            }
            self.needs_newline = false;
        } else if self.needs_space && self.space_between(text) {
            self.write(" ");
        }
        self.needs_space = false;
        self.write(text);
    }

    /// Whether whitespace seen in the source between the last output and
    /// `next` has to be kept as one space.
    fn space_between(&self, next: &str) -> bool {
        let (Some(last), Some(first)) = (self.output.chars().next_back(), next.chars().next()) else {
            return false;
        };
        let selector = self.in_selector();
        if matches!(last, '{' | '}' | ';' | ',' | '(' | '[' | '=' | '!' | ':') {
            return false;
        }
        if selector && matches!(last, '>' | '+' | '~') {
            return false;
        }
        match first {
            '{' | '}' | ';' | ',' | ')' | ']' | '=' | '!' => false,
            ':' => !(self.context() == Context::Declarations || self.prelude.at_rule && self.parens > 0),
            '>' | '+' | '~' => !selector,
            _ => true,
        }
    }

    fn print_token(&mut self, token: &Token<'_>) {
        let text = token.text;
        let punct = (token.kind == TokenKind::Punctuator).then_some(text);

        if !matches!(punct, Some("{" | "}" | ";")) && self.context() == Context::Rules && self.prelude.start.is_none() {
            self.prelude.start = Some(self.output.len());
            if let Some(name) = text.strip_prefix('@') {
                self.prelude.at_rule = true;
                self.prelude.nested_rules = holds_rules(name);
            }
        }

        match punct {
            Some("{") => self.open_block(),
            Some("}") => self.close_block(),
            Some(";") => {
                if self.output.is_empty() || self.output.ends_with([';', '{']) {
                    self.needs_space = false;
                    return;
                }
                self.emit(";");
                if self.context() == Context::Rules {
                    self.prelude = Prelude::default();
                }
            }
            Some("(") => {
                self.emit("(");
                self.parens += 1;
            }
            Some(")") => {
                self.emit(")");
                self.parens = self.parens.saturating_sub(1);
            }
            _ => self.emit(text),
        }
    }

    fn open_block(&mut self) {
        let start = self.prelude.start.unwrap_or(self.output.len());
        let context = if self.context() == Context::Rules && self.prelude.nested_rules {
            Context::Rules
        } else {
            Context::Declarations
        };
        self.emit("{");
        self.stack.push(Block {
            context,
            start,
            body: self.output.len(),
        });
        self.prelude = Prelude::default();
        self.parens = 0;
    }

    fn close_block(&mut self) {
        let Some(block) = self.stack.pop() else {
            self.emit("}");
            return;
        };
        self.prelude = Prelude::default();
        if self.output.len() == block.body {
            // Empty rule: drop it along with its prelude.
            self.output.truncate(block.start);
            self.column = match self.output.rfind('\n') {
                Some(pos) => self.output[pos + 1..].chars().count(),
                None => self.output.chars().count(),
            };
            self.needs_space = false;
            if self.output.ends_with('}') {
                self.rule_boundary();
            }
            return;
        }
        self.emit("}");
        self.rule_boundary();
    }

    fn rule_boundary(&mut self) {
        if let Some(limit) = self.config.line_break {
            if self.column >= limit as usize {
                self.needs_newline = true;
            }
        }
    }
}

/// At-rules whose block contains rules, vendor prefixes ignored.
fn holds_rules(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    let unprefixed = match name.strip_prefix('-') {
        Some(rest) => rest.split_once('-').map_or(rest, |(_, n)| n),
        None => &name,
    };
    matches!(
        unprefixed,
        "media" | "supports" | "document" | "container" | "layer" | "scope" | "keyframes" | "starting-style"
    )
}

//! JavaScript printer.
//!
//! Re-emits the significant tokens of a [`Skeleton`] with the least
//! whitespace that keeps the program's meaning:
//! - a space only where two tokens would otherwise fuse,
//! - a newline only where automatic semicolon insertion depends on it,
//! - statement semicolons before `}` dropped unless asked to keep them.

use crate::config::CompressionConfig;
use crate::mangle::RenameMap;
use crate::scope::{Role, ScopeAnalysis};
use crate::skeleton::{BraceKind, Skeleton};
use crate::token::{is_ident_part, is_identifier_name, is_reserved, TokenKind};

/// Scope analysis and final names, present when munging.
pub type Munge<'s, 'a> = (&'s ScopeAnalysis<'a>, &'s RenameMap<'a>);

/// Print a JavaScript skeleton with the given settings.
pub fn print<'a>(skeleton: &Skeleton<'a>, config: &CompressionConfig, munge: Option<Munge<'_, 'a>>) -> String {
    Printer::new(skeleton, config, munge).generate()
}

/// The JavaScript printer.
pub struct Printer<'s, 'a> {
    sk: &'s Skeleton<'a>,
    config: &'s CompressionConfig,
    munge: Option<Munge<'s, 'a>>,
    /// Output buffer.
    output: String,
    /// Characters since the last newline.
    column: usize,
    /// A statement semicolon not written yet; dropped if `}` follows.
    needs_semicolon: bool,
    /// A line break to write before the next token.
    needs_newline: bool,
    /// The last token written was a decimal integer, which would absorb a
    /// following `.` as its fraction.
    after_integer: bool,
    /// Significant index of the last token written.
    last_emitted: Option<usize>,
    /// Significant tokens before this index were already consumed.
    skip_to: usize,
}

impl<'s, 'a> Printer<'s, 'a> {
    pub fn new(sk: &'s Skeleton<'a>, config: &'s CompressionConfig, munge: Option<Munge<'s, 'a>>) -> Self {
        Self {
            sk,
            config,
            munge,
            output: String::new(),
            column: 0,
            needs_semicolon: false,
            needs_newline: false,
            after_integer: false,
            last_emitted: None,
            skip_to: 0,
        }
    }

    /// Generate the compressed source.
    pub fn generate(mut self) -> String {
        let sk = self.sk;
        let mut next = 0;
        for (index, token) in sk.tokens().iter().enumerate() {
            match token.kind {
                TokenKind::Eof => break,
                TokenKind::LineComment if index == 0 && token.text.starts_with("#!") => {
                    self.write(token.text);
                    self.write("\n");
                }
                _ if token.is_preserved_comment() => self.emit_comment(token.text),
                _ if token.is_trivia() => {}
                _ => {
                    self.print_token(next);
                    next += 1;
                }
            }
        }
        if self.needs_semicolon {
            self.write(";");
        }
        self.output
    }

    // =========================================================================
    // Output primitives
    // =========================================================================

    fn write(&mut self, s: &str) {
        match s.rfind('\n') {
            Some(pos) => self.column = s[pos + 1..].chars().count(),
            None => self.column += s.chars().count(),
        }
        self.output.push_str(s);
    }

    /// Write significant token `i` (or its replacement text).
    fn emit(&mut self, i: usize, s: &str) {
        let asi = i > 0 && self.last_emitted == Some(i - 1) && self.sk.asi_boundary(i);
        if self.needs_semicolon {
            self.write(";");
            self.needs_semicolon = false;
        } else if asi {
            self.needs_newline = true;
        }

        if self.needs_newline {
            if !self.output.is_empty() {
                self.write("\n");
            }
            self.needs_newline = false;
        } else if self.needs_space(s) {
            self.write(" ");
        }

        self.write(s);
        self.after_integer = self.sk.kind(i) == Some(TokenKind::Number) && is_decimal_integer(s);
        self.last_emitted = Some(i);
    }

    fn emit_comment(&mut self, text: &str) {
        if self.needs_semicolon {
            self.write(";");
            self.needs_semicolon = false;
        }
        self.write(text);
        self.after_integer = false;
    }

    /// Whether `next` would fuse with what was written last.
    fn needs_space(&self, next: &str) -> bool {
        let (Some(last), Some(first)) = (self.output.chars().next_back(), next.chars().next()) else {
            return false;
        };
        if is_ident_part(last) && is_ident_part(first) {
            return true;
        }
        match (last, first) {
            ('+', '+') | ('-', '-') | ('/', '/' | '*') | ('<', '!') => true,
            (_, '.') => self.after_integer,
            _ => false,
        }
    }

    /// Schedule a newline once the statement that just ended went past the
    /// configured column.
    fn statement_boundary(&mut self) {
        if let Some(limit) = self.config.line_break {
            if !self.output.is_empty() && self.column >= limit as usize {
                self.needs_newline = true;
            }
        }
    }

    // =========================================================================
    // Tokens
    // =========================================================================

    fn print_token(&mut self, i: usize) {
        if i < self.skip_to {
            return;
        }
        let token = *self.sk.token(i);
        match token.kind {
            TokenKind::Punctuator => match token.text {
                ";" => self.print_semicolon(i),
                "}" => {
                    if !self.config.preserve_semicolons {
                        self.needs_semicolon = false;
                    }
                    self.emit(i, "}");
                }
                "[" if self.config.optimize => match self.dot_access(i) {
                    Some(name) => {
                        let access = format!(".{name}");
                        self.emit(i, &access);
                        self.last_emitted = Some(i + 2);
                        self.skip_to = i + 3;
                    }
                    None => self.emit(i, "["),
                },
                text => self.emit(i, text),
            },
            TokenKind::String => {
                if self.munge.is_some_and(|(analysis, _)| analysis.is_hint(i)) {
                    self.skip_to = if self.sk.is_punct(i + 1, ";") { i + 2 } else { i + 1 };
                    return;
                }
                match self.bare_key(i) {
                    Some(key) => self.emit(i, key),
                    None => self.emit(i, token.text),
                }
            }
            TokenKind::Identifier => self.print_identifier(i, token.text),
            _ => self.emit(i, token.text),
        }
    }

    fn print_identifier(&mut self, i: usize, text: &'a str) {
        if let Some((analysis, renames)) = self.munge {
            if let Some(binding) = analysis.binding_at(i) {
                let name = renames.name(binding);
                if name != text {
                    if matches!(analysis.role(i), Some(Role::Name { shorthand: true, .. })) {
                        let expanded = format!("{text}:{name}");
                        self.emit(i, &expanded);
                    } else {
                        self.emit(i, name);
                    }
                    return;
                }
            }
        }
        self.emit(i, text);
    }

    fn print_semicolon(&mut self, i: usize) {
        let sk = self.sk;
        let prev = i.checked_sub(1);
        let required = sk.in_for_head(i)
            || self.config.preserve_semicolons
            || prev.is_some_and(|p| self.ends_statement_head(p));

        if required {
            self.emit(i, ";");
        } else if self.needs_semicolon
            || self.output.is_empty()
            || self.output.ends_with(';')
            || prev.is_some_and(|p| sk.is_punct(p, "{"))
        {
            // Redundant empty statement.
            return;
        } else {
            self.needs_semicolon = true;
            self.last_emitted = Some(i);
        }
        self.statement_boundary();
    }

    /// A statement must follow `i`, so a `;` after it is an empty statement
    /// that cannot be dropped.
    fn ends_statement_head(&self, i: usize) -> bool {
        let sk = self.sk;
        sk.closes_control_head(i)
            || sk.is_keyword(i, "else")
            || sk.is_keyword(i, "do")
            || sk.is_punct(i, ":") && sk.is_statement_colon(i)
    }

    /// `a["name"]` → `.name`.
    fn dot_access(&self, i: usize) -> Option<&'a str> {
        let sk = self.sk;
        let prev = sk.get(i.checked_sub(1)?)?;
        let object_end = match prev.kind {
            TokenKind::Identifier => !matches!(prev.text, "yield" | "await" | "of" | "async"),
            TokenKind::String => true,
            TokenKind::Template => prev.text.ends_with('`'),
            TokenKind::Keyword => matches!(prev.text, "this" | "super"),
            TokenKind::Punctuator => prev.text == "]" || prev.text == ")" && !sk.closes_control_head(i - 1),
            _ => false,
        };
        if !object_end || sk.kind(i + 1) != Some(TokenKind::String) || !sk.is_punct(i + 2, "]") {
            return None;
        }
        unquote_identifier(sk.text(i + 1))
    }

    /// `{"name": v}` → `{name: v}`.
    fn bare_key(&self, i: usize) -> Option<&'a str> {
        let sk = self.sk;
        if !self.config.optimize || sk.enclosing_brace(i) != Some(BraceKind::Object) || !sk.is_punct(i + 1, ":") {
            return None;
        }
        let prev = i.checked_sub(1)?;
        if !(sk.is_punct(prev, "{") || sk.is_punct(prev, ",")) {
            return None;
        }
        unquote_identifier(sk.text(i))
    }
}

/// `12` or `1_000`, but not `1.5`, `1e3`, `0x1f` or `1n`.
fn is_decimal_integer(literal: &str) -> bool {
    literal.starts_with(|c: char| c.is_ascii_digit()) && literal.bytes().all(|b| b.is_ascii_digit() || b == b'_')
}

/// The content of a string literal, if it can be written as a bare name.
fn unquote_identifier(literal: &str) -> Option<&str> {
    let name = literal.get(1..literal.len().checked_sub(1)?)?;
    (is_identifier_name(name) && !is_reserved(name)).then_some(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Dialect;
    use crate::lexer::tokenize;
    use crate::scope::analyze;

    fn minify_with(source: &str, config: &CompressionConfig) -> String {
        let skeleton = Skeleton::new(tokenize(source, Dialect::Js));
        if config.munge {
            let analysis = analyze(&skeleton);
            let renames = RenameMap::build(&analysis);
            print(&skeleton, config, Some((&analysis, &renames)))
        } else {
            print(&skeleton, config, None)
        }
    }

    fn minify(source: &str) -> String {
        minify_with(source, &CompressionConfig::default())
    }

    #[test]
    fn test_whitespace_and_comments() {
        assert_eq!(minify("var a = 1 ;\n\n// note\nvar b = a /* x */ + 2;"), "var a=1;var b=a+2;");
        assert_eq!(minify(""), "");
        assert_eq!(minify("  \n // only a comment\n"), "");
    }

    #[test]
    fn test_token_fusion() {
        assert_eq!(minify("x = a - -b + +c - --d"), "x=a- -b+ +c- --d");
        assert_eq!(minify("x = 1 .toString(); y = 1.5.toFixed()"), "x=1 .toString();y=1.5.toFixed()");
        assert_eq!(minify("x = 1_000 .toString(); y = 0x1F.toString()"), "x=1_000 .toString();y=0x1F.toString()");
        assert_eq!(minify("x = 1e3.toFixed(); y = 1n.toString()"), "x=1e3.toFixed();y=1n.toString()");
        assert_eq!(minify("typeof x === 'string'"), "typeof x==='string'");
        assert_eq!(minify("x = a / /re/g.source"), "x=a/ /re/g.source");
        assert_eq!(minify("if (a < !--b) {}"), "if(a< !--b){}");
    }

    #[test]
    fn test_asi_newlines_kept() {
        assert_eq!(minify("a = b\nc()"), "a=b\nc()");
        assert_eq!(minify("function f() { return\nx }"), "function f(){return\nx}");
        assert_eq!(minify("a\n++b"), "a\n++b");
        assert_eq!(minify("a = b\n(c)"), "a=b(c)");
        assert_eq!(minify("if (a) {}\nb()"), "if(a){}b()");
        assert_eq!(minify("x = function () {}\ny()"), "x=function(){}\ny()");
        assert_eq!(minify("if (a) b()\nelse c()"), "if(a)b()\nelse c()");
    }

    #[test]
    fn test_semicolons() {
        assert_eq!(minify("function f() { a(); b(); }"), "function f(){a();b()}");
        assert_eq!(minify("if (a) ; else b();"), "if(a);else b();");
        assert_eq!(minify("for (;;) {}"), "for(;;){}");
        assert_eq!(minify("a();;;b()"), "a();b()");
        assert_eq!(minify("{;a()}"), "{a()}");
        assert_eq!(minify("do ; while (x)"), "do;while(x)");
    }

    #[test]
    fn test_preserve_semicolons() {
        let config = CompressionConfig::default().with_preserve_semicolons(true);
        assert_eq!(minify_with("function f() { a(); b(); }", &config), "function f(){a();b();}");
    }

    #[test]
    fn test_optimize() {
        let source = "x = o[\"name\"] + o[\"for\"] + o[\"a-b\"]; y = {\"k\": 1, \"if\": 2}";
        assert_eq!(minify(source), "x=o.name+o[\"for\"]+o[\"a-b\"];y={k:1,\"if\":2}");
        let config = CompressionConfig::default().with_optimize(false);
        assert_eq!(
            minify_with(source, &config),
            "x=o[\"name\"]+o[\"for\"]+o[\"a-b\"];y={\"k\":1,\"if\":2}"
        );
        // An array literal after a control head is not a property access.
        assert_eq!(minify("if (a) [\"b\"].forEach(f)"), "if(a)[\"b\"].forEach(f)");
    }

    #[test]
    fn test_literals_verbatim() {
        assert_eq!(minify("x = 'a  b' + `c ${ d } e` + /f  g/i"), "x='a  b'+`c ${d} e`+/f  g/i");
    }

    #[test]
    fn test_preserved_comment_and_hashbang() {
        assert_eq!(minify("/*! keep */\nvar a = 1; /* drop */ var b;"), "/*! keep */var a=1;var b;");
        assert_eq!(minify("#!/usr/bin/env node\nrun();"), "#!/usr/bin/env node\nrun();");
    }

    #[test]
    fn test_line_break() {
        let config = CompressionConfig::default().with_line_break(Some(3));
        assert_eq!(minify_with("a();b();c()", &config), "a();\nb();\nc()");
        let config = CompressionConfig::default().with_line_break(Some(6));
        assert_eq!(minify_with("a();b();c()", &config), "a();b();\nc()");
    }

    #[test]
    fn test_munge_shorthand_and_hints() {
        let config = CompressionConfig::default().with_munge(true);
        assert_eq!(
            minify_with("function f(value) { return {value}; }", &config),
            "function f(a){return{value:a}}"
        );
        let source = "function f(a, longName) { \"longName:nomunge\"; return a + longName; }";
        assert_eq!(minify_with(source, &config), "function f(a,longName){return a+longName}");
        assert_eq!(minify(source), "function f(a,longName){\"longName:nomunge\";return a+longName}");
    }
}

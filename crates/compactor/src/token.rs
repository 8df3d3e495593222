//! Token types shared by the CSS and JavaScript dialects.

use crate::span::Span;

/// A token with its kind, its exact source text, and its location.
///
/// Tokens borrow from the input, so concatenating `text` over the whole
/// stream reproduces the source byte for byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub span: Span,
}

impl<'a> Token<'a> {
    /// Create a new token.
    #[inline]
    pub const fn new(kind: TokenKind, text: &'a str, span: Span) -> Self {
        Self { kind, text, span }
    }

    /// Whitespace or a comment.
    #[inline]
    pub fn is_trivia(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Whitespace | TokenKind::LineComment | TokenKind::BlockComment
        )
    }

    /// Check for a punctuator with exactly this text.
    #[inline]
    pub fn is_punct(&self, text: &str) -> bool {
        self.kind == TokenKind::Punctuator && self.text == text
    }

    /// Check for a keyword with exactly this text.
    #[inline]
    pub fn is_keyword(&self, text: &str) -> bool {
        self.kind == TokenKind::Keyword && self.text == text
    }

    /// Identifier or keyword: anything that prints as a bare word.
    #[inline]
    pub fn is_word(&self) -> bool {
        matches!(self.kind, TokenKind::Identifier | TokenKind::Keyword)
    }

    /// Whether the token contains a line terminator.
    pub fn has_newline(&self) -> bool {
        self.text.contains(is_line_terminator)
    }

    /// A block comment the author asked to keep (`/*! ... */`).
    pub fn is_preserved_comment(&self) -> bool {
        self.kind == TokenKind::BlockComment && self.text.starts_with("/*!")
    }
}

/// The kind of token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Spaces, tabs, line terminators.
    Whitespace,
    /// `// ...` up to (not including) the line terminator, or a hashbang.
    LineComment,
    /// `/* ... */`
    BlockComment,
    /// `"..."` or `'...'`, quotes included. In CSS also unquoted `url(...)`.
    String,
    /// A template literal chunk: `` `...` ``, `` `...${ ``, `}...${` or `` }...` ``.
    Template,
    /// `/pattern/flags`
    Regex,
    /// Numeric literal, including BigInt.
    Number,
    /// Identifier. In CSS, any word run (selectors, property names, values).
    Identifier,
    /// Reserved word.
    Keyword,
    /// Operator or delimiter.
    Punctuator,
    /// End of input.
    Eof,
}

/// ECMAScript line terminators.
#[inline]
pub fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

/// Words the lexer classifies as keywords.
///
/// Contextual words (`get`, `set`, `of`, `async`, `static`, `from`, `as`,
/// `await`, `yield` outside generators) are left as identifiers.
pub fn is_keyword(word: &str) -> bool {
    matches!(
        word,
        "break"
            | "case"
            | "catch"
            | "class"
            | "const"
            | "continue"
            | "debugger"
            | "default"
            | "delete"
            | "do"
            | "else"
            | "enum"
            | "export"
            | "extends"
            | "false"
            | "finally"
            | "for"
            | "function"
            | "if"
            | "import"
            | "in"
            | "instanceof"
            | "let"
            | "new"
            | "null"
            | "return"
            | "super"
            | "switch"
            | "this"
            | "throw"
            | "true"
            | "try"
            | "typeof"
            | "var"
            | "void"
            | "while"
            | "with"
    )
}

/// Names that can never be used as a bare identifier or dot-accessed
/// property in the conservative (ES3-compatible) output.
///
/// Used both to skip generated names and to refuse `a["for"]` → `a.for`.
pub fn is_reserved(name: &str) -> bool {
    is_keyword(name)
        || matches!(
            name,
            "abstract"
                | "arguments"
                | "await"
                | "boolean"
                | "byte"
                | "char"
                | "double"
                | "eval"
                | "final"
                | "float"
                | "goto"
                | "implements"
                | "int"
                | "interface"
                | "long"
                | "native"
                | "package"
                | "private"
                | "protected"
                | "public"
                | "short"
                | "static"
                | "synchronized"
                | "throws"
                | "transient"
                | "volatile"
                | "yield"
        )
}

/// Keywords that evaluate to a value; a `/` after them is division.
pub fn is_value_keyword(word: &str) -> bool {
    matches!(word, "this" | "super" | "null" | "true" | "false")
}

/// Start of an identifier.
#[inline]
pub fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '$' || c == '_' || c == '\\' || !c.is_ascii()
}

/// Continuation of an identifier.
#[inline]
pub fn is_ident_part(c: char) -> bool {
    is_ident_start(c) || c.is_ascii_digit()
}

/// A plain ASCII identifier name, as required for dot access and bare keys.
pub fn is_identifier_name(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '$' || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '$' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contextual_words_are_not_keywords() {
        assert!(is_keyword("function"));
        assert!(!is_keyword("get"));
        assert!(!is_keyword("async"));
        assert!(is_reserved("class"));
        assert!(is_reserved("arguments"));
    }

    #[test]
    fn test_identifier_name() {
        assert!(is_identifier_name("bar"));
        assert!(is_identifier_name("$_x1"));
        assert!(!is_identifier_name("1x"));
        assert!(!is_identifier_name("a-b"));
        assert!(!is_identifier_name(""));
        assert!(!is_identifier_name("\\u0061"));
    }

    #[test]
    fn test_preserved_comment() {
        let tok = Token::new(TokenKind::BlockComment, "/*! keep */", Span::new(0, 11));
        assert!(tok.is_preserved_comment());
        assert!(tok.is_trivia());
    }
}

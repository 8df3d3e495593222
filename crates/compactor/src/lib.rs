//! compactor: JavaScript and CSS minifier
//!
//! Strips comments and whitespace, drops redundant semicolons, rewrites
//! `x["y"]` to `x.y`, and optionally renames local variables.
//!
//! # Pipeline
//!
//! 1. **Lexing**
//!    - One token stream per dialect, trivia included
//!    - Regex vs division decided from the previous significant token
//!
//! 2. **Skeleton**
//!    - Bracket matching and brace classification (block, object, body)
//!    - Statement boundaries for automatic semicolon insertion
//!
//! 3. **Scope analysis** (JS, munge only)
//!    - Declarations hoisted into a scope arena, references resolved
//!    - `eval` and `with` pin every name in the enclosing scopes
//!
//! 4. **Printing**
//!    - Token by token, inserting only the whitespace the grammar needs
//!
//! # Example
//!
//! ```
//! use compactor::{CompressionConfig, Compressor, Dialect};
//!
//! let compressor = Compressor::new(CompressionConfig::new(Dialect::Css));
//! let output = compressor.compress("a { color : red ; }").unwrap();
//! assert_eq!(output, "a{color:red;}");
//! ```

mod span;
mod token;
mod lexer;
mod diagnostics;
mod error;
mod config;

mod skeleton;
mod scope;
mod mangle;

mod codegen;
mod css;

mod engine;

// Re-exports
pub use config::{CompressionConfig, Dialect, RECOGNIZED_OPTIONS};
pub use diagnostics::{Diagnostic, DiagnosticKind};
pub use engine::{Compressed, Compressor, OutputHandle, Source};
pub use error::{Error, Result};
pub use lexer::{tokenize, Lexer};
pub use span::{LineIndex, Span};
pub use token::{Token, TokenKind};

/// Compress in-memory source with the given settings.
pub fn compress(source: &str, config: &CompressionConfig) -> String {
    Compressor::new(config.clone()).compress_str(source).output
}

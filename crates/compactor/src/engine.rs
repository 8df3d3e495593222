//! The compressor façade: configuration in, compressed text out.

use crate::codegen;
use crate::config::{CompressionConfig, Dialect};
use crate::css;
use crate::diagnostics::Diagnostic;
use crate::error::Result;
use crate::lexer::Lexer;
use crate::mangle::RenameMap;
use crate::scope;
use crate::skeleton::Skeleton;
use crate::span::LineIndex;
use serde_json::Value;
use std::borrow::Cow;
use std::io::{self, BufRead, Cursor, Read};
use tracing::{debug, debug_span, trace};

/// Input to compress: text, or a reader consumed to the end first.
pub enum Source<'a> {
    Text(Cow<'a, str>),
    Reader(&'a mut dyn Read),
}

impl<'a> Source<'a> {
    /// Wrap any reader.
    pub fn reader(reader: &'a mut dyn Read) -> Self {
        Self::Reader(reader)
    }

    /// Read the whole input.
    fn into_text(self) -> Result<Cow<'a, str>> {
        match self {
            Self::Text(text) => Ok(text),
            Self::Reader(reader) => {
                let mut bytes = Vec::new();
                reader.read_to_end(&mut bytes)?;
                trace!(bytes = bytes.len(), "read input stream");
                Ok(Cow::Owned(String::from_utf8(bytes)?))
            }
        }
    }
}

impl<'a> From<&'a str> for Source<'a> {
    fn from(text: &'a str) -> Self {
        Self::Text(Cow::Borrowed(text))
    }
}

impl<'a> From<&'a String> for Source<'a> {
    fn from(text: &'a String) -> Self {
        Self::Text(Cow::Borrowed(text))
    }
}

impl From<String> for Source<'_> {
    fn from(text: String) -> Self {
        Self::Text(Cow::Owned(text))
    }
}

impl<'a, R: Read> From<&'a mut R> for Source<'a> {
    fn from(reader: &'a mut R) -> Self {
        Self::Reader(reader)
    }
}

/// Compressed output together with what was noticed along the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compressed {
    pub output: String,
    pub diagnostics: Vec<Diagnostic>,
}

/// Readable view of compressed output, lent to a consumer by
/// [`Compressor::compress_with`].
#[derive(Debug)]
pub struct OutputHandle {
    inner: Cursor<Vec<u8>>,
}

impl OutputHandle {
    fn new(output: String) -> Self {
        Self {
            inner: Cursor::new(output.into_bytes()),
        }
    }

    /// Total output length in bytes.
    pub fn len(&self) -> usize {
        self.inner.get_ref().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.get_ref().is_empty()
    }
}

impl Read for OutputHandle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl BufRead for OutputHandle {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.inner.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        self.inner.consume(amt);
    }
}

impl Drop for OutputHandle {
    fn drop(&mut self) {
        trace!(bytes = self.len(), "output handle released");
    }
}

/// A configured compressor. Holds no state between calls.
#[derive(Debug, Clone, Default)]
pub struct Compressor {
    config: CompressionConfig,
}

impl Compressor {
    #[must_use]
    pub fn new(config: CompressionConfig) -> Self {
        Self { config }
    }

    /// Build from option pairs, rejecting unknown keys right away.
    pub fn from_options<I, K>(options: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        CompressionConfig::from_options(options).map(Self::new)
    }

    pub fn config(&self) -> &CompressionConfig {
        &self.config
    }

    /// Compress text or a stream.
    pub fn compress<'a>(&self, source: impl Into<Source<'a>>) -> Result<String> {
        Ok(self.compress_report(source)?.output)
    }

    /// Compress and keep the diagnostics.
    pub fn compress_report<'a>(&self, source: impl Into<Source<'a>>) -> Result<Compressed> {
        let text = source.into().into_text()?;
        Ok(self.compress_str(&text))
    }

    /// Compress, then lend a readable handle over the output to `consumer`.
    /// The handle is released when the consumer returns or panics.
    pub fn compress_with<'a, T>(
        &self,
        source: impl Into<Source<'a>>,
        consumer: impl FnOnce(&mut OutputHandle) -> T,
    ) -> Result<T> {
        let mut handle = OutputHandle::new(self.compress(source)?);
        Ok(consumer(&mut handle))
    }

    /// Compress in-memory text. Never fails; malformed input is reported
    /// through diagnostics.
    pub fn compress_str(&self, source: &str) -> Compressed {
        let config = &self.config;
        let _span = debug_span!("compress", dialect = %config.dialect, bytes = source.len()).entered();

        if source.is_empty() {
            return Compressed {
                output: String::new(),
                diagnostics: Vec::new(),
            };
        }

        let mut lexer = Lexer::new(source, config.dialect);
        let tokens: Vec<_> = lexer.by_ref().collect();
        let mut diagnostics = lexer.into_diagnostics();
        trace!(tokens = tokens.len(), "lexed");

        let output = match config.dialect {
            Dialect::Css => css::print(&tokens, config),
            Dialect::Js => {
                let skeleton = Skeleton::new(tokens);
                diagnostics.extend_from_slice(skeleton.diagnostics());
                if config.munge {
                    let analysis = scope::analyze(&skeleton);
                    let renames = RenameMap::build(&analysis);
                    debug!(
                        scopes = analysis.scopes.len(),
                        bindings = analysis.bindings.len(),
                        renamed = renames.renamed_count(),
                        "munged"
                    );
                    let output = codegen::print(&skeleton, config, Some((&analysis, &renames)));
                    diagnostics.extend(analysis.into_diagnostics());
                    output
                } else {
                    codegen::print(&skeleton, config, None)
                }
            }
        };

        if !diagnostics.is_empty() {
            let index = LineIndex::new(source);
            for diagnostic in &diagnostics {
                let (line, column) = diagnostic.location(&index);
                debug!(code = diagnostic.kind.code(), line, column, "{}", diagnostic.message);
            }
        }
        debug!(input = source.len(), output = output.len(), "compressed");

        Compressed { output, diagnostics }
    }
}

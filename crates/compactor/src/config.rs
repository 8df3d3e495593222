//! Compression configuration.
//!
//! The recognized option set is fixed. Unknown keys are rejected when the
//! configuration is built, never later at compression time.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Every option key a configuration may contain.
pub const RECOGNIZED_OPTIONS: &[&str] = &["type", "line_break", "munge", "preserve_semicolons", "optimize"];

/// The grammar the input is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Css,
    #[default]
    Js,
}

impl Dialect {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Css => "css",
            Self::Js => "js",
        }
    }

    /// Guess the dialect from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "css" => Some(Self::Css),
            "js" | "mjs" | "cjs" => Some(Self::Js),
            _ => None,
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "css" => Ok(Self::Css),
            "js" | "javascript" => Ok(Self::Js),
            other => Err(Error::invalid("type", format!("expected \"css\" or \"js\", got {other:?}"))),
        }
    }
}

/// Settings for one compressor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompressionConfig {
    /// Input dialect.
    #[serde(rename = "type")]
    pub dialect: Dialect,
    /// Column after which a newline is inserted at the next statement
    /// boundary. `None` keeps the output on one line.
    pub line_break: Option<u32>,
    /// Rename local variables and parameters (JS only).
    pub munge: bool,
    /// Keep every statement semicolon, including those before `}`.
    pub preserve_semicolons: bool,
    /// Rewrite `a["b"]` to `a.b` and `{"b": 1}` to `{b: 1}` (JS only).
    pub optimize: bool,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            dialect: Dialect::Js,
            line_break: None,
            munge: false,
            preserve_semicolons: false,
            optimize: true,
        }
    }
}

impl CompressionConfig {
    /// Default configuration for a dialect.
    #[must_use]
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            ..Default::default()
        }
    }

    /// Build a configuration from option key/value pairs.
    ///
    /// Every key is checked against [`RECOGNIZED_OPTIONS`] before any value
    /// is looked at, so an unknown key always wins over a bad value.
    pub fn from_options<I, K>(options: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let options: Vec<(String, Value)> = options.into_iter().map(|(k, v)| (k.into(), v)).collect();
        if let Some((name, _)) = options
            .iter()
            .find(|(name, _)| !RECOGNIZED_OPTIONS.contains(&name.as_str()))
        {
            return Err(Error::unrecognized(name.clone()));
        }

        let mut config = Self::default();
        for (name, value) in options {
            config.apply(&name, value)?;
        }
        Ok(config)
    }

    /// Build a configuration from a JSON object such as
    /// `{"type": "css", "line_break": 0}`.
    pub fn from_json(value: &Value) -> Result<Self> {
        let map = value
            .as_object()
            .ok_or_else(|| Error::invalid("options", "expected a JSON object"))?;
        Self::from_options(map.iter().map(|(k, v)| (k.as_str(), v.clone())))
    }

    fn apply(&mut self, name: &str, value: Value) -> Result<()> {
        match name {
            "type" => {
                self.dialect = match value {
                    Value::Null => Dialect::default(),
                    Value::String(s) => s.parse()?,
                    other => return Err(Error::invalid(name, format!("expected a string, got {other}"))),
                };
            }
            "line_break" => {
                self.line_break = match value {
                    Value::Null => None,
                    Value::Number(n) => {
                        let n = n
                            .as_u64()
                            .and_then(|n| u32::try_from(n).ok())
                            .ok_or_else(|| Error::invalid(name, format!("expected a non-negative integer, got {n}")))?;
                        Some(n)
                    }
                    other => {
                        return Err(Error::invalid(name, format!("expected an integer or null, got {other}")));
                    }
                };
            }
            "munge" => self.munge = expect_bool(name, &value)?,
            "preserve_semicolons" => self.preserve_semicolons = expect_bool(name, &value)?,
            "optimize" => self.optimize = expect_bool(name, &value)?,
            _ => return Err(Error::unrecognized(name)),
        }
        Ok(())
    }

    /// Set the dialect.
    #[must_use]
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Set the line-break column.
    #[must_use]
    pub fn with_line_break(mut self, line_break: Option<u32>) -> Self {
        self.line_break = line_break;
        self
    }

    /// Enable or disable munging.
    #[must_use]
    pub fn with_munge(mut self, munge: bool) -> Self {
        self.munge = munge;
        self
    }

    /// Enable or disable semicolon preservation.
    #[must_use]
    pub fn with_preserve_semicolons(mut self, preserve: bool) -> Self {
        self.preserve_semicolons = preserve;
        self
    }

    /// Enable or disable property/key optimizations.
    #[must_use]
    pub fn with_optimize(mut self, optimize: bool) -> Self {
        self.optimize = optimize;
        self
    }
}

fn expect_bool(name: &str, value: &Value) -> Result<bool> {
    value
        .as_bool()
        .ok_or_else(|| Error::invalid(name, format!("expected a boolean, got {value}")))
}

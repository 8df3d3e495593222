#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

mod logging;

use clap::Parser;
use compactor::{CompressionConfig, Compressor, Dialect, LineIndex};
use miette::{IntoDiagnostic, Result, WrapErr};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info_span, warn};

#[derive(Parser, Debug)]
#[command(name = "compactor")]
#[command(author, version, about = "Minify JavaScript and CSS", long_about = None)]
struct Cli {
    /// Input file (reads stdin when omitted)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Input type: css or js (inferred from the file extension, else js)
    #[arg(long = "type", value_name = "TYPE")]
    dialect: Option<Dialect>,

    /// Insert a line break after the statement or rule that crosses column N
    #[arg(long, value_name = "N")]
    line_break: Option<u32>,

    /// Rename local variables and parameters
    #[arg(long)]
    munge: bool,

    /// Keep all statement semicolons
    #[arg(long = "preserve-semi")]
    preserve_semicolons: bool,

    /// Keep bracket accesses and quoted object keys as written
    #[arg(long)]
    disable_optimizations: bool,

    /// Write output to FILE instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Increase logging verbosity (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Emit JSON formatted log lines on stderr
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn config(&self) -> CompressionConfig {
        let dialect = self
            .dialect
            .or_else(|| self.input.as_deref().and_then(Dialect::from_path))
            .unwrap_or_default();
        CompressionConfig::new(dialect)
            .with_line_break(self.line_break)
            .with_munge(self.munge)
            .with_preserve_semicolons(self.preserve_semicolons)
            .with_optimize(!self.disable_optimizations)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.json);

    let config = cli.config();
    let name = cli
        .input
        .as_deref()
        .map_or_else(|| "<stdin>".to_string(), |p| p.display().to_string());
    let _span = info_span!("compress", file = %name, dialect = %config.dialect).entered();

    let source = read_input(cli.input.as_deref())?;
    let report = Compressor::new(config).compress_report(&source).into_diagnostic()?;

    if !report.diagnostics.is_empty() {
        let index = LineIndex::new(&source);
        for diagnostic in &report.diagnostics {
            let (line, column) = diagnostic.location(&index);
            warn!(code = diagnostic.kind.code(), "{name}:{line}:{column}: {}", diagnostic.message);
        }
    }
    debug!(input = source.len(), output = report.output.len(), "done");

    match &cli.output {
        Some(path) => std::fs::write(path, &report.output)
            .into_diagnostic()
            .wrap_err_with(|| format!("failed to write {}", path.display())),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(report.output.as_bytes()).into_diagnostic()?;
            stdout.flush().into_diagnostic()
        }
    }
}

fn read_input(path: Option<&Path>) -> Result<String> {
    let bytes = match path {
        Some(path) => std::fs::read(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut bytes = Vec::new();
            std::io::stdin().lock().read_to_end(&mut bytes).into_diagnostic()?;
            bytes
        }
    };
    String::from_utf8(bytes).map_err(compactor::Error::from).into_diagnostic()
}

//! Error rendering using ariadne
//!
//! Errors that carry a source span are shown as a report over the program
//! text; the rest fall back to a single line.

use crate::Error;
use ariadne::{Color, Label, Report, ReportKind, Source};
use std::io::Write;

const SOURCE_ID: &str = "<program>";

/// Render an error to stderr
///
/// # Example
/// ```no_run
/// use ippvm::{ExecutionOptions, render_error, run_source};
///
/// let source = ".IPPcode22\nPOPFRAME\n";
/// let result = run_source(
///     source,
///     ExecutionOptions::default(),
///     std::io::empty(),
///     std::io::stdout(),
///     std::io::stderr(),
/// );
/// if let Err(e) = result {
///     render_error(&e, source);
/// }
/// ```
pub fn render_error(error: &Error, source: &str) {
    render_error_to_writer(error, source, &mut std::io::stderr(), true).ok();
}

/// Render an error to a specific writer
pub fn render_error_to(error: &Error, source: &str, writer: &mut dyn Write) -> std::io::Result<()> {
    render_error_to_writer(error, source, writer, true)
}

pub fn render_error_to_string(error: &Error, source: &str) -> String {
    let mut buf = Vec::new();
    render_error_to_writer(error, source, &mut buf, true).ok();
    String::from_utf8_lossy(&buf).to_string()
}

/// Same as `render_error_to_string` but without ANSI color codes, for tests.
pub fn render_error_to_string_no_color(error: &Error, source: &str) -> String {
    let mut buf = Vec::new();
    render_error_to_writer(error, source, &mut buf, false).ok();
    String::from_utf8_lossy(&buf).to_string()
}

fn render_error_to_writer(
    error: &Error,
    source: &str,
    writer: &mut dyn Write,
    use_color: bool,
) -> std::io::Result<()> {
    let Some(span) = error.span() else {
        return writeln!(writer, "{} [exit {}]", error, error.exit_code());
    };

    // Clamp to the source so a stale span cannot panic the renderer.
    let start = span.0.start.min(source.len());
    let end = span.0.end.clamp(start, source.len());

    let title = match error {
        Error::Decode(_) => "Decode error",
        Error::Runtime { .. } => "Runtime error",
    };
    let code = error.exit_code().to_string();
    let label = match error {
        Error::Runtime {
            order: Some(order),
            opcode: Some(opcode),
            ..
        } => format!("{} (instruction {}): {}", opcode, order, error.message()),
        _ => error.message(),
    };

    Report::build(ReportKind::Error, (SOURCE_ID, start..end))
        .with_config(
            ariadne::Config::default()
                .with_color(use_color)
                .with_index_type(ariadne::IndexType::Byte),
        )
        .with_code(code)
        .with_message(title)
        .with_label(
            Label::new((SOURCE_ID, start..end))
                .with_message(label)
                .with_color(Color::Red),
        )
        .finish()
        .write((SOURCE_ID, Source::from(source)), &mut *writer)
}

use std::io::Write;

use owo_colors::OwoColorize;

use doctext_core::{ExtractError, ExtractionResult, NO_TEXT_SENTINEL};

#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Print a one-line description of what was extracted.
pub fn print_header(
    w: &mut dyn Write,
    result: &ExtractionResult,
    color: ColorMode,
) -> std::io::Result<()> {
    let line = format!("{} ({})", result.file_name, result.file_type);
    if color.enabled() {
        writeln!(w, "{}", line.bold())?;
        if result.extracted_text == NO_TEXT_SENTINEL {
            writeln!(w, "{}", "no readable text, sentinel returned".dimmed())?;
        }
    } else {
        writeln!(w, "{}", line)?;
    }
    Ok(())
}

/// Print the extracted text exactly as returned, plus a final newline if missing.
pub fn print_text(w: &mut dyn Write, result: &ExtractionResult) -> std::io::Result<()> {
    write!(w, "{}", result.extracted_text)?;
    if !result.extracted_text.ends_with('\n') {
        writeln!(w)?;
    }
    Ok(())
}

pub fn print_json(w: &mut dyn Write, result: &ExtractionResult) -> std::io::Result<()> {
    serde_json::to_writer_pretty(&mut *w, result)?;
    writeln!(w)
}

/// `{"detail": "..."}`, matching the HTTP error body.
pub fn print_json_error(w: &mut dyn Write, err: &ExtractError) -> std::io::Result<()> {
    serde_json::to_writer_pretty(&mut *w, &serde_json::json!({ "detail": err.to_string() }))?;
    writeln!(w)
}

pub fn print_error(w: &mut dyn Write, err: &ExtractError, color: ColorMode) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(w, "{} {}", "error:".red().bold(), err)?;
    } else {
        writeln!(w, "error: {}", err)?;
    }

    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        if color.enabled() {
            writeln!(w, "  {} {}", "caused by:".dimmed(), cause)?;
        } else {
            writeln!(w, "  caused by: {}", cause)?;
        }
        source = cause.source();
    }
    Ok(())
}

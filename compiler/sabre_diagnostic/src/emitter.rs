//! Terminal diagnostic output with optional ANSI color support.

use std::io::{self, IsTerminal, Write};

use crate::{Diagnostic, Severity, SourceMap};

/// ANSI color codes for terminal output.
mod colors {
    pub const ERROR: &str = "\x1b[1;31m"; // Bold red
    pub const NOTE: &str = "\x1b[1;36m"; // Bold cyan
    pub const BOLD: &str = "\x1b[1m";
    pub const RESET: &str = "\x1b[0m";
}

/// Returns "s" for plural counts, "" for singular.
#[inline]
fn plural_s(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

/// Color output mode for the terminal emitter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorMode {
    /// Automatically detect based on terminal capabilities.
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    pub fn should_use_colors(&self) -> bool {
        match self {
            ColorMode::Auto => io::stderr().is_terminal(),
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

/// Terminal emitter with optional color support.
pub struct TerminalEmitter<W: Write> {
    writer: W,
    colors: bool,
}

impl TerminalEmitter<io::Stderr> {
    /// Create a terminal emitter for stderr.
    pub fn stderr(mode: ColorMode) -> Self {
        TerminalEmitter {
            writer: io::stderr(),
            colors: mode.should_use_colors(),
        }
    }
}

impl<W: Write> TerminalEmitter<W> {
    pub fn new(writer: W, colors: bool) -> Self {
        TerminalEmitter { writer, colors }
    }

    fn write_severity(&mut self, severity: Severity) {
        if self.colors {
            let color = match severity {
                Severity::Error => colors::ERROR,
                Severity::Note => colors::NOTE,
            };
            let _ = write!(self.writer, "{color}{severity}{}", colors::RESET);
        } else {
            let _ = write!(self.writer, "{severity}");
        }
    }

    /// Emit one diagnostic as `path:line:col: severity: message`.
    pub fn emit(&mut self, diag: &Diagnostic, sources: &SourceMap) {
        let (path, pos) = sources.resolve(diag.loc.file, diag.loc.span);
        if self.colors {
            let _ = write!(
                self.writer,
                "{}{path}:{}:{}:{} ",
                colors::BOLD,
                pos.line,
                pos.col,
                colors::RESET
            );
        } else {
            let _ = write!(self.writer, "{path}:{}:{}: ", pos.line, pos.col);
        }
        self.write_severity(diag.severity);
        let _ = writeln!(self.writer, ": {}", diag.message);
    }

    /// Emit every diagnostic followed by an error-count summary line.
    pub fn emit_all(&mut self, diags: &[Diagnostic], sources: &SourceMap) {
        for diag in diags {
            self.emit(diag, sources);
        }
        let errors = diags.iter().filter(|d| d.is_error()).count();
        if errors > 0 {
            let _ = writeln!(self.writer, "{errors} error{} emitted", plural_s(errors));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sabre_ir::{Loc, Span};

    #[test]
    fn plain_output_format() {
        let mut sources = SourceMap::new();
        let file = sources.add("test.sabre", "var x = 1;\nvar y = ;\n");
        let diag = Diagnostic::error(
            Loc::new(file, Span::new(19, 20)),
            "expected expression".to_string(),
        );

        let mut out = Vec::new();
        let mut emitter = TerminalEmitter::new(&mut out, false);
        emitter.emit(&diag, &sources);

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "test.sabre:2:9: error: expected expression\n");
    }
}

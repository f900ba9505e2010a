//! Terminal status output for the CLI.
//!
//! Diagnostics go to stderr so stdout carries only generated text.

use crossterm::style::{Color, Stylize};

const INDENT: &str = "  ";
const LABEL_WARNING: &str = "warning:";
const LABEL_ERROR: &str = "error:";
const GLYPH_SECTION: &str = "•";
const GLYPH_OK: &str = "✓";
const GLYPH_FAIL: &str = "✗";

/// Status renderer with optional ANSI color.
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn warn(&self, msg: &str) {
        if self.color {
            eprintln!("{} {msg}", LABEL_WARNING.with(Color::Yellow).bold());
        } else {
            eprintln!("{LABEL_WARNING} {msg}");
        }
    }

    pub fn error(&self, msg: &str) {
        if self.color {
            eprintln!("{} {msg}", LABEL_ERROR.with(Color::Red).bold());
        } else {
            eprintln!("{LABEL_ERROR} {msg}");
        }
    }

    pub fn section(&self, title: &str) {
        if self.color {
            eprintln!(
                "{} {}",
                GLYPH_SECTION.with(Color::DarkGrey),
                title.with(Color::Cyan).bold()
            );
        } else {
            eprintln!("{title}:");
        }
    }

    /// Key/value row under a section.
    pub fn field(&self, key: &str, value: &str) {
        if self.color {
            eprintln!(
                "{INDENT}{} {}",
                format!("{key}:").with(Color::DarkGrey),
                value.with(Color::White)
            );
        } else {
            eprintln!("{INDENT}{key}: {value}");
        }
    }

    /// Pass/fail row under a section.
    pub fn check(&self, label: &str, ok: bool, detail: Option<&str>) {
        let suffix = detail.map(|d| format!(" ({d})")).unwrap_or_default();
        match (self.color, ok) {
            (true, true) => eprintln!("{INDENT}{} {label}{suffix}", GLYPH_OK.with(Color::Green)),
            (true, false) => eprintln!("{INDENT}{} {label}{suffix}", GLYPH_FAIL.with(Color::Red)),
            (false, true) => eprintln!("{INDENT}ok {label}{suffix}"),
            (false, false) => eprintln!("{INDENT}FAIL {label}{suffix}"),
        }
    }

    pub fn detail(&self, text: &str) {
        if self.color {
            eprintln!("{INDENT}{}", text.with(Color::DarkGrey));
        } else {
            eprintln!("{INDENT}{text}");
        }
    }
}

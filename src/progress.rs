use crate::{template::Template, walkdir::Visited};
use std::{
    io::{self, Write},
    path::Path,
};
use termion::{is_tty, terminal_size};

const SPINNER_CHARS: &[&str] = &[
    "⠉", "⠋", "⠍", "⠎", "⡅", "⡇", "⡆", "⣄", "⣠", "⣈", "⣘", "⢱",
];

/// Hooks called while packaging.
pub trait Progress {
    fn on_template(&mut self, _template: &Template) {}
    fn on_entry(&mut self, _template: &Template, _entry: &Visited) {}
    fn on_archive(&mut self, _template: &Template, _archive: &Path) {}
}

/// Reports nothing.
pub struct NoProgress;

impl Progress for NoProgress {}

pub struct Spinner {
    idx: usize,
}

impl Spinner {
    pub fn new() -> Self {
        Spinner { idx: 0 }
    }

    pub fn tick(&mut self) -> &'static str {
        self.idx = (self.idx + 1) % SPINNER_CHARS.len();
        SPINNER_CHARS[self.idx]
    }
}

impl Default for Spinner {
    fn default() -> Self {
        Spinner::new()
    }
}

/// Rewrites a single terminal line with the entry being archived.
pub struct SpinnerProgress {
    spinner: Spinner,
    terminal_width: u16,
}

impl SpinnerProgress {
    /// The status line is disabled (width 0) when stdout is not a terminal.
    pub fn new() -> Self {
        let terminal_width = if is_tty(&io::stdout()) {
            terminal_size().map(|(w, _)| w).unwrap_or(0)
        } else {
            0
        };
        SpinnerProgress {
            spinner: Spinner::new(),
            terminal_width,
        }
    }

    fn clear_line(&self) {
        print!("{}\r", " ".repeat(self.terminal_width as usize));
        io::stdout().flush().ok();
    }
}

impl Default for SpinnerProgress {
    fn default() -> Self {
        SpinnerProgress::new()
    }
}

impl Progress for SpinnerProgress {
    fn on_entry(&mut self, template: &Template, entry: &Visited) {
        if self.terminal_width == 0 {
            return;
        }
        let file_name = format!("{}/{}", template.name, entry.relative.to_string_lossy());
        let keep = (self.terminal_width as usize).saturating_sub(8);
        let file_name: String = {
            let chars: Vec<char> = file_name.chars().collect();
            chars[chars.len().saturating_sub(keep)..].iter().collect()
        };
        let whitespace = " ".repeat(
            (self.terminal_width as usize).saturating_sub(file_name.chars().count() + 10),
        );
        let spinner_symbol = self.spinner.tick();
        print!(
            "{} {}{} {}\r",
            spinner_symbol, file_name, whitespace, spinner_symbol
        );
        io::stdout().flush().ok();
    }

    fn on_archive(&mut self, _template: &Template, _archive: &Path) {
        if self.terminal_width > 0 {
            self.clear_line();
        }
    }
}

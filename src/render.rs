//! Terminal output. Everything user-facing goes through a [`Console`] value
//! owned by the binary; the change-set core never prints.

use crossterm::style::{Color, Stylize};
use std::io::{self, IsTerminal, Write};

use crate::git::CanonicalChange;

#[derive(Debug, Clone, Copy)]
pub struct Console {
    color: bool,
}

impl Console {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    /// Color only when stdout is a terminal and the caller allows it.
    pub fn detect(no_color: bool) -> Self {
        Self::new(!no_color && io::stdout().is_terminal())
    }

    fn paint(&self, text: &str, color: Color) -> String {
        if self.color {
            text.with(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str, color: Color) -> String {
        if self.color {
            text.with(color).bold().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn banner(&self) {
        let title = format!("{} - Auto Git Commit", self.bold("GitSync", Color::Blue));
        println!("{}", self.panel_text("", &title, Color::Blue));
    }

    pub fn step(&self, message: &str) {
        println!("{} {message}", self.paint("•", Color::Cyan));
    }

    pub fn success(&self, message: &str) {
        println!("{}", self.paint(message, Color::Green));
    }

    pub fn warn(&self, message: &str) {
        println!("{}", self.paint(message, Color::Yellow));
    }

    pub fn error(&self, message: &str) {
        let _ = io::stdout().flush();
        eprintln!("{}", self.paint(&format!("Error: {message}"), Color::Red));
    }

    pub fn blank(&self) {
        println!();
    }

    pub fn panel(&self, title: &str, body: &str) {
        println!("{}", self.panel_text(title, body, Color::Green));
    }

    pub fn changes(&self, changes: &[CanonicalChange]) {
        print!("{}", self.changes_table(changes));
    }

    /// Boxed text with an optional title in the top border.
    pub fn panel_text(&self, title: &str, body: &str, border: Color) -> String {
        let width = body
            .lines()
            .map(visible_width)
            .chain(std::iter::once(visible_width(title) + 2))
            .max()
            .unwrap_or(0);

        let top = if title.is_empty() {
            format!("╭{}╮", "─".repeat(width + 2))
        } else {
            let fill = width - visible_width(title);
            format!("╭─ {title} {}╮", "─".repeat(fill - 1))
        };

        let mut out = self.paint(&top, border);
        out.push('\n');
        for line in body.lines() {
            let pad = " ".repeat(width - visible_width(line));
            out.push_str(&format!(
                "{} {line}{pad} {}\n",
                self.paint("│", border),
                self.paint("│", border)
            ));
        }
        out.push_str(&self.paint(&format!("╰{}╯", "─".repeat(width + 2)), border));
        out
    }

    /// "Changed Files" table. Zero counts render as empty cells.
    pub fn changes_table(&self, changes: &[CanonicalChange]) -> String {
        let rows: Vec<[String; 4]> = changes
            .iter()
            .map(|change| {
                [
                    change.path.clone(),
                    change.kind.to_string(),
                    change
                        .shown_additions()
                        .map(|n| format!("+{n}"))
                        .unwrap_or_default(),
                    change
                        .shown_deletions()
                        .map(|n| format!("-{n}"))
                        .unwrap_or_default(),
                ]
            })
            .collect();

        let headers = ["File", "Status", "+", "-"];
        let mut widths = headers.map(|h| h.chars().count());
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let mut out = format!("{}\n", self.bold("Changed Files", Color::White));
        out.push_str(&format!(
            "{:<w0$}  {:<w1$}  {:>w2$}  {:>w3$}\n",
            headers[0],
            headers[1],
            headers[2],
            headers[3],
            w0 = widths[0],
            w1 = widths[1],
            w2 = widths[2],
            w3 = widths[3],
        ));

        let colors = [Color::Cyan, Color::Yellow, Color::Green, Color::Red];
        for row in &rows {
            let cells: Vec<String> = row
                .iter()
                .enumerate()
                .map(|(i, cell)| {
                    let padded = if i < 2 {
                        format!("{cell:<width$}", width = widths[i])
                    } else {
                        format!("{cell:>width$}", width = widths[i])
                    };
                    self.paint(&padded, colors[i])
                })
                .collect();
            out.push_str(cells.join("  ").trim_end());
            out.push('\n');
        }

        out
    }
}

fn visible_width(text: &str) -> usize {
    let mut width = 0;
    let mut in_escape = false;
    for c in text.chars() {
        match (in_escape, c) {
            (false, '\u{1b}') => in_escape = true,
            (true, 'm') => in_escape = false,
            (true, _) => {}
            (false, _) => width += 1,
        }
    }
    width
}

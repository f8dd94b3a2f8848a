use colored::Colorize;
use std::fmt;

/// Message categories used by the CLI output helpers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Warning,
    Error,
    Hint,
    Section,
}

fn label(kind: MessageKind) -> &'static str {
    match kind {
        MessageKind::Info => "INFO",
        MessageKind::Success => "OK",
        MessageKind::Warning => "WARNING",
        MessageKind::Error => "ERROR",
        MessageKind::Hint => "HINT",
        MessageKind::Section => "",
    }
}

/// Text of a message before styling.
pub fn render(kind: MessageKind, message: impl fmt::Display) -> String {
    let text = message.to_string();
    match kind {
        MessageKind::Section => format!("=== {} ===", text.trim()),
        _ => format!("{}: {}", label(kind), text),
    }
}

fn apply_style(kind: MessageKind, text: String) -> String {
    match kind {
        MessageKind::Success => text.bright_green().to_string(),
        MessageKind::Warning => text.bright_yellow().to_string(),
        MessageKind::Error => text.bright_red().to_string(),
        MessageKind::Hint => text.dimmed().to_string(),
        MessageKind::Section => text.bold().to_string(),
        MessageKind::Info => text,
    }
}

pub fn print(kind: MessageKind, message: impl fmt::Display) {
    let styled = apply_style(kind, render(kind, message));
    match kind {
        MessageKind::Section => println!("\n{}", styled),
        _ => println!("{}", styled),
    }
}

pub fn info(message: impl fmt::Display) {
    print(MessageKind::Info, message);
}

pub fn success(message: impl fmt::Display) {
    print(MessageKind::Success, message);
}

pub fn warning(message: impl fmt::Display) {
    print(MessageKind::Warning, message);
}

pub fn error(message: impl fmt::Display) {
    print(MessageKind::Error, message);
}

pub fn hint(message: impl fmt::Display) {
    print(MessageKind::Hint, message);
}

pub fn section(title: impl fmt::Display) {
    print(MessageKind::Section, title);
}

/// Plain line without a label.
pub fn line(message: impl fmt::Display) {
    println!("{}", message);
}

/// Prints `label: value` pairs with the labels padded to a common width.
pub fn two_column(rows: &[(&str, String)]) {
    let width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    for (label, value) in rows {
        println!("  {:<width$}  {}", label, value, width = width);
    }
}

/// Renders a fixed-width table. Columns listed in `right_aligned` are
/// right-justified.
pub fn table(headers: &[&str], rows: &[Vec<String>], right_aligned: &[usize]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|header| header.chars().count()).collect();
    for row in rows {
        for (index, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(index) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let format_row = |cells: Vec<&str>| -> String {
        let mut rendered = String::from(" ");
        for (index, cell) in cells.iter().enumerate() {
            let width = widths.get(index).copied().unwrap_or(0);
            let padding = width.saturating_sub(cell.chars().count());
            rendered.push(' ');
            if right_aligned.contains(&index) {
                rendered.push_str(&" ".repeat(padding));
                rendered.push_str(cell);
            } else {
                rendered.push_str(cell);
                rendered.push_str(&" ".repeat(padding));
            }
            rendered.push(' ');
        }
        rendered.trim_end().to_string()
    };

    let mut lines = vec![format_row(headers.to_vec())];
    let rule: usize = widths.iter().map(|width| width + 2).sum();
    lines.push(format!("  {}", "-".repeat(rule.saturating_sub(2))));
    for row in rows {
        lines.push(format_row(row.iter().map(String::as_str).collect()));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_labels_messages() {
        assert_eq!(render(MessageKind::Error, "boom"), "ERROR: boom");
        assert_eq!(render(MessageKind::Section, " Invoice "), "=== Invoice ===");
    }

    #[test]
    fn table_pads_columns() {
        let rendered = table(
            &["Description", "Amount"],
            &[
                vec!["Dinner".into(), "100,00".into()],
                vec!["Gym".into(), "50,00".into()],
            ],
            &[1],
        );
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "  Description  Amount");
        assert_eq!(lines[2], "  Dinner       100,00");
        assert_eq!(lines[3], "  Gym           50,00");
    }
}

//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use chrono::NaiveDate;
use colored::{ColoredString, Colorize};

use crate::domain::Highlight;

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print warning (yellow "Warning:" prefix) to stderr
pub fn warning(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "Warning".yellow(), msg);
}

/// Print success status (green checkmark)
pub fn success(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{} {}", "✓".green(), msg);
}

/// Print completed action (green label)
pub fn action(label: &str, msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}: {}", label.green(), msg);
}

/// Print section header (cyan bold)
pub fn header(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg.to_string().cyan().bold());
}

/// Print indented detail (no color)
pub fn detail(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("  {}", msg);
}

/// Print plain output (no color, for data/JSON)
pub fn info(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg);
}

/// Format money pt-BR style: `R$ 1.234,56`.
///
/// `.` groups thousands, `,` separates the fraction.
pub fn format_currency(value: f64, symbol: &str, decimals: usize) -> String {
    let negative = value < 0.0;
    let fixed = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if negative { "-" } else { "" };
    let number = match frac_part {
        Some(f) => format!("{sign}{grouped},{f}"),
        None => format!("{sign}{grouped}"),
    };

    if symbol.is_empty() {
        number
    } else {
        format!("{symbol} {number}")
    }
}

/// pt-BR calendar date: `15/02/2026`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Percentage with one decimal: `87,5%`.
pub fn format_share(percent: f64) -> String {
    format!("{:.1}%", percent).replace('.', ",")
}

/// Lowest green, highest red, empty dimmed.
pub fn paint(text: &str, highlight: Highlight) -> ColoredString {
    match highlight {
        Highlight::Lowest => text.green().bold(),
        Highlight::Highest => text.red().bold(),
        Highlight::Intermediate => text.normal(),
        Highlight::Empty => text.dimmed(),
    }
}

/// One-line key for the highlight colors.
pub fn legend() -> String {
    [
        ("lowest", Highlight::Lowest),
        ("intermediate", Highlight::Intermediate),
        ("highest", Highlight::Highest),
    ]
    .iter()
    .map(|(name, highlight)| format!("{} {}", paint("■", *highlight), name))
    .collect::<Vec<_>>()
    .join("  ")
}

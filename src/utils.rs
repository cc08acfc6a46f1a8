use colored::Colorize;

use crate::config::DisplayConfig;

/// Marker shown in place of an amount that is not a number
pub const INVALID_MARKER: &str = "invalid";

/// Format an amount with the configured currency and precision.
/// NaN and infinite values render as the invalid marker.
pub fn format_amount(value: f64, display: &DisplayConfig) -> String {
    if !value.is_finite() {
        return INVALID_MARKER.to_string();
    }
    format!("{}{:.*}", display.currency, display.decimals, value)
}

/// Format an amount for the terminal, highlighting invalid values
pub fn format_amount_colored(value: f64, display: &DisplayConfig) -> String {
    let text = format_amount(value, display);
    if value.is_finite() {
        text.yellow().to_string()
    } else {
        text.red().to_string()
    }
}

/// Format a contribution list the way it is entered: comma separated, no currency
pub fn format_contributions(contributions: &[f64]) -> String {
    if contributions.is_empty() {
        return "-".to_string();
    }
    contributions
        .iter()
        .map(|c| if c.is_nan() { INVALID_MARKER.to_string() } else { c.to_string() })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Prompt user for yes/no confirmation
pub fn confirm_action(prompt: &str) -> bool {
    use std::io::{self, Write};

    print!("{} (y/N): ", prompt);
    if io::stdout().flush().is_err() {
        return false;
    }

    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_err() {
        return false;
    }

    matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Print a formatted table border
pub fn print_table_border(width: usize) {
    println!("{}", "=".repeat(width));
}

/// Build a table row with padded columns
pub fn table_row(columns: &[&str], widths: &[usize]) -> String {
    let mut row = String::new();
    for (i, col) in columns.iter().enumerate() {
        if i < widths.len() {
            row.push_str(&format!("{:<width$}  ", col, width = widths[i]));
        }
    }
    row.trim_end().to_string()
}

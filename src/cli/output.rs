/// Terminal output helpers shared by the commands
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

pub fn section_header(title: &str) {
    println!("\n{}", title.bold().cyan());
}

pub fn success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

pub fn info(message: &str) {
    println!("{} {}", "●".blue(), message);
}

pub fn warning(message: &str) {
    println!("{} {}", "⚠".yellow(), message);
}

pub fn empty(message: &str) {
    println!("{} {}", "◌".dimmed(), message);
}

/// Tree structure item
pub fn tree_item(is_last: bool, label: &str, value: Option<&str>) {
    let prefix = if is_last { "└─" } else { "├─" };
    if let Some(val) = value {
        println!("{} {}: {}", prefix.dimmed(), label, val);
    } else {
        println!("{} {}", prefix.dimmed(), label);
    }
}

/// Print `(label, value)` pairs as one tree block
pub fn tree_block(items: &[(&str, String)]) {
    for (i, (label, value)) in items.iter().enumerate() {
        tree_item(i + 1 == items.len(), label, Some(value));
    }
}

/// Format a number with thousands separator
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.insert(0, ',');
        }
        result.insert(0, c);
    }
    result
}

/// Bar for a known number of lookups; hidden when `quiet`
pub fn lookup_progress(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(0);
    let style = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .map(|s| s.progress_chars("█▓▒░"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
    }
}

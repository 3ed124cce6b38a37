use colored::*;
use console::measure_text_width;
use tracing::info;

use crate::terminal::{banner, colors};

pub const TOTAL_WIDTH: usize = 64;
pub const PRINT_TARGET: &str = "sweepr::print";

/// Width of the key column in a port tree, dots included.
const TREE_KEY_WIDTH: usize = 7;

#[macro_export]
macro_rules! mprint {
    () => {
        $crate::terminal::print::print("");
    };
    ($msg:expr) => {
        $crate::terminal::print::print($msg);
    };
}

/// Emits a line verbatim; the formatter skips the level glyph for this target.
pub fn print(msg: &str) {
    info!(target: PRINT_TARGET, raw_msg = msg);
}

pub fn banner(no_banner: bool, q_level: u8) {
    if no_banner || q_level > 0 {
        return;
    }
    let title = format!("⟦ SWEEPR v{} ⟧", env!("CARGO_PKG_VERSION"));
    print(&rule_around(&title.bright_green().bold().to_string(), '═'));
    banner::print();
}

pub fn header(msg: &str, q_level: u8) {
    if q_level > 0 {
        return;
    }
    let title = format!("⟦ {} ⟧", msg.to_uppercase());
    print(&rule_around(&title.bright_green().to_string(), '─'));
}

/// Centres `title` in a rule of `fill` spanning [`TOTAL_WIDTH`] columns.
fn rule_around(title: &str, fill: char) -> String {
    let free = TOTAL_WIDTH.saturating_sub(measure_text_width(title));
    let left = free / 2;
    let right = free - left;
    let rule = |n: usize| fill.to_string().repeat(n).color(colors::SEPARATOR);
    format!("{}{}{}", rule(left), title, rule(right))
}

pub fn fat_separator() {
    print(&"═".repeat(TOTAL_WIDTH).color(colors::SEPARATOR).to_string());
}

/// `key.....: value`, with the dots padding every key to `key_width`.
pub fn aligned_line(key: &str, key_width: usize, value: ColoredString) {
    let pad = ".".repeat((key_width + 1).saturating_sub(key.len()));
    print_status(format!(
        "{}{}{} {}",
        key.color(colors::PRIMARY),
        pad.color(colors::SEPARATOR),
        ":".color(colors::SEPARATOR),
        value
    ));
}

pub fn print_status<T: AsRef<str>>(msg: T) {
    print(&format!("{} {}", ">".color(colors::SEPARATOR), msg.as_ref()));
}

pub fn tree_head(idx: usize, name: &str) {
    print(&format!(
        "{}{}{} {}",
        "[".color(colors::SEPARATOR),
        idx.to_string().color(colors::ACCENT),
        "]".color(colors::SEPARATOR),
        name.color(colors::IPV4_ADDR)
    ));
}

pub fn as_tree_one_level(details: Vec<(String, ColoredString)>) {
    for line in tree_lines(&details) {
        print(&line);
    }
}

fn tree_lines(details: &[(String, ColoredString)]) -> Vec<String> {
    let last = details.len().saturating_sub(1);
    details
        .iter()
        .enumerate()
        .map(|(i, (key, value))| {
            let branch = if i == last { "└─" } else { "├─" };
            let pad = ".".repeat(TREE_KEY_WIDTH.saturating_sub(key.len()));
            format!(
                " {} {}{}{} {}",
                branch.color(colors::SEPARATOR),
                key.color(colors::TEXT_DEFAULT),
                pad.color(colors::SEPARATOR),
                ":".color(colors::SEPARATOR),
                value
            )
        })
        .collect()
}

pub fn centerln(msg: &str) {
    let space = " ".repeat(TOTAL_WIDTH.saturating_sub(measure_text_width(msg)) / 2);
    print(&format!("{space}{msg}"));
}

/// Boxed notice shown when a sweep finds nothing listening.
pub fn no_results() {
    let lines = [
        "no port accepted a connection",
        "targets may be down, filtered, or the range too narrow",
    ];
    let inner = TOTAL_WIDTH - 2;
    let edge = |l: &str, r: &str| format!("{l}{}{r}", "─".repeat(inner)).color(colors::SEPARATOR);

    print(&edge("┌", "┐").to_string());
    for line in lines {
        let free = inner.saturating_sub(measure_text_width(line));
        let left = free / 2;
        print(&format!(
            "{}{}{}{}{}",
            "│".color(colors::SEPARATOR),
            " ".repeat(left),
            line.red().bold(),
            " ".repeat(free - left),
            "│".color(colors::SEPARATOR)
        ));
    }
    print(&edge("└", "┘").to_string());
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

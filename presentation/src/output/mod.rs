//! Cycle reports and their console rendering

pub mod console;
pub mod report;

/// Turn off ANSI colors for everything this crate prints
pub fn disable_color() {
    colored::control::set_override(false);
}

//! ANSI color codes used for console messages

pub const RESET: &str = "\x1b[0m";
pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const LIGHT_YELLOW: &str = "\x1b[93m";
pub const LIGHT_BLUE: &str = "\x1b[94m";
pub const LIGHT_MAGENTA: &str = "\x1b[95m";
pub const LIGHT_CYAN: &str = "\x1b[96m";
pub const LIGHT_GREEN: &str = "\x1b[92m";

/// Colors cycled over the segments of a config key path
pub const PATH_COLORS: [&str; 4] = [LIGHT_CYAN, LIGHT_BLUE, LIGHT_MAGENTA, LIGHT_GREEN];

/// Wrap `text` in `color`
pub fn paint(color: &str, text: &str) -> String {
    format!("{}{}{}", color, text, RESET)
}

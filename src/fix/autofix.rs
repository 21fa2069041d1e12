/// Cosmetic line-level fixes for Python source
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static PLUS_OPERATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t]*\+(=?)[ \t]*").expect("static regex"));
static SPACE_BEFORE_PAREN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t]+\)").expect("static regex"));

/// Apply the line rewrites:
/// - drop `print(...)` lines mentioning debug or test
/// - on other lines with `print(`, remove spaces before `)` and pad `+` as ` + `
/// - strip trailing whitespace everywhere
pub fn auto_fix_code(source: &str) -> String {
    source
        .split('\n')
        .filter(|line| !is_debug_print(line))
        .map(fix_line)
        .collect::<Vec<_>>()
        .join("\n")
}

fn is_debug_print(line: &str) -> bool {
    let trimmed = line.trim();
    if !trimmed.starts_with("print(") {
        return false;
    }
    let lower = trimmed.to_lowercase();
    lower.contains("debug") || lower.contains("test")
}

fn fix_line(line: &str) -> String {
    if !line.contains("print(") {
        return line.trim_end().to_string();
    }
    let line = SPACE_BEFORE_PAREN.replace_all(line, ")");
    let line = PLUS_OPERATOR.replace_all(&line, |caps: &Captures| {
        // `+=` is an augmented assignment, leave it untouched
        if caps[1].is_empty() {
            " + ".to_string()
        } else {
            caps[0].to_string()
        }
    });
    line.trim_end().to_string()
}

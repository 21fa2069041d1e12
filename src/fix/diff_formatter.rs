/// Unified diffs between original and auto-fixed source
use similar::TextDiff;

pub const DIFF_CONTEXT_LINES: usize = 3;

/// Unified diff with `--- path` / `+++ path (fixed)` headers; empty when nothing changed
pub fn format_unified_diff(file_path: &str, original: &str, fixed: &str) -> String {
    if original == fixed {
        return String::new();
    }
    let diff = TextDiff::from_lines(original, fixed);
    let fixed_label = format!("{} (fixed)", file_path);
    diff.unified_diff()
        .context_radius(DIFF_CONTEXT_LINES)
        .header(file_path, &fixed_label)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_inputs_produce_no_diff() {
        assert_eq!(format_unified_diff("a.py", "x = 1\n", "x = 1\n"), "");
    }

    #[test]
    fn diff_has_headers_and_changes() {
        let diff = format_unified_diff("a.py", "x = 1\nprint('debug')\n", "x = 1\n");
        assert!(diff.starts_with("--- a.py\n+++ a.py (fixed)\n"));
        assert!(diff.contains("@@"));
        assert!(diff.contains("-print('debug')"));
    }
}

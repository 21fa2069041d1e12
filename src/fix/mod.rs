/// Auto-fix and diff output
pub mod autofix;
pub mod diff_formatter;

pub use autofix::auto_fix_code;
pub use diff_formatter::format_unified_diff;

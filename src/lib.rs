//! Python code quality review: AST rules, complexity metrics and LLM-backed feedback

/// Safely truncate a UTF-8 string to a maximum number of characters
pub fn truncate_utf8_safe(s: &str, max_chars: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_chars {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{}…", truncated)
    }
}

/// Parsing, issue detection, metrics and project orchestration
pub mod analysis;

/// Analyzer and backend configuration
pub mod config;

/// Review suggestions with backend fallback
pub mod feedback;

/// Auto-fix and unified diffs
pub mod fix;

/// Git pre-commit hook installer
pub mod hook;

/// Suggestion backends (OpenRouter, Ollama, Gemini)
pub mod providers;

/// Console table and CSV/HTML report files
pub mod report;

// Re-export commonly used types for convenience
pub use analysis::ast::{detect_issues, parse_python, AstError, Issue, IssueKind, ScopePolicy, Severity};
pub use analysis::metrics::{compute_metrics, Grade, Metrics};
pub use analysis::project::{
    analyze_file, analyze_path, analyze_project, collect_python_files, FileReport, ProjectError,
    ProjectReport,
};
pub use config::{load_config, AnalyzerConfig, ProviderSettings};
pub use feedback::{Feedback, FeedbackResolver, FeedbackSource};
pub use fix::{auto_fix_code, format_unified_diff};
pub use providers::{ProviderError, SuggestionProvider};

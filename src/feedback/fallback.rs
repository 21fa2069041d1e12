use crate::analysis::ast::issues::{Issue, IssueKind};

/// Deterministic template suggestions, one per matching issue
pub fn rule_based_feedback(issues: &[Issue]) -> Vec<String> {
    issues.iter().filter_map(template_for).collect()
}

fn template_for(issue: &Issue) -> Option<String> {
    let ctx = issue.context.as_deref().unwrap_or("None");
    let suggestion = match issue.kind {
        IssueKind::MissingDocstring => {
            format!("Add a proper docstring to '{ctx}' explaining its purpose.")
        }
        IssueKind::TooManyParameters => {
            format!("Refactor '{ctx}' to reduce parameters using objects.")
        }
        IssueKind::MagicNumber => "Replace magic numbers with constants.".to_string(),
        IssueKind::UnusedVariable => format!("Remove unused variable '{}'.", issue.detail),
        IssueKind::DebugPrint => "Remove debug print statements.".to_string(),
        IssueKind::PoorVariableName => format!("Rename variable '{}' meaningfully.", issue.detail),
        _ => return None,
    };
    Some(suggestion)
}

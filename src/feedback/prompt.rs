use crate::analysis::ast::issues::Issue;

/// Source code beyond this many characters is left out of the prompt
pub const MAX_PROMPT_CODE_CHARS: usize = 3000;

/// Review prompt listing every issue and the (truncated) source
pub fn build_prompt(issues: &[Issue], code: &str) -> String {
    let issues_text = issues
        .iter()
        .map(|issue| format!("- {issue}"))
        .collect::<Vec<_>>()
        .join("\n");
    let code: String = code.chars().take(MAX_PROMPT_CODE_CHARS).collect();

    format!(
        "You are a senior Python code reviewer. Analyze the following code and its detected issues, \
then provide clear, actionable feedback.

DETECTED ISSUES:
{issues_text}

SOURCE CODE:
```python
{code}
```

Provide 3-7 concise, actionable suggestions to improve this code. Focus on the most impactful \
improvements. Return ONLY the suggestions as a numbered list, one per line. Do not include any other text."
    )
}

/// Split a backend reply into suggestions, dropping list markers and blank lines
pub fn parse_suggestions(raw: &str) -> Vec<String> {
    raw.lines()
        .map(|line| {
            line.trim()
                .trim_start_matches(|c: char| c.is_ascii_digit() || matches!(c, '.' | '-' | ')' | ' '))
                .trim()
        })
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

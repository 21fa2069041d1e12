//! Review feedback: asks each suggestion backend in turn and falls back to
//! rule-based templates when none of them produces usable output.
pub mod fallback;
pub mod prompt;

use std::fmt;
use tracing::{info, warn};

use crate::analysis::ast::issues::Issue;
use crate::config::ProviderSettings;
use crate::providers::{providers_from_settings, ProviderError, SuggestionProvider};

pub use fallback::rule_based_feedback;
pub use prompt::{build_prompt, parse_suggestions};

pub const NO_ISSUES_MESSAGE: &str = "No issues detected. Code looks good!";

/// Where a set of suggestions came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedbackSource {
    NoIssues,
    Provider(String),
    RuleBased,
}

impl fmt::Display for FeedbackSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedbackSource::NoIssues => f.write_str("none needed"),
            FeedbackSource::Provider(name) => f.write_str(name),
            FeedbackSource::RuleBased => f.write_str("rule-based"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub suggestions: Vec<String>,
    pub source: FeedbackSource,
}

impl Feedback {
    /// Suggestions joined for a single report cell
    pub fn joined(&self) -> String {
        self.suggestions.join("; ")
    }
}

/// Ordered chain of suggestion backends
pub struct FeedbackResolver {
    providers: Vec<Box<dyn SuggestionProvider>>,
}

impl FeedbackResolver {
    pub fn new(providers: Vec<Box<dyn SuggestionProvider>>) -> Self {
        Self { providers }
    }

    /// Resolver with no backends: always answers with rule-based feedback
    pub fn rule_based_only() -> Self {
        Self::new(Vec::new())
    }

    pub fn from_settings(settings: &ProviderSettings) -> Result<Self, ProviderError> {
        Ok(Self::new(providers_from_settings(settings)?))
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Suggestions for `issues` found in `code`. Never fails.
    pub async fn resolve(&self, issues: &[Issue], code: &str) -> Feedback {
        if issues.is_empty() {
            return Feedback {
                suggestions: vec![NO_ISSUES_MESSAGE.to_string()],
                source: FeedbackSource::NoIssues,
            };
        }

        let prompt = build_prompt(issues, code);
        for provider in &self.providers {
            info!("Trying {}...", provider.name());
            match provider.generate(&prompt).await {
                Ok(raw) => {
                    let suggestions = parse_suggestions(&raw);
                    if suggestions.is_empty() {
                        warn!("{} returned no usable suggestions", provider.name());
                        continue;
                    }
                    info!("{} succeeded.", provider.name());
                    return Feedback {
                        suggestions,
                        source: FeedbackSource::Provider(provider.name().to_string()),
                    };
                }
                Err(e) => warn!("{} failed: {}", provider.name(), e),
            }
        }

        if !self.providers.is_empty() {
            info!("All AI engines failed. Using rule-based feedback.");
        }
        Feedback {
            suggestions: rule_based_feedback(issues),
            source: FeedbackSource::RuleBased,
        }
    }
}

use ai_code_reviewer::analysis::ast::issues::{Issue, IssueDetail, IssueKind};
use ai_code_reviewer::feedback::{FeedbackResolver, FeedbackSource, NO_ISSUES_MESSAGE};
use ai_code_reviewer::providers::{AIProvider, ProviderError, SuggestionProvider};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct FakeProvider {
    name: &'static str,
    reply: Option<&'static str>,
    calls: Arc<AtomicUsize>,
}

impl FakeProvider {
    fn boxed(
        name: &'static str,
        reply: Option<&'static str>,
    ) -> (Box<dyn SuggestionProvider>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let provider = FakeProvider {
            name,
            reply,
            calls: calls.clone(),
        };
        (Box::new(provider), calls)
    }
}

#[async_trait]
impl SuggestionProvider for FakeProvider {
    fn name(&self) -> &str {
        self.name
    }

    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert!(prompt.contains("DETECTED ISSUES:"));
        match self.reply {
            Some(text) => Ok(text.to_string()),
            None => Err(ProviderError::EmptyResponse {
                provider: AIProvider::Ollama,
            }),
        }
    }
}

fn sample_issues() -> Vec<Issue> {
    vec![
        Issue::new(IssueKind::MissingDocstring, IssueDetail::text("load"), Some("load")),
        Issue::new(IssueKind::MagicNumber, IssueDetail::Int(42), Some("load")),
    ]
}

#[tokio::test]
async fn no_issues_skips_every_backend() {
    let (first, calls) = FakeProvider::boxed("first", Some("1. Something"));
    let resolver = FeedbackResolver::new(vec![first]);

    let feedback = resolver.resolve(&[], "x = 1\n").await;

    assert_eq!(feedback.suggestions, vec![NO_ISSUES_MESSAGE.to_string()]);
    assert_eq!(feedback.source, FeedbackSource::NoIssues);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn first_successful_backend_wins() {
    let (failing, failing_calls) = FakeProvider::boxed("failing", None);
    let (working, working_calls) =
        FakeProvider::boxed("working", Some("1. Add a docstring\n2. Use a named constant\n"));
    let (unused, unused_calls) = FakeProvider::boxed("unused", Some("1. Never asked"));
    let resolver = FeedbackResolver::new(vec![failing, working, unused]);

    let feedback = resolver.resolve(&sample_issues(), "def load(): return 42").await;

    assert_eq!(
        feedback.suggestions,
        vec!["Add a docstring".to_string(), "Use a named constant".to_string()]
    );
    assert_eq!(feedback.source, FeedbackSource::Provider("working".into()));
    assert_eq!(failing_calls.load(Ordering::SeqCst), 1);
    assert_eq!(working_calls.load(Ordering::SeqCst), 1);
    assert_eq!(unused_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn blank_output_falls_through_to_next_backend() {
    let (blank, _) = FakeProvider::boxed("blank", Some("\n  \n1.\n"));
    let (working, _) = FakeProvider::boxed("working", Some("- Rename things"));
    let resolver = FeedbackResolver::new(vec![blank, working]);

    let feedback = resolver.resolve(&sample_issues(), "").await;

    assert_eq!(feedback.source, FeedbackSource::Provider("working".into()));
    assert_eq!(feedback.suggestions, vec!["Rename things".to_string()]);
}

#[tokio::test]
async fn all_backends_failing_uses_rule_based_feedback() {
    let (a, a_calls) = FakeProvider::boxed("a", None);
    let (b, b_calls) = FakeProvider::boxed("b", None);
    let resolver = FeedbackResolver::new(vec![a, b]);

    let feedback = resolver.resolve(&sample_issues(), "").await;

    assert_eq!(feedback.source, FeedbackSource::RuleBased);
    assert_eq!(
        feedback.suggestions,
        vec![
            "Add a proper docstring to 'load' explaining its purpose.".to_string(),
            "Replace magic numbers with constants.".to_string(),
        ]
    );
    assert_eq!(a_calls.load(Ordering::SeqCst), 1);
    assert_eq!(b_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn rule_based_only_resolver_never_calls_out() {
    let resolver = FeedbackResolver::rule_based_only();
    assert!(resolver.provider_names().is_empty());

    let issues = vec![Issue::new(IssueKind::DebugPrint, IssueDetail::text(""), None)];
    let feedback = resolver.resolve(&issues, "print(1)").await;

    assert_eq!(feedback.source, FeedbackSource::RuleBased);
    assert_eq!(feedback.joined(), "Remove debug print statements.");
}

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// Analyzer settings read from `[tool.ai_code_review]` in pyproject.toml
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Directory names (or glob patterns) skipped during discovery
    pub exclude_dirs: Vec<String>,
    pub complexity_threshold: f64,
    pub maintainability_threshold: f64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            exclude_dirs: vec![
                "venv".to_string(),
                ".venv".to_string(),
                "__pycache__".to_string(),
                "anaconda3".to_string(),
                "site-packages".to_string(),
            ],
            complexity_threshold: 10.0,
            maintainability_threshold: 65.0,
        }
    }
}

#[derive(Deserialize)]
struct PyProject {
    tool: Option<ToolTable>,
}

#[derive(Deserialize)]
struct ToolTable {
    ai_code_review: Option<AnalyzerConfig>,
}

impl AnalyzerConfig {
    /// Parse a pyproject.toml document. A document without our table yields defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        let doc: PyProject = toml::from_str(text)?;
        Ok(doc
            .tool
            .and_then(|tool| tool.ai_code_review)
            .unwrap_or_default())
    }

    /// Matcher over directory names listed in `exclude_dirs`
    pub fn exclude_matcher(&self) -> GlobSet {
        let mut builder = GlobSetBuilder::new();
        for pat in self.exclude_dirs.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
            match Glob::new(pat) {
                Ok(glob) => {
                    builder.add(glob);
                }
                Err(e) => debug!("ignoring invalid exclude pattern {pat:?}: {e}"),
            }
        }
        builder.build().unwrap_or_else(|_| GlobSet::empty())
    }
}

/// Load the analyzer configuration for this run.
///
/// Reads `AI_REVIEW_CONFIG` when set, otherwise `pyproject.toml` in the working
/// directory. Missing or malformed files fall back to defaults.
pub fn load_config() -> AnalyzerConfig {
    let path = std::env::var("AI_REVIEW_CONFIG")
        .ok()
        .filter(|p| !p.trim().is_empty())
        .unwrap_or_else(|| "pyproject.toml".to_string());
    load_config_from(Path::new(&path))
}

pub fn load_config_from(path: &Path) -> AnalyzerConfig {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            debug!("no config at {}: {e}; using defaults", path.display());
            return AnalyzerConfig::default();
        }
    };
    match AnalyzerConfig::from_toml_str(&text) {
        Ok(cfg) => cfg,
        Err(e) => {
            debug!("malformed config at {}: {e}; using defaults", path.display());
            AnalyzerConfig::default()
        }
    }
}

pub const DEFAULT_OPENROUTER_MODEL: &str = "google/gemma-3-4b-it:free";
pub const DEFAULT_OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.2";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Endpoints, models and keys of the suggestion backends
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSettings {
    pub openrouter_api_key: Option<String>,
    pub openrouter_model: String,
    pub openrouter_base_url: String,
    pub ollama_url: String,
    pub ollama_model: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            openrouter_api_key: None,
            openrouter_model: DEFAULT_OPENROUTER_MODEL.to_string(),
            openrouter_base_url: DEFAULT_OPENROUTER_BASE_URL.to_string(),
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            ollama_model: DEFAULT_OLLAMA_MODEL.to_string(),
            gemini_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
        }
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl ProviderSettings {
    /// Read provider settings from the environment; empty values count as unset
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            openrouter_api_key: non_empty_env("OPENROUTER_API_KEY"),
            openrouter_model: non_empty_env("OPENROUTER_MODEL").unwrap_or(defaults.openrouter_model),
            openrouter_base_url: non_empty_env("OPENROUTER_BASE_URL")
                .unwrap_or(defaults.openrouter_base_url),
            ollama_url: non_empty_env("OLLAMA_URL").unwrap_or(defaults.ollama_url),
            ollama_model: non_empty_env("OLLAMA_MODEL").unwrap_or(defaults.ollama_model),
            gemini_api_key: non_empty_env("GEMINI_API_KEY"),
            gemini_model: non_empty_env("GEMINI_MODEL").unwrap_or(defaults.gemini_model),
            gemini_base_url: non_empty_env("GEMINI_BASE_URL").unwrap_or(defaults.gemini_base_url),
        }
    }
}

/// Suggestion backends used by the feedback resolver

pub mod ai;

pub use ai::{
    providers_from_settings, AIProvider, GeminiProvider, OllamaProvider, OpenRouterProvider,
    ProviderError, SuggestionProvider,
};

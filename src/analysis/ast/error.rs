use thiserror::Error;

#[derive(Debug, Error)]
pub enum AstError {
    #[error("source code too large ({0} bytes), potential DoS risk")]
    SourceTooLarge(usize),

    #[error("failed to load the Python grammar: {0}")]
    GrammarUnavailable(String),

    #[error("failed to parse Python source code")]
    ParseFailed,

    #[error("Syntax Error: {reason} (line {line}, column {column})")]
    Syntax {
        line: usize,
        column: usize,
        reason: String,
    },
}

impl AstError {
    pub fn is_syntax(&self) -> bool {
        matches!(self, AstError::Syntax { .. })
    }
}

use thiserror::Error;

/// Everything that can go wrong between a caller and the completion service.
#[derive(Debug, Error)]
pub enum NutriError {
    /// Caller-supplied data failed a precondition (empty description, empty message list).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The service credential is missing. Retrying will not help.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Upstream kept answering 429 until the retry budget ran out.
    #[error("rate limited by completion service after {attempts} attempts")]
    RateLimited { attempts: u32 },

    /// Any other non-success status, or a transport failure (no status).
    #[error("completion service error ({}): {body}", status_label(.status))]
    Gateway { status: Option<u16>, body: String },

    /// Upstream content was not valid JSON.
    #[error("could not parse completion content: {0}")]
    Parse(String),

    /// Valid JSON, but the ingredient list was empty, missing or malformed.
    #[error("no ingredients found in completion content")]
    NoIngredientsFound,
}

fn status_label(status: &Option<u16>) -> String {
    match status {
        Some(code) => code.to_string(),
        None => "transport".to_string(),
    }
}

pub type Result<T, E = NutriError> = std::result::Result<T, E>;

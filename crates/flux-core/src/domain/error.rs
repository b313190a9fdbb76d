//! Error taxonomy for the conversion pipeline.
//!
//! Configuration problems are fatal at startup; upstream HTTP failures are
//! sub-classified (auth, rate-limit, generic) so the CLI can print an
//! actionable message; retry exhaustion is a terminal, named condition.

/// Errors produced anywhere in the conversion pipeline.
#[derive(Debug, thiserror::Error)]
pub enum FluxError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("authentication failed ({status}): {message}")]
    AuthFailed { status: u16, message: String },

    #[error("rate limit exceeded: {message}")]
    RateLimited { message: String },

    #[error("upstream API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("cannot reach {url}: {message}")]
    Network { url: String, message: String },

    #[error("invalid upstream response: {0}")]
    InvalidResponse(String),

    #[error("unresolved compile errors after {attempts} repair attempts: {}", errors.join("; "))]
    UnresolvedErrors { attempts: u32, errors: Vec<String> },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, FluxError>;

use std::fmt;

/// Advisory classification of a failed provider call. Used for logging
/// and the terminal `ChainExhausted` error only; it never changes which
/// providers are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    TokenLimit,
    RateLimit,
    Timeout,
    Other,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorKind::TokenLimit => "token_limit",
            ErrorKind::RateLimit => "rate_limit",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Other => "error",
        };
        f.write_str(label)
    }
}

/// Best-effort substring classification over whatever diagnostic text a
/// failed call surfaces. Pure so it can be tested against a fixture table
/// of known provider error strings without network access.
pub fn classify(diagnostic: &str) -> ErrorKind {
    let text = diagnostic.to_lowercase();

    let token_markers = [
        "context_length",
        "context length",
        "token limit",
        "too many tokens",
        "maximum context",
    ];
    if token_markers.iter().any(|m| text.contains(m)) {
        return ErrorKind::TokenLimit;
    }

    if text.contains("rate limit") || text.contains("rate_limit") || text.contains("too many requests")
    {
        return ErrorKind::RateLimit;
    }

    if text.contains("timeout") || text.contains("timed out") {
        return ErrorKind::Timeout;
    }

    ErrorKind::Other
}

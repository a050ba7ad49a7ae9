use crate::error::AgentError;

/// Parse a provider reply into a JSON value. The reply is untrusted
/// free text: models wrap output in markdown fences or prefix it with
/// prose despite instructions, so fences are stripped and the first
/// balanced object is extracted before parsing.
pub fn parse_result_value(raw: &str) -> Result<serde_json::Value, AgentError> {
    let stripped = strip_code_fences(raw);

    if stripped.starts_with('{') {
        if let Ok(value) = serde_json::from_str(stripped) {
            return Ok(value);
        }
    }

    if let Some(candidate) = first_balanced_object(stripped) {
        if let Ok(value) = serde_json::from_str(candidate) {
            return Ok(value);
        }
    }

    Err(AgentError::Parse(format!(
        "no valid JSON object found in response (length={})",
        raw.len()
    )))
}

/// Remove surrounding ```json / ``` markers, leaving the inner text.
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the language tag (e.g. "json") up to the first newline.
    let body = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => rest,
    };
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Find the first balanced `{ ... }` in the text, respecting strings and
/// escapes.
fn first_balanced_object(text: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut start = None;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, ch) in text.char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            '{' if !in_string => {
                if depth == 0 {
                    start = Some(i);
                }
                depth += 1;
            }
            '}' if !in_string => {
                if depth > 0 {
                    depth -= 1;
                    if depth == 0 {
                        return start.map(|s| &text[s..=i]);
                    }
                }
            }
            _ => {}
        }
    }

    None
}

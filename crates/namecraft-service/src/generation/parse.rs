//! Extracting a name object from raw model output.
//!
//! Models wrap JSON in prose or code fences often enough that the whole reply
//! cannot be parsed directly.

use namecraft_core::NameData;

/// Parse the first usable JSON object out of `raw`.
///
/// Tries the span from the first `{` to the last `}` first, then the first
/// balanced `{...}` object. Returns `None` when neither decodes.
#[must_use]
pub fn parse_name(raw: &str) -> Option<NameData> {
    outer_span(raw)
        .and_then(|span| serde_json::from_str(span).ok())
        .or_else(|| first_balanced_object(raw).and_then(|span| serde_json::from_str(span).ok()))
}

fn outer_span(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

/// The first `{...}` whose braces balance, ignoring braces inside strings.
fn first_balanced_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in raw[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&raw[start..=start + offset]);
                }
            }
            _ => {}
        }
    }

    None
}

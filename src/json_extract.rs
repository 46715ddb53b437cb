//! Locating a JSON object inside free-form model output.
//!
//! Language models wrap their JSON in prose, code fences, or trailing
//! commentary. This scanner walks the text once and returns the first
//! syntactically balanced `{...}` span, tracking string and escape state so
//! braces inside string literals do not affect the depth count.

/// Returns the first balanced `{...}` substring of `text`, or `None` when no
/// complete object is present.
///
/// The returned slice is a candidate only; callers still run it through a
/// real JSON parser.
pub fn first_json_object(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let start = text.find('{')?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &b) in bytes[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }

        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }

    None
}

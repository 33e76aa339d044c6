//! Fenced-code-block stripping for model output.
//!
//! Best-effort: the result is the text between the first fence (after an
//! optional language tag line) and the last fence. The first line after the
//! fence is treated as a tag only when the next 10 characters are not all
//! blank and a newline follows within 20 characters. Input with a single
//! fence, or fences inside the code itself, slices unpredictably; callers
//! must not rely on valid code in that case.

const FENCE: &str = "```";
const TAG_HEAD_CHARS: usize = 10;
const TAG_WINDOW_CHARS: usize = 20;

/// Strip an optional fenced block wrapper and trim
pub fn extract_code(raw: &str) -> &str {
    let Some(open) = raw.find(FENCE) else {
        return raw.trim();
    };

    let mut start = open + FENCE.len();

    // A long first line is code, not a tag
    let rest = &raw[start..];
    if !head(rest, TAG_HEAD_CHARS).trim().is_empty()
        && head(rest, TAG_WINDOW_CHARS).contains('\n')
    {
        if let Some(newline) = rest.find('\n') {
            start += newline + 1;
        }
    }

    // `rfind` can land on the opening fence when there is only one
    let end = raw.rfind(FENCE).unwrap_or(raw.len());
    if end <= start {
        return "";
    }

    raw[start..end].trim()
}

/// The first `chars` characters of `s`
fn head(s: &str, chars: usize) -> &str {
    match s.char_indices().nth(chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

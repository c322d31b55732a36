/// Longest prompt prefix written to the log.
pub const PROMPT_PREVIEW_BYTES: usize = 100;

/// Truncates a string to at most `max_bytes` on a UTF-8 boundary.
/// Adds an ellipsis if truncated.
pub fn truncate_utf8_with_ellipsis(s: &str, max_bytes: usize) -> String {
    if s.len() <= max_bytes {
        return s.to_string();
    }

    let end = s
        .char_indices()
        .map(|(i, ch)| i + ch.len_utf8())
        .take_while(|next| *next <= max_bytes)
        .last()
        .unwrap_or(0);

    format!("{}...", &s[..end])
}

/// Single-line preview of a prompt for log output.
pub fn prompt_preview(prompt: &str) -> String {
    let flat = prompt.replace(['\r', '\n'], " ");
    truncate_utf8_with_ellipsis(&flat, PROMPT_PREVIEW_BYTES)
}

/// Drops a `data:<mime>;base64,` style prefix, keeping everything after the
/// first comma. Input without a comma is returned unchanged.
pub fn strip_data_uri_prefix(data: &str) -> &str {
    match data.find(',') {
        Some(idx) => &data[idx + 1..],
        None => data,
    }
}

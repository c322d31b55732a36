use crate::llm::utils::string_util::{prompt_preview, strip_data_uri_prefix, truncate_utf8_with_ellipsis};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_utf8_with_ellipsis("short", 10), "short");
        // "é" is two bytes; a cut at 3 must not split it
        assert_eq!(truncate_utf8_with_ellipsis("aéé", 4), "aé...");
        assert_eq!(truncate_utf8_with_ellipsis("aéé", 2), "a...");
    }

    #[test]
    fn preview_is_single_line_and_bounded() {
        let prompt = format!("line one\nline two {}", "z".repeat(500));
        let preview = prompt_preview(&prompt);
        assert!(!preview.contains('\n'));
        assert!(preview.len() <= 103);
    }

    #[test]
    fn data_uri_prefix_removed() {
        assert_eq!(strip_data_uri_prefix("data:image/png;base64,AAAA"), "AAAA");
        assert_eq!(strip_data_uri_prefix("AAAA"), "AAAA");
    }
}

const THINK_OPEN: &str = "<think>";
const THINK_CLOSE: &str = "</think>";

/// Removes well-formed `<think>...</think>` blocks, delimiters included.
/// Blocks may span lines; an unclosed `<think>` is left untouched.
pub fn strip_thinking(text: &str) -> String {
    let mut result = text.to_string();

    while let Some(start) = result.find(THINK_OPEN) {
        let Some(close) = result[start + THINK_OPEN.len()..].find(THINK_CLOSE) else {
            break;
        };
        let end = start + THINK_OPEN.len() + close + THINK_CLOSE.len();
        result.replace_range(start..end, "");
    }

    result
}

/// Turns raw model output into the single-line caption that gets persisted.
pub fn finalize_caption(raw: &str) -> String {
    strip_thinking(raw).replace('\n', " ").trim().to_string()
}

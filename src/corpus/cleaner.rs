// Passage text cleaning: markup removal and whitespace collapsing
use regex::Regex;
use std::sync::OnceLock;

/// A tag opens with a letter or `/` and holds no other `<`, so
/// comparisons such as `2 < 3` are left alone.
fn tag_pattern() -> &'static Regex {
    static TAG_RE: OnceLock<Regex> = OnceLock::new();
    TAG_RE.get_or_init(|| Regex::new(r"</?[A-Za-z][^<>]*>").expect("valid tag regex"))
}

fn whitespace_pattern() -> &'static Regex {
    static WS_RE: OnceLock<Regex> = OnceLock::new();
    WS_RE.get_or_init(|| Regex::new(r"\s+").expect("valid whitespace regex"))
}

/// Strip HTML markup, decode entities, and collapse every whitespace run
/// (newlines included) into a single space.
pub fn clean_text(text: &str) -> String {
    let without_tags = tag_pattern().replace_all(text, "");
    let decoded = html_escape::decode_html_entities(&without_tags);
    whitespace_pattern()
        .replace_all(&decoded, " ")
        .trim()
        .to_string()
}

/// Format a pattern/response pair as the two-line Q/A block, then clean it.
pub fn format_passage(pattern: &str, response: &str) -> String {
    clean_text(&format!("Q: {}\nA: {}", pattern, response))
}

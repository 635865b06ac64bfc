// Answer extraction from raw model output
use regex::Regex;
use std::sync::OnceLock;

/// Closing marker of the instruction block
pub const INSTRUCTION_END: &str = "[/INST]";

fn sentence_boundary() -> &'static Regex {
    static BOUNDARY_RE: OnceLock<Regex> = OnceLock::new();
    BOUNDARY_RE.get_or_init(|| Regex::new(r"[.!?]\s+").expect("valid sentence regex"))
}

/// Keep only the text after the last `[/INST]`, trimmed.
pub fn strip_instruction(raw: &str) -> &str {
    match raw.rfind(INSTRUCTION_END) {
        Some(pos) => raw[pos + INSTRUCTION_END.len()..].trim(),
        None => raw.trim(),
    }
}

/// Split after `.`, `!` or `?` followed by whitespace; the whitespace is dropped.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;

    for boundary in sentence_boundary().find_iter(text) {
        // punctuation is one byte
        sentences.push(&text[start..boundary.start() + 1]);
        start = boundary.end();
    }
    sentences.push(&text[start..]);

    sentences
}

/// Drop a trailing sentence that was likely cut off by the token limit.
///
/// Single-sentence text is returned trimmed.
pub fn trim_cutoff(text: &str) -> String {
    let sentences = split_sentences(text);
    if sentences.len() > 1 {
        sentences[..sentences.len() - 1].join(" ")
    } else {
        text.trim().to_string()
    }
}

/// Full cleanup: instruction strip, then cutoff trim.
pub fn extract_answer(raw: &str) -> String {
    trim_cutoff(strip_instruction(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::TestResult;
    use quickcheck_macros::quickcheck;

    #[test]
    fn test_strip_keeps_text_after_last_marker() {
        assert_eq!(strip_instruction("a [/INST] b [/INST]  answer "), "answer");
    }

    #[test]
    fn test_strip_without_marker() {
        assert_eq!(strip_instruction("  plain answer\n"), "plain answer");
    }

    #[test]
    fn test_split_sentences() {
        assert_eq!(
            split_sentences("One. Two!  Three? Four"),
            vec!["One.", "Two!", "Three?", "Four"]
        );
    }

    #[test]
    fn test_split_needs_whitespace_after_punctuation() {
        assert_eq!(split_sentences("Version 1.2 is out"), vec!["Version 1.2 is out"]);
    }

    #[test]
    fn test_trim_cutoff_drops_last_sentence() {
        assert_eq!(trim_cutoff("First. Second. Third is cut"), "First. Second.");
    }

    #[test]
    fn test_trim_cutoff_drops_complete_last_sentence_too() {
        assert_eq!(trim_cutoff("First sentence. Second sentence."), "First sentence.");
    }

    #[test]
    fn test_single_sentence_verbatim() {
        assert_eq!(trim_cutoff("Only one sentence here."), "Only one sentence here.");
    }

    #[test]
    fn test_extract_example() {
        assert_eq!(
            extract_answer("garbage [/INST] First sentence. Second sentence."),
            "First sentence."
        );
    }

    #[test]
    fn test_extract_empty_after_marker() {
        assert_eq!(extract_answer("prompt [/INST]   "), "");
    }

    #[test]
    fn test_newlines_count_as_boundaries() {
        assert_eq!(extract_answer("[/INST] Line one.\nLine two"), "Line one.");
    }

    #[quickcheck]
    fn prop_idempotent_on_single_sentence(text: String) -> TestResult {
        if text.contains(INSTRUCTION_END) || split_sentences(text.trim()).len() > 1 {
            return TestResult::discard();
        }
        let once = extract_answer(&text);
        TestResult::from_bool(extract_answer(&once) == once)
    }
}

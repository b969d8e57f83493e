//! Removal of template syntax from prompt text.

use regex::Regex;
use std::sync::LazyLock;

static SYNTAX_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"<lora:.*?>",
        r"<style:.*?>",
        r"__.*?__",
        r"\[\d+\$.*?\]",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("valid syntax pattern"))
    .collect()
});

static BRACE_GROUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[^{}]*\}").expect("valid brace pattern"));

const STRAY_CHARACTERS: [char; 7] = ['<', '>', '[', ']', '{', '}', '_'];

/// Strip LoRA and style tags, wildcard tokens, bracketed count syntax and
/// brace groups, then tidy leftover separators.
pub fn strip_syntax(text: &str) -> String {
    let mut out = text.to_string();
    for pattern in SYNTAX_PATTERNS.iter() {
        out = pattern.replace_all(&out, "").into_owned();
    }
    while BRACE_GROUP.is_match(&out) {
        out = BRACE_GROUP.replace_all(&out, "").into_owned();
    }

    let out = out
        .replace("  ", " ")
        .replace(",,", ",")
        .replace(" , ", ", ");
    out.trim_matches(|c: char| c == ' ' || c == ',')
        .chars()
        .filter(|c| !STRAY_CHARACTERS.contains(c))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_every_construct() {
        assert_eq!(strip_syntax("<lora:x:1.0>a__w__b{c|d}"), "ab");
    }

    #[test]
    fn test_plain_text_unchanged() {
        assert_eq!(strip_syntax("a cat, sitting"), "a cat, sitting");
    }

    #[test]
    fn test_tidies_separators() {
        assert_eq!(
            strip_syntax("<style:noir>, portrait , <lora:face:0.7>soft"),
            "portrait, soft"
        );
        assert_eq!(strip_syntax("a,,b  c"), "a,b c");
    }

    #[test]
    fn test_bracketed_counts() {
        assert_eq!(strip_syntax("hat [2$__hats__] on"), "hat on");
        assert_eq!(strip_syntax("[3$a|b]x"), "x");
    }

    #[test]
    fn test_nested_braces() {
        assert_eq!(strip_syntax("a{b|{c|d}}e"), "ae");
    }

    #[test]
    fn test_stray_characters_removed() {
        assert_eq!(strip_syntax("snake_case <b> [x]"), "snakecase b x");
    }
}

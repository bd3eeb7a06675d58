//! Inline markup stripping for Word output.
//!
//! Word paragraphs carry plain text, so emphasis markers, code spans and link
//! syntax are removed while their visible text is kept. Rules run in order;
//! images go before links because `![alt](src)` contains a link.
//!
//! 1. `![alt](src)` → `alt`
//! 2. `[text](url)` → `text`
//! 3. `` `code` `` → `code`
//! 4. `**strong**` / `__strong__` → `strong`
//! 5. `~~struck~~` → `struck`
//! 6. `*em*` → `em`
//! 7. `<br>` and other inline HTML tags → removed
//!
//! Underscore emphasis (`_em_`) is left alone so identifiers like
//! `max_rendered_pixels` survive.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_IMAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"!\[([^\]]*)\]\([^)]*\)").unwrap());
static RE_LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\]]+)\]\([^)]*\)").unwrap());
static RE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`]+)`").unwrap());
static RE_STRONG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*([^*]+)\*\*|__([^_]+)__").unwrap());
static RE_STRIKE: Lazy<Regex> = Lazy::new(|| Regex::new(r"~~([^~]+)~~").unwrap());
static RE_EM: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*([^*\s][^*]*)\*").unwrap());
static RE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"</?[A-Za-z][^<>]*>").unwrap());

/// Strip inline Markdown from a single run of text.
pub fn strip_inline(text: &str) -> String {
    let s = RE_IMAGE.replace_all(text, "$1");
    let s = RE_LINK.replace_all(&s, "$1");
    let s = RE_CODE.replace_all(&s, "$1");
    let s = RE_STRONG.replace_all(&s, "${1}${2}");
    let s = RE_STRIKE.replace_all(&s, "$1");
    let s = RE_EM.replace_all(&s, "$1");
    let s = RE_TAG.replace_all(&s, "");
    s.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_unchanged() {
        assert_eq!(strip_inline("just text, 1 * 2 = 2"), "just text, 1 * 2 = 2");
    }

    #[test]
    fn strong_and_em() {
        assert_eq!(strip_inline("**bold** and *italic*"), "bold and italic");
        assert_eq!(strip_inline("__bold__"), "bold");
    }

    #[test]
    fn underscores_in_identifiers_survive() {
        assert_eq!(strip_inline("set max_rate_hz first"), "set max_rate_hz first");
    }

    #[test]
    fn code_span() {
        assert_eq!(strip_inline("call `init()` once"), "call init() once");
    }

    #[test]
    fn links_and_images() {
        assert_eq!(
            strip_inline("see [the docs](https://example.org) or ![chart](c.png)"),
            "see the docs or chart"
        );
    }

    #[test]
    fn strikethrough_and_tags() {
        assert_eq!(strip_inline("~~old~~ new<br>line"), "old newline");
    }
}

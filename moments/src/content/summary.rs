//! Plain-text projections of rendered moment markdown, for feed summaries.

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use serde::Serialize;

/// Which markdown constructs a document uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ContentElements {
    pub headings: bool,
    pub lists: bool,
    pub code: bool,
    pub quotes: bool,
    pub links: bool,
    pub images: bool,
}

fn parser(markdown: &str) -> Parser<'_> {
    Parser::new_ext(markdown, Options::ENABLE_STRIKETHROUGH)
}

/// Text content of `markdown` with all syntax removed.
///
/// Heading, list and quote markers, emphasis and HTML tags are dropped; link
/// labels and image alt text are kept; code (fenced or inline) is omitted.
/// Whitespace, including line breaks, collapses to single spaces.
pub fn to_plain_text(markdown: &str) -> String {
    if markdown.is_empty() {
        return String::new();
    }

    let mut out = String::new();
    let mut in_code_block = false;

    for event in parser(markdown) {
        match event {
            Event::Start(Tag::CodeBlock(_)) => in_code_block = true,
            Event::End(TagEnd::CodeBlock) => {
                in_code_block = false;
                out.push(' ');
            }
            Event::Text(text) if !in_code_block => out.push_str(&text),
            Event::SoftBreak | Event::HardBreak => out.push(' '),
            Event::Start(Tag::Item) => out.push(' '),
            Event::End(TagEnd::Paragraph | TagEnd::Heading(_) | TagEnd::Item) => out.push(' '),
            _ => {}
        }
    }

    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Plain text cut to `max_chars` characters, with `...` appended when cut.
pub fn summarize(markdown: &str, max_chars: usize) -> String {
    let plain = to_plain_text(markdown);
    if plain.chars().count() <= max_chars {
        return plain;
    }
    let mut short: String = plain.chars().take(max_chars).collect();
    short.push_str("...");
    short
}

/// First `max_chars` characters of the plain text, without an ellipsis.
pub fn truncate_plain(plain: &str, max_chars: usize) -> String {
    plain.chars().take(max_chars).collect()
}

pub fn detect_elements(markdown: &str) -> ContentElements {
    let mut found = ContentElements::default();

    for event in parser(markdown) {
        if let Event::Start(tag) = event {
            match tag {
                Tag::Heading { .. } => found.headings = true,
                Tag::List(None) => found.lists = true,
                Tag::CodeBlock(_) => found.code = true,
                Tag::BlockQuote(..) => found.quotes = true,
                Tag::Link { .. } => found.links = true,
                Tag::Image { .. } => found.images = true,
                _ => {}
            }
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = "# Trip\n\n- **Day one** at the [lake](https://x)\n  - swim\n\n> calm *water*\n\n\n```rust\nlet x = 1;\n```\n\nUse `cargo` here<u>now</u>\n\n";

    #[test]
    fn test_plain_text_strips_syntax() {
        assert_eq!(
            to_plain_text(SAMPLE),
            "Trip Day one at the lake swim calm water Use herenow"
        );
    }

    #[test]
    fn test_plain_text_of_empty_is_empty() {
        assert_eq!(to_plain_text(""), "");
    }

    #[test]
    fn test_image_alt_text_kept() {
        assert_eq!(to_plain_text("![a cat](http://x/c.png) sat"), "a cat sat");
    }

    #[test]
    fn test_summarize_truncates_by_characters() {
        assert_eq!(summarize("hello world", 5), "hello...");
        assert_eq!(summarize("hello", 5), "hello");
        assert_eq!(summarize("日本語のテキスト", 3), "日本語...");
    }

    #[test]
    fn test_truncate_plain_has_no_ellipsis() {
        assert_eq!(truncate_plain("abcdef", 3), "abc");
        assert_eq!(truncate_plain("ab", 3), "ab");
    }

    #[test]
    fn test_detect_elements() {
        let found = detect_elements(SAMPLE);
        assert_eq!(
            found,
            ContentElements {
                headings: true,
                lists: true,
                code: true,
                quotes: true,
                links: true,
                images: false,
            }
        );
        assert_eq!(detect_elements("just text"), ContentElements::default());
    }

    #[test]
    fn test_ordered_lists_are_not_flagged() {
        assert!(!detect_elements("1. first\n2. second\n").lists);
        assert!(detect_elements("- [ ] todo\n").lists);
        assert!(detect_elements("1. first\n\n- bullet\n").lists);
    }
}

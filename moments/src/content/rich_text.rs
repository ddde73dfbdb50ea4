//! Inline markdown for Notion rich-text runs.

use serde::Deserialize;

const DEFAULT_COLOR: &str = "default";

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

/// Style flags attached to a run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Annotations {
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub strikethrough: bool,
    #[serde(default)]
    pub underline: bool,
    #[serde(default)]
    pub code: bool,
    #[serde(default = "default_color")]
    pub color: String,
}

impl Default for Annotations {
    fn default() -> Self {
        Self {
            bold: false,
            italic: false,
            strikethrough: false,
            underline: false,
            code: false,
            color: default_color(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Link {
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TextBody {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub link: Option<Link>,
}

/// One span of a rich-text array, as returned by the Notion API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TextRun {
    #[serde(default)]
    pub plain_text: String,
    #[serde(default)]
    pub annotations: Annotations,
    #[serde(default)]
    pub text: Option<TextBody>,
}

impl TextRun {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            plain_text: text.into(),
            ..Default::default()
        }
    }

    pub fn bold(mut self) -> Self {
        self.annotations.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.annotations.italic = true;
        self
    }

    pub fn strikethrough(mut self) -> Self {
        self.annotations.strikethrough = true;
        self
    }

    pub fn underline(mut self) -> Self {
        self.annotations.underline = true;
        self
    }

    pub fn code(mut self) -> Self {
        self.annotations.code = true;
        self
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.annotations.color = color.into();
        self
    }

    pub fn link(mut self, url: impl Into<String>) -> Self {
        let body = self.text.get_or_insert_with(|| TextBody {
            content: self.plain_text.clone(),
            link: None,
        });
        body.link = Some(Link { url: url.into() });
        self
    }

    pub fn link_url(&self) -> Option<&str> {
        self.text
            .as_ref()
            .and_then(|body| body.link.as_ref())
            .map(|link| link.url.as_str())
    }

    /// Markdown for this run alone.
    ///
    /// Wrapping order is fixed: code, bold, italic, strikethrough, underline,
    /// color, and finally the link so the label keeps its formatting.
    pub fn to_markdown(&self) -> String {
        let mut out = self.plain_text.clone();
        let a = &self.annotations;

        if a.code {
            out = format!("`{out}`");
        }
        if a.bold {
            out = format!("**{out}**");
        }
        if a.italic {
            out = format!("*{out}*");
        }
        if a.strikethrough {
            out = format!("~~{out}~~");
        }
        // Markdown has no underline or color syntax; inline HTML covers both.
        if a.underline {
            out = format!("<u>{out}</u>");
        }
        if !a.color.is_empty() && a.color != DEFAULT_COLOR {
            out = format!("<span style=\"color: {}\">{out}</span>", a.color);
        }
        if let Some(url) = self.link_url() {
            out = format!("[{out}]({url})");
        }

        out
    }
}

/// Concatenates the markdown of every run with no separator.
pub fn to_markdown(runs: &[TextRun]) -> String {
    runs.iter().map(TextRun::to_markdown).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_empty_input_is_empty_string() {
        assert_eq!(to_markdown(&[]), "");
    }

    #[test]
    fn test_plain_runs_concatenate_without_separator() {
        let runs = vec![TextRun::plain("Hello, "), TextRun::plain("world")];
        assert_eq!(to_markdown(&runs), "Hello, world");
    }

    #[test]
    fn test_code_wraps_before_bold_and_italic() {
        let run = TextRun::plain("text").bold().italic().code();
        assert_eq!(run.to_markdown(), "***`text`***");
    }

    #[test]
    fn test_strikethrough_and_underline_nesting() {
        let run = TextRun::plain("gone").strikethrough().underline();
        assert_eq!(run.to_markdown(), "<u>~~gone~~</u>");
    }

    #[test]
    fn test_color_span_skips_default() {
        assert_eq!(TextRun::plain("x").color("default").to_markdown(), "x");
        assert_eq!(
            TextRun::plain("x").color("red").bold().to_markdown(),
            "<span style=\"color: red\">**x**</span>"
        );
    }

    #[test]
    fn test_link_is_outermost() {
        let run = TextRun::plain("docs")
            .bold()
            .underline()
            .color("blue")
            .link("https://example.com");
        assert_eq!(
            run.to_markdown(),
            "[<span style=\"color: blue\"><u>**docs**</u></span>](https://example.com)"
        );
    }

    #[test]
    fn test_deserializes_notion_rich_text() {
        let raw = json!([
            {
                "type": "text",
                "text": { "content": "see ", "link": null },
                "annotations": {
                    "bold": false, "italic": true, "strikethrough": false,
                    "underline": false, "code": false, "color": "default"
                },
                "plain_text": "see ",
                "href": null
            },
            {
                "type": "text",
                "text": { "content": "here", "link": { "url": "https://notion.so" } },
                "annotations": {
                    "bold": true, "italic": false, "strikethrough": false,
                    "underline": false, "code": false, "color": "default"
                },
                "plain_text": "here",
                "href": "https://notion.so"
            }
        ]);

        let runs: Vec<TextRun> = serde_json::from_value(raw).unwrap();
        assert_eq!(to_markdown(&runs), "*see *[**here**](https://notion.so)");
    }

    #[test]
    fn test_mention_run_without_text_body_is_plain() {
        let raw = json!({
            "type": "mention",
            "mention": { "type": "date", "date": { "start": "2024-05-01" } },
            "plain_text": "May 1, 2024"
        });
        let run: TextRun = serde_json::from_value(raw).unwrap();
        assert_eq!(run.annotations.color, "default");
        assert_eq!(run.to_markdown(), "May 1, 2024");
    }
}

//! Block tree → markdown, plus the media side lists.

use super::block::{Block, BlockKind};

fn indent(depth: usize) -> String {
    "  ".repeat(depth)
}

/// Renders `blocks` depth-first into one markdown document.
///
/// Image nodes are skipped; their URLs go through [`collect_images`] instead.
/// Numbered items always render as `1.`, leaving numbering to the markdown
/// renderer downstream.
pub fn blocks_to_markdown(blocks: &[Block], depth: usize) -> String {
    let mut md = String::new();
    for block in blocks {
        render_block(block, depth, &mut md);
    }
    md
}

fn render_block(block: &Block, depth: usize, md: &mut String) {
    let text = block.text.as_str();

    match &block.kind {
        BlockKind::Image { .. } => return,
        BlockKind::Heading1 => {
            md.push_str(&format!("# {text}\n\n"));
            return;
        }
        BlockKind::Heading2 => {
            md.push_str(&format!("## {text}\n\n"));
            return;
        }
        BlockKind::Heading3 => {
            md.push_str(&format!("### {text}\n\n"));
            return;
        }
        BlockKind::BulletedItem => {
            md.push_str(&format!("{}- {text}\n", indent(depth)));
        }
        BlockKind::NumberedItem => {
            md.push_str(&format!("{}1. {text}\n", indent(depth)));
        }
        BlockKind::Todo { checked } => {
            let mark = if *checked { 'x' } else { ' ' };
            md.push_str(&format!("{}- [{mark}] {text}\n", indent(depth)));
        }
        BlockKind::Quote => {
            md.push_str(&format!("{}> {text}\n\n", indent(depth)));
        }
        BlockKind::Code { language } => {
            md.push_str(&format!("\n```{language}\n{text}\n```\n\n"));
            return;
        }
        BlockKind::Callout => {
            md.push_str(&format!("> {text}\n\n"));
            md.push_str(&blocks_to_markdown(&block.children, depth));
            return;
        }
        BlockKind::Paragraph | BlockKind::Video { .. } | BlockKind::Other => {
            render_paragraph(text, md);
        }
    }

    md.push_str(&blocks_to_markdown(&block.children, depth + 1));
}

/// Multi-line text becomes one paragraph per non-blank line.
fn render_paragraph(text: &str, md: &mut String) {
    if text.contains('\n') {
        for line in text.lines() {
            if !line.trim().is_empty() {
                md.push_str(line);
                md.push_str("\n\n");
            }
        }
    } else {
        md.push_str(text);
        md.push_str("\n\n");
    }
}

fn collect_media(blocks: &[Block], want_video: bool, out: &mut Vec<String>) {
    for block in blocks {
        let url = match &block.kind {
            BlockKind::Image { url } if !want_video => url.as_deref(),
            BlockKind::Video { url } if want_video => url.as_deref(),
            _ => None,
        };
        if let Some(url) = url {
            out.push(url.to_string());
        }
        collect_media(&block.children, want_video, out);
    }
}

/// Image URLs in document order.
pub fn collect_images(blocks: &[Block]) -> Vec<String> {
    let mut images = Vec::new();
    collect_media(blocks, false, &mut images);
    images
}

/// Video URLs in document order.
pub fn collect_videos(blocks: &[Block]) -> Vec<String> {
    let mut videos = Vec::new();
    collect_media(blocks, true, &mut videos);
    videos
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn item(kind: BlockKind, text: &str) -> Block {
        Block::new(kind, text)
    }

    #[test]
    fn test_headings_and_nested_bullets() {
        let tree = vec![
            item(BlockKind::Heading1, "Hi"),
            item(BlockKind::BulletedItem, "A")
                .with_children(vec![item(BlockKind::BulletedItem, "B")]),
            Block::image("http://x/i.png"),
        ];

        assert_eq!(blocks_to_markdown(&tree, 0), "# Hi\n\n- A\n  - B\n");
        assert_eq!(collect_images(&tree), vec!["http://x/i.png"]);
        assert!(collect_videos(&tree).is_empty());
    }

    #[test]
    fn test_numbered_items_always_render_one() {
        let tree = vec![
            item(BlockKind::NumberedItem, "first"),
            item(BlockKind::NumberedItem, "second"),
            item(BlockKind::NumberedItem, "third"),
        ];
        let md = blocks_to_markdown(&tree, 0);
        assert_eq!(md, "1. first\n1. second\n1. third\n");
        assert_eq!(blocks_to_markdown(&tree, 0), md);
    }

    #[test]
    fn test_todo_items_and_children() {
        let tree = vec![
            item(BlockKind::Todo { checked: true }, "done")
                .with_children(vec![item(BlockKind::Todo { checked: false }, "sub")]),
        ];
        assert_eq!(blocks_to_markdown(&tree, 0), "- [x] done\n  - [ ] sub\n");
    }

    #[test]
    fn test_quote_indents_children_but_callout_does_not() {
        let quote = vec![item(BlockKind::Quote, "q")
            .with_children(vec![item(BlockKind::BulletedItem, "inner")])];
        assert_eq!(blocks_to_markdown(&quote, 0), "> q\n\n  - inner\n");

        let callout = vec![item(BlockKind::Callout, "note")
            .with_children(vec![item(BlockKind::BulletedItem, "inner")])];
        assert_eq!(blocks_to_markdown(&callout, 0), "> note\n\n- inner\n");
    }

    #[test]
    fn test_nested_quote_is_indented() {
        let tree = vec![item(BlockKind::BulletedItem, "a")
            .with_children(vec![item(BlockKind::Quote, "said")])];
        assert_eq!(blocks_to_markdown(&tree, 0), "- a\n  > said\n\n");
    }

    #[test]
    fn test_code_block_fenced_with_language() {
        let tree = vec![item(
            BlockKind::Code {
                language: "rust".to_string(),
            },
            "let x = 1;\nlet y = 2;",
        )];
        assert_eq!(
            blocks_to_markdown(&tree, 0),
            "\n```rust\nlet x = 1;\nlet y = 2;\n```\n\n"
        );
    }

    #[test]
    fn test_multiline_paragraph_split_into_paragraphs() {
        let tree = vec![item(BlockKind::Paragraph, "one\r\n\r\ntwo\n   \nthree")];
        assert_eq!(blocks_to_markdown(&tree, 0), "one\n\ntwo\n\nthree\n\n");
    }

    #[test]
    fn test_unknown_block_renders_as_empty_paragraph() {
        let tree = vec![item(BlockKind::Other, "")];
        assert_eq!(blocks_to_markdown(&tree, 0), "\n\n");
    }

    #[test]
    fn test_video_renders_link_and_is_collected() {
        let tree = vec![
            item(BlockKind::Paragraph, "watch"),
            Block::video("https://cdn.example.com/a.mp4"),
        ];
        assert_eq!(
            blocks_to_markdown(&tree, 0),
            "watch\n\n[video](https://cdn.example.com/a.mp4)\n\n"
        );
        assert_eq!(collect_videos(&tree), vec!["https://cdn.example.com/a.mp4"]);
        assert!(collect_images(&tree).is_empty());
    }

    #[test]
    fn test_media_collected_depth_first_in_document_order() {
        let tree = vec![
            Block::image("1.png"),
            item(BlockKind::BulletedItem, "x").with_children(vec![
                Block::image("2.png"),
                item(BlockKind::Paragraph, "y").with_children(vec![Block::image("3.png")]),
            ]),
            Block::new(BlockKind::Image { url: None }, ""),
            Block::image("4.png"),
        ];

        assert_eq!(collect_images(&tree), vec!["1.png", "2.png", "3.png", "4.png"]);
        let md = blocks_to_markdown(&tree, 0);
        assert!(!md.contains(".png"));
    }
}

//! Fixed text transform applied to question and choice text before display.
//!
//! Each line becomes one or more blocks: an embedded `[img=path]` reference,
//! a display formula (`$$…$$` alone on its line), or a paragraph in which
//! inline `$$…$$` spans are turned into inline math.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

static IMAGE_REF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\[img\s*=\s*([^\]]+)\]").expect("valid image regex"));
static MATH_ONLY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^\$\$(.+?)\$\$$").expect("valid math regex"));
static MATH_SPAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\$\$(.+?)\$\$").expect("valid math span regex"));

/// Resolves asset paths referenced from question text.
pub trait AssetLookup {
    fn has_asset(&self, path: &str) -> bool;
}

impl AssetLookup for HashSet<String> {
    fn has_asset(&self, path: &str) -> bool {
        self.contains(path)
    }
}

impl<V> AssetLookup for HashMap<String, V> {
    fn has_asset(&self, path: &str) -> bool {
        self.contains_key(path)
    }
}

/// Lookup that knows no assets; every image renders as missing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAssets;

impl AssetLookup for NoAssets {
    fn has_asset(&self, _path: &str) -> bool {
        false
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Inline {
    Text(String),
    Math(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RichBlock {
    Image { path: String, available: bool },
    /// Formula on its own line, delimiters kept.
    DisplayMath { source: String },
    Paragraph { inlines: Vec<Inline> },
}

/// Split `text` into renderable blocks, resolving images through `assets`.
#[must_use]
pub fn render_rich_text(text: &str, assets: &dyn AssetLookup) -> Vec<RichBlock> {
    let mut blocks = Vec::new();

    for line in text.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);

        if let Some(caps) = IMAGE_REF.captures(line) {
            let whole = caps.get(0).map_or(0..0, |m| m.range());
            let path = caps.get(1).map_or("", |m| m.as_str()).trim().to_owned();
            let available = assets.has_asset(&path);
            blocks.push(RichBlock::Image { path, available });

            let rest = format!("{}{}", &line[..whole.start], &line[whole.end..]);
            let rest = rest.trim();
            if !rest.is_empty() {
                blocks.push(render_line(rest));
            }
            continue;
        }

        blocks.push(render_line(line));
    }

    blocks
}

fn render_line(line: &str) -> RichBlock {
    let trimmed = line.trim();
    if MATH_ONLY.is_match(trimmed) {
        return RichBlock::DisplayMath {
            source: trimmed.to_owned(),
        };
    }

    let mut inlines = Vec::new();
    let mut last = 0;
    for caps in MATH_SPAN.captures_iter(line) {
        let Some(whole) = caps.get(0) else { continue };
        if whole.start() > last {
            inlines.push(Inline::Text(line[last..whole.start()].to_owned()));
        }
        let inner = caps.get(1).map_or("", |m| m.as_str()).trim();
        inlines.push(Inline::Math(inner.to_owned()));
        last = whole.end();
    }
    if last < line.len() {
        inlines.push(Inline::Text(line[last..].to_owned()));
    }

    RichBlock::Paragraph { inlines }
}

/// HTML for the blocks; `image_src` maps an available asset path to a URL.
#[must_use]
pub fn to_html(blocks: &[RichBlock], image_src: impl Fn(&str) -> String) -> String {
    let mut html = String::new();
    for block in blocks {
        match block {
            RichBlock::Image {
                path,
                available: true,
            } => {
                html.push_str(r#"<div class="imgbox"><img alt="image" src=""#);
                html.push_str(&html_escape::encode_double_quoted_attribute(&image_src(path)));
                html.push_str(r#""></div>"#);
            }
            RichBlock::Image {
                path,
                available: false,
            } => {
                html.push_str(r#"<div class="muted">[missing image: "#);
                html.push_str(&html_escape::encode_text(path));
                html.push_str("]</div>");
            }
            RichBlock::DisplayMath { source } => {
                html.push_str("<div>");
                html.push_str(&html_escape::encode_text(source));
                html.push_str("</div>");
            }
            RichBlock::Paragraph { inlines } => {
                html.push_str("<p>");
                for inline in inlines {
                    match inline {
                        Inline::Text(text) => html.push_str(&html_escape::encode_text(text)),
                        Inline::Math(math) => {
                            html.push_str("\\(");
                            html.push_str(&html_escape::encode_text(math));
                            html.push_str("\\)");
                        }
                    }
                }
                html.push_str("</p>");
            }
        }
    }
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assets(paths: &[&str]) -> HashSet<String> {
        paths.iter().map(|p| (*p).to_owned()).collect()
    }

    #[test]
    fn image_reference_resolves_and_keeps_rest_of_line() {
        let blocks = render_rich_text("See [IMG = img/a.png ] below", &assets(&["img/a.png"]));
        assert_eq!(
            blocks,
            vec![
                RichBlock::Image {
                    path: "img/a.png".into(),
                    available: true
                },
                RichBlock::Paragraph {
                    inlines: vec![Inline::Text("See  below".into())]
                },
            ]
        );
    }

    #[test]
    fn missing_image_renders_placeholder_with_path() {
        let blocks = render_rich_text("[img=x.png]", &NoAssets);
        assert_eq!(
            blocks,
            vec![RichBlock::Image {
                path: "x.png".into(),
                available: false
            }]
        );
        assert_eq!(
            to_html(&blocks, |p| p.to_owned()),
            r#"<div class="muted">[missing image: x.png]</div>"#
        );
    }

    #[test]
    fn formula_alone_on_line_is_display_math() {
        let blocks = render_rich_text("  $$x^2 + 1$$ ", &NoAssets);
        assert_eq!(
            blocks,
            vec![RichBlock::DisplayMath {
                source: "$$x^2 + 1$$".into()
            }]
        );
    }

    #[test]
    fn formula_inside_prose_becomes_inline() {
        let blocks = render_rich_text("Solve $$ a<b $$ now", &NoAssets);
        assert_eq!(
            blocks,
            vec![RichBlock::Paragraph {
                inlines: vec![
                    Inline::Text("Solve ".into()),
                    Inline::Math("a<b".into()),
                    Inline::Text(" now".into()),
                ]
            }]
        );
        assert_eq!(to_html(&blocks, |p| p.to_owned()), "<p>Solve \\(a&lt;b\\) now</p>");
    }

    #[test]
    fn each_line_is_its_own_block_in_order() {
        let blocks = render_rich_text("one\r\n\ntwo", &NoAssets);
        assert_eq!(blocks.len(), 3);
        assert_eq!(
            blocks[1],
            RichBlock::Paragraph {
                inlines: Vec::new()
            }
        );
    }

    #[test]
    fn html_escapes_text_and_wraps_images() {
        let blocks = render_rich_text("a & b\n[img=p.png]", &assets(&["p.png"]));
        let html = to_html(&blocks, |p| format!("blob:{p}"));
        assert_eq!(
            html,
            r#"<p>a &amp; b</p><div class="imgbox"><img alt="image" src="blob:p.png"></div>"#
        );
    }
}

// Copyright 2026 The Editor Engine Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! [`Block`]/[`Document`] → HTML serialization (§6 `getHTML`). Emits
//! exactly the tag set the "Emitted tags" list in `spec.md` §6 names;
//! every tag emitted here also appears in [`crate::html::ALLOWED_TAGS`],
//! so a round trip through `from_html` never drops anything this
//! serializer wrote.

use crate::model::{Block, BlockContent, Document, InlineChild, MarkType, Schema};

/// Serializes a whole document to a sanitized HTML fragment (§6).
/// Marks on each micro-segment are wrapped innermost-first by
/// ascending [`Schema::rank_of`], mirroring the view's own micro-segment
/// rendering order (§4.4) so `getHTML`'s nesting matches what the
/// reconciler would have produced for the same content.
pub fn to_html(doc: &Document, schema: &Schema) -> String {
    let mut out = String::new();
    for block in &doc.blocks {
        render_block(block, schema, &mut out);
    }
    out
}

fn render_block(block: &Block, schema: &Schema, out: &mut String) {
    let node_type = block.node_type.0.as_str();
    match node_type {
        "paragraph" => wrap(out, "p", &[], |out| render_inline(block, schema, out)),
        "heading" => {
            let level = block.attrs.get("level").map(String::as_str).unwrap_or("1");
            let tag = format!("h{level}");
            wrap(out, &tag, &[], |out| render_inline(block, schema, out));
        }
        "code_block" => wrap(out, "pre", &[], |out| {
            out.push_str("<code>");
            out.push_str(&html_escape::encode_text(&Document::block_text(block)));
            out.push_str("</code>");
        }),
        "blockquote" => wrap(out, "blockquote", &[], |out| {
            for child in block.child_blocks() {
                render_block(child, schema, out);
            }
        }),
        "bullet_list" => wrap(out, "ul", &[], |out| render_list_items(block, schema, out)),
        "ordered_list" => wrap(out, "ol", &[], |out| render_list_items(block, schema, out)),
        "list_item" => wrap(out, "li", &[], |out| {
            for child in block.child_blocks() {
                render_block(child, schema, out);
            }
        }),
        "horizontal_rule" => out.push_str("<hr>"),
        "image" => render_image(block, out),
        "table" => wrap(out, "table", &[("border-collapse", "collapse")], |out| {
            out.push_str("<tbody>");
            for row in block.child_blocks() {
                render_block(row, schema, out);
            }
            out.push_str("</tbody>");
        }),
        "table_row" => wrap(out, "tr", &[], |out| {
            for cell in block.child_blocks() {
                render_table_cell(cell, schema, out);
            }
        }),
        "table_cell" => render_table_cell(block, schema, out),
        _ => {
            // Unknown node type (a plugin-contributed node with no
            // serializer hook registered here): fall back to a bare
            // paragraph of its flattened text rather than dropping it.
            wrap(out, "p", &[], |out| {
                out.push_str(&html_escape::encode_text(&Document::block_text(block)));
            });
        }
    }
}

fn render_list_items(block: &Block, schema: &Schema, out: &mut String) {
    for item in block.child_blocks() {
        render_block(item, schema, out);
    }
}

fn render_table_cell(block: &Block, schema: &Schema, out: &mut String) {
    wrap(
        out,
        "td",
        &[("border", "1px solid #ccc"), ("padding", "4px 8px")],
        |out| {
            for child in block.child_blocks() {
                render_block(child, schema, out);
            }
        },
    );
}

fn render_image(block: &Block, out: &mut String) {
    out.push_str("<figure><img");
    if let Some(src) = block.attrs.get("src") {
        push_attr(out, "src", src);
    }
    push_attr(out, "alt", block.attrs.get("alt").map(String::as_str).unwrap_or(""));
    for key in ["width", "height"] {
        if let Some(value) = block.attrs.get(key) {
            push_attr(out, key, value);
        }
    }
    out.push_str("></figure>");
}

/// Emits `<tag style="...">`, the `style` attribute holding `styles`
/// when non-empty (used for table/cell border styling so a pasted-out
/// table renders standalone, per §6).
fn wrap(out: &mut String, tag: &str, styles: &[(&str, &str)], body: impl FnOnce(&mut String)) {
    out.push('<');
    out.push_str(tag);
    if !styles.is_empty() {
        let style = styles
            .iter()
            .map(|(k, v)| format!("{k}: {v}"))
            .collect::<Vec<_>>()
            .join("; ");
        push_attr(out, "style", &style);
    }
    out.push('>');
    body(out);
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

fn push_attr(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&html_escape::encode_double_quoted_attribute(value));
    out.push('"');
}

fn render_inline(block: &Block, schema: &Schema, out: &mut String) {
    for child in block.inline_children() {
        match child {
            InlineChild::Text { text, marks } => {
                let sorted = marks.sorted_by_rank(|mt| schema.rank_of(mt));
                render_marked_text(text, &sorted, schema, out);
            }
            InlineChild::Node(node) if node.node_type.0 == "hard_break" => out.push_str("<br>"),
            InlineChild::Node(_) => {
                // Non-break inline atoms (mentions etc.) have no core
                // serializer hook; their text-equivalent is the safe
                // degrade (mirrors `getBlockText`'s replacement-char
                // fallback, but readable HTML output prefers the text).
                out.push_str(&html_escape::encode_text(&child.to_plain_text()));
            }
        }
    }
}

fn render_marked_text(
    text: &str,
    marks: &[&crate::model::Mark],
    schema: &Schema,
    out: &mut String,
) {
    let Some((mark, rest)) = marks.split_first() else {
        out.push_str(&html_escape::encode_text(text));
        return;
    };
    let tag = mark_tag(&mark.mark_type);
    out.push('<');
    out.push_str(tag);
    if mark.mark_type.0 == "link" {
        let href = mark.attrs.get("href").cloned().unwrap_or_default();
        push_attr(out, "href", &href);
    } else if let Some(style) = mark_style(&mark.mark_type, mark, schema) {
        push_attr(out, "style", &style);
    }
    out.push('>');
    render_marked_text(text, rest, schema, out);
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

fn mark_tag(mark_type: &MarkType) -> &'static str {
    match mark_type.0.as_str() {
        "bold" => "strong",
        "italic" => "em",
        "underline" => "u",
        "strike" => "s",
        "code" => "code",
        "link" => "a",
        _ => "span",
    }
}

/// A plugin-contributed mark (rendered as `<span>`) carries its attrs
/// as a `style` attribute when they match the declared-safe property
/// set, so color/font marks round-trip through `setHTML` (§6).
fn mark_style(mark_type: &MarkType, mark: &crate::model::Mark, _schema: &Schema) -> Option<String> {
    if mark_tag(mark_type) != "span" {
        return None;
    }
    if mark.attrs.is_empty() {
        return None;
    }
    let style = mark
        .attrs
        .iter()
        .map(|(k, v)| format!("{k}: {v}"))
        .collect::<Vec<_>>()
        .join("; ");
    Some(style)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::{BlockId, Document, InlineChild, Mark, MarkSet};

    fn schema() -> Schema {
        Schema::with_builtins()
    }

    #[test]
    fn renders_plain_paragraph() {
        let doc = Document::new(vec![Block::new_inline(
            BlockId::from_raw(1),
            "paragraph".into(),
            vec![InlineChild::text("hi")],
        )]);
        assert_eq!(to_html(&doc, &schema()), "<p>hi</p>");
    }

    #[test]
    fn bold_and_italic_nest_by_rank() {
        let marks = MarkSet::from_marks([Mark::new("bold"), Mark::new("italic")]);
        let doc = Document::new(vec![Block::new_inline(
            BlockId::from_raw(1),
            "paragraph".into(),
            vec![InlineChild::text_with_marks("hi", marks)],
        )]);
        // code(10) < bold(20) < italic(30): bold sits closer to text.
        assert_eq!(to_html(&doc, &schema()), "<p><em><strong>hi</strong></em></p>");
    }

    #[test]
    fn link_emits_href_attribute() {
        let marks = MarkSet::from_marks([Mark::new("link").with_attr("href", "https://x")]);
        let doc = Document::new(vec![Block::new_inline(
            BlockId::from_raw(1),
            "paragraph".into(),
            vec![InlineChild::text_with_marks("x", marks)],
        )]);
        assert_eq!(to_html(&doc, &schema()), r#"<p><a href="https://x">x</a></p>"#);
    }

    #[test]
    fn horizontal_rule_is_self_closing_void() {
        let doc = Document::new(vec![Block::new_void(
            BlockId::from_raw(1),
            "horizontal_rule".into(),
        )]);
        assert_eq!(to_html(&doc, &schema()), "<hr>");
    }

    #[test]
    fn image_wraps_in_figure_with_src_and_alt() {
        let block = Block::new_void(BlockId::from_raw(1), "image".into()).with_attrs(
            [("src".to_string(), "a.png".to_string())].into_iter().collect(),
        );
        let doc = Document::new(vec![block]);
        let html = to_html(&doc, &schema());
        assert!(html.contains(r#"src="a.png""#));
        assert!(html.contains(r#"alt="""#));
    }

    #[test]
    fn text_is_html_escaped() {
        let doc = Document::new(vec![Block::new_inline(
            BlockId::from_raw(1),
            "paragraph".into(),
            vec![InlineChild::text("<script>&")],
        )]);
        let html = to_html(&doc, &schema());
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}

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

//! Micro-segment computation (§4.4 "Block content rendering"): flatten
//! a textblock's inline children into segments bounded by mark-set
//! boundaries and inline-decoration boundaries, each one renderable as
//! `<text> -> wrap by marks (innermost = lowest rank) -> wrap by
//! decorations (outermost)`.

use crate::model::{Block, InlineChild, Mark, MarkType, Schema};
use crate::plugin::{Decoration, DecorationKind, DecorationSet};

/// The payload of one micro-segment: either a run of text (with its
/// resolved, rank-sorted marks) or a single inline atom.
#[derive(Clone, Debug, PartialEq)]
pub enum SegmentContent {
    Text(String),
    Node(crate::model::InlineNode),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Segment {
    pub content: SegmentContent,
    /// Marks applying to this segment, innermost (lowest rank) first.
    pub marks: Vec<Mark>,
    /// Inline decoration attribute sets covering this segment, applied
    /// outermost-first when wrapping (§4.4: decorations wrap marks).
    pub decorations: Vec<std::collections::BTreeMap<String, String>>,
    /// Widget decorations anchored at this segment's start offset,
    /// rendered before the segment's own content.
    pub widgets_before: Vec<String>,
}

/// Build the micro-segment sequence for `block`'s inline content,
/// splitting at every mark-set boundary and every inline-decoration
/// boundary (§4.4). Widget decorations don't split anything — they are
/// attached to the segment that starts at their offset.
pub fn compute_segments(block: &Block, schema: &Schema, decorations: &DecorationSet) -> Vec<Segment> {
    let inline_decos: Vec<(usize, usize, &std::collections::BTreeMap<String, String>)> = decorations
        .for_block(block.id)
        .filter_map(|d| match &d.kind {
            DecorationKind::Inline { from, to, attrs, .. } => Some((*from, *to, attrs)),
            _ => None,
        })
        .collect();
    let widgets: Vec<(usize, &str)> = decorations
        .for_block(block.id)
        .filter_map(|d| match &d.kind {
            DecorationKind::Widget { offset, key, .. } => Some((*offset, key.as_str())),
            _ => None,
        })
        .collect();

    let mut segments = Vec::new();
    let mut offset = 0usize;
    for child in block.inline_children() {
        let width = child.width();
        match child {
            InlineChild::Text { text, marks } => {
                for (seg_start, seg_end, seg_text) in split_at_decoration_boundaries(
                    offset,
                    offset + width,
                    text,
                    &inline_decos,
                ) {
                    let sorted_marks: Vec<Mark> = marks
                        .sorted_by_rank(|mt: &MarkType| schema.rank_of(mt))
                        .into_iter()
                        .cloned()
                        .collect();
                    let active_decos: Vec<_> = inline_decos
                        .iter()
                        .filter(|(from, to, _)| *from < seg_end && seg_start < *to)
                        .map(|(_, _, attrs)| (*attrs).clone())
                        .collect();
                    segments.push(Segment {
                        content: SegmentContent::Text(seg_text),
                        marks: sorted_marks,
                        decorations: active_decos,
                        widgets_before: widgets_at(&widgets, seg_start),
                    });
                }
            }
            InlineChild::Node(node) => {
                segments.push(Segment {
                    content: SegmentContent::Node(node.clone()),
                    marks: Vec::new(),
                    decorations: Vec::new(),
                    widgets_before: widgets_at(&widgets, offset),
                });
            }
        }
        offset += width;
    }
    // A trailing widget anchored exactly at the block's end offset has
    // no following segment to attach to; surface it as an empty marker
    // so the reconciler can still render it.
    let trailing = widgets_at(&widgets, offset);
    if !trailing.is_empty() {
        segments.push(Segment {
            content: SegmentContent::Text(String::new()),
            marks: Vec::new(),
            decorations: Vec::new(),
            widgets_before: trailing,
        });
    }
    segments
}

fn widgets_at(widgets: &[(usize, &str)], offset: usize) -> Vec<String> {
    widgets
        .iter()
        .filter(|(o, _)| *o == offset)
        .map(|(_, key)| key.to_string())
        .collect()
}

/// Cut `text` (covering `[run_start, run_end)` of the block) at every
/// inline-decoration boundary that falls strictly inside it.
fn split_at_decoration_boundaries(
    run_start: usize,
    run_end: usize,
    text: &str,
    decos: &[(usize, usize, &std::collections::BTreeMap<String, String>)],
) -> Vec<(usize, usize, String)> {
    let mut cuts: Vec<usize> = decos
        .iter()
        .flat_map(|(from, to, _)| [*from, *to])
        .filter(|p| *p > run_start && *p < run_end)
        .collect();
    cuts.sort_unstable();
    cuts.dedup();

    let chars: Vec<char> = text.chars().collect();
    let mut out = Vec::new();
    let mut prev = run_start;
    for cut in cuts {
        out.push((
            prev,
            cut,
            chars[(prev - run_start)..(cut - run_start)].iter().collect(),
        ));
        prev = cut;
    }
    out.push((
        prev,
        run_end,
        chars[(prev - run_start)..].iter().collect(),
    ));
    out
}

/// Attach a decoration's node-level attrs to whatever the reconciler
/// merges into a block's own element attributes (§4.4 "Node decoration").
pub fn node_decoration_attrs(
    block_id: crate::model::BlockId,
    decorations: &DecorationSet,
) -> std::collections::BTreeMap<String, String> {
    let mut merged = std::collections::BTreeMap::new();
    for deco in decorations.for_block(block_id) {
        if let DecorationKind::Node { attrs, .. } = &deco.kind {
            merged.extend(attrs.clone());
        }
    }
    merged
}

/// Whether `a` and `b` would reconcile identically — skips a DOM patch
/// pass when nothing changed (§4.4 "Equality of DecorationSets").
pub fn decoration_sets_equal(a: &[Decoration], b: &[Decoration]) -> bool {
    a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.same_as(y))
}

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

//! Inline children of a textblock: text runs and atomic inline nodes
//! (data model §3).

use std::collections::BTreeMap;

use crate::model::mark::MarkSet;

/// The type tag of an atomic inline node (hard break, mention, ...).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InlineNodeType(pub String);

impl InlineNodeType {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl From<&str> for InlineNodeType {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// An atomic inline item: width 1, no internal text position is
/// addressable. Examples: hard break, mention.
#[derive(Clone, Debug, PartialEq)]
pub struct InlineNode {
    pub node_type: InlineNodeType,
    pub attrs: BTreeMap<String, String>,
}

impl InlineNode {
    pub fn new(node_type: impl Into<InlineNodeType>) -> Self {
        Self {
            node_type: node_type.into(),
            attrs: BTreeMap::new(),
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }
}

/// Either a text run or an atomic inline node (data model §3).
///
/// Width (used for offset arithmetic): a text run's width is its
/// count of Unicode scalar values (code points); an inline node's
/// width is always 1. Marks contribute 0 width.
#[derive(Clone, Debug, PartialEq)]
pub enum InlineChild {
    Text { text: String, marks: MarkSet },
    Node(InlineNode),
}

impl InlineChild {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            marks: MarkSet::new(),
        }
    }

    pub fn text_with_marks(text: impl Into<String>, marks: MarkSet) -> Self {
        Self::Text {
            text: text.into(),
            marks,
        }
    }

    pub fn node(node: InlineNode) -> Self {
        Self::Node(node)
    }

    /// Width in inline-content units (data model §3: Position.offset).
    pub fn width(&self) -> usize {
        match self {
            InlineChild::Text { text, .. } => text.chars().count(),
            InlineChild::Node(_) => 1,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, InlineChild::Text { .. })
    }

    pub fn is_node(&self) -> bool {
        matches!(self, InlineChild::Node(_))
    }

    pub fn marks(&self) -> Option<&MarkSet> {
        match self {
            InlineChild::Text { marks, .. } => Some(marks),
            InlineChild::Node(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            InlineChild::Text { text, .. } => Some(text),
            InlineChild::Node(_) => None,
        }
    }

    /// Plain-text contribution of this child: the run's text, or a
    /// replacement character for an inline node (data model §4.1:
    /// `getBlockText`).
    pub fn to_plain_text(&self) -> String {
        match self {
            InlineChild::Text { text, .. } => text.clone(),
            InlineChild::Node(n) if n.node_type.0 == "hard_break" => "\n".to_string(),
            InlineChild::Node(_) => "\u{FFFC}".to_string(),
        }
    }
}

/// Coalesce adjacent text runs that share an identical mark set, and
/// drop empty text runs (data model §4.1 normalization), preserving
/// inline node boundaries (an inline node is never merged into a run).
pub fn normalize_inline_children(children: Vec<InlineChild>) -> Vec<InlineChild> {
    let mut out: Vec<InlineChild> = Vec::with_capacity(children.len());
    for child in children {
        match child {
            InlineChild::Text { text, marks } => {
                if text.is_empty() {
                    continue;
                }
                if let Some(InlineChild::Text {
                    text: prev_text,
                    marks: prev_marks,
                }) = out.last_mut()
                {
                    if prev_marks.same_set_as(&marks) {
                        prev_text.push_str(&text);
                        continue;
                    }
                }
                out.push(InlineChild::Text { text, marks });
            }
            node @ InlineChild::Node(_) => out.push(node),
        }
    }
    out
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn adjacent_equal_mark_runs_coalesce() {
        let bold = MarkSet::from_marks([crate::model::mark::Mark::new("bold")]);
        let children = vec![
            InlineChild::text_with_marks("Hel", bold.clone()),
            InlineChild::text_with_marks("lo", bold.clone()),
        ];
        let out = normalize_inline_children(children);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].as_text(), Some("Hello"));
    }

    #[test]
    fn differing_mark_runs_do_not_coalesce() {
        let bold = MarkSet::from_marks([crate::model::mark::Mark::new("bold")]);
        let children = vec![
            InlineChild::text_with_marks("Hel", bold),
            InlineChild::text("lo"),
        ];
        let out = normalize_inline_children(children);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn empty_text_runs_are_dropped() {
        let children = vec![InlineChild::text(""), InlineChild::text("a")];
        let out = normalize_inline_children(children);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn inline_node_breaks_coalescing() {
        let children = vec![
            InlineChild::text("a"),
            InlineChild::node(InlineNode::new("hard_break")),
            InlineChild::text("b"),
        ];
        let out = normalize_inline_children(children);
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn width_counts_code_points() {
        assert_eq!(InlineChild::text("abc").width(), 3);
        assert_eq!(InlineChild::node(InlineNode::new("mention")).width(), 1);
    }
}

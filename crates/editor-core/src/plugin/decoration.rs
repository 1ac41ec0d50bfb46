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

//! Decorations (§4.4 "DecorationSet"): view-only annotations a plugin
//! contributes on top of the document — a spellcheck squiggle, a
//! collaborator's cursor, a widget inserted between blocks — without
//! touching the model.

use std::collections::BTreeMap;

use crate::model::BlockId;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DecorationKind {
    /// Highlights `[from, to)` within a textblock's inline content.
    Inline {
        block: BlockId,
        from: usize,
        to: usize,
        attrs: BTreeMap<String, String>,
    },
    /// Annotates a whole block (e.g. a "currently loading" border).
    Node {
        block: BlockId,
        attrs: BTreeMap<String, String>,
    },
    /// A non-model DOM node rendered at a position, identified by a
    /// stable `key` so the reconciler can match it across state
    /// updates without relying on structural equality alone.
    Widget {
        block: BlockId,
        offset: usize,
        key: String,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Decoration {
    pub kind: DecorationKind,
}

impl Decoration {
    pub fn inline(block: BlockId, from: usize, to: usize, attrs: BTreeMap<String, String>) -> Self {
        Self {
            kind: DecorationKind::Inline {
                block,
                from,
                to,
                attrs,
            },
        }
    }

    pub fn node(block: BlockId, attrs: BTreeMap<String, String>) -> Self {
        Self {
            kind: DecorationKind::Node { block, attrs },
        }
    }

    pub fn widget(block: BlockId, offset: usize, key: impl Into<String>) -> Self {
        Self {
            kind: DecorationKind::Widget {
                block,
                offset,
                key: key.into(),
            },
        }
    }

    /// Identity used by the reconciler to decide whether a decoration
    /// is "the same" as one from the previous render pass, checked
    /// before falling back to full structural equality (§4.4): widget
    /// decorations compare by `key` alone, since their payload may be
    /// an opaque DOM node the model layer can't compare structurally.
    fn identity_key(&self) -> Option<&str> {
        match &self.kind {
            DecorationKind::Widget { key, .. } => Some(key.as_str()),
            _ => None,
        }
    }

    pub fn same_as(&self, other: &Decoration) -> bool {
        match (self.identity_key(), other.identity_key()) {
            (Some(a), Some(b)) => a == b,
            _ => self == other,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct DecorationSet {
    decorations: Vec<Decoration>,
}

impl DecorationSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_vec(decorations: Vec<Decoration>) -> Self {
        Self { decorations }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Decoration> {
        self.decorations.iter()
    }

    pub fn for_block(&self, block: BlockId) -> impl Iterator<Item = &Decoration> {
        self.decorations.iter().filter(move |d| match &d.kind {
            DecorationKind::Inline { block: b, .. }
            | DecorationKind::Node { block: b, .. }
            | DecorationKind::Widget { block: b, .. } => *b == block,
        })
    }

    pub fn merge(mut self, other: DecorationSet) -> Self {
        self.decorations.extend(other.decorations);
        self
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn widget_decorations_compare_by_key_not_payload() {
        let a = Decoration::widget(BlockId::from_raw(1), 0, "cursor-alice");
        let b = Decoration::widget(BlockId::from_raw(1), 5, "cursor-alice");
        assert!(a.same_as(&b));
    }

    #[test]
    fn inline_decorations_compare_structurally() {
        let a = Decoration::inline(BlockId::from_raw(1), 0, 3, BTreeMap::new());
        let b = Decoration::inline(BlockId::from_raw(1), 0, 3, BTreeMap::new());
        let c = Decoration::inline(BlockId::from_raw(1), 0, 4, BTreeMap::new());
        assert!(a.same_as(&b));
        assert!(!a.same_as(&c));
    }

    #[test]
    fn for_block_filters_by_block_id() {
        let set = DecorationSet::from_vec(vec![
            Decoration::node(BlockId::from_raw(1), BTreeMap::new()),
            Decoration::node(BlockId::from_raw(2), BTreeMap::new()),
        ]);
        assert_eq!(set.for_block(BlockId::from_raw(1)).count(), 1);
    }
}

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

//! [`Block`]: a structural node in the document tree (data model §3).

use std::collections::BTreeMap;

use crate::model::ids::BlockId;
use crate::model::inline::InlineChild;
use crate::model::schema::NodeType;

pub type Attrs = BTreeMap<String, String>;

/// Either a textblock's inline content or a container's child blocks.
#[derive(Clone, Debug, PartialEq)]
pub enum BlockContent {
    Inline(Vec<InlineChild>),
    Blocks(Vec<Block>),
    Empty,
}

impl BlockContent {
    pub fn as_inline(&self) -> Option<&[InlineChild]> {
        match self {
            BlockContent::Inline(children) => Some(children),
            _ => None,
        }
    }

    pub fn as_inline_mut(&mut self) -> Option<&mut Vec<InlineChild>> {
        match self {
            BlockContent::Inline(children) => Some(children),
            _ => None,
        }
    }

    pub fn as_blocks(&self) -> Option<&[Block]> {
        match self {
            BlockContent::Blocks(children) => Some(children),
            _ => None,
        }
    }

    pub fn as_blocks_mut(&mut self) -> Option<&mut Vec<Block>> {
        match self {
            BlockContent::Blocks(children) => Some(children),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            BlockContent::Inline(children) => children.is_empty(),
            BlockContent::Blocks(children) => children.is_empty(),
            BlockContent::Empty => true,
        }
    }
}

/// A block: a stable-identity node in the document tree (data model §3).
#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    pub id: BlockId,
    pub node_type: NodeType,
    pub attrs: Attrs,
    pub content: BlockContent,
    pub is_void: bool,
    pub is_isolating: bool,
    pub is_atom: bool,
}

impl Block {
    pub fn new_inline(id: BlockId, node_type: NodeType, children: Vec<InlineChild>) -> Self {
        Self {
            id,
            node_type,
            attrs: Attrs::new(),
            content: BlockContent::Inline(children),
            is_void: false,
            is_isolating: false,
            is_atom: false,
        }
    }

    pub fn new_container(id: BlockId, node_type: NodeType, children: Vec<Block>) -> Self {
        Self {
            id,
            node_type,
            attrs: Attrs::new(),
            content: BlockContent::Blocks(children),
            is_void: false,
            is_isolating: false,
            is_atom: false,
        }
    }

    pub fn new_void(id: BlockId, node_type: NodeType) -> Self {
        Self {
            id,
            node_type,
            attrs: Attrs::new(),
            content: BlockContent::Empty,
            is_void: true,
            is_isolating: false,
            is_atom: true,
        }
    }

    pub fn with_attrs(mut self, attrs: Attrs) -> Self {
        self.attrs = attrs;
        self
    }

    pub fn with_flags(mut self, is_isolating: bool, is_atom: bool) -> Self {
        self.is_isolating = is_isolating;
        self.is_atom = is_atom;
        self
    }

    /// Width of this block's inline content in inline-content units
    /// (data model §3: Position.offset). Zero for container/void blocks.
    pub fn inline_width(&self) -> usize {
        match &self.content {
            BlockContent::Inline(children) => children.iter().map(InlineChild::width).sum(),
            _ => 0,
        }
    }

    pub fn inline_children(&self) -> &[InlineChild] {
        self.content.as_inline().unwrap_or(&[])
    }

    pub fn child_blocks(&self) -> &[Block] {
        self.content.as_blocks().unwrap_or(&[])
    }

    /// Recursively collect every block id in this subtree, including
    /// this block's own id, pre-order. Used by id-uniqueness checks
    /// and by the reconciler's keyed diff (§4.4).
    pub fn collect_ids(&self, out: &mut Vec<BlockId>) {
        out.push(self.id);
        if let BlockContent::Blocks(children) = &self.content {
            for child in children {
                child.collect_ids(out);
            }
        }
    }

    /// Depth-first search for a descendant (or self) by id.
    pub fn find(&self, id: BlockId) -> Option<&Block> {
        if self.id == id {
            return Some(self);
        }
        if let BlockContent::Blocks(children) = &self.content {
            for child in children {
                if let Some(found) = child.find(id) {
                    return Some(found);
                }
            }
        }
        None
    }

    pub fn find_mut(&mut self, id: BlockId) -> Option<&mut Block> {
        if self.id == id {
            return Some(self);
        }
        if let BlockContent::Blocks(children) = &mut self.content {
            for child in children {
                if let Some(found) = child.find_mut(id) {
                    return Some(found);
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn inline_width_sums_children() {
        let block = Block::new_inline(
            BlockId::from_raw(1),
            "paragraph".into(),
            vec![InlineChild::text("abc"), InlineChild::text("de")],
        );
        assert_eq!(block.inline_width(), 5);
    }

    #[test]
    fn void_block_has_no_content() {
        let block = Block::new_void(BlockId::from_raw(1), "horizontal_rule".into());
        assert!(block.content.is_empty());
        assert!(block.is_void);
    }

    #[test]
    fn collect_ids_is_preorder_and_recursive() {
        let leaf = Block::new_inline(BlockId::from_raw(2), "paragraph".into(), vec![]);
        let container =
            Block::new_container(BlockId::from_raw(1), "table_cell".into(), vec![leaf]);
        let mut ids = Vec::new();
        container.collect_ids(&mut ids);
        assert_eq!(ids, vec![BlockId::from_raw(1), BlockId::from_raw(2)]);
    }

    #[test]
    fn find_locates_nested_descendant() {
        let leaf = Block::new_inline(BlockId::from_raw(2), "paragraph".into(), vec![]);
        let container =
            Block::new_container(BlockId::from_raw(1), "table_cell".into(), vec![leaf]);
        assert!(container.find(BlockId::from_raw(2)).is_some());
        assert!(container.find(BlockId::from_raw(99)).is_none());
    }
}

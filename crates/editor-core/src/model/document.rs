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

//! [`Document`]: an ordered sequence of [`Block`]s plus a version
//! counter (data model §3), and the validation pass that enforces the
//! six document invariants on every committed state.

use std::collections::HashSet;

use crate::error::ValidationError;
use crate::model::block::{Block, BlockContent};
use crate::model::ids::{BlockId, BlockIdAllocator};
use crate::model::inline::{normalize_inline_children, InlineChild};
use crate::model::schema::{ContentKind, Schema};
use crate::model::selection::Selection;

/// What a single child at a given offset is (§4.1: `getContentAtOffset`).
#[derive(Debug, Clone, PartialEq)]
pub enum ContentAt<'a> {
    Text { run: &'a str, offset_in_run: usize },
    Inline(&'a InlineChild),
    End,
}

/// An ordered sequence of top-level blocks, versioned (data model §3).
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub blocks: Vec<Block>,
    pub version: u64,
}

impl Document {
    pub fn empty() -> Self {
        Self {
            blocks: Vec::new(),
            version: 1,
        }
    }

    pub fn new(blocks: Vec<Block>) -> Self {
        Self { blocks, version: 1 }
    }

    pub fn bump_version(&mut self) {
        self.version += 1;
    }

    pub fn find(&self, id: BlockId) -> Option<&Block> {
        self.blocks.iter().find_map(|b| b.find(id))
    }

    pub fn find_mut(&mut self, id: BlockId) -> Option<&mut Block> {
        self.blocks.iter_mut().find_map(|b| b.find_mut(id))
    }

    pub fn contains(&self, id: BlockId) -> bool {
        self.find(id).is_some()
    }

    /// All block ids in the document, pre-order, top level first.
    pub fn all_ids(&self) -> Vec<BlockId> {
        let mut ids = Vec::new();
        for block in &self.blocks {
            block.collect_ids(&mut ids);
        }
        ids
    }

    /// The first leaf textblock in document order, used by the
    /// selection-repair fallback (data model invariant 6).
    pub fn first_textblock(&self) -> Option<&Block> {
        fn find_in(block: &Block) -> Option<&Block> {
            match &block.content {
                BlockContent::Inline(_) if !block.is_void => Some(block),
                BlockContent::Blocks(children) => children.iter().find_map(find_in),
                _ => None,
            }
        }
        self.blocks.iter().find_map(find_in)
    }

    /// Flatten a block's inline children to plain text. InlineNodes
    /// contribute a replacement character, or their declared text
    /// equivalent (currently only `hard_break` -> `"\n"`) per §4.1.
    pub fn block_text(block: &Block) -> String {
        block
            .inline_children()
            .iter()
            .map(InlineChild::to_plain_text)
            .collect()
    }

    /// Locate the child at a given inline-content-width offset within
    /// a textblock (§4.1: `getContentAtOffset`).
    pub fn content_at_offset(block: &Block, offset: usize) -> ContentAt<'_> {
        let mut remaining = offset;
        for child in block.inline_children() {
            let width = child.width();
            if remaining < width {
                return match child {
                    InlineChild::Text { text, .. } => ContentAt::Text {
                        run: text,
                        offset_in_run: remaining,
                    },
                    InlineChild::Node(_) => ContentAt::Inline(child),
                };
            }
            remaining -= width;
        }
        ContentAt::End
    }

    /// Normalize every textblock's inline children: coalesce adjacent
    /// text runs with identical mark sets, drop empties (§4.1).
    pub fn normalize(&mut self) {
        fn walk(block: &mut Block) {
            match &mut block.content {
                BlockContent::Inline(children) => {
                    let taken = std::mem::take(children);
                    *children = normalize_inline_children(taken);
                }
                BlockContent::Blocks(children) => {
                    for child in children {
                        walk(child);
                    }
                }
                BlockContent::Empty => {}
            }
        }
        for block in &mut self.blocks {
            walk(block);
        }
    }

    /// Validate the six data-model invariants that must hold on every
    /// committed state (§3 "Invariants", items 1-5; item 6 — selection
    /// repair — is handled by [`Document::repair_selection`] since it
    /// needs the selection, not just the doc).
    pub fn validate(&self, schema: &Schema) -> Result<(), ValidationError> {
        let mut seen = HashSet::new();
        for block in &self.blocks {
            Self::validate_block(block, schema, &mut seen)?;
        }
        Ok(())
    }

    fn validate_block(
        block: &Block,
        schema: &Schema,
        seen: &mut HashSet<BlockId>,
    ) -> Result<(), ValidationError> {
        if !seen.insert(block.id) {
            return Err(ValidationError::DuplicateBlockId { block: block.id });
        }

        if block.is_void && !block.content.is_empty() {
            return Err(ValidationError::VoidBlockHasContent { block: block.id });
        }

        if let Some(spec) = schema.node(&block.node_type) {
            let matches_kind = match (&block.content, spec.content_kind) {
                (BlockContent::Inline(_), ContentKind::Inline) => true,
                (BlockContent::Blocks(_), ContentKind::Block) => true,
                (BlockContent::Empty, _) => true,
                _ => false,
            };
            if !matches_kind {
                return Err(ValidationError::ContentKindMismatch {
                    block: block.id,
                    expected: spec.content_kind,
                    found: block.node_type.clone(),
                });
            }

            if let BlockContent::Inline(children) = &block.content {
                for child in children {
                    if let Some(marks) = child.marks() {
                        let mut by_type = HashSet::new();
                        for mark in marks {
                            if !by_type.insert(mark.mark_type.clone()) {
                                return Err(ValidationError::DuplicateMark {
                                    block: block.id,
                                    mark: mark.mark_type.clone(),
                                });
                            }
                            if !spec.allows_mark(&mark.mark_type) {
                                return Err(ValidationError::MarkNotPermitted {
                                    block: block.id,
                                    mark: mark.mark_type.clone(),
                                });
                            }
                        }
                    }
                }
            }
        }

        if let BlockContent::Blocks(children) = &block.content {
            for child in children {
                Self::validate_block(child, schema, seen)?;
            }
        }

        Ok(())
    }

    /// Repair a selection whose referenced block(s) no longer exist, or
    /// whose offsets now fall outside their block's current width (data
    /// model invariant 6). A dangling block falls back to the nearest
    /// leaf textblock, collapsed at offset 0. An out-of-range offset
    /// (the block still exists but shrank under it — e.g. a step edited
    /// it without naming an explicit resulting selection) is clamped to
    /// the block's width rather than left pointing past the end of its
    /// content.
    pub fn repair_selection(&self, selection: &Selection) -> Selection {
        let dangling = selection
            .referenced_blocks()
            .into_iter()
            .any(|id| !self.contains(id));
        if dangling {
            return match self.first_textblock() {
                Some(block) => Selection::collapsed_at(crate::model::Position::new(block.id, 0)),
                None => selection.clone(),
            };
        }

        if let Selection::Text(text) = selection {
            let mut anchor = text.anchor.clone();
            let mut head = text.head.clone();
            if let Some(block) = self.find(anchor.block_id) {
                anchor.offset = anchor.offset.min(block.inline_width());
            }
            if let Some(block) = self.find(head.block_id) {
                head.offset = head.offset.min(block.inline_width());
            }
            return Selection::Text(crate::model::TextSelection::new(anchor, head));
        }

        selection.clone()
    }
}


/// Allocate a fresh [`BlockId`] and build a [`Block`] of the given
/// node type (§4.1: `createBlock`). Performs no schema validation
/// itself — callers validate the whole document after mutation,
/// matching how steps apply first and validate the resulting
/// document as a unit (§4.2).
pub fn create_block(
    alloc: &BlockIdAllocator,
    node_type: impl Into<crate::model::NodeType>,
    content: BlockContent,
) -> Block {
    let node_type = node_type.into();
    let id = alloc.alloc();
    match content {
        BlockContent::Inline(children) => Block::new_inline(id, node_type, children),
        BlockContent::Blocks(children) => Block::new_container(id, node_type, children),
        BlockContent::Empty => Block::new_void(id, node_type),
    }
}

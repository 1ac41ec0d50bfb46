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

//! [`Step`]: the atomic, invertible document edits a [`crate::state::Transaction`]
//! is built from (§4.2 "Step"). Every step applies against a [`Document`]
//! and produces both the new document and the inverse step that undoes it.

use crate::error::ValidationError;
use crate::model::{Block, BlockContent, BlockId, Document, InlineChild, Mark, MarkType};
use crate::state::mapping::{Bias, StepMap};

/// One atomic, invertible document edit (§4.2).
#[derive(Clone, Debug, PartialEq)]
pub enum Step {
    /// Replace the inline content of `block` in `[from, to)` with `content`.
    ReplaceStep {
        block: BlockId,
        from: usize,
        to: usize,
        content: Vec<InlineChild>,
    },
    /// Replace an entire block (attrs + content) with another, same id.
    ReplaceBlockStep { block: BlockId, new_content: BlockContent },
    /// Set or clear a single attribute.
    AttrStep {
        block: BlockId,
        key: String,
        value: Option<String>,
    },
    AddMarkStep {
        block: BlockId,
        from: usize,
        to: usize,
        mark: Mark,
    },
    RemoveMarkStep {
        block: BlockId,
        from: usize,
        to: usize,
        mark_type: MarkType,
    },
    /// Split a textblock at `offset` into two sibling blocks; `right_id`
    /// names the newly created right-hand block.
    SplitBlockStep {
        block: BlockId,
        offset: usize,
        right_id: BlockId,
    },
    /// Merge `second` into the end of `first`, removing `second`.
    JoinBlockStep { first: BlockId, second: BlockId },
}

impl Step {
    /// Apply this step to `doc`, returning the new document and the
    /// inverse step that would undo it (§4.2, §4.7 History).
    pub fn apply(&self, doc: &Document) -> Result<(Document, Step), ValidationError> {
        let mut doc = doc.clone();
        let inverse = match self {
            Step::ReplaceStep {
                block,
                from,
                to,
                content,
            } => {
                let b = doc
                    .find_mut(*block)
                    .ok_or(ValidationError::SelectionDanglingBlock { block: *block })?;
                let children = b.content.as_inline_mut().ok_or(
                    ValidationError::ContentKindMismatch {
                        block: *block,
                        expected: crate::model::ContentKind::Inline,
                        found: b.node_type.clone(),
                    },
                )?;
                let removed = splice_inline(*block, children, *from, *to, content.clone())?;
                Step::ReplaceStep {
                    block: *block,
                    from: *from,
                    to: *from + content.iter().map(InlineChild::width).sum::<usize>(),
                    content: removed,
                }
            }
            Step::ReplaceBlockStep { block, new_content } => {
                let b = doc
                    .find_mut(*block)
                    .ok_or(ValidationError::SelectionDanglingBlock { block: *block })?;
                let old_content = std::mem::replace(&mut b.content, new_content.clone());
                Step::ReplaceBlockStep {
                    block: *block,
                    new_content: old_content,
                }
            }
            Step::AttrStep { block, key, value } => {
                let b = doc
                    .find_mut(*block)
                    .ok_or(ValidationError::SelectionDanglingBlock { block: *block })?;
                let old = match value {
                    Some(v) => b.attrs.insert(key.clone(), v.clone()),
                    None => b.attrs.remove(key),
                };
                Step::AttrStep {
                    block: *block,
                    key: key.clone(),
                    value: old,
                }
            }
            Step::AddMarkStep {
                block,
                from,
                to,
                mark,
            } => {
                let b = doc
                    .find_mut(*block)
                    .ok_or(ValidationError::SelectionDanglingBlock { block: *block })?;
                let children = b.content.as_inline_mut().ok_or(
                    ValidationError::ContentKindMismatch {
                        block: *block,
                        expected: crate::model::ContentKind::Inline,
                        found: b.node_type.clone(),
                    },
                )?;
                map_marks_in_range(children, *from, *to, |marks| {
                    marks.insert(mark.clone());
                });
                Step::RemoveMarkStep {
                    block: *block,
                    from: *from,
                    to: *to,
                    mark_type: mark.mark_type.clone(),
                }
            }
            Step::RemoveMarkStep {
                block,
                from,
                to,
                mark_type,
            } => {
                let b = doc
                    .find_mut(*block)
                    .ok_or(ValidationError::SelectionDanglingBlock { block: *block })?;
                let children = b.content.as_inline_mut().ok_or(
                    ValidationError::ContentKindMismatch {
                        block: *block,
                        expected: crate::model::ContentKind::Inline,
                        found: b.node_type.clone(),
                    },
                )?;
                let mut removed_mark = None;
                map_marks_in_range(children, *from, *to, |marks| {
                    if let Some(m) = marks.get(mark_type) {
                        removed_mark = Some(m.clone());
                    }
                    marks.remove_type(mark_type);
                });
                match removed_mark {
                    Some(mark) => Step::AddMarkStep {
                        block: *block,
                        from: *from,
                        to: *to,
                        mark,
                    },
                    None => Step::RemoveMarkStep {
                        block: *block,
                        from: *from,
                        to: *to,
                        mark_type: mark_type.clone(),
                    },
                }
            }
            Step::SplitBlockStep {
                block,
                offset,
                right_id,
            } => {
                let parent_children = find_parent_children(&mut doc, *block)
                    .ok_or(ValidationError::SelectionDanglingBlock { block: *block })?;
                let idx = parent_children
                    .iter()
                    .position(|b| b.id == *block)
                    .ok_or(ValidationError::SelectionDanglingBlock { block: *block })?;
                let left = &parent_children[idx];
                let inline = left
                    .content
                    .as_inline()
                    .ok_or(ValidationError::ContentKindMismatch {
                        block: *block,
                        expected: crate::model::ContentKind::Inline,
                        found: left.node_type.clone(),
                    })?
                    .to_vec();
                let (left_children, right_children) = split_inline_at(inline, *offset);
                let node_type = left.node_type.clone();
                let attrs = left.attrs.clone();
                let right = Block {
                    id: *right_id,
                    node_type: node_type.clone(),
                    attrs: attrs.clone(),
                    content: BlockContent::Inline(right_children),
                    is_void: false,
                    is_isolating: false,
                    is_atom: false,
                };
                parent_children[idx].content = BlockContent::Inline(left_children);
                parent_children.insert(idx + 1, right);
                Step::JoinBlockStep {
                    first: *block,
                    second: *right_id,
                }
            }
            Step::JoinBlockStep { first, second } => {
                let parent_children = find_parent_children(&mut doc, *first)
                    .ok_or(ValidationError::SelectionDanglingBlock { block: *first })?;
                let first_idx = parent_children
                    .iter()
                    .position(|b| b.id == *first)
                    .ok_or(ValidationError::SelectionDanglingBlock { block: *first })?;
                let second_idx = parent_children
                    .iter()
                    .position(|b| b.id == *second)
                    .ok_or(ValidationError::SelectionDanglingBlock { block: *second })?;
                let removed = parent_children.remove(second_idx);
                let split_offset = parent_children[first_idx].inline_width();
                let removed_children = removed
                    .content
                    .as_inline()
                    .map(|c| c.to_vec())
                    .unwrap_or_default();
                if let Some(first_children) = parent_children[first_idx].content.as_inline_mut() {
                    first_children.extend(removed_children);
                }
                Step::SplitBlockStep {
                    block: *first,
                    offset: split_offset,
                    right_id: *second,
                }
            }
        };
        doc.bump_version();
        doc.normalize();
        Ok((doc, inverse))
    }

    /// The offset-mapping contribution of this step, used to translate
    /// pending positions (selection, decorations, queued steps)
    /// forward through a transaction (§4.2 "Mapping").
    pub fn step_map(&self) -> StepMap {
        match self {
            Step::ReplaceStep {
                from, to, content, ..
            } => StepMap::replace(
                *from,
                to - from,
                content.iter().map(InlineChild::width).sum(),
            ),
            _ => StepMap::new(),
        }
    }

    /// Which block id this step's range-based variants are scoped to,
    /// used by [`StepMap`]-based mapping to decide whether a position
    /// elsewhere in the document is unaffected.
    pub fn scoped_block(&self) -> Option<BlockId> {
        match self {
            Step::ReplaceStep { block, .. }
            | Step::ReplaceBlockStep { block, .. }
            | Step::AttrStep { block, .. }
            | Step::AddMarkStep { block, .. }
            | Step::RemoveMarkStep { block, .. }
            | Step::SplitBlockStep { block, .. } => Some(*block),
            Step::JoinBlockStep { first, .. } => Some(*first),
        }
    }
}

fn splice_inline(
    block: BlockId,
    children: &mut Vec<InlineChild>,
    from: usize,
    to: usize,
    new_content: Vec<InlineChild>,
) -> Result<Vec<InlineChild>, ValidationError> {
    let total: usize = children.iter().map(InlineChild::width).sum();
    if to > total || from > to {
        return Err(ValidationError::OffsetOutOfRange {
            block,
            offset: to,
            len: total,
        });
    }
    let (before, rest) = split_inline_at(children.clone(), from);
    let (removed, after) = split_inline_at(rest, to - from);
    let mut result = before;
    result.extend(new_content);
    result.extend(after);
    *children = crate::model::normalize_inline_children(result);
    Ok(removed)
}

/// Split a run of inline children at `offset`, cutting a text run in
/// two if the offset lands mid-run.
fn split_inline_at(children: Vec<InlineChild>, offset: usize) -> (Vec<InlineChild>, Vec<InlineChild>) {
    let mut left = Vec::new();
    let mut right = Vec::new();
    let mut remaining = offset;
    let mut splitting = false;
    for child in children {
        if splitting {
            right.push(child);
            continue;
        }
        let width = child.width();
        if remaining >= width {
            remaining -= width;
            left.push(child);
            continue;
        }
        match child {
            InlineChild::Text { text, marks } => {
                let chars: Vec<char> = text.chars().collect();
                let (l, r) = chars.split_at(remaining);
                if !l.is_empty() {
                    left.push(InlineChild::text_with_marks(
                        l.iter().collect::<String>(),
                        marks.clone(),
                    ));
                }
                if !r.is_empty() {
                    right.push(InlineChild::text_with_marks(
                        r.iter().collect::<String>(),
                        marks,
                    ));
                }
            }
            node @ InlineChild::Node(_) => {
                // remaining == 0 here since node width is 1 and remaining < width
                right.push(node);
            }
        }
        splitting = true;
    }
    (left, right)
}

fn map_marks_in_range(
    children: &mut [InlineChild],
    from: usize,
    to: usize,
    mut f: impl FnMut(&mut crate::model::MarkSet),
) {
    let mut pos = 0;
    for child in children.iter_mut() {
        let width = child.width();
        let start = pos;
        let end = pos + width;
        pos = end;
        if end <= from || start >= to {
            continue;
        }
        if let InlineChild::Text { marks, .. } = child {
            f(marks);
        }
    }
}

/// Locate the sibling list that directly contains `id`, anywhere in
/// the document tree (top level or nested inside a container block).
fn find_parent_children(doc: &mut Document, id: BlockId) -> Option<&mut Vec<Block>> {
    if doc.blocks.iter().any(|b| b.id == id) {
        return Some(&mut doc.blocks);
    }
    search_children(&mut doc.blocks, id)
}

fn search_children(blocks: &mut Vec<Block>, id: BlockId) -> Option<&mut Vec<Block>> {
    for block in blocks.iter_mut() {
        if let BlockContent::Blocks(children) = &mut block.content {
            if children.iter().any(|b| b.id == id) {
                return Some(children);
            }
            if let Some(found) = search_children(children, id) {
                return Some(found);
            }
        }
    }
    None
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::BlockIdAllocator;

    fn para(id: u64, text: &str) -> Block {
        Block::new_inline(BlockId::from_raw(id), "paragraph".into(), vec![InlineChild::text(text)])
    }

    #[test]
    fn replace_step_inserts_and_inverse_removes() {
        let doc = Document::new(vec![para(1, "hello")]);
        let step = Step::ReplaceStep {
            block: BlockId::from_raw(1),
            from: 5,
            to: 5,
            content: vec![InlineChild::text(" world")],
        };
        let (doc2, inverse) = step.apply(&doc).unwrap();
        assert_eq!(Document::block_text(&doc2.blocks[0]), "hello world");
        let (doc3, _) = inverse.apply(&doc2).unwrap();
        assert_eq!(Document::block_text(&doc3.blocks[0]), "hello");
    }

    #[test]
    fn replace_step_out_of_range_is_rejected() {
        let doc = Document::new(vec![para(1, "hi")]);
        let step = Step::ReplaceStep {
            block: BlockId::from_raw(1),
            from: 0,
            to: 99,
            content: vec![],
        };
        assert!(step.apply(&doc).is_err());
    }

    #[test]
    fn add_mark_step_and_inverse() {
        let doc = Document::new(vec![para(1, "hello")]);
        let step = Step::AddMarkStep {
            block: BlockId::from_raw(1),
            from: 0,
            to: 5,
            mark: Mark::new("bold"),
        };
        let (doc2, inverse) = step.apply(&doc).unwrap();
        let marks = doc2.blocks[0].inline_children()[0].marks().unwrap();
        assert!(marks.contains_type(&MarkType::from("bold")));
        let (doc3, _) = inverse.apply(&doc2).unwrap();
        assert!(doc3.blocks[0].inline_children()[0]
            .marks()
            .unwrap()
            .is_empty());
    }

    #[test]
    fn split_then_join_round_trips() {
        let alloc = BlockIdAllocator::new();
        let right_id = BlockId::from_raw(100);
        let doc = Document::new(vec![para(1, "helloworld")]);
        let split = Step::SplitBlockStep {
            block: BlockId::from_raw(1),
            offset: 5,
            right_id,
        };
        let (doc2, join) = split.apply(&doc).unwrap();
        assert_eq!(doc2.blocks.len(), 2);
        assert_eq!(Document::block_text(&doc2.blocks[0]), "hello");
        assert_eq!(Document::block_text(&doc2.blocks[1]), "world");
        let (doc3, _) = join.apply(&doc2).unwrap();
        assert_eq!(doc3.blocks.len(), 1);
        assert_eq!(Document::block_text(&doc3.blocks[0]), "helloworld");
        let _ = alloc.alloc();
    }

    #[test]
    fn attr_step_sets_and_inverts() {
        let doc = Document::new(vec![para(1, "hi")]);
        let step = Step::AttrStep {
            block: BlockId::from_raw(1),
            key: "align".into(),
            value: Some("center".into()),
        };
        let (doc2, inverse) = step.apply(&doc).unwrap();
        assert_eq!(doc2.blocks[0].attrs.get("align").map(String::as_str), Some("center"));
        let (doc3, _) = inverse.apply(&doc2).unwrap();
        assert_eq!(doc3.blocks[0].attrs.get("align"), None);
    }
}

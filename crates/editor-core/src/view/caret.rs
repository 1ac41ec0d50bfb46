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

//! Caret navigation (§4.7): crossing from one textblock to the next
//! across a void or isolating boundary, independent of whatever
//! layout-aware probe decided a visual line had ended. The probe
//! itself (`endOfTextblock`, built on `Selection.modify` and rect
//! comparison) needs a live DOM and lives in the `dom` submodule; the
//! decision of *where* the caret lands once a block boundary is
//! crossed is pure tree logic and is tested here directly.

use crate::model::{Block, BlockId, Document, GapSide, Schema, Selection};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Remembers the last horizontal caret x-coordinate so repeated
/// up/down motion keeps a stable target column across lines of
/// different length (§4.7 "goal column"). Reset on any horizontal
/// motion, typing, or click (§4.7).
#[derive(Debug, Default)]
pub struct GoalColumn {
    x: Option<f64>,
}

impl GoalColumn {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_set(&mut self, current_x: f64) -> f64 {
        *self.x.get_or_insert(current_x)
    }

    pub fn reset(&mut self) {
        self.x = None;
    }
}

/// Flatten the document into leaf textblocks/void blocks in document
/// order, recording each one's isolating ancestor (if any) so crossing
/// into or out of an isolating subtree can be refused (§4.7
/// "Isolating ancestors").
fn leaf_sequence<'a>(doc: &'a Document) -> Vec<(&'a Block, Option<BlockId>)> {
    fn walk<'a>(block: &'a Block, isolating: Option<BlockId>, out: &mut Vec<(&'a Block, Option<BlockId>)>) {
        let isolating = if block.is_isolating { Some(block.id) } else { isolating };
        if block.is_void || block.content.as_inline().is_some() {
            out.push((block, isolating));
        } else {
            for child in block.child_blocks() {
                walk(child, isolating, out);
            }
        }
    }
    let mut out = Vec::new();
    for block in &doc.blocks {
        walk(block, None, &mut out);
    }
    out
}

/// Cross from the textblock/void block containing `from` to the next
/// leaf in `direction`, producing whatever selection kind fits the
/// target (§4.7 "navigateAcrossBlocks"):
/// - a void block becomes a [`crate::model::selection::NodeSelection`]
/// - stepping out of (or into) an isolating subtree without crossing
///   its boundary cleanly becomes a [`crate::model::selection::GapCursor`]
///   at the boundary instead of entering
/// - an ordinary textblock becomes a [`crate::model::selection::TextSelection`]
///   collapsed at the end nearest the direction of travel
/// - `None` means there is nowhere left to go (document edge)
pub fn navigate_across_blocks(
    doc: &Document,
    _schema: &Schema,
    from_block: BlockId,
    direction: Direction,
) -> Option<Selection> {
    let leaves = leaf_sequence(doc);
    let current_index = leaves.iter().position(|(b, _)| b.id == from_block)?;
    let (current_block, current_isolating) = leaves[current_index];

    let next_index = match direction {
        Direction::Forward => current_index.checked_add(1),
        Direction::Backward => current_index.checked_sub(1),
    };
    let Some(next_index) = next_index else {
        // Nowhere further to go. Stepping off a void block at the
        // document's edge still produces a gap rather than leaving the
        // selection in place, so the caret has somewhere to land before
        // it's clear there really is nothing left.
        let side = match direction {
            Direction::Forward => GapSide::After,
            Direction::Backward => GapSide::Before,
        };
        return current_block.is_void.then(|| Selection::gap(from_block, side));
    };
    let (target, target_isolating) = *leaves.get(next_index)?;

    if current_isolating != target_isolating {
        // Crossing an isolating boundary: stop at the gap rather than
        // entering or leaving the isolated subtree directly.
        let side = match direction {
            Direction::Forward => GapSide::After,
            Direction::Backward => GapSide::Before,
        };
        return Some(Selection::gap(from_block, side));
    }

    if target.is_void {
        return Some(Selection::node(target.id));
    }

    let offset = match direction {
        Direction::Forward => 0,
        Direction::Backward => target.inline_width(),
    };
    Some(Selection::collapsed_at(crate::model::Position::new(target.id, offset)))
}

/// Deletion target for a collapsed caret at a block boundary (§4.7
/// "Deletion semantics"): backspacing at offset 0 of a textblock that
/// directly follows a void block deletes the void block itself rather
/// than doing nothing; the symmetric case holds for forward-delete.
pub fn boundary_delete_target(doc: &Document, block: BlockId, direction: Direction) -> Option<BlockId> {
    let leaves = leaf_sequence(doc);
    let index = leaves.iter().position(|(b, _)| b.id == block)?;
    let neighbor_index = match direction {
        Direction::Backward => index.checked_sub(1),
        Direction::Forward => index.checked_add(1),
    }?;
    let (neighbor, _) = *leaves.get(neighbor_index)?;
    neighbor.is_void.then_some(neighbor.id)
}

#[cfg(feature = "dom")]
pub mod dom {
    //! The layout-aware `endOfTextblock` probe (§4.7): uses
    //! `Selection.modify` to attempt a one-line move and compares the
    //! caret's bounding rect before and after to tell whether the move
    //! actually crossed a visual line boundary, inside the current
    //! textblock, or fell through to the block's edge. Word-wrapped
    //! content means a plain offset-at-0-or-len check cannot answer
    //! this on its own; this probe exists because soft-wrapped lines
    //! have no offset that marks them.

    use web_sys::Window;

    use super::Direction;

    /// Returns `true` when moving one line further in `direction`
    /// would leave the block entirely (the probe's move didn't change
    /// the caret rect, or changed it in a way inconsistent with still
    /// being inside the block) — i.e. the caret is already at the
    /// textblock's visual start/end line.
    pub fn end_of_textblock(window: &Window, direction: Direction) -> bool {
        let Some(selection) = window.get_selection().ok().flatten() else {
            return true;
        };
        let before_rect = caret_rect(&selection);
        let dir = match direction {
            Direction::Forward => "forward",
            Direction::Backward => "backward",
        };
        let _ = selection.modify("move", dir, "line");
        let after_rect = caret_rect(&selection);
        match (before_rect, after_rect) {
            (Some(before), Some(after)) => {
                // A genuine same-block line move changes the caret's y
                // coordinate; if y is unchanged the probe couldn't move
                // any further and offset-heuristic fallback decides.
                (after.1 - before.1).abs() < 0.5 && (after.0 - before.0).abs() < 0.5
            }
            _ => true,
        }
    }

    fn caret_rect(selection: &web_sys::Selection) -> Option<(f64, f64)> {
        let range = selection.get_range_at(0).ok()?;
        let rect = range.get_bounding_client_rect();
        Some((rect.x(), rect.y()))
    }
}

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

//! Selection synchronization (§4.5): converting a block-relative
//! inline offset to/from a walk over a textblock's rendered leaves (a
//! text run or a `contenteditable="false"` inline atom, each
//! contributing its own width; mark/decoration wrapper elements are
//! transparent and contribute nothing). The offset math is plain and
//! unit-tested here; the actual DOM tree walk and `Selection`/`Range`
//! manipulation live in the `dom` submodule, built only under the
//! `dom` feature.

/// One rendered leaf inside a textblock, in document order. A text
/// leaf's width is its character count; an atom leaf always has width
/// 1 (§4.5: "inline atoms ... as width-1 positions").
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Leaf {
    Text(usize),
    Atom,
}

impl Leaf {
    fn width(self) -> usize {
        match self {
            Leaf::Text(len) => len,
            Leaf::Atom => 1,
        }
    }
}

/// Where a block-relative offset lands within a leaf sequence: the
/// leaf's index and the offset inside it (for a text leaf, a
/// char-boundary offset; for an atom, always 0 or 1 — before/after it).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LeafPosition {
    pub leaf_index: usize,
    pub offset_in_leaf: usize,
}

/// Map a block-relative inline offset to the leaf it falls in (§4.5
/// "State -> DOM"). An offset exactly at the end of the content maps
/// past the last leaf, with `leaf_index == leaves.len()`.
pub fn locate_offset(leaves: &[Leaf], offset: usize) -> LeafPosition {
    let mut remaining = offset;
    for (i, leaf) in leaves.iter().enumerate() {
        let width = leaf.width();
        if remaining < width {
            return LeafPosition {
                leaf_index: i,
                offset_in_leaf: remaining,
            };
        }
        // A boundary exactly at a text leaf's end is reported against
        // that leaf (DOM text offsets can address "one past the last
        // character"); a boundary at an atom's end has nowhere to
        // point inside a non-text node, so it rolls onto the start of
        // whatever leaf comes next.
        if remaining == width && matches!(leaf, Leaf::Text(_)) {
            return LeafPosition {
                leaf_index: i,
                offset_in_leaf: width,
            };
        }
        remaining -= width;
    }
    LeafPosition {
        leaf_index: leaves.len(),
        offset_in_leaf: 0,
    }
}

/// The inverse: given where the DOM caret landed (a leaf index and an
/// in-leaf offset), recover the block-relative inline offset (§4.5
/// "DOM -> State").
pub fn offset_from_leaf_position(leaves: &[Leaf], pos: LeafPosition) -> usize {
    let mut offset = 0;
    for leaf in leaves.iter().take(pos.leaf_index) {
        offset += leaf.width();
    }
    offset + pos.offset_in_leaf
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn locate_offset_in_middle_of_text_leaf() {
        let leaves = [Leaf::Text(5)];
        let pos = locate_offset(&leaves, 2);
        assert_eq!(pos, LeafPosition { leaf_index: 0, offset_in_leaf: 2 });
    }

    #[test]
    fn locate_offset_at_leaf_boundary_prefers_trailing_end() {
        let leaves = [Leaf::Text(3), Leaf::Text(2)];
        // offset 3 is both "end of leaf 0" and "start of leaf 1"; we
        // resolve to the end of the leaf that actually reaches there.
        let pos = locate_offset(&leaves, 3);
        assert_eq!(pos.leaf_index, 0);
        assert_eq!(pos.offset_in_leaf, 3);
    }

    #[test]
    fn locate_offset_past_atom_lands_after_it() {
        let leaves = [Leaf::Text(2), Leaf::Atom, Leaf::Text(2)];
        let pos = locate_offset(&leaves, 3);
        assert_eq!(pos, LeafPosition { leaf_index: 2, offset_in_leaf: 0 });
    }

    #[test]
    fn locate_offset_at_document_end() {
        let leaves = [Leaf::Text(2)];
        let pos = locate_offset(&leaves, 2);
        assert_eq!(pos.leaf_index, 0);
        assert_eq!(pos.offset_in_leaf, 2);
    }

    #[test]
    fn round_trip_through_offset_and_back() {
        let leaves = [Leaf::Text(3), Leaf::Atom, Leaf::Text(4)];
        for offset in 0..=8 {
            let pos = locate_offset(&leaves, offset);
            assert_eq!(offset_from_leaf_position(&leaves, pos), offset);
        }
    }
}

#[cfg(feature = "dom")]
pub mod dom {
    //! Live DOM <-> [`crate::model::Position`] conversion (§4.5). Walks
    //! a block element's descendants collecting [`super::Leaf`]s,
    //! skipping mark/decoration wrapper elements (they carry no width
    //! of their own) and refusing to descend into a nested block
    //! subtree (a `data-block-id` marks a boundary, not a leaf).

    use wasm_bindgen::JsCast;
    use web_sys::{Element, Node, Selection as DomSelection};

    use crate::model::BlockId;
    use crate::state::EditorState;

    use super::{locate_offset, offset_from_leaf_position, Leaf, LeafPosition};

    /// Collect the leaf sequence for one textblock's rendered subtree,
    /// alongside the actual DOM node each leaf corresponds to (a text
    /// node, or an atom's wrapper element) so the caller can place a
    /// `Range` boundary against it.
    pub fn collect_leaves(block_el: &Element) -> (Vec<Leaf>, Vec<Node>) {
        let mut leaves = Vec::new();
        let mut nodes = Vec::new();
        walk(block_el, &mut leaves, &mut nodes);
        (leaves, nodes)
    }

    fn walk(el: &Element, leaves: &mut Vec<Leaf>, nodes: &mut Vec<Node>) {
        let children = el.child_nodes();
        for i in 0..children.length() {
            let Some(child) = children.item(i) else { continue };
            if let Some(text) = child.dyn_ref::<web_sys::Text>() {
                let len = text.data().chars().count();
                if len > 0 {
                    leaves.push(Leaf::Text(len));
                    nodes.push(child.clone());
                }
                continue;
            }
            if let Some(child_el) = child.dyn_ref::<Element>() {
                if child_el.has_attribute("data-block-id") {
                    // A nested block subtree: not part of this
                    // textblock's inline content at all.
                    continue;
                }
                if child_el.get_attribute("contenteditable").as_deref() == Some("false") {
                    leaves.push(Leaf::Atom);
                    nodes.push(child.clone());
                    continue;
                }
                // Mark/decoration wrapper: transparent, recurse.
                walk(child_el, leaves, nodes);
            }
        }
    }

    /// Push the editor's current [`crate::model::Selection`] (reduced
    /// to one textblock's Position) into the live DOM `Selection`
    /// (§4.5 "State -> DOM", `TextSelection` case). NodeSelection and
    /// GapCursor are handled by the caller before reaching here — this
    /// function only places a caret/range inside rendered text.
    pub fn place_caret(dom_selection: &DomSelection, block_el: &Element, offset: usize) {
        let (leaves, nodes) = collect_leaves(block_el);
        if leaves.is_empty() {
            // Empty textblock renders a lone <br>; collapse selection
            // on the block element itself at child index 0.
            dom_selection.collapse_with_offset(Some(block_el.as_ref() as &Node), 0).ok();
            return;
        }
        let pos = locate_offset(&leaves, offset);
        let leaf_index = pos.leaf_index.min(nodes.len() - 1);
        let node = &nodes[leaf_index];
        let dom_offset = if pos.leaf_index >= nodes.len() {
            match leaves[leaf_index] {
                Leaf::Text(len) => len,
                Leaf::Atom => 1,
            }
        } else {
            pos.offset_in_leaf
        };
        dom_selection.collapse_with_offset(Some(node), dom_offset as u32).ok();
    }

    /// Read the live DOM `Selection` back into a block-relative inline
    /// offset (§4.5 "DOM -> State"). Returns `None` if the anchor node
    /// isn't inside a rendered leaf this walk recognizes (e.g. the
    /// selection landed in chrome outside the editor).
    pub fn read_caret(block_el: &Element, anchor_node: &Node, anchor_offset: usize) -> Option<usize> {
        let (leaves, nodes) = collect_leaves(block_el);
        let leaf_index = nodes.iter().position(|n| n == anchor_node)?;
        let offset_in_leaf = match leaves[leaf_index] {
            Leaf::Text(len) => anchor_offset.min(len),
            Leaf::Atom => anchor_offset.min(1),
        };
        Some(offset_from_leaf_position(
            &leaves,
            LeafPosition { leaf_index, offset_in_leaf },
        ))
    }

    /// Render a [`crate::model::selection::NodeSelection`] by placing a
    /// `Range` around the whole block element and marking it
    /// `data-selected` (§4.5 "NodeSelection"), rather than attempting a
    /// text-offset caret a void block has none of.
    pub fn mark_node_selected(block_el: &Element, selected: bool) {
        if selected {
            block_el.set_attribute("data-selected", "true").ok();
        } else {
            block_el.remove_attribute("data-selected").ok();
        }
    }

    /// Render a [`crate::model::selection::GapCursor`] (§4.5
    /// "GapCursor"): the DOM selection itself is cleared (there is no
    /// real caret to host it) and a pseudo-element marker attribute is
    /// set on the block adjacent to the gap instead.
    pub fn render_gap_cursor(dom_selection: &DomSelection, block_el: &Element, side_attr: &str) {
        dom_selection.remove_all_ranges().ok();
        block_el.set_attribute("data-gap-cursor", side_attr).ok();
    }

    /// Whether `state`'s current selection targets `block` at all,
    /// used by the reconciler/selection-sync pass to skip blocks with
    /// nothing to place (most of the document, on any given frame).
    pub fn selection_targets_block(state: &EditorState, block: BlockId) -> bool {
        state
            .selection
            .referenced_blocks()
            .into_iter()
            .any(|id| id == block)
    }
}

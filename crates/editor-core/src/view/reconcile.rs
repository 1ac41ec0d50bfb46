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

//! The keyed reconciler (§4.4 "Reconciliation strategy"): diffs the
//! previous document's top-level block order against the next one and
//! emits a minimal patch plan, keyed by [`BlockId`] so a block that
//! merely moved (e.g. drag-reorder) is never torn down and rebuilt.

use std::collections::HashMap;

use crate::model::{Block, BlockId, Document};
use crate::plugin::DecorationSet;
use crate::view::segments::decoration_sets_equal;

/// One instruction against the DOM tree, in application order.
#[derive(Clone, Debug, PartialEq)]
pub enum Patch {
    /// A block present before and absent now: remove its element.
    Remove(BlockId),
    /// A block whose content/attrs didn't change identity-wise but
    /// needs its children re-rendered (text/mark/attr edit, or its
    /// decorations changed).
    Update(BlockId),
    /// A block new to this state: render it fresh and insert before
    /// `before` (`None` means append at the end).
    Insert { block: BlockId, before: Option<BlockId> },
    /// A block that existed before, is unchanged, but now sits at a
    /// different index: reposition its element, no content patch.
    Move { block: BlockId, before: Option<BlockId> },
}

/// Diff the previous top-level block list against the next one,
/// producing the patch plan the DOM-applying half of the reconciler
/// replays (§4.4). `prev`/`next` decorations are compared so a
/// decoration-only change (no document edit at all) still triggers an
/// `Update`, while an unrelated block is left a no-op (not even
/// present in the plan).
pub fn diff(
    prev_doc: &Document,
    next_doc: &Document,
    prev_decorations: &DecorationSet,
    next_decorations: &DecorationSet,
) -> Vec<Patch> {
    let prev_by_id: HashMap<BlockId, &Block> =
        prev_doc.blocks.iter().map(|b| (b.id, b)).collect();
    let next_ids: Vec<BlockId> = next_doc.blocks.iter().map(|b| b.id).collect();
    let next_index: HashMap<BlockId, usize> =
        next_ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();

    let mut patches = Vec::new();

    for prev_block in &prev_doc.blocks {
        if !next_index.contains_key(&prev_block.id) {
            patches.push(Patch::Remove(prev_block.id));
        }
    }

    // Longest-common-subsequence of surviving ids decides which kept
    // blocks stay put (no Move patch) versus which must reposition —
    // a plain "index changed" test would move almost every block after
    // a single item is dragged past its neighbors.
    let surviving: Vec<BlockId> = prev_doc
        .blocks
        .iter()
        .map(|b| b.id)
        .filter(|id| next_index.contains_key(id))
        .collect();
    let stay = lcs_by_next_index(&surviving, &next_index);

    for (i, block) in next_doc.blocks.iter().enumerate() {
        let before = next_ids.get(i + 1).copied();
        match prev_by_id.get(&block.id) {
            None => patches.push(Patch::Insert { block: block.id, before }),
            Some(prev_block) => {
                let content_changed = *prev_block != block;
                let decos_changed = !decoration_sets_equal(
                    &prev_decorations.for_block(block.id).cloned().collect::<Vec<_>>(),
                    &next_decorations.for_block(block.id).cloned().collect::<Vec<_>>(),
                );
                if content_changed || decos_changed {
                    patches.push(Patch::Update(block.id));
                }
                if !stay.contains(&block.id) {
                    patches.push(Patch::Move { block: block.id, before });
                }
            }
        }
    }

    patches
}

/// Ids (from `surviving`, in prev order) whose relative order is
/// already consistent with `next_index` — the longest increasing
/// subsequence of their next-position indices.
fn lcs_by_next_index(surviving: &[BlockId], next_index: &HashMap<BlockId, usize>) -> Vec<BlockId> {
    let positions: Vec<usize> = surviving.iter().map(|id| next_index[id]).collect();
    if positions.is_empty() {
        return Vec::new();
    }
    // Patience-sorting LIS: tails[i] = smallest tail value of an
    // increasing subsequence of length i+1; preds reconstructs it.
    let mut tails: Vec<usize> = Vec::new();
    let mut tails_idx: Vec<usize> = Vec::new();
    let mut preds: Vec<Option<usize>> = vec![None; positions.len()];

    for (i, &pos) in positions.iter().enumerate() {
        let slot = tails.partition_point(|&t| t < pos);
        if slot == tails.len() {
            tails.push(pos);
            tails_idx.push(i);
        } else {
            tails[slot] = pos;
            tails_idx[slot] = i;
        }
        preds[i] = if slot > 0 { Some(tails_idx[slot - 1]) } else { None };
    }

    let mut result = Vec::new();
    let mut cur = tails_idx.last().copied();
    while let Some(i) = cur {
        result.push(surviving[i]);
        cur = preds[i];
    }
    result.reverse();
    result
}

#[cfg(feature = "dom")]
pub mod dom {
    //! DOM-applying half of the reconciler: given a [`Patch`] plan and
    //! a `data-block-id`-keyed container, mutate the real tree to
    //! match. Kept separate from [`super::diff`] so the patch plan
    //! itself is fully unit-testable off the wasm target.

    use std::collections::HashMap;

    use wasm_bindgen::JsCast;
    use web_sys::{Document as DomDocument, Element};

    use crate::model::{Block, BlockId, Document, Schema};
    use crate::plugin::DecorationSet;
    use crate::view::segments::{compute_segments, node_decoration_attrs, SegmentContent};

    use super::Patch;

    /// Render one block to a fresh element. Composition-guarded blocks
    /// (§4.4 "Composition guard") are never passed here — the caller
    /// filters them out of the patch plan before calling `apply`.
    pub fn render_block(dom: &DomDocument, block: &Block, schema: &Schema, decorations: &DecorationSet) -> Element {
        let tag = schema
            .node(&block.node_type)
            .map(|spec| spec.dom.tag.as_str())
            .unwrap_or("div");
        let el = dom.create_element(tag).expect("create_element");
        el.set_attribute("data-block-id", &block.id.raw().to_string()).ok();
        for (key, value) in node_decoration_attrs(block.id, decorations) {
            el.set_attribute(&key, &value).ok();
        }
        if block.is_void {
            for (key, value) in &block.attrs {
                el.set_attribute(key, value).ok();
            }
            return el;
        }
        if block.content.as_inline().is_some() {
            render_inline_content(dom, &el, block, schema, decorations);
        } else {
            for child in block.child_blocks() {
                let child_el = render_block(dom, child, schema, decorations);
                el.append_child(&child_el).ok();
            }
        }
        el
    }

    fn render_inline_content(dom: &DomDocument, parent: &Element, block: &Block, schema: &Schema, decorations: &DecorationSet) {
        if block.inline_width() == 0 {
            // Empty textblock: render a <br> so the caret has something
            // to land against (§4.5 "State -> DOM").
            let br = dom.create_element("br").expect("create_element");
            parent.append_child(&br).ok();
            return;
        }
        for segment in compute_segments(block, schema, decorations) {
            for widget_key in &segment.widgets_before {
                let widget = dom.create_element("span").expect("create_element");
                widget.set_attribute("data-widget", widget_key).ok();
                widget.set_attribute("contenteditable", "false").ok();
                parent.append_child(&widget).ok();
            }
            let node: web_sys::Node = match &segment.content {
                SegmentContent::Text(text) => dom.create_text_node(text).into(),
                SegmentContent::Node(inline_node) => {
                    let el = dom.create_element("span").expect("create_element");
                    el.set_attribute("contenteditable", "false").ok();
                    el.set_attribute("data-inline-node", &inline_node.node_type.0).ok();
                    if inline_node.node_type.0 == "hard_break" {
                        let br = dom.create_element("br").expect("create_element");
                        el.append_child(&br).ok();
                    }
                    el.into()
                }
            };
            let wrapped = wrap_by_marks(dom, node, &segment.marks, schema);
            let wrapped = wrap_by_decorations(dom, wrapped, &segment.decorations);
            parent.append_child(&wrapped).ok();
        }
    }

    fn wrap_by_marks(dom: &DomDocument, node: web_sys::Node, marks: &[crate::model::Mark], schema: &Schema) -> web_sys::Node {
        let mut current = node;
        for mark in marks {
            let tag = schema
                .mark(&mark.mark_type)
                .map(|spec| spec.dom.tag.as_str())
                .unwrap_or("span");
            let wrapper = dom.create_element(tag).expect("create_element");
            if mark.mark_type.0 == "link" {
                if let Some(href) = mark.attrs.get("href") {
                    wrapper.set_attribute("href", href).ok();
                }
            }
            wrapper.append_child(&current).ok();
            current = wrapper.into();
        }
        current
    }

    fn wrap_by_decorations(dom: &DomDocument, node: web_sys::Node, decorations: &[std::collections::BTreeMap<String, String>]) -> web_sys::Node {
        let mut current = node;
        for attrs in decorations {
            let wrapper = dom.create_element("span").expect("create_element");
            wrapper.set_attribute("data-decoration", "true").ok();
            for (key, value) in attrs {
                wrapper.set_attribute(key, value).ok();
            }
            wrapper.append_child(&current).ok();
            current = wrapper.into();
        }
        current
    }

    /// Apply a patch plan (from [`super::diff`]) against `container`,
    /// whose direct children carry `data-block-id` (§4.4 "Keyed by
    /// BlockId"). `composing` names blocks currently under active IME
    /// composition; their patches are skipped entirely (§4.4
    /// "Composition guard").
    pub fn apply(
        dom: &DomDocument,
        container: &Element,
        patches: &[Patch],
        next_doc: &Document,
        schema: &Schema,
        decorations: &DecorationSet,
        composing: &[BlockId],
    ) {
        let elements = index_children(container);
        let next_by_id: HashMap<BlockId, &Block> = next_doc.blocks.iter().map(|b| (b.id, b)).collect();

        for patch in patches {
            let block_id = match patch {
                Patch::Remove(id) | Patch::Update(id) => *id,
                Patch::Insert { block, .. } | Patch::Move { block, .. } => *block,
            };
            if composing.contains(&block_id) {
                continue;
            }
            match patch {
                Patch::Remove(id) => {
                    if let Some(el) = elements.get(id) {
                        if let Some(parent) = el.parent_node() {
                            parent.remove_child(el).ok();
                        }
                    }
                }
                Patch::Update(id) => {
                    if let (Some(old_el), Some(block)) = (elements.get(id), next_by_id.get(id)) {
                        let fresh = render_block(dom, block, schema, decorations);
                        if let Some(parent) = old_el.parent_node() {
                            parent.replace_child(&fresh, old_el).ok();
                        }
                    }
                }
                Patch::Insert { block, before } => {
                    if let Some(block_data) = next_by_id.get(block) {
                        let fresh = render_block(dom, block_data, schema, decorations);
                        let before_el = before.and_then(|id| elements.get(&id));
                        container
                            .insert_before(&fresh, before_el.map(|e| e.as_ref() as &web_sys::Node))
                            .ok();
                    }
                }
                Patch::Move { block, before } => {
                    if let Some(el) = elements.get(block) {
                        let before_el = before.and_then(|id| elements.get(&id));
                        container
                            .insert_before(el, before_el.map(|e| e.as_ref() as &web_sys::Node))
                            .ok();
                    }
                }
            }
        }
    }

    fn index_children(container: &Element) -> HashMap<BlockId, Element> {
        let mut map = HashMap::new();
        let children = container.children();
        for i in 0..children.length() {
            if let Some(el) = children.item(i) {
                if let Some(id_str) = el.get_attribute("data-block-id") {
                    if let Ok(raw) = id_str.parse::<u64>() {
                        map.insert(BlockId::from_raw(raw), el.dyn_into::<Element>().expect("element"));
                    }
                }
            }
        }
        map
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::{Block, BlockId, Document, InlineChild};

    fn para(id: u64, text: &str) -> Block {
        Block::new_inline(BlockId::from_raw(id), "paragraph".into(), vec![InlineChild::text(text)])
    }

    #[test]
    fn removed_block_emits_remove_patch() {
        let prev = Document::new(vec![para(1, "a"), para(2, "b")]);
        let next = Document::new(vec![para(1, "a")]);
        let empty = DecorationSet::empty();
        let patches = diff(&prev, &next, &empty, &empty);
        assert_eq!(patches, vec![Patch::Remove(BlockId::from_raw(2))]);
    }

    #[test]
    fn new_block_emits_insert_patch() {
        let prev = Document::new(vec![para(1, "a")]);
        let next = Document::new(vec![para(1, "a"), para(2, "b")]);
        let empty = DecorationSet::empty();
        let patches = diff(&prev, &next, &empty, &empty);
        assert_eq!(patches, vec![Patch::Insert { block: BlockId::from_raw(2), before: None }]);
    }

    #[test]
    fn edited_content_emits_update_patch() {
        let prev = Document::new(vec![para(1, "a")]);
        let next = Document::new(vec![para(1, "ab")]);
        let empty = DecorationSet::empty();
        let patches = diff(&prev, &next, &empty, &empty);
        assert_eq!(patches, vec![Patch::Update(BlockId::from_raw(1))]);
    }

    #[test]
    fn reordered_blocks_emit_move_not_remove_and_insert() {
        let prev = Document::new(vec![para(1, "a"), para(2, "b")]);
        let next = Document::new(vec![para(2, "b"), para(1, "a")]);
        let empty = DecorationSet::empty();
        let patches = diff(&prev, &next, &empty, &empty);
        // One of the two blocks stays (the longer increasing run), the
        // other is repositioned — never torn down and rebuilt.
        assert!(patches.iter().all(|p| !matches!(p, Patch::Remove(_) | Patch::Insert { .. })));
        assert!(patches.iter().any(|p| matches!(p, Patch::Move { .. })));
    }

    #[test]
    fn unchanged_document_emits_no_patches() {
        let doc = Document::new(vec![para(1, "a"), para(2, "b")]);
        let empty = DecorationSet::empty();
        let patches = diff(&doc, &doc, &empty, &empty);
        assert!(patches.is_empty());
    }

    #[test]
    fn decoration_only_change_emits_update() {
        use crate::plugin::Decoration;
        let doc = Document::new(vec![para(1, "a")]);
        let prev_decos = DecorationSet::empty();
        let next_decos = DecorationSet::from_vec(vec![Decoration::node(BlockId::from_raw(1), Default::default())]);
        let patches = diff(&doc, &doc, &prev_decos, &next_decos);
        assert_eq!(patches, vec![Patch::Update(BlockId::from_raw(1))]);
    }
}

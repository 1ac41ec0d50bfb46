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

//! Small test-only builders, used throughout `#[cfg(test)] mod test`
//! blocks across the crate instead of hand-assembling a `Document` and
//! `EditorState` every time. `ed()` in particular mirrors the marker
//! convention plugins typically use for selection fixtures: `|` for a
//! collapsed caret, `{`/`}` for an anchor/head range.

use std::sync::Arc;

use crate::model::{
    Block, BlockId, BlockIdAllocator, Document, InlineChild, Mark, MarkSet, MarkType, Schema,
    Selection, TextSelection,
};
use crate::state::EditorState;

/// A fresh, frozen builtin schema — most fixtures don't register
/// plugin extensions, so this is the common case.
pub fn schema() -> Arc<Schema> {
    let mut schema = Schema::with_builtins();
    schema.freeze();
    Arc::new(schema)
}

/// A single paragraph block with plain-text children and a
/// deterministic id, for fixtures that don't care about id allocation.
pub fn para(id: u64, text: &str) -> Block {
    Block::new_inline(BlockId::from_raw(id), "paragraph".into(), vec![InlineChild::text(text)])
}

/// A plain-text inline child, no marks.
pub fn text(s: &str) -> InlineChild {
    InlineChild::text(s)
}

/// A named mark with no attributes, e.g. `mark("bold")`.
pub fn mark(mark_type: &str) -> Mark {
    Mark::new(MarkType::new(mark_type))
}

/// A document made of the given top-level blocks, version 1.
pub fn doc(blocks: Vec<Block>) -> Document {
    Document::new(blocks)
}

/// Parse an example-format string into a single-paragraph
/// [`EditorState`]: `|` marks a collapsed caret, `{`/`}` mark an
/// anchor/head range (anchor at `{`, head at `}`), e.g.
/// `ed("hello| world")` or `ed("{hello} world")`. Markers are stripped
/// from the rendered text before building the block. At most one of
/// `|` or the `{`/`}` pair may appear; mixing both is a fixture bug and
/// panics rather than silently picking one.
pub fn ed(marked: &str) -> EditorState {
    let mut plain = String::new();
    let mut anchor = None;
    let mut head = None;
    let mut caret = None;

    for ch in marked.chars() {
        match ch {
            '|' => {
                assert!(caret.is_none(), "ed(): more than one `|` marker");
                caret = Some(plain.chars().count());
            }
            '{' => {
                assert!(anchor.is_none(), "ed(): more than one `{{` marker");
                anchor = Some(plain.chars().count());
            }
            '}' => {
                assert!(head.is_none(), "ed(): more than one `}}` marker");
                head = Some(plain.chars().count());
            }
            other => plain.push(other),
        }
    }
    assert!(
        caret.is_none() || (anchor.is_none() && head.is_none()),
        "ed(): cannot mix `|` with `{{`/`}}`"
    );

    let block_id = BlockId::from_raw(1);
    let block = Block::new_inline(block_id, "paragraph".into(), vec![InlineChild::text(&plain)]);
    let document = doc(vec![block]);
    let selection = match (caret, anchor, head) {
        (Some(at), _, _) => Selection::collapsed_at(crate::model::Position::new(block_id, at)),
        (None, Some(a), Some(h)) => Selection::Text(TextSelection::new(
            crate::model::Position::new(block_id, a),
            crate::model::Position::new(block_id, h),
        )),
        _ => Selection::collapsed_at(crate::model::Position::new(block_id, 0)),
    };

    EditorState::new(document, selection, schema())
}

/// Build a [`MarkSet`] from a handful of mark type names, for fixtures
/// that need a marked-up text run (`text_with_marks`).
pub fn marks(types: &[&str]) -> MarkSet {
    MarkSet::from_marks(types.iter().map(|t| mark(t)))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::Document as Doc;

    #[test]
    fn ed_parses_collapsed_caret() {
        let state = ed("hello| world");
        assert_eq!(Doc::block_text(&state.document.blocks[0]), "hello world");
        assert!(state.selection.is_collapsed());
        if let Selection::Text(sel) = &state.selection {
            assert_eq!(sel.anchor.offset, 5);
        } else {
            panic!("expected text selection");
        }
    }

    #[test]
    fn ed_parses_range() {
        let state = ed("{hello} world");
        if let Selection::Text(sel) = &state.selection {
            assert_eq!(sel.anchor.offset, 0);
            assert_eq!(sel.head.offset, 5);
        } else {
            panic!("expected text selection");
        }
        assert_eq!(Doc::block_text(&state.document.blocks[0]), "hello world");
    }

    #[test]
    #[should_panic(expected = "cannot mix")]
    fn ed_rejects_mixed_markers() {
        ed("{hel|lo}");
    }
}

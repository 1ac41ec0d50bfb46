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

//! [`EditorState`]: document + selection + schema, the immutable value
//! a [`Transaction`] is applied against to produce the next one (§4.2).

use std::sync::Arc;

use thiserror::Error;

use crate::error::ValidationError;
use crate::model::{BlockIdAllocator, Document, Schema, Selection};
use crate::state::mapping::{Bias, Mapping};
use crate::state::transaction::Transaction;

/// A transaction was rejected outright: none of its steps were applied
/// and the state is unchanged (§4.2, §7 propagation policy —
/// `ValidationError`s from `apply` are absorbed here rather than
/// escaping `dispatch`).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("transaction rejected: {reason}")]
pub struct ApplyRejected {
    pub reason: ValidationError,
}

/// The editor's current document, selection, and schema (data model
/// §3). Cheaply cloneable: `Document` and `Schema` are handed out via
/// `Arc` so `apply` producing a new `EditorState` does not re-copy the
/// whole tree when only a handful of blocks changed structurally
/// (structural sharing, same spirit as the teacher's persistent `Dom<S>`).
#[derive(Clone, Debug)]
pub struct EditorState {
    pub document: Arc<Document>,
    pub selection: Selection,
    pub schema: Arc<Schema>,
    pub alloc: Arc<BlockIdAllocator>,
}

impl EditorState {
    pub fn new(document: Document, selection: Selection, schema: Arc<Schema>) -> Self {
        Self {
            document: Arc::new(document),
            selection,
            schema,
            alloc: Arc::new(BlockIdAllocator::new()),
        }
    }

    /// Apply every step in `tx` in order. On success, returns the next
    /// state and the inverse transaction (for [`crate::state::History`]).
    /// On the first step that violates a document invariant, the whole
    /// transaction is rejected and `self` is left untouched — steps are
    /// never partially applied (§4.2 "atomic").
    #[tracing::instrument(level = "debug", skip(self, tx), fields(origin = ?tx.origin, steps = tx.steps.len()))]
    pub fn apply(&self, tx: &Transaction) -> Result<(EditorState, Transaction), ApplyRejected> {
        let mut doc = (*self.document).clone();
        let mut inverse_steps = Vec::with_capacity(tx.steps.len());
        let mut mapping = Mapping::new();

        for step in &tx.steps {
            let (next_doc, inverse) = step.apply(&doc).map_err(|reason| ApplyRejected { reason })?;
            if let Err(reason) = next_doc.validate(&self.schema) {
                tracing::warn!(%reason, "transaction rejected, state left untouched");
                return Err(ApplyRejected { reason });
            }
            mapping.push(step.step_map(), step.scoped_block());
            doc = next_doc;
            inverse_steps.push(inverse);
        }
        inverse_steps.reverse();

        // `validate` above already rejects a bad step before it's ever
        // committed; this is a second, opt-in pass over the fully
        // assembled document, same spirit as the teacher's own
        // `assert-invariants` feature panicking on a corrupt `Dom<S>`
        // in test/debug builds rather than only in the step-by-step path.
        if cfg!(feature = "assert-invariants") {
            debug_assert!(doc.validate(&self.schema).is_ok(), "committed document violates an invariant");
        }

        let selection = match &tx.selection {
            Some(sel) => doc.repair_selection(sel),
            None => doc.repair_selection(&remap_selection(&self.selection, &mapping)),
        };

        let next = EditorState {
            document: Arc::new(doc),
            selection,
            schema: self.schema.clone(),
            alloc: self.alloc.clone(),
        };

        let inverse_tx = Transaction {
            steps: inverse_steps,
            selection: Some(self.selection.clone()),
            origin: crate::state::transaction::Origin::History,
            meta: Default::default(),
        };

        Ok((next, inverse_tx))
    }
}

/// Best-effort selection carry-forward when a transaction doesn't name
/// an explicit resulting selection: map each referenced position
/// through the transaction's [`Mapping`], but only using the steps
/// scoped to that position's own block — a step editing block A must
/// never shift a caret sitting in block B. [`Document::repair_selection`]
/// is the fallback if the remapped position turns out invalid (e.g.
/// the block itself was removed).
fn remap_selection(selection: &Selection, mapping: &Mapping) -> Selection {
    match selection {
        Selection::Text(text) => {
            let anchor_offset = mapping.map_in_block(text.anchor.block_id, text.anchor.offset, Bias::Before);
            let head_offset = mapping.map_in_block(text.head.block_id, text.head.offset, Bias::After);
            let mut anchor = text.anchor.clone();
            anchor.offset = anchor_offset;
            let mut head = text.head.clone();
            head.offset = head_offset;
            Selection::Text(crate::model::TextSelection::new(anchor, head))
        }
        other => other.clone(),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::{Block, BlockId, InlineChild, Position};
    use crate::state::transaction::Origin;

    fn initial_state() -> EditorState {
        let block = Block::new_inline(
            BlockId::from_raw(1),
            "paragraph".into(),
            vec![InlineChild::text("hello")],
        );
        let doc = Document::new(vec![block]);
        let schema = Arc::new(Schema::with_builtins());
        EditorState::new(
            doc,
            Selection::collapsed_at(Position::new(BlockId::from_raw(1), 5)),
            schema,
        )
    }

    #[test]
    fn apply_commits_steps_and_returns_inverse() {
        let state = initial_state();
        let tx = Transaction::new(Origin::User).replace(
            BlockId::from_raw(1),
            5,
            5,
            vec![InlineChild::text(" world")],
        );
        let (next, inverse) = state.apply(&tx).unwrap();
        assert_eq!(Document::block_text(&next.document.blocks[0]), "hello world");
        let (back, _) = next.apply(&inverse).unwrap();
        assert_eq!(Document::block_text(&back.document.blocks[0]), "hello");
    }

    #[test]
    fn apply_rejects_invalid_step_leaving_state_untouched() {
        let state = initial_state();
        let tx = Transaction::new(Origin::User).replace(BlockId::from_raw(1), 0, 999, vec![]);
        let err = state.apply(&tx);
        assert!(err.is_err());
    }

    #[test]
    fn selection_follows_insertion_before_it() {
        let state = initial_state();
        let tx = Transaction::new(Origin::User).replace(
            BlockId::from_raw(1),
            0,
            0,
            vec![InlineChild::text("XX")],
        );
        let (next, _) = state.apply(&tx).unwrap();
        if let Selection::Text(sel) = &next.selection {
            assert_eq!(sel.anchor.offset, 7);
        } else {
            panic!("expected text selection");
        }
    }

    #[test]
    fn explicit_transaction_selection_wins() {
        let state = initial_state();
        let explicit = Selection::collapsed_at(Position::new(BlockId::from_raw(1), 0));
        let tx = Transaction::new(Origin::User).set_selection(explicit.clone());
        let (next, _) = state.apply(&tx).unwrap();
        assert_eq!(next.selection, explicit);
    }

    #[test]
    fn selection_in_an_untouched_block_is_not_shifted() {
        let first = Block::new_inline(BlockId::from_raw(1), "paragraph".into(), vec![InlineChild::text("hello")]);
        let second = Block::new_inline(BlockId::from_raw(2), "paragraph".into(), vec![InlineChild::text("world")]);
        let doc = Document::new(vec![first, second]);
        let schema = Arc::new(Schema::with_builtins());
        let state = EditorState::new(
            doc,
            Selection::collapsed_at(Position::new(BlockId::from_raw(2), 3)),
            schema,
        );
        let tx = Transaction::new(Origin::User).replace(BlockId::from_raw(1), 0, 0, vec![InlineChild::text("XX")]);
        let (next, _) = state.apply(&tx).unwrap();
        if let Selection::Text(sel) = &next.selection {
            assert_eq!(sel.anchor.block_id, BlockId::from_raw(2));
            assert_eq!(sel.anchor.offset, 3);
        } else {
            panic!("expected text selection");
        }
    }
}

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

//! Undo/redo (§4.7 "History"): a stack of transaction groups, grouped
//! by a time window so a burst of typing undoes in one step, capped at
//! a fixed depth to bound memory use.

use std::time::Duration;

use web_time::Instant;

use crate::state::editor_state::EditorState;
use crate::state::transaction::{Origin, Transaction};

/// Default grouping window: consecutive same-origin transactions
/// within this gap of one another are merged into a single undo step
/// (Open Question, decided in DESIGN.md: 500ms, matching the
/// teacher's composer debounce window).
pub const DEFAULT_GROUP_WINDOW: Duration = Duration::from_millis(500);

/// Default undo depth (Open Question, decided in DESIGN.md).
pub const DEFAULT_DEPTH_LIMIT: usize = 100;

/// One undo/redo step: the (possibly several) transactions that get
/// replayed together, stored in the chronological order they were
/// originally applied in.
type Group = Vec<Transaction>;

#[derive(Debug)]
pub struct History {
    undo_stack: Vec<Group>,
    redo_stack: Vec<Group>,
    group_window: Duration,
    depth_limit: usize,
    last_push_at: Option<Instant>,
    last_origin: Option<Origin>,
}

impl History {
    pub fn new() -> Self {
        Self::with_policy(DEFAULT_GROUP_WINDOW, DEFAULT_DEPTH_LIMIT)
    }

    pub fn with_policy(group_window: Duration, depth_limit: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            group_window,
            depth_limit,
            last_push_at: None,
            last_origin: None,
        }
    }

    /// Update the grouping window and depth cap at runtime (backs
    /// `Editor::configure`). Does not retroactively regroup or truncate
    /// already-recorded history.
    pub fn set_policy(&mut self, group_window: Duration, depth_limit: usize) {
        self.group_window = group_window;
        self.depth_limit = depth_limit;
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Record a just-applied transaction's inverse (§4.7). Transactions
    /// with `Origin::History` are never recorded — they're undo/redo
    /// themselves and the stacks were already updated directly by
    /// [`History::undo`]/[`History::redo`].
    pub fn record(&mut self, inverse: Transaction, origin: Origin, now: Instant) {
        if origin == Origin::History {
            return;
        }
        self.redo_stack.clear();

        let groupable = matches!(origin, Origin::User | Origin::Ime)
            && self.last_origin == Some(origin)
            && self
                .last_push_at
                .map(|at| now.duration_since(at) < self.group_window)
                .unwrap_or(false);

        if groupable {
            if let Some(group) = self.undo_stack.last_mut() {
                group.push(inverse);
                self.last_push_at = Some(now);
                return;
            }
        }

        self.undo_stack.push(vec![inverse]);
        if self.undo_stack.len() > self.depth_limit {
            self.undo_stack.remove(0);
        }
        self.last_push_at = Some(now);
        self.last_origin = Some(origin);
    }

    /// Undo the most recent group, returning the resulting state. The
    /// forward transactions needed to redo it are pushed onto the redo
    /// stack. Returns `None` (leaving both stacks untouched) if the
    /// stored inverses no longer apply cleanly — this should not
    /// happen in practice since they were themselves produced by a
    /// successful `apply`, but a defensive caller should not panic.
    pub fn undo(&mut self, state: &EditorState) -> Option<EditorState> {
        let group = self.undo_stack.pop()?;
        match replay(state, &group, true) {
            Ok((next, redo_group)) => {
                self.redo_stack.push(redo_group);
                self.last_origin = None;
                self.last_push_at = None;
                Some(next)
            }
            Err(_) => {
                self.undo_stack.push(group);
                None
            }
        }
    }

    pub fn redo(&mut self, state: &EditorState) -> Option<EditorState> {
        let group = self.redo_stack.pop()?;
        match replay(state, &group, false) {
            Ok((next, undo_group)) => {
                self.undo_stack.push(undo_group);
                self.last_origin = None;
                self.last_push_at = None;
                Some(next)
            }
            Err(_) => {
                self.redo_stack.push(group);
                None
            }
        }
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply `group`'s transactions to `state`, either in reverse
/// (undoing) or forward (redoing) chronological order, collecting the
/// transactions that would reverse *this* replay — which is exactly
/// the group to push onto the opposite stack.
fn replay(
    state: &EditorState,
    group: &[Transaction],
    reverse_order: bool,
) -> Result<(EditorState, Group), crate::state::editor_state::ApplyRejected> {
    let mut current = state.clone();
    let mut collected = Vec::with_capacity(group.len());
    if reverse_order {
        for tx in group.iter().rev() {
            let (next, inverse) = current.apply(tx)?;
            collected.push(inverse);
            current = next;
        }
        collected.reverse();
    } else {
        for tx in group.iter() {
            let (next, inverse) = current.apply(tx)?;
            collected.push(inverse);
            current = next;
        }
    }
    Ok((current, collected))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::{Block, BlockId, Document, InlineChild, Schema, Selection};
    use std::sync::Arc;

    fn state() -> EditorState {
        let block = Block::new_inline(
            BlockId::from_raw(1),
            "paragraph".into(),
            vec![InlineChild::text("ab")],
        );
        EditorState::new(
            Document::new(vec![block]),
            Selection::collapsed_at(crate::model::Position::new(BlockId::from_raw(1), 2)),
            Arc::new(Schema::with_builtins()),
        )
    }

    #[test]
    fn undo_reverts_a_single_transaction() {
        let mut history = History::new();
        let s0 = state();
        let tx = Transaction::new(Origin::User).replace(
            BlockId::from_raw(1),
            2,
            2,
            vec![InlineChild::text("c")],
        );
        let (s1, inverse) = s0.apply(&tx).unwrap();
        history.record(inverse, Origin::User, Instant::now());
        assert_eq!(Document::block_text(&s1.document.blocks[0]), "abc");

        let undone = history.undo(&s1).unwrap();
        assert_eq!(Document::block_text(&undone.document.blocks[0]), "ab");
        assert!(history.can_redo());
    }

    #[test]
    fn redo_replays_after_undo() {
        let mut history = History::new();
        let s0 = state();
        let tx = Transaction::new(Origin::User).replace(
            BlockId::from_raw(1),
            2,
            2,
            vec![InlineChild::text("c")],
        );
        let (s1, inverse) = s0.apply(&tx).unwrap();
        history.record(inverse, Origin::User, Instant::now());
        let undone = history.undo(&s1).unwrap();
        let redone = history.redo(&undone).unwrap();
        assert_eq!(Document::block_text(&redone.document.blocks[0]), "abc");
    }

    #[test]
    fn rapid_same_origin_edits_group_into_one_undo_step() {
        let mut history = History::new();
        let mut cur = state();
        let now = Instant::now();
        for ch in ["c", "d", "e"] {
            let offset = cur.document.blocks[0].inline_width();
            let tx = Transaction::new(Origin::User).replace(
                BlockId::from_raw(1),
                offset,
                offset,
                vec![InlineChild::text(ch)],
            );
            let (next, inverse) = cur.apply(&tx).unwrap();
            history.record(inverse, Origin::User, now);
            cur = next;
        }
        assert_eq!(Document::block_text(&cur.document.blocks[0]), "abcde");
        let undone = history.undo(&cur).unwrap();
        assert_eq!(Document::block_text(&undone.document.blocks[0]), "ab");
    }

    #[test]
    fn distant_edits_do_not_group() {
        let mut history = History::new();
        let s0 = state();
        let tx = Transaction::new(Origin::User).replace(
            BlockId::from_raw(1),
            2,
            2,
            vec![InlineChild::text("c")],
        );
        let (s1, inverse1) = s0.apply(&tx).unwrap();
        let far_future = Instant::now() + Duration::from_secs(10);
        history.record(inverse1, Origin::User, Instant::now());

        let tx2 = Transaction::new(Origin::User).replace(
            BlockId::from_raw(1),
            3,
            3,
            vec![InlineChild::text("d")],
        );
        let (s2, inverse2) = s1.apply(&tx2).unwrap();
        history.record(inverse2, Origin::User, far_future);

        let undone = history.undo(&s2).unwrap();
        assert_eq!(Document::block_text(&undone.document.blocks[0]), "abc");
    }

    #[test]
    fn undo_on_empty_history_is_none() {
        let mut history = History::new();
        assert!(history.undo(&state()).is_none());
    }
}

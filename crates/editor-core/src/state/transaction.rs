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

//! [`Transaction`]: a batch of [`Step`]s plus the selection they should
//! leave behind and metadata describing where they came from (§4.2,
//! §4.7 "origin tags").

use crate::model::{BlockId, InlineChild, Mark, MarkType, Selection};
use crate::state::step::Step;

/// Where a transaction originated, used by plugins and [`crate::state::History`]
/// to decide whether to group it with the previous one and whether it
/// should be recorded at all (§4.7).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Origin {
    User,
    Paste,
    Command,
    Api,
    Ime,
    History,
}

/// A batch of steps built up by a command or input handler, applied
/// atomically by [`crate::state::EditorState::apply`] (§4.2).
#[derive(Clone, Debug)]
pub struct Transaction {
    pub steps: Vec<Step>,
    pub selection: Option<Selection>,
    pub origin: Origin,
    /// Plugins that must not see this transaction in their `onStateChange`
    /// hook's `appendTransaction` pass again (prevents infinite loops
    /// when middleware re-dispatches its own work).
    pub meta: std::collections::BTreeMap<String, String>,
}

impl Transaction {
    pub fn new(origin: Origin) -> Self {
        Self {
            steps: Vec::new(),
            selection: None,
            origin,
            meta: std::collections::BTreeMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty() && self.selection.is_none()
    }

    pub fn set_selection(mut self, selection: Selection) -> Self {
        self.selection = Some(selection);
        self
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    pub fn replace(self, block: BlockId, from: usize, to: usize, content: Vec<InlineChild>) -> Self {
        self.step(Step::ReplaceStep {
            block,
            from,
            to,
            content,
        })
    }

    pub fn add_mark(self, block: BlockId, from: usize, to: usize, mark: Mark) -> Self {
        self.step(Step::AddMarkStep {
            block,
            from,
            to,
            mark,
        })
    }

    pub fn remove_mark(self, block: BlockId, from: usize, to: usize, mark_type: MarkType) -> Self {
        self.step(Step::RemoveMarkStep {
            block,
            from,
            to,
            mark_type,
        })
    }

    pub fn set_attr(self, block: BlockId, key: impl Into<String>, value: Option<String>) -> Self {
        self.step(Step::AttrStep {
            block,
            key: key.into(),
            value,
        })
    }

    pub fn split_block(self, block: BlockId, offset: usize, right_id: BlockId) -> Self {
        self.step(Step::SplitBlockStep {
            block,
            offset,
            right_id,
        })
    }

    pub fn join_block(self, first: BlockId, second: BlockId) -> Self {
        self.step(Step::JoinBlockStep { first, second })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn builder_accumulates_steps() {
        let tx = Transaction::new(Origin::User)
            .replace(BlockId::from_raw(1), 0, 0, vec![InlineChild::text("a")])
            .set_attr(BlockId::from_raw(1), "align", Some("center".into()));
        assert_eq!(tx.steps.len(), 2);
        assert!(!tx.is_empty());
    }

    #[test]
    fn empty_transaction_with_only_selection_is_not_empty_step_wise() {
        let tx = Transaction::new(Origin::User);
        assert!(tx.is_empty());
    }
}

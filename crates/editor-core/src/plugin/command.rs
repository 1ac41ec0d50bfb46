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

//! Named, composable commands (§4.3 "Command registry"): a pure
//! function from state to an optional transaction. Returning `None`
//! means "not applicable right now" — used by `can()` (§6) without
//! running the command's side effects.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::state::{EditorState, Transaction};

/// `state -> Option<Transaction>`. Pure: a command must not reach for
/// anything outside `state` to decide what to do, so `can()` and
/// `run()` always agree.
pub type CommandFn = Arc<dyn Fn(&EditorState) -> Option<Transaction> + Send + Sync>;

#[derive(Clone)]
pub struct CommandRegistry {
    commands: BTreeMap<String, CommandFn>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self {
            commands: BTreeMap::new(),
        }
    }

    /// Registers `command` under `name`, overwriting silently if a
    /// plugin registered under the same name earlier — last plugin in
    /// the dependency-sorted init order wins, mirroring keymap priority
    /// (§4.3).
    pub fn register(&mut self, name: impl Into<String>, command: CommandFn) {
        self.commands.insert(name.into(), command);
    }

    pub fn get(&self, name: &str) -> Option<&CommandFn> {
        self.commands.get(name)
    }

    /// Whether `name` would produce a transaction against `state`,
    /// without applying it (§6: `editor.can(name)`).
    pub fn can(&self, name: &str, state: &EditorState) -> bool {
        self.commands
            .get(name)
            .map(|c| c(state).is_some())
            .unwrap_or(false)
    }

    pub fn run(&self, name: &str, state: &EditorState) -> Option<Transaction> {
        self.commands.get(name).and_then(|c| c(state))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.commands.keys().map(String::as_str)
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::{Block, BlockId, Document, Schema, Selection};
    use std::sync::Arc as StdArc;

    fn state() -> EditorState {
        EditorState::new(
            Document::new(vec![Block::new_inline(
                BlockId::from_raw(1),
                "paragraph".into(),
                vec![],
            )]),
            Selection::collapsed_at(crate::model::Position::new(BlockId::from_raw(1), 0)),
            StdArc::new(Schema::with_builtins()),
        )
    }

    #[test]
    fn can_reflects_whether_command_applies() {
        let mut registry = CommandRegistry::new();
        registry.register(
            "noop",
            Arc::new(|_state: &EditorState| None) as CommandFn,
        );
        registry.register(
            "always",
            Arc::new(|state: &EditorState| {
                Some(Transaction::new(crate::state::Origin::Command).set_selection(state.selection.clone()))
            }) as CommandFn,
        );
        let s = state();
        assert!(!registry.can("noop", &s));
        assert!(registry.can("always", &s));
        assert!(!registry.can("missing", &s));
    }
}

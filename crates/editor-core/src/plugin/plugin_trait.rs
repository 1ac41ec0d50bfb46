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

//! [`Plugin`]: the unit of extensibility (§4.3). A plugin contributes
//! schema (node/mark specs), commands, keybindings, and middleware
//! during a three-phase startup — `init`, `onBeforeReady`, `onReady` —
//! run in dependency order.

use crate::plugin::context::PluginContext;
use crate::plugin::decoration::DecorationSet;
use crate::state::{EditorState, Transaction};

/// A single extension to the editor (§4.3).
///
/// `init` is where a plugin registers schema and commands; by the time
/// `on_before_ready` runs the full schema (every plugin's specs) is
/// frozen, so a plugin can safely assume dependencies' node/mark types
/// exist. `on_ready` runs once the view has mounted.
pub trait Plugin {
    /// A stable, unique identifier, used in `deps()` and in
    /// `ConfigError` messages.
    fn id(&self) -> &'static str;

    /// Other plugins that must be initialized (and hence have their
    /// schema contributions visible) before this one. Cyclic or
    /// missing dependencies are rejected by [`crate::plugin::PluginManager::new`].
    fn deps(&self) -> &'static [&'static str] {
        &[]
    }

    /// Register schema, commands, keymap, and middleware. Errors abort
    /// startup entirely — the editor never reaches `onReady` (§4.3,
    /// §7: `ConfigError::PluginInitFailed`).
    fn init(&mut self, ctx: &mut dyn PluginContext) -> Result<(), String> {
        let _ = ctx;
        Ok(())
    }

    /// Runs after every plugin's `init` has completed and the schema
    /// is frozen, before the view mounts.
    fn on_before_ready(&mut self, ctx: &mut dyn PluginContext) {
        let _ = ctx;
    }

    /// Runs once the view has mounted and the host element is ready
    /// for interaction.
    fn on_ready(&mut self) {}

    /// Runs when the editor instance is torn down.
    fn destroy(&mut self) {}

    /// Contribute decorations for the current state (§4.4
    /// "Decorations"). `tr` is the transaction that just produced
    /// `state`, if any (absent on the very first render). Called on
    /// every plugin and merged by the view into one [`DecorationSet`]
    /// per block; the default contributes nothing.
    fn decorations(&self, _state: &EditorState, _tr: Option<&Transaction>) -> DecorationSet {
        DecorationSet::empty()
    }

    /// Notified synchronously after a transaction has committed (§5
    /// "Ordering guarantees"). May dispatch further transactions; the
    /// host's reentrancy guard bounds how deep that recursion can go.
    fn on_state_change(&mut self, _old: &EditorState, _new: &EditorState, _tr: &Transaction) {}

    /// Apply a plugin-specific configuration payload (§6
    /// `editor.configurePlugin(id, config)`). The payload's shape is
    /// private to the plugin; the default rejects any configuration.
    fn configure(&mut self, _config: &str) -> Result<(), String> {
        Err(format!("plugin `{}` does not accept configuration", self.id()))
    }
}

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

//! [`Editor`]: the host element's public orchestrator (§4.8/§6). Owns
//! the committed state, drives `dispatch` through middleware and the
//! reentrancy guard (§5), records undo/redo, and fans out events.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use web_time::Instant;

use crate::error::{ConfigError, EditorError, SchemaError};
use crate::host::config::{EditorConfig, EditorConfigPatch};
use crate::host::events::{EditorEvent, EventBus, EventKind, Listener, ListenerId};
use crate::html;
use crate::model::{
    from_json, to_json, Block, BlockId, Document, DocumentJson, Schema, Selection,
};
use crate::host::plugin_context::HostPluginContext;
use crate::plugin::{CommandRegistry, Keymap, MiddlewareChain, Plugin, PluginManager};
use crate::state::{EditorState, History, Origin, Transaction};
use crate::view::{dispatch_input, readonly_middleware, CompositionGuard, Dispatch, InputType};

/// Reentrant `dispatch` calls deeper than this are dropped (§5).
pub const MAX_DISPATCH_DEPTH: usize = 16;

/// Stamped onto `getJSON`'s `schema_version` field so a host embedding
/// multiple editor versions can detect skew against a fixture authored
/// elsewhere (§4.8 supplemental). Bump alongside any builtin schema change.
pub const SCHEMA_VERSION: u64 = 1;

/// The central orchestrator a host embeds one of per editor instance.
pub struct Editor {
    state: EditorState,
    commands: CommandRegistry,
    keymap: Keymap,
    middleware: MiddlewareChain,
    plugins: PluginManager,
    history: History,
    events: EventBus,
    config: EditorConfig,
    readonly: Arc<AtomicBool>,
    dispatch_depth: usize,
    composition: CompositionGuard,
}

impl Editor {
    /// Run the three-phase plugin startup, seed the initial document
    /// (an empty paragraph, per the Lifecycle section), and return a
    /// ready-to-use `Editor`. A failure here never reaches `onReady`
    /// (§4.3) and is surfaced directly as `Err` — there is no `Editor`
    /// yet for a host to have registered an `initError` listener on, so
    /// unlike every other event this one travels through the return
    /// value instead of [`EventBus`].
    pub fn init(plugins: Vec<Box<dyn Plugin>>, config: EditorConfig) -> Result<Self, EditorError> {
        let mut manager = PluginManager::new(plugins)?;
        let assembled = manager.start(Schema::with_builtins())?;

        // `EditorState::new` always mints a *fresh* allocator starting
        // at 1; bypass it here so the bootstrap paragraph's id comes
        // from the very allocator the state keeps using afterward.
        let alloc = Arc::new(crate::model::BlockIdAllocator::new());
        let initial_block = Block::new_inline(
            alloc.alloc(),
            "paragraph".into(),
            vec![],
        );
        let document = Document::new(vec![initial_block.clone()]);
        let schema = Arc::new(assembled.schema);
        let selection = Selection::collapsed_at(crate::model::Position::new(initial_block.id, 0));
        let state = EditorState {
            document: Arc::new(document),
            selection,
            schema,
            alloc,
        };

        let readonly = Arc::new(AtomicBool::new(config.readonly));
        let mut middleware = assembled.middleware;
        middleware.register(readonly_middleware({
            let readonly = readonly.clone();
            move || readonly.load(Ordering::Relaxed)
        }));

        let history = History::with_policy(
            std::time::Duration::from_millis(config.history_grouping_ms),
            config.history_depth,
        );

        let editor = Self {
            state,
            commands: assembled.commands,
            keymap: assembled.keymap,
            middleware,
            plugins: manager,
            history,
            events: EventBus::new(),
            config,
            readonly,
            dispatch_depth: 0,
            composition: CompositionGuard::new(),
        };

        editor.events.emit(&EditorEvent::Ready);
        Ok(editor)
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn schema(&self) -> &Schema {
        self.state.schema.as_ref()
    }

    /// Dispatch a transaction (§5). Reentrant calls past
    /// [`MAX_DISPATCH_DEPTH`] are dropped and logged, never panicking
    /// or propagating an error — `ConcurrencyError` never escapes the
    /// public API (§7).
    pub fn dispatch(&mut self, tr: Transaction) {
        if self.dispatch_depth >= MAX_DISPATCH_DEPTH {
            tracing::warn!(
                depth = self.dispatch_depth,
                limit = MAX_DISPATCH_DEPTH,
                "transaction dropped: reentrant dispatch depth exceeded"
            );
            return;
        }
        self.dispatch_depth += 1;
        self.dispatch_inner(tr);
        self.dispatch_depth -= 1;
    }

    fn dispatch_inner(&mut self, tr: Transaction) {
        let tr = self.plugins_middleware_pass(tr);
        if tr.is_empty() {
            return;
        }

        let old_state = self.state.clone();
        match self.state.apply(&tr) {
            Ok((next, inverse)) => {
                if tr.origin != Origin::History {
                    self.history.record(inverse, tr.origin, Instant::now());
                }
                let selection_changed = next.selection != old_state.selection;
                self.state = next;
                self.plugins.notify_state_change(&old_state, &self.state, &tr);
                self.events.emit(&EditorEvent::StateChange {
                    old: Arc::new(old_state),
                    new: Arc::new(self.state.clone()),
                });
                if selection_changed {
                    self.events.emit(&EditorEvent::SelectionChange {
                        selection: self.state.selection.clone(),
                    });
                }
            }
            Err(rejected) => {
                tracing::debug!(reason = %rejected.reason, "transaction rejected, state unchanged");
            }
        }
    }

    fn plugins_middleware_pass(&self, tr: Transaction) -> Transaction {
        self.middleware.apply(&self.state, tr)
    }

    pub fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    pub fn can(&self, command: &str) -> bool {
        self.commands.can(command, &self.state)
    }

    /// Run a registered command by name (§6 `editor.commands.<name>()`).
    /// A no-op if the command doesn't exist or doesn't apply right now.
    pub fn execute_command(&mut self, command: &str) {
        if let Some(tr) = self.commands.run(command, &self.state) {
            self.dispatch(tr);
        }
    }

    /// Resolve a `beforeinput` event and dispatch the transaction it
    /// produces, if any (§4.6). `HistoryUndo`/`HistoryRedo` route to
    /// [`Editor::undo`]/[`Editor::redo`] rather than a plain dispatch,
    /// since replay isn't expressible as a single forward transaction.
    pub fn handle_input(&mut self, input: InputType) {
        match dispatch_input(&self.state, &input, self.composition.is_composing()) {
            Dispatch::Apply(tr) => self.dispatch(tr),
            Dispatch::Undo => self.undo(),
            Dispatch::Redo => self.redo(),
            Dispatch::Noop => {}
        }
    }

    /// Resolve a keydown's normalized key description against the
    /// three-bucket keymap (§4.3) and run the matched command, if any.
    /// Returns whether a command matched (the caller's cue to
    /// `preventDefault`).
    pub fn handle_keydown(&mut self, keys: &str) -> bool {
        let commands = &self.commands;
        let state = &self.state;
        let Some(command) = self
            .keymap
            .resolve(keys, |name| commands.can(name, state))
            .map(str::to_string)
        else {
            return false;
        };
        self.execute_command(&command);
        true
    }

    /// `compositionstart` (§4.6): begin guarding `block` from
    /// reconciliation until the composition ends.
    pub fn composition_start(&mut self, block: BlockId) {
        self.composition.start(block);
    }

    /// `compositionend` (§4.6): clear the guard and dispatch the final
    /// committed text as a single `insertText` transaction with origin
    /// `Ime`.
    pub fn composition_end(&mut self, committed_text: &str) {
        self.handle_input(InputType::InsertText(committed_text.to_string()));
        self.composition.end();
    }

    pub fn is_composing(&self) -> bool {
        self.composition.is_composing()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Pop and apply the most recent undo entry (§4.2/§6). A no-op
    /// while readonly (spec.md scenario 6: Ctrl+Z must not revert
    /// anything), same policy [`readonly_middleware`] applies to a
    /// regular dispatch — undo/redo don't go through `dispatch()`
    /// itself (there is no forward transaction to run middleware on),
    /// so the check is duplicated here rather than bypassed.
    pub fn undo(&mut self) {
        if self.dispatch_depth >= MAX_DISPATCH_DEPTH || self.readonly.load(Ordering::Relaxed) {
            return;
        }
        let Some(next) = self.history.undo(&self.state) else {
            return;
        };
        self.commit_history_step(next);
    }

    pub fn redo(&mut self) {
        if self.dispatch_depth >= MAX_DISPATCH_DEPTH || self.readonly.load(Ordering::Relaxed) {
            return;
        }
        let Some(next) = self.history.redo(&self.state) else {
            return;
        };
        self.commit_history_step(next);
    }

    fn commit_history_step(&mut self, next: EditorState) {
        let old_state = std::mem::replace(&mut self.state, next);
        let selection_changed = self.state.selection != old_state.selection;
        let synthetic = Transaction::new(Origin::History).set_selection(self.state.selection.clone());
        self.plugins.notify_state_change(&old_state, &self.state, &synthetic);
        self.events.emit(&EditorEvent::StateChange {
            old: Arc::new(old_state),
            new: Arc::new(self.state.clone()),
        });
        if selection_changed {
            self.events.emit(&EditorEvent::SelectionChange {
                selection: self.state.selection.clone(),
            });
        }
    }

    pub fn get_json(&self) -> DocumentJson {
        let mut json = to_json(&self.state.document);
        json.schema_version = Some(SCHEMA_VERSION);
        json
    }

    /// Replace the whole document from its wire form (§6 `setJSON`).
    /// Thrown synchronously on an unknown node/mark type or missing
    /// required attribute — the state is left untouched on error. A
    /// `schema_version` older or newer than [`SCHEMA_VERSION`] is logged
    /// but not rejected; schema skew detection is the host's call.
    pub fn set_json(&mut self, json: &DocumentJson) -> Result<(), SchemaError> {
        if let Some(version) = json.schema_version {
            if version != SCHEMA_VERSION {
                tracing::warn!(document_schema_version = version, editor_schema_version = SCHEMA_VERSION, "setJSON: schema version mismatch");
            }
        }
        let document = from_json(json, &self.state.schema, &self.state.alloc)?;
        self.replace_document(document, Origin::Api);
        Ok(())
    }

    pub fn get_html(&self) -> String {
        html::to_html(&self.state.document, &self.state.schema)
    }

    /// Replace the whole document from a sanitized HTML fragment (§6
    /// `setHTML`). Disallowed tags/attributes are stripped silently by
    /// the sanitizer; this never fails.
    pub fn set_html(&mut self, markup: &str) {
        let blocks = html::from_html(markup, &self.state.alloc);
        let document = Document::new(blocks);
        self.replace_document(document, Origin::Api);
    }

    pub fn get_text(&self) -> String {
        self.state
            .document
            .blocks
            .iter()
            .map(Document::block_text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn replace_document(&mut self, document: Document, origin: Origin) {
        let old_state = self.state.clone();
        let fallback = document
            .first_textblock()
            .map(|b| Selection::collapsed_at(crate::model::Position::new(b.id, 0)))
            .unwrap_or_else(|| old_state.selection.clone());
        let selection = document.repair_selection(&fallback);
        let next = EditorState {
            document: Arc::new(document),
            selection,
            schema: old_state.schema.clone(),
            alloc: old_state.alloc.clone(),
        };
        self.state = next;
        let synthetic = Transaction::new(origin).set_selection(self.state.selection.clone());
        self.plugins.notify_state_change(&old_state, &self.state, &synthetic);
        self.events.emit(&EditorEvent::StateChange {
            old: Arc::new(old_state),
            new: Arc::new(self.state.clone()),
        });
    }

    /// Apply a partial configuration update (§6 `editor.configure`).
    pub fn configure(&mut self, patch: &EditorConfigPatch) {
        patch.apply_to(&mut self.config);
        self.readonly.store(self.config.readonly, Ordering::Relaxed);
        self.history.set_policy(
            std::time::Duration::from_millis(self.config.history_grouping_ms),
            self.config.history_depth,
        );
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Deliver a plugin-specific configuration payload (§6
    /// `editor.configurePlugin`).
    pub fn configure_plugin(&mut self, id: &str, payload: &str) -> Result<(), ConfigError> {
        self.plugins.configure(id, payload)
    }

    pub fn on(&mut self, kind: EventKind, listener: Listener) -> ListenerId {
        self.events.on(kind, listener)
    }

    pub fn off(&mut self, id: ListenerId) {
        self.events.off(id);
    }

    pub fn focus(&self) {
        self.events.emit(&EditorEvent::Focus);
    }

    pub fn blur(&self) {
        self.events.emit(&EditorEvent::Blur);
    }

    /// Push `message` into the host's ARIA live region (§6, §7). The
    /// only source of an `announce` event — core never raises one on
    /// its own for a dropped transaction or swallowed error.
    pub fn announce(&self, message: &str) {
        self.events.emit(&EditorEvent::Announce(message.to_string()));
    }

    /// A pretty-printed tree of the current document plus selection
    /// markers, for snapshot-style tests in place of asserting on full
    /// HTML strings every time (§4.8 supplemental debug surface).
    pub fn to_debug_tree(&self) -> String {
        let mut out = String::new();
        for block in &self.state.document.blocks {
            render_debug_block(block, 0, &self.state.selection, &mut out);
        }
        out
    }

    pub fn destroy(&mut self) {
        self.plugins.destroy_all();
    }

    /// Borrow this editor as the live capability surface handed to
    /// plugins post-mount (§4.3). A thin facade over the methods above.
    pub fn plugin_context(&mut self) -> &mut dyn HostPluginContext {
        self
    }
}

impl HostPluginContext for Editor {
    fn state(&self) -> EditorState {
        self.state.clone()
    }

    fn schema(&self) -> &Schema {
        Editor::schema(self)
    }

    fn dispatch(&mut self, tx: Transaction) {
        Editor::dispatch(self, tx);
    }

    fn announce(&self, message: &str) {
        Editor::announce(self, message);
    }
}

fn render_debug_block(block: &Block, depth: usize, selection: &Selection, out: &mut String) {
    let indent = "  ".repeat(depth);
    out.push_str(&indent);
    out.push_str(&format!("{}#{}", block.node_type.0, block.id.raw()));
    if selection_touches(selection, block.id) {
        out.push_str(" <selected>");
    }
    out.push('\n');
    match &block.content {
        crate::model::BlockContent::Inline(_) => {
            let text = Document::block_text(block);
            if !text.is_empty() {
                out.push_str(&"  ".repeat(depth + 1));
                out.push_str(&format!("{:?}\n", text));
            }
        }
        crate::model::BlockContent::Blocks(children) => {
            for child in children {
                render_debug_block(child, depth + 1, selection, out);
            }
        }
        crate::model::BlockContent::Empty => {}
    }
}

fn selection_touches(selection: &Selection, block: BlockId) -> bool {
    selection.referenced_blocks().contains(&block)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::InlineChild;

    struct NoopPlugin;
    impl Plugin for NoopPlugin {
        fn id(&self) -> &'static str {
            "noop"
        }
    }

    fn editor() -> Editor {
        Editor::init(vec![Box::new(NoopPlugin)], EditorConfig::default()).unwrap()
    }

    #[test]
    fn init_seeds_a_single_empty_paragraph() {
        let editor = editor();
        assert_eq!(editor.state().document.blocks.len(), 1);
        assert_eq!(editor.get_text(), "");
    }

    #[test]
    fn dispatch_commits_and_records_history() {
        let mut editor = editor();
        let block_id = editor.state().document.blocks[0].id;
        let tr = Transaction::new(Origin::User).replace(block_id, 0, 0, vec![InlineChild::text("hi")]);
        editor.dispatch(tr);
        assert_eq!(editor.get_text(), "hi");
        assert!(editor.can_undo());
    }

    #[test]
    fn undo_reverts_the_last_dispatch() {
        let mut editor = editor();
        let block_id = editor.state().document.blocks[0].id;
        let tr = Transaction::new(Origin::User).replace(block_id, 0, 0, vec![InlineChild::text("hi")]);
        editor.dispatch(tr);
        editor.undo();
        assert_eq!(editor.get_text(), "");
        assert!(editor.can_redo());
    }

    #[test]
    fn readonly_drops_user_transactions() {
        let mut editor = editor();
        editor.configure(&EditorConfigPatch {
            readonly: Some(true),
            ..Default::default()
        });
        let block_id = editor.state().document.blocks[0].id;
        let tr = Transaction::new(Origin::User).replace(block_id, 0, 0, vec![InlineChild::text("hi")]);
        editor.dispatch(tr);
        assert_eq!(editor.get_text(), "");
    }

    #[test]
    fn undo_is_blocked_while_readonly() {
        let mut editor = editor();
        let block_id = editor.state().document.blocks[0].id;
        let tr = Transaction::new(Origin::User).replace(block_id, 0, 0, vec![InlineChild::text("hi")]);
        editor.dispatch(tr);
        editor.configure(&EditorConfigPatch {
            readonly: Some(true),
            ..Default::default()
        });
        editor.undo();
        assert_eq!(editor.get_text(), "hi");
        editor.configure(&EditorConfigPatch {
            readonly: Some(false),
            ..Default::default()
        });
        editor.undo();
        assert_eq!(editor.get_text(), "");
    }

    #[test]
    fn set_html_replaces_the_document() {
        let mut editor = editor();
        editor.set_html("<p>hello</p>");
        assert_eq!(editor.get_text(), "hello");
    }

    #[test]
    fn handle_input_inserts_text_at_the_caret() {
        let mut editor = editor();
        editor.handle_input(InputType::InsertText("hi".to_string()));
        assert_eq!(editor.get_text(), "hi");
    }

    #[test]
    fn composition_end_commits_with_ime_origin_and_clears_the_guard() {
        let mut editor = editor();
        let block_id = editor.state().document.blocks[0].id;
        editor.composition_start(block_id);
        assert!(editor.is_composing());
        editor.composition_end("hola");
        assert!(!editor.is_composing());
        assert_eq!(editor.get_text(), "hola");
        assert!(editor.can_undo());
    }

    #[test]
    fn handle_keydown_resolves_and_runs_a_bound_command() {
        let mut editor = editor();
        assert!(!editor.handle_keydown("Mod-b"));
    }

    #[test]
    fn reentrant_dispatch_past_the_limit_is_dropped() {
        let mut editor = editor();
        editor.dispatch_depth = MAX_DISPATCH_DEPTH;
        let block_id = editor.state().document.blocks[0].id;
        let tr = Transaction::new(Origin::User).replace(block_id, 0, 0, vec![InlineChild::text("hi")]);
        editor.dispatch(tr);
        assert_eq!(editor.get_text(), "");
    }
}

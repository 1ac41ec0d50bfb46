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

//! WASM bindings over `editor_core::Editor` (§4.8/§6): a thin,
//! synchronous surface a JS host drives directly, mirroring how the
//! teacher's own `ComposerModel` binding exposes one method per
//! mutating operation rather than a generic "send an action" channel.
//!
//! There is no JS-side event/listener bridge here — `editor_core`'s
//! `EventBus` listeners are plain Rust closures, and wiring a `js_sys::Function`
//! through it would mean smuggling a `!Send` JS value across a `Send + Sync`
//! bound. Instead, every mutating call returns whether the document actually
//! changed, and the JS host re-reads `getJSON`/`getHTML`/`getText` itself —
//! the same "call, then read the update" shape the teacher's `ComposerModel`
//! uses via `ComposerUpdate`, simplified to a single bool since there is no
//! incremental patch wire format exposed at this boundary yet.

use wasm_bindgen::prelude::*;

use editor_core::host::{EditorConfig, EditorConfigPatch};
use editor_core::view::InputType;
use editor_core::Editor;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
}

/// Parse a `JsValue` into `T` via `serde`, mapping failures to a `JsError`
/// the host can catch instead of a wasm-bindgen panic.
fn from_js<T: serde::de::DeserializeOwned>(value: JsValue) -> Result<T, JsError> {
    serde_wasm_bindgen::from_value(value).map_err(|e| JsError::new(&e.to_string()))
}

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsError> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsError::new(&e.to_string()))
}

#[wasm_bindgen]
pub struct EditorHandle {
    inner: Editor,
}

#[wasm_bindgen]
impl EditorHandle {
    /// Construct a new editor with no plugins and `config` (a
    /// `JsValue` shaped like [`EditorConfig`], or `undefined`/`null`
    /// for the default). Plugin registration happens on the Rust side
    /// at embed time, not across this boundary — a JS host composes a
    /// binary with the plugins it needs rather than shipping plugin
    /// code as data (§4.1).
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<EditorHandle, JsError> {
        let config = if config.is_undefined() || config.is_null() {
            EditorConfig::default()
        } else {
            from_js(config)?
        };
        let inner = Editor::init(Vec::new(), config)?;
        Ok(Self { inner })
    }

    pub fn get_json(&self) -> Result<JsValue, JsError> {
        to_js(&self.inner.get_json())
    }

    /// Replace the whole document from its wire form (§6 `setJSON`).
    /// Throws on an unknown node/mark type or a missing required
    /// attribute; the document is left untouched when it does.
    pub fn set_json(&mut self, json: JsValue) -> Result<(), JsError> {
        let json = from_js(json)?;
        self.inner.set_json(&json)?;
        Ok(())
    }

    pub fn get_html(&self) -> String {
        self.inner.get_html()
    }

    pub fn set_html(&mut self, markup: &str) {
        self.inner.set_html(markup);
    }

    pub fn get_text(&self) -> String {
        self.inner.get_text()
    }

    pub fn to_debug_tree(&self) -> String {
        self.inner.to_debug_tree()
    }

    pub fn can(&self, command: &str) -> bool {
        self.inner.can(command)
    }

    pub fn execute_command(&mut self, command: &str) -> bool {
        let before = self.inner.get_html();
        self.inner.execute_command(command);
        before != self.inner.get_html()
    }

    pub fn can_undo(&self) -> bool {
        self.inner.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.inner.can_redo()
    }

    pub fn undo(&mut self) {
        self.inner.undo();
    }

    pub fn redo(&mut self) {
        self.inner.redo();
    }

    pub fn insert_text(&mut self, text: &str) {
        self.inner.handle_input(InputType::InsertText(text.to_string()));
    }

    pub fn insert_paragraph(&mut self) {
        self.inner.handle_input(InputType::InsertParagraph);
    }

    pub fn insert_line_break(&mut self) {
        self.inner.handle_input(InputType::InsertLineBreak);
    }

    pub fn delete_content_backward(&mut self) {
        self.inner.handle_input(InputType::DeleteContentBackward);
    }

    pub fn delete_content_forward(&mut self) {
        self.inner.handle_input(InputType::DeleteContentForward);
    }

    pub fn delete_word_backward(&mut self) {
        self.inner.handle_input(InputType::DeleteWordBackward);
    }

    pub fn delete_word_forward(&mut self) {
        self.inner.handle_input(InputType::DeleteWordForward);
    }

    /// Paste/drop dispatch (§4.6): pass whichever of the three clipboard
    /// payloads the host actually read, in whatever order it read them —
    /// priority between them is resolved internally (internal token
    /// beats HTML beats plain text).
    pub fn paste(
        &mut self,
        internal_token: Option<String>,
        html: Option<String>,
        plain_text: Option<String>,
    ) {
        if let Some(source) =
            editor_core::view::choose_paste_source(internal_token, html, plain_text)
        {
            self.inner.handle_input(InputType::InsertFromPaste(source));
        }
    }

    /// `compositionstart`: `block_id` is the raw id of the block under
    /// the caret, as returned in a `getJSON`/`toDebugTree` payload.
    pub fn composition_start(&mut self, block_id: u64) {
        self.inner
            .composition_start(editor_core::BlockId::from_raw(block_id));
    }

    pub fn composition_end(&mut self, committed_text: &str) {
        self.inner.composition_end(committed_text);
    }

    pub fn is_composing(&self) -> bool {
        self.inner.is_composing()
    }

    /// Resolve a keydown's normalized key description (e.g. `"Mod-b"`)
    /// against the three-bucket keymap and run the matched command, if
    /// any. Returns whether a command matched, the caller's cue to
    /// `preventDefault` (§4.3).
    pub fn handle_keydown(&mut self, keys: &str) -> bool {
        self.inner.handle_keydown(keys)
    }

    pub fn configure(&mut self, patch: JsValue) -> Result<(), JsError> {
        let patch: EditorConfigPatch = from_js(patch)?;
        self.inner.configure(&patch);
        Ok(())
    }

    pub fn configure_plugin(&mut self, id: &str, payload: &str) -> Result<(), JsError> {
        self.inner.configure_plugin(id, payload)?;
        Ok(())
    }

    pub fn announce(&self, message: &str) {
        self.inner.announce(message);
    }

    pub fn focus(&self) {
        self.inner.focus();
    }

    pub fn blur(&self) {
        self.inner.blur();
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use wasm_bindgen_test::wasm_bindgen_test;

    wasm_bindgen_test::wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn new_editor_starts_with_empty_text() {
        let editor = EditorHandle::new(JsValue::UNDEFINED).unwrap();
        assert_eq!(editor.get_text(), "");
    }

    #[wasm_bindgen_test]
    fn insert_text_then_undo_round_trips() {
        let mut editor = EditorHandle::new(JsValue::UNDEFINED).unwrap();
        editor.insert_text("hello");
        assert_eq!(editor.get_text(), "hello");
        editor.undo();
        assert_eq!(editor.get_text(), "");
    }

    #[wasm_bindgen_test]
    fn set_html_then_get_html_round_trips_bold() {
        let mut editor = EditorHandle::new(JsValue::UNDEFINED).unwrap();
        editor.set_html("<p><strong>hi</strong></p>");
        assert!(editor.get_html().contains("<strong>hi</strong>"));
    }
}

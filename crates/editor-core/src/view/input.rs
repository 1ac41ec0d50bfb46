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

//! Input handling (§4.6): the `beforeinput` dispatch table that turns
//! a browser `InputType` into a [`crate::state::Transaction`], paste
//! source selection, and the readonly enforcement middleware. Keydown
//! handling itself is just [`crate::plugin::Keymap::resolve`] plus
//! [`crate::plugin::CommandRegistry::run`] (already built); this module
//! only adds the `beforeinput`-specific pieces those don't cover.

use unicode_segmentation::UnicodeSegmentation;

use crate::model::{BlockId, Document, InlineChild, Position, Selection, TextSelection};
use crate::plugin::Middleware;
use crate::state::{EditorState, Origin, Transaction};

/// The `beforeinput` event types core handles directly (§4.6 "InputType
/// dispatch table"). Formatting shortcuts and anything plugin-owned
/// arrive through the keymap/command path instead.
#[derive(Clone, Debug, PartialEq)]
pub enum InputType {
    InsertText(String),
    InsertParagraph,
    InsertLineBreak,
    DeleteContentBackward,
    DeleteContentForward,
    DeleteWordBackward,
    DeleteWordForward,
    InsertFromPaste(PasteSource),
    InsertFromDrop(PasteSource),
    /// `compositionupdate`'s provisional text. Always a no-op against
    /// state (§4.6): the IME renders its own provisional text natively;
    /// core only commits on `compositionend`, which arrives as a
    /// regular `insertText`.
    InsertCompositionText,
    HistoryUndo,
    HistoryRedo,
}

/// Where pasted/dropped content came from, already resolved by clipboard
/// read priority (§4.6 "paste reads clipboard types in priority order").
#[derive(Clone, Debug, PartialEq)]
pub enum PasteSource {
    /// A plugin-owned round-trip token (e.g. copying and pasting within
    /// the same document) — reconstructed by the plugin that minted it,
    /// not by core (§9 Open Question: token scheme is plugin-owned).
    InternalToken(String),
    Html(String),
    PlainText(String),
}

/// Resolve which clipboard payload wins when several are present, in
/// the fixed priority order internal token > HTML > plain text (§4.6,
/// §9 "paste internal-token-vs-HTML precedence").
pub fn choose_paste_source(
    internal_token: Option<String>,
    html: Option<String>,
    plain_text: Option<String>,
) -> Option<PasteSource> {
    internal_token
        .map(PasteSource::InternalToken)
        .or_else(|| html.map(PasteSource::Html))
        .or_else(|| plain_text.map(PasteSource::PlainText))
}

/// What a dispatched input event resolves to. `HistoryUndo`/`HistoryRedo`
/// are surfaced as their own variant rather than a `Transaction` because
/// undo/redo replay (`crate::state::History`) isn't expressible as a
/// single forward transaction.
pub enum Dispatch {
    Apply(Transaction),
    Undo,
    Redo,
    Noop,
}

/// The `beforeinput` dispatch table (§4.6). `composing` reflects
/// [`crate::view::CompositionGuard::is_composing`]; while true, any
/// event type other than composition's own commit is still dispatched
/// normally — only `InsertCompositionText` itself is excluded.
pub fn dispatch_input(state: &EditorState, input: &InputType, composing: bool) -> Dispatch {
    match input {
        InputType::InsertCompositionText => Dispatch::Noop,
        InputType::InsertText(text) if composing => {
            // compositionend fires insertText with the committed
            // string; by the time it arrives the guard should already
            // be cleared by the caller, but treat it as the commit
            // regardless of ordering races between the two events. Its
            // transaction carries origin `Ime` rather than `User` (§4.6).
            match insert_text(state, text) {
                Some(tr) => Dispatch::Apply(Transaction { origin: Origin::Ime, ..tr }),
                None => Dispatch::Noop,
            }
        }
        InputType::InsertText(text) => insert_text(state, text).map(Dispatch::Apply).unwrap_or(Dispatch::Noop),
        InputType::InsertParagraph => insert_paragraph(state).map(Dispatch::Apply).unwrap_or(Dispatch::Noop),
        InputType::InsertLineBreak => insert_line_break(state).map(Dispatch::Apply).unwrap_or(Dispatch::Noop),
        InputType::DeleteContentBackward => {
            delete_content(state, Direction::Backward).map(Dispatch::Apply).unwrap_or(Dispatch::Noop)
        }
        InputType::DeleteContentForward => {
            delete_content(state, Direction::Forward).map(Dispatch::Apply).unwrap_or(Dispatch::Noop)
        }
        InputType::DeleteWordBackward => {
            delete_word(state, Direction::Backward).map(Dispatch::Apply).unwrap_or(Dispatch::Noop)
        }
        InputType::DeleteWordForward => {
            delete_word(state, Direction::Forward).map(Dispatch::Apply).unwrap_or(Dispatch::Noop)
        }
        InputType::InsertFromPaste(source) => {
            paste(state, source).map(Dispatch::Apply).unwrap_or(Dispatch::Noop)
        }
        InputType::InsertFromDrop(source) => {
            paste(state, source).map(Dispatch::Apply).unwrap_or(Dispatch::Noop)
        }
        InputType::HistoryUndo => Dispatch::Undo,
        InputType::HistoryRedo => Dispatch::Redo,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

/// The selected range within a single textblock, sorted low-to-high.
/// Cross-block selections are a command's responsibility (e.g. a
/// "delete selection" command that joins blocks), not core's
/// `beforeinput` table, which only ever targets one block at a time.
fn text_range(state: &EditorState) -> Option<(BlockId, usize, usize)> {
    match &state.selection {
        Selection::Text(TextSelection { anchor, head }) if anchor.block_id == head.block_id => {
            let (from, to) = if anchor.offset <= head.offset {
                (anchor.offset, head.offset)
            } else {
                (head.offset, anchor.offset)
            };
            Some((anchor.block_id, from, to))
        }
        _ => None,
    }
}

fn insert_text(state: &EditorState, text: &str) -> Option<Transaction> {
    let (block, from, to) = text_range(state)?;
    let content = vec![InlineChild::text(text)];
    let new_offset = from + text.chars().count();
    Some(
        Transaction::new(Origin::User)
            .replace(block, from, to, content)
            .set_selection(Selection::collapsed_at(Position::new(block, new_offset))),
    )
}

fn insert_line_break(state: &EditorState) -> Option<Transaction> {
    let (block, from, to) = text_range(state)?;
    Some(
        Transaction::new(Origin::User)
            .replace(block, from, to, vec![InlineChild::node(crate::model::InlineNode::new("hard_break"))])
            .set_selection(Selection::collapsed_at(Position::new(block, from + 1))),
    )
}

fn insert_paragraph(state: &EditorState) -> Option<Transaction> {
    let (block, from, to) = text_range(state)?;
    let right_id = state.alloc.alloc();
    let mut tx = Transaction::new(Origin::User);
    if from != to {
        tx = tx.replace(block, from, to, vec![]);
    }
    Some(
        tx.split_block(block, from, right_id)
            .set_selection(Selection::collapsed_at(Position::new(right_id, 0))),
    )
}

fn delete_content(state: &EditorState, direction: Direction) -> Option<Transaction> {
    let (block, from, to) = text_range(state)?;
    if from != to {
        return Some(
            Transaction::new(Origin::User)
                .replace(block, from, to, vec![])
                .set_selection(Selection::collapsed_at(Position::new(block, from))),
        );
    }
    match direction {
        Direction::Backward if from > 0 => Some(
            Transaction::new(Origin::User)
                .replace(block, from - 1, from, vec![])
                .set_selection(Selection::collapsed_at(Position::new(block, from - 1))),
        ),
        Direction::Backward => {
            let doc = &state.document;
            let target = crate::view::caret::boundary_delete_target(doc, block, crate::view::caret::Direction::Backward);
            prior_sibling_join(doc, &state.schema, block, target)
        }
        Direction::Forward => {
            let doc = &state.document;
            let width = doc.find(block)?.inline_width();
            if from < width {
                Some(
                    Transaction::new(Origin::User)
                        .replace(block, from, from + 1, vec![])
                        .set_selection(Selection::collapsed_at(Position::new(block, from))),
                )
            } else {
                let target = crate::view::caret::boundary_delete_target(doc, block, crate::view::caret::Direction::Forward);
                next_sibling_join(doc, &state.schema, block, target)
            }
        }
    }
}

/// Backspace at offset 0: join with the previous textblock, unless the
/// boundary is a void block — that case is left to a command (§9 Open
/// Question: a list item's own backspace-at-start behavior is the
/// list plugin's, not core's, call; the same split applies generally
/// to void-block deletion, since core has no step that removes a
/// block from its parent outright).
fn prior_sibling_join(
    doc: &Document,
    schema: &crate::model::Schema,
    block: BlockId,
    void_target: Option<BlockId>,
) -> Option<Transaction> {
    if void_target.is_some() {
        return None;
    }
    let sel = crate::view::caret::navigate_across_blocks(doc, schema, block, crate::view::caret::Direction::Backward);
    match sel {
        Some(Selection::Text(TextSelection { anchor, .. })) if anchor.block_id != block => {
            Some(
                Transaction::new(Origin::User)
                    .join_block(anchor.block_id, block)
                    .set_selection(Selection::collapsed_at(anchor)),
            )
        }
        _ => None,
    }
}

fn next_sibling_join(
    doc: &Document,
    schema: &crate::model::Schema,
    block: BlockId,
    void_target: Option<BlockId>,
) -> Option<Transaction> {
    if void_target.is_some() {
        return None;
    }
    let sel = crate::view::caret::navigate_across_blocks(doc, schema, block, crate::view::caret::Direction::Forward);
    match sel {
        Some(Selection::Text(TextSelection { anchor, .. })) if anchor.block_id != block => {
            let caret = doc.find(block)?.inline_width();
            Some(
                Transaction::new(Origin::User)
                    .join_block(block, anchor.block_id)
                    .set_selection(Selection::collapsed_at(Position::new(block, caret))),
            )
        }
        _ => None,
    }
}

fn delete_word(state: &EditorState, direction: Direction) -> Option<Transaction> {
    let (block, from, to) = text_range(state)?;
    if from != to {
        return delete_content(state, direction);
    }
    let text = Document::block_text(state.document.find(block)?);
    let boundary = match direction {
        Direction::Backward => word_boundary_before(&text, from),
        Direction::Forward => word_boundary_after(&text, from),
    };
    let (lo, hi) = if boundary <= from { (boundary, from) } else { (from, boundary) };
    if lo == hi {
        return None;
    }
    Some(
        Transaction::new(Origin::User)
            .replace(block, lo, hi, vec![])
            .set_selection(Selection::collapsed_at(Position::new(block, lo))),
    )
}

/// `(start, end, is_whitespace)` for each UAX#29 word-bound token in
/// `text`, in char offsets (not bytes) so they compose directly with
/// [`crate::model::Position::offset`].
fn char_word_tokens(text: &str) -> Vec<(usize, usize, bool)> {
    let mut out = Vec::new();
    let mut pos = 0;
    for word in text.split_word_bounds() {
        let start = pos;
        pos += word.chars().count();
        let is_ws = word.chars().all(char::is_whitespace);
        out.push((start, pos, is_ws));
    }
    out
}

/// Offset where deleting backward from `offset` should stop (§4.6
/// `deleteWordBackward`): the start of the word ending there, plus any
/// whitespace run directly before it so one keystroke clears both.
fn word_boundary_before(text: &str, offset: usize) -> usize {
    if offset == 0 {
        return 0;
    }
    let tokens = char_word_tokens(text);
    let Some(i) = tokens.iter().position(|&(s, e, _)| s < offset && offset <= e) else {
        return 0;
    };
    if tokens[i].2 && i > 0 {
        tokens[i - 1].0
    } else {
        tokens[i].0
    }
}

/// Offset where deleting forward from `offset` should stop
/// (`deleteWordForward`'s mirror of [`word_boundary_before`]).
fn word_boundary_after(text: &str, offset: usize) -> usize {
    let total = text.chars().count();
    if offset >= total {
        return total;
    }
    let tokens = char_word_tokens(text);
    let Some(i) = tokens.iter().position(|&(s, e, _)| s <= offset && offset < e) else {
        return total;
    };
    if tokens[i].2 && i + 1 < tokens.len() {
        tokens[i + 1].1
    } else {
        tokens[i].1
    }
}

/// Parse a paste/drop payload and splice it into the current selected
/// range. HTML is parsed through [`crate::html::from_html`]; when it
/// resolves to a single textblock its inline content is spliced
/// directly, otherwise (a multi-block paste) its flattened text is
/// inserted instead — a full structural paste across blocks is a
/// command-level concern the host composes from these primitives.
fn paste(state: &EditorState, source: &PasteSource) -> Option<Transaction> {
    let (block, from, to) = text_range(state)?;
    let content = match source {
        PasteSource::PlainText(text) => vec![InlineChild::text(text)],
        PasteSource::InternalToken(_) => return None, // plugin-owned; core has nothing to parse
        PasteSource::Html(html) => {
            let blocks = crate::html::from_html(html, &state.alloc);
            match blocks.as_slice() {
                [only] if only.content.as_inline().is_some() => only.inline_children().to_vec(),
                _ => vec![InlineChild::text(
                    blocks.iter().map(Document::block_text).collect::<Vec<_>>().join("\n"),
                )],
            }
        }
    };
    let width: usize = content.iter().map(InlineChild::width).sum();
    Some(
        Transaction::new(Origin::Paste)
            .replace(block, from, to, content)
            .set_selection(Selection::collapsed_at(Position::new(block, from + width))),
    )
}

/// Readonly enforcement (§4.6 "readonly middleware enforcement"):
/// strips the steps from any `User`/`Paste`/`Ime` transaction while
/// readonly is active, leaving its selection change intact (navigation
/// and `Escape` never carry steps in the first place). `Api`-origin
/// transactions always pass through untouched — readonly is a UI
/// constraint on the human, not a lock on the host's own API, and a
/// transaction tagged `bypass_readonly` in its meta is an explicit
/// escape hatch for a plugin command that knows it's privileged.
pub fn readonly_middleware(is_readonly: impl Fn() -> bool + Send + Sync + 'static) -> Middleware {
    std::sync::Arc::new(move |_state, tx| {
        if !is_readonly() {
            return tx;
        }
        if matches!(tx.origin, Origin::Api | Origin::History) || tx.meta.contains_key("bypass_readonly") {
            return tx;
        }
        if tx.steps.is_empty() {
            return tx;
        }
        Transaction {
            steps: Vec::new(),
            selection: tx.selection,
            origin: tx.origin,
            meta: tx.meta,
        }
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::{Block, BlockId, Schema};
    use std::sync::Arc;

    fn state_with_text(text: &str, offset: usize) -> EditorState {
        let block = Block::new_inline(BlockId::from_raw(1), "paragraph".into(), vec![InlineChild::text(text)]);
        EditorState::new(
            Document::new(vec![block]),
            Selection::collapsed_at(Position::new(BlockId::from_raw(1), offset)),
            Arc::new(Schema::with_builtins()),
        )
    }

    #[test]
    fn insert_text_splices_at_caret() {
        let state = state_with_text("helo", 3);
        let tx = insert_text(&state, "l").unwrap();
        let (next, _) = state.apply(&tx).unwrap();
        assert_eq!(Document::block_text(&next.document.blocks[0]), "hello");
    }

    #[test]
    fn delete_content_backward_removes_one_char() {
        let state = state_with_text("hello", 5);
        let tx = delete_content(&state, Direction::Backward).unwrap();
        let (next, _) = state.apply(&tx).unwrap();
        assert_eq!(Document::block_text(&next.document.blocks[0]), "hell");
    }

    #[test]
    fn delete_content_backward_at_start_of_first_block_is_noop() {
        let state = state_with_text("hello", 0);
        assert!(delete_content(&state, Direction::Backward).is_none());
    }

    #[test]
    fn delete_word_backward_removes_whole_preceding_word() {
        let state = state_with_text("hello world", 11);
        let tx = delete_word(&state, Direction::Backward).unwrap();
        let (next, _) = state.apply(&tx).unwrap();
        assert_eq!(Document::block_text(&next.document.blocks[0]), "hello ");
    }

    #[test]
    fn insert_paragraph_splits_block_at_caret() {
        let state = state_with_text("helloworld", 5);
        let tx = insert_paragraph(&state).unwrap();
        let (next, _) = state.apply(&tx).unwrap();
        assert_eq!(next.document.blocks.len(), 2);
        assert_eq!(Document::block_text(&next.document.blocks[0]), "hello");
        assert_eq!(Document::block_text(&next.document.blocks[1]), "world");
    }

    #[test]
    fn choose_paste_source_prefers_internal_token_over_html_and_text() {
        let chosen = choose_paste_source(Some("tok".into()), Some("<p>x</p>".into()), Some("x".into()));
        assert_eq!(chosen, Some(PasteSource::InternalToken("tok".into())));
    }

    #[test]
    fn choose_paste_source_falls_back_to_html_then_text() {
        assert_eq!(
            choose_paste_source(None, Some("<p>x</p>".into()), Some("x".into())),
            Some(PasteSource::Html("<p>x</p>".into()))
        );
        assert_eq!(
            choose_paste_source(None, None, Some("x".into())),
            Some(PasteSource::PlainText("x".into()))
        );
    }

    #[test]
    fn readonly_middleware_strips_steps_but_keeps_selection() {
        let mw = readonly_middleware(|| true);
        let state = state_with_text("hi", 0);
        let tx = Transaction::new(Origin::User)
            .replace(BlockId::from_raw(1), 0, 0, vec![InlineChild::text("x")])
            .set_selection(Selection::collapsed_at(Position::new(BlockId::from_raw(1), 1)));
        let out = mw(&state, tx);
        assert!(out.steps.is_empty());
        assert!(out.selection.is_some());
    }

    #[test]
    fn readonly_middleware_lets_api_transactions_through() {
        let mw = readonly_middleware(|| true);
        let state = state_with_text("hi", 0);
        let tx = Transaction::new(Origin::Api).replace(BlockId::from_raw(1), 0, 0, vec![InlineChild::text("x")]);
        let out = mw(&state, tx);
        assert_eq!(out.steps.len(), 1);
    }

    #[test]
    fn composition_text_insertion_is_always_a_noop() {
        let state = state_with_text("hi", 1);
        assert!(matches!(dispatch_input(&state, &InputType::InsertCompositionText, true), Dispatch::Noop));
        assert!(matches!(dispatch_input(&state, &InputType::InsertCompositionText, false), Dispatch::Noop));
    }
}

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

//! The host's event bus (§6 "Events"): `ready`, `stateChange`,
//! `selectionChange`, `focus`, `blur`, `initError`. Listeners are plain
//! closures registered with [`EventBus::on`] and removed with
//! [`EventBus::off`]; emission is synchronous, in registration order,
//! mirroring how [`crate::plugin::MiddlewareChain`] runs its stack.

use std::sync::Arc;

use crate::error::EditorError;
use crate::model::Selection;
use crate::state::EditorState;

/// A payload delivered to an event listener.
#[derive(Clone)]
pub enum EditorEvent {
    Ready,
    StateChange { old: Arc<EditorState>, new: Arc<EditorState> },
    SelectionChange { selection: Selection },
    Focus,
    Blur,
    /// Text a plugin has explicitly asked to be pushed into the host's
    /// ARIA live region (§7 "explicit request only" — core never emits
    /// this on its own for internal drops).
    Announce(String),
    InitError(EditorError),
}

impl EditorEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            EditorEvent::Ready => EventKind::Ready,
            EditorEvent::StateChange { .. } => EventKind::StateChange,
            EditorEvent::SelectionChange { .. } => EventKind::SelectionChange,
            EditorEvent::Focus => EventKind::Focus,
            EditorEvent::Blur => EventKind::Blur,
            EditorEvent::Announce(_) => EventKind::Announce,
            EditorEvent::InitError(_) => EventKind::InitError,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum EventKind {
    Ready,
    StateChange,
    SelectionChange,
    Focus,
    Blur,
    Announce,
    InitError,
}

pub type Listener = Arc<dyn Fn(&EditorEvent) + Send + Sync>;

/// An opaque handle returned by [`EventBus::on`], passed back to
/// [`EventBus::off`] to remove the listener again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    listeners: Vec<(ListenerId, EventKind, Listener)>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener` for `kind`, returning an id that later
    /// unsubscribes it (§6 `editor.on(kind, cb)`).
    pub fn on(&mut self, kind: EventKind, listener: Listener) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.listeners.push((id, kind, listener));
        id
    }

    /// Unsubscribe a previously registered listener (§6
    /// `editor.off(id)`). A no-op if `id` is unknown or already removed.
    pub fn off(&mut self, id: ListenerId) {
        self.listeners.retain(|(i, _, _)| *i != id);
    }

    /// Deliver `event` to every listener registered for its kind, in
    /// registration order.
    pub fn emit(&self, event: &EditorEvent) {
        let kind = event.kind();
        for (_, listener_kind, listener) in &self.listeners {
            if *listener_kind == kind {
                listener(event);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn listeners_fire_only_for_their_kind() {
        let mut bus = EventBus::new();
        let ready_count = Arc::new(AtomicUsize::new(0));
        let focus_count = Arc::new(AtomicUsize::new(0));
        {
            let ready_count = ready_count.clone();
            bus.on(
                EventKind::Ready,
                Arc::new(move |_e| {
                    ready_count.fetch_add(1, Ordering::SeqCst);
                }),
            );
        }
        {
            let focus_count = focus_count.clone();
            bus.on(
                EventKind::Focus,
                Arc::new(move |_e| {
                    focus_count.fetch_add(1, Ordering::SeqCst);
                }),
            );
        }
        bus.emit(&EditorEvent::Ready);
        assert_eq!(ready_count.load(Ordering::SeqCst), 1);
        assert_eq!(focus_count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn off_removes_the_listener() {
        let mut bus = EventBus::new();
        let count = Arc::new(AtomicUsize::new(0));
        let id = {
            let count = count.clone();
            bus.on(
                EventKind::Focus,
                Arc::new(move |_e| {
                    count.fetch_add(1, Ordering::SeqCst);
                }),
            )
        };
        bus.emit(&EditorEvent::Focus);
        bus.off(id);
        bus.emit(&EditorEvent::Focus);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}

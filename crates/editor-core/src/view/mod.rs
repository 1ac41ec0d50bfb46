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

//! The view layer (§4.4-§4.7): reconciles [`crate::model::Document`]
//! against a live DOM tree, keeps selection in sync in both
//! directions, dispatches input events into [`crate::state::Transaction`]s,
//! and answers layout-aware caret-navigation queries.
//!
//! Pure algorithmic pieces (segment computation, diffing, offset math,
//! the caret state machine) live in their own modules and are unit
//! tested without any DOM. Anything that actually touches `web_sys` is
//! gated under its own `dom` submodule or `target_arch = "wasm32"`,
//! mirroring how [`crate::html`] separates `sys`-backed parsing from
//! wasm-only `web_sys::DomParser` use.

pub mod caret;
pub mod composition;
pub mod input;
pub mod reconcile;
pub mod segments;
pub mod selection_sync;

pub use caret::{boundary_delete_target, navigate_across_blocks, Direction, GoalColumn};
pub use composition::CompositionGuard;
pub use input::{choose_paste_source, dispatch_input, readonly_middleware, Dispatch, InputType, PasteSource};
pub use reconcile::{diff, Patch};
pub use segments::{compute_segments, decoration_sets_equal, node_decoration_attrs, Segment, SegmentContent};

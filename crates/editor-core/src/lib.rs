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

//! An embeddable, framework-agnostic rich-text editor engine: a
//! document model, a transactional state layer, a plugin runtime, an
//! HTML codec, a view layer that dispatches input and reconciles
//! against a DOM, and a host element (`Editor`) built on top of all of
//! it. Only the handful of spots that actually touch `web_sys` (the
//! `dom` submodules under `view::caret`/`view::reconcile`/
//! `view::selection_sync`, and HTML parsing's `web_sys::DomParser`
//! path) are gated behind the `dom` feature; `Editor` itself, like the
//! teacher's `ComposerModel`, builds and tests on any target.
pub mod error;
pub mod html;
pub mod model;
pub mod plugin;
pub mod state;

pub mod host;
pub mod view;

#[cfg(test)]
pub mod testutils;

pub use error::{EditorError, Result};
pub use model::{Block, BlockId, Document, Schema, Selection};
pub use state::{EditorState, Transaction};

pub use host::Editor;

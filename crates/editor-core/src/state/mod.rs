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

//! Editor state and the transaction system (§4.2): steps, position
//! mapping, transactions, applying them to a document, and undo/redo.

mod editor_state;
mod history;
mod mapping;
mod step;
mod transaction;

pub use editor_state::{ApplyRejected, EditorState};
pub use history::{History, DEFAULT_DEPTH_LIMIT, DEFAULT_GROUP_WINDOW};
pub use mapping::{Bias, Mapping, StepMap};
pub use step::Step;
pub use transaction::{Origin, Transaction};

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

//! [`HostPluginContext`]: the live capabilities available once the view
//! has mounted (§4.3 phase 3 onward), as opposed to
//! [`crate::plugin::PluginContext`]'s registration-time-only surface. A
//! plugin holding one of these can read the current state and dispatch
//! transactions against it. Concrete plugins are out of scope here;
//! this only defines the contract a host-provided implementation
//! satisfies.

use crate::model::Schema;
use crate::state::{EditorState, Transaction};

/// Live, post-mount capabilities handed to a plugin (§4.3). Implemented
/// by [`super::editor::Editor`] and handed out via
/// [`super::editor::Editor::plugin_context`].
pub trait HostPluginContext {
    /// The current committed state.
    fn state(&self) -> EditorState;

    /// The frozen schema (never changes after startup).
    fn schema(&self) -> &Schema;

    /// Dispatch a transaction as if a user action produced it. Subject
    /// to the same reentrancy guard and middleware chain as any other
    /// dispatch (§5).
    fn dispatch(&mut self, tx: Transaction);

    /// Push `message` into the host's ARIA live region (§6, §7 "explicit
    /// request only" — core itself never calls this for internal drops).
    fn announce(&self, message: &str);
}

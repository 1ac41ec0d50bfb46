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

//! [`PluginContext`]: what a plugin can do during `init`/`onBeforeReady`
//! (§4.3). A live `getState`/`dispatch`/DOM-container surface only
//! exists once the view has mounted, so it is exposed separately by
//! `host::HostPluginContext` (`dom` feature) rather than here — at
//! registration time there is no state yet to read or dispatch
//! against, only a schema and the registries being assembled.

use crate::model::{MarkSpec, NodeSpec};
use crate::plugin::command::CommandFn;
use crate::plugin::keymap::{KeyBinding, KeymapBucket};
use crate::plugin::middleware::Middleware;

/// Registration-time capabilities handed to each plugin during
/// [`crate::plugin::Plugin::init`] (§4.3).
pub trait PluginContext {
    fn register_node_spec(&mut self, spec: NodeSpec);
    fn register_mark_spec(&mut self, spec: MarkSpec);
    fn register_command(&mut self, name: &str, command: CommandFn);
    fn register_keymap(&mut self, bucket: KeymapBucket, binding: KeyBinding);
    fn register_middleware(&mut self, middleware: Middleware);
}

/// The concrete [`PluginContext`] the [`crate::plugin::PluginManager`]
/// hands to each plugin in dependency order.
#[derive(Default)]
pub struct BuildContext {
    pub(crate) node_specs: Vec<NodeSpec>,
    pub(crate) mark_specs: Vec<MarkSpec>,
    pub(crate) commands: Vec<(String, CommandFn)>,
    pub(crate) keymap: Vec<(KeymapBucket, KeyBinding)>,
    pub(crate) middleware: Vec<Middleware>,
}

impl BuildContext {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PluginContext for BuildContext {
    fn register_node_spec(&mut self, spec: NodeSpec) {
        self.node_specs.push(spec);
    }

    fn register_mark_spec(&mut self, spec: MarkSpec) {
        self.mark_specs.push(spec);
    }

    fn register_command(&mut self, name: &str, command: CommandFn) {
        self.commands.push((name.to_string(), command));
    }

    fn register_keymap(&mut self, bucket: KeymapBucket, binding: KeyBinding) {
        self.keymap.push((bucket, binding));
    }

    fn register_middleware(&mut self, middleware: Middleware) {
        self.middleware.push(middleware);
    }
}

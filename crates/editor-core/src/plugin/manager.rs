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

//! [`PluginManager`]: dependency-orders plugins with Kahn's algorithm
//! and drives the three-phase startup (§4.3).

use std::collections::{BTreeMap, VecDeque};

use crate::error::ConfigError;
use crate::model::{MarkSpec, NodeSpec, Schema};
use crate::plugin::command::CommandRegistry;
use crate::plugin::context::BuildContext;
use crate::plugin::decoration::DecorationSet;
use crate::plugin::keymap::Keymap;
use crate::plugin::middleware::MiddlewareChain;
use crate::plugin::plugin_trait::Plugin;
use crate::state::{EditorState, Transaction};

pub struct PluginManager {
    plugins: Vec<Box<dyn Plugin>>,
    /// Indices into `plugins`, dependency order (deps before dependents).
    order: Vec<usize>,
}

/// Everything the three-phase startup assembled, ready to seed an
/// [`crate::state::EditorState`].
pub struct Assembled {
    pub schema: Schema,
    pub commands: CommandRegistry,
    pub keymap: Keymap,
    pub middleware: MiddlewareChain,
}

impl PluginManager {
    /// Order `plugins` by dependency (Kahn's algorithm, §4.3), and
    /// validate that every `deps()` entry names a registered plugin and
    /// that the dependency graph has no cycle.
    pub fn new(plugins: Vec<Box<dyn Plugin>>) -> Result<Self, ConfigError> {
        let mut index_of: BTreeMap<&'static str, usize> = BTreeMap::new();
        for (i, p) in plugins.iter().enumerate() {
            if index_of.insert(p.id(), i).is_some() {
                return Err(ConfigError::DuplicatePlugin(p.id().to_string()));
            }
        }
        for p in &plugins {
            for dep in p.deps() {
                if !index_of.contains_key(dep) {
                    return Err(ConfigError::UnknownPluginDep(
                        p.id().to_string(),
                        dep.to_string(),
                    ));
                }
            }
        }

        // Kahn's algorithm: in-degree = number of unresolved deps.
        let n = plugins.len();
        let mut in_degree = vec![0usize; n];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); n];
        for (i, p) in plugins.iter().enumerate() {
            for dep in p.deps() {
                let dep_idx = index_of[dep];
                dependents[dep_idx].push(i);
                in_degree[i] += 1;
            }
        }

        let mut queue: VecDeque<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();
        let mut order = Vec::with_capacity(n);
        while let Some(i) = queue.pop_front() {
            order.push(i);
            for &dependent in &dependents[i] {
                in_degree[dependent] -= 1;
                if in_degree[dependent] == 0 {
                    queue.push_back(dependent);
                }
            }
        }

        if order.len() != n {
            let stuck: Vec<String> = (0..n)
                .filter(|&i| in_degree[i] > 0)
                .map(|i| plugins[i].id().to_string())
                .collect();
            return Err(ConfigError::CyclicPluginDeps(stuck));
        }

        Ok(Self { plugins, order })
    }

    /// Run the three-phase startup in dependency order: `init` for
    /// every plugin, then `on_before_ready` for every plugin, then
    /// `on_ready` for every plugin (§4.3). Returns the assembled
    /// schema/commands/keymap/middleware, frozen and ready to seed the
    /// editor's initial state.
    pub fn start(&mut self, builtins: Schema) -> Result<Assembled, ConfigError> {
        let mut ctx = BuildContext::new();

        for &i in &self.order {
            let plugin = &mut self.plugins[i];
            plugin.init(&mut ctx).map_err(|reason| ConfigError::PluginInitFailed {
                plugin: plugin.id().to_string(),
                reason,
            })?;
        }

        let mut schema = builtins;
        for spec in std::mem::take(&mut ctx.node_specs) {
            register_node(&mut schema, spec)?;
        }
        for spec in std::mem::take(&mut ctx.mark_specs) {
            register_mark(&mut schema, spec)?;
        }
        schema.freeze();
        tracing::info!(node_count = schema.node_types().count(), "schema frozen");

        // §4.3 phase 2 ("schema is frozen; the host creates the view")
        // happens here, between the freeze above and `on_before_ready`
        // below — the host is expected to mount its view in between
        // calling `start()` and the caller proceeding, since this
        // function only assembles what the view needs to mount, it
        // does not mount it itself.
        for &i in &self.order {
            self.plugins[i].on_before_ready(&mut ctx);
        }

        for &i in &self.order {
            self.plugins[i].on_ready();
        }

        let mut commands = CommandRegistry::new();
        for (name, cmd) in ctx.commands {
            commands.register(name, cmd);
        }
        let mut keymap = Keymap::new();
        for (bucket, binding) in ctx.keymap {
            keymap.register(bucket, binding);
        }
        let mut middleware = MiddlewareChain::new();
        for mw in ctx.middleware {
            middleware.register(mw);
        }

        Ok(Assembled {
            schema,
            commands,
            keymap,
            middleware,
        })
    }

    pub fn destroy_all(&mut self) {
        for &i in self.order.iter().rev() {
            self.plugins[i].destroy();
        }
    }

    /// Look up a plugin by id and delegate a configuration payload to it
    /// (§6 `editor.configurePlugin`).
    pub fn configure(&mut self, id: &str, config: &str) -> Result<(), ConfigError> {
        let plugin = self
            .plugins
            .iter_mut()
            .find(|p| p.id() == id)
            .ok_or_else(|| ConfigError::UnknownPluginDep("<configure>".to_string(), id.to_string()))?;
        plugin.configure(config).map_err(|reason| ConfigError::PluginInitFailed {
            plugin: id.to_string(),
            reason,
        })
    }

    /// Collect every plugin's decorations for `state` and merge them
    /// into one set (§4.4). `tr` is the transaction that produced
    /// `state`, absent for the initial render.
    pub fn collect_decorations(&self, state: &EditorState, tr: Option<&Transaction>) -> DecorationSet {
        self.order
            .iter()
            .map(|&i| self.plugins[i].decorations(state, tr))
            .fold(DecorationSet::empty(), DecorationSet::merge)
    }

    /// Notify every plugin that a transaction just committed, in
    /// dependency order (§5 "a plugin's onStateChange is invoked
    /// synchronously with the new state").
    pub fn notify_state_change(&mut self, old: &EditorState, new: &EditorState, tr: &Transaction) {
        for &i in &self.order {
            self.plugins[i].on_state_change(old, new, tr);
        }
    }
}

fn register_node(schema: &mut Schema, spec: NodeSpec) -> Result<(), ConfigError> {
    schema.register_node(spec).map_err(|e| ConfigError::PluginInitFailed {
        plugin: "<schema>".to_string(),
        reason: e.to_string(),
    })
}

fn register_mark(schema: &mut Schema, spec: MarkSpec) -> Result<(), ConfigError> {
    schema.register_mark(spec).map_err(|e| ConfigError::PluginInitFailed {
        plugin: "<schema>".to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::plugin::context::PluginContext;

    struct PluginA;
    impl Plugin for PluginA {
        fn id(&self) -> &'static str {
            "a"
        }
    }

    struct PluginB;
    impl Plugin for PluginB {
        fn id(&self) -> &'static str {
            "b"
        }
        fn deps(&self) -> &'static [&'static str] {
            &["a"]
        }
    }

    struct Cyclic1;
    impl Plugin for Cyclic1 {
        fn id(&self) -> &'static str {
            "c1"
        }
        fn deps(&self) -> &'static [&'static str] {
            &["c2"]
        }
    }

    struct Cyclic2;
    impl Plugin for Cyclic2 {
        fn id(&self) -> &'static str {
            "c2"
        }
        fn deps(&self) -> &'static [&'static str] {
            &["c1"]
        }
    }

    #[test]
    fn orders_dependencies_before_dependents() {
        // PluginB (index 0) depends on PluginA (index 1); the computed
        // order must place a's index before b's.
        let plugins: Vec<Box<dyn Plugin>> = vec![Box::new(PluginB), Box::new(PluginA)];
        let manager = PluginManager::new(plugins).unwrap();
        assert_eq!(manager.order, vec![1, 0]);
    }

    #[test]
    fn detects_cycles() {
        let plugins: Vec<Box<dyn Plugin>> = vec![Box::new(Cyclic1), Box::new(Cyclic2)];
        let err = PluginManager::new(plugins);
        assert!(matches!(err, Err(ConfigError::CyclicPluginDeps(_))));
    }

    #[test]
    fn detects_unknown_dependency() {
        let plugins: Vec<Box<dyn Plugin>> = vec![Box::new(PluginB)];
        let err = PluginManager::new(plugins);
        assert!(matches!(err, Err(ConfigError::UnknownPluginDep(_, _))));
    }

    #[test]
    fn detects_duplicate_plugin_ids() {
        let plugins: Vec<Box<dyn Plugin>> = vec![Box::new(PluginA), Box::new(PluginA)];
        let err = PluginManager::new(plugins);
        assert!(matches!(err, Err(ConfigError::DuplicatePlugin(_))));
    }

    struct FailingPlugin;
    impl Plugin for FailingPlugin {
        fn id(&self) -> &'static str {
            "failing"
        }
        fn init(&mut self, _ctx: &mut dyn PluginContext) -> Result<(), String> {
            Err("boom".to_string())
        }
    }

    #[test]
    fn init_failure_surfaces_plugin_id() {
        let plugins: Vec<Box<dyn Plugin>> = vec![Box::new(FailingPlugin)];
        let mut manager = PluginManager::new(plugins).unwrap();
        let err = manager.start(Schema::with_builtins());
        assert!(matches!(
            err,
            Err(ConfigError::PluginInitFailed { plugin, .. }) if plugin == "failing"
        ));
    }
}

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

//! The plugin runtime (§4.3): dependency-ordered startup, commands,
//! keymap priority, middleware, and decorations.

mod command;
mod context;
mod decoration;
mod keymap;
mod manager;
mod middleware;
mod plugin_trait;

pub use command::{CommandFn, CommandRegistry};
pub use context::{BuildContext, PluginContext};
pub use decoration::{Decoration, DecorationKind, DecorationSet};
pub use keymap::{KeyBinding, Keymap, KeymapBucket};
pub use manager::{Assembled, PluginManager};
pub use middleware::{Middleware, MiddlewareChain};
pub use plugin_trait::Plugin;

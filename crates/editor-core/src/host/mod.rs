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

//! The host element (§4.8/§6): [`Editor`], its typed configuration, the
//! event bus a host subscribes to, and the live context handed to
//! plugins once the view has mounted.

mod config;
mod editor;
mod events;
mod plugin_context;

pub use config::{AnnouncePolicy, EditorConfig, EditorConfigPatch};
pub use editor::{Editor, MAX_DISPATCH_DEPTH};
pub use events::{EditorEvent, EventBus, EventKind, Listener, ListenerId};
pub use plugin_context::HostPluginContext;

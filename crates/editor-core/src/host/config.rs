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

//! [`EditorConfig`]: the typed surface behind `init(config)` /
//! `configure(partial)` (§6 External Interfaces, ambient config per
//! `SPEC_FULL.md` §6). A typed struct plus a typed, all-optional patch
//! — not a loose JSON blob — mirroring how the teacher's own FFI layer
//! favors narrow, explicit setters over a stringly-typed "set property".

use serde::{Deserialize, Serialize};

use crate::state::{DEFAULT_DEPTH_LIMIT, DEFAULT_GROUP_WINDOW};

/// How the ARIA live region is fed (§7: "the core does not spam the
/// live region on internal drops"). `ExplicitOnly` is the only policy
/// today — announcements happen only when a plugin calls `announce()`
/// — kept as an enum rather than a bool so a future opt-in "announce
/// validation drops too" policy has somewhere to live without changing
/// the config shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AnnouncePolicy {
    #[default]
    ExplicitOnly,
}

/// The editor's runtime configuration (§6 `init(config)`).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EditorConfig {
    pub placeholder: Option<String>,
    pub readonly: bool,
    pub history_depth: usize,
    pub history_grouping_ms: u64,
    pub announce_policy: AnnouncePolicy,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            placeholder: None,
            readonly: false,
            history_depth: DEFAULT_DEPTH_LIMIT,
            history_grouping_ms: DEFAULT_GROUP_WINDOW.as_millis() as u64,
            announce_policy: AnnouncePolicy::ExplicitOnly,
        }
    }
}

/// A partial update to [`EditorConfig`] (§6 `configure(partial)`).
/// `placeholder` is doubly-optional: `None` leaves it untouched,
/// `Some(None)` clears it, `Some(Some(text))` sets it.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EditorConfigPatch {
    pub placeholder: Option<Option<String>>,
    pub readonly: Option<bool>,
    pub history_depth: Option<usize>,
    pub history_grouping_ms: Option<u64>,
}

impl EditorConfigPatch {
    pub fn apply_to(&self, config: &mut EditorConfig) {
        if let Some(placeholder) = self.placeholder.clone() {
            config.placeholder = placeholder;
        }
        if let Some(readonly) = self.readonly {
            config.readonly = readonly;
        }
        if let Some(depth) = self.history_depth {
            config.history_depth = depth;
        }
        if let Some(ms) = self.history_grouping_ms {
            config.history_grouping_ms = ms;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn patch_only_touches_named_fields() {
        let mut config = EditorConfig {
            placeholder: Some("type here".into()),
            readonly: false,
            ..Default::default()
        };
        let patch = EditorConfigPatch {
            readonly: Some(true),
            ..Default::default()
        };
        patch.apply_to(&mut config);
        assert!(config.readonly);
        assert_eq!(config.placeholder.as_deref(), Some("type here"));
    }

    #[test]
    fn patch_can_clear_placeholder_explicitly() {
        let mut config = EditorConfig {
            placeholder: Some("type here".into()),
            ..Default::default()
        };
        let patch = EditorConfigPatch {
            placeholder: Some(None),
            ..Default::default()
        };
        patch.apply_to(&mut config);
        assert_eq!(config.placeholder, None);
    }
}

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

//! Keymap dispatch (§4.3 "Keymap priority"): three buckets —
//! `Context` beats `Navigation` beats `Default` — and within a bucket,
//! the most recently registered binding wins (last plugin registered
//! shadows earlier ones for the same key).

/// A key combination's priority bucket.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum KeymapBucket {
    /// Checked first: bindings only active in a specific editing
    /// context (e.g. inside a table cell, inside a code block).
    Context,
    /// Checked second: caret/selection movement bindings.
    Navigation,
    /// Checked last: everything else (formatting shortcuts, etc).
    Default,
}

#[derive(Clone, Debug)]
pub struct KeyBinding {
    /// A normalized key description, e.g. `"Mod-b"`, `"Shift-Enter"`.
    pub keys: String,
    pub command: String,
}

impl KeyBinding {
    pub fn new(keys: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            keys: keys.into(),
            command: command.into(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Keymap {
    context: Vec<KeyBinding>,
    navigation: Vec<KeyBinding>,
    default: Vec<KeyBinding>,
}

impl Keymap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, bucket: KeymapBucket, binding: KeyBinding) {
        match bucket {
            KeymapBucket::Context => self.context.push(binding),
            KeymapBucket::Navigation => self.navigation.push(binding),
            KeymapBucket::Default => self.default.push(binding),
        }
    }

    /// Resolve `keys` to a command name, trying Context, then
    /// Navigation, then Default; within a bucket, the last-registered
    /// matching binding wins (§4.3). A bucket's binding only commits if
    /// `can(command)` says it would actually produce a transaction —
    /// otherwise resolution falls through to the next bucket, so a
    /// context binding that can't currently run never permanently
    /// shadows a default binding for the same key.
    pub fn resolve(&self, keys: &str, can: impl Fn(&str) -> bool) -> Option<&str> {
        for bucket in [&self.context, &self.navigation, &self.default] {
            if let Some(binding) = bucket
                .iter()
                .rev()
                .filter(|b| b.keys == keys)
                .find(|b| can(&b.command))
            {
                return Some(&binding.command);
            }
        }
        None
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn context_beats_navigation_beats_default() {
        let mut keymap = Keymap::new();
        keymap.register(KeymapBucket::Default, KeyBinding::new("Tab", "default_tab"));
        keymap.register(KeymapBucket::Navigation, KeyBinding::new("Tab", "nav_tab"));
        keymap.register(KeymapBucket::Context, KeyBinding::new("Tab", "context_tab"));
        assert_eq!(keymap.resolve("Tab", |_| true), Some("context_tab"));
    }

    #[test]
    fn last_registered_wins_within_a_bucket() {
        let mut keymap = Keymap::new();
        keymap.register(KeymapBucket::Default, KeyBinding::new("Mod-b", "bold_v1"));
        keymap.register(KeymapBucket::Default, KeyBinding::new("Mod-b", "bold_v2"));
        assert_eq!(keymap.resolve("Mod-b", |_| true), Some("bold_v2"));
    }

    #[test]
    fn unbound_key_resolves_to_none() {
        let keymap = Keymap::new();
        assert_eq!(keymap.resolve("Mod-k", |_| true), None);
    }

    #[test]
    fn falls_through_to_next_bucket_when_higher_priority_command_cannot_run() {
        let mut keymap = Keymap::new();
        keymap.register(KeymapBucket::Default, KeyBinding::new("Tab", "default_tab"));
        keymap.register(KeymapBucket::Context, KeyBinding::new("Tab", "context_tab"));
        let resolved = keymap.resolve("Tab", |name| name != "context_tab");
        assert_eq!(resolved, Some("default_tab"));
    }

    #[test]
    fn does_not_resolve_at_all_when_no_bucket_can_run() {
        let mut keymap = Keymap::new();
        keymap.register(KeymapBucket::Default, KeyBinding::new("Tab", "default_tab"));
        keymap.register(KeymapBucket::Context, KeyBinding::new("Tab", "context_tab"));
        assert_eq!(keymap.resolve("Tab", |_| false), None);
    }
}

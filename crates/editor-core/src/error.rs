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

//! Error taxonomy for the editor engine (see design doc §7).
//!
//! Errors are grouped by *kind*, not by call site: the same
//! [`ValidationError`] shape is produced whether the offending step came
//! from a user keystroke or from [`crate::model::Document`]'s own
//! `setJSON` path. Most kinds never escape the public API as an `Err` —
//! they are absorbed per the propagation policy documented on each
//! variant — but keeping them typed means the host can still log or
//! assert on them in tests.

use thiserror::Error;

use crate::model::BlockId;

/// A document invariant (data model §3) was violated by a step or by
/// `setJSON`. Dropped silently by [`crate::state::EditorState::apply`];
/// never thrown from `dispatch`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("offset {offset} out of range for block {block:?} (len {len})")]
    OffsetOutOfRange {
        block: BlockId,
        offset: usize,
        len: usize,
    },

    #[error("block {block:?} of type {found:?} is not valid content for parent content kind {expected:?}")]
    ContentKindMismatch {
        block: BlockId,
        expected: crate::model::ContentKind,
        found: crate::model::NodeType,
    },

    #[error("mark {mark:?} is not permitted on block {block:?}")]
    MarkNotPermitted {
        block: BlockId,
        mark: crate::model::MarkType,
    },

    #[error("duplicate mark type {mark:?} on a single text run in block {block:?}")]
    DuplicateMark {
        block: BlockId,
        mark: crate::model::MarkType,
    },

    #[error("void block {block:?} may not contain inline children")]
    VoidBlockHasContent { block: BlockId },

    #[error("selection referenced block {block:?} which no longer exists")]
    SelectionDanglingBlock { block: BlockId },

    #[error("block id {block:?} is not unique within the document")]
    DuplicateBlockId { block: BlockId },
}

/// An unknown node/mark type was encountered while parsing `setJSON`
/// input or HTML. Thrown synchronously; the state is never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("unknown node type {0:?}")]
    UnknownNodeType(String),

    #[error("unknown mark type {0:?}")]
    UnknownMarkType(String),

    #[error("attribute {attr:?} is not declared on node type {node_type:?}")]
    UnknownAttribute { node_type: String, attr: String },

    #[error("schema is frozen; {what} cannot be registered after the view has mounted")]
    RegisteredAfterFreeze { what: &'static str },
}

/// Fatal plugin configuration problem. Thrown during `init`; the editor
/// never becomes ready.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("cyclic plugin dependency detected among: {0:?}")]
    CyclicPluginDeps(Vec<String>),

    #[error("plugin {0:?} depends on unknown plugin {1:?}")]
    UnknownPluginDep(String, String),

    #[error("plugin {0:?} is already registered")]
    DuplicatePlugin(String),

    #[error("plugin {plugin:?} failed to initialize: {reason}")]
    PluginInitFailed { plugin: String, reason: String },
}

/// Reentrant dispatch depth exceeded (see §5, max 16 nested dispatches).
/// The offending transaction is dropped and logged; never thrown.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("transaction dropped: reentrant dispatch depth {depth} exceeds the limit of {limit}")]
pub struct ConcurrencyError {
    pub depth: usize,
    pub limit: usize,
}

/// HTML input contained a disallowed tag/attribute. Stripped silently;
/// never thrown. Kept around so a plugin's `announce()` can report it
/// if it chooses to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SanitizationError {
    #[error("disallowed tag {0:?} stripped")]
    DisallowedTag(String),

    #[error("disallowed attribute {attr:?} on tag {tag:?} stripped")]
    DisallowedAttribute { tag: String, attr: String },
}

/// An external I/O-ish operation (typically clipboard access) was
/// unavailable. Falls back to the browser default; never thrown.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IoError {
    #[error("clipboard read unavailable: {0}")]
    ClipboardUnavailable(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),
}

/// The umbrella error type. Most call sites use one of the narrower
/// types above directly; this exists for boundaries (host API, FFI)
/// that need a single `Result<_, EditorError>`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditorError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Concurrency(#[from] ConcurrencyError),

    #[error(transparent)]
    Sanitization(#[from] SanitizationError),

    #[error(transparent)]
    Io(#[from] IoError),
}

pub type Result<T, E = EditorError> = std::result::Result<T, E>;

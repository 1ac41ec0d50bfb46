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

//! The document model (data model §3): ids, marks, inline content,
//! schema, blocks, positions, selections, the document itself, and its
//! JSON wire form.

mod block;
mod document;
mod ids;
mod inline;
mod json;
mod mark;
mod position;
mod schema;
mod selection;

pub use block::{Attrs, Block, BlockContent};
pub use document::{create_block, ContentAt, Document};
pub use ids::{BlockId, BlockIdAllocator};
pub use inline::{normalize_inline_children, InlineChild, InlineNode, InlineNodeType};
pub use json::{from_json, to_json, BlockJson, DocumentJson, InlineChildJson, MarkJson};
pub use mark::{Mark, MarkSet, MarkType};
pub use position::Position;
pub use schema::{AttrSpec, ContentKind, DomMapping, MarkSpec, NodeSpec, NodeType, Schema};
pub use selection::{GapCursor, GapSide, NodeSelection, Selection, TextSelection};

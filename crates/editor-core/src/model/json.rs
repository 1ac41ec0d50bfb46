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

//! `getJSON`/`setJSON` persistence (§6 External Interfaces).
//!
//! The wire shape is deliberately close to the in-memory [`Document`]:
//! `{ version, children: [...] }`, each block `{ id?, type, attrs?,
//! children? }`. `id` is optional on input — documents authored outside
//! the editor (fixtures, server-rendered drafts) need not mint ids —
//! and is always populated on output.

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::model::block::{Attrs, Block, BlockContent};
use crate::model::ids::{BlockId, BlockIdAllocator};
use crate::model::inline::{InlineChild, InlineNode, InlineNodeType};
use crate::model::mark::{Mark, MarkSet};
use crate::model::schema::{ContentKind, NodeType, Schema};
use crate::model::document::Document;

/// Wire representation of a [`Document`] (§6: `getJSON`/`setJSON`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentJson {
    pub version: u64,
    /// A sibling of `version` describing the *schema* a host's fixture
    /// was authored against, not the document content (§4.8 supplemental).
    /// Absent on input from hosts that don't track schema skew.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<u64>,
    pub children: Vec<BlockJson>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockJson {
    pub id: Option<u64>,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default, skip_serializing_if = "Attrs::is_empty")]
    pub attrs: Attrs,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<BlockJson>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<InlineChildJson>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InlineChildJson {
    Text {
        text: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        marks: Vec<MarkJson>,
    },
    Node {
        #[serde(rename = "type")]
        node_type: String,
        #[serde(default, skip_serializing_if = "Attrs::is_empty")]
        attrs: Attrs,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkJson {
    #[serde(rename = "type")]
    pub mark_type: String,
    #[serde(default, skip_serializing_if = "Attrs::is_empty")]
    pub attrs: Attrs,
}

/// Serialize a document to its wire form (§6: `getJSON`). Infallible —
/// every in-memory [`Document`] is representable.
pub fn to_json(doc: &Document) -> DocumentJson {
    DocumentJson {
        version: doc.version,
        schema_version: None,
        children: doc.blocks.iter().map(block_to_json).collect(),
    }
}

fn block_to_json(block: &Block) -> BlockJson {
    let (children, content) = match &block.content {
        BlockContent::Blocks(children) => (
            Some(children.iter().map(block_to_json).collect()),
            None,
        ),
        BlockContent::Inline(children) => (
            None,
            Some(children.iter().map(inline_child_to_json).collect()),
        ),
        BlockContent::Empty => (None, None),
    };
    BlockJson {
        id: Some(block.id.raw()),
        node_type: block.node_type.0.clone(),
        attrs: block.attrs.clone(),
        children,
        content,
    }
}

fn inline_child_to_json(child: &InlineChild) -> InlineChildJson {
    match child {
        InlineChild::Text { text, marks } => InlineChildJson::Text {
            text: text.clone(),
            marks: marks.iter().map(mark_to_json).collect(),
        },
        InlineChild::Node(node) => InlineChildJson::Node {
            node_type: node.node_type.0.clone(),
            attrs: node.attrs.clone(),
        },
    }
}

fn mark_to_json(mark: &Mark) -> MarkJson {
    MarkJson {
        mark_type: mark.mark_type.0.clone(),
        attrs: mark.attrs.clone(),
    }
}

/// Parse a document from its wire form (§6: `setJSON`), validating
/// every node/mark type and required attribute against `schema`.
/// Missing `id`s are minted fresh via `alloc`; present ones are taken
/// as-is (the caller is responsible for not colliding with ids already
/// live elsewhere — `setJSON` replaces the whole document, so this is
/// only a concern when round-tripping a fragment).
pub fn from_json(
    json: &DocumentJson,
    schema: &Schema,
    alloc: &BlockIdAllocator,
) -> Result<Document, SchemaError> {
    let blocks = json
        .children
        .iter()
        .map(|b| block_from_json(b, schema, alloc))
        .collect::<Result<Vec<_>, _>>()?;
    let mut doc = Document::new(blocks);
    doc.version = json.version;
    doc.normalize();
    Ok(doc)
}

fn block_from_json(
    json: &BlockJson,
    schema: &Schema,
    alloc: &BlockIdAllocator,
) -> Result<Block, SchemaError> {
    let node_type = NodeType::from(json.node_type.as_str());
    let spec = schema.require_node(&node_type)?;

    for attr in &spec.attrs {
        if attr.default.is_none() && !json.attrs.contains_key(&attr.name) {
            return Err(SchemaError::UnknownAttribute {
                node_type: node_type.0.clone(),
                attr: attr.name.clone(),
            });
        }
    }
    let mut attrs = json.attrs.clone();
    for attr in &spec.attrs {
        if let Some(default) = &attr.default {
            attrs.entry(attr.name.clone()).or_insert_with(|| default.clone());
        }
    }

    let id = json
        .id
        .map(BlockId::from_raw)
        .unwrap_or_else(|| alloc.alloc());

    let content = match spec.content_kind {
        ContentKind::Block => {
            let children = json
                .children
                .as_deref()
                .unwrap_or(&[])
                .iter()
                .map(|c| block_from_json(c, schema, alloc))
                .collect::<Result<Vec<_>, _>>()?;
            BlockContent::Blocks(children)
        }
        ContentKind::Inline => {
            let children = json
                .content
                .as_deref()
                .unwrap_or(&[])
                .iter()
                .map(|c| inline_child_from_json(c, schema))
                .collect::<Result<Vec<_>, _>>()?;
            BlockContent::Inline(children)
        }
        ContentKind::Empty => BlockContent::Empty,
    };

    Ok(Block {
        id,
        node_type,
        attrs,
        content,
        is_void: spec.is_void,
        is_isolating: spec.is_isolating,
        is_atom: spec.is_atom,
    })
}

fn inline_child_from_json(
    json: &InlineChildJson,
    schema: &Schema,
) -> Result<InlineChild, SchemaError> {
    match json {
        InlineChildJson::Text { text, marks } => {
            let mut set = MarkSet::new();
            for m in marks {
                let mark_type = crate::model::MarkType::from(m.mark_type.as_str());
                schema.require_mark(&mark_type)?;
                let mut mark = Mark::new(mark_type);
                mark.attrs = m.attrs.clone();
                set.insert(mark);
            }
            Ok(InlineChild::Text {
                text: text.clone(),
                marks: set,
            })
        }
        InlineChildJson::Node { node_type, attrs } => Ok(InlineChild::Node(InlineNode {
            node_type: InlineNodeType::new(node_type.as_str()),
            attrs: attrs.clone(),
        })),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn schema() -> Schema {
        Schema::with_builtins()
    }

    #[test]
    fn round_trips_a_simple_paragraph() {
        let alloc = BlockIdAllocator::new();
        let block = Block::new_inline(
            alloc.alloc(),
            "paragraph".into(),
            vec![InlineChild::text("hello")],
        );
        let doc = Document::new(vec![block]);
        let json = to_json(&doc);
        let back = from_json(&json, &schema(), &BlockIdAllocator::new()).unwrap();
        assert_eq!(back.blocks.len(), 1);
        assert_eq!(Document::block_text(&back.blocks[0]), "hello");
    }

    #[test]
    fn missing_required_attr_is_rejected() {
        let json = DocumentJson {
            version: 1,
            schema_version: None,
            children: vec![BlockJson {
                id: None,
                node_type: "image".into(),
                attrs: Attrs::new(),
                children: None,
                content: None,
            }],
        };
        let err = from_json(&json, &schema(), &BlockIdAllocator::new());
        assert!(matches!(err, Err(SchemaError::UnknownAttribute { .. })));
    }

    #[test]
    fn unknown_node_type_is_rejected() {
        let json = DocumentJson {
            version: 1,
            schema_version: None,
            children: vec![BlockJson {
                id: None,
                node_type: "not_a_real_type".into(),
                attrs: Attrs::new(),
                children: None,
                content: None,
            }],
        };
        let err = from_json(&json, &schema(), &BlockIdAllocator::new());
        assert!(matches!(err, Err(SchemaError::UnknownNodeType(_))));
    }

    #[test]
    fn missing_ids_are_minted_fresh() {
        let json = DocumentJson {
            version: 1,
            schema_version: None,
            children: vec![BlockJson {
                id: None,
                node_type: "paragraph".into(),
                attrs: Attrs::new(),
                children: None,
                content: Some(vec![InlineChildJson::Text {
                    text: "hi".into(),
                    marks: vec![],
                }]),
            }],
        };
        let doc = from_json(&json, &schema(), &BlockIdAllocator::new()).unwrap();
        assert!(doc.blocks[0].id.raw() > 0);
    }

    #[test]
    fn default_attrs_are_filled_in() {
        let json = DocumentJson {
            version: 1,
            schema_version: None,
            children: vec![BlockJson {
                id: None,
                node_type: "heading".into(),
                attrs: Attrs::new(),
                children: None,
                content: Some(vec![]),
            }],
        };
        let doc = from_json(&json, &schema(), &BlockIdAllocator::new()).unwrap();
        assert_eq!(doc.blocks[0].attrs.get("level").map(String::as_str), Some("1"));
    }
}

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

//! The schema registry: built-in node/mark specs plus whatever plugins
//! contribute, assembled once per editor instance before the view
//! mounts (data model §3 "Schema").
//!
//! [`NodeSpec`]/[`MarkSpec`] are data, not a class hierarchy (design
//! note §9: "Dynamic dispatch from inheritance") — tagged structs with
//! function-valued fields (`to_dom`), not trait objects implementing a
//! shared base trait. This mirrors how the teacher's own `DomNode<S>`
//! is a plain enum rather than an inheritance tree.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::SchemaError;

/// The type tag of a [`Block`](crate::model::Block).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeType(pub String);

impl NodeType {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeType {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// What kind of children a node accepts (data model §3: NodeSpec).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContentKind {
    /// Inline children only (text runs / inline nodes). A "textblock".
    Inline,
    /// Child blocks only. A "container".
    Block,
    /// No children of any kind (e.g. horizontal rule, image).
    Empty,
}

/// A declared attribute on a node or mark type, with an optional
/// default used when a JSON document omits it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttrSpec {
    pub name: String,
    pub default: Option<String>,
}

impl AttrSpec {
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
        }
    }

    pub fn with_default(name: impl Into<String>, default: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: Some(default.into()),
        }
    }
}

/// How an HTML element maps to/from this node type, used by the
/// serializer (§6) and the paste/setHTML parser (§4.6).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DomMapping {
    pub tag: String,
}

/// The declaration for one block node type (data model §3: NodeSpec).
#[derive(Clone, Debug)]
pub struct NodeSpec {
    pub node_type: NodeType,
    pub content_kind: ContentKind,
    pub allowed_children: Option<Vec<NodeType>>,
    pub allowed_marks: Option<Vec<crate::model::MarkType>>,
    pub attrs: Vec<AttrSpec>,
    pub is_void: bool,
    pub is_isolating: bool,
    pub is_atom: bool,
    pub dom: DomMapping,
}

impl NodeSpec {
    pub fn new(node_type: impl Into<NodeType>, content_kind: ContentKind, tag: &str) -> Self {
        Self {
            node_type: node_type.into(),
            content_kind,
            allowed_children: None,
            allowed_marks: None,
            attrs: Vec::new(),
            is_void: false,
            is_isolating: false,
            is_atom: false,
            dom: DomMapping { tag: tag.to_string() },
        }
    }

    pub fn void(mut self) -> Self {
        self.is_void = true;
        self.is_atom = true;
        self
    }

    pub fn isolating(mut self) -> Self {
        self.is_isolating = true;
        self
    }

    pub fn atom(mut self) -> Self {
        self.is_atom = true;
        self
    }

    pub fn with_attr(mut self, attr: AttrSpec) -> Self {
        self.attrs.push(attr);
        self
    }

    pub fn allowing_children(mut self, types: impl IntoIterator<Item = NodeType>) -> Self {
        self.allowed_children = Some(types.into_iter().collect());
        self
    }

    pub fn allows_child(&self, node_type: &NodeType) -> bool {
        match &self.allowed_children {
            Some(allowed) => allowed.contains(node_type),
            // No explicit allow-list: any node matching the content
            // kind (block-vs-inline) may be a child.
            None => true,
        }
    }

    pub fn allows_mark(&self, mark_type: &crate::model::MarkType) -> bool {
        match &self.allowed_marks {
            Some(allowed) => allowed.contains(mark_type),
            None => self.content_kind == ContentKind::Inline,
        }
    }
}

/// The declaration for one mark type (data model §3: MarkSpec).
#[derive(Clone, Debug)]
pub struct MarkSpec {
    pub mark_type: crate::model::MarkType,
    pub attrs: Vec<AttrSpec>,
    /// Lower rank sits closer to the text when rendering (§4.4).
    pub rank: i32,
    /// Whether text typed at a boundary inherits this mark.
    pub inclusive: bool,
    pub dom: DomMapping,
}

impl MarkSpec {
    pub fn new(mark_type: impl Into<crate::model::MarkType>, rank: i32, tag: &str) -> Self {
        Self {
            mark_type: mark_type.into(),
            attrs: Vec::new(),
            rank,
            inclusive: true,
            dom: DomMapping { tag: tag.to_string() },
        }
    }

    pub fn non_inclusive(mut self) -> Self {
        self.inclusive = false;
        self
    }

    pub fn with_attr(mut self, attr: AttrSpec) -> Self {
        self.attrs.push(attr);
        self
    }
}

/// A registry of [`NodeSpec`]/[`MarkSpec`], assembled once per editor
/// instance from built-in specs plus plugin contributions before the
/// view mounts (data model §3). After [`Schema::freeze`] is called,
/// further registration is rejected with [`SchemaError::RegisteredAfterFreeze`].
#[derive(Clone, Debug, Default)]
pub struct Schema {
    nodes: BTreeMap<NodeType, NodeSpec>,
    marks: BTreeMap<crate::model::MarkType, MarkSpec>,
    frozen: bool,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// A schema with the minimal built-in node/mark set described in
    /// data model §3 (paragraph, heading, list_item, table*, blockquote,
    /// code_block, horizontal_rule, image; bold/italic/underline/strike/
    /// link/code marks). Plugins extend this before `freeze()`.
    pub fn with_builtins() -> Self {
        let mut schema = Self::new();
        for spec in builtin_node_specs() {
            schema.register_node(spec).expect("builtin specs never collide");
        }
        for spec in builtin_mark_specs() {
            schema.register_mark(spec).expect("builtin specs never collide");
        }
        schema
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn register_node(&mut self, spec: NodeSpec) -> Result<(), SchemaError> {
        if self.frozen {
            return Err(SchemaError::RegisteredAfterFreeze {
                what: "node spec",
            });
        }
        self.nodes.insert(spec.node_type.clone(), spec);
        Ok(())
    }

    pub fn register_mark(&mut self, spec: MarkSpec) -> Result<(), SchemaError> {
        if self.frozen {
            return Err(SchemaError::RegisteredAfterFreeze {
                what: "mark spec",
            });
        }
        self.marks.insert(spec.mark_type.clone(), spec);
        Ok(())
    }

    pub fn node(&self, node_type: &NodeType) -> Option<&NodeSpec> {
        self.nodes.get(node_type)
    }

    pub fn mark(&self, mark_type: &crate::model::MarkType) -> Option<&MarkSpec> {
        self.marks.get(mark_type)
    }

    pub fn require_node(&self, node_type: &NodeType) -> Result<&NodeSpec, SchemaError> {
        self.node(node_type)
            .ok_or_else(|| SchemaError::UnknownNodeType(node_type.0.clone()))
    }

    pub fn require_mark(
        &self,
        mark_type: &crate::model::MarkType,
    ) -> Result<&MarkSpec, SchemaError> {
        self.mark(mark_type)
            .ok_or_else(|| SchemaError::UnknownMarkType(mark_type.0.clone()))
    }

    pub fn node_types(&self) -> impl Iterator<Item = &NodeType> {
        self.nodes.keys()
    }

    pub fn mark_types(&self) -> impl Iterator<Item = &crate::model::MarkType> {
        self.marks.keys()
    }

    /// Rank lookup used by [`crate::model::mark::MarkSet::sorted_by_rank`];
    /// unknown marks sort last (rank `i32::MAX`) rather than panicking,
    /// since decorations may reference marks the view doesn't render.
    pub fn rank_of(&self, mark_type: &crate::model::MarkType) -> i32 {
        self.marks.get(mark_type).map(|m| m.rank).unwrap_or(i32::MAX)
    }
}

fn builtin_node_specs() -> Vec<NodeSpec> {
    use ContentKind::*;
    vec![
        NodeSpec::new("paragraph", Inline, "p"),
        NodeSpec::new("heading", Inline, "h1").with_attr(AttrSpec::with_default("level", "1")),
        NodeSpec::new("blockquote", Block, "blockquote")
            .allowing_children(["paragraph".into(), "heading".into()]),
        NodeSpec::new("code_block", Inline, "pre").atom(),
        NodeSpec::new("horizontal_rule", Empty, "hr").void(),
        NodeSpec::new("image", Empty, "img")
            .void()
            .with_attr(AttrSpec::required("src"))
            .with_attr(AttrSpec::with_default("alt", "")),
        NodeSpec::new("bullet_list", Block, "ul")
            .allowing_children(["list_item".into()]),
        NodeSpec::new("ordered_list", Block, "ol")
            .allowing_children(["list_item".into()]),
        NodeSpec::new("list_item", Block, "li"),
        NodeSpec::new("table", Block, "table")
            .allowing_children(["table_row".into()]),
        NodeSpec::new("table_row", Block, "tr")
            .allowing_children(["table_cell".into()]),
        NodeSpec::new("table_cell", Block, "td").isolating(),
    ]
}

fn builtin_mark_specs() -> Vec<MarkSpec> {
    vec![
        MarkSpec::new("link", 0, "a").with_attr(AttrSpec::required("href")).non_inclusive(),
        MarkSpec::new("code", 10, "code").non_inclusive(),
        MarkSpec::new("bold", 20, "strong"),
        MarkSpec::new("italic", 30, "em"),
        MarkSpec::new("underline", 40, "u"),
        MarkSpec::new("strike", 50, "s"),
    ]
}

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

//! A minimal, handle-addressed HTML fragment tree built by `html5ever`
//! (§6 paste/`setHTML` parsing). Mirrors the teacher's `PaDom`/`PaDomCreator`
//! split: handles into a flat arena during parsing, converted into our
//! own owned tree (here, directly into [`crate::model::Block`]s by
//! `html::from_html`) once parsing finishes.

#![cfg(feature = "sys")]

use std::cell::{Ref, RefCell};

use html5ever::interface::NextParserState;
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::tree_builder::{ElementFlags, NodeOrText, QuirksMode, TreeSink};
use html5ever::{ns, parse_fragment, Attribute, LocalName, QualName};

/// A handle into [`RawDom::nodes`]. Stable for the lifetime of one parse.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawHandle(usize);

#[derive(Clone, Debug)]
pub enum RawNode {
    Document { children: Vec<RawHandle> },
    Element {
        name: QualName,
        attrs: Vec<(String, String)>,
        children: Vec<RawHandle>,
    },
    Text(String),
}

impl RawNode {
    /// The local tag name (e.g. `"p"`), empty for non-element nodes.
    pub fn tag(&self) -> &str {
        match self {
            RawNode::Element { name, .. } => name.local.as_ref(),
            _ => "",
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct RawDom {
    nodes: Vec<RawNode>,
}

impl RawDom {
    pub const DOCUMENT: RawHandle = RawHandle(0);

    fn new() -> Self {
        Self {
            nodes: vec![RawNode::Document {
                children: Vec::new(),
            }],
        }
    }

    pub fn get(&self, handle: RawHandle) -> &RawNode {
        &self.nodes[handle.0]
    }

    fn get_mut(&mut self, handle: RawHandle) -> &mut RawNode {
        &mut self.nodes[handle.0]
    }

    fn add(&mut self, node: RawNode) -> RawHandle {
        self.nodes.push(node);
        RawHandle(self.nodes.len() - 1)
    }

    pub fn children(&self, handle: RawHandle) -> &[RawHandle] {
        match self.get(handle) {
            RawNode::Document { children } | RawNode::Element { children, .. } => children,
            RawNode::Text(_) => &[],
        }
    }

    /// Concatenates every text descendant, ignoring element boundaries
    /// (used for `code_block` content, which has no internal marks).
    pub fn text_content(&self, handle: RawHandle) -> String {
        let mut out = String::new();
        self.collect_text(handle, &mut out);
        out
    }

    fn collect_text(&self, handle: RawHandle, out: &mut String) {
        match self.get(handle) {
            RawNode::Text(t) => out.push_str(t),
            RawNode::Document { children } | RawNode::Element { children, .. } => {
                for &child in children {
                    self.collect_text(child, out);
                }
            }
        }
    }
}

pub fn qual_name(local: &str) -> QualName {
    QualName::new(None, ns!(html), LocalName::from(local))
}

struct Sink {
    dom: RefCell<RawDom>,
}

impl TreeSink for Sink {
    type Handle = RawHandle;
    type Output = RawDom;
    type ElemName<'a> = Ref<'a, QualName>;

    fn finish(self) -> Self::Output {
        self.dom.into_inner()
    }

    fn parse_error(&self, _msg: std::borrow::Cow<'static, str>) {}

    fn get_document(&self) -> Self::Handle {
        RawDom::DOCUMENT
    }

    fn elem_name<'a>(&'a self, target: &'a Self::Handle) -> Self::ElemName<'a> {
        let target = *target;
        Ref::map(self.dom.borrow(), |dom| match dom.get(target) {
            RawNode::Element { name, .. } => name,
            _ => panic!("elem_name called on a non-element handle"),
        })
    }

    fn create_element(
        &self,
        name: QualName,
        attrs: Vec<Attribute>,
        _flags: ElementFlags,
    ) -> Self::Handle {
        let node = RawNode::Element {
            name,
            attrs: attrs
                .into_iter()
                .map(|a| (a.name.local.as_ref().to_string(), a.value.as_ref().to_string()))
                .collect(),
            children: Vec::new(),
        };
        self.dom.borrow_mut().add(node)
    }

    fn create_comment(&self, _text: StrTendril) -> Self::Handle {
        self.dom.borrow_mut().add(RawNode::Text(String::new()))
    }

    fn create_pi(&self, _target: StrTendril, _data: StrTendril) -> Self::Handle {
        self.dom.borrow_mut().add(RawNode::Text(String::new()))
    }

    fn append(&self, parent: &Self::Handle, child: NodeOrText<Self::Handle>) {
        let mut dom = self.dom.borrow_mut();
        match child {
            NodeOrText::AppendNode(handle) => push_child(&mut dom, *parent, handle),
            NodeOrText::AppendText(text) => {
                let last_is_text = dom
                    .children(*parent)
                    .last()
                    .is_some_and(|&h| matches!(dom.get(h), RawNode::Text(_)));
                if last_is_text {
                    let last = *dom.children(*parent).last().unwrap();
                    if let RawNode::Text(existing) = dom.get_mut(last) {
                        existing.push_str(text.as_ref());
                    }
                } else {
                    let handle = dom.add(RawNode::Text(text.as_ref().to_string()));
                    push_child(&mut dom, *parent, handle);
                }
            }
        }
    }

    fn append_based_on_parent_node(
        &self,
        element: &Self::Handle,
        _prev_element: &Self::Handle,
        child: NodeOrText<Self::Handle>,
    ) {
        self.append(element, child);
    }

    fn append_doctype_to_document(
        &self,
        _name: StrTendril,
        _public_id: StrTendril,
        _system_id: StrTendril,
    ) {
    }

    fn mark_script_already_started(&self, _node: &Self::Handle) {}

    fn pop(&self, _node: &Self::Handle) {}

    fn get_template_contents(&self, target: &Self::Handle) -> Self::Handle {
        *target
    }

    fn same_node(&self, x: &Self::Handle, y: &Self::Handle) -> bool {
        x == y
    }

    fn set_quirks_mode(&self, _mode: QuirksMode) {}

    fn append_before_sibling(&self, _sibling: &Self::Handle, _new_node: NodeOrText<Self::Handle>) {}

    fn add_attrs_if_missing(&self, target: &Self::Handle, attrs: Vec<Attribute>) {
        let mut dom = self.dom.borrow_mut();
        if let RawNode::Element { attrs: existing, .. } = dom.get_mut(*target) {
            for attr in attrs {
                let name = attr.name.local.as_ref().to_string();
                if !existing.iter().any(|(n, _)| n == &name) {
                    existing.push((name, attr.value.as_ref().to_string()));
                }
            }
        }
    }

    fn associate_with_form(
        &self,
        _target: &Self::Handle,
        _form: &Self::Handle,
        _nodes: (&Self::Handle, Option<&Self::Handle>),
    ) {
    }

    fn remove_from_parent(&self, _target: &Self::Handle) {}

    fn reparent_children(&self, _node: &Self::Handle, _new_parent: &Self::Handle) {}

    fn is_mathml_annotation_xml_integration_point(&self, _handle: &Self::Handle) -> bool {
        false
    }

    fn set_current_line(&self, _line_number: u64) {}

    fn complete_script(&self, _node: &Self::Handle) -> NextParserState {
        NextParserState::Continue
    }

    fn allow_declarative_shadow_roots(&self, _intended_parent: &Self::Handle) -> bool {
        false
    }

    fn attach_declarative_shadow(
        &self,
        _location: &Self::Handle,
        _template: &Self::Handle,
        _attrs: Vec<Attribute>,
    ) -> Result<(), String> {
        Ok(())
    }
}

fn push_child(dom: &mut RawDom, parent: RawHandle, child: RawHandle) {
    match dom.get_mut(parent) {
        RawNode::Document { children } | RawNode::Element { children, .. } => {
            children.push(child)
        }
        RawNode::Text(_) => {}
    }
}

/// Parses `html` as a fragment (no implicit `<html>`/`<body>` wrapping
/// beyond what `html5ever` needs internally) into a [`RawDom`].
pub fn parse_fragment_html(html: &str) -> RawDom {
    let sink = Sink {
        dom: RefCell::new(RawDom::new()),
    };
    parse_fragment(sink, Default::default(), qual_name("div"), vec![])
        .from_utf8()
        .one(html.as_bytes())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_simple_tag_with_text() {
        let dom = parse_fragment_html("<p>hello</p>");
        let children = dom.children(RawDom::DOCUMENT);
        assert_eq!(children.len(), 1);
        let node = dom.get(children[0]);
        assert_eq!(node.tag(), "p");
        match node {
            RawNode::Element { children, .. } => {
                assert_eq!(dom.text_content(children[0]), "hello");
            }
            other => panic!("expected element, got {other:?}"),
        }
    }

    #[test]
    fn adjacent_text_is_merged_into_one_node() {
        let dom = parse_fragment_html("a&amp;b");
        let children = dom.children(RawDom::DOCUMENT);
        assert_eq!(children.len(), 1);
        assert!(matches!(dom.get(children[0]), RawNode::Text(t) if t == "a&b"));
    }

    #[test]
    fn preserves_attributes() {
        let dom = parse_fragment_html(r#"<a href="https://example.com">x</a>"#);
        let children = dom.children(RawDom::DOCUMENT);
        match dom.get(children[0]) {
            RawNode::Element { attrs, .. } => {
                assert_eq!(attrs[0], ("href".to_string(), "https://example.com".to_string()));
            }
            other => panic!("expected element, got {other:?}"),
        }
    }
}

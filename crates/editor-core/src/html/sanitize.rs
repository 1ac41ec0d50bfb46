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

//! Tag/attribute allowlist for `getHTML`/`setHTML`/paste (§6 "HTML
//! serialization contract"). Every tag accepted by [`crate::html::from_html`]
//! and every tag emitted by [`crate::html::to_html`] is drawn from
//! [`ALLOWED_TAGS`]; attributes are filtered per-tag by [`sanitize_attrs`].
//! Script and event-handler attributes are always stripped, regardless
//! of which tag they appear on.

use std::collections::BTreeMap;

use crate::error::SanitizationError;

pub const ALLOWED_TAGS: &[&str] = &[
    "p", "h1", "h2", "h3", "h4", "h5", "h6", "blockquote", "ul", "ol", "li", "hr", "br", "strong",
    "b", "em", "i", "u", "s", "del", "code", "pre", "span", "a", "table", "tr", "td", "figure",
    "img",
];

pub fn is_allowed_tag(tag: &str) -> bool {
    ALLOWED_TAGS.contains(&tag)
}

const STYLE_PROPERTIES: &[&str] = &["color", "background-color", "font-family", "text-align"];

/// Attributes accepted per §6, independent of tag (a disallowed
/// attribute on an allowed tag is stripped, not the whole tag).
fn allowed_attr_names(tag: &str) -> &'static [&'static str] {
    match tag {
        "a" => &["href", "target", "rel"],
        "img" => &["src", "alt", "width", "height"],
        "td" => &["colspan", "rowspan"],
        _ => &[],
    }
}

/// Filters `raw` down to the §6 allowlist for `tag`, returning the
/// surviving attributes plus a [`SanitizationError`] for each one
/// stripped (logged by the caller at debug level; never thrown, per
/// the propagation policy in §7).
pub fn sanitize_attrs(
    tag: &str,
    raw: &[(String, String)],
) -> (BTreeMap<String, String>, Vec<SanitizationError>) {
    let mut kept = BTreeMap::new();
    let mut stripped = Vec::new();
    let allowed = allowed_attr_names(tag);

    for (name, value) in raw {
        if name == "style" {
            let style = sanitize_style(value);
            if !style.is_empty() {
                kept.insert("style".to_string(), render_style(&style));
            }
            continue;
        }
        if allowed.contains(&name.as_str()) {
            kept.insert(name.clone(), value.clone());
        } else {
            stripped.push(SanitizationError::DisallowedAttribute {
                tag: tag.to_string(),
                attr: name.clone(),
            });
        }
    }
    (kept, stripped)
}

/// Parses a `style="..."` attribute down to the declared-safe property
/// subset (§6), dropping everything else (most importantly, this never
/// passes through `expression()`/`url()`-bearing declarations).
pub fn sanitize_style(style: &str) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    for decl in style.split(';') {
        let Some((prop, value)) = decl.split_once(':') else {
            continue;
        };
        let prop = prop.trim().to_lowercase();
        let value = value.trim();
        if STYLE_PROPERTIES.contains(&prop.as_str()) && !value.is_empty() {
            out.insert(prop, value.to_string());
        }
    }
    out
}

fn render_style(props: &BTreeMap<String, String>) -> String {
    props
        .iter()
        .map(|(k, v)| format!("{k}: {v}"))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn script_and_event_handlers_are_always_stripped() {
        let (kept, stripped) = sanitize_attrs(
            "img",
            &[
                ("src".to_string(), "x.png".to_string()),
                ("onerror".to_string(), "alert(1)".to_string()),
            ],
        );
        assert_eq!(kept.get("src").unwrap(), "x.png");
        assert!(!kept.contains_key("onerror"));
        assert_eq!(stripped.len(), 1);
    }

    #[test]
    fn style_keeps_only_declared_safe_properties() {
        let style = sanitize_style("color: red; position: absolute; text-align: center");
        assert_eq!(style.get("color").unwrap(), "red");
        assert_eq!(style.get("text-align").unwrap(), "center");
        assert!(!style.contains_key("position"));
    }

    #[test]
    fn unknown_tag_is_not_allowed() {
        assert!(!is_allowed_tag("script"));
        assert!(is_allowed_tag("p"));
    }
}

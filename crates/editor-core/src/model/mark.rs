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

//! Character-level annotations (data model §3: Mark).

use std::collections::BTreeMap;
use std::fmt;

/// The type tag of a [`Mark`]. Plugins contribute new variants by
/// registering a [`crate::model::MarkSpec`] under a string name; core
/// built-ins use a fixed set of well-known names so the schema can be
/// constructed with no plugins at all (used heavily by tests).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MarkType(pub String);

impl MarkType {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl fmt::Display for MarkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for MarkType {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A single character-level annotation: `(type, attrs?)`.
///
/// Two marks of the same type with differing attrs are not stackable:
/// setting a new one with the same type replaces the old one in a
/// text run's mark set (data model §3).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mark {
    pub mark_type: MarkType,
    pub attrs: BTreeMap<String, String>,
}

impl Mark {
    pub fn new(mark_type: impl Into<MarkType>) -> Self {
        Self {
            mark_type: mark_type.into(),
            attrs: BTreeMap::new(),
        }
    }

    pub fn with_attr(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }
}

impl From<&str> for Mark {
    fn from(s: &str) -> Self {
        Mark::new(s)
    }
}

/// An ordered, deduplicated-by-type set of marks on a single text run.
///
/// Ordering within the set always matches ascending [`MarkSpec::rank`]
/// (schema-assigned, lower rank sits closer to the text when rendering,
/// §4.4). `MarkSet` itself stores marks in insertion order and leaves
/// rank-sorting to the schema-aware call sites (model code has no
/// schema reference); see [`crate::model::Schema::sort_marks`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MarkSet(Vec<Mark>);

impl MarkSet {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn from_marks(marks: impl IntoIterator<Item = Mark>) -> Self {
        let mut set = Self::new();
        for m in marks {
            set.insert(m);
        }
        set
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Mark> {
        self.0.iter()
    }

    pub fn contains_type(&self, mark_type: &MarkType) -> bool {
        self.0.iter().any(|m| &m.mark_type == mark_type)
    }

    pub fn get(&self, mark_type: &MarkType) -> Option<&Mark> {
        self.0.iter().find(|m| &m.mark_type == mark_type)
    }

    /// Insert a mark, replacing any existing mark of the same type
    /// (same-type marks are never stacked, per data model §3).
    pub fn insert(&mut self, mark: Mark) {
        if let Some(existing) =
            self.0.iter_mut().find(|m| m.mark_type == mark.mark_type)
        {
            *existing = mark;
        } else {
            self.0.push(mark);
        }
    }

    pub fn remove_type(&mut self, mark_type: &MarkType) -> bool {
        let before = self.0.len();
        self.0.retain(|m| &m.mark_type != mark_type);
        self.0.len() != before
    }

    /// Equal as sets, irrespective of insertion order. Used to decide
    /// whether adjacent text runs may be coalesced on normalization.
    pub fn same_set_as(&self, other: &MarkSet) -> bool {
        if self.0.len() != other.0.len() {
            return false;
        }
        self.0.iter().all(|m| other.0.contains(m))
    }

    pub fn sorted_by_rank(&self, rank_of: impl Fn(&MarkType) -> i32) -> Vec<&Mark> {
        let mut marks: Vec<&Mark> = self.0.iter().collect();
        marks.sort_by_key(|m| rank_of(&m.mark_type));
        marks
    }
}

impl<'a> IntoIterator for &'a MarkSet {
    type Item = &'a Mark;
    type IntoIter = std::slice::Iter<'a, Mark>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<Mark> for MarkSet {
    fn from_iter<T: IntoIterator<Item = Mark>>(iter: T) -> Self {
        Self::from_marks(iter)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn inserting_same_type_replaces() {
        let mut set = MarkSet::new();
        set.insert(Mark::new("link").with_attr("href", "https://a"));
        set.insert(Mark::new("link").with_attr("href", "https://b"));
        assert_eq!(set.len(), 1);
        assert_eq!(
            set.get(&MarkType::from("link")).unwrap().attrs["href"],
            "https://b"
        );
    }

    #[test]
    fn same_set_as_ignores_order() {
        let a = MarkSet::from_marks([Mark::new("bold"), Mark::new("italic")]);
        let b = MarkSet::from_marks([Mark::new("italic"), Mark::new("bold")]);
        assert!(a.same_set_as(&b));
    }

    #[test]
    fn different_attrs_are_not_same_set() {
        let a = MarkSet::from_marks([Mark::new("link").with_attr("href", "a")]);
        let b = MarkSet::from_marks([Mark::new("link").with_attr("href", "b")]);
        assert!(!a.same_set_as(&b));
    }
}

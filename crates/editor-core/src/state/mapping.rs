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

//! Position mapping through applied steps (§4.2 "Mapping"): lets a
//! position captured before a transaction (a pending selection, a
//! decoration anchor, a queued collaborator's step) be translated to
//! where it lands afterwards.

use crate::model::BlockId;

/// Which side of a replaced range an offset should be mapped to when it
/// falls exactly on a boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bias {
    Before,
    After,
}

/// A single step's effect on offsets within one block: `oldLen` units
/// starting at `start` were replaced by `newLen` units.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Range {
    start: usize,
    old_len: usize,
    new_len: usize,
}

/// The offset-mapping contribution of one step, scoped to a single
/// block (cross-block effects — split/join — are modeled at the
/// [`Mapping`] level via block-id retargeting, not offset arithmetic).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StepMap {
    ranges: Vec<Range>,
}

impl StepMap {
    pub fn new() -> Self {
        Self { ranges: Vec::new() }
    }

    pub fn replace(start: usize, old_len: usize, new_len: usize) -> Self {
        Self {
            ranges: vec![Range {
                start,
                old_len,
                new_len,
            }],
        }
    }

    pub fn map(&self, pos: usize, bias: Bias) -> usize {
        let mut result = pos;
        let mut delta: i64 = 0;
        for range in &self.ranges {
            let start = range.start;
            let old_end = start + range.old_len;
            if pos < start {
                continue;
            }
            if pos > old_end {
                delta += range.new_len as i64 - range.old_len as i64;
                continue;
            }
            // pos falls within or at the edge of the replaced range.
            return match bias {
                Bias::Before => (start as i64 + delta) as usize,
                Bias::After => (start as i64 + delta + range.new_len as i64) as usize,
            };
        }
        (result as i64 + delta).max(0) as usize
    }

    pub fn invert(&self) -> Self {
        Self {
            ranges: self
                .ranges
                .iter()
                .map(|r| Range {
                    start: r.start,
                    old_len: r.new_len,
                    new_len: r.old_len,
                })
                .collect(),
        }
    }

    pub fn is_identity(&self) -> bool {
        self.ranges.is_empty()
    }
}

/// A composed sequence of [`StepMap`]s, one per applied step, used to
/// carry a position through an entire transaction (or further, through
/// history replay). Maps compose left-to-right: the position of a
/// step captured before step *i* is translated through steps
/// *i, i+1, ..., n*. Each entry also carries the block its step was
/// scoped to ([`crate::state::Step::scoped_block`]) so a position in an
/// unrelated block is never shifted by an edit elsewhere in the
/// document.
#[derive(Clone, Debug, Default)]
pub struct Mapping {
    maps: Vec<(Option<BlockId>, StepMap)>,
}

impl Mapping {
    pub fn new() -> Self {
        Self { maps: Vec::new() }
    }

    pub fn push(&mut self, map: StepMap, scope: Option<BlockId>) {
        self.maps.push((scope, map));
    }

    /// Maps `pos` through every entry scoped to `block`, skipping any
    /// step that touched a different block. A position outside the
    /// edited block must never move just because some other block in
    /// the document grew or shrank.
    pub fn map_in_block(&self, block: BlockId, pos: usize, bias: Bias) -> usize {
        self.maps
            .iter()
            .filter(|(scope, _)| *scope == Some(block))
            .fold(pos, |p, (_, m)| m.map(p, bias))
    }

    pub fn invert(&self) -> Mapping {
        Mapping {
            maps: self
                .maps
                .iter()
                .rev()
                .map(|(scope, m)| (*scope, m.invert()))
                .collect(),
        }
    }

    pub fn append(&mut self, other: Mapping) {
        self.maps.extend(other.maps);
    }

    pub fn is_identity(&self) -> bool {
        self.maps.iter().all(|(_, m)| m.is_identity())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn identity_map_is_noop() {
        let map = StepMap::new();
        assert_eq!(map.map(5, Bias::Before), 5);
    }

    #[test]
    fn insertion_shifts_positions_after_it() {
        let map = StepMap::replace(3, 0, 2);
        assert_eq!(map.map(10, Bias::Before), 12);
        assert_eq!(map.map(1, Bias::Before), 1);
    }

    #[test]
    fn deletion_collapses_positions_inside_the_range() {
        let map = StepMap::replace(2, 5, 0);
        assert_eq!(map.map(4, Bias::Before), 2);
        assert_eq!(map.map(4, Bias::After), 2);
        assert_eq!(map.map(10, Bias::Before), 5);
    }

    #[test]
    fn invert_swaps_old_and_new_len() {
        let map = StepMap::replace(3, 1, 4);
        let inv = map.invert();
        assert_eq!(inv.map(7, Bias::Before), 4);
    }

    #[test]
    fn mapping_composes_sequential_maps_in_the_same_block() {
        let block = BlockId::from_raw(1);
        let mut mapping = Mapping::new();
        mapping.push(StepMap::replace(0, 0, 3), Some(block)); // insert 3 at start
        mapping.push(StepMap::replace(5, 0, 2), Some(block)); // insert 2 more later
        assert_eq!(mapping.map_in_block(block, 2, Bias::Before), 5);
    }

    #[test]
    fn mapping_leaves_other_blocks_untouched() {
        let edited = BlockId::from_raw(1);
        let untouched = BlockId::from_raw(2);
        let mut mapping = Mapping::new();
        mapping.push(StepMap::replace(0, 0, 2), Some(edited));
        assert_eq!(mapping.map_in_block(untouched, 3, Bias::Before), 3);
    }
}

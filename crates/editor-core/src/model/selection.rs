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

//! [`Selection`]: the discriminated union from data model §3
//! (TextSelection / NodeSelection / GapCursor).

use crate::model::ids::BlockId;
use crate::model::position::Position;

/// Which side of a gap the [`GapCursor`] sits on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GapSide {
    Before,
    After,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextSelection {
    pub anchor: Position,
    pub head: Position,
}

impl TextSelection {
    pub fn new(anchor: Position, head: Position) -> Self {
        Self { anchor, head }
    }

    pub fn collapsed(pos: Position) -> Self {
        Self {
            anchor: pos.clone(),
            head: pos,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.head
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NodeSelection {
    pub block_id: BlockId,
    pub path: Vec<BlockId>,
}

impl NodeSelection {
    pub fn new(block_id: BlockId) -> Self {
        Self {
            block_id,
            path: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GapCursor {
    pub block_id: BlockId,
    pub side: GapSide,
    pub path: Vec<BlockId>,
}

impl GapCursor {
    pub fn new(block_id: BlockId, side: GapSide) -> Self {
        Self {
            block_id,
            side,
            path: Vec::new(),
        }
    }
}

/// The discriminated selection union (data model §3).
#[derive(Clone, Debug, PartialEq)]
pub enum Selection {
    Text(TextSelection),
    Node(NodeSelection),
    Gap(GapCursor),
}

impl Selection {
    pub fn collapsed_at(pos: Position) -> Self {
        Selection::Text(TextSelection::collapsed(pos))
    }

    pub fn node(block_id: BlockId) -> Self {
        Selection::Node(NodeSelection::new(block_id))
    }

    pub fn gap(block_id: BlockId, side: GapSide) -> Self {
        Selection::Gap(GapCursor::new(block_id, side))
    }

    /// Every block id this selection references, used by the
    /// repair-on-delete invariant (data model invariant 6).
    pub fn referenced_blocks(&self) -> Vec<BlockId> {
        match self {
            Selection::Text(sel) => {
                let mut ids = vec![sel.anchor.block_id];
                if sel.head.block_id != sel.anchor.block_id {
                    ids.push(sel.head.block_id);
                }
                ids
            }
            Selection::Node(sel) => vec![sel.block_id],
            Selection::Gap(gap) => vec![gap.block_id],
        }
    }

    pub fn is_collapsed(&self) -> bool {
        match self {
            Selection::Text(sel) => sel.is_collapsed(),
            Selection::Node(_) | Selection::Gap(_) => true,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn text_selection_collapsed_reports_true() {
        let pos = Position::new(BlockId::from_raw(1), 0);
        let sel = Selection::collapsed_at(pos);
        assert!(sel.is_collapsed());
    }

    #[test]
    fn node_and_gap_selections_are_always_collapsed() {
        assert!(Selection::node(BlockId::from_raw(1)).is_collapsed());
        assert!(Selection::gap(BlockId::from_raw(1), GapSide::Before).is_collapsed());
    }

    #[test]
    fn referenced_blocks_dedupes_same_block_text_selection() {
        let pos = Position::new(BlockId::from_raw(1), 0);
        let sel = Selection::collapsed_at(pos);
        assert_eq!(sel.referenced_blocks(), vec![BlockId::from_raw(1)]);
    }
}

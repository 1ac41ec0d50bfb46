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

//! [`Position`]: `(blockId, offset, path?)` (data model §3).

use crate::model::ids::BlockId;

/// A position within a document: a block, an offset measured in
/// inline-content width within that block, and an optional disambiguating
/// ancestor path for nested containers (cell inside row inside table).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    pub block_id: BlockId,
    pub offset: usize,
    pub path: Vec<BlockId>,
}

impl Position {
    pub fn new(block_id: BlockId, offset: usize) -> Self {
        Self {
            block_id,
            offset,
            path: Vec::new(),
        }
    }

    pub fn with_path(mut self, path: Vec<BlockId>) -> Self {
        self.path = path;
        self
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn position_without_path_defaults_empty() {
        let pos = Position::new(BlockId::from_raw(1), 3);
        assert!(pos.path.is_empty());
    }
}

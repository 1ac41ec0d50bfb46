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

//! Opaque, process-unique [`BlockId`] allocation.
//!
//! Ids are never reused within a document's lifetime (data model
//! invariant 1 and the Lifecycle section of the spec): each editor
//! instance owns one [`BlockIdAllocator`], seeded at construction and
//! advanced monotonically. Cloning a [`Document`](crate::model::Document)
//! (structural sharing under the hood, same as the teacher's `Dom<S>`
//! uses `Rc`-free persistent cloning) never rewinds the allocator.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// A stable, opaque identity for a [`Block`](crate::model::Block).
///
/// `BlockId` is intentionally not `Ord`-meaningful beyond equality —
/// document order is determined by tree position, not by id value.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(u64);

impl fmt::Debug for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockId({})", self.0)
    }
}

impl BlockId {
    /// Only for tests and fixtures that need a deterministic id.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Allocates process-unique [`BlockId`]s for one editor instance.
///
/// Per §9 "Global state", this is per-editor-instance state, not a
/// process-global counter — two editors on one page must not be able
/// to observe each other's ids colliding or interleaving in a way that
/// implies shared state.
#[derive(Debug)]
pub struct BlockIdAllocator {
    next: AtomicU64,
}

impl BlockIdAllocator {
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    pub fn alloc(&self) -> BlockId {
        BlockId(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for BlockIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for BlockIdAllocator {
    fn clone(&self) -> Self {
        // A cloned state must keep handing out ids past whatever the
        // source has already allocated, otherwise two diverging states
        // derived from the same allocator could mint colliding ids.
        Self {
            next: AtomicU64::new(self.next.load(Ordering::Relaxed)),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn ids_are_monotonically_increasing() {
        let alloc = BlockIdAllocator::new();
        let a = alloc.alloc();
        let b = alloc.alloc();
        let c = alloc.alloc();
        assert!(a.raw() < b.raw());
        assert!(b.raw() < c.raw());
    }

    #[test]
    fn cloned_allocator_continues_past_source() {
        let alloc = BlockIdAllocator::new();
        let _ = alloc.alloc();
        let cloned = alloc.clone();
        let from_source = alloc.alloc();
        let from_clone = cloned.alloc();
        assert_ne!(from_source, from_clone);
    }
}

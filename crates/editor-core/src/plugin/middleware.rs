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

//! Transaction middleware (§4.3 "Middleware chain"): plugins can
//! inspect and amend a transaction before it is applied (append
//! additional steps, force a different resulting selection), in
//! dependency-sorted registration order.

use std::sync::Arc;

use crate::state::{EditorState, Transaction};

pub type Middleware = Arc<dyn Fn(&EditorState, Transaction) -> Transaction + Send + Sync>;

#[derive(Clone, Default)]
pub struct MiddlewareChain {
    stack: Vec<Middleware>,
}

impl MiddlewareChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, middleware: Middleware) {
        self.stack.push(middleware);
    }

    /// Run `tx` through every registered middleware in registration
    /// order, each seeing the previous one's output (§4.3).
    pub fn apply(&self, state: &EditorState, tx: Transaction) -> Transaction {
        self.stack.iter().fold(tx, |tx, mw| mw(state, tx))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::{Block, BlockId, Document, Schema, Selection};
    use std::sync::Arc as StdArc;

    fn state() -> EditorState {
        EditorState::new(
            Document::new(vec![Block::new_inline(
                BlockId::from_raw(1),
                "paragraph".into(),
                vec![],
            )]),
            Selection::collapsed_at(crate::model::Position::new(BlockId::from_raw(1), 0)),
            StdArc::new(Schema::with_builtins()),
        )
    }

    #[test]
    fn middlewares_run_in_registration_order() {
        let mut chain = MiddlewareChain::new();
        chain.register(Arc::new(|_s, tx| tx.with_meta("seen_by", "first")));
        chain.register(Arc::new(|_s, tx| {
            let prior = tx.meta.get("seen_by").cloned().unwrap_or_default();
            tx.with_meta("seen_by", format!("{prior},second"))
        }));
        let tx = Transaction::new(crate::state::Origin::User);
        let out = chain.apply(&state(), tx);
        assert_eq!(out.meta.get("seen_by").map(String::as_str), Some("first,second"));
    }
}

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

//! HTML import/export (§6 "HTML serialization contract"): a sanitizer
//! shared by both directions, a parser (`from_html`, used by `setHTML`
//! and paste), and a serializer (`to_html`, used by `getHTML`).

#[cfg(feature = "sys")]
mod raw_dom;

mod from_html;
mod sanitize;
mod to_html;

pub use from_html::from_html;
pub use sanitize::{is_allowed_tag, sanitize_attrs, sanitize_style, ALLOWED_TAGS};
pub use to_html::to_html;

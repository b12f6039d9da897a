// Copyright 2019 Zhizhesihai (Beijing) Technology Limited.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// See the License for the specific language governing permissions and
// limitations under the License.

//! Joins the values of nested documents onto their parent document.
//!
//! Nested documents are indexed as one block: the children first, then the
//! parent. The parent bit set marks the last document of every block, so the
//! children of parent `p` are the child documents in `(prev_parent(p), p)`.

mod locator;

pub use self::locator::*;

mod join_cursor;

pub use self::join_cursor::*;

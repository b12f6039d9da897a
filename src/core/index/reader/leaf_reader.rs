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

use core::codec::doc_values::{
    NumericDocValues, SortedDocValues, SortedNumericDocValues, SortedSetDocValues,
};
use core::index::FieldInfo;
use core::search::DocIterator;
use core::util::bit_set::FixedBitSet;
use core::util::DocId;

use error::Result;

use std::sync::Arc;

/// `LeafReader` providing an interface for accessing the doc values of a segment.
///
/// Every cursor handed out is fresh and unpositioned, and belongs to one consumer.
/// Fields without doc values in this segment yield empty cursors rather than
/// errors, since a field may simply not occur in every segment. Asking for a
/// layout the field was not indexed with is an error.
pub trait LeafReader {
    fn max_doc(&self) -> DocId;

    fn field_info(&self, field: &str) -> Option<&FieldInfo>;

    /// Single valued numeric doc values.
    fn get_numeric_doc_values(&self, field: &str) -> Result<Box<dyn NumericDocValues>>;

    /// Multi-valued numeric doc values; single valued fields come back wrapped in a
    /// singleton.
    fn get_sorted_numeric_doc_values(&self, field: &str)
        -> Result<Box<dyn SortedNumericDocValues>>;

    fn get_sorted_doc_values(&self, field: &str) -> Result<Box<dyn SortedDocValues>>;

    /// Multi-valued ordinals; single valued fields come back wrapped in a singleton.
    fn get_sorted_set_doc_values(&self, field: &str) -> Result<Box<dyn SortedSetDocValues>>;

    /// The documents that own the nested documents under `path`, `None` when the
    /// segment has no such nested path.
    fn parent_docs(&self, path: &str) -> Option<Arc<FixedBitSet>>;

    /// The nested documents under `path`, in doc id order.
    fn child_docs(&self, path: &str) -> Result<Option<Box<dyn DocIterator>>>;
}

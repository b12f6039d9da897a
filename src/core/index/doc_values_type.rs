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

/// The storage layout of a field's doc values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum DocValuesType {
    /// No doc values for this field.
    Null,
    /// A per-document Number
    Numeric,
    /// A pre-sorted [u8]. Fields with this type only store distinct byte values
    /// and store an additional ordinal per document to dereference the shared
    /// [u8]. The stored [u8] is presorted and allows access via document id,
    /// ordinal and by-value.
    Sorted,
    /// A pre-sorted [Number]. Fields with this type store numeric values in sorted
    /// order according to `i64::cmp`.
    SortedNumeric,
    /// A pre-sorted Set<[u8]>. Fields with this type only store distinct byte values
    /// and store additional ordinals per document to dereference the shared
    /// byte[]s.
    SortedSet,
}

impl DocValuesType {
    pub fn null(&self) -> bool {
        match *self {
            DocValuesType::Null => true,
            _ => false,
        }
    }

}

impl Default for DocValuesType {
    fn default() -> DocValuesType {
        DocValuesType::Null
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doc_values_type() {
        assert!(DocValuesType::default().null());
        assert!(!DocValuesType::SortedNumeric.null());
    }
}

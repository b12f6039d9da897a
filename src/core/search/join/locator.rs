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

use core::codec::doc_values::DocValuesIterator;
use core::search::DocIterator;
use core::util::bit_set::{FixedBitSet, ImmutableBitSet};
use core::util::DocId;

use error::Result;

use std::sync::Arc;

/// Result of positioning on the children of a parent document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildLookup {
    /// None of the children has a value, possibly because there are no children.
    NoChildWithValue,
    /// The values are positioned on this child, the first one with a value.
    FirstChild(DocId),
}

/// Walks the children of a non-decreasing sequence of parent documents.
///
/// The child iterator only ever moves forward: children seen for one parent are
/// never visited again, and an iterator already past the previous parent boundary
/// is reused as is.
pub struct ParentChildLocator<I: DocIterator> {
    parent_docs: Arc<FixedBitSet>,
    child_docs: I,
    max_children: usize,
    current_parent: DocId,
    // children with a value visited for the current parent
    visited: usize,
}

impl<I: DocIterator> ParentChildLocator<I> {
    pub fn new(parent_docs: Arc<FixedBitSet>, child_docs: I) -> Self {
        Self::with_max_children(parent_docs, child_docs, usize::max_value())
    }

    /// Only the first `max_children` children with a value of every parent are
    /// visited.
    pub fn with_max_children(
        parent_docs: Arc<FixedBitSet>,
        child_docs: I,
        max_children: usize,
    ) -> Self {
        assert!(max_children > 0, "max_children must be positive");
        ParentChildLocator {
            parent_docs,
            child_docs,
            max_children,
            current_parent: -1,
            visited: 0,
        }
    }

    pub fn max_children(&self) -> usize {
        self.max_children
    }

    /// Positions `values` on the first child of `parent` that has a value.
    pub fn advance_to_parent<V: DocValuesIterator + ?Sized>(
        &mut self,
        parent: DocId,
        values: &mut V,
    ) -> Result<ChildLookup> {
        assert!(
            parent >= self.current_parent,
            "parents must be visited in order: current={}, target={}",
            self.current_parent,
            parent
        );
        self.current_parent = parent;
        self.visited = 0;
        if parent <= 0 {
            // the first document can't have children
            return Ok(ChildLookup::NoChildWithValue);
        }

        let prev_parent = self.parent_docs.prev_set_bit((parent - 1) as usize);
        let mut child = if self.child_docs.doc_id() > prev_parent {
            self.child_docs.doc_id()
        } else {
            self.child_docs.advance(prev_parent + 1)?
        };
        while child < parent {
            if values.advance_exact(child)? {
                self.visited = 1;
                return Ok(ChildLookup::FirstChild(child));
            }
            child = self.child_docs.next()?;
        }
        Ok(ChildLookup::NoChildWithValue)
    }

    /// Positions `values` on the next child of the current parent that has a value,
    /// returns false once all children were visited or `max_children` is reached.
    pub fn advance_values_to_next_child<V: DocValuesIterator + ?Sized>(
        &mut self,
        values: &mut V,
    ) -> Result<bool> {
        loop {
            let child = self.child_docs.next()?;
            if child >= self.current_parent {
                return Ok(false);
            }
            if values.advance_exact(child)? {
                if self.visited >= self.max_children {
                    warn!(
                        "parent doc {} has more than {} children with values, ignoring the rest",
                        self.current_parent, self.max_children
                    );
                    return Ok(false);
                }
                self.visited += 1;
                return Ok(true);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::codec::doc_values::memory::AddressedSortedNumericDocValues;
    use core::codec::doc_values::SortedNumericDocValues;
    use core::search::tests::MockDocIterator;

    // parents {2, 5}, children 0, 1, 3, 4; doc 3 has no value
    fn locator() -> ParentChildLocator<MockDocIterator> {
        let parents = FixedBitSet::from_docs(&[2, 5], 6).unwrap();
        ParentChildLocator::new(Arc::new(parents), MockDocIterator::new(vec![0, 1, 3, 4]))
    }

    fn values() -> AddressedSortedNumericDocValues {
        // doc 0: [10, 11], doc 1: [20], doc 3: [], doc 4: [40]
        AddressedSortedNumericDocValues::new(
            Arc::new(vec![10, 11, 20, 40]),
            Arc::new(vec![0, 2, 3, 3, 3, 4, 4]),
        )
    }

    fn children_with_values(
        locator: &mut ParentChildLocator<MockDocIterator>,
        values: &mut AddressedSortedNumericDocValues,
        parent: DocId,
    ) -> Vec<i64> {
        let mut collected = vec![];
        if let ChildLookup::FirstChild(_) = locator.advance_to_parent(parent, values).unwrap() {
            loop {
                for _ in 0..values.doc_value_count() {
                    collected.push(values.next_value().unwrap());
                }
                if !locator.advance_values_to_next_child(values).unwrap() {
                    break;
                }
            }
        }
        collected
    }

    #[test]
    fn test_children_of_each_parent() {
        let mut locator = locator();
        let mut values = values();
        assert_eq!(
            children_with_values(&mut locator, &mut values, 2),
            vec![10, 11, 20]
        );
        assert_eq!(children_with_values(&mut locator, &mut values, 5), vec![40]);
    }

    #[test]
    fn test_first_child_skips_children_without_value() {
        let mut locator = locator();
        let mut values = values();
        assert_eq!(
            locator.advance_to_parent(5, &mut values).unwrap(),
            ChildLookup::FirstChild(4)
        );
        assert!(!locator.advance_values_to_next_child(&mut values).unwrap());
    }

    #[test]
    fn test_parent_without_children() {
        let parents = FixedBitSet::from_docs(&[0, 1, 3], 4).unwrap();
        let mut locator =
            ParentChildLocator::new(Arc::new(parents), MockDocIterator::new(vec![2]));
        let mut values = values();
        assert_eq!(
            locator.advance_to_parent(0, &mut values).unwrap(),
            ChildLookup::NoChildWithValue
        );
        assert_eq!(
            locator.advance_to_parent(1, &mut values).unwrap(),
            ChildLookup::NoChildWithValue
        );
        // doc 2 has no value either
        assert_eq!(
            locator.advance_to_parent(3, &mut values).unwrap(),
            ChildLookup::NoChildWithValue
        );
    }

    #[test]
    fn test_max_children() {
        let parents = FixedBitSet::from_docs(&[2, 5], 6).unwrap();
        let mut locator = ParentChildLocator::with_max_children(
            Arc::new(parents),
            MockDocIterator::new(vec![0, 1, 3, 4]),
            1,
        );
        let mut values = values();
        assert_eq!(children_with_values(&mut locator, &mut values, 2), vec![10, 11]);
        // the next parent starts from its own first child
        assert_eq!(children_with_values(&mut locator, &mut values, 5), vec![40]);
    }

    #[test]
    #[should_panic]
    fn test_parents_in_reverse_order_panic() {
        let mut locator = locator();
        let mut values = values();
        locator.advance_to_parent(5, &mut values).unwrap();
        let _ = locator.advance_to_parent(2, &mut values);
    }
}

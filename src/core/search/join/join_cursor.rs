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
    DocValuesIterator, NumericDocValues, NumericDoubleValues, SortedDocValues,
    SortedNumericDocValues, SortedNumericDoubleValues,
};
use core::search::join::ParentChildLocator;
use core::search::sort_field::{MultiValueMode, MultiValuedCursor};
use core::search::DocIterator;
use core::util::DocId;

use error::ErrorKind::IllegalState;
use error::Result;

/// Per-parent values reduced from the values of the parent's children.
///
/// Asking again for the current parent returns the value already computed, the
/// children are only read once.
pub struct JoinCursor<V: MultiValuedCursor + ?Sized, I: DocIterator> {
    mode: MultiValueMode,
    values: Box<V>,
    locator: ParentChildLocator<I>,
    last_seen_parent: DocId,
    last_emitted_value: Option<V::Value>,
}

impl<V: MultiValuedCursor + ?Sized, I: DocIterator> JoinCursor<V, I> {
    pub fn new(mode: MultiValueMode, values: Box<V>, locator: ParentChildLocator<I>) -> Self {
        JoinCursor {
            mode,
            values,
            locator,
            last_seen_parent: -1,
            last_emitted_value: None,
        }
    }

    fn value(&self) -> Result<V::Value> {
        match self.last_emitted_value {
            Some(v) => Ok(v),
            None => bail!(IllegalState(format!(
                "parent doc {} has no value",
                self.last_seen_parent
            ))),
        }
    }
}

impl<V: MultiValuedCursor + ?Sized, I: DocIterator> DocValuesIterator for JoinCursor<V, I> {
    fn advance_exact(&mut self, parent: DocId) -> Result<bool> {
        if parent == self.last_seen_parent {
            return Ok(self.last_emitted_value.is_some());
        }
        assert!(
            parent > self.last_seen_parent,
            "parents must be visited in order: current={}, target={}",
            self.last_seen_parent,
            parent
        );
        self.last_seen_parent = parent;
        self.last_emitted_value =
            self.mode
                .pick_nested(&mut *self.values, &mut self.locator, parent)?;
        Ok(self.last_emitted_value.is_some())
    }
}

impl<I: DocIterator> NumericDocValues for JoinCursor<dyn SortedNumericDocValues, I> {
    fn long_value(&self) -> Result<i64> {
        self.value()
    }
}

impl<I: DocIterator> NumericDoubleValues for JoinCursor<dyn SortedNumericDoubleValues, I> {
    fn double_value(&self) -> Result<f64> {
        self.value()
    }
}

impl<I: DocIterator> SortedDocValues for JoinCursor<dyn SortedDocValues, I> {
    fn ord_value(&self) -> Result<i32> {
        self.value().map(|ord| ord as i32)
    }

    fn lookup_ord(&mut self, ord: i32) -> Result<Vec<u8>> {
        self.values.lookup_ord(ord)
    }

    fn value_count(&self) -> usize {
        self.values.value_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::codec::doc_values::sortable_long_bits_to_doubles;
    use core::index::reader::{LeafReader, MemoryLeafReader, MemoryLeafReaderBuilder};
    use core::util::bit_set::FixedBitSet;
    use core::util::doc_id_set::BitSetDocIterator;
    use core::util::NumericType;
    use std::sync::Arc;

    // parents {2, 5}, children 0, 1 | 3, 4
    fn reader() -> MemoryLeafReader {
        let mut builder = MemoryLeafReaderBuilder::new(6);
        builder
            .add_longs(
                "price",
                &[vec![4, 10], vec![7], vec![], vec![-3], vec![2, 9], vec![]],
            )
            .unwrap();
        builder
            .add_terms("tag", &[vec!["b", "d"], vec!["c"], vec![], vec![], vec![], vec![]])
            .unwrap();
        builder.add_nested("offers", &[2, 5], &[0, 1, 3, 4]).unwrap();
        builder.build()
    }

    fn locator(reader: &MemoryLeafReader) -> ParentChildLocator<Box<dyn DocIterator>> {
        ParentChildLocator::new(
            reader.parent_docs("offers").unwrap(),
            reader.child_docs("offers").unwrap().unwrap(),
        )
    }

    fn joined(mode: MultiValueMode) -> Vec<Option<i64>> {
        let reader = reader();
        let values = reader.get_sorted_numeric_doc_values("price").unwrap();
        let mut cursor = mode.select_nested(values, locator(&reader));
        [2, 5]
            .iter()
            .map(|&parent| {
                if cursor.advance_exact(parent).unwrap() {
                    Some(cursor.long_value().unwrap())
                } else {
                    None
                }
            })
            .collect()
    }

    #[test]
    fn test_join_longs() {
        // parent 2 joins [4, 10] and [7], parent 5 joins [-3] and [2, 9]
        assert_eq!(joined(MultiValueMode::Sum), vec![Some(21), Some(8)]);
        assert_eq!(joined(MultiValueMode::Avg), vec![Some(7), Some(3)]);
        // the first value of each child
        assert_eq!(joined(MultiValueMode::Min), vec![Some(4), Some(-3)]);
        // the last value of each child
        assert_eq!(joined(MultiValueMode::Max), vec![Some(10), Some(9)]);
        // median of [4, 10, 7] and [-3, 2, 9], in read order
        assert_eq!(joined(MultiValueMode::Median), vec![Some(10), Some(2)]);
    }

    #[test]
    fn test_parent_without_values() {
        let mut builder = MemoryLeafReaderBuilder::new(4);
        builder
            .add_doubles("score", &[vec![1.5], vec![], vec![], vec![]])
            .unwrap();
        builder.add_nested("offers", &[1, 3], &[0, 2]).unwrap();
        let reader = builder.build();
        let values = reader.get_sorted_numeric_doc_values("score").unwrap();
        let values = sortable_long_bits_to_doubles(values, NumericType::Double);
        let mut cursor = MultiValueMode::Max.select_double_nested(values, locator(&reader));
        assert!(cursor.advance_exact(1).unwrap());
        assert_eq!(cursor.double_value().unwrap(), 1.5);
        // child 2 exists but has no value
        assert!(!cursor.advance_exact(3).unwrap());
    }

    #[test]
    fn test_same_parent_returns_cached_value() {
        let parents = Arc::new(FixedBitSet::from_docs(&[2], 3).unwrap());
        let children = Arc::new(FixedBitSet::from_docs(&[0, 1], 3).unwrap());
        let mut builder = MemoryLeafReaderBuilder::new(3);
        builder
            .add_longs("price", &[vec![1], vec![2], vec![]])
            .unwrap();
        let reader = builder.build();
        let values = reader.get_sorted_numeric_doc_values("price").unwrap();
        let locator = ParentChildLocator::new(parents, BitSetDocIterator::with_bits(children));
        let mut cursor = MultiValueMode::Sum.select_nested(values, locator);
        assert!(cursor.advance_exact(2).unwrap());
        assert_eq!(cursor.long_value().unwrap(), 3);
        // children were consumed already, the cached sum is returned
        assert!(cursor.advance_exact(2).unwrap());
        assert_eq!(cursor.long_value().unwrap(), 3);
    }

    #[test]
    #[should_panic]
    fn test_parents_in_reverse_order_panic() {
        let reader = reader();
        let values = reader.get_sorted_numeric_doc_values("price").unwrap();
        let mut cursor = MultiValueMode::Sum.select_nested(values, locator(&reader));
        cursor.advance_exact(5).unwrap();
        let _ = cursor.advance_exact(2);
    }

    #[test]
    fn test_join_ords() {
        let reader = reader();
        let min = MultiValueMode::Min
            .select_ords_nested(
                reader.get_sorted_set_doc_values("tag").unwrap(),
                locator(&reader),
            )
            .unwrap();
        let max = MultiValueMode::Max
            .select_ords_nested(
                reader.get_sorted_set_doc_values("tag").unwrap(),
                locator(&reader),
            )
            .unwrap();
        for (mut cursor, expected) in vec![(min, b"b".to_vec()), (max, b"d".to_vec())] {
            assert!(cursor.advance_exact(2).unwrap());
            let ord = cursor.ord_value().unwrap();
            assert_eq!(cursor.lookup_ord(ord).unwrap(), expected);
            assert!(!cursor.advance_exact(5).unwrap());
        }
    }
}

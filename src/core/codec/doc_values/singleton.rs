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
    SortedNumericDocValues, SortedNumericDoubleValues, SortedSetDocValues, NO_MORE_ORDS,
};
use core::util::DocId;

use error::Result;

/// Exposes single valued numeric doc values as multi-valued ones with at most
/// one value per document.
///
/// `into_singleton` gives the wrapped values back, so consumers that can deal with
/// single values skip the wrapper entirely.
pub struct SingletonSortedNumericDocValues {
    values: Box<dyn NumericDocValues>,
    has_value: bool,
    consumed: bool,
}

impl SingletonSortedNumericDocValues {
    pub fn new(values: Box<dyn NumericDocValues>) -> Self {
        SingletonSortedNumericDocValues {
            values,
            has_value: false,
            consumed: false,
        }
    }
}

impl DocValuesIterator for SingletonSortedNumericDocValues {
    fn advance_exact(&mut self, target: DocId) -> Result<bool> {
        self.consumed = false;
        self.has_value = self.values.advance_exact(target)?;
        Ok(self.has_value)
    }
}

impl SortedNumericDocValues for SingletonSortedNumericDocValues {
    fn doc_value_count(&self) -> usize {
        self.has_value as usize
    }

    fn next_value(&mut self) -> Result<i64> {
        assert!(
            self.has_value && !self.consumed,
            "only one value per document"
        );
        self.consumed = true;
        self.values.long_value()
    }

    fn into_singleton(
        self: Box<Self>,
    ) -> ::std::result::Result<Box<dyn NumericDocValues>, Box<dyn SortedNumericDocValues>> {
        Ok(self.values)
    }
}

/// The floating point counterpart of `SingletonSortedNumericDocValues`.
pub struct SingletonSortedNumericDoubleValues {
    values: Box<dyn NumericDoubleValues>,
    has_value: bool,
    consumed: bool,
}

impl SingletonSortedNumericDoubleValues {
    pub fn new(values: Box<dyn NumericDoubleValues>) -> Self {
        SingletonSortedNumericDoubleValues {
            values,
            has_value: false,
            consumed: false,
        }
    }
}

impl DocValuesIterator for SingletonSortedNumericDoubleValues {
    fn advance_exact(&mut self, target: DocId) -> Result<bool> {
        self.consumed = false;
        self.has_value = self.values.advance_exact(target)?;
        Ok(self.has_value)
    }
}

impl SortedNumericDoubleValues for SingletonSortedNumericDoubleValues {
    fn doc_value_count(&self) -> usize {
        self.has_value as usize
    }

    fn next_value(&mut self) -> Result<f64> {
        assert!(
            self.has_value && !self.consumed,
            "only one value per document"
        );
        self.consumed = true;
        self.values.double_value()
    }

    fn into_singleton(
        self: Box<Self>,
    ) -> ::std::result::Result<Box<dyn NumericDoubleValues>, Box<dyn SortedNumericDoubleValues>>
    {
        Ok(self.values)
    }
}

/// Exposes sorted doc values as a sorted set with at most one ordinal per document.
pub struct SingletonSortedSetDocValues {
    values: Box<dyn SortedDocValues>,
    current_ord: i64,
}

impl SingletonSortedSetDocValues {
    pub fn new(values: Box<dyn SortedDocValues>) -> Self {
        SingletonSortedSetDocValues {
            values,
            current_ord: NO_MORE_ORDS,
        }
    }
}

impl DocValuesIterator for SingletonSortedSetDocValues {
    fn advance_exact(&mut self, target: DocId) -> Result<bool> {
        if self.values.advance_exact(target)? {
            self.current_ord = i64::from(self.values.ord_value()?);
            Ok(true)
        } else {
            self.current_ord = NO_MORE_ORDS;
            Ok(false)
        }
    }
}

impl SortedSetDocValues for SingletonSortedSetDocValues {
    fn next_ord(&mut self) -> Result<i64> {
        let ord = self.current_ord;
        self.current_ord = NO_MORE_ORDS;
        Ok(ord)
    }

    fn lookup_ord(&mut self, ord: i64) -> Result<Vec<u8>> {
        self.values.lookup_ord(ord as i32)
    }

    fn get_value_count(&self) -> usize {
        self.values.value_count()
    }

    fn lookup_term(&mut self, key: &[u8]) -> Result<i64> {
        self.values.lookup_term(key).map(i64::from)
    }

    fn into_singleton(
        self: Box<Self>,
    ) -> ::std::result::Result<Box<dyn SortedDocValues>, Box<dyn SortedSetDocValues>> {
        Ok(self.values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::codec::doc_values::memory::{MemoryNumericDocValues, MemorySortedDocValues};
    use core::codec::doc_values::SortableLongBitsToNumericDoubleValues;
    use core::util::bit_set::FixedBitSet;
    use core::util::{double2sortable_long, BitsRef, MatchAllBits, NumericType};
    use std::sync::Arc;

    fn numeric(values: Vec<i64>) -> Box<dyn NumericDocValues> {
        let len = values.len();
        let docs_with_field: BitsRef = Arc::new(MatchAllBits::new(len));
        Box::new(MemoryNumericDocValues::new(Arc::new(values), docs_with_field))
    }

    #[test]
    fn test_singleton_exposes_one_value() {
        let mut values = SingletonSortedNumericDocValues::new(numeric(vec![7, -3]));
        assert!(values.advance_exact(0).unwrap());
        assert_eq!(values.doc_value_count(), 1);
        assert_eq!(values.next_value().unwrap(), 7);
        assert!(values.advance_exact(1).unwrap());
        assert_eq!(values.next_value().unwrap(), -3);
        assert!(!values.advance_exact(2).unwrap());
    }

    #[test]
    #[should_panic]
    fn test_singleton_over_pull_panics() {
        let mut values = SingletonSortedNumericDocValues::new(numeric(vec![7]));
        assert!(values.advance_exact(0).unwrap());
        values.next_value().unwrap();
        let _ = values.next_value();
    }

    fn sparse_numeric(values: Vec<i64>, docs: &[DocId]) -> Box<dyn NumericDocValues> {
        let len = values.len();
        let docs_with_field: BitsRef = Arc::new(FixedBitSet::from_docs(docs, len).unwrap());
        Box::new(MemoryNumericDocValues::new(Arc::new(values), docs_with_field))
    }

    #[test]
    #[should_panic(expected = "only one value per document")]
    fn test_singleton_pull_without_value_panics() {
        // doc 0: [7], doc 1: []
        let mut values = SingletonSortedNumericDocValues::new(sparse_numeric(vec![7, 0], &[0]));
        assert!(values.advance_exact(0).unwrap());
        assert_eq!(values.doc_value_count(), 1);
        assert!(!values.advance_exact(1).unwrap());
        assert_eq!(values.doc_value_count(), 0);
        let _ = values.next_value();
    }

    #[test]
    #[should_panic(expected = "only one value per document")]
    fn test_double_singleton_pull_without_value_panics() {
        let doubles = SortableLongBitsToNumericDoubleValues::new(
            sparse_numeric(vec![double2sortable_long(1.5), 0], &[0]),
            NumericType::Double,
        );
        let mut values = SingletonSortedNumericDoubleValues::new(Box::new(doubles));
        assert!(values.advance_exact(0).unwrap());
        assert_eq!(values.next_value().unwrap(), 1.5);
        assert!(!values.advance_exact(1).unwrap());
        assert_eq!(values.doc_value_count(), 0);
        let _ = values.next_value();
    }

    #[test]
    fn test_unwrap_singleton() {
        let values: Box<dyn SortedNumericDocValues> =
            Box::new(SingletonSortedNumericDocValues::new(numeric(vec![4, 5])));
        let mut single = match values.into_singleton() {
            Ok(single) => single,
            Err(_) => panic!("singleton expected"),
        };
        assert!(single.advance_exact(1).unwrap());
        assert_eq!(single.long_value().unwrap(), 5);
    }

    #[test]
    fn test_singleton_sorted_set() {
        let terms = Arc::new(vec![b"apple".to_vec(), b"pear".to_vec()]);
        let ords = Arc::new(vec![1, -1, 0]);
        let mut values =
            SingletonSortedSetDocValues::new(Box::new(MemorySortedDocValues::new(terms, ords)));
        assert!(values.advance_exact(0).unwrap());
        assert_eq!(values.next_ord().unwrap(), 1);
        assert_eq!(values.next_ord().unwrap(), NO_MORE_ORDS);
        assert!(!values.advance_exact(1).unwrap());
        assert!(values.advance_exact(2).unwrap());
        assert_eq!(values.next_ord().unwrap(), 0);
        assert_eq!(values.lookup_ord(1).unwrap(), b"pear".to_vec());
        assert_eq!(values.lookup_term(b"banana").unwrap(), -2);
        assert_eq!(values.get_value_count(), 2);
    }
}

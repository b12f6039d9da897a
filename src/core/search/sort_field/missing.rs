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
};
use core::util::{DocId, Numeric, NumericType};

use error::Result;

/// What a document without value sorts as.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MissingValue {
    /// before every document with a value
    First,
    /// after every document with a value
    Last,
    Value(Numeric),
}

impl MissingValue {
    /// The value substituted for missing documents of a field of `numeric_type`,
    /// sorted in descending order when `reverse`.
    pub fn resolve(self, numeric_type: NumericType, reverse: bool) -> Numeric {
        match self {
            MissingValue::First if reverse => numeric_type.max_value(),
            MissingValue::First => numeric_type.min_value(),
            MissingValue::Last if reverse => numeric_type.min_value(),
            MissingValue::Last => numeric_type.max_value(),
            MissingValue::Value(value) => value,
        }
    }
}

/// Reports `missing` for documents without value, every document has a value.
pub struct ReplaceMissingNumeric {
    values: Box<dyn NumericDocValues>,
    missing: i64,
    has_value: bool,
}

impl ReplaceMissingNumeric {
    pub fn new(values: Box<dyn NumericDocValues>, missing: i64) -> Self {
        ReplaceMissingNumeric {
            values,
            missing,
            has_value: false,
        }
    }
}

impl DocValuesIterator for ReplaceMissingNumeric {
    fn advance_exact(&mut self, target: DocId) -> Result<bool> {
        self.has_value = self.values.advance_exact(target)?;
        Ok(true)
    }
}

impl NumericDocValues for ReplaceMissingNumeric {
    fn long_value(&self) -> Result<i64> {
        if self.has_value {
            self.values.long_value()
        } else {
            Ok(self.missing)
        }
    }
}

pub struct ReplaceMissingDouble {
    values: Box<dyn NumericDoubleValues>,
    missing: f64,
    has_value: bool,
}

impl ReplaceMissingDouble {
    pub fn new(values: Box<dyn NumericDoubleValues>, missing: f64) -> Self {
        ReplaceMissingDouble {
            values,
            missing,
            has_value: false,
        }
    }
}

impl DocValuesIterator for ReplaceMissingDouble {
    fn advance_exact(&mut self, target: DocId) -> Result<bool> {
        self.has_value = self.values.advance_exact(target)?;
        Ok(true)
    }
}

impl NumericDoubleValues for ReplaceMissingDouble {
    fn double_value(&self) -> Result<f64> {
        if self.has_value {
            self.values.double_value()
        } else {
            Ok(self.missing)
        }
    }
}

/// Gives documents without value the ordinal of the `missing` term.
///
/// When the term is not in the dictionary it is inserted at its sort position and
/// every ordinal after it shifts up by one.
pub struct ReplaceMissingOrds {
    values: Box<dyn SortedDocValues>,
    missing: Vec<u8>,
    substitute_ord: i32,
    exists: bool,
    has_value: bool,
}

impl ReplaceMissingOrds {
    pub fn new(mut values: Box<dyn SortedDocValues>, missing: Vec<u8>) -> Result<Self> {
        let ord = values.lookup_term(&missing)?;
        let (substitute_ord, exists) = if ord < 0 {
            (-ord - 1, false)
        } else {
            (ord, true)
        };
        Ok(ReplaceMissingOrds {
            values,
            missing,
            substitute_ord,
            exists,
            has_value: false,
        })
    }
}

impl DocValuesIterator for ReplaceMissingOrds {
    fn advance_exact(&mut self, target: DocId) -> Result<bool> {
        self.has_value = self.values.advance_exact(target)?;
        Ok(true)
    }
}

impl SortedDocValues for ReplaceMissingOrds {
    fn ord_value(&self) -> Result<i32> {
        if !self.has_value {
            return Ok(self.substitute_ord);
        }
        let ord = self.values.ord_value()?;
        if !self.exists && ord >= self.substitute_ord {
            Ok(ord + 1)
        } else {
            Ok(ord)
        }
    }

    fn lookup_ord(&mut self, ord: i32) -> Result<Vec<u8>> {
        if self.exists || ord < self.substitute_ord {
            self.values.lookup_ord(ord)
        } else if ord == self.substitute_ord {
            Ok(self.missing.clone())
        } else {
            self.values.lookup_ord(ord - 1)
        }
    }

    fn value_count(&self) -> usize {
        if self.exists {
            self.values.value_count()
        } else {
            self.values.value_count() + 1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::codec::doc_values::memory::{MemoryNumericDocValues, MemorySortedDocValues};
    use core::codec::doc_values::EmptyNumericDoubleValues;
    use core::util::bit_set::FixedBitSet;
    use std::sync::Arc;

    fn terms(docs: Vec<i32>) -> Box<dyn SortedDocValues> {
        let terms = vec![b"b".to_vec(), b"d".to_vec()];
        Box::new(MemorySortedDocValues::new(Arc::new(terms), Arc::new(docs)))
    }

    #[test]
    fn test_resolve_missing() {
        assert_eq!(
            MissingValue::Last.resolve(NumericType::Long, false),
            Numeric::Long(i64::max_value())
        );
        assert_eq!(
            MissingValue::Last.resolve(NumericType::Long, true),
            Numeric::Long(i64::min_value())
        );
        assert_eq!(
            MissingValue::First.resolve(NumericType::Double, false),
            Numeric::Double(::std::f64::NEG_INFINITY)
        );
        assert_eq!(
            MissingValue::First.resolve(NumericType::Int, true),
            Numeric::Int(i32::max_value())
        );
        assert_eq!(
            MissingValue::Value(Numeric::Long(-1)).resolve(NumericType::Long, true),
            Numeric::Long(-1)
        );
    }

    #[test]
    fn test_replace_missing_numeric() {
        let docs_with_field = Arc::new(FixedBitSet::from_docs(&[0], 2).unwrap());
        let values = MemoryNumericDocValues::new(Arc::new(vec![8, 0]), docs_with_field);
        let mut values = ReplaceMissingNumeric::new(Box::new(values), -1);
        assert!(values.advance_exact(0).unwrap());
        assert_eq!(values.long_value().unwrap(), 8);
        assert!(values.advance_exact(1).unwrap());
        assert_eq!(values.long_value().unwrap(), -1);
    }

    #[test]
    fn test_replace_missing_double() {
        let mut values =
            ReplaceMissingDouble::new(Box::new(EmptyNumericDoubleValues::default()), 2.5);
        for doc in 0..3 {
            assert!(values.advance_exact(doc).unwrap());
            assert_eq!(values.double_value().unwrap(), 2.5);
        }
    }

    #[test]
    fn test_replace_missing_ords_inserts_term() {
        // doc 0: "d", doc 1: missing, doc 2: "b"
        let mut values = ReplaceMissingOrds::new(terms(vec![1, -1, 0]), b"c".to_vec()).unwrap();
        assert_eq!(values.value_count(), 3);
        assert!(values.advance_exact(0).unwrap());
        assert_eq!(values.ord_value().unwrap(), 2);
        assert!(values.advance_exact(1).unwrap());
        assert_eq!(values.ord_value().unwrap(), 1);
        assert!(values.advance_exact(2).unwrap());
        assert_eq!(values.ord_value().unwrap(), 0);
        let all: Vec<Vec<u8>> = (0..3).map(|ord| values.lookup_ord(ord).unwrap()).collect();
        assert_eq!(all, vec![b"b".to_vec(), b"c".to_vec(), b"d".to_vec()]);
    }

    #[test]
    fn test_replace_missing_ords_reuses_existing_term() {
        let mut values = ReplaceMissingOrds::new(terms(vec![-1, 0]), b"d".to_vec()).unwrap();
        assert_eq!(values.value_count(), 2);
        assert!(values.advance_exact(0).unwrap());
        assert_eq!(values.ord_value().unwrap(), 1);
        assert!(values.advance_exact(1).unwrap());
        assert_eq!(values.ord_value().unwrap(), 0);
        assert_eq!(values.lookup_ord(1).unwrap(), b"d".to_vec());
    }
}

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
    DocValuesIterator, NumericDocValues, NumericDoubleValues, SingletonSortedNumericDoubleValues,
    SortedNumericDocValues, SortedNumericDoubleValues,
};
use core::util::{double2sortable_long, DocId, NumericType};

use error::Result;

/// Decodes the stored values of a numeric column to doubles.
///
/// Singleton values stay singletons, so that the single valued fast paths still
/// apply to the decoded view.
pub fn sortable_long_bits_to_doubles(
    values: Box<dyn SortedNumericDocValues>,
    numeric_type: NumericType,
) -> Box<dyn SortedNumericDoubleValues> {
    match values.into_singleton() {
        Ok(single) => Box::new(SingletonSortedNumericDoubleValues::new(Box::new(
            SortableLongBitsToNumericDoubleValues::new(single, numeric_type),
        ))),
        Err(values) => Box::new(SortableLongBitsToSortedNumericDoubleValues::new(
            values,
            numeric_type,
        )),
    }
}

/// Single valued double view over stored sortable bits.
pub struct SortableLongBitsToNumericDoubleValues {
    values: Box<dyn NumericDocValues>,
    numeric_type: NumericType,
}

impl SortableLongBitsToNumericDoubleValues {
    pub fn new(values: Box<dyn NumericDocValues>, numeric_type: NumericType) -> Self {
        SortableLongBitsToNumericDoubleValues {
            values,
            numeric_type,
        }
    }
}

impl DocValuesIterator for SortableLongBitsToNumericDoubleValues {
    fn advance_exact(&mut self, target: DocId) -> Result<bool> {
        self.values.advance_exact(target)
    }
}

impl NumericDoubleValues for SortableLongBitsToNumericDoubleValues {
    fn double_value(&self) -> Result<f64> {
        self.values
            .long_value()
            .map(|bits| self.numeric_type.from_sortable_bits(bits))
    }
}

/// Multi-valued double view over stored sortable bits. The encodings preserve
/// order, so the decoded values are still ascending.
pub struct SortableLongBitsToSortedNumericDoubleValues {
    values: Box<dyn SortedNumericDocValues>,
    numeric_type: NumericType,
}

impl SortableLongBitsToSortedNumericDoubleValues {
    pub fn new(values: Box<dyn SortedNumericDocValues>, numeric_type: NumericType) -> Self {
        SortableLongBitsToSortedNumericDoubleValues {
            values,
            numeric_type,
        }
    }
}

impl DocValuesIterator for SortableLongBitsToSortedNumericDoubleValues {
    fn advance_exact(&mut self, target: DocId) -> Result<bool> {
        self.values.advance_exact(target)
    }
}

impl SortedNumericDoubleValues for SortableLongBitsToSortedNumericDoubleValues {
    fn doc_value_count(&self) -> usize {
        self.values.doc_value_count()
    }

    fn next_value(&mut self) -> Result<f64> {
        let bits = self.values.next_value()?;
        Ok(self.numeric_type.from_sortable_bits(bits))
    }

    fn into_singleton(
        self: Box<Self>,
    ) -> ::std::result::Result<Box<dyn NumericDoubleValues>, Box<dyn SortedNumericDoubleValues>>
    {
        Err(self)
    }
}

/// Encodes selected doubles to sortable bits, for comparators working on
/// integer keys.
///
/// Always the 64 bit encoding: averages, sums and substituted missing values of a
/// float field are doubles that a float may not hold.
pub struct SortableLongBits {
    values: Box<dyn NumericDoubleValues>,
}

impl SortableLongBits {
    pub fn new(values: Box<dyn NumericDoubleValues>) -> Self {
        SortableLongBits { values }
    }
}

impl DocValuesIterator for SortableLongBits {
    fn advance_exact(&mut self, target: DocId) -> Result<bool> {
        self.values.advance_exact(target)
    }
}

impl NumericDocValues for SortableLongBits {
    fn long_value(&self) -> Result<i64> {
        self.values.double_value().map(double2sortable_long)
    }
}

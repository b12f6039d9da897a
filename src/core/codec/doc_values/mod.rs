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

mod singleton;

pub use self::singleton::*;

mod sortable;

pub use self::sortable::*;

pub mod memory;

use core::util::DocId;

use error::Result;

use std::cmp::Ordering;

/// When returned by next_ord() it means there are no more ordinals for the document.
pub const NO_MORE_ORDS: i64 = -1;

/// Base of every per-segment doc values cursor.
///
/// Cursors are forward only: `advance_exact` must be called with non-decreasing
/// targets. Advancing again to the current document is allowed and starts the
/// document's values over; advancing to a smaller document is a bug in the caller
/// and panics.
pub trait DocValuesIterator: Send {
    /// Advance the iterator to exactly `target` and return whether `target` has a value.
    fn advance_exact(&mut self, target: DocId) -> Result<bool>;
}

/// A per-document numeric value.
pub trait NumericDocValues: DocValuesIterator {
    /// value for the current document, only valid after `advance_exact` returned true
    fn long_value(&self) -> Result<i64>;
}

/// A per-document floating point value.
pub trait NumericDoubleValues: DocValuesIterator {
    /// value for the current document, only valid after `advance_exact` returned true
    fn double_value(&self) -> Result<f64>;
}

/// A list of per-document numeric values, sorted according to `i64::cmp`.
pub trait SortedNumericDocValues: DocValuesIterator {
    /// Retrieves the number of values for the current document. This must always
    /// be greater than zero.
    /// It is illegal to call this method after `advance_exact` returned false.
    fn doc_value_count(&self) -> usize;

    /// Iterates to the next value in the current document. Do not call this more than
    /// `doc_value_count` times for the document.
    fn next_value(&mut self) -> Result<i64>;

    /// Returns the single valued view these values were created from, or gives the
    /// values back unchanged if they are genuinely multi-valued.
    fn into_singleton(
        self: Box<Self>,
    ) -> ::std::result::Result<Box<dyn NumericDocValues>, Box<dyn SortedNumericDocValues>>;
}

/// A list of per-document floating point values, see `SortedNumericDocValues`.
///
/// Values are sorted for doubles read from a numeric column; derived sources such
/// as geo distances return them in the order they were computed.
pub trait SortedNumericDoubleValues: DocValuesIterator {
    fn doc_value_count(&self) -> usize;

    fn next_value(&mut self) -> Result<f64>;

    fn into_singleton(
        self: Box<Self>,
    ) -> ::std::result::Result<Box<dyn NumericDoubleValues>, Box<dyn SortedNumericDoubleValues>>;
}

/// A per-document ordinal into a sorted dictionary of terms.
pub trait SortedDocValues: DocValuesIterator {
    /// ordinal for the current document, only valid after `advance_exact` returned true
    fn ord_value(&self) -> Result<i32>;

    fn lookup_ord(&mut self, ord: i32) -> Result<Vec<u8>>;

    fn value_count(&self) -> usize;

    /// if key exists, return its ordinal, else return
    /// - insertion_point - 1.
    fn lookup_term(&mut self, key: &[u8]) -> Result<i32> {
        let mut low = 0;
        let mut high = self.value_count() as i32 - 1;
        while low <= high {
            let mid = low + (high - low) / 2;
            let term = self.lookup_ord(mid)?;
            match term.as_slice().cmp(key) {
                Ordering::Less => {
                    low = mid + 1;
                }
                Ordering::Greater => {
                    high = mid - 1;
                }
                Ordering::Equal => {
                    return Ok(mid);
                }
            }
        }
        Ok(-(low + 1)) // key not found
    }
}

/// A per-document set of ordinals into a sorted dictionary of terms.
pub trait SortedSetDocValues: DocValuesIterator {
    /// Returns the next ordinal for the current document (previously
    /// set by `advance_exact`), `NO_MORE_ORDS` once all were returned.
    fn next_ord(&mut self) -> Result<i64>;

    /// Retrieves the value for the specified ordinal.
    fn lookup_ord(&mut self, ord: i64) -> Result<Vec<u8>>;

    /// Returns the number of unique values.
    fn get_value_count(&self) -> usize;

    /// if `key` exists, returns its ordinal, else return `-insertion_point - 1`
    fn lookup_term(&mut self, key: &[u8]) -> Result<i64> {
        let mut low = 0_i64;
        let mut high = self.get_value_count() as i64 - 1;
        while low <= high {
            let mid = low + (high - low) / 2;
            let term = self.lookup_ord(mid)?;
            match term.as_slice().cmp(key) {
                Ordering::Less => {
                    low = mid + 1;
                }
                Ordering::Greater => {
                    high = mid - 1;
                }
                Ordering::Equal => {
                    return Ok(mid);
                }
            }
        }
        Ok(-(low + 1)) // key not found
    }

    fn into_singleton(
        self: Box<Self>,
    ) -> ::std::result::Result<Box<dyn SortedDocValues>, Box<dyn SortedSetDocValues>>;
}

#[inline]
pub(crate) fn check_forward(current: DocId, target: DocId) {
    assert!(
        target >= current,
        "doc values can only advance forward: current={}, target={}",
        current,
        target
    );
}

// Cursors without any value. They still remember the last target, an absent
// field is read under the same forward only contract as a present one.
macro_rules! empty_doc_values {
    ($($(#[$attr:meta])* $name:ident),* $(,)*) => {
        $(
            $(#[$attr])*
            pub struct $name {
                doc: DocId,
            }

            impl Default for $name {
                fn default() -> Self {
                    $name { doc: -1 }
                }
            }

            impl DocValuesIterator for $name {
                fn advance_exact(&mut self, target: DocId) -> Result<bool> {
                    check_forward(self.doc, target);
                    self.doc = target;
                    Ok(false)
                }
            }
        )*
    };
}

empty_doc_values!(
    /// a `NumericDocValues` without any value, for fields absent from a segment
    EmptyNumericDocValues,
    EmptyNumericDoubleValues,
    EmptySortedNumericDocValues,
    EmptySortedNumericDoubleValues,
    EmptySortedDocValues,
    EmptySortedSetDocValues,
);

impl NumericDocValues for EmptyNumericDocValues {
    fn long_value(&self) -> Result<i64> {
        unreachable!()
    }
}

impl NumericDoubleValues for EmptyNumericDoubleValues {
    fn double_value(&self) -> Result<f64> {
        unreachable!()
    }
}

impl SortedNumericDocValues for EmptySortedNumericDocValues {
    fn doc_value_count(&self) -> usize {
        0
    }

    fn next_value(&mut self) -> Result<i64> {
        unreachable!()
    }

    fn into_singleton(
        self: Box<Self>,
    ) -> ::std::result::Result<Box<dyn NumericDocValues>, Box<dyn SortedNumericDocValues>> {
        Err(self)
    }
}

impl SortedNumericDoubleValues for EmptySortedNumericDoubleValues {
    fn doc_value_count(&self) -> usize {
        0
    }

    fn next_value(&mut self) -> Result<f64> {
        unreachable!()
    }

    fn into_singleton(
        self: Box<Self>,
    ) -> ::std::result::Result<Box<dyn NumericDoubleValues>, Box<dyn SortedNumericDoubleValues>>
    {
        Err(self)
    }
}

impl SortedDocValues for EmptySortedDocValues {
    fn ord_value(&self) -> Result<i32> {
        Ok(-1)
    }

    fn lookup_ord(&mut self, _ord: i32) -> Result<Vec<u8>> {
        Ok(Vec::with_capacity(0))
    }

    fn value_count(&self) -> usize {
        0
    }
}

impl SortedSetDocValues for EmptySortedSetDocValues {
    fn next_ord(&mut self) -> Result<i64> {
        Ok(NO_MORE_ORDS)
    }

    fn lookup_ord(&mut self, _ord: i64) -> Result<Vec<u8>> {
        Ok(Vec::with_capacity(0))
    }

    fn get_value_count(&self) -> usize {
        0
    }

    fn lookup_term(&mut self, _key: &[u8]) -> Result<i64> {
        Ok(-1)
    }

    fn into_singleton(
        self: Box<Self>,
    ) -> ::std::result::Result<Box<dyn SortedDocValues>, Box<dyn SortedSetDocValues>> {
        Err(self)
    }
}

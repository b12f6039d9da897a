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

//! Doc values cursors over columns held in memory.
//!
//! Multi-valued columns use an addressed layout: all values of all documents in
//! one array, plus `max_doc + 1` offsets so that the values of document `d` are
//! `values[offsets[d]..offsets[d + 1]]`.

use core::codec::doc_values::{
    check_forward, DocValuesIterator, NumericDocValues, SortedDocValues, SortedNumericDocValues,
    SortedSetDocValues, NO_MORE_ORDS,
};
use core::util::{BitsRef, DocId};

use error::ErrorKind::IllegalState;
use error::Result;

use std::sync::Arc;

/// Single valued numeric column, `docs_with_field` tells documents without a
/// value apart from documents whose value is 0.
pub struct MemoryNumericDocValues {
    values: Arc<Vec<i64>>,
    docs_with_field: BitsRef,
    doc: DocId,
    exists: bool,
}

impl MemoryNumericDocValues {
    pub fn new(values: Arc<Vec<i64>>, docs_with_field: BitsRef) -> Self {
        debug_assert_eq!(values.len(), docs_with_field.len());
        MemoryNumericDocValues {
            values,
            docs_with_field,
            doc: -1,
            exists: false,
        }
    }
}

impl DocValuesIterator for MemoryNumericDocValues {
    fn advance_exact(&mut self, target: DocId) -> Result<bool> {
        check_forward(self.doc, target);
        self.doc = target;
        self.exists = (target as usize) < self.values.len()
            && self.docs_with_field.get(target as usize)?;
        Ok(self.exists)
    }
}

impl NumericDocValues for MemoryNumericDocValues {
    fn long_value(&self) -> Result<i64> {
        if !self.exists {
            bail!(IllegalState(format!("doc {} has no value", self.doc)));
        }
        Ok(self.values[self.doc as usize])
    }
}

/// Multi-valued numeric column in addressed layout.
pub struct AddressedSortedNumericDocValues {
    values: Arc<Vec<i64>>,
    offsets: Arc<Vec<usize>>,
    doc: DocId,
    start_offset: usize,
    end_offset: usize,
    upto: usize,
}

impl AddressedSortedNumericDocValues {
    pub fn new(values: Arc<Vec<i64>>, offsets: Arc<Vec<usize>>) -> Self {
        debug_assert!(!offsets.is_empty());
        AddressedSortedNumericDocValues {
            values,
            offsets,
            doc: -1,
            start_offset: 0,
            end_offset: 0,
            upto: 0,
        }
    }
}

impl DocValuesIterator for AddressedSortedNumericDocValues {
    fn advance_exact(&mut self, target: DocId) -> Result<bool> {
        check_forward(self.doc, target);
        self.doc = target;
        let doc = target as usize;
        if doc + 1 >= self.offsets.len() {
            self.start_offset = 0;
            self.end_offset = 0;
        } else {
            self.start_offset = self.offsets[doc];
            self.end_offset = self.offsets[doc + 1];
        }
        self.upto = self.start_offset;
        Ok(self.end_offset > self.start_offset)
    }
}

impl SortedNumericDocValues for AddressedSortedNumericDocValues {
    fn doc_value_count(&self) -> usize {
        self.end_offset - self.start_offset
    }

    fn next_value(&mut self) -> Result<i64> {
        assert!(
            self.upto < self.end_offset,
            "doc {} has only {} values",
            self.doc,
            self.doc_value_count()
        );
        let value = self.values[self.upto];
        self.upto += 1;
        Ok(value)
    }

    fn into_singleton(
        self: Box<Self>,
    ) -> ::std::result::Result<Box<dyn NumericDocValues>, Box<dyn SortedNumericDocValues>> {
        Err(self)
    }
}

/// Single valued terms column: one ordinal per document, -1 when missing.
pub struct MemorySortedDocValues {
    terms: Arc<Vec<Vec<u8>>>,
    ords: Arc<Vec<i32>>,
    doc: DocId,
    ord: i32,
}

impl MemorySortedDocValues {
    pub fn new(terms: Arc<Vec<Vec<u8>>>, ords: Arc<Vec<i32>>) -> Self {
        MemorySortedDocValues {
            terms,
            ords,
            doc: -1,
            ord: -1,
        }
    }
}

impl DocValuesIterator for MemorySortedDocValues {
    fn advance_exact(&mut self, target: DocId) -> Result<bool> {
        check_forward(self.doc, target);
        self.doc = target;
        self.ord = self.ords.get(target as usize).cloned().unwrap_or(-1);
        Ok(self.ord >= 0)
    }
}

impl SortedDocValues for MemorySortedDocValues {
    fn ord_value(&self) -> Result<i32> {
        Ok(self.ord)
    }

    fn lookup_ord(&mut self, ord: i32) -> Result<Vec<u8>> {
        Ok(self.terms[ord as usize].clone())
    }

    fn value_count(&self) -> usize {
        self.terms.len()
    }
}

/// Multi-valued terms column: addressed ordinals, ascending per document.
pub struct AddressedSortedSetDocValues {
    terms: Arc<Vec<Vec<u8>>>,
    ords: Arc<Vec<i64>>,
    offsets: Arc<Vec<usize>>,
    doc: DocId,
    upto: usize,
    end_offset: usize,
}

impl AddressedSortedSetDocValues {
    pub fn new(terms: Arc<Vec<Vec<u8>>>, ords: Arc<Vec<i64>>, offsets: Arc<Vec<usize>>) -> Self {
        AddressedSortedSetDocValues {
            terms,
            ords,
            offsets,
            doc: -1,
            upto: 0,
            end_offset: 0,
        }
    }
}

impl DocValuesIterator for AddressedSortedSetDocValues {
    fn advance_exact(&mut self, target: DocId) -> Result<bool> {
        check_forward(self.doc, target);
        self.doc = target;
        let doc = target as usize;
        if doc + 1 >= self.offsets.len() {
            self.upto = 0;
            self.end_offset = 0;
        } else {
            self.upto = self.offsets[doc];
            self.end_offset = self.offsets[doc + 1];
        }
        Ok(self.end_offset > self.upto)
    }
}

impl SortedSetDocValues for AddressedSortedSetDocValues {
    fn next_ord(&mut self) -> Result<i64> {
        if self.upto == self.end_offset {
            return Ok(NO_MORE_ORDS);
        }
        let ord = self.ords[self.upto];
        self.upto += 1;
        Ok(ord)
    }

    fn lookup_ord(&mut self, ord: i64) -> Result<Vec<u8>> {
        Ok(self.terms[ord as usize].clone())
    }

    fn get_value_count(&self) -> usize {
        self.terms.len()
    }

    fn into_singleton(
        self: Box<Self>,
    ) -> ::std::result::Result<Box<dyn SortedDocValues>, Box<dyn SortedSetDocValues>> {
        Err(self)
    }
}

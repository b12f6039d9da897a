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

use core::codec::doc_values::memory::{
    AddressedSortedNumericDocValues, AddressedSortedSetDocValues, MemoryNumericDocValues,
    MemorySortedDocValues,
};
use core::codec::doc_values::{
    EmptyNumericDocValues, EmptySortedDocValues, EmptySortedNumericDocValues,
    EmptySortedSetDocValues, NumericDocValues, SingletonSortedNumericDocValues,
    SingletonSortedSetDocValues, SortedDocValues, SortedNumericDocValues, SortedSetDocValues,
};
use core::index::reader::LeafReader;
use core::index::{DocValuesType, FieldInfo, ValueType};
use core::search::{DocIterator, EmptyDocIterator};
use core::util::bit_set::{BitSet, BitSetIterator, FixedBitSet, ImmutableBitSet};
use core::util::doc_id_set::BitSetDocIterator;
use core::util::geo::GeoPoint;
use core::util::{double2sortable_long, float2sortable_int, Bits, BitsRef, DocId, NumericType};

use error::ErrorKind::IllegalArgument;
use error::Result;

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

enum Column {
    Numeric {
        values: Arc<Vec<i64>>,
        docs_with_field: Arc<FixedBitSet>,
    },
    SortedNumeric {
        values: Arc<Vec<i64>>,
        offsets: Arc<Vec<usize>>,
    },
    Sorted {
        terms: Arc<Vec<Vec<u8>>>,
        ords: Arc<Vec<i32>>,
    },
    SortedSet {
        terms: Arc<Vec<Vec<u8>>>,
        ords: Arc<Vec<i64>>,
        offsets: Arc<Vec<usize>>,
    },
}

struct NestedDocs {
    parents: Arc<FixedBitSet>,
    children: Arc<FixedBitSet>,
}

/// A segment held entirely in memory.
///
/// Built with `MemoryLeafReaderBuilder`; every column is shared between the cursors
/// handed out, so getting values is cheap.
pub struct MemoryLeafReader {
    max_doc: DocId,
    field_infos: HashMap<String, FieldInfo>,
    columns: HashMap<String, Column>,
    nested: HashMap<String, NestedDocs>,
}

impl MemoryLeafReader {
    fn column(&self, field: &str, expected: DocValuesType) -> Result<Option<&Column>> {
        match self.field_infos.get(field) {
            None => Ok(None),
            Some(info) => {
                if info.doc_values_type != expected
                    && !is_singleton_of(info.doc_values_type, expected)
                {
                    bail!(IllegalArgument(format!(
                        "{:?} dv found for field {}, expected {:?}",
                        info.doc_values_type, field, expected
                    )));
                }
                Ok(self.columns.get(field))
            }
        }
    }
}

// multi-valued cursors can be served from single valued columns
fn is_singleton_of(actual: DocValuesType, expected: DocValuesType) -> bool {
    match (actual, expected) {
        (DocValuesType::Numeric, DocValuesType::SortedNumeric)
        | (DocValuesType::Sorted, DocValuesType::SortedSet) => true,
        _ => false,
    }
}

impl LeafReader for MemoryLeafReader {
    fn max_doc(&self) -> DocId {
        self.max_doc
    }

    fn field_info(&self, field: &str) -> Option<&FieldInfo> {
        self.field_infos.get(field)
    }

    fn get_numeric_doc_values(&self, field: &str) -> Result<Box<dyn NumericDocValues>> {
        match self.column(field, DocValuesType::Numeric)? {
            Some(Column::Numeric {
                values,
                docs_with_field,
            }) => {
                let docs_with_field: BitsRef = docs_with_field.clone();
                Ok(Box::new(MemoryNumericDocValues::new(
                    Arc::clone(values),
                    docs_with_field,
                )))
            }
            _ => Ok(Box::new(EmptyNumericDocValues::default())),
        }
    }

    fn get_sorted_numeric_doc_values(
        &self,
        field: &str,
    ) -> Result<Box<dyn SortedNumericDocValues>> {
        match self.column(field, DocValuesType::SortedNumeric)? {
            Some(Column::SortedNumeric { values, offsets }) => Ok(Box::new(
                AddressedSortedNumericDocValues::new(Arc::clone(values), Arc::clone(offsets)),
            )),
            Some(Column::Numeric { .. }) => {
                let single = self.get_numeric_doc_values(field)?;
                Ok(Box::new(SingletonSortedNumericDocValues::new(single)))
            }
            _ => Ok(Box::new(EmptySortedNumericDocValues::default())),
        }
    }

    fn get_sorted_doc_values(&self, field: &str) -> Result<Box<dyn SortedDocValues>> {
        match self.column(field, DocValuesType::Sorted)? {
            Some(Column::Sorted { terms, ords }) => Ok(Box::new(MemorySortedDocValues::new(
                Arc::clone(terms),
                Arc::clone(ords),
            ))),
            _ => Ok(Box::new(EmptySortedDocValues::default())),
        }
    }

    fn get_sorted_set_doc_values(&self, field: &str) -> Result<Box<dyn SortedSetDocValues>> {
        match self.column(field, DocValuesType::SortedSet)? {
            Some(Column::SortedSet {
                terms,
                ords,
                offsets,
            }) => Ok(Box::new(AddressedSortedSetDocValues::new(
                Arc::clone(terms),
                Arc::clone(ords),
                Arc::clone(offsets),
            ))),
            Some(Column::Sorted { .. }) => {
                let single = self.get_sorted_doc_values(field)?;
                Ok(Box::new(SingletonSortedSetDocValues::new(single)))
            }
            _ => Ok(Box::new(EmptySortedSetDocValues::default())),
        }
    }

    fn parent_docs(&self, path: &str) -> Option<Arc<FixedBitSet>> {
        self.nested.get(path).map(|n| Arc::clone(&n.parents))
    }

    fn child_docs(&self, path: &str) -> Result<Option<Box<dyn DocIterator>>> {
        Ok(self.nested.get(path).map(|n| -> Box<dyn DocIterator> {
            if n.children.cardinality() == 0 {
                Box::new(EmptyDocIterator::default())
            } else {
                Box::new(BitSetDocIterator::with_bits(Arc::clone(&n.children)))
            }
        }))
    }
}

/// Collects per-document values field by field, then freezes them into a
/// `MemoryLeafReader`.
///
/// Every `add_*` call takes one entry per document of the segment; an empty entry
/// means the document has no value. Fields where no document holds more than one
/// value are stored single valued.
pub struct MemoryLeafReaderBuilder {
    max_doc: DocId,
    field_infos: HashMap<String, FieldInfo>,
    columns: HashMap<String, Column>,
    nested: HashMap<String, NestedDocs>,
}

impl MemoryLeafReaderBuilder {
    pub fn new(max_doc: DocId) -> Self {
        assert!(max_doc >= 0);
        MemoryLeafReaderBuilder {
            max_doc,
            field_infos: HashMap::new(),
            columns: HashMap::new(),
            nested: HashMap::new(),
        }
    }

    pub fn add_longs(&mut self, field: &str, docs: &[Vec<i64>]) -> Result<()> {
        self.add_numeric(field, ValueType::Numeric(NumericType::Long), docs, |v| *v)
    }

    pub fn add_ints(&mut self, field: &str, docs: &[Vec<i32>]) -> Result<()> {
        self.add_numeric(field, ValueType::Numeric(NumericType::Int), docs, |v| {
            i64::from(*v)
        })
    }

    pub fn add_doubles(&mut self, field: &str, docs: &[Vec<f64>]) -> Result<()> {
        self.add_numeric(field, ValueType::Numeric(NumericType::Double), docs, |v| {
            double2sortable_long(*v)
        })
    }

    pub fn add_floats(&mut self, field: &str, docs: &[Vec<f32>]) -> Result<()> {
        self.add_numeric(field, ValueType::Numeric(NumericType::Float), docs, |v| {
            i64::from(float2sortable_int(*v))
        })
    }

    pub fn add_geo_points(&mut self, field: &str, docs: &[Vec<GeoPoint>]) -> Result<()> {
        for point in docs.iter().flat_map(|d| d.iter()) {
            // re-validates points built by hand
            GeoPoint::new(point.lat, point.lon)?;
        }
        self.add_numeric(field, ValueType::GeoPoint, docs, GeoPoint::pack)
    }

    /// Adds a keyword field. Duplicate terms of a document collapse into one.
    pub fn add_terms<S: AsRef<[u8]>>(&mut self, field: &str, docs: &[Vec<S>]) -> Result<()> {
        self.check_new_field(field, docs.len())?;
        let dictionary: BTreeSet<&[u8]> = docs
            .iter()
            .flat_map(|d| d.iter().map(|t| t.as_ref()))
            .collect();
        let terms: Vec<Vec<u8>> = dictionary.iter().map(|t| t.to_vec()).collect();
        let mut doc_ords: Vec<Vec<i64>> = Vec::with_capacity(docs.len());
        for doc in docs {
            let mut ords: Vec<i64> = doc
                .iter()
                .map(|t| {
                    terms
                        .binary_search_by(|probe| probe.as_slice().cmp(t.as_ref()))
                        .map(|ord| ord as i64)
                        .unwrap_or(-1)
                })
                .collect();
            ords.sort();
            ords.dedup();
            doc_ords.push(ords);
        }

        let terms = Arc::new(terms);
        let (doc_values_type, column) = if doc_ords.iter().all(|o| o.len() <= 1) {
            let ords = doc_ords
                .iter()
                .map(|o| o.first().map(|ord| *ord as i32).unwrap_or(-1))
                .collect();
            (
                DocValuesType::Sorted,
                Column::Sorted {
                    terms,
                    ords: Arc::new(ords),
                },
            )
        } else {
            let (ords, offsets) = addressed(&doc_ords);
            (
                DocValuesType::SortedSet,
                Column::SortedSet {
                    terms,
                    ords: Arc::new(ords),
                    offsets: Arc::new(offsets),
                },
            )
        };
        self.insert(field, doc_values_type, ValueType::Keyword, column);
        Ok(())
    }

    /// Declares the nested documents under `path`. Every nested document belongs to
    /// the first parent after it, so the last document of a block is always a parent.
    pub fn add_nested(&mut self, path: &str, parents: &[DocId], children: &[DocId]) -> Result<()> {
        if path.is_empty() {
            bail!(IllegalArgument("nested path must not be empty".into()));
        }
        if self.nested.contains_key(path) {
            bail!(IllegalArgument(format!(
                "nested path '{}' already added",
                path
            )));
        }
        let num_bits = self.max_doc as usize;
        let parents = FixedBitSet::from_docs(parents, num_bits)?;
        let children = FixedBitSet::from_docs(children, num_bits)?;
        let last_parent = if num_bits == 0 {
            -1
        } else {
            parents.prev_set_bit(num_bits - 1)
        };
        for child in BitSetIterator::new(&children) {
            if parents.get(child as usize)? {
                bail!(IllegalArgument(format!(
                    "doc {} can't be both a parent and a child of '{}'",
                    child, path
                )));
            }
            if child > last_parent {
                bail!(IllegalArgument(format!(
                    "nested doc {} of '{}' has no parent after it",
                    child, path
                )));
            }
        }
        self.nested.insert(
            path.to_string(),
            NestedDocs {
                parents: Arc::new(parents),
                children: Arc::new(children),
            },
        );
        Ok(())
    }

    pub fn build(self) -> MemoryLeafReader {
        MemoryLeafReader {
            max_doc: self.max_doc,
            field_infos: self.field_infos,
            columns: self.columns,
            nested: self.nested,
        }
    }

    fn add_numeric<T, F>(
        &mut self,
        field: &str,
        value_type: ValueType,
        docs: &[Vec<T>],
        encode: F,
    ) -> Result<()>
    where
        F: Fn(&T) -> i64,
    {
        self.check_new_field(field, docs.len())?;
        let mut doc_values: Vec<Vec<i64>> = docs
            .iter()
            .map(|d| d.iter().map(&encode).collect())
            .collect();
        for values in &mut doc_values {
            values.sort();
        }

        let (doc_values_type, column) = if doc_values.iter().all(|v| v.len() <= 1) {
            let mut docs_with_field = FixedBitSet::new(doc_values.len());
            let mut values = Vec::with_capacity(doc_values.len());
            for (doc, v) in doc_values.iter().enumerate() {
                if let Some(value) = v.first() {
                    docs_with_field.set(doc);
                    values.push(*value);
                } else {
                    values.push(0);
                }
            }
            (
                DocValuesType::Numeric,
                Column::Numeric {
                    values: Arc::new(values),
                    docs_with_field: Arc::new(docs_with_field),
                },
            )
        } else {
            let (values, offsets) = addressed(&doc_values);
            (
                DocValuesType::SortedNumeric,
                Column::SortedNumeric {
                    values: Arc::new(values),
                    offsets: Arc::new(offsets),
                },
            )
        };
        self.insert(field, doc_values_type, value_type, column);
        Ok(())
    }

    fn check_new_field(&self, field: &str, num_docs: usize) -> Result<()> {
        if self.field_infos.contains_key(field) {
            bail!(IllegalArgument(format!("field '{}' already added", field)));
        }
        if num_docs != self.max_doc as usize {
            bail!(IllegalArgument(format!(
                "field '{}' has values for {} docs, but the segment has {}",
                field, num_docs, self.max_doc
            )));
        }
        Ok(())
    }

    fn insert(
        &mut self,
        field: &str,
        doc_values_type: DocValuesType,
        value_type: ValueType,
        column: Column,
    ) {
        let number = self.field_infos.len() as i32;
        self.field_infos.insert(
            field.to_string(),
            FieldInfo::new(field.to_string(), number, doc_values_type, value_type),
        );
        self.columns.insert(field.to_string(), column);
    }
}

fn addressed(docs: &[Vec<i64>]) -> (Vec<i64>, Vec<usize>) {
    let mut values = Vec::with_capacity(docs.iter().map(|d| d.len()).sum());
    let mut offsets = Vec::with_capacity(docs.len() + 1);
    offsets.push(0);
    for doc in docs {
        values.extend_from_slice(doc);
        offsets.push(values.len());
    }
    (values, offsets)
}

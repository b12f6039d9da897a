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
use core::search::join::{ChildLookup, JoinCursor, ParentChildLocator};
use core::search::DocIterator;
use core::util::DocId;

use error::ErrorKind::{IllegalArgument, IllegalState};
use error::Result;

use num_traits::Zero;
use smallvec::SmallVec;

use std::fmt;
use std::str::FromStr;

/// Defines what value to pick when a document has more than one value for a field,
/// or when the values of several nested documents are joined onto their parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MultiValueMode {
    /// Pick the sum of all the values.
    Sum,
    /// Pick the average of all the values.
    Avg,
    /// Pick the lowest value.
    Min,
    /// Pick the highest value.
    Max,
    /// Pick the median of the values, in the order they are read.
    Median,
}

impl FromStr for MultiValueMode {
    type Err = ::error::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "sum" => Ok(MultiValueMode::Sum),
            "avg" => Ok(MultiValueMode::Avg),
            "min" => Ok(MultiValueMode::Min),
            "max" => Ok(MultiValueMode::Max),
            "median" => Ok(MultiValueMode::Median),
            _ => bail!(IllegalArgument(format!("Unknown MultiValueMode [{}]", s))),
        }
    }
}

impl fmt::Display for MultiValueMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match *self {
            MultiValueMode::Sum => "sum",
            MultiValueMode::Avg => "avg",
            MultiValueMode::Min => "min",
            MultiValueMode::Max => "max",
            MultiValueMode::Median => "median",
        };
        f.write_str(name)
    }
}

/// Arithmetic needed to reduce values of one type.
pub trait SelectValue: Copy + PartialOrd + Zero + Send + 'static {
    fn accumulate(self, other: Self) -> Self;

    fn average(total: Self, count: usize) -> Self;

    fn midpoint(a: Self, b: Self) -> Self;

    /// start value of a minimum, above every value
    fn min_seed() -> Self;

    /// start value of a maximum, below every value
    fn max_seed() -> Self;
}

// rounds half up, like `Math.round`
#[inline]
fn round(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

impl SelectValue for i64 {
    fn accumulate(self, other: i64) -> i64 {
        self.wrapping_add(other)
    }

    fn average(total: i64, count: usize) -> i64 {
        round(total as f64 / count as f64)
    }

    fn midpoint(a: i64, b: i64) -> i64 {
        round((a as f64 + b as f64) / 2.0)
    }

    fn min_seed() -> i64 {
        i64::max_value()
    }

    fn max_seed() -> i64 {
        i64::min_value()
    }
}

impl SelectValue for f64 {
    fn accumulate(self, other: f64) -> f64 {
        self + other
    }

    fn average(total: f64, count: usize) -> f64 {
        total / count as f64
    }

    fn midpoint(a: f64, b: f64) -> f64 {
        (a + b) / 2.0
    }

    fn min_seed() -> f64 {
        ::std::f64::INFINITY
    }

    fn max_seed() -> f64 {
        ::std::f64::NEG_INFINITY
    }
}

/// The values of the current document, as seen by `MultiValueMode`.
pub trait MultiValuedCursor: DocValuesIterator {
    type Value: SelectValue;

    fn num_values(&self) -> usize;

    fn pull_value(&mut self) -> Result<Self::Value>;
}

impl MultiValuedCursor for dyn SortedNumericDocValues {
    type Value = i64;

    fn num_values(&self) -> usize {
        self.doc_value_count()
    }

    fn pull_value(&mut self) -> Result<i64> {
        self.next_value()
    }
}

impl MultiValuedCursor for dyn SortedNumericDoubleValues {
    type Value = f64;

    fn num_values(&self) -> usize {
        self.doc_value_count()
    }

    fn pull_value(&mut self) -> Result<f64> {
        self.next_value()
    }
}

/// A single ordinal per document, so that ordinals selected per nested document
/// can be joined.
impl MultiValuedCursor for dyn SortedDocValues {
    type Value = i64;

    fn num_values(&self) -> usize {
        1
    }

    fn pull_value(&mut self) -> Result<i64> {
        self.ord_value().map(i64::from)
    }
}

fn median<V, F>(count: usize, mut next: F) -> Result<V>
where
    V: SelectValue,
    F: FnMut() -> Result<V>,
{
    debug_assert!(count > 0);
    for _ in 0..(count - 1) / 2 {
        next()?;
    }
    if count % 2 == 0 {
        let a = next()?;
        let b = next()?;
        Ok(V::midpoint(a, b))
    } else {
        next()
    }
}

impl MultiValueMode {
    /// Whether this mode can pick among ordinals, which only have an order.
    pub fn supports_ords(self) -> bool {
        match self {
            MultiValueMode::Min | MultiValueMode::Max => true,
            _ => false,
        }
    }

    fn check_ords(self) -> Result<()> {
        if !self.supports_ords() {
            bail!(IllegalArgument(format!(
                "Unsupported sort mode [{}] for ordinals, only min and max are allowed",
                self
            )));
        }
        Ok(())
    }

    /// Reduces the values of the document `values` is positioned on, which must
    /// have at least one value.
    ///
    /// MIN and MAX take the first and last value, which are only the smallest and
    /// largest for sources delivering ascending values. Geo distances are not.
    pub fn pick<C: MultiValuedCursor + ?Sized>(self, values: &mut C) -> Result<C::Value> {
        let count = values.num_values();
        debug_assert!(count > 0);
        match self {
            MultiValueMode::Sum | MultiValueMode::Avg => {
                let mut total = C::Value::zero();
                for _ in 0..count {
                    total = total.accumulate(values.pull_value()?);
                }
                if self == MultiValueMode::Avg && count > 1 {
                    Ok(C::Value::average(total, count))
                } else {
                    Ok(total)
                }
            }
            MultiValueMode::Min => values.pull_value(),
            MultiValueMode::Max => {
                for _ in 1..count {
                    values.pull_value()?;
                }
                values.pull_value()
            }
            MultiValueMode::Median => median(count, || values.pull_value()),
        }
    }

    /// Reduces the values of all children of `parent`, `None` when no child has a
    /// value.
    ///
    /// MIN and MAX look at the first and last value of every child only, the
    /// others at every value in the order the children are read.
    pub fn pick_nested<C, I>(
        self,
        values: &mut C,
        locator: &mut ParentChildLocator<I>,
        parent: DocId,
    ) -> Result<Option<C::Value>>
    where
        C: MultiValuedCursor + ?Sized,
        I: DocIterator,
    {
        if let ChildLookup::NoChildWithValue = locator.advance_to_parent(parent, values)? {
            return Ok(None);
        }
        let value = match self {
            MultiValueMode::Sum | MultiValueMode::Avg => {
                let mut total = C::Value::zero();
                let mut total_count = 0;
                loop {
                    let count = values.num_values();
                    for _ in 0..count {
                        total = total.accumulate(values.pull_value()?);
                    }
                    total_count += count;
                    if !locator.advance_values_to_next_child(values)? {
                        break;
                    }
                }
                if self == MultiValueMode::Avg && total_count > 1 {
                    C::Value::average(total, total_count)
                } else {
                    total
                }
            }
            MultiValueMode::Min => {
                let mut min = C::Value::min_seed();
                loop {
                    let value = values.pull_value()?;
                    if value < min {
                        min = value;
                    }
                    if !locator.advance_values_to_next_child(values)? {
                        break;
                    }
                }
                min
            }
            MultiValueMode::Max => {
                let mut max = C::Value::max_seed();
                loop {
                    for _ in 1..values.num_values() {
                        values.pull_value()?;
                    }
                    let value = values.pull_value()?;
                    if value > max {
                        max = value;
                    }
                    if !locator.advance_values_to_next_child(values)? {
                        break;
                    }
                }
                max
            }
            MultiValueMode::Median => {
                let mut buffer: SmallVec<[C::Value; 16]> = SmallVec::new();
                loop {
                    for _ in 0..values.num_values() {
                        buffer.push(values.pull_value()?);
                    }
                    if !locator.advance_values_to_next_child(values)? {
                        break;
                    }
                }
                let mut iter = buffer.iter();
                median(buffer.len(), || match iter.next() {
                    Some(v) => Ok(*v),
                    None => bail!(IllegalState("median ran out of values".into())),
                })?
            }
        };
        Ok(Some(value))
    }

    /// One value per document. Single valued fields are returned as is since every
    /// mode picks their only value.
    pub fn select(self, values: Box<dyn SortedNumericDocValues>) -> Box<dyn NumericDocValues> {
        match values.into_singleton() {
            Ok(single) => single,
            Err(values) => Box::new(SelectedValues::new(self, values)),
        }
    }

    pub fn select_double(
        self,
        values: Box<dyn SortedNumericDoubleValues>,
    ) -> Box<dyn NumericDoubleValues> {
        match values.into_singleton() {
            Ok(single) => single,
            Err(values) => Box::new(SelectedValues::new(self, values)),
        }
    }

    /// One ordinal per document, only `Min` and `Max` are supported.
    pub fn select_ords(self, values: Box<dyn SortedSetDocValues>) -> Result<Box<dyn SortedDocValues>> {
        self.check_ords()?;
        Ok(match values.into_singleton() {
            Ok(single) => single,
            Err(values) => Box::new(SelectedOrds::new(self, values)),
        })
    }

    /// One value per parent, joined from the values of its children.
    pub fn select_nested<I: DocIterator + 'static>(
        self,
        values: Box<dyn SortedNumericDocValues>,
        locator: ParentChildLocator<I>,
    ) -> Box<dyn NumericDocValues> {
        Box::new(JoinCursor::new(self, values, locator))
    }

    pub fn select_double_nested<I: DocIterator + 'static>(
        self,
        values: Box<dyn SortedNumericDoubleValues>,
        locator: ParentChildLocator<I>,
    ) -> Box<dyn NumericDoubleValues> {
        Box::new(JoinCursor::new(self, values, locator))
    }

    /// Picks one ordinal per child, then the lowest or highest of those.
    pub fn select_ords_nested<I: DocIterator + 'static>(
        self,
        values: Box<dyn SortedSetDocValues>,
        locator: ParentChildLocator<I>,
    ) -> Result<Box<dyn SortedDocValues>> {
        let per_child = self.select_ords(values)?;
        Ok(Box::new(JoinCursor::new(self, per_child, locator)))
    }
}

/// The value `MultiValueMode` picks for every document of a multi-valued cursor.
pub struct SelectedValues<V: MultiValuedCursor + ?Sized> {
    mode: MultiValueMode,
    values: Box<V>,
    doc: DocId,
    value: Option<V::Value>,
}

impl<V: MultiValuedCursor + ?Sized> SelectedValues<V> {
    pub fn new(mode: MultiValueMode, values: Box<V>) -> Self {
        SelectedValues {
            mode,
            values,
            doc: -1,
            value: None,
        }
    }

    fn value(&self) -> Result<V::Value> {
        match self.value {
            Some(v) => Ok(v),
            None => bail!(IllegalState(format!("doc {} has no value", self.doc))),
        }
    }
}

impl<V: MultiValuedCursor + ?Sized> DocValuesIterator for SelectedValues<V> {
    fn advance_exact(&mut self, target: DocId) -> Result<bool> {
        if target == self.doc {
            return Ok(self.value.is_some());
        }
        self.doc = target;
        self.value = if self.values.advance_exact(target)? {
            Some(self.mode.pick(&mut *self.values)?)
        } else {
            None
        };
        Ok(self.value.is_some())
    }
}

impl NumericDocValues for SelectedValues<dyn SortedNumericDocValues> {
    fn long_value(&self) -> Result<i64> {
        self.value()
    }
}

impl NumericDoubleValues for SelectedValues<dyn SortedNumericDoubleValues> {
    fn double_value(&self) -> Result<f64> {
        self.value()
    }
}

/// The lowest or highest ordinal of every document.
pub struct SelectedOrds {
    mode: MultiValueMode,
    values: Box<dyn SortedSetDocValues>,
    doc: DocId,
    ord: i32,
}

impl SelectedOrds {
    fn new(mode: MultiValueMode, values: Box<dyn SortedSetDocValues>) -> Self {
        debug_assert!(mode.supports_ords());
        SelectedOrds {
            mode,
            values,
            doc: -1,
            ord: -1,
        }
    }
}

impl DocValuesIterator for SelectedOrds {
    fn advance_exact(&mut self, target: DocId) -> Result<bool> {
        if target == self.doc {
            return Ok(self.ord >= 0);
        }
        self.doc = target;
        self.ord = -1;
        if self.values.advance_exact(target)? {
            let mut ord = self.values.next_ord()?;
            if self.mode == MultiValueMode::Max {
                loop {
                    let next = self.values.next_ord()?;
                    if next == NO_MORE_ORDS {
                        break;
                    }
                    ord = next;
                }
            }
            self.ord = ord as i32;
        }
        Ok(self.ord >= 0)
    }
}

impl SortedDocValues for SelectedOrds {
    fn ord_value(&self) -> Result<i32> {
        Ok(self.ord)
    }

    fn lookup_ord(&mut self, ord: i32) -> Result<Vec<u8>> {
        self.values.lookup_ord(i64::from(ord))
    }

    fn value_count(&self) -> usize {
        self.values.get_value_count()
    }
}

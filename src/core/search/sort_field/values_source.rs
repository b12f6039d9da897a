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
    sortable_long_bits_to_doubles, DocValuesIterator, EmptyNumericDocValues,
    EmptyNumericDoubleValues, EmptySortedDocValues, NumericDocValues, NumericDoubleValues,
    SortableLongBits, SortedDocValues,
};
use core::index::reader::LeafReader;
use core::index::ValueType;
use core::search::join::ParentChildLocator;
use core::search::sort_field::geo_distance::{geo_distance_values, DistanceFunction};
use core::search::sort_field::{
    MultiValueMode, ReplaceMissingDouble, ReplaceMissingNumeric, ReplaceMissingOrds,
};
use core::search::DocIterator;
use core::util::geo::{DistanceUnit, GeoDistance, GeoPoint};
use core::util::{DocId, Numeric, NumericType};

use error::ErrorKind::IllegalArgument;
use error::Result;

/// Joins the values of the nested documents under `path` onto their parents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NestedSort {
    path: String,
    max_children: usize,
}

impl NestedSort {
    pub fn new(path: String) -> Result<NestedSort> {
        if path.is_empty() {
            bail!(IllegalArgument("nested path must not be empty".into()));
        }
        Ok(NestedSort {
            path,
            max_children: usize::max_value(),
        })
    }

    /// Only join the first `max_children` children with a value of every parent.
    pub fn with_max_children(mut self, max_children: usize) -> Result<NestedSort> {
        if max_children == 0 {
            bail!(IllegalArgument(format!(
                "max_children of nested path [{}] must be positive",
                self.path
            )));
        }
        self.max_children = max_children;
        Ok(self)
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn max_children(&self) -> usize {
        self.max_children
    }

    /// `None` when the segment has no documents under the path.
    pub fn locator(
        &self,
        reader: &dyn LeafReader,
    ) -> Result<Option<ParentChildLocator<Box<dyn DocIterator>>>> {
        let parent_docs = match reader.parent_docs(&self.path) {
            Some(parent_docs) => parent_docs,
            None => return Ok(None),
        };
        Ok(reader.child_docs(&self.path)?.map(|child_docs| {
            ParentChildLocator::with_max_children(parent_docs, child_docs, self.max_children)
        }))
    }
}

/// The per-document values of a numeric sort, one value per document.
pub enum AggregatedValues {
    Long(Box<dyn NumericDocValues>),
    Double(Box<dyn NumericDoubleValues>),
}

impl AggregatedValues {
    pub fn advance_exact(&mut self, doc: DocId) -> Result<bool> {
        match self {
            AggregatedValues::Long(values) => values.advance_exact(doc),
            AggregatedValues::Double(values) => values.advance_exact(doc),
        }
    }

    pub fn long_value(&self) -> Result<i64> {
        match self {
            AggregatedValues::Long(values) => values.long_value(),
            AggregatedValues::Double(values) => values.double_value().map(|v| v as i64),
        }
    }

    pub fn double_value(&self) -> Result<f64> {
        match self {
            AggregatedValues::Long(values) => values.long_value().map(|v| v as f64),
            AggregatedValues::Double(values) => values.double_value(),
        }
    }

    pub fn is_floating_point(&self) -> bool {
        match self {
            AggregatedValues::Long(_) => false,
            AggregatedValues::Double(_) => true,
        }
    }

    /// Integer keys sorting like the values: longs as is, doubles and floats as
    /// the sortable bits of the double.
    pub fn into_sortable_bits(self) -> Box<dyn NumericDocValues> {
        match self {
            AggregatedValues::Long(values) => values,
            AggregatedValues::Double(values) => Box::new(SortableLongBits::new(values)),
        }
    }
}

fn check_value_type(
    reader: &dyn LeafReader,
    field: &str,
    accepts: fn(ValueType) -> bool,
    expected: &str,
) -> Result<Option<ValueType>> {
    match reader.field_info(field) {
        Some(info) if accepts(info.value_type) => Ok(Some(info.value_type)),
        Some(info) => bail!(IllegalArgument(format!(
            "field [{}] of type [{}] can't be used as {}",
            field, info.value_type, expected
        ))),
        None => {
            debug!("field [{}] is absent from the segment, no values", field);
            Ok(None)
        }
    }
}

fn is_integer(value_type: ValueType) -> bool {
    value_type
        .numeric_type()
        .map_or(false, |t| !t.is_floating_point())
}

fn is_floating_point(value_type: ValueType) -> bool {
    value_type
        .numeric_type()
        .map_or(false, NumericType::is_floating_point)
}

fn nested_locator(
    nested: &Option<NestedSort>,
    reader: &dyn LeafReader,
) -> Result<Option<Option<ParentChildLocator<Box<dyn DocIterator>>>>> {
    match nested {
        None => Ok(None),
        Some(nested) => {
            let locator = nested.locator(reader)?;
            if locator.is_none() {
                debug!(
                    "nested path [{}] is absent from the segment, no values",
                    nested.path()
                );
            } else {
                debug!(
                    "joining values of nested path [{}], max_children={}",
                    nested.path(),
                    nested.max_children()
                );
            }
            Ok(Some(locator))
        }
    }
}

/// Values of a numeric field, reduced to one per document or per parent.
#[derive(Debug, Clone)]
pub struct NumericValuesSource {
    field: String,
    numeric_type: NumericType,
    mode: MultiValueMode,
    nested: Option<NestedSort>,
    missing: Option<Numeric>,
}

impl NumericValuesSource {
    pub fn new(field: String, numeric_type: NumericType, mode: MultiValueMode) -> Self {
        NumericValuesSource {
            field,
            numeric_type,
            mode,
            nested: None,
            missing: None,
        }
    }

    pub fn with_nested(mut self, nested: NestedSort) -> Self {
        self.nested = Some(nested);
        self
    }

    /// Documents without value get `missing`.
    pub fn with_missing(mut self, missing: Numeric) -> Self {
        self.missing = Some(missing);
        self
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn numeric_type(&self) -> NumericType {
        self.numeric_type
    }

    pub fn mode(&self) -> MultiValueMode {
        self.mode
    }

    pub fn get_values(&self, reader: &dyn LeafReader) -> Result<AggregatedValues> {
        let declared = self.numeric_type;
        let accepts: fn(ValueType) -> bool = if declared.is_floating_point() {
            is_floating_point
        } else {
            is_integer
        };
        let value_type = check_value_type(
            reader,
            &self.field,
            accepts,
            &format!("{:?}", declared),
        )?;
        let stored_type = value_type
            .and_then(ValueType::numeric_type)
            .unwrap_or(declared);
        let raw = reader.get_sorted_numeric_doc_values(&self.field)?;
        let locator = nested_locator(&self.nested, reader)?;

        if declared.is_floating_point() {
            let values = sortable_long_bits_to_doubles(raw, stored_type);
            let mut selected: Box<dyn NumericDoubleValues> = match locator {
                None => self.mode.select_double(values),
                Some(Some(locator)) => self.mode.select_double_nested(values, locator),
                Some(None) => Box::new(EmptyNumericDoubleValues::default()),
            };
            if let Some(missing) = self.missing {
                selected = Box::new(ReplaceMissingDouble::new(selected, missing.double_value()));
            }
            Ok(AggregatedValues::Double(selected))
        } else {
            let mut selected: Box<dyn NumericDocValues> = match locator {
                None => self.mode.select(raw),
                Some(Some(locator)) => self.mode.select_nested(raw, locator),
                Some(None) => Box::new(EmptyNumericDocValues::default()),
            };
            if let Some(missing) = self.missing {
                selected = Box::new(ReplaceMissingNumeric::new(selected, missing.long_value()));
            }
            Ok(AggregatedValues::Long(selected))
        }
    }
}

/// Distances of the points of a geo field to a center, reduced to one per
/// document or per parent.
#[derive(Debug, Clone)]
pub struct GeoDistanceValuesSource {
    field: String,
    center: GeoPoint,
    mode: MultiValueMode,
    unit: DistanceUnit,
    distance_type: GeoDistance,
    nested: Option<NestedSort>,
    missing: Option<f64>,
}

impl GeoDistanceValuesSource {
    pub fn new(field: String, center: GeoPoint, mode: MultiValueMode) -> Result<Self> {
        if mode == MultiValueMode::Sum {
            bail!(IllegalArgument(
                "sort_mode [sum] isn't supported for sorting by geo distance".into()
            ));
        }
        // the center may have been built without validation
        let center = GeoPoint::new(center.lat, center.lon)?;
        Ok(GeoDistanceValuesSource {
            field,
            center,
            mode,
            unit: DistanceUnit::default(),
            distance_type: GeoDistance::default(),
            nested: None,
            missing: None,
        })
    }

    pub fn with_unit(mut self, unit: DistanceUnit) -> Self {
        self.unit = unit;
        self
    }

    pub fn with_distance_type(mut self, distance_type: GeoDistance) -> Self {
        self.distance_type = distance_type;
        self
    }

    pub fn with_nested(mut self, nested: NestedSort) -> Self {
        self.nested = Some(nested);
        self
    }

    pub fn with_missing(mut self, missing: f64) -> Self {
        self.missing = Some(missing);
        self
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn get_values(&self, reader: &dyn LeafReader) -> Result<AggregatedValues> {
        check_value_type(
            reader,
            &self.field,
            |t| t == ValueType::GeoPoint,
            "geo_point",
        )?;
        let points = reader.get_sorted_numeric_doc_values(&self.field)?;
        let function = DistanceFunction::new(self.center, self.distance_type, self.unit);
        let distances = geo_distance_values(points, function);
        let mut selected: Box<dyn NumericDoubleValues> =
            match nested_locator(&self.nested, reader)? {
                None => self.mode.select_double(distances),
                Some(Some(locator)) => self.mode.select_double_nested(distances, locator),
                Some(None) => Box::new(EmptyNumericDoubleValues::default()),
            };
        if let Some(missing) = self.missing {
            selected = Box::new(ReplaceMissingDouble::new(selected, missing));
        }
        Ok(AggregatedValues::Double(selected))
    }
}

/// Ordinals of a keyword field, the lowest or highest per document or per parent.
#[derive(Debug, Clone)]
pub struct OrdinalsValuesSource {
    field: String,
    mode: MultiValueMode,
    nested: Option<NestedSort>,
    missing: Option<Vec<u8>>,
}

impl OrdinalsValuesSource {
    pub fn new(field: String, mode: MultiValueMode) -> Result<Self> {
        if !mode.supports_ords() {
            bail!(IllegalArgument(format!(
                "sort_mode [{}] isn't supported for sorting by keyword field [{}]",
                mode, field
            )));
        }
        Ok(OrdinalsValuesSource {
            field,
            mode,
            nested: None,
            missing: None,
        })
    }

    pub fn with_nested(mut self, nested: NestedSort) -> Self {
        self.nested = Some(nested);
        self
    }

    /// Documents without value get the ordinal of `missing`.
    pub fn with_missing(mut self, missing: Vec<u8>) -> Self {
        self.missing = Some(missing);
        self
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn get_values(&self, reader: &dyn LeafReader) -> Result<Box<dyn SortedDocValues>> {
        let value_type = check_value_type(
            reader,
            &self.field,
            |t| t == ValueType::Keyword,
            "keyword",
        )?;
        let mut selected: Box<dyn SortedDocValues> = if value_type.is_none() {
            Box::new(EmptySortedDocValues::default())
        } else {
            let values = reader.get_sorted_set_doc_values(&self.field)?;
            match nested_locator(&self.nested, reader)? {
                None => self.mode.select_ords(values)?,
                Some(Some(locator)) => self.mode.select_ords_nested(values, locator)?,
                Some(None) => Box::new(EmptySortedDocValues::default()),
            }
        };
        if let Some(ref missing) = self.missing {
            selected = Box::new(ReplaceMissingOrds::new(selected, missing.clone())?);
        }
        Ok(selected)
    }
}

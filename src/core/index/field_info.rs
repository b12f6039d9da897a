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

use core::index::DocValuesType;
use core::util::NumericType;

use std::fmt;

/// What the stored values of a field mean.
///
/// Floating point values are stored as sortable bits, geo points as the packed
/// latitude/longitude pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ValueType {
    Numeric(NumericType),
    GeoPoint,
    Keyword,
}

impl ValueType {
    pub fn numeric_type(self) -> Option<NumericType> {
        match self {
            ValueType::Numeric(numeric_type) => Some(numeric_type),
            _ => None,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ValueType::Numeric(numeric_type) => write!(f, "{:?}", numeric_type),
            ValueType::GeoPoint => write!(f, "geo_point"),
            ValueType::Keyword => write!(f, "keyword"),
        }
    }
}

/// Access to the Field Info of a segment.
#[derive(Clone, Serialize, Debug)]
pub struct FieldInfo {
    pub name: String,
    pub number: i32,
    pub doc_values_type: DocValuesType,
    pub value_type: ValueType,
}

impl FieldInfo {
    pub fn new(
        name: String,
        number: i32,
        doc_values_type: DocValuesType,
        value_type: ValueType,
    ) -> FieldInfo {
        debug_assert!(!doc_values_type.null());
        FieldInfo {
            name,
            number,
            doc_values_type,
            value_type,
        }
    }
}

impl fmt::Display for FieldInfo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}[{}]: {:?} {}",
            self.name, self.number, self.doc_values_type, self.value_type
        )
    }
}

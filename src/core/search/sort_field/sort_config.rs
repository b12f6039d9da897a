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

//! Sort clauses as they come in a search request, e.g.
//!
//! ```json
//! {"field": "price", "type": "long", "mode": "avg", "order": "desc",
//!  "missing": "_last", "nested": {"path": "offers", "max_children": 10}}
//! ```
//!
//! Parsing only checks the shape of the clause, `build` validates it.

use core::search::sort_field::{
    GeoDistanceValuesSource, MissingValue, MultiValueMode, NestedSort, NumericValuesSource,
    OrdinalsValuesSource,
};
use core::util::geo::{DistanceUnit, GeoDistance, GeoPoint};
use core::util::{Numeric, NumericType};

use error::Result;

use serde_json;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn is_reverse(self) -> bool {
        self == SortOrder::Desc
    }

    /// min for ascending sorts, max for descending ones
    pub fn default_mode(self) -> MultiValueMode {
        match self {
            SortOrder::Asc => MultiValueMode::Min,
            SortOrder::Desc => MultiValueMode::Max,
        }
    }
}

impl Default for SortOrder {
    fn default() -> Self {
        SortOrder::Asc
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NestedSortConfig {
    pub path: String,
    #[serde(default)]
    pub max_children: Option<usize>,
}

impl NestedSortConfig {
    pub fn build(&self) -> Result<NestedSort> {
        let nested = NestedSort::new(self.path.clone())?;
        match self.max_children {
            Some(max_children) => nested.with_max_children(max_children),
            None => Ok(nested),
        }
    }
}

/// `"_first"`, `"_last"`, or the value itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MissingConfig {
    Long(i64),
    Double(f64),
    Text(String),
}

impl MissingConfig {
    pub fn to_missing_value(&self) -> Result<MissingValue> {
        Ok(match *self {
            MissingConfig::Long(v) => MissingValue::Value(Numeric::Long(v)),
            MissingConfig::Double(v) => MissingValue::Value(Numeric::Double(v)),
            MissingConfig::Text(ref s) => match s.as_str() {
                "_first" => MissingValue::First,
                "_last" => MissingValue::Last,
                s => match s.parse::<i64>() {
                    Ok(v) => MissingValue::Value(Numeric::Long(v)),
                    Err(_) => MissingValue::Value(Numeric::Double(s.parse::<f64>()?)),
                },
            },
        })
    }

    /// The term substituted for documents without value, `None` for `_first` and
    /// `_last` which leave them to the comparator.
    fn to_term(&self) -> Option<Vec<u8>> {
        match *self {
            MissingConfig::Long(v) => Some(v.to_string().into_bytes()),
            MissingConfig::Double(v) => Some(v.to_string().into_bytes()),
            MissingConfig::Text(ref s) if s == "_first" || s == "_last" => None,
            MissingConfig::Text(ref s) => Some(s.clone().into_bytes()),
        }
    }
}

fn build_mode(mode: &Option<String>, order: SortOrder) -> Result<MultiValueMode> {
    match *mode {
        Some(ref mode) => mode.parse(),
        None => Ok(order.default_mode()),
    }
}

fn build_nested(nested: &Option<NestedSortConfig>) -> Result<Option<NestedSort>> {
    match *nested {
        Some(ref nested) => nested.build().map(Some),
        None => Ok(None),
    }
}

/// A field sort, built into the values source matching the field type.
pub enum FieldSortSource {
    Numeric(NumericValuesSource),
    Ordinals(OrdinalsValuesSource),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldSortConfig {
    pub field: String,
    /// one of int, long, float, double or keyword, double when absent
    #[serde(rename = "type", default)]
    pub field_type: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub order: SortOrder,
    #[serde(default)]
    pub missing: Option<MissingConfig>,
    #[serde(default)]
    pub nested: Option<NestedSortConfig>,
}

impl FieldSortConfig {
    pub fn from_json(json: &str) -> Result<FieldSortConfig> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn build(&self) -> Result<FieldSortSource> {
        let mode = build_mode(&self.mode, self.order)?;
        let nested = build_nested(&self.nested)?;
        let field_type = match self.field_type {
            Some(ref field_type) => field_type.to_ascii_lowercase(),
            None => "double".to_string(),
        };

        if field_type == "keyword" || field_type == "string" {
            let mut source = OrdinalsValuesSource::new(self.field.clone(), mode)?;
            if let Some(nested) = nested {
                source = source.with_nested(nested);
            }
            if let Some(term) = self.missing.as_ref().and_then(MissingConfig::to_term) {
                source = source.with_missing(term);
            }
            return Ok(FieldSortSource::Ordinals(source));
        }

        let numeric_type: NumericType = field_type.parse()?;
        let mut source = NumericValuesSource::new(self.field.clone(), numeric_type, mode);
        if let Some(nested) = nested {
            source = source.with_nested(nested);
        }
        if let Some(ref missing) = self.missing {
            let missing = missing
                .to_missing_value()?
                .resolve(numeric_type, self.order.is_reverse());
            source = source.with_missing(missing);
        }
        Ok(FieldSortSource::Numeric(source))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeoDistanceSortConfig {
    pub field: String,
    pub center: GeoPoint,
    /// meters when absent
    #[serde(default)]
    pub unit: Option<String>,
    /// arc when absent
    #[serde(default)]
    pub distance_type: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub order: SortOrder,
    #[serde(default)]
    pub missing: Option<MissingConfig>,
    #[serde(default)]
    pub nested: Option<NestedSortConfig>,
}

impl GeoDistanceSortConfig {
    pub fn from_json(json: &str) -> Result<GeoDistanceSortConfig> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn build(&self) -> Result<GeoDistanceValuesSource> {
        let mode = build_mode(&self.mode, self.order)?;
        let mut source = GeoDistanceValuesSource::new(self.field.clone(), self.center, mode)?;
        if let Some(ref unit) = self.unit {
            source = source.with_unit(unit.parse::<DistanceUnit>()?);
        }
        if let Some(ref distance_type) = self.distance_type {
            source = source.with_distance_type(distance_type.parse::<GeoDistance>()?);
        }
        if let Some(nested) = build_nested(&self.nested)? {
            source = source.with_nested(nested);
        }
        if let Some(ref missing) = self.missing {
            let missing = missing
                .to_missing_value()?
                .resolve(NumericType::Double, self.order.is_reverse());
            source = source.with_missing(missing.double_value());
        }
        Ok(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::codec::doc_values::{DocValuesIterator, SortedDocValues};
    use core::index::reader::MemoryLeafReaderBuilder;

    #[test]
    fn test_parse_field_sort() {
        let config = FieldSortConfig::from_json(
            r#"{"field": "price", "type": "long", "mode": "AVG", "order": "desc",
                "missing": "_last", "nested": {"path": "offers", "max_children": 3}}"#,
        )
        .unwrap();
        assert_eq!(config.order, SortOrder::Desc);
        assert_eq!(config.missing, Some(MissingConfig::Text("_last".to_string())));
        assert_eq!(
            config.nested,
            Some(NestedSortConfig {
                path: "offers".to_string(),
                max_children: Some(3),
            })
        );
        match config.build().unwrap() {
            FieldSortSource::Numeric(source) => {
                assert_eq!(source.field(), "price");
                assert_eq!(source.numeric_type(), NumericType::Long);
                assert_eq!(source.mode(), MultiValueMode::Avg);
            }
            FieldSortSource::Ordinals(_) => panic!("numeric source expected"),
        }
    }

    #[test]
    fn test_defaults() {
        let config = FieldSortConfig::from_json(r#"{"field": "rating"}"#).unwrap();
        assert_eq!(config.order, SortOrder::Asc);
        match config.build().unwrap() {
            FieldSortSource::Numeric(source) => {
                assert_eq!(source.numeric_type(), NumericType::Double);
                assert_eq!(source.mode(), MultiValueMode::Min);
            }
            FieldSortSource::Ordinals(_) => panic!("numeric source expected"),
        }
        let config =
            FieldSortConfig::from_json(r#"{"field": "rating", "order": "desc"}"#).unwrap();
        match config.build().unwrap() {
            FieldSortSource::Numeric(source) => assert_eq!(source.mode(), MultiValueMode::Max),
            FieldSortSource::Ordinals(_) => panic!("numeric source expected"),
        }
    }

    #[test]
    fn test_missing_config() {
        let parse = |json: &str| -> MissingConfig { serde_json::from_str(json).unwrap() };
        assert_eq!(parse("5"), MissingConfig::Long(5));
        assert_eq!(parse("-2.5"), MissingConfig::Double(-2.5));
        assert_eq!(parse(r#""_first""#), MissingConfig::Text("_first".to_string()));

        assert_eq!(
            parse(r#""_first""#).to_missing_value().unwrap(),
            MissingValue::First
        );
        assert_eq!(
            parse(r#""12""#).to_missing_value().unwrap(),
            MissingValue::Value(Numeric::Long(12))
        );
        assert_eq!(
            parse(r#""1.5""#).to_missing_value().unwrap(),
            MissingValue::Value(Numeric::Double(1.5))
        );
        assert!(parse(r#""lots""#).to_missing_value().is_err());
    }

    #[test]
    fn test_missing_last_sorts_last() {
        let mut builder = MemoryLeafReaderBuilder::new(2);
        builder.add_longs("price", &[vec![3], vec![]]).unwrap();
        let reader = builder.build();
        for &(order, expected) in &[("asc", i64::max_value()), ("desc", i64::min_value())] {
            let json = format!(
                r#"{{"field": "price", "type": "long", "order": "{}", "missing": "_last"}}"#,
                order
            );
            let source = match FieldSortConfig::from_json(&json).unwrap().build().unwrap() {
                FieldSortSource::Numeric(source) => source,
                FieldSortSource::Ordinals(_) => panic!("numeric source expected"),
            };
            let mut values = source.get_values(&reader).unwrap();
            assert!(values.advance_exact(1).unwrap());
            assert_eq!(values.long_value().unwrap(), expected);
        }
    }

    #[test]
    fn test_keyword_sort() {
        let mut builder = MemoryLeafReaderBuilder::new(2);
        builder.add_terms("color", &[vec!["red"], vec![]]).unwrap();
        let reader = builder.build();
        let config = FieldSortConfig::from_json(
            r#"{"field": "color", "type": "keyword", "missing": "blue"}"#,
        )
        .unwrap();
        let source = match config.build().unwrap() {
            FieldSortSource::Ordinals(source) => source,
            FieldSortSource::Numeric(_) => panic!("ordinals source expected"),
        };
        let mut values = source.get_values(&reader).unwrap();
        assert!(values.advance_exact(1).unwrap());
        let ord = values.ord_value().unwrap();
        assert_eq!(values.lookup_ord(ord).unwrap(), b"blue".to_vec());

        let config =
            FieldSortConfig::from_json(r#"{"field": "color", "type": "keyword", "mode": "sum"}"#)
                .unwrap();
        assert!(config.build().is_err());
    }

    #[test]
    fn test_invalid_configs() {
        assert!(FieldSortConfig::from_json(r#"{"field": "price", "mode": "mean"}"#)
            .unwrap()
            .build()
            .is_err());
        assert!(FieldSortConfig::from_json(r#"{"field": "price", "type": "date"}"#)
            .unwrap()
            .build()
            .is_err());
        assert!(FieldSortConfig::from_json(
            r#"{"field": "price", "nested": {"path": "offers", "max_children": 0}}"#
        )
        .unwrap()
        .build()
        .is_err());
        assert!(FieldSortConfig::from_json(r#"{"field": "price", "nested": {"path": ""}}"#)
            .unwrap()
            .build()
            .is_err());
        assert!(FieldSortConfig::from_json(r#"{"field": "price", "order": "up"}"#).is_err());
        assert!(FieldSortConfig::from_json(r#"{"field": "price", "sort": "asc"}"#).is_err());
        assert!(FieldSortConfig::from_json(r#"{"type": "long"}"#).is_err());
    }

    #[test]
    fn test_geo_distance_sort() {
        let config = GeoDistanceSortConfig::from_json(
            r#"{"field": "location", "center": {"lat": 0.0, "lon": 0.0}, "unit": "km",
                "distance_type": "plane", "mode": "min", "missing": 12.5}"#,
        )
        .unwrap();
        let mut builder = MemoryLeafReaderBuilder::new(2);
        builder
            .add_geo_points("location", &[vec![GeoPoint::new(1.0, 0.0).unwrap()], vec![]])
            .unwrap();
        let reader = builder.build();
        let source = config.build().unwrap();
        assert_eq!(source.field(), "location");
        let mut values = source.get_values(&reader).unwrap();
        assert!(values.advance_exact(0).unwrap());
        assert!((values.double_value().unwrap() - 111.19).abs() < 0.01);
        assert!(values.advance_exact(1).unwrap());
        assert_eq!(values.double_value().unwrap(), 12.5);

        let invalid = |json: &str| {
            GeoDistanceSortConfig::from_json(json)
                .and_then(|config| config.build())
                .is_err()
        };
        assert!(invalid(
            r#"{"field": "location", "center": {"lat": 95.0, "lon": 0.0}}"#
        ));
        assert!(invalid(
            r#"{"field": "location", "center": {"lat": 0.0, "lon": 0.0}, "unit": "parsec"}"#
        ));
        assert!(invalid(
            r#"{"field": "location", "center": {"lat": 0.0, "lon": 0.0}, "mode": "sum"}"#
        ));
        assert!(invalid(
            r#"{"field": "location", "center": {"lat": 0.0, "lon": 0.0}, "distance_type": "x"}"#
        ));
    }
}

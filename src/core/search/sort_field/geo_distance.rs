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
use core::util::geo::{DistanceUnit, GeoDistance, GeoPoint};
use core::util::DocId;

use error::Result;

use smallvec::SmallVec;

/// Computes distances from a fixed center to stored points.
#[derive(Debug, Clone, Copy)]
pub struct DistanceFunction {
    center: GeoPoint,
    distance: GeoDistance,
    unit: DistanceUnit,
}

impl DistanceFunction {
    pub fn new(center: GeoPoint, distance: GeoDistance, unit: DistanceUnit) -> Self {
        DistanceFunction {
            center,
            distance,
            unit,
        }
    }

    /// distance to the packed point `encoded`, in `unit`
    #[inline]
    pub fn distance(&self, encoded: i64) -> f64 {
        let point = GeoPoint::unpack(encoded);
        self.unit
            .from_meters(self.distance.calculate(&self.center, &point))
    }
}

/// Turns packed geo points into their distances to a center.
///
/// Single valued points stay single valued.
pub fn geo_distance_values(
    points: Box<dyn SortedNumericDocValues>,
    function: DistanceFunction,
) -> Box<dyn SortedNumericDoubleValues> {
    match points.into_singleton() {
        Ok(single) => Box::new(SingletonSortedNumericDoubleValues::new(Box::new(
            GeoDistanceSingleValues {
                points: single,
                function,
            },
        ))),
        Err(points) => Box::new(GeoDistanceValues::new(points, function)),
    }
}

struct GeoDistanceSingleValues {
    points: Box<dyn NumericDocValues>,
    function: DistanceFunction,
}

impl DocValuesIterator for GeoDistanceSingleValues {
    fn advance_exact(&mut self, target: DocId) -> Result<bool> {
        self.points.advance_exact(target)
    }
}

impl NumericDoubleValues for GeoDistanceSingleValues {
    fn double_value(&self) -> Result<f64> {
        Ok(self.function.distance(self.points.long_value()?))
    }
}

/// One distance per stored point.
///
/// Distances come in the order the points are stored, which is not the order of
/// the distances: `Min` and `Max` pick the distance of the first and last stored
/// point.
pub struct GeoDistanceValues {
    points: Box<dyn SortedNumericDocValues>,
    function: DistanceFunction,
    distances: SmallVec<[f64; 4]>,
    upto: usize,
}

impl GeoDistanceValues {
    pub fn new(points: Box<dyn SortedNumericDocValues>, function: DistanceFunction) -> Self {
        GeoDistanceValues {
            points,
            function,
            distances: SmallVec::new(),
            upto: 0,
        }
    }
}

impl DocValuesIterator for GeoDistanceValues {
    fn advance_exact(&mut self, target: DocId) -> Result<bool> {
        self.distances.clear();
        self.upto = 0;
        if !self.points.advance_exact(target)? {
            return Ok(false);
        }
        for _ in 0..self.points.doc_value_count() {
            let encoded = self.points.next_value()?;
            self.distances.push(self.function.distance(encoded));
        }
        Ok(true)
    }
}

impl SortedNumericDoubleValues for GeoDistanceValues {
    fn doc_value_count(&self) -> usize {
        self.distances.len()
    }

    fn next_value(&mut self) -> Result<f64> {
        assert!(
            self.upto < self.distances.len(),
            "only {} distances for the current doc",
            self.distances.len()
        );
        let distance = self.distances[self.upto];
        self.upto += 1;
        Ok(distance)
    }

    fn into_singleton(
        self: Box<Self>,
    ) -> ::std::result::Result<Box<dyn NumericDoubleValues>, Box<dyn SortedNumericDoubleValues>>
    {
        Err(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::index::reader::{LeafReader, MemoryLeafReaderBuilder};
    use core::search::sort_field::MultiValueMode;
    use core::util::geo::{arc_distance, EARTH_MEAN_RADIUS};
    use std::f64::consts::PI;

    fn point(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint::new(lat, lon).unwrap()
    }

    fn origin() -> DistanceFunction {
        DistanceFunction::new(point(0.0, 0.0), GeoDistance::Arc, DistanceUnit::Meters)
    }

    #[test]
    fn test_distance_to_same_and_antipodal_point() {
        let function = origin();
        assert_eq!(function.distance(point(0.0, 0.0).pack()), 0.0);
        let antipodal = function.distance(point(0.0, 180.0).pack());
        assert!((antipodal - PI * EARTH_MEAN_RADIUS).abs() < 1.0);
        assert!((antipodal / 1000.0 - 20_015.0).abs() < 1.0);
    }

    #[test]
    fn test_units_and_plane_distance() {
        let target = point(0.01, 0.01).pack();
        let km = DistanceFunction::new(point(0.0, 0.0), GeoDistance::Arc, DistanceUnit::Kilometers);
        let plane = DistanceFunction::new(point(0.0, 0.0), GeoDistance::Plane, DistanceUnit::Meters);
        let meters = origin().distance(target);
        assert!((km.distance(target) * 1000.0 - meters).abs() < 1e-6);
        // both agree on short distances
        assert!((plane.distance(target) - meters).abs() < 1.0);
    }

    #[test]
    fn test_single_valued_points_stay_singleton() {
        let mut builder = MemoryLeafReaderBuilder::new(2);
        builder
            .add_geo_points("location", &[vec![point(1.0, 1.0)], vec![]])
            .unwrap();
        let reader = builder.build();
        let points = reader.get_sorted_numeric_doc_values("location").unwrap();
        let distances = geo_distance_values(points, origin());
        let mut single = match distances.into_singleton() {
            Ok(single) => single,
            Err(_) => panic!("singleton expected"),
        };
        assert!(single.advance_exact(0).unwrap());
        let decoded = GeoPoint::unpack(point(1.0, 1.0).pack());
        assert_eq!(
            single.double_value().unwrap(),
            arc_distance(0.0, 0.0, decoded.lat, decoded.lon)
        );
        assert!(!single.advance_exact(1).unwrap());
    }

    #[test]
    fn test_distances_keep_stored_order() {
        // points are stored by packed value, latitude first: the far point at
        // -10 comes before the near one at 1
        let far = point(-10.0, 0.0);
        let near = point(1.0, 0.0);
        let mut builder = MemoryLeafReaderBuilder::new(1);
        builder
            .add_geo_points("location", &[vec![near, far]])
            .unwrap();
        let reader = builder.build();
        let function = origin();
        let far_distance = function.distance(far.pack());
        let near_distance = function.distance(near.pack());
        assert!(near_distance < far_distance);

        let points = reader.get_sorted_numeric_doc_values("location").unwrap();
        let mut distances = geo_distance_values(points, function);
        assert!(distances.advance_exact(0).unwrap());
        assert_eq!(distances.doc_value_count(), 2);
        assert_eq!(distances.next_value().unwrap(), far_distance);
        assert_eq!(distances.next_value().unwrap(), near_distance);

        // min is the first stored point, not the nearest one
        let points = reader.get_sorted_numeric_doc_values("location").unwrap();
        let mut min = MultiValueMode::Min.select_double(geo_distance_values(points, function));
        assert!(min.advance_exact(0).unwrap());
        assert_eq!(min.double_value().unwrap(), far_distance);
    }
}

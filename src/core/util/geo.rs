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

//! Encoding of lat/lon points into doc values and great-circle distances.

use error::ErrorKind::IllegalArgument;
use error::Result;

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

/// mean earth radius in meters, as used for all distance computations
pub const EARTH_MEAN_RADIUS: f64 = 6_371_008.771_4;

pub const MIN_LAT_INCL: f64 = -90.0;
pub const MAX_LAT_INCL: f64 = 90.0;
pub const MIN_LON_INCL: f64 = -180.0;
pub const MAX_LON_INCL: f64 = 180.0;

const LAT_SCALE: f64 = (0x1i64 << 32) as f64 / 180.0;
const LAT_DECODE: f64 = 1.0 / LAT_SCALE;
const LON_SCALE: f64 = (0x1i64 << 32) as f64 / 360.0;
const LON_DECODE: f64 = 1.0 / LON_SCALE;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Result<GeoPoint> {
        check_latitude(lat)?;
        check_longitude(lon)?;
        Ok(GeoPoint { lat, lon })
    }

    /// Packs the point the way a geo point doc values column stores it:
    /// encoded latitude in the high 32 bits, encoded longitude in the low 32 bits.
    pub fn pack(&self) -> i64 {
        let lat = i64::from(encode_latitude(self.lat));
        let lon = i64::from(encode_longitude(self.lon));
        (lat << 32) | (lon & 0xFFFF_FFFF)
    }

    pub fn unpack(encoded: i64) -> GeoPoint {
        GeoPoint {
            lat: decode_latitude((encoded >> 32) as i32),
            lon: decode_longitude(encoded as i32),
        }
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}, {}", self.lat, self.lon)
    }
}

pub fn check_latitude(lat: f64) -> Result<()> {
    if lat.is_nan() || lat < MIN_LAT_INCL || lat > MAX_LAT_INCL {
        bail!(IllegalArgument(format!(
            "invalid latitude {}; must be between {} and {}",
            lat, MIN_LAT_INCL, MAX_LAT_INCL
        )));
    }
    Ok(())
}

pub fn check_longitude(lon: f64) -> Result<()> {
    if lon.is_nan() || lon < MIN_LON_INCL || lon > MAX_LON_INCL {
        bail!(IllegalArgument(format!(
            "invalid longitude {}; must be between {} and {}",
            lon, MIN_LON_INCL, MAX_LON_INCL
        )));
    }
    Ok(())
}

/// Quantizes a latitude to 32 bits; 90 is nudged down into the last cell.
/// `lat` must already be in range.
pub fn encode_latitude(lat: f64) -> i32 {
    debug_assert!(lat >= MIN_LAT_INCL && lat <= MAX_LAT_INCL);
    let lat = if lat == MAX_LAT_INCL {
        next_down(lat)
    } else {
        lat
    };
    (lat / LAT_DECODE).floor() as i32
}

/// Quantizes a longitude to 32 bits; 180 is nudged down into the last cell.
/// `lon` must already be in range.
pub fn encode_longitude(lon: f64) -> i32 {
    debug_assert!(lon >= MIN_LON_INCL && lon <= MAX_LON_INCL);
    let lon = if lon == MAX_LON_INCL {
        next_down(lon)
    } else {
        lon
    };
    (lon / LON_DECODE).floor() as i32
}

pub fn decode_latitude(encoded: i32) -> f64 {
    f64::from(encoded) * LAT_DECODE
}

pub fn decode_longitude(encoded: i32) -> f64 {
    f64::from(encoded) * LON_DECODE
}

// largest double strictly less than a positive finite `v`
fn next_down(v: f64) -> f64 {
    debug_assert!(v > 0.0 && v.is_finite());
    f64::from_bits(v.to_bits() - 1)
}

/// Great-circle distance in meters between two points, haversine formula.
pub fn arc_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let x1 = lat1.to_radians();
    let x2 = lat2.to_radians();
    let h1 = ((x2 - x1) / 2.0).sin();
    let h2 = ((lon2 - lon1).to_radians() / 2.0).sin();
    let h = h1 * h1 + x1.cos() * x2.cos() * h2 * h2;
    2.0 * EARTH_MEAN_RADIUS * h.sqrt().min(1.0).asin()
}

/// Equirectangular approximation of the distance in meters, only accurate for
/// short distances away from the poles.
pub fn plane_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let x = (lon2 - lon1).to_radians() * ((lat2 + lat1) / 2.0).to_radians().cos();
    let y = (lat2 - lat1).to_radians();
    (x * x + y * y).sqrt() * EARTH_MEAN_RADIUS
}

/// How the distance between two points is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeoDistance {
    Arc,
    Plane,
}

impl GeoDistance {
    /// Distance in meters.
    pub fn calculate(self, from: &GeoPoint, to: &GeoPoint) -> f64 {
        match self {
            GeoDistance::Arc => arc_distance(from.lat, from.lon, to.lat, to.lon),
            GeoDistance::Plane => plane_distance(from.lat, from.lon, to.lat, to.lon),
        }
    }
}

impl Default for GeoDistance {
    fn default() -> Self {
        GeoDistance::Arc
    }
}

impl FromStr for GeoDistance {
    type Err = ::error::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "arc" => Ok(GeoDistance::Arc),
            "plane" => Ok(GeoDistance::Plane),
            _ => bail!(IllegalArgument(format!(
                "No geo distance for [{}]",
                s
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceUnit {
    Meters,
    Kilometers,
    Miles,
    Yards,
    Feet,
    NauticalMiles,
}

impl DistanceUnit {
    /// how many meters one unit is
    pub fn meters(self) -> f64 {
        match self {
            DistanceUnit::Meters => 1.0,
            DistanceUnit::Kilometers => 1000.0,
            DistanceUnit::Miles => 1609.344,
            DistanceUnit::Yards => 0.9144,
            DistanceUnit::Feet => 0.3048,
            DistanceUnit::NauticalMiles => 1852.0,
        }
    }

    pub fn from_meters(self, distance: f64) -> f64 {
        distance / self.meters()
    }

    pub fn to_meters(self, distance: f64) -> f64 {
        distance * self.meters()
    }

    /// Length of a full great circle in this unit.
    pub fn earth_circumference(self) -> f64 {
        self.from_meters(2.0 * PI * EARTH_MEAN_RADIUS)
    }
}

impl Default for DistanceUnit {
    fn default() -> Self {
        DistanceUnit::Meters
    }
}

impl FromStr for DistanceUnit {
    type Err = ::error::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "m" | "meters" => Ok(DistanceUnit::Meters),
            "km" | "kilometers" => Ok(DistanceUnit::Kilometers),
            "mi" | "miles" => Ok(DistanceUnit::Miles),
            "yd" | "yards" => Ok(DistanceUnit::Yards),
            "ft" | "feet" => Ok(DistanceUnit::Feet),
            "nmi" | "nauticalmiles" => Ok(DistanceUnit::NauticalMiles),
            _ => bail!(IllegalArgument(format!("No distance unit match [{}]", s))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_round_trip_is_within_cell() {
        let points = [
            (0.0, 0.0),
            (52.52, 13.405),
            (-33.8688, 151.2093),
            (90.0, 180.0),
            (-90.0, -180.0),
        ];
        for &(lat, lon) in points.iter() {
            let point = GeoPoint::new(lat, lon).unwrap();
            let decoded = GeoPoint::unpack(point.pack());
            assert!((decoded.lat - lat).abs() <= LAT_DECODE, "{}", lat);
            assert!((decoded.lon - lon).abs() <= LON_DECODE, "{}", lon);
            // quantized points are stable
            assert_eq!(GeoPoint::unpack(decoded.pack()), decoded);
        }
    }

    #[test]
    fn test_encode_extremes() {
        assert_eq!(encode_latitude(-90.0), i32::min_value());
        assert_eq!(encode_latitude(90.0), i32::max_value());
        assert_eq!(encode_longitude(-180.0), i32::min_value());
        assert_eq!(encode_longitude(180.0), i32::max_value());
        assert_eq!(encode_latitude(0.0), 0);
    }

    #[test]
    fn test_invalid_points() {
        assert!(GeoPoint::new(90.5, 0.0).is_err());
        assert!(GeoPoint::new(0.0, -180.1).is_err());
        assert!(GeoPoint::new(::std::f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_arc_distance() {
        assert_eq!(arc_distance(40.0, -74.0, 40.0, -74.0), 0.0);
        let antipodal = arc_distance(0.0, 0.0, 0.0, 180.0);
        assert!((antipodal - PI * EARTH_MEAN_RADIUS).abs() < 1e-6);
        assert!((antipodal / 1000.0 - 20_015.0).abs() < 1.0);
        let pole_to_pole = arc_distance(90.0, 0.0, -90.0, 0.0);
        assert!((pole_to_pole - antipodal).abs() < 1e-6);
        // one degree of latitude
        let degree = arc_distance(10.0, 20.0, 11.0, 20.0);
        assert!((degree - 111_195.08).abs() < 1.0);
    }

    #[test]
    fn test_plane_agrees_with_arc_for_short_distances() {
        let from = GeoPoint::new(48.8566, 2.3522).unwrap();
        let to = GeoPoint::new(48.8606, 2.3376).unwrap();
        let arc = GeoDistance::Arc.calculate(&from, &to);
        let plane = GeoDistance::Plane.calculate(&from, &to);
        assert!((arc - plane).abs() / arc < 1e-3);
    }

    #[test]
    fn test_units() {
        assert_eq!(DistanceUnit::Kilometers.from_meters(1500.0), 1.5);
        assert_eq!(DistanceUnit::Miles.to_meters(1.0), 1609.344);
        assert_eq!("KM".parse::<DistanceUnit>().unwrap(), DistanceUnit::Kilometers);
        assert_eq!("nmi".parse::<DistanceUnit>().unwrap(), DistanceUnit::NauticalMiles);
        assert!("parsec".parse::<DistanceUnit>().is_err());
        assert_eq!("Plane".parse::<GeoDistance>().unwrap(), GeoDistance::Plane);
        assert!("sloppy".parse::<GeoDistance>().is_err());
        let circumference = DistanceUnit::Meters.earth_circumference();
        assert!((circumference / 2.0 - PI * EARTH_MEAN_RADIUS).abs() < 1e-6);
    }
}

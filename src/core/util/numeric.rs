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

use error::ErrorKind::IllegalArgument;
use error::Result;

use std::fmt;
use std::str::FromStr;

/// A typed numeric constant, e.g. the default substituted for documents
/// without a value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Numeric {
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
}

impl Numeric {
    pub fn int_value(&self) -> i32 {
        match *self {
            Numeric::Short(v) => i32::from(v),
            Numeric::Int(v) => v,
            Numeric::Long(v) => v as i32,
            Numeric::Float(v) => v as i32,
            Numeric::Double(v) => v as i32,
        }
    }

    pub fn long_value(&self) -> i64 {
        match *self {
            Numeric::Short(v) => i64::from(v),
            Numeric::Int(v) => i64::from(v),
            Numeric::Long(v) => v,
            Numeric::Float(v) => v as i64,
            Numeric::Double(v) => v as i64,
        }
    }

    pub fn float_value(&self) -> f32 {
        match *self {
            Numeric::Short(v) => f32::from(v),
            Numeric::Int(v) => v as f32,
            Numeric::Long(v) => v as f32,
            Numeric::Float(v) => v,
            Numeric::Double(v) => v as f32,
        }
    }

    pub fn double_value(&self) -> f64 {
        match *self {
            Numeric::Short(v) => f64::from(v),
            Numeric::Int(v) => f64::from(v),
            Numeric::Long(v) => v as f64,
            Numeric::Float(v) => f64::from(v),
            Numeric::Double(v) => v,
        }
    }

    pub fn is_floating(&self) -> bool {
        match *self {
            Numeric::Float(_) | Numeric::Double(_) => true,
            _ => false,
        }
    }
}

impl From<i16> for Numeric {
    fn from(val: i16) -> Self {
        Numeric::Short(val)
    }
}

impl From<i32> for Numeric {
    fn from(val: i32) -> Self {
        Numeric::Int(val)
    }
}

impl From<i64> for Numeric {
    fn from(val: i64) -> Self {
        Numeric::Long(val)
    }
}

impl From<f32> for Numeric {
    fn from(val: f32) -> Self {
        Numeric::Float(val)
    }
}

impl From<f64> for Numeric {
    fn from(val: f64) -> Self {
        Numeric::Double(val)
    }
}

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Numeric::Short(v) => write!(f, "{}", v),
            Numeric::Int(v) => write!(f, "{}", v),
            Numeric::Long(v) => write!(f, "{}", v),
            Numeric::Float(v) => write!(f, "{}", v),
            Numeric::Double(v) => write!(f, "{}", v),
        }
    }
}

/// The declared encoding of a numeric doc values field.
///
/// Every numeric column stores 64 bit integers; floating point fields store the
/// sortable bits of their values so that integer order equals numeric order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumericType {
    Int,
    Long,
    Float,
    Double,
}

impl NumericType {
    pub fn is_floating_point(self) -> bool {
        match self {
            NumericType::Float | NumericType::Double => true,
            NumericType::Int | NumericType::Long => false,
        }
    }

    /// Decodes a stored value of this type.
    pub fn from_sortable_bits(self, bits: i64) -> f64 {
        match self {
            NumericType::Int | NumericType::Long => bits as f64,
            NumericType::Float => f64::from(sortable_int2float(bits as i32)),
            NumericType::Double => sortable_long2double(bits),
        }
    }

    /// The smallest and largest values of this type, used to sort missing values
    /// first or last.
    pub fn min_value(self) -> Numeric {
        match self {
            NumericType::Int => Numeric::Int(i32::min_value()),
            NumericType::Long => Numeric::Long(i64::min_value()),
            NumericType::Float => Numeric::Float(::std::f32::NEG_INFINITY),
            NumericType::Double => Numeric::Double(::std::f64::NEG_INFINITY),
        }
    }

    pub fn max_value(self) -> Numeric {
        match self {
            NumericType::Int => Numeric::Int(i32::max_value()),
            NumericType::Long => Numeric::Long(i64::max_value()),
            NumericType::Float => Numeric::Float(::std::f32::INFINITY),
            NumericType::Double => Numeric::Double(::std::f64::INFINITY),
        }
    }
}

impl FromStr for NumericType {
    type Err = ::error::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "int" | "integer" => Ok(NumericType::Int),
            "long" => Ok(NumericType::Long),
            "float" => Ok(NumericType::Float),
            "double" => Ok(NumericType::Double),
            _ => bail!(IllegalArgument(format!("Unknown numeric type: {}", s))),
        }
    }
}

const CANONICAL_NAN_BITS: u64 = 0x7ff8_0000_0000_0000;
const CANONICAL_FLOAT_NAN_BITS: u32 = 0x7fc0_0000;

/// Converts a `f64` value to a sortable signed `i64`.
///
/// Every NaN is collapsed to the canonical quiet NaN first, so all NaNs share
/// one key which sorts above positive infinity.
pub fn double2sortable_long(value: f64) -> i64 {
    sortable_double_bits(double2long_bits(value))
}

/// Converts a sortable `i64` back to a `f64`.
pub fn sortable_long2double(value: i64) -> f64 {
    f64::from_bits(sortable_double_bits(value) as u64)
}

/// Converts a `f32` value to a sortable signed `i32`, see `double2sortable_long`.
pub fn float2sortable_int(value: f32) -> i32 {
    sortable_float_bits(float2int_bits(value))
}

/// Converts a sortable `i32` back to a `f32`.
pub fn sortable_int2float(value: i32) -> f32 {
    f32::from_bits(sortable_float_bits(value) as u32)
}

/// Converts IEEE 754 representation of a double to sortable order (or back to the original)
pub fn sortable_double_bits(bits: i64) -> i64 {
    bits ^ (bits >> 63i64) & 0x7fff_ffff_ffff_ffffi64
}

/// Converts IEEE 754 representation of a float to sortable order (or back to the original)
pub fn sortable_float_bits(bits: i32) -> i32 {
    bits ^ (bits >> 31) & 0x7fff_ffff
}

/// IEEE 754 bits of `value` with NaN canonicalized.
pub fn double2long_bits(value: f64) -> i64 {
    if value.is_nan() {
        CANONICAL_NAN_BITS as i64
    } else {
        value.to_bits() as i64
    }
}

/// IEEE 754 bits of `value` with NaN canonicalized.
pub fn float2int_bits(value: f32) -> i32 {
    if value.is_nan() {
        CANONICAL_FLOAT_NAN_BITS as i32
    } else {
        value.to_bits() as i32
    }
}

/// Raw IEEE 754 bits of `value`, NaN payloads included.
pub fn double2raw_long_bits(value: f64) -> i64 {
    value.to_bits() as i64
}

pub fn raw_long_bits2double(bits: i64) -> f64 {
    f64::from_bits(bits as u64)
}

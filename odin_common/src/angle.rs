/*
 * Copyright © 2024, United States Government, as represented by the Administrator of
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “ODIN” software is licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License. You may obtain a copy
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

use std::{fmt, marker::PhantomData, ops};
use serde::ser::{Serialize as SerializeTrait, Serializer};
use serde::de::{self, Deserialize as DeserializeTrait, Deserializer, Visitor};

#[inline]
pub fn normalize_90 (d:f64) -> f64 {
    let x = d % 360.0;

    if x < -90.0 { -180.0 - x }
    else if x > 90.0 { 180.0 - x }
    else { x }
}

#[inline]
pub fn normalize_180 (d: f64) -> f64 {
    let x = d % 360.0;

    if x < -180.0 { 360.0 + x }
    else if x > 180.0 { x - 360.0 }
    else { x }
}

#[inline]
pub fn normalize_360 (d: f64) -> f64 {
    let x = d % 360.0;
    if x < 0.0 { 360.0 + x } else { x }
}

pub trait AngleKind {
    const NAME: &'static str;
    const MIN: f64;
    const MAX: f64;
    fn normalize(v: f64)->f64;
}

#[derive(Debug,Clone,Copy)]
pub struct LatitudeKind {}
impl AngleKind for LatitudeKind {
    const NAME: &'static str = "Latitude";
    const MIN: f64 = -90.0;
    const MAX: f64 = 90.0;
    fn normalize(v: f64) -> f64 { normalize_90(v) }
}

#[derive(Debug,Clone,Copy)]
pub struct LongitudeKind {}
impl AngleKind for LongitudeKind {
    const NAME: &'static str = "Longitude";
    const MIN: f64 = -180.0;
    const MAX: f64 = 180.0;
    fn normalize(v: f64) -> f64 { normalize_180(v) }
}

/// headings, bearings and tracks - clockwise from true north
#[derive(Debug,Clone,Copy)]
pub struct FullCircleKind {}
impl AngleKind for FullCircleKind {
    const NAME: &'static str = "Angle360";
    const MIN: f64 = 0.0;
    const MAX: f64 = 360.0;
    fn normalize(v: f64) -> f64 { normalize_360(v) }
}

/// an angle in degrees that is always kept within the range of its kind
#[derive(Copy, Clone)]
pub struct NormalizedAngle<K> where K: AngleKind {
    value: f64,
    kind: PhantomData<K>,
}

impl<K> NormalizedAngle<K> where K: AngleKind {
    #[inline]
    pub fn from_degrees (deg: f64) -> Self {
        NormalizedAngle { value: K::normalize(deg), kind: PhantomData }
    }

    pub fn from_radians (rad: f64) -> Self {
        NormalizedAngle { value: K::normalize(rad.to_degrees()), kind: PhantomData }
    }

    #[inline] pub fn degrees(&self)->f64 { self.value }
    #[inline] pub fn radians(&self)->f64 { self.value.to_radians() }

    #[inline] pub fn sin(&self)->f64 { self.value.to_radians().sin() }
    #[inline] pub fn cos(&self)->f64 { self.value.to_radians().cos() }
}

impl <K> From<NormalizedAngle<K>> for f64 where K: AngleKind {
    fn from(a: NormalizedAngle<K>) -> Self { a.value }
}

impl<K> fmt::Display for NormalizedAngle<K> where K: AngleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}deg", self.value) }
}

impl<K> fmt::Debug for NormalizedAngle<K> where K: AngleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}({})", K::NAME, self.value) }
}

impl<K> PartialEq for NormalizedAngle<K> where K: AngleKind {
    fn eq(&self, other: &Self) -> bool { self.value == other.value }
}

impl<K> PartialOrd for NormalizedAngle<K> where K: AngleKind {
    fn partial_cmp(&self, other:&Self) -> Option<std::cmp::Ordering> { self.value.partial_cmp(&other.value) }
}

// addition and subtraction only with the same kind of angle
impl<K> ops::Add<NormalizedAngle<K>> for NormalizedAngle<K> where K: AngleKind {
    type Output = Self;
    fn add (self,rhs:NormalizedAngle<K>) -> Self::Output { NormalizedAngle::from_degrees( self.value + rhs.value) }
}
impl<K> ops::Sub<NormalizedAngle<K>> for NormalizedAngle<K> where K: AngleKind {
    type Output = Self;
    fn sub (self,rhs:NormalizedAngle<K>) -> Self::Output { NormalizedAngle::from_degrees( self.value - rhs.value) }
}

pub type Longitude = NormalizedAngle<LongitudeKind>;
pub type Latitude = NormalizedAngle<LatitudeKind>;
pub type Angle360 = NormalizedAngle<FullCircleKind>;

//--- serde support (plain degrees)

impl<K> SerializeTrait for NormalizedAngle<K> where K: AngleKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error> where S: Serializer {
        serializer.serialize_f64(self.value)
    }
}

impl<'de,K> DeserializeTrait<'de> for NormalizedAngle<K> where K: AngleKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error> where D: Deserializer<'de> {
        struct AngleVisitor<K>(PhantomData<K>);

        impl<'de,K> Visitor<'de> for AngleVisitor<K> where K: AngleKind {
            type Value = NormalizedAngle<K>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                write!( formatter, "floating point degrees between [{}..{}]", K::MIN, K::MAX)
            }

            fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E> where E: de::Error {
                if value >= K::MIN && value <= K::MAX {
                    Ok( NormalizedAngle::from_degrees(value))
                } else {
                    Err( E::custom(format!("{} degrees out of range: {}", K::NAME, value)))
                }
            }

            // RON and JSON both allow integer literals for degrees
            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E> where E: de::Error { self.visit_f64( value as f64) }
            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E> where E: de::Error { self.visit_f64( value as f64) }
        }

        deserializer.deserialize_f64( AngleVisitor::<K>(PhantomData))
    }
}

/*
 * Copyright © 2025, United States Government, as represented by the Administrator of
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

//! this module provides geodetic point types on the WGS84 ellipsoid.
//! We use the [geo](https://docs.rs/geo/latest/geo/index.html) crate for the underlying algorithms (most notably
//! geodesic destination/distance computation) and wrap its types with the
//! [new type](https://doc.rust-lang.org/rust-by-example/generics/new_types.html) pattern so that we can add
//! units-of-measure ([uom](https://docs.rs/uom/latest/uom/)) and normalized angle semantics.

use std::fmt;
use serde::{Serialize, Deserialize};
use num::{Num, ToPrimitive};

use geo::{Point, Destination, Distance, Geodesic};
use uom::si::f64::Length;
use uom::si::length::meter;

use crate::angle::{normalize_180, normalize_90, Angle360, Longitude, Latitude};
use crate::datetime::EpochMillis;

/* #region BoundingBox *******************************************************************************************/

/// a generic bounding box without semantics for the coordinate type
#[derive(Debug,Copy,Clone,Serialize,Deserialize,PartialEq)]
pub struct BoundingBox <T: Num> {
    pub west: T,
    pub south: T,
    pub east: T,
    pub north: T
}

impl <T: Num + Copy + PartialOrd + ToPrimitive> BoundingBox<T> {
    pub fn new (west: T, south: T, east: T, north: T)->Self {
        BoundingBox{ west, south, east, north }
    }

    pub fn to_minmax_array (&self) -> [T;4] {
        [self.west, self.south, self.east, self.north]
    }

    pub fn contains (&self, x: T, y: T)->bool {
        x >= self.west && x <= self.east && y >= self.south && y <= self.north
    }
}

impl BoundingBox<f64> {
    /// a lon/lat degree box of [lon-dx, lon+dx] x [lat-dy, lat+dy]. Note we do not normalize the
    /// result since query APIs reject wrapped boxes anyway
    pub fn around (center: &GeoPoint, dx: f64, dy: f64)->Self {
        let lon = center.longitude_degrees();
        let lat = center.latitude_degrees();
        BoundingBox { west: lon - dx, south: lat - dy, east: lon + dx, north: lat + dy }
    }

    pub fn center (&self)->GeoPoint {
        GeoPoint::from_lon_lat_degrees( (self.west + self.east) / 2.0, (self.south + self.north) / 2.0)
    }
}

/* #endregion BoundingBox */

/* #region GeoPoint ***********************************************************************************************/

/// a wrapper for geo::Point that uses geodetic degrees stored as f64
#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
#[serde(from = "LonLat", into = "LonLat")]
pub struct GeoPoint(Point);

/// the serialized form of a GeoPoint
#[derive(Serialize,Deserialize)]
struct LonLat {
    #[serde(alias="longitude", alias="x")]
    lon: f64,
    #[serde(alias="latitude", alias="y")]
    lat: f64
}

impl From<LonLat> for GeoPoint {
    fn from (ll: LonLat)->Self { GeoPoint::from_lon_lat_degrees( ll.lon, ll.lat) }
}

impl From<GeoPoint> for LonLat {
    fn from (p: GeoPoint)->Self { LonLat { lon: p.longitude_degrees(), lat: p.latitude_degrees() } }
}

impl GeoPoint {
    pub fn from_lon_lat (lon: Longitude, lat: Latitude) -> Self {
        GeoPoint( Point::new( lon.degrees(), lat.degrees()))
    }

    pub fn from_lon_lat_degrees (lon: f64, lat: f64) -> Self {
        GeoPoint( Point::new( normalize_180(lon), normalize_90(lat)))
    }

    #[inline] pub fn longitude (&self) -> Longitude { Longitude::from_degrees( self.0.x()) }
    #[inline] pub fn latitude (&self) -> Latitude { Latitude::from_degrees( self.0.y()) }

    #[inline] pub fn longitude_degrees (&self)->f64 { self.0.x() }
    #[inline] pub fn latitude_degrees (&self)->f64 { self.0.y() }

    pub fn point (&self) -> &Point { &self.0 }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.5},{:.5}]", self.0.x(), self.0.y())
    }
}

/* #endregion GeoPoint */

/* #region GeoPoint3 ***********************************************************************************************/

/// 3 dimensional point given by longitude, latitude (degrees) and altitude above ellipsoid (meters)
#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
#[serde(from = "LonLatAlt", into = "LonLatAlt")]
pub struct GeoPoint3 {
    point: Point,
    alt: f64
}

#[derive(Serialize,Deserialize)]
struct LonLatAlt {
    #[serde(alias="longitude", alias="x")]
    lon: f64,
    #[serde(alias="latitude", alias="y")]
    lat: f64,
    #[serde(alias="altitude", alias="z")]
    alt: f64
}

impl From<LonLatAlt> for GeoPoint3 {
    fn from (p: LonLatAlt)->Self { GeoPoint3::from_lon_lat_degrees_alt_meters( p.lon, p.lat, p.alt) }
}

impl From<GeoPoint3> for LonLatAlt {
    fn from (p: GeoPoint3)->Self { LonLatAlt { lon: p.longitude_degrees(), lat: p.latitude_degrees(), alt: p.alt } }
}

impl GeoPoint3 {
    pub fn from_lon_lat_alt (lon: Longitude, lat: Latitude, alt: Length) -> Self {
        GeoPoint3 { point: Point::new( lon.degrees(), lat.degrees()), alt: alt.get::<meter>() }
    }

    pub fn from_lon_lat_degrees_alt_meters (lon: f64, lat: f64, alt: f64) -> Self {
        GeoPoint3 { point: Point::new( normalize_180(lon), normalize_90(lat)), alt }
    }

    #[inline] pub fn longitude (&self) -> Longitude { Longitude::from_degrees( self.point.x()) }
    #[inline] pub fn latitude (&self) -> Latitude { Latitude::from_degrees( self.point.y()) }
    #[inline] pub fn altitude (&self) -> Length { Length::new::<meter>(self.alt) }

    #[inline] pub fn longitude_degrees (&self) -> f64 { self.point.x() }
    #[inline] pub fn latitude_degrees (&self) -> f64 { self.point.y() }
    #[inline] pub fn altitude_meters (&self) -> f64 { self.alt }

    pub fn geo_point (&self)->GeoPoint { GeoPoint( self.point) }

    pub fn with_altitude_meters (&self, alt: f64)->Self {
        GeoPoint3 { point: self.point, alt }
    }

    /// move the horizontal position along the WGS84 geodesic that starts at self with the given bearing.
    /// The altitude is kept - vertical movement is up to the caller
    pub fn geodesic_destination (&self, dist: Length, bearing: Angle360)->Self {
        let d = dist.get::<meter>();
        if d == 0.0 {
            *self
        } else {
            let p = Geodesic.destination( self.point, bearing.degrees(), d);
            GeoPoint3::from_lon_lat_degrees_alt_meters( p.x(), p.y(), self.alt)
        }
    }

    /// horizontal (ellipsoid surface) distance, ignoring altitude
    pub fn geodesic_distance_to (&self, other: &GeoPoint3)->Length {
        Length::new::<meter>( Geodesic.distance( self.point, other.point))
    }
}

impl fmt::Display for GeoPoint3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.5},{:.5},{:.0}]", self.longitude_degrees(), self.latitude_degrees(), self.altitude_meters())
    }
}

/* #endregion GeoPoint3 */

/* #region GeoPoint4 ***********************************************************************************************/

/// a dated GeoPoint3
#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
pub struct GeoPoint4 {
    pub location: GeoPoint3,
    pub date: EpochMillis  // msec is enough precision and keeps GeoPoint4 arrays dense
}

impl GeoPoint4 {
    pub fn from_geo3_epoch (location: GeoPoint3, date: EpochMillis)-> Self {
        GeoPoint4{ location, date }
    }

    #[inline] pub fn altitude (&self) -> Length { self.location.altitude() }
    #[inline] pub fn epoch_millis (&self) -> EpochMillis { self.date }
}

/* #endregion GeoPoint4 */

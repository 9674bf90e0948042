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
#![allow(unused)]

use uom::si::f64::Length;
use uom::si::length::meter;
use odin_common::angle::*;
use odin_common::geo::*;

// run with "cargo test test_angles -- --nocapture"

#[test]
fn test_angles() {
    let lon = Longitude::from_degrees(200.0);
    println!("display lon = {}", lon);
    println!("debug lon = {:?}", lon);
    assert_eq!( lon.degrees(), -160.0);

    let lon1 = Longitude::from_degrees(-160.0);
    assert!( lon == lon1);

    assert_eq!( Latitude::from_degrees(100.0).degrees(), 80.0);
    assert_eq!( Angle360::from_degrees(-90.0).degrees(), 270.0);
    assert_eq!( (Angle360::from_degrees(350.0) + Angle360::from_degrees(20.0)).degrees(), 10.0);

    let hdg: Angle360 = serde_json::from_str("90").unwrap();
    assert_eq!( hdg.degrees(), 90.0);

    let lat: Result<Latitude,_> = serde_json::from_str("95.0");
    println!("out of range latitude: {:?}", lat);
    assert!( lat.is_err());
}

#[test]
fn test_geo_point_serde() {
    let input = r#"{ "longitude": -122.0, "latitude": 37.0 }"#;
    let p: GeoPoint = serde_json::from_str(&input).unwrap();
    println!("deserialized GeoPoint: {p:?}");
    assert_eq!( p.longitude_degrees(), -122.0);
    assert_eq!( p.latitude_degrees(), 37.0);

    // alternative deserialization formats
    let input = r#"{ "x": -122.0, "y": 37.0 }"#;
    let p1: GeoPoint = serde_json::from_str(&input).unwrap();
    assert_eq!( p, p1);

    let s: String = serde_json::to_string(&p).unwrap();
    println!("serialized GeoPoint: '{}'", s);
    assert_eq!( s, r#"{"lon":-122.0,"lat":37.0}"#);

    let input = r#"{ "lon": -117.0, "lat": 34.0, "alt": 1000.0 }"#;
    let p3: GeoPoint3 = serde_json::from_str(&input).unwrap();
    println!("deserialized GeoPoint3: {p3}");
    assert_eq!( p3.altitude_meters(), 1000.0);
}

#[test]
fn test_geodesic_destination() {
    let p0 = GeoPoint3::from_lon_lat_degrees_alt_meters( -117.0, 34.0, 1000.0);

    let p1 = p0.geodesic_destination( Length::new::<meter>(500.0), Angle360::from_degrees(90.0));
    let d = p0.geodesic_distance_to(&p1).get::<meter>();
    println!("{} -> {} : {}m", p0, p1, d);

    assert!( (d - 500.0).abs() < 0.01);
    assert!( p1.longitude_degrees() > p0.longitude_degrees());
    assert!( (p1.latitude_degrees() - p0.latitude_degrees()).abs() < 1e-4);
    assert_eq!( p1.altitude_meters(), 1000.0);

    // moving west gets us close to where we started. Both legs bend towards the equator so we end up a few
    // centimeters south of p0 (about d²·tan(lat)/R)
    let p2 = p1.geodesic_destination( Length::new::<meter>(500.0), Angle360::from_degrees(270.0));
    let offset = p2.geodesic_distance_to(&p0).get::<meter>();
    println!("{} -> {} : {:.4}m off", p1, p2, offset);
    assert!( offset < 0.05);
    assert!( p2.latitude_degrees() < p0.latitude_degrees());

    // zero distance is the identity
    let p3 = p0.geodesic_destination( Length::new::<meter>(0.0), Angle360::from_degrees(45.0));
    assert_eq!( p0, p3);
}

#[test]
fn test_bbox_around() {
    let center = GeoPoint::from_lon_lat_degrees( -117.18, 33.5556);
    let bbox = BoundingBox::<f64>::around( &center, 0.5, 0.5);
    println!("bbox around {center}: {bbox:?}");

    assert!( (bbox.west - -117.68).abs() < 1e-9);
    assert!( (bbox.east - -116.68).abs() < 1e-9);
    assert!( (bbox.south - 33.0556).abs() < 1e-9);
    assert!( (bbox.north - 34.0556).abs() < 1e-9);

    assert!( bbox.contains( -117.0, 33.6));
    assert!( !bbox.contains( -118.0, 33.6));

    let c = bbox.center();
    assert!( (c.longitude_degrees() - center.longitude_degrees()).abs() < 1e-9);
    assert!( (c.latitude_degrees() - center.latitude_degrees()).abs() < 1e-9);
}

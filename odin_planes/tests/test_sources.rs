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

use odin_planes::{
    errors::OdinPlanesError,
    opensky::{self, OpenSkyConfig, Credentials},
    feature_service::{self, FeatureServiceConfig, FeatureServiceConnector},
};

// run with "cargo test --test test_sources -- --nocapture"

const STATES: &str = r#"{
  "time": 1700000000,
  "states": [
    ["a1b2c3", "N123AB  ", "United States", 1699999995, 1699999996, -117.0, 34.0, 950.0, false, 100.0, 90.0, 0.0, null, 1000.0, "1200", false, 0],
    ["abc123", "        ", "United States", 1699999990.0, 1699999996, -117.5, 33.9, null, false, 55.5, 270.0, -2.5, null, null, null, false, 0],
    ["def456", "UAL42", "United States", null, 1699999996, null, null, null, true, 0.0, null, null, null, null, null, false, 0],
    [null, null, "Unknown", null, 1699999996, -117.2, 33.2, 500.0, false, 10.0, 0.0, 0.0, null, null, null, false, 0]
  ]
}"#;

#[test]
fn test_parse_states() {
    let records = opensky::parse_states( STATES.as_bytes()).unwrap();
    for r in &records { println!("{:?}", r) }

    assert_eq!( records.len(), 3); // last row has no id

    let r = &records[0];
    assert_eq!( r.call_sign, "N123AB");
    assert_eq!( r.icao24.as_deref(), Some("a1b2c3"));
    assert_eq!( r.position(), Some((-117.0, 34.0)));
    assert_eq!( r.altitude(), Some(1000.0));
    assert_eq!( r.baro_altitude, Some(950.0));
    assert_eq!( r.velocity, Some(100.0));
    assert_eq!( r.true_track, Some(90.0));
    assert_eq!( r.time_position, Some(1699999995));

    let r = &records[1];
    assert_eq!( r.call_sign, "abc123"); // blank callsign falls back to icao24
    assert_eq!( r.altitude(), None);
    assert_eq!( r.vertical_rate, Some(-2.5));
    assert_eq!( r.time_position, Some(1699999990));

    let r = &records[2];
    assert_eq!( r.call_sign, "UAL42");
    assert_eq!( r.position(), None); // passed on, the store decides to skip it
    assert_eq!( r.time_position, None);
}

#[test]
fn test_parse_empty_states() {
    let records = opensky::parse_states( br#"{"time": 1700000000, "states": null}"#).unwrap();
    assert!( records.is_empty());

    let records = opensky::parse_states( br#"{"time": 1700000000, "states": []}"#).unwrap();
    assert!( records.is_empty());

    let res = opensky::parse_states( b"<html>rate limited</html>");
    assert!( matches!( res, Err(OdinPlanesError::SerdeError(_))));
}

#[test]
fn test_opensky_config() {
    let config: OpenSkyConfig = odin_planes::load_config( "opensky.ron").unwrap();
    println!("{:?}", config);
    assert!( config.url.ends_with("/states/all"));
    assert!( config.credentials.is_none());
    assert_eq!( config.request_timeout.as_secs(), 15);

    let creds = Credentials { user: "someone".to_string(), password: "secret".to_string() };
    let s = format!("{:?}", creds);
    assert!( s.contains("someone"));
    assert!( !s.contains("secret"));
}

const FEATURES: &str = r#"{
  "objectIdFieldName": "OBJECTID",
  "features": [
    { "attributes": { "OBJECTID": 1, "callsign": "SWA1234 ", "icao24": "a0b1c2", "longitude": -117.3, "latitude": 33.7,
                      "geo_altitude": 3000.0, "baro_altitude": 2950.0, "velocity": 180.0, "true_track": 135.0,
                      "vertical_rate": 3.2, "time_position": 1699999998.0 } },
    { "attributes": { "OBJECTID": 2, "callsign": null, "icao24": "ffee01", "longitude": -117.1, "latitude": 33.4,
                      "velocity": null, "time_position": null } }
  ]
}"#;

#[test]
fn test_parse_features() {
    let records = feature_service::parse_features( FEATURES.as_bytes()).unwrap();
    for r in &records { println!("{:?}", r) }
    assert_eq!( records.len(), 2);

    let r = &records[0];
    assert_eq!( r.call_sign, "SWA1234");
    assert_eq!( r.position(), Some((-117.3, 33.7)));
    assert_eq!( r.altitude(), Some(3000.0));
    assert_eq!( r.true_track, Some(135.0));
    assert_eq!( r.time_position, Some(1699999998));

    let r = &records[1];
    assert_eq!( r.call_sign, "ffee01");
    assert_eq!( r.velocity, None);
    assert_eq!( r.altitude(), None);
}

#[test]
fn test_feature_service_errors() {
    let res = feature_service::parse_features( br#"{"error": {"code": 400, "message": "Invalid query parameters"}}"#);
    assert!( matches!( res, Err(OdinPlanesError::OpFailedError(_))));

    let res = feature_service::parse_features( br#"{"count": 0}"#);
    assert!( matches!( res, Err(OdinPlanesError::ParseError(_))));

    // incomplete snapshots are still returned
    let records = feature_service::parse_features( br#"{"features": [], "exceededTransferLimit": true}"#).unwrap();
    assert!( records.is_empty());
}

#[test]
fn test_feature_service_config() {
    let config: FeatureServiceConfig = odin_planes::load_config( "features.ron").unwrap();
    assert!( config.url.ends_with("FeatureServer/0"));

    let connector = FeatureServiceConnector::new( FeatureServiceConfig { url: "http://localhost/FeatureServer/0/".to_string(), ..config }).unwrap();
    assert_eq!( connector.query_url(), "http://localhost/FeatureServer/0/query");
}

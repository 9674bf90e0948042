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

//! [`TelemetrySource`] for the OpenSky Network REST API (`/api/states/all`).
//!
//! The response carries state vectors as untyped JSON arrays. We only use the following columns:
//! ```text
//!   0: icao24          5: longitude       9: velocity (m/s)        13: geo_altitude (m)
//!   1: callsign        6: latitude       10: true_track (deg)
//!   3: time_position   7: baro_altitude  11: vertical_rate (m/s)
//! ```

use std::{env, fmt, time::Duration};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Serialize,Deserialize};
use serde_json::Value;
use tracing::{debug,trace};
use odin_common::{datetime::{deserialize_duration, serialize_duration}, geo::BoundingBox};

use crate::{RawAircraftRecord, TelemetrySource, errors::{OdinPlanesError, Result}};

pub const USER_VAR: &str = "OPENSKY_USER";
pub const PASSWORD_VAR: &str = "OPENSKY_PASSWORD";

#[derive(Serialize,Deserialize,Debug,Clone)]
pub struct OpenSkyConfig {
    pub url: String,

    #[serde(default)]
    pub credentials: Option<Credentials>,

    #[serde(deserialize_with="deserialize_duration", serialize_with="serialize_duration")]
    pub request_timeout: Duration,
}

impl OpenSkyConfig {
    /// set credentials from `OPENSKY_USER` and `OPENSKY_PASSWORD` if both are defined
    pub fn with_env_credentials (mut self)->Self {
        if let Some(creds) = Credentials::from_env() {
            self.credentials = Some(creds);
        }
        self
    }
}

/// basic auth credentials. These should never be part of the URL
#[derive(Serialize,Deserialize,Clone)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl Credentials {
    pub fn from_env ()->Option<Self> {
        match (env::var(USER_VAR), env::var(PASSWORD_VAR)) {
            (Ok(user), Ok(password)) => Some( Credentials{user,password}),
            _ => None
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!( f, "Credentials( user: {}, password: *** )", self.user)
    }
}

pub struct OpenSkyConnector {
    config: OpenSkyConfig,
    client: Client,
}

impl OpenSkyConnector {
    pub fn new (config: OpenSkyConfig)->Result<Self> {
        let client = Client::builder().timeout( config.request_timeout).build()?;
        Ok( OpenSkyConnector { config, client } )
    }
}

#[async_trait]
impl TelemetrySource for OpenSkyConnector {
    async fn fetch_states (&self, area: &BoundingBox<f64>)->Result<Vec<RawAircraftRecord>> {
        let mut req = self.client.get( self.config.url.as_str())
            .query( &[("lamin", area.south), ("lomin", area.west), ("lamax", area.north), ("lomax", area.east)]);
        if let Some(creds) = &self.config.credentials {
            req = req.basic_auth( &creds.user, Some(&creds.password));
        }

        let response = req.send().await?;
        match response.status() {
            StatusCode::OK => {
                let bytes = response.bytes().await?;
                trace!("got {} bytes of state vectors", bytes.len());
                parse_states( &bytes)
            }
            other => Err( OdinPlanesError::HttpStatusError( other.as_u16()))
        }
    }
}

#[derive(Deserialize,Debug)]
struct StateVectorResponse {
    states: Option<Vec<Vec<Value>>>, // null if there are no aircraft in the area
}

/// parse an OpenSky `states/all` response. Rows without any id are ignored, rows without position are passed on
pub fn parse_states (data: &[u8])->Result<Vec<RawAircraftRecord>> {
    let response: StateVectorResponse = serde_json::from_slice( data)?;

    let mut records = Vec::new();
    if let Some(states) = response.states {
        records.reserve( states.len());
        for row in states.iter() {
            match record_from_row( row) {
                Some(rec) => records.push(rec),
                None => debug!("ignoring state vector without id: {:?}", row)
            }
        }
    }
    Ok(records)
}

fn record_from_row (row: &[Value])->Option<RawAircraftRecord> {
    let icao24 = str_at( row, 0);
    let call_sign = str_at( row, 1).or( icao24)?.to_string();

    Some( RawAircraftRecord {
        call_sign,
        icao24: icao24.map( |s| s.to_string()),
        longitude: f64_at( row, 5),
        latitude: f64_at( row, 6),
        geo_altitude: f64_at( row, 13),
        baro_altitude: f64_at( row, 7),
        velocity: f64_at( row, 9),
        true_track: f64_at( row, 10),
        vertical_rate: f64_at( row, 11),
        time_position: i64_at( row, 3),
    })
}

// callsigns are space padded to 8 chars
fn str_at (row: &[Value], idx: usize)->Option<&str> {
    row.get(idx).and_then( Value::as_str).map( str::trim).filter( |s| !s.is_empty())
}

fn f64_at (row: &[Value], idx: usize)->Option<f64> {
    row.get(idx).and_then( Value::as_f64)
}

fn i64_at (row: &[Value], idx: usize)->Option<i64> {
    row.get(idx).and_then( |v| v.as_i64().or_else( || v.as_f64().map( |x| x as i64)))
}

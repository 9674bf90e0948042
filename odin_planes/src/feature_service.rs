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

//! [`TelemetrySource`] for ArcGIS feature service layers that republish OpenSky state vectors as point features
//! with attributes `callsign`, `longitude`, `latitude`, `geo_altitude`, `baro_altitude`, `velocity`, `true_track`,
//! `vertical_rate` and `time_position`

use std::time::Duration;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Serialize,Deserialize};
use tracing::warn;
use odin_common::{datetime::{deserialize_duration, serialize_duration}, geo::BoundingBox};

use crate::{RawAircraftRecord, TelemetrySource, errors::{OdinPlanesError, Result, op_failed, parse_error}};

#[derive(Serialize,Deserialize,Debug,Clone)]
pub struct FeatureServiceConfig {
    pub url: String, // the layer URL, e.g. "https://services.arcgis.com/../FeatureServer/0"

    #[serde(deserialize_with="deserialize_duration", serialize_with="serialize_duration")]
    pub request_timeout: Duration,
}

pub struct FeatureServiceConnector {
    config: FeatureServiceConfig,
    client: Client,
}

impl FeatureServiceConnector {
    pub fn new (config: FeatureServiceConfig)->Result<Self> {
        let client = Client::builder().timeout( config.request_timeout).build()?;
        Ok( FeatureServiceConnector { config, client } )
    }

    pub fn query_url (&self)->String {
        format!("{}/query", self.config.url.trim_end_matches('/'))
    }
}

#[async_trait]
impl TelemetrySource for FeatureServiceConnector {
    async fn fetch_states (&self, area: &BoundingBox<f64>)->Result<Vec<RawAircraftRecord>> {
        let envelope = format!("{},{},{},{}", area.west, area.south, area.east, area.north);
        let params: [(&str,&str);8] = [
            ("where", "1=1"),
            ("geometry", envelope.as_str()),
            ("geometryType", "esriGeometryEnvelope"),
            ("inSR", "4326"),
            ("spatialRel", "esriSpatialRelIntersects"),
            ("outFields", "*"),
            ("returnGeometry", "false"),
            ("f", "json"),
        ];

        let response = self.client.get( self.query_url()).query( &params).send().await?;
        match response.status() {
            StatusCode::OK => {
                let bytes = response.bytes().await?;
                parse_features( &bytes)
            }
            other => Err( OdinPlanesError::HttpStatusError( other.as_u16()))
        }
    }
}

#[derive(Deserialize,Debug)]
struct QueryResponse {
    features: Option<Vec<Feature>>,
    #[serde(rename="exceededTransferLimit", default)]
    exceeded_transfer_limit: bool,
    error: Option<ServiceError>, // feature services report errors with a 200 status
}

#[derive(Deserialize,Debug)]
struct ServiceError {
    code: Option<i64>,
    message: Option<String>,
}

#[derive(Deserialize,Debug)]
struct Feature {
    attributes: FeatureAttributes,
}

#[derive(Deserialize,Debug)]
struct FeatureAttributes {
    callsign: Option<String>,
    icao24: Option<String>,
    longitude: Option<f64>,
    latitude: Option<f64>,
    geo_altitude: Option<f64>,
    baro_altitude: Option<f64>,
    velocity: Option<f64>,
    true_track: Option<f64>,
    vertical_rate: Option<f64>,
    time_position: Option<f64>, // layers store this as double
}

impl From<FeatureAttributes> for RawAircraftRecord {
    fn from (a: FeatureAttributes)->Self {
        let icao24 = a.icao24.map( |s| s.trim().to_string()).filter( |s| !s.is_empty());
        let call_sign = match a.callsign.as_deref().map( str::trim) {
            Some(cs) if !cs.is_empty() => cs.to_string(),
            _ => icao24.clone().unwrap_or_default()
        };

        RawAircraftRecord {
            call_sign,
            icao24,
            longitude: a.longitude,
            latitude: a.latitude,
            geo_altitude: a.geo_altitude,
            baro_altitude: a.baro_altitude,
            velocity: a.velocity,
            true_track: a.true_track,
            vertical_rate: a.vertical_rate,
            time_position: a.time_position.map( |t| t as i64),
        }
    }
}

/// parse a feature service `query` response (`f=json`)
pub fn parse_features (data: &[u8])->Result<Vec<RawAircraftRecord>> {
    let response: QueryResponse = serde_json::from_slice( data)?;

    if let Some(err) = response.error {
        return Err( op_failed!("feature service error {:?}: {}", err.code, err.message.unwrap_or_default()))
    }

    // TODO - page through results with resultOffset once layers start hitting their record limit
    if response.exceeded_transfer_limit {
        warn!("feature service transfer limit exceeded, snapshot is incomplete");
    }

    match response.features {
        Some(features) => Ok( features.into_iter().map( |f| RawAircraftRecord::from( f.attributes)).collect()),
        None => Err( parse_error!("no features in response"))
    }
}

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

//! dead-reckoning track engine for aircraft telemetry snapshots.
//!
//! A [`TrackStore`] keeps one [`AircraftTrack`] per call sign. Tracks are reconciled in place with periodic bounding box
//! snapshots obtained from a [`TelemetrySource`], and are advanced between snapshots by first order extrapolation along
//! WGS84 geodesics (see [`GeodeticMover`]). Tracks that did not get a new telemetry fix within the configured staleness
//! threshold are evicted by periodic cleanup sweeps.
//!
//! The store itself is single threaded. The [`actor`] module provides a tokio task that owns a store and serializes ticks,
//! snapshot reconciliation and client requests.

use std::{collections::VecDeque, fmt, time::Duration};
use serde::{Serialize,Deserialize};
use async_trait::async_trait;
use uom::si::{f64::{Length,Velocity}, length::meter, velocity::{meter_per_second,knot}};
use odin_common::{
    define_load_config,
    angle::Angle360,
    datetime::{self, EpochMillis, deserialize_duration, serialize_duration, deserialize_optional_duration, serialize_optional_duration},
    geo::{BoundingBox, GeoPoint, GeoPoint3, GeoPoint4}
};

pub mod errors;
use errors::{Result, invalid_config};

pub mod observer;
pub use observer::{Topic, TrackEvent, FieldChange, SubscriptionId};

pub mod store;
pub use store::{TrackStore, TickAction};

pub mod actor;

pub mod opensky;
pub mod feature_service;

define_load_config!{}

/* #region config ***********************************************************************************************/

/// the tracker configuration. All fields have defaults so that config files only need to specify what differs
#[derive(Serialize,Deserialize,Debug,Clone)]
#[serde(default)]
pub struct TrackerConfig {
    pub updates_per_second: u32,  // extrapolation tick rate
    pub seconds_per_query: u32,   // snapshot refresh interval
    pub seconds_per_cleanup: u32, // eviction sweep interval

    /// staleness threshold for tracks. Defaults to `seconds_per_cleanup`
    #[serde(deserialize_with="deserialize_optional_duration", serialize_with="serialize_optional_duration")]
    pub drop_after: Option<Duration>,

    pub coordinate_tolerance: f64, // half width/height of the query box in degrees
    pub center: GeoPoint,

    pub max_trace: usize, // number of dated snapshot fixes we keep per track

    #[serde(deserialize_with="deserialize_duration", serialize_with="serialize_duration")]
    pub request_timeout: Duration,

    pub max_backoff: u32, // max number of scheduled refreshes we skip after consecutive failures
}

impl Default for TrackerConfig {
    fn default()->Self {
        TrackerConfig {
            updates_per_second: 5,
            seconds_per_query: 10,
            seconds_per_cleanup: 30,
            drop_after: None,
            coordinate_tolerance: 0.5,
            center: GeoPoint::from_lon_lat_degrees( -117.18, 33.5556),
            max_trace: 16,
            request_timeout: datetime::secs(15),
            max_backoff: 8,
        }
    }
}

impl TrackerConfig {
    pub fn validate (&self)->Result<()> {
        if self.updates_per_second == 0 { return Err( invalid_config!("updates_per_second has to be > 0")) }
        if self.seconds_per_query == 0 { return Err( invalid_config!("seconds_per_query has to be > 0")) }
        if self.seconds_per_cleanup == 0 { return Err( invalid_config!("seconds_per_cleanup has to be > 0")) }
        if !self.coordinate_tolerance.is_finite() || self.coordinate_tolerance < 0.0 {
            return Err( invalid_config!("invalid coordinate_tolerance {}", self.coordinate_tolerance))
        }
        if self.request_timeout.is_zero() { return Err( invalid_config!("request_timeout has to be > 0")) }
        Ok(())
    }

    pub fn drop_after (&self)->Duration {
        self.drop_after.unwrap_or( datetime::secs( self.seconds_per_cleanup as u64))
    }

    /// nominal time between two ticks
    pub fn tick_interval (&self)->Duration {
        Duration::from_secs_f64( 1.0 / self.updates_per_second as f64)
    }

    pub fn ticks_per_query (&self)->u64 { self.seconds_per_query as u64 * self.updates_per_second as u64 }
    pub fn ticks_per_cleanup (&self)->u64 { self.seconds_per_cleanup as u64 * self.updates_per_second as u64 }
}

/* #endregion config */

/* #region collaborators ****************************************************************************************/

/// one aircraft state as reported by a telemetry source. Everything but the call sign is optional since
/// sources report whatever they got. Altitudes are in meters, speeds in m/s, `time_position` is the
/// epoch seconds of the last position fix
#[derive(Serialize,Deserialize,Debug,Clone,Default,PartialEq)]
pub struct RawAircraftRecord {
    pub call_sign: String,
    pub icao24: Option<String>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub geo_altitude: Option<f64>,
    pub baro_altitude: Option<f64>,
    pub velocity: Option<f64>,
    pub true_track: Option<f64>,
    pub vertical_rate: Option<f64>, // positive is climbing
    pub time_position: Option<i64>,
}

impl RawAircraftRecord {
    /// geometric altitude if we have it, barometric otherwise
    pub fn altitude (&self)->Option<f64> {
        self.geo_altitude.or( self.baro_altitude)
    }

    pub fn position (&self)->Option<(f64,f64)> {
        match (self.longitude, self.latitude) {
            (Some(lon), Some(lat)) if lon.is_finite() && lat.is_finite() => Some((lon,lat)),
            _ => None
        }
    }
}

/// where we get aircraft state snapshots from
#[async_trait]
pub trait TelemetrySource: Send + Sync {
    /// all aircraft states within the given lon/lat degree box
    async fn fetch_states (&self, area: &BoundingBox<f64>)->Result<Vec<RawAircraftRecord>>;
}

/// moves a point along the earth surface
pub trait GeodeticMover: Send + Sync {
    fn move_geodetic (&self, point: &GeoPoint3, distance: Length, bearing: Angle360)->GeoPoint3;
}

/// the default mover, which follows WGS84 geodesics
#[derive(Debug,Default,Clone,Copy)]
pub struct Wgs84Mover;

impl GeodeticMover for Wgs84Mover {
    fn move_geodetic (&self, point: &GeoPoint3, distance: Length, bearing: Angle360)->GeoPoint3 {
        point.geodesic_destination( distance, bearing)
    }
}

/* #endregion collaborators */

/* #region track ************************************************************************************************/

/// coarse visual size classification of tracked aircraft
#[derive(Serialize,Deserialize,Debug,Clone,Copy,PartialEq,Eq)]
pub enum SizeClass {
    Small,
    Large
}

impl SizeClass {
    /// this is only a heuristic for US registered general aviation tail numbers ("N...") vs. flight numbers, it
    /// misclassifies many foreign registrations
    pub fn from_call_sign (call_sign: &str)->Self {
        if call_sign.starts_with('N') { SizeClass::Small } else { SizeClass::Large }
    }
}

/// the data model for a tracked aircraft.
/// Fields are only mutated by the [`TrackStore`] that owns the track
#[derive(Debug,Clone)]
pub struct AircraftTrack {
    pub(crate) id: u64,  // store unique serial, stays the same over the lifetime of the track
    pub(crate) call_sign: String,

    pub(crate) position: GeoPoint3,
    pub(crate) ground_speed: Velocity,
    pub(crate) vertical_rate: Velocity,
    pub(crate) heading: Angle360,

    pub(crate) last_update: EpochMillis, // time of the last telemetry fix, not of the last extrapolation
    pub(crate) size_class: SizeClass,
    pub(crate) selected: bool,

    pub(crate) trace: VecDeque<GeoPoint4>, // used as a ringbuffer
}

impl AircraftTrack {
    pub(crate) fn new (id: u64, call_sign: String, position: GeoPoint3, last_update: EpochMillis, max_trace: usize)->Self {
        let size_class = SizeClass::from_call_sign( call_sign.as_str());
        AircraftTrack {
            id,
            call_sign,
            position,
            ground_speed: Velocity::new::<meter_per_second>(0.0),
            vertical_rate: Velocity::new::<meter_per_second>(0.0),
            heading: Angle360::from_degrees(0.0),
            last_update,
            size_class,
            selected: false,
            trace: VecDeque::with_capacity( max_trace),
        }
    }

    pub fn id (&self)->u64 { self.id }
    pub fn call_sign (&self)->&str { self.call_sign.as_str() }
    pub fn position (&self)->&GeoPoint3 { &self.position }
    pub fn ground_speed (&self)->Velocity { self.ground_speed }
    pub fn vertical_rate (&self)->Velocity { self.vertical_rate }
    pub fn heading (&self)->Angle360 { self.heading }
    pub fn last_update (&self)->EpochMillis { self.last_update }
    pub fn size_class (&self)->SizeClass { self.size_class }
    pub fn is_selected (&self)->bool { self.selected }
    pub fn trace (&self)->&VecDeque<GeoPoint4> { &self.trace }

    /// seconds since the last telemetry fix
    pub fn age_secs (&self, now: EpochMillis)->f64 { now.secs_since( self.last_update) }

    pub(crate) fn push_trace (&mut self, p: GeoPoint4, max_trace: usize) {
        if max_trace > 0 {
            while self.trace.len() >= max_trace { self.trace.pop_front(); }
            self.trace.push_back(p);
        }
    }

    /// advance position and altitude by `dt` seconds of constant speed, heading and vertical rate
    pub(crate) fn extrapolated_position (&self, mover: &dyn GeodeticMover, dt: f64)->GeoPoint3 {
        let dist = Length::new::<meter>( self.ground_speed.get::<meter_per_second>() * dt);
        let alt = self.position.altitude_meters() + self.vertical_rate.get::<meter_per_second>() * dt;
        mover.move_geodetic( &self.position, dist, self.heading).with_altitude_meters( alt)
    }
}

impl fmt::Display for AircraftTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!( f, "AircraftTrack( cs: \"{}\", pos: {}, spd: {:.0}kn, hdg: {:.0}, vr: {:.1}m/s, class: {:?}, time: {}",
            self.call_sign, self.position, self.ground_speed.get::<knot>(), self.heading.degrees(),
            self.vertical_rate.get::<meter_per_second>(), self.size_class, self.last_update)?;
        if self.selected { write!( f, ", selected")?; }
        write!( f, ")")
    }
}

/* #endregion track */

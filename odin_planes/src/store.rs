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

use std::{collections::HashMap, sync::Arc, time::Duration};
use tracing::{debug,warn};
use uom::si::{f64::{Length,Velocity}, length::meter, velocity::meter_per_second};
use odin_common::{
    angle::Angle360,
    datetime::{Clock, EpochMillis},
    geo::{BoundingBox, GeoPoint, GeoPoint3, GeoPoint4}
};

use crate::{
    AircraftTrack, GeodeticMover, RawAircraftRecord, TelemetrySource, TrackerConfig,
    errors::{Result, invalid_config},
    observer::{FieldChange, Observers, SubscriptionId, Topic, TrackCallback, TrackEvent}
};

/// what the driver of a store has to do after a tick
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum TickAction {
    /// this was a query cadence tick. Tracks were not extrapolated, the driver should fetch and apply a new snapshot
    RefreshDue,
    Extrapolated,
}

/// the set of currently tracked aircraft, keyed by call sign.
/// This is a single writer store - ticks, snapshot reconciliation and eviction all require `&mut self`. Use
/// [`crate::actor::spawn_tracker`] to drive it concurrently with asynchronous snapshot retrieval
pub struct TrackStore {
    config: TrackerConfig,
    mover: Arc<dyn GeodeticMover>,
    clock: Arc<dyn Clock>,

    center: GeoPoint,
    tolerance: f64,

    tracks: HashMap<String,AircraftTrack>,
    selected: Option<String>,

    n_ticks: u64,
    next_id: u64,
    dropped_list: Vec<String>, // call signs removed in the last cleanup sweep

    observers: Observers,
    pending: Vec<TrackEvent>, // events of the current mutation, dispatched when it is complete
}

impl TrackStore {
    pub fn new (config: TrackerConfig, mover: Arc<dyn GeodeticMover>, clock: Arc<dyn Clock>)->Result<Self> {
        config.validate()?;

        Ok( TrackStore {
            center: config.center,
            tolerance: config.coordinate_tolerance,
            config,
            mover,
            clock,
            tracks: HashMap::new(),
            selected: None,
            n_ticks: 0,
            next_id: 0,
            dropped_list: Vec::new(),
            observers: Observers::new(),
            pending: Vec::new(),
        })
    }

    //--- the accessors

    pub fn config (&self)->&TrackerConfig { &self.config }
    pub fn now (&self)->EpochMillis { self.clock.epoch_millis() }

    pub fn center (&self)->GeoPoint { self.center }
    pub fn set_center (&mut self, center: GeoPoint) { self.center = center; }

    pub fn tolerance (&self)->f64 { self.tolerance }
    pub fn set_tolerance (&mut self, tolerance: f64)->Result<()> {
        if !tolerance.is_finite() || tolerance < 0.0 { return Err( invalid_config!("invalid coordinate tolerance {}", tolerance)) }
        self.tolerance = tolerance;
        Ok(())
    }

    pub fn get (&self, call_sign: &str)->Option<&AircraftTrack> { self.tracks.get( call_sign) }
    pub fn contains (&self, call_sign: &str)->bool { self.tracks.contains_key( call_sign) }
    pub fn tracks (&self)->impl Iterator<Item=&AircraftTrack> { self.tracks.values() }
    pub fn len (&self)->usize { self.tracks.len() }
    pub fn is_empty (&self)->bool { self.tracks.is_empty() }

    pub fn n_ticks (&self)->u64 { self.n_ticks }
    pub fn dropped_list (&self)->&[String] { self.dropped_list.as_slice() }

    /// cloned tracks, sorted by call sign
    pub fn snapshot (&self)->Vec<AircraftTrack> {
        let mut list: Vec<AircraftTrack> = self.tracks.values().cloned().collect();
        list.sort_by( |a,b| a.call_sign.cmp( &b.call_sign));
        list
    }

    //--- the query area

    pub fn query_area (&self)->BoundingBox<f64> {
        Self::query_area_around( &self.center, self.tolerance)
    }

    /// `[lon-tolerance, lon+tolerance] x [lat-tolerance, lat+tolerance]`
    pub fn query_area_around (center: &GeoPoint, tolerance: f64)->BoundingBox<f64> {
        BoundingBox::<f64>::around( center, tolerance, tolerance)
    }

    //--- snapshot reconciliation

    /// fetch a snapshot for the current query area and apply it. If the fetch fails tracks are not modified
    pub async fn refresh_snapshot<S> (&mut self, source: &S)->Result<usize> where S: TelemetrySource + ?Sized {
        let area = self.query_area();
        match source.fetch_states( &area).await {
            Ok(records) => Ok( self.apply_snapshot( records)),
            Err(e) => {
                warn!("snapshot refresh failed: {e}");
                Err(e)
            }
        }
    }

    /// reconcile tracks with a new set of telemetry records. Positions are caught up to the current time of our
    /// clock. Records without call sign or position are skipped. Returns the number of applied records
    pub fn apply_snapshot (&mut self, records: Vec<RawAircraftRecord>)->usize {
        let now = self.clock.epoch_millis();
        let notify = !self.observers.is_empty();
        let max_trace = self.config.max_trace;
        let mut n_applied = 0;

        for rec in records.iter() {
            let call_sign = rec.call_sign.trim();
            if call_sign.is_empty() {
                debug!("skipping record without call sign: {:?}", rec);
                continue
            }
            let Some((lon,lat)) = rec.position() else {
                debug!("skipping record without position: {}", call_sign);
                continue
            };

            // a record without (plausible) fix time is not caught up, and will be evicted by the next sweep
            let fix_time = rec.time_position.map( EpochMillis::from_secs);
            let (last_update, dt) = match fix_time {
                Some(t) if t.is_valid() => (t, now.secs_since( t).max(0.0)),
                Some(_) => {
                    debug!("ignoring out of range fix time of {}: {:?}", call_sign, rec.time_position);
                    (EpochMillis::default(), 0.0)
                }
                None => (EpochMillis::default(), 0.0)
            };

            let spd = rec.velocity.unwrap_or(0.0);
            let vr = rec.vertical_rate.unwrap_or(0.0);
            let heading = Angle360::from_degrees( rec.true_track.unwrap_or(0.0));
            let ground_speed = Velocity::new::<meter_per_second>( spd);
            let vertical_rate = Velocity::new::<meter_per_second>( vr);

            let alt = rec.altitude().unwrap_or(0.0);
            let fix = GeoPoint3::from_lon_lat_degrees_alt_meters( lon, lat, alt);
            let position = self.mover.move_geodetic( &fix, Length::new::<meter>( spd * dt), heading)
                .with_altitude_meters( alt + vr * dt);

            match self.tracks.get( call_sign) {
                Some(track) => {
                    if notify {
                        let cs = &track.call_sign;
                        if track.position != position { self.pending.push( changed( cs, FieldChange::Position(position))) }
                        if track.ground_speed != ground_speed { self.pending.push( changed( cs, FieldChange::GroundSpeed(ground_speed))) }
                        if track.vertical_rate != vertical_rate { self.pending.push( changed( cs, FieldChange::VerticalRate(vertical_rate))) }
                        if track.heading != heading { self.pending.push( changed( cs, FieldChange::Heading(heading))) }
                    }
                }
                None => {
                    self.next_id += 1;
                    let track = AircraftTrack::new( self.next_id, call_sign.to_string(), position, last_update, max_trace);
                    self.tracks.insert( call_sign.to_string(), track);
                    if notify { self.pending.push( TrackEvent::Added( call_sign.to_string())) }
                }
            }

            let Some(track) = self.tracks.get_mut( call_sign) else { continue };
            track.position = position;
            track.ground_speed = ground_speed;
            track.vertical_rate = vertical_rate;
            track.heading = heading;
            track.last_update = last_update;
            track.push_trace( GeoPoint4::from_geo3_epoch( position, now), max_trace);

            n_applied += 1;
        }

        debug!("applied {} of {} records, {} tracks", n_applied, records.len(), self.tracks.len());
        self.notify();
        n_applied
    }

    //--- extrapolation and eviction

    /// the periodic store update. Every `seconds_per_cleanup * updates_per_second` ticks we evict stale tracks. Every
    /// `seconds_per_query * updates_per_second` ticks we return [`TickAction::RefreshDue`] instead of extrapolating,
    /// otherwise all tracks are advanced by `elapsed`.
    ///
    /// Dead reckoning uses `elapsed` and not the nominal `1/updates_per_second` tick interval. Drivers on schedule pass
    /// the nominal interval, [`crate::actor::spawn_tracker`] passes the measured time since the previous tick so that
    /// delayed ticks do not make tracks fall behind
    pub fn tick (&mut self, elapsed: Duration)->TickAction {
        self.n_ticks += 1;

        if self.n_ticks % self.config.ticks_per_cleanup() == 0 {
            self.remove_stale();
        }

        if self.n_ticks % self.config.ticks_per_query() == 0 {
            TickAction::RefreshDue
        } else {
            self.extrapolate( elapsed);
            TickAction::Extrapolated
        }
    }

    /// advance all tracks by `elapsed` with their current speed, heading and vertical rate.
    /// This does not change the time of the last fix
    pub fn extrapolate (&mut self, elapsed: Duration) {
        let dt = elapsed.as_secs_f64();
        if dt <= 0.0 { return }

        let notify = !self.observers.is_empty();
        for track in self.tracks.values_mut() {
            let position = track.extrapolated_position( self.mover.as_ref(), dt);
            if position != track.position {
                track.position = position;
                if notify { self.pending.push( changed( &track.call_sign, FieldChange::Position(position))) }
            }
        }

        self.notify();
    }

    /// remove all tracks whose last fix is older than the configured `drop_after`. This also clears the selection
    /// if the selected track gets removed. Returns the call signs of removed tracks
    pub fn remove_stale (&mut self)->&[String] {
        let now = self.clock.epoch_millis();
        let max_age = self.config.drop_after().as_millis() as i64;
        let notify = !self.observers.is_empty();

        self.dropped_list.clear();
        for track in self.tracks.values() {
            if now.millis().saturating_sub( track.last_update.millis()) > max_age {
                self.dropped_list.push( track.call_sign.clone());
            }
        }

        for cs in &self.dropped_list {
            self.tracks.remove( cs);
            if notify { self.pending.push( TrackEvent::Removed( cs.clone())) }

            if self.selected.as_ref() == Some(cs) {
                self.selected = None;
                if notify { self.pending.push( TrackEvent::SelectionChanged{ previous: Some(cs.clone()), current: None }) }
            }
        }

        if !self.dropped_list.is_empty() {
            debug!("removed {} stale tracks: {:?}", self.dropped_list.len(), self.dropped_list);
        }

        self.notify();
        self.dropped_list.as_slice()
    }

    //--- selection

    pub fn selected (&self)->Option<&AircraftTrack> {
        self.selected.as_ref().and_then( |cs| self.tracks.get(cs))
    }

    pub fn selected_call_sign (&self)->Option<&str> { self.selected.as_deref() }

    /// select the track with the given call sign, or clear the selection if `None`.
    /// Returns false (and does not change the selection) if there is no such track
    pub fn select (&mut self, call_sign: Option<&str>)->bool {
        if let Some(cs) = call_sign {
            if !self.tracks.contains_key( cs) { return false }
        }

        let current = call_sign.map( |cs| cs.to_string());
        if current == self.selected { return true }

        if let Some(track) = self.selected.as_ref().and_then( |cs| self.tracks.get_mut(cs)) { track.selected = false }
        if let Some(track) = current.as_ref().and_then( |cs| self.tracks.get_mut(cs)) { track.selected = true }

        let previous = std::mem::replace( &mut self.selected, current.clone());
        if !self.observers.is_empty() {
            self.pending.push( TrackEvent::SelectionChanged{ previous, current });
        }
        self.notify();
        true
    }

    //--- observers

    pub fn subscribe (&mut self, topic: Topic, callback: TrackCallback)->SubscriptionId {
        self.observers.subscribe( topic, callback)
    }

    pub fn unsubscribe (&mut self, id: SubscriptionId)->bool {
        self.observers.unsubscribe( id)
    }

    fn notify (&mut self) {
        if self.pending.is_empty() { return }

        let selected = self.selected.as_deref();
        for event in self.pending.iter() {
            self.observers.dispatch( event, selected);
            if let TrackEvent::Removed(cs) = event {
                self.observers.remove_track_subscriptions( cs);
            }
        }
        self.pending.clear();
    }
}

fn changed (call_sign: &str, change: FieldChange)->TrackEvent {
    TrackEvent::Changed{ call_sign: call_sign.to_string(), change }
}

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

use std::{fmt, time::Duration, sync::atomic::{AtomicI64, Ordering}};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Serialize, Deserialize, Serializer, Deserializer};
use parse_duration::parse;

/// milliseconds since the Unix epoch. Telemetry timestamps come in seconds but we keep msec so that
/// sub-second clock values don't get truncated when computing catch-up intervals
#[derive(Serialize,Deserialize,Debug,Clone,Copy,PartialEq,Eq,PartialOrd,Ord,Hash,Default)]
pub struct EpochMillis(i64);

impl EpochMillis {
    pub fn now ()->Self { EpochMillis( Utc::now().timestamp_millis()) }

    pub fn new (millis:i64)->Self { EpochMillis(millis) }

    /// saturates for seconds outside of the i64 millisecond range
    pub fn from_secs (secs: i64)->Self { EpochMillis( secs.saturating_mul(1000)) }

    pub fn millis (&self)->i64 { self.0 }
    pub fn secs (&self)->i64 { self.0 / 1000 }

    /// fractional seconds from `earlier` to self (negative if `earlier` is later)
    pub fn secs_since (&self, earlier: EpochMillis)->f64 {
        self.0.saturating_sub( earlier.0) as f64 / 1000.0
    }

    pub fn is_zero (&self)->bool { self.0 == 0 }

    /// None if we are outside of the chrono date range, which is what we use to detect bogus times
    pub fn to_utc (&self)->Option<DateTime<Utc>> { DateTime::<Utc>::from_timestamp_millis(self.0) }

    pub fn is_valid (&self)->bool { self.to_utc().is_some() }
}

impl fmt::Display for EpochMillis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_utc() {
            Some(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.3fZ")),
            None => write!(f, "{}ms", self.0)
        }
    }
}

impl<Tz> From<DateTime<Tz>> for EpochMillis where Tz: TimeZone {
    fn from (date: DateTime<Tz>)->Self { EpochMillis(date.timestamp_millis()) }
}

/* #region clocks *****************************************************************************************/

/// where we get "now" from. This should be used wherever we might have to use a sim clock instead of
/// the wall clock, which in particular includes everything that computes ages or extrapolation intervals
pub trait Clock: Send + Sync {
    fn now (&self)->DateTime<Utc>;

    fn epoch_millis (&self)->EpochMillis { EpochMillis::from( self.now()) }
}

#[derive(Debug,Default,Clone,Copy)]
pub struct WallClock;

impl Clock for WallClock {
    #[inline] fn now (&self)->DateTime<Utc> { Utc::now() }
}

/// a manually driven clock that only changes through `set` or `advance`
#[derive(Debug)]
pub struct SimClock {
    millis: AtomicI64
}

impl SimClock {
    pub fn new (start: EpochMillis)->Self {
        SimClock { millis: AtomicI64::new( start.millis()) }
    }

    pub fn from_secs (secs: i64)->Self { Self::new( EpochMillis::from_secs(secs)) }

    pub fn set (&self, t: EpochMillis) {
        self.millis.store( t.millis(), Ordering::Relaxed);
    }

    pub fn advance (&self, dur: Duration) {
        self.millis.fetch_add( dur.as_millis() as i64, Ordering::Relaxed);
    }
}

impl Clock for SimClock {
    fn now (&self)->DateTime<Utc> {
        // out-of-range values can only come from explicitly set bogus times
        DateTime::<Utc>::from_timestamp_millis( self.millis.load(Ordering::Relaxed)).unwrap_or_default()
    }

    fn epoch_millis (&self)->EpochMillis {
        EpochMillis::new( self.millis.load(Ordering::Relaxed))
    }
}

/* #endregion clocks */

// simple Duration ctors so that we don't need the experimental ones
#[inline] pub fn millis (n: u64)->Duration { Duration::from_millis(n) }
#[inline] pub fn secs (n: u64)->Duration { Duration::from_secs(n) }
#[inline] pub fn secs_f64 (n: f64)->Duration { Duration::from_secs_f64(n) }
#[inline] pub fn minutes (n: u64)->Duration { Duration::from_secs(n * 60) }

//--- serde support for human readable durations in config files ("10s", "500ms", "2min")

pub fn deserialize_duration <'a,D>(deserializer: D) -> Result<Duration,D::Error>
    where D: Deserializer<'a>
{
    String::deserialize(deserializer).and_then( |string| {
        parse(string.as_str())
            .map_err( |e| serde::de::Error::custom(format!("{:?}",e)))
    })
}

pub fn serialize_duration<S: Serializer> (dur: &Duration, s: S) -> Result<S::Ok, S::Error>  {
    s.serialize_str( &format!("{}ms", dur.as_millis()))
}

/// for optional config durations that default to a value derived from other fields
pub fn deserialize_optional_duration <'a,D>(deserializer: D) -> Result<Option<Duration>,D::Error>
    where D: Deserializer<'a>
{
    match Option::<String>::deserialize(deserializer)? {
        Some(string) => parse(string.as_str())
            .map( Some)
            .map_err( |e| serde::de::Error::custom(format!("{:?}",e))),
        None => Ok(None)
    }
}

pub fn serialize_optional_duration<S: Serializer> (dur: &Option<Duration>, s: S) -> Result<S::Ok, S::Error>  {
    match dur {
        Some(dur) => s.serialize_some( &format!("{}ms", dur.as_millis())),
        None => s.serialize_none()
    }
}

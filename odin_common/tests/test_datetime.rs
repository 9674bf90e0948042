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

use std::time::Duration;
use serde::{Serialize,Deserialize};
use odin_common::datetime::{self, Clock, EpochMillis, SimClock, deserialize_duration, serialize_duration};

#[test]
fn test_sim_clock() {
    let clock = SimClock::from_secs( 1_700_000_000);
    let t0 = clock.epoch_millis();
    println!("sim clock start: {}", t0);
    assert_eq!( t0.secs(), 1_700_000_000);
    assert_eq!( t0.to_utc().map( |d| d.timestamp()), Some(1_700_000_000));

    clock.advance( datetime::millis(200));
    let t1 = clock.epoch_millis();
    assert_eq!( t1.millis() - t0.millis(), 200);
    assert_eq!( t1.secs_since(t0), 0.2);
    assert_eq!( EpochMillis::from( clock.now()), t1);

    clock.set( EpochMillis::from_secs(42));
    assert_eq!( clock.epoch_millis().secs(), 42);
    assert!( t0.secs_since( EpochMillis::from_secs(1_700_000_005)) < 0.0);
}

#[derive(Serialize,Deserialize,Debug)]
struct Timed {
    #[serde(deserialize_with="deserialize_duration", serialize_with="serialize_duration")]
    interval: Duration
}

#[test]
fn test_duration_serde() {
    let t: Timed = ron::from_str( r#"(interval: "10s")"#).unwrap();
    println!("{t:?}");
    assert_eq!( t.interval, Duration::from_secs(10));

    let t: Timed = ron::from_str( r#"(interval: "500ms")"#).unwrap();
    assert_eq!( t.interval, Duration::from_millis(500));

    let s = ron::to_string(&t).unwrap();
    println!("serialized: {s}");
    let t1: Timed = ron::from_str(&s).unwrap();
    assert_eq!( t1.interval, t.interval);
}

#[test]
fn test_out_of_range_epochs() {
    let t = EpochMillis::from_secs( i64::MAX / 10);
    println!("from_secs(i64::MAX/10) = {}", t);
    assert_eq!( t.millis(), i64::MAX);
    assert!( !t.is_valid());

    let t = EpochMillis::from_secs( i64::MIN);
    assert_eq!( t.millis(), i64::MIN);
    assert!( !t.is_valid());

    assert!( EpochMillis::from_secs( 1_700_000_000).is_valid());

    let d = EpochMillis::new( i64::MAX).secs_since( EpochMillis::new( i64::MIN));
    assert_eq!( d, i64::MAX as f64 / 1000.0);
    let d = EpochMillis::new( i64::MIN).secs_since( EpochMillis::new( i64::MAX));
    assert_eq!( d, i64::MIN as f64 / 1000.0);
}

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

//! show live aircraft tracks around a center point, as a once per second track table
//!
//! example:
//! ```text
//! RUST_LOG=odin_planes=debug cargo run --bin show_planes -- --lon=-122.3 --lat=37.6 --run-secs=60
//! ```

use std::{sync::Arc, time::Duration};
use anyhow::anyhow;
use tokio::time::{self, Instant};
use tracing::warn;
use tracing_subscriber::EnvFilter;
use uom::si::{length::meter, velocity::{knot, meter_per_second}};

use odin_common::{define_cli, check_cli, datetime::{Clock, EpochMillis, WallClock}, geo::GeoPoint};
use odin_planes::{
    AircraftTrack, GeodeticMover, TelemetrySource, TrackerConfig, Wgs84Mover, load_config,
    actor::spawn_tracker,
    feature_service::{FeatureServiceConfig, FeatureServiceConnector},
    observer::{FieldChange, Topic, TrackEvent},
    opensky::{OpenSkyConfig, OpenSkyConnector},
    store::TrackStore,
};

define_cli! { ARGS [about="show live aircraft tracks"] =
    lon: Option<f64>       [help="longitude of query center", long, allow_hyphen_values=true],
    lat: Option<f64>       [help="latitude of query center", long, allow_hyphen_values=true],
    tolerance: Option<f64> [help="half width/height of query area in degrees", long],
    source: String         [help="telemetry source (opensky|features)", long, default_value="opensky"],
    run_secs: Option<u64>  [help="terminate after given number of seconds", long],
    select: Option<String> [help="call sign of aircraft to select", long],
    config: Option<String> [help="pathname of tracker config (default is tracker.ron lookup)"]
}

#[tokio::main]
async fn main()->anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter( EnvFilter::from_default_env()) // use RUST_LOG to set max level
        .init();
    check_cli!(ARGS);

    let mut config: TrackerConfig = match &ARGS.config {
        Some(path) => odin_common::config::load_config( path)?,
        None => load_config( "tracker.ron").unwrap_or_else( |e| {
            warn!("using default tracker config: {e}");
            TrackerConfig::default()
        })
    };

    if ARGS.lon.is_some() || ARGS.lat.is_some() {
        let lon = ARGS.lon.unwrap_or( config.center.longitude_degrees());
        let lat = ARGS.lat.unwrap_or( config.center.latitude_degrees());
        config.center = GeoPoint::from_lon_lat_degrees( lon, lat);
    }
    if let Some(tolerance) = ARGS.tolerance { config.coordinate_tolerance = tolerance }
    config.validate()?;

    match ARGS.source.as_str() {
        "opensky" => {
            let source_config: OpenSkyConfig = load_config( "opensky.ron")?;
            run( config, OpenSkyConnector::new( source_config.with_env_credentials())?).await
        }
        "features" => {
            let source_config: FeatureServiceConfig = load_config( "features.ron")?;
            run( config, FeatureServiceConnector::new( source_config)?).await
        }
        other => Err( anyhow!("unknown telemetry source '{other}' (use opensky|features)"))
    }
}

async fn run<S> (config: TrackerConfig, source: S)->anyhow::Result<()> where S: TelemetrySource + 'static {
    let clock: Arc<dyn Clock> = Arc::new( WallClock);
    let mover: Arc<dyn GeodeticMover> = Arc::new( Wgs84Mover);
    println!("tracking aircraft in {:?}", TrackStore::query_area_around( &config.center, config.coordinate_tolerance));

    let tracker = spawn_tracker( config, source, mover, clock, |_store: &TrackStore| {})?;

    if ARGS.select.is_some() {
        tracker.subscribe( Topic::Selection, |e: &TrackEvent| {
            // positions change on every tick, only report the rest
            if !matches!( e, TrackEvent::Changed{ change: FieldChange::Position(_), .. }) {
                println!("selected: {e}");
            }
        }).await?;
    }

    let deadline = ARGS.run_secs.map( |secs| Instant::now() + Duration::from_secs(secs));
    let mut interval = time::interval( Duration::from_secs(1));

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let mut tracks = tracker.query_tracks().await?;

                if let Some(cs) = &ARGS.select {
                    // (re)select once the aircraft shows up
                    if !tracks.iter().any( |t| t.is_selected()) && tracker.select( Some(cs.as_str())).await? {
                        tracks = tracker.query_tracks().await?;
                    }
                }

                print_tracks( &tracks);
                if deadline.is_some_and( |d| Instant::now() >= d) { break }
            }
            _ = tokio::signal::ctrl_c() => { break }
        }
    }

    tracker.terminate().await?;
    Ok(())
}

fn print_tracks (tracks: &[AircraftTrack]) {
    let now = EpochMillis::now();

    println!("\n{} tracks at {}", tracks.len(), now);
    println!("  call sign  class     lon        lat      alt[m]  spd[kn]  hdg  vr[m/s]  age[s]");
    for t in tracks {
        let p = t.position();
        println!("{} {:<9}  {:<6} {:10.5} {:9.5} {:8.0} {:8.0} {:4.0} {:8.1} {:7.0}",
            if t.is_selected() { '*' } else { ' ' },
            t.call_sign(), format!("{:?}", t.size_class()),
            p.longitude_degrees(), p.latitude_degrees(), p.altitude().get::<meter>(),
            t.ground_speed().get::<knot>(), t.heading().degrees(), t.vertical_rate().get::<meter_per_second>(),
            t.age_secs(now)
        );
    }
}

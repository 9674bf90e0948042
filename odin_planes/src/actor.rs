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

//! the tracker actor, a tokio task that owns a [`TrackStore`] and is the only writer to it.
//!
//! The actor drives [`TrackStore::tick`] from an interval timer. Due snapshot refreshes are fetched by separately spawned
//! tasks so that network round trips never delay ticks. The actor keeps the join handle of the fetch in flight and
//! applies its result in one step once the task completes. A fetch task that panics counts as failed fetch.
//! Each fetch is tagged with the generation of the actor at the time it was started. Center changes and termination bump
//! the generation and abort the fetch, and results of older generations are discarded.
//!
//! Everything the run loop selects on has to be cancel safe. The mailbox receive future is therefore only created
//! once and re-created after it completed, and fetch tasks are polled through `&mut JoinHandle`.

use std::{future, pin::pin, sync::Arc, time::Duration};
use kanal::{AsyncReceiver, AsyncSender};
use tokio::{sync::oneshot, task::JoinHandle, time::{self, Instant, MissedTickBehavior}};
use tracing::{debug,info,warn};
use odin_common::{datetime::Clock, geo::GeoPoint};

use crate::{
    AircraftTrack, GeodeticMover, RawAircraftRecord, TelemetrySource, TrackerConfig,
    errors::{OdinPlanesError, Result, op_failed},
    observer::{SubscriptionId, Topic, TrackCallback},
    store::{TickAction, TrackStore}
};

const MSG_QUEUE_LEN: usize = 64;

pub type SnapshotAction = Box<dyn FnOnce(&TrackStore) + Send>;

/// the messages the tracker actor processes
pub enum TrackerMsg {
    SetCenter(GeoPoint),
    Select(Option<String>, oneshot::Sender<bool>),
    Subscribe(Topic, TrackCallback, oneshot::Sender<SubscriptionId>),
    Unsubscribe(SubscriptionId),
    RefreshNow,
    ExecSnapshotAction(SnapshotAction),
    QueryTracks(oneshot::Sender<Vec<AircraftTrack>>),
    Terminate,
}

/// the fetch task in flight
struct PendingFetch {
    generation: u64,
    task: JoinHandle<Result<Vec<RawAircraftRecord>>>,
}

/// wait for the fetch in flight. This is cancel safe, and never completes if there is none
async fn join_fetch (fetch: &mut Option<PendingFetch>)->(u64, Result<Vec<RawAircraftRecord>>) {
    match fetch {
        Some(pending) => {
            let result = match (&mut pending.task).await {
                Ok(result) => result,
                Err(e) => Err( op_failed!("fetch task failed: {e}")) // panicked or aborted
            };
            (pending.generation, result)
        }
        None => future::pending().await
    }
}

/// the client side of a tracker actor. Handles can be cloned, the actor stops when it receives a `Terminate` or when the
/// last handle is dropped
#[derive(Clone)]
pub struct TrackerHandle {
    tx: AsyncSender<TrackerMsg>,
}

impl TrackerHandle {
    async fn send (&self, msg: TrackerMsg)->Result<()> {
        self.tx.send( msg).await.map_err( |_| op_failed!("tracker not running"))
    }

    async fn query<T> (&self, msg: TrackerMsg, rx: oneshot::Receiver<T>)->Result<T> {
        self.send( msg).await?;
        rx.await.map_err( |_| op_failed!("tracker terminated before response"))
    }

    /// move the query area. This discards any pending fetch and starts a new one right away
    pub async fn set_center (&self, center: GeoPoint)->Result<()> {
        self.send( TrackerMsg::SetCenter(center)).await
    }

    /// returns false if there is no track with the given call sign
    pub async fn select (&self, call_sign: Option<&str>)->Result<bool> {
        let (tx,rx) = oneshot::channel();
        self.query( TrackerMsg::Select( call_sign.map(|cs| cs.to_string()), tx), rx).await
    }

    pub async fn subscribe<F> (&self, topic: Topic, callback: F)->Result<SubscriptionId> where F: FnMut(&crate::TrackEvent) + Send + 'static {
        let (tx,rx) = oneshot::channel();
        self.query( TrackerMsg::Subscribe( topic, Box::new(callback), tx), rx).await
    }

    pub async fn unsubscribe (&self, id: SubscriptionId)->Result<()> {
        self.send( TrackerMsg::Unsubscribe(id)).await
    }

    /// start a fetch now unless one is already running. This ignores backoff
    pub async fn refresh_now (&self)->Result<()> {
        self.send( TrackerMsg::RefreshNow).await
    }

    /// execute `action` inside of the actor with the current store
    pub async fn exec_snapshot_action<F> (&self, action: F)->Result<()> where F: FnOnce(&TrackStore) + Send + 'static {
        self.send( TrackerMsg::ExecSnapshotAction( Box::new(action))).await
    }

    /// cloned tracks, sorted by call sign
    pub async fn query_tracks (&self)->Result<Vec<AircraftTrack>> {
        let (tx,rx) = oneshot::channel();
        self.query( TrackerMsg::QueryTracks(tx), rx).await
    }

    pub async fn terminate (&self)->Result<()> {
        self.send( TrackerMsg::Terminate).await
    }
}

/// create a [`TrackStore`] for `config` and spawn the actor task that owns it. `update_action` is executed after each tick.
/// This has to be called from within a tokio runtime
pub fn spawn_tracker<S,U> (config: TrackerConfig, source: S, mover: Arc<dyn GeodeticMover>, clock: Arc<dyn Clock>, update_action: U)->Result<TrackerHandle>
    where S: TelemetrySource + 'static, U: FnMut(&TrackStore) + Send + 'static
{
    let request_timeout = config.request_timeout;
    let max_backoff = config.max_backoff;
    let store = TrackStore::new( config, mover, clock)?;

    let (tx, rx) = kanal::bounded_async::<TrackerMsg>( MSG_QUEUE_LEN);

    let actor = TrackerActor {
        store,
        source: Arc::new(source),
        update_action,
        request_timeout,
        max_backoff,
        generation: 0,
        fetch: None,
        n_failures: 0,
        skip_refreshes: 0,
    };
    tokio::spawn( actor.run( rx));

    Ok( TrackerHandle{ tx })
}

struct TrackerActor<S,U> where S: TelemetrySource + 'static, U: FnMut(&TrackStore) + Send + 'static {
    store: TrackStore,
    source: Arc<S>,
    update_action: U,

    request_timeout: Duration,
    max_backoff: u32,

    generation: u64,
    fetch: Option<PendingFetch>,

    n_failures: u32,     // consecutive fetch failures
    skip_refreshes: u32, // number of scheduled refreshes we still skip
}

impl<S,U> TrackerActor<S,U> where S: TelemetrySource + 'static, U: FnMut(&TrackStore) + Send + 'static {

    async fn run (mut self, rx: AsyncReceiver<TrackerMsg>) {
        let tick_interval = self.store.config().tick_interval();
        let mut interval = time::interval( tick_interval);
        interval.set_missed_tick_behavior( MissedTickBehavior::Delay);
        let mut last_tick: Option<Instant> = None;

        info!("tracker started for area {:?}", self.store.query_area());
        self.start_fetch();

        // kanal receive futures can hold a message that was already taken from the queue, i.e. we must not drop them
        let mut next_msg = pin!( rx.recv());

        loop {
            tokio::select! {
                now = interval.tick() => {
                    let elapsed = last_tick.map( |t| now.duration_since(t)).unwrap_or( tick_interval);
                    last_tick = Some(now);
                    self.tick( elapsed);
                }
                (generation, result) = join_fetch( &mut self.fetch), if self.fetch.is_some() => {
                    self.apply_fetch_result( generation, result);
                }
                msg = &mut next_msg => {
                    match msg {
                        Ok(TrackerMsg::Terminate) | Err(_) => break,
                        Ok(msg) => {
                            next_msg.set( rx.recv());
                            self.handle_msg( msg);
                        }
                    }
                }
            }
        }

        self.generation += 1;
        self.abort_fetch();
        info!("tracker terminated");
    }

    fn tick (&mut self, elapsed: Duration) {
        if self.store.tick( elapsed) == TickAction::RefreshDue {
            self.scheduled_refresh();
        }
        (self.update_action)( &self.store);
    }

    fn handle_msg (&mut self, msg: TrackerMsg) {
        match msg {
            TrackerMsg::SetCenter(center) => {
                self.store.set_center( center);
                self.generation += 1;
                self.abort_fetch();
                info!("new query area {:?}", self.store.query_area());
                self.start_fetch();
            }
            TrackerMsg::Select(call_sign, tx) => {
                let is_selected = self.store.select( call_sign.as_deref());
                let _ = tx.send( is_selected);
            }
            TrackerMsg::Subscribe(topic, callback, tx) => {
                let id = self.store.subscribe( topic, callback);
                let _ = tx.send( id);
            }
            TrackerMsg::Unsubscribe(id) => {
                if !self.store.unsubscribe( id) { debug!("unknown subscription {}", id) }
            }
            TrackerMsg::RefreshNow => {
                if self.fetch.is_none() { self.start_fetch() } else { debug!("fetch in flight, ignoring refresh request") }
            }
            TrackerMsg::ExecSnapshotAction(action) => {
                action( &self.store);
            }
            TrackerMsg::QueryTracks(tx) => {
                let _ = tx.send( self.store.snapshot());
            }
            TrackerMsg::Terminate => {} // handled by run loop
        }
    }

    fn scheduled_refresh (&mut self) {
        if self.fetch.is_some() {
            debug!("previous fetch still in flight, skipping refresh");
        } else if self.skip_refreshes > 0 {
            self.skip_refreshes -= 1;
            debug!("backing off after {} failures, skipping refresh ({} more to skip)", self.n_failures, self.skip_refreshes);
        } else {
            self.start_fetch();
        }
    }

    fn start_fetch (&mut self) {
        let generation = self.generation;
        let area = self.store.query_area();
        let source = self.source.clone();
        let to = self.request_timeout;

        let task = tokio::spawn( async move {
            match time::timeout( to, source.fetch_states( &area)).await {
                Ok(result) => result,
                Err(_) => Err( OdinPlanesError::TimeoutError(to))
            }
        });
        self.fetch = Some( PendingFetch{ generation, task });
    }

    fn abort_fetch (&mut self) {
        if let Some(pending) = self.fetch.take() {
            pending.task.abort();
        }
    }

    fn apply_fetch_result (&mut self, generation: u64, result: Result<Vec<RawAircraftRecord>>) {
        self.fetch = None;
        if generation != self.generation {
            debug!("discarding fetch result of outdated generation {}", generation);
            return
        }

        match result {
            Ok(records) => {
                if self.n_failures > 0 { info!("snapshot fetch recovered after {} failures", self.n_failures) }
                self.n_failures = 0;
                self.skip_refreshes = 0;
                let n = self.store.apply_snapshot( records);
                debug!("applied snapshot with {} records, {} tracks", n, self.store.len());
            }
            Err(e) => {
                self.n_failures += 1;
                self.skip_refreshes = backoff_skips( self.n_failures, self.max_backoff);
                warn!("snapshot fetch failed ({} consecutive): {}, skipping next {} refreshes", self.n_failures, e, self.skip_refreshes);
            }
        }
    }
}

/// number of scheduled refreshes to skip after `n_failures` consecutive failures: `min(2^(n-1), max_backoff)`
pub fn backoff_skips (n_failures: u32, max_backoff: u32)->u32 {
    if n_failures == 0 {
        0
    } else {
        1u32.checked_shl( n_failures - 1).unwrap_or( u32::MAX).min( max_backoff)
    }
}

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

//! push based change notification for track store clients.
//!
//! Clients subscribe a callback for a [`Topic`]. Callbacks are executed synchronously by the store after it has
//! finished the mutation (snapshot reconciliation, tick or eviction) that produced the events, i.e. they see the
//! complete new state. Callbacks must not block.

use std::fmt;
use uom::si::{f64::Velocity, velocity::meter_per_second};
use odin_common::{angle::Angle360, geo::GeoPoint3};

pub type SubscriptionId = u64;

pub type TrackCallback = Box<dyn FnMut(&TrackEvent) + Send>;

#[derive(Debug,Clone,PartialEq,Eq)]
pub enum Topic {
    /// track additions, removals and selection changes
    Store,
    /// field changes and removal of the track with the given call sign
    Track(String),
    /// field changes of whatever track is currently selected, and selection changes
    Selection,
}

/// the new value of a changed track field
#[derive(Debug,Clone,Copy,PartialEq)]
pub enum FieldChange {
    Position(GeoPoint3),
    GroundSpeed(Velocity),
    VerticalRate(Velocity),
    Heading(Angle360),
}

impl FieldChange {
    pub fn name (&self)->&'static str {
        match self {
            FieldChange::Position(_) => "position",
            FieldChange::GroundSpeed(_) => "ground_speed",
            FieldChange::VerticalRate(_) => "vertical_rate",
            FieldChange::Heading(_) => "heading",
        }
    }
}

impl fmt::Display for FieldChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldChange::Position(p) => write!( f, "position = {}", p),
            FieldChange::GroundSpeed(v) => write!( f, "ground_speed = {:.1}m/s", v.get::<meter_per_second>()),
            FieldChange::VerticalRate(v) => write!( f, "vertical_rate = {:.1}m/s", v.get::<meter_per_second>()),
            FieldChange::Heading(hdg) => write!( f, "heading = {:.0}", hdg.degrees()),
        }
    }
}

#[derive(Debug,Clone,PartialEq)]
pub enum TrackEvent {
    Added(String),
    Removed(String),
    Changed { call_sign: String, change: FieldChange },
    SelectionChanged { previous: Option<String>, current: Option<String> },
}

impl TrackEvent {
    pub fn call_sign (&self)->Option<&str> {
        match self {
            TrackEvent::Added(cs) | TrackEvent::Removed(cs) => Some(cs.as_str()),
            TrackEvent::Changed{call_sign,..} => Some(call_sign.as_str()),
            TrackEvent::SelectionChanged{..} => None
        }
    }

    fn is_for (&self, topic: &Topic, selected: Option<&str>)->bool {
        match (topic, self) {
            (Topic::Store, TrackEvent::Changed{..}) => false,
            (Topic::Store, _) => true,

            (Topic::Track(cs), TrackEvent::Changed{call_sign,..}) => cs == call_sign,
            (Topic::Track(cs), TrackEvent::Removed(call_sign)) => cs == call_sign,
            (Topic::Track(_), _) => false,

            (Topic::Selection, TrackEvent::Changed{call_sign,..}) => selected == Some(call_sign.as_str()),
            (Topic::Selection, TrackEvent::SelectionChanged{..}) => true,
            (Topic::Selection, _) => false,
        }
    }
}

impl fmt::Display for TrackEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackEvent::Added(cs) => write!( f, "added {}", cs),
            TrackEvent::Removed(cs) => write!( f, "removed {}", cs),
            TrackEvent::Changed{call_sign,change} => write!( f, "{}: {}", call_sign, change),
            TrackEvent::SelectionChanged{previous,current} => write!( f, "selection {:?} -> {:?}", previous, current),
        }
    }
}

struct Subscription {
    id: SubscriptionId,
    topic: Topic,
    callback: TrackCallback,
}

/// the subscriber list of a store
#[derive(Default)]
pub struct Observers {
    next_id: SubscriptionId,
    subscriptions: Vec<Subscription>,
}

impl Observers {
    pub fn new ()->Self { Observers::default() }

    pub fn subscribe (&mut self, topic: Topic, callback: TrackCallback)->SubscriptionId {
        self.next_id += 1;
        let id = self.next_id;
        self.subscriptions.push( Subscription{ id, topic, callback });
        id
    }

    /// returns false if there was no subscription with this id
    pub fn unsubscribe (&mut self, id: SubscriptionId)->bool {
        let len = self.subscriptions.len();
        self.subscriptions.retain( |s| s.id != id);
        self.subscriptions.len() < len
    }

    /// drop all subscriptions for the given track
    pub fn remove_track_subscriptions (&mut self, call_sign: &str) {
        self.subscriptions.retain( |s| match &s.topic {
            Topic::Track(cs) => cs != call_sign,
            _ => true
        });
    }

    pub fn is_empty (&self)->bool { self.subscriptions.is_empty() }
    pub fn len (&self)->usize { self.subscriptions.len() }

    pub fn dispatch (&mut self, event: &TrackEvent, selected: Option<&str>) {
        for s in self.subscriptions.iter_mut() {
            if event.is_for( &s.topic, selected) {
                (s.callback)(event);
            }
        }
    }
}

impl fmt::Debug for Observers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!( f, "Observers( n_subscriptions: {})", self.subscriptions.len())
    }
}

// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Key occurrences in the lifecycle of a Screenplay run.
//!
//! The top-level enum here is [`Screenplay`].
//!
//! Every event of a single performance carries its [`PerformanceId`], so
//! consumers may tell apart events of performances running concurrently.

use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::SystemTime,
};

use derive_more::with_trait::{AsRef, Debug, Deref, DerefMut, Display};

use crate::{
    Actor, Failure, SharedValue,
    report::{NamingItem, PerformancePhase},
};

/// Arbitrary event, paired with the time it has happened at.
#[derive(AsRef, Clone, Copy, Debug, Deref, DerefMut)]
#[non_exhaustive]
pub struct Event<T: ?Sized> {
    /// [`SystemTime`] when this [`Event`] has happened.
    pub at: SystemTime,

    /// Actual value of this [`Event`].
    #[as_ref]
    #[deref]
    #[deref_mut]
    pub value: T,
}

impl<T> Event<T> {
    /// Creates a new [`Event`] out of the given `value`, happened right now.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self { at: SystemTime::now(), value }
    }

    /// Unwraps the inner [`Event::value`] loosing the attached time.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.value
    }

    /// Splits this [`Event`] to the inner [`Event::value`] and the time it
    /// has happened at.
    #[must_use]
    pub fn split(self) -> (T, SystemTime) {
        (self.value, self.at)
    }

    /// Maps the inner [`Event::value`] with the given function, keeping the
    /// time.
    #[must_use]
    pub fn map<V>(self, f: impl FnOnce(T) -> V) -> Event<V> {
        Event { at: self.at, value: f(self.value) }
    }
}

/// ID of a performance, uniquely identifying it within a process.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub struct PerformanceId(pub u64);

impl PerformanceId {
    /// Creates a new unique [`PerformanceId`].
    #[must_use]
    pub fn new() -> Self {
        /// [`AtomicU64`] ID.
        static ID: AtomicU64 = AtomicU64::new(0);

        Self(ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for PerformanceId {
    fn default() -> Self {
        Self::new()
    }
}

/// Top-level Screenplay run event.
#[derive(Clone, Debug)]
pub enum Screenplay {
    /// Screenplay run started.
    Started,

    /// [`Performance`] event.
    Performance(PerformanceId, Performance),

    /// Screenplay run ended, no more events follow.
    Ended,
}

impl Screenplay {
    /// Returns the [`PerformanceId`] this event belongs to, if any.
    #[must_use]
    pub const fn performance_id(&self) -> Option<PerformanceId> {
        match self {
            Self::Performance(id, _) => Some(*id),
            Self::Started | Self::Ended => None,
        }
    }
}

/// Event specific to a particular performance.
#[derive(Clone, Debug)]
pub enum Performance {
    /// Performance has begun, identified by its naming hierarchy.
    Begun(Vec<NamingItem>),

    /// [`Actor`] was created.
    ActorCreated(Actor),

    /// [`Actor`] gained an ability.
    GainedAbility {
        /// [`Actor`] gaining the ability.
        actor: Actor,

        /// Gained ability.
        ability: SharedValue,
    },

    /// [`Actor`] was put into the spotlight.
    ActorSpotlit(Actor),

    /// Spotlight was turned off.
    SpotlightTurnedOff,

    /// [`Actor`] began executing a performable.
    BeginPerformable {
        /// Executed performable.
        performable: SharedValue,

        /// [`Actor`] executing the performable.
        actor: Actor,

        /// [`PerformancePhase`] of the execution.
        phase: PerformancePhase,
    },

    /// Performable produced a result.
    PerformableResult {
        /// Executed performable.
        performable: SharedValue,

        /// [`Actor`] executing the performable.
        actor: Actor,

        /// Produced result.
        result: SharedValue,
    },

    /// Performable failed.
    PerformableFailed {
        /// Executed performable.
        performable: SharedValue,

        /// [`Actor`] executing the performable.
        actor: Actor,

        /// [`Failure`] of the performable.
        failure: Failure,
    },

    /// File was recorded for the currently executing performable.
    RecordAsset {
        /// Path to the file.
        file_path: String,

        /// Human-readable summary of the file.
        summary: String,
    },

    /// [`Actor`] ended executing a performable.
    EndPerformable {
        /// Executed performable.
        performable: SharedValue,

        /// [`Actor`] executing the performable.
        actor: Actor,
    },

    /// Performance has finished.
    ///
    /// Carries [`None`] if it neither succeeded nor failed explicitly.
    Finished(Option<bool>),
}

impl Performance {
    /// Name of this event kind, as used in logs and errors.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Begun(_) => "begin_performance",
            Self::ActorCreated(_) => "actor_created",
            Self::GainedAbility { .. } => "actor_gained_ability",
            Self::ActorSpotlit(_) => "actor_spotlit",
            Self::SpotlightTurnedOff => "spotlight_turned_off",
            Self::BeginPerformable { .. } => "begin_performable",
            Self::PerformableResult { .. } => "record_result",
            Self::PerformableFailed { .. } => "record_failure",
            Self::RecordAsset { .. } => "record_asset",
            Self::EndPerformable { .. } => "end_performable",
            Self::Finished(_) => "finish_performance",
        }
    }
}

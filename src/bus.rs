// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Process-wide [`EventBus`] and publishing of performance events.

use std::{
    fmt,
    future::Future,
    pin::Pin,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
    task::{Context, Poll},
};

use futures::{Stream, StreamExt as _, channel::mpsc};

use crate::{
    Actor, Failure, ReportValue, SharedValue,
    event::{self, Event, PerformanceId},
    report::{NamingItem, PerformancePhase},
};

/// Subscriber registered in an [`EventBus`].
#[derive(Debug)]
struct Subscriber {
    /// ID of the [`Subscription`] to remove this [`Subscriber`] by.
    id: u64,

    /// Performance this [`Subscriber`] is interested in, if any particular.
    filter: Option<PerformanceId>,

    /// Sender of the events.
    sender: mpsc::UnboundedSender<Event<event::Screenplay>>,
}

impl Subscriber {
    /// Indicates whether the given `event` should be delivered to this
    /// [`Subscriber`].
    fn accepts(&self, event: &event::Screenplay) -> bool {
        match (self.filter, event.performance_id()) {
            (Some(wanted), Some(id)) => wanted == id,
            (None, _) | (_, None) => true,
        }
    }
}

/// Shared state of an [`EventBus`].
#[derive(Debug, Default)]
struct Inner {
    /// Currently registered [`Subscriber`]s.
    subscribers: Mutex<Vec<Subscriber>>,

    /// ID of the next [`Subscription`].
    next_subscription: AtomicU64,
}

impl Inner {
    /// Locks the [`Subscriber`]s list.
    ///
    /// Publishing never panics while holding the lock, so a poisoned list is
    /// still consistent.
    fn subscribers(&self) -> MutexGuard<'_, Vec<Subscriber>> {
        self.subscribers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Publish/subscribe bus of [`event::Screenplay`]s.
///
/// Cloning gives another handle to the same bus. Every [`Subscription`]
/// receives all the event kinds, so adding and removing a subscriber is a
/// single symmetric operation.
#[derive(Clone, Debug, Default)]
pub struct EventBus {
    /// Shared state of this [`EventBus`].
    inner: Arc<Inner>,
}

impl EventBus {
    /// Creates a new [`EventBus`] without subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes to the events of all performances.
    #[must_use]
    pub fn subscribe(&self) -> Subscription {
        self.add_subscriber(None)
    }

    /// Subscribes to the events of the performance with the given `id`.
    ///
    /// [`event::Screenplay::Started`] and [`event::Screenplay::Ended`] are
    /// delivered too.
    #[must_use]
    pub fn subscribe_to(&self, id: PerformanceId) -> Subscription {
        self.add_subscriber(Some(id))
    }

    /// Returns the number of live [`Subscription`]s.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers().len()
    }

    /// Publishes the given `event` to every interested [`Subscription`],
    /// stamping it with the current time.
    ///
    /// Closed [`Subscription`]s are dropped along the way.
    pub fn publish(&self, event: event::Screenplay) {
        let event = Event::new(event);
        self.inner.subscribers().retain(|s| {
            !s.accepts(&event) || s.sender.unbounded_send(event.clone()).is_ok()
        });
    }

    /// Publishes [`event::Screenplay::Started`].
    pub fn screenplay_started(&self) {
        tracing::debug!("screenplay started");
        self.publish(event::Screenplay::Started);
    }

    /// Publishes [`event::Screenplay::Ended`].
    pub fn screenplay_ended(&self) {
        tracing::debug!("screenplay ended");
        self.publish(event::Screenplay::Ended);
    }

    /// Begins a new performance with the given naming hierarchy, returning
    /// the [`PerformanceScope`] to publish its events with.
    #[must_use]
    pub fn begin_performance(
        &self,
        naming_hierarchy: Vec<NamingItem>,
    ) -> PerformanceScope {
        self.begin_performance_as(PerformanceId::new(), naming_hierarchy)
    }

    /// Begins a new performance with the given [`PerformanceId`], allocated
    /// upfront to [subscribe to][1] it before it begins.
    ///
    /// [1]: EventBus::subscribe_to
    #[must_use]
    pub fn begin_performance_as(
        &self,
        id: PerformanceId,
        naming_hierarchy: Vec<NamingItem>,
    ) -> PerformanceScope {
        let scope = PerformanceScope { id, bus: self.clone(), finished: false };
        tracing::debug!(performance = %scope.id, "performance begun");
        scope.publish(event::Performance::Begun(naming_hierarchy));
        scope
    }

    /// Registers a new [`Subscriber`] with the given `filter`.
    fn add_subscriber(&self, filter: Option<PerformanceId>) -> Subscription {
        let (sender, receiver) = mpsc::unbounded();
        let id = self.inner.next_subscription.fetch_add(1, Ordering::Relaxed);
        self.inner.subscribers().push(Subscriber { id, filter, sender });

        Subscription { id, bus: Arc::clone(&self.inner), receiver }
    }
}

/// Subscription to an [`EventBus`], yielding events in publishing order.
///
/// Dropping it unsubscribes.
pub struct Subscription {
    /// ID of this [`Subscription`] in the [`EventBus`].
    id: u64,

    /// [`EventBus`] this [`Subscription`] belongs to.
    bus: Arc<Inner>,

    /// Receiver of the events.
    receiver: mpsc::UnboundedReceiver<Event<event::Screenplay>>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

impl Subscription {
    /// Unsubscribes from the [`EventBus`].
    ///
    /// Events already published remain receivable.
    pub fn unsubscribe(&mut self) {
        let id = self.id;
        self.bus.subscribers().retain(|s| s.id != id);
    }
}

impl Stream for Subscription {
    type Item = Event<event::Screenplay>;

    fn poll_next(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Self::Item>> {
        self.receiver.poll_next_unpin(cx)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

/// Publisher of the events of a single performance.
///
/// Events of one performance are published strictly sequentially, so only a
/// shared reference is needed to publish.
///
/// Dropping it without [`PerformanceScope::finish()`] publishes
/// [`event::Performance::Finished`] with an unknown outcome.
#[derive(Debug)]
pub struct PerformanceScope {
    /// ID of the performance.
    id: PerformanceId,

    /// [`EventBus`] to publish into.
    bus: EventBus,

    /// Whether the performance has finished.
    finished: bool,
}

impl PerformanceScope {
    /// Returns the [`PerformanceId`] of this performance.
    #[must_use]
    pub const fn id(&self) -> PerformanceId {
        self.id
    }

    /// Publishes [`event::Performance::ActorCreated`].
    pub fn actor_created(&self, actor: &Actor) {
        self.publish(event::Performance::ActorCreated(actor.clone()));
    }

    /// Publishes [`event::Performance::GainedAbility`].
    pub fn gained_ability(&self, actor: &Actor, ability: SharedValue) {
        self.publish(event::Performance::GainedAbility {
            actor: actor.clone(),
            ability,
        });
    }

    /// Publishes [`event::Performance::ActorSpotlit`].
    pub fn spotlight(&self, actor: &Actor) {
        self.publish(event::Performance::ActorSpotlit(actor.clone()));
    }

    /// Publishes [`event::Performance::SpotlightTurnedOff`].
    pub fn spotlight_off(&self) {
        self.publish(event::Performance::SpotlightTurnedOff);
    }

    /// Publishes [`event::Performance::BeginPerformable`].
    pub fn begin_performable(
        &self,
        actor: &Actor,
        performable: SharedValue,
        phase: PerformancePhase,
    ) {
        self.publish(event::Performance::BeginPerformable {
            performable,
            actor: actor.clone(),
            phase,
        });
    }

    /// Publishes [`event::Performance::EndPerformable`].
    pub fn end_performable(&self, actor: &Actor, performable: SharedValue) {
        self.publish(event::Performance::EndPerformable {
            performable,
            actor: actor.clone(),
        });
    }

    /// Publishes [`event::Performance::PerformableResult`].
    pub fn performable_result(
        &self,
        actor: &Actor,
        performable: SharedValue,
        result: SharedValue,
    ) {
        self.publish(event::Performance::PerformableResult {
            performable,
            actor: actor.clone(),
            result,
        });
    }

    /// Publishes [`event::Performance::PerformableFailed`].
    pub fn performable_failed(
        &self,
        actor: &Actor,
        performable: SharedValue,
        failure: Failure,
    ) {
        self.publish(event::Performance::PerformableFailed {
            performable,
            actor: actor.clone(),
            failure,
        });
    }

    /// Publishes [`event::Performance::RecordAsset`] for the currently
    /// executing performable.
    pub fn record_asset(
        &self,
        file_path: impl Into<String>,
        summary: impl Into<String>,
    ) {
        self.publish(event::Performance::RecordAsset {
            file_path: file_path.into(),
            summary: summary.into(),
        });
    }

    /// Executes the `performable` by awaiting its `execution`, publishing
    /// its begin, failure (if any) and end.
    ///
    /// # Errors
    ///
    /// If the `execution` fails. The returned [`Failure`] is marked as
    /// reported, so enclosing performables record it as consumed.
    pub async fn perform(
        &self,
        actor: &Actor,
        performable: SharedValue,
        phase: PerformancePhase,
        execution: impl Future<Output = Result<(), Failure>>,
    ) -> Result<(), Failure> {
        self.begin_performable(actor, Arc::clone(&performable), phase);
        let outcome = execution.await;
        self.conclude(actor, performable, outcome, |_| None)
    }

    /// Executes the question `performable` by awaiting its `execution`,
    /// publishing its begin, result or failure, and end.
    ///
    /// # Errors
    ///
    /// If the `execution` fails. The returned [`Failure`] is marked as
    /// reported, so enclosing performables record it as consumed.
    pub async fn ask<T>(
        &self,
        actor: &Actor,
        performable: SharedValue,
        phase: PerformancePhase,
        execution: impl Future<Output = Result<T, Failure>>,
    ) -> Result<T, Failure>
    where
        T: ReportValue + Clone,
    {
        self.begin_performable(actor, Arc::clone(&performable), phase);
        let outcome = execution.await;
        self.conclude(actor, performable, outcome, |answer| {
            Some(Arc::new(answer.clone()) as SharedValue)
        })
    }

    /// Finishes this performance, publishing its `success`.
    pub fn finish(mut self, success: Option<bool>) {
        self.finished = true;
        tracing::debug!(
            performance = %self.id,
            ?success,
            "performance finished",
        );
        self.publish(event::Performance::Finished(success));
    }

    /// Publishes the result or failure of the `performable` and its end.
    fn conclude<T>(
        &self,
        actor: &Actor,
        performable: SharedValue,
        outcome: Result<T, Failure>,
        result: impl FnOnce(&T) -> Option<SharedValue>,
    ) -> Result<T, Failure> {
        let outcome = match outcome {
            Ok(value) => {
                if let Some(r) = result(&value) {
                    self.performable_result(actor, Arc::clone(&performable), r);
                }
                Ok(value)
            }
            Err(failure) => {
                self.performable_failed(
                    actor,
                    Arc::clone(&performable),
                    failure.clone(),
                );
                Err(failure.into_reported())
            }
        };
        self.end_performable(actor, performable);
        outcome
    }

    /// Publishes the given `event` of this performance.
    fn publish(&self, event: event::Performance) {
        self.bus.publish(event::Screenplay::Performance(self.id, event));
    }
}

impl Drop for PerformanceScope {
    fn drop(&mut self) {
        if !self.finished {
            tracing::warn!(
                performance = %self.id,
                "performance dropped without finishing, its outcome is unknown",
            );
            self.publish(event::Performance::Finished(None));
        }
    }
}

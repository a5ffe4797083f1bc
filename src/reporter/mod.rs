// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Tools for turning [`event::Screenplay`]s into reports.

pub mod artifact;
pub mod json;

use std::future::Future;

use futures::StreamExt as _;

use crate::{Event, bus::Subscription, event};

#[doc(inline)]
pub use self::{artifact::JsonArtifact, json::JsonReporter};

/// Consumer of [`event::Screenplay`]s.
///
/// Events of a single performance arrive in the order they were published,
/// while events of different performances may interleave arbitrarily.
pub trait Reporter {
    /// Handles the given [`event::Screenplay`].
    fn handle_event(
        &mut self,
        event: Event<event::Screenplay>,
    ) -> impl Future<Output = ()>;
}

/// Extension of [`Reporter`] allowing to drive it by a [`Subscription`].
pub trait ReporterExt: Reporter + Sized {
    /// Feeds this [`Reporter`] with the events of the given `subscription`
    /// until [`event::Screenplay::Ended`] is received or the [`EventBus`] is
    /// gone, returning this [`Reporter`] for inspection afterwards.
    ///
    /// [`EventBus`]: crate::EventBus
    fn report_from(
        self,
        subscription: Subscription,
    ) -> impl Future<Output = Self>;
}

impl<R: Reporter> ReporterExt for R {
    async fn report_from(mut self, mut subscription: Subscription) -> Self {
        while let Some(ev) = subscription.next().await {
            let ended = matches!(ev.value, event::Screenplay::Ended);
            self.handle_event(ev).await;
            if ended {
                break;
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;

    use super::*;
    use crate::{EventBus, report::NamingItem};

    #[derive(Default)]
    struct Counting {
        events: usize,
    }

    impl Reporter for Counting {
        async fn handle_event(&mut self, _: Event<event::Screenplay>) {
            self.events += 1;
        }
    }

    #[test]
    fn reports_until_ended() {
        let bus = EventBus::new();
        let subscription = bus.subscribe();

        bus.screenplay_started();
        bus.begin_performance(vec![NamingItem::new("one", None)])
            .finish(Some(true));
        bus.screenplay_ended();
        bus.screenplay_started();

        let reporter = block_on(Counting::default().report_from(subscription));
        assert_eq!(reporter.events, 4);
    }

    #[test]
    fn stops_when_unsubscribed() {
        let bus = EventBus::new();
        let mut subscription = bus.subscribe();

        bus.screenplay_started();
        subscription.unsubscribe();
        drop(bus);

        let reporter = block_on(Counting::default().report_from(subscription));
        assert_eq!(reporter.events, 1);
    }
}

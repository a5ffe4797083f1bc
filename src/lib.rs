// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Reporting for [Screenplay pattern][1] behaviour tests.
//!
//! Actors gain abilities and execute performables inside performances (test
//! scenarios). Every such occurrence is published as an [`event::Screenplay`]
//! on an [`EventBus`], and a [`JsonReporter`] turns the events into a nested
//! [`PerformanceReport`] per performance, appended to a single JSON
//! [`JsonArtifact`] as soon as the performance finishes. Many performances
//! may run concurrently, with their events interleaving on the same bus.
//!
//! # Modules
//!
//! - [`bus`]: [`EventBus`] and [`PerformanceScope`] publishing
//! - [`event`]: lifecycle events
//! - [`format`]: value formatter chain and report templates
//! - [`report`]: report document and the per-performance builder
//! - [`reporter`]: [`Reporter`]s and the shared [`JsonArtifact`]
//!
//! [1]: https://serenity-js.org/handbook/design/screenplay-pattern
//! [`PerformanceReport`]: report::PerformanceReport

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod actor;
pub mod bus;
pub mod error;
pub mod event;
pub mod failure;
pub mod format;
pub mod options;
pub mod report;
pub mod reporter;
pub mod screenplay;
pub mod value;

#[doc(inline)]
pub use self::{
    actor::Actor,
    bus::{EventBus, PerformanceScope, Subscription},
    error::{ReportError, Result},
    event::{Event, PerformanceId},
    failure::Failure,
    options::{Cli, ScreenplayOptions},
    report::{NamingItem, Outcome, PerformancePhase, ScreenplayReport},
    reporter::{JsonArtifact, JsonReporter, Reporter, ReporterExt},
    screenplay::Screenplay,
    value::{CanReport, ReportValue, SharedValue},
};

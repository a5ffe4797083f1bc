// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Top-level [`Screenplay`] run.

use std::{
    fs::{self, File},
    future::Future,
    io::{self, BufWriter},
    path::PathBuf,
    sync::Arc,
};

use crate::{
    ScreenplayOptions,
    bus::{EventBus, PerformanceScope},
    error::WriterResult,
    event::PerformanceId,
    format::{FragmentFormatter, ValueFormatterProvider},
    report::NamingItem,
    reporter::{JsonArtifact, JsonReporter, ReporterExt as _},
};

/// Entry point of a Screenplay run: owns the [`EventBus`] and the value
/// formatting configuration, and wires [`JsonReporter`]s to them.
///
/// # Example
///
/// ```rust
/// # use screenplay_report::{
/// #     Actor, Screenplay, ScreenplayOptions, report::NamingItem,
/// # };
/// # futures::executor::block_on(async {
/// let options = ScreenplayOptions::default().report_path(None::<&str>);
/// let screenplay = Screenplay::new(&options);
/// let reporter = screenplay.reporter(Vec::<u8>::new());
///
/// screenplay.begin();
/// let performance =
///     screenplay.begin_performance(vec![NamingItem::new("greeting", None)]);
/// performance.actor_created(&Actor::named("Joe"));
/// performance.finish(Some(true));
/// screenplay.end();
///
/// let reporter = reporter.await;
/// assert!(reporter.errors().is_empty());
/// # });
/// ```
#[derive(Clone, Debug)]
pub struct Screenplay {
    /// [`EventBus`] of this run.
    bus: EventBus,

    /// Formatter of report texts.
    formatter: FragmentFormatter,

    /// Path to write the JSON report into, if any.
    report_path: Option<PathBuf>,
}

impl Screenplay {
    /// Creates a new [`Screenplay`] configured with the given `options`.
    #[must_use]
    pub fn new(options: &ScreenplayOptions) -> Self {
        let values = ValueFormatterProvider::new(&options.value_formatters);
        Self {
            bus: EventBus::new(),
            formatter: FragmentFormatter::new(Arc::new(values)),
            report_path: options.report_path.clone(),
        }
    }

    /// Returns the [`EventBus`] of this run.
    #[must_use]
    pub const fn event_bus(&self) -> &EventBus {
        &self.bus
    }

    /// Returns the [`FragmentFormatter`] of this run.
    #[must_use]
    pub const fn formatter(&self) -> &FragmentFormatter {
        &self.formatter
    }

    /// Subscribes a new [`JsonReporter`] writing into the given `output`.
    ///
    /// The subscription happens right away, so no event published after this
    /// call is missed. The returned [`Future`] resolves once the run
    /// [ends][1].
    ///
    /// [1]: Screenplay::end
    pub fn reporter<Out: io::Write>(
        &self,
        output: Out,
    ) -> impl Future<Output = JsonReporter<Out>> + use<Out> {
        self.shared_reporter(Arc::new(JsonArtifact::new(output)))
    }

    /// Subscribes a new [`JsonReporter`] writing into the given shared
    /// `artifact`.
    ///
    /// Every [`JsonReporter`] subscribed this way reports every performance,
    /// while the `artifact` writes each performance only once. Use
    /// [`Screenplay::performance_reporter()`] to split the performances
    /// between reporters instead.
    ///
    /// See [`Screenplay::reporter()`] for details.
    pub fn shared_reporter<Out: io::Write>(
        &self,
        artifact: Arc<JsonArtifact<Out>>,
    ) -> impl Future<Output = JsonReporter<Out>> + use<Out> {
        let subscription = self.bus.subscribe();
        JsonReporter::new(artifact, self.formatter.clone())
            .report_from(subscription)
    }

    /// Subscribes a new [`JsonReporter`] of the single performance with the
    /// given `id`, writing into the given shared `artifact`.
    ///
    /// The performance is expected to be begun with
    /// [`Screenplay::begin_performance_as()`].
    pub fn performance_reporter<Out: io::Write>(
        &self,
        id: PerformanceId,
        artifact: Arc<JsonArtifact<Out>>,
    ) -> impl Future<Output = JsonReporter<Out>> + use<Out> {
        let subscription = self.bus.subscribe_to(id);
        JsonReporter::new(artifact, self.formatter.clone())
            .report_from(subscription)
    }

    /// Subscribes a new [`JsonReporter`] writing into the configured
    /// [`ScreenplayOptions::report_path`], creating missing directories.
    ///
    /// Returns [`None`] if writing the report is disabled.
    ///
    /// # Errors
    ///
    /// If the file cannot be created.
    pub fn file_reporter(
        &self,
    ) -> WriterResult<
        Option<impl Future<Output = JsonReporter<BufWriter<File>>> + use<>>,
    > {
        let Some(path) = &self.report_path else {
            return Ok(None);
        };
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let file = File::create(path)?;
        tracing::info!(path = %path.display(), "writing Screenplay report");

        Ok(Some(self.reporter(BufWriter::new(file))))
    }

    /// Starts this run.
    pub fn begin(&self) {
        self.bus.screenplay_started();
    }

    /// Begins a new performance with the given naming hierarchy.
    #[must_use]
    pub fn begin_performance(
        &self,
        naming_hierarchy: Vec<NamingItem>,
    ) -> PerformanceScope {
        self.bus.begin_performance(naming_hierarchy)
    }

    /// Begins a new performance with the given [`PerformanceId`] and naming
    /// hierarchy.
    #[must_use]
    pub fn begin_performance_as(
        &self,
        id: PerformanceId,
        naming_hierarchy: Vec<NamingItem>,
    ) -> PerformanceScope {
        self.bus.begin_performance_as(id, naming_hierarchy)
    }

    /// Ends this run, so all [`JsonReporter`]s complete their reports.
    pub fn end(&self) {
        self.bus.screenplay_ended();
    }
}

// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! [`Reporter`] building JSON [`PerformanceReport`]s.
//!
//! [`PerformanceReport`]: crate::report::PerformanceReport

use std::{collections::HashSet, io, sync::Arc};

use linked_hash_map::LinkedHashMap;

use super::{JsonArtifact, Reporter};
use crate::{
    Event,
    error::{ReportError, ScopeError},
    event::{self, PerformanceId},
    format::FragmentFormatter,
    report::PerformanceReportBuilder,
};

/// [`Reporter`] building a [`PerformanceReport`] per performance and
/// appending it to a shared [`JsonArtifact`] once the performance finishes.
///
/// # Errors
///
/// Misuse of a performance's events (like beginning it twice, or reporting
/// into it after it has finished) aborts the reporting of that performance
/// only: its builder is dropped, the performance is omitted from the
/// artifact, and the error is kept for inspection via
/// [`JsonReporter::errors()`]. Other performances are unaffected.
///
/// [`PerformanceReport`]: crate::report::PerformanceReport
#[derive(Debug)]
pub struct JsonReporter<Out: io::Write> {
    /// [`JsonArtifact`] to append finished performances to.
    artifact: Arc<JsonArtifact<Out>>,

    /// Formatter of report texts, shared by all the builders.
    formatter: FragmentFormatter,

    /// Builders of the currently open performances, in the order they've
    /// begun.
    ///
    /// [`LinkedHashMap`] keeps the begin order for inspection.
    performances: LinkedHashMap<PerformanceId, PerformanceReportBuilder>,

    /// Performances that have finished.
    finished: HashSet<PerformanceId>,

    /// Performances whose reporting was aborted.
    abandoned: HashSet<PerformanceId>,

    /// Errors happened so far.
    errors: Vec<ReportError>,

    /// Whether the [`JsonArtifact`] was released by this reporter.
    released: bool,
}

impl<Out: io::Write> JsonReporter<Out> {
    /// Creates a new [`JsonReporter`] writing into the given `artifact`,
    /// attaching to it.
    #[must_use]
    pub fn new(
        artifact: Arc<JsonArtifact<Out>>,
        formatter: FragmentFormatter,
    ) -> Self {
        artifact.attach();
        Self {
            artifact,
            formatter,
            performances: LinkedHashMap::new(),
            finished: HashSet::new(),
            abandoned: HashSet::new(),
            errors: Vec::new(),
            released: false,
        }
    }

    /// Returns the [`JsonArtifact`] this reporter writes into.
    #[must_use]
    pub const fn artifact(&self) -> &Arc<JsonArtifact<Out>> {
        &self.artifact
    }

    /// Returns errors happened so far, in order.
    #[must_use]
    pub fn errors(&self) -> &[ReportError] {
        &self.errors
    }

    /// Returns IDs of the performances begun but not finished yet, in the
    /// order they've begun.
    pub fn open_performances(
        &self,
    ) -> impl Iterator<Item = PerformanceId> + '_ {
        self.performances.keys().copied()
    }

    /// Applies the given [`event::Performance`] to the builder of the
    /// performance with the given `id`.
    fn handle_performance_event(
        &mut self,
        id: PerformanceId,
        ev: event::Performance,
    ) -> Result<(), ReportError> {
        use event::Performance as Ev;

        let operation = ev.kind();
        if let Ev::Begun(naming) = ev {
            if self.performances.contains_key(&id)
                || self.finished.contains(&id)
            {
                return Err(ScopeError::DoubleBegin { performance: id }.into());
            }
            drop(self.performances.insert(
                id,
                PerformanceReportBuilder::new(naming, self.formatter.clone()),
            ));
            return Ok(());
        }

        if self.finished.contains(&id) {
            return Err(ScopeError::finalised(operation).into());
        }

        if let Ev::Finished(success) = ev {
            let mut builder = self
                .performances
                .remove(&id)
                .ok_or(ScopeError::unopened(operation))?;
            let report = builder.finalise(success)?;
            _ = self.finished.insert(id);
            tracing::debug!(
                performance = %id,
                outcome = %report.outcome,
                "appending performance report",
            );
            _ = self.artifact.append(id, &report)?;
            return Ok(());
        }

        let builder = self
            .performances
            .get_mut(&id)
            .ok_or(ScopeError::unopened(operation))?;
        match ev {
            Ev::ActorCreated(actor) => builder.actor_created(&actor),
            Ev::GainedAbility { actor, ability } => {
                builder.actor_gained_ability(&actor, ability.as_ref())
            }
            Ev::ActorSpotlit(actor) => builder.actor_spotlit(&actor),
            Ev::SpotlightTurnedOff => builder.spotlight_turned_off(),
            Ev::BeginPerformable { performable, actor, phase } => {
                builder.begin_performable(performable, &actor, phase)
            }
            Ev::EndPerformable { performable, .. } => {
                builder.end_performable(&performable)
            }
            Ev::PerformableResult { result, .. } => builder
                .record_result_for_current_performable(Some(result.as_ref())),
            Ev::PerformableFailed { failure, .. } => {
                builder.record_failure_for_current_performable(&failure)
            }
            Ev::RecordAsset { file_path, summary } => {
                builder.record_asset_for_current_performable(file_path, summary)
            }
            Ev::Begun(_) | Ev::Finished(_) => Ok(()),
        }
    }

    /// Records the given `err` of the performance with the given `id`,
    /// aborting its reporting if the `err` leaves its report unreliable.
    fn fail(&mut self, id: PerformanceId, err: ReportError) {
        if err.aborts_performance() {
            drop(self.performances.remove(&id));
            _ = self.abandoned.insert(id);
        }
        tracing::error!(
            performance = %id,
            error = %err,
            "performance reporting failed",
        );
        self.errors.push(err);
    }

    /// Releases the [`JsonArtifact`], unless already released.
    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        for (id, _) in self.performances.drain() {
            tracing::warn!(
                performance = %id,
                "performance never finished, omitting it from the report",
            );
        }
        if let Err(e) = self.artifact.release() {
            tracing::error!(error = %e, "failed to complete the report");
            self.errors.push(e.into());
        }
    }
}

impl<Out: io::Write> Reporter for JsonReporter<Out> {
    async fn handle_event(&mut self, event: Event<event::Screenplay>) {
        match event.into_inner() {
            event::Screenplay::Started => {
                if let Err(e) = self.artifact.begin() {
                    tracing::error!(error = %e, "failed to begin the report");
                    self.errors.push(e.into());
                }
            }
            event::Screenplay::Performance(id, _)
                if self.abandoned.contains(&id) =>
            {
                tracing::trace!(
                    performance = %id,
                    "ignoring event of aborted performance",
                );
            }
            event::Screenplay::Performance(id, ev) => {
                if let Err(e) = self.handle_performance_event(id, ev) {
                    self.fail(id, e);
                }
            }
            event::Screenplay::Ended => self.release(),
        }
    }
}

impl<Out: io::Write> Drop for JsonReporter<Out> {
    fn drop(&mut self) {
        self.release();
    }
}

// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Hierarchical [`PerformanceReport`] builder of a single performance.

use std::sync::Arc;

use super::{
    ActorReport, NamingItem, Outcome, PerformableAsset, PerformableReport,
    PerformanceReport, PerformancePhase, Reportable,
};
use crate::{
    Actor, Failure, ReportValue, SharedValue,
    error::{self, ScopeError, ScopeResult},
    format::FragmentFormatter,
    value::short_type_name,
};

/// Template of [`Reportable::ActorCreatedReport`]s.
const ACTOR_CREATED: &str = "{Actor} joined the performance";

/// Template of [`Reportable::ActorGainedAbilityReport`]s of abilities unable
/// to report themselves.
const ACTOR_GAINED_ABILITY: &str = "{Actor} is able to {Ability}";

/// Template of [`Reportable::ActorSpotlitReport`]s.
const ACTOR_SPOTLIT: &str = "{Actor} was put into the spotlight";

/// Text of [`Reportable::SpotlightTurnedOffReport`]s.
const SPOTLIGHT_TURNED_OFF: &str = "The spotlight was turned off";

/// Template of [`Reportable::PerformableReport`]s of performables unable to
/// report themselves.
const PERFORMED: &str = "{Actor} performed {Performable}";

/// State of a [`PerformanceReportBuilder`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum State {
    /// Accepting events.
    Open,

    /// Report was extracted, no more events are accepted.
    Finalised,
}

/// Performable which has begun but not yet ended.
#[derive(Debug)]
struct OpenPerformable {
    /// Performable itself, to check the identity of the ending one against.
    performable: SharedValue,

    /// Report accumulated so far.
    report: PerformableReport,
}

/// Builder of a [`PerformanceReport`] out of the events of a single
/// performance.
///
/// Begun performables are kept on a stack: everything happening while one is
/// on top of it nests under it, and ending it moves its report to the level
/// underneath. So the produced tree mirrors the begin/end calls exactly.
#[derive(Debug)]
pub struct PerformanceReportBuilder {
    /// Naming hierarchy of the performance.
    naming_hierarchy: Vec<NamingItem>,

    /// Formatter of report texts.
    formatter: FragmentFormatter,

    /// Top-level [`Reportable`]s.
    root: Vec<Reportable>,

    /// Currently open performables, innermost last.
    stack: Vec<OpenPerformable>,

    /// Current [`State`].
    state: State,
}

impl PerformanceReportBuilder {
    /// Creates a new open [`PerformanceReportBuilder`] of the performance
    /// with the given `naming_hierarchy`.
    #[must_use]
    pub const fn new(
        naming_hierarchy: Vec<NamingItem>,
        formatter: FragmentFormatter,
    ) -> Self {
        Self {
            naming_hierarchy,
            formatter,
            root: Vec::new(),
            stack: Vec::new(),
            state: State::Open,
        }
    }

    /// Returns the naming hierarchy of the performance.
    #[must_use]
    pub fn naming_hierarchy(&self) -> &[NamingItem] {
        &self.naming_hierarchy
    }

    /// Returns the number of currently open performables.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Indicates whether this builder was finalised.
    #[must_use]
    pub fn is_finalised(&self) -> bool {
        self.state == State::Finalised
    }

    /// Records that the `actor` joined the performance.
    ///
    /// # Errors
    ///
    /// If this builder was finalised, or the report text cannot be formatted.
    pub fn actor_created(&mut self, actor: &Actor) -> error::Result<()> {
        self.ensure_open("actor_created")?;

        let report = self.formatter.format(ACTOR_CREATED, &[actor])?;
        self.append(Reportable::ActorCreatedReport(ActorReport {
            actor_name: Some(actor.name().to_owned()),
            report: report.into_text(),
        }));
        Ok(())
    }

    /// Records that the `actor` gained the `ability`.
    ///
    /// The report text is built by the `ability` itself, if it's able to.
    ///
    /// # Errors
    ///
    /// If this builder was finalised, or the report text cannot be formatted.
    pub fn actor_gained_ability(
        &mut self,
        actor: &Actor,
        ability: &dyn ReportValue,
    ) -> error::Result<()> {
        self.ensure_open("actor_gained_ability")?;

        let report = match ability.as_reporting() {
            Some(reporting) => {
                reporting.report_fragment(actor, &self.formatter)
            }
            None => {
                self.formatter.format(ACTOR_GAINED_ABILITY, &[actor, ability])
            }
        }?;
        self.append(Reportable::ActorGainedAbilityReport(ActorReport {
            actor_name: Some(actor.name().to_owned()),
            report: report.into_text(),
        }));
        Ok(())
    }

    /// Records that the `actor` was put into the spotlight.
    ///
    /// # Errors
    ///
    /// If this builder was finalised, or the report text cannot be formatted.
    pub fn actor_spotlit(&mut self, actor: &Actor) -> error::Result<()> {
        self.ensure_open("actor_spotlit")?;

        let report = self.formatter.format(ACTOR_SPOTLIT, &[actor])?;
        self.append(Reportable::ActorSpotlitReport(ActorReport {
            actor_name: Some(actor.name().to_owned()),
            report: report.into_text(),
        }));
        Ok(())
    }

    /// Records that the spotlight was turned off.
    ///
    /// # Errors
    ///
    /// If this builder was finalised.
    pub fn spotlight_turned_off(&mut self) -> error::Result<()> {
        self.ensure_open("spotlight_turned_off")?;

        self.append(Reportable::SpotlightTurnedOffReport(ActorReport {
            actor_name: None,
            report: SPOTLIGHT_TURNED_OFF.to_owned(),
        }));
        Ok(())
    }

    /// Opens a new nesting level for the `performable` executed by the
    /// `actor`.
    ///
    /// The report text is built by the `performable` itself, if it's able
    /// to.
    ///
    /// # Errors
    ///
    /// If this builder was finalised, or the report text cannot be formatted.
    pub fn begin_performable(
        &mut self,
        performable: SharedValue,
        actor: &Actor,
        phase: PerformancePhase,
    ) -> error::Result<()> {
        self.ensure_open("begin_performable")?;

        let performable_type = performable.type_name();
        let report = match performable.as_reporting() {
            Some(reporting) => {
                reporting.report_fragment(actor, &self.formatter)
            }
            None => self.formatter.format(
                PERFORMED,
                &[actor, &short_type_name(performable_type)],
            ),
        }?;

        self.stack.push(OpenPerformable {
            performable,
            report: PerformableReport {
                actor_name: Some(actor.name().to_owned()),
                report: report.into_text(),
                performable_type: performable_type.to_owned(),
                performance_phase: phase,
                result: None,
                has_result: false,
                exception: None,
                exception_is_from_consumed_performable: false,
                assets: Vec::new(),
                reportables: Vec::new(),
            },
        });
        Ok(())
    }

    /// Closes the nesting level of the innermost open `performable`.
    ///
    /// # Errors
    ///
    /// - If this builder was finalised.
    /// - If no performable is open.
    /// - If the `performable` isn't the innermost open one. Nothing is closed
    ///   then.
    pub fn end_performable(
        &mut self,
        performable: &SharedValue,
    ) -> error::Result<()> {
        self.ensure_open("end_performable")?;

        let top = self
            .stack
            .last()
            .ok_or(ScopeError::unopened("end_performable"))?;
        let innermost = Arc::as_ptr(&top.performable);
        if !std::ptr::addr_eq(innermost, Arc::as_ptr(performable)) {
            return Err(ScopeError::MismatchedPerformable {
                expected: top.report.performable_type.clone(),
                actual: performable.type_name().to_owned(),
            }
            .into());
        }

        if let Some(closed) = self.stack.pop() {
            self.append(Reportable::PerformableReport(closed.report));
        }
        Ok(())
    }

    /// Attaches a file to the innermost open performable.
    ///
    /// # Errors
    ///
    /// If this builder was finalised, or no performable is open.
    pub fn record_asset_for_current_performable(
        &mut self,
        file_path: impl Into<String>,
        summary: impl Into<String>,
    ) -> error::Result<()> {
        let current = self.current("record_asset")?;
        current.assets.push(PerformableAsset {
            file_path: file_path.into(),
            file_summary: summary.into(),
        });
        Ok(())
    }

    /// Records the `result` of the innermost open performable.
    ///
    /// # Errors
    ///
    /// - If this builder was finalised, or no performable is open.
    /// - If the `result` cannot be formatted.
    pub fn record_result_for_current_performable(
        &mut self,
        result: Option<&dyn ReportValue>,
    ) -> error::Result<()> {
        self.ensure_open("record_result")?;

        let formatted = self.formatter.value_formatters().format(result)?;
        let current = self.current("record_result")?;
        current.result = Some(formatted);
        current.has_result = true;
        Ok(())
    }

    /// Records the `failure` of the innermost open performable.
    ///
    /// A `failure` already recorded by a nested performable is marked as
    /// consumed, so it's displayed only once.
    ///
    /// # Errors
    ///
    /// If this builder was finalised, or no performable is open.
    pub fn record_failure_for_current_performable(
        &mut self,
        failure: &Failure,
    ) -> error::Result<()> {
        let current = self.current("record_failure")?;
        current.exception = Some(failure.message().to_owned());
        current.exception_is_from_consumed_performable = failure.is_reported();
        Ok(())
    }

    /// Returns the [`PerformanceReport`] accumulated so far, with the
    /// [`Outcome`] derived from the given `success`.
    ///
    /// Performables still open are folded into their parents, so the
    /// returned report is well-formed, though possibly incomplete.
    #[must_use]
    pub fn report(&self, success: Option<bool>) -> PerformanceReport {
        let mut reportables = self.root.clone();

        let mut open = None;
        for node in self.stack.iter().rev() {
            let mut report = node.report.clone();
            report.reportables.extend(open.take());
            open = Some(Reportable::PerformableReport(report));
        }
        reportables.extend(open);

        PerformanceReport {
            naming_hierarchy: self.naming_hierarchy.clone(),
            outcome: Outcome::from(success),
            reportables,
        }
    }

    /// Extracts the final [`PerformanceReport`] and stops accepting events.
    ///
    /// # Errors
    ///
    /// If this builder was already finalised.
    pub fn finalise(
        &mut self,
        success: Option<bool>,
    ) -> error::Result<PerformanceReport> {
        self.ensure_open("finalise")?;

        if !self.stack.is_empty() {
            tracing::warn!(
                open = self.stack.len(),
                "finalising a performance with unended performables",
            );
        }

        let report = self.report(success);
        self.state = State::Finalised;
        self.root.clear();
        self.stack.clear();
        Ok(report)
    }

    /// Appends the given [`Reportable`] to the current nesting level.
    fn append(&mut self, reportable: Reportable) {
        match self.stack.last_mut() {
            Some(top) => top.report.reportables.push(reportable),
            None => self.root.push(reportable),
        }
    }

    /// Returns the report of the innermost open performable.
    fn current(
        &mut self,
        operation: &'static str,
    ) -> ScopeResult<&mut PerformableReport> {
        self.ensure_open(operation)?;
        self.stack
            .last_mut()
            .map(|top| &mut top.report)
            .ok_or(ScopeError::unopened(operation))
    }

    /// Checks this builder to accept the given `operation`.
    fn ensure_open(&self, operation: &'static str) -> ScopeResult<()> {
        match self.state {
            State::Open => Ok(()),
            State::Finalised => Err(ScopeError::finalised(operation)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        CanReport, ReportError,
        error::FormatterResult,
        format::ReportFragment,
        report::PerformancePhase::{Given, Then, When},
    };

    #[derive(Debug)]
    struct StartTheStopwatch;

    impl ReportValue for StartTheStopwatch {}

    #[derive(Debug)]
    struct StopTheStopwatch;

    impl ReportValue for StopTheStopwatch {}

    #[derive(Debug)]
    struct Pause;

    impl ReportValue for Pause {
        fn as_reporting(&self) -> Option<&dyn CanReport> {
            Some(self)
        }
    }

    impl CanReport for Pause {
        fn report_fragment(
            &self,
            actor: &Actor,
            formatter: &FragmentFormatter,
        ) -> FormatterResult<ReportFragment> {
            formatter.format(
                "{Actor} starts then stops their stopwatch after a short pause",
                &[actor],
            )
        }
    }

    #[derive(Debug)]
    struct ReadBooks;

    impl ReportValue for ReadBooks {
        fn format_for_report(&self) -> Option<String> {
            Some("read books".into())
        }
    }

    fn builder() -> PerformanceReportBuilder {
        PerformanceReportBuilder::new(
            vec![NamingItem::new("stopwatch", Some("Using a stopwatch"))],
            FragmentFormatter::default(),
        )
    }

    fn children(reportable: &Reportable) -> &[Reportable] {
        &reportable.as_performable().unwrap().reportables
    }

    #[test]
    fn reports_actor_events_at_root() {
        let joe = Actor::named("Joe");
        let mut b = builder();

        b.actor_created(&joe).unwrap();
        b.actor_gained_ability(&joe, &ReadBooks).unwrap();
        b.actor_spotlit(&joe).unwrap();
        b.spotlight_turned_off().unwrap();
        let report = b.report(Some(true));

        let texts = report
            .reportables
            .iter()
            .map(Reportable::report)
            .collect::<Vec<_>>();
        assert_eq!(
            texts,
            [
                "Joe joined the performance",
                "Joe is able to read books",
                "Joe was put into the spotlight",
                "The spotlight was turned off",
            ],
        );
        assert_eq!(report.reportables[0].actor_name(), Some("Joe"));
        assert_eq!(report.reportables[3].actor_name(), None);
    }

    #[test]
    fn nests_performables_in_call_order() {
        let joe = Actor::named("Joe");
        let pause: SharedValue = Arc::new(Pause);
        let start: SharedValue = Arc::new(StartTheStopwatch);
        let stop: SharedValue = Arc::new(StopTheStopwatch);
        let mut b = builder();

        b.actor_created(&joe).unwrap();
        b.begin_performable(pause.clone(), &joe, When).unwrap();
        b.begin_performable(start.clone(), &joe, When).unwrap();
        assert_eq!(b.depth(), 2);
        b.end_performable(&start).unwrap();
        b.begin_performable(stop.clone(), &joe, When).unwrap();
        b.end_performable(&stop).unwrap();
        b.end_performable(&pause).unwrap();
        assert_eq!(b.depth(), 0);
        let report = b.finalise(Some(true)).unwrap();

        assert_eq!(report.outcome, Outcome::Success);
        assert_eq!(report.reportables.len(), 2);
        let outer = &report.reportables[1];
        assert_eq!(
            outer.report(),
            "Joe starts then stops their stopwatch after a short pause",
        );
        let inner = children(outer);
        assert_eq!(inner.len(), 2);
        assert_eq!(inner[0].report(), "Joe performed StartTheStopwatch");
        assert_eq!(inner[1].report(), "Joe performed StopTheStopwatch");
        assert!(
            inner[0].as_performable().unwrap().performable_type
                .ends_with("::StartTheStopwatch"),
        );
    }

    #[test]
    fn records_into_innermost_performable() {
        let joe = Actor::named("Joe");
        let outer: SharedValue = Arc::new(Pause);
        let inner: SharedValue = Arc::new(StopTheStopwatch);
        let mut b = builder();

        b.begin_performable(outer.clone(), &joe, Given).unwrap();
        b.begin_performable(inner.clone(), &joe, Then).unwrap();
        b.record_asset_for_current_performable("shot.png", "Screenshot")
            .unwrap();
        b.record_result_for_current_performable(Some(&42_u32)).unwrap();
        b.end_performable(&inner).unwrap();
        b.record_result_for_current_performable(None).unwrap();
        b.end_performable(&outer).unwrap();
        let report = b.report(None);

        let outer = report.reportables[0].as_performable().unwrap();
        assert_eq!(outer.result.as_deref(), Some("<null>"));
        assert!(outer.has_result);
        assert!(outer.assets.is_empty());
        let inner = outer.reportables[0].as_performable().unwrap();
        assert_eq!(inner.result.as_deref(), Some("42"));
        assert_eq!(inner.performance_phase, PerformancePhase::Then);
        assert_eq!(
            inner.assets,
            [PerformableAsset {
                file_path: "shot.png".into(),
                file_summary: "Screenshot".into(),
            }],
        );
    }

    #[test]
    fn marks_consumed_failures() {
        let joe = Actor::named("Joe");
        let outer: SharedValue = Arc::new(Pause);
        let inner: SharedValue = Arc::new(StopTheStopwatch);
        let failure = Failure::new("stopwatch is broken");
        let mut b = builder();

        b.begin_performable(outer.clone(), &joe, When).unwrap();
        b.begin_performable(inner.clone(), &joe, When).unwrap();
        b.record_failure_for_current_performable(&failure).unwrap();
        b.end_performable(&inner).unwrap();
        b.record_failure_for_current_performable(&failure.into_reported())
            .unwrap();
        b.end_performable(&outer).unwrap();
        let report = b.finalise(Some(false)).unwrap();

        assert_eq!(report.outcome, Outcome::Failed);
        let outer = report.reportables[0].as_performable().unwrap();
        let inner = outer.reportables[0].as_performable().unwrap();
        assert_eq!(inner.exception.as_deref(), Some("stopwatch is broken"));
        assert!(!inner.exception_is_from_consumed_performable);
        assert_eq!(outer.exception.as_deref(), Some("stopwatch is broken"));
        assert!(outer.exception_is_from_consumed_performable);
    }

    #[test]
    fn maps_outcome() {
        let b = builder();

        assert_eq!(b.report(Some(true)).outcome, Outcome::Success);
        assert_eq!(b.report(Some(false)).outcome, Outcome::Failed);
        assert_eq!(b.report(None).outcome, Outcome::Completed);
        assert_eq!(b.report(None).naming_hierarchy[0].identifier, "stopwatch");
    }

    #[test]
    fn rejects_recording_outside_performables() {
        let mut b = builder();

        assert!(matches!(
            b.record_asset_for_current_performable("a.png", "A"),
            Err(ReportError::Scope(ScopeError::OperationOnUnopenedScope {
                operation: "record_asset",
            })),
        ));
        assert!(matches!(
            b.record_result_for_current_performable(Some(&1_u8)),
            Err(ReportError::Scope(
                ScopeError::OperationOnUnopenedScope { .. },
            )),
        ));
        assert!(matches!(
            b.record_failure_for_current_performable(&Failure::new("x")),
            Err(ReportError::Scope(
                ScopeError::OperationOnUnopenedScope { .. },
            )),
        ));
        assert!(matches!(
            b.end_performable(&(Arc::new(Pause) as SharedValue)),
            Err(ReportError::Scope(
                ScopeError::OperationOnUnopenedScope { .. },
            )),
        ));
    }

    #[test]
    fn rejects_mismatched_end() {
        let joe = Actor::named("Joe");
        let start: SharedValue = Arc::new(StartTheStopwatch);
        let other_start: SharedValue = Arc::new(StartTheStopwatch);
        let mut b = builder();

        b.begin_performable(start.clone(), &joe, When).unwrap();

        assert!(matches!(
            b.end_performable(&other_start),
            Err(ReportError::Scope(ScopeError::MismatchedPerformable { .. })),
        ));
        assert_eq!(b.depth(), 1);
        b.end_performable(&start).unwrap();
    }

    #[test]
    fn rejects_everything_after_finalisation() {
        let joe = Actor::named("Joe");
        let mut b = builder();
        _ = b.finalise(None).unwrap();

        assert!(b.is_finalised());
        assert!(matches!(
            b.actor_created(&joe),
            Err(ReportError::Scope(ScopeError::OperationAfterFinalisation {
                operation: "actor_created",
            })),
        ));
        assert!(b.spotlight_turned_off().is_err());
        assert!(b
            .begin_performable(Arc::new(Pause), &joe, PerformancePhase::When)
            .is_err());
        assert!(matches!(
            b.finalise(None),
            Err(ReportError::Scope(ScopeError::OperationAfterFinalisation {
                operation: "finalise",
            })),
        ));
    }

    #[test]
    fn folds_open_performables_into_report() {
        let joe = Actor::named("Joe");
        let mut b = builder();

        b.actor_created(&joe).unwrap();
        b.begin_performable(Arc::new(Pause), &joe, When).unwrap();
        b.begin_performable(Arc::new(StartTheStopwatch), &joe, When).unwrap();
        b.actor_spotlit(&joe).unwrap();
        let report = b.report(None);

        assert_eq!(report.reportables.len(), 2);
        let outer = &report.reportables[1];
        let inner = &children(outer)[0];
        assert_eq!(inner.report(), "Joe performed StartTheStopwatch");
        assert_eq!(
            children(inner)[0].report(),
            "Joe was put into the spotlight",
        );
        assert_eq!(b.depth(), 2);
    }
}

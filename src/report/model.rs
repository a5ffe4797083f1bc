// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! [`Serialize`]able report document.
//!
//! Field names are `PascalCase` and [`Reportable`]s are discriminated by
//! their `Type` field, so the document reads the same as reports produced by
//! other Screenplay implementations.

use std::{io, time::SystemTime};

use derive_more::with_trait::Display;
use serde::{Deserialize, Serialize};

/// Version of the report document format.
pub const REPORT_FORMAT_VERSION: &str = "2.0.0";

/// Complete report document: metadata and one entry per performance.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ScreenplayReport {
    /// [`ReportMetadata`] of this document.
    pub metadata: ReportMetadata,

    /// [`PerformanceReport`]s in the order performances finished.
    pub performances: Vec<PerformanceReport>,
}

impl ScreenplayReport {
    /// Reads a [`ScreenplayReport`] from the given JSON `reader`.
    ///
    /// # Errors
    ///
    /// If the `reader` fails or doesn't contain a valid report.
    pub fn from_reader(reader: impl io::Read) -> serde_json::Result<Self> {
        serde_json::from_reader(reader)
    }

    /// Reads a [`ScreenplayReport`] from the given JSON `bytes`.
    ///
    /// # Errors
    ///
    /// If the `bytes` don't contain a valid report.
    pub fn from_slice(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }
}

/// Metadata of a [`ScreenplayReport`].
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReportMetadata {
    /// Time the report was started at.
    #[serde(with = "rfc3339")]
    pub timestamp: SystemTime,

    /// Version of the report document format.
    pub report_format_version: String,
}

impl ReportMetadata {
    /// Creates new [`ReportMetadata`] stamped with the current time.
    #[must_use]
    pub fn now() -> Self {
        Self {
            timestamp: SystemTime::now(),
            report_format_version: REPORT_FORMAT_VERSION.to_owned(),
        }
    }
}

/// Report of a single performance.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PerformanceReport {
    /// Containing identifiers and names, outermost first.
    pub naming_hierarchy: Vec<NamingItem>,

    /// [`Outcome`] of the performance.
    pub outcome: Outcome,

    /// Top-level [`Reportable`]s in the order they happened.
    pub reportables: Vec<Reportable>,
}

/// Single entry of a naming hierarchy: a feature, a suite, a scenario, etc.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct NamingItem {
    /// Identifier of the item.
    pub identifier: String,

    /// Human-readable name of the item, if it has one.
    pub name: Option<String>,
}

impl NamingItem {
    /// Creates a new [`NamingItem`].
    #[must_use]
    pub fn new(identifier: impl Into<String>, name: Option<&str>) -> Self {
        Self { identifier: identifier.into(), name: name.map(str::to_owned) }
    }
}

/// Outcome of a performance.
#[derive(
    Clone, Copy, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize,
)]
pub enum Outcome {
    /// Performance succeeded.
    Success,

    /// Performance failed.
    Failed,

    /// Performance completed without stating its success.
    Completed,
}

impl From<Option<bool>> for Outcome {
    fn from(success: Option<bool>) -> Self {
        match success {
            Some(true) => Self::Success,
            Some(false) => Self::Failed,
            None => Self::Completed,
        }
    }
}

/// Phase of a performance a performable is executed in.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    Hash,
    PartialEq,
    Serialize,
)]
pub enum PerformancePhase {
    /// Setting the stage: `Given`.
    Given,

    /// Acting: `When`.
    When,

    /// Asserting: `Then`.
    Then,

    /// Phase wasn't specified.
    #[default]
    Unspecified,
}

/// Node of a report tree.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "Type")]
pub enum Reportable {
    /// Actor was created.
    ActorCreatedReport(ActorReport),

    /// Actor gained an ability.
    ActorGainedAbilityReport(ActorReport),

    /// Actor was put into the spotlight.
    ActorSpotlitReport(ActorReport),

    /// Spotlight was turned off.
    SpotlightTurnedOffReport(ActorReport),

    /// Performable was executed.
    PerformableReport(PerformableReport),
}

impl Reportable {
    /// Returns the name of the actor this [`Reportable`] is about, if any.
    #[must_use]
    pub fn actor_name(&self) -> Option<&str> {
        match self {
            Self::ActorCreatedReport(r)
            | Self::ActorGainedAbilityReport(r)
            | Self::ActorSpotlitReport(r)
            | Self::SpotlightTurnedOffReport(r) => r.actor_name.as_deref(),
            Self::PerformableReport(r) => r.actor_name.as_deref(),
        }
    }

    /// Returns the human-readable text of this [`Reportable`].
    #[must_use]
    pub fn report(&self) -> &str {
        match self {
            Self::ActorCreatedReport(r)
            | Self::ActorGainedAbilityReport(r)
            | Self::ActorSpotlitReport(r)
            | Self::SpotlightTurnedOffReport(r) => &r.report,
            Self::PerformableReport(r) => &r.report,
        }
    }

    /// Returns this [`Reportable`] as a [`PerformableReport`], if it's one.
    #[must_use]
    pub const fn as_performable(&self) -> Option<&PerformableReport> {
        match self {
            Self::PerformableReport(r) => Some(r),
            Self::ActorCreatedReport(_)
            | Self::ActorGainedAbilityReport(_)
            | Self::ActorSpotlitReport(_)
            | Self::SpotlightTurnedOffReport(_) => None,
        }
    }
}

/// Report of an actor-related (or spotlight-related) event.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ActorReport {
    /// Name of the actor, or [`None`] if the event isn't actor-scoped.
    pub actor_name: Option<String>,

    /// Human-readable text of the event.
    pub report: String,
}

/// Report of an executed performable, nesting the [`Reportable`]s that
/// happened while it was executing.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PerformableReport {
    /// Name of the actor executing the performable.
    pub actor_name: Option<String>,

    /// Human-readable text of the performable.
    pub report: String,

    /// Fully qualified type name of the performable.
    pub performable_type: String,

    /// [`PerformancePhase`] the performable was executed in.
    pub performance_phase: PerformancePhase,

    /// Formatted result of the performable, if any.
    pub result: Option<String>,

    /// Indicates whether a result was recorded, even a null one.
    pub has_result: bool,

    /// Diagnostic text of the failure, if the performable failed.
    pub exception: Option<String>,

    /// Indicates whether the [`PerformableReport::exception`] has already
    /// been reported by a nested performable, so it shouldn't be displayed
    /// again here.
    pub exception_is_from_consumed_performable: bool,

    /// Files recorded while executing the performable.
    pub assets: Vec<PerformableAsset>,

    /// Nested [`Reportable`]s in the order they happened.
    pub reportables: Vec<Reportable>,
}

/// File recorded while executing a performable, like a screenshot.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PerformableAsset {
    /// Path to the file.
    pub file_path: String,

    /// Human-readable summary of the file.
    pub file_summary: String,
}

/// [RFC 3339] (de)serialization of [`SystemTime`] with nanosecond precision.
///
/// Always written in UTC, while any UTC offset is accepted when reading.
///
/// [RFC 3339]: https://www.rfc-editor.org/rfc/rfc3339
mod rfc3339 {
    use std::time::SystemTime;

    use serde::{Deserialize as _, Deserializer, Serializer, de};

    pub(super) fn serialize<S: Serializer>(
        at: &SystemTime,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&humantime::format_rfc3339_nanos(*at))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<SystemTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        chrono::DateTime::parse_from_rfc3339(&raw)
            .map(SystemTime::from)
            .map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;

    fn performable(report: &str, children: Vec<Reportable>) -> Reportable {
        Reportable::PerformableReport(PerformableReport {
            actor_name: Some("Joe".into()),
            report: report.into(),
            performable_type: "stopwatch::Start".into(),
            performance_phase: PerformancePhase::When,
            result: None,
            has_result: false,
            exception: None,
            exception_is_from_consumed_performable: false,
            assets: vec![],
            reportables: children,
        })
    }

    #[test]
    fn outcome_from_success() {
        assert_eq!(Outcome::from(Some(true)), Outcome::Success);
        assert_eq!(Outcome::from(Some(false)), Outcome::Failed);
        assert_eq!(Outcome::from(None), Outcome::Completed);
    }

    #[test]
    fn serializes_with_type_discriminator() {
        let spotlight_off = Reportable::SpotlightTurnedOffReport(ActorReport {
            actor_name: None,
            report: "The spotlight was turned off".into(),
        });

        assert_eq!(
            serde_json::to_value(&spotlight_off).unwrap(),
            json!({
                "Type": "SpotlightTurnedOffReport",
                "ActorName": null,
                "Report": "The spotlight was turned off",
            }),
        );
    }

    #[test]
    fn serializes_performables_with_every_field() {
        let value = serde_json::to_value(performable("Joe starts", vec![]))
            .unwrap();

        assert_eq!(
            value,
            json!({
                "Type": "PerformableReport",
                "ActorName": "Joe",
                "Report": "Joe starts",
                "PerformableType": "stopwatch::Start",
                "PerformancePhase": "When",
                "Result": null,
                "HasResult": false,
                "Exception": null,
                "ExceptionIsFromConsumedPerformable": false,
                "Assets": [],
                "Reportables": [],
            }),
        );
    }

    #[test]
    fn serializes_timestamp_as_rfc3339() {
        let metadata = ReportMetadata {
            timestamp: SystemTime::UNIX_EPOCH + Duration::from_millis(1_500),
            report_format_version: REPORT_FORMAT_VERSION.into(),
        };

        assert_eq!(
            serde_json::to_value(&metadata).unwrap(),
            json!({
                "Timestamp": "1970-01-01T00:00:01.500000000Z",
                "ReportFormatVersion": "2.0.0",
            }),
        );
    }

    #[test]
    fn reads_nested_document() {
        let doc = json!({
            "Metadata": {
                "Timestamp": "2024-03-01T10:00:00.000000001Z",
                "ReportFormatVersion": "2.0.0",
            },
            "Performances": [{
                "NamingHierarchy": [
                    {"Identifier": "stopwatch", "Name": "Stopwatch"},
                    {"Identifier": "pause", "Name": null},
                ],
                "Outcome": "Failed",
                "Reportables": [{
                    "Type": "ActorCreatedReport",
                    "ActorName": "Joe",
                    "Report": "Joe joined the performance",
                }],
            }],
        });

        let report = ScreenplayReport::from_slice(
            serde_json::to_vec(&doc).unwrap().as_slice(),
        )
        .unwrap();

        let performance = &report.performances[0];
        assert_eq!(performance.outcome, Outcome::Failed);
        assert_eq!(
            performance.naming_hierarchy[1],
            NamingItem::new("pause", None),
        );
        assert_eq!(performance.reportables[0].actor_name(), Some("Joe"));
        assert_eq!(
            report
                .metadata
                .timestamp
                .duration_since(SystemTime::UNIX_EPOCH)
                .unwrap()
                .subsec_nanos(),
            1,
        );
    }

    #[test]
    fn reads_timestamp_with_offset() {
        let utc = serde_json::from_value::<ReportMetadata>(json!({
            "Timestamp": "2024-03-01T10:00:00.25Z",
            "ReportFormatVersion": "2.0.0",
        }))
        .unwrap();
        let shifted = serde_json::from_value::<ReportMetadata>(json!({
            "Timestamp": "2024-03-01T12:30:00.25+02:30",
            "ReportFormatVersion": "2.0.0",
        }))
        .unwrap();
        let behind = serde_json::from_value::<ReportMetadata>(json!({
            "Timestamp": "2024-03-01T09:00:00.25-01:00",
            "ReportFormatVersion": "2.0.0",
        }))
        .unwrap();

        assert_eq!(shifted, utc);
        assert_eq!(behind, utc);
        assert_eq!(
            serde_json::to_value(&shifted).unwrap()["Timestamp"],
            "2024-03-01T10:00:00.250000000Z",
        );
        assert!(
            serde_json::from_value::<ReportMetadata>(json!({
                "Timestamp": "yesterday",
                "ReportFormatVersion": "2.0.0",
            }))
            .is_err(),
        );
    }

    #[test]
    fn accessors() {
        let node =
            performable("Joe starts", vec![performable("inner", vec![])]);

        assert_eq!(node.report(), "Joe starts");
        assert_eq!(node.actor_name(), Some("Joe"));
        assert_eq!(node.as_performable().unwrap().reportables.len(), 1);
    }
}
